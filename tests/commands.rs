//! Command flows end to end against the in-memory transport

mod common;

use assert_matches::assert_matches;
use common::{cluster_state, flags, run_command, text_context, Call, MockState, MockTransport};
use kubectl_storageos::client::{DeleteVolumeParams, RequestParams};
use kubectl_storageos::config::GlobalFlags;
use kubectl_storageos::domain::volume::LABEL_REPLICAS;
use kubectl_storageos::error::ResourceKind;
use kubectl_storageos::output::ASYNC_REQUEST_MESSAGE;
use kubectl_storageos::{Error, NamespaceId, NodeId, PolicyGroupId, UserId, Version, VolumeId};
use std::time::Duration;

fn ids_in(namespace: &str) -> GlobalFlags {
    GlobalFlags {
        use_ids: Some(true),
        namespace: Some(namespace.into()),
        ..flags()
    }
}

// =============================================================================
// get / describe
// =============================================================================

#[tokio::test]
async fn test_get_volumes_in_default_namespace() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(transport, flags());

    let out = run_command(&ctx, &["get", "volumes"]).await.unwrap();
    let lines: Vec<&str> = out.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("NAMESPACE"));
    assert!(lines[1].contains("data") && lines[1].contains("alpha"));
    assert!(lines[2].contains("logs"));
    assert!(!out.contains("prod"));
}

#[tokio::test]
async fn test_get_volume_by_name_in_other_namespace() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(
        transport,
        GlobalFlags {
            namespace: Some("prod".into()),
            ..flags()
        },
    );

    let out = run_command(&ctx, &["get", "volume", "data"]).await.unwrap();
    assert!(out.lines().nth(1).unwrap().starts_with("prod"));
}

#[tokio::test]
async fn test_get_volumes_all_namespaces() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(transport, flags());

    let out = run_command(&ctx, &["get", "volumes", "-A"]).await.unwrap();
    assert_eq!(out.lines().count(), 4);
    assert!(out.contains("prod"));
}

#[tokio::test]
async fn test_get_missing_volume() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(transport, flags());

    assert_matches!(
        run_command(&ctx, &["get", "volume", "nope"]).await,
        Err(Error::NotFound { kind: ResourceKind::Volume, .. })
    );
}

#[tokio::test]
async fn test_get_nodes_json() {
    let transport = MockTransport::new(cluster_state());
    let ctx = common::context(
        transport,
        GlobalFlags {
            output: Some("json".into()),
            ..flags()
        },
    )
    .unwrap();

    let out = run_command(&ctx, &["get", "nodes", "beta", "alpha"])
        .await
        .unwrap();
    let nodes: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(nodes[0]["name"], "beta");
    assert_eq!(nodes[1]["name"], "alpha");
}

#[tokio::test]
async fn test_get_nodes_by_selector() {
    let mut state = cluster_state();
    state.nodes[1].labels.insert("tier".into(), "gold".into());
    let transport = MockTransport::new(state);
    let ctx = text_context(transport, flags());

    let out = run_command(&ctx, &["get", "nodes", "-l", "tier=gold"])
        .await
        .unwrap();
    assert_eq!(out.lines().count(), 2);
    assert!(out.contains("beta"));
    assert!(!out.contains("alpha"));
}

#[tokio::test]
async fn test_target_and_selector_conflict() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(transport.clone(), flags());

    assert_matches!(
        run_command(&ctx, &["get", "nodes", "alpha", "-l", "tier=gold"]).await,
        Err(Error::TargetOrSelector)
    );
    assert_eq!(transport.state.lock().logins, 0);
}

#[tokio::test]
async fn test_get_users_joins_group_names() {
    let mut state = cluster_state();
    state.users[0].groups = vec![PolicyGroupId::from("pg-2"), PolicyGroupId::from("pg-x")];
    let transport = MockTransport::new(state);
    let ctx = text_context(transport, flags());

    let out = run_command(&ctx, &["get", "user", "alice"]).await.unwrap();
    assert!(out.contains("ops,unknown"));
}

#[tokio::test]
async fn test_describe_node_lists_hosted_volumes() {
    let mut state = cluster_state();
    state.volumes[2].master = Some(kubectl_storageos::domain::volume::Deployment {
        node: NodeId::from("node-2"),
        ..Default::default()
    });
    let transport = MockTransport::new(state);
    let ctx = common::context(
        transport,
        GlobalFlags {
            output: Some("json".into()),
            ..flags()
        },
    )
    .unwrap();

    let out = run_command(&ctx, &["describe", "node", "beta"]).await.unwrap();
    let node: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(node["name"], "beta");
    assert_eq!(node["hostedVolumes"][0]["id"], "vol-3");
    assert_eq!(node["hostedVolumes"][0]["namespaceName"], "prod");
    assert_eq!(node["hostedVolumes"][0]["role"], "master");
}

// =============================================================================
// Mutations
// =============================================================================

#[tokio::test]
async fn test_delete_volume_by_name() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(transport.clone(), flags());

    let out = run_command(&ctx, &["delete", "volume", "logs"]).await.unwrap();
    assert_eq!(out, "deleted volume vol-2 from namespace ns-default\n");

    assert_eq!(
        transport.calls(),
        vec![Call::DeleteVolume(
            NamespaceId::from("ns-default"),
            VolumeId::from("vol-2"),
            DeleteVolumeParams::default(),
        )]
    );
}

#[tokio::test]
async fn test_delete_volume_with_cas_async_and_offline() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(
        transport.clone(),
        GlobalFlags {
            timeout: Some("30s".into()),
            ..flags()
        },
    );

    let out = run_command(
        &ctx,
        &["delete", "volume", "data", "--cas", "v7", "--async", "--offline-delete"],
    )
    .await
    .unwrap();
    assert_eq!(out.trim_end(), ASYNC_REQUEST_MESSAGE);

    let expected = DeleteVolumeParams {
        request: RequestParams::new()
            .with_cas(Version::from("v7"))
            .with_async(Duration::from_secs(30)),
        offline_delete: true,
    };
    assert_eq!(
        transport.calls(),
        vec![Call::DeleteVolume(
            NamespaceId::from("ns-default"),
            VolumeId::from("vol-1"),
            expected,
        )]
    );
}

#[tokio::test]
async fn test_use_ids_skips_lookups() {
    let transport = MockTransport::new(MockState::default());
    let ctx = text_context(transport.clone(), ids_in("ns-raw"));

    let out = run_command(&ctx, &["delete", "volume", "vol-raw"]).await.unwrap();
    assert_eq!(out, "deleted volume vol-raw from namespace ns-raw\n");
    assert_eq!(transport.state.lock().list_calls, 0);
}

#[tokio::test]
async fn test_use_ids_requires_namespace_id() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(
        transport.clone(),
        GlobalFlags {
            use_ids: Some(true),
            ..flags()
        },
    );

    assert_matches!(
        run_command(&ctx, &["delete", "volume", "vol-1"]).await,
        Err(Error::NamespaceIdRequired)
    );
    assert!(transport.calls().is_empty());
}

#[tokio::test]
async fn test_empty_namespace_rejected() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(
        transport,
        GlobalFlags {
            namespace: Some(String::new()),
            ..flags()
        },
    );

    assert_matches!(
        run_command(&ctx, &["detach", "data"]).await,
        Err(Error::NoNamespace)
    );
}

#[tokio::test]
async fn test_delete_user_and_policy_group() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(transport.clone(), flags());

    let out = run_command(&ctx, &["delete", "user", "bob"]).await.unwrap();
    assert_eq!(out, "deleted user user-2\n");

    let out = run_command(&ctx, &["delete", "policy-group", "devs", "--cas", "v3"])
        .await
        .unwrap();
    assert_eq!(out, "deleted policy group pg-1\n");

    assert_eq!(
        transport.calls(),
        vec![
            Call::DeleteUser(UserId::from("user-2"), RequestParams::new()),
            Call::DeletePolicyGroup(
                PolicyGroupId::from("pg-1"),
                RequestParams::new().with_cas(Version::from("v3")),
            ),
        ]
    );
}

#[tokio::test]
async fn test_create_volume() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(
        transport.clone(),
        GlobalFlags {
            namespace: Some("prod".into()),
            ..flags()
        },
    );

    let out = run_command(
        &ctx,
        &["create", "volume", "cache", "--size", "10GiB", "--replicas", "1"],
    )
    .await
    .unwrap();
    assert!(out.contains("cache"));
    assert!(out.contains("10 GiB"));

    match &transport.calls()[0] {
        Call::CreateVolume(ns, req, params) => {
            assert_eq!(ns, &NamespaceId::from("ns-prod"));
            assert_eq!(req.size_bytes, 10 << 30);
            assert_eq!(req.labels[LABEL_REPLICAS], "1");
            assert!(!params.is_async());
        }
        other => panic!("unexpected call: {:?}", other),
    }
}

#[tokio::test]
async fn test_create_volume_async_accepted() {
    let mut state = cluster_state();
    state.accept_async = true;
    let transport = MockTransport::new(state);
    let ctx = text_context(transport, flags());

    let out = run_command(&ctx, &["create", "volume", "scratch", "--async"])
        .await
        .unwrap();
    assert_eq!(out.trim_end(), ASYNC_REQUEST_MESSAGE);
}

#[tokio::test]
async fn test_create_user_resolves_groups() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(transport.clone(), flags());

    run_command(
        &ctx,
        &["create", "user", "carol", "--password", "pw", "--groups", "ops,devs"],
    )
    .await
    .unwrap();

    match &transport.calls()[0] {
        Call::CreateUser(req) => {
            assert_eq!(req.username, "carol");
            assert_eq!(
                req.groups,
                vec![PolicyGroupId::from("pg-2"), PolicyGroupId::from("pg-1")]
            );
        }
        other => panic!("unexpected call: {:?}", other),
    }
}

#[tokio::test]
async fn test_create_existing_user() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(transport, flags());

    assert_matches!(
        run_command(&ctx, &["create", "user", "alice", "--password", "pw"]).await,
        Err(Error::AlreadyExists { kind: ResourceKind::User, .. })
    );
}

#[tokio::test]
async fn test_create_policy_group_resolves_rule_namespaces() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(transport.clone(), flags());

    run_command(
        &ctx,
        &["create", "policy-group", "readers", "--rule", "prod:volume:ro"],
    )
    .await
    .unwrap();

    match &transport.calls()[0] {
        Call::CreatePolicyGroup(req) => {
            assert_eq!(req.specs.len(), 1);
            assert_eq!(req.specs[0].namespace_id, NamespaceId::from("ns-prod"));
            assert!(req.specs[0].read_only);
        }
        other => panic!("unexpected call: {:?}", other),
    }
}

#[tokio::test]
async fn test_resize_volume() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(transport.clone(), flags());

    let out = run_command(&ctx, &["update", "volume", "size", "data", "42GiB"])
        .await
        .unwrap();
    assert!(out.contains("42 GiB"));
    assert_eq!(
        transport.calls(),
        vec![Call::Resize(
            VolumeId::from("vol-1"),
            42 << 30,
            RequestParams::new()
        )]
    );
}

#[tokio::test]
async fn test_async_resize_acknowledged_even_when_completed() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(transport.clone(), flags());

    let out = run_command(
        &ctx,
        &["update", "volume", "size", "data", "42GiB", "--async"],
    )
    .await
    .unwrap();
    assert_eq!(out.trim_end(), ASYNC_REQUEST_MESSAGE);

    let out = run_command(&ctx, &["create", "volume", "scratch", "--async"])
        .await
        .unwrap();
    assert_eq!(out.trim_end(), ASYNC_REQUEST_MESSAGE);
    assert_eq!(transport.calls().len(), 2);
}

#[tokio::test]
async fn test_set_replicas() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(transport, flags());

    let out = run_command(&ctx, &["update", "volume", "replicas", "logs", "2"])
        .await
        .unwrap();
    assert_eq!(
        out,
        "requested 2 replicas for volume vol-2 in namespace ns-default\n"
    );
}

#[tokio::test]
async fn test_attach_and_detach() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(transport.clone(), flags());

    let out = run_command(&ctx, &["attach", "logs", "beta"]).await.unwrap();
    assert_eq!(
        out,
        "attached volume vol-2 from namespace ns-default to node node-2\n"
    );

    let out = run_command(&ctx, &["detach", "logs"]).await.unwrap();
    assert_eq!(out, "detached volume vol-2 from namespace ns-default\n");

    assert_eq!(
        transport.calls(),
        vec![
            Call::Attach(
                NamespaceId::from("ns-default"),
                VolumeId::from("vol-2"),
                NodeId::from("node-2"),
            ),
            Call::Detach(
                NamespaceId::from("ns-default"),
                VolumeId::from("vol-2"),
                RequestParams::new(),
            ),
        ]
    );
}

#[tokio::test]
async fn test_update_cluster_keeps_unset_fields() {
    let mut state = cluster_state();
    state.cluster.log_format = "json".into();
    state.cluster.log_level = "info".into();
    let transport = MockTransport::new(state);
    let ctx = text_context(transport.clone(), flags());

    run_command(&ctx, &["update", "cluster", "--log-level", "debug"])
        .await
        .unwrap();

    match &transport.calls()[0] {
        Call::UpdateCluster(update, params) => {
            assert_eq!(update.log_level, "debug");
            assert_eq!(update.log_format, "json");
            assert!(params.ignore_version());
        }
        other => panic!("unexpected call: {:?}", other),
    }
}

#[tokio::test]
async fn test_apply_licence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("licence.key");
    std::fs::write(&path, "licence-key\n").unwrap();

    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(transport.clone(), flags());

    run_command(&ctx, &["apply", "licence", path.to_str().unwrap()])
        .await
        .unwrap();
    assert_eq!(
        transport.calls(),
        vec![Call::UpdateLicence("licence-key".into(), RequestParams::new())]
    );
}

#[tokio::test]
async fn test_version_needs_no_api() {
    let transport = MockTransport::new(MockState {
        reject_login: true,
        ..Default::default()
    });
    let ctx = text_context(transport, flags());

    let out = run_command(&ctx, &["version"]).await.unwrap();
    assert!(out.starts_with("StorageOS CLI version: "));
}

#[tokio::test]
async fn test_rejected_credentials_abort_command() {
    let transport = MockTransport::new(MockState {
        reject_login: true,
        ..cluster_state()
    });
    let ctx = text_context(transport.clone(), flags());

    assert_matches!(
        run_command(&ctx, &["delete", "node", "alpha"]).await,
        Err(Error::Unauthorized)
    );
    assert!(transport.calls().is_empty());
}

// =============================================================================
// nfs
// =============================================================================

#[tokio::test]
async fn test_nfs_attach() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(transport.clone(), flags());

    let out = run_command(&ctx, &["nfs", "attach", "logs"]).await.unwrap();
    assert_eq!(
        out,
        "attached volume vol-2 from namespace ns-default for nfs\n"
    );
    assert_eq!(
        transport.calls(),
        vec![Call::AttachNfs(
            NamespaceId::from("ns-default"),
            VolumeId::from("vol-2"),
            RequestParams::new(),
        )]
    );
}

#[tokio::test]
async fn test_nfs_attach_with_cas_and_async() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(
        transport.clone(),
        GlobalFlags {
            timeout: Some("30s".into()),
            ..flags()
        },
    );

    let out = run_command(&ctx, &["nfs", "attach", "data", "--cas", "v3", "--async"])
        .await
        .unwrap();
    assert_eq!(out.trim_end(), ASYNC_REQUEST_MESSAGE);
    assert_eq!(
        transport.calls(),
        vec![Call::AttachNfs(
            NamespaceId::from("ns-default"),
            VolumeId::from("vol-1"),
            RequestParams::new()
                .with_cas(Version::from("v3"))
                .with_async(Duration::from_secs(30)),
        )]
    );
}

#[tokio::test]
async fn test_nfs_set_endpoint() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(
        transport.clone(),
        GlobalFlags {
            namespace: Some("prod".into()),
            ..flags()
        },
    );

    let out = run_command(
        &ctx,
        &["nfs", "set-endpoint", "data", "10.0.0.5:2049", "--cas", "v9"],
    )
    .await
    .unwrap();
    assert_eq!(
        out,
        "set nfs mount endpoint of volume vol-3 in namespace ns-prod to 10.0.0.5:2049\n"
    );
    assert_eq!(
        transport.calls(),
        vec![Call::UpdateNfsEndpoint(
            VolumeId::from("vol-3"),
            "10.0.0.5:2049".into(),
            RequestParams::new().with_cas(Version::from("v9")),
        )]
    );
}

#[tokio::test]
async fn test_nfs_empty_endpoint_rejected() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(transport.clone(), flags());

    assert_matches!(
        run_command(&ctx, &["nfs", "set-endpoint", "data", " "]).await,
        Err(Error::Argument(_))
    );
    assert_eq!(transport.state.lock().logins, 0);
}

#[tokio::test]
async fn test_nfs_set_exports_json() {
    let transport = MockTransport::new(cluster_state());
    let ctx = common::context(
        transport.clone(),
        GlobalFlags {
            output: Some("json".into()),
            ..flags()
        },
    )
    .unwrap();

    let exports = r#"[{"exportID": 1, "path": "/", "pseudoPath": "/logs", "acls": []}]"#;
    let out = run_command(&ctx, &["nfs", "set-exports", "logs", exports])
        .await
        .unwrap();

    let update: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(update["id"], "vol-2");
    assert_eq!(update["namespaceID"], "ns-default");
    assert_eq!(update["exports"][0]["exportID"], 1);
    assert_eq!(update["exports"][0]["pseudoPath"], "/logs");

    match &transport.calls()[0] {
        Call::UpdateNfsExports(id, sent, params) => {
            assert_eq!(id, &VolumeId::from("vol-2"));
            assert_eq!(sent.len(), 1);
            assert_eq!(sent[0].path, "/");
            assert!(params.ignore_version());
        }
        other => panic!("unexpected call: {:?}", other),
    }
}

#[tokio::test]
async fn test_nfs_invalid_exports_rejected() {
    let transport = MockTransport::new(cluster_state());
    let ctx = text_context(transport.clone(), flags());

    assert_matches!(
        run_command(&ctx, &["nfs", "set-exports", "logs", "not-json"]).await,
        Err(Error::Argument(_))
    );
    assert!(transport.calls().is_empty());
}
