//! In-memory transport and fixtures shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use kubectl_storageos::client::{DeleteVolumeParams, RequestParams};
use kubectl_storageos::cmd::CommandContext;
use kubectl_storageos::config::{ConfigProvider, Defaults, FlagProvider, GlobalFlags};
use kubectl_storageos::domain::ports::{
    ClusterUpdate, Completion, CreateNamespace, CreatePolicyGroup, CreateUser, CreateVolume,
    Transport,
};
use kubectl_storageos::domain::resources::{AuthSession, Labels};
use kubectl_storageos::domain::volume::NfsExport;
use kubectl_storageos::error::ResourceKind;
use kubectl_storageos::output::text::TextDisplayer;
use kubectl_storageos::output::Displayer;
use kubectl_storageos::{
    Client, Cluster, Error, Licence, Namespace, NamespaceId, Node, NodeId, PolicyGroup,
    PolicyGroupId, Result, User, UserId, Version, Volume, VolumeId,
};
use parking_lot::Mutex;
use std::sync::Arc;

// =============================================================================
// Mock Transport
// =============================================================================

/// A mutation the mock received
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    UpdateCluster(ClusterUpdate, RequestParams),
    UpdateLicence(String, RequestParams),
    DeleteNode(NodeId, RequestParams),
    CreateNamespace(CreateNamespace),
    DeleteNamespace(NamespaceId, RequestParams),
    CreateVolume(NamespaceId, CreateVolume, RequestParams),
    UpdateDescription(VolumeId, String, RequestParams),
    UpdateLabels(VolumeId, Labels, RequestParams),
    Resize(VolumeId, u64, RequestParams),
    SetReplicas(VolumeId, u64, RequestParams),
    Attach(NamespaceId, VolumeId, NodeId),
    Detach(NamespaceId, VolumeId, RequestParams),
    DeleteVolume(NamespaceId, VolumeId, DeleteVolumeParams),
    AttachNfs(NamespaceId, VolumeId, RequestParams),
    UpdateNfsExports(VolumeId, Vec<NfsExport>, RequestParams),
    UpdateNfsEndpoint(VolumeId, String, RequestParams),
    CreateUser(CreateUser),
    DeleteUser(UserId, RequestParams),
    CreatePolicyGroup(CreatePolicyGroup),
    DeletePolicyGroup(PolicyGroupId, RequestParams),
}

#[derive(Debug, Default)]
pub struct MockState {
    pub nodes: Vec<Node>,
    pub namespaces: Vec<Namespace>,
    pub volumes: Vec<Volume>,
    pub users: Vec<User>,
    pub groups: Vec<PolicyGroup>,
    pub cluster: Cluster,
    pub licence: Licence,

    /// Successful logins performed
    pub logins: usize,
    /// Session handed to `resume_session`
    pub resumed: Option<String>,
    /// Token presented with requests, from login or a resumed session
    pub active_token: Option<String>,
    /// Tokens the server no longer accepts
    pub revoked: Vec<String>,
    /// Reject every login
    pub reject_login: bool,
    /// Answer long-running mutations as accepted for async completion
    pub accept_async: bool,
    /// Number of full-collection list calls
    pub list_calls: usize,

    pub calls: Vec<Call>,
}

#[derive(Debug, Default)]
pub struct MockTransport {
    pub state: Mutex<MockState>,
}

impl MockTransport {
    pub fn new(state: MockState) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(state),
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().calls.clone()
    }

    fn record(&self, call: Call) {
        self.state.lock().calls.push(call);
    }
}

impl MockState {
    fn check_token(&self) -> Result<()> {
        match &self.active_token {
            Some(token) if self.revoked.contains(token) => Err(Error::Unauthorized),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn authenticate(&self, username: &str, _password: &str) -> Result<AuthSession> {
        let mut state = self.state.lock();
        if state.reject_login {
            return Err(Error::Unauthorized);
        }
        state.logins += 1;
        let token = format!("token-{}-{}", username, state.logins);
        state.active_token = Some(token.clone());
        Ok(AuthSession {
            token,
            expires_at: Utc::now() + Duration::hours(1),
        })
    }

    fn resume_session(&self, session: &AuthSession) {
        let mut state = self.state.lock();
        state.resumed = Some(session.token.clone());
        state.active_token = Some(session.token.clone());
    }

    async fn get_cluster(&self) -> Result<Cluster> {
        let state = self.state.lock();
        state.check_token()?;
        Ok(state.cluster.clone())
    }

    async fn update_cluster(&self, update: &ClusterUpdate, params: &RequestParams) -> Result<Cluster> {
        self.record(Call::UpdateCluster(update.clone(), params.clone()));
        let mut state = self.state.lock();
        state.cluster.log_level = update.log_level.clone();
        state.cluster.log_format = update.log_format.clone();
        state.cluster.disable_telemetry = update.disable_telemetry;
        state.cluster.disable_crash_reporting = update.disable_crash_reporting;
        state.cluster.disable_version_check = update.disable_version_check;
        Ok(state.cluster.clone())
    }

    async fn get_licence(&self) -> Result<Licence> {
        Ok(self.state.lock().licence.clone())
    }

    async fn update_licence(&self, key: &str, params: &RequestParams) -> Result<Licence> {
        self.record(Call::UpdateLicence(key.to_string(), params.clone()));
        Ok(self.state.lock().licence.clone())
    }

    async fn get_node(&self, id: &NodeId) -> Result<Node> {
        self.state
            .lock()
            .nodes
            .iter()
            .find(|n| &n.id == id)
            .cloned()
            .ok_or_else(|| Error::id_not_found(ResourceKind::Node, id))
    }

    async fn list_nodes(&self) -> Result<Vec<Node>> {
        let mut state = self.state.lock();
        state.check_token()?;
        state.list_calls += 1;
        Ok(state.nodes.clone())
    }

    async fn delete_node(&self, id: &NodeId, params: &RequestParams) -> Result<()> {
        self.record(Call::DeleteNode(id.clone(), params.clone()));
        Ok(())
    }

    async fn get_namespace(&self, id: &NamespaceId) -> Result<Namespace> {
        self.state
            .lock()
            .namespaces
            .iter()
            .find(|ns| &ns.id == id)
            .cloned()
            .ok_or_else(|| Error::id_not_found(ResourceKind::Namespace, id))
    }

    async fn list_namespaces(&self) -> Result<Vec<Namespace>> {
        let mut state = self.state.lock();
        state.check_token()?;
        state.list_calls += 1;
        Ok(state.namespaces.clone())
    }

    async fn create_namespace(&self, create: &CreateNamespace) -> Result<Namespace> {
        self.record(Call::CreateNamespace(create.clone()));
        Ok(Namespace {
            id: NamespaceId::from(format!("ns-{}", create.name)),
            name: create.name.clone(),
            labels: create.labels.clone(),
            ..Default::default()
        })
    }

    async fn delete_namespace(&self, id: &NamespaceId, params: &RequestParams) -> Result<()> {
        self.record(Call::DeleteNamespace(id.clone(), params.clone()));
        Ok(())
    }

    async fn get_volume(&self, ns: &NamespaceId, id: &VolumeId) -> Result<Volume> {
        self.state
            .lock()
            .volumes
            .iter()
            .find(|v| &v.namespace == ns && &v.id == id)
            .cloned()
            .ok_or_else(|| Error::id_not_found(ResourceKind::Volume, id))
    }

    async fn list_volumes(&self, ns: &NamespaceId) -> Result<Vec<Volume>> {
        let mut state = self.state.lock();
        state.check_token()?;
        state.list_calls += 1;
        Ok(state
            .volumes
            .iter()
            .filter(|v| &v.namespace == ns)
            .cloned()
            .collect())
    }

    async fn create_volume(
        &self,
        ns: &NamespaceId,
        create: &CreateVolume,
        params: &RequestParams,
    ) -> Result<Completion<Volume>> {
        self.record(Call::CreateVolume(ns.clone(), create.clone(), params.clone()));
        let accept = self.state.lock().accept_async;
        if accept && params.is_async() {
            return Ok(Completion::Accepted);
        }
        Ok(Completion::Done(Volume {
            id: VolumeId::from(format!("vol-{}", create.name)),
            name: create.name.clone(),
            description: create.description.clone(),
            namespace: ns.clone(),
            labels: create.labels.clone(),
            filesystem: create.filesystem.clone(),
            size_bytes: create.size_bytes,
            ..Default::default()
        }))
    }

    async fn update_volume_description(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        description: &str,
        params: &RequestParams,
    ) -> Result<Volume> {
        self.record(Call::UpdateDescription(
            id.clone(),
            description.to_string(),
            params.clone(),
        ));
        let mut vol = self.get_volume(ns, id).await?;
        vol.description = description.to_string();
        Ok(vol)
    }

    async fn update_volume_labels(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        labels: &Labels,
        params: &RequestParams,
    ) -> Result<Volume> {
        self.record(Call::UpdateLabels(id.clone(), labels.clone(), params.clone()));
        let mut vol = self.get_volume(ns, id).await?;
        vol.labels = labels.clone();
        Ok(vol)
    }

    async fn resize_volume(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        size_bytes: u64,
        params: &RequestParams,
    ) -> Result<Completion<Volume>> {
        self.record(Call::Resize(id.clone(), size_bytes, params.clone()));
        let accept = self.state.lock().accept_async;
        if accept && params.is_async() {
            return Ok(Completion::Accepted);
        }
        let mut vol = self.get_volume(ns, id).await?;
        vol.size_bytes = size_bytes;
        Ok(Completion::Done(vol))
    }

    async fn set_replicas(
        &self,
        _ns: &NamespaceId,
        id: &VolumeId,
        replicas: u64,
        params: &RequestParams,
    ) -> Result<()> {
        self.record(Call::SetReplicas(id.clone(), replicas, params.clone()));
        Ok(())
    }

    async fn attach_volume(&self, ns: &NamespaceId, id: &VolumeId, node: &NodeId) -> Result<()> {
        self.record(Call::Attach(ns.clone(), id.clone(), node.clone()));
        Ok(())
    }

    async fn detach_volume(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        params: &RequestParams,
    ) -> Result<()> {
        self.record(Call::Detach(ns.clone(), id.clone(), params.clone()));
        Ok(())
    }

    async fn delete_volume(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        params: &DeleteVolumeParams,
    ) -> Result<()> {
        self.record(Call::DeleteVolume(ns.clone(), id.clone(), params.clone()));
        Ok(())
    }

    async fn attach_nfs_volume(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        params: &RequestParams,
    ) -> Result<()> {
        self.record(Call::AttachNfs(ns.clone(), id.clone(), params.clone()));
        Ok(())
    }

    async fn update_nfs_volume_exports(
        &self,
        _ns: &NamespaceId,
        id: &VolumeId,
        exports: &[NfsExport],
        params: &RequestParams,
    ) -> Result<()> {
        self.record(Call::UpdateNfsExports(
            id.clone(),
            exports.to_vec(),
            params.clone(),
        ));
        Ok(())
    }

    async fn update_nfs_volume_mount_endpoint(
        &self,
        _ns: &NamespaceId,
        id: &VolumeId,
        endpoint: &str,
        params: &RequestParams,
    ) -> Result<()> {
        self.record(Call::UpdateNfsEndpoint(
            id.clone(),
            endpoint.to_string(),
            params.clone(),
        ));
        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> Result<User> {
        self.state
            .lock()
            .users
            .iter()
            .find(|u| &u.id == id)
            .cloned()
            .ok_or_else(|| Error::id_not_found(ResourceKind::User, id))
    }

    async fn list_users(&self) -> Result<Vec<User>> {
        let mut state = self.state.lock();
        state.check_token()?;
        state.list_calls += 1;
        Ok(state.users.clone())
    }

    async fn create_user(&self, create: &CreateUser) -> Result<User> {
        self.record(Call::CreateUser(create.clone()));
        let taken = self
            .state
            .lock()
            .users
            .iter()
            .any(|u| u.username == create.username);
        if taken {
            return Err(Error::AlreadyExists {
                kind: ResourceKind::User,
                name: create.username.clone(),
            });
        }
        Ok(User {
            id: UserId::from(format!("user-{}", create.username)),
            username: create.username.clone(),
            is_admin: create.is_admin,
            groups: create.groups.clone(),
            ..Default::default()
        })
    }

    async fn delete_user(&self, id: &UserId, params: &RequestParams) -> Result<()> {
        self.record(Call::DeleteUser(id.clone(), params.clone()));
        Ok(())
    }

    async fn get_policy_group(&self, id: &PolicyGroupId) -> Result<PolicyGroup> {
        self.state
            .lock()
            .groups
            .iter()
            .find(|g| &g.id == id)
            .cloned()
            .ok_or_else(|| Error::id_not_found(ResourceKind::PolicyGroup, id))
    }

    async fn list_policy_groups(&self) -> Result<Vec<PolicyGroup>> {
        let mut state = self.state.lock();
        state.check_token()?;
        state.list_calls += 1;
        Ok(state.groups.clone())
    }

    async fn create_policy_group(&self, create: &CreatePolicyGroup) -> Result<PolicyGroup> {
        self.record(Call::CreatePolicyGroup(create.clone()));
        Ok(PolicyGroup {
            id: PolicyGroupId::from(format!("pg-{}", create.name)),
            name: create.name.clone(),
            specs: create.specs.clone(),
            ..Default::default()
        })
    }

    async fn delete_policy_group(&self, id: &PolicyGroupId, params: &RequestParams) -> Result<()> {
        self.record(Call::DeletePolicyGroup(id.clone(), params.clone()));
        Ok(())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

pub fn epoch() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
}

pub fn node(id: &str, name: &str) -> Node {
    Node {
        id: NodeId::from(id),
        name: name.into(),
        created_at: epoch(),
        updated_at: epoch(),
        version: Version::from("v1"),
        ..Default::default()
    }
}

pub fn namespace(id: &str, name: &str) -> Namespace {
    Namespace {
        id: NamespaceId::from(id),
        name: name.into(),
        created_at: epoch(),
        updated_at: epoch(),
        version: Version::from("v1"),
        ..Default::default()
    }
}

pub fn volume(id: &str, name: &str, ns: &str) -> Volume {
    Volume {
        id: VolumeId::from(id),
        name: name.into(),
        namespace: NamespaceId::from(ns),
        filesystem: "ext4".into(),
        size_bytes: 5 << 30,
        created_at: epoch(),
        updated_at: epoch(),
        version: Version::from("v1"),
        ..Default::default()
    }
}

pub fn user(id: &str, username: &str) -> User {
    User {
        id: UserId::from(id),
        username: username.into(),
        created_at: epoch(),
        updated_at: epoch(),
        ..Default::default()
    }
}

pub fn policy_group(id: &str, name: &str) -> PolicyGroup {
    PolicyGroup {
        id: PolicyGroupId::from(id),
        name: name.into(),
        created_at: epoch(),
        updated_at: epoch(),
        ..Default::default()
    }
}

/// A small cluster: two nodes, two namespaces, a few volumes
pub fn cluster_state() -> MockState {
    let mut attached = volume("vol-1", "data", "ns-default");
    attached.attached_on = NodeId::from("node-1");

    MockState {
        nodes: vec![node("node-1", "alpha"), node("node-2", "beta")],
        namespaces: vec![
            namespace("ns-default", "default"),
            namespace("ns-prod", "prod"),
        ],
        volumes: vec![
            attached,
            volume("vol-2", "logs", "ns-default"),
            volume("vol-3", "data", "ns-prod"),
        ],
        users: vec![user("user-1", "alice"), user("user-2", "bob")],
        groups: vec![policy_group("pg-1", "devs"), policy_group("pg-2", "ops")],
        ..Default::default()
    }
}

// =============================================================================
// Command Harness
// =============================================================================

/// Flags with the session cache disabled, so no test touches the home dir
pub fn flags() -> GlobalFlags {
    GlobalFlags {
        no_auth_cache: Some(true),
        ..Default::default()
    }
}

pub fn config(flags: GlobalFlags) -> Box<dyn ConfigProvider> {
    Box::new(FlagProvider::new(flags, Box::new(Defaults::new())))
}

pub fn text_context(transport: Arc<MockTransport>, flags: GlobalFlags) -> CommandContext {
    let display: Box<dyn Displayer> = Box::new(TextDisplayer::with_now(epoch()));
    CommandContext::with_displayer(config(flags), Client::new(transport), display)
}

pub fn context(transport: Arc<MockTransport>, flags: GlobalFlags) -> Result<CommandContext> {
    CommandContext::new(config(flags), Client::new(transport))
}

/// Parse and run a command line, returning what it wrote
pub async fn run_command(ctx: &CommandContext, line: &[&str]) -> Result<String> {
    use clap::Parser;
    use kubectl_storageos::cmd::{execute, Cli};

    let mut argv = vec!["kubectl-storageos"];
    argv.extend_from_slice(line);
    let cli = Cli::try_parse_from(argv).map_err(|e| Error::Argument(e.to_string()))?;

    let mut out = Vec::new();
    execute(cli.command, ctx, &mut out).await?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}
