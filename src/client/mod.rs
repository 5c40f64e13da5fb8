//! API client
//!
//! [`Client`] sits between the commands and a [`Transport`]. It owns the
//! authentication flow (including the optional session cache) and layers
//! name resolution over the transport's raw collection calls. Nothing is
//! cached between calls: every lookup refetches the full collection.
//!
//! A cached session can be revoked server side before it expires. The
//! first call rejected as unauthorized under a cached session logs in again
//! with the original credentials and is retried once.

pub mod params;
pub mod resolve;

pub use params::{DeleteVolumeParams, RequestParams};

use crate::domain::ids::{NamespaceId, NodeId, PolicyGroupId, UserId, VolumeId};
use crate::domain::ports::{
    ClusterUpdate, Completion, CreateNamespace, CreatePolicyGroup, CreateUser, CreateVolume,
    TransportRef,
};
use crate::domain::resources::{
    AuthSession, Cluster, Labels, Licence, Namespace, Node, PolicyGroup, User,
};
use crate::domain::volume::{NfsExport, Volume};
use crate::error::{Error, Result};
use crate::transport::session_cache::SessionCache;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Seconds of remaining validity a cached session needs to be reused
pub const SESSION_LEEWAY_SECS: i64 = 5;

/// Username and password presented on login
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Login to fall back on when a resumed session is rejected
#[derive(Debug, Clone)]
struct Reauth {
    creds: Credentials,
    cache: Option<SessionCache>,
}

/// Resolver-aware wrapper around a [`Transport`](crate::domain::ports::Transport)
#[derive(Clone)]
pub struct Client {
    transport: TransportRef,
    reauth: Arc<Mutex<Option<Reauth>>>,
}

impl Client {
    pub fn new(transport: TransportRef) -> Self {
        Self {
            transport,
            reauth: Arc::new(Mutex::new(None)),
        }
    }

    pub fn transport(&self) -> &TransportRef {
        &self.transport
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Authenticate the transport, reusing a cached session when one is
    /// still valid and storing fresh sessions back into the cache.
    pub async fn authenticate(
        &self,
        creds: &Credentials,
        cache: Option<&SessionCache>,
    ) -> Result<AuthSession> {
        let leeway = chrono::Duration::seconds(SESSION_LEEWAY_SECS);

        if let Some(cache) = cache {
            match cache.get(&creds.username) {
                Ok(Some(session)) if session.is_valid_at(Utc::now(), leeway) => {
                    debug!(username = %creds.username, "reusing cached session");
                    self.transport.resume_session(&session);
                    *self.reauth.lock() = Some(Reauth {
                        creds: creds.clone(),
                        cache: Some(cache.clone()),
                    });
                    return Ok(session);
                }
                Ok(Some(_)) => debug!(username = %creds.username, "cached session expired"),
                Ok(None) => {}
                Err(e) => warn!(error = %e, "cannot read session cache"),
            }
        }

        *self.reauth.lock() = None;
        self.login(creds, cache).await
    }

    async fn login(
        &self,
        creds: &Credentials,
        cache: Option<&SessionCache>,
    ) -> Result<AuthSession> {
        let session = self
            .transport
            .authenticate(&creds.username, &creds.password)
            .await?;
        info!(username = %creds.username, expires_at = %session.expires_at, "authenticated");

        if let Some(cache) = cache {
            if let Err(e) = cache.put(&creds.username, &session) {
                warn!(path = %cache.path().display(), error = %e, "cannot store session");
            }
        }

        Ok(session)
    }

    /// Run `op`, logging in again and retrying once when the server rejects
    /// a resumed session.
    async fn call<T, F, Fut>(&self, op: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match op().await {
            Err(Error::Unauthorized) => {
                let pending = self.reauth.lock().take();
                match pending {
                    Some(reauth) => {
                        warn!(
                            username = %reauth.creds.username,
                            "cached session rejected, logging in again"
                        );
                        self.login(&reauth.creds, reauth.cache.as_ref()).await?;
                        op().await
                    }
                    None => Err(Error::Unauthorized),
                }
            }
            result => result,
        }
    }

    // =========================================================================
    // Cluster
    // =========================================================================

    pub async fn get_cluster(&self) -> Result<Cluster> {
        self.call(|| self.transport.get_cluster()).await
    }

    pub async fn update_cluster(
        &self,
        update: &ClusterUpdate,
        params: &RequestParams,
    ) -> Result<Cluster> {
        self.call(|| self.transport.update_cluster(update, params)).await
    }

    pub async fn get_licence(&self) -> Result<Licence> {
        self.call(|| self.transport.get_licence()).await
    }

    pub async fn update_licence(&self, key: &str, params: &RequestParams) -> Result<Licence> {
        self.call(|| self.transport.update_licence(key, params)).await
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    pub async fn get_node(&self, id: &NodeId) -> Result<Node> {
        self.call(|| self.transport.get_node(id)).await
    }

    pub async fn list_nodes(&self) -> Result<Vec<Node>> {
        self.call(|| self.transport.list_nodes()).await
    }

    pub async fn get_node_by_name(&self, name: &str) -> Result<Node> {
        let nodes = self.call(|| self.transport.list_nodes()).await?;
        resolve::find_by_name(nodes, name)
    }

    pub async fn get_list_nodes_by_name<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<Node>> {
        let nodes = self.call(|| self.transport.list_nodes()).await?;
        resolve::filter_by_names(nodes, names)
    }

    pub async fn get_list_nodes_by_uid(&self, ids: &[NodeId]) -> Result<Vec<Node>> {
        let nodes = self.call(|| self.transport.list_nodes()).await?;
        resolve::filter_by_ids(nodes, ids)
    }

    /// Every node keyed by ID, for joining node names into other output
    pub async fn node_index(&self) -> Result<HashMap<NodeId, Node>> {
        let nodes = self.call(|| self.transport.list_nodes()).await?;
        Ok(nodes.into_iter().map(|n| (n.id.clone(), n)).collect())
    }

    pub async fn delete_node(&self, id: &NodeId, params: &RequestParams) -> Result<()> {
        self.call(|| self.transport.delete_node(id, params)).await
    }

    // =========================================================================
    // Namespaces
    // =========================================================================

    pub async fn get_namespace(&self, id: &NamespaceId) -> Result<Namespace> {
        self.call(|| self.transport.get_namespace(id)).await
    }

    pub async fn list_namespaces(&self) -> Result<Vec<Namespace>> {
        self.call(|| self.transport.list_namespaces()).await
    }

    /// Every namespace keyed by ID
    pub async fn namespace_index(&self) -> Result<HashMap<NamespaceId, Namespace>> {
        let namespaces = self.call(|| self.transport.list_namespaces()).await?;
        Ok(namespaces.into_iter().map(|ns| (ns.id.clone(), ns)).collect())
    }

    pub async fn get_namespace_by_name(&self, name: &str) -> Result<Namespace> {
        let namespaces = self.call(|| self.transport.list_namespaces()).await?;
        resolve::find_by_name(namespaces, name)
    }

    pub async fn get_list_namespaces_by_name<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<Namespace>> {
        let namespaces = self.call(|| self.transport.list_namespaces()).await?;
        resolve::filter_by_names(namespaces, names)
    }

    pub async fn get_list_namespaces_by_uid(&self, ids: &[NamespaceId]) -> Result<Vec<Namespace>> {
        let namespaces = self.call(|| self.transport.list_namespaces()).await?;
        resolve::filter_by_ids(namespaces, ids)
    }

    pub async fn create_namespace(&self, req: &CreateNamespace) -> Result<Namespace> {
        self.call(|| self.transport.create_namespace(req)).await
    }

    pub async fn delete_namespace(&self, id: &NamespaceId, params: &RequestParams) -> Result<()> {
        self.call(|| self.transport.delete_namespace(id, params)).await
    }

    // =========================================================================
    // Volumes
    // =========================================================================

    pub async fn get_volume(&self, ns: &NamespaceId, id: &VolumeId) -> Result<Volume> {
        self.call(|| self.transport.get_volume(ns, id)).await
    }

    pub async fn list_volumes(&self, ns: &NamespaceId) -> Result<Vec<Volume>> {
        self.call(|| self.transport.list_volumes(ns)).await
    }

    pub async fn get_volume_by_name(&self, ns: &NamespaceId, name: &str) -> Result<Volume> {
        let volumes = self.call(|| self.transport.list_volumes(ns)).await?;
        resolve::find_by_name(volumes, name)
    }

    pub async fn get_list_volumes_by_name<S: AsRef<str>>(
        &self,
        ns: &NamespaceId,
        names: &[S],
    ) -> Result<Vec<Volume>> {
        let volumes = self.call(|| self.transport.list_volumes(ns)).await?;
        resolve::filter_by_names(volumes, names)
    }

    pub async fn get_list_volumes_by_uid(
        &self,
        ns: &NamespaceId,
        ids: &[VolumeId],
    ) -> Result<Vec<Volume>> {
        let volumes = self.call(|| self.transport.list_volumes(ns)).await?;
        resolve::filter_by_ids(volumes, ids)
    }

    /// Volumes across every namespace, in namespace order
    pub async fn get_all_volumes(&self) -> Result<Vec<Volume>> {
        let mut all = Vec::new();
        for ns in self.call(|| self.transport.list_namespaces()).await? {
            all.extend(self.call(|| self.transport.list_volumes(&ns.id)).await?);
        }
        Ok(all)
    }

    pub async fn create_volume(
        &self,
        ns: &NamespaceId,
        req: &CreateVolume,
        params: &RequestParams,
    ) -> Result<Completion<Volume>> {
        self.call(|| self.transport.create_volume(ns, req, params)).await
    }

    pub async fn update_volume_description(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        description: &str,
        params: &RequestParams,
    ) -> Result<Volume> {
        self.call(|| {
            self.transport
                .update_volume_description(ns, id, description, params)
        })
        .await
    }

    pub async fn update_volume_labels(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        labels: &Labels,
        params: &RequestParams,
    ) -> Result<Volume> {
        self.call(|| self.transport.update_volume_labels(ns, id, labels, params)).await
    }

    pub async fn resize_volume(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        size_bytes: u64,
        params: &RequestParams,
    ) -> Result<Completion<Volume>> {
        self.call(|| self.transport.resize_volume(ns, id, size_bytes, params)).await
    }

    pub async fn set_replicas(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        replicas: u64,
        params: &RequestParams,
    ) -> Result<()> {
        self.call(|| self.transport.set_replicas(ns, id, replicas, params)).await
    }

    pub async fn attach_volume(&self, ns: &NamespaceId, id: &VolumeId, node: &NodeId) -> Result<()> {
        self.call(|| self.transport.attach_volume(ns, id, node)).await
    }

    pub async fn detach_volume(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        params: &RequestParams,
    ) -> Result<()> {
        self.call(|| self.transport.detach_volume(ns, id, params)).await
    }

    pub async fn delete_volume(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        params: &DeleteVolumeParams,
    ) -> Result<()> {
        self.call(|| self.transport.delete_volume(ns, id, params)).await
    }

    // =========================================================================
    // NFS
    // =========================================================================

    pub async fn attach_nfs_volume(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        params: &RequestParams,
    ) -> Result<()> {
        self.call(|| self.transport.attach_nfs_volume(ns, id, params)).await
    }

    pub async fn update_nfs_volume_exports(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        exports: &[NfsExport],
        params: &RequestParams,
    ) -> Result<()> {
        self.call(|| {
            self.transport
                .update_nfs_volume_exports(ns, id, exports, params)
        })
        .await
    }

    pub async fn update_nfs_volume_mount_endpoint(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        endpoint: &str,
        params: &RequestParams,
    ) -> Result<()> {
        self.call(|| {
            self.transport
                .update_nfs_volume_mount_endpoint(ns, id, endpoint, params)
        })
        .await
    }

    // =========================================================================
    // Users
    // =========================================================================

    pub async fn get_user(&self, id: &UserId) -> Result<User> {
        self.call(|| self.transport.get_user(id)).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.call(|| self.transport.list_users()).await
    }

    pub async fn get_user_by_name(&self, username: &str) -> Result<User> {
        let users = self.call(|| self.transport.list_users()).await?;
        resolve::find_by_name(users, username)
    }

    pub async fn get_list_users_by_username<S: AsRef<str>>(
        &self,
        usernames: &[S],
    ) -> Result<Vec<User>> {
        let users = self.call(|| self.transport.list_users()).await?;
        resolve::filter_by_names(users, usernames)
    }

    pub async fn get_list_users_by_uid(&self, ids: &[UserId]) -> Result<Vec<User>> {
        let users = self.call(|| self.transport.list_users()).await?;
        resolve::filter_by_ids(users, ids)
    }

    pub async fn create_user(&self, req: &CreateUser) -> Result<User> {
        self.call(|| self.transport.create_user(req)).await
    }

    pub async fn delete_user(&self, id: &UserId, params: &RequestParams) -> Result<()> {
        self.call(|| self.transport.delete_user(id, params)).await
    }

    // =========================================================================
    // Policy Groups
    // =========================================================================

    pub async fn get_policy_group(&self, id: &PolicyGroupId) -> Result<PolicyGroup> {
        self.call(|| self.transport.get_policy_group(id)).await
    }

    pub async fn list_policy_groups(&self) -> Result<Vec<PolicyGroup>> {
        self.call(|| self.transport.list_policy_groups()).await
    }

    /// Every policy group keyed by ID, for joining group names into user output
    pub async fn policy_group_index(&self) -> Result<HashMap<PolicyGroupId, PolicyGroup>> {
        let groups = self.call(|| self.transport.list_policy_groups()).await?;
        Ok(groups.into_iter().map(|g| (g.id.clone(), g)).collect())
    }

    pub async fn get_policy_group_by_name(&self, name: &str) -> Result<PolicyGroup> {
        let groups = self.call(|| self.transport.list_policy_groups()).await?;
        resolve::find_by_name(groups, name)
    }

    pub async fn get_list_policy_groups_by_name<S: AsRef<str>>(
        &self,
        names: &[S],
    ) -> Result<Vec<PolicyGroup>> {
        let groups = self.call(|| self.transport.list_policy_groups()).await?;
        resolve::filter_by_names(groups, names)
    }

    pub async fn get_list_policy_groups_by_uid(
        &self,
        ids: &[PolicyGroupId],
    ) -> Result<Vec<PolicyGroup>> {
        let groups = self.call(|| self.transport.list_policy_groups()).await?;
        resolve::filter_by_ids(groups, ids)
    }

    pub async fn create_policy_group(&self, req: &CreatePolicyGroup) -> Result<PolicyGroup> {
        self.call(|| self.transport.create_policy_group(req)).await
    }

    pub async fn delete_policy_group(
        &self,
        id: &PolicyGroupId,
        params: &RequestParams,
    ) -> Result<()> {
        self.call(|| self.transport.delete_policy_group(id, params)).await
    }
}
