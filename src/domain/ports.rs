//! Domain Ports - the transport boundary
//!
//! The management API is owned by the storage cluster, not by this crate.
//! [`Transport`] describes every call the CLI makes against it; the HTTP
//! adapter lives in [`crate::transport`] and tests substitute an in-memory
//! implementation.

use crate::client::params::{DeleteVolumeParams, RequestParams};
use crate::domain::ids::{NamespaceId, NodeId, PolicyGroupId, UserId, VolumeId};
use crate::domain::resources::{
    AuthSession, Cluster, Labels, Licence, Namespace, Node, PolicyGroup, PolicySpec, User,
};
use crate::domain::volume::{NfsExport, Volume};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// =============================================================================
// Request Bodies
// =============================================================================

/// Cluster-wide settings submitted on update
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterUpdate {
    pub disable_telemetry: bool,
    pub disable_crash_reporting: bool,
    pub disable_version_check: bool,
    pub log_level: String,
    pub log_format: String,
}

impl From<&Cluster> for ClusterUpdate {
    fn from(c: &Cluster) -> Self {
        Self {
            disable_telemetry: c.disable_telemetry,
            disable_crash_reporting: c.disable_crash_reporting,
            disable_version_check: c.disable_version_check,
            log_level: c.log_level.clone(),
            log_format: c.log_format.clone(),
        }
    }
}

/// Request to provision a new volume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVolume {
    pub name: String,
    pub description: String,
    #[serde(rename = "fsType")]
    pub filesystem: String,
    pub size_bytes: u64,
    pub labels: Labels,
}

/// Request to create a namespace
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateNamespace {
    pub name: String,
    pub labels: Labels,
}

/// Request to create a user account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    pub username: String,
    pub password: String,
    pub is_admin: bool,
    pub groups: Vec<PolicyGroupId>,
}

/// Request to create a policy group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CreatePolicyGroup {
    pub name: String,
    pub specs: Vec<PolicySpec>,
}

/// Result of a mutation that may be completed server-side in the background
#[derive(Debug, Clone, PartialEq)]
pub enum Completion<T> {
    /// The server finished the operation and returned its result
    Done(T),
    /// The server accepted the request for asynchronous processing
    Accepted,
}

impl<T> Completion<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Completion::Accepted)
    }

    pub fn done(self) -> Option<T> {
        match self {
            Completion::Done(v) => Some(v),
            Completion::Accepted => None,
        }
    }
}

// =============================================================================
// Transport
// =============================================================================

/// Calls offered by the StorageOS management API
///
/// Every call is bounded by the caller's deadline; implementations must not
/// retry on failure.
#[async_trait]
pub trait Transport: Send + Sync {
    // --- Session ---

    /// Log in with the given credentials, authorising subsequent calls
    async fn authenticate(&self, username: &str, password: &str) -> Result<AuthSession>;

    /// Authorise subsequent calls with a previously obtained session
    fn resume_session(&self, session: &AuthSession);

    // --- Cluster ---

    async fn get_cluster(&self) -> Result<Cluster>;

    async fn update_cluster(&self, update: &ClusterUpdate, params: &RequestParams)
        -> Result<Cluster>;

    async fn get_licence(&self) -> Result<Licence>;

    async fn update_licence(&self, key: &str, params: &RequestParams) -> Result<Licence>;

    // --- Nodes ---

    async fn get_node(&self, id: &NodeId) -> Result<Node>;

    async fn list_nodes(&self) -> Result<Vec<Node>>;

    async fn delete_node(&self, id: &NodeId, params: &RequestParams) -> Result<()>;

    // --- Namespaces ---

    async fn get_namespace(&self, id: &NamespaceId) -> Result<Namespace>;

    async fn list_namespaces(&self) -> Result<Vec<Namespace>>;

    async fn create_namespace(&self, req: &CreateNamespace) -> Result<Namespace>;

    async fn delete_namespace(&self, id: &NamespaceId, params: &RequestParams) -> Result<()>;

    // --- Volumes ---

    async fn get_volume(&self, ns: &NamespaceId, id: &VolumeId) -> Result<Volume>;

    async fn list_volumes(&self, ns: &NamespaceId) -> Result<Vec<Volume>>;

    async fn create_volume(
        &self,
        ns: &NamespaceId,
        req: &CreateVolume,
        params: &RequestParams,
    ) -> Result<Completion<Volume>>;

    async fn update_volume_description(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        description: &str,
        params: &RequestParams,
    ) -> Result<Volume>;

    async fn update_volume_labels(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        labels: &Labels,
        params: &RequestParams,
    ) -> Result<Volume>;

    async fn resize_volume(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        size_bytes: u64,
        params: &RequestParams,
    ) -> Result<Completion<Volume>>;

    async fn set_replicas(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        replicas: u64,
        params: &RequestParams,
    ) -> Result<()>;

    async fn attach_volume(&self, ns: &NamespaceId, id: &VolumeId, node: &NodeId) -> Result<()>;

    async fn detach_volume(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        params: &RequestParams,
    ) -> Result<()>;

    async fn delete_volume(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        params: &DeleteVolumeParams,
    ) -> Result<()>;

    // --- NFS ---

    /// Attach a volume for sharing over NFS
    async fn attach_nfs_volume(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        params: &RequestParams,
    ) -> Result<()>;

    /// Replace the NFS export configuration of a volume
    async fn update_nfs_volume_exports(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        exports: &[NfsExport],
        params: &RequestParams,
    ) -> Result<()>;

    /// Set the endpoint NFS clients mount a volume from
    async fn update_nfs_volume_mount_endpoint(
        &self,
        ns: &NamespaceId,
        id: &VolumeId,
        endpoint: &str,
        params: &RequestParams,
    ) -> Result<()>;

    // --- Users ---

    async fn get_user(&self, id: &UserId) -> Result<User>;

    async fn list_users(&self) -> Result<Vec<User>>;

    async fn create_user(&self, req: &CreateUser) -> Result<User>;

    async fn delete_user(&self, id: &UserId, params: &RequestParams) -> Result<()>;

    // --- Policy Groups ---

    async fn get_policy_group(&self, id: &PolicyGroupId) -> Result<PolicyGroup>;

    async fn list_policy_groups(&self) -> Result<Vec<PolicyGroup>>;

    async fn create_policy_group(&self, req: &CreatePolicyGroup) -> Result<PolicyGroup>;

    async fn delete_policy_group(&self, id: &PolicyGroupId, params: &RequestParams)
        -> Result<()>;
}

/// Shared handle to a transport implementation
pub type TransportRef = Arc<dyn Transport>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_update_from_cluster() {
        let cluster = Cluster {
            disable_telemetry: true,
            log_level: "debug".into(),
            log_format: "json".into(),
            ..Default::default()
        };

        let update = ClusterUpdate::from(&cluster);
        assert!(update.disable_telemetry);
        assert!(!update.disable_version_check);
        assert_eq!(update.log_level, "debug");
    }

    #[test]
    fn test_create_volume_body() {
        let req = CreateVolume {
            name: "data".into(),
            filesystem: "ext4".into(),
            size_bytes: 5,
            ..Default::default()
        };

        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["fsType"], "ext4");
        assert_eq!(body["sizeBytes"], 5);
    }

    #[test]
    fn test_completion() {
        assert!(Completion::<u8>::Accepted.is_accepted());
        assert_eq!(Completion::Done(3).done(), Some(3));
    }
}
