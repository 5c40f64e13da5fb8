//! Output models
//!
//! Serializable views of the resource models, enriched with the names of
//! the resources they reference.

use crate::domain::ids::{
    ClusterId, DeploymentId, NamespaceId, NodeId, PolicyGroupId, UserId, Version, VolumeId,
};
use crate::domain::resources::{self, Labels, Namespace, Node, PolicyGroup};
use crate::domain::volume::{
    self, AttachType, DeploymentHealth, NfsConfig, NfsExport, SyncProgress,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Name shown for a referenced resource that could not be found
pub const UNKNOWN_NAME: &str = "unknown";

fn node_name(nodes: &HashMap<NodeId, Node>, id: &NodeId) -> String {
    nodes
        .get(id)
        .map(|n| n.name.clone())
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}

// =============================================================================
// Volume
// =============================================================================

/// A volume deployment with the name of the node hosting it
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    pub id: DeploymentId,
    #[serde(rename = "nodeID")]
    pub node: NodeId,
    pub node_name: String,
    pub health: DeploymentHealth,
    pub promotable: bool,
    pub sync_progress: Option<SyncProgress>,
}

impl Deployment {
    pub fn new(d: &volume::Deployment, nodes: &HashMap<NodeId, Node>) -> Self {
        Self {
            id: d.id.clone(),
            node: d.node.clone(),
            node_name: node_name(nodes, &d.node),
            health: d.health,
            promotable: d.promotable,
            sync_progress: d.sync_progress,
        }
    }
}

/// A volume joined with its namespace and node names
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: VolumeId,
    pub name: String,
    pub description: String,
    pub attached_on: NodeId,
    pub attached_on_name: String,
    pub attachment_type: AttachType,
    pub nfs: NfsConfig,

    #[serde(rename = "namespaceID")]
    pub namespace: NamespaceId,
    pub namespace_name: String,
    pub labels: Labels,
    pub filesystem: String,
    pub size_bytes: u64,

    pub master: Option<Deployment>,
    pub replicas: Vec<Deployment>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: Version,
}

impl Volume {
    pub fn new(vol: &volume::Volume, ns: &Namespace, nodes: &HashMap<NodeId, Node>) -> Self {
        let attached_on_name = if vol.is_attached() {
            node_name(nodes, &vol.attached_on)
        } else {
            String::new()
        };

        Self {
            id: vol.id.clone(),
            name: vol.name.clone(),
            description: vol.description.clone(),
            attached_on: vol.attached_on.clone(),
            attached_on_name,
            attachment_type: vol.attachment_type,
            nfs: vol.nfs.clone(),
            namespace: vol.namespace.clone(),
            namespace_name: ns.name.clone(),
            labels: vol.labels.clone(),
            filesystem: vol.filesystem.clone(),
            size_bytes: vol.size_bytes,
            master: vol.master.as_ref().map(|d| Deployment::new(d, nodes)),
            replicas: vol.replicas.iter().map(|d| Deployment::new(d, nodes)).collect(),
            created_at: vol.created_at,
            updated_at: vol.updated_at,
            version: vol.version.clone(),
        }
    }

    /// Number of replicas that are fully in sync
    pub fn ready_replicas(&self) -> usize {
        self.replicas
            .iter()
            .filter(|r| matches!(r.health, DeploymentHealth::Ready | DeploymentHealth::Online))
            .count()
    }
}

/// The state of a volume after a description, label or size change
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeUpdate {
    pub id: VolumeId,
    pub name: String,
    pub description: String,
    #[serde(rename = "namespaceID")]
    pub namespace: NamespaceId,
    pub labels: Labels,
    pub filesystem: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: Version,
}

impl From<&volume::Volume> for VolumeUpdate {
    fn from(vol: &volume::Volume) -> Self {
        Self {
            id: vol.id.clone(),
            name: vol.name.clone(),
            description: vol.description.clone(),
            namespace: vol.namespace.clone(),
            labels: vol.labels.clone(),
            filesystem: vol.filesystem.clone(),
            size_bytes: vol.size_bytes,
            created_at: vol.created_at,
            updated_at: vol.updated_at,
            version: vol.version.clone(),
        }
    }
}

/// Confirmation of a replica count change request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplicasUpdate {
    pub id: VolumeId,
    #[serde(rename = "namespaceID")]
    pub namespace: NamespaceId,
    pub replicas: u64,
}

/// Confirmation of a volume attachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeAttachment {
    pub id: VolumeId,
    #[serde(rename = "namespaceID")]
    pub namespace: NamespaceId,
    #[serde(rename = "nodeID")]
    pub node: NodeId,
}

/// Confirmation of a volume detachment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeDetachment {
    pub id: VolumeId,
    #[serde(rename = "namespaceID")]
    pub namespace: NamespaceId,
}

// =============================================================================
// NFS
// =============================================================================

/// Confirmation of a volume attached for NFS sharing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NfsAttachment {
    pub id: VolumeId,
    #[serde(rename = "namespaceID")]
    pub namespace: NamespaceId,
}

/// The NFS mount endpoint a volume was given
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NfsEndpointUpdate {
    pub id: VolumeId,
    #[serde(rename = "namespaceID")]
    pub namespace: NamespaceId,
    pub mount_endpoint: String,
}

/// The NFS exports a volume was given
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NfsExportsUpdate {
    pub id: VolumeId,
    #[serde(rename = "namespaceID")]
    pub namespace: NamespaceId,
    pub exports: Vec<NfsExport>,
}

// =============================================================================
// Node Description
// =============================================================================

/// Role a node plays for a volume it hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentRole {
    Master,
    Replica,
}

impl fmt::Display for DeploymentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeploymentRole::Master => write!(f, "master"),
            DeploymentRole::Replica => write!(f, "replica"),
        }
    }
}

/// A volume deployment hosted on a described node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostedVolume {
    pub id: VolumeId,
    pub name: String,
    #[serde(rename = "namespaceID")]
    pub namespace: NamespaceId,
    pub namespace_name: String,
    pub role: DeploymentRole,
    pub health: DeploymentHealth,
    pub size_bytes: u64,
}

/// A node together with the volume deployments it hosts
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDescription {
    #[serde(flatten)]
    pub node: Node,
    pub hosted_volumes: Vec<HostedVolume>,
}

impl NodeDescription {
    /// Collect the deployments of `volumes` that live on `node`
    pub fn new(
        node: &Node,
        volumes: &[volume::Volume],
        namespaces: &HashMap<NamespaceId, Namespace>,
    ) -> Self {
        let mut hosted = Vec::new();

        for vol in volumes {
            let local = vol
                .master
                .iter()
                .filter(|d| d.node == node.id)
                .map(|d| (DeploymentRole::Master, d))
                .chain(
                    vol.replicas
                        .iter()
                        .filter(|d| d.node == node.id)
                        .map(|d| (DeploymentRole::Replica, d)),
                );

            for (role, d) in local {
                hosted.push(HostedVolume {
                    id: vol.id.clone(),
                    name: vol.name.clone(),
                    namespace: vol.namespace.clone(),
                    namespace_name: namespaces
                        .get(&vol.namespace)
                        .map(|ns| ns.name.clone())
                        .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
                    role,
                    health: d.health,
                    size_bytes: vol.size_bytes,
                });
            }
        }

        Self {
            node: node.clone(),
            hosted_volumes: hosted,
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// Policy group membership shown alongside a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyGroupRef {
    pub id: PolicyGroupId,
    pub name: String,
}

/// A user joined with the names of its policy groups
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(rename = "name")]
    pub username: String,
    pub is_admin: bool,
    pub groups: Vec<PolicyGroupRef>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: Version,
}

impl User {
    pub fn new(user: &resources::User, groups: &HashMap<PolicyGroupId, PolicyGroup>) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            is_admin: user.is_admin,
            groups: user
                .groups
                .iter()
                .map(|id| PolicyGroupRef {
                    id: id.clone(),
                    name: groups
                        .get(id)
                        .map(|g| g.name.clone())
                        .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
                })
                .collect(),
            created_at: user.created_at,
            updated_at: user.updated_at,
            version: user.version.clone(),
        }
    }
}

// =============================================================================
// Cluster & Licence
// =============================================================================

/// Cluster configuration with its member nodes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cluster {
    pub id: ClusterId,

    pub disable_telemetry: bool,
    pub disable_crash_reporting: bool,
    pub disable_version_check: bool,

    pub log_level: String,
    pub log_format: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: Version,

    pub nodes: Vec<Node>,
}

impl Cluster {
    pub fn new(c: &resources::Cluster, nodes: Vec<Node>) -> Self {
        Self {
            id: c.id.clone(),
            disable_telemetry: c.disable_telemetry,
            disable_crash_reporting: c.disable_crash_reporting,
            disable_version_check: c.disable_version_check,
            log_level: c.log_level.clone(),
            log_format: c.log_format.clone(),
            created_at: c.created_at,
            updated_at: c.updated_at,
            version: c.version.clone(),
            nodes,
        }
    }
}

/// Licence details with features in sorted order
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Licence {
    #[serde(rename = "clusterID")]
    pub cluster_id: ClusterId,
    pub expires_at: DateTime<Utc>,
    pub cluster_capacity_bytes: u64,
    pub used_bytes: u64,
    pub kind: String,
    pub features: Vec<String>,
    pub customer_name: String,
}

impl From<&resources::Licence> for Licence {
    fn from(l: &resources::Licence) -> Self {
        let mut features = l.features.clone();
        features.sort();

        Self {
            cluster_id: l.cluster_id.clone(),
            expires_at: l.expires_at,
            cluster_capacity_bytes: l.cluster_capacity_bytes,
            used_bytes: l.used_bytes,
            kind: l.kind.clone(),
            features,
            customer_name: l.customer_name.clone(),
        }
    }
}

// =============================================================================
// Deletion Confirmations
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VolumeDeletion {
    pub id: VolumeId,
    #[serde(rename = "namespaceID")]
    pub namespace: NamespaceId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDeletion {
    pub id: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamespaceDeletion {
    pub id: NamespaceId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserDeletion {
    pub id: UserId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicyGroupDeletion {
    pub id: PolicyGroupId,
}
