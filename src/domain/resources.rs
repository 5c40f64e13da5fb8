//! Resource Models
//!
//! Plain records describing the entities managed through the StorageOS
//! API. They are decoded from API responses and joined in memory by
//! identifier; no resource owns another.

use crate::domain::ids::{ClusterId, NamespaceId, NodeId, PolicyGroupId, UserId, Version};
use crate::error::ResourceKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hash;

/// Set of key/value labels attached to a resource
pub type Labels = BTreeMap<String, String>;

// =============================================================================
// Resolution Traits
// =============================================================================

/// A resource that can be looked up by name or by identifier
pub trait Resource {
    /// Identifier type for this kind of resource
    type Id: Clone + Eq + Hash + fmt::Display;

    /// Kind reported in lookup errors
    const KIND: ResourceKind;

    fn id(&self) -> &Self::Id;

    /// Human-readable name used for exact-match lookups
    fn name(&self) -> &str;
}

/// A resource carrying a label set
pub trait Labelled {
    fn labels(&self) -> &Labels;
}

// =============================================================================
// Node
// =============================================================================

/// Health of a storage node as reported by the cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeHealth {
    Online,
    Offline,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for NodeHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeHealth::Online => write!(f, "online"),
            NodeHealth::Offline => write!(f, "offline"),
            NodeHealth::Unknown => write!(f, "unknown"),
        }
    }
}

/// Capacity statistics for a node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityStats {
    /// Total capacity in bytes
    pub total: u64,
    /// Free capacity in bytes
    pub free: u64,
}

impl CapacityStats {
    /// Bytes currently in use
    pub fn used(&self) -> u64 {
        self.total.saturating_sub(self.free)
    }
}

/// A StorageOS node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub health: NodeHealth,
    pub capacity: CapacityStats,

    #[serde(rename = "ioAddress")]
    pub io_addr: String,
    #[serde(rename = "supervisorAddress")]
    pub supervisor_addr: String,
    #[serde(rename = "gossipAddress")]
    pub gossip_addr: String,
    #[serde(rename = "clusteringAddress")]
    pub clustering_addr: String,

    pub labels: Labels,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: Version,
}

impl Resource for Node {
    type Id = NodeId;
    const KIND: ResourceKind = ResourceKind::Node;

    fn id(&self) -> &NodeId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Labelled for Node {
    fn labels(&self) -> &Labels {
        &self.labels
    }
}

// =============================================================================
// Namespace
// =============================================================================

/// A StorageOS namespace, scoping volumes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Namespace {
    pub id: NamespaceId,
    pub name: String,
    pub labels: Labels,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: Version,
}

impl Resource for Namespace {
    type Id = NamespaceId;
    const KIND: ResourceKind = ResourceKind::Namespace;

    fn id(&self) -> &NamespaceId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Labelled for Namespace {
    fn labels(&self) -> &Labels {
        &self.labels
    }
}

// =============================================================================
// User
// =============================================================================

/// A StorageOS user account
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    #[serde(rename = "name")]
    pub username: String,

    pub is_admin: bool,
    pub groups: Vec<PolicyGroupId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: Version,
}

impl Resource for User {
    type Id = UserId;
    const KIND: ResourceKind = ResourceKind::User;

    fn id(&self) -> &UserId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.username
    }
}

// =============================================================================
// Policy Group
// =============================================================================

/// A single access rule granted by a policy group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicySpec {
    /// Namespace the rule applies to
    #[serde(rename = "namespaceID")]
    pub namespace_id: NamespaceId,
    /// Resource type the rule grants access to
    pub resource_type: String,
    /// Disallow mutating requests when set
    pub read_only: bool,
}

/// A member of a policy group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyGroupMember {
    pub id: UserId,
    #[serde(rename = "name")]
    pub username: String,
}

/// A StorageOS policy group
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PolicyGroup {
    pub id: PolicyGroupId,
    pub name: String,
    pub users: Vec<PolicyGroupMember>,
    pub specs: Vec<PolicySpec>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub version: Version,
}

impl Resource for PolicyGroup {
    type Id = PolicyGroupId;
    const KIND: ResourceKind = ResourceKind::PolicyGroup;

    fn id(&self) -> &PolicyGroupId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// =============================================================================
// Cluster
// =============================================================================

/// Cluster-wide configuration. There is exactly one per deployment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
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
}

// =============================================================================
// Licence
// =============================================================================

/// Product licence applied to the cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Licence {
    #[serde(rename = "clusterID")]
    pub cluster_id: ClusterId,
    pub expires_at: DateTime<Utc>,
    pub cluster_capacity_bytes: u64,
    pub used_bytes: u64,
    pub kind: String,
    pub customer_name: String,
    pub features: Vec<String>,
    pub version: Version,
}

// =============================================================================
// Auth Session
// =============================================================================

/// An authenticated API session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// Bearer token presented on subsequent requests
    pub token: String,
    /// Point in time after which the token is rejected
    pub expires_at: DateTime<Utc>,
}

impl AuthSession {
    /// Whether the session is still usable `leeway` from now
    pub fn is_valid_at(&self, now: DateTime<Utc>, leeway: chrono::Duration) -> bool {
        self.expires_at > now + leeway
    }
}
