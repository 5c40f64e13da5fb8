//! Volume Model
//!
//! Volumes are the central StorageOS resource: namespaced block devices
//! with a master deployment, optional replicas and optional NFS exports.

use crate::domain::ids::{DeploymentId, NamespaceId, NodeId, Version, VolumeId};
use crate::domain::resources::{Labelled, Labels, Resource};
use crate::error::{Error, ResourceKind, Result};
use crate::config::parse_bool;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Well-known Labels
// =============================================================================

/// Disables caching of volume data when true
pub const LABEL_NO_CACHE: &str = "storageos.com/nocache";
/// Disables compression at rest and in transit when true
pub const LABEL_NO_COMPRESS: &str = "storageos.com/nocompress";
/// Number of replicas to provision
pub const LABEL_REPLICAS: &str = "storageos.com/replicas";
/// Deprioritises the volume's disk I/O when true
pub const LABEL_THROTTLE: &str = "storageos.com/throttle";

// =============================================================================
// Enumerations
// =============================================================================

/// How a volume is currently consumed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachType {
    Detached,
    Nfs,
    Host,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for AttachType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttachType::Detached => write!(f, "detached"),
            AttachType::Nfs => write!(f, "nfs"),
            AttachType::Host => write!(f, "host"),
            AttachType::Unknown => write!(f, "unknown"),
        }
    }
}

/// Health of a single volume deployment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeploymentHealth {
    Online,
    Offline,
    Ready,
    Syncing,
    Recovering,
    Provisioning,
    Provisioned,
    Failed,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for DeploymentHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DeploymentHealth::Online => "online",
            DeploymentHealth::Offline => "offline",
            DeploymentHealth::Ready => "ready",
            DeploymentHealth::Syncing => "syncing",
            DeploymentHealth::Recovering => "recovering",
            DeploymentHealth::Provisioning => "provisioning",
            DeploymentHealth::Provisioned => "provisioned",
            DeploymentHealth::Failed => "failed",
            DeploymentHealth::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

// =============================================================================
// Deployments
// =============================================================================

/// Point-in-time snapshot of an ongoing replica sync
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SyncProgress {
    pub bytes_remaining: u64,
    pub throughput_bytes: u64,
    pub estimated_seconds_remaining: u64,
}

/// A master or replica instance of a volume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Deployment {
    pub id: DeploymentId,
    #[serde(rename = "nodeID")]
    pub node: NodeId,
    pub health: DeploymentHealth,
    pub promotable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_progress: Option<SyncProgress>,
}

// =============================================================================
// NFS
// =============================================================================

/// NFS attachment configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NfsConfig {
    pub exports: Vec<NfsExport>,
    pub service_endpoint: String,
}

/// A single NFS export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NfsExport {
    #[serde(rename = "exportID")]
    pub export_id: u32,
    pub path: String,
    pub pseudo_path: String,
    pub acls: Vec<NfsAcl>,
}

/// Access policy on an NFS export
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NfsAcl {
    pub identity: NfsAclIdentity,
    pub squash_config: NfsSquashConfig,
    pub access_level: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NfsAclIdentity {
    pub identity_type: String,
    pub matcher: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NfsSquashConfig {
    pub gid: i64,
    pub uid: i64,
    pub squash: String,
}

// =============================================================================
// Volume
// =============================================================================

/// A StorageOS volume
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Volume {
    pub id: VolumeId,
    pub name: String,
    pub description: String,
    /// Node the volume is attached on; empty when detached
    pub attached_on: NodeId,
    pub attachment_type: AttachType,
    pub nfs: NfsConfig,

    #[serde(rename = "namespaceID")]
    pub namespace: NamespaceId,
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
    pub fn is_attached(&self) -> bool {
        !self.attached_on.is_empty()
    }

    /// Whether the volume is labelled to disable caching
    pub fn is_caching_disabled(&self) -> Result<bool> {
        self.bool_label(LABEL_NO_CACHE)
    }

    /// Whether the volume is labelled to disable compression
    pub fn is_compression_disabled(&self) -> Result<bool> {
        self.bool_label(LABEL_NO_COMPRESS)
    }

    /// Whether the volume is labelled to throttle its I/O
    pub fn is_throttle_enabled(&self) -> Result<bool> {
        self.bool_label(LABEL_THROTTLE)
    }

    /// Requested replica count from the replicas label, zero if unset
    pub fn requested_replicas(&self) -> Result<u64> {
        match self.labels.get(LABEL_REPLICAS) {
            None => Ok(0),
            Some(v) => v.parse().map_err(|_| {
                Error::Configuration(format!("invalid {} label value: {}", LABEL_REPLICAS, v))
            }),
        }
    }

    fn bool_label(&self, key: &str) -> Result<bool> {
        match self.labels.get(key) {
            None => Ok(false),
            Some(v) => parse_bool(v),
        }
    }
}

impl Resource for Volume {
    type Id = VolumeId;
    const KIND: ResourceKind = ResourceKind::Volume;

    fn id(&self) -> &VolumeId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl Labelled for Volume {
    fn labels(&self) -> &Labels {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_volume_decodes_deployments() {
        let json = r#"{
            "id": "v1",
            "name": "data",
            "namespaceID": "ns1",
            "attachedOn": "n1",
            "attachmentType": "host",
            "sizeBytes": 42,
            "master": {"id": "d1", "nodeID": "n1", "health": "online", "promotable": true},
            "replicas": [
                {"id": "d2", "nodeID": "n2", "health": "syncing",
                 "syncProgress": {"bytesRemaining": 6, "throughputBytes": 4, "estimatedSecondsRemaining": 2}}
            ]
        }"#;

        let vol: Volume = serde_json::from_str(json).unwrap();
        assert!(vol.is_attached());
        assert_eq!(vol.attachment_type, AttachType::Host);
        assert_eq!(vol.namespace, NamespaceId::from("ns1"));
        assert_eq!(vol.master.as_ref().unwrap().health, DeploymentHealth::Online);
        assert_eq!(vol.replicas[0].sync_progress.unwrap().bytes_remaining, 6);
    }

    #[test]
    fn test_volume_label_flags() {
        let mut vol = Volume::default();
        assert!(!vol.is_caching_disabled().unwrap());

        vol.labels.insert(LABEL_NO_CACHE.into(), "true".into());
        vol.labels.insert(LABEL_THROTTLE.into(), "not-a-bool".into());
        vol.labels.insert(LABEL_REPLICAS.into(), "2".into());

        assert!(vol.is_caching_disabled().unwrap());
        assert!(!vol.is_compression_disabled().unwrap());
        assert!(vol.is_throttle_enabled().is_err());
        assert_eq!(vol.requested_replicas().unwrap(), 2);
    }
}
