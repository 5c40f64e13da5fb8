//! Output rendering
//!
//! Commands hand resolved resources to a [`Displayer`], selected by the
//! configured [`OutputFormat`]. Output models in [`models`] join related
//! resources (node names, namespace names, policy group names) so that
//! every format renders the same information.

pub mod json;
pub mod models;
pub mod text;
pub mod yaml;

pub use models::*;

use crate::domain::resources::{Namespace, Node, PolicyGroup};
use crate::error::{Error, Result};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Message printed in place of a confirmation for asynchronous requests
pub const ASYNC_REQUEST_MESSAGE: &str = "request submitted successfully";

// =============================================================================
// Output Format
// =============================================================================

/// Supported output formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "yaml" => Ok(OutputFormat::Yaml),
            other => Err(Error::UnknownOutputFormat(other.to_string())),
        }
    }
}

// =============================================================================
// Displayer
// =============================================================================

/// Renders command results to a writer
pub trait Displayer: Send + Sync {
    // --- get ---
    fn get_cluster(&self, w: &mut dyn Write, cluster: &Cluster) -> Result<()>;
    fn get_licence(&self, w: &mut dyn Write, licence: &Licence) -> Result<()>;
    fn get_node(&self, w: &mut dyn Write, node: &Node) -> Result<()>;
    fn get_list_nodes(&self, w: &mut dyn Write, nodes: &[Node]) -> Result<()>;
    fn get_namespace(&self, w: &mut dyn Write, namespace: &Namespace) -> Result<()>;
    fn get_list_namespaces(&self, w: &mut dyn Write, namespaces: &[Namespace]) -> Result<()>;
    fn get_volume(&self, w: &mut dyn Write, volume: &Volume) -> Result<()>;
    fn get_list_volumes(&self, w: &mut dyn Write, volumes: &[Volume]) -> Result<()>;
    fn get_user(&self, w: &mut dyn Write, user: &User) -> Result<()>;
    fn get_list_users(&self, w: &mut dyn Write, users: &[User]) -> Result<()>;
    fn get_policy_group(&self, w: &mut dyn Write, group: &PolicyGroup) -> Result<()>;
    fn get_list_policy_groups(&self, w: &mut dyn Write, groups: &[PolicyGroup]) -> Result<()>;

    // --- describe ---
    fn describe_cluster(&self, w: &mut dyn Write, cluster: &Cluster) -> Result<()>;
    fn describe_node(&self, w: &mut dyn Write, node: &NodeDescription) -> Result<()>;
    fn describe_list_nodes(&self, w: &mut dyn Write, nodes: &[NodeDescription]) -> Result<()>;
    fn describe_volume(&self, w: &mut dyn Write, volume: &Volume) -> Result<()>;
    fn describe_list_volumes(&self, w: &mut dyn Write, volumes: &[Volume]) -> Result<()>;

    // --- create ---
    fn create_user(&self, w: &mut dyn Write, user: &User) -> Result<()>;
    fn create_volume(&self, w: &mut dyn Write, volume: &Volume) -> Result<()>;
    fn create_namespace(&self, w: &mut dyn Write, namespace: &Namespace) -> Result<()>;
    fn create_policy_group(&self, w: &mut dyn Write, group: &PolicyGroup) -> Result<()>;

    // --- update ---
    fn update_cluster(&self, w: &mut dyn Write, cluster: &Cluster) -> Result<()>;
    fn update_licence(&self, w: &mut dyn Write, licence: &Licence) -> Result<()>;
    fn update_volume(&self, w: &mut dyn Write, update: &VolumeUpdate) -> Result<()>;
    fn set_replicas(&self, w: &mut dyn Write, update: &ReplicasUpdate) -> Result<()>;

    // --- attach / detach ---
    fn attach_volume(&self, w: &mut dyn Write, attachment: &VolumeAttachment) -> Result<()>;
    fn detach_volume(&self, w: &mut dyn Write, detachment: &VolumeDetachment) -> Result<()>;

    // --- nfs ---
    fn attach_nfs_volume(&self, w: &mut dyn Write, attachment: &NfsAttachment) -> Result<()>;
    fn update_nfs_volume_endpoint(&self, w: &mut dyn Write, update: &NfsEndpointUpdate)
        -> Result<()>;
    fn update_nfs_volume_exports(&self, w: &mut dyn Write, update: &NfsExportsUpdate)
        -> Result<()>;

    // --- delete ---
    fn delete_volume(&self, w: &mut dyn Write, deletion: &VolumeDeletion) -> Result<()>;
    fn delete_node(&self, w: &mut dyn Write, deletion: &NodeDeletion) -> Result<()>;
    fn delete_namespace(&self, w: &mut dyn Write, deletion: &NamespaceDeletion) -> Result<()>;
    fn delete_user(&self, w: &mut dyn Write, deletion: &UserDeletion) -> Result<()>;
    fn delete_policy_group(&self, w: &mut dyn Write, deletion: &PolicyGroupDeletion)
        -> Result<()>;

    /// Acknowledge a request the server will complete asynchronously
    fn async_request(&self, w: &mut dyn Write) -> Result<()>;
}

/// Choose the displayer for `format`
pub fn select_displayer(format: OutputFormat) -> Box<dyn Displayer> {
    match format {
        OutputFormat::Text => Box::new(text::TextDisplayer::new()),
        OutputFormat::Json => Box::new(json::JsonDisplayer::new(json::DEFAULT_INDENT)),
        OutputFormat::Yaml => Box::new(yaml::YamlDisplayer::new()),
    }
}
