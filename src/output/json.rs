//! JSON output

use super::models::*;
use super::Displayer;
use crate::domain::resources::{Namespace, Node, PolicyGroup};
use crate::error::Result;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use std::io::Write;

/// Spaces per indentation level unless configured otherwise
pub const DEFAULT_INDENT: usize = 4;

/// Displayer encoding results as indented JSON
#[derive(Debug, Clone)]
pub struct JsonDisplayer {
    indent: String,
}

impl JsonDisplayer {
    pub fn new(indent: usize) -> Self {
        Self {
            indent: " ".repeat(indent),
        }
    }

    fn encode<T: Serialize + ?Sized>(&self, w: &mut dyn Write, value: &T) -> Result<()> {
        let formatter = PrettyFormatter::with_indent(self.indent.as_bytes());
        let mut ser = Serializer::with_formatter(&mut *w, formatter);
        value.serialize(&mut ser)?;
        writeln!(w)?;
        Ok(())
    }
}

impl Default for JsonDisplayer {
    fn default() -> Self {
        Self::new(DEFAULT_INDENT)
    }
}

impl Displayer for JsonDisplayer {
    fn get_cluster(&self, w: &mut dyn Write, cluster: &Cluster) -> Result<()> {
        self.encode(w, cluster)
    }

    fn get_licence(&self, w: &mut dyn Write, licence: &Licence) -> Result<()> {
        self.encode(w, licence)
    }

    fn get_node(&self, w: &mut dyn Write, node: &Node) -> Result<()> {
        self.encode(w, node)
    }

    fn get_list_nodes(&self, w: &mut dyn Write, nodes: &[Node]) -> Result<()> {
        self.encode(w, nodes)
    }

    fn get_namespace(&self, w: &mut dyn Write, namespace: &Namespace) -> Result<()> {
        self.encode(w, namespace)
    }

    fn get_list_namespaces(&self, w: &mut dyn Write, namespaces: &[Namespace]) -> Result<()> {
        self.encode(w, namespaces)
    }

    fn get_volume(&self, w: &mut dyn Write, volume: &Volume) -> Result<()> {
        self.encode(w, volume)
    }

    fn get_list_volumes(&self, w: &mut dyn Write, volumes: &[Volume]) -> Result<()> {
        self.encode(w, volumes)
    }

    fn get_user(&self, w: &mut dyn Write, user: &User) -> Result<()> {
        self.encode(w, user)
    }

    fn get_list_users(&self, w: &mut dyn Write, users: &[User]) -> Result<()> {
        self.encode(w, users)
    }

    fn get_policy_group(&self, w: &mut dyn Write, group: &PolicyGroup) -> Result<()> {
        self.encode(w, group)
    }

    fn get_list_policy_groups(&self, w: &mut dyn Write, groups: &[PolicyGroup]) -> Result<()> {
        self.encode(w, groups)
    }

    fn describe_cluster(&self, w: &mut dyn Write, cluster: &Cluster) -> Result<()> {
        self.encode(w, cluster)
    }

    fn describe_node(&self, w: &mut dyn Write, node: &NodeDescription) -> Result<()> {
        self.encode(w, node)
    }

    fn describe_list_nodes(&self, w: &mut dyn Write, nodes: &[NodeDescription]) -> Result<()> {
        self.encode(w, nodes)
    }

    fn describe_volume(&self, w: &mut dyn Write, volume: &Volume) -> Result<()> {
        self.encode(w, volume)
    }

    fn describe_list_volumes(&self, w: &mut dyn Write, volumes: &[Volume]) -> Result<()> {
        self.encode(w, volumes)
    }

    fn create_user(&self, w: &mut dyn Write, user: &User) -> Result<()> {
        self.encode(w, user)
    }

    fn create_volume(&self, w: &mut dyn Write, volume: &Volume) -> Result<()> {
        self.encode(w, volume)
    }

    fn create_namespace(&self, w: &mut dyn Write, namespace: &Namespace) -> Result<()> {
        self.encode(w, namespace)
    }

    fn create_policy_group(&self, w: &mut dyn Write, group: &PolicyGroup) -> Result<()> {
        self.encode(w, group)
    }

    fn update_cluster(&self, w: &mut dyn Write, cluster: &Cluster) -> Result<()> {
        self.encode(w, cluster)
    }

    fn update_licence(&self, w: &mut dyn Write, licence: &Licence) -> Result<()> {
        self.encode(w, licence)
    }

    fn update_volume(&self, w: &mut dyn Write, update: &VolumeUpdate) -> Result<()> {
        self.encode(w, update)
    }

    fn set_replicas(&self, w: &mut dyn Write, update: &ReplicasUpdate) -> Result<()> {
        self.encode(w, update)
    }

    fn attach_volume(&self, w: &mut dyn Write, attachment: &VolumeAttachment) -> Result<()> {
        self.encode(w, attachment)
    }

    fn detach_volume(&self, w: &mut dyn Write, detachment: &VolumeDetachment) -> Result<()> {
        self.encode(w, detachment)
    }

    fn attach_nfs_volume(&self, w: &mut dyn Write, attachment: &NfsAttachment) -> Result<()> {
        self.encode(w, attachment)
    }

    fn update_nfs_volume_endpoint(
        &self,
        w: &mut dyn Write,
        update: &NfsEndpointUpdate,
    ) -> Result<()> {
        self.encode(w, update)
    }

    fn update_nfs_volume_exports(
        &self,
        w: &mut dyn Write,
        update: &NfsExportsUpdate,
    ) -> Result<()> {
        self.encode(w, update)
    }

    fn delete_volume(&self, w: &mut dyn Write, deletion: &VolumeDeletion) -> Result<()> {
        self.encode(w, deletion)
    }

    fn delete_node(&self, w: &mut dyn Write, deletion: &NodeDeletion) -> Result<()> {
        self.encode(w, deletion)
    }

    fn delete_namespace(&self, w: &mut dyn Write, deletion: &NamespaceDeletion) -> Result<()> {
        self.encode(w, deletion)
    }

    fn delete_user(&self, w: &mut dyn Write, deletion: &UserDeletion) -> Result<()> {
        self.encode(w, deletion)
    }

    fn delete_policy_group(&self, w: &mut dyn Write, deletion: &PolicyGroupDeletion) -> Result<()> {
        self.encode(w, deletion)
    }

    // Machine-readable output has nothing to encode until the request completes
    fn async_request(&self, _w: &mut dyn Write) -> Result<()> {
        Ok(())
    }
}
