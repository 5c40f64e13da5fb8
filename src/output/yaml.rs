//! YAML output

use super::models::*;
use super::Displayer;
use crate::domain::resources::{Namespace, Node, PolicyGroup};
use crate::error::Result;
use serde::Serialize;
use std::io::Write;

/// Displayer encoding results as YAML documents
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlDisplayer;

impl YamlDisplayer {
    pub fn new() -> Self {
        Self
    }

    fn encode<T: Serialize + ?Sized>(&self, w: &mut dyn Write, value: &T) -> Result<()> {
        serde_yaml::to_writer(&mut *w, value)?;
        Ok(())
    }
}

impl Displayer for YamlDisplayer {
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

    fn async_request(&self, _w: &mut dyn Write) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::NamespaceId;

    #[test]
    fn test_namespace_deletion() {
        let mut buf = Vec::new();
        YamlDisplayer::new()
            .delete_namespace(
                &mut buf,
                &NamespaceDeletion {
                    id: NamespaceId::from("ns1"),
                },
            )
            .unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "id: ns1\n");
    }

    #[test]
    fn test_labels_rendered_as_mapping() {
        let mut ns = Namespace {
            name: "prod".into(),
            ..Default::default()
        };
        ns.labels.insert("team".into(), "storage".into());

        let mut buf = Vec::new();
        YamlDisplayer::new().get_namespace(&mut buf, &ns).unwrap();
        let out = String::from_utf8(buf).unwrap();
        assert!(out.contains("name: prod\n"));
        assert!(out.contains("labels:\n  team: storage\n"));
    }
}
