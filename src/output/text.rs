//! Human-readable text output
//!
//! Lists render as whitespace-aligned tables, single resources as aligned
//! `Key: value` blocks and mutations as one-line confirmations.

use super::models::*;
use super::{Displayer, ASYNC_REQUEST_MESSAGE};
use crate::domain::resources::{Labels, Namespace, Node, PolicyGroup};
use crate::error::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use std::io::Write;

/// Space between table columns
const COLUMN_GAP: usize = 2;

// =============================================================================
// Formatting Helpers
// =============================================================================

/// Render a byte count with base-2 units, e.g. `5.0 GiB`
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KiB", "MiB", "GiB", "TiB", "PiB"];

    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if value < 10.0 {
        format!("{:.1} {}", value, UNITS[unit])
    } else {
        format!("{:.0} {}", value, UNITS[unit])
    }
}

/// Render `then` relative to `now`, e.g. `5 minutes ago` or `3 days from now`
pub fn format_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let mut formatter = timeago::Formatter::new();
    match (now - then).to_std() {
        Ok(elapsed) => formatter.convert(elapsed),
        Err(_) => formatter
            .ago("from now")
            .convert((then - now).to_std().unwrap_or_default()),
    }
}

fn format_labels(labels: &Labels) -> String {
    labels
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

fn write_table(w: &mut dyn Write, headers: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    for row in std::iter::once(&header).chain(rows.iter()) {
        let mut line = String::new();
        for (i, cell) in row.iter().enumerate() {
            line.push_str(cell);
            if i + 1 < row.len() {
                let pad = widths[i] - cell.chars().count() + COLUMN_GAP;
                line.extend(std::iter::repeat(' ').take(pad));
            }
        }
        writeln!(w, "{}", line.trim_end())?;
    }
    Ok(())
}

fn write_fields(w: &mut dyn Write, fields: &[(&str, String)]) -> Result<()> {
    let width = fields.iter().map(|(k, _)| k.len()).max().unwrap_or(0) + 1;
    for (key, value) in fields {
        let label = format!("{}:", key);
        writeln!(w, "{:<width$}  {}", label, value, width = width)?;
    }
    Ok(())
}

// =============================================================================
// Text Displayer
// =============================================================================

/// Displayer writing human-readable text
#[derive(Debug, Clone, Default)]
pub struct TextDisplayer {
    now: Option<DateTime<Utc>>,
}

impl TextDisplayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fix the clock used for ages, for stable output
    pub fn with_now(now: DateTime<Utc>) -> Self {
        Self { now: Some(now) }
    }

    fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    fn age(&self, t: DateTime<Utc>) -> String {
        format_age(t, self.now())
    }

    fn timestamp(&self, t: DateTime<Utc>) -> String {
        format!(
            "{} ({})",
            t.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.age(t)
        )
    }

    fn node_rows(&self, nodes: &[Node]) -> Vec<Vec<String>> {
        nodes
            .iter()
            .map(|n| {
                vec![
                    n.name.clone(),
                    n.health.to_string(),
                    self.age(n.created_at),
                    format_labels(&n.labels),
                ]
            })
            .collect()
    }

    fn volume_rows(&self, volumes: &[Volume]) -> Vec<Vec<String>> {
        volumes
            .iter()
            .map(|v| {
                let location = match &v.master {
                    Some(m) => format!("{} ({})", m.node_name, m.health),
                    None => String::new(),
                };
                vec![
                    v.namespace_name.clone(),
                    v.name.clone(),
                    format_bytes(v.size_bytes),
                    location,
                    v.attached_on_name.clone(),
                    format!("{}/{}", v.ready_replicas(), v.replicas.len()),
                    self.age(v.created_at),
                ]
            })
            .collect()
    }

    fn cluster_fields(&self, c: &Cluster) -> Vec<(&'static str, String)> {
        vec![
            ("ID", c.id.to_string()),
            ("Created at", self.timestamp(c.created_at)),
            ("Updated at", self.timestamp(c.updated_at)),
            ("Telemetry", enabled(!c.disable_telemetry)),
            ("Crash Reporting", enabled(!c.disable_crash_reporting)),
            ("Version Check", enabled(!c.disable_version_check)),
            ("Log Level", c.log_level.clone()),
            ("Log Format", c.log_format.clone()),
        ]
    }

    fn licence_fields(&self, l: &Licence) -> Vec<(&'static str, String)> {
        vec![
            ("ClusterID", l.cluster_id.to_string()),
            ("Expiration", self.timestamp(l.expires_at)),
            ("Capacity", format_bytes(l.cluster_capacity_bytes)),
            ("Used", format_bytes(l.used_bytes)),
            ("Kind", l.kind.clone()),
            ("Features", format!("[{}]", l.features.join(" "))),
            ("Customer name", l.customer_name.clone()),
        ]
    }

    fn volume_fields(&self, v: &Volume) -> Vec<(&'static str, String)> {
        let attached_on = if v.attached_on.is_empty() {
            String::new()
        } else {
            format!("{} ({})", v.attached_on_name, v.attached_on)
        };

        vec![
            ("ID", v.id.to_string()),
            ("Name", v.name.clone()),
            ("Description", v.description.clone()),
            ("AttachedOn", attached_on),
            ("Attachment Type", v.attachment_type.to_string()),
            ("Namespace", format!("{} ({})", v.namespace_name, v.namespace)),
            ("Labels", format_labels(&v.labels)),
            ("Filesystem", v.filesystem.clone()),
            ("Size", format!("{} ({} bytes)", format_bytes(v.size_bytes), v.size_bytes)),
            ("Version", v.version.to_string()),
            ("Created at", self.timestamp(v.created_at)),
            ("Updated at", self.timestamp(v.updated_at)),
        ]
    }

    fn write_deployment(&self, w: &mut dyn Write, title: &str, d: &Deployment) -> Result<()> {
        writeln!(w)?;
        writeln!(w, "{}:", title)?;
        let mut fields = vec![
            ("  ID", d.id.to_string()),
            ("  Node", format!("{} ({})", d.node_name, d.node)),
            ("  Health", d.health.to_string()),
            ("  Promotable", d.promotable.to_string()),
        ];
        if let Some(p) = &d.sync_progress {
            fields.push((
                "  Sync Progress",
                format!(
                    "{} remaining, {}/s, {}s left",
                    format_bytes(p.bytes_remaining),
                    format_bytes(p.throughput_bytes),
                    p.estimated_seconds_remaining
                ),
            ));
        }
        write_fields(w, &fields)
    }

    fn describe_one_volume(&self, w: &mut dyn Write, v: &Volume) -> Result<()> {
        write_fields(w, &self.volume_fields(v))?;
        if let Some(master) = &v.master {
            self.write_deployment(w, "Master", master)?;
        }
        for replica in &v.replicas {
            self.write_deployment(w, "Replica", replica)?;
        }
        Ok(())
    }

    fn describe_one_node(&self, w: &mut dyn Write, d: &NodeDescription) -> Result<()> {
        let n = &d.node;
        write_fields(
            w,
            &[
                ("ID", n.id.to_string()),
                ("Name", n.name.clone()),
                ("Health", n.health.to_string()),
                ("Addresses", String::new()),
                ("  Data Transfer address", n.io_addr.clone()),
                ("  Gossip address", n.gossip_addr.clone()),
                ("  Supervisor address", n.supervisor_addr.clone()),
                ("  Clustering address", n.clustering_addr.clone()),
                ("Labels", format_labels(&n.labels)),
                ("Created at", self.timestamp(n.created_at)),
                ("Updated at", self.timestamp(n.updated_at)),
                ("Version", n.version.to_string()),
                (
                    "Capacity",
                    format!(
                        "{} / {} ({} free)",
                        format_bytes(n.capacity.used()),
                        format_bytes(n.capacity.total),
                        format_bytes(n.capacity.free)
                    ),
                ),
            ],
        )?;

        writeln!(w)?;
        writeln!(w, "Local volume deployments:")?;
        let rows: Vec<Vec<String>> = d
            .hosted_volumes
            .iter()
            .map(|h| {
                vec![
                    h.namespace_name.clone(),
                    h.name.clone(),
                    format_bytes(h.size_bytes),
                    h.role.to_string(),
                    h.health.to_string(),
                ]
            })
            .collect();
        write_table(w, &["NAMESPACE", "NAME", "SIZE", "ROLE", "HEALTH"], &rows)
    }
}

fn enabled(on: bool) -> String {
    let s = if on { "Enabled" } else { "Disabled" };
    s.to_string()
}

impl Displayer for TextDisplayer {
    fn get_cluster(&self, w: &mut dyn Write, cluster: &Cluster) -> Result<()> {
        write_fields(w, &self.cluster_fields(cluster))
    }

    fn get_licence(&self, w: &mut dyn Write, licence: &Licence) -> Result<()> {
        write_fields(w, &self.licence_fields(licence))
    }

    fn get_node(&self, w: &mut dyn Write, node: &Node) -> Result<()> {
        self.get_list_nodes(w, std::slice::from_ref(node))
    }

    fn get_list_nodes(&self, w: &mut dyn Write, nodes: &[Node]) -> Result<()> {
        write_table(w, &["NAME", "HEALTH", "AGE", "LABELS"], &self.node_rows(nodes))
    }

    fn get_namespace(&self, w: &mut dyn Write, namespace: &Namespace) -> Result<()> {
        self.get_list_namespaces(w, std::slice::from_ref(namespace))
    }

    fn get_list_namespaces(&self, w: &mut dyn Write, namespaces: &[Namespace]) -> Result<()> {
        let rows: Vec<Vec<String>> = namespaces
            .iter()
            .map(|ns| vec![ns.name.clone(), self.age(ns.created_at)])
            .collect();
        write_table(w, &["NAME", "AGE"], &rows)
    }

    fn get_volume(&self, w: &mut dyn Write, volume: &Volume) -> Result<()> {
        self.get_list_volumes(w, std::slice::from_ref(volume))
    }

    fn get_list_volumes(&self, w: &mut dyn Write, volumes: &[Volume]) -> Result<()> {
        write_table(
            w,
            &["NAMESPACE", "NAME", "SIZE", "LOCATION", "ATTACHED ON", "REPLICAS", "AGE"],
            &self.volume_rows(volumes),
        )
    }

    fn get_user(&self, w: &mut dyn Write, user: &User) -> Result<()> {
        self.get_list_users(w, std::slice::from_ref(user))
    }

    fn get_list_users(&self, w: &mut dyn Write, users: &[User]) -> Result<()> {
        let rows: Vec<Vec<String>> = users
            .iter()
            .map(|u| {
                let role = if u.is_admin { "admin" } else { "user" };
                let groups: Vec<&str> = u.groups.iter().map(|g| g.name.as_str()).collect();
                vec![
                    u.username.clone(),
                    role.to_string(),
                    self.age(u.created_at),
                    groups.join(","),
                ]
            })
            .collect();
        write_table(w, &["NAME", "ROLE", "AGE", "GROUPS"], &rows)
    }

    fn get_policy_group(&self, w: &mut dyn Write, group: &PolicyGroup) -> Result<()> {
        self.get_list_policy_groups(w, std::slice::from_ref(group))
    }

    fn get_list_policy_groups(&self, w: &mut dyn Write, groups: &[PolicyGroup]) -> Result<()> {
        let rows: Vec<Vec<String>> = groups
            .iter()
            .map(|g| {
                vec![
                    g.name.clone(),
                    g.users.len().to_string(),
                    g.specs.len().to_string(),
                    self.age(g.created_at),
                ]
            })
            .collect();
        write_table(w, &["NAME", "USERS", "SPECS", "AGE"], &rows)
    }

    fn describe_cluster(&self, w: &mut dyn Write, cluster: &Cluster) -> Result<()> {
        write_fields(w, &self.cluster_fields(cluster))?;
        writeln!(w)?;
        writeln!(w, "Nodes:")?;
        write_table(w, &["NAME", "HEALTH", "AGE", "LABELS"], &self.node_rows(&cluster.nodes))
    }

    fn describe_node(&self, w: &mut dyn Write, node: &NodeDescription) -> Result<()> {
        self.describe_one_node(w, node)
    }

    fn describe_list_nodes(&self, w: &mut dyn Write, nodes: &[NodeDescription]) -> Result<()> {
        for (i, node) in nodes.iter().enumerate() {
            if i > 0 {
                writeln!(w)?;
            }
            self.describe_one_node(w, node)?;
        }
        Ok(())
    }

    fn describe_volume(&self, w: &mut dyn Write, volume: &Volume) -> Result<()> {
        self.describe_one_volume(w, volume)
    }

    fn describe_list_volumes(&self, w: &mut dyn Write, volumes: &[Volume]) -> Result<()> {
        for (i, volume) in volumes.iter().enumerate() {
            if i > 0 {
                writeln!(w)?;
            }
            self.describe_one_volume(w, volume)?;
        }
        Ok(())
    }

    fn create_user(&self, w: &mut dyn Write, user: &User) -> Result<()> {
        self.get_user(w, user)
    }

    fn create_volume(&self, w: &mut dyn Write, volume: &Volume) -> Result<()> {
        self.get_volume(w, volume)
    }

    fn create_namespace(&self, w: &mut dyn Write, namespace: &Namespace) -> Result<()> {
        self.get_namespace(w, namespace)
    }

    fn create_policy_group(&self, w: &mut dyn Write, group: &PolicyGroup) -> Result<()> {
        self.get_policy_group(w, group)
    }

    fn update_cluster(&self, w: &mut dyn Write, cluster: &Cluster) -> Result<()> {
        self.get_cluster(w, cluster)
    }

    fn update_licence(&self, w: &mut dyn Write, licence: &Licence) -> Result<()> {
        self.get_licence(w, licence)
    }

    fn update_volume(&self, w: &mut dyn Write, update: &VolumeUpdate) -> Result<()> {
        write_fields(
            w,
            &[
                ("ID", update.id.to_string()),
                ("Name", update.name.clone()),
                ("Description", update.description.clone()),
                ("Namespace", update.namespace.to_string()),
                ("Labels", format_labels(&update.labels)),
                ("Filesystem", update.filesystem.clone()),
                ("Size", format_bytes(update.size_bytes)),
                ("Version", update.version.to_string()),
                ("Updated at", self.timestamp(update.updated_at)),
            ],
        )
    }

    fn set_replicas(&self, w: &mut dyn Write, update: &ReplicasUpdate) -> Result<()> {
        writeln!(
            w,
            "requested {} replicas for volume {} in namespace {}",
            update.replicas, update.id, update.namespace
        )?;
        Ok(())
    }

    fn attach_volume(&self, w: &mut dyn Write, attachment: &VolumeAttachment) -> Result<()> {
        writeln!(
            w,
            "attached volume {} from namespace {} to node {}",
            attachment.id, attachment.namespace, attachment.node
        )?;
        Ok(())
    }

    fn detach_volume(&self, w: &mut dyn Write, detachment: &VolumeDetachment) -> Result<()> {
        writeln!(
            w,
            "detached volume {} from namespace {}",
            detachment.id, detachment.namespace
        )?;
        Ok(())
    }

    fn attach_nfs_volume(&self, w: &mut dyn Write, attachment: &NfsAttachment) -> Result<()> {
        writeln!(
            w,
            "attached volume {} from namespace {} for nfs",
            attachment.id, attachment.namespace
        )?;
        Ok(())
    }

    fn update_nfs_volume_endpoint(
        &self,
        w: &mut dyn Write,
        update: &NfsEndpointUpdate,
    ) -> Result<()> {
        writeln!(
            w,
            "set nfs mount endpoint of volume {} in namespace {} to {}",
            update.id, update.namespace, update.mount_endpoint
        )?;
        Ok(())
    }

    fn update_nfs_volume_exports(
        &self,
        w: &mut dyn Write,
        update: &NfsExportsUpdate,
    ) -> Result<()> {
        writeln!(
            w,
            "set {} nfs exports on volume {} in namespace {}",
            update.exports.len(),
            update.id,
            update.namespace
        )?;
        if update.exports.is_empty() {
            return Ok(());
        }

        let rows: Vec<Vec<String>> = update
            .exports
            .iter()
            .map(|e| {
                vec![
                    e.export_id.to_string(),
                    e.path.clone(),
                    e.pseudo_path.clone(),
                    e.acls.len().to_string(),
                ]
            })
            .collect();
        write_table(w, &["ID", "PATH", "PSEUDO PATH", "ACLS"], &rows)
    }

    fn delete_volume(&self, w: &mut dyn Write, deletion: &VolumeDeletion) -> Result<()> {
        writeln!(
            w,
            "deleted volume {} from namespace {}",
            deletion.id, deletion.namespace
        )?;
        Ok(())
    }

    fn delete_node(&self, w: &mut dyn Write, deletion: &NodeDeletion) -> Result<()> {
        writeln!(w, "deleted node {}", deletion.id)?;
        Ok(())
    }

    fn delete_namespace(&self, w: &mut dyn Write, deletion: &NamespaceDeletion) -> Result<()> {
        writeln!(w, "deleted namespace {}", deletion.id)?;
        Ok(())
    }

    fn delete_user(&self, w: &mut dyn Write, deletion: &UserDeletion) -> Result<()> {
        writeln!(w, "deleted user {}", deletion.id)?;
        Ok(())
    }

    fn delete_policy_group(&self, w: &mut dyn Write, deletion: &PolicyGroupDeletion) -> Result<()> {
        writeln!(w, "deleted policy group {}", deletion.id)?;
        Ok(())
    }

    fn async_request(&self, w: &mut dyn Write) -> Result<()> {
        writeln!(w, "{}", ASYNC_REQUEST_MESSAGE)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{NamespaceId, NodeId, VolumeId};
    use chrono::TimeZone;

    fn render(f: impl FnOnce(&TextDisplayer, &mut Vec<u8>) -> Result<()>) -> String {
        let now = Utc.with_ymd_and_hms(2000, 1, 2, 0, 0, 0).unwrap();
        let mut buf = Vec::new();
        f(&TextDisplayer::with_now(now), &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(5 * 1024 * 1024 * 1024), "5.0 GiB");
        assert_eq!(format_bytes(42 * 1024 * 1024 * 1024), "42 GiB");
        assert_eq!(format_bytes(1536), "1.5 KiB");
    }

    #[test]
    fn test_format_age() {
        let now = Utc.with_ymd_and_hms(2000, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(
            format_age(now - chrono::Duration::seconds(30), now),
            "30 seconds ago"
        );
        assert_eq!(
            format_age(now - chrono::Duration::minutes(5), now),
            "5 minutes ago"
        );
        assert_eq!(format_age(now - chrono::Duration::hours(3), now), "3 hours ago");
        assert_eq!(format_age(now - chrono::Duration::days(2), now), "2 days ago");
        assert_eq!(
            format_age(now + chrono::Duration::days(3), now),
            "3 days from now"
        );
    }

    #[test]
    fn test_delete_confirmations() {
        let out = render(|d, w| {
            d.delete_volume(
                w,
                &VolumeDeletion {
                    id: VolumeId::from("v1"),
                    namespace: NamespaceId::from("ns1"),
                },
            )?;
            d.delete_node(w, &NodeDeletion { id: NodeId::from("n1") })
        });
        assert_eq!(out, "deleted volume v1 from namespace ns1\ndeleted node n1\n");
    }

    #[test]
    fn test_node_table_alignment() {
        let now = Utc.with_ymd_and_hms(2000, 1, 2, 0, 0, 0).unwrap();
        let nodes = vec![
            Node {
                name: "a".into(),
                created_at: now - chrono::Duration::hours(1),
                ..Default::default()
            },
            Node {
                name: "longer-name".into(),
                created_at: now - chrono::Duration::days(1),
                ..Default::default()
            },
        ];

        let out = render(|d, w| d.get_list_nodes(w, &nodes));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "NAME         HEALTH   AGE         LABELS");
        assert_eq!(lines[1], "a            unknown  1 hour ago");
        assert_eq!(lines[2], "longer-name  unknown  1 day ago");
    }
}
