//! `update` - make changes to existing resources

use super::run::{authenticate, namespaced};
use super::selectors::parse_labels;
use super::size::parse_size;
use super::{AsyncFlag, CasFlag, CommandContext};
use crate::config::parse_bool;
use crate::domain::ports::{ClusterUpdate, Completion};
use crate::error::Result;
use crate::output::{self, ReplicasUpdate, VolumeUpdate};
use clap::{Args, Subcommand};
use std::io::Write;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum UpdateCommand {
    /// Make changes to an existing volume
    #[command(subcommand)]
    Volume(UpdateVolumeCommand),

    /// Change cluster-wide configuration
    Cluster(UpdateClusterArgs),
}

#[derive(Subcommand, Debug)]
pub enum UpdateVolumeCommand {
    /// Update a volume's size
    Size(VolumeSizeArgs),

    /// Update a volume's description
    Description(VolumeDescriptionArgs),

    /// Replace a volume's labels
    Labels(VolumeLabelsArgs),

    /// Change the number of replicas maintained for a volume
    Replicas(VolumeReplicasArgs),
}

#[derive(Args, Debug, Clone)]
pub struct VolumeSizeArgs {
    /// Name (or ID with --use-ids) of the volume
    pub volume: String,

    /// New capacity (e.g. 42GiB)
    pub size: String,

    #[command(flatten)]
    pub cas: CasFlag,

    #[command(flatten)]
    pub asynchronous: AsyncFlag,
}

#[derive(Args, Debug, Clone)]
pub struct VolumeDescriptionArgs {
    /// Name (or ID with --use-ids) of the volume
    pub volume: String,

    /// New description
    pub description: String,

    #[command(flatten)]
    pub cas: CasFlag,
}

#[derive(Args, Debug, Clone)]
pub struct VolumeLabelsArgs {
    /// Name (or ID with --use-ids) of the volume
    pub volume: String,

    /// New label set (key=value, comma separated)
    #[arg(required = true)]
    pub labels: Vec<String>,

    #[command(flatten)]
    pub cas: CasFlag,
}

#[derive(Args, Debug, Clone)]
pub struct VolumeReplicasArgs {
    /// Name (or ID with --use-ids) of the volume
    pub volume: String,

    /// Number of replicas
    pub replicas: u64,

    #[command(flatten)]
    pub cas: CasFlag,

    #[command(flatten)]
    pub asynchronous: AsyncFlag,
}

#[derive(Args, Debug, Clone, Default)]
pub struct UpdateClusterArgs {
    /// Cluster log level
    #[arg(long)]
    pub log_level: Option<String>,

    /// Cluster log format
    #[arg(long)]
    pub log_format: Option<String>,

    /// Disable anonymous usage reporting
    #[arg(long, value_parser = parse_bool)]
    pub disable_telemetry: Option<bool>,

    /// Disable crash reporting
    #[arg(long, value_parser = parse_bool)]
    pub disable_crash_reporting: Option<bool>,

    /// Disable checks for newer versions
    #[arg(long, value_parser = parse_bool)]
    pub disable_version_check: Option<bool>,

    #[command(flatten)]
    pub cas: CasFlag,
}

impl UpdateClusterArgs {
    /// Overlay the given flags onto the current settings
    pub fn apply_to(&self, mut update: ClusterUpdate) -> ClusterUpdate {
        if let Some(level) = &self.log_level {
            update.log_level = level.clone();
        }
        if let Some(format) = &self.log_format {
            update.log_format = format.clone();
        }
        if let Some(v) = self.disable_telemetry {
            update.disable_telemetry = v;
        }
        if let Some(v) = self.disable_crash_reporting {
            update.disable_crash_reporting = v;
        }
        if let Some(v) = self.disable_version_check {
            update.disable_version_check = v;
        }
        update
    }
}

pub async fn run(cmd: UpdateCommand, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    match cmd {
        UpdateCommand::Volume(UpdateVolumeCommand::Size(args)) => resize(args, ctx, w).await,
        UpdateCommand::Volume(UpdateVolumeCommand::Description(args)) => {
            describe(args, ctx, w).await
        }
        UpdateCommand::Volume(UpdateVolumeCommand::Labels(args)) => relabel(args, ctx, w).await,
        UpdateCommand::Volume(UpdateVolumeCommand::Replicas(args)) => {
            set_replicas(args, ctx, w).await
        }
        UpdateCommand::Cluster(args) => update_cluster(args, ctx, w).await,
    }
}

async fn resize(args: VolumeSizeArgs, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    let ns_ref = namespaced(ctx.config.as_ref())?;
    let size_bytes = parse_size(&args.size)?;
    let params = ctx.request_params(&args.cas, args.asynchronous.use_async)?;
    authenticate(ctx).await?;

    let ns = ctx.namespace_id(&ns_ref).await?;
    let id = ctx.volume_id(&ns, &args.volume).await?;

    let completion = ctx.client.resize_volume(&ns, &id, size_bytes, &params).await?;
    info!(volume = %id, size_bytes, "requested volume resize");

    match completion {
        Completion::Done(vol) if !params.is_async() => {
            ctx.display.update_volume(w, &VolumeUpdate::from(&vol))
        }
        _ => ctx.display.async_request(w),
    }
}

async fn describe(
    args: VolumeDescriptionArgs,
    ctx: &CommandContext,
    w: &mut dyn Write,
) -> Result<()> {
    let ns_ref = namespaced(ctx.config.as_ref())?;
    let params = ctx.request_params(&args.cas, false)?;
    authenticate(ctx).await?;

    let ns = ctx.namespace_id(&ns_ref).await?;
    let id = ctx.volume_id(&ns, &args.volume).await?;
    let vol = ctx
        .client
        .update_volume_description(&ns, &id, &args.description, &params)
        .await?;
    ctx.display.update_volume(w, &VolumeUpdate::from(&vol))
}

async fn relabel(args: VolumeLabelsArgs, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    let ns_ref = namespaced(ctx.config.as_ref())?;
    let labels = parse_labels(&args.labels)?;
    let params = ctx.request_params(&args.cas, false)?;
    authenticate(ctx).await?;

    let ns = ctx.namespace_id(&ns_ref).await?;
    let id = ctx.volume_id(&ns, &args.volume).await?;
    let vol = ctx
        .client
        .update_volume_labels(&ns, &id, &labels, &params)
        .await?;
    ctx.display.update_volume(w, &VolumeUpdate::from(&vol))
}

async fn set_replicas(
    args: VolumeReplicasArgs,
    ctx: &CommandContext,
    w: &mut dyn Write,
) -> Result<()> {
    let ns_ref = namespaced(ctx.config.as_ref())?;
    let params = ctx.request_params(&args.cas, args.asynchronous.use_async)?;
    authenticate(ctx).await?;

    let ns = ctx.namespace_id(&ns_ref).await?;
    let id = ctx.volume_id(&ns, &args.volume).await?;
    ctx.client
        .set_replicas(&ns, &id, args.replicas, &params)
        .await?;
    info!(volume = %id, replicas = args.replicas, "requested replica change");

    if params.is_async() {
        return ctx.display.async_request(w);
    }
    ctx.display.set_replicas(
        w,
        &ReplicasUpdate {
            id,
            namespace: ns,
            replicas: args.replicas,
        },
    )
}

async fn update_cluster(
    args: UpdateClusterArgs,
    ctx: &CommandContext,
    w: &mut dyn Write,
) -> Result<()> {
    let params = ctx.request_params(&args.cas, false)?;
    authenticate(ctx).await?;

    let current = ctx.client.get_cluster().await?;
    let update = args.apply_to(ClusterUpdate::from(&current));
    let updated = ctx.client.update_cluster(&update, &params).await?;
    info!(cluster = %updated.id, "updated cluster configuration");

    let nodes = ctx.client.list_nodes().await?;
    ctx.display
        .update_cluster(w, &output::Cluster::new(&updated, nodes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_flags_overlay_current_settings() {
        let current = ClusterUpdate {
            disable_telemetry: false,
            disable_crash_reporting: true,
            disable_version_check: false,
            log_level: "info".into(),
            log_format: "json".into(),
        };
        let args = UpdateClusterArgs {
            log_level: Some("debug".into()),
            disable_telemetry: Some(true),
            ..Default::default()
        };

        let update = args.apply_to(current);
        assert_eq!(update.log_level, "debug");
        assert_eq!(update.log_format, "json");
        assert!(update.disable_telemetry);
        assert!(update.disable_crash_reporting);
        assert!(!update.disable_version_check);
    }
}
