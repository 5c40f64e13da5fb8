//! `nfs` - attach volumes for NFS sharing and manage their exports

use super::run::{authenticate, namespaced};
use super::{AsyncFlag, CasFlag, CommandContext};
use crate::domain::volume::NfsExport;
use crate::error::{Error, Result};
use crate::output::{NfsAttachment, NfsEndpointUpdate, NfsExportsUpdate};
use clap::{Args, Subcommand};
use std::io::Write;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum NfsCommand {
    /// Attach a volume so it can be shared over NFS
    Attach(NfsAttachArgs),

    /// Set the endpoint NFS clients mount a volume from
    SetEndpoint(SetEndpointArgs),

    /// Replace the NFS export configuration of a volume
    SetExports(SetExportsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct NfsAttachArgs {
    /// Name (or ID with --use-ids) of the volume to attach
    pub volume: String,

    #[command(flatten)]
    pub cas: CasFlag,

    #[command(flatten)]
    pub asynchronous: AsyncFlag,
}

#[derive(Args, Debug, Clone)]
pub struct SetEndpointArgs {
    /// Name (or ID with --use-ids) of the volume
    pub volume: String,

    /// Mount endpoint, e.g. 10.0.0.5:2049
    pub endpoint: String,

    #[command(flatten)]
    pub cas: CasFlag,
}

#[derive(Args, Debug, Clone)]
pub struct SetExportsArgs {
    /// Name (or ID with --use-ids) of the volume
    pub volume: String,

    /// Export configurations as a JSON array
    pub exports: String,

    #[command(flatten)]
    pub cas: CasFlag,
}

pub async fn run(cmd: NfsCommand, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    match cmd {
        NfsCommand::Attach(args) => attach(args, ctx, w).await,
        NfsCommand::SetEndpoint(args) => set_endpoint(args, ctx, w).await,
        NfsCommand::SetExports(args) => set_exports(args, ctx, w).await,
    }
}

/// Parse a JSON array of export configurations
pub fn parse_exports(raw: &str) -> Result<Vec<NfsExport>> {
    serde_json::from_str(raw).map_err(|e| Error::Argument(format!("invalid nfs exports: {}", e)))
}

async fn attach(args: NfsAttachArgs, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    let ns_ref = namespaced(ctx.config.as_ref())?;
    let params = ctx.request_params(&args.cas, args.asynchronous.use_async)?;
    authenticate(ctx).await?;

    let ns = ctx.namespace_id(&ns_ref).await?;
    let id = ctx.volume_id(&ns, &args.volume).await?;

    ctx.client.attach_nfs_volume(&ns, &id, &params).await?;
    info!(volume = %id, "attached volume for nfs");

    if params.is_async() {
        return ctx.display.async_request(w);
    }
    ctx.display
        .attach_nfs_volume(w, &NfsAttachment { id, namespace: ns })
}

async fn set_endpoint(
    args: SetEndpointArgs,
    ctx: &CommandContext,
    w: &mut dyn Write,
) -> Result<()> {
    let endpoint = args.endpoint.trim().to_string();
    if endpoint.is_empty() {
        return Err(Error::Argument("nfs mount endpoint must not be empty".into()));
    }

    let ns_ref = namespaced(ctx.config.as_ref())?;
    let params = ctx.request_params(&args.cas, false)?;
    authenticate(ctx).await?;

    let ns = ctx.namespace_id(&ns_ref).await?;
    let id = ctx.volume_id(&ns, &args.volume).await?;

    ctx.client
        .update_nfs_volume_mount_endpoint(&ns, &id, &endpoint, &params)
        .await?;
    info!(volume = %id, %endpoint, "set nfs mount endpoint");

    ctx.display.update_nfs_volume_endpoint(
        w,
        &NfsEndpointUpdate {
            id,
            namespace: ns,
            mount_endpoint: endpoint,
        },
    )
}

async fn set_exports(args: SetExportsArgs, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    let exports = parse_exports(&args.exports)?;

    let ns_ref = namespaced(ctx.config.as_ref())?;
    let params = ctx.request_params(&args.cas, false)?;
    authenticate(ctx).await?;

    let ns = ctx.namespace_id(&ns_ref).await?;
    let id = ctx.volume_id(&ns, &args.volume).await?;

    ctx.client
        .update_nfs_volume_exports(&ns, &id, &exports, &params)
        .await?;
    info!(volume = %id, exports = exports.len(), "set nfs exports");

    ctx.display.update_nfs_volume_exports(
        w,
        &NfsExportsUpdate {
            id,
            namespace: ns,
            exports,
        },
    )
}
