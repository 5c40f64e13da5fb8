//! `attach` - attach a volume to a node

use super::run::{authenticate, namespaced};
use super::CommandContext;
use crate::error::Result;
use crate::output::VolumeAttachment;
use clap::Args;
use std::io::Write;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct AttachArgs {
    /// Name (or ID with --use-ids) of the volume to attach
    pub volume: String,

    /// Name (or ID with --use-ids) of the node to attach it to
    pub node: String,
}

pub async fn run(args: AttachArgs, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    let ns_ref = namespaced(ctx.config.as_ref())?;
    authenticate(ctx).await?;

    let ns = ctx.namespace_id(&ns_ref).await?;
    let volume = ctx.volume_id(&ns, &args.volume).await?;
    let node = ctx.node_id(&args.node).await?;

    ctx.client.attach_volume(&ns, &volume, &node).await?;
    info!(%volume, %node, "attached volume");

    ctx.display.attach_volume(
        w,
        &VolumeAttachment {
            id: volume,
            namespace: ns,
            node,
        },
    )
}
