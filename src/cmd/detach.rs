//! `detach` - detach a volume from its current location

use super::run::{authenticate, namespaced};
use super::{AsyncFlag, CasFlag, CommandContext};
use crate::error::Result;
use crate::output::VolumeDetachment;
use clap::Args;
use std::io::Write;
use tracing::info;

#[derive(Args, Debug, Clone)]
pub struct DetachArgs {
    /// Name (or ID with --use-ids) of the volume to detach
    pub volume: String,

    #[command(flatten)]
    pub cas: CasFlag,

    #[command(flatten)]
    pub asynchronous: AsyncFlag,
}

pub async fn run(args: DetachArgs, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    let ns_ref = namespaced(ctx.config.as_ref())?;
    let params = ctx.request_params(&args.cas, args.asynchronous.use_async)?;
    authenticate(ctx).await?;

    let ns = ctx.namespace_id(&ns_ref).await?;
    let id = ctx.volume_id(&ns, &args.volume).await?;

    ctx.client.detach_volume(&ns, &id, &params).await?;
    info!(volume = %id, "detached volume");

    if params.is_async() {
        return ctx.display.async_request(w);
    }
    ctx.display
        .detach_volume(w, &VolumeDetachment { id, namespace: ns })
}
