//! `apply` - make changes to existing resources from a file

use super::run::authenticate;
use super::{CasFlag, CommandContext};
use crate::error::{Error, Result};
use crate::output;
use clap::{Args, Subcommand};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum ApplyCommand {
    /// Apply a product licence to the cluster
    #[command(alias = "license")]
    Licence(ApplyLicenceArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ApplyLicenceArgs {
    /// File holding the licence key, or - for standard input
    pub file: PathBuf,

    #[command(flatten)]
    pub cas: CasFlag,
}

pub async fn run(cmd: ApplyCommand, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    match cmd {
        ApplyCommand::Licence(args) => apply_licence(args, ctx, w).await,
    }
}

/// Read a licence key from `path` (`-` is standard input)
pub fn read_licence_key(path: &Path) -> Result<String> {
    let mut key = String::new();
    if path == Path::new("-") {
        std::io::stdin().read_to_string(&mut key)?;
    } else {
        key = std::fs::read_to_string(path)?;
    }

    let key = key.trim();
    if key.is_empty() {
        return Err(Error::Argument(format!(
            "licence file {} is empty",
            path.display()
        )));
    }
    Ok(key.to_string())
}

async fn apply_licence(args: ApplyLicenceArgs, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    let key = read_licence_key(&args.file)?;
    let params = ctx.request_params(&args.cas, false)?;
    authenticate(ctx).await?;

    let licence = ctx.client.update_licence(&key, &params).await?;
    info!(cluster = %licence.cluster_id, kind = %licence.kind, "applied licence");
    ctx.display
        .update_licence(w, &output::Licence::from(&licence))
}
