//! `delete` - delete resources in the cluster

use super::run::{authenticate, namespaced};
use super::{AsyncFlag, CasFlag, CommandContext};
use crate::client::DeleteVolumeParams;
use crate::error::Result;
use crate::output::{
    NamespaceDeletion, NodeDeletion, PolicyGroupDeletion, UserDeletion, VolumeDeletion,
};
use clap::{Args, Subcommand};
use std::io::Write;
use tracing::info;

#[derive(Subcommand, Debug)]
pub enum DeleteCommand {
    /// Delete a volume
    Volume(DeleteVolumeArgs),

    /// Delete a namespace
    Namespace(DeleteArgs),

    /// Delete a user account
    User(DeleteArgs),

    /// Remove a node from the cluster
    Node(DeleteNodeArgs),

    /// Delete a policy group
    #[command(name = "policy-group", alias = "policygroup")]
    PolicyGroup(DeleteArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// Name (or ID with --use-ids) of the resource to delete
    pub name: String,

    #[command(flatten)]
    pub cas: CasFlag,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteNodeArgs {
    /// Name (or ID with --use-ids) of the node to delete
    pub name: String,

    #[command(flatten)]
    pub cas: CasFlag,

    #[command(flatten)]
    pub asynchronous: AsyncFlag,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteVolumeArgs {
    /// Name (or ID with --use-ids) of the volume to delete
    pub name: String,

    /// Delete the volume even when its master deployment is offline
    #[arg(long)]
    pub offline_delete: bool,

    #[command(flatten)]
    pub cas: CasFlag,

    #[command(flatten)]
    pub asynchronous: AsyncFlag,
}

pub async fn run(cmd: DeleteCommand, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    match cmd {
        DeleteCommand::Volume(args) => delete_volume(args, ctx, w).await,
        DeleteCommand::Namespace(args) => delete_namespace(args, ctx, w).await,
        DeleteCommand::User(args) => delete_user(args, ctx, w).await,
        DeleteCommand::Node(args) => delete_node(args, ctx, w).await,
        DeleteCommand::PolicyGroup(args) => delete_policy_group(args, ctx, w).await,
    }
}

async fn delete_volume(
    args: DeleteVolumeArgs,
    ctx: &CommandContext,
    w: &mut dyn Write,
) -> Result<()> {
    let ns_ref = namespaced(ctx.config.as_ref())?;
    let params = DeleteVolumeParams {
        request: ctx.request_params(&args.cas, args.asynchronous.use_async)?,
        offline_delete: args.offline_delete,
    };
    authenticate(ctx).await?;

    let ns = ctx.namespace_id(&ns_ref).await?;
    let id = ctx.volume_id(&ns, &args.name).await?;
    ctx.client.delete_volume(&ns, &id, &params).await?;
    info!(volume = %id, namespace = %ns, offline = params.offline_delete, "deleted volume");

    if params.request.is_async() {
        return ctx.display.async_request(w);
    }
    ctx.display
        .delete_volume(w, &VolumeDeletion { id, namespace: ns })
}

async fn delete_namespace(args: DeleteArgs, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    let params = ctx.request_params(&args.cas, false)?;
    authenticate(ctx).await?;

    let id = ctx.namespace_id(&args.name).await?;
    ctx.client.delete_namespace(&id, &params).await?;
    info!(namespace = %id, "deleted namespace");
    ctx.display.delete_namespace(w, &NamespaceDeletion { id })
}

async fn delete_user(args: DeleteArgs, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    let params = ctx.request_params(&args.cas, false)?;
    authenticate(ctx).await?;

    let id = ctx.user_id(&args.name).await?;
    ctx.client.delete_user(&id, &params).await?;
    info!(user = %id, "deleted user");
    ctx.display.delete_user(w, &UserDeletion { id })
}

async fn delete_node(args: DeleteNodeArgs, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    let params = ctx.request_params(&args.cas, args.asynchronous.use_async)?;
    authenticate(ctx).await?;

    let id = ctx.node_id(&args.name).await?;
    ctx.client.delete_node(&id, &params).await?;
    info!(node = %id, "deleted node");

    if params.is_async() {
        return ctx.display.async_request(w);
    }
    ctx.display.delete_node(w, &NodeDeletion { id })
}

async fn delete_policy_group(
    args: DeleteArgs,
    ctx: &CommandContext,
    w: &mut dyn Write,
) -> Result<()> {
    let params = ctx.request_params(&args.cas, false)?;
    authenticate(ctx).await?;

    let id = ctx.policy_group_id(&args.name).await?;
    ctx.client.delete_policy_group(&id, &params).await?;
    info!(policy_group = %id, "deleted policy group");
    ctx.display
        .delete_policy_group(w, &PolicyGroupDeletion { id })
}
