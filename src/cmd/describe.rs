//! `describe` - show detailed information for resources

use super::get::{get_node, get_volume, list_nodes, list_volumes, LabelledTargets};
use super::run::{authenticate, ensure_target_or_selectors, namespaced};
use super::selectors::Selector;
use super::CommandContext;
use crate::error::Result;
use crate::output::{self, NodeDescription};
use clap::Subcommand;
use std::io::Write;

#[derive(Subcommand, Debug)]
pub enum DescribeCommand {
    /// Show detailed information for nodes, including hosted volumes
    #[command(alias = "nodes")]
    Node(LabelledTargets),

    /// Show detailed information for volumes
    #[command(alias = "volumes")]
    Volume(LabelledTargets),

    /// Show cluster-wide configuration and its nodes
    Cluster,
}

pub async fn run(cmd: DescribeCommand, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    match cmd {
        DescribeCommand::Node(args) => describe_nodes(args, ctx, w).await,
        DescribeCommand::Volume(args) => describe_volumes(args, ctx, w).await,
        DescribeCommand::Cluster => describe_cluster(ctx, w).await,
    }
}

async fn describe_nodes(
    args: LabelledTargets,
    ctx: &CommandContext,
    w: &mut dyn Write,
) -> Result<()> {
    ensure_target_or_selectors(&args.names, &args.selector.selectors)?;
    let selector = Selector::from_strings(&args.selector.selectors)?;
    authenticate(ctx).await?;

    let single = match args.names.as_slice() {
        [reference] => Some(get_node(ctx, reference).await?),
        _ => None,
    };

    let volumes = ctx.client.get_all_volumes().await?;
    let namespaces = ctx.client.namespace_index().await?;

    if let Some(node) = single {
        let desc = NodeDescription::new(&node, &volumes, &namespaces);
        return ctx.display.describe_node(w, &desc);
    }

    let nodes = selector.filter(list_nodes(ctx, &args.names).await?);
    let descs: Vec<NodeDescription> = nodes
        .iter()
        .map(|n| NodeDescription::new(n, &volumes, &namespaces))
        .collect();
    ctx.display.describe_list_nodes(w, &descs)
}

async fn describe_volumes(
    args: LabelledTargets,
    ctx: &CommandContext,
    w: &mut dyn Write,
) -> Result<()> {
    let ns_ref = namespaced(ctx.config.as_ref())?;
    ensure_target_or_selectors(&args.names, &args.selector.selectors)?;
    let selector = Selector::from_strings(&args.selector.selectors)?;
    authenticate(ctx).await?;

    let ns = ctx.namespace(&ns_ref).await?;

    if let [reference] = args.names.as_slice() {
        let vol = get_volume(ctx, &ns.id, reference).await?;
        let nodes = ctx.client.node_index().await?;
        return ctx
            .display
            .describe_volume(w, &output::Volume::new(&vol, &ns, &nodes));
    }

    let volumes = selector.filter(list_volumes(ctx, &ns.id, &args.names).await?);
    let nodes = ctx.client.node_index().await?;
    let out: Vec<output::Volume> = volumes
        .iter()
        .map(|vol| output::Volume::new(vol, &ns, &nodes))
        .collect();
    ctx.display.describe_list_volumes(w, &out)
}

async fn describe_cluster(ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    authenticate(ctx).await?;
    let cluster = ctx.client.get_cluster().await?;
    let nodes = ctx.client.list_nodes().await?;
    ctx.display
        .describe_cluster(w, &output::Cluster::new(&cluster, nodes))
}
