//! `get` - fetch basic details for resources

use super::run::{authenticate, ensure_target_or_selectors, namespaced};
use super::selectors::Selector;
use super::{CommandContext, SelectorFlag};
use crate::domain::ids::{NamespaceId, NodeId, PolicyGroupId, UserId, VolumeId};
use crate::domain::resources::{Namespace, Node, PolicyGroup, User};
use crate::domain::volume::Volume;
use crate::error::Result;
use crate::output::{self, UNKNOWN_NAME};
use clap::{Args, Subcommand};
use std::collections::HashMap;
use std::io::Write;

#[derive(Subcommand, Debug)]
pub enum GetCommand {
    /// Retrieve basic details of nodes in the cluster
    #[command(alias = "nodes")]
    Node(LabelledTargets),

    /// Retrieve basic details of volumes
    #[command(alias = "volumes")]
    Volume(VolumeTargets),

    /// Retrieve basic details of namespaces
    #[command(alias = "namespaces")]
    Namespace(LabelledTargets),

    /// Retrieve basic details of user accounts
    #[command(alias = "users")]
    User(Targets),

    /// Retrieve basic details of policy groups
    #[command(name = "policy-group", aliases = ["policy-groups", "policygroup", "policygroups"])]
    PolicyGroup(Targets),

    /// Retrieve cluster-wide configuration
    Cluster,

    /// Retrieve the licence applied to the cluster
    #[command(alias = "license")]
    Licence,
}

/// Targets of a resource kind without labels
#[derive(Args, Debug, Clone, Default)]
pub struct Targets {
    /// Names (or IDs with --use-ids) to fetch; all when omitted
    pub names: Vec<String>,
}

/// Targets of a labelled resource kind
#[derive(Args, Debug, Clone, Default)]
pub struct LabelledTargets {
    /// Names (or IDs with --use-ids) to fetch; all when omitted
    pub names: Vec<String>,

    #[command(flatten)]
    pub selector: SelectorFlag,
}

/// Volume targets, optionally across every namespace
#[derive(Args, Debug, Clone, Default)]
pub struct VolumeTargets {
    /// Names (or IDs with --use-ids) to fetch; all when omitted
    pub names: Vec<String>,

    #[command(flatten)]
    pub selector: SelectorFlag,

    /// List volumes in every namespace
    #[arg(short = 'A', long, conflicts_with = "names")]
    pub all_namespaces: bool,
}

pub async fn run(cmd: GetCommand, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    match cmd {
        GetCommand::Node(args) => get_nodes(args, ctx, w).await,
        GetCommand::Volume(args) => get_volumes(args, ctx, w).await,
        GetCommand::Namespace(args) => get_namespaces(args, ctx, w).await,
        GetCommand::User(args) => get_users(args, ctx, w).await,
        GetCommand::PolicyGroup(args) => get_policy_groups(args, ctx, w).await,
        GetCommand::Cluster => get_cluster(ctx, w).await,
        GetCommand::Licence => get_licence(ctx, w).await,
    }
}

// =============================================================================
// Nodes
// =============================================================================

async fn get_nodes(args: LabelledTargets, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    ensure_target_or_selectors(&args.names, &args.selector.selectors)?;
    let selector = Selector::from_strings(&args.selector.selectors)?;
    authenticate(ctx).await?;

    if let [reference] = args.names.as_slice() {
        let node = get_node(ctx, reference).await?;
        return ctx.display.get_node(w, &node);
    }

    let nodes = list_nodes(ctx, &args.names).await?;
    ctx.display.get_list_nodes(w, &selector.filter(nodes))
}

pub(crate) async fn get_node(ctx: &CommandContext, reference: &str) -> Result<Node> {
    if ctx.config.use_ids()? {
        ctx.client.get_node(&NodeId::from(reference)).await
    } else {
        ctx.client.get_node_by_name(reference).await
    }
}

pub(crate) async fn list_nodes(ctx: &CommandContext, refs: &[String]) -> Result<Vec<Node>> {
    if ctx.config.use_ids()? {
        let ids: Vec<NodeId> = refs.iter().map(NodeId::from).collect();
        ctx.client.get_list_nodes_by_uid(&ids).await
    } else {
        ctx.client.get_list_nodes_by_name(refs).await
    }
}

// =============================================================================
// Volumes
// =============================================================================

async fn get_volumes(args: VolumeTargets, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    ensure_target_or_selectors(&args.names, &args.selector.selectors)?;
    let selector = Selector::from_strings(&args.selector.selectors)?;

    if args.all_namespaces {
        authenticate(ctx).await?;
        let volumes = selector.filter(ctx.client.get_all_volumes().await?);
        let namespaces = ctx.client.namespace_index().await?;
        let nodes = ctx.client.node_index().await?;

        let out: Vec<output::Volume> = volumes
            .iter()
            .map(|vol| {
                let ns = namespace_or_unknown(&namespaces, &vol.namespace);
                output::Volume::new(vol, &ns, &nodes)
            })
            .collect();
        return ctx.display.get_list_volumes(w, &out);
    }

    let ns_ref = namespaced(ctx.config.as_ref())?;
    authenticate(ctx).await?;
    let ns = ctx.namespace(&ns_ref).await?;

    if let [reference] = args.names.as_slice() {
        let vol = get_volume(ctx, &ns.id, reference).await?;
        let nodes = ctx.client.node_index().await?;
        return ctx
            .display
            .get_volume(w, &output::Volume::new(&vol, &ns, &nodes));
    }

    let volumes = selector.filter(list_volumes(ctx, &ns.id, &args.names).await?);
    let nodes = ctx.client.node_index().await?;
    let out: Vec<output::Volume> = volumes
        .iter()
        .map(|vol| output::Volume::new(vol, &ns, &nodes))
        .collect();
    ctx.display.get_list_volumes(w, &out)
}

pub(crate) async fn get_volume(
    ctx: &CommandContext,
    ns: &NamespaceId,
    reference: &str,
) -> Result<Volume> {
    if ctx.config.use_ids()? {
        ctx.client.get_volume(ns, &VolumeId::from(reference)).await
    } else {
        ctx.client.get_volume_by_name(ns, reference).await
    }
}

pub(crate) async fn list_volumes(
    ctx: &CommandContext,
    ns: &NamespaceId,
    refs: &[String],
) -> Result<Vec<Volume>> {
    if ctx.config.use_ids()? {
        let ids: Vec<VolumeId> = refs.iter().map(VolumeId::from).collect();
        ctx.client.get_list_volumes_by_uid(ns, &ids).await
    } else {
        ctx.client.get_list_volumes_by_name(ns, refs).await
    }
}

/// Namespace for a volume listed across namespaces
pub(crate) fn namespace_or_unknown(
    namespaces: &HashMap<NamespaceId, Namespace>,
    id: &NamespaceId,
) -> Namespace {
    namespaces.get(id).cloned().unwrap_or_else(|| Namespace {
        id: id.clone(),
        name: UNKNOWN_NAME.to_string(),
        ..Default::default()
    })
}

// =============================================================================
// Namespaces
// =============================================================================

async fn get_namespaces(
    args: LabelledTargets,
    ctx: &CommandContext,
    w: &mut dyn Write,
) -> Result<()> {
    ensure_target_or_selectors(&args.names, &args.selector.selectors)?;
    let selector = Selector::from_strings(&args.selector.selectors)?;
    authenticate(ctx).await?;

    if let [reference] = args.names.as_slice() {
        let ns = ctx.namespace(reference).await?;
        return ctx.display.get_namespace(w, &ns);
    }

    let namespaces = if ctx.config.use_ids()? {
        let ids: Vec<NamespaceId> = args.names.iter().map(NamespaceId::from).collect();
        ctx.client.get_list_namespaces_by_uid(&ids).await?
    } else {
        ctx.client.get_list_namespaces_by_name(&args.names).await?
    };
    ctx.display
        .get_list_namespaces(w, &selector.filter(namespaces))
}

// =============================================================================
// Users
// =============================================================================

async fn get_users(args: Targets, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    authenticate(ctx).await?;

    if let [reference] = args.names.as_slice() {
        let user = if ctx.config.use_ids()? {
            ctx.client.get_user(&UserId::from(reference.as_str())).await?
        } else {
            ctx.client.get_user_by_name(reference).await?
        };
        let groups = ctx.client.policy_group_index().await?;
        return ctx.display.get_user(w, &output::User::new(&user, &groups));
    }

    let users: Vec<User> = if ctx.config.use_ids()? {
        let ids: Vec<UserId> = args.names.iter().map(UserId::from).collect();
        ctx.client.get_list_users_by_uid(&ids).await?
    } else {
        ctx.client.get_list_users_by_username(&args.names).await?
    };
    let groups = ctx.client.policy_group_index().await?;
    let out: Vec<output::User> = users
        .iter()
        .map(|u| output::User::new(u, &groups))
        .collect();
    ctx.display.get_list_users(w, &out)
}

// =============================================================================
// Policy Groups
// =============================================================================

async fn get_policy_groups(args: Targets, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    authenticate(ctx).await?;

    if let [reference] = args.names.as_slice() {
        let group = if ctx.config.use_ids()? {
            ctx.client
                .get_policy_group(&PolicyGroupId::from(reference.as_str()))
                .await?
        } else {
            ctx.client.get_policy_group_by_name(reference).await?
        };
        return ctx.display.get_policy_group(w, &group);
    }

    let groups: Vec<PolicyGroup> = if ctx.config.use_ids()? {
        let ids: Vec<PolicyGroupId> = args.names.iter().map(PolicyGroupId::from).collect();
        ctx.client.get_list_policy_groups_by_uid(&ids).await?
    } else {
        ctx.client.get_list_policy_groups_by_name(&args.names).await?
    };
    ctx.display.get_list_policy_groups(w, &groups)
}

// =============================================================================
// Cluster & Licence
// =============================================================================

async fn get_cluster(ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    authenticate(ctx).await?;
    let cluster = ctx.client.get_cluster().await?;
    let nodes = ctx.client.list_nodes().await?;
    ctx.display
        .get_cluster(w, &output::Cluster::new(&cluster, nodes))
}

async fn get_licence(ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    authenticate(ctx).await?;
    let licence = ctx.client.get_licence().await?;
    ctx.display.get_licence(w, &output::Licence::from(&licence))
}
