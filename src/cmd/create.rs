//! `create` - create new resources

use super::run::{authenticate, namespaced};
use super::selectors::parse_labels;
use super::size::parse_size;
use super::{AsyncFlag, CommandContext};
use crate::client::RequestParams;
use crate::domain::ids::{NamespaceId, PolicyGroupId};
use crate::domain::ports::{Completion, CreateNamespace, CreatePolicyGroup, CreateUser, CreateVolume};
use crate::domain::resources::{Namespace, PolicySpec};
use crate::domain::volume::{LABEL_NO_CACHE, LABEL_NO_COMPRESS, LABEL_REPLICAS, LABEL_THROTTLE};
use crate::error::{Error, ResourceKind, Result};
use crate::output;
use clap::{Args, Subcommand};
use std::io::Write;
use tracing::info;

/// Size of a new volume unless given
pub const DEFAULT_VOLUME_SIZE: &str = "5GiB";

/// Filesystem of a new volume unless given
pub const DEFAULT_FILESYSTEM: &str = "ext4";

#[derive(Subcommand, Debug)]
pub enum CreateCommand {
    /// Create a new user account
    User(CreateUserArgs),

    /// Provision a new volume
    Volume(CreateVolumeArgs),

    /// Create a new namespace
    Namespace(CreateNamespaceArgs),

    /// Create a new policy group
    #[command(name = "policy-group", alias = "policygroup")]
    PolicyGroup(CreatePolicyGroupArgs),
}

#[derive(Args, Debug, Clone)]
pub struct CreateUserArgs {
    /// Username of the new account
    pub name: String,

    /// Password of the new account
    #[arg(long)]
    pub password: String,

    /// Grant administrative privileges
    #[arg(long)]
    pub admin: bool,

    /// Policy groups (names, or IDs with --use-ids) to add the user to
    #[arg(long, value_delimiter = ',')]
    pub groups: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CreateVolumeArgs {
    /// Name of the new volume
    pub name: String,

    /// Provisioned capacity (e.g. 5GiB, 10G)
    #[arg(short = 's', long, default_value = DEFAULT_VOLUME_SIZE)]
    pub size: String,

    /// Human-readable description
    #[arg(short = 'd', long, default_value = "")]
    pub description: String,

    /// Filesystem to format the volume with
    #[arg(long = "fs-type", default_value = DEFAULT_FILESYSTEM)]
    pub filesystem: String,

    /// Labels to apply (key=value, comma separated)
    #[arg(long)]
    pub labels: Vec<String>,

    /// Number of replicas to maintain
    #[arg(short = 'r', long)]
    pub replicas: Option<u64>,

    /// Disable caching for the volume
    #[arg(long)]
    pub no_cache: bool,

    /// Disable compression for the volume
    #[arg(long)]
    pub no_compress: bool,

    /// Throttle the volume's IO
    #[arg(long)]
    pub throttle: bool,

    #[command(flatten)]
    pub asynchronous: AsyncFlag,
}

#[derive(Args, Debug, Clone)]
pub struct CreateNamespaceArgs {
    /// Name of the new namespace
    pub name: String,

    /// Labels to apply (key=value, comma separated)
    #[arg(long)]
    pub labels: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CreatePolicyGroupArgs {
    /// Name of the new policy group
    pub name: String,

    /// Access rule as namespace:resource-type[:ro]; may be repeated
    #[arg(long = "rule")]
    pub rules: Vec<String>,
}

pub async fn run(cmd: CreateCommand, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    match cmd {
        CreateCommand::User(args) => create_user(args, ctx, w).await,
        CreateCommand::Volume(args) => create_volume(args, ctx, w).await,
        CreateCommand::Namespace(args) => create_namespace(args, ctx, w).await,
        CreateCommand::PolicyGroup(args) => create_policy_group(args, ctx, w).await,
    }
}

// =============================================================================
// User
// =============================================================================

async fn create_user(args: CreateUserArgs, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    authenticate(ctx).await?;

    let groups: Vec<PolicyGroupId> = if args.groups.is_empty() {
        Vec::new()
    } else if ctx.config.use_ids()? {
        args.groups.iter().map(PolicyGroupId::from).collect()
    } else {
        ctx.client
            .get_list_policy_groups_by_name(&args.groups)
            .await?
            .into_iter()
            .map(|g| g.id)
            .collect()
    };

    let user = ctx
        .client
        .create_user(&CreateUser {
            username: args.name,
            password: args.password,
            is_admin: args.admin,
            groups,
        })
        .await?;
    info!(user = %user.id, "created user");

    let index = ctx.client.policy_group_index().await?;
    ctx.display.create_user(w, &output::User::new(&user, &index))
}

// =============================================================================
// Volume
// =============================================================================

/// Build the creation request from the command's flags
pub fn volume_request(args: &CreateVolumeArgs) -> Result<CreateVolume> {
    let mut labels = parse_labels(&args.labels)?;
    if let Some(replicas) = args.replicas {
        labels.insert(LABEL_REPLICAS.to_string(), replicas.to_string());
    }
    if args.no_cache {
        labels.insert(LABEL_NO_CACHE.to_string(), "true".to_string());
    }
    if args.no_compress {
        labels.insert(LABEL_NO_COMPRESS.to_string(), "true".to_string());
    }
    if args.throttle {
        labels.insert(LABEL_THROTTLE.to_string(), "true".to_string());
    }

    Ok(CreateVolume {
        name: args.name.clone(),
        description: args.description.clone(),
        filesystem: args.filesystem.clone(),
        size_bytes: parse_size(&args.size)?,
        labels,
    })
}

async fn create_volume(
    args: CreateVolumeArgs,
    ctx: &CommandContext,
    w: &mut dyn Write,
) -> Result<()> {
    let ns_ref = namespaced(ctx.config.as_ref())?;
    let request = volume_request(&args)?;
    let params = if args.asynchronous.use_async {
        RequestParams::new().with_async(ctx.config.command_timeout()?)
    } else {
        RequestParams::new()
    };
    authenticate(ctx).await?;

    let ns: Namespace = ctx.namespace(&ns_ref).await?;
    match ctx.client.create_volume(&ns.id, &request, &params).await? {
        Completion::Done(vol) if !params.is_async() => {
            info!(volume = %vol.id, namespace = %ns.id, "created volume");
            let nodes = ctx.client.node_index().await?;
            ctx.display
                .create_volume(w, &output::Volume::new(&vol, &ns, &nodes))
        }
        _ => {
            info!(volume = %request.name, namespace = %ns.id, "volume creation accepted");
            ctx.display.async_request(w)
        }
    }
}

// =============================================================================
// Namespace
// =============================================================================

async fn create_namespace(
    args: CreateNamespaceArgs,
    ctx: &CommandContext,
    w: &mut dyn Write,
) -> Result<()> {
    let labels = parse_labels(&args.labels)?;
    authenticate(ctx).await?;

    let ns = ctx
        .client
        .create_namespace(&CreateNamespace {
            name: args.name,
            labels,
        })
        .await?;
    info!(namespace = %ns.id, "created namespace");
    ctx.display.create_namespace(w, &ns)
}

// =============================================================================
// Policy Group
// =============================================================================

/// A parsed `--rule` value with the namespace still unresolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    pub namespace: String,
    pub resource_type: String,
    pub read_only: bool,
}

/// Parse `namespace:resource-type[:ro]`
pub fn parse_rule(s: &str) -> Result<Rule> {
    let invalid = || {
        Error::Argument(format!(
            "invalid rule {:?}, expected namespace:resource-type[:ro]",
            s
        ))
    };

    let parts: Vec<&str> = s.split(':').map(str::trim).collect();
    let (namespace, resource_type, read_only) = match parts.as_slice() {
        [ns, kind] => (*ns, *kind, false),
        [ns, kind, "ro"] => (*ns, *kind, true),
        [ns, kind, "rw"] => (*ns, *kind, false),
        _ => return Err(invalid()),
    };
    if namespace.is_empty() || resource_type.is_empty() {
        return Err(invalid());
    }

    Ok(Rule {
        namespace: namespace.to_string(),
        resource_type: resource_type.to_string(),
        read_only,
    })
}

async fn create_policy_group(
    args: CreatePolicyGroupArgs,
    ctx: &CommandContext,
    w: &mut dyn Write,
) -> Result<()> {
    let rules = args
        .rules
        .iter()
        .map(|r| parse_rule(r))
        .collect::<Result<Vec<_>>>()?;
    authenticate(ctx).await?;

    let use_ids = ctx.config.use_ids()?;
    let namespaces = if use_ids || rules.is_empty() {
        Vec::new()
    } else {
        ctx.client.list_namespaces().await?
    };

    let mut specs = Vec::with_capacity(rules.len());
    for rule in rules {
        let namespace_id = if use_ids {
            NamespaceId::from(rule.namespace)
        } else {
            namespaces
                .iter()
                .find(|ns| ns.name == rule.namespace)
                .map(|ns| ns.id.clone())
                .ok_or_else(|| Error::name_not_found(ResourceKind::Namespace, &rule.namespace))?
        };
        specs.push(PolicySpec {
            namespace_id,
            resource_type: rule.resource_type,
            read_only: rule.read_only,
        });
    }

    let group = ctx
        .client
        .create_policy_group(&CreatePolicyGroup {
            name: args.name,
            specs,
        })
        .await?;
    info!(policy_group = %group.id, "created policy group");
    ctx.display.create_policy_group(w, &group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn volume_args() -> CreateVolumeArgs {
        CreateVolumeArgs {
            name: "data".into(),
            size: DEFAULT_VOLUME_SIZE.into(),
            description: String::new(),
            filesystem: DEFAULT_FILESYSTEM.into(),
            labels: Vec::new(),
            replicas: None,
            no_cache: false,
            no_compress: false,
            throttle: false,
            asynchronous: AsyncFlag::default(),
        }
    }

    #[test]
    fn test_volume_request_defaults() {
        let req = volume_request(&volume_args()).unwrap();
        assert_eq!(req.size_bytes, 5 * (1 << 30));
        assert_eq!(req.filesystem, "ext4");
        assert!(req.labels.is_empty());
    }

    #[test]
    fn test_volume_request_feature_labels() {
        let args = CreateVolumeArgs {
            labels: vec!["app=db".into()],
            replicas: Some(2),
            no_cache: true,
            throttle: true,
            ..volume_args()
        };
        let req = volume_request(&args).unwrap();
        assert_eq!(req.labels["app"], "db");
        assert_eq!(req.labels[LABEL_REPLICAS], "2");
        assert_eq!(req.labels[LABEL_NO_CACHE], "true");
        assert_eq!(req.labels[LABEL_THROTTLE], "true");
        assert!(!req.labels.contains_key(LABEL_NO_COMPRESS));
    }

    #[test]
    fn test_volume_request_bad_size() {
        let args = CreateVolumeArgs {
            size: "lots".into(),
            ..volume_args()
        };
        assert_matches!(volume_request(&args), Err(Error::CapacityParse(_)));
    }

    #[test]
    fn test_parse_rule() {
        assert_eq!(
            parse_rule("prod:volume").unwrap(),
            Rule {
                namespace: "prod".into(),
                resource_type: "volume".into(),
                read_only: false,
            }
        );
        assert!(parse_rule("prod:volume:ro").unwrap().read_only);
        assert_matches!(parse_rule("prod"), Err(Error::Argument(_)));
        assert_matches!(parse_rule(":volume"), Err(Error::Argument(_)));
        assert_matches!(parse_rule("prod:volume:maybe"), Err(Error::Argument(_)));
    }
}
