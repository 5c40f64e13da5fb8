//! Command tree
//!
//! ```text
//! kubectl-storageos <verb> <resource> [targets...] [flags]
//! ```
//!
//! Each verb lives in its own module. Commands share a [`CommandContext`]
//! holding the resolved configuration, the API client and the displayer
//! chosen by the output format. Positional targets are names unless
//! `--use-ids` is set, in which case they are taken as raw identifiers.

pub mod apply;
pub mod attach;
pub mod create;
pub mod delete;
pub mod describe;
pub mod detach;
pub mod get;
pub mod nfs;
pub mod run;
pub mod selectors;
pub mod size;
pub mod update;

use crate::client::{Client, RequestParams};
use crate::config::{ConfigProvider, GlobalFlags};
use crate::domain::ids::{NamespaceId, NodeId, PolicyGroupId, UserId, VolumeId};
use crate::domain::resources::Namespace;
use crate::error::Result;
use crate::output::{select_displayer, Displayer};
use clap::{Args, Parser, Subcommand};
use std::io::Write;

// =============================================================================
// CLI
// =============================================================================

/// Manage StorageOS clusters, volumes, namespaces, users and policy groups
#[derive(Parser, Debug)]
#[command(name = "kubectl-storageos", author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalFlags,

    /// CLI log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "STORAGEOS_LOG_LEVEL", default_value = "warn")]
    pub cli_log_level: String,

    /// Output CLI logs as JSON
    #[arg(long, global = true, env = "STORAGEOS_LOG_JSON")]
    pub cli_log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Top-level verbs
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Make changes to existing resources from a file
    #[command(subcommand)]
    Apply(apply::ApplyCommand),

    /// Attach a volume to a node
    Attach(attach::AttachArgs),

    /// Create new resources
    #[command(subcommand)]
    Create(create::CreateCommand),

    /// Delete resources in the cluster
    #[command(subcommand)]
    Delete(delete::DeleteCommand),

    /// Show detailed information for resources
    #[command(subcommand)]
    Describe(describe::DescribeCommand),

    /// Detach a volume from its current location
    Detach(detach::DetachArgs),

    /// Fetch basic details for resources
    #[command(subcommand)]
    Get(get::GetCommand),

    /// Make changes and attach nfs volumes
    #[command(subcommand)]
    Nfs(nfs::NfsCommand),

    /// Make changes to existing resources
    #[command(subcommand)]
    Update(update::UpdateCommand),

    /// View version information for the StorageOS CLI
    Version,
}

// =============================================================================
// Shared Flags
// =============================================================================

/// Compare-and-swap constraint for mutating commands
#[derive(Args, Debug, Clone, Default)]
pub struct CasFlag {
    /// Make changes only if the resource is currently at this version
    #[arg(long, value_name = "VERSION")]
    pub cas: Option<String>,
}

/// Asynchronous completion for long-running mutations
#[derive(Args, Debug, Clone, Default)]
pub struct AsyncFlag {
    /// Return once the request is accepted, without waiting for completion
    #[arg(long = "async")]
    pub use_async: bool,
}

/// Label selectors for list commands
#[derive(Args, Debug, Clone, Default)]
pub struct SelectorFlag {
    /// Filter by label selector (key=value, key!=value, key, !key)
    #[arg(short = 'l', long = "selector")]
    pub selectors: Vec<String>,
}

// =============================================================================
// Command Context
// =============================================================================

/// Everything a command needs to run
pub struct CommandContext {
    pub config: Box<dyn ConfigProvider>,
    pub client: Client,
    pub display: Box<dyn Displayer>,
}

impl CommandContext {
    /// Build a context, choosing the displayer from the configured format
    pub fn new(config: Box<dyn ConfigProvider>, client: Client) -> Result<Self> {
        let display = select_displayer(config.output_format()?);
        Ok(Self {
            config,
            client,
            display,
        })
    }

    pub fn with_displayer(
        config: Box<dyn ConfigProvider>,
        client: Client,
        display: Box<dyn Displayer>,
    ) -> Self {
        Self {
            config,
            client,
            display,
        }
    }

    /// Request parameters from the `--cas` and `--async` flags. Async
    /// requests give the server the command timeout to complete in.
    pub fn request_params(&self, cas: &CasFlag, use_async: bool) -> Result<RequestParams> {
        let async_max = if use_async {
            Some(self.config.command_timeout()?)
        } else {
            None
        };
        Ok(RequestParams::from_flags(cas.cas.as_deref(), async_max))
    }

    fn use_ids(&self) -> Result<bool> {
        self.config.use_ids()
    }

    // --- Reference resolution ---

    /// Fetch the namespace `reference` names or identifies
    pub async fn namespace(&self, reference: &str) -> Result<Namespace> {
        if self.use_ids()? {
            self.client.get_namespace(&NamespaceId::from(reference)).await
        } else {
            self.client.get_namespace_by_name(reference).await
        }
    }

    /// Resolve a namespace reference to its ID without fetching by ID
    pub async fn namespace_id(&self, reference: &str) -> Result<NamespaceId> {
        if self.use_ids()? {
            return Ok(NamespaceId::from(reference));
        }
        Ok(self.client.get_namespace_by_name(reference).await?.id)
    }

    pub async fn volume_id(&self, ns: &NamespaceId, reference: &str) -> Result<VolumeId> {
        if self.use_ids()? {
            return Ok(VolumeId::from(reference));
        }
        Ok(self.client.get_volume_by_name(ns, reference).await?.id)
    }

    pub async fn node_id(&self, reference: &str) -> Result<NodeId> {
        if self.use_ids()? {
            return Ok(NodeId::from(reference));
        }
        Ok(self.client.get_node_by_name(reference).await?.id)
    }

    pub async fn user_id(&self, reference: &str) -> Result<UserId> {
        if self.use_ids()? {
            return Ok(UserId::from(reference));
        }
        Ok(self.client.get_user_by_name(reference).await?.id)
    }

    pub async fn policy_group_id(&self, reference: &str) -> Result<PolicyGroupId> {
        if self.use_ids()? {
            return Ok(PolicyGroupId::from(reference));
        }
        Ok(self.client.get_policy_group_by_name(reference).await?.id)
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Run `command`, writing its output to `w`
pub async fn execute(command: Command, ctx: &CommandContext, w: &mut dyn Write) -> Result<()> {
    if let Command::Version = command {
        return version(w);
    }

    run::with_timeout(ctx.config.as_ref(), async {
        match command {
            Command::Apply(cmd) => apply::run(cmd, ctx, w).await,
            Command::Attach(args) => attach::run(args, ctx, w).await,
            Command::Create(cmd) => create::run(cmd, ctx, w).await,
            Command::Delete(cmd) => delete::run(cmd, ctx, w).await,
            Command::Describe(cmd) => describe::run(cmd, ctx, w).await,
            Command::Detach(args) => detach::run(args, ctx, w).await,
            Command::Get(cmd) => get::run(cmd, ctx, w).await,
            Command::Nfs(cmd) => nfs::run(cmd, ctx, w).await,
            Command::Update(cmd) => update::run(cmd, ctx, w).await,
            Command::Version => version(w),
        }
    })
    .await
}

/// Print the CLI version. Needs neither configuration nor the API.
pub fn version(w: &mut dyn Write) -> Result<()> {
    writeln!(w, "StorageOS CLI version: {}", crate::VERSION)?;
    Ok(())
}
