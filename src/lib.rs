//! StorageOS kubectl plugin
//!
//! A command-line client for the StorageOS management API. Commands
//! authenticate against the API, resolve human-readable names to opaque
//! identifiers and render results as text, JSON or YAML.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  cmd        verb / resource command tree (clap)              │
//! ├──────────────────────────────────────────────────────────────┤
//! │  config     flags -> environment -> config file -> defaults  │
//! ├──────────────────────────────────────────────────────────────┤
//! │  client     name/ID resolution, request parameters           │
//! ├──────────────────────────────────────────────────────────────┤
//! │  transport  HTTP transport, session cache                    │
//! ├──────────────────────────────────────────────────────────────┤
//! │  output     text / JSON / YAML displayers                    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`cmd`]: Command tree and run helpers
//! - [`config`]: Layered configuration providers
//! - [`client`]: Resolver layer over the transport
//! - [`transport`]: HTTP transport and session cache
//! - [`output`]: Output models and displayers
//! - [`domain`]: Identifiers, resource models and the transport port
//! - [`error`]: Error types and exit codes

pub mod client;
pub mod cmd;
pub mod config;
pub mod domain;
pub mod error;
pub mod output;
pub mod transport;

// Re-export commonly used types
pub use client::{Client, Credentials, DeleteVolumeParams, RequestParams};

pub use config::{build_provider, ConfigProvider, GlobalFlags};

pub use domain::ids::{
    ClusterId, DeploymentId, NamespaceId, NodeId, PolicyGroupId, UserId, Version, VolumeId,
};
pub use domain::ports::{Completion, Transport, TransportRef};
pub use domain::resources::{Cluster, Labels, Licence, Namespace, Node, PolicyGroup, User};
pub use domain::volume::Volume;

pub use error::{Error, ExitCode, Result};

pub use output::{Displayer, OutputFormat};

pub use transport::{HttpTransport, SessionCache};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
