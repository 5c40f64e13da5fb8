//! Configuration resolution
//!
//! Settings are answered by a chain of providers, highest priority first:
//!
//! ```text
//! FlagProvider -> EnvProvider -> FileProvider -> Defaults
//! ```
//!
//! Each layer answers a query when its value was explicitly set and hands
//! the query to its fallback otherwise. A malformed value fails the query
//! at the layer where it was found.

pub mod defaults;
pub mod duration;
pub mod environment;
pub mod file;
pub mod flags;

pub use defaults::Defaults;
pub use duration::{format_duration, parse_bool, parse_duration};
pub use environment::{EnvLookup, EnvProvider};
pub use file::{ConfigFile, FileProvider};
pub use flags::{FlagProvider, GlobalFlags};

use crate::error::{Error, Result};
use crate::output::OutputFormat;
use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;
use tracing::debug;

/// Accessors for every configuration setting the CLI consults
pub trait ConfigProvider: Send + Sync {
    fn auth_cache_disabled(&self) -> Result<bool>;
    fn api_endpoints(&self) -> Result<Vec<String>>;
    fn cache_dir(&self) -> Result<PathBuf>;
    fn command_timeout(&self) -> Result<Duration>;
    fn username(&self) -> Result<String>;
    fn password(&self) -> Result<String>;
    fn use_ids(&self) -> Result<bool>;
    fn namespace(&self) -> Result<String>;
    fn output_format(&self) -> Result<OutputFormat>;
    fn config_file_path(&self) -> Result<PathBuf>;
}

/// Assemble the full provider chain.
///
/// The config file location is itself configurable, so it is resolved from
/// the flag and environment layers before the file layer is loaded.
pub fn build_provider(flags: GlobalFlags, env: EnvLookup) -> Result<Box<dyn ConfigProvider>> {
    let path = match &flags.config {
        Some(path) => path.clone(),
        None => match env(environment::CONFIG_FILE_PATH_VAR) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => Defaults::new().config_file_path()?,
        },
    };

    debug!(path = %path.display(), "loading config file");
    let file = FileProvider::load(&path, Box::new(Defaults::new()))?;
    let env = EnvProvider::new(env, Box::new(file));
    Ok(Box::new(FlagProvider::new(flags, Box::new(env))))
}

/// Run a password command and return its trimmed standard output.
///
/// The command line is split on whitespace and executed directly, without
/// a shell.
pub fn run_password_command(command: &str) -> Result<String> {
    let mut parts = command.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| Error::Configuration("password command is empty".into()))?;

    debug!(program, "sourcing password from command");
    let out = Command::new(program).args(parts).output()?;
    if !out.status.success() {
        return Err(Error::PasswordCommand {
            code: out.status.code().unwrap_or(-1),
        });
    }

    Ok(String::from_utf8_lossy(&out.stdout).trim().to_string())
}
