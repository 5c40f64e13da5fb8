//! Command-line flag configuration layer
//!
//! Flags are held as `Option`s so that "explicitly set to an empty value"
//! is distinguishable from "not given". Values are validated when queried,
//! not when parsed, so a bad flag fails the query that needs it.

use super::{parse_bool, parse_duration, ConfigProvider};
use crate::error::Result;
use crate::output::OutputFormat;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

/// Global flags shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalFlags {
    /// Comma-separated list of StorageOS API endpoints
    #[arg(long, global = true, value_delimiter = ',')]
    pub endpoints: Vec<String>,

    /// Directory used to cache re-usable data
    #[arg(long, global = true)]
    pub cache_dir: Option<PathBuf>,

    /// Time allowed for a command to complete (e.g. 15s, 1m)
    #[arg(long, global = true)]
    pub timeout: Option<String>,

    /// Username of the StorageOS account to authenticate as
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Password of the StorageOS account to authenticate as
    #[arg(long, global = true)]
    pub password: Option<String>,

    /// Treat resource arguments as unique identifiers instead of names
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = parse_bool
    )]
    pub use_ids: Option<bool>,

    /// Disable caching of authenticated sessions
    #[arg(
        long,
        global = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        value_parser = parse_bool
    )]
    pub no_auth_cache: Option<bool>,

    /// Namespace to operate within
    #[arg(short = 'n', long, global = true)]
    pub namespace: Option<String>,

    /// Output format: text, json or yaml
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Path of the config file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,
}

/// Configuration layer answering from explicitly given flags
pub struct FlagProvider {
    flags: GlobalFlags,
    fallback: Box<dyn ConfigProvider>,
}

impl FlagProvider {
    pub fn new(flags: GlobalFlags, fallback: Box<dyn ConfigProvider>) -> Self {
        Self { flags, fallback }
    }
}

impl ConfigProvider for FlagProvider {
    fn auth_cache_disabled(&self) -> Result<bool> {
        match self.flags.no_auth_cache {
            Some(v) => Ok(v),
            None => self.fallback.auth_cache_disabled(),
        }
    }

    fn api_endpoints(&self) -> Result<Vec<String>> {
        if self.flags.endpoints.is_empty() {
            return self.fallback.api_endpoints();
        }
        Ok(self.flags.endpoints.clone())
    }

    fn cache_dir(&self) -> Result<PathBuf> {
        match &self.flags.cache_dir {
            Some(v) => Ok(v.clone()),
            None => self.fallback.cache_dir(),
        }
    }

    fn command_timeout(&self) -> Result<Duration> {
        match &self.flags.timeout {
            Some(v) => parse_duration(v),
            None => self.fallback.command_timeout(),
        }
    }

    fn username(&self) -> Result<String> {
        match &self.flags.username {
            Some(v) => Ok(v.clone()),
            None => self.fallback.username(),
        }
    }

    fn password(&self) -> Result<String> {
        match &self.flags.password {
            Some(v) => Ok(v.clone()),
            None => self.fallback.password(),
        }
    }

    fn use_ids(&self) -> Result<bool> {
        match self.flags.use_ids {
            Some(v) => Ok(v),
            None => self.fallback.use_ids(),
        }
    }

    fn namespace(&self) -> Result<String> {
        match &self.flags.namespace {
            Some(v) => Ok(v.clone()),
            None => self.fallback.namespace(),
        }
    }

    fn output_format(&self) -> Result<OutputFormat> {
        match &self.flags.output {
            Some(v) => v.parse(),
            None => self.fallback.output_format(),
        }
    }

    fn config_file_path(&self) -> Result<PathBuf> {
        match &self.flags.config {
            Some(v) => Ok(v.clone()),
            None => self.fallback.config_file_path(),
        }
    }
}
