//! Terminal configuration layer: static defaults

use super::ConfigProvider;
use crate::error::{Error, Result};
use crate::output::OutputFormat;
use directories::BaseDirs;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_ENDPOINT: &str = "http://localhost:5705";
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_USERNAME: &str = "storageos";
pub const DEFAULT_PASSWORD: &str = "storageos";
pub const DEFAULT_NAMESPACE: &str = "default";

/// Directory name used under the user's cache and config directories
pub const APP_DIR: &str = "storageos";
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Provider returning the built-in default for every setting
#[derive(Debug, Clone, Copy, Default)]
pub struct Defaults;

impl Defaults {
    pub fn new() -> Self {
        Self
    }

    fn base_dirs() -> Result<BaseDirs> {
        BaseDirs::new()
            .ok_or_else(|| Error::Configuration("unable to determine the user home directory".into()))
    }
}

impl ConfigProvider for Defaults {
    fn auth_cache_disabled(&self) -> Result<bool> {
        Ok(false)
    }

    fn api_endpoints(&self) -> Result<Vec<String>> {
        Ok(vec![DEFAULT_API_ENDPOINT.to_string()])
    }

    fn cache_dir(&self) -> Result<PathBuf> {
        Ok(Self::base_dirs()?.cache_dir().join(APP_DIR))
    }

    fn command_timeout(&self) -> Result<Duration> {
        Ok(DEFAULT_COMMAND_TIMEOUT)
    }

    fn username(&self) -> Result<String> {
        Ok(DEFAULT_USERNAME.to_string())
    }

    fn password(&self) -> Result<String> {
        Ok(DEFAULT_PASSWORD.to_string())
    }

    fn use_ids(&self) -> Result<bool> {
        Ok(false)
    }

    fn namespace(&self) -> Result<String> {
        Ok(DEFAULT_NAMESPACE.to_string())
    }

    fn output_format(&self) -> Result<OutputFormat> {
        Ok(OutputFormat::Text)
    }

    fn config_file_path(&self) -> Result<PathBuf> {
        Ok(Self::base_dirs()?
            .config_dir()
            .join(APP_DIR)
            .join(CONFIG_FILE_NAME))
    }
}
