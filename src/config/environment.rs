//! Environment variable configuration layer
//!
//! An empty variable is treated the same as an unset one.

use super::{parse_bool, parse_duration, run_password_command, ConfigProvider};
use crate::error::Result;
use crate::output::OutputFormat;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const AUTH_CACHE_DISABLED_VAR: &str = "STORAGEOS_NO_AUTH_CACHE";
pub const API_ENDPOINTS_VAR: &str = "STORAGEOS_ENDPOINTS";
pub const CACHE_DIR_VAR: &str = "STORAGEOS_CACHE_DIR";
pub const COMMAND_TIMEOUT_VAR: &str = "STORAGEOS_API_TIMEOUT";
pub const USERNAME_VAR: &str = "STORAGEOS_USERNAME";
pub const PASSWORD_VAR: &str = "STORAGEOS_PASSWORD";
pub const PASSWORD_COMMAND_VAR: &str = "STORAGEOS_PASSWORD_COMMAND";
pub const USE_IDS_VAR: &str = "STORAGEOS_USE_IDS";
pub const NAMESPACE_VAR: &str = "STORAGEOS_NAMESPACE";
pub const OUTPUT_FORMAT_VAR: &str = "STORAGEOS_OUTPUT_FORMAT";
pub const CONFIG_FILE_PATH_VAR: &str = "STORAGEOS_CONFIG";

/// Environment variables read by the CLI, with a description of each
pub const ENV_CONFIG_HELP: &[(&str, &str)] = &[
    (AUTH_CACHE_DISABLED_VAR, "Disables the caching of authenticated sessions by the CLI"),
    (API_ENDPOINTS_VAR, "Comma-separated StorageOS API endpoints for the CLI to connect to"),
    (CACHE_DIR_VAR, "Directory for the CLI to cache re-usable data to"),
    (COMMAND_TIMEOUT_VAR, "Duration the CLI gives a command to complete before aborting"),
    (USERNAME_VAR, "Username provided by the CLI for authentication"),
    (PASSWORD_VAR, "Password provided by the CLI for authentication"),
    (PASSWORD_COMMAND_VAR, "Command whose output is used as the password for authentication"),
    (USE_IDS_VAR, "When true, existing resources are specified by ID instead of name"),
    (NAMESPACE_VAR, "Namespace for the CLI to operate in"),
    (OUTPUT_FORMAT_VAR, "Output format: text, json or yaml"),
    (CONFIG_FILE_PATH_VAR, "Path of the CLI config file"),
];

/// Variable lookup function; injectable so tests never touch the process
/// environment.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Lookup backed by the process environment
pub fn process_env() -> EnvLookup {
    Arc::new(|key: &str| std::env::var(key).ok())
}

/// Configuration layer sourcing settings from environment variables
pub struct EnvProvider {
    lookup: EnvLookup,
    fallback: Box<dyn ConfigProvider>,
}

impl EnvProvider {
    pub fn new(lookup: EnvLookup, fallback: Box<dyn ConfigProvider>) -> Self {
        Self { lookup, fallback }
    }

    fn var(&self, key: &str) -> Option<String> {
        (self.lookup)(key).filter(|v| !v.is_empty())
    }
}

impl ConfigProvider for EnvProvider {
    fn auth_cache_disabled(&self) -> Result<bool> {
        match self.var(AUTH_CACHE_DISABLED_VAR) {
            Some(v) => parse_bool(&v),
            None => self.fallback.auth_cache_disabled(),
        }
    }

    fn api_endpoints(&self) -> Result<Vec<String>> {
        match self.var(API_ENDPOINTS_VAR) {
            Some(v) => Ok(v.split(',').map(str::to_string).collect()),
            None => self.fallback.api_endpoints(),
        }
    }

    fn cache_dir(&self) -> Result<PathBuf> {
        match self.var(CACHE_DIR_VAR) {
            Some(v) => Ok(PathBuf::from(v)),
            None => self.fallback.cache_dir(),
        }
    }

    fn command_timeout(&self) -> Result<Duration> {
        match self.var(COMMAND_TIMEOUT_VAR) {
            Some(v) => parse_duration(&v),
            None => self.fallback.command_timeout(),
        }
    }

    fn username(&self) -> Result<String> {
        match self.var(USERNAME_VAR) {
            Some(v) => Ok(v),
            None => self.fallback.username(),
        }
    }

    fn password(&self) -> Result<String> {
        if let Some(cmd) = self.var(PASSWORD_COMMAND_VAR) {
            return run_password_command(&cmd);
        }
        match self.var(PASSWORD_VAR) {
            Some(v) => Ok(v),
            None => self.fallback.password(),
        }
    }

    fn use_ids(&self) -> Result<bool> {
        match self.var(USE_IDS_VAR) {
            Some(v) => parse_bool(&v),
            None => self.fallback.use_ids(),
        }
    }

    fn namespace(&self) -> Result<String> {
        match self.var(NAMESPACE_VAR) {
            Some(v) => Ok(v),
            None => self.fallback.namespace(),
        }
    }

    fn output_format(&self) -> Result<OutputFormat> {
        match self.var(OUTPUT_FORMAT_VAR) {
            Some(v) => v.parse(),
            None => self.fallback.output_format(),
        }
    }

    fn config_file_path(&self) -> Result<PathBuf> {
        match self.var(CONFIG_FILE_PATH_VAR) {
            Some(v) => Ok(PathBuf::from(v)),
            None => self.fallback.config_file_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Defaults;
    use crate::error::Error;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn provider(pairs: &[(&str, &str)]) -> EnvProvider {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        EnvProvider::new(
            Arc::new(move |key: &str| vars.get(key).cloned()),
            Box::new(Defaults::new()),
        )
    }

    #[test]
    fn test_unset_falls_back() {
        let env = provider(&[]);
        assert_eq!(env.username().unwrap(), "storageos");
        assert_eq!(env.command_timeout().unwrap(), Duration::from_secs(15));
        assert_eq!(env.api_endpoints().unwrap(), vec!["http://localhost:5705"]);
    }

    #[test]
    fn test_empty_counts_as_unset() {
        let env = provider(&[(USERNAME_VAR, ""), (USE_IDS_VAR, "")]);
        assert_eq!(env.username().unwrap(), "storageos");
        assert!(!env.use_ids().unwrap());
    }

    #[test]
    fn test_values_parsed() {
        let env = provider(&[
            (API_ENDPOINTS_VAR, "http://a:5705,http://b:5705"),
            (COMMAND_TIMEOUT_VAR, "1m"),
            (USE_IDS_VAR, "T"),
            (OUTPUT_FORMAT_VAR, "yaml"),
        ]);
        assert_eq!(
            env.api_endpoints().unwrap(),
            vec!["http://a:5705", "http://b:5705"]
        );
        assert_eq!(env.command_timeout().unwrap(), Duration::from_secs(60));
        assert!(env.use_ids().unwrap());
        assert_eq!(env.output_format().unwrap(), OutputFormat::Yaml);
    }

    #[test]
    fn test_malformed_value_does_not_fall_through() {
        let env = provider(&[(COMMAND_TIMEOUT_VAR, "soon"), (USE_IDS_VAR, "yes")]);
        assert_matches!(env.command_timeout(), Err(Error::DurationParse(_)));
        assert_matches!(env.use_ids(), Err(Error::BoolParse(_)));

        let env = provider(&[(OUTPUT_FORMAT_VAR, "xml")]);
        assert_matches!(env.output_format(), Err(Error::UnknownOutputFormat(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_password_command_beats_password() {
        let env = provider(&[(PASSWORD_VAR, "plain"), (PASSWORD_COMMAND_VAR, "echo from-cmd")]);
        assert_eq!(env.password().unwrap(), "from-cmd");
    }
}
