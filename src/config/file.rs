//! Config file layer
//!
//! The config file is a YAML document whose keys mirror the global flags.
//! A missing file behaves like an empty one.

use super::{parse_duration, run_password_command, ConfigProvider};
use crate::error::{Error, Result};
use crate::output::OutputFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// On-disk configuration document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigFile {
    pub auth_cache_disabled: Option<bool>,
    pub endpoints: Option<Vec<String>>,
    pub cache_dir: Option<PathBuf>,
    pub timeout: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub password_command: Option<String>,
    pub use_ids: Option<bool>,
    pub namespace: Option<String>,
    pub output: Option<String>,
}

impl ConfigFile {
    /// Read and decode the config file at `path`
    pub fn read(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using empty configuration");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents).map_err(|e| {
            Error::Configuration(format!("invalid config file {}: {}", path.display(), e))
        })
    }

    pub fn parse(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(contents)?)
    }
}

/// Configuration layer sourcing settings from the config file
pub struct FileProvider {
    file: ConfigFile,
    fallback: Box<dyn ConfigProvider>,
}

impl FileProvider {
    pub fn new(file: ConfigFile, fallback: Box<dyn ConfigProvider>) -> Self {
        Self { file, fallback }
    }

    pub fn load(path: &Path, fallback: Box<dyn ConfigProvider>) -> Result<Self> {
        Ok(Self::new(ConfigFile::read(path)?, fallback))
    }
}

impl ConfigProvider for FileProvider {
    fn auth_cache_disabled(&self) -> Result<bool> {
        match self.file.auth_cache_disabled {
            Some(v) => Ok(v),
            None => self.fallback.auth_cache_disabled(),
        }
    }

    fn api_endpoints(&self) -> Result<Vec<String>> {
        match &self.file.endpoints {
            Some(v) if !v.is_empty() => Ok(v.clone()),
            _ => self.fallback.api_endpoints(),
        }
    }

    fn cache_dir(&self) -> Result<PathBuf> {
        match &self.file.cache_dir {
            Some(v) => Ok(v.clone()),
            None => self.fallback.cache_dir(),
        }
    }

    fn command_timeout(&self) -> Result<Duration> {
        match &self.file.timeout {
            Some(v) => parse_duration(v),
            None => self.fallback.command_timeout(),
        }
    }

    fn username(&self) -> Result<String> {
        match &self.file.username {
            Some(v) => Ok(v.clone()),
            None => self.fallback.username(),
        }
    }

    fn password(&self) -> Result<String> {
        if let Some(cmd) = &self.file.password_command {
            return run_password_command(cmd);
        }
        match &self.file.password {
            Some(v) => Ok(v.clone()),
            None => self.fallback.password(),
        }
    }

    fn use_ids(&self) -> Result<bool> {
        match self.file.use_ids {
            Some(v) => Ok(v),
            None => self.fallback.use_ids(),
        }
    }

    fn namespace(&self) -> Result<String> {
        match &self.file.namespace {
            Some(v) => Ok(v.clone()),
            None => self.fallback.namespace(),
        }
    }

    fn output_format(&self) -> Result<OutputFormat> {
        match &self.file.output {
            Some(v) => v.parse(),
            None => self.fallback.output_format(),
        }
    }

    fn config_file_path(&self) -> Result<PathBuf> {
        self.fallback.config_file_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Defaults;

    #[test]
    fn test_parse_document() {
        let file = ConfigFile::parse(
            "endpoints:\n  - http://10.0.0.1:5705\ncacheDir: /tmp/sos\nuseIds: true\noutput: json\n",
        )
        .unwrap();

        assert_eq!(file.endpoints, Some(vec!["http://10.0.0.1:5705".to_string()]));
        assert_eq!(file.cache_dir, Some(PathBuf::from("/tmp/sos")));
        assert_eq!(file.use_ids, Some(true));
        assert_eq!(file.username, None);
    }

    #[test]
    fn test_missing_and_empty_files() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            ConfigFile::read(&dir.path().join("absent.yaml")).unwrap(),
            ConfigFile::default()
        );

        let path = dir.path().join("empty.yaml");
        std::fs::write(&path, "\n").unwrap();
        assert_eq!(ConfigFile::read(&path).unwrap(), ConfigFile::default());
    }

    #[test]
    fn test_empty_endpoint_list_falls_through() {
        let file = ConfigFile {
            endpoints: Some(vec![]),
            ..Default::default()
        };
        let provider = FileProvider::new(file, Box::new(Defaults::new()));
        assert_eq!(provider.api_endpoints().unwrap(), vec!["http://localhost:5705"]);
    }

    #[test]
    fn test_bad_output_format() {
        let file = ConfigFile {
            output: Some("table".into()),
            ..Default::default()
        };
        let provider = FileProvider::new(file, Box::new(Defaults::new()));
        assert!(provider.output_format().is_err());
    }
}
