//! On-disk authentication session cache
//!
//! Sessions are stored as a single JSON document under the cache
//! directory, keyed by API endpoint and username. The file is read and
//! rewritten whole; concurrent invocations may race on it.

use crate::domain::resources::AuthSession;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// File name of the session cache within the cache directory
pub const SESSION_CACHE_FILE: &str = "sessions.json";

#[derive(Debug, Default, Serialize, Deserialize)]
struct SessionFile {
    #[serde(default)]
    sessions: BTreeMap<String, AuthSession>,
}

/// Session cache scoped to one API endpoint
#[derive(Debug, Clone)]
pub struct SessionCache {
    path: PathBuf,
    endpoint: String,
}

impl SessionCache {
    pub fn new(cache_dir: &Path, endpoint: impl Into<String>) -> Self {
        Self {
            path: cache_dir.join(SESSION_CACHE_FILE),
            endpoint: endpoint.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn key(&self, username: &str) -> String {
        format!("{}@{}", username, self.endpoint)
    }

    fn read(&self) -> Result<SessionFile> {
        if !self.path.exists() {
            return Ok(SessionFile::default());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        match serde_json::from_str(&contents) {
            Ok(file) => Ok(file),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "discarding unreadable session cache");
                Ok(SessionFile::default())
            }
        }
    }

    fn write(&self, file: &SessionFile) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            std::fs::create_dir_all(dir)?;
        }

        let mut opts = std::fs::OpenOptions::new();
        opts.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            opts.mode(0o600);
        }

        let mut out = opts.open(&self.path)?;
        out.write_all(&serde_json::to_vec_pretty(file)?)?;
        Ok(())
    }

    /// Cached session for `username`, if any
    pub fn get(&self, username: &str) -> Result<Option<AuthSession>> {
        let mut file = self.read()?;
        Ok(file.sessions.remove(&self.key(username)))
    }

    /// Store `session` for `username`, replacing any previous entry
    pub fn put(&self, username: &str, session: &AuthSession) -> Result<()> {
        let mut file = self.read()?;
        file.sessions.insert(self.key(username), session.clone());
        self.write(&file)?;
        debug!(path = %self.path.display(), username, "cached session");
        Ok(())
    }
}
