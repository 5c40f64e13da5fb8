//! Optional request parameters for mutating calls
//!
//! Version checking is opt-in: without a CAS version the server is told to
//! ignore versions entirely rather than compare against an empty token.

use crate::config::duration::format_duration;
use crate::domain::ids::Version;
use std::time::Duration;

/// Parameters shared by every mutating request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams {
    /// Version the resource must currently be at for the request to apply
    pub cas_version: Option<Version>,
    /// How long the server may keep working after accepting the request
    pub async_max: Option<Duration>,
}

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Constrain the request to the given resource version
    pub fn with_cas(mut self, version: impl Into<Version>) -> Self {
        self.cas_version = Some(version.into());
        self
    }

    /// Ask the server to complete the request asynchronously within `max`
    pub fn with_async(mut self, max: Duration) -> Self {
        self.async_max = Some(max);
        self
    }

    /// Build parameters from the `--cas` flag value and the async timeout,
    /// when async mode was requested.
    pub fn from_flags(cas: Option<&str>, async_max: Option<Duration>) -> Self {
        Self {
            cas_version: cas.map(Version::from),
            async_max,
        }
    }

    pub fn ignore_version(&self) -> bool {
        self.cas_version.is_none()
    }

    pub fn is_async(&self) -> bool {
        self.async_max.is_some()
    }

    /// Query string pairs carrying these parameters
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("ignoreVersion", self.ignore_version().to_string())];
        if let Some(max) = self.async_max {
            pairs.push(("asyncMax", format_duration(max)));
        }
        pairs
    }

    /// Query string pairs for a DELETE, which has no body to carry the CAS
    /// version.
    pub fn delete_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.query_pairs();
        if let Some(version) = &self.cas_version {
            pairs.push(("version", version.to_string()));
        }
        pairs
    }
}

/// Parameters for deleting a volume
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteVolumeParams {
    pub request: RequestParams,
    /// Delete the volume even though its master is offline
    pub offline_delete: bool,
}

impl DeleteVolumeParams {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.request.delete_query_pairs();
        if self.offline_delete {
            pairs.push(("offlineDelete", "true".to_string()));
        }
        pairs
    }
}
