//! Run helpers shared by every API command
//!
//! Commands follow the same sequence: the whole command runs under the
//! configured deadline, argument guards run before any request is made,
//! then the client authenticates and the command body executes.

use super::CommandContext;
use crate::client::Credentials;
use crate::config::defaults::DEFAULT_NAMESPACE;
use crate::config::ConfigProvider;
use crate::domain::resources::AuthSession;
use crate::error::{Error, Result};
use crate::transport::SessionCache;
use std::future::Future;
use tracing::{debug, warn};

/// Run `fut` under the configured command timeout
pub async fn with_timeout<F, T>(config: &dyn ConfigProvider, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let timeout = config.command_timeout()?;
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(Error::Timeout(timeout)),
    }
}

/// Explicit targets and label selectors are mutually exclusive
pub fn ensure_target_or_selectors<A, S>(targets: &[A], selectors: &[S]) -> Result<()> {
    if !targets.is_empty() && !selectors.is_empty() {
        return Err(Error::TargetOrSelector);
    }
    Ok(())
}

/// With `--use-ids` the namespace must be given as an ID, so the default
/// namespace name cannot be used.
pub fn ensure_namespace_set_when_use_ids(config: &dyn ConfigProvider) -> Result<()> {
    let use_ids = config.use_ids()?;
    let namespace = config.namespace()?;
    if use_ids && namespace == DEFAULT_NAMESPACE {
        return Err(Error::NamespaceIdRequired);
    }
    Ok(())
}

/// The configured namespace reference, which must not be empty
pub fn require_namespace(config: &dyn ConfigProvider) -> Result<String> {
    let namespace = config.namespace()?;
    if namespace.is_empty() {
        return Err(Error::NoNamespace);
    }
    Ok(namespace)
}

/// Guards for commands scoped to a namespace, returning the namespace
/// reference to resolve.
pub fn namespaced(config: &dyn ConfigProvider) -> Result<String> {
    let namespace = require_namespace(config)?;
    ensure_namespace_set_when_use_ids(config)?;
    Ok(namespace)
}

/// Session cache for the configured endpoint, unless caching is disabled
pub fn session_cache(config: &dyn ConfigProvider) -> Result<Option<SessionCache>> {
    if config.auth_cache_disabled()? {
        return Ok(None);
    }

    let endpoint = config
        .api_endpoints()?
        .into_iter()
        .find(|e| !e.trim().is_empty())
        .unwrap_or_default();

    match config.cache_dir() {
        Ok(dir) => Ok(Some(SessionCache::new(&dir, endpoint))),
        Err(e) => {
            warn!(error = %e, "no cache directory, session caching disabled");
            Ok(None)
        }
    }
}

/// Authenticate the context's client with the configured credentials
pub async fn authenticate(ctx: &CommandContext) -> Result<AuthSession> {
    let creds = Credentials {
        username: ctx.config.username()?,
        password: ctx.config.password()?,
    };
    let cache = session_cache(ctx.config.as_ref())?;
    debug!(username = %creds.username, cached = cache.is_some(), "authenticating");

    ctx.client.authenticate(&creds, cache.as_ref()).await
}
