//! Error types for the StorageOS CLI
//!
//! Provides structured error types for every layer of the CLI: name
//! resolution, configuration sourcing, the API transport and output.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Lookup Classification
// =============================================================================

/// Kind of API resource an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Node,
    Volume,
    Namespace,
    User,
    PolicyGroup,
    Cluster,
    Licence,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Node => write!(f, "node"),
            ResourceKind::Volume => write!(f, "volume"),
            ResourceKind::Namespace => write!(f, "namespace"),
            ResourceKind::User => write!(f, "user"),
            ResourceKind::PolicyGroup => write!(f, "policy group"),
            ResourceKind::Cluster => write!(f, "cluster"),
            ResourceKind::Licence => write!(f, "licence"),
        }
    }
}

/// Which attribute a failed lookup was keyed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LookupField {
    Name,
    Id,
}

impl fmt::Display for LookupField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupField::Name => write!(f, "name"),
            LookupField::Id => write!(f, "ID"),
        }
    }
}

// =============================================================================
// Error
// =============================================================================

/// Unified error type for the CLI
#[derive(Error, Debug)]
pub enum Error {
    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("internal error: {0}")]
    Internal(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    // =========================================================================
    // Resolution Errors
    // =========================================================================
    #[error("{kind} with {field} {value} not found")]
    NotFound {
        kind: ResourceKind,
        field: LookupField,
        value: String,
    },

    #[error("another {kind} with name {name} already exists")]
    AlreadyExists { kind: ResourceKind, name: String },

    #[error("{}", invalid_request_message(.details))]
    InvalidRequest { details: Option<String> },

    // =========================================================================
    // Argument Errors
    // =========================================================================
    #[error("{0}")]
    Argument(String),

    #[error("a target name or unique identifier cannot be used with a label selector")]
    TargetOrSelector,

    #[error("namespace ID must be specified when using resource IDs")]
    NamespaceIdRequired,

    #[error("no namespace specified")]
    NoNamespace,

    // =========================================================================
    // API Errors
    // =========================================================================
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("authentication failed: invalid credentials or expired session")]
    Unauthorized,

    #[error("permission denied for the requested operation")]
    Forbidden,

    #[error("the resource was modified concurrently: {0}")]
    Conflict(String),

    #[error("command timed out after {0:?}")]
    Timeout(Duration),

    // =========================================================================
    // Parse Errors
    // =========================================================================
    #[error("duration parse error: {0}")]
    DurationParse(String),

    #[error("capacity parse error: {0}")]
    CapacityParse(String),

    #[error("invalid boolean value: {0}")]
    BoolParse(String),

    #[error("unknown output format {0:?} (valid formats: text, json, yaml)")]
    UnknownOutputFormat(String),

    #[error("invalid label selector: {0}")]
    SelectorParse(String),

    #[error("password command exited with error code {code}")]
    PasswordCommand { code: i32 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // =========================================================================
    // IO Errors
    // =========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn invalid_request_message(details: &Option<String>) -> String {
    match details {
        Some(d) if !d.is_empty() => format!("request is invalid: {}", d),
        _ => "request is invalid".to_string(),
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit code reported for an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Unclassified failure
    Failure = 1,
    /// Bad flags, arguments or configuration
    InvalidArguments = 2,
    /// Credentials were rejected
    Unauthorized = 3,
    /// Authenticated user lacks permission
    Forbidden = 4,
    /// Target resource does not exist
    NotFound = 5,
    /// Resource exists or was modified concurrently
    Conflict = 6,
    /// Request rejected as invalid by the API
    InvalidRequest = 7,
    /// Command deadline exceeded
    Timeout = 8,
    /// API unreachable or replied unexpectedly
    ApiUnavailable = 9,
}

impl Error {
    /// Convenience constructor for a lookup by name that found nothing
    pub fn name_not_found(kind: ResourceKind, name: impl Into<String>) -> Self {
        Error::NotFound {
            kind,
            field: LookupField::Name,
            value: name.into(),
        }
    }

    /// Convenience constructor for a lookup by ID that found nothing
    pub fn id_not_found(kind: ResourceKind, id: impl fmt::Display) -> Self {
        Error::NotFound {
            kind,
            field: LookupField::Id,
            value: id.to_string(),
        }
    }

    /// Determine the exit code reported for this error
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Error::Argument(_)
            | Error::TargetOrSelector
            | Error::NamespaceIdRequired
            | Error::NoNamespace
            | Error::Configuration(_)
            | Error::DurationParse(_)
            | Error::CapacityParse(_)
            | Error::BoolParse(_)
            | Error::UnknownOutputFormat(_)
            | Error::SelectorParse(_)
            | Error::PasswordCommand { .. } => ExitCode::InvalidArguments,

            Error::Unauthorized => ExitCode::Unauthorized,
            Error::Forbidden => ExitCode::Forbidden,
            Error::NotFound { .. } => ExitCode::NotFound,
            Error::AlreadyExists { .. } | Error::Conflict(_) => ExitCode::Conflict,
            Error::InvalidRequest { .. } => ExitCode::InvalidRequest,
            Error::Timeout(_) => ExitCode::Timeout,
            Error::Transport(_) | Error::Api { .. } => ExitCode::ApiUnavailable,

            _ => ExitCode::Failure,
        }
    }

    /// Check if this error was caused by the user's input
    pub fn is_user_error(&self) -> bool {
        matches!(self.exit_code(), ExitCode::InvalidArguments)
    }
}

/// Result type alias for the CLI
pub type Result<T> = std::result::Result<T, Error>;
