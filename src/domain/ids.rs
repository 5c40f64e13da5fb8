//! Typed Identifiers
//!
//! Every API resource kind is addressed by an opaque string identifier.
//! Each kind gets its own wrapper so a volume ID can never be handed to
//! an operation expecting a node ID.

use serde::{Deserialize, Serialize};

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<&String> for $name {
            fn from(s: &String) -> Self {
                Self(s.clone())
            }
        }
    };
}

opaque_id!(
    /// Unique identifier for a node
    NodeId
);
opaque_id!(
    /// Unique identifier for a volume, scoped to a namespace
    VolumeId
);
opaque_id!(
    /// Unique identifier for a namespace
    NamespaceId
);
opaque_id!(
    /// Unique identifier for a user account
    UserId
);
opaque_id!(
    /// Unique identifier for a policy group
    PolicyGroupId
);
opaque_id!(
    /// Unique identifier for the cluster
    ClusterId
);
opaque_id!(
    /// Unique identifier for a volume deployment (master or replica)
    DeploymentId
);
opaque_id!(
    /// Compare-and-swap token describing the last known revision of a resource
    Version
);
