//! Transport implementations
//!
//! [`http::HttpTransport`] is the production [`Transport`](crate::domain::ports::Transport);
//! [`session_cache`] persists login sessions between invocations.

pub mod http;
pub mod session_cache;

pub use http::HttpTransport;
pub use session_cache::SessionCache;
