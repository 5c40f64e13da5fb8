//! Domain layer - resource models and the transport port
//!
//! Resource records are decoded from the management API and never mutated
//! locally; all changes go through [`ports::Transport`].

pub mod ids;
pub mod ports;
pub mod resources;
pub mod volume;

pub use ids::*;
pub use ports::*;
pub use resources::*;
pub use volume::*;
