//! Core type definitions using newtype patterns for type safety.
//!
//! These types prevent common logic errors by making invalid states unrepresentable
//! at compile time.

mod host;
mod port;

pub use host::{Host, HostSet};
pub use port::{Port, PortError, PortRange, PortSet};
