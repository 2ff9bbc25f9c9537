//! scroll-spy library - shared scroll position registry
//!
//! Containers are mounted once and share a single passive scroll listener.
//! Position callbacks receive the container's offset on every dispatch, and
//! state callbacks are driven explicitly by the host.

pub mod config;
pub mod error;
pub mod host;
pub mod position;
pub mod replay;
pub mod spy;
pub mod throttle;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::ScrollSpyError;
pub use host::{CompatMode, Container, MemoryHost, ScrollHost, ScrollPosition};
pub use position::DocumentOffset;
pub use spy::{Disposer, ScrollSpy, SpyCallback, StateCallback};
