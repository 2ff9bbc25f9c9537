//! Scroll spy registry
//!
//! Multiplexes scroll events on observed containers to position callbacks,
//! and fans forced refreshes out to global state callbacks.

mod callbacks;
mod disposer;
mod registry;

pub use callbacks::{SpyCallback, StateCallback};
pub use disposer::Disposer;
pub use registry::ScrollSpy;
