//! Scenario replay
//!
//! Drives a [`ScrollSpy`](crate::ScrollSpy) over a [`MemoryHost`](crate::MemoryHost)
//! from a declarative timeline and records every callback invocation.

mod runner;
mod scenario;

pub use runner::{ReplayEvent, render_events, run};
pub use scenario::{DocumentSetup, Scenario, Step, load_scenario, parse_scenario};
