//! Shared test utilities for scroll-spy
//!
//! This module provides common fixtures and recording callbacks
//! used across multiple test modules.

#[cfg(test)]
pub mod test_helpers {
    use std::cell::RefCell;
    use std::rc::Rc;

    use crate::host::MemoryHost;
    use crate::spy::{ScrollSpy, SpyCallback, StateCallback};

    pub type TestSpy = ScrollSpy<Rc<MemoryHost>>;

    /// Helper to create a registry over a fresh in-memory host
    pub fn test_spy() -> (Rc<MemoryHost>, TestSpy) {
        let host = Rc::new(MemoryHost::new());
        let spy = ScrollSpy::new(host.clone());
        (host, spy)
    }

    /// Position callback that records every `(x, y)` it receives
    pub fn recording_spy() -> (SpyCallback, Rc<RefCell<Vec<(f64, f64)>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let c = calls.clone();
        (SpyCallback::new(move |x, y| c.borrow_mut().push((x, y))), calls)
    }

    /// State callback that appends `label` to a shared log
    pub fn logging_state(label: &'static str, log: &Rc<RefCell<Vec<&'static str>>>) -> StateCallback {
        let log = log.clone();
        StateCallback::new(move || log.borrow_mut().push(label))
    }
}
