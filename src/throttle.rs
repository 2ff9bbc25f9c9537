//! Scroll handler throttling
//!
//! Rate limits a handler to one invocation per interval. The first call in a
//! quiet period fires immediately; calls inside the interval collapse into a
//! single trailing call, which fires once the interval has elapsed and the
//! owner polls [`ThrottledHandler::flush`].

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::host::ScrollHandler;

/// Default interval (~15 fps)
pub const DEFAULT_THROTTLE_MS: u64 = 66;

#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    /// Time of the last invocation that went through
    last_fired: Option<Duration>,
    /// Whether a call was swallowed since the last invocation
    trailing_pending: bool,
}

impl Default for Throttle {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_THROTTLE_MS))
    }
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fired: None,
            trailing_pending: false,
        }
    }

    /// Records a call at `now`. Returns true if it should fire immediately.
    pub fn call_at(&mut self, now: Duration) -> bool {
        if self.is_open_at(now) {
            self.last_fired = Some(now);
            self.trailing_pending = false;
            true
        } else {
            self.trailing_pending = true;
            false
        }
    }

    /// Returns true if a pending trailing call is due at `now` (and consumes it).
    pub fn flush_at(&mut self, now: Duration) -> bool {
        if !self.trailing_pending || !self.is_open_at(now) {
            return false;
        }
        self.last_fired = Some(now);
        self.trailing_pending = false;
        true
    }

    pub fn cancel(&mut self) {
        self.trailing_pending = false;
    }

    pub fn has_pending(&self) -> bool {
        self.trailing_pending
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    fn is_open_at(&self, now: Duration) -> bool {
        match self.last_fired {
            Some(last) => now.saturating_sub(last) >= self.interval,
            None => true,
        }
    }
}

/// A handler wrapped with a [`Throttle`] and a clock
#[derive(Clone)]
pub struct ThrottledHandler {
    inner: ScrollHandler,
    state: Rc<RefCell<Throttle>>,
    clock: Rc<dyn Fn() -> Duration>,
}

impl ThrottledHandler {
    /// The rate-limited handler, suitable for attaching as a listener
    pub fn handler(&self) -> ScrollHandler {
        let this = self.clone();
        Rc::new(move || this.call())
    }

    pub fn call(&self) {
        let fire = self.state.borrow_mut().call_at((self.clock)());
        if fire {
            (self.inner)();
        }
    }

    /// Runs the trailing call if one is pending and due. Returns whether it ran.
    pub fn flush(&self) -> bool {
        let fire = self.state.borrow_mut().flush_at((self.clock)());
        if fire {
            (self.inner)();
        }
        fire
    }

    pub fn cancel(&self) {
        self.state.borrow_mut().cancel();
    }

    pub fn has_pending(&self) -> bool {
        self.state.borrow().has_pending()
    }
}

/// Wraps `handler` so it runs at most once per `interval` as measured by `clock`.
pub fn throttle(
    handler: ScrollHandler,
    interval: Duration,
    clock: impl Fn() -> Duration + 'static,
) -> ThrottledHandler {
    ThrottledHandler {
        inner: handler,
        state: Rc::new(RefCell::new(Throttle::new(interval))),
        clock: Rc::new(clock),
    }
}

#[cfg(test)]
#[path = "throttle_tests.rs"]
mod throttle_tests;
