//! Identity-keyed subscriber callbacks
//!
//! Subscribers are removed by identity, the way a caller would hand back the
//! same function it registered. Clones of a callback share identity; two
//! callbacks built from identical closures do not.

use std::fmt;
use std::rc::Rc;

/// Stable key for a callback's identity (address of the shared closure)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CallbackKey(usize);

fn key_of<T: ?Sized>(rc: &Rc<T>) -> CallbackKey {
    CallbackKey(Rc::as_ptr(rc) as *const () as usize)
}

/// Receives the `(x, y)` offset of the container it is subscribed to
#[derive(Clone)]
pub struct SpyCallback(Rc<dyn Fn(f64, f64)>);

impl SpyCallback {
    pub fn new(f: impl Fn(f64, f64) + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, x: f64, y: f64) {
        (self.0)(x, y)
    }

    pub(crate) fn key(&self) -> CallbackKey {
        key_of(&self.0)
    }
}

impl PartialEq for SpyCallback {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for SpyCallback {}

impl fmt::Debug for SpyCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SpyCallback").field(&self.key().0).finish()
    }
}

/// Notified with no data whenever state should be re-evaluated
#[derive(Clone)]
pub struct StateCallback(Rc<dyn Fn()>);

impl StateCallback {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self) {
        (self.0)()
    }
}

impl PartialEq for StateCallback {
    fn eq(&self, other: &Self) -> bool {
        key_of(&self.0) == key_of(&other.0)
    }
}

impl Eq for StateCallback {}

impl fmt::Debug for StateCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateCallback")
            .field(&key_of(&self.0).0)
            .finish()
    }
}
