use std::fmt;

/// Reverses a single [`mount`](super::ScrollSpy::mount)
///
/// Disposing detaches the container's scroll listener and drops its
/// registration along with every position callback subscribed through it.
/// Calling [`dispose`](Disposer::dispose) again, or after the registry is
/// gone, does nothing. Dropping a `Disposer` without calling it leaves the
/// container mounted.
#[must_use = "dropping a Disposer without calling dispose() leaves the container mounted"]
pub struct Disposer {
    release: Option<Box<dyn Fn()>>,
}

impl Disposer {
    pub(crate) fn new(release: impl Fn() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Disposer for a mount that registered nothing
    pub fn noop() -> Self {
        Self { release: None }
    }

    pub fn is_noop(&self) -> bool {
        self.release.is_none()
    }

    pub fn dispose(&self) {
        if let Some(release) = &self.release {
            release();
        }
    }
}

impl fmt::Debug for Disposer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Disposer")
            .field("noop", &self.is_noop())
            .finish()
    }
}
