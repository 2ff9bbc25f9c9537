//! Host capabilities
//!
//! The registry never touches a platform directly. Everything it needs from
//! the outside world (listener attachment, scroll offsets, a clock) goes
//! through [`ScrollHost`], so the same registry runs against the browser or
//! against the deterministic [`MemoryHost`].

pub mod memory;
#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub mod web;

use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use memory::{ElementId, ListenerId, MemoryHost};
#[cfg(all(feature = "web", target_arch = "wasm32"))]
pub use web::{WebHost, WebListener};

/// Event name the registry listens for
pub const SCROLL_EVENT: &str = "scroll";

/// Handler attached to a container by the registry
pub type ScrollHandler = Rc<dyn Fn()>;

/// Horizontal and vertical scroll offset of a container
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollPosition {
    pub x: f64,
    pub y: f64,
}

impl ScrollPosition {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Box-model compatibility mode of the document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompatMode {
    /// `CSS1Compat`: the root element is the scrolling element
    #[default]
    Standards,
    /// `BackCompat`: the body is the scrolling element
    Quirks,
}

impl CompatMode {
    /// Maps a `document.compatMode` string. Anything other than
    /// `CSS1Compat` (including an empty string) is quirks mode.
    pub fn from_document_mode(mode: &str) -> Self {
        if mode == "CSS1Compat" {
            CompatMode::Standards
        } else {
            CompatMode::Quirks
        }
    }
}

/// A scrollable region under observation
///
/// Equality is identity: two `Element` containers are equal only when the
/// host considers them the same element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Container<E> {
    Document,
    Element(E),
}

impl<E: fmt::Debug> fmt::Display for Container<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Container::Document => write!(f, "document"),
            Container::Element(element) => write!(f, "element {:?}", element),
        }
    }
}

/// Platform capabilities consumed by [`ScrollSpy`](crate::ScrollSpy)
pub trait ScrollHost {
    /// Handle for a scrollable element, compared by identity
    type Element: Clone + PartialEq + fmt::Debug;
    /// Token returned on attach and handed back on detach
    type Listener;

    /// Attach `handler` so that it never blocks the scroll gesture
    fn add_passive_listener(
        &self,
        target: &Container<Self::Element>,
        event: &'static str,
        handler: ScrollHandler,
    ) -> Self::Listener;

    fn remove_passive_listener(
        &self,
        target: &Container<Self::Element>,
        event: &'static str,
        listener: Self::Listener,
    );

    /// Whether the native page offset readout (`window.scrollX/scrollY`) exists
    fn supports_page_offset(&self) -> bool;

    fn page_offset(&self) -> ScrollPosition;

    fn compat_mode(&self) -> CompatMode;

    /// Offsets of `document.documentElement`
    fn document_element_offset(&self) -> ScrollPosition;

    /// Offsets of `document.body`
    fn body_offset(&self) -> ScrollPosition;

    fn element_offset(&self, element: &Self::Element) -> ScrollPosition;

    /// Monotonic time, used to rate limit throttled containers
    fn now(&self) -> Duration;
}

impl<H: ScrollHost + ?Sized> ScrollHost for Rc<H> {
    type Element = H::Element;
    type Listener = H::Listener;

    fn add_passive_listener(
        &self,
        target: &Container<Self::Element>,
        event: &'static str,
        handler: ScrollHandler,
    ) -> Self::Listener {
        (**self).add_passive_listener(target, event, handler)
    }

    fn remove_passive_listener(
        &self,
        target: &Container<Self::Element>,
        event: &'static str,
        listener: Self::Listener,
    ) {
        (**self).remove_passive_listener(target, event, listener)
    }

    fn supports_page_offset(&self) -> bool {
        (**self).supports_page_offset()
    }

    fn page_offset(&self) -> ScrollPosition {
        (**self).page_offset()
    }

    fn compat_mode(&self) -> CompatMode {
        (**self).compat_mode()
    }

    fn document_element_offset(&self) -> ScrollPosition {
        (**self).document_element_offset()
    }

    fn body_offset(&self) -> ScrollPosition {
        (**self).body_offset()
    }

    fn element_offset(&self, element: &Self::Element) -> ScrollPosition {
        (**self).element_offset(element)
    }

    fn now(&self) -> Duration {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compat_mode_from_css1compat() {
        assert_eq!(
            CompatMode::from_document_mode("CSS1Compat"),
            CompatMode::Standards
        );
    }

    #[test]
    fn test_compat_mode_from_backcompat() {
        assert_eq!(
            CompatMode::from_document_mode("BackCompat"),
            CompatMode::Quirks
        );
    }

    #[test]
    fn test_compat_mode_from_empty_string_is_quirks() {
        assert_eq!(CompatMode::from_document_mode(""), CompatMode::Quirks);
    }

    #[test]
    fn test_container_display() {
        let doc: Container<u32> = Container::Document;
        assert_eq!(doc.to_string(), "document");
        assert_eq!(Container::Element(7u32).to_string(), "element 7");
    }

    #[test]
    fn test_container_identity_equality() {
        assert_eq!(Container::Element(1u32), Container::Element(1u32));
        assert_ne!(Container::Element(1u32), Container::Element(2u32));
        assert_ne!(Container::Element(1u32), Container::Document);
    }
}
