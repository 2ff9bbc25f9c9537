//! Deterministic in-memory host
//!
//! Models a document plus any number of scrollable elements. Offsets, the
//! compatibility mode and the clock are all set explicitly, and scroll events
//! are delivered synchronously by [`MemoryHost::scroll_to`] or
//! [`MemoryHost::dispatch_event`].

use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;

use super::{CompatMode, Container, SCROLL_EVENT, ScrollHandler, ScrollHost, ScrollPosition};

/// Identity of an element created by [`MemoryHost::create_element`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(u32);

/// Token for a listener attached to a [`MemoryHost`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

struct AttachedListener {
    id: ListenerId,
    target: Container<ElementId>,
    event: &'static str,
    handler: ScrollHandler,
}

struct MemoryState {
    next_element: u32,
    next_listener: u64,
    elements: HashMap<ElementId, ScrollPosition>,
    page: ScrollPosition,
    document_element: ScrollPosition,
    body: ScrollPosition,
    page_offset_supported: bool,
    compat_mode: CompatMode,
    now: Duration,
    listeners: Vec<AttachedListener>,
}

impl Default for MemoryState {
    fn default() -> Self {
        Self {
            next_element: 0,
            next_listener: 0,
            elements: HashMap::new(),
            page: ScrollPosition::default(),
            document_element: ScrollPosition::default(),
            body: ScrollPosition::default(),
            page_offset_supported: true,
            compat_mode: CompatMode::Standards,
            now: Duration::ZERO,
            listeners: Vec::new(),
        }
    }
}

#[derive(Default)]
pub struct MemoryHost {
    state: RefCell<MemoryState>,
}

impl MemoryHost {
    /// Standards-mode document with native page offsets, clock at zero
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_element(&self) -> ElementId {
        let mut state = self.state.borrow_mut();
        let id = ElementId(state.next_element);
        state.next_element += 1;
        state.elements.insert(id, ScrollPosition::default());
        id
    }

    pub fn set_page_offset_supported(&self, supported: bool) {
        self.state.borrow_mut().page_offset_supported = supported;
    }

    pub fn set_compat_mode(&self, mode: CompatMode) {
        self.state.borrow_mut().compat_mode = mode;
    }

    /// Sets offsets without delivering a scroll event
    pub fn set_offset(&self, container: &Container<ElementId>, x: f64, y: f64) {
        let position = ScrollPosition::new(x, y);
        let mut state = self.state.borrow_mut();
        match container {
            Container::Document => {
                // The page offset always tracks the element that actually scrolls.
                state.page = position;
                match state.compat_mode {
                    CompatMode::Standards => state.document_element = position,
                    CompatMode::Quirks => state.body = position,
                }
            }
            Container::Element(id) => {
                state.elements.insert(*id, position);
            }
        }
    }

    /// Sets only the native page offset readout
    pub fn set_page_offset(&self, x: f64, y: f64) {
        self.state.borrow_mut().page = ScrollPosition::new(x, y);
    }

    /// Sets only `document.documentElement`'s offsets
    pub fn set_document_element_offset(&self, x: f64, y: f64) {
        self.state.borrow_mut().document_element = ScrollPosition::new(x, y);
    }

    /// Sets only `document.body`'s offsets
    pub fn set_body_offset(&self, x: f64, y: f64) {
        self.state.borrow_mut().body = ScrollPosition::new(x, y);
    }

    /// Sets offsets and delivers a scroll event to the container's listeners
    pub fn scroll_to(&self, container: &Container<ElementId>, x: f64, y: f64) -> usize {
        self.set_offset(container, x, y);
        self.dispatch_event(container, SCROLL_EVENT)
    }

    /// Delivers `event` to every listener attached to `target`
    ///
    /// Returns the number of handlers invoked. A listener removed by an
    /// earlier handler in the same delivery is skipped.
    pub fn dispatch_event(&self, target: &Container<ElementId>, event: &str) -> usize {
        let snapshot: Vec<(ListenerId, ScrollHandler)> = self
            .state
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.target == *target && l.event == event)
            .map(|l| (l.id, l.handler.clone()))
            .collect();

        let mut invoked = 0;
        for (id, handler) in snapshot {
            let attached = self.state.borrow().listeners.iter().any(|l| l.id == id);
            if !attached {
                continue;
            }
            handler();
            invoked += 1;
        }
        invoked
    }

    pub fn listener_count(&self, target: &Container<ElementId>) -> usize {
        self.state
            .borrow()
            .listeners
            .iter()
            .filter(|l| l.target == *target)
            .count()
    }

    pub fn total_listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    pub fn advance(&self, by: Duration) {
        let mut state = self.state.borrow_mut();
        state.now += by;
    }

    pub fn set_now(&self, now: Duration) {
        self.state.borrow_mut().now = now;
    }
}

impl ScrollHost for MemoryHost {
    type Element = ElementId;
    type Listener = ListenerId;

    fn add_passive_listener(
        &self,
        target: &Container<ElementId>,
        event: &'static str,
        handler: ScrollHandler,
    ) -> ListenerId {
        let mut state = self.state.borrow_mut();
        let id = ListenerId(state.next_listener);
        state.next_listener += 1;
        state.listeners.push(AttachedListener {
            id,
            target: target.clone(),
            event,
            handler,
        });
        id
    }

    fn remove_passive_listener(
        &self,
        target: &Container<ElementId>,
        event: &'static str,
        listener: ListenerId,
    ) {
        self.state
            .borrow_mut()
            .listeners
            .retain(|l| !(l.id == listener && l.target == *target && l.event == event));
    }

    fn supports_page_offset(&self) -> bool {
        self.state.borrow().page_offset_supported
    }

    fn page_offset(&self) -> ScrollPosition {
        self.state.borrow().page
    }

    fn compat_mode(&self) -> CompatMode {
        self.state.borrow().compat_mode
    }

    fn document_element_offset(&self) -> ScrollPosition {
        self.state.borrow().document_element
    }

    fn body_offset(&self) -> ScrollPosition {
        self.state.borrow().body
    }

    fn element_offset(&self, element: &ElementId) -> ScrollPosition {
        self.state
            .borrow()
            .elements
            .get(element)
            .copied()
            .unwrap_or_default()
    }

    fn now(&self) -> Duration {
        self.state.borrow().now
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod memory_tests;
