//! Scroll offset computation
//!
//! Elements report their own `scrollLeft`/`scrollTop`. The document is less
//! uniform: browsers expose the native page offset, and older engines only
//! expose the offset of whichever element scrolls in the current box-model
//! mode. [`DocumentOffset`] picks the readout once per host so the hot path
//! does not re-probe on every scroll frame.

use crate::host::{CompatMode, Container, ScrollHost, ScrollPosition};

/// Strategy for reading the document's scroll offset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentOffset {
    /// `window.scrollX` / `window.scrollY`
    PageOffset,
    /// `document.documentElement.scrollLeft/scrollTop` (standards mode)
    DocumentElement,
    /// `document.body.scrollLeft/scrollTop` (quirks mode)
    Body,
}

impl DocumentOffset {
    pub fn detect<H: ScrollHost + ?Sized>(host: &H) -> Self {
        if host.supports_page_offset() {
            DocumentOffset::PageOffset
        } else {
            match host.compat_mode() {
                CompatMode::Standards => DocumentOffset::DocumentElement,
                CompatMode::Quirks => DocumentOffset::Body,
            }
        }
    }

    pub fn read<H: ScrollHost + ?Sized>(self, host: &H) -> ScrollPosition {
        match self {
            DocumentOffset::PageOffset => host.page_offset(),
            DocumentOffset::DocumentElement => host.document_element_offset(),
            DocumentOffset::Body => host.body_offset(),
        }
    }
}

/// Current offset of `container`. Never cached.
pub fn current_offset<H: ScrollHost + ?Sized>(
    host: &H,
    document: DocumentOffset,
    container: &Container<H::Element>,
) -> ScrollPosition {
    match container {
        Container::Document => document.read(host),
        Container::Element(element) => host.element_offset(element),
    }
}
