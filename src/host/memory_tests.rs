//! Tests for MemoryHost

use super::*;
use std::cell::Cell;
use std::rc::Rc;

fn counting_handler() -> (ScrollHandler, Rc<Cell<usize>>) {
    let count = Rc::new(Cell::new(0));
    let c = count.clone();
    (Rc::new(move || c.set(c.get() + 1)), count)
}

#[test]
fn test_new_host_defaults() {
    let host = MemoryHost::new();
    assert!(host.supports_page_offset());
    assert_eq!(host.compat_mode(), CompatMode::Standards);
    assert_eq!(host.now(), Duration::ZERO);
    assert_eq!(host.total_listener_count(), 0);
}

#[test]
fn test_create_element_returns_distinct_ids() {
    let host = MemoryHost::new();
    let a = host.create_element();
    let b = host.create_element();
    assert_ne!(a, b);
    assert_eq!(host.element_offset(&a), ScrollPosition::default());
}

#[test]
fn test_scroll_to_element_updates_offset_and_fires() {
    let host = MemoryHost::new();
    let el = Container::Element(host.create_element());
    let (handler, count) = counting_handler();
    host.add_passive_listener(&el, SCROLL_EVENT, handler);

    let invoked = host.scroll_to(&el, 5.0, 50.0);

    assert_eq!(invoked, 1);
    assert_eq!(count.get(), 1);
    if let Container::Element(id) = &el {
        assert_eq!(host.element_offset(id), ScrollPosition::new(5.0, 50.0));
    }
}

#[test]
fn test_scroll_to_only_fires_listeners_on_target() {
    let host = MemoryHost::new();
    let a = Container::Element(host.create_element());
    let b = Container::Element(host.create_element());
    let (handler, count) = counting_handler();
    host.add_passive_listener(&a, SCROLL_EVENT, handler);

    host.scroll_to(&b, 1.0, 1.0);
    host.scroll_to(&Container::Document, 1.0, 1.0);

    assert_eq!(count.get(), 0);
}

#[test]
fn test_document_scroll_in_standards_mode_moves_document_element() {
    let host = MemoryHost::new();
    host.set_offset(&Container::Document, 120.0, 340.0);

    assert_eq!(host.page_offset(), ScrollPosition::new(120.0, 340.0));
    assert_eq!(
        host.document_element_offset(),
        ScrollPosition::new(120.0, 340.0)
    );
    assert_eq!(host.body_offset(), ScrollPosition::default());
}

#[test]
fn test_document_scroll_in_quirks_mode_moves_body() {
    let host = MemoryHost::new();
    host.set_compat_mode(CompatMode::Quirks);
    host.set_offset(&Container::Document, 120.0, 340.0);

    assert_eq!(host.body_offset(), ScrollPosition::new(120.0, 340.0));
    assert_eq!(host.document_element_offset(), ScrollPosition::default());
}

#[test]
fn test_document_readouts_are_set_independently() {
    let host = MemoryHost::new();
    host.set_page_offset(1.0, 2.0);
    host.set_document_element_offset(3.0, 4.0);
    host.set_body_offset(5.0, 6.0);

    assert_eq!(host.page_offset(), ScrollPosition::new(1.0, 2.0));
    assert_eq!(host.document_element_offset(), ScrollPosition::new(3.0, 4.0));
    assert_eq!(host.body_offset(), ScrollPosition::new(5.0, 6.0));
}

#[test]
fn test_remove_listener_stops_delivery() {
    let host = MemoryHost::new();
    let (handler, count) = counting_handler();
    let id = host.add_passive_listener(&Container::Document, SCROLL_EVENT, handler);

    host.remove_passive_listener(&Container::Document, SCROLL_EVENT, id);
    host.scroll_to(&Container::Document, 0.0, 10.0);

    assert_eq!(count.get(), 0);
    assert_eq!(host.listener_count(&Container::Document), 0);
}

#[test]
fn test_remove_listener_with_wrong_target_is_ignored() {
    let host = MemoryHost::new();
    let el = Container::Element(host.create_element());
    let (handler, _count) = counting_handler();
    let id = host.add_passive_listener(&Container::Document, SCROLL_EVENT, handler);

    host.remove_passive_listener(&el, SCROLL_EVENT, id);

    assert_eq!(host.listener_count(&Container::Document), 1);
}

#[test]
fn test_listener_removed_mid_dispatch_is_skipped() {
    let host = Rc::new(MemoryHost::new());
    let victim = Rc::new(Cell::new(None));

    // Attached first, so it runs first and detaches the second listener.
    let h = host.clone();
    let v = victim.clone();
    host.add_passive_listener(
        &Container::Document,
        SCROLL_EVENT,
        Rc::new(move || {
            if let Some(id) = v.take() {
                h.remove_passive_listener(&Container::Document, SCROLL_EVENT, id);
            }
        }),
    );
    let (victim_handler, victim_count) = counting_handler();
    victim.set(Some(host.add_passive_listener(
        &Container::Document,
        SCROLL_EVENT,
        victim_handler,
    )));

    let invoked = host.scroll_to(&Container::Document, 0.0, 1.0);

    assert_eq!(invoked, 1);
    assert_eq!(victim_count.get(), 0);
    assert_eq!(host.listener_count(&Container::Document), 1);
}

#[test]
fn test_other_events_do_not_reach_scroll_listeners() {
    let host = MemoryHost::new();
    let (handler, count) = counting_handler();
    host.add_passive_listener(&Container::Document, SCROLL_EVENT, handler);

    let invoked = host.dispatch_event(&Container::Document, "resize");

    assert_eq!(invoked, 0);
    assert_eq!(count.get(), 0);
}

#[test]
fn test_clock_advance_and_set() {
    let host = MemoryHost::new();
    host.advance(Duration::from_millis(40));
    host.advance(Duration::from_millis(2));
    assert_eq!(host.now(), Duration::from_millis(42));

    host.set_now(Duration::from_millis(5));
    assert_eq!(host.now(), Duration::from_millis(5));
}
