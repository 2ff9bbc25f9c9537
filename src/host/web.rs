//! Browser host backed by `web-sys`

use std::time::Duration;

use log::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Document, Element, EventTarget, Window};

use super::{CompatMode, Container, ScrollHandler, ScrollHost, ScrollPosition};

/// Attached listener; dropping it frees the JS closure
pub struct WebListener {
    closure: Closure<dyn Fn()>,
}

pub struct WebHost {
    window: Window,
    document: Document,
}

impl WebHost {
    /// Returns `None` outside a browser window context
    pub fn new() -> Option<Self> {
        let window = web_sys::window()?;
        let document = window.document()?;
        Some(Self { window, document })
    }

    fn target<'a>(&'a self, container: &'a Container<Element>) -> &'a EventTarget {
        match container {
            Container::Document => self.document.unchecked_ref(),
            Container::Element(element) => element.unchecked_ref(),
        }
    }
}

fn element_position(element: &Element) -> ScrollPosition {
    ScrollPosition::new(
        f64::from(element.scroll_left()),
        f64::from(element.scroll_top()),
    )
}

impl ScrollHost for WebHost {
    type Element = Element;
    type Listener = WebListener;

    fn add_passive_listener(
        &self,
        target: &Container<Element>,
        event: &'static str,
        handler: ScrollHandler,
    ) -> WebListener {
        let closure: Closure<dyn Fn()> = Closure::new(move || handler());

        let options = AddEventListenerOptions::new();
        options.set_passive(true);

        if let Err(e) = self
            .target(target)
            .add_event_listener_with_callback_and_add_event_listener_options(
                event,
                closure.as_ref().unchecked_ref(),
                &options,
            )
        {
            warn!("failed to attach {} listener to {}: {:?}", event, target, e);
        }
        WebListener { closure }
    }

    fn remove_passive_listener(
        &self,
        target: &Container<Element>,
        event: &'static str,
        listener: WebListener,
    ) {
        if let Err(e) = self
            .target(target)
            .remove_event_listener_with_callback(event, listener.closure.as_ref().unchecked_ref())
        {
            warn!("failed to detach {} listener from {}: {:?}", event, target, e);
        }
    }

    fn supports_page_offset(&self) -> bool {
        js_sys::Reflect::has(&self.window, &JsValue::from_str("scrollX")).unwrap_or(false)
    }

    fn page_offset(&self) -> ScrollPosition {
        ScrollPosition::new(
            self.window.scroll_x().unwrap_or_default(),
            self.window.scroll_y().unwrap_or_default(),
        )
    }

    fn compat_mode(&self) -> CompatMode {
        CompatMode::from_document_mode(&self.document.compat_mode())
    }

    fn document_element_offset(&self) -> ScrollPosition {
        self.document
            .document_element()
            .map(|root| element_position(&root))
            .unwrap_or_default()
    }

    fn body_offset(&self) -> ScrollPosition {
        self.document
            .body()
            .map(|body| element_position(&body))
            .unwrap_or_default()
    }

    fn element_offset(&self, element: &Element) -> ScrollPosition {
        element_position(element)
    }

    fn now(&self) -> Duration {
        let millis = self
            .window
            .performance()
            .map(|performance| performance.now())
            .unwrap_or_default();
        Duration::from_secs_f64(millis.max(0.0) / 1000.0)
    }
}
