//! Element measurement, inline style writes and the intersection observer
//! guard.

use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{
    window, Element, HtmlElement, IntersectionObserver, IntersectionObserverEntry,
    IntersectionObserverInit,
};
use yew::NodeRef;

use crate::motion::{Bounds, Frame, Rect, Surface};

const FALLBACK_VIEWPORT_HEIGHT: f64 = 720.0;
const FRAME_PROPERTIES: [&str; 3] = ["opacity", "transform", "width"];

pub fn viewport_height() -> f64 {
    window()
        .and_then(|w| w.inner_height().ok())
        .and_then(|value| value.as_f64())
        .unwrap_or(FALLBACK_VIEWPORT_HEIGHT)
}

pub fn scroll_y() -> f64 {
    window().and_then(|w| w.scroll_y().ok()).unwrap_or(0.0)
}

/// Largest reachable scroll offset of the document.
pub fn scroll_limit() -> f64 {
    let document_height = window()
        .and_then(|w| w.document())
        .and_then(|d| d.document_element())
        .map(|root| f64::from(root.scroll_height()))
        .unwrap_or(0.0);

    (document_height - viewport_height()).max(0.0)
}

pub fn scroll_window_to(y: f64) {
    if let Some(win) = window() {
        win.scroll_to_with_x_and_y(0.0, y);
    }
}

pub fn element_by_id(id: &str) -> Option<Element> {
    window()?.document()?.get_element_by_id(id)
}

pub fn client_rect(element: &Element) -> Rect {
    let rect = element.get_bounding_client_rect();
    Rect {
        left: rect.left(),
        top: rect.top(),
        width: rect.width(),
        height: rect.height(),
    }
}

pub fn document_bounds(element: &Element) -> Bounds {
    let rect = element.get_bounding_client_rect();
    Bounds {
        top: rect.top() + scroll_y(),
        height: rect.height(),
    }
}

pub fn prefers_reduced_motion() -> bool {
    window()
        .and_then(|w| {
            w.match_media("(prefers-reduced-motion: reduce)")
                .ok()
                .flatten()
        })
        .map(|mq| mq.matches())
        .unwrap_or(false)
}

pub fn set_style(node: &NodeRef, name: &str, value: &str) {
    if let Some(element) = node.cast::<HtmlElement>() {
        let _ = element.style().set_property(name, value);
    }
}

/// Timelines render as inline styles on the referenced element.
impl Surface for NodeRef {
    fn paint(&self, frame: &Frame) {
        let Some(element) = self.cast::<HtmlElement>() else {
            return;
        };
        let style = element.style();
        for (name, value) in frame.css_declarations() {
            let _ = style.set_property(name, &value);
        }
    }

    fn clear(&self) {
        let Some(element) = self.cast::<HtmlElement>() else {
            return;
        };
        let style = element.style();
        for name in FRAME_PROPERTIES {
            let _ = style.remove_property(name);
        }
    }
}

/// Intersection observer on a single element, disconnected on drop.
pub struct IntersectionWatch {
    observer: IntersectionObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>,
}

impl IntersectionWatch {
    /// Calls `on_entry(ratio, is_intersecting)` for every observer entry.
    pub fn observe(
        target: &Element,
        threshold: f64,
        mut on_entry: impl FnMut(f64, bool) + 'static,
    ) -> Option<Self> {
        let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                for entry in entries.iter() {
                    if let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() {
                        on_entry(entry.intersection_ratio(), entry.is_intersecting());
                    }
                }
            },
        );

        let options = IntersectionObserverInit::new();
        options.set_threshold(&JsValue::from_f64(threshold));
        let observer =
            IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options).ok()?;
        observer.observe(target);

        Some(Self {
            observer,
            _callback: callback,
        })
    }
}

impl Drop for IntersectionWatch {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}
