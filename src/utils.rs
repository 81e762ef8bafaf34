// src/utils.rs
use crate::error::{UiError, UiResult};
use gloo_events::EventListener;
use gloo_utils::document;
use wasm_bindgen::JsCast;
use web_sys::{Element, NodeList};

/// Width assumed when the browser reports none, so layout falls back to desktop.
const FALLBACK_VIEWPORT_WIDTH: f64 = 1024.0;

/// Current viewport width in CSS pixels.
pub fn viewport_width() -> f64 {
    gloo_utils::window()
        .inner_width()
        .ok()
        .and_then(|w| w.as_f64())
        .or_else(|| {
            document()
                .document_element()
                .map(|root| root.client_width() as f64)
                .filter(|w| *w > 0.0)
        })
        .unwrap_or(FALLBACK_VIEWPORT_WIDTH)
}

pub fn query_one(selector: &str) -> UiResult<Element> {
    document()
        .query_selector(selector)
        .ok()
        .flatten()
        .ok_or_else(|| UiError::ElementNotFound(selector.to_string()))
}

pub fn query_all(selector: &str) -> Vec<Element> {
    match document().query_selector_all(selector) {
        Ok(list) => elements(&list),
        Err(e) => {
            log::warn!("Invalid selector '{}': {:?}", selector, e);
            Vec::new()
        }
    }
}

pub fn query_all_within(root: &Element, selector: &str) -> Vec<Element> {
    match root.query_selector_all(selector) {
        Ok(list) => elements(&list),
        Err(e) => {
            log::warn!("Invalid selector '{}': {:?}", selector, e);
            Vec::new()
        }
    }
}

fn elements(list: &NodeList) -> Vec<Element> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Runs `f` once the document has been parsed, immediately if it already is.
pub fn on_dom_ready(f: impl FnOnce() + 'static) {
    let document = document();
    if document.ready_state() == "loading" {
        EventListener::once(&document, "DOMContentLoaded", move |_| f()).forget();
    } else {
        f();
    }
}

/// Builds a `[a],[b]` selector list out of attribute names.
pub fn attribute_selector(attributes: &[String]) -> String {
    attributes
        .iter()
        .map(|attr| format!("[{}]", attr))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_selector() {
        let attrs = vec!["data-avatar-url".to_string(), "data-image-url".to_string()];
        assert_eq!(attribute_selector(&attrs), "[data-avatar-url],[data-image-url]");
        assert_eq!(attribute_selector(&[]), "");
    }
}
