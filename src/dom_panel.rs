// src/dom_panel.rs
use crate::config::SidebarConfig;
use crate::error::{UiError, UiResult};
use crate::sidebar::{CollapsiblePanel, SidebarVisibility};
use crate::utils::{query_all_within, query_one};
use gloo_utils::document;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

const OVERLAY_STYLE: [(&str, &str); 8] = [
    ("position", "fixed"),
    ("top", "0"),
    ("left", "0"),
    ("right", "0"),
    ("bottom", "0"),
    ("background-color", "rgba(0, 0, 0, 0.5)"),
    ("z-index", "998"),
    ("display", "none"),
];

/// Class removed from open submenus when the sidebar closes.
const SUBMENU_OPEN_CLASS: &str = "show";

/// The admin template's sidebar, body marker, content wrapper and overlay.
pub struct DomPanel {
    sidebar: Element,
    body: HtmlElement,
    content: Option<HtmlElement>,
    overlay: Option<HtmlElement>,
    closed_class: String,
    body_closed_class: String,
    submenu_selector: String,
}

impl DomPanel {
    pub fn find(config: &SidebarConfig) -> UiResult<Self> {
        let sidebar = query_one(&config.sidebar_selector)?;
        let body = document()
            .body()
            .ok_or_else(|| UiError::ElementNotFound("body".to_string()))?;

        let content = match query_one(&config.content_selector) {
            Ok(element) => element.dyn_into::<HtmlElement>().ok(),
            Err(e) => {
                log::debug!("{}; content margin left to the stylesheet", e);
                None
            }
        };

        let overlay = if config.overlay {
            Some(ensure_overlay(&config.overlay_id, &body)?)
        } else {
            None
        };

        Ok(Self {
            sidebar,
            body,
            content,
            overlay,
            closed_class: config.closed_class.clone(),
            body_closed_class: config.body_closed_class.clone(),
            submenu_selector: config.submenu_selector.clone(),
        })
    }

    pub fn overlay(&self) -> Option<&HtmlElement> {
        self.overlay.as_ref()
    }
}

fn ensure_overlay(id: &str, body: &HtmlElement) -> UiResult<HtmlElement> {
    if let Some(existing) = document().get_element_by_id(id) {
        return existing
            .dyn_into::<HtmlElement>()
            .map_err(|_| UiError::Dom(format!("#{} is not an HTML element", id)));
    }

    let overlay = document()
        .create_element("div")?
        .dyn_into::<HtmlElement>()
        .map_err(|_| UiError::Dom("created overlay is not an HTML element".to_string()))?;
    overlay.set_id(id);
    let style = overlay.style();
    for (property, value) in OVERLAY_STYLE {
        style.set_property(property, value)?;
    }
    body.append_child(&overlay)?;
    log::debug!("Created #{} overlay", id);
    Ok(overlay)
}

impl CollapsiblePanel for DomPanel {
    fn visibility(&self) -> SidebarVisibility {
        if self.sidebar.class_list().contains(&self.closed_class) {
            SidebarVisibility::Closed
        } else {
            SidebarVisibility::Open
        }
    }

    fn set_visibility(&mut self, state: SidebarVisibility) {
        let closed = state == SidebarVisibility::Closed;
        let sidebar = self
            .sidebar
            .class_list()
            .toggle_with_force(&self.closed_class, closed);
        let body = self
            .body
            .class_list()
            .toggle_with_force(&self.body_closed_class, closed);
        if let Err(e) = sidebar.and(body) {
            log::warn!("Failed to update sidebar classes: {:?}", e);
        }
    }

    fn collapse_submenus(&mut self) {
        for submenu in query_all_within(&self.sidebar, &self.submenu_selector) {
            let _ = submenu.class_list().remove_1(SUBMENU_OPEN_CLASS);
        }
    }

    fn set_overlay_visible(&mut self, visible: bool) {
        if let Some(overlay) = &self.overlay {
            let display = if visible { "block" } else { "none" };
            if let Err(e) = overlay.style().set_property("display", display) {
                log::warn!("Failed to update overlay: {:?}", e);
            }
        }
    }

    fn set_content_margin(&mut self, margin: Option<&str>) {
        let Some(content) = &self.content else {
            return;
        };
        let style = content.style();
        let result = match margin {
            Some(margin) => style.set_property("margin-left", margin),
            None => style.remove_property("margin-left").map(|_| ()),
        };
        if let Err(e) = result {
            log::warn!("Failed to update content margin: {:?}", e);
        }
    }
}
