// src/bindings.rs
use crate::config::SidebarConfig;
use crate::dom_panel::DomPanel;
use crate::error::{UiError, UiResult};
use crate::sidebar::{SidebarController, ViewportClass};
use crate::storage::{ClientStore, StatePersistence};
use crate::utils::{query_all, viewport_width};
use gloo_events::{EventListener, EventListenerOptions};
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::Element;

pub type DomController = SidebarController<DomPanel, ClientStore>;

/// Listener guards keyed by the thing they are attached to. Binding a key
/// again drops, and so detaches, the guard it replaces.
pub struct ListenerRegistry<K, L> {
    entries: Vec<(K, L)>,
}

impl<K: PartialEq, L> ListenerRegistry<K, L> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Returns `true` when an earlier listener for `key` was replaced.
    pub fn bind(&mut self, key: K, listener: L) -> bool {
        let replaced = self.unbind(&key).is_some();
        self.entries.push((key, listener));
        replaced
    }

    pub fn unbind(&mut self, key: &K) -> Option<L> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.swap_remove(index).1)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: PartialEq, L> Default for ListenerRegistry<K, L> {
    fn default() -> Self {
        Self::new()
    }
}

/// The sidebar controller together with every listener that drives it.
pub struct SidebarBindings {
    controller: Rc<RefCell<DomController>>,
    toggles: ListenerRegistry<Element, EventListener>,
    nav_links: ListenerRegistry<Element, EventListener>,
    overlay: Option<EventListener>,
    resize: Option<EventListener>,
    toggle_selectors: Vec<String>,
    nav_link_selector: String,
}

impl SidebarBindings {
    /// Finds the sidebar and its controls, restores the saved state and
    /// attaches all handlers.
    pub fn install(config: &SidebarConfig) -> UiResult<Self> {
        let panel = require_controls(&config.toggle_selectors, find_controls, || {
            DomPanel::find(config)
        })?;

        let persistence = StatePersistence::new(
            ClientStore::local_or_memory(),
            ClientStore::session_or_memory(),
            config.storage_key.clone(),
        );
        let mut controller = SidebarController::new(panel, persistence, config);
        controller.initialize(viewport_width());

        let mut bindings = Self {
            controller: Rc::new(RefCell::new(controller)),
            toggles: ListenerRegistry::new(),
            nav_links: ListenerRegistry::new(),
            overlay: None,
            resize: None,
            toggle_selectors: config.toggle_selectors.clone(),
            nav_link_selector: config.nav_link_selector.clone(),
        };
        bindings.rebind();
        Ok(bindings)
    }

    /// Attaches the toggle to one control, replacing any handler this
    /// controller attached to it before.
    pub fn bind_toggle(&mut self, control: &Element) {
        let controller = self.controller.clone();
        let listener = EventListener::new_with_options(
            control,
            "click",
            toggle_listener_options(),
            move |event| {
                // toggles are often `<a href="#">`
                event.prevent_default();
                with_controller(&controller, |c| {
                    c.toggle();
                });
            },
        );
        if self.toggles.bind(control.clone(), listener) {
            log::debug!("Replaced existing toggle handler on {}", control.id());
        }
    }

    /// Drops every handler this controller attached.
    pub fn unbind(&mut self) {
        self.toggles.clear();
        self.nav_links.clear();
        self.overlay = None;
        self.resize = None;
    }

    /// Re-scans the page for controls and attaches fresh handlers.
    pub fn rebind(&mut self) {
        self.unbind();

        for control in find_controls(&self.toggle_selectors) {
            self.bind_toggle(&control);
        }

        for link in query_all(&self.nav_link_selector) {
            let controller = self.controller.clone();
            let listener = EventListener::new(&link, "click", move |_| {
                with_controller(&controller, |c| {
                    if c.viewport() == Some(ViewportClass::Mobile) {
                        c.close();
                    }
                });
            });
            self.nav_links.bind(link, listener);
        }

        let overlay = self.controller.borrow().panel().overlay().cloned();
        self.overlay = overlay.map(|overlay| {
            let controller = self.controller.clone();
            EventListener::new(&overlay, "click", move |_| {
                with_controller(&controller, |c| {
                    c.close();
                });
            })
        });

        let controller = self.controller.clone();
        self.resize = Some(EventListener::new(&gloo_utils::window(), "resize", move |_| {
            with_controller(&controller, |c| {
                c.on_viewport_change(viewport_width());
            });
        }));

        log::info!(
            "Sidebar bound to {} toggle(s), {} nav link(s)",
            self.toggles.len(),
            self.nav_links.len()
        );
    }
}

/// Toggle clicks cancel the control's default action, which passive
/// listeners cannot do.
fn toggle_listener_options() -> EventListenerOptions {
    EventListenerOptions::enable_prevent_default()
}

/// Builds the panel only once at least one toggle control exists, so a page
/// without controls is left untouched.
fn require_controls<C, P>(
    selectors: &[String],
    find: impl FnOnce(&[String]) -> Vec<C>,
    build_panel: impl FnOnce() -> UiResult<P>,
) -> UiResult<P> {
    if find(selectors).is_empty() {
        return Err(UiError::ElementNotFound(selectors.join(", ")));
    }
    build_panel()
}

fn find_controls(selectors: &[String]) -> Vec<Element> {
    let mut controls: Vec<Element> = Vec::new();
    for selector in selectors {
        for control in query_all(selector) {
            if !controls.contains(&control) {
                controls.push(control);
            }
        }
    }
    controls
}

fn with_controller(controller: &Rc<RefCell<DomController>>, f: impl FnOnce(&mut DomController)) {
    match controller.try_borrow_mut() {
        Ok(mut controller) => f(&mut controller),
        Err(_) => log::warn!("Sidebar controller busy, event ignored"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Stands in for an attached event listener: it can be fired and it
    /// counts how often it was detached.
    struct FakeListener {
        on_click: Rc<dyn Fn()>,
        detached: Rc<Cell<u32>>,
    }

    impl Drop for FakeListener {
        fn drop(&mut self) {
            self.detached.set(self.detached.get() + 1);
        }
    }

    fn click(registry: &ListenerRegistry<&str, FakeListener>, control: &str) {
        for (key, listener) in &registry.entries {
            if *key == control {
                (listener.on_click)();
            }
        }
    }

    fn counting_listener(toggles: &Rc<Cell<u32>>, detached: &Rc<Cell<u32>>) -> FakeListener {
        let toggles = toggles.clone();
        FakeListener {
            on_click: Rc::new(move || toggles.set(toggles.get() + 1)),
            detached: detached.clone(),
        }
    }

    #[test]
    fn test_toggle_listener_can_cancel_navigation() {
        assert!(!toggle_listener_options().passive);
    }

    #[test]
    fn test_no_controls_leaves_page_untouched() {
        let selectors = vec!["#sidebarToggle".to_string()];
        let built = Cell::new(false);
        let result: UiResult<()> = require_controls(
            &selectors,
            |_| Vec::<()>::new(),
            || {
                built.set(true);
                Ok(())
            },
        );
        assert_eq!(result, Err(UiError::ElementNotFound("#sidebarToggle".to_string())));
        assert!(!built.get());
    }

    #[test]
    fn test_controls_present_builds_panel() {
        let selectors = vec!["#sidebarToggle".to_string(), "#sidebarToggleTop".to_string()];
        let result = require_controls(&selectors, |s| s.to_vec(), || Ok("panel"));
        assert_eq!(result, Ok("panel"));
    }

    #[test]
    fn test_double_bind_fires_once() {
        let toggles = Rc::new(Cell::new(0));
        let detached = Rc::new(Cell::new(0));
        let mut registry = ListenerRegistry::new();

        assert!(!registry.bind("#sidebarToggle", counting_listener(&toggles, &detached)));
        assert!(registry.bind("#sidebarToggle", counting_listener(&toggles, &detached)));

        click(&registry, "#sidebarToggle");
        assert_eq!(toggles.get(), 1);
        assert_eq!(detached.get(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_controls_are_independent() {
        let toggles = Rc::new(Cell::new(0));
        let detached = Rc::new(Cell::new(0));
        let mut registry = ListenerRegistry::new();
        registry.bind("#sidebarToggle", counting_listener(&toggles, &detached));
        registry.bind("#sidebarToggleTop", counting_listener(&toggles, &detached));

        click(&registry, "#sidebarToggle");
        click(&registry, "#sidebarToggleTop");
        assert_eq!(toggles.get(), 2);
        assert_eq!(registry.len(), 2);
        assert_eq!(detached.get(), 0);
    }

    #[test]
    fn test_unbind_and_clear_detach() {
        let toggles = Rc::new(Cell::new(0));
        let detached = Rc::new(Cell::new(0));
        let mut registry = ListenerRegistry::new();
        registry.bind("a", counting_listener(&toggles, &detached));
        registry.bind("b", counting_listener(&toggles, &detached));
        registry.bind("c", counting_listener(&toggles, &detached));

        drop(registry.unbind(&"a"));
        assert_eq!(detached.get(), 1);
        assert!(registry.unbind(&"a").is_none());

        registry.clear();
        assert_eq!(detached.get(), 3);
        assert!(registry.is_empty());

        click(&registry, "b");
        assert_eq!(toggles.get(), 0);
    }
}
