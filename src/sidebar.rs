// src/sidebar.rs
use crate::config::SidebarConfig;
use crate::storage::{PersistedState, StatePersistence, StateStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SidebarVisibility {
    Open,
    Closed,
}

impl SidebarVisibility {
    pub fn from_stored(raw: &str) -> Option<Self> {
        match raw.trim() {
            "open" => Some(SidebarVisibility::Open),
            "closed" => Some(SidebarVisibility::Closed),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SidebarVisibility::Open => "open",
            SidebarVisibility::Closed => "closed",
        }
    }

    pub fn inverted(self) -> Self {
        match self {
            SidebarVisibility::Open => SidebarVisibility::Closed,
            SidebarVisibility::Closed => SidebarVisibility::Open,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportClass {
    Mobile,
    Desktop,
}

impl ViewportClass {
    pub fn from_width(width: f64, breakpoint: f64) -> Self {
        if width < breakpoint {
            ViewportClass::Mobile
        } else {
            ViewportClass::Desktop
        }
    }
}

/// The page-side surface the controller drives. Implementations own the
/// actual sidebar, overlay and content elements.
pub trait CollapsiblePanel {
    fn visibility(&self) -> SidebarVisibility;
    /// Updates the sidebar and its body companion marker in one step.
    fn set_visibility(&mut self, state: SidebarVisibility);
    fn collapse_submenus(&mut self);
    fn set_overlay_visible(&mut self, visible: bool);
    /// `None` drops any inline margin so the stylesheet decides.
    fn set_content_margin(&mut self, margin: Option<&str>);
}

/// Default state for a viewport class given what the stores remember.
///
/// Mobile starts closed unless the user reopened the sidebar during this
/// session; desktop starts open unless the user closed it at some point.
pub fn resolve_visibility(viewport: ViewportClass, persisted: PersistedState) -> SidebarVisibility {
    match viewport {
        ViewportClass::Mobile => match persisted.session_choice {
            Some(SidebarVisibility::Open) => SidebarVisibility::Open,
            _ => SidebarVisibility::Closed,
        },
        ViewportClass::Desktop => match persisted.stored {
            Some(SidebarVisibility::Closed) => SidebarVisibility::Closed,
            _ => SidebarVisibility::Open,
        },
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Layout {
    overlay_visible: bool,
    content_margin: Option<String>,
}

pub struct SidebarController<P: CollapsiblePanel, S: StateStore> {
    panel: P,
    persistence: StatePersistence<S>,
    breakpoint: f64,
    expanded_margin: String,
    collapsed_margin: String,
    overlay_enabled: bool,
    viewport: Option<ViewportClass>,
    // class the user last toggled in; resize leaves that class alone
    interacted_in: Option<ViewportClass>,
    overlay_visible: Option<bool>,
    content_margin: Option<Option<String>>,
}

impl<P: CollapsiblePanel, S: StateStore> SidebarController<P, S> {
    pub fn new(panel: P, persistence: StatePersistence<S>, config: &SidebarConfig) -> Self {
        Self {
            panel,
            persistence,
            breakpoint: config.mobile_breakpoint,
            expanded_margin: config.expanded_margin.clone(),
            collapsed_margin: config.collapsed_margin.clone(),
            overlay_enabled: config.overlay,
            viewport: None,
            interacted_in: None,
            overlay_visible: None,
            content_margin: None,
        }
    }

    pub fn panel(&self) -> &P {
        &self.panel
    }

    pub fn visibility(&self) -> SidebarVisibility {
        self.panel.visibility()
    }

    pub fn viewport(&self) -> Option<ViewportClass> {
        self.viewport
    }

    /// Brings the page in line with the stored state for the given viewport
    /// width. Safe to call again: unchanged inputs cause no DOM writes.
    pub fn initialize(&mut self, viewport_width: f64) -> SidebarVisibility {
        if let Err(e) = self.persistence.migrate_legacy() {
            log::warn!("Skipping legacy sidebar state migration: {}", e);
        }
        let viewport = ViewportClass::from_width(viewport_width, self.breakpoint);
        self.viewport = Some(viewport);
        let state = self.reconcile(viewport);
        log::info!("Sidebar initialized: {} on {:?}", state.as_str(), viewport);
        state
    }

    pub fn toggle(&mut self) -> SidebarVisibility {
        let next = self.panel.visibility().inverted();
        self.set_by_user(next)
    }

    /// Forces the sidebar closed, as an explicit user action.
    pub fn close(&mut self) -> SidebarVisibility {
        self.set_by_user(SidebarVisibility::Closed)
    }

    pub fn on_viewport_change(&mut self, viewport_width: f64) -> SidebarVisibility {
        let viewport = ViewportClass::from_width(viewport_width, self.breakpoint);
        let previous = self.viewport.replace(viewport);
        if previous != Some(viewport) && self.interacted_in != Some(viewport) {
            log::debug!("Viewport changed to {:?}", viewport);
            self.reconcile(viewport)
        } else {
            let state = self.panel.visibility();
            self.apply(state, viewport);
            state
        }
    }

    fn reconcile(&mut self, viewport: ViewportClass) -> SidebarVisibility {
        let persisted = self.persistence.load();
        let state = resolve_visibility(viewport, persisted);
        self.apply(state, viewport);
        if persisted.current != Some(state) {
            self.persistence.save_current(state);
        }
        state
    }

    fn set_by_user(&mut self, state: SidebarVisibility) -> SidebarVisibility {
        let viewport = self.viewport.unwrap_or(ViewportClass::Desktop);
        self.interacted_in = Some(viewport);
        self.apply(state, viewport);
        self.persistence.save(state);
        log::debug!("Sidebar {} by user", state.as_str());
        state
    }

    fn apply(&mut self, state: SidebarVisibility, viewport: ViewportClass) {
        if self.panel.visibility() != state {
            self.panel.set_visibility(state);
            if state == SidebarVisibility::Closed {
                self.panel.collapse_submenus();
            }
        }

        let layout = self.layout_for(state, viewport);
        if self.overlay_visible != Some(layout.overlay_visible) {
            self.panel.set_overlay_visible(layout.overlay_visible);
            self.overlay_visible = Some(layout.overlay_visible);
        }
        if self.content_margin.as_ref() != Some(&layout.content_margin) {
            self.panel.set_content_margin(layout.content_margin.as_deref());
            self.content_margin = Some(layout.content_margin);
        }
    }

    fn layout_for(&self, state: SidebarVisibility, viewport: ViewportClass) -> Layout {
        match viewport {
            ViewportClass::Mobile => Layout {
                overlay_visible: self.overlay_enabled && state == SidebarVisibility::Open,
                content_margin: None,
            },
            ViewportClass::Desktop => Layout {
                overlay_visible: false,
                content_margin: Some(match state {
                    SidebarVisibility::Open => self.expanded_margin.clone(),
                    SidebarVisibility::Closed => self.collapsed_margin.clone(),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[derive(Default)]
    struct RecordingPanel {
        closed: bool,
        visibility_writes: u32,
        submenu_collapses: u32,
        overlay: Option<bool>,
        margin: Option<String>,
        layout_writes: u32,
    }

    impl CollapsiblePanel for RecordingPanel {
        fn visibility(&self) -> SidebarVisibility {
            if self.closed {
                SidebarVisibility::Closed
            } else {
                SidebarVisibility::Open
            }
        }

        fn set_visibility(&mut self, state: SidebarVisibility) {
            self.closed = state == SidebarVisibility::Closed;
            self.visibility_writes += 1;
        }

        fn collapse_submenus(&mut self) {
            self.submenu_collapses += 1;
        }

        fn set_overlay_visible(&mut self, visible: bool) {
            self.overlay = Some(visible);
            self.layout_writes += 1;
        }

        fn set_content_margin(&mut self, margin: Option<&str>) {
            self.margin = margin.map(str::to_string);
            self.layout_writes += 1;
        }
    }

    type TestController = SidebarController<RecordingPanel, MemoryStore>;

    fn controller_with(local: MemoryStore, session: MemoryStore) -> TestController {
        SidebarController::new(
            RecordingPanel::default(),
            StatePersistence::new(local, session, "sidebarState"),
            &SidebarConfig::default(),
        )
    }

    fn controller() -> TestController {
        controller_with(MemoryStore::new(), MemoryStore::new())
    }

    fn stored(c: &TestController) -> PersistedState {
        c.persistence.load()
    }

    #[test]
    fn test_desktop_defaults_open() {
        for width in [768.0, 1024.0, 1920.0, 4000.0] {
            let mut c = controller();
            assert_eq!(c.initialize(width), SidebarVisibility::Open);
            assert_eq!(c.visibility(), SidebarVisibility::Open);
            assert_eq!(c.panel().overlay, Some(false));
            assert_eq!(c.panel().margin.as_deref(), Some("250px"));
        }
    }

    #[test]
    fn test_mobile_defaults_closed() {
        for width in [0.0, 320.0, 767.0, 767.9] {
            let mut c = controller();
            assert_eq!(c.initialize(width), SidebarVisibility::Closed);
            assert_eq!(c.visibility(), SidebarVisibility::Closed);
            assert_eq!(c.panel().overlay, Some(false));
            assert_eq!(c.panel().margin, None);
        }
    }

    #[test]
    fn test_desktop_respects_stored_close() {
        let local = MemoryStore::new();
        local.set("sidebarState", "closed").unwrap();
        let mut c = controller_with(local, MemoryStore::new());
        assert_eq!(c.initialize(1280.0), SidebarVisibility::Closed);
        assert_eq!(c.panel().margin.as_deref(), Some("100px"));
    }

    #[test]
    fn test_mobile_ignores_open_from_earlier_session() {
        let local = MemoryStore::new();
        local.set("sidebarState", "open").unwrap();
        let mut c = controller_with(local, MemoryStore::new());
        assert_eq!(c.initialize(400.0), SidebarVisibility::Closed);
        // reconciling is not a user choice: the desktop preference stays
        // while the session record follows the page
        assert_eq!(stored(&c).stored, Some(SidebarVisibility::Open));
        assert_eq!(stored(&c).session_choice, None);
        assert_eq!(stored(&c).current, Some(SidebarVisibility::Closed));
    }

    #[test]
    fn test_mobile_keeps_reopen_from_this_session() {
        let session = MemoryStore::new();
        session.set("sidebarStateChoice", "open").unwrap();
        let mut c = controller_with(MemoryStore::new(), session);
        assert_eq!(c.initialize(400.0), SidebarVisibility::Open);
        assert_eq!(c.panel().overlay, Some(true));
    }

    #[test]
    fn test_initialize_migrates_legacy_key() {
        let local = MemoryStore::new();
        local.set("sidebarToggled", "true").unwrap();
        let mut c = controller_with(local, MemoryStore::new());
        assert_eq!(c.initialize(1024.0), SidebarVisibility::Closed);
        assert_eq!(stored(&c).stored, Some(SidebarVisibility::Closed));
    }

    #[test]
    fn test_session_record_matches_page_after_load() {
        for width in [320.0, 767.0, 768.0, 1440.0] {
            let mut c = controller();
            let state = c.initialize(width);
            assert_eq!(stored(&c).current, Some(state));
            assert_eq!(stored(&c).current, Some(c.visibility()));
        }
    }

    #[test]
    fn test_session_record_matches_page_after_resize() {
        let mut c = controller();
        c.initialize(1200.0);
        c.on_viewport_change(500.0);
        assert_eq!(stored(&c).current, Some(SidebarVisibility::Closed));
        assert_eq!(stored(&c).current, Some(c.visibility()));
        c.toggle();
        assert_eq!(stored(&c).current, Some(c.visibility()));
    }

    #[test]
    fn test_reinitialize_does_not_touch_dom() {
        let mut c = controller();
        c.initialize(1024.0);
        let visibility_writes = c.panel().visibility_writes;
        let layout_writes = c.panel().layout_writes;
        c.initialize(1024.0);
        c.initialize(1024.0);
        assert_eq!(c.panel().visibility_writes, visibility_writes);
        assert_eq!(c.panel().layout_writes, layout_writes);
    }

    #[test]
    fn test_toggle_twice_restores_state() {
        let local = MemoryStore::new();
        local.set("sidebarState", "open").unwrap();
        let mut c = controller_with(local, MemoryStore::new());
        c.initialize(1024.0);
        let before = (c.visibility(), stored(&c).stored);

        assert_eq!(c.toggle(), SidebarVisibility::Closed);
        assert_eq!(stored(&c).stored, Some(SidebarVisibility::Closed));
        assert_eq!(c.toggle(), SidebarVisibility::Open);

        assert_eq!(c.visibility(), before.0);
        assert_eq!(stored(&c).stored, before.1);
    }

    #[test]
    fn test_toggle_persists_and_matches_dom() {
        let mut c = controller();
        c.initialize(500.0);
        let state = c.toggle();
        assert_eq!(state, SidebarVisibility::Open);
        assert_eq!(c.visibility(), state);
        assert_eq!(stored(&c).stored, Some(state));
        assert_eq!(stored(&c).session_choice, Some(state));
        assert_eq!(c.panel().overlay, Some(true));
    }

    #[test]
    fn test_closing_collapses_submenus() {
        let mut c = controller();
        c.initialize(1024.0);
        c.toggle();
        assert_eq!(c.panel().submenu_collapses, 1);
        c.toggle();
        assert_eq!(c.panel().submenu_collapses, 1);
    }

    #[test]
    fn test_close_from_overlay() {
        let mut c = controller();
        c.initialize(500.0);
        c.toggle();
        assert_eq!(c.close(), SidebarVisibility::Closed);
        assert_eq!(c.panel().overlay, Some(false));
        assert_eq!(stored(&c).session_choice, Some(SidebarVisibility::Closed));
    }

    #[test]
    fn test_resize_to_mobile_applies_default() {
        let mut c = controller();
        c.initialize(1200.0);
        assert_eq!(c.on_viewport_change(600.0), SidebarVisibility::Closed);
        assert_eq!(c.viewport(), Some(ViewportClass::Mobile));
        assert_eq!(c.on_viewport_change(1200.0), SidebarVisibility::Open);
    }

    #[test]
    fn test_resize_within_class_keeps_state() {
        let mut c = controller();
        c.initialize(1200.0);
        c.toggle();
        assert_eq!(c.on_viewport_change(1000.0), SidebarVisibility::Closed);
        assert_eq!(c.on_viewport_change(900.0), SidebarVisibility::Closed);
    }

    #[test]
    fn test_resize_does_not_fight_user_choice() {
        let mut c = controller();
        c.initialize(600.0);
        // user opens the sidebar on mobile
        assert_eq!(c.toggle(), SidebarVisibility::Open);
        c.on_viewport_change(1200.0);
        // back in the class the user toggled in: their choice stands
        assert_eq!(c.on_viewport_change(600.0), SidebarVisibility::Open);
        assert_eq!(c.panel().overlay, Some(true));
    }

    #[test]
    fn test_resize_to_desktop_uses_stored_preference() {
        let local = MemoryStore::new();
        local.set("sidebarState", "closed").unwrap();
        let mut c = controller_with(local, MemoryStore::new());
        c.initialize(500.0);
        assert_eq!(c.on_viewport_change(1300.0), SidebarVisibility::Closed);
        assert_eq!(c.panel().margin.as_deref(), Some("100px"));
    }

    #[test]
    fn test_overlay_disabled() {
        let config = SidebarConfig {
            overlay: false,
            ..SidebarConfig::default()
        };
        let mut c = SidebarController::new(
            RecordingPanel::default(),
            StatePersistence::new(MemoryStore::new(), MemoryStore::new(), "sidebarState"),
            &config,
        );
        c.initialize(500.0);
        c.toggle();
        assert_eq!(c.panel().overlay, Some(false));
    }

    #[test]
    fn test_stored_values_round_trip() {
        for state in [SidebarVisibility::Open, SidebarVisibility::Closed] {
            assert_eq!(SidebarVisibility::from_stored(state.as_str()), Some(state));
        }
        assert_eq!(SidebarVisibility::from_stored(" closed "), Some(SidebarVisibility::Closed));
        assert_eq!(SidebarVisibility::from_stored("true"), None);
    }
}
