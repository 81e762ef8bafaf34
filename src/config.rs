// src/config.rs
use crate::error::{UiError, UiResult};
use serde::{Deserialize, Serialize};

/// Id of the inline `<script type="application/json">` element pages can use
/// to override the defaults below.
pub const CONFIG_ELEMENT_ID: &str = "admin-ui-config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub sidebar: SidebarConfig,
    pub media: MediaConfig,
    /// Milliseconds before flash alerts fade out. `0` disables it.
    pub alert_dismiss_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SidebarConfig {
    pub sidebar_selector: String,
    pub toggle_selectors: Vec<String>,
    pub content_selector: String,
    pub overlay_id: String,
    pub nav_link_selector: String,
    pub submenu_selector: String,
    /// Class set on the sidebar element while it is closed.
    pub closed_class: String,
    /// Companion class set on `<body>` while the sidebar is closed.
    pub body_closed_class: String,
    pub storage_key: String,
    pub mobile_breakpoint: f64,
    pub expanded_margin: String,
    pub collapsed_margin: String,
    pub overlay: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    pub internal_host: String,
    pub public_host: String,
    pub data_attributes: Vec<String>,
    pub field_markers: Vec<String>,
    pub preview_target_attribute: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            sidebar: SidebarConfig::default(),
            media: MediaConfig::default(),
            alert_dismiss_ms: 5000,
        }
    }
}

impl Default for SidebarConfig {
    fn default() -> Self {
        Self {
            sidebar_selector: String::from(".sidebar"),
            toggle_selectors: vec![
                String::from("#sidebarToggle"),
                String::from("#sidebarToggleTop"),
            ],
            content_selector: String::from("#content-wrapper"),
            overlay_id: String::from("sidebar-overlay"),
            nav_link_selector: String::from(".sidebar .nav-item .nav-link"),
            submenu_selector: String::from(".collapse.show"),
            closed_class: String::from("toggled"),
            body_closed_class: String::from("sidebar-toggled"),
            storage_key: String::from("sidebarState"),
            mobile_breakpoint: 768.0,
            expanded_margin: String::from("250px"),
            collapsed_margin: String::from("100px"),
            overlay: true,
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            internal_host: String::from("http://minio:9000"),
            public_host: String::from("http://localhost:9000"),
            data_attributes: vec![
                String::from("data-avatar-url"),
                String::from("data-image-url"),
            ],
            field_markers: vec![
                String::from("avatar"),
                String::from("image_url"),
                String::from("avatar_url"),
            ],
            preview_target_attribute: String::from("data-preview-target"),
        }
    }
}

impl UiConfig {
    pub fn from_json(raw: &str) -> UiResult<Self> {
        let config: UiConfig =
            serde_json::from_str(raw).map_err(|e| UiError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> UiResult<()> {
        if self.sidebar.storage_key.trim().is_empty() {
            return Err(UiError::Config("sidebar.storage_key is empty".to_string()));
        }
        if !(self.sidebar.mobile_breakpoint > 0.0) {
            return Err(UiError::Config(format!(
                "sidebar.mobile_breakpoint must be positive, got {}",
                self.sidebar.mobile_breakpoint
            )));
        }
        Ok(())
    }

    /// Reads the inline config element, falling back to defaults when it is
    /// missing or broken.
    pub fn load_from_document() -> Self {
        let Some(element) = gloo_utils::document().get_element_by_id(CONFIG_ELEMENT_ID) else {
            log::debug!("No #{} element, using default config", CONFIG_ELEMENT_ID);
            return Self::default();
        };
        let raw = element.text_content().unwrap_or_default();
        match Self::from_json(&raw) {
            Ok(config) => {
                log::info!("Loaded admin UI config from #{}", CONFIG_ELEMENT_ID);
                config
            }
            Err(e) => {
                log::warn!("Ignoring admin UI config: {}", e);
                Self::default()
            }
        }
    }
}
