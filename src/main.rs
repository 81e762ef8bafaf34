// src/main.rs
mod alerts;
mod bindings;
mod components;
mod config;
mod dom_panel;
mod error;
mod media_url;
mod sidebar;
mod storage;
mod utils;

use alerts::schedule_alert_dismissal;
use bindings::SidebarBindings;
use components::avatar_preview::{mount_previews, AvatarPreview};
use config::UiConfig;
use gloo::timers::callback::Timeout;
use gloo_events::EventListener;
use media_url::MediaUrlRewriter;
use std::cell::RefCell;
use std::rc::Rc;
use yew::AppHandle;

/// Everything the admin pages need kept alive until they unload. Each part
/// is optional: a page without a sidebar still gets its URLs fixed.
#[allow(dead_code)] // fields are held for their Drop
struct AdminUi {
    sidebar: Option<SidebarBindings>,
    form_sanitizer: Option<EventListener>,
    previews: Vec<AppHandle<AvatarPreview>>,
    alert_timer: Option<Timeout>,
}

thread_local! {
    static ADMIN_UI: RefCell<Option<AdminUi>> = RefCell::new(None);
}

impl AdminUi {
    fn start(config: &UiConfig) -> Self {
        let sidebar = match SidebarBindings::install(&config.sidebar) {
            Ok(bindings) => Some(bindings),
            Err(e) => {
                log::warn!("Sidebar inactive: {}", e);
                None
            }
        };

        let form_sanitizer = match MediaUrlRewriter::new(&config.media) {
            Ok(rewriter) => {
                let rewriter = Rc::new(rewriter);
                rewriter.apply_to_document();
                Some(rewriter.bind_form_sanitization())
            }
            Err(e) => {
                log::warn!("Media URL rewriting inactive: {}", e);
                None
            }
        };

        let previews = mount_previews(&config.media.preview_target_attribute);
        let alert_timer = schedule_alert_dismissal(config.alert_dismiss_ms);

        log::info!(
            "Admin panel UI initialized (sidebar: {}, form sanitizer: {}, previews: {})",
            sidebar.is_some(),
            form_sanitizer.is_some(),
            previews.len()
        );

        Self {
            sidebar,
            form_sanitizer,
            previews,
            alert_timer,
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    utils::on_dom_ready(|| {
        let config = UiConfig::load_from_document();
        let ui = AdminUi::start(&config);
        ADMIN_UI.with(|slot| *slot.borrow_mut() = Some(ui));
    });
}
