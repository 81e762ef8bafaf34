// src/alerts.rs
use crate::utils::query_all;
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

const DISMISSIBLE_ALERTS: &str = ".alert:not(.alert-important)";
const FADE_MS: u32 = 1000;

/// Fades out flash alerts after `delay_ms`. The returned timer must be kept
/// alive; dropping it cancels the dismissal. `0` disables it.
pub fn schedule_alert_dismissal(delay_ms: u32) -> Option<Timeout> {
    if delay_ms == 0 {
        return None;
    }
    Some(Timeout::new(delay_ms, || {
        let alerts: Vec<HtmlElement> = query_all(DISMISSIBLE_ALERTS)
            .into_iter()
            .filter_map(|element| element.dyn_into::<HtmlElement>().ok())
            .collect();
        if alerts.is_empty() {
            return;
        }

        for alert in &alerts {
            let style = alert.style();
            let _ = style.set_property("transition", "opacity 1s");
            let _ = style.set_property("opacity", "0");
        }
        log::debug!("Dismissing {} alert(s)", alerts.len());

        Timeout::new(FADE_MS, move || {
            for alert in &alerts {
                let _ = alert.style().set_property("display", "none");
            }
        })
        .forget();
    }))
}
