// src/media_url.rs
use crate::config::MediaConfig;
use crate::error::{UiError, UiResult};
use crate::utils::{attribute_selector, query_all};
use gloo_events::{EventListener, EventListenerOptions};
use gloo_utils::document;
use std::borrow::Cow;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlFormElement, HtmlInputElement, HtmlTextAreaElement};

const FIELD_SELECTOR: &str = "input[name], textarea[name]";

/// Swaps the object store's in-cluster address for one a browser can reach.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaUrlRewriter {
    internal_host: String,
    public_host: String,
    data_attributes: Vec<String>,
    field_markers: Vec<String>,
}

impl MediaUrlRewriter {
    pub fn new(config: &MediaConfig) -> UiResult<Self> {
        if config.internal_host.is_empty() {
            return Err(UiError::Config("media.internal_host is empty".to_string()));
        }
        if config.public_host.is_empty() {
            return Err(UiError::Config("media.public_host is empty".to_string()));
        }
        // otherwise a second pass would rewrite the first pass's output
        if tokens_can_overlap(&config.internal_host, &config.public_host) {
            return Err(UiError::Config(format!(
                "media.public_host '{}' can form media.internal_host '{}' once substituted",
                config.public_host, config.internal_host
            )));
        }
        Ok(Self {
            internal_host: config.internal_host.clone(),
            public_host: config.public_host.clone(),
            data_attributes: config.data_attributes.clone(),
            field_markers: config.field_markers.clone(),
        })
    }

    pub fn rewrite<'a>(&self, url: &'a str) -> Cow<'a, str> {
        if url.contains(&self.internal_host) {
            Cow::Owned(url.replace(&self.internal_host, &self.public_host))
        } else {
            Cow::Borrowed(url)
        }
    }

    pub fn is_media_field(&self, name: &str) -> bool {
        self.field_markers
            .iter()
            .any(|marker| !marker.is_empty() && name.contains(marker.as_str()))
    }

    /// The value a form field should carry instead, if it needs changing.
    pub fn sanitized_field_value(&self, name: &str, value: &str) -> Option<String> {
        if !self.is_media_field(name) {
            return None;
        }
        match self.rewrite(value) {
            Cow::Owned(rewritten) => Some(rewritten),
            Cow::Borrowed(_) => None,
        }
    }

    /// Rewrites image sources, media data attributes and media form fields
    /// already on the page. Returns how many values changed.
    pub fn apply_to_document(&self) -> usize {
        let mut changed = 0;
        for image in query_all("img[src]") {
            changed += self.rewrite_attribute(&image, "src") as usize;
        }
        if !self.data_attributes.is_empty() {
            for element in query_all(&attribute_selector(&self.data_attributes)) {
                for attribute in &self.data_attributes {
                    changed += self.rewrite_attribute(&element, attribute) as usize;
                }
            }
        }
        changed += self.sanitize_fields(
            query_all(FIELD_SELECTOR)
                .into_iter()
                .filter_map(DomField::from_element),
        );
        log::info!("Rewrote {} media URL(s)", changed);
        changed
    }

    fn rewrite_attribute(&self, element: &Element, attribute: &str) -> bool {
        let Some(value) = element.get_attribute(attribute) else {
            return false;
        };
        match self.rewrite(&value) {
            Cow::Owned(rewritten) => match element.set_attribute(attribute, &rewritten) {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("Failed to rewrite {}: {:?}", attribute, e);
                    false
                }
            },
            Cow::Borrowed(_) => false,
        }
    }

    /// Rewrites the media fields submitted with `form`, including controls
    /// placed outside it that point at it with `form="..."`.
    pub fn sanitize_form(&self, form: &HtmlFormElement) -> usize {
        let elements = form.elements();
        self.sanitize_fields(
            (0..elements.length())
                .filter_map(|index| elements.item(index))
                .filter_map(DomField::from_element),
        )
    }

    pub fn sanitize_fields<F: FormField>(&self, fields: impl IntoIterator<Item = F>) -> usize {
        let mut changed = 0;
        for field in fields {
            let name = field.field_name();
            if let Some(value) = self.sanitized_field_value(&name, &field.field_value()) {
                field.set_field_value(&value);
                changed += 1;
            }
        }
        changed
    }

    /// Rewrites media fields of every form right before it is submitted.
    ///
    /// One capture-phase listener on the document sees the `submit` of any
    /// form, including ones added after load, before the form's own handlers
    /// and before the browser serializes it. Submission is never cancelled.
    pub fn bind_form_sanitization(self: &Rc<Self>) -> EventListener {
        let rewriter = Rc::clone(self);
        EventListener::new_with_options(
            &document(),
            "submit",
            EventListenerOptions::run_in_capture_phase(),
            move |event| {
                let form = event
                    .target()
                    .and_then(|target| target.dyn_into::<HtmlFormElement>().ok());
                if let Some(form) = form {
                    let changed = rewriter.sanitize_form(&form);
                    if changed > 0 {
                        log::debug!("Rewrote {} media field(s) before submit", changed);
                    }
                }
            },
        )
    }
}

/// Whether substituting `public` for `internal` can produce a fresh
/// `internal`, either inside `public` or across its edges.
fn tokens_can_overlap(internal: &str, public: &str) -> bool {
    if public.contains(internal) || internal.contains(public) {
        return true;
    }
    (1..internal.len().min(public.len())).any(|len| {
        let head = internal.is_char_boundary(len) && public.ends_with(&internal[..len]);
        let split = internal.len() - len;
        let tail = internal.is_char_boundary(split) && public.starts_with(&internal[split..]);
        head || tail
    })
}

/// A named form control whose value can be read and replaced.
pub trait FormField {
    fn field_name(&self) -> String;
    fn field_value(&self) -> String;
    fn set_field_value(&self, value: &str);
}

/// The text-carrying controls a media URL can be submitted through. File
/// inputs are left out.
enum DomField {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
}

impl DomField {
    fn from_element(element: Element) -> Option<Self> {
        match element.dyn_into::<HtmlInputElement>() {
            Ok(input) if input.type_() == "file" => None,
            Ok(input) => Some(Self::Input(input)),
            Err(element) => element
                .dyn_into::<HtmlTextAreaElement>()
                .ok()
                .map(Self::TextArea),
        }
    }
}

impl FormField for DomField {
    fn field_name(&self) -> String {
        match self {
            Self::Input(input) => input.name(),
            Self::TextArea(textarea) => textarea.name(),
        }
    }

    fn field_value(&self) -> String {
        match self {
            Self::Input(input) => input.value(),
            Self::TextArea(textarea) => textarea.value(),
        }
    }

    fn set_field_value(&self, value: &str) {
        match self {
            Self::Input(input) => input.set_value(value),
            Self::TextArea(textarea) => textarea.set_value(value),
        }
    }
}
