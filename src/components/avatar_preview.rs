// src/components/avatar_preview.rs
use crate::error::{UiError, UiResult};
use crate::utils::query_all;
use gloo::file::callbacks::{read_as_data_url, FileReader};
use gloo::file::File;
use gloo_events::EventListener;
use gloo_utils::document;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlInputElement};
use yew::prelude::*;
use yew::AppHandle;

const FILE_INPUT_SELECTOR: &str = "input[type=\"file\"][accept*=\"image\"]";
const PREVIEW_CONTAINER_CLASS: &str = "mt-3 mb-3 avatar-preview-container";

#[derive(Properties, PartialEq)]
pub struct AvatarPreviewProps {
    /// The file input whose selection is previewed.
    pub input: HtmlInputElement,
}

/// Shows the image picked in a file input before anything is uploaded.
#[function_component(AvatarPreview)]
pub fn avatar_preview(props: &AvatarPreviewProps) -> Html {
    let data_url = use_state(|| None::<String>);
    // an in-flight read; dropping it aborts the read
    let pending = use_mut_ref(|| None::<FileReader>);

    {
        let data_url = data_url.clone();
        let pending = pending.clone();

        use_effect_with(props.input.clone(), move |input| {
            let target = input.clone();
            let listener = EventListener::new(input, "change", move |_| {
                match selected_file(&target) {
                    Some(file) => {
                        let data_url = data_url.clone();
                        let name = file.name();
                        let reader = read_as_data_url(&file, move |result| match result {
                            Ok(url) => data_url.set(Some(url)),
                            Err(e) => {
                                log::warn!("Could not read {} for preview: {:?}", name, e);
                                data_url.set(None);
                            }
                        });
                        *pending.borrow_mut() = Some(reader);
                    }
                    None => {
                        pending.borrow_mut().take();
                        data_url.set(None);
                    }
                }
            });

            // Cleanup closure
            || drop(listener)
        });
    }

    match &*data_url {
        Some(url) => html! {
            <div class="card" style="max-width: 200px;">
                <div class="card-header">{"Preview"}</div>
                <div class="card-body p-0">
                    <img src={url.clone()} class="img-fluid" alt="Avatar Preview" />
                </div>
            </div>
        },
        None => html! {},
    }
}

fn selected_file(input: &HtmlInputElement) -> Option<File> {
    input.files().and_then(|files| files.get(0)).map(File::from)
}

/// Mounts a preview next to every image file input on the page.
///
/// An input may name its preview region with `target_attribute`
/// (`data-preview-target="avatar-preview"`); otherwise a container is
/// inserted right after the input.
pub fn mount_previews(target_attribute: &str) -> Vec<AppHandle<AvatarPreview>> {
    query_all(FILE_INPUT_SELECTOR)
        .into_iter()
        .filter_map(|element| element.dyn_into::<HtmlInputElement>().ok())
        .filter_map(|input| match preview_root(&input, target_attribute) {
            Ok(root) => Some(
                yew::Renderer::<AvatarPreview>::with_root_and_props(
                    root,
                    AvatarPreviewProps { input },
                )
                .render(),
            ),
            Err(e) => {
                log::warn!("Image preview inactive: {}", e);
                None
            }
        })
        .collect()
}

fn preview_root(input: &HtmlInputElement, target_attribute: &str) -> UiResult<Element> {
    if let Some(id) = input.get_attribute(target_attribute) {
        match document().get_element_by_id(&id) {
            Some(target) => return Ok(target),
            None => log::warn!(
                "{}; falling back to an inline preview",
                UiError::ElementNotFound(format!("#{}", id))
            ),
        }
    }

    let parent = input
        .parent_node()
        .ok_or_else(|| UiError::ElementNotFound(format!("parent of {}", input.name())))?;
    let container = document().create_element("div")?;
    container.set_class_name(PREVIEW_CONTAINER_CLASS);
    parent.insert_before(&container, input.next_sibling().as_ref())?;
    Ok(container)
}
