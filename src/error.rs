// src/error.rs
use thiserror::Error;
use wasm_bindgen::JsValue;

/// Everything that can go wrong while wiring the admin UI to a page.
///
/// None of these are fatal: callers log them and leave the affected feature
/// inactive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UiError {
    #[error("element not found: {0}")]
    ElementNotFound(String),
    #[error("client storage unavailable: {0}")]
    StorageUnavailable(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("DOM call failed: {0}")]
    Dom(String),
}

impl From<JsValue> for UiError {
    fn from(value: JsValue) -> Self {
        UiError::Dom(format!("{:?}", value))
    }
}

pub type UiResult<T> = Result<T, UiError>;
