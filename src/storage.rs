// src/storage.rs
use crate::error::{UiError, UiResult};
use crate::sidebar::SidebarVisibility;
use std::cell::RefCell;
use std::collections::HashMap;

/// Keys older versions of the admin scripts wrote, with how to read them.
const LEGACY_KEYS: [(&str, LegacyEncoding); 2] = [
    ("sidebar_state", LegacyEncoding::OpenClosed),
    ("sidebarToggled", LegacyEncoding::ToggledFlag),
];

#[derive(Debug, Clone, Copy)]
enum LegacyEncoding {
    OpenClosed,
    /// `"true"` meant the sidebar carried the closed class.
    ToggledFlag,
}

impl LegacyEncoding {
    fn decode(self, raw: &str) -> Option<SidebarVisibility> {
        match self {
            LegacyEncoding::OpenClosed => SidebarVisibility::from_stored(raw),
            LegacyEncoding::ToggledFlag => match raw.trim() {
                "true" => Some(SidebarVisibility::Closed),
                "false" => Some(SidebarVisibility::Open),
                _ => None,
            },
        }
    }
}

/// A string key-value store surviving at least the current page.
pub trait StateStore {
    fn get(&self, key: &str) -> UiResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> UiResult<()>;
    fn remove(&self, key: &str) -> UiResult<()>;
}

/// `localStorage` or `sessionStorage`.
pub struct BrowserStore {
    storage: web_sys::Storage,
    label: &'static str,
}

impl BrowserStore {
    pub fn local() -> UiResult<Self> {
        let storage = gloo_utils::window()
            .local_storage()
            .map_err(|e| UiError::StorageUnavailable(format!("localStorage: {:?}", e)))?
            .ok_or_else(|| UiError::StorageUnavailable("localStorage is disabled".to_string()))?;
        Ok(Self {
            storage,
            label: "localStorage",
        })
    }

    pub fn session() -> UiResult<Self> {
        let storage = gloo_utils::window()
            .session_storage()
            .map_err(|e| UiError::StorageUnavailable(format!("sessionStorage: {:?}", e)))?
            .ok_or_else(|| UiError::StorageUnavailable("sessionStorage is disabled".to_string()))?;
        Ok(Self {
            storage,
            label: "sessionStorage",
        })
    }
}

impl StateStore for BrowserStore {
    fn get(&self, key: &str) -> UiResult<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|e| UiError::StorageUnavailable(format!("{} read: {:?}", self.label, e)))
    }

    fn set(&self, key: &str, value: &str) -> UiResult<()> {
        self.storage
            .set_item(key, value)
            .map_err(|e| UiError::StorageUnavailable(format!("{} write: {:?}", self.label, e)))
    }

    fn remove(&self, key: &str) -> UiResult<()> {
        self.storage
            .remove_item(key)
            .map_err(|e| UiError::StorageUnavailable(format!("{} remove: {:?}", self.label, e)))
    }
}

/// In-page store, used when browser storage is unavailable and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> UiResult<Option<String>> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> UiResult<()> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> UiResult<()> {
        self.items.borrow_mut().remove(key);
        Ok(())
    }
}

/// Browser storage when the page may use it, memory otherwise.
pub enum ClientStore {
    Browser(BrowserStore),
    Memory(MemoryStore),
}

impl ClientStore {
    pub fn local_or_memory() -> Self {
        Self::or_memory(BrowserStore::local())
    }

    pub fn session_or_memory() -> Self {
        Self::or_memory(BrowserStore::session())
    }

    fn or_memory(store: UiResult<BrowserStore>) -> Self {
        match store {
            Ok(store) => ClientStore::Browser(store),
            Err(e) => {
                log::warn!("{}; sidebar state will only last for this page", e);
                ClientStore::Memory(MemoryStore::new())
            }
        }
    }
}

impl StateStore for ClientStore {
    fn get(&self, key: &str) -> UiResult<Option<String>> {
        match self {
            ClientStore::Browser(store) => store.get(key),
            ClientStore::Memory(store) => store.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> UiResult<()> {
        match self {
            ClientStore::Browser(store) => store.set(key, value),
            ClientStore::Memory(store) => store.set(key, value),
        }
    }

    fn remove(&self, key: &str) -> UiResult<()> {
        match self {
            ClientStore::Browser(store) => store.remove(key),
            ClientStore::Memory(store) => store.remove(key),
        }
    }
}

/// What the stores remember about the sidebar at page load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistedState {
    /// Last explicit choice; survives reloads and browser restarts.
    pub stored: Option<SidebarVisibility>,
    /// Last explicit choice made during the current browser session.
    pub session_choice: Option<SidebarVisibility>,
    /// State the page was last brought to in this session, by the user or
    /// by reconciliation.
    pub current: Option<SidebarVisibility>,
}

/// Reads and writes the sidebar state under one canonical key.
///
/// `localStorage[key]` holds the last explicit choice, `sessionStorage[key]`
/// the state currently shown and `sessionStorage[key + "Choice"]` the last
/// explicit choice of this session.
pub struct StatePersistence<S: StateStore> {
    local: S,
    session: S,
    key: String,
    choice_key: String,
}

impl<S: StateStore> StatePersistence<S> {
    pub fn new(local: S, session: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let choice_key = format!("{}Choice", key);
        Self {
            local,
            session,
            key,
            choice_key,
        }
    }

    /// Moves a value found under a legacy key to the canonical key, unless
    /// the canonical key is already set, then deletes every legacy key.
    pub fn migrate_legacy(&self) -> UiResult<Option<SidebarVisibility>> {
        let mut migrated = None;
        if self.local.get(&self.key)?.is_none() {
            for (legacy_key, encoding) in LEGACY_KEYS {
                let decoded = self
                    .local
                    .get(legacy_key)?
                    .and_then(|raw| encoding.decode(&raw));
                if let Some(state) = decoded {
                    self.local.set(&self.key, state.as_str())?;
                    log::info!("Migrated sidebar state from '{}' to '{}'", legacy_key, self.key);
                    migrated = Some(state);
                    break;
                }
            }
        }
        for (legacy_key, _) in LEGACY_KEYS {
            self.local.remove(legacy_key)?;
        }
        Ok(migrated)
    }

    pub fn load(&self) -> PersistedState {
        PersistedState {
            stored: read_state(&self.local, &self.key),
            session_choice: read_state(&self.session, &self.choice_key),
            current: read_state(&self.session, &self.key),
        }
    }

    /// Records an explicit user choice everywhere.
    pub fn save(&self, state: SidebarVisibility) {
        write_state(&self.local, &self.key, state);
        write_state(&self.session, &self.choice_key, state);
        write_state(&self.session, &self.key, state);
    }

    /// Records the state reconciliation settled on without touching the
    /// user's choices.
    pub fn save_current(&self, state: SidebarVisibility) {
        write_state(&self.session, &self.key, state);
    }
}

fn write_state<S: StateStore>(store: &S, key: &str, state: SidebarVisibility) {
    if let Err(e) = store.set(key, state.as_str()) {
        log::warn!("Could not persist sidebar state: {}", e);
    }
}

fn read_state<S: StateStore>(store: &S, key: &str) -> Option<SidebarVisibility> {
    match store.get(key) {
        Ok(Some(raw)) => {
            let state = SidebarVisibility::from_stored(&raw);
            if state.is_none() {
                log::warn!("Ignoring unknown sidebar state '{}' under '{}'", raw, key);
            }
            state
        }
        Ok(None) => None,
        Err(e) => {
            log::warn!("{}", e);
            None
        }
    }
}
