use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

static ASSET_STORE: OnceLock<Mutex<HashMap<String, Vec<u8>>>> = OnceLock::new();
static NEXT_ASSET_ID: AtomicUsize = AtomicUsize::new(1);

const BLOB_PREFIX: &str = "mem://";

fn store() -> &'static Mutex<HashMap<String, Vec<u8>>> {
    ASSET_STORE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Keeps picked file bytes in memory and returns a transient `mem://` key.
pub fn store_bytes(name: &str, data: Vec<u8>) -> String {
    let id = NEXT_ASSET_ID.fetch_add(1, Ordering::Relaxed);
    let key = if name.trim().is_empty() {
        format!("{BLOB_PREFIX}{id}")
    } else {
        format!("{BLOB_PREFIX}{id}::{name}")
    };
    if let Ok(mut store) = store().lock() {
        store.insert(key.clone(), data);
    }
    key
}

pub fn load_bytes(key: &str) -> Option<Vec<u8>> {
    if !is_blob_key(key) {
        return None;
    }
    store().lock().ok()?.get(key).cloned()
}

/// Drops the bytes behind a transient key. Returns whether anything was held.
pub fn release_bytes(key: &str) -> bool {
    store()
        .lock()
        .map(|mut store| store.remove(key).is_some())
        .unwrap_or(false)
}

pub fn is_blob_key(key: &str) -> bool {
    key.starts_with(BLOB_PREFIX)
}

pub fn is_url(path: &str) -> bool {
    let lower = path.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelSource {
    Url(String),
    Blob(String),
    Path(PathBuf),
}

impl ModelSource {
    /// Classifies a location string the way the viewer receives it from the
    /// settings file or the UI.
    pub fn parse(location: &str) -> Self {
        if is_blob_key(location) {
            ModelSource::Blob(location.to_string())
        } else if is_url(location) || cfg!(target_arch = "wasm32") {
            ModelSource::Url(location.to_string())
        } else {
            ModelSource::Path(PathBuf::from(location))
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, ModelSource::Blob(_))
    }

    pub fn describe(&self) -> String {
        match self {
            ModelSource::Url(url) => url.clone(),
            ModelSource::Blob(key) => key.clone(),
            ModelSource::Path(path) => path.display().to_string(),
        }
    }

    /// File name shown in the stats panel.
    pub fn display_name(&self) -> String {
        let location = match self {
            ModelSource::Blob(key) => key
                .split_once("::")
                .map(|(_, name)| name.to_string())
                .unwrap_or_default(),
            other => other.describe(),
        };
        location
            .rsplit(['/', '\\'])
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or("Unknown Model")
            .to_string()
    }
}
