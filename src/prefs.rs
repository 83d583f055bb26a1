//! Visitor preferences that survive between sessions.
//!
//! Two keys are persisted: the theme (`site.theme`) and the locale choice
//! (`site.locale`). The store is loaded once at startup and written through
//! on every change; nothing else reads preferences ad hoc.
//!
//! [`FilePreferences`] keeps them in a small JSON object on disk;
//! [`MemoryPreferences`] is the same contract without persistence.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const THEME_KEY: &str = "site.theme";
pub const LOCALE_KEY: &str = "site.locale";

#[derive(Error, Debug)]
pub enum PrefsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub trait PreferenceStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Stored theme, or light when absent or unreadable.
    pub fn load(store: &impl PreferenceStore) -> Self {
        store
            .get(THEME_KEY)
            .and_then(|raw| Theme::parse(&raw))
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// JSON-file backed store. Every `set` rewrites the file.
#[derive(Debug, Clone)]
pub struct FilePreferences {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FilePreferences {
    /// Load the store from `path`. A missing or corrupt file starts empty.
    pub fn load(path: &Path) -> Self {
        let values = fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default();
        Self {
            path: path.to_path_buf(),
            values,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<(), PrefsError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

impl PreferenceStore for FilePreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }
}
