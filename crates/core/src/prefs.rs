//! Local persisted user preferences.
//!
//! A flat key-value file loaded once at startup and written on every change.
//! Missing or corrupt data silently falls back to defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub auto_connect: bool,
    pub font_size: u16,
    pub theme: Theme,
    pub selected_mic_id: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            auto_connect: false,
            font_size: 16,
            theme: Theme::Dark,
            selected_mic_id: None,
        }
    }
}

impl Preferences {
    /// Loads preferences from `path`, falling back to defaults when the file
    /// is missing or does not parse.
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(path = %path.display(), error = %e, "Ignoring corrupt preferences file");
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Writes the current preferences to `path`.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let serialized = serde_json::to_string_pretty(self)?;
        std::fs::write(path, serialized)?;
        Ok(())
    }
}
