//! Editor configuration and the default values it falls back to.
//!
//! Values come from, lowest precedence first: the constants below, an
//! optional TOML file, then the environment. Callers layer explicit overrides
//! (e.g. command line flags) on top by mutating the loaded value.

use std::path::Path;

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8000";

/// Environment variable overriding the backend base URL.
pub const BACKEND_URL_ENV: &str = "ATOMO_BACKEND_URL";

/// New stops are named `"{prefix} {n}"`, n being their 1-based position.
pub const DEFAULT_STOP_NAME_PREFIX: &str = "Stop";
pub const DEFAULT_TRAVEL_MINUTES: u32 = 3;

pub const OCR_LINE_NAME: &str = "OCR Line";
pub const OCR_LINE_DESCRIPTION: &str = "Imported from image";

pub const DEFAULT_SCHEDULE_TEXT: &str = "07:30,08:00,08:30";

/// Stop position ETA queries are anchored at.
pub const ETA_FROM_STOP_INDEX: usize = 0;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub backend_url: String,
    pub new_stop: NewStopDefaults,
    pub ocr_line: OcrLineDefaults,
    /// Initial content of the schedule text buffer.
    pub schedule_text: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NewStopDefaults {
    pub name_prefix: String,
    pub travel_minutes: u32,
}

/// Name and description given to lines created from an image import when no
/// line is selected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrLineDefaults {
    pub name: String,
    pub description: String,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.into(),
            new_stop: NewStopDefaults::default(),
            ocr_line: OcrLineDefaults::default(),
            schedule_text: DEFAULT_SCHEDULE_TEXT.into(),
        }
    }
}

impl Default for NewStopDefaults {
    fn default() -> Self {
        Self {
            name_prefix: DEFAULT_STOP_NAME_PREFIX.into(),
            travel_minutes: DEFAULT_TRAVEL_MINUTES,
        }
    }
}

impl Default for OcrLineDefaults {
    fn default() -> Self {
        Self {
            name: OCR_LINE_NAME.into(),
            description: OCR_LINE_DESCRIPTION.into(),
        }
    }
}

impl NewStopDefaults {
    /// Name for a stop appended to a line that currently has `existing` stops.
    pub fn name_for(&self, existing: usize) -> String {
        format!("{} {}", self.name_prefix, existing + 1)
    }
}

impl EditorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| EditorError::Config(e.to_string()))
    }

    /// Load from a TOML file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;

        let mut config = Self::from_toml_str(&text)
            .map_err(|e| EditorError::Config(format!("{}: {e}", path.display())))?;
        config.apply_env();
        Ok(config)
    }

    /// Defaults with environment overrides applied.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    pub fn apply_env_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BACKEND_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.backend_url = url.trim().to_string();
        }
    }

    /// The backend base URL, validated as an absolute http(s) URL.
    pub fn backend_url(&self) -> Result<Url> {
        let url = Url::parse(&self.backend_url)
            .map_err(|e| EditorError::Config(format!("backend_url {:?}: {e}", self.backend_url)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(EditorError::Config(format!(
                "backend_url {:?}: unsupported scheme {other:?}",
                self.backend_url
            ))),
        }
    }
}
