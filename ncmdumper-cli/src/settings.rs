//! User settings — persisted to `~/.config/ncmdumper/settings.json`.
//!
//! Mirrors the two preferences the dumper remembers between runs:
//!
//! ```json
//! { "output_path": "/home/me/Music", "search_full_disk": false }
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Persistent preferences backed by a JSON file on disk.
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Default output directory for dumped files. `None` means "next to the
    /// input file".
    pub output_path: Option<PathBuf>,
    /// Walk directories recursively when enumerating NCM files.
    #[serde(default)]
    pub search_full_disk: bool,
}

impl Settings {
    /// Load settings, returning defaults if the file does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read_to_string(&path)?;
        serde_json::from_str(&data).context("settings file is not valid JSON")
    }

    /// Save settings to disk, creating parent directories if needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(&path, data)?;
        Ok(())
    }

    fn path() -> Result<PathBuf> {
        let config = dirs::config_dir().context("cannot determine config directory")?;
        Ok(config.join("ncmdumper").join("settings.json"))
    }
}
