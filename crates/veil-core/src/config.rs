//! Browser configuration

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use veil_tabs::TabSettings;

use crate::error::CoreError;
use crate::Result;

pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Version that last wrote this file
    pub local_version: String,
    /// Start page for new tabs and the Home action
    pub homepage: String,
    /// Search engine URL template (%s replaced with query)
    pub search_engine: String,
    /// Mirror the log file on stdout
    pub stdout_log: bool,
    pub icon_theme: String,
    /// Closing the last tab removes it instead of returning it to the homepage
    pub close_after_last_tab: bool,
    /// Starting zoom percentage
    pub zoom_level: u32,
    /// Where history, favicons and logs are written
    pub data_dir: PathBuf,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            local_version: env!("CARGO_PKG_VERSION").to_string(),
            homepage: "https://google.com".to_string(),
            search_engine: "https://google.com/search?q=%s".to_string(),
            stdout_log: true,
            icon_theme: "automatic".to_string(),
            close_after_last_tab: false,
            zoom_level: 100,
            data_dir,
        }
    }

    /// Read a config file, filling missing fields with defaults.
    ///
    /// An absent file yields the defaults. The normalized config is written
    /// back so the file always lists every field.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let config: Self = match fs::read_to_string(path) {
            Ok(raw) if raw.trim().is_empty() => Self::default(),
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            Err(e) => return Err(e.into()),
        };

        config.validate()?;
        config.save(path)?;

        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.zoom_level == 0 {
            return Err(CoreError::Config("zoom_level must be positive".to_string()));
        }
        if self.homepage.trim().is_empty() {
            return Err(CoreError::Config("homepage must not be empty".to_string()));
        }
        if !self.search_engine.contains("%s") {
            return Err(CoreError::Config(format!(
                "search_engine has no %s placeholder: {}",
                self.search_engine
            )));
        }
        Ok(())
    }

    pub fn tab_settings(&self) -> TabSettings {
        TabSettings {
            homepage: self.homepage.clone(),
            close_after_last_tab: self.close_after_last_tab,
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }

    /// Platform data directory for the browser
    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Veil"))
            .unwrap_or_else(|| PathBuf::from(".veil"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

mod dirs {
    use std::path::PathBuf;

    pub fn data_local_dir() -> Option<PathBuf> {
        #[cfg(target_os = "windows")]
        {
            std::env::var("LOCALAPPDATA").ok().map(PathBuf::from)
        }
        #[cfg(target_os = "macos")]
        {
            std::env::var("HOME")
                .ok()
                .map(|h| PathBuf::from(h).join("Library/Application Support"))
        }
        #[cfg(target_os = "linux")]
        {
            std::env::var("XDG_DATA_HOME")
                .ok()
                .filter(|d| !d.is_empty())
                .map(PathBuf::from)
                .or_else(|| {
                    std::env::var("HOME")
                        .ok()
                        .map(|h| PathBuf::from(h).join(".local/share"))
                })
        }
        #[cfg(not(any(target_os = "windows", target_os = "macos", target_os = "linux")))]
        {
            None
        }
    }
}
