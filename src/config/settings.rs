//! Application settings and paths.
//!
//! Settings live in an optional JSON file in the XDG config directory
//! (`~/.config/portsweep/settings.json` on Linux). A missing file means
//! defaults; nothing is ever written or created.

use crate::cli::OutputFormat;
use crate::error::{SettingsError, SettingsResult};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Per-probe deadline used when the settings file does not override it.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_millis(1000);

/// Worker count used when `-w` is absent.
pub const DEFAULT_WORKERS: usize = 100;

/// Application directory paths following the XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/portsweep)
    pub config_dir: PathBuf,
}

impl Paths {
    /// Locate the platform directories, if the home directory is known.
    pub fn discover() -> Option<Self> {
        let project = ProjectDirs::from("com", "portsweep", "portsweep")?;
        Some(Self {
            config_dir: project.config_dir().to_path_buf(),
        })
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Worker count when `-w` is not given.
    pub default_workers: usize,
    /// Deadline for a single probe, in milliseconds.
    pub probe_timeout_ms: u64,
    /// Output format when `-o` is not given.
    pub default_output_format: OutputFormat,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_workers: DEFAULT_WORKERS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT.as_millis() as u64,
            default_output_format: OutputFormat::Plain,
        }
    }
}

impl AppSettings {
    /// Load settings from an explicit path, or from the default location.
    ///
    /// An explicit path must exist; the default one is optional.
    pub fn load(explicit: Option<&Path>) -> SettingsResult<Self> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => match Paths::discover().map(|p| p.settings_file()) {
                Some(file) if file.exists() => Self::load_from(&file),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> SettingsResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| SettingsError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self = serde_json::from_str(&content)
            .map_err(|e| SettingsError::InvalidFormat(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> SettingsResult<()> {
        if self.default_workers == 0 {
            return Err(SettingsError::InvalidFormat(
                "default_workers must be greater than 0".to_string(),
            ));
        }
        if self.probe_timeout_ms == 0 {
            return Err(SettingsError::InvalidFormat(
                "probe_timeout_ms must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// The per-probe deadline.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}
