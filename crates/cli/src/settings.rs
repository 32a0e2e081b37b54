//! CLI settings
//!
//! Read from a TOML file. Every section and key is optional:
//!
//! ```toml
//! [picker]
//! mode = "on_demand"
//! max_depth = 6
//!
//! [output]
//! pretty = false
//!
//! [log]
//! level = "debug"
//! ```

use clap::ValueEnum;
use layoutsmith_core::{BuilderError, BuilderResult};
use layoutsmith_relations::picker::DEFAULT_MAX_DEPTH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings file looked up in the working directory
pub const DEFAULT_SETTINGS_FILE: &str = "layoutsmith.toml";

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

// ============================================================================
// Sections
// ============================================================================

/// How the relation picker lays out its menus
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum PickerMode {
    /// Every menu laid out up front
    #[default]
    Eager,
    /// Menus mounted as they are opened
    OnDemand,
}

impl PickerMode {
    pub fn display_name(&self) -> &'static str {
        match self {
            PickerMode::Eager => "eager",
            PickerMode::OnDemand => "on demand",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerSettings {
    pub mode: PickerMode,

    /// Deepest menu level the eager picker lays out
    pub max_depth: usize,
}

impl Default for PickerSettings {
    fn default() -> Self {
        Self {
            mode: PickerMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    /// Pretty-print JSON output
    pub pretty: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self { pretty: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Filter used when `RUST_LOG` is unset
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub picker: PickerSettings,
    pub output: OutputSettings,
    pub log: LogSettings,
}

impl Settings {
    /// Parse settings from TOML
    pub fn from_toml_str(s: &str) -> BuilderResult<Self> {
        let settings: Self = toml::from_str(s)
            .map_err(|e| BuilderError::InvalidConfig(format!("malformed settings: {}", e)))?;
        settings.check()?;
        Ok(settings)
    }

    /// Load settings from a file
    ///
    /// A missing file yields the defaults.
    pub fn load(path: impl AsRef<Path>) -> BuilderResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| BuilderError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Load from `path`, or from the default file when none is given
    pub fn load_or_default(path: Option<&Path>) -> BuilderResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::load(PathBuf::from(DEFAULT_SETTINGS_FILE)),
        }
    }

    /// Serialize settings to TOML
    pub fn to_toml_string(&self) -> BuilderResult<String> {
        toml::to_string_pretty(self).map_err(|e| BuilderError::internal(e.to_string()))
    }

    fn check(&self) -> BuilderResult<()> {
        let level = self.log.level.to_ascii_lowercase();
        if !LOG_LEVELS.contains(&level.as_str()) {
            return Err(BuilderError::InvalidConfig(format!(
                "unknown log level '{}', expected one of {}",
                self.log.level,
                LOG_LEVELS.join(", ")
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.picker.mode, PickerMode::Eager);
        assert_eq!(settings.picker.max_depth, 10);
        assert!(settings.output.pretty);
        assert_eq!(settings.log.level, "info");
    }

    #[test]
    fn test_partial_file() {
        let settings = Settings::from_toml_str("[picker]\nmode = \"on_demand\"\n").unwrap();
        assert_eq!(settings.picker.mode, PickerMode::OnDemand);
        assert_eq!(settings.picker.max_depth, 10);
        assert_eq!(settings.log, LogSettings::default());
    }

    #[test]
    fn test_malformed_is_invalid_config() {
        for bad in ["[picker\nmode=", "[picker]\nmode = \"lazy\"", "[log]\nlevel = \"loud\"", "[extra]\n"] {
            let err = Settings::from_toml_str(bad).unwrap_err();
            assert!(matches!(err, BuilderError::InvalidConfig(_)), "{}: {:?}", bad, err);
        }
    }

    #[test]
    fn test_load_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let settings = Settings::load(temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("layoutsmith.toml");
        let mut settings = Settings::default();
        settings.picker.max_depth = 3;
        settings.output.pretty = false;
        std::fs::write(&path, settings.to_toml_string().unwrap()).unwrap();

        assert_eq!(Settings::load_or_default(Some(&path)).unwrap(), settings);
    }
}
