//! On-disk configuration manifest loading.
//!
//! The manifest is a JSONC file (comments stripped with `json_comments`
//! before parsing) carrying a top-level `service`-scoped configuration
//! object and a `rules` array, per the configuration manifest format.
//! This module only knows how to find and parse that file; it has no
//! knowledge of the engine's running `ConfigurationStore` — callers feed
//! the parsed [`Manifest`] into a store (or, for a running engine, into an
//! [`crate::engine::ConfigUpdate::Add`]) themselves.

pub mod template;
pub mod watcher;

use std::fs;
use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::engine::config::{ConfigurationObject, Rule};

/// Configuration file names to search for, in priority order within each
/// directory (`.jsonc` before `.json`).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Legacy dotfile names checked directly under the home directory.
const LEGACY_CONFIG_FILE_NAMES: &[&str] = &[".snaptile.jsonc", ".snaptile.json"];

/// The on-disk manifest shape: a service-wide default plus scoped overrides.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Manifest {
    pub service: ConfigurationObject,
    pub rules: Vec<Rule>,
}

/// Errors that can occur while locating or parsing a manifest file.
#[derive(Debug)]
pub enum ConfigError {
    /// No manifest file was found in any of the expected locations.
    NotFound,
    /// The manifest file exists but could not be read.
    Io(std::io::Error),
    /// The manifest file contains invalid JSON(C).
    Parse(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound => write!(
                f,
                "no configuration file found. Expected at $XDG_CONFIG_HOME/snaptile/config.jsonc, \
                ~/.config/snaptile/config.jsonc, or ~/.snaptile.jsonc"
            ),
            Self::Io(err) => write!(f, "failed to read configuration file: {err}"),
            Self::Parse(err) => write!(f, "failed to parse configuration file: {err}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::NotFound => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self { Self::Io(err) }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self { Self::Parse(err) }
}

/// Returns the possible manifest paths in priority order.
///
/// Checked locations (`.jsonc` then `.json` at each):
/// 1. `$XDG_CONFIG_HOME/snaptile/` if that variable is set.
/// 2. `~/.config/snaptile/`.
/// 3. The platform config directory's `snaptile/` (distinct from `~/.config`
///    on macOS and Windows).
/// 4. `~/.snaptile.jsonc` / `~/.snaptile.json` (legacy/simple location).
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        let dir = PathBuf::from(xdg_config).join("snaptile");
        for filename in CONFIG_FILE_NAMES {
            paths.push(dir.join(filename));
        }
    }

    if let Some(home) = dirs::home_dir() {
        let dir = home.join(".config").join("snaptile");
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let dir = config_dir.join("snaptile");
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    }

    if let Some(home) = dirs::home_dir() {
        for filename in LEGACY_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Parses a manifest file at an explicit path, stripping JSONC comments
/// first.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the file cannot be read, or
/// [`ConfigError::Parse`] if its contents are not a valid manifest.
pub fn load_manifest_from_path(path: &std::path::Path) -> Result<Manifest, ConfigError> {
    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Loads the manifest from the first existing path returned by
/// [`config_paths`].
///
/// # Errors
///
/// Returns [`ConfigError::NotFound`] if no manifest file exists at any
/// candidate path, or a read/parse error for the first one that does.
pub fn load_manifest() -> Result<(Manifest, PathBuf), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            let manifest = load_manifest_from_path(&path)?;
            return Ok((manifest, path));
        }
    }
    Err(ConfigError::NotFound)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;
    use crate::engine::config::RuleLevel;

    #[test]
    fn config_paths_are_not_empty() {
        let paths = config_paths();
        assert!(!paths.is_empty() || std::env::var("HOME").is_err());
    }

    #[test]
    fn loads_a_minimal_manifest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.jsonc");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{
            // master switch
            "service": {{ "enabled": true }},
            "rules": []
        }}"#
        )
        .unwrap();

        let manifest = load_manifest_from_path(&path).unwrap();
        assert_eq!(manifest.service.enabled, Some(true));
        assert!(manifest.rules.is_empty());
    }

    #[test]
    fn loads_a_manifest_with_rules() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.jsonc");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{
                "service": {{}},
                "rules": [
                    {{ "level": "window", "uuid": "app", "name": "w", "config": {{ "enabled": false }} }}
                ]
            }}"#
        )
        .unwrap();

        let manifest = load_manifest_from_path(&path).unwrap();
        assert_eq!(manifest.rules.len(), 1);
        assert_eq!(manifest.rules[0].level, RuleLevel::Window);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_manifest_from_path(std::path::Path::new("/nonexistent/config.jsonc"));
        assert!(matches!(err, Err(ConfigError::Io(_))));
    }
}
