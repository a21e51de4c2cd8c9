//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/hyprcycle/config.json`.
//! Its main section is `"bindings"`: named cycles that a
//! [`Trigger`](crate::command::Command::Trigger) command can refer to, so key
//! bindings only need to send a short name.
//!
//! # Example
//!
//! ```json
//! {
//!   "bindings": {
//!     "halves": {
//!       "target": "active",
//!       "spec": "2x1 0:0, 1:0, 1x1 0:0",
//!       "stages": [{"WhenModifier": {"modifier": "shift", "stage": "Reverse"}}]
//!     },
//!     "wide": {
//!       "target": "active",
//!       "spec": "4x1 1:0 2:0, 3x1 0:0 1:0, 1:0 2:0",
//!       "stages": ["MinimumWidth"]
//!     }
//!   }
//! }
//! ```

use crate::grammar::{self, GrammarError};
use crate::pipeline::Stage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level configuration.
///
/// Every field is optional: a minimal `{}` file is valid and all sections
/// fall back to their compiled-in defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Path of the command socket.  Defaults to
    /// `$XDG_RUNTIME_DIR/hyprcycle.sock`.
    #[serde(default)]
    pub socket_path: Option<PathBuf>,

    /// Named cycles, keyed by binding name.
    #[serde(default)]
    pub bindings: BTreeMap<String, Binding>,
}

/// A named cycle: which window, which positions, which pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binding {
    /// Window selector; defaults to the active window.
    #[serde(default = "default_target")]
    pub target: String,
    /// Grid spec.
    pub spec: String,
    #[serde(default)]
    pub stages: Vec<Stage>,
}

fn default_target() -> String {
    "active".into()
}

impl Config {
    /// Load configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError(format!("failed to read {}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&contents)
            .map_err(|e| ConfigError(format!("failed to parse {}: {}", path.display(), e)))?;
        Ok(config)
    }

    /// Parse every binding's grid spec and return the ones that fail.
    ///
    /// Invalid bindings are kept; triggering them reports the same error.
    pub fn validate(&self) -> Vec<(String, GrammarError)> {
        self.bindings
            .iter()
            .filter_map(|(name, b)| grammar::parse(&b.spec).err().map(|e| (name.clone(), e)))
            .collect()
    }
}

/// Error from loading or parsing a configuration file.
#[derive(Debug, thiserror::Error)]
#[error("config error: {0}")]
pub struct ConfigError(String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_full_config() {
        let json = r#"{
            "socket_path": "/tmp/hc.sock",
            "bindings": {
                "halves": {
                    "target": "class:kitty",
                    "spec": "2x1 0:0, 1:0",
                    "stages": ["Reverse", "MinimumWidth"]
                }
            }
        }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.socket_path, Some(PathBuf::from("/tmp/hc.sock")));
        let halves = &cfg.bindings["halves"];
        assert_eq!(halves.target, "class:kitty");
        assert_eq!(halves.spec, "2x1 0:0, 1:0");
        assert_eq!(halves.stages, vec![Stage::Reverse, Stage::MinimumWidth]);
    }

    #[test]
    fn deserialize_empty_uses_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, Config::default());
        assert!(cfg.bindings.is_empty());
        assert!(cfg.socket_path.is_none());
    }

    #[test]
    fn binding_target_defaults_to_active() {
        let json = r#"{ "bindings": { "full": { "spec": "1x1 0:0" } } }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.bindings["full"].target, "active");
        assert!(cfg.bindings["full"].stages.is_empty());
    }

    #[test]
    fn binding_without_spec_fails() {
        let json = r#"{ "bindings": { "broken": { "target": "active" } } }"#;
        assert!(serde_json::from_str::<Config>(json).is_err());
    }

    #[test]
    fn unknown_top_level_keys_ignored() {
        let json = r#"{ "bindings": {}, "future_section": { "key": 42 } }"#;
        // Unknown keys are silently ignored.
        let _cfg: Config = serde_json::from_str(json).unwrap();
    }

    #[test]
    fn validate_reports_bad_specs() {
        let json = r#"{ "bindings": {
            "ok": { "spec": "2x1 0:0, 1:0" },
            "bad": { "spec": "2x2 2:0" }
        } }"#;
        let cfg: Config = serde_json::from_str(json).unwrap();
        let errors = cfg.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].0, "bad");
        assert!(matches!(errors[0].1, GrammarError::OutsideGrid { .. }));
    }

    #[test]
    fn load_missing_file_is_an_error() {
        let path = std::env::temp_dir().join("hyprcycle-definitely-missing.json");
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
