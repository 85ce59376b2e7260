//! YAML configuration for the transport aggregator.
//!
//! # Storage layout
//!
//! ```text
//! ~/.datasync/
//!   aggregator.yaml
//! ```
//!
//! # API pattern
//!
//! Every function has two forms:
//! - `fn_at(home: &Path, …)`: explicit home; used in tests with `TempDir`
//! - `fn(…)`: derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! `MICROSERVICE_LABEL` overrides the label stored in the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, ConfigError};
use crate::label::{ServiceLabel, MICROSERVICE_LABEL_ENV};

/// What a failed watch fan-out does with the registrations it already
/// obtained from earlier transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WatchFailurePolicy {
    /// Close them before returning the error.
    #[default]
    CloseObtained,
    /// Drop them without closing; the transports keep the subscriptions.
    Discard,
}

/// Aggregator configuration, passed explicitly to whoever assembles the
/// transport set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AggregatorConfig {
    #[serde(default)]
    pub service_label: ServiceLabel,
    #[serde(default)]
    pub watch_failure: WatchFailurePolicy,
}

impl AggregatorConfig {
    /// Replace the label when `label` is a non-empty override.
    pub fn with_label_override(mut self, label: Option<String>) -> Self {
        if let Some(label) = label.filter(|l| !l.is_empty()) {
            self.service_label = ServiceLabel::new(label);
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.datasync/aggregator.yaml`. Pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    home.join(".datasync").join("aggregator.yaml")
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load the config file under `home`.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` with the
/// path if the YAML is malformed.
pub fn load_at(home: &Path) -> Result<AggregatorConfig, ConfigError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Err(ConfigError::NotFound { path });
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    serde_yaml::from_str(&contents).map_err(|e| ConfigError::Parse { path, source: e })
}

/// Load the config file if present, falling back to defaults, then apply
/// the `MICROSERVICE_LABEL` override.
pub fn load_or_default_at(home: &Path) -> Result<AggregatorConfig, ConfigError> {
    let config = match load_at(home) {
        Ok(config) => config,
        Err(ConfigError::NotFound { .. }) => AggregatorConfig::default(),
        Err(e) => return Err(e),
    };
    Ok(config.with_label_override(std::env::var(MICROSERVICE_LABEL_ENV).ok()))
}

/// `load_or_default_at` convenience wrapper.
pub fn load_or_default() -> Result<AggregatorConfig, ConfigError> {
    load_or_default_at(&home()?)
}

// ---------------------------------------------------------------------------
// Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save `config` to `<home>/.datasync/aggregator.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `rename`.
pub fn save_at(home: &Path, config: &AggregatorConfig) -> Result<(), ConfigError> {
    let path = config_path_at(home);
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    }
    let tmp_path = path.with_extension("yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml).map_err(|e| io_err(&tmp_path, e))?;
    if let Err(e) = std::fs::rename(&tmp_path, &path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(io_err(&path, e));
    }
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(config: &AggregatorConfig) -> Result<(), ConfigError> {
    save_at(&home()?, config)
}

fn home() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::HomeNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_replaces_label() {
        let config = AggregatorConfig::default().with_label_override(Some("vpp-2".into()));
        assert_eq!(config.service_label.as_str(), "vpp-2");
    }

    #[test]
    fn empty_override_is_ignored() {
        let config = AggregatorConfig::default().with_label_override(Some(String::new()));
        assert_eq!(config.service_label, ServiceLabel::default());
        let config = AggregatorConfig::default().with_label_override(None);
        assert_eq!(config.service_label, ServiceLabel::default());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: AggregatorConfig = serde_yaml::from_str("{}").expect("parse");
        assert_eq!(config, AggregatorConfig::default());
        assert_eq!(config.watch_failure, WatchFailurePolicy::CloseObtained);
    }
}
