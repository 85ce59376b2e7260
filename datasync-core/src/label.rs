//! Microservice label and the key prefixes derived from it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Environment variable that overrides the configured label.
pub const MICROSERVICE_LABEL_ENV: &str = "MICROSERVICE_LABEL";

/// Label used when neither config nor environment provides one.
pub const DEFAULT_MICROSERVICE_LABEL: &str = "vpp1";

/// Root of every agent's key space.
pub const AGENT_PREFIX_ROOT: &str = "/vnf-agent/";

/// Identifies this agent; scopes the keys its transports read and write.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceLabel(String);

impl ServiceLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Label from `MICROSERVICE_LABEL`, or the default when unset or empty.
    pub fn from_env() -> Self {
        match std::env::var(MICROSERVICE_LABEL_ENV) {
            Ok(label) if !label.is_empty() => Self(label),
            _ => Self::default(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `/vnf-agent/<label>/`
    pub fn agent_prefix(&self) -> String {
        Self::different_agent_prefix(&self.0)
    }

    /// Key prefix of another agent identified by `label`.
    pub fn different_agent_prefix(label: &str) -> String {
        format!("{AGENT_PREFIX_ROOT}{label}/")
    }

    /// `/vnf-agent/`
    pub fn all_agents_prefix() -> &'static str {
        AGENT_PREFIX_ROOT
    }
}

impl Default for ServiceLabel {
    fn default() -> Self {
        Self(DEFAULT_MICROSERVICE_LABEL.to_owned())
    }
}

impl fmt::Display for ServiceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ServiceLabel {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl From<String> for ServiceLabel {
    fn from(s: String) -> Self {
        Self(s)
    }
}
