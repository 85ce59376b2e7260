//! Error types for datasync-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors a single transport can report from watch, publish or close.
///
/// The aggregator wraps these without reinterpreting them.
#[derive(Debug, Error)]
pub enum TransportError {
    /// An error from a key-value broker or watcher.
    #[error("key-value store error: {0}")]
    Kv(#[from] KvError),

    /// The message could not be encoded for the wire.
    #[error("message encoding error: {0}")]
    Encode(#[from] serde_json::Error),

    /// The receiving half of an event sink was dropped.
    #[error("event sink closed: {0}")]
    SinkClosed(&'static str),

    /// An event sink had no free capacity.
    #[error("event sink full: {0}")]
    SinkFull(&'static str),

    /// Any other backend failure, tagged with the transport that raised it.
    #[error("transport {transport}: {message}")]
    Backend { transport: String, message: String },
}

impl TransportError {
    /// Convenience constructor for [`TransportError::Backend`].
    pub fn backend(transport: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Backend {
            transport: transport.into(),
            message: message.into(),
        }
    }
}

/// Errors raised by key-value brokers and watchers.
#[derive(Debug, Error)]
pub enum KvError {
    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// An operation on a specific key failed.
    #[error("operation on {key} failed: {message}")]
    Operation { key: String, message: String },
}

/// All errors that can arise from loading or saving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure, with the path that caused it.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// YAML parse error on load, with the offending file.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The config file did not exist.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },

    /// `dirs::home_dir()` returned `None`; cannot locate `~/.datasync/`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
