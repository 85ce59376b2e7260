//! Error types for datasync-aggregator.

use std::fmt;

use thiserror::Error;

use datasync_core::TransportError;

/// All errors that can arise from fan-out operations.
#[derive(Debug, Error)]
pub enum AggregatorError {
    /// Publish was attempted before any transport was registered.
    #[error("no transport is available in aggregator")]
    NoTransport,

    /// An error from a single transport, passed through unchanged.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// One or more registrations failed to close.
    #[error("{} of {total} registrations failed to close: {}", .failures.len(), join_failures(.failures))]
    Close {
        total: usize,
        failures: Vec<CloseFailure>,
    },
}

/// A registration that failed to close, by its position in the aggregate.
#[derive(Debug)]
pub struct CloseFailure {
    pub index: usize,
    pub source: TransportError,
}

impl fmt::Display for CloseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}: {}", self.index, self.source)
    }
}

fn join_failures(failures: &[CloseFailure]) -> String {
    failures
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<AggregatorError> for TransportError {
    /// Flatten an aggregator error so an aggregator can stand in for a
    /// single transport.
    fn from(err: AggregatorError) -> Self {
        match err {
            AggregatorError::Transport(inner) => inner,
            other => TransportError::backend("aggregator", other.to_string()),
        }
    }
}
