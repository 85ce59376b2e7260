//! Aggregated watch registration and best-effort close.

use datasync_core::{Registration, TransportError};

use crate::error::{AggregatorError, CloseFailure};

/// Close every registration in order, even after failures.
///
/// Returns one [`CloseFailure`] per handle whose close failed, indexed by
/// its position in `registrations`.
pub fn close_all(registrations: Vec<Box<dyn Registration>>) -> Vec<CloseFailure> {
    let mut failures = Vec::new();
    for (index, mut registration) in registrations.into_iter().enumerate() {
        if let Err(source) = registration.close() {
            tracing::warn!("closing registration #{index} failed: {source}");
            failures.push(CloseFailure { index, source });
        }
    }
    failures
}

/// The union of per-transport watch registrations from one `watch_data`
/// fan-out.
///
/// Handles are kept in transport registration order. Nothing is released
/// on drop; call [`close`](Self::close).
#[derive(Default)]
pub struct AggregatedRegistration {
    registrations: Vec<Box<dyn Registration>>,
}

impl AggregatedRegistration {
    pub fn new(registrations: Vec<Box<dyn Registration>>) -> Self {
        Self { registrations }
    }

    /// Number of handles still open.
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Close every contained registration.
    ///
    /// All handles are attempted. If any fail, the error lists every
    /// failure with its index. Handles are released on the first call, so
    /// repeated calls return `Ok(())`.
    pub fn close(&mut self) -> Result<(), AggregatorError> {
        let registrations = std::mem::take(&mut self.registrations);
        let total = registrations.len();
        if total == 0 {
            return Ok(());
        }

        let failures = close_all(registrations);
        if failures.is_empty() {
            tracing::debug!("closed {total} registrations");
            Ok(())
        } else {
            Err(AggregatorError::Close { total, failures })
        }
    }
}

impl Registration for AggregatedRegistration {
    fn close(&mut self) -> Result<(), TransportError> {
        AggregatedRegistration::close(self).map_err(TransportError::from)
    }
}

impl std::fmt::Debug for AggregatedRegistration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregatedRegistration")
            .field("registrations", &self.registrations.len())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
