//! Transport aggregator: fans watch and publish out across every
//! registered transport.
//!
//! ## Fan-out rules
//!
//! - Transports are called one at a time, in the order they were added.
//! - `watch_data` is fail-fast: the first transport error aborts the call.
//! - `publish_data` is best-effort: every transport is attempted and the
//!   last failure seen is returned.

use std::sync::Arc;

use datasync_core::{
    AggregatorConfig, ChangeSink, KvBytesPlugin, Message, Publisher, Registration, ResyncSink,
    ServiceLabel, Transport, TransportError, WatchFailurePolicy, Watcher,
};

use crate::adapters::{KvAdapter, WatchOnlyAdapter};
use crate::error::AggregatorError;
use crate::registration::{close_all, AggregatedRegistration};

/// Ordered set of transports that act as one.
///
/// The set is append-only. Transports are shared, so the same instance may
/// also be used directly by other subsystems.
#[derive(Default)]
pub struct TransportAggregator {
    transports: Vec<Arc<dyn Transport>>,
    watch_failure: WatchFailurePolicy,
}

impl TransportAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty aggregator using the failure policy from `config`.
    pub fn with_config(config: &AggregatorConfig) -> Self {
        Self {
            transports: Vec::new(),
            watch_failure: config.watch_failure,
        }
    }

    pub fn len(&self) -> usize {
        self.transports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transports.is_empty()
    }

    pub fn watch_failure_policy(&self) -> WatchFailurePolicy {
        self.watch_failure
    }

    // -----------------------------------------------------------------------
    // Registration
    // -----------------------------------------------------------------------

    /// Append `transport` to the fan-out set. No deduplication.
    pub fn add_transport(&mut self, transport: Arc<dyn Transport>) {
        self.transports.push(transport);
        tracing::debug!("transport #{} added", self.transports.len() - 1);
    }

    /// Add a key-value transport named `name`, scoped to the agent prefix
    /// of `label`.
    pub fn init_kv_transport(
        &mut self,
        plugin: &dyn KvBytesPlugin,
        label: &ServiceLabel,
        name: &str,
    ) {
        let prefix = label.agent_prefix();
        let broker = plugin.new_broker(&prefix);
        let watcher = plugin.new_watcher(&prefix);
        tracing::info!("key-value transport {name} registered under {prefix}");
        self.add_transport(Arc::new(KvAdapter::new(name, broker, watcher)));
    }

    /// Add a transport that can only watch, such as a remote watch channel.
    pub fn init_watch_only_transport(&mut self, name: &str, watcher: Arc<dyn Watcher>) {
        tracing::info!("watch-only transport {name} registered");
        self.add_transport(Arc::new(WatchOnlyAdapter::new(name, watcher)));
    }

    // -----------------------------------------------------------------------
    // Fan-out
    // -----------------------------------------------------------------------

    /// Subscribe `subscription_name` on every transport.
    ///
    /// Each transport gets a clone of the same `changes` and `resyncs`
    /// senders. On the first failure the error is returned as-is; the
    /// registrations obtained so far are closed or dropped according to
    /// the configured [`WatchFailurePolicy`] and never returned.
    pub fn watch_data(
        &self,
        subscription_name: &str,
        changes: ChangeSink,
        resyncs: ResyncSink,
        key_prefixes: &[String],
    ) -> Result<AggregatedRegistration, AggregatorError> {
        let mut registrations: Vec<Box<dyn Registration>> =
            Vec::with_capacity(self.transports.len());

        for (index, transport) in self.transports.iter().enumerate() {
            tracing::debug!("watch {subscription_name}: transport #{index}");
            match transport.watch_data(
                subscription_name,
                changes.clone(),
                resyncs.clone(),
                key_prefixes,
            ) {
                Ok(registration) => registrations.push(registration),
                Err(err) => {
                    tracing::warn!("watch {subscription_name}: transport #{index} failed: {err}");
                    self.abandon(subscription_name, registrations);
                    return Err(AggregatorError::Transport(err));
                }
            }
        }

        tracing::info!(
            "watch {subscription_name}: subscribed on {} transports",
            registrations.len()
        );
        Ok(AggregatedRegistration::new(registrations))
    }

    /// Publish `message` under `key` to every transport.
    ///
    /// A failing transport does not stop the fan-out. When several fail,
    /// only the last error is returned; each one is logged.
    pub fn publish_data(&self, key: &str, message: &Message) -> Result<(), AggregatorError> {
        if self.transports.is_empty() {
            return Err(AggregatorError::NoTransport);
        }

        let mut last_error = None;
        for (index, transport) in self.transports.iter().enumerate() {
            if let Err(err) = transport.publish_data(key, message) {
                tracing::warn!("publish {key}: transport #{index} failed: {err}");
                last_error = Some(err);
            }
        }

        match last_error {
            Some(err) => Err(AggregatorError::Transport(err)),
            None => Ok(()),
        }
    }

    fn abandon(&self, subscription_name: &str, registrations: Vec<Box<dyn Registration>>) {
        if registrations.is_empty() {
            return;
        }
        match self.watch_failure {
            WatchFailurePolicy::CloseObtained => {
                let failures = close_all(registrations);
                if !failures.is_empty() {
                    tracing::warn!(
                        "watch {subscription_name}: {} registrations failed to close during rollback",
                        failures.len()
                    );
                }
            }
            WatchFailurePolicy::Discard => {
                tracing::warn!(
                    "watch {subscription_name}: discarding {} open registrations",
                    registrations.len()
                );
            }
        }
    }
}

impl Watcher for TransportAggregator {
    fn watch_data(
        &self,
        subscription_name: &str,
        changes: ChangeSink,
        resyncs: ResyncSink,
        key_prefixes: &[String],
    ) -> Result<Box<dyn Registration>, TransportError> {
        let registration =
            TransportAggregator::watch_data(self, subscription_name, changes, resyncs, key_prefixes)?;
        Ok(Box::new(registration))
    }
}

impl Publisher for TransportAggregator {
    fn publish_data(&self, key: &str, message: &Message) -> Result<(), TransportError> {
        TransportAggregator::publish_data(self, key, message).map_err(TransportError::from)
    }
}

impl std::fmt::Debug for TransportAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportAggregator")
            .field("transports", &self.transports.len())
            .field("watch_failure", &self.watch_failure)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    struct Refusing;

    impl Watcher for Refusing {
        fn watch_data(
            &self,
            _: &str,
            _: ChangeSink,
            _: ResyncSink,
            _: &[String],
        ) -> Result<Box<dyn Registration>, TransportError> {
            Err(TransportError::backend("refusing", "down"))
        }
    }

    impl Publisher for Refusing {
        fn publish_data(&self, _: &str, _: &Message) -> Result<(), TransportError> {
            Err(TransportError::backend("refusing", "down"))
        }
    }

    #[test]
    fn with_config_copies_policy() {
        let config = AggregatorConfig {
            watch_failure: WatchFailurePolicy::Discard,
            ..AggregatorConfig::default()
        };
        let agg = TransportAggregator::with_config(&config);
        assert!(agg.is_empty());
        assert_eq!(agg.watch_failure_policy(), WatchFailurePolicy::Discard);
    }

    #[test]
    fn watch_with_no_transports_yields_empty_registration() {
        let agg = TransportAggregator::new();
        let (ctx, _crx) = mpsc::channel(1);
        let (rtx, _rrx) = mpsc::channel(1);
        let reg = agg.watch_data("empty", ctx, rtx, &[]).expect("watch");
        assert!(reg.is_empty());
    }

    #[test]
    fn nested_aggregator_flattens_transport_errors() {
        let mut inner = TransportAggregator::new();
        inner.add_transport(Arc::new(Refusing));
        let mut outer = TransportAggregator::new();
        outer.add_transport(Arc::new(inner));

        let msg = Message::from(serde_json::json!(1));
        let err = outer.publish_data("k", &msg).unwrap_err();
        match err {
            AggregatorError::Transport(TransportError::Backend { transport, .. }) => {
                assert_eq!(transport, "refusing");
            }
            other => panic!("expected inner backend error, got {other:?}"),
        }
    }

    #[test]
    fn nested_empty_aggregator_reports_as_backend_error() {
        let mut outer = TransportAggregator::new();
        outer.add_transport(Arc::new(TransportAggregator::new()));

        let msg = Message::from(serde_json::json!(1));
        let err = outer.publish_data("k", &msg).unwrap_err();
        assert!(err.to_string().contains("no transport"), "got: {err}");
    }
}
