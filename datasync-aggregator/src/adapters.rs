//! Adapters turning collaborator backends into [`Transport`]s.
//!
//! - [`KvAdapter`]: key-value broker + watcher pair.
//! - [`WatchOnlyAdapter`]: any [`Watcher`]; publishing is skipped.
//!
//! [`Transport`]: datasync_core::Transport

use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;

use datasync_core::{
    BytesBroker, BytesWatcher, ChangeSink, Message, Publisher, Registration, ResyncEvent,
    ResyncSink, TransportError, Watcher,
};

// ---------------------------------------------------------------------------
// Key-value adapter
// ---------------------------------------------------------------------------

/// Transport over a prefix-scoped key-value store.
///
/// Watching streams incremental changes from the watcher and sends one
/// resync snapshot built from the broker. Publishing stores the message as
/// JSON bytes.
pub struct KvAdapter {
    name: String,
    broker: Arc<dyn BytesBroker>,
    watcher: Arc<dyn BytesWatcher>,
}

impl KvAdapter {
    pub fn new(
        name: impl Into<String>,
        broker: Arc<dyn BytesBroker>,
        watcher: Arc<dyn BytesWatcher>,
    ) -> Self {
        Self {
            name: name.into(),
            broker,
            watcher,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn snapshot(
        &self,
        subscription_name: &str,
        key_prefixes: &[String],
    ) -> Result<ResyncEvent, TransportError> {
        let mut event = ResyncEvent::new(subscription_name);
        for prefix in key_prefixes {
            let values = self.broker.list_values(prefix)?;
            event.values.insert(prefix.clone(), values);
        }
        Ok(event)
    }
}

impl Watcher for KvAdapter {
    /// Start watching, then deliver the current state as a resync event.
    ///
    /// Never blocks: a full resync sink fails the watch with
    /// [`TransportError::SinkFull`].
    fn watch_data(
        &self,
        subscription_name: &str,
        changes: ChangeSink,
        resyncs: ResyncSink,
        key_prefixes: &[String],
    ) -> Result<Box<dyn Registration>, TransportError> {
        let mut registration = self
            .watcher
            .watch(subscription_name, changes, key_prefixes)?;

        let resync = self
            .snapshot(subscription_name, key_prefixes)
            .and_then(|event| {
                tracing::debug!(
                    "{}: resync {subscription_name} with {} values",
                    self.name,
                    event.len()
                );
                resyncs.try_send(event).map_err(|err| match err {
                    TrySendError::Full(_) => TransportError::SinkFull("resync"),
                    TrySendError::Closed(_) => TransportError::SinkClosed("resync"),
                })
            });

        if let Err(err) = resync {
            if let Err(close_err) = registration.close() {
                tracing::warn!("{}: closing watch after failed resync: {close_err}", self.name);
            }
            return Err(err);
        }
        Ok(registration)
    }
}

impl Publisher for KvAdapter {
    fn publish_data(&self, key: &str, message: &Message) -> Result<(), TransportError> {
        let bytes = message.to_bytes()?;
        self.broker.put(key, &bytes)?;
        tracing::debug!("{}: put {key} ({} bytes)", self.name, bytes.len());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Watch-only adapter
// ---------------------------------------------------------------------------

/// Transport over a backend that can only deliver watch events.
///
/// Publishing is a no-op, so a watch-only backend never masks the result
/// of the transports that do store writes.
pub struct WatchOnlyAdapter {
    name: String,
    watcher: Arc<dyn Watcher>,
}

impl WatchOnlyAdapter {
    pub fn new(name: impl Into<String>, watcher: Arc<dyn Watcher>) -> Self {
        Self {
            name: name.into(),
            watcher,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Watcher for WatchOnlyAdapter {
    fn watch_data(
        &self,
        subscription_name: &str,
        changes: ChangeSink,
        resyncs: ResyncSink,
        key_prefixes: &[String],
    ) -> Result<Box<dyn Registration>, TransportError> {
        self.watcher
            .watch_data(subscription_name, changes, resyncs, key_prefixes)
    }
}

impl Publisher for WatchOnlyAdapter {
    fn publish_data(&self, key: &str, _message: &Message) -> Result<(), TransportError> {
        tracing::debug!("{}: watch-only, publish of {key} skipped", self.name);
        Ok(())
    }
}
