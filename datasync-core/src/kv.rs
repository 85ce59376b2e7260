//! Byte-level key-value store contracts.
//!
//! A [`KvBytesPlugin`] hands out brokers and watchers scoped to a key
//! prefix. Keys passed to a scoped broker or watcher are relative to that
//! prefix; the plugin is responsible for joining them.

use std::sync::Arc;

use crate::error::KvError;
use crate::transport::{ChangeSink, Registration};
use crate::types::KeyValue;

/// Read/write access to a key-value store.
pub trait BytesBroker: Send + Sync {
    fn put(&self, key: &str, value: &[u8]) -> Result<(), KvError>;

    /// List every stored key under `key_prefix`, sorted by key.
    fn list_values(&self, key_prefix: &str) -> Result<Vec<KeyValue>, KvError>;
}

/// Change notifications from a key-value store.
pub trait BytesWatcher: Send + Sync {
    fn watch(
        &self,
        subscription_name: &str,
        changes: ChangeSink,
        key_prefixes: &[String],
    ) -> Result<Box<dyn Registration>, KvError>;
}

/// Factory for prefix-scoped brokers and watchers over one store connection.
pub trait KvBytesPlugin {
    fn new_broker(&self, key_prefix: &str) -> Arc<dyn BytesBroker>;
    fn new_watcher(&self, key_prefix: &str) -> Arc<dyn BytesWatcher>;
}
