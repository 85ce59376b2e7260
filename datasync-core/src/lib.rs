//! Datasync core library: transport capability traits, event types,
//! service label, configuration and errors.
//!
//! Public API surface:
//! - [`transport`]: [`Watcher`], [`Publisher`], [`Transport`], [`Registration`]
//! - [`kv`]: key-value broker/watcher contracts
//! - [`types`]: change/resync events and [`Message`]
//! - [`config`]: YAML load / save
//! - [`error`]: [`TransportError`], [`KvError`], [`ConfigError`]

pub mod config;
pub mod error;
pub mod kv;
pub mod label;
pub mod transport;
pub mod types;

pub use config::{AggregatorConfig, WatchFailurePolicy};
pub use error::{ConfigError, KvError, TransportError};
pub use kv::{BytesBroker, BytesWatcher, KvBytesPlugin};
pub use label::ServiceLabel;
pub use transport::{ChangeSink, Publisher, Registration, ResyncSink, Transport, Watcher};
pub use types::{ChangeEvent, ChangeType, KeyValue, Message, ResyncEvent};
