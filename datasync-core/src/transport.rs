//! Capability contracts every transport implements.
//!
//! A transport is anything that can start a watch subscription and publish
//! a message. The two capabilities are separate traits so watch-only
//! backends can be adapted; [`Transport`] is implemented for every type
//! that offers both.

use tokio::sync::mpsc;

use crate::error::TransportError;
use crate::types::{ChangeEvent, Message, ResyncEvent};

/// Sending half of the channel incremental changes are delivered on.
///
/// All transports of one subscription receive clones of the same sender,
/// so their events interleave on a single channel.
pub type ChangeSink = mpsc::Sender<ChangeEvent>;

/// Sending half of the channel resync snapshots are delivered on.
pub type ResyncSink = mpsc::Sender<ResyncEvent>;

/// A live watch subscription on one transport.
pub trait Registration: Send {
    /// Stop the subscription and release its resources.
    fn close(&mut self) -> Result<(), TransportError>;
}

/// Watch capability.
pub trait Watcher: Send + Sync {
    /// Subscribe `subscription_name` to every key under `key_prefixes`.
    ///
    /// Changes go to `changes`, full-state snapshots to `resyncs`.
    fn watch_data(
        &self,
        subscription_name: &str,
        changes: ChangeSink,
        resyncs: ResyncSink,
        key_prefixes: &[String],
    ) -> Result<Box<dyn Registration>, TransportError>;
}

/// Publish capability.
pub trait Publisher: Send + Sync {
    fn publish_data(&self, key: &str, message: &Message) -> Result<(), TransportError>;
}

/// A backend offering both watch and publish.
pub trait Transport: Watcher + Publisher {}

impl<T: Watcher + Publisher + ?Sized> Transport for T {}
