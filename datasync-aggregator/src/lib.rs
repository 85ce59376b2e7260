//! # datasync-aggregator
//!
//! Fan-out of watch subscriptions and publishes across a registered set of
//! transports.
//!
//! Add transports to a [`TransportAggregator`], then call
//! [`TransportAggregator::watch_data`] to subscribe on all of them at once
//! (yielding one [`AggregatedRegistration`]) or
//! [`TransportAggregator::publish_data`] to write to all of them.

pub mod adapters;
pub mod aggregator;
pub mod error;
pub mod registration;

pub use adapters::{KvAdapter, WatchOnlyAdapter};
pub use aggregator::TransportAggregator;
pub use error::{AggregatorError, CloseFailure};
pub use registration::{close_all, AggregatedRegistration};
