//! Event and payload types carried between transports and watchers.
//!
//! Payload bytes are JSON; decode helpers go through `serde_json`.

use std::collections::BTreeMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Change events
// ---------------------------------------------------------------------------

/// Kind of mutation observed on a watched key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    #[default]
    Put,
    Delete,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeType::Put => write!(f, "put"),
            ChangeType::Delete => write!(f, "delete"),
        }
    }
}

/// An incremental change on a single watched key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub key: String,
    pub change_type: ChangeType,
    pub revision: i64,
    /// New value; `None` for deletes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_value: Option<Vec<u8>>,
}

impl ChangeEvent {
    pub fn put(key: impl Into<String>, revision: i64, value: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            change_type: ChangeType::Put,
            revision,
            value: Some(value),
            prev_value: None,
        }
    }

    pub fn delete(key: impl Into<String>, revision: i64, prev_value: Option<Vec<u8>>) -> Self {
        Self {
            key: key.into(),
            change_type: ChangeType::Delete,
            revision,
            value: None,
            prev_value,
        }
    }

    /// Decode the new value. Returns `Ok(None)` for deletes.
    pub fn decode_value<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        self.value
            .as_deref()
            .map(serde_json::from_slice)
            .transpose()
    }
}

// ---------------------------------------------------------------------------
// Resync events
// ---------------------------------------------------------------------------

/// A stored key with its current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub revision: i64,
    pub value: Vec<u8>,
}

impl KeyValue {
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.value)
    }
}

/// Full-state snapshot for a subscription, grouped by watched key prefix.
///
/// Receivers reconcile their whole state from it rather than applying it
/// as an increment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ResyncEvent {
    pub subscription_name: String,
    #[serde(default)]
    pub values: BTreeMap<String, Vec<KeyValue>>,
}

impl ResyncEvent {
    pub fn new(subscription_name: impl Into<String>) -> Self {
        Self {
            subscription_name: subscription_name.into(),
            values: BTreeMap::new(),
        }
    }

    /// Total number of key-values across all prefixes.
    pub fn len(&self) -> usize {
        self.values.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// Opaque structured payload handed to publishers.
///
/// Only transports look inside; fan-out code passes it through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Message(Value);

impl Message {
    pub fn new<T: Serialize + ?Sized>(payload: &T) -> Result<Self, serde_json::Error> {
        serde_json::to_value(payload).map(Self)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.0)
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.0)
    }
}

impl From<Value> for Message {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
