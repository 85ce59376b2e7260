//! Recording transports shared by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use datasync_core::{
    ChangeEvent, ChangeSink, Message, Publisher, Registration, ResyncSink, TransportError,
    Watcher,
};

/// Ordered record of every call made on any mock, e.g. `"publish:b"`.
pub type CallLog = Arc<Mutex<Vec<String>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn calls(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().clone()
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Which operations a [`MockTransport`] fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct Faults {
    pub watch: bool,
    pub publish: bool,
    pub close: bool,
}

impl Faults {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn publish() -> Self {
        Self {
            publish: true,
            ..Self::default()
        }
    }

    pub fn watch() -> Self {
        Self {
            watch: true,
            ..Self::default()
        }
    }

    pub fn close() -> Self {
        Self {
            close: true,
            ..Self::default()
        }
    }
}

pub struct MockTransport {
    pub id: &'static str,
    pub faults: Faults,
    pub log: CallLog,
}

impl MockTransport {
    pub fn new(id: &'static str, faults: Faults, log: &CallLog) -> Arc<Self> {
        Arc::new(Self {
            id,
            faults,
            log: log.clone(),
        })
    }

    fn record(&self, op: &str) {
        self.log.lock().unwrap().push(format!("{op}:{}", self.id));
    }
}

impl Watcher for MockTransport {
    fn watch_data(
        &self,
        subscription_name: &str,
        changes: ChangeSink,
        _resyncs: ResyncSink,
        key_prefixes: &[String],
    ) -> Result<Box<dyn Registration>, TransportError> {
        self.record("watch");
        if self.faults.watch {
            return Err(TransportError::backend(self.id, "watch refused"));
        }
        let key = format!(
            "{}{}",
            key_prefixes.first().map(String::as_str).unwrap_or(""),
            self.id
        );
        let _ = changes.try_send(ChangeEvent::put(
            key,
            1,
            subscription_name.as_bytes().to_vec(),
        ));
        Ok(Box::new(MockRegistration {
            id: self.id,
            fail: self.faults.close,
            log: self.log.clone(),
        }))
    }
}

impl Publisher for MockTransport {
    fn publish_data(&self, _key: &str, _message: &Message) -> Result<(), TransportError> {
        self.record("publish");
        if self.faults.publish {
            Err(TransportError::backend(self.id, "publish refused"))
        } else {
            Ok(())
        }
    }
}

pub struct MockRegistration {
    pub id: &'static str,
    pub fail: bool,
    pub log: CallLog,
}

impl Registration for MockRegistration {
    fn close(&mut self) -> Result<(), TransportError> {
        self.log.lock().unwrap().push(format!("close:{}", self.id));
        if self.fail {
            Err(TransportError::backend(self.id, "close refused"))
        } else {
            Ok(())
        }
    }
}
