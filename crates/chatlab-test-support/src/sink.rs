//! Test sinks — mock `SessionSink` implementations for tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chatlab_core::error::DomainError;
use chatlab_core::sink::{SessionRecord, SessionSink};

/// A sink that records every record it receives and always succeeds.
#[derive(Debug, Default)]
pub struct RecordingSessionSink {
    recorded: Mutex<Vec<SessionRecord>>,
}

impl RecordingSessionSink {
    /// Create an empty recording sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded sessions.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn recorded(&self) -> Vec<SessionRecord> {
        self.recorded.lock().unwrap().clone()
    }
}

#[async_trait]
impl SessionSink for RecordingSessionSink {
    async fn record(&self, record: &SessionRecord) -> Result<(), DomainError> {
        self.recorded.lock().unwrap().push(record.clone());
        Ok(())
    }
}

/// A sink that always fails. Useful for testing error-handling paths.
#[derive(Debug)]
pub struct FailingSessionSink;

#[async_trait]
impl SessionSink for FailingSessionSink {
    async fn record(&self, _record: &SessionRecord) -> Result<(), DomainError> {
        Err(DomainError::SinkWrite("sheet unavailable".into()))
    }
}

/// A sink that fails the first `failures` calls, then records.
#[derive(Debug)]
pub struct FlakySessionSink {
    remaining_failures: AtomicUsize,
    inner: RecordingSessionSink,
}

impl FlakySessionSink {
    /// Create a sink that fails `failures` times before succeeding.
    #[must_use]
    pub fn new(failures: usize) -> Self {
        Self {
            remaining_failures: AtomicUsize::new(failures),
            inner: RecordingSessionSink::new(),
        }
    }

    /// Returns a snapshot of all successfully recorded sessions.
    pub fn recorded(&self) -> Vec<SessionRecord> {
        self.inner.recorded()
    }
}

#[async_trait]
impl SessionSink for FlakySessionSink {
    async fn record(&self, record: &SessionRecord) -> Result<(), DomainError> {
        let failed = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(DomainError::SinkWrite("transient sink failure".into()));
        }
        self.inner.record(record).await
    }
}

/// A sink that yields to the scheduler once before recording, so another
/// task can run while a record is in flight.
#[derive(Debug, Default)]
pub struct YieldingSessionSink {
    inner: RecordingSessionSink,
}

impl YieldingSessionSink {
    /// Create an empty yielding sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all recorded sessions.
    pub fn recorded(&self) -> Vec<SessionRecord> {
        self.inner.recorded()
    }
}

#[async_trait]
impl SessionSink for YieldingSessionSink {
    async fn record(&self, record: &SessionRecord) -> Result<(), DomainError> {
        tokio::task::yield_now().await;
        self.inner.record(record).await
    }
}
