//! Shared test mocks and utilities for the Chatlab experiment engine.

mod clock;
mod rng;
mod sink;

pub use clock::FixedClock;
pub use rng::{MockRng, SequenceRng};
pub use sink::{
    FailingSessionSink, FlakySessionSink, RecordingSessionSink, YieldingSessionSink,
};
