//! Shared application state.

use std::sync::{Arc, Mutex};

use chatlab_core::clock::Clock;
use chatlab_core::rng::DeterministicRng;
use chatlab_core::sink::SessionSink;
use chatlab_dialogue::domain::design::ExperimentDesign;
use chatlab_session::application::store::SessionStore;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Script and condition set, shared read-only by every session.
    pub design: Arc<ExperimentDesign>,
    /// Clock for timestamps.
    pub clock: Arc<dyn Clock + Send + Sync>,
    /// RNG for condition assignment.
    pub rng: Arc<Mutex<dyn DeterministicRng + Send>>,
    /// Session-keyed store of live sessions.
    pub sessions: Arc<dyn SessionStore>,
    /// System of record for completed sessions.
    pub sink: Arc<dyn SessionSink>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        design: Arc<ExperimentDesign>,
        clock: Arc<dyn Clock + Send + Sync>,
        rng: Arc<Mutex<dyn DeterministicRng + Send>>,
        sessions: Arc<dyn SessionStore>,
        sink: Arc<dyn SessionSink>,
    ) -> Self {
        Self {
            design,
            clock,
            rng,
            sessions,
            sink,
        }
    }
}
