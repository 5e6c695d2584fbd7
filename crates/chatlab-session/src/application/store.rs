//! Session-keyed store for live sessions.
//!
//! Sessions are independent; the store isolates them by key. Concurrent
//! mutations of one session are detected with an optimistic version check:
//! a save must name the version it loaded, and each save bumps it by one.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chatlab_core::error::DomainError;
use uuid::Uuid;

use crate::domain::aggregates::ChatSession;

/// Repository for live sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads a copy of the session, if it exists.
    async fn load(&self, session_id: Uuid) -> Result<Option<ChatSession>, DomainError>;

    /// Saves a session if the stored version still equals
    /// `expected_version` (0 for a session never saved). The stored copy gets
    /// version `expected_version + 1`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ConcurrencyConflict` if another save got there
    /// first.
    async fn save(&self, session: ChatSession, expected_version: u64) -> Result<(), DomainError>;
}

/// Process-local session store. Sessions are discarded on shutdown.
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: Mutex<HashMap<Uuid, ChatSession>>,
}

impl InMemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store mutex is poisoned.
    pub fn len(&self) -> Result<usize, DomainError> {
        Ok(self.lock()?.len())
    }

    /// Whether the store holds no sessions.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the store mutex is poisoned.
    pub fn is_empty(&self) -> Result<bool, DomainError> {
        Ok(self.lock()?.is_empty())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, ChatSession>>, DomainError> {
        self.sessions
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("session store mutex poisoned: {e}")))
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn load(&self, session_id: Uuid) -> Result<Option<ChatSession>, DomainError> {
        Ok(self.lock()?.get(&session_id).cloned())
    }

    async fn save(
        &self,
        mut session: ChatSession,
        expected_version: u64,
    ) -> Result<(), DomainError> {
        let mut sessions = self.lock()?;
        let actual = sessions.get(&session.id).map_or(0, ChatSession::version);
        if actual != expected_version {
            return Err(DomainError::ConcurrencyConflict {
                session_id: session.id,
                expected: expected_version,
                actual,
            });
        }
        session.set_version(expected_version + 1);
        sessions.insert(session.id, session);
        Ok(())
    }
}
