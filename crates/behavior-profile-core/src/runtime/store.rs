// crates/behavior-profile-core/src/runtime/store.rs
// ============================================================================
// Module: In-Memory Session Store
// Description: Mutex-guarded session map for tests and simulations.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! [`InMemorySessionStore`] keeps sessions in a shared map keyed by run id.
//! Clones share the same backing map. It is not intended for production use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::RunId;
use crate::core::SessionState;
use crate::interfaces::SessionStore;
use crate::interfaces::StoreError;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// In-memory session store for tests and simulations.
#[derive(Debug, Default, Clone)]
pub struct InMemorySessionStore {
    /// Session map protected by a mutex.
    sessions: Arc<Mutex<BTreeMap<RunId, SessionState>>>,
}

impl InMemorySessionStore {
    /// Creates an empty in-memory session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored sessions.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] when the mutex is poisoned.
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len())
    }

    /// Removes the session recorded for a run, returning it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Store`] when the mutex is poisoned.
    pub fn remove(&self, run_id: &RunId) -> Result<Option<SessionState>, StoreError> {
        Ok(self.lock()?.remove(run_id))
    }

    /// Locks the session map.
    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<RunId, SessionState>>, StoreError> {
        self.sessions
            .lock()
            .map_err(|_| StoreError::Store("session store mutex poisoned".to_string()))
    }
}

impl SessionStore for InMemorySessionStore {
    fn load(&self, run_id: &RunId) -> Result<Option<SessionState>, StoreError> {
        Ok(self.lock()?.get(run_id).cloned())
    }

    fn save(&self, run_id: &RunId, session: &SessionState) -> Result<(), StoreError> {
        self.lock()?.insert(run_id.clone(), session.clone());
        Ok(())
    }
}
