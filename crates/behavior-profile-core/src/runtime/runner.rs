// crates/behavior-profile-core/src/runtime/runner.rs
// ============================================================================
// Module: Profile Runner
// Description: Store-backed entry point that loads, runs, and saves sessions.
// Purpose: Resume runs across host invocations keyed by run identifier.
// Dependencies: crate::{core, interfaces, runtime::interpreter}, thiserror
// ============================================================================

//! ## Overview
//! The runner wraps an [`Interpreter`] with a [`SessionStore`]: it loads the
//! session recorded for a run (or starts a fresh one), runs the profile until
//! it exits, and saves the resulting session whatever the status. With strict
//! validation enabled, malformed profiles are rejected before any state is
//! touched.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::Profile;
use crate::core::ProfileError;
use crate::core::RunId;
use crate::interfaces::BehaviorHost;
use crate::interfaces::SessionStore;
use crate::interfaces::StoreError;
use crate::runtime::interpreter::Interpreter;
use crate::runtime::interpreter::InterpreterConfig;
use crate::runtime::interpreter::RunOutcome;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Profile runner errors.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Strict validation rejected the profile.
    #[error("profile rejected: {0}")]
    Invalid(#[from] ProfileError),
    /// The session store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// SECTION: Runner
// ============================================================================

/// Runs profiles against sessions persisted in a store.
#[derive(Debug, Clone)]
pub struct ProfileRunner<S> {
    /// Session store.
    store: S,
    /// Interpreter tick budgets.
    config: InterpreterConfig,
    /// Whether to validate profiles before running them.
    strict_validation: bool,
}

impl<S: SessionStore> ProfileRunner<S> {
    /// Creates a runner without strict validation.
    #[must_use]
    pub const fn new(store: S, config: InterpreterConfig) -> Self {
        Self {
            store,
            config,
            strict_validation: false,
        }
    }

    /// Enables or disables strict profile validation.
    #[must_use]
    pub const fn with_strict_validation(mut self, strict: bool) -> Self {
        self.strict_validation = strict;
        self
    }

    /// Returns the backing session store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Runs `profile` for `run_id`, resuming any stored session.
    ///
    /// # Errors
    ///
    /// Returns [`RunnerError::Invalid`] when strict validation fails and
    /// [`RunnerError::Store`] when the session cannot be loaded or saved.
    pub fn run<H: BehaviorHost + ?Sized>(
        &self,
        profile: &Profile,
        run_id: &RunId,
        host: &mut H,
    ) -> Result<RunOutcome, RunnerError> {
        if self.strict_validation {
            profile.validate()?;
        }
        let session = self.store.load(run_id)?;
        tracing::debug!(run_id = %run_id, resumed = session.is_some(), "loaded session");
        let interpreter = Interpreter::new(profile, self.config);
        let outcome = interpreter.run(host, session);
        self.store.save(run_id, &outcome.session)?;
        Ok(outcome)
    }
}
