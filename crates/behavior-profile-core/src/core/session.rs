// crates/behavior-profile-core/src/core/session.rs
// ============================================================================
// Module: Interpreter Session State
// Description: Serializable snapshot that makes profile execution resumable.
// Purpose: Carry everything a suspended run needs to continue on a later tick.
// Dependencies: crate::core::{hashing, identifiers, params, time}, serde
// ============================================================================

//! ## Overview
//! A session is the only entity the interpreter mutates. It is created on the
//! first run, handed back verbatim whenever the run suspends, and passed in
//! again to resume. Port values survive state changes for the lifetime of the
//! session so a later state can read what an earlier state produced.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::core::hashing::HashDigest;
use crate::core::identifiers::PortId;
use crate::core::identifiers::StateId;
use crate::core::params::ParamValue;
use crate::core::time::Timestamp;

// ============================================================================
// SECTION: Resume Token
// ============================================================================

/// Opaque token produced by a paused sub-behavior and handed back on resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResumeToken(Value);

impl ResumeToken {
    /// Wraps a JSON payload as a resume token.
    #[must_use]
    pub const fn new(value: Value) -> Self {
        Self(value)
    }

    /// Returns the token payload.
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

}

// ============================================================================
// SECTION: Session State
// ============================================================================

/// Output port values recorded during a run, keyed by producing state then port.
pub type PortValues = BTreeMap<StateId, BTreeMap<PortId, ParamValue>>;

/// Mutable interpreter state for one run of a profile.
///
/// # Invariants
/// - `ticks_in_state`, `entered_at`, `sub_behavior_complete`, and
///   `resume_token` describe the current state only and reset on entry.
/// - `port_values` is keyed by the producing state and its output port, so
///   states reusing a port id never share a value. It is never cleared by the
///   interpreter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Active state, or `None` when the run is idle.
    pub current_state_id: Option<StateId>,
    /// Time the active state was entered.
    pub entered_at: Timestamp,
    /// Loop iterations completed since the active state was entered.
    #[serde(default)]
    pub ticks_in_state: u64,
    /// Whether the active sub-behavior reported completion.
    #[serde(default)]
    pub sub_behavior_complete: bool,
    /// Token captured from the active sub-behavior when the run suspended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resume_token: Option<ResumeToken>,
    /// Last value written on each state's output ports during the run.
    #[serde(default)]
    pub port_values: PortValues,
    /// Canonical hash of the profile the session was started against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_hash: Option<HashDigest>,
}

impl SessionState {
    /// Creates a fresh session positioned on `initial_state`.
    #[must_use]
    pub const fn new(initial_state: Option<StateId>, now: Timestamp) -> Self {
        Self {
            current_state_id: initial_state,
            entered_at: now,
            ticks_in_state: 0,
            sub_behavior_complete: false,
            resume_token: None,
            port_values: BTreeMap::new(),
            profile_hash: None,
        }
    }

    /// Moves the session to `state_id`, resetting per-state bookkeeping.
    ///
    /// Port values are kept.
    pub fn enter_state(&mut self, state_id: StateId, now: Timestamp) {
        self.current_state_id = Some(state_id);
        self.entered_at = now;
        self.ticks_in_state = 0;
        self.sub_behavior_complete = false;
        self.resume_token = None;
    }

    /// Returns the last value `state_id` wrote on its output port `port_id`.
    #[must_use]
    pub fn port_value(&self, state_id: &StateId, port_id: &PortId) -> Option<&ParamValue> {
        self.port_values.get(state_id)?.get(port_id)
    }

    /// Records a value on `state_id`'s output port `port_id`.
    pub fn set_port_value(&mut self, state_id: StateId, port_id: PortId, value: ParamValue) {
        self.port_values.entry(state_id).or_default().insert(port_id, value);
    }
}
