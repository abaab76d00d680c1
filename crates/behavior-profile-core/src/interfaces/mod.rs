// crates/behavior-profile-core/src/interfaces/mod.rs
// ============================================================================
// Module: Behavior Profile Interfaces
// Description: Host-supplied capabilities consumed by the interpreter.
// Purpose: Define the contract between the runtime and the agent host.
// Dependencies: crate::core, crate::runtime::dataflow, thiserror
// ============================================================================

//! ## Overview
//! The runtime never runs behaviors, reads the clock, or inspects the world by
//! itself. A [`BehaviorHost`] supplies those capabilities: it resolves
//! behavior names into [`SubBehavior`] handles, grants or denies tick waits,
//! reports pending interrupts, and exposes a read-only [`WorldView`].
//! Sessions are persisted through a [`SessionStore`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::BehaviorName;
use crate::core::BehaviorParams;
use crate::core::InterruptType;
use crate::core::ItemStack;
use crate::core::ParamValue;
use crate::core::ResourceLevel;
use crate::core::ResumeToken;
use crate::core::RunId;
use crate::core::SessionState;
use crate::core::SkillLevel;
use crate::core::StateId;
use crate::core::Timestamp;
use crate::runtime::dataflow::PortWriter;

// ============================================================================
// SECTION: World View
// ============================================================================

/// Read-only view of the world queried by transition conditions.
pub trait WorldView {
    /// Returns the number of occupied inventory slots.
    fn occupied_slots(&self) -> u32;

    /// Returns named resources with current and base levels.
    fn resources(&self) -> &[ResourceLevel];

    /// Returns inventory item stacks.
    fn items(&self) -> &[ItemStack];

    /// Returns named skill levels.
    fn skills(&self) -> &[SkillLevel];
}

// ============================================================================
// SECTION: Interrupts
// ============================================================================

/// Asynchronous event reported by the host between loop iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Interrupt {
    /// Interrupt category.
    #[serde(rename = "type")]
    pub interrupt_type: InterruptType,
}

impl Interrupt {
    /// Creates an interrupt of the given type.
    #[must_use]
    pub const fn new(interrupt_type: InterruptType) -> Self {
        Self {
            interrupt_type,
        }
    }
}

// ============================================================================
// SECTION: Sub-Behaviors
// ============================================================================

/// Result of advancing a sub-behavior by one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The behavior has more work to do.
    Running,
    /// The behavior finished.
    Completed,
}

/// Sub-behavior failures reported by hosts.
///
/// # Invariants
/// - The interpreter never propagates these; a failure completes the state.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BehaviorError {
    /// Behavior parameters were missing or had the wrong type.
    #[error("invalid behavior parameters: {0}")]
    InvalidParams(String),
    /// Behavior failed while executing.
    #[error("behavior failed: {0}")]
    Failed(String),
}

/// Narrow capability view handed to a sub-behavior on each step.
///
/// Exposes the effective parameters for this drive and write access to the
/// active state's declared output ports only.
pub struct BehaviorContext<'a> {
    /// State running the behavior.
    state_id: &'a StateId,
    /// Effective parameters after data-flow resolution.
    params: &'a BehaviorParams,
    /// Output port writer scoped to the active state.
    ports: PortWriter<'a>,
    /// Loop iterations completed in the active state.
    ticks_in_state: u64,
}

impl<'a> BehaviorContext<'a> {
    /// Creates a context for one drive of the active state's behavior.
    #[must_use]
    pub const fn new(
        state_id: &'a StateId,
        params: &'a BehaviorParams,
        ports: PortWriter<'a>,
        ticks_in_state: u64,
    ) -> Self {
        Self {
            state_id,
            params,
            ports,
            ticks_in_state,
        }
    }

    /// Returns the active state identifier.
    #[must_use]
    pub const fn state_id(&self) -> &StateId {
        self.state_id
    }

    /// Returns the effective behavior parameters.
    #[must_use]
    pub const fn params(&self) -> &BehaviorParams {
        self.params
    }

    /// Returns a single effective parameter.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params.get(name)
    }

    /// Returns the output port writer for the active state.
    pub const fn ports(&mut self) -> &mut PortWriter<'a> {
        &mut self.ports
    }

    /// Returns loop iterations completed since the state was entered.
    #[must_use]
    pub const fn ticks_in_state(&self) -> u64 {
        self.ticks_in_state
    }
}

/// Resumable sub-routine run by a state, advanced one step at a time.
pub trait SubBehavior {
    /// Advances the behavior by one step.
    ///
    /// # Errors
    ///
    /// Returns [`BehaviorError`] when the behavior fails; the interpreter
    /// treats the failure as completion.
    fn step(&mut self, ctx: &mut BehaviorContext<'_>) -> Result<StepStatus, BehaviorError>;

    /// Captures progress before the run suspends.
    ///
    /// The returned token is stored on the session and passed back to
    /// [`BehaviorHost::resolve_behavior`] when the run resumes.
    fn pause(&mut self) -> Option<ResumeToken> {
        None
    }

    /// Releases the behavior when its state is left before completion.
    fn cancel(&mut self) {}
}

// ============================================================================
// SECTION: Behavior Host
// ============================================================================

/// Capabilities supplied by the agent host.
pub trait BehaviorHost {
    /// Resolves a behavior by registry name.
    ///
    /// Returns `None` when the name is not (yet) available; the interpreter
    /// retries after a wait. `resume` carries the token captured when the
    /// previous run suspended in this state.
    fn resolve_behavior(
        &mut self,
        name: &BehaviorName,
        params: &BehaviorParams,
        resume: Option<ResumeToken>,
    ) -> Option<Box<dyn SubBehavior>>;

    /// Waits for `ticks` host ticks; returns false when the run must stop.
    fn wait_ticks(&mut self, ticks: u32) -> bool;

    /// Returns the next pending interrupt, if any.
    fn poll_interrupt(&mut self) -> Option<Interrupt>;

    /// Returns the current world view, if one is available.
    fn world(&self) -> Option<&dyn WorldView>;

    /// Returns the current host time.
    fn now(&self) -> Timestamp;
}

// ============================================================================
// SECTION: Session Store
// ============================================================================

/// Session store errors.
///
/// # Invariants
/// - Variants are stable for programmatic handling.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Store reported an error.
    #[error("session store error: {0}")]
    Store(String),
}

/// Session persistence keyed by run identifier.
pub trait SessionStore {
    /// Loads the session recorded for a run.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when loading fails.
    fn load(&self, run_id: &RunId) -> Result<Option<SessionState>, StoreError>;

    /// Saves the session for a run, replacing any previous record.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when saving fails.
    fn save(&self, run_id: &RunId, session: &SessionState) -> Result<(), StoreError>;
}
