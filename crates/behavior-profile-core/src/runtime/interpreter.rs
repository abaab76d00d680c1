// crates/behavior-profile-core/src/runtime/interpreter.rs
// ============================================================================
// Module: Profile Interpreter
// Description: Cooperative, tick-driven run loop for behavior profiles.
// Purpose: Check interrupts, fire transitions, and drive sub-behaviors.
// Dependencies: crate::{core, interfaces, runtime}, tracing
// ============================================================================

//! ## Overview
//! The interpreter executes one profile against one [`SessionState`]. Each
//! loop iteration resolves the current state, handles at most one pending
//! interrupt, evaluates outgoing transitions by descending priority, then
//! advances the state's sub-behavior by a single step and waits on the host.
//!
//! Nothing escapes the loop as an error. Every failure path ends in a state
//! change, a suspension, or a logged continuation; [`Interpreter::run`]
//! returns a [`RunOutcome`] carrying the session to persist.
//!
//! Invariants:
//! - An explicitly configured `ignore` continues; a missing handler pauses.
//! - A host that denies a wait always receives the session back.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::core::HashDigest;
use crate::core::InterruptAction;
use crate::core::InterruptType;
use crate::core::Profile;
use crate::core::SessionState;
use crate::core::StateId;
use crate::core::StateSpec;
use crate::core::Timestamp;
use crate::core::TransitionId;
use crate::interfaces::BehaviorContext;
use crate::interfaces::BehaviorHost;
use crate::interfaces::StepStatus;
use crate::interfaces::SubBehavior;
use crate::runtime::condition::evaluate_condition;
use crate::runtime::dataflow::PortWriter;
use crate::runtime::dataflow::resolve_params;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Tick budgets used when the interpreter waits on the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Ticks to wait before retrying an unresolvable behavior.
    pub retry_wait_ticks: u32,
    /// Ticks to wait per iteration once the sub-behavior has completed.
    pub idle_wait_ticks: u32,
    /// Ticks to yield after driving a running sub-behavior.
    pub yield_ticks: u32,
    /// Consecutive state changes allowed before yielding to the host.
    pub max_transitions_per_tick: u32,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self {
            retry_wait_ticks: 20,
            idle_wait_ticks: 5,
            yield_ticks: 1,
            max_transitions_per_tick: 64,
        }
    }
}

// ============================================================================
// SECTION: Run Results
// ============================================================================

/// Why a run returned control to the host with a resumable session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuspendReason {
    /// An interrupt was paused, explicitly or by the missing-handler default.
    Interrupt(InterruptType),
    /// The host denied a tick wait.
    HostDenied,
}

/// Final status of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunStatus {
    /// The session has no current state.
    Idle,
    /// Control returned to the host; the session can be resumed.
    Suspended {
        /// Suspension cause.
        reason: SuspendReason,
    },
    /// The current state does not exist in the profile.
    Terminated {
        /// Unresolvable state identifier.
        state_id: StateId,
    },
}

impl RunStatus {
    /// Returns a short label for logs and reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Suspended {
                ..
            } => "suspended",
            Self::Terminated {
                ..
            } => "terminated",
        }
    }
}

/// What caused a state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ChangeCause {
    /// A transition condition fired.
    Transition(TransitionId),
    /// An interrupt handler redirected the run.
    Interrupt(InterruptType),
}

/// Recorded state change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateChange {
    /// State that was left.
    pub from: StateId,
    /// State that was entered.
    pub to: StateId,
    /// Change cause.
    pub cause: ChangeCause,
    /// Host time of the change.
    pub at: Timestamp,
    /// Ticks spent in the state that was left.
    pub tick: u64,
}

/// Result of a run: status, session to persist, and state change history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunOutcome {
    /// Final run status.
    pub status: RunStatus,
    /// Session state to persist and pass back on resume.
    pub session: SessionState,
    /// State changes made during the run, in order.
    pub history: Vec<StateChange>,
}

/// Control flow after one loop iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepFlow {
    /// Run another iteration.
    Continue,
    /// Stop and return the status to the host.
    Exit(RunStatus),
}

// ============================================================================
// SECTION: Execution
// ============================================================================

/// In-flight run: the session plus the live sub-behavior handle.
pub struct Execution {
    /// Session owned by this run.
    session: SessionState,
    /// Sub-behavior running in the current state.
    active: Option<Box<dyn SubBehavior>>,
    /// State changes made so far.
    history: Vec<StateChange>,
    /// State changes since the last host wait.
    changes_since_wait: u32,
}

impl Execution {
    /// Returns the session as it stands.
    #[must_use]
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    /// Returns state changes made so far.
    #[must_use]
    pub fn history(&self) -> &[StateChange] {
        &self.history
    }

    /// Releases the live sub-behavior and returns the run outcome.
    #[must_use]
    pub fn finish(mut self, status: RunStatus) -> RunOutcome {
        if let Some(mut handle) = self.active.take() {
            handle.cancel();
        }
        RunOutcome {
            status,
            session: self.session,
            history: self.history,
        }
    }

    /// Pauses the live sub-behavior into the session and exits.
    fn suspend(&mut self, reason: SuspendReason) -> StepFlow {
        if let Some(mut handle) = self.active.take() {
            self.session.resume_token = handle.pause();
        }
        StepFlow::Exit(RunStatus::Suspended {
            reason,
        })
    }

    /// Cancels the live sub-behavior and enters `target`.
    fn enter(&mut self, from: &StateId, target: &StateId, cause: ChangeCause, now: Timestamp) {
        if let Some(mut handle) = self.active.take() {
            handle.cancel();
        }
        tracing::debug!(from = %from, to = %target, tick = self.session.ticks_in_state, "state change");
        self.history.push(StateChange {
            from: from.clone(),
            to: target.clone(),
            cause,
            at: now,
            tick: self.session.ticks_in_state,
        });
        self.session.enter_state(target.clone(), now);
        self.changes_since_wait = self.changes_since_wait.saturating_add(1);
    }
}

// ============================================================================
// SECTION: Interpreter
// ============================================================================

/// Reaction chosen for a pending interrupt.
enum InterruptReaction {
    /// Enter the handler's target state.
    Enter(StateId),
    /// Suspend the run.
    Pause,
    /// Continue as if nothing happened.
    Ignore,
}

/// Interpreter for a single, immutable profile.
pub struct Interpreter<'p> {
    /// Profile being executed.
    profile: &'p Profile,
    /// Tick budgets.
    config: InterpreterConfig,
    /// Canonical profile hash, when computable.
    profile_hash: Option<HashDigest>,
}

impl<'p> Interpreter<'p> {
    /// Creates an interpreter, logging references that will be skipped at run time.
    #[must_use]
    pub fn new(profile: &'p Profile, config: InterpreterConfig) -> Self {
        let profile_hash = match profile.canonical_hash() {
            Ok(digest) => Some(digest),
            Err(err) => {
                tracing::warn!(profile_id = %profile.id, error = %err, "profile hash unavailable");
                None
            }
        };
        for transition in &profile.transitions {
            if !transition.condition.is_supported() {
                tracing::warn!(
                    transition_id = %transition.id,
                    condition = transition.condition.kind(),
                    "unsupported condition; transition will never fire"
                );
            }
            if profile.state(&transition.to_state_id).is_none() {
                tracing::warn!(
                    transition_id = %transition.id,
                    state_id = %transition.to_state_id,
                    "transition targets unknown state; it will be skipped"
                );
            }
        }
        Self {
            profile,
            config,
            profile_hash,
        }
    }

    /// Returns the profile being executed.
    #[must_use]
    pub const fn profile(&self) -> &'p Profile {
        self.profile
    }

    /// Returns the canonical hash of the profile, when computable.
    #[must_use]
    pub const fn profile_hash(&self) -> Option<&HashDigest> {
        self.profile_hash.as_ref()
    }

    /// Creates a fresh session positioned on the profile's initial state.
    #[must_use]
    pub fn start_session(&self, now: Timestamp) -> SessionState {
        let mut session = SessionState::new(self.profile.initial_state_id.clone(), now);
        session.profile_hash.clone_from(&self.profile_hash);
        session
    }

    /// Prepares an execution from a stored session or a fresh one.
    #[must_use]
    pub fn begin(&self, session: Option<SessionState>, now: Timestamp) -> Execution {
        let session = match session {
            Some(mut session) => {
                match (&session.profile_hash, &self.profile_hash) {
                    (Some(stored), Some(current)) if stored != current => {
                        tracing::warn!(
                            profile_id = %self.profile.id,
                            stored = %stored.value,
                            current = %current.value,
                            "session was started against a different profile revision"
                        );
                    }
                    (None, Some(current)) => session.profile_hash = Some(current.clone()),
                    _ => {}
                }
                session
            }
            None => self.start_session(now),
        };
        Execution {
            session,
            active: None,
            history: Vec::new(),
            changes_since_wait: 0,
        }
    }

    /// Runs until the session suspends, idles, or terminates.
    pub fn run<H: BehaviorHost + ?Sized>(
        &self,
        host: &mut H,
        session: Option<SessionState>,
    ) -> RunOutcome {
        let mut execution = self.begin(session, host.now());
        tracing::info!(
            profile_id = %self.profile.id,
            state_id = execution.session.current_state_id.as_ref().map_or("-", StateId::as_str),
            "run started"
        );
        loop {
            if let StepFlow::Exit(status) = self.step(host, &mut execution) {
                tracing::info!(
                    profile_id = %self.profile.id,
                    status = status.as_str(),
                    changes = execution.history.len(),
                    "run exited"
                );
                return execution.finish(status);
            }
        }
    }

    /// Executes one iteration of the run loop.
    pub fn step<H: BehaviorHost + ?Sized>(
        &self,
        host: &mut H,
        execution: &mut Execution,
    ) -> StepFlow {
        let Some(state_id) = execution.session.current_state_id.clone() else {
            tracing::info!(profile_id = %self.profile.id, "no current state; run is idle");
            return StepFlow::Exit(RunStatus::Idle);
        };
        let Some(state) = self.profile.state(&state_id) else {
            tracing::error!(state_id = %state_id, "current state does not exist; terminating");
            return StepFlow::Exit(RunStatus::Terminated {
                state_id,
            });
        };

        if execution.changes_since_wait >= self.config.max_transitions_per_tick {
            tracing::debug!(state_id = %state.id, "state change budget spent; yielding");
            execution.changes_since_wait = 0;
            if !host.wait_ticks(self.config.yield_ticks) {
                return execution.suspend(SuspendReason::HostDenied);
            }
        }

        if let Some(interrupt) = host.poll_interrupt() {
            let interrupt_type = interrupt.interrupt_type;
            match self.interrupt_reaction(state, interrupt_type) {
                InterruptReaction::Enter(target) => {
                    let now = host.now();
                    execution.enter(&state.id, &target, ChangeCause::Interrupt(interrupt_type), now);
                    return StepFlow::Continue;
                }
                InterruptReaction::Pause => {
                    tracing::info!(state_id = %state.id, interrupt = %interrupt_type, "pausing on interrupt");
                    return execution.suspend(SuspendReason::Interrupt(interrupt_type));
                }
                InterruptReaction::Ignore => {
                    tracing::debug!(state_id = %state.id, interrupt = %interrupt_type, "interrupt ignored");
                }
            }
        }

        let now = host.now();
        for transition in self.profile.outgoing_transitions(&state.id) {
            if self.profile.state(&transition.to_state_id).is_none() {
                continue;
            }
            if evaluate_condition(&transition.condition, host.world(), &execution.session, now) {
                execution.enter(
                    &state.id,
                    &transition.to_state_id,
                    ChangeCause::Transition(transition.id.clone()),
                    now,
                );
                return StepFlow::Continue;
            }
        }

        let wait = if execution.session.sub_behavior_complete {
            self.config.idle_wait_ticks
        } else {
            self.drive(host, state, execution)
        };

        execution.changes_since_wait = 0;
        if !host.wait_ticks(wait) {
            return execution.suspend(SuspendReason::HostDenied);
        }
        execution.session.ticks_in_state = execution.session.ticks_in_state.saturating_add(1);
        StepFlow::Continue
    }

    /// Advances the state's sub-behavior once and returns the ticks to wait.
    fn drive<H: BehaviorHost + ?Sized>(
        &self,
        host: &mut H,
        state: &StateSpec,
        execution: &mut Execution,
    ) -> u32 {
        let params = resolve_params(self.profile, state, &execution.session);
        if execution.active.is_none() {
            let resume = execution.session.resume_token.clone();
            let Some(handle) = host.resolve_behavior(&state.behavior_name, &params, resume) else {
                tracing::warn!(
                    state_id = %state.id,
                    behavior = %state.behavior_name,
                    retry_ticks = self.config.retry_wait_ticks,
                    "behavior not resolvable; retrying after wait"
                );
                return self.config.retry_wait_ticks;
            };
            execution.session.resume_token = None;
            execution.active = Some(handle);
        }
        let Some(handle) = execution.active.as_mut() else {
            return self.config.retry_wait_ticks;
        };

        let ticks_in_state = execution.session.ticks_in_state;
        let ports = PortWriter::new(state, &mut execution.session.port_values);
        let mut ctx = BehaviorContext::new(&state.id, &params, ports, ticks_in_state);
        match handle.step(&mut ctx) {
            Ok(StepStatus::Running) => return self.config.yield_ticks,
            Ok(StepStatus::Completed) => {
                tracing::debug!(state_id = %state.id, behavior = %state.behavior_name, "behavior completed");
            }
            Err(err) => {
                tracing::warn!(
                    state_id = %state.id,
                    behavior = %state.behavior_name,
                    error = %err,
                    "behavior failed; treating as completed"
                );
            }
        }
        execution.session.sub_behavior_complete = true;
        execution.active = None;
        self.config.yield_ticks
    }

    /// Chooses the reaction to an interrupt in `state`.
    fn interrupt_reaction(&self, state: &StateSpec, interrupt_type: InterruptType) -> InterruptReaction {
        if interrupt_type == InterruptType::Unrecognized {
            tracing::warn!(state_id = %state.id, "unrecognized interrupt; pausing");
            return InterruptReaction::Pause;
        }
        let Some(handler) = state.handler_for(interrupt_type) else {
            tracing::warn!(state_id = %state.id, interrupt = %interrupt_type, "no handler configured; pausing");
            return InterruptReaction::Pause;
        };
        match handler.action {
            InterruptAction::Ignore => InterruptReaction::Ignore,
            InterruptAction::Pause => InterruptReaction::Pause,
            InterruptAction::Transition => match &handler.target_state_id {
                Some(target) if self.profile.state(target).is_some() => {
                    InterruptReaction::Enter(target.clone())
                }
                Some(target) => {
                    tracing::warn!(
                        state_id = %state.id,
                        interrupt = %interrupt_type,
                        target = %target,
                        "interrupt target does not exist; pausing"
                    );
                    InterruptReaction::Pause
                }
                None => {
                    tracing::warn!(
                        state_id = %state.id,
                        interrupt = %interrupt_type,
                        "interrupt transition has no target; pausing"
                    );
                    InterruptReaction::Pause
                }
            },
            InterruptAction::Unrecognized => {
                tracing::warn!(state_id = %state.id, interrupt = %interrupt_type, "unrecognized interrupt action; pausing");
                InterruptReaction::Pause
            }
        }
    }
}
