// crates/behavior-profile-core/src/lib.rs
// ============================================================================
// Module: Behavior Profile Core Library
// Description: Public API surface for the behavior profile runtime.
// Purpose: Expose document types, host interfaces, and runtime helpers.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Behavior profile core executes declaratively authored state machines that
//! drive an autonomous agent. Profiles describe states, prioritized
//! transitions, interrupt handlers, and typed data-flow connections; the
//! runtime interprets them one host tick at a time and suspends into a
//! serializable session whenever the host stops granting ticks.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::BehaviorContext;
pub use interfaces::BehaviorError;
pub use interfaces::BehaviorHost;
pub use interfaces::Interrupt;
pub use interfaces::SessionStore;
pub use interfaces::StepStatus;
pub use interfaces::StoreError;
pub use interfaces::SubBehavior;
pub use interfaces::WorldView;
pub use runtime::BehaviorScript;
pub use runtime::ChangeCause;
pub use runtime::Execution;
pub use runtime::HostEvent;
pub use runtime::HostScript;
pub use runtime::InMemorySessionStore;
pub use runtime::Interpreter;
pub use runtime::InterpreterConfig;
pub use runtime::PortWriter;
pub use runtime::ProfileRunner;
pub use runtime::RunOutcome;
pub use runtime::RunStatus;
pub use runtime::RunnerError;
pub use runtime::ScriptedHost;
pub use runtime::StateChange;
pub use runtime::StepFlow;
pub use runtime::SuspendReason;
pub use runtime::evaluate_condition;
pub use runtime::resolve_params;
