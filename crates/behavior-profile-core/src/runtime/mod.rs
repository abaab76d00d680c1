// crates/behavior-profile-core/src/runtime/mod.rs
// ============================================================================
// Module: Behavior Profile Runtime
// Description: Condition evaluation, data flow, interpreter, and helpers.
// Purpose: Execute behavior profiles against host-supplied capabilities.
// Dependencies: crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Runtime modules implement the interpreter loop and the pure helpers it is
//! built from. The scripted host and in-memory store are deterministic
//! implementations of the host interfaces for simulation and tests.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod condition;
pub mod dataflow;
pub mod interpreter;
pub mod runner;
pub mod scripted;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use condition::HEALTH_RESOURCE_NAMES;
pub use condition::INVENTORY_CAPACITY;
pub use condition::evaluate_condition;
pub use dataflow::PortWriter;
pub use dataflow::resolve_params;
pub use interpreter::ChangeCause;
pub use interpreter::Execution;
pub use interpreter::Interpreter;
pub use interpreter::InterpreterConfig;
pub use interpreter::RunOutcome;
pub use interpreter::RunStatus;
pub use interpreter::StateChange;
pub use interpreter::StepFlow;
pub use interpreter::SuspendReason;
pub use runner::ProfileRunner;
pub use runner::RunnerError;
pub use scripted::BehaviorScript;
pub use scripted::HostEvent;
pub use scripted::HostScript;
pub use scripted::PortWriteScript;
pub use scripted::ScheduledInterrupt;
pub use scripted::ScriptedHost;
pub use scripted::WorldFrame;
pub use store::InMemorySessionStore;
