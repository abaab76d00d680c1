// crates/behavior-profile-core/src/core/profile.rs
// ============================================================================
// Module: Behavior Profile Document
// Description: States, transitions, interrupt handlers, ports, and connections.
// Purpose: Define the profile document exchanged with editors and storage.
// Dependencies: crate::core::{condition, hashing, identifiers, params}, serde
// ============================================================================

//! ## Overview
//! A profile is the whole program executed by the interpreter. Field names
//! are camelCase to match the document produced by the profile editor.
//!
//! The runtime tolerates dangling references: a transition, connection, or
//! interrupt target that does not resolve is skipped at run time.
//! [`Profile::validate`] is the strict, authoring-time counterpart that
//! rejects those documents up front.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cmp::Reverse;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::condition::Condition;
use crate::core::hashing::HashDigest;
use crate::core::hashing::HashError;
use crate::core::hashing::hash_canonical_json;
use crate::core::identifiers::BehaviorName;
use crate::core::identifiers::ConnectionId;
use crate::core::identifiers::PortId;
use crate::core::identifiers::ProfileId;
use crate::core::identifiers::StateId;
use crate::core::identifiers::TransitionId;
use crate::core::params::BehaviorParams;

// ============================================================================
// SECTION: Profile
// ============================================================================

/// Complete behavior profile document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Profile identifier.
    pub id: ProfileId,
    /// Display name.
    pub name: String,
    /// Optional free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// State entered when a new session starts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_state_id: Option<StateId>,
    /// States in declaration order.
    pub states: Vec<StateSpec>,
    /// Transitions in declaration order.
    #[serde(default)]
    pub transitions: Vec<Transition>,
    /// Data-flow connections between state ports.
    #[serde(default)]
    pub data_connections: Vec<DataConnection>,
}

impl Profile {
    /// Returns the state with the given identifier.
    #[must_use]
    pub fn state(&self, state_id: &StateId) -> Option<&StateSpec> {
        self.states.iter().find(|state| &state.id == state_id)
    }

    /// Returns transitions leaving a state, highest priority first.
    ///
    /// Equal priorities keep declaration order.
    #[must_use]
    pub fn outgoing_transitions(&self, state_id: &StateId) -> Vec<&Transition> {
        let mut outgoing: Vec<&Transition> = self
            .transitions
            .iter()
            .filter(|transition| &transition.from_state_id == state_id)
            .collect();
        outgoing.sort_by_key(|transition| Reverse(transition.priority));
        outgoing
    }

    /// Returns connections whose destination is the given input port.
    pub fn connections_into<'a>(
        &'a self,
        state_id: &'a StateId,
        port_id: &'a PortId,
    ) -> impl Iterator<Item = &'a DataConnection> + 'a {
        self.data_connections.iter().filter(move |connection| {
            &connection.to_state_id == state_id && &connection.to_port_id == port_id
        })
    }

    /// Computes the canonical hash of the profile document.
    ///
    /// # Errors
    ///
    /// Returns [`HashError::Canonicalization`] when serialization fails.
    pub fn canonical_hash(&self) -> Result<HashDigest, HashError> {
        hash_canonical_json(self)
    }

    /// Validates the profile for authoring-time consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError`] describing the first violation found.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.states.is_empty() {
            return Err(ProfileError::MissingStates);
        }
        ensure_unique_state_ids(&self.states)?;
        ensure_unique_transition_ids(&self.transitions)?;
        ensure_unique_connection_ids(&self.data_connections)?;
        let initial = self.initial_state_id.as_ref().ok_or(ProfileError::MissingInitialState)?;
        if self.state(initial).is_none() {
            return Err(ProfileError::UnknownInitialState(initial.to_string()));
        }
        for state in &self.states {
            ensure_state_well_formed(self, state)?;
        }
        ensure_transitions_resolve(self)?;
        ensure_connections_well_formed(self)?;
        Ok(())
    }
}

// ============================================================================
// SECTION: States
// ============================================================================

/// State specification: which behavior runs and how the state reacts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateSpec {
    /// State identifier.
    pub id: StateId,
    /// Display name.
    pub name: String,
    /// Behavior registry key run while the state is active.
    pub behavior_name: BehaviorName,
    /// Literal behavior parameters.
    #[serde(default)]
    pub behavior_params: BehaviorParams,
    /// Interrupt handlers, at most one per interrupt type.
    #[serde(default)]
    pub interrupt_handlers: Vec<InterruptHandler>,
    /// Data ports declared on the state.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ports: Vec<Port>,
    /// Parameter bindings fed by input ports.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub param_bindings: Vec<ParamBinding>,
}

impl StateSpec {
    /// Returns the port with the given identifier.
    #[must_use]
    pub fn port(&self, port_id: &PortId) -> Option<&Port> {
        self.ports.iter().find(|port| &port.id == port_id)
    }

    /// Returns the output port with the given display name.
    #[must_use]
    pub fn output_port_named(&self, name: &str) -> Option<&Port> {
        self.ports.iter().find(|port| port.side == PortSide::Output && port.name == name)
    }

    /// Returns the handler configured for an interrupt type.
    #[must_use]
    pub fn handler_for(&self, interrupt_type: InterruptType) -> Option<&InterruptHandler> {
        self.interrupt_handlers.iter().find(|handler| handler.interrupt_type == interrupt_type)
    }
}

/// Data port declared on a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Port {
    /// Port identifier.
    pub id: PortId,
    /// Port name used by behaviors when writing outputs.
    pub name: String,
    /// Port direction.
    pub side: PortSide,
    /// Type of values carried by the port.
    pub value_type: ValueType,
}

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortSide {
    /// Receives values from a connected output port.
    Input,
    /// Publishes values written by the state's behavior.
    Output,
}

/// Type of values carried by a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    /// Player name.
    Player,
    /// Numeric value.
    Number,
    /// Item name.
    Item,
    /// Encoded location.
    Location,
    /// Free text.
    Text,
    /// Value type the runtime does not recognize; compatible with nothing.
    #[serde(other)]
    Unrecognized,
}

impl ValueType {
    /// Returns true when values of `self` may flow into a port of `other`.
    #[must_use]
    pub fn accepts(self, other: Self) -> bool {
        self == other && self != Self::Unrecognized
    }
}

/// Binding of a behavior parameter to an input port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamBinding {
    /// Behavior parameter overwritten by the port value.
    pub param_name: String,
    /// Input port on the same state.
    pub port_id: PortId,
}

// ============================================================================
// SECTION: Interrupts
// ============================================================================

/// Interrupt categories raised by hosts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptType {
    /// The agent was attacked or entered combat.
    Combat,
    /// Health dropped below the host's alarm threshold.
    LowHealth,
    /// Another player came within range.
    PlayerNearby,
    /// A chat command addressed to the agent arrived.
    ChatCommand,
    /// The agent died.
    Death,
    /// The inventory has no free slots.
    InventoryFull,
    /// Interrupt type the runtime does not recognize.
    #[serde(other)]
    Unrecognized,
}

impl InterruptType {
    /// Returns the document spelling of the interrupt type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Combat => "combat",
            Self::LowHealth => "low_health",
            Self::PlayerNearby => "player_nearby",
            Self::ChatCommand => "chat_command",
            Self::Death => "death",
            Self::InventoryFull => "inventory_full",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl std::fmt::Display for InterruptType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reaction configured for an interrupt type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterruptAction {
    /// Switch to the handler's target state.
    Transition,
    /// Suspend the run and return control to the host.
    Pause,
    /// Continue as if the interrupt had not occurred.
    Ignore,
    /// Action the runtime does not recognize; handled like a missing handler.
    #[serde(other)]
    Unrecognized,
}

/// Interrupt handler slot on a state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterruptHandler {
    /// Interrupt type handled by this slot.
    pub interrupt_type: InterruptType,
    /// Configured reaction.
    pub action: InterruptAction,
    /// Target state for [`InterruptAction::Transition`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_state_id: Option<StateId>,
}

// ============================================================================
// SECTION: Transitions and Connections
// ============================================================================

/// Prioritized, conditional edge between two states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transition {
    /// Transition identifier.
    pub id: TransitionId,
    /// Source state.
    pub from_state_id: StateId,
    /// Destination state.
    pub to_state_id: StateId,
    /// Condition that fires the transition.
    pub condition: Condition,
    /// Evaluation priority; higher values are evaluated first.
    #[serde(default)]
    pub priority: i64,
    /// Optional display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Data-flow edge from an output port to an input port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataConnection {
    /// Connection identifier.
    pub id: ConnectionId,
    /// State owning the source port.
    pub from_state_id: StateId,
    /// Source output port.
    pub from_port_id: PortId,
    /// State owning the destination port.
    pub to_state_id: StateId,
    /// Destination input port.
    pub to_port_id: PortId,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Profile validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProfileError {
    /// Profile declares no states.
    #[error("profile must define at least one state")]
    MissingStates,
    /// Profile declares no initial state.
    #[error("profile must declare an initial state")]
    MissingInitialState,
    /// Initial state does not resolve.
    #[error("initial state refers to unknown state: {0}")]
    UnknownInitialState(String),
    /// Duplicate state identifiers detected.
    #[error("duplicate state identifier: {0}")]
    DuplicateStateId(String),
    /// Duplicate transition identifiers detected.
    #[error("duplicate transition identifier: {0}")]
    DuplicateTransitionId(String),
    /// Duplicate connection identifiers detected.
    #[error("duplicate connection identifier: {0}")]
    DuplicateConnectionId(String),
    /// Duplicate port identifiers detected.
    #[error("duplicate port identifier: {0}")]
    DuplicatePortId(String),
    /// Transition endpoint does not resolve.
    #[error("transition {transition} refers to unknown state: {state}")]
    UnknownTransitionEndpoint {
        /// Transition identifier.
        transition: String,
        /// Unresolved state identifier.
        state: String,
    },
    /// Transition condition is unrecognized or uses an unsupported operator.
    #[error("transition {transition} has unsupported condition: {kind}")]
    UnsupportedCondition {
        /// Transition identifier.
        transition: String,
        /// Condition variant tag.
        kind: String,
    },
    /// Interrupt handler is malformed.
    #[error("state {state} has invalid interrupt handler for {interrupt}: {reason}")]
    InvalidInterruptHandler {
        /// State identifier.
        state: String,
        /// Interrupt type.
        interrupt: String,
        /// Failure description.
        reason: String,
    },
    /// Parameter binding is malformed.
    #[error("state {state} has invalid binding for parameter {param}: {reason}")]
    InvalidBinding {
        /// State identifier.
        state: String,
        /// Parameter name.
        param: String,
        /// Failure description.
        reason: String,
    },
    /// Data connection is malformed.
    #[error("connection {connection} is invalid: {reason}")]
    InvalidConnection {
        /// Connection identifier.
        connection: String,
        /// Failure description.
        reason: String,
    },
}

// ============================================================================
// SECTION: Validation Helpers
// ============================================================================

/// Ensures state identifiers are unique within the profile.
fn ensure_unique_state_ids(states: &[StateSpec]) -> Result<(), ProfileError> {
    let mut seen = BTreeSet::new();
    for state in states {
        if !seen.insert(&state.id) {
            return Err(ProfileError::DuplicateStateId(state.id.to_string()));
        }
    }
    Ok(())
}

/// Ensures transition identifiers are unique within the profile.
fn ensure_unique_transition_ids(transitions: &[Transition]) -> Result<(), ProfileError> {
    let mut seen = BTreeSet::new();
    for transition in transitions {
        if !seen.insert(&transition.id) {
            return Err(ProfileError::DuplicateTransitionId(transition.id.to_string()));
        }
    }
    Ok(())
}

/// Ensures connection identifiers are unique within the profile.
fn ensure_unique_connection_ids(connections: &[DataConnection]) -> Result<(), ProfileError> {
    let mut seen = BTreeSet::new();
    for connection in connections {
        if !seen.insert(&connection.id) {
            return Err(ProfileError::DuplicateConnectionId(connection.id.to_string()));
        }
    }
    Ok(())
}

/// Checks ports, interrupt handlers, and bindings of a single state.
fn ensure_state_well_formed(profile: &Profile, state: &StateSpec) -> Result<(), ProfileError> {
    let mut port_ids = BTreeSet::new();
    for port in &state.ports {
        if !port_ids.insert(&port.id) {
            return Err(ProfileError::DuplicatePortId(port.id.to_string()));
        }
    }

    let mut handled = BTreeSet::new();
    for handler in &state.interrupt_handlers {
        let invalid = |reason: &str| ProfileError::InvalidInterruptHandler {
            state: state.id.to_string(),
            interrupt: handler.interrupt_type.to_string(),
            reason: reason.to_string(),
        };
        if handler.interrupt_type == InterruptType::Unrecognized {
            return Err(invalid("unrecognized interrupt type"));
        }
        if !handled.insert(handler.interrupt_type) {
            return Err(invalid("duplicate handler"));
        }
        match handler.action {
            InterruptAction::Transition => {
                let target = handler
                    .target_state_id
                    .as_ref()
                    .ok_or_else(|| invalid("transition action requires targetStateId"))?;
                if profile.state(target).is_none() {
                    return Err(invalid(&format!("unknown target state {target}")));
                }
            }
            InterruptAction::Pause | InterruptAction::Ignore => {}
            InterruptAction::Unrecognized => return Err(invalid("unrecognized action")),
        }
    }

    for binding in &state.param_bindings {
        let invalid = |reason: &str| ProfileError::InvalidBinding {
            state: state.id.to_string(),
            param: binding.param_name.clone(),
            reason: reason.to_string(),
        };
        let port = state
            .port(&binding.port_id)
            .ok_or_else(|| invalid(&format!("port {} is not declared on the state", binding.port_id)))?;
        if port.side != PortSide::Input {
            return Err(invalid(&format!("port {} is not an input port", port.id)));
        }
    }
    Ok(())
}

/// Ensures transition endpoints resolve and conditions are supported.
fn ensure_transitions_resolve(profile: &Profile) -> Result<(), ProfileError> {
    for transition in &profile.transitions {
        for endpoint in [&transition.from_state_id, &transition.to_state_id] {
            if profile.state(endpoint).is_none() {
                return Err(ProfileError::UnknownTransitionEndpoint {
                    transition: transition.id.to_string(),
                    state: endpoint.to_string(),
                });
            }
        }
        if !transition.condition.is_supported() {
            return Err(ProfileError::UnsupportedCondition {
                transition: transition.id.to_string(),
                kind: transition.condition.kind().to_string(),
            });
        }
    }
    Ok(())
}

/// Ensures connections join an output to a single compatible input.
fn ensure_connections_well_formed(profile: &Profile) -> Result<(), ProfileError> {
    let mut connected_inputs = BTreeSet::new();
    for connection in &profile.data_connections {
        let invalid = |reason: String| ProfileError::InvalidConnection {
            connection: connection.id.to_string(),
            reason,
        };
        let source = profile
            .state(&connection.from_state_id)
            .and_then(|state| state.port(&connection.from_port_id))
            .ok_or_else(|| invalid(format!("unknown source port {}", connection.from_port_id)))?;
        let destination = profile
            .state(&connection.to_state_id)
            .and_then(|state| state.port(&connection.to_port_id))
            .ok_or_else(|| invalid(format!("unknown destination port {}", connection.to_port_id)))?;
        if source.side != PortSide::Output {
            return Err(invalid(format!("source port {} is not an output", source.id)));
        }
        if destination.side != PortSide::Input {
            return Err(invalid(format!("destination port {} is not an input", destination.id)));
        }
        if !source.value_type.accepts(destination.value_type) {
            return Err(invalid("port value types differ".to_string()));
        }
        if !connected_inputs.insert((&connection.to_state_id, &connection.to_port_id)) {
            return Err(invalid(format!(
                "input port {} already has a connection",
                connection.to_port_id
            )));
        }
    }
    Ok(())
}
