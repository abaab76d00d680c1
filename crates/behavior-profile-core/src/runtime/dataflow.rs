// crates/behavior-profile-core/src/runtime/dataflow.rs
// ============================================================================
// Module: Data-Flow Resolver
// Description: Port-bound parameter overlay and scoped output port writes.
// Purpose: Pass typed values between states through data connections.
// Dependencies: crate::core, tracing
// ============================================================================

//! ## Overview
//! Literal behavior parameters are the baseline. A parameter bound to an input
//! port is overwritten only when the connection feeding that port is
//! well-formed and its source output port has recorded a value during the run.
//! Bindings never remove a literal or introduce a missing value.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::BehaviorParams;
use crate::core::DataConnection;
use crate::core::ParamValue;
use crate::core::PortId;
use crate::core::PortSide;
use crate::core::PortValues;
use crate::core::Profile;
use crate::core::SessionState;
use crate::core::StateId;
use crate::core::StateSpec;
use crate::core::ValueType;

// ============================================================================
// SECTION: Parameter Resolution
// ============================================================================

/// Computes the effective parameters for a state's behavior.
#[must_use]
pub fn resolve_params(
    profile: &Profile,
    state: &StateSpec,
    session: &SessionState,
) -> BehaviorParams {
    let mut params = state.behavior_params.clone();
    for binding in &state.param_bindings {
        let Some(port) = state.port(&binding.port_id) else {
            tracing::debug!(
                state_id = %state.id,
                port_id = %binding.port_id,
                "binding refers to undeclared port"
            );
            continue;
        };
        if port.side != PortSide::Input {
            continue;
        }
        let mut feeding = profile.connections_into(&state.id, &port.id);
        let Some(connection) = feeding.next() else {
            continue;
        };
        if feeding.next().is_some() {
            tracing::debug!(
                state_id = %state.id,
                port_id = %port.id,
                connection_id = %connection.id,
                "input port has several connections; using the first declared"
            );
        }
        let Some((source_state_id, source_port_id)) =
            compatible_source(profile, connection, port.value_type)
        else {
            continue;
        };
        if let Some(value) = session.port_value(source_state_id, source_port_id) {
            params.insert(binding.param_name.clone(), value.clone());
        }
    }
    params
}

/// Returns the source state and port of a connection when it feeds from a
/// type-compatible output.
fn compatible_source<'a>(
    profile: &'a Profile,
    connection: &DataConnection,
    destination_type: ValueType,
) -> Option<(&'a StateId, &'a PortId)> {
    let source_state = profile.state(&connection.from_state_id)?;
    let source = source_state.port(&connection.from_port_id)?;
    if source.side != PortSide::Output || !source.value_type.accepts(destination_type) {
        return None;
    }
    Some((&source_state.id, &source.id))
}

// ============================================================================
// SECTION: Port Writer
// ============================================================================

/// Output port access scoped to the active state.
///
/// # Invariants
/// - Only ports declared on the active state with side `output` are written.
/// - Values land under the active state's id, never another state's.
pub struct PortWriter<'a> {
    /// Active state.
    state: &'a StateSpec,
    /// Run-wide port values owned by the session.
    values: &'a mut PortValues,
}

impl<'a> PortWriter<'a> {
    /// Creates a writer for `state` backed by the session's port values.
    #[must_use]
    pub const fn new(state: &'a StateSpec, values: &'a mut PortValues) -> Self {
        Self {
            state,
            values,
        }
    }

    /// Writes a value to the active state's output port named `name`.
    ///
    /// Returns false, writing nothing, when no such output port exists.
    pub fn set_output(&mut self, name: &str, value: impl Into<ParamValue>) -> bool {
        let Some(port) = self.state.output_port_named(name) else {
            tracing::debug!(state_id = %self.state.id, port = name, "ignoring write to unknown output port");
            return false;
        };
        self.values
            .entry(self.state.id.clone())
            .or_default()
            .insert(port.id.clone(), value.into());
        true
    }

    /// Returns the last value written on the active state's output port `name`.
    #[must_use]
    pub fn output(&self, name: &str) -> Option<&ParamValue> {
        let port = self.state.output_port_named(name)?;
        self.values.get(&self.state.id)?.get(&port.id)
    }
}
