// crates/behavior-profile-core/tests/common/mod.rs
// =============================================================================
// Module: Behavior Profile Test Helpers
// Description: Shared builders for profile documents and scripted hosts.
// Purpose: Reduce duplication across integration tests for behavior-profile-core.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]
#![allow(clippy::expect_used, reason = "Test helpers fail loudly on bad fixtures.")]

use behavior_profile_core::BehaviorName;
use behavior_profile_core::BehaviorScript;
use behavior_profile_core::HostEvent;
use behavior_profile_core::HostScript;
use behavior_profile_core::InterruptType;
use behavior_profile_core::ParamValue;
use behavior_profile_core::Profile;
use behavior_profile_core::runtime::PortWriteScript;
use behavior_profile_core::runtime::ScheduledInterrupt;
use serde_json::Value;
use serde_json::json;

/// Parses a JSON profile document.
pub fn profile_from(value: Value) -> Profile {
    serde_json::from_value(value).expect("profile document")
}

/// Builds a state document with no handlers, ports, or bindings.
pub fn state(id: &str, behavior: &str) -> Value {
    json!({
        "id": id,
        "name": id,
        "behaviorName": behavior,
        "behaviorParams": {},
        "interruptHandlers": []
    })
}

/// Builds a transition document.
pub fn transition(id: &str, from: &str, to: &str, condition: Value, priority: i64) -> Value {
    json!({
        "id": id,
        "fromStateId": from,
        "toStateId": to,
        "condition": condition,
        "priority": priority
    })
}

/// Builds a profile document from states and transitions.
pub fn profile(initial: &str, states: Vec<Value>, transitions: Vec<Value>) -> Profile {
    profile_from(json!({
        "id": "profile-1",
        "name": "Test Profile",
        "initialStateId": initial,
        "states": states,
        "transitions": transitions,
        "dataConnections": []
    }))
}

/// Behavior that never completes.
pub fn endless() -> BehaviorScript {
    BehaviorScript::default()
}

/// Behavior that completes after `steps` steps.
pub fn finishes_after(steps: u32) -> BehaviorScript {
    BehaviorScript {
        steps_to_complete: Some(steps),
        ..BehaviorScript::default()
    }
}

/// Behavior that writes `value` to output port `port` on every step.
pub fn writes(port: &str, value: impl Into<ParamValue>, steps: Option<u32>) -> BehaviorScript {
    BehaviorScript {
        steps_to_complete: steps,
        writes: vec![PortWriteScript {
            port: port.to_string(),
            value: value.into(),
            at_step: None,
        }],
        ..BehaviorScript::default()
    }
}

/// Host script with the given behaviors and tick budget.
pub fn script(behaviors: Vec<(&str, BehaviorScript)>, max_ticks: u64) -> HostScript {
    HostScript {
        max_ticks,
        behaviors: behaviors
            .into_iter()
            .map(|(name, behavior)| (BehaviorName::new(name), behavior))
            .collect(),
        ..HostScript::default()
    }
}

/// Schedules an interrupt on a host script.
pub fn with_interrupt(mut script: HostScript, at_tick: u64, interrupt_type: InterruptType) -> HostScript {
    script.interrupts.push(ScheduledInterrupt {
        at_tick,
        interrupt_type,
    });
    script
}

/// Returns the `param` value seen by each step of `behavior`, in order.
pub fn params_seen(events: &[HostEvent], behavior: &str, param: &str) -> Vec<Option<ParamValue>> {
    events
        .iter()
        .filter_map(|event| match event {
            HostEvent::Stepped {
                behavior: name,
                params,
                ..
            } if name.as_str() == behavior => Some(params.get(param).cloned()),
            _ => None,
        })
        .collect()
}
