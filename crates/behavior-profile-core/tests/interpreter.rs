// crates/behavior-profile-core/tests/interpreter.rs
// ============================================================================
// Module: Interpreter Scenario Tests
// Description: End-to-end runs of profiles against the scripted host.
// Purpose: Validate transitions, interrupts, data flow, waits, and suspension.
// Dependencies: behavior-profile-core, serde_json
// ============================================================================
//! ## Overview
//! Each test drives a small profile through the [`ScriptedHost`] and checks
//! the resulting status, session, state change history, and host events.

#![allow(
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only panic-based assertions are permitted."
)]

mod common;

use behavior_profile_core::BehaviorScript;
use behavior_profile_core::ChangeCause;
use behavior_profile_core::HostEvent;
use behavior_profile_core::HostScript;
use behavior_profile_core::InMemorySessionStore;
use behavior_profile_core::InterruptType;
use behavior_profile_core::Interpreter;
use behavior_profile_core::InterpreterConfig;
use behavior_profile_core::ParamValue;
use behavior_profile_core::PortId;
use behavior_profile_core::Profile;
use behavior_profile_core::ProfileError;
use behavior_profile_core::ProfileRunner;
use behavior_profile_core::RunId;
use behavior_profile_core::RunOutcome;
use behavior_profile_core::RunStatus;
use behavior_profile_core::RunnerError;
use behavior_profile_core::ScriptedHost;
use behavior_profile_core::SessionStore;
use behavior_profile_core::StateId;
use behavior_profile_core::SuspendReason;
use behavior_profile_core::Timestamp;
use behavior_profile_core::TransitionId;
use serde_json::Value;
use serde_json::json;

use crate::common::endless;
use crate::common::finishes_after;
use crate::common::params_seen;
use crate::common::profile;
use crate::common::profile_from;
use crate::common::script;
use crate::common::state;
use crate::common::transition;
use crate::common::with_interrupt;
use crate::common::writes;

fn run(profile: &Profile, script: HostScript) -> (RunOutcome, ScriptedHost) {
    run_with(profile, script, InterpreterConfig::default())
}

fn run_with(
    profile: &Profile,
    script: HostScript,
    config: InterpreterConfig,
) -> (RunOutcome, ScriptedHost) {
    let mut host = ScriptedHost::new(script);
    let outcome = Interpreter::new(profile, config).run(&mut host, None);
    (outcome, host)
}

fn path(outcome: &RunOutcome) -> Vec<(String, String)> {
    outcome
        .history
        .iter()
        .map(|change| (change.from.to_string(), change.to.to_string()))
        .collect()
}

fn host_denied() -> RunStatus {
    RunStatus::Suspended {
        reason: SuspendReason::HostDenied,
    }
}

fn idle_to_wander(b_handlers: Value) -> Profile {
    let mut wander = state("b", "wander");
    wander["interruptHandlers"] = b_handlers;
    profile(
        "a",
        vec![state("a", "idle"), wander],
        vec![transition("calm", "a", "b", json!({ "type": "timer", "durationMs": 1000 }), 0)],
    )
}

// ============================================================================
// SECTION: Transitions
// ============================================================================

#[test]
fn higher_priority_transition_fires_first() {
    let always = json!({ "type": "always" });
    let profile = profile(
        "a",
        vec![state("a", "idle"), state("low", "idle"), state("high", "idle")],
        vec![
            transition("to-low", "a", "low", always.clone(), 1),
            transition("to-high", "a", "high", always, 5),
        ],
    );
    let (outcome, _) = run(&profile, script(vec![("idle", endless())], 3));
    assert_eq!(path(&outcome), vec![("a".to_string(), "high".to_string())]);
    assert_eq!(outcome.history[0].cause, ChangeCause::Transition(TransitionId::new("to-high")));
    assert_eq!(outcome.status, host_denied());
}

#[test]
fn equal_priorities_fire_in_declaration_order() {
    let always = json!({ "type": "always" });
    let profile = profile(
        "a",
        vec![state("a", "idle"), state("first", "idle"), state("second", "idle")],
        vec![
            transition("to-first", "a", "first", always.clone(), 2),
            transition("to-second", "a", "second", always, 2),
        ],
    );
    let (outcome, _) = run(&profile, script(vec![("idle", endless())], 3));
    assert_eq!(path(&outcome), vec![("a".to_string(), "first".to_string())]);
}

#[test]
fn dangling_transition_target_is_skipped() {
    let always = json!({ "type": "always" });
    let profile = profile(
        "a",
        vec![state("a", "idle"), state("b", "idle")],
        vec![
            transition("broken", "a", "missing", always.clone(), 10),
            transition("fallback", "a", "b", always, 1),
        ],
    );
    let (outcome, _) = run(&profile, script(vec![("idle", endless())], 3));
    assert_eq!(path(&outcome), vec![("a".to_string(), "b".to_string())]);
}

#[test]
fn timer_fires_after_duration_and_resets_on_entry() {
    let profile = profile(
        "a",
        vec![state("a", "idle"), state("b", "idle")],
        vec![
            transition("wait", "a", "b", json!({ "type": "timer", "durationMs": 500 }), 0),
            transition("back", "b", "a", json!({ "type": "always" }), 0),
        ],
    );
    let (outcome, _) = run(&profile, script(vec![("idle", endless())], 12));
    let times: Vec<Timestamp> = outcome.history.iter().map(|change| change.at).collect();
    assert_eq!(
        times,
        vec![
            Timestamp::Logical(500),
            Timestamp::Logical(500),
            Timestamp::Logical(1_000),
            Timestamp::Logical(1_000),
        ]
    );
    assert_eq!(outcome.history[0].tick, 5);
    assert_eq!(outcome.history[1].tick, 0);
}

#[test]
fn behavior_complete_transitions_on_next_iteration() {
    let profile = profile(
        "a",
        vec![state("a", "chop"), state("b", "idle")],
        vec![transition("done", "a", "b", json!({ "type": "behavior_complete" }), 0)],
    );
    let (outcome, _) = run(&profile, script(vec![("chop", finishes_after(3)), ("idle", endless())], 10));
    assert_eq!(path(&outcome), vec![("a".to_string(), "b".to_string())]);
    assert_eq!(outcome.history[0].at, Timestamp::Logical(300));
}

#[test]
fn transition_cycle_yields_to_host() {
    let always = json!({ "type": "always" });
    let profile = profile(
        "a",
        vec![state("a", "idle"), state("b", "idle")],
        vec![transition("ab", "a", "b", always.clone(), 0), transition("ba", "b", "a", always, 0)],
    );
    let config = InterpreterConfig {
        max_transitions_per_tick: 4,
        ..InterpreterConfig::default()
    };
    let (outcome, host) = run_with(&profile, script(vec![("idle", endless())], 3), config);
    assert_eq!(outcome.status, host_denied());
    assert_eq!(outcome.history.len(), 16);
    assert_eq!(host.ticks_elapsed(), 3);
}

// ============================================================================
// SECTION: Interrupts
// ============================================================================

#[test]
fn combat_interrupt_redirects_running_state() {
    let profile = idle_to_wander(json!([
        { "interruptType": "combat", "action": "transition", "targetStateId": "a" }
    ]));
    let script = with_interrupt(
        script(vec![("idle", endless()), ("wander", endless())], 15),
        12,
        InterruptType::Combat,
    );
    let (outcome, host) = run(&profile, script);
    assert_eq!(
        path(&outcome),
        vec![("a".to_string(), "b".to_string()), ("b".to_string(), "a".to_string())]
    );
    assert_eq!(outcome.history[1].cause, ChangeCause::Interrupt(InterruptType::Combat));
    assert_eq!(outcome.history[1].at, Timestamp::Logical(1_200));
    assert!(host.events().iter().any(|event| matches!(
        event,
        HostEvent::Cancelled { behavior, step: 2 } if behavior.as_str() == "wander"
    )));
}

#[test]
fn combat_interrupt_redirects_completed_state() {
    let profile = idle_to_wander(json!([
        { "interruptType": "combat", "action": "transition", "targetStateId": "a" }
    ]));
    let script = with_interrupt(
        script(vec![("idle", endless()), ("wander", finishes_after(1))], 20),
        12,
        InterruptType::Combat,
    );
    let (outcome, _) = run(&profile, script);
    assert_eq!(outcome.history.len(), 2);
    assert_eq!(outcome.history[1].cause, ChangeCause::Interrupt(InterruptType::Combat));
    assert_eq!(outcome.history[1].to, StateId::new("a"));
}

#[test]
fn ignored_interrupt_changes_nothing() {
    let mut a = state("a", "idle");
    a["interruptHandlers"] = json!([{ "interruptType": "player_nearby", "action": "ignore" }]);
    let profile = profile("a", vec![a], Vec::new());
    let script = with_interrupt(script(vec![("idle", endless())], 5), 2, InterruptType::PlayerNearby);
    let (outcome, host) = run(&profile, script);
    assert_eq!(outcome.status, host_denied());
    assert!(outcome.history.is_empty());
    assert_eq!(host.ticks_elapsed(), 5);
}

#[test]
fn unhandled_interrupt_pauses() {
    let profile = profile("a", vec![state("a", "idle")], Vec::new());
    let script = with_interrupt(script(vec![("idle", endless())], 5), 2, InterruptType::PlayerNearby);
    let (outcome, host) = run(&profile, script);
    assert_eq!(
        outcome.status,
        RunStatus::Suspended {
            reason: SuspendReason::Interrupt(InterruptType::PlayerNearby),
        }
    );
    assert_eq!(host.ticks_elapsed(), 2);
    assert!(outcome.session.resume_token.is_some());
    assert!(host.events().iter().any(|event| matches!(event, HostEvent::Paused { step: 2, .. })));
}

#[test]
fn explicit_pause_action_pauses() {
    let mut a = state("a", "idle");
    a["interruptHandlers"] = json!([{ "interruptType": "death", "action": "pause" }]);
    let profile = profile("a", vec![a], Vec::new());
    let script = with_interrupt(script(vec![("idle", endless())], 5), 1, InterruptType::Death);
    let (outcome, _) = run(&profile, script);
    assert_eq!(
        outcome.status,
        RunStatus::Suspended {
            reason: SuspendReason::Interrupt(InterruptType::Death),
        }
    );
}

#[test]
fn transition_handler_with_dangling_target_pauses() {
    let profile = idle_to_wander(json!([
        { "interruptType": "combat", "action": "transition", "targetStateId": "nowhere" }
    ]));
    let script = with_interrupt(
        script(vec![("idle", endless()), ("wander", endless())], 20),
        11,
        InterruptType::Combat,
    );
    let (outcome, _) = run(&profile, script);
    assert_eq!(
        outcome.status,
        RunStatus::Suspended {
            reason: SuspendReason::Interrupt(InterruptType::Combat),
        }
    );
    assert_eq!(outcome.session.current_state_id, Some(StateId::new("b")));
}

// ============================================================================
// SECTION: Sub-Behaviors and Waits
// ============================================================================

#[test]
fn behavior_failure_counts_as_completion() {
    let profile = profile(
        "a",
        vec![state("a", "chop"), state("b", "idle")],
        vec![transition("done", "a", "b", json!({ "type": "behavior_complete" }), 0)],
    );
    let failing = BehaviorScript {
        fail_at_step: Some(1),
        ..BehaviorScript::default()
    };
    let (outcome, _) = run(&profile, script(vec![("chop", failing), ("idle", endless())], 5));
    assert_eq!(path(&outcome), vec![("a".to_string(), "b".to_string())]);
}

#[test]
fn unresolvable_behavior_is_retried_after_wait() {
    let profile = profile("a", vec![state("a", "ghost")], Vec::new());
    let (outcome, host) = run(&profile, script(Vec::new(), 50));
    assert_eq!(outcome.status, host_denied());
    assert_eq!(host.ticks_elapsed(), 40);
    assert_eq!(outcome.session.ticks_in_state, 2);
}

#[test]
fn completed_behavior_idles_between_iterations() {
    let profile = profile("a", vec![state("a", "chop")], Vec::new());
    let (outcome, host) = run(&profile, script(vec![("chop", finishes_after(1))], 12));
    assert_eq!(outcome.status, host_denied());
    assert!(outcome.session.sub_behavior_complete);
    assert_eq!(host.ticks_elapsed(), 11);
    let steps = host.events().iter().filter(|event| matches!(event, HostEvent::Stepped { .. })).count();
    assert_eq!(steps, 1);
}

#[test]
fn denied_wait_suspends_and_resume_restores_progress() {
    let profile = profile("a", vec![state("a", "chop")], Vec::new());
    let behaviors = || script(vec![("chop", finishes_after(3))], 0);
    let interpreter = Interpreter::new(&profile, InterpreterConfig::default());

    let mut first = ScriptedHost::new(behaviors());
    let outcome = interpreter.run(&mut first, None);
    assert_eq!(outcome.status, host_denied());
    assert_eq!(outcome.session.resume_token.as_ref().map(|token| token.as_value().clone()), Some(json!({ "step": 1 })));

    let mut second = ScriptedHost::new(behaviors());
    let resumed = interpreter.run(&mut second, Some(outcome.session));
    assert!(second.events().contains(&HostEvent::Resolved {
        behavior: "chop".into(),
        resumed_from: Some(1),
    }));
    assert!(second.events().iter().any(|event| matches!(event, HostEvent::Stepped { step: 2, .. })));
    assert_eq!(resumed.session.resume_token.as_ref().map(|token| token.as_value().clone()), Some(json!({ "step": 2 })));
}

// ============================================================================
// SECTION: Run Exits
// ============================================================================

#[test]
fn missing_initial_state_is_idle() {
    let profile = profile_from(json!({
        "id": "p",
        "name": "No start",
        "states": [ { "id": "a", "name": "a", "behaviorName": "idle", "behaviorParams": {}, "interruptHandlers": [] } ]
    }));
    let (outcome, host) = run(&profile, script(vec![("idle", endless())], 5));
    assert_eq!(outcome.status, RunStatus::Idle);
    assert!(host.events().is_empty());
}

#[test]
fn unknown_current_state_terminates() {
    let profile = profile("ghost", vec![state("a", "idle")], Vec::new());
    let (outcome, _) = run(&profile, script(vec![("idle", endless())], 5));
    assert_eq!(
        outcome.status,
        RunStatus::Terminated {
            state_id: StateId::new("ghost"),
        }
    );
}

#[test]
fn session_records_profile_hash() {
    let profile = profile("a", vec![state("a", "idle")], Vec::new());
    let (outcome, _) = run(&profile, script(vec![("idle", endless())], 1));
    assert_eq!(outcome.session.profile_hash, Some(profile.canonical_hash().expect("hash")));
}

// ============================================================================
// SECTION: Data Flow
// ============================================================================

fn relay_document() -> Value {
    json!({
        "id": "relay",
        "name": "Relay",
        "initialStateId": "a",
        "states": [
            {
                "id": "a",
                "name": "Hunt",
                "behaviorName": "hunt",
                "behaviorParams": { "targetName": "nobody" },
                "interruptHandlers": [],
                "ports": [ { "id": "a-target", "name": "target", "side": "input", "valueType": "player" } ],
                "paramBindings": [ { "paramName": "targetName", "portId": "a-target" } ]
            },
            {
                "id": "z",
                "name": "Scan",
                "behaviorName": "scan",
                "behaviorParams": {},
                "interruptHandlers": [],
                "ports": [ { "id": "z-found", "name": "foundPlayer", "side": "output", "valueType": "player" } ]
            }
        ],
        "transitions": [
            { "id": "hunted", "fromStateId": "a", "toStateId": "z", "condition": { "type": "behavior_complete" }, "priority": 0 },
            { "id": "scanned", "fromStateId": "z", "toStateId": "a", "condition": { "type": "behavior_complete" }, "priority": 0 }
        ],
        "dataConnections": [
            { "id": "feed", "fromStateId": "z", "fromPortId": "z-found", "toStateId": "a", "toPortId": "a-target" }
        ]
    })
}

fn relay_profile() -> Profile {
    profile_from(relay_document())
}

#[test]
fn written_port_value_reaches_bound_state_on_reentry() {
    let profile = relay_profile();
    let behaviors = script(
        vec![("hunt", finishes_after(1)), ("scan", writes("foundPlayer", "Steve", Some(1)))],
        3,
    );
    let (outcome, host) = run(&profile, behaviors);
    let seen = params_seen(&host.events(), "hunt", "targetName");
    assert_eq!(
        seen[..2],
        [Some(ParamValue::from("nobody")), Some(ParamValue::from("Steve"))]
    );
    assert_eq!(
        outcome.session.port_value(&StateId::new("z"), &PortId::new("z-found")),
        Some(&ParamValue::from("Steve"))
    );
}

#[test]
fn written_port_value_is_visible_without_reentry() {
    let profile = profile_from(json!({
        "id": "loop",
        "name": "Self feed",
        "initialStateId": "a",
        "states": [
            {
                "id": "a",
                "name": "Count",
                "behaviorName": "count",
                "behaviorParams": { "seen": 0 },
                "interruptHandlers": [],
                "ports": [
                    { "id": "a-in", "name": "in", "side": "input", "valueType": "number" },
                    { "id": "a-out", "name": "out", "side": "output", "valueType": "number" }
                ],
                "paramBindings": [ { "paramName": "seen", "portId": "a-in" } ]
            }
        ],
        "dataConnections": [
            { "id": "self", "fromStateId": "a", "fromPortId": "a-out", "toStateId": "a", "toPortId": "a-in" }
        ]
    }));
    let (_, host) = run(&profile, script(vec![("count", writes("out", 7.0, None))], 2));
    let seen = params_seen(&host.events(), "count", "seen");
    assert_eq!(seen, vec![Some(ParamValue::Number(0.0)), Some(ParamValue::Number(7.0)), Some(ParamValue::Number(7.0))]);
}

#[test]
fn roundtripped_profile_drives_identically() {
    let profile = relay_profile();
    let encoded = serde_json::to_string(&profile).expect("serialize");
    let decoded: Profile = serde_json::from_str(&encoded).expect("deserialize");
    let behaviors = || {
        with_interrupt(
            script(vec![("hunt", finishes_after(2)), ("scan", writes("foundPlayer", "Alex", Some(1)))], 25),
            9,
            InterruptType::Combat,
        )
    };
    let (original, original_host) = run(&profile, behaviors());
    let (replayed, replayed_host) = run(&decoded, behaviors());
    assert_eq!(original, replayed);
    assert_eq!(original_host.events(), replayed_host.events());
}

#[test]
fn shared_port_id_on_another_state_does_not_feed_binding() {
    let output = |id: &str| json!({ "id": id, "name": "foundPlayer", "side": "output", "valueType": "player" });
    let profile = profile_from(json!({
        "id": "shadowed",
        "name": "Shadowed port",
        "initialStateId": "y",
        "states": [
            { "id": "y", "name": "Decoy", "behaviorName": "decoy", "behaviorParams": {}, "interruptHandlers": [], "ports": [output("out")] },
            { "id": "z", "name": "Scan", "behaviorName": "scan", "behaviorParams": {}, "interruptHandlers": [], "ports": [output("out")] },
            {
                "id": "a",
                "name": "Hunt",
                "behaviorName": "hunt",
                "behaviorParams": { "targetName": "nobody" },
                "interruptHandlers": [],
                "ports": [ { "id": "a-in", "name": "target", "side": "input", "valueType": "player" } ],
                "paramBindings": [ { "paramName": "targetName", "portId": "a-in" } ]
            }
        ],
        "transitions": [
            { "id": "decoyed", "fromStateId": "y", "toStateId": "a", "condition": { "type": "behavior_complete" }, "priority": 0 }
        ],
        "dataConnections": [
            { "id": "feed", "fromStateId": "z", "fromPortId": "out", "toStateId": "a", "toPortId": "a-in" }
        ]
    }));
    assert_eq!(profile.validate(), Ok(()));

    let behaviors = script(
        vec![("decoy", writes("foundPlayer", "Wrong", Some(1))), ("scan", endless()), ("hunt", endless())],
        5,
    );
    let (outcome, host) = run(&profile, behaviors);
    assert_eq!(path(&outcome), vec![("y".to_string(), "a".to_string())]);
    let seen = params_seen(&host.events(), "hunt", "targetName");
    assert!(!seen.is_empty());
    assert!(seen.iter().all(|value| value == &Some(ParamValue::from("nobody"))));
    assert_eq!(
        outcome.session.port_value(&StateId::new("y"), &PortId::new("out")),
        Some(&ParamValue::from("Wrong"))
    );
    assert_eq!(outcome.session.port_value(&StateId::new("z"), &PortId::new("out")), None);
}

#[test]
fn lenient_runner_ignores_connection_from_missing_state() {
    let mut document = relay_document();
    document["dataConnections"][0]["fromStateId"] = json!("vanished");
    let profile = profile_from(document);
    let behaviors = || {
        script(vec![("hunt", finishes_after(1)), ("scan", writes("foundPlayer", "Steve", Some(1)))], 6)
    };

    let runner = ProfileRunner::new(InMemorySessionStore::new(), InterpreterConfig::default());
    let run_id = RunId::new("relay");
    let mut host = ScriptedHost::new(behaviors());
    let outcome = runner.run(&profile, &run_id, &mut host).expect("lenient run");
    assert!(path(&outcome).len() >= 2);
    let seen = params_seen(&host.events(), "hunt", "targetName");
    assert!(seen.len() >= 2);
    assert!(seen.iter().all(|value| value == &Some(ParamValue::from("nobody"))));
    assert_eq!(
        outcome.session.port_value(&StateId::new("z"), &PortId::new("z-found")),
        Some(&ParamValue::from("Steve"))
    );
    assert_eq!(runner.store().load(&run_id).expect("load"), Some(outcome.session));

    let strict = ProfileRunner::new(InMemorySessionStore::new(), InterpreterConfig::default())
        .with_strict_validation(true);
    let err = strict.run(&profile, &run_id, &mut ScriptedHost::new(behaviors())).expect_err("strict");
    assert!(matches!(err, RunnerError::Invalid(ProfileError::InvalidConnection { .. })));
}

#[test]
fn behavior_rejecting_missing_param_completes_until_upstream_writes() {
    let mut document = relay_document();
    document["states"][0]["behaviorParams"] = json!({});
    let profile = profile_from(document);
    let hunt = BehaviorScript {
        required_params: vec!["targetName".to_string()],
        ..BehaviorScript::default()
    };
    let behaviors = script(vec![("hunt", hunt), ("scan", writes("foundPlayer", "Steve", Some(1)))], 5);
    let (outcome, host) = run(&profile, behaviors);
    assert_eq!(
        path(&outcome),
        vec![("a".to_string(), "z".to_string()), ("z".to_string(), "a".to_string())]
    );
    let seen = params_seen(&host.events(), "hunt", "targetName");
    assert!(seen.len() >= 2);
    assert_eq!(seen[0], None);
    assert!(seen[1..].iter().all(|value| value == &Some(ParamValue::from("Steve"))));
    assert_eq!(outcome.status, host_denied());
}
