// crates/behavior-profile-core/src/runtime/scripted.rs
// ============================================================================
// Module: Scripted Behavior Host
// Description: Deterministic host driven by a declarative script.
// Purpose: Replay interrupt schedules and world frames for simulation and tests.
// Dependencies: crate::{core, interfaces}, serde, serde_json
// ============================================================================

//! ## Overview
//! [`ScriptedHost`] implements [`BehaviorHost`] on a logical clock. Each
//! granted tick advances time by `tickMs`; waits that would pass `maxTicks`
//! are denied so every simulation ends in a resumable suspension. Behaviors
//! are scripted by name with a step count, an optional failing step, and port
//! writes. Every resolve, step, pause, and cancel is appended to a shared
//! event log.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::collections::VecDeque;
use std::rc::Rc;

use serde::Deserialize;
use serde::Serialize;
use serde_json::json;

use crate::core::BehaviorName;
use crate::core::BehaviorParams;
use crate::core::InterruptType;
use crate::core::ParamValue;
use crate::core::ResumeToken;
use crate::core::StateId;
use crate::core::Timestamp;
use crate::core::WorldSnapshot;
use crate::interfaces::BehaviorContext;
use crate::interfaces::BehaviorError;
use crate::interfaces::BehaviorHost;
use crate::interfaces::Interrupt;
use crate::interfaces::StepStatus;
use crate::interfaces::SubBehavior;
use crate::interfaces::WorldView;

// ============================================================================
// SECTION: Script Document
// ============================================================================

/// Default logical milliseconds per tick.
const DEFAULT_TICK_MS: u64 = 100;
/// Default tick budget before waits are denied.
const DEFAULT_MAX_TICKS: u64 = 1_000;

/// Declarative host script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostScript {
    /// Logical milliseconds per tick.
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    /// Total ticks granted before waits are denied.
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
    /// Logical clock value at tick zero.
    #[serde(default)]
    pub start_ms: u64,
    /// Initial world; `None` withholds the world from conditions.
    #[serde(default = "default_world")]
    pub world: Option<WorldSnapshot>,
    /// World replacements applied once their tick is reached.
    #[serde(default)]
    pub world_frames: Vec<WorldFrame>,
    /// Interrupts delivered once their tick is reached.
    #[serde(default)]
    pub interrupts: Vec<ScheduledInterrupt>,
    /// Behaviors the host can resolve, by registry name.
    #[serde(default)]
    pub behaviors: BTreeMap<BehaviorName, BehaviorScript>,
}

impl Default for HostScript {
    fn default() -> Self {
        Self {
            tick_ms: DEFAULT_TICK_MS,
            max_ticks: DEFAULT_MAX_TICKS,
            start_ms: 0,
            world: default_world(),
            world_frames: Vec::new(),
            interrupts: Vec::new(),
            behaviors: BTreeMap::new(),
        }
    }
}

/// World replacement scheduled at a tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldFrame {
    /// Tick at which the frame takes effect.
    pub at_tick: u64,
    /// Replacement world.
    pub world: WorldSnapshot,
}

/// Interrupt scheduled at a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledInterrupt {
    /// Tick from which the interrupt is pending.
    pub at_tick: u64,
    /// Interrupt type.
    #[serde(rename = "type")]
    pub interrupt_type: InterruptType,
}

/// Scripted behavior definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorScript {
    /// Steps until completion; `None` runs forever.
    #[serde(default)]
    pub steps_to_complete: Option<u32>,
    /// Step at which the behavior fails.
    #[serde(default)]
    pub fail_at_step: Option<u32>,
    /// Parameters that must be present on every step.
    #[serde(default)]
    pub required_params: Vec<String>,
    /// Output port writes.
    #[serde(default)]
    pub writes: Vec<PortWriteScript>,
}

/// Output port write performed by a scripted behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortWriteScript {
    /// Output port name.
    pub port: String,
    /// Value to write.
    pub value: ParamValue,
    /// Step performing the write; `None` writes on every step.
    #[serde(default)]
    pub at_step: Option<u32>,
}

/// Returns the default tick length.
const fn default_tick_ms() -> u64 {
    DEFAULT_TICK_MS
}

/// Returns the default tick budget.
const fn default_max_ticks() -> u64 {
    DEFAULT_MAX_TICKS
}

/// Returns an empty world so conditions evaluate by default.
fn default_world() -> Option<WorldSnapshot> {
    Some(WorldSnapshot::default())
}

// ============================================================================
// SECTION: Host Events
// ============================================================================

/// Event recorded by the scripted host and its behaviors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HostEvent {
    /// A behavior was resolved.
    Resolved {
        /// Behavior name.
        behavior: BehaviorName,
        /// Step restored from a resume token.
        resumed_from: Option<u32>,
    },
    /// A behavior was advanced.
    Stepped {
        /// State running the behavior.
        state_id: StateId,
        /// Behavior name.
        behavior: BehaviorName,
        /// Step number, starting at one.
        step: u32,
        /// Effective parameters seen by the step.
        params: BehaviorParams,
    },
    /// A behavior was paused.
    Paused {
        /// Behavior name.
        behavior: BehaviorName,
        /// Steps completed before pausing.
        step: u32,
    },
    /// A behavior was cancelled.
    Cancelled {
        /// Behavior name.
        behavior: BehaviorName,
        /// Steps completed before cancelling.
        step: u32,
    },
}

/// Shared event log.
type EventLog = Rc<RefCell<Vec<HostEvent>>>;

// ============================================================================
// SECTION: Scripted Host
// ============================================================================

/// Deterministic [`BehaviorHost`] replaying a [`HostScript`].
#[derive(Debug)]
pub struct ScriptedHost {
    /// Logical milliseconds per tick.
    tick_ms: u64,
    /// Tick budget.
    max_ticks: u64,
    /// Clock value at tick zero.
    start_ms: u64,
    /// Ticks granted so far.
    tick: u64,
    /// Current world.
    world: Option<WorldSnapshot>,
    /// Pending world frames ordered by tick.
    frames: VecDeque<WorldFrame>,
    /// Pending interrupts ordered by tick.
    interrupts: VecDeque<ScheduledInterrupt>,
    /// Resolvable behaviors.
    behaviors: BTreeMap<BehaviorName, BehaviorScript>,
    /// Recorded events.
    events: EventLog,
}

impl ScriptedHost {
    /// Creates a host from a script.
    #[must_use]
    pub fn new(script: HostScript) -> Self {
        let mut frames = script.world_frames;
        frames.sort_by_key(|frame| frame.at_tick);
        let mut interrupts = script.interrupts;
        interrupts.sort_by_key(|interrupt| interrupt.at_tick);
        let mut host = Self {
            tick_ms: script.tick_ms,
            max_ticks: script.max_ticks,
            start_ms: script.start_ms,
            tick: 0,
            world: script.world,
            frames: frames.into(),
            interrupts: interrupts.into(),
            behaviors: script.behaviors,
            events: Rc::default(),
        };
        host.apply_frames();
        host
    }

    /// Moves the clock origin, keeping the tick count.
    #[must_use]
    pub const fn with_start_ms(mut self, start_ms: u64) -> Self {
        self.start_ms = start_ms;
        self
    }

    /// Returns the ticks granted so far.
    #[must_use]
    pub const fn ticks_elapsed(&self) -> u64 {
        self.tick
    }

    /// Returns a copy of the recorded events.
    #[must_use]
    pub fn events(&self) -> Vec<HostEvent> {
        self.events.borrow().clone()
    }

    /// Applies world frames whose tick has been reached.
    fn apply_frames(&mut self) {
        while self.frames.front().is_some_and(|frame| frame.at_tick <= self.tick) {
            if let Some(frame) = self.frames.pop_front() {
                self.world = Some(frame.world);
            }
        }
    }
}

impl BehaviorHost for ScriptedHost {
    fn resolve_behavior(
        &mut self,
        name: &BehaviorName,
        _params: &BehaviorParams,
        resume: Option<ResumeToken>,
    ) -> Option<Box<dyn SubBehavior>> {
        let script = self.behaviors.get(name)?.clone();
        let resumed_from = resume.as_ref().and_then(resume_step);
        self.events.borrow_mut().push(HostEvent::Resolved {
            behavior: name.clone(),
            resumed_from,
        });
        Some(Box::new(ScriptedBehavior {
            name: name.clone(),
            script,
            steps: resumed_from.unwrap_or(0),
            events: Rc::clone(&self.events),
        }))
    }

    fn wait_ticks(&mut self, ticks: u32) -> bool {
        let next = self.tick.saturating_add(u64::from(ticks));
        if next > self.max_ticks {
            return false;
        }
        self.tick = next;
        self.apply_frames();
        true
    }

    fn poll_interrupt(&mut self) -> Option<Interrupt> {
        if self.interrupts.front().is_some_and(|pending| pending.at_tick <= self.tick) {
            return self.interrupts.pop_front().map(|pending| Interrupt::new(pending.interrupt_type));
        }
        None
    }

    fn world(&self) -> Option<&dyn WorldView> {
        self.world.as_ref().map(|world| world as &dyn WorldView)
    }

    fn now(&self) -> Timestamp {
        Timestamp::Logical(self.start_ms.saturating_add(self.tick.saturating_mul(self.tick_ms)))
    }
}

/// Reads the step counter stored in a scripted resume token.
fn resume_step(token: &ResumeToken) -> Option<u32> {
    token.as_value().get("step")?.as_u64().and_then(|step| u32::try_from(step).ok())
}

// ============================================================================
// SECTION: Scripted Behavior
// ============================================================================

/// Sub-behavior following a [`BehaviorScript`].
struct ScriptedBehavior {
    /// Behavior name.
    name: BehaviorName,
    /// Script being followed.
    script: BehaviorScript,
    /// Steps taken so far.
    steps: u32,
    /// Shared event log.
    events: EventLog,
}

impl SubBehavior for ScriptedBehavior {
    fn step(&mut self, ctx: &mut BehaviorContext<'_>) -> Result<StepStatus, BehaviorError> {
        self.steps = self.steps.saturating_add(1);
        self.events.borrow_mut().push(HostEvent::Stepped {
            state_id: ctx.state_id().clone(),
            behavior: self.name.clone(),
            step: self.steps,
            params: ctx.params().clone(),
        });
        if let Some(missing) = self.script.required_params.iter().find(|name| ctx.param(name).is_none()) {
            return Err(BehaviorError::InvalidParams(format!("{} requires {missing}", self.name)));
        }
        for write in &self.script.writes {
            if write.at_step.is_none_or(|step| step == self.steps) {
                ctx.ports().set_output(&write.port, write.value.clone());
            }
        }
        if self.script.fail_at_step == Some(self.steps) {
            return Err(BehaviorError::Failed(format!("{} failed at step {}", self.name, self.steps)));
        }
        match self.script.steps_to_complete {
            Some(total) if self.steps >= total => Ok(StepStatus::Completed),
            _ => Ok(StepStatus::Running),
        }
    }

    fn pause(&mut self) -> Option<ResumeToken> {
        self.events.borrow_mut().push(HostEvent::Paused {
            behavior: self.name.clone(),
            step: self.steps,
        });
        Some(ResumeToken::new(json!({ "step": self.steps })))
    }

    fn cancel(&mut self) {
        self.events.borrow_mut().push(HostEvent::Cancelled {
            behavior: self.name.clone(),
            step: self.steps,
        });
    }
}
