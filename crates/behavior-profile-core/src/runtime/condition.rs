// crates/behavior-profile-core/src/runtime/condition.rs
// ============================================================================
// Module: Condition Evaluator
// Description: Boolean evaluation of transition conditions.
// Purpose: Map a condition, world view, and session timers to fire/no-fire.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! Condition evaluation is pure and total. Anything the evaluator cannot
//! interpret (an unrecognized variant, an operator outside the variant's
//! allowed set, a missing world view, a missing resource) yields `false`, so a
//! malformed profile degrades to "never transitions" instead of failing.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::Condition;
use crate::core::Operator;
use crate::core::SessionState;
use crate::core::Timestamp;
use crate::interfaces::WorldView;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Inventory capacity used by `inventory_percent_full`.
pub const INVENTORY_CAPACITY: u32 = 36;

/// Resource names accepted as the health resource.
pub const HEALTH_RESOURCE_NAMES: [&str; 2] = ["health", "hp"];

// ============================================================================
// SECTION: Condition Evaluation
// ============================================================================

/// Evaluates a transition condition.
///
/// `now` is compared against the session's state-entry timestamp for timer
/// conditions. A missing world view makes every condition false.
#[must_use]
pub fn evaluate_condition(
    condition: &Condition,
    world: Option<&dyn WorldView>,
    session: &SessionState,
    now: Timestamp,
) -> bool {
    let Some(world) = world else {
        return false;
    };

    match condition {
        Condition::BehaviorComplete => session.sub_behavior_complete,
        Condition::Always => true,
        Condition::Timer {
            duration_ms,
        } => now.millis_since(&session.entered_at).is_some_and(|elapsed| elapsed >= *duration_ms),
        Condition::InventoryPercentFull {
            operator,
            value,
        } => {
            let percent =
                f64::from(world.occupied_slots()) / f64::from(INVENTORY_CAPACITY) * 100.0;
            compare(*operator, Operator::INVENTORY, percent, *value)
        }
        Condition::HealthPercent {
            operator,
            value,
        } => health_percent(world).is_some_and(|percent| {
            compare(*operator, Operator::HEALTH, percent, *value)
        }),
        Condition::ItemCount {
            item_pattern,
            operator,
            value,
        } => {
            let total = item_total(world, item_pattern);
            compare(*operator, Operator::ITEM_COUNT, f64::from(total), *value)
        }
        Condition::SkillLevel {
            skill_name,
            operator,
            value,
        } => world
            .skills()
            .iter()
            .find(|skill| skill.name.eq_ignore_ascii_case(skill_name))
            .is_some_and(|skill| compare(*operator, Operator::SKILL, skill.level, *value)),
        Condition::Unrecognized => false,
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns current health as a percentage of its base level.
fn health_percent(world: &dyn WorldView) -> Option<f64> {
    let resource = world.resources().iter().find(|resource| {
        HEALTH_RESOURCE_NAMES.iter().any(|name| resource.name.eq_ignore_ascii_case(name))
    })?;
    if resource.base <= 0.0 {
        return None;
    }
    Some(resource.current / resource.base * 100.0)
}

/// Sums counts of items whose names contain `pattern`, ignoring case.
fn item_total(world: &dyn WorldView, pattern: &str) -> u32 {
    let pattern = pattern.to_lowercase();
    world
        .items()
        .iter()
        .filter(|item| item.name.to_lowercase().contains(&pattern))
        .fold(0_u32, |total, item| total.saturating_add(item.count))
}

/// Compares `left` against `right` when `operator` is in `allowed`.
fn compare(operator: Operator, allowed: &[Operator], left: f64, right: f64) -> bool {
    if !allowed.contains(&operator) {
        return false;
    }
    match operator {
        Operator::GreaterOrEqual => left >= right,
        Operator::Less => left < right,
        Operator::LessOrEqual => left <= right,
        Operator::Equal => (left - right).abs() <= f64::EPSILON,
        Operator::Unrecognized => false,
    }
}
