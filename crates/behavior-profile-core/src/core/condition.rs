// crates/behavior-profile-core/src/core/condition.rs
// ============================================================================
// Module: Transition Conditions
// Description: Tagged condition variants and comparison operators.
// Purpose: Describe when a transition fires, independent of evaluation.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Conditions serialize as `{ "type": "<variant>", ...fields }`. Variants and
//! operators the runtime does not recognize deserialize into explicit
//! catch-all values instead of failing, so a document written by a newer
//! editor still loads and the offending transition simply never fires.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Operators
// ============================================================================

/// Comparison operator used by world-state conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    /// Left value is greater than or equal to the threshold.
    #[serde(rename = ">=")]
    GreaterOrEqual,
    /// Left value is strictly less than the threshold.
    #[serde(rename = "<")]
    Less,
    /// Left value is less than or equal to the threshold.
    #[serde(rename = "<=")]
    LessOrEqual,
    /// Left value equals the threshold.
    #[serde(rename = "==")]
    Equal,
    /// Operator the runtime does not understand; always compares false.
    #[serde(other, rename = "unrecognized")]
    Unrecognized,
}

impl Operator {
    /// Operators accepted by `inventory_percent_full`.
    pub const INVENTORY: &'static [Self] = &[Self::GreaterOrEqual, Self::Less];
    /// Operators accepted by `health_percent`.
    pub const HEALTH: &'static [Self] = &[Self::GreaterOrEqual, Self::Less, Self::LessOrEqual];
    /// Operators accepted by `item_count`.
    pub const ITEM_COUNT: &'static [Self] = &[Self::GreaterOrEqual, Self::Less, Self::Equal];
    /// Operators accepted by `skill_level`.
    pub const SKILL: &'static [Self] = &[Self::GreaterOrEqual, Self::Less];

    /// Returns the document spelling of the operator.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::GreaterOrEqual => ">=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Equal => "==",
            Self::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Conditions
// ============================================================================

/// Transition condition evaluated against world state and session timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// The active sub-behavior reported completion.
    BehaviorComplete,
    /// Unconditional fallthrough.
    Always,
    /// Time since state entry reached a duration.
    #[serde(rename_all = "camelCase")]
    Timer {
        /// Required elapsed milliseconds since state entry.
        duration_ms: u64,
    },
    /// Occupied inventory slots as a percentage of capacity.
    InventoryPercentFull {
        /// Comparison operator.
        operator: Operator,
        /// Percentage threshold.
        value: f64,
    },
    /// Health resource as a percentage of its base level.
    HealthPercent {
        /// Comparison operator.
        operator: Operator,
        /// Percentage threshold.
        value: f64,
    },
    /// Summed count of items whose names contain a pattern.
    #[serde(rename_all = "camelCase")]
    ItemCount {
        /// Case-insensitive substring matched against item names.
        item_pattern: String,
        /// Comparison operator.
        operator: Operator,
        /// Count threshold.
        value: f64,
    },
    /// Level of a named skill.
    #[serde(rename_all = "camelCase")]
    SkillLevel {
        /// Case-insensitive skill name.
        skill_name: String,
        /// Comparison operator.
        operator: Operator,
        /// Level threshold.
        value: f64,
    },
    /// Condition variant the runtime does not recognize; never true.
    #[serde(other)]
    Unrecognized,
}

impl Condition {
    /// Returns the document tag of the condition variant.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::BehaviorComplete => "behavior_complete",
            Self::Always => "always",
            Self::Timer {
                ..
            } => "timer",
            Self::InventoryPercentFull {
                ..
            } => "inventory_percent_full",
            Self::HealthPercent {
                ..
            } => "health_percent",
            Self::ItemCount {
                ..
            } => "item_count",
            Self::SkillLevel {
                ..
            } => "skill_level",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Returns true when the variant and its operator are both supported.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        match self {
            Self::BehaviorComplete
            | Self::Always
            | Self::Timer {
                ..
            } => true,
            Self::InventoryPercentFull {
                operator, ..
            } => Operator::INVENTORY.contains(operator),
            Self::HealthPercent {
                operator, ..
            } => Operator::HEALTH.contains(operator),
            Self::ItemCount {
                operator, ..
            } => Operator::ITEM_COUNT.contains(operator),
            Self::SkillLevel {
                operator, ..
            } => Operator::SKILL.contains(operator),
            Self::Unrecognized => false,
        }
    }
}
