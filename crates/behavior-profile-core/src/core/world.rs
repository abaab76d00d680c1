// crates/behavior-profile-core/src/core/world.rs
// ============================================================================
// Module: World Snapshot
// Description: Serializable read-only view of the agent's surroundings.
// Purpose: Provide a concrete world view for scripted hosts and tests.
// Dependencies: serde, crate::interfaces
// ============================================================================

//! ## Overview
//! Conditions only query a narrow slice of the world: inventory occupancy,
//! named resource levels, item stacks, and skill levels. [`WorldSnapshot`] is a
//! plain data carrier for that slice; live hosts may implement
//! [`WorldView`] directly over their own state instead.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

use crate::interfaces::WorldView;

// ============================================================================
// SECTION: Snapshot Entries
// ============================================================================

/// Current and base level of a named resource such as health.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceLevel {
    /// Resource name.
    pub name: String,
    /// Current level.
    pub current: f64,
    /// Base (maximum) level.
    pub base: f64,
}

/// Stack of items held in the inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// Item name.
    pub name: String,
    /// Number of items in the stack.
    pub count: u32,
}

/// Level of a named skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillLevel {
    /// Skill name.
    pub name: String,
    /// Current level.
    pub level: f64,
}

// ============================================================================
// SECTION: World Snapshot
// ============================================================================

/// Point-in-time copy of the world state queried by conditions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldSnapshot {
    /// Number of occupied inventory slots.
    #[serde(default)]
    pub occupied_slots: u32,
    /// Named resources with current/base levels.
    #[serde(default)]
    pub resources: Vec<ResourceLevel>,
    /// Inventory item stacks.
    #[serde(default)]
    pub items: Vec<ItemStack>,
    /// Named skill levels.
    #[serde(default)]
    pub skills: Vec<SkillLevel>,
}

impl WorldView for WorldSnapshot {
    fn occupied_slots(&self) -> u32 {
        self.occupied_slots
    }

    fn resources(&self) -> &[ResourceLevel] {
        &self.resources
    }

    fn items(&self) -> &[ItemStack] {
        &self.items
    }

    fn skills(&self) -> &[SkillLevel] {
        &self.skills
    }
}
