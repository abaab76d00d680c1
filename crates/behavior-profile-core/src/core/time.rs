// crates/behavior-profile-core/src/core/time.rs
// ============================================================================
// Module: Behavior Profile Time Model
// Description: Host-supplied timestamps for state entry and timer conditions.
// Purpose: Keep timer evaluation replayable by never reading the system clock.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! The interpreter never reads wall-clock time directly; hosts report the
//! current time through [`crate::BehaviorHost::now`]. Scripted hosts use
//! logical milliseconds so simulations replay identically.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Time Values
// ============================================================================

/// Timestamp recorded on state entry and compared by timer conditions.
///
/// # Invariants
/// - Values are explicitly provided by hosts; the core never reads wall-clock time.
/// - Timestamps of different kinds are incomparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Timestamp {
    /// Unix epoch milliseconds.
    UnixMillis(i64),
    /// Logical milliseconds on a simulated clock.
    Logical(u64),
}

impl Timestamp {
    /// Returns the timestamp as logical time when available.
    #[must_use]
    pub const fn as_logical(&self) -> Option<u64> {
        match self {
            Self::UnixMillis(_) => None,
            Self::Logical(value) => Some(*value),
        }
    }

    /// Returns milliseconds elapsed from `earlier` to `self`.
    ///
    /// Returns `None` when the kinds differ or the clock moved backwards.
    #[must_use]
    pub fn millis_since(&self, earlier: &Self) -> Option<u64> {
        match (self, earlier) {
            (Self::UnixMillis(now), Self::UnixMillis(then)) => {
                now.checked_sub(*then).and_then(|delta| u64::try_from(delta).ok())
            }
            (Self::Logical(now), Self::Logical(then)) => now.checked_sub(*then),
            _ => None,
        }
    }
}
