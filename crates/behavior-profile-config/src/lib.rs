// crates/behavior-profile-config/src/lib.rs
// ============================================================================
// Module: Behavior Profile Config Library
// Description: Runtime configuration model and validation.
// Purpose: Single source of truth for behavior-profile.toml semantics.
// Dependencies: behavior-profile-core, serde, toml
// ============================================================================

//! ## Overview
//! `behavior-profile-config` defines the runtime configuration for the
//! behavior profile interpreter: scheduling waits, profile loading limits,
//! and the default log filter. Validation fails closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
