// crates/behavior-profile-core/src/core/mod.rs
// ============================================================================
// Module: Behavior Profile Core Types
// Description: Profile document, session state, and supporting value types.
// Purpose: Provide stable, serializable types shared by hosts and the runtime.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Core types define the profile document exchanged with editors and storage,
//! the session state persisted between runs, and the world snapshot queried by
//! conditions. They carry no execution behavior.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod condition;
pub mod hashing;
pub mod identifiers;
pub mod params;
pub mod profile;
pub mod session;
pub mod time;
pub mod world;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use condition::Condition;
pub use condition::Operator;
pub use hashing::HashDigest;
pub use hashing::HashError;
pub use identifiers::BehaviorName;
pub use identifiers::ConnectionId;
pub use identifiers::PortId;
pub use identifiers::ProfileId;
pub use identifiers::RunId;
pub use identifiers::StateId;
pub use identifiers::TransitionId;
pub use params::BehaviorParams;
pub use params::ParamValue;
pub use profile::DataConnection;
pub use profile::InterruptAction;
pub use profile::InterruptHandler;
pub use profile::InterruptType;
pub use profile::ParamBinding;
pub use profile::Port;
pub use profile::PortSide;
pub use profile::Profile;
pub use profile::ProfileError;
pub use profile::StateSpec;
pub use profile::Transition;
pub use profile::ValueType;
pub use session::PortValues;
pub use session::ResumeToken;
pub use session::SessionState;
pub use time::Timestamp;
pub use world::ItemStack;
pub use world::ResourceLevel;
pub use world::SkillLevel;
pub use world::WorldSnapshot;
