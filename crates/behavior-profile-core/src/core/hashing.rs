// crates/behavior-profile-core/src/core/hashing.rs
// ============================================================================
// Module: Behavior Profile Canonical Hashing
// Description: SHA-256 digests over RFC 8785 canonical JSON.
// Purpose: Bind persisted sessions to the profile revision that produced them.
// Dependencies: serde, serde_jcs, sha2
// ============================================================================

//! ## Overview
//! Profiles are hashed over their JCS canonical JSON, so two documents that
//! differ only in key order or whitespace share a digest. The digest is
//! stored on each session and compared when a run resumes.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt::Write;

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;
use thiserror::Error;

// ============================================================================
// SECTION: Digest
// ============================================================================

/// Algorithm label recorded on every profile digest.
pub const PROFILE_HASH_ALGORITHM: &str = "sha256";

/// Digest of a canonicalized profile document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashDigest {
    /// Algorithm label, always [`PROFILE_HASH_ALGORITHM`] for digests made here.
    pub algorithm: String,
    /// Lowercase hex digest.
    pub value: String,
}

/// Errors raised when computing canonical hashes.
#[derive(Debug, Error)]
pub enum HashError {
    /// JSON canonicalization failed.
    #[error("failed to canonicalize json: {0}")]
    Canonicalization(String),
}

/// Hashes the canonical JSON form of `value` with SHA-256.
pub(crate) fn hash_canonical_json<T: Serialize + ?Sized>(
    value: &T,
) -> Result<HashDigest, HashError> {
    let canonical =
        serde_jcs::to_vec(value).map_err(|err| HashError::Canonicalization(err.to_string()))?;
    let hex = Sha256::digest(&canonical).iter().fold(String::with_capacity(64), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    });
    Ok(HashDigest {
        algorithm: PROFILE_HASH_ALGORITHM.to_string(),
        value: hex,
    })
}
