//! Identity types for sessions and players.
//!
//! Both are newtype wrappers around strings. The wrapper buys two things:
//! a `SessionCode` can never be passed where a `PlayerId` is expected, and
//! each type can enforce its own invariant at the boundary (codes are
//! canonically uppercase, player ids are opaque server-minted tokens).

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// SessionCode
// ---------------------------------------------------------------------------

/// A session's shareable 5-character code, e.g. `QR8LM`.
///
/// The canonical form is uppercase; [`SessionCode::from_raw`] folds any
/// client-typed casing into it, so lookups are case-insensitive without the
/// registry having to care. Equality and hashing operate on the canonical
/// form only.
///
/// `#[serde(transparent)]` serializes the code as a bare JSON string,
/// not as a wrapper object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionCode(String);

impl SessionCode {
    /// Canonicalizes a raw (possibly lowercase) code from a URL or form.
    pub fn from_raw(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }

    /// Returns the canonical uppercase code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// PlayerId
// ---------------------------------------------------------------------------

/// A player's server-generated opaque id.
///
/// Distinct from the display name: the id is the credential a player's
/// browser holds to subscribe to its own stream, so it is minted from a
/// CSPRNG (see the generator in `parlor-session`) and never derived from
/// user input. Guessing another player's id would allow impersonating
/// their channel, which is why these carry 128 bits of entropy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wraps an already-minted token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the underlying token.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =========================================================================
// Tests
// =========================================================================
