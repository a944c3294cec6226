//! Identifier generation: session codes and opaque secrets.
//!
//! Two very different kinds of identifier come out of this module.
//! Session codes are *shared out loud* (read off a screen, typed on a
//! phone), so they optimize for transcription: short, uppercase, and
//! drawn from an alphabet with the ambiguous characters 0/O/1/I removed.
//! Opaque tokens are *secrets* (host secrets, player ids), so they
//! optimize for unguessability: 128 bits from the thread-local CSPRNG.

use parlor_protocol::SessionCode;
use rand::Rng;

/// Code alphabet: uppercase alphanumerics minus 0/O/1/I. Exactly 32
/// characters, so each code character carries 5 bits.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Codes are 5 characters wide: 32^5 ≈ 33 million combinations, plenty of
/// headroom for the handful of sessions a single process hosts.
pub const CODE_LEN: usize = 5;

/// Draws a random session code.
///
/// Uniqueness is NOT checked here. The registry owns the set of live
/// codes, so it performs the collision check and redraws (see
/// [`SessionRegistry::create`](crate::SessionRegistry::create)).
pub fn random_code() -> SessionCode {
    let mut rng = rand::rng();
    let code: String = (0..CODE_LEN)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect();
    SessionCode::from_raw(&code)
}

/// Generates a random 32-character hex string (128 bits of entropy).
///
/// Used for host secrets and player ids. A host secret grants full write
/// control over its session and a player id authorizes that player's
/// stream, so both must be computationally infeasible to guess;
/// `rand::rng()` is cryptographically secure, and 2^128 possibilities is
/// far beyond brute force.
pub fn opaque_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// =========================================================================
// Tests
// =========================================================================
