//! Error types for the session core.

use parlor_protocol::{PlayerId, SessionCode};

/// Errors that can come out of a session operation.
///
/// All of these are local conditions reported to the caller of the one
/// operation that failed; none is fatal to the session, and a failed
/// operation never reaches the fan-out (no broadcast happens).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No live session with this code.
    #[error("session {0} not found")]
    NotFound(SessionCode),

    /// The session exists but has no player with this id.
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    /// A required field was missing or malformed (e.g. a blank name).
    /// The message is safe to show to the client.
    #[error("{0}")]
    Validation(String),

    /// The presented host secret does not match the session's.
    /// The message is intentionally the same regardless of why the check
    /// failed.
    #[error("invalid host secret")]
    PermissionDenied,

    /// The session's actor is gone (its mailbox closed). Callers should
    /// treat the session as dead.
    #[error("session {0} is unavailable")]
    Unavailable(SessionCode),
}
