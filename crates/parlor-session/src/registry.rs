//! The session registry: the process-wide code → session table.
//!
//! # Concurrency note
//!
//! `SessionRegistry` is NOT thread-safe by itself. It uses a plain
//! `HashMap`, and that is intentional: the composition root owns exactly
//! one registry and wraps it in a single `tokio::sync::Mutex`. Holding
//! that mutex across `create` makes code generation and insertion one
//! atomic step, so concurrent creates can never be handed the same code,
//! and a session is lookup-able the moment `create` returns. The mutex
//! is only ever held for map operations, never across an actor call, so
//! it cannot become a cross-session bottleneck.

use std::collections::HashMap;

use parlor_protocol::SessionCode;

use crate::session::{SessionHandle, spawn_session};
use crate::{SessionError, ids};

/// Default command mailbox size for session actors.
const DEFAULT_MAILBOX_SIZE: usize = 64;

/// Everything the creating host gets back: the shareable code and the
/// secret that authorizes every privileged operation from now on. This is
/// the only place the secret ever leaves the server.
#[derive(Debug, Clone)]
pub struct CreatedSession {
    pub code: SessionCode,
    pub host_secret: String,
}

/// All live sessions, keyed by canonical code.
///
/// Sessions are never removed in the current scope: they live for the
/// process lifetime, matching the ephemeral party-game deployment model.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionCode, SessionHandle>,
}

impl SessionRegistry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a session: draws a collision-checked code, mints the host
    /// secret, spawns the actor, and installs the handle.
    pub fn create(&mut self) -> CreatedSession {
        // Redraw until the code is free. With a 33-million-code space and
        // a handful of live sessions, a second draw is already rare.
        let code = loop {
            let candidate = ids::random_code();
            if !self.sessions.contains_key(&candidate) {
                break candidate;
            }
        };

        let host_secret = ids::opaque_token();
        let handle =
            spawn_session(code.clone(), host_secret.clone(), DEFAULT_MAILBOX_SIZE);
        self.sessions.insert(code.clone(), handle);

        tracing::info!(%code, sessions = self.sessions.len(), "session created");

        CreatedSession { code, host_secret }
    }

    /// Looks up a session by raw code, case-insensitively.
    ///
    /// # Errors
    /// [`SessionError::NotFound`] if no live session has this code.
    pub fn lookup(&self, raw_code: &str) -> Result<SessionHandle, SessionError> {
        let code = SessionCode::from_raw(raw_code);
        self.sessions
            .get(&code)
            .cloned()
            .ok_or(SessionError::NotFound(code))
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Returns `true` if no sessions exist.
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
