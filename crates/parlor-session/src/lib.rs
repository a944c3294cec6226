//! Session management for Parlor: the state registry and its live-update
//! fan-out.
//!
//! This crate is the core of the server. It owns:
//!
//! 1. **Identifier generation**: collision-checked session codes and
//!    unguessable secrets ([`ids`])
//! 2. **The player store**: one roster per session ([`PlayerRoster`])
//! 3. **The subscriber fan-out**: host and per-player live channels
//!    ([`FanOut`])
//! 4. **Mutation operations**: join, assign roles, set alive; each applied
//!    and published atomically by a per-session actor ([`SessionHandle`])
//! 5. **The registry**: the process-wide code → session table
//!    ([`SessionRegistry`])
//!
//! # How it fits in the stack
//!
//! ```text
//! parlor (HTTP + SSE adapter)  ← resolves codes, forwards operations
//!     ↕
//! parlor-session (this crate)  ← serializes state changes, fans out snapshots
//!     ↕
//! parlor-protocol (below)      ← snapshot and id types
//! ```
//!
//! # Concurrency model
//!
//! Every session runs as its own Tokio task (actor) owning the tuple
//! `(roster, fan-out)`. A mutation and the snapshot publishes it triggers
//! happen inside a single mailbox turn, so subscribers only ever observe
//! consistent point-in-time views, and operations on different sessions
//! never contend. There is exactly one lock in the whole design, around
//! the registry map, and it is never held across an actor call.

mod error;
mod fanout;
mod registry;
mod roster;
mod session;

pub mod ids;

pub use error::SessionError;
pub use fanout::{ChannelId, EventSender, FanOut};
pub use registry::{CreatedSession, SessionRegistry};
pub use roster::{Player, PlayerRoster};
pub use session::{SessionHandle, SessionInfo};
