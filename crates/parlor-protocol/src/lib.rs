//! Wire contract for Parlor.
//!
//! This crate defines everything that travels between the server and its
//! clients: the identifier types, the snapshot shapes pushed over the live
//! streams, and the JSON bodies of the HTTP API.
//!
//! # Architecture
//!
//! The contract layer sits below the session core and the HTTP adapter.
//! It knows nothing about sessions, actors, or axum; it only pins down
//! the exact JSON the outside world sees. Both of the other crates depend
//! on it, which keeps the wire format in one place:
//!
//! ```text
//! parlor (HTTP + SSE adapter)
//!     ↕
//! parlor-session (registry, roster, fan-out)
//!     ↕
//! parlor-protocol (this crate: plain types + serde)
//! ```

mod api;
mod ids;
mod snapshot;

pub use api::{
    AssignRolesRequest, AssignRolesResponse, CreateSessionResponse,
    ErrorResponse, HostStreamQuery, JoinRequest, JoinResponse, OkResponse,
    PlayerStreamQuery, SetAliveRequest, SetRoleRequest,
};
pub use ids::{PlayerId, SessionCode};
pub use snapshot::{
    HostSnapshot, PlayerEntry, PlayerSnapshot, RosterEntry, StreamEvent,
};
