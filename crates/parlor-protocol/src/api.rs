//! Request and response bodies for the HTTP API.
//!
//! Field names on the wire are camelCase (`hostSecret`, `playerId`) to
//! match the browser client; `#[serde(rename_all = "camelCase")]` does the
//! mapping so the Rust side stays snake_case.
//!
//! The host secret always travels in a request body, never in a URL,
//! except for the host stream subscription: `EventSource` cannot set
//! headers or a body, so that one endpoint accepts the secret as a query
//! parameter. Accepted trade-off, inherited from the reference transport.

use serde::{Deserialize, Serialize};

use crate::{PlayerId, SessionCode};

/// `POST /api/sessions` → 201.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub code: SessionCode,
    pub host_secret: String,
}

/// Body of `POST /api/sessions/{code}/join`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub name: String,
}

/// `POST /api/sessions/{code}/join` → 201.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResponse {
    pub code: SessionCode,
    pub player_id: PlayerId,
    pub name: String,
}

/// Body of `POST /api/sessions/{code}/roles` (bulk random assignment).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRolesRequest {
    pub host_secret: String,
    pub roles: Vec<String>,
}

/// `POST /api/sessions/{code}/roles` → 200.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignRolesResponse {
    pub assigned: usize,
}

/// Body of `POST /api/sessions/{code}/players/{playerId}/role`.
/// `role: null` (or an empty label) clears the role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetRoleRequest {
    pub host_secret: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Body of `POST /api/sessions/{code}/players/{playerId}/alive`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetAliveRequest {
    pub host_secret: String,
    pub alive: bool,
}

/// Generic `{"ok": true}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// Error body, `{"error": "..."}` on every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Query of `GET /api/sessions/{code}/stream?playerId=...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStreamQuery {
    pub player_id: PlayerId,
}

/// Query of `GET /api/sessions/{code}/host-stream?hostSecret=...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostStreamQuery {
    pub host_secret: String,
}

// =========================================================================
// Tests
// =========================================================================
