//! Snapshot types pushed over the live streams.
//!
//! A snapshot is a point-in-time serialized view of session or player
//! state. Three audiences exist, each with its own shape:
//!
//! - the **host** sees the full roster, roles included
//!   ([`HostSnapshot`], event `session_update`);
//! - a **player** sees only its own record, or a terminal "missing"
//!   marker ([`PlayerSnapshot`], event `player_state`);
//! - every player also sees the public roster with names and alive flags
//!   but never roles ([`RosterEntry`] list, event `roster_update`).
//!
//! Role privacy is enforced by the types: there is no `role` field on
//! [`RosterEntry`], so a roster broadcast cannot leak one by accident.

use serde::{Deserialize, Serialize};

use crate::{PlayerId, SessionCode};

// ---------------------------------------------------------------------------
// Host view
// ---------------------------------------------------------------------------

/// One player as the host sees it: full detail, role included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerEntry {
    pub id: PlayerId,
    pub name: String,
    /// `None` serializes as JSON `null`, which the host UI renders as
    /// "no role yet". Never omitted.
    pub role: Option<String>,
    pub alive: bool,
}

/// The full roster snapshot sent on the host stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostSnapshot {
    pub code: SessionCode,
    pub players: Vec<PlayerEntry>,
}

// ---------------------------------------------------------------------------
// Player views
// ---------------------------------------------------------------------------

/// A single player's own state, as sent on that player's stream.
///
/// `#[serde(untagged)]` keeps the wire shape flat: a present player is
/// `{"id": "...", "name": "...", "role": null, "alive": true}` and an
/// unknown id is `{"id": "...", "missing": true}`. The `missing` variant
/// is terminal: the id will never come back, so a client receiving it
/// must offer a rejoin instead of retrying.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlayerSnapshot {
    Present {
        id: PlayerId,
        name: String,
        role: Option<String>,
        alive: bool,
    },
    Missing { id: PlayerId, missing: bool },
}

impl PlayerSnapshot {
    /// The marker for an id the session does not know.
    pub fn missing(id: PlayerId) -> Self {
        Self::Missing { id, missing: true }
    }

    /// Returns `true` for the terminal missing marker.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

/// One row of the public roster: who is in the game and who is alive.
/// Deliberately role-free.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub id: PlayerId,
    pub name: String,
    pub alive: bool,
}

// ---------------------------------------------------------------------------
// StreamEvent
// ---------------------------------------------------------------------------

/// One event on a live stream: the SSE event name plus its payload.
///
/// The fan-out pushes these through per-subscriber channels; the HTTP
/// adapter encodes them into SSE frames. Host channels only ever carry
/// `SessionUpdate`; player channels carry `PlayerState` and
/// `RosterUpdate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Full roster for the host, event name `session_update`.
    SessionUpdate(HostSnapshot),
    /// A player's own state, event name `player_state`.
    PlayerState(PlayerSnapshot),
    /// Public roster for player views, event name `roster_update`.
    /// Serialized as a bare JSON array.
    RosterUpdate(Vec<RosterEntry>),
}

impl StreamEvent {
    /// The SSE `event:` field for this payload.
    pub fn name(&self) -> &'static str {
        match self {
            Self::SessionUpdate(_) => "session_update",
            Self::PlayerState(_) => "player_state",
            Self::RosterUpdate(_) => "roster_update",
        }
    }

    /// Serializes the payload (not the name) to a JSON value.
    pub fn payload(&self) -> serde_json::Value {
        // These types contain only strings, bools, and vectors; serde_json
        // cannot fail on them.
        match self {
            Self::SessionUpdate(s) => serde_json::to_value(s),
            Self::PlayerState(s) => serde_json::to_value(s),
            Self::RosterUpdate(r) => serde_json::to_value(r),
        }
        .expect("snapshot types always serialize")
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! The browser client dispatches on the SSE event name and indexes
    //! straight into these payloads, so the tests pin exact JSON shapes.

    use super::*;

    fn pid(s: &str) -> PlayerId {
        PlayerId::new(s)
    }

    #[test]
    fn test_player_entry_role_serializes_as_null_when_unset() {
        let entry = PlayerEntry {
            id: pid("p1"),
            name: "Avery".into(),
            role: None,
            alive: true,
        };
        let json: serde_json::Value = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["id"], "p1");
        assert_eq!(json["name"], "Avery");
        assert!(json["role"].is_null(), "unset role must be explicit null");
        assert_eq!(json["alive"], true);
    }

    #[test]
    fn test_host_snapshot_json_shape() {
        let snapshot = HostSnapshot {
            code: SessionCode::from_raw("QR8LM"),
            players: vec![PlayerEntry {
                id: pid("p1"),
                name: "Avery".into(),
                role: Some("Werewolf".into()),
                alive: false,
            }],
        };
        let json: serde_json::Value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["code"], "QR8LM");
        assert_eq!(json["players"][0]["role"], "Werewolf");
        assert_eq!(json["players"][0]["alive"], false);
    }

    #[test]
    fn test_player_snapshot_present_json_shape() {
        let snapshot = PlayerSnapshot::Present {
            id: pid("p1"),
            name: "Avery".into(),
            role: None,
            alive: true,
        };
        let json: serde_json::Value = serde_json::to_value(&snapshot).unwrap();

        // Untagged: no enum wrapper, just the flat object.
        assert_eq!(json["id"], "p1");
        assert!(json["role"].is_null());
        assert!(json.get("missing").is_none());
    }

    #[test]
    fn test_player_snapshot_missing_json_shape() {
        let snapshot = PlayerSnapshot::missing(pid("gone"));
        let json: serde_json::Value = serde_json::to_value(&snapshot).unwrap();

        assert_eq!(json["id"], "gone");
        assert_eq!(json["missing"], true);
        assert!(json.get("name").is_none());
    }

    #[test]
    fn test_player_snapshot_round_trip_distinguishes_variants() {
        let present = PlayerSnapshot::Present {
            id: pid("p1"),
            name: "Avery".into(),
            role: Some("Seer".into()),
            alive: true,
        };
        let missing = PlayerSnapshot::missing(pid("p2"));

        let p: PlayerSnapshot =
            serde_json::from_slice(&serde_json::to_vec(&present).unwrap()).unwrap();
        let m: PlayerSnapshot =
            serde_json::from_slice(&serde_json::to_vec(&missing).unwrap()).unwrap();

        assert_eq!(p, present);
        assert_eq!(m, missing);
        assert!(m.is_missing());
        assert!(!p.is_missing());
    }

    #[test]
    fn test_roster_entry_has_no_role_field() {
        let entry = RosterEntry {
            id: pid("p1"),
            name: "Avery".into(),
            alive: true,
        };
        let json: serde_json::Value = serde_json::to_value(&entry).unwrap();

        assert!(json.get("role").is_none(), "roster must never carry roles");
        assert_eq!(json["name"], "Avery");
    }

    #[test]
    fn test_roster_update_payload_is_bare_array() {
        let event = StreamEvent::RosterUpdate(vec![RosterEntry {
            id: pid("p1"),
            name: "Avery".into(),
            alive: false,
        }]);

        assert_eq!(event.name(), "roster_update");
        let payload = event.payload();
        assert!(payload.is_array());
        assert_eq!(payload[0]["alive"], false);
    }

    #[test]
    fn test_stream_event_names_match_wire_contract() {
        let host = StreamEvent::SessionUpdate(HostSnapshot {
            code: SessionCode::from_raw("AAAAA"),
            players: vec![],
        });
        let player = StreamEvent::PlayerState(PlayerSnapshot::missing(pid("x")));

        assert_eq!(host.name(), "session_update");
        assert_eq!(player.name(), "player_state");
    }
}
