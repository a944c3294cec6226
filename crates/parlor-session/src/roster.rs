//! The per-session player store.
//!
//! # Concurrency note
//!
//! `PlayerRoster` is NOT thread-safe by itself. This is intentional: each
//! roster is owned by exactly one session actor and only ever touched from
//! inside that actor's mailbox loop. Keeping it a plain struct avoids
//! hidden locking and keeps the mutation rules testable without a runtime.

use parlor_protocol::PlayerId;
use rand::seq::SliceRandom;

use crate::{SessionError, ids};

/// A joined participant.
///
/// The id is the player's credential and never changes; the display name
/// is immutable once joined (re-joining creates a new player, it does not
/// rename). Only `role` and `alive` are mutable, and only through the
/// host-privileged operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Option<String>,
    pub alive: bool,
}

/// All players of one session, in join order.
///
/// Join order is part of the contract: host roster views stay stable
/// across updates instead of reshuffling on every broadcast. With party
/// sized groups a `Vec` plus linear id lookup beats carrying an index
/// map around.
#[derive(Debug, Default)]
pub struct PlayerRoster {
    players: Vec<Player>,
}

impl PlayerRoster {
    /// Creates an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a new player with a freshly minted id.
    ///
    /// The name is trimmed before storing. There is no capacity limit:
    /// a deliberate choice for single-party scale.
    ///
    /// # Errors
    /// [`SessionError::Validation`] if the name is empty after trimming.
    pub fn join(&mut self, name: &str) -> Result<Player, SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::Validation("name is required".into()));
        }

        let player = Player {
            id: PlayerId::new(ids::opaque_token()),
            name: name.to_string(),
            role: None,
            alive: true,
        };
        self.players.push(player.clone());
        Ok(player)
    }

    /// Sets (or clears) one player's role.
    ///
    /// The label is trimmed; an empty or whitespace-only label normalizes
    /// to `None`, the same discipline `join` applies to names.
    ///
    /// # Errors
    /// [`SessionError::PlayerNotFound`] for an unknown id.
    pub fn set_role(
        &mut self,
        player_id: &PlayerId,
        role: Option<&str>,
    ) -> Result<&Player, SessionError> {
        let player = self.get_mut(player_id)?;
        player.role = normalize_role(role);
        Ok(player)
    }

    /// Marks one player alive or dead.
    ///
    /// # Errors
    /// [`SessionError::PlayerNotFound`] for an unknown id.
    pub fn set_alive(
        &mut self,
        player_id: &PlayerId,
        alive: bool,
    ) -> Result<&Player, SessionError> {
        let player = self.get_mut(player_id)?;
        player.alive = alive;
        Ok(player)
    }

    /// Randomly distributes `roles` across the current players,
    /// shuffle-then-zip:
    ///
    /// 1. produce a uniformly random permutation of the players
    ///    (Fisher-Yates via [`SliceRandom::shuffle`], so every ordering is
    ///    equally likely);
    /// 2. pair the permutation position-for-position with the role list.
    ///
    /// Players beyond the role list have their role explicitly cleared;
    /// roles beyond the player count go unused. Labels are trimmed and
    /// empty labels normalize to `None`, exactly like [`set_role`].
    ///
    /// Returns how many players hold a non-`None` role after the call.
    ///
    /// [`set_role`]: Self::set_role
    pub fn bulk_assign_roles(&mut self, roles: &[String]) -> usize {
        let mut rng = rand::rng();
        let mut order: Vec<usize> = (0..self.players.len()).collect();
        order.shuffle(&mut rng);

        let mut assigned = 0;
        for (slot, &player_idx) in order.iter().enumerate() {
            let role = roles.get(slot).and_then(|r| normalize_role(Some(r)));
            if role.is_some() {
                assigned += 1;
            }
            self.players[player_idx].role = role;
        }
        assigned
    }

    /// Looks up a player by id.
    pub fn get(&self, player_id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == player_id)
    }

    /// All players in join order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Number of players.
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Returns `true` if nobody has joined yet.
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    fn get_mut(&mut self, player_id: &PlayerId) -> Result<&mut Player, SessionError> {
        self.players
            .iter_mut()
            .find(|p| &p.id == player_id)
            .ok_or_else(|| SessionError::PlayerNotFound(player_id.clone()))
    }
}

/// Trims a role label; empty and whitespace-only labels mean "unset".
fn normalize_role(role: Option<&str>) -> Option<String> {
    role.map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::to_string)
}

// =========================================================================
// Tests
// =========================================================================
