//! Session actor: an isolated Tokio task that owns one game session.
//!
//! Each session runs in its own task, communicating with the outside
//! world through an mpsc mailbox. This is the actor model: no shared
//! mutable state, just message passing, and it is what gives the system
//! its per-session atomicity guarantee. A mutation, the snapshot reads it
//! triggers, and the fan-out publishes all happen inside one mailbox
//! turn, so no other operation on the same session can interleave and no
//! subscriber can observe a half-applied state.
//!
//! Every externally-invokable operation has the same shape:
//!
//! ```text
//! validate → authorize → apply to roster → snapshot → publish → reply
//! ```
//!
//! Validation and authorization failures reply to the caller before the
//! roster is touched, so a failed operation provably causes no broadcast.

use std::time::{Duration, Instant};

use parlor_protocol::{
    HostSnapshot, PlayerEntry, PlayerId, PlayerSnapshot, RosterEntry,
    SessionCode, StreamEvent,
};
use tokio::sync::{mpsc, oneshot};

use crate::{ChannelId, EventSender, FanOut, Player, PlayerRoster, SessionError};

/// Commands sent to a session actor through its mailbox.
///
/// The `oneshot::Sender` in most variants is the reply channel: the
/// caller sends a command and awaits the response on it. The unsubscribe
/// variants are fire-and-forget; they come from disconnect cleanup, which
/// has nobody left to reply to.
pub(crate) enum SessionCommand {
    Join {
        name: String,
        reply: oneshot::Sender<Result<Player, SessionError>>,
    },
    AssignRoles {
        secret: String,
        roles: Vec<String>,
        reply: oneshot::Sender<Result<usize, SessionError>>,
    },
    SetRole {
        secret: String,
        player_id: PlayerId,
        role: Option<String>,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    SetAlive {
        secret: String,
        player_id: PlayerId,
        alive: bool,
        reply: oneshot::Sender<Result<(), SessionError>>,
    },
    SubscribeHost {
        secret: String,
        sender: EventSender,
        reply: oneshot::Sender<Result<ChannelId, SessionError>>,
    },
    SubscribePlayer {
        player_id: PlayerId,
        sender: EventSender,
        reply: oneshot::Sender<ChannelId>,
    },
    UnsubscribeHost {
        channel: ChannelId,
    },
    UnsubscribePlayer {
        player_id: PlayerId,
        channel: ChannelId,
    },
    Info {
        reply: oneshot::Sender<SessionInfo>,
    },
}

/// A snapshot of session metadata (not the game state itself).
/// Carries no role data; safe for logs.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub code: SessionCode,
    pub player_count: usize,
    pub host_channels: usize,
    pub player_channels: usize,
    pub age: Duration,
}

/// Handle to a running session actor.
///
/// Cheap to clone (an `mpsc::Sender` plus the code); the registry holds
/// one per session and the HTTP adapter clones it per request. All
/// methods that can fail map a closed mailbox to
/// [`SessionError::Unavailable`].
#[derive(Clone)]
pub struct SessionHandle {
    code: SessionCode,
    sender: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    /// The session's code.
    pub fn code(&self) -> &SessionCode {
        &self.code
    }

    /// Adds a player. No authorization: anyone holding the code may join.
    pub async fn join(&self, name: &str) -> Result<Player, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Join {
            name: name.to_string(),
            reply: reply_tx,
        })
        .await?;
        self.recv(reply_rx).await?
    }

    /// Bulk-random role assignment, host-privileged. Returns how many
    /// players received a non-null role.
    pub async fn assign_roles(
        &self,
        secret: &str,
        roles: Vec<String>,
    ) -> Result<usize, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::AssignRoles {
            secret: secret.to_string(),
            roles,
            reply: reply_tx,
        })
        .await?;
        self.recv(reply_rx).await?
    }

    /// Sets or clears a single player's role, host-privileged.
    pub async fn set_role(
        &self,
        secret: &str,
        player_id: PlayerId,
        role: Option<String>,
    ) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::SetRole {
            secret: secret.to_string(),
            player_id,
            role,
            reply: reply_tx,
        })
        .await?;
        self.recv(reply_rx).await?
    }

    /// Marks a player alive or dead, host-privileged.
    pub async fn set_alive(
        &self,
        secret: &str,
        player_id: PlayerId,
        alive: bool,
    ) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::SetAlive {
            secret: secret.to_string(),
            player_id,
            alive,
            reply: reply_tx,
        })
        .await?;
        self.recv(reply_rx).await?
    }

    /// Opens a host channel. The current full snapshot is pushed into
    /// `sender` before this returns, so the subscriber always starts
    /// with state.
    pub async fn subscribe_host(
        &self,
        secret: &str,
        sender: EventSender,
    ) -> Result<ChannelId, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::SubscribeHost {
            secret: secret.to_string(),
            sender,
            reply: reply_tx,
        })
        .await?;
        self.recv(reply_rx).await?
    }

    /// Opens a player channel. Always succeeds for a live session; an id
    /// the roster does not know gets the terminal missing marker as its
    /// initial snapshot.
    pub async fn subscribe_player(
        &self,
        player_id: PlayerId,
        sender: EventSender,
    ) -> Result<ChannelId, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::SubscribePlayer {
            player_id,
            sender,
            reply: reply_tx,
        })
        .await?;
        self.recv(reply_rx).await
    }

    /// Drops one host channel. Fire-and-forget: if the session is gone
    /// there is nothing left to clean up.
    pub async fn unsubscribe_host(&self, channel: ChannelId) {
        let _ = self
            .sender
            .send(SessionCommand::UnsubscribeHost { channel })
            .await;
    }

    /// Drops one of a player's channels. Fire-and-forget.
    pub async fn unsubscribe_player(&self, player_id: PlayerId, channel: ChannelId) {
        let _ = self
            .sender
            .send(SessionCommand::UnsubscribePlayer { player_id, channel })
            .await;
    }

    /// Requests session metadata.
    pub async fn info(&self) -> Result<SessionInfo, SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(SessionCommand::Info { reply: reply_tx }).await?;
        self.recv(reply_rx).await
    }

    async fn send(&self, cmd: SessionCommand) -> Result<(), SessionError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| SessionError::Unavailable(self.code.clone()))
    }

    async fn recv<T>(&self, reply: oneshot::Receiver<T>) -> Result<T, SessionError> {
        reply
            .await
            .map_err(|_| SessionError::Unavailable(self.code.clone()))
    }
}

/// The internal actor state. Runs inside a Tokio task and is the only
/// owner of the roster and the fan-out.
struct SessionActor {
    code: SessionCode,
    host_secret: String,
    created_at: Instant,
    roster: PlayerRoster,
    fanout: FanOut,
    receiver: mpsc::Receiver<SessionCommand>,
}

impl SessionActor {
    /// Runs the actor loop until every handle is dropped.
    async fn run(mut self) {
        tracing::info!(code = %self.code, "session actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                SessionCommand::Join { name, reply } => {
                    let _ = reply.send(self.handle_join(&name));
                }
                SessionCommand::AssignRoles { secret, roles, reply } => {
                    let _ = reply.send(self.handle_assign_roles(&secret, &roles));
                }
                SessionCommand::SetRole { secret, player_id, role, reply } => {
                    let _ = reply.send(self.handle_set_role(
                        &secret,
                        &player_id,
                        role.as_deref(),
                    ));
                }
                SessionCommand::SetAlive { secret, player_id, alive, reply } => {
                    let _ =
                        reply.send(self.handle_set_alive(&secret, &player_id, alive));
                }
                SessionCommand::SubscribeHost { secret, sender, reply } => {
                    let _ = reply.send(self.handle_subscribe_host(&secret, sender));
                }
                SessionCommand::SubscribePlayer { player_id, sender, reply } => {
                    let _ =
                        reply.send(self.handle_subscribe_player(player_id, sender));
                }
                SessionCommand::UnsubscribeHost { channel } => {
                    self.fanout.unsubscribe_host(channel);
                }
                SessionCommand::UnsubscribePlayer { player_id, channel } => {
                    self.fanout.unsubscribe_player(&player_id, channel);
                }
                SessionCommand::Info { reply } => {
                    let _ = reply.send(self.info());
                }
            }
        }

        tracing::info!(code = %self.code, "session actor stopped");
    }

    // -- Mutation operations ----------------------------------------------

    fn handle_join(&mut self, name: &str) -> Result<Player, SessionError> {
        let player = self.roster.join(name)?;
        tracing::info!(
            code = %self.code,
            player_id = %player.id,
            players = self.roster.len(),
            "player joined"
        );

        self.publish_host();
        self.publish_player(&player.id);
        self.publish_roster();
        Ok(player)
    }

    fn handle_assign_roles(
        &mut self,
        secret: &str,
        roles: &[String],
    ) -> Result<usize, SessionError> {
        self.authorize(secret)?;
        let assigned = self.roster.bulk_assign_roles(roles);
        tracing::info!(code = %self.code, assigned, "roles dealt");

        // Every player's own role may have changed (including being
        // cleared), so each player id gets a fresh own-state push.
        self.publish_host();
        let ids: Vec<PlayerId> =
            self.roster.players().iter().map(|p| p.id.clone()).collect();
        for id in &ids {
            self.publish_player(id);
        }
        Ok(assigned)
    }

    fn handle_set_role(
        &mut self,
        secret: &str,
        player_id: &PlayerId,
        role: Option<&str>,
    ) -> Result<(), SessionError> {
        self.authorize(secret)?;
        self.roster.set_role(player_id, role)?;
        tracing::info!(code = %self.code, %player_id, "role set");

        self.publish_host();
        self.publish_player(player_id);
        Ok(())
    }

    fn handle_set_alive(
        &mut self,
        secret: &str,
        player_id: &PlayerId,
        alive: bool,
    ) -> Result<(), SessionError> {
        self.authorize(secret)?;
        self.roster.set_alive(player_id, alive)?;
        tracing::info!(code = %self.code, %player_id, alive, "alive flag set");

        self.publish_host();
        self.publish_player(player_id);
        self.publish_roster();
        Ok(())
    }

    // -- Subscriptions ----------------------------------------------------

    fn handle_subscribe_host(
        &mut self,
        secret: &str,
        sender: EventSender,
    ) -> Result<ChannelId, SessionError> {
        self.authorize(secret)?;

        // Push the current snapshot before registering: the endpoint is
        // never left without state, even if no mutation ever follows.
        let _ = sender.send(StreamEvent::SessionUpdate(self.host_snapshot()));
        let channel = self.fanout.subscribe_host(sender);
        tracing::debug!(code = %self.code, %channel, "host channel subscribed");
        Ok(channel)
    }

    fn handle_subscribe_player(
        &mut self,
        player_id: PlayerId,
        sender: EventSender,
    ) -> ChannelId {
        // An unknown id still gets a channel; its initial snapshot is the
        // missing marker, which the client treats as "go rejoin".
        let _ =
            sender.send(StreamEvent::PlayerState(self.player_snapshot(&player_id)));
        let _ = sender.send(StreamEvent::RosterUpdate(self.roster_snapshot()));
        let channel = self.fanout.subscribe_player(player_id.clone(), sender);
        tracing::debug!(
            code = %self.code,
            %player_id,
            %channel,
            "player channel subscribed"
        );
        channel
    }

    // -- Helpers ----------------------------------------------------------

    fn authorize(&self, secret: &str) -> Result<(), SessionError> {
        if secret != self.host_secret {
            return Err(SessionError::PermissionDenied);
        }
        Ok(())
    }

    fn host_snapshot(&self) -> HostSnapshot {
        HostSnapshot {
            code: self.code.clone(),
            players: self
                .roster
                .players()
                .iter()
                .map(|p| PlayerEntry {
                    id: p.id.clone(),
                    name: p.name.clone(),
                    role: p.role.clone(),
                    alive: p.alive,
                })
                .collect(),
        }
    }

    fn player_snapshot(&self, player_id: &PlayerId) -> PlayerSnapshot {
        match self.roster.get(player_id) {
            Some(p) => PlayerSnapshot::Present {
                id: p.id.clone(),
                name: p.name.clone(),
                role: p.role.clone(),
                alive: p.alive,
            },
            None => PlayerSnapshot::missing(player_id.clone()),
        }
    }

    fn roster_snapshot(&self) -> Vec<RosterEntry> {
        self.roster
            .players()
            .iter()
            .map(|p| RosterEntry {
                id: p.id.clone(),
                name: p.name.clone(),
                alive: p.alive,
            })
            .collect()
    }

    fn publish_host(&mut self) {
        let event = StreamEvent::SessionUpdate(self.host_snapshot());
        self.fanout.publish_to_host(&event);
    }

    fn publish_player(&mut self, player_id: &PlayerId) {
        let event = StreamEvent::PlayerState(self.player_snapshot(player_id));
        self.fanout.publish_to_player(player_id, &event);
    }

    fn publish_roster(&mut self) {
        let event = StreamEvent::RosterUpdate(self.roster_snapshot());
        self.fanout.publish_to_all_players(&event);
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            code: self.code.clone(),
            player_count: self.roster.len(),
            host_channels: self.fanout.host_channel_count(),
            player_channels: self.fanout.player_channel_count(),
            age: self.created_at.elapsed(),
        }
    }
}

/// Spawns a new session actor task and returns the handle to talk to it.
///
/// `mailbox_size` bounds the command queue; callers sending into a full
/// mailbox wait, which is the backpressure story for a session under
/// absurd request load.
pub(crate) fn spawn_session(
    code: SessionCode,
    host_secret: String,
    mailbox_size: usize,
) -> SessionHandle {
    let (tx, rx) = mpsc::channel(mailbox_size);

    let actor = SessionActor {
        code: code.clone(),
        host_secret,
        created_at: Instant::now(),
        roster: PlayerRoster::new(),
        fanout: FanOut::new(),
        receiver: rx,
    };

    tokio::spawn(actor.run());

    SessionHandle { code, sender: tx }
}
