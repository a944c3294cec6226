//! Subscriber fan-out: who is watching a session, and pushing snapshots
//! to all of them.
//!
//! Two independent registries exist per session: the host channels (full
//! roster view) and a per-player map of channels (own-state view). The
//! same audience can hold many channels at once (one per open tab), and
//! every one of them is notified on every relevant change.
//!
//! Delivery is best-effort per channel and never blocks: the senders are
//! unbounded, so pushing a snapshot is a non-blocking enqueue, and a
//! channel whose receiver is gone is simply evicted in place. A slow or
//! dead consumer can therefore never stall a mutation or starve the other
//! subscribers.
//!
//! Like the roster, `FanOut` is a plain struct owned by one session actor;
//! the actor's mailbox is what serializes access to it.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use parlor_protocol::{PlayerId, StreamEvent};
use tokio::sync::mpsc;

/// Counter for process-unique channel ids.
static NEXT_CHANNEL_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for one subscriber channel.
///
/// Handed back on subscribe so the transport can unsubscribe exactly this
/// channel when its client disconnects, leaving the audience's other tabs
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(u64);

impl ChannelId {
    fn next() -> Self {
        Self(NEXT_CHANNEL_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ch-{}", self.0)
    }
}

/// Sending half of one subscriber channel.
pub type EventSender = mpsc::UnboundedSender<StreamEvent>;

/// The live-connection sets of one session.
#[derive(Debug, Default)]
pub struct FanOut {
    /// Host channels, keyed by channel id.
    host: HashMap<ChannelId, EventSender>,

    /// Player channels, keyed by player id then channel id. The outer
    /// entry persists across a player's individual reconnects and is
    /// pruned once its last channel is gone.
    players: HashMap<PlayerId, HashMap<ChannelId, EventSender>>,
}

impl FanOut {
    /// Creates an empty fan-out.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a host channel and returns its id.
    pub fn subscribe_host(&mut self, sender: EventSender) -> ChannelId {
        let id = ChannelId::next();
        self.host.insert(id, sender);
        id
    }

    /// Removes a host channel. Unknown ids are ignored (the channel may
    /// already have been evicted by a failed send).
    pub fn unsubscribe_host(&mut self, id: ChannelId) {
        self.host.remove(&id);
    }

    /// Registers a channel for one player id and returns the channel id.
    ///
    /// The player id is not validated here: a channel may watch an id the
    /// roster no longer knows, in which case it just received the missing
    /// marker and is waiting for its client to go rejoin.
    pub fn subscribe_player(
        &mut self,
        player_id: PlayerId,
        sender: EventSender,
    ) -> ChannelId {
        let id = ChannelId::next();
        self.players.entry(player_id).or_default().insert(id, sender);
        id
    }

    /// Removes one of a player's channels, pruning the per-player set
    /// when it empties.
    pub fn unsubscribe_player(&mut self, player_id: &PlayerId, id: ChannelId) {
        if let Some(channels) = self.players.get_mut(player_id) {
            channels.remove(&id);
            if channels.is_empty() {
                self.players.remove(player_id);
            }
        }
    }

    /// Pushes an event to every host channel, evicting the dead ones.
    pub fn publish_to_host(&mut self, event: &StreamEvent) {
        self.host.retain(|id, sender| {
            let delivered = sender.send(event.clone()).is_ok();
            if !delivered {
                tracing::debug!(channel = %id, "evicting dead host channel");
            }
            delivered
        });
    }

    /// Pushes an event to every channel subscribed to one player id.
    pub fn publish_to_player(&mut self, player_id: &PlayerId, event: &StreamEvent) {
        if let Some(channels) = self.players.get_mut(player_id) {
            channels.retain(|id, sender| {
                let delivered = sender.send(event.clone()).is_ok();
                if !delivered {
                    tracing::debug!(
                        %player_id,
                        channel = %id,
                        "evicting dead player channel"
                    );
                }
                delivered
            });
            if channels.is_empty() {
                self.players.remove(player_id);
            }
        }
    }

    /// Pushes an event to every player channel of every player. This is
    /// the `roster_update` path: the public who's-alive view, so the
    /// event must not carry role data (the roster types enforce that).
    pub fn publish_to_all_players(&mut self, event: &StreamEvent) {
        self.players.retain(|player_id, channels| {
            channels.retain(|id, sender| {
                let delivered = sender.send(event.clone()).is_ok();
                if !delivered {
                    tracing::debug!(
                        %player_id,
                        channel = %id,
                        "evicting dead player channel"
                    );
                }
                delivered
            });
            !channels.is_empty()
        });
    }

    /// Number of live host channels.
    pub fn host_channel_count(&self) -> usize {
        self.host.len()
    }

    /// Number of live player channels across all players.
    pub fn player_channel_count(&self) -> usize {
        self.players.values().map(HashMap::len).sum()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use parlor_protocol::{HostSnapshot, PlayerSnapshot, SessionCode};

    fn host_event() -> StreamEvent {
        StreamEvent::SessionUpdate(HostSnapshot {
            code: SessionCode::from_raw("AAAAA"),
            players: vec![],
        })
    }

    fn player_event(id: &PlayerId) -> StreamEvent {
        StreamEvent::PlayerState(PlayerSnapshot::missing(id.clone()))
    }

    fn pid(s: &str) -> PlayerId {
        PlayerId::new(s)
    }

    #[test]
    fn test_publish_to_host_reaches_every_channel() {
        // Two host tabs open: both must see the update, not just the
        // most recent subscriber.
        let mut fanout = FanOut::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        fanout.subscribe_host(tx1);
        fanout.subscribe_host(tx2);

        fanout.publish_to_host(&host_event());

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }

    #[test]
    fn test_publish_to_player_only_reaches_that_player() {
        let mut fanout = FanOut::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        fanout.subscribe_player(pid("a"), tx_a);
        fanout.subscribe_player(pid("b"), tx_b);

        fanout.publish_to_player(&pid("a"), &player_event(&pid("a")));

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err(), "other players must not be notified");
    }

    #[test]
    fn test_publish_to_all_players_spans_every_channel() {
        let mut fanout = FanOut::new();
        let (tx_a, mut rx_a) = mpsc::unbounded_channel();
        let (tx_a2, mut rx_a2) = mpsc::unbounded_channel();
        let (tx_b, mut rx_b) = mpsc::unbounded_channel();
        fanout.subscribe_player(pid("a"), tx_a);
        fanout.subscribe_player(pid("a"), tx_a2);
        fanout.subscribe_player(pid("b"), tx_b);

        fanout.publish_to_all_players(&StreamEvent::RosterUpdate(vec![]));

        assert!(rx_a.try_recv().is_ok());
        assert!(rx_a2.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }

    #[test]
    fn test_publish_evicts_dead_host_channel() {
        let mut fanout = FanOut::new();
        let (tx_dead, rx_dead) = mpsc::unbounded_channel();
        let (tx_live, mut rx_live) = mpsc::unbounded_channel();
        fanout.subscribe_host(tx_dead);
        fanout.subscribe_host(tx_live);
        drop(rx_dead); // client went away without unsubscribing

        fanout.publish_to_host(&host_event());

        assert_eq!(fanout.host_channel_count(), 1);
        assert!(rx_live.try_recv().is_ok(), "live channel unaffected");
    }

    #[test]
    fn test_publish_evicts_dead_player_channel_and_prunes_empty_set() {
        let mut fanout = FanOut::new();
        let (tx, rx) = mpsc::unbounded_channel();
        fanout.subscribe_player(pid("a"), tx);
        drop(rx);

        fanout.publish_to_player(&pid("a"), &player_event(&pid("a")));

        assert_eq!(fanout.player_channel_count(), 0);
    }

    #[test]
    fn test_unsubscribe_host_removes_only_that_channel() {
        let mut fanout = FanOut::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();
        let ch1 = fanout.subscribe_host(tx1);
        fanout.subscribe_host(tx2);

        fanout.unsubscribe_host(ch1);

        assert_eq!(fanout.host_channel_count(), 1);
    }

    #[test]
    fn test_unsubscribe_player_prunes_empty_per_player_set() {
        let mut fanout = FanOut::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let ch = fanout.subscribe_player(pid("a"), tx);

        fanout.unsubscribe_player(&pid("a"), ch);

        assert_eq!(fanout.player_channel_count(), 0);
    }

    #[test]
    fn test_unsubscribe_unknown_channel_is_a_no_op() {
        let mut fanout = FanOut::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        let ch = fanout.subscribe_host(tx);

        // Evicted-then-disconnected channels unsubscribe twice; the
        // second call must be harmless.
        fanout.unsubscribe_host(ch);
        fanout.unsubscribe_host(ch);
        fanout.unsubscribe_player(&pid("ghost"), ch);
    }

    #[test]
    fn test_channel_ids_are_unique() {
        let mut fanout = FanOut::new();
        let (tx1, _rx1) = mpsc::unbounded_channel();
        let (tx2, _rx2) = mpsc::unbounded_channel();

        let a = fanout.subscribe_host(tx1);
        let b = fanout.subscribe_player(pid("p"), tx2);

        assert_ne!(a, b);
    }
}
