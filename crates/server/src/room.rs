// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! A poker room with its table and connected players.
use ahash::{AHashMap, AHashSet};
use log::info;
use parking_lot::Mutex;
use rand::{SeedableRng, rngs::StdRng};
use std::sync::Arc;
use tokio::sync::mpsc;

use pokeroom_core::{
    EngineError,
    message::{ActionKind, TableMessage, TableSnapshot},
    poker::{Chips, ConnectionId, PlayerId, RoomId},
    table::{Player, Table},
};

use crate::config::RoomConfig;

/// A room shared by all the connections that joined it.
///
/// All the room operations lock the room state for their whole duration and
/// return the messages for the connections, the caller delivers them after
/// the lock has been released.
#[derive(Debug)]
pub struct Room {
    room_id: RoomId,
    starting_stack: Chips,
    state: Mutex<RoomState>,
}

#[derive(Debug)]
struct RoomState {
    table: Table,
    connections: AHashMap<ConnectionId, Seat>,
    pending_removal: AHashSet<PlayerId>,
    rng: StdRng,
    last_message: Option<String>,
    announced_hand: u32,
}

/// A connection seated at the table.
#[derive(Debug)]
struct Seat {
    player_id: PlayerId,
    table_tx: mpsc::Sender<TableMessage>,
}

/// Messages built while holding a room lock.
#[derive(Debug, Default)]
#[must_use = "messages must be delivered"]
pub struct Outbox(Vec<(mpsc::Sender<TableMessage>, TableMessage)>);

impl Outbox {
    fn push(&mut self, tx: &mpsc::Sender<TableMessage>, msg: TableMessage) {
        self.0.push((tx.clone(), msg));
    }

    fn append(&mut self, mut other: Outbox) {
        self.0.append(&mut other.0);
    }

    /// Sends the messages, closed connections are skipped.
    pub async fn deliver(self) {
        for (tx, msg) in self.0 {
            let _ = tx.send(msg).await;
        }
    }
}

impl Room {
    /// Creates a new room.
    pub fn new(room_id: RoomId, config: &RoomConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        let table = Table::new(room_id.clone(), config.small_blind, config.big_blind);

        Self {
            room_id,
            starting_stack: config.starting_stack,
            state: Mutex::new(RoomState {
                table,
                connections: AHashMap::default(),
                pending_removal: AHashSet::default(),
                rng,
                last_message: None,
                announced_hand: 0,
            }),
        }
    }

    /// The room identifier.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// Seats a new player for a connection.
    ///
    /// A connection that already joined the room keeps its player.
    pub fn join(
        &self,
        conn_id: ConnectionId,
        nickname: &str,
        table_tx: mpsc::Sender<TableMessage>,
    ) -> (PlayerId, Outbox) {
        let mut state = self.state.lock();

        let player_id = match state.connections.get(&conn_id) {
            Some(seat) => seat.player_id,
            None => {
                let player_id = PlayerId::new_id();
                let player = Player::new(player_id, nickname.to_string(), self.starting_stack);
                state.table.join(player);
                state.connections.insert(conn_id, Seat {
                    player_id,
                    table_tx,
                });

                info!("Player {player_id} {nickname} joined room {}", self.room_id);
                player_id
            }
        };

        let mut outbox = state.broadcast_snapshot();
        if let (Some(seat), Some(private)) = (
            state.connections.get(&conn_id),
            state.table.private_snapshot(player_id),
        ) {
            outbox.push(&seat.table_tx, TableMessage::PrivateSnapshot(private));
        }

        (player_id, outbox)
    }

    /// Removes the player of a connection.
    ///
    /// During a hand the player folds and leaves the table when the hand is
    /// over.
    pub fn leave(&self, conn_id: ConnectionId) -> Result<Outbox, EngineError> {
        let mut state = self.state.lock();

        let Some(player_id) = state.connections.get(&conn_id).map(|s| s.player_id) else {
            return Ok(Outbox::default());
        };

        let in_hand = state.table.is_hand_in_progress();
        if in_hand {
            state.table.fold_player(player_id)?;
        }

        state.connections.remove(&conn_id);
        info!("Player {player_id} left room {}", self.room_id);

        let mut result = Outbox::default();
        if in_hand {
            state.pending_removal.insert(player_id);
            result = state.finish_hand()?;
        } else {
            state.table.remove_players(&[player_id]);
        }

        let mut outbox = state.broadcast_snapshot();
        outbox.append(result);
        Ok(outbox)
    }

    /// Starts a new hand.
    pub fn start_hand(&self) -> Result<Outbox, EngineError> {
        let mut state = self.state.lock();
        let state = &mut *state;

        if state.table.is_hand_in_progress() {
            return Err(EngineError::HandInProgress);
        }

        state.flush_removals();
        state.table.start_hand(&mut state.rng)?;
        state.table.clear_showdown();
        state.last_message = None;

        info!(
            "Room {} hand {} started with {} players",
            self.room_id,
            state.table.hand_id(),
            state.table.count_in_hand()
        );

        // Blinds may have put everyone all in.
        let result = state.finish_hand()?;

        let mut outbox = state.broadcast_snapshot();
        for seat in state.connections.values() {
            if let Some(private) = state.table.private_snapshot(seat.player_id) {
                outbox.push(&seat.table_tx, TableMessage::PrivateSnapshot(private));
            }
        }

        outbox.append(result);
        Ok(outbox)
    }

    /// Applies a player action, returns the action narration.
    pub fn send_action(
        &self,
        player_id: PlayerId,
        kind: ActionKind,
        amount: Option<Chips>,
    ) -> Result<(String, Outbox), EngineError> {
        let mut state = self.state.lock();

        let narration = state.table.apply_action(player_id, kind, amount)?;
        state.last_message = Some(narration.clone());

        let result = state.finish_hand()?;
        let mut outbox = state.broadcast_snapshot();
        outbox.append(result);
        Ok((narration, outbox))
    }

    /// Returns a snapshot of the table.
    pub fn snapshot(&self) -> Arc<TableSnapshot> {
        let state = self.state.lock();
        state.table.snapshot(state.last_message.clone())
    }

    /// The total chips in the room, players stacks and pot.
    pub fn total_chips(&self) -> Chips {
        self.state.lock().table.total_chips()
    }
}

impl RoomState {
    /// Resolves the showdown and announces the result once per hand.
    ///
    /// Players who left during the hand are removed from the table.
    fn finish_hand(&mut self) -> Result<Outbox, EngineError> {
        let mut outbox = Outbox::default();

        if self.table.needs_showdown() {
            self.table.resolve_showdown()?;
        }

        if self.table.is_hand_in_progress() || self.table.hand_id() == self.announced_hand {
            return Ok(outbox);
        }

        self.announced_hand = self.table.hand_id();
        if let Some(result) = self.table.showdown_message() {
            for seat in self.connections.values() {
                outbox.push(&seat.table_tx, TableMessage::Info(result.to_string()));
            }
        }

        self.flush_removals();
        Ok(outbox)
    }

    /// Removes the players who left during a hand.
    fn flush_removals(&mut self) {
        if !self.pending_removal.is_empty() {
            let leaving = self.pending_removal.drain().collect::<Vec<_>>();
            self.table.remove_players(&leaving);
        }
    }

    /// Creates a table snapshot message for each connection.
    fn broadcast_snapshot(&self) -> Outbox {
        let snapshot = self.table.snapshot(self.last_message.clone());

        let mut outbox = Outbox::default();
        for seat in self.connections.values() {
            outbox.push(
                &seat.table_tx,
                TableMessage::TableSnapshot(snapshot.clone()),
            );
        }

        outbox
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokeroom_core::table::{PlayerStatus, Street};

    async fn join(
        room: &Room,
        nickname: &str,
    ) -> (ConnectionId, PlayerId, mpsc::Receiver<TableMessage>) {
        let (tx, rx) = mpsc::channel(64);
        let conn_id = ConnectionId::new_id();
        let (player_id, outbox) = room.join(conn_id, nickname, tx);
        outbox.deliver().await;
        (conn_id, player_id, rx)
    }

    #[tokio::test]
    async fn leave_mid_hand_keeps_seat_until_hand_ends() {
        let config = RoomConfig {
            seed: Some(42),
            ..RoomConfig::default()
        };
        let room = Room::new(RoomId::from("leave"), &config);

        let (_, alice, _alice_rx) = join(&room, "Alice").await;
        let (bob_conn, bob, mut bob_rx) = join(&room, "Bob").await;
        let (_, carol, _carol_rx) = join(&room, "Carol").await;

        room.start_hand().unwrap().deliver().await;
        while bob_rx.try_recv().is_ok() {}

        // Bob is on turn, folds and stops getting messages.
        room.leave(bob_conn).unwrap().deliver().await;
        assert!(bob_rx.try_recv().is_err());

        let snapshot = room.snapshot();
        assert_eq!(snapshot.street, Street::Preflop);
        assert_eq!(snapshot.turn, 2);
        assert_eq!(snapshot.players[1].player_id, bob);
        assert_eq!(snapshot.players[1].status, PlayerStatus::Folded);

        // Leaving again does nothing.
        room.leave(bob_conn).unwrap().deliver().await;
        assert_eq!(room.snapshot().players.len(), 3);

        // Bob is removed when the hand ends.
        let (narration, outbox) = room.send_action(carol, ActionKind::Fold, None).unwrap();
        outbox.deliver().await;
        assert_eq!(narration, "Carol: Fold");

        let snapshot = room.snapshot();
        assert_eq!(snapshot.street, Street::Showdown);
        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(snapshot.players[0].player_id, alice);
        assert_eq!(snapshot.players[0].stack, Chips::new(1010));
        assert_eq!(room.total_chips(), Chips::new(2000));
    }
}
