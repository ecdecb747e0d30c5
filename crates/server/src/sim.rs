// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Rooms simulation with automated players.
use anyhow::{Result, bail};
use log::{debug, info, warn};
use std::sync::Arc;
use tokio::{
    sync::{Notify, mpsc},
    task::JoinSet,
    time::{self, Duration},
};

use pokeroom_core::{
    EngineError,
    message::{ActionKind, TableMessage, TableSnapshot},
    poker::{Chips, ConnectionId, PlayerId, RoomId},
    table::{PlayerStatus, Street},
};

use crate::{config::RoomConfig, hub::Hub};

/// A player strategy.
pub trait Strategy: Send + 'static {
    /// Returns the action for the player on the given seat.
    fn execute(&mut self, table: &TableSnapshot, seat: usize) -> (ActionKind, Option<Chips>);
}

/// Checks when possible, calls unless the call costs more than half the stack.
#[derive(Debug, Clone, Default)]
pub struct CallOrCheck;

impl Strategy for CallOrCheck {
    fn execute(&mut self, table: &TableSnapshot, seat: usize) -> (ActionKind, Option<Chips>) {
        let player = &table.players[seat];
        let to_call = table.current_bet - player.bet;
        if to_call == Chips::ZERO {
            (ActionKind::Check, None)
        } else if to_call > player.stack / 2 {
            (ActionKind::Fold, None)
        } else {
            (ActionKind::Call, None)
        }
    }
}

/// Simulation config.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Number of rooms.
    pub rooms: usize,
    /// Number of players in each room.
    pub players: usize,
    /// Number of hands to play in each room.
    pub hands: u32,
    /// Seed for the rooms random source.
    pub seed: Option<u64>,
}

/// The state of a room at the end of a simulation.
#[derive(Debug, Clone)]
pub struct RoomResult {
    /// The room.
    pub room_id: RoomId,
    /// Number of hands played.
    pub hands: u32,
    /// The players stacks.
    pub stacks: Vec<(String, Chips)>,
    /// The total chips in the room.
    pub total_chips: Chips,
}

static NICKNAMES: &[&str] = &["Alice", "Bob", "Carol", "Dave", "Frank", "Mike"];

/// The time a hand can take before the room simulation is stopped.
const HAND_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the simulation, each player gets a strategy from the factory.
pub async fn run<F, S>(config: SimConfig, factory: F) -> Result<Vec<RoomResult>>
where
    F: Fn() -> S,
    S: Strategy,
{
    if config.players < 2 {
        bail!("A room needs at least 2 players");
    }

    let hub = Hub::new(RoomConfig {
        seed: config.seed,
        ..RoomConfig::default()
    });

    let mut rooms = JoinSet::new();
    for idx in 0..config.rooms {
        let room_id = RoomId::from(format!("room-{idx}"));
        let hand_done = Arc::new(Notify::new());

        let mut conns = Vec::with_capacity(config.players);
        let mut players = JoinSet::new();
        for seat in 0..config.players {
            let nickname = format!("{}-{seat}", NICKNAMES[seat % NICKNAMES.len()]);
            let (table_tx, table_rx) = mpsc::channel(1024);
            let conn_id = ConnectionId::new_id();
            let player_id = hub.join_room(conn_id, &room_id, &nickname, table_tx).await;
            conns.push(conn_id);

            let bot = Bot {
                hub: hub.clone(),
                room_id: room_id.clone(),
                player_id,
                strategy: factory(),
                hand_done: hand_done.clone(),
            };
            players.spawn(bot.run(table_rx));
        }

        let hub = hub.clone();
        let hands = config.hands;
        rooms.spawn(async move {
            let result = play_hands(&hub, &room_id, hands, &hand_done).await;

            for conn_id in conns {
                hub.on_disconnected(conn_id).await;
            }

            players.join_all().await;
            result
        });
    }

    let results = rooms.join_all().await;
    for result in &results {
        info!(
            "Room {} played {} hands, total chips {}",
            result.room_id, result.hands, result.total_chips
        );
    }

    Ok(results)
}

/// Starts hands until the configured number of hands has been played.
async fn play_hands(hub: &Hub, room_id: &RoomId, hands: u32, hand_done: &Notify) -> RoomResult {
    let mut played = 0;
    while played < hands {
        match hub.start_hand(room_id).await {
            Ok(()) => played += 1,
            Err(EngineError::NotEnoughPlayers) => {
                info!("Room {room_id} has a winner after {played} hands");
                break;
            }
            Err(e) => {
                warn!("Room {room_id} stopped: {e}");
                break;
            }
        }

        let wait_hand = async {
            while !is_hand_over(hub, room_id) {
                hand_done.notified().await;
            }
        };

        if time::timeout(HAND_TIMEOUT, wait_hand).await.is_err() {
            warn!("Room {room_id} hand {played} timed out");
            break;
        }
    }

    let room = hub.room(room_id);
    let snapshot = room.as_ref().map(|r| r.snapshot());
    RoomResult {
        room_id: room_id.clone(),
        hands: played,
        stacks: snapshot
            .map(|s| s.players.iter().map(|p| (p.nickname.clone(), p.stack)).collect())
            .unwrap_or_default(),
        total_chips: room.map(|r| r.total_chips()).unwrap_or_default(),
    }
}

fn is_hand_over(hub: &Hub, room_id: &RoomId) -> bool {
    hub.room(room_id)
        .map(|room| room.snapshot().street == Street::Showdown)
        .unwrap_or(true)
}

/// An automated player.
struct Bot<S: Strategy> {
    hub: Hub,
    room_id: RoomId,
    player_id: PlayerId,
    strategy: S,
    hand_done: Arc<Notify>,
}

impl<S: Strategy> Bot<S> {
    /// Reacts to table messages until the connection is closed.
    async fn run(mut self, mut table_rx: mpsc::Receiver<TableMessage>) {
        while let Some(msg) = table_rx.recv().await {
            match msg {
                TableMessage::TableSnapshot(table) => self.on_snapshot(&table).await,
                TableMessage::Info(result) => {
                    debug!("Player {} got {result}", self.player_id);
                    self.hand_done.notify_one();
                }
                TableMessage::PrivateSnapshot(_) => {}
            }
        }
    }

    async fn on_snapshot(&mut self, table: &TableSnapshot) {
        let Some(seat) = table
            .players
            .iter()
            .position(|p| p.player_id == self.player_id)
        else {
            return;
        };

        let on_turn = table.street != Street::Showdown
            && table.turn == seat
            && table.players[seat].status == PlayerStatus::Active;
        if !on_turn {
            return;
        }

        let (kind, amount) = self.strategy.execute(table, seat);

        // Actions on an outdated snapshot are rejected.
        if let Err(e) = self
            .hub
            .send_action(&self.room_id, self.player_id, kind, amount)
            .await
        {
            debug!("Player {} action {kind} rejected: {e}", self.player_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pokeroom_core::message::PlayerSnapshot;

    #[test]
    fn call_or_check_strategy() {
        let player = |stack: u32, bet: u32| PlayerSnapshot {
            player_id: PlayerId::new_id(),
            nickname: "Alice".to_string(),
            stack: Chips::new(stack),
            bet: Chips::new(bet),
            status: PlayerStatus::Active,
            action: Default::default(),
            hole_cards: 2,
            revealed: None,
            hand: None,
        };

        let mut table = TableSnapshot {
            room_id: RoomId::from("sim"),
            hand_id: 1,
            street: Street::Flop,
            pot: Chips::new(100),
            current_bet: Chips::ZERO,
            dealer: 0,
            turn: 0,
            board: vec![],
            players: vec![player(500, 0)],
            message: None,
        };

        let mut strategy = CallOrCheck;
        assert_eq!(strategy.execute(&table, 0), (ActionKind::Check, None));

        table.current_bet = Chips::new(200);
        assert_eq!(strategy.execute(&table, 0), (ActionKind::Call, None));

        table.current_bet = Chips::new(300);
        assert_eq!(strategy.execute(&table, 0), (ActionKind::Fold, None));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn simulation_conserves_chips() {
        let config = SimConfig {
            rooms: 4,
            players: 3,
            hands: 5,
            seed: Some(7),
        };

        let results = run(config, || CallOrCheck).await.unwrap();
        assert_eq!(results.len(), 4);

        for result in results {
            assert!(result.hands > 0);
            assert_eq!(result.stacks.len(), 3);
            assert_eq!(result.total_chips, Chips::new(3000));
        }
    }

    #[tokio::test]
    async fn simulation_needs_two_players() {
        let config = SimConfig {
            rooms: 1,
            players: 1,
            hands: 5,
            seed: None,
        };

        assert!(run(config, || CallOrCheck).await.is_err());
    }
}
