// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Operations exposed to player connections.
use ahash::AHashMap;
use log::{error, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

use pokeroom_core::{
    EngineError,
    message::{ActionKind, TableMessage},
    poker::{Chips, ConnectionId, PlayerId, RoomId},
};

use crate::{config::RoomConfig, room::Room, rooms::Rooms};

/// Routes connection requests to rooms.
///
/// Room messages are delivered to the connection channels after the room
/// lock has been released.
#[derive(Debug, Clone)]
pub struct Hub(Arc<Shared>);

#[derive(Debug)]
struct Shared {
    rooms: Rooms,
    sessions: Mutex<AHashMap<ConnectionId, Vec<RoomId>>>,
}

impl Hub {
    /// Creates a hub with rooms created from the given config.
    pub fn new(config: RoomConfig) -> Self {
        Self(Arc::new(Shared {
            rooms: Rooms::new(config),
            sessions: Mutex::new(AHashMap::default()),
        }))
    }

    /// Joins a room, the room is created if it doesn't exist.
    ///
    /// Table messages for the player are sent to `table_tx`.
    pub async fn join_room(
        &self,
        conn_id: ConnectionId,
        room_id: &RoomId,
        nickname: &str,
        table_tx: mpsc::Sender<TableMessage>,
    ) -> PlayerId {
        let room = self.0.rooms.get_or_create(room_id);
        let (player_id, outbox) = room.join(conn_id, nickname, table_tx);

        {
            let mut sessions = self.0.sessions.lock();
            let rooms = sessions.entry(conn_id).or_default();
            if !rooms.contains(room_id) {
                rooms.push(room_id.clone());
            }
        }

        outbox.deliver().await;
        player_id
    }

    /// Leaves a room, does nothing if the room doesn't exist.
    pub async fn leave_room(&self, conn_id: ConnectionId, room_id: &RoomId) {
        if let Some(rooms) = self.0.sessions.lock().get_mut(&conn_id) {
            rooms.retain(|r| r != room_id);
        }

        if let Some(room) = self.0.rooms.get(room_id) {
            self.leave(&room, conn_id).await;
        }
    }

    /// Starts a new hand in a room.
    pub async fn start_hand(&self, room_id: &RoomId) -> Result<(), EngineError> {
        let room = self.room_or_err(room_id)?;
        let outbox = room
            .start_hand()
            .inspect_err(|e| log_error(room_id, "start hand", e))?;
        outbox.deliver().await;
        Ok(())
    }

    /// Sends a player action to a room, returns the action narration.
    pub async fn send_action(
        &self,
        room_id: &RoomId,
        player_id: PlayerId,
        kind: ActionKind,
        amount: Option<Chips>,
    ) -> Result<String, EngineError> {
        let room = self.room_or_err(room_id)?;
        let (narration, outbox) = room
            .send_action(player_id, kind, amount)
            .inspect_err(|e| log_error(room_id, "action", e))?;
        outbox.deliver().await;
        Ok(narration)
    }

    /// Leaves all the rooms joined by a connection.
    pub async fn on_disconnected(&self, conn_id: ConnectionId) {
        let room_ids = self.0.sessions.lock().remove(&conn_id).unwrap_or_default();
        for room_id in room_ids {
            if let Some(room) = self.0.rooms.get(&room_id) {
                self.leave(&room, conn_id).await;
            }
        }
    }

    /// Returns a room if it exists.
    pub fn room(&self, room_id: &RoomId) -> Option<Arc<Room>> {
        self.0.rooms.get(room_id)
    }

    async fn leave(&self, room: &Room, conn_id: ConnectionId) {
        match room.leave(conn_id) {
            Ok(outbox) => outbox.deliver().await,
            Err(e) => log_error(room.room_id(), "leave", &e),
        }
    }

    fn room_or_err(&self, room_id: &RoomId) -> Result<Arc<Room>, EngineError> {
        self.0.rooms.get(room_id).ok_or_else(|| {
            warn!("Room {room_id} not found");
            EngineError::UnknownRoom(room_id.clone())
        })
    }
}

fn log_error(room_id: &RoomId, op: &str, err: &EngineError) {
    if err.is_invariant_violation() {
        error!("Room {room_id} {op} failed: {err}");
    } else {
        warn!("Room {room_id} {op} rejected: {err}");
    }
}
