// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Rooms registry.
use ahash::AHashMap;
use log::info;
use parking_lot::Mutex;
use std::sync::Arc;

use pokeroom_core::poker::RoomId;

use crate::{config::RoomConfig, room::Room};

/// The rooms players can join, created the first time they are referenced.
#[derive(Debug)]
pub struct Rooms {
    config: RoomConfig,
    rooms: Mutex<AHashMap<RoomId, Arc<Room>>>,
}

impl Rooms {
    /// Creates an empty registry, new rooms use the given config.
    pub fn new(config: RoomConfig) -> Self {
        Self {
            config,
            rooms: Mutex::new(AHashMap::default()),
        }
    }

    /// Returns a room, creating it if it doesn't exist.
    pub fn get_or_create(&self, room_id: &RoomId) -> Arc<Room> {
        let mut rooms = self.rooms.lock();
        rooms
            .entry(room_id.clone())
            .or_insert_with(|| {
                info!("Created room {room_id}");
                Arc::new(Room::new(room_id.clone(), &self.config))
            })
            .clone()
    }

    /// Returns a room if it exists.
    pub fn get(&self, room_id: &RoomId) -> Option<Arc<Room>> {
        self.rooms.lock().get(room_id).cloned()
    }

    /// Number of rooms.
    pub fn len(&self) -> usize {
        self.rooms.lock().len()
    }

    /// Checks if there are no rooms.
    pub fn is_empty(&self) -> bool {
        self.rooms.lock().is_empty()
    }
}
