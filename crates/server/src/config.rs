// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Rooms configuration.
use pokeroom_core::poker::Chips;

/// The configuration used to create every room.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// The chips given to a player who joins a room.
    pub starting_stack: Chips,
    /// The small blind.
    pub small_blind: Chips,
    /// The big blind.
    pub big_blind: Chips,
    /// The seed for the rooms random source, `None` to seed from the OS.
    pub seed: Option<u64>,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            starting_stack: Chips::new(1_000),
            small_blind: Chips::new(10),
            big_blind: Chips::new(20),
            seed: None,
        }
    }
}
