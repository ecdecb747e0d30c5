// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Pokeroom server.
//!
//! A [Hub] routes player requests to rooms, each room guards its table with
//! its own lock so that rooms run in parallel while the operations on a room
//! are serialized.
#![warn(clippy::all, rust_2018_idioms, missing_docs)]

pub mod config;
pub mod hub;
pub mod room;
pub mod rooms;
pub mod sim;

pub use config::RoomConfig;
pub use hub::Hub;
