// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Pokeroom core types.
//!
//! The [table::Table] holds the state of a single poker table and the
//! [engine] module implements the betting rounds state machine on top of it,
//! from posting blinds to the showdown. Tables are plain data, callers are
//! responsible for serializing access to a table.
#![warn(clippy::all, rust_2018_idioms, missing_docs)]

pub mod engine;
pub mod error;
pub mod message;
pub mod poker;
mod showdown;
pub mod table;

pub use error::EngineError;
