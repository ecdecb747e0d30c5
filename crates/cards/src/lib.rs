// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Pokeroom cards types.
//!
//! This crate defines the types to create cards:
//!
//! ```
//! # use pokeroom_cards::{Card, Rank, Suit};
//! let ah = Card::new(Rank::Ace, Suit::Hearts);
//! assert_eq!(ah.to_string(), "A♥");
//!
//! let td: Card = "Td".parse().unwrap();
//! assert_eq!(td.to_string(), "10♦");
//! ```
//!
//! and a [Deck] type that deals the 52 cards once in shuffled order:
//!
//! ```
//! # use pokeroom_cards::Deck;
//! # use rand::{SeedableRng, rngs::StdRng};
//! let mut rng = StdRng::seed_from_u64(7);
//! let mut deck = Deck::new_and_shuffled(&mut rng);
//!
//! let mut dealt = 0;
//! while deck.deal().is_some() {
//!     dealt += 1;
//! }
//! assert_eq!(dealt, Deck::SIZE);
//! ```
#![warn(clippy::all, rust_2018_idioms, missing_docs)]
mod deck;
pub use deck::{Card, Deck, ParseCardError, Rank, Suit};
