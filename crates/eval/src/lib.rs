// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Pokeroom hand evaluator.
//!
//! Evaluates a 7 cards hand by scoring each of its 21 five cards subsets and
//! keeping the best one. The result is a [BestHand] with the [HandValue] used
//! to compare hands and the five cards that make the hand:
//!
//! ```
//! # use pokeroom_eval::*;
//! let cards = ["As", "Ks", "Qs", "Js", "Ts", "2d", "3c"]
//!     .iter()
//!     .map(|c| c.parse().unwrap())
//!     .collect::<Vec<Card>>();
//!
//! let best = BestHand::eval(&cards).unwrap();
//! assert_eq!(best.value().category(), HandCategory::StraightFlush);
//! assert_eq!(best.to_string(), "Straight Flush (A♠ K♠ Q♠ J♠ 10♠)");
//! ```
#![warn(clippy::all, rust_2018_idioms, missing_docs)]
pub mod eval;
pub use eval::{BestHand, EvalError, HandCategory, HandValue};

// Reexport cards types.
pub use pokeroom_cards::{Card, Deck, Rank, Suit};
