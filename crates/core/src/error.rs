// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Errors returned by table operations.
use pokeroom_eval::EvalError;
use thiserror::Error;

use crate::poker::{Chips, PlayerId, RoomId};

/// An error from a table operation.
///
/// Validation errors leave the table untouched and are reported to the caller
/// that made the request. Invariant violations signal a bug in the engine,
/// see [EngineError::is_invariant_violation].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Fewer than two players with chips are seated.
    #[error("Need at least 2 players with chips to start a hand")]
    NotEnoughPlayers,
    /// A hand is being played.
    #[error("A hand is already in progress")]
    HandInProgress,
    /// An action was sent while no hand is being played.
    #[error("No hand in progress")]
    NoHandInProgress,
    /// The room doesn't exist.
    #[error("Room {0} not found")]
    UnknownRoom(RoomId),
    /// The player is not seated at the table.
    #[error("Player {0} is not at the table")]
    UnknownPlayer(PlayerId),
    /// The player doesn't hold the turn.
    #[error("Not your turn")]
    NotYourTurn,
    /// The player is not active in the hand.
    #[error("Player is not active in this hand")]
    PlayerInactive,
    /// Check with chips to call.
    #[error("Cannot check, there are chips to call")]
    IllegalCheck,
    /// The raise total doesn't exceed the current bet.
    #[error("Raise must be above the current bet of {current_bet}")]
    IllegalRaise {
        /// The bet the raise has to exceed.
        current_bet: Chips,
    },
    /// An action name that is not fold, check, call or raise.
    #[error("Unknown action '{0}'")]
    UnknownAction(String),
    /// More than 52 cards drawn in a hand.
    #[error("Deck exhausted")]
    DeckExhausted,
    /// A street must be dealt but there is no deck.
    #[error("No deck to deal from")]
    MissingDeck,
    /// Hand evaluation failed.
    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl EngineError {
    /// Checks if this error is an engine bug rather than a rejected request.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            EngineError::DeckExhausted | EngineError::MissingDeck | EngineError::Eval(_)
        )
    }
}
