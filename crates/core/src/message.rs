// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Messages and snapshots sent from a table to connected players.
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr, sync::Arc};

use crate::{
    error::EngineError,
    poker::{Card, Chips, PlayerId, RoomId},
    table::{PlayerStatus, Street},
};

/// A message from a table to a player connection.
#[derive(Debug, Clone)]
pub enum TableMessage {
    /// The public table state, shared by all connections.
    TableSnapshot(Arc<TableSnapshot>),
    /// The receiving player hole cards.
    PrivateSnapshot(PrivateSnapshot),
    /// A one time informational message, like a hand result.
    Info(String),
}

/// A card as seen by clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardView {
    /// The suit code from 1 to 4.
    pub suit: u8,
    /// The rank value from 2 to 14.
    pub rank: u8,
    /// The card text, rank followed by the suit glyph.
    pub text: String,
}

impl From<Card> for CardView {
    fn from(card: Card) -> Self {
        Self {
            suit: card.suit().value(),
            rank: card.rank().value(),
            text: card.to_string(),
        }
    }
}

/// The public state of a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSnapshot {
    /// The table room.
    pub room_id: RoomId,
    /// The hand number, zero before the first hand.
    pub hand_id: u32,
    /// The current street.
    pub street: Street,
    /// The pot.
    pub pot: Chips,
    /// The bet to match on this street.
    pub current_bet: Chips,
    /// The dealer seat.
    pub dealer: usize,
    /// The seat on turn.
    pub turn: usize,
    /// The board cards.
    pub board: Vec<CardView>,
    /// The players in seat order.
    pub players: Vec<PlayerSnapshot>,
    /// The last action narration or the hand result.
    pub message: Option<String>,
}

/// The public state of a player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// The player id.
    pub player_id: PlayerId,
    /// The player nickname.
    pub nickname: String,
    /// The player stack.
    pub stack: Chips,
    /// The player bet on this street.
    pub bet: Chips,
    /// The player status.
    pub status: PlayerStatus,
    /// The player last action on this street.
    pub action: PlayerAction,
    /// Number of hole cards, 0 or 2.
    pub hole_cards: u8,
    /// Cards revealed at showdown.
    pub revealed: Option<[CardView; 2]>,
    /// The hand description at showdown.
    pub hand: Option<String>,
}

/// The private state of a player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateSnapshot {
    /// The player id.
    pub player_id: PlayerId,
    /// The player hole cards, `None` if cards have not been dealt.
    pub cards: Option<[CardView; 2]>,
}

/// The last action of a player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerAction {
    /// No action.
    #[default]
    None,
    /// Player paid the small blind.
    SmallBlind,
    /// Player paid the big blind.
    BigBlind,
    /// Player folded.
    Fold,
    /// Player checked.
    Check,
    /// Player called.
    Call,
    /// Player raised.
    Raise,
}

/// An action requested by a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    /// Give up the hand.
    Fold,
    /// Pass with nothing to call.
    Check,
    /// Match the current bet.
    Call,
    /// Raise the total bet for this street.
    Raise,
}

impl FromStr for ActionKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fold" => Ok(ActionKind::Fold),
            "check" => Ok(ActionKind::Check),
            "call" => Ok(ActionKind::Call),
            "raise" => Ok(ActionKind::Raise),
            _ => Err(EngineError::UnknownAction(s.to_string())),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            ActionKind::Fold => "Fold",
            ActionKind::Check => "Check",
            ActionKind::Call => "Call",
            ActionKind::Raise => "Raise",
        };

        f.write_str(kind)
    }
}
