// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Table and players state.
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

use crate::{
    message::{CardView, PlayerAction, PlayerSnapshot, PrivateSnapshot, TableSnapshot},
    poker::{Card, Chips, Deck, PlayerId, RoomId},
};

/// A betting street.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Street {
    /// Hole cards dealt, blinds posted.
    Preflop,
    /// Three board cards.
    Flop,
    /// Four board cards.
    Turn,
    /// Five board cards.
    River,
    /// The hand is over.
    Showdown,
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let street = match self {
            Street::Preflop => "Preflop",
            Street::Flop => "Flop",
            Street::Turn => "Turn",
            Street::River => "River",
            Street::Showdown => "Showdown",
        };

        f.write_str(street)
    }
}

/// A player status in the current hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// In the hand and can act.
    Active,
    /// Folded this hand.
    Folded,
    /// In the hand with no chips left to bet.
    AllIn,
    /// Not playing this hand.
    Out,
}

/// A table player.
#[derive(Debug, Clone)]
pub struct Player {
    /// The player id.
    pub player_id: PlayerId,
    /// The player nickname.
    pub nickname: String,
    /// The player chips not yet in the pot.
    pub stack: Chips,
    /// The chips bet on this street.
    pub bet: Chips,
    /// The player status.
    pub status: PlayerStatus,
    /// The last action on this street.
    pub action: PlayerAction,
    /// The player private cards.
    pub hole_cards: Option<[Card; 2]>,
}

impl Player {
    /// Creates a new player waiting for the next hand.
    pub fn new(player_id: PlayerId, nickname: String, stack: Chips) -> Self {
        Self {
            player_id,
            nickname,
            stack,
            bet: Chips::ZERO,
            status: PlayerStatus::Out,
            action: PlayerAction::None,
            hole_cards: None,
        }
    }

    /// Checks if the player is still contending the pot.
    pub fn is_in_hand(&self) -> bool {
        matches!(self.status, PlayerStatus::Active | PlayerStatus::AllIn)
    }

    /// Checks if the player can act.
    pub fn is_active(&self) -> bool {
        self.status == PlayerStatus::Active
    }

    /// Moves up to `amount` chips from the stack to the bet.
    ///
    /// Returns the chips moved, a player left with an empty stack goes all in.
    pub(crate) fn take_chips(&mut self, amount: Chips) -> Chips {
        let chips = amount.min(self.stack);
        self.stack -= chips;
        self.bet += chips;

        if self.stack == Chips::ZERO && self.status == PlayerStatus::Active {
            self.status = PlayerStatus::AllIn;
        }

        chips
    }

    /// Sets this player in fold state.
    pub(crate) fn fold(&mut self) {
        self.status = PlayerStatus::Folded;
        self.action = PlayerAction::Fold;
    }

    /// Reset state for a new hand.
    pub(crate) fn start_hand(&mut self) {
        self.status = if self.stack > Chips::ZERO {
            PlayerStatus::Active
        } else {
            PlayerStatus::Out
        };
        self.bet = Chips::ZERO;
        self.action = PlayerAction::None;
        self.hole_cards = None;
    }
}

/// The cards and hand a player showed at showdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowdownHand {
    /// The player id.
    pub player_id: PlayerId,
    /// The player hole cards.
    pub cards: [Card; 2],
    /// The hand description.
    pub description: String,
}

/// The state of a poker table.
///
/// Seats are indices in the players list, a seat index is always taken
/// modulo the number of players at the table.
#[derive(Debug)]
pub struct Table {
    pub(crate) room_id: RoomId,
    pub(crate) hand_id: u32,
    pub(crate) street: Street,
    pub(crate) board: Vec<Card>,
    pub(crate) pot: Chips,
    pub(crate) dealer: usize,
    pub(crate) turn: usize,
    pub(crate) current_bet: Chips,
    pub(crate) small_blind: Chips,
    pub(crate) big_blind: Chips,
    pub(crate) last_aggressor: Option<usize>,
    pub(crate) actions_since_raise: u32,
    pub(crate) players: Vec<Player>,
    pub(crate) deck: Option<Deck>,
    pub(crate) settled: bool,
    pub(crate) showdown: Vec<ShowdownHand>,
    pub(crate) showdown_message: Option<String>,
}

impl Table {
    /// Creates an empty table.
    pub fn new(room_id: RoomId, small_blind: Chips, big_blind: Chips) -> Self {
        Self {
            room_id,
            hand_id: 0,
            street: Street::Showdown,
            board: Vec::default(),
            pot: Chips::ZERO,
            dealer: 0,
            turn: 0,
            current_bet: Chips::ZERO,
            small_blind,
            big_blind,
            last_aggressor: None,
            actions_since_raise: 0,
            players: Vec::default(),
            deck: None,
            settled: true,
            showdown: Vec::default(),
            showdown_message: None,
        }
    }

    /// The table room.
    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// The current hand number.
    pub fn hand_id(&self) -> u32 {
        self.hand_id
    }

    /// The current street.
    pub fn street(&self) -> Street {
        self.street
    }

    /// The board cards.
    pub fn board(&self) -> &[Card] {
        &self.board
    }

    /// The chips in the pot.
    pub fn pot(&self) -> Chips {
        self.pot
    }

    /// The dealer seat.
    pub fn dealer(&self) -> usize {
        self.dealer
    }

    /// The seat on turn.
    pub fn turn(&self) -> usize {
        self.turn
    }

    /// The bet to match on this street.
    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }

    /// The seat of the last player who raised on this street.
    pub fn last_aggressor(&self) -> Option<usize> {
        self.last_aggressor
    }

    /// Actions taken since the last raise on this street.
    pub fn actions_since_raise(&self) -> u32 {
        self.actions_since_raise
    }

    /// The players in seat order.
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    /// Returns a player given its id.
    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    /// Returns the seat of a player.
    pub fn seat_of(&self, player_id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.player_id == player_id)
    }

    /// Checks if a hand is being played.
    pub fn is_hand_in_progress(&self) -> bool {
        self.deck.is_some() && self.street != Street::Showdown
    }

    /// Checks if the hand reached showdown and the pot has not been awarded.
    pub fn needs_showdown(&self) -> bool {
        self.street == Street::Showdown && !self.settled
    }

    /// The hands shown at the last showdown.
    pub fn showdown_hands(&self) -> &[ShowdownHand] {
        &self.showdown
    }

    /// The result of the last hand.
    pub fn showdown_message(&self) -> Option<&str> {
        self.showdown_message.as_deref()
    }

    /// The total chips at the table, stacks and pot.
    pub fn total_chips(&self) -> Chips {
        self.players.iter().map(|p| p.stack).sum::<Chips>() + self.pot
    }

    /// Seats a new player.
    ///
    /// A player joining during a hand sits out until the next hand.
    pub fn join(&mut self, player: Player) {
        self.players.push(player);
    }

    /// Removes players from the table, callers must not remove players
    /// during a hand.
    pub fn remove_players(&mut self, player_ids: &[PlayerId]) {
        self.players.retain(|p| !player_ids.contains(&p.player_id));

        let count = self.players.len();
        if count == 0 {
            self.dealer = 0;
            self.turn = 0;
        } else {
            self.dealer %= count;
            self.turn %= count;
        }
    }

    /// Clears the previous hand showdown results.
    pub fn clear_showdown(&mut self) {
        self.showdown.clear();
        self.showdown_message = None;
    }

    /// Splits the pot between the winning seats.
    ///
    /// The first winner in seat order gets the chips that cannot be split
    /// evenly. Returns the chips paid to each winner before the remainder.
    pub(crate) fn award_pot(&mut self, winners: &[usize]) -> Chips {
        let Some(&first) = winners.iter().min() else {
            return Chips::ZERO;
        };

        let share = self.pot / winners.len() as u32;
        let remainder = self.pot % winners.len() as u32;
        for &seat in winners {
            self.players[seat].stack += share;
        }

        self.players[first].stack += remainder;
        self.pot = Chips::ZERO;
        share
    }

    /// Records the showdown results and settles the hand.
    pub(crate) fn set_showdown(&mut self, hands: Vec<ShowdownHand>, message: String) {
        self.showdown = hands;
        self.showdown_message = Some(message);
        self.settled = true;
    }

    /// Returns the next active seat after `seat`, or `seat` if there is none.
    pub fn next_active_seat(&self, seat: usize) -> usize {
        let count = self.players.len();
        (1..=count)
            .map(|step| (seat + step) % count)
            .find(|&idx| self.players[idx].is_active())
            .unwrap_or(seat)
    }

    /// Number of players that can act.
    pub fn count_active(&self) -> usize {
        self.players.iter().filter(|p| p.is_active()).count()
    }

    /// Number of players contending the pot.
    pub fn count_in_hand(&self) -> usize {
        self.players.iter().filter(|p| p.is_in_hand()).count()
    }

    /// Creates the public snapshot of this table.
    ///
    /// At showdown the hand result replaces the given message.
    pub fn snapshot(&self, message: Option<String>) -> Arc<TableSnapshot> {
        let at_showdown = self.street == Street::Showdown;
        let message = match &self.showdown_message {
            Some(result) if at_showdown => Some(result.clone()),
            _ => message,
        };

        let players = self
            .players
            .iter()
            .map(|p| {
                let shown = self
                    .showdown
                    .iter()
                    .find(|h| at_showdown && h.player_id == p.player_id);

                PlayerSnapshot {
                    player_id: p.player_id,
                    nickname: p.nickname.clone(),
                    stack: p.stack,
                    bet: p.bet,
                    status: p.status,
                    action: p.action,
                    hole_cards: if p.hole_cards.is_some() { 2 } else { 0 },
                    revealed: shown.map(|h| h.cards.map(CardView::from)),
                    hand: shown.map(|h| h.description.clone()),
                }
            })
            .collect();

        Arc::new(TableSnapshot {
            room_id: self.room_id.clone(),
            hand_id: self.hand_id,
            street: self.street,
            pot: self.pot,
            current_bet: self.current_bet,
            dealer: self.dealer,
            turn: self.turn,
            board: self.board.iter().copied().map(CardView::from).collect(),
            players,
            message,
        })
    }

    /// Creates the private snapshot for a player.
    pub fn private_snapshot(&self, player_id: PlayerId) -> Option<PrivateSnapshot> {
        self.player(player_id).map(|p| PrivateSnapshot {
            player_id,
            cards: p.hole_cards.map(|cards| cards.map(CardView::from)),
        })
    }
}
