// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Betting rounds state machine.
//!
//! A hand goes through the [Street]s from preflop to showdown. Players act in
//! seat order and a street is complete once every active player has matched
//! the current bet and has acted since the last raise. When a single player
//! is left in the hand the pot is awarded without a showdown. Players with no
//! chips left go all in and stay in the hand without acting, once fewer than
//! two players can act the remaining streets are dealt out.
//!
//! The showdown itself is left to the caller, see [Table::needs_showdown].
use log::debug;
use rand::Rng;

use crate::{
    error::EngineError,
    message::{ActionKind, PlayerAction},
    poker::{Chips, Deck, PlayerId},
    table::{PlayerStatus, Street, Table},
};

impl Table {
    /// Starts a new hand.
    ///
    /// Shuffles a new deck with the given random source, deals two cards to
    /// each player with chips, moves the dealer button and posts the blinds.
    pub fn start_hand<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<(), EngineError> {
        let with_chips = self.players.iter().filter(|p| p.stack > Chips::ZERO).count();
        if self.players.len() < 2 || with_chips < 2 {
            return Err(EngineError::NotEnoughPlayers);
        }

        self.hand_id += 1;
        self.board.clear();
        self.pot = Chips::ZERO;
        self.settled = false;

        for player in &mut self.players {
            player.start_hand();
        }

        let mut deck = Deck::new_and_shuffled(rng);
        for player in self.players.iter_mut().filter(|p| p.is_active()) {
            let c1 = deck.deal().ok_or(EngineError::DeckExhausted)?;
            let c2 = deck.deal().ok_or(EngineError::DeckExhausted)?;
            player.hole_cards = Some([c1, c2]);
        }

        self.deck = Some(deck);
        self.street = Street::Preflop;

        self.dealer = (self.dealer + 1) % self.players.len();
        let sb = self.next_active_seat(self.dealer);
        let bb = self.next_active_seat(sb);

        self.post_blind(sb, self.small_blind, PlayerAction::SmallBlind);
        self.post_blind(bb, self.big_blind, PlayerAction::BigBlind);

        self.current_bet = self.big_blind;
        self.last_aggressor = Some(bb);
        self.actions_since_raise = 0;
        self.turn = self.next_active_seat(bb);

        debug!(
            "Room {} hand {} dealer {} sb {sb} bb {bb}",
            self.room_id, self.hand_id, self.dealer
        );

        // Blinds may have put players all in.
        self.deal_completed_streets()
    }

    /// Applies a player action.
    ///
    /// For a raise `amount` is the total bet for this street, capped at the
    /// player chips. Returns the action narration.
    pub fn apply_action(
        &mut self,
        player_id: PlayerId,
        kind: ActionKind,
        amount: Option<Chips>,
    ) -> Result<String, EngineError> {
        let seat = self
            .seat_of(player_id)
            .ok_or(EngineError::UnknownPlayer(player_id))?;

        if !self.is_hand_in_progress() {
            return Err(EngineError::NoHandInProgress);
        }

        if seat != self.turn {
            return Err(EngineError::NotYourTurn);
        }

        let player = &self.players[seat];
        if player.status != PlayerStatus::Active {
            return Err(EngineError::PlayerInactive);
        }

        let nickname = player.nickname.clone();
        let (bet, stack) = (player.bet, player.stack);
        let to_call = self.current_bet - bet;

        let narration = match kind {
            ActionKind::Fold => {
                self.players[seat].fold();
                format!("{nickname}: Fold")
            }
            ActionKind::Check => {
                if to_call > Chips::ZERO {
                    return Err(EngineError::IllegalCheck);
                }

                self.players[seat].action = PlayerAction::Check;
                format!("{nickname}: Check")
            }
            ActionKind::Call => {
                let paid = self.bet_chips(seat, to_call, PlayerAction::Call);
                format!("{nickname}: Call {paid}")
            }
            ActionKind::Raise => {
                let total = amount.unwrap_or_default().min(bet + stack);
                if total <= self.current_bet {
                    return Err(EngineError::IllegalRaise {
                        current_bet: self.current_bet,
                    });
                }

                self.bet_chips(seat, total - bet, PlayerAction::Raise);
                self.current_bet = total;
                self.last_aggressor = Some(seat);
                self.actions_since_raise = 1;
                format!("{nickname}: Raise {total}")
            }
        };

        debug!("Room {} {narration}", self.room_id);

        if self.count_in_hand() == 1 {
            self.finish_no_contest();
            return Ok(narration);
        }

        if kind != ActionKind::Raise {
            self.actions_since_raise += 1;
        }

        self.turn = self.next_active_seat(self.turn);
        self.deal_completed_streets()?;

        Ok(narration)
    }

    /// Folds a player who leaves the table during a hand.
    ///
    /// Passes the turn if the player held it and ends the hand if a single
    /// player is left.
    pub fn fold_player(&mut self, player_id: PlayerId) -> Result<(), EngineError> {
        let Some(seat) = self.seat_of(player_id) else {
            return Ok(());
        };

        if !self.is_hand_in_progress() {
            return Ok(());
        }

        let was_in_hand = self.players[seat].is_in_hand();
        self.players[seat].fold();

        if seat == self.turn {
            self.turn = self.next_active_seat(self.turn);
        }

        if was_in_hand && self.count_in_hand() == 1 {
            self.finish_no_contest();
        } else if self.count_active() < 2 {
            self.deal_completed_streets()?;
        }

        Ok(())
    }

    /// Returns the actions the player on turn can take.
    pub fn legal_actions(&self) -> Vec<ActionKind> {
        let Some(player) = self.players.get(self.turn) else {
            return vec![];
        };

        if !self.is_hand_in_progress() || !player.is_active() {
            return vec![];
        }

        let mut actions = vec![ActionKind::Fold];
        if player.bet == self.current_bet {
            actions.push(ActionKind::Check);
        } else {
            actions.push(ActionKind::Call);
        }

        if player.bet + player.stack > self.current_bet {
            actions.push(ActionKind::Raise);
        }

        actions
    }

    /// Checks if the betting on the current street is complete.
    fn is_street_complete(&self) -> bool {
        let mut active = self.players.iter().filter(|p| p.is_active());
        if active.clone().any(|p| p.bet != self.current_bet) {
            return false;
        }

        let count = active.clone().count();
        if count < 2 {
            return true;
        }

        // Blinds are not actions, the big blind keeps the option to raise.
        let all_acted = active.all(|p| {
            !matches!(
                p.action,
                PlayerAction::None | PlayerAction::SmallBlind | PlayerAction::BigBlind
            )
        });

        all_acted && self.actions_since_raise as usize >= count
    }

    /// Deals the next streets while betting is complete.
    fn deal_completed_streets(&mut self) -> Result<(), EngineError> {
        while self.street != Street::Showdown && self.is_street_complete() {
            self.next_street()?;
        }

        Ok(())
    }

    fn next_street(&mut self) -> Result<(), EngineError> {
        let (cards, next) = match self.street {
            Street::Preflop => (3, Street::Flop),
            Street::Flop => (1, Street::Turn),
            Street::Turn => (1, Street::River),
            Street::River => (0, Street::Showdown),
            Street::Showdown => return Ok(()),
        };

        let Some(deck) = self.deck.as_mut() else {
            return Err(EngineError::MissingDeck);
        };

        for _ in 0..cards {
            let card = deck.deal().ok_or(EngineError::DeckExhausted)?;
            self.board.push(card);
        }

        for player in &mut self.players {
            player.bet = Chips::ZERO;
            player.action = PlayerAction::None;
        }

        self.street = next;
        self.current_bet = Chips::ZERO;
        self.last_aggressor = None;
        self.actions_since_raise = 0;
        self.turn = self.next_active_seat(self.dealer);

        debug!("Room {} {} {:?}", self.room_id, self.street, self.board);
        Ok(())
    }

    fn post_blind(&mut self, seat: usize, blind: Chips, action: PlayerAction) {
        self.bet_chips(seat, blind, action);
    }

    /// Moves chips from a player stack to the pot.
    fn bet_chips(&mut self, seat: usize, chips: Chips, action: PlayerAction) -> Chips {
        let player = &mut self.players[seat];
        let paid = player.take_chips(chips);
        player.action = action;
        self.pot += paid;
        paid
    }

    /// Awards the pot to the only player left in the hand.
    fn finish_no_contest(&mut self) {
        let Some(seat) = self.players.iter().position(|p| p.is_in_hand()) else {
            return;
        };

        let pot = self.pot;
        let winner = &mut self.players[seat];
        winner.stack += pot;
        self.pot = Chips::ZERO;

        let message = format!("{} wins {pot}, everyone else folded", winner.nickname);
        debug!("Room {} {message}", self.room_id);

        self.street = Street::Showdown;
        self.settled = true;
        self.showdown.clear();
        self.showdown_message = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Player;
    use rand::{SeedableRng, rngs::StdRng, seq::IndexedRandom};

    fn new_table(stacks: &[u32]) -> (Table, Vec<PlayerId>) {
        let mut table = Table::new("test".into(), Chips::new(10), Chips::new(20));
        let mut ids = Vec::new();
        for (idx, &stack) in stacks.iter().enumerate() {
            let player_id = PlayerId::new_id();
            let player = Player::new(player_id, format!("P{idx}"), Chips::new(stack));
            table.join(player);
            ids.push(player_id);
        }
        (table, ids)
    }

    fn turn_id(table: &Table) -> PlayerId {
        table.players()[table.turn()].player_id
    }

    fn act(table: &mut Table, kind: ActionKind, amount: Option<u32>) -> String {
        let player_id = turn_id(table);
        table
            .apply_action(player_id, kind, amount.map(Chips::new))
            .unwrap()
    }

    #[test]
    fn start_hand_posts_blinds() {
        let mut rng = StdRng::seed_from_u64(1);
        let (mut table, ids) = new_table(&[1000, 1000, 1000]);
        table.start_hand(&mut rng).unwrap();

        assert_eq!(table.hand_id(), 1);
        assert_eq!(table.street(), Street::Preflop);
        assert_eq!(table.dealer(), 1);
        assert_eq!(table.pot(), Chips::new(30));
        assert_eq!(table.current_bet(), Chips::new(20));
        assert_eq!(table.last_aggressor(), Some(0));
        assert_eq!(table.actions_since_raise(), 0);

        // Small blind after the dealer, big blind after the small blind.
        let players = table.players();
        assert_eq!(players[2].bet, Chips::new(10));
        assert_eq!(players[2].action, PlayerAction::SmallBlind);
        assert_eq!(players[0].bet, Chips::new(20));
        assert_eq!(players[0].action, PlayerAction::BigBlind);
        assert_eq!(table.turn(), 1);
        assert_eq!(turn_id(&table), ids[1]);

        // All players have two distinct cards.
        let mut cards = players
            .iter()
            .flat_map(|p| p.hole_cards.unwrap())
            .collect::<Vec<_>>();
        cards.sort();
        cards.dedup();
        assert_eq!(cards.len(), 6);
        assert!(table.is_hand_in_progress());
    }

    #[test]
    fn start_hand_needs_two_players_with_chips() {
        let mut rng = StdRng::seed_from_u64(1);
        let (mut table, _) = new_table(&[1000]);
        assert_eq!(table.start_hand(&mut rng), Err(EngineError::NotEnoughPlayers));

        let (mut table, _) = new_table(&[1000, 0]);
        assert_eq!(table.start_hand(&mut rng), Err(EngineError::NotEnoughPlayers));
        assert_eq!(table.hand_id(), 0);
        assert!(!table.is_hand_in_progress());
    }

    #[test]
    fn heads_up_call_check_deals_flop() {
        let mut rng = StdRng::seed_from_u64(2);
        let (mut table, _) = new_table(&[1000, 1000]);
        table.start_hand(&mut rng).unwrap();

        // Dealer is seat 1, small blind seat 0, big blind seat 1.
        assert_eq!(table.dealer(), 1);
        assert_eq!(table.turn(), 0);
        assert_eq!(table.players()[0].bet, Chips::new(10));
        assert_eq!(table.players()[1].bet, Chips::new(20));

        assert_eq!(act(&mut table, ActionKind::Call, None), "P0: Call 10");
        assert_eq!(table.players()[0].bet, Chips::new(20));
        assert_eq!(table.street(), Street::Preflop);
        assert_eq!(table.turn(), 1);

        assert_eq!(act(&mut table, ActionKind::Check, None), "P1: Check");
        assert_eq!(table.street(), Street::Flop);
        assert_eq!(table.board().len(), 3);
        assert_eq!(table.current_bet(), Chips::ZERO);
        assert_eq!(table.pot(), Chips::new(40));
        assert_eq!(table.last_aggressor(), None);
        assert_eq!(table.actions_since_raise(), 0);
        assert!(table.players().iter().all(|p| p.bet == Chips::ZERO));
        assert!(table.players().iter().all(|p| p.action == PlayerAction::None));

        // First active seat after the dealer.
        assert_eq!(table.turn(), 0);
    }

    #[test]
    fn hand_plays_to_showdown() {
        let mut rng = StdRng::seed_from_u64(3);
        let (mut table, _) = new_table(&[1000, 1000]);
        table.start_hand(&mut rng).unwrap();

        act(&mut table, ActionKind::Call, None);
        act(&mut table, ActionKind::Check, None);

        for board in [4, 5] {
            act(&mut table, ActionKind::Check, None);
            act(&mut table, ActionKind::Check, None);
            assert_eq!(table.board().len(), board);
        }

        act(&mut table, ActionKind::Check, None);
        act(&mut table, ActionKind::Check, None);
        assert_eq!(table.street(), Street::Showdown);
        assert!(table.needs_showdown());
        assert!(!table.is_hand_in_progress());
        assert_eq!(table.pot(), Chips::new(40));
    }

    #[test]
    fn two_folds_award_pot() {
        let mut rng = StdRng::seed_from_u64(4);
        let (mut table, _) = new_table(&[1000, 1000, 1000]);
        table.start_hand(&mut rng).unwrap();

        // Seat 1 is first to act, then the small blind on seat 2.
        assert_eq!(act(&mut table, ActionKind::Fold, None), "P1: Fold");
        assert_eq!(table.street(), Street::Preflop);
        act(&mut table, ActionKind::Fold, None);

        assert_eq!(table.street(), Street::Showdown);
        assert_eq!(table.pot(), Chips::ZERO);
        assert_eq!(table.players()[0].stack, Chips::new(1010));
        assert_eq!(table.players()[2].stack, Chips::new(990));
        assert!(table.showdown_hands().is_empty());
        assert_eq!(
            table.showdown_message(),
            Some("P0 wins 30, everyone else folded")
        );
        assert!(!table.needs_showdown());
    }

    #[test]
    fn big_blind_keeps_the_option() {
        let mut rng = StdRng::seed_from_u64(5);
        let (mut table, _) = new_table(&[1000, 1000, 1000]);
        table.start_hand(&mut rng).unwrap();

        act(&mut table, ActionKind::Fold, None);
        act(&mut table, ActionKind::Call, None);

        // Both active players matched but the big blind has not acted.
        assert_eq!(table.street(), Street::Preflop);
        assert_eq!(table.turn(), 0);
        assert_eq!(table.legal_actions(), [
            ActionKind::Fold,
            ActionKind::Check,
            ActionKind::Raise
        ]);

        act(&mut table, ActionKind::Raise, Some(60));
        assert_eq!(table.current_bet(), Chips::new(60));
        assert_eq!(table.actions_since_raise(), 1);
        assert_eq!(table.last_aggressor(), Some(0));

        act(&mut table, ActionKind::Call, None);
        assert_eq!(table.street(), Street::Flop);
        assert_eq!(table.pot(), Chips::new(120));
    }

    #[test]
    fn action_errors() {
        let mut rng = StdRng::seed_from_u64(6);
        let (mut table, ids) = new_table(&[1000, 1000, 1000]);

        assert_eq!(
            table.apply_action(ids[0], ActionKind::Check, None),
            Err(EngineError::NoHandInProgress)
        );

        table.start_hand(&mut rng).unwrap();
        let pot = table.pot();

        assert_eq!(
            table.apply_action(ids[0], ActionKind::Call, None),
            Err(EngineError::NotYourTurn)
        );

        let unknown = PlayerId::new_id();
        assert_eq!(
            table.apply_action(unknown, ActionKind::Call, None),
            Err(EngineError::UnknownPlayer(unknown))
        );

        assert_eq!(
            table.apply_action(ids[1], ActionKind::Check, None),
            Err(EngineError::IllegalCheck)
        );

        let illegal = Err(EngineError::IllegalRaise {
            current_bet: Chips::new(20),
        });
        assert_eq!(table.apply_action(ids[1], ActionKind::Raise, Some(Chips::new(20))), illegal);
        assert_eq!(table.apply_action(ids[1], ActionKind::Raise, None), illegal);

        // Nothing changed.
        assert_eq!(table.pot(), pot);
        assert_eq!(table.turn(), 1);
        assert_eq!(table.players()[1].stack, Chips::new(1000));

        act(&mut table, ActionKind::Fold, None);
        table.turn = 1;
        assert_eq!(
            table.apply_action(ids[1], ActionKind::Call, None),
            Err(EngineError::PlayerInactive)
        );
    }

    #[test]
    fn raise_is_capped_at_stack() {
        let mut rng = StdRng::seed_from_u64(7);
        let (mut table, _) = new_table(&[1000, 300]);
        table.start_hand(&mut rng).unwrap();

        // Small blind on seat 0 shoves more than the big blind can cover.
        assert_eq!(act(&mut table, ActionKind::Raise, Some(5000)), "P0: Raise 1,000");
        assert_eq!(table.players()[0].status, PlayerStatus::AllIn);
        assert_eq!(table.players()[0].stack, Chips::ZERO);
        assert_eq!(table.turn(), 1);

        // Calling puts the big blind all in too and the board runs out.
        assert_eq!(act(&mut table, ActionKind::Call, None), "P1: Call 280");
        assert_eq!(table.players()[1].status, PlayerStatus::AllIn);
        assert_eq!(table.street(), Street::Showdown);
        assert_eq!(table.board().len(), 5);
        assert_eq!(table.pot(), Chips::new(1300));
        assert!(table.needs_showdown());
    }

    #[test]
    fn short_blind_runs_out_board() {
        let mut rng = StdRng::seed_from_u64(8);
        let (mut table, _) = new_table(&[1000, 15]);
        table.start_hand(&mut rng).unwrap();

        // The big blind on seat 1 is all in, the small blind must still call.
        assert_eq!(table.players()[1].status, PlayerStatus::AllIn);
        assert_eq!(table.street(), Street::Preflop);
        assert_eq!(table.turn(), 0);

        act(&mut table, ActionKind::Call, None);
        assert_eq!(table.street(), Street::Showdown);
        assert_eq!(table.board().len(), 5);
        assert_eq!(table.total_chips(), Chips::new(1015));
    }

    #[test]
    fn fold_player_passes_turn() {
        let mut rng = StdRng::seed_from_u64(9);
        let (mut table, ids) = new_table(&[1000, 1000, 1000]);
        table.start_hand(&mut rng).unwrap();
        assert_eq!(table.turn(), 1);

        table.fold_player(ids[1]).unwrap();
        assert_eq!(table.players()[1].status, PlayerStatus::Folded);
        assert_eq!(table.turn(), 2);
        assert_eq!(table.street(), Street::Preflop);

        // Folding a player not on turn keeps the turn.
        table.fold_player(ids[0]).unwrap();
        assert_eq!(table.street(), Street::Showdown);
        assert_eq!(table.players()[2].stack, Chips::new(1020));
        assert_eq!(table.total_chips(), Chips::new(3000));
    }

    #[test]
    fn out_players_sit_out() {
        let mut rng = StdRng::seed_from_u64(10);
        let (mut table, _) = new_table(&[1000, 0, 1000]);
        table.start_hand(&mut rng).unwrap();

        assert_eq!(table.players()[1].status, PlayerStatus::Out);
        assert!(table.players()[1].hole_cards.is_none());

        // Seat 1 is the dealer, blinds on seats 2 and 0.
        assert_eq!(table.dealer(), 1);
        assert_eq!(table.players()[2].bet, Chips::new(10));
        assert_eq!(table.players()[0].bet, Chips::new(20));
        assert_eq!(table.turn(), 2);
    }

    #[test]
    fn random_actions_conserve_chips() {
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let stacks = [500, 1000, 40, 800, 1000, 25];
            let players = 2 + seed as usize % 5;
            let (mut table, _) = new_table(&stacks[..players]);
            let total = table.total_chips();

            for _ in 0..10 {
                if table.start_hand(&mut rng).is_err() {
                    break;
                }

                while table.is_hand_in_progress() {
                    let actions = table.legal_actions();
                    let kind = *actions.choose(&mut rng).unwrap();
                    let amount = table.current_bet() + Chips::new(rng.random_range(1..200));

                    let player_id = turn_id(&table);
                    table.apply_action(player_id, kind, Some(amount)).unwrap();
                    assert_eq!(table.total_chips(), total);

                    if table.count_active() >= 2 && table.is_hand_in_progress() {
                        assert!(table.players()[table.turn()].is_active());
                    }
                }

                // Pay the pot to the first contender.
                if table.needs_showdown() {
                    let seat = table.players().iter().position(|p| p.is_in_hand()).unwrap();
                    table.award_pot(&[seat]);
                    table.set_showdown(vec![], String::new());
                }

                assert_eq!(table.pot(), Chips::ZERO);
                assert_eq!(table.total_chips(), total);
            }
        }
    }
}
