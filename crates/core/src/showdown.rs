// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Showdown resolution.
use log::info;

use crate::{
    error::EngineError,
    poker::BestHand,
    table::{ShowdownHand, Table},
};

impl Table {
    /// Evaluates the hands of the players left in the hand and pays the winners.
    ///
    /// The pot is split evenly between the players with the best hand, the
    /// first of them in seat order gets the remainder. A hand with an
    /// incomplete board or with no contenders is settled without paying the pot.
    pub fn resolve_showdown(&mut self) -> Result<(), EngineError> {
        if self.board.len() < 5 {
            self.set_showdown(vec![], "No showdown, the board is incomplete".to_string());
            return Ok(());
        }

        let mut contenders = Vec::new();
        for (seat, player) in self.players.iter().enumerate() {
            let Some(hole_cards) = player.hole_cards.filter(|_| player.is_in_hand()) else {
                continue;
            };

            let mut cards = self.board.clone();
            cards.extend_from_slice(&hole_cards);
            contenders.push((seat, hole_cards, BestHand::eval(&cards)?));
        }

        let Some(best) = contenders.iter().map(|(_, _, hand)| hand.value()).max().cloned() else {
            self.set_showdown(vec![], "No showdown, no players left in the hand".to_string());
            return Ok(());
        };

        let winners = contenders
            .iter()
            .filter(|(_, _, hand)| *hand.value() == best)
            .map(|(seat, _, _)| *seat)
            .collect::<Vec<_>>();

        let pot = self.pot;
        let category = best.category();
        let message = if let [seat] = winners[..] {
            format!("{} wins {pot} with {category}", self.players[seat].nickname)
        } else {
            let names = winners
                .iter()
                .map(|&seat| self.players[seat].nickname.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            format!("Split pot {pot}: {names}, best hand {category}")
        };

        let hands = contenders
            .into_iter()
            .map(|(seat, cards, hand)| ShowdownHand {
                player_id: self.players[seat].player_id,
                cards,
                description: hand.to_string(),
            })
            .collect();

        info!("Room {} hand {} {message}", self.room_id, self.hand_id);

        self.award_pot(&winners);
        self.set_showdown(hands, message);
        Ok(())
    }
}
