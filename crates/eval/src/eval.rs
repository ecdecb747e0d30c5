// Copyright (C) 2025 Vince Vasta
// SPDX-License-Identifier: Apache-2.0

//! Poker hand evaluator.
//!
//! A five cards hand is classified into one of nine [HandCategory] values and a
//! kicker sequence, the two together make a [HandValue] whose ordering is the
//! poker ordering of hands. A seven cards hand is evaluated by [BestHand::eval]
//! that scores all its 21 five cards subsets and keeps the best one.
use std::{cmp::Reverse, fmt};
use thiserror::Error;

use pokeroom_cards::{Card, Rank};

/// Hand evaluation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvalError {
    /// The evaluator needs exactly 7 cards.
    #[error("Invalid number of cards {0}, a hand needs 7 cards")]
    InvalidCardCount(usize),
}

/// The hand category, from the weakest to the strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandCategory {
    /// No other category.
    HighCard,
    /// Two cards of the same rank.
    OnePair,
    /// Two different pairs.
    TwoPair,
    /// Three cards of the same rank.
    ThreeOfAKind,
    /// Five consecutive ranks.
    Straight,
    /// Five cards of the same suit.
    Flush,
    /// Three of a kind and a pair.
    FullHouse,
    /// Four cards of the same rank.
    FourOfAKind,
    /// A straight with all cards of the same suit.
    StraightFlush,
}

impl HandCategory {
    /// The category display name.
    pub fn name(&self) -> &'static str {
        match self {
            HandCategory::HighCard => "High Card",
            HandCategory::OnePair => "One Pair",
            HandCategory::TwoPair => "Two Pair",
            HandCategory::ThreeOfAKind => "Three of a Kind",
            HandCategory::Straight => "Straight",
            HandCategory::Flush => "Flush",
            HandCategory::FullHouse => "Full House",
            HandCategory::FourOfAKind => "Four of a Kind",
            HandCategory::StraightFlush => "Straight Flush",
        }
    }
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The value of a five cards hand.
///
/// Values compare by category first and then element-wise by kickers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandValue {
    category: HandCategory,
    kickers: Vec<Rank>,
}

impl HandValue {
    /// Scores a five cards hand.
    pub fn from_five(cards: &[Card; 5]) -> Self {
        let mut ranks = cards.map(|c| c.rank());
        ranks.sort_unstable_by(|a, b| b.cmp(a));

        let is_flush = cards.iter().all(|c| c.suit() == cards[0].suit());
        let straight = straight_high(&ranks);

        if let (Some(high), true) = (straight, is_flush) {
            return Self::new(HandCategory::StraightFlush, vec![high]);
        }

        let groups = rank_groups(&ranks);
        match groups.as_slice() {
            [(4, quads), (1, kicker)] => {
                Self::new(HandCategory::FourOfAKind, vec![*quads, *kicker])
            }
            [(3, trips), (2, pair)] => Self::new(HandCategory::FullHouse, vec![*trips, *pair]),
            _ if is_flush => Self::new(HandCategory::Flush, ranks.to_vec()),
            _ if straight.is_some() => {
                Self::new(HandCategory::Straight, straight.into_iter().collect())
            }
            [(3, trips), rest @ ..] => Self::new(
                HandCategory::ThreeOfAKind,
                Some(*trips).into_iter().chain(rest.iter().map(|g| g.1)).collect(),
            ),
            [(2, high), (2, low), (1, kicker)] => {
                Self::new(HandCategory::TwoPair, vec![*high, *low, *kicker])
            }
            [(2, pair), rest @ ..] => Self::new(
                HandCategory::OnePair,
                Some(*pair).into_iter().chain(rest.iter().map(|g| g.1)).collect(),
            ),
            _ => Self::new(HandCategory::HighCard, ranks.to_vec()),
        }
    }

    fn new(category: HandCategory, kickers: Vec<Rank>) -> Self {
        Self { category, kickers }
    }

    /// The hand category.
    pub fn category(&self) -> HandCategory {
        self.category
    }

    /// The tie break ranks for hands of the same category.
    pub fn kickers(&self) -> &[Rank] {
        &self.kickers
    }
}

/// Returns the straight high card for ranks sorted in descending order.
fn straight_high(ranks: &[Rank; 5]) -> Option<Rank> {
    if ranks.windows(2).any(|w| w[0] == w[1]) {
        return None;
    }

    if ranks[0].value() - ranks[4].value() == 4 {
        return Some(ranks[0]);
    }

    // The wheel A-2-3-4-5 plays as a five high straight.
    if ranks == &[Rank::Ace, Rank::Five, Rank::Four, Rank::Trey, Rank::Deuce] {
        Some(Rank::Five)
    } else {
        None
    }
}

/// Groups ranks sorted in descending order by count and then by rank.
fn rank_groups(ranks: &[Rank; 5]) -> Vec<(u8, Rank)> {
    let mut groups = ranks
        .chunk_by(|a, b| a == b)
        .map(|g| (g.len() as u8, g[0]))
        .collect::<Vec<_>>();

    // Stable sort keeps ranks in descending order within the same count.
    groups.sort_by(|a, b| b.0.cmp(&a.0));
    groups
}

/// The best five cards hand out of seven cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BestHand {
    value: HandValue,
    cards: [Card; 5],
}

impl BestHand {
    /// Evaluates a seven cards hand.
    ///
    /// Among subsets with the same value the one with the highest ranks wins,
    /// this only changes the cards shown for the hand and never its value.
    pub fn eval(cards: &[Card]) -> Result<Self, EvalError> {
        let invalid = || EvalError::InvalidCardCount(cards.len());
        let seven: &[Card; 7] = cards.try_into().map_err(|_| invalid())?;

        five_card_subsets(seven)
            .map(|five| (HandValue::from_five(&five), five))
            .max_by(|(v1, c1), (v2, c2)| {
                v1.cmp(v2)
                    .then_with(|| rank_sequence(c1).cmp(&rank_sequence(c2)))
            })
            .map(|(value, cards)| Self {
                cards: display_order(&value, cards),
                value,
            })
            .ok_or_else(invalid)
    }

    /// The hand value.
    pub fn value(&self) -> &HandValue {
        &self.value
    }

    /// The five cards that make the hand.
    pub fn cards(&self) -> &[Card; 5] {
        &self.cards
    }
}

impl fmt::Display for BestHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (", self.value.category)?;
        for (idx, card) in self.cards.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{card}")?;
        }
        f.write_str(")")
    }
}

/// Iterates the 21 five cards subsets of seven cards.
fn five_card_subsets(cards: &[Card; 7]) -> impl Iterator<Item = [Card; 5]> + '_ {
    (0..7).flat_map(move |i| {
        (i + 1..7).map(move |j| {
            let mut five = [cards[0]; 5];
            let skipped = cards
                .iter()
                .enumerate()
                .filter(|(k, _)| *k != i && *k != j)
                .map(|(_, c)| *c);
            for (slot, card) in five.iter_mut().zip(skipped) {
                *slot = card;
            }
            five
        })
    })
}

fn rank_sequence(cards: &[Card; 5]) -> [Rank; 5] {
    let mut ranks = cards.map(|c| c.rank());
    ranks.sort_unstable_by(|a, b| b.cmp(a));
    ranks
}

/// Sorts cards for display, larger groups first and the wheel ace last.
fn display_order(value: &HandValue, mut cards: [Card; 5]) -> [Card; 5] {
    let all = cards;
    let count = |r: Rank| all.iter().filter(|c| c.rank() == r).count();
    cards.sort_by_key(|c| Reverse((count(c.rank()), c.rank())));

    let is_straight = matches!(
        value.category,
        HandCategory::Straight | HandCategory::StraightFlush
    );
    if is_straight && value.kickers == [Rank::Five] {
        cards.rotate_left(1);
    }

    cards
}
