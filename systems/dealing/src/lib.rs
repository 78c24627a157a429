#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Card dealing: the hidden solution and the players' hands.

use cluedo_core::{Claim, GameContent};
use rand::{seq::SliceRandom, Rng};
use tracing::debug;

/// Outcome of shuffling and dealing a deck.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Deal {
    solution: Claim,
    hands: Vec<Vec<String>>,
}

impl Deal {
    /// Character, weapon and room withheld from every hand.
    #[must_use]
    pub fn solution(&self) -> &Claim {
        &self.solution
    }

    /// Hands in seating order.
    #[must_use]
    pub fn hands(&self) -> &[Vec<String>] {
        &self.hands
    }

    /// Splits the deal into its solution and hands.
    #[must_use]
    pub fn into_parts(self) -> (Claim, Vec<Vec<String>>) {
        (self.solution, self.hands)
    }
}

/// Draws a solution and deals the remaining cards to `player_count` hands.
///
/// One card per category is drawn uniformly for the solution. The rest of
/// the deck is shuffled and handed out from its end, one card at a time,
/// starting with the first seat. Returns `None` when there is nobody to deal
/// to or a category has no cards.
pub fn deal<R>(content: &GameContent, player_count: usize, rng: &mut R) -> Option<Deal>
where
    R: Rng + ?Sized,
{
    if player_count == 0 {
        return None;
    }

    let character = content.characters().choose(rng)?.name.clone();
    let weapon = content.weapons().choose(rng)?.clone();
    let room = content.rooms().choose(rng)?.name.clone();
    let solution = Claim::new(character, weapon, room);

    let mut deck: Vec<String> = content
        .deck()
        .into_iter()
        .filter(|card| !solution.names(card))
        .collect();
    deck.shuffle(rng);

    let mut hands = vec![Vec::new(); player_count];
    let mut seat = 0;
    while let Some(card) = deck.pop() {
        hands[seat].push(card);
        seat = (seat + 1) % player_count;
    }

    debug!(players = player_count, "cards dealt");
    Some(Deal { solution, hands })
}
