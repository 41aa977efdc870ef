use crate::RngState;
use serde::{Deserialize, Serialize};

/// Battle-time card piles; card ids refer to `Content::cards`.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Piles {
    pub draw: Vec<String>,
    pub hand: Vec<String>,
    pub discard: Vec<String>,
}

impl Piles {
    pub fn from_deck(deck: &[String], rng: &mut RngState) -> Self {
        let mut draw = deck.to_vec();
        rng.shuffle(&mut draw);
        Self {
            draw,
            hand: Vec::new(),
            discard: Vec::new(),
        }
    }

    /// Draws up to `count` cards without exceeding `hand_limit`, reshuffling
    /// the discard pile into the draw pile when it runs out.
    pub fn draw_cards(&mut self, count: usize, hand_limit: usize, rng: &mut RngState) -> usize {
        let mut drawn = 0;
        while drawn < count && self.hand.len() < hand_limit {
            if self.draw.is_empty() {
                self.reshuffle_discard(rng);
            }
            match self.draw.pop() {
                Some(card) => {
                    self.hand.push(card);
                    drawn += 1;
                }
                None => break,
            }
        }
        drawn
    }

    pub fn play(&mut self, hand_index: usize) -> Option<String> {
        if hand_index >= self.hand.len() {
            return None;
        }
        Some(self.hand.remove(hand_index))
    }

    pub fn discard_card(&mut self, card: String) {
        self.discard.push(card);
    }

    pub fn discard_hand(&mut self) {
        self.discard.append(&mut self.hand);
    }

    pub fn reshuffle_discard(&mut self, rng: &mut RngState) {
        if self.discard.is_empty() {
            return;
        }
        self.draw.append(&mut self.discard);
        rng.shuffle(&mut self.draw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck(count: usize) -> Vec<String> {
        (0..count).map(|idx| format!("card_{idx}")).collect()
    }

    #[test]
    fn draw_respects_hand_limit() {
        let mut rng = RngState::from_seed(2);
        let mut piles = Piles::from_deck(&deck(10), &mut rng);
        assert_eq!(piles.draw_cards(8, 5, &mut rng), 5);
        assert_eq!(piles.hand.len(), 5);
        assert_eq!(piles.draw.len(), 5);
    }

    #[test]
    fn empty_draw_pile_reshuffles_discard() {
        let mut rng = RngState::from_seed(2);
        let mut piles = Piles::from_deck(&deck(3), &mut rng);
        piles.draw_cards(3, 10, &mut rng);
        piles.discard_hand();
        assert!(piles.draw.is_empty());
        assert_eq!(piles.draw_cards(2, 10, &mut rng), 2);
        assert_eq!(piles.discard.len() + piles.draw.len(), 1);
    }
}
