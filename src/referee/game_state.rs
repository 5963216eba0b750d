use crate::card::Deck;
use crate::equation::EquationSet;
use crate::pebble::PebbleCollection;
use crate::referee::player_state::PlayerState;
use crate::turn_state::TurnState;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::VecDeque;

pub const MAX_VISIBLE_CARDS: usize = 4;

/// The full, referee-owned state of one game: the fixed ruleset, the
/// shared bank, the two decks, and the player queue (front = active).
pub struct GameState {
    pub equations: EquationSet,
    pub bank: PebbleCollection,
    pub visibles: Deck,
    pub invisible_deck: Deck,
    pub players: VecDeque<PlayerState>,
}

impl GameState {
    pub fn new(
        equations: EquationSet,
        bank: PebbleCollection,
        visibles: Deck,
        invisible_deck: Deck,
        players: VecDeque<PlayerState>,
    ) -> Self {
        GameState {
            equations,
            bank,
            visibles,
            invisible_deck,
            players,
        }
    }

    pub fn is_bank_empty(&self) -> bool {
        self.bank.is_empty()
    }

    pub fn visibles_empty(&self) -> bool {
        self.visibles.is_empty()
    }

    pub fn active_player(&self) -> &PlayerState {
        self.players.front().expect("queue must be nonempty to query the active player")
    }

    pub fn active_player_mut(&mut self) -> &mut PlayerState {
        self.players.front_mut().expect("queue must be nonempty to query the active player")
    }

    /// A snapshot of what the active player is allowed to see: no aliasing
    /// with internal state, since `PebbleCollection`/`Deck`/`Vec<u32>` are
    /// all owned value types.
    pub fn extract_turn_state(&self) -> TurnState {
        let active = self.active_player();
        let other_scores = self
            .players
            .iter()
            .skip(1)
            .map(|p| p.score)
            .collect();
        TurnState::new(
            self.bank,
            self.visibles.clone(),
            active.wallet,
            active.score,
            other_scores,
        )
    }

    /// Removes and returns the active player — the disposal event for a
    /// kicked agent.
    pub fn kick_active(&mut self) -> PlayerState {
        self.players
            .pop_front()
            .expect("queue must be nonempty to kick the active player")
    }

    /// Advances to the next player. Only called after a successful
    /// purchase phase.
    pub fn rotate_to_next_turn(&mut self) {
        self.players.rotate_left(1);
    }

    /// Draws one pebble for the active player. `false` iff the bank is
    /// empty.
    pub fn draw_for_active(&mut self) -> bool {
        match crate::rulebook::draw_pebble(&self.bank) {
            Some((color, remaining_bank)) => {
                self.bank = remaining_bank;
                self.active_player_mut().wallet.add_pebble(color);
                true
            }
            None => false,
        }
    }

    /// Erodes one card from the bottom of the invisible deck (or, if
    /// empty, the bottom of the visible deck) after a successful trade —
    /// the deliberate termination forcer.
    pub fn erode_one_card_after_trade(&mut self) {
        if let Some(card) = self.invisible_deck.cards.pop() {
            let _ = card;
        } else {
            self.visibles.cards.pop();
        }
    }

    /// After a purchase of `cards`, removes them from visibles in order
    /// and refills from the front of the invisible deck — at most
    /// `purchased.len()` cards, never topping visibles back up past a
    /// deficit left over from an earlier erosion event.
    pub fn refill_visibles_after_purchase(&mut self, purchased: &[crate::card::Card]) {
        for card in purchased {
            self.visibles.pop_card(card);
        }
        for _ in 0..purchased.len() {
            if self.visibles.len() >= MAX_VISIBLE_CARDS || self.invisible_deck.is_empty() {
                break;
            }
            let card = self.invisible_deck.cards.remove(0);
            self.visibles.add_card(card);
        }
    }

    pub fn can_any_remaining_player_afford_any_visible_card(&self) -> bool {
        self.players
            .iter()
            .any(|p| !self.visibles.find_matching_cards(&p.wallet).is_empty())
    }

    pub fn total_pebbles(&self) -> u32 {
        self.bank.total() + self.players.iter().map(|p| p.wallet.total()).sum::<u32>()
    }
}

/// Persisted as `{"bank":[...], "visibles":[...], "cards":[...],
/// "players":[...]}` — note `"cards"` names the *invisible* deck, not the
/// visible one. Write-only, for the same reason as `PlayerState`: a bound
/// agent has no JSON form.
impl Serialize for GameState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("bank", &self.bank)?;
        map.serialize_entry("visibles", &self.visibles)?;
        map.serialize_entry("cards", &self.invisible_deck)?;
        let players: Vec<&PlayerState> = self.players.iter().collect();
        map.serialize_entry("players", &players)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Card;
    use crate::pebble::PebbleColor;

    // Testing strategy:
    // - refill draws exactly one card per purchased card, up to the invisible deck size
    // - refill never tops visibles back up past the cap even when a prior
    //   deficit (from erosion) leaves fewer than `purchased.len()` slots open

    fn card(color: PebbleColor) -> Card {
        Card::new(PebbleCollection::from_counts(&[(color, 5)]), false)
    }

    #[test]
    fn refill_draws_exactly_one_card_per_purchase() {
        let visibles = Deck::new(vec![card(PebbleColor::Red), card(PebbleColor::White)]);
        let invisible = Deck::new(vec![card(PebbleColor::Blue), card(PebbleColor::Green)]);
        let mut state = GameState::new(
            EquationSet::default(),
            PebbleCollection::empty(),
            visibles,
            invisible,
            VecDeque::new(),
        );
        let purchased = vec![card(PebbleColor::Red)];
        state.refill_visibles_after_purchase(&purchased);
        assert_eq!(state.visibles.len(), 2);
        assert_eq!(state.invisible_deck.len(), 1);
    }

    #[test]
    fn refill_does_not_overdraw_past_a_prior_deficit() {
        // Visibles already eroded down to 2 (below the 4-card cap).
        let visibles = Deck::new(vec![card(PebbleColor::Red), card(PebbleColor::White)]);
        let invisible = Deck::new(vec![card(PebbleColor::Blue), card(PebbleColor::Green), card(PebbleColor::Yellow)]);
        let mut state = GameState::new(
            EquationSet::default(),
            PebbleCollection::empty(),
            visibles,
            invisible,
            VecDeque::new(),
        );
        let purchased = vec![card(PebbleColor::Red)];
        state.refill_visibles_after_purchase(&purchased);
        // Only one card purchased, so only one card should be drawn, even
        // though visibles (now at 1) is still below MAX_VISIBLE_CARDS.
        assert_eq!(state.visibles.len(), 2);
        assert_eq!(state.invisible_deck.len(), 2);
    }
}
