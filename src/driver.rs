//! The single entry point: wires configured agents and an optional
//! injected game state into one `execute_game` call.

use crate::agent::PlayerAgent;
use crate::card::Deck;
use crate::equation::{EquationSet, MAX_EQUATION_NUM};
use crate::pebble::PebbleCollection;
use crate::referee::{BonusConfig, GameState, PlayerState, Referee};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Deserialize;
use std::collections::VecDeque;

pub const DEFAULT_EQUATION_COUNT: usize = MAX_EQUATION_NUM;
pub const DEFAULT_DECK_SIZE: usize = crate::card::CARD_COUNT;
pub const DEFAULT_VISIBLE_COUNT: usize = crate::referee::game_state::MAX_VISIBLE_CARDS;

fn valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Builds the default initial state: the standard bank, a freshly shuffled
/// 20-card deck (4 visible + 16 invisible), and one empty-wallet
/// zero-score player per agent.
fn default_game_state(
    agents: Vec<(String, Box<dyn PlayerAgent + Send>)>,
    equations: EquationSet,
    rng: &mut StdRng,
) -> GameState {
    let bank = PebbleCollection::starting_bank();
    let mut deck = Deck::random(DEFAULT_DECK_SIZE, rng);
    let visibles = Deck::new(deck.cards.drain(..DEFAULT_VISIBLE_COUNT.min(deck.cards.len())).collect());
    let invisible = deck;

    let mut players = VecDeque::new();
    for (name, agent) in agents {
        players.push_back(PlayerState::new(name, agent));
    }

    GameState::new(equations, bank, visibles, invisible, players)
}

/// A resumable game-state fixture, loaded from JSON by the example
/// binary's `--fixture` flag. Unlike `GameState` itself, this has no
/// player queue — a player's bound agent has no JSON form, so the
/// fixture only covers the shared board; agents are always supplied by
/// the caller and seated fresh on top of it.
#[derive(Deserialize)]
pub struct GameStateFixture {
    pub bank: PebbleCollection,
    pub visibles: Deck,
    pub cards: Deck,
    #[serde(default)]
    pub equations: Option<EquationSet>,
}

impl GameStateFixture {
    /// Seats `agents` onto this fixture's board, in the order given.
    pub fn into_game_state(self, agents: Vec<(String, Box<dyn PlayerAgent + Send>)>) -> GameState {
        let equations = self.equations.unwrap_or_default();
        let mut players = VecDeque::new();
        for (name, agent) in agents {
            players.push_back(PlayerState::new(name, agent));
        }
        GameState::new(equations, self.bank, self.visibles, self.cards, players)
    }
}

/// Runs one full game: validates agent names, builds or adopts the
/// supplied `game_state`/`equations`, calls `setup` on every agent, then
/// drives the referee state machine to completion.
///
/// Returns `(winners_by_name_sorted, kicked_by_name_sorted)`.
pub fn execute_game(
    mut agents: Vec<(String, Box<dyn PlayerAgent + Send>)>,
    game_state: Option<GameState>,
    equations: Option<EquationSet>,
    bonus: BonusConfig,
) -> (Vec<String>, Vec<String>) {
    for (name, _) in &agents {
        debug_assert!(valid_name(name), "agent name `{name}` must match ^[A-Za-z0-9]+$");
    }

    let mut rng = StdRng::from_entropy();
    let equations = equations.unwrap_or_else(|| EquationSet::random(DEFAULT_EQUATION_COUNT, &mut rng));

    let mut state = match game_state {
        Some(mut state) => {
            if state.equations.equations.is_empty() {
                state.equations = equations.clone();
            }
            state
        }
        None => default_game_state(std::mem::take(&mut agents), equations.clone(), &mut rng),
    };

    for player in state.players.iter_mut() {
        player.agent.setup(&equations);
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("failed to start the referee's single-threaded runtime");

    let mut referee = Referee::new(state, bonus);
    runtime.block_on(referee.run())
}
