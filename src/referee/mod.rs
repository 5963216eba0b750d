pub mod game_state;
pub mod machine;
pub mod observer;
pub mod player_state;

pub use game_state::GameState;
pub use machine::{BonusConfig, Phase, Referee};
pub use observer::Observer;
pub use player_state::PlayerState;
