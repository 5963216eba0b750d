//! CLI entry point: runs one local game between strategy agents and prints
//! the winners and any kicked players.

use bazaar::driver::GameStateFixture;
use bazaar::search::purchase::Policy;
use bazaar::{execute_game, BonusConfig, PlayerAgent, StrategyAgent};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Runs one Bazaar game between in-process strategy agents")]
struct Args {
    /// Names of the agents to seat, in turn order
    #[arg(short, long, value_delimiter = ',', default_value = "Alice,Bob")]
    names: Vec<String>,

    /// Purchase tie-break policy for every seated agent
    #[arg(short, long, value_enum, default_value = "points")]
    policy: PolicyArg,

    /// Enable the RWB (+10) owned-card bonus
    #[arg(long)]
    rwb: bool,

    /// Enable the SEY (+50) owned-card bonus
    #[arg(long)]
    sey: bool,

    /// Log level: error, warn, info, debug, or trace
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Path to a JSON game-state fixture to resume from, instead of
    /// building the default fresh board
    #[arg(short, long)]
    fixture: Option<std::path::PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum PolicyArg {
    Points,
    Size,
}

impl From<PolicyArg> for Policy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Points => Policy::Points,
            PolicyArg::Size => Policy::Size,
        }
    }
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level)).init();

    let policy: Policy = args.policy.into();
    let agents: Vec<(String, Box<dyn PlayerAgent + Send>)> = args
        .names
        .into_iter()
        .map(|name| {
            let agent: Box<dyn PlayerAgent + Send> = Box::new(StrategyAgent::new(&name, policy));
            (name, agent)
        })
        .collect();

    let bonus = BonusConfig {
        rwb: args.rwb,
        sey: args.sey,
    };

    let (agents, game_state) = match args.fixture {
        Some(path) => {
            let json = std::fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("failed to read fixture {}: {e}", path.display()));
            let fixture: GameStateFixture =
                serde_json::from_str(&json).unwrap_or_else(|e| panic!("invalid fixture {}: {e}", path.display()));
            (Vec::new(), Some(fixture.into_game_state(agents)))
        }
        None => (agents, None),
    };

    let (winners, kicked) = execute_game(agents, game_state, None, bonus);
    println!("winners: {winners:?}");
    println!("kicked: {kicked:?}");
}
