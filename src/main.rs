//! # Self-Play Runner
//!
//! Plays complete games between AI seats on the command line and prints the move
//! history, the final board and a win tally.
//!
//! ```text
//! play --radius 4 --iterations 5000 --seat1 mcts --seat2 path --seat3 center --games 3
//! ```
//!
//! Logging goes through `tracing`; set `RUST_LOG=hexsquared=debug` to see search
//! summaries for every move.

use clap::Parser;
use hexsquared::evaluator::UniformEvaluator;
use hexsquared::game::{GameState, Outcome};
use hexsquared::game_controller::{GameController, MoveResult};
use hexsquared::mcts::{CancellationToken, MctsConfig};
use hexsquared::player::AiPlayer;
use hexsquared::rollout::RolloutPolicy;
use hexsquared::training::TrainingCollector;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Playable board radius
    #[clap(short, long, default_value_t = 4)]
    radius: i32,

    /// Search iterations per move
    #[clap(short = 'i', long, default_value_t = 2000)]
    iterations: u32,

    /// Search threads, 0 for all CPUs
    #[clap(short, long, default_value_t = 0)]
    num_threads: usize,

    #[clap(short = 'e', long, default_value_t = std::f64::consts::SQRT_2)]
    exploration_parameter: f64,

    /// Rollout policy used by search seats: random, center, edge or path
    #[clap(long, default_value_t = RolloutPolicy::Random)]
    rollout: RolloutPolicy,

    /// Base RNG seed for reproducible searches
    #[clap(long)]
    seed: Option<u64>,

    /// Seat 1 player: random, center, edge, path, mcts or guided
    #[clap(long, default_value = "mcts")]
    seat1: String,

    #[clap(long, default_value = "path")]
    seat2: String,

    #[clap(long, default_value = "center")]
    seat3: String,

    /// Number of games to play
    #[clap(short, long, default_value_t = 1)]
    games: usize,

    /// Print the board after every move
    #[clap(long, action = clap::ArgAction::SetTrue)]
    verbose: bool,

    /// Collect search snapshots and report how many were labelled
    #[clap(long, action = clap::ArgAction::SetTrue)]
    collect_training: bool,
}

fn build_ai(name: &str, config: &MctsConfig) -> Result<AiPlayer, String> {
    match name.trim().to_ascii_lowercase().as_str() {
        "random" => Ok(AiPlayer::Random),
        "center" => Ok(AiPlayer::CenterControl),
        "edge" => Ok(AiPlayer::EdgeControl),
        "path" => Ok(AiPlayer::PathConnection),
        "mcts" => Ok(AiPlayer::Mcts(config.clone())),
        "guided" => Ok(AiPlayer::GuidedMcts {
            config: config.clone(),
            evaluator: Arc::new(UniformEvaluator::new()),
        }),
        other => Err(format!("unknown player kind '{}'", other)),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    if args.radius < 1 {
        error!(radius = args.radius, "board radius must be at least 1");
        return ExitCode::FAILURE;
    }

    let mut config = MctsConfig::default()
        .with_iterations(args.iterations)
        .with_threads(args.num_threads)
        .with_exploration(args.exploration_parameter)
        .with_rollout(args.rollout);
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let seats = match [&args.seat1, &args.seat2, &args.seat3]
        .into_iter()
        .map(|name| build_ai(name, &config))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(seats) => seats,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let collector = Arc::new(TrainingCollector::new());
    let cancel = CancellationToken::new();
    let mut tally = [0usize; 3];
    let mut draws = 0usize;

    for game_number in 1..=args.games {
        let mut controller = GameController::new(GameState::with_ai_players(args.radius));
        for (color, ai) in (1u8..).zip(seats.iter().cloned()) {
            controller = controller.with_ai(color, ai);
        }
        if args.collect_training {
            controller = controller.with_collector(Arc::clone(&collector));
        }

        info!(game = game_number, radius = args.radius, "starting game");
        while !controller.is_game_over() {
            match controller.play_ai_turn(&cancel) {
                Ok(Some(MoveResult::Success { player, cell_index, .. })) => {
                    if args.verbose {
                        println!("Player {} takes cell {}", player, cell_index);
                        println!("{}", controller.game().board());
                    }
                }
                Ok(Some(other)) => {
                    error!(?other, "AI move was not applied");
                    return ExitCode::FAILURE;
                }
                Ok(None) => {
                    error!(player = controller.current_player(), "seat has no AI");
                    return ExitCode::FAILURE;
                }
                Err(e) => {
                    error!("search failed: {}", e);
                    return ExitCode::FAILURE;
                }
            }
        }

        println!("{}", controller.format_history());
        println!("{}", controller.game().board());
        match controller.game().outcome() {
            Some(Outcome::Winner(player)) => tally[(player - 1) as usize] += 1,
            Some(Outcome::Draw) | None => draws += 1,
        }
        if args.collect_training {
            let samples = controller.take_training_samples();
            info!(samples = samples.len(), "labelled training samples");
        }
    }

    println!("=== Results after {} game(s) ===", args.games);
    for (i, wins) in tally.iter().enumerate() {
        println!("Seat {} ({}): {} win(s)", i + 1, seats[i].name(), wins);
    }
    println!("Draws: {}", draws);
    ExitCode::SUCCESS
}
