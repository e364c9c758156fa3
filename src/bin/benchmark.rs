use clap::Parser;
use hexsquared::game::GameState;
use hexsquared::mcts::{CancellationToken, MctsConfig, MctsEngine, SearchResult};
use hexsquared::rollout::RolloutPolicy;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Playable board radius (default: 6)
    #[arg(long, default_value_t = 6)]
    radius: i32,

    /// Search duration in seconds (default: 5)
    #[arg(long, default_value_t = 5)]
    duration: u64,

    /// Number of search threads, 0 for all CPUs (default: 0)
    #[arg(long, default_value_t = 0)]
    threads: usize,

    /// Rollout policy: random, center, edge or path
    #[arg(long, default_value_t = RolloutPolicy::Random)]
    rollout: RolloutPolicy,

    /// Also benchmark every rollout policy on a single thread
    #[arg(long, default_value_t = false, action = clap::ArgAction::SetTrue)]
    compare_rollouts: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = MctsConfig::default()
        .with_iterations(u32::MAX)
        .with_threads(args.threads)
        .with_rollout(args.rollout);

    println!("Three-Player Hex MCTS - Benchmark Tool");
    println!("======================================");
    println!("Board radius: {}", args.radius);
    println!("Duration: {} seconds", args.duration);
    println!("Threads: {}", config.resolved_threads());
    println!("Rollout: {}", args.rollout);
    println!("--------------------------------------");

    #[cfg(debug_assertions)]
    println!("WARNING: Running in debug mode. Performance will be significantly lower.\nUse --release for accurate benchmarks.\n");

    let game = GameState::with_ai_players(args.radius);

    println!("\nRunning search benchmark...");
    run("Search", &game, config, args.duration);

    if args.compare_rollouts {
        for &policy in RolloutPolicy::all() {
            println!("\nRunning single-thread benchmark with {} rollouts...", policy);
            let config = MctsConfig::default()
                .with_iterations(u32::MAX)
                .with_threads(1)
                .with_rollout(policy);
            run(&policy.to_string(), &game, config, args.duration);
        }
    }
}

/// Searches until the duration elapses, then cancels and reports.
fn run(name: &str, game: &GameState, config: MctsConfig, duration: u64) {
    let engine = match MctsEngine::new(config) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("{} skipped: {}", name, e);
            return;
        }
    };

    let cancel = CancellationToken::new();
    let timer = {
        let cancel = cancel.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_secs(duration));
            cancel.cancel();
        })
    };

    let result = engine.search(game, game.current_player(), &cancel);
    cancel.cancel();
    let _ = timer.join();

    match result {
        Ok(result) => print_stats(name, &result),
        Err(e) => eprintln!("{} failed: {}", name, e),
    }
}

fn print_stats(name: &str, stats: &SearchResult) {
    let secs = stats.elapsed.as_secs_f64();
    let nps = stats.total_nodes as f64 / secs;

    println!("{} Results:", name);
    println!("  Total Nodes: {}", stats.total_nodes);
    println!("  Time: {:.3}s", secs);
    println!("  NPS: {:.0} nodes/sec", nps);
    println!("  SPS: {:.0} sims/sec", stats.simulations_per_second());
    println!("  Root Visits: {}", stats.root_visits);
    println!("  Max Depth: {}", stats.max_depth);
    println!("  Chosen Cell: {}", stats.cell_index);
}
