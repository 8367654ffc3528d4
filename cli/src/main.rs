//! bountycfr CLI - Command-line driver for the bounty game solver
//!
//! `solve` trains the CFR engine and reports the average strategy per
//! information set together with its exploitability; `tree` prints the
//! enumerated game tree.

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use bountycfr_engine::exploitability::compute_exploitability;
use bountycfr_engine::node::Node;
use bountycfr_engine::{Action, CfrSolver, GameConfig, GameError, History, Player, NUM_ACTIONS};
use bountycfr_tree::build_tree;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;

#[derive(Parser)]
#[command(name = "bountycfr")]
#[command(version, about = "Vanilla CFR solver for a one-round bounty betting game")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train and print the average strategy
    Solve {
        #[command(flatten)]
        game: GameArgs,
        /// Number of CFR iterations
        #[arg(short, long, default_value_t = 1_000)]
        iterations: u64,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the game tree
    Tree {
        #[command(flatten)]
        game: GameArgs,
    },
}

#[derive(Args)]
struct GameArgs {
    /// JSON file holding a game config; flags below override its fields
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Payoff for the raise-then-call showdown
    #[arg(long)]
    stack_size: Option<f64>,
    /// Side payment added to the pot
    #[arg(long)]
    bounty: Option<f64>,
    /// Seat holding the bounty (0 or 1)
    #[arg(long)]
    player_with_bounty: Option<u8>,
}

impl GameArgs {
    fn resolve(&self) -> Result<GameConfig, GameError> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path).map_err(|e| {
                    GameError::InvalidConfig(format!("{}: {}", path.display(), e))
                })?;
                serde_json::from_str(&text).map_err(|e| {
                    GameError::InvalidConfig(format!("{}: {}", path.display(), e))
                })?
            }
            None => GameConfig::default(),
        };
        if let Some(stack_size) = self.stack_size {
            config.stack_size = stack_size;
        }
        if let Some(bounty) = self.bounty {
            config.bounty = bounty;
        }
        if let Some(seat) = self.player_with_bounty {
            config.player_with_bounty = Player::try_from(seat)?;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Serialize)]
struct StrategyEntry {
    history: History,
    player: Player,
    fold: f64,
    call: f64,
    raise: f64,
}

#[derive(Serialize)]
struct SolveReport {
    config: GameConfig,
    iterations: u64,
    exploitability: f64,
    strategy: Vec<StrategyEntry>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    // Logs go to stderr so JSON on stdout stays clean.
    if let Err(e) = simplelog::TermLogger::init(
        level,
        config,
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    ) {
        eprintln!("logger already initialized: {}", e);
    }
}

fn run_solve(config: GameConfig, iterations: u64, json: bool) -> Result<(), Box<dyn Error>> {
    let mut solver = CfrSolver::new(config);
    solver.train(iterations)?;
    let average = solver.average_strategy();
    let exploitability = compute_exploitability(solver.evaluator(), &average)?;

    let strategy: Vec<StrategyEntry> = average
        .iter()
        .map(|(history, s)| StrategyEntry {
            history: history.clone(),
            player: history.player(),
            fold: s[Action::Fold.index()],
            call: s[Action::Call.index()],
            raise: s[Action::Raise.index()],
        })
        .collect();

    if json {
        let report = SolveReport {
            config,
            iterations,
            exploitability,
            strategy,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "stack {}  bounty {}  bounty held by {}  iterations {}",
        config.stack_size, config.bounty, config.player_with_bounty, iterations
    );
    println!();
    println!(
        "{:<16} {:<10} {:>8} {:>8} {:>8}",
        "history", "to act", "fold", "call", "raise"
    );
    for entry in &strategy {
        println!(
            "{:<16} {:<10} {:>8.4} {:>8.4} {:>8.4}",
            entry.history.to_string(),
            entry.player.to_string(),
            entry.fold,
            entry.call,
            entry.raise
        );
    }
    println!();
    println!("exploitability: {:.6}", exploitability);
    Ok(())
}

fn run_tree(config: GameConfig) -> Result<(), Box<dyn Error>> {
    let tree = build_tree(&config)?;
    for node in &tree.nodes {
        match node {
            Node::Decision {
                id,
                player,
                history,
                actions,
                children,
                ..
            } => {
                let edges: Vec<String> = actions
                    .iter()
                    .zip(children.iter())
                    .map(|(a, c)| format!("{} -> {}", a, c))
                    .collect();
                println!(
                    "{:>2}: Decision {:<9} {:<16} [{}]",
                    id,
                    player.to_string(),
                    history.to_string(),
                    edges.join(", ")
                );
            }
            Node::Terminal {
                id,
                history,
                payoff,
                ..
            } => {
                println!(
                    "{:>2}: Terminal {:<9} {:<16} payoff {:+}",
                    id,
                    "",
                    history.to_string(),
                    payoff
                );
            }
        }
    }
    println!(
        "{} nodes, {} information sets, {} actions per set",
        tree.len(),
        tree.decisions().count(),
        NUM_ACTIONS
    );
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Solve {
            game,
            iterations,
            json,
        } => run_solve(game.resolve()?, iterations, json),
        Commands::Tree { game } => run_tree(game.resolve()?),
    }
}
