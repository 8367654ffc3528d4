//! bountycfr Engine - Core solver types and logic
//!
//! This crate contains the bounty game rules, the terminal payoff evaluator,
//! the vanilla CFR solver with its information-set table, and an
//! exploitability check for the resulting average strategy.
//!
//! The engine is single-threaded and performs no I/O.

pub mod cfr;
pub mod error;
pub mod evaluator;
pub mod exploitability;
pub mod game;
pub mod node;

pub use cfr::{CfrSolver, Infoset, InfosetTable, Policy};
pub use error::GameError;
pub use game::GameConfig;
pub use node::{Action, History, PayoffEvaluator, Player, NUM_ACTIONS};
