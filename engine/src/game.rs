//! Game parameters and betting rules for the one-round bounty game
//!
//! Tree structure (player 0 acts at the root):
//!   (root)          Decision P0  [Fold, Call, Raise]
//!   fold            Terminal
//!   call            Terminal
//!   raise           Decision P1  [Fold, Call]
//!   raise -> fold   Terminal
//!   raise -> call   Terminal     (stacks go in)
//!
//! Terminal-ness is decided by counting action tokens. A raise always opens
//! one more decision for the other player; there is no re-raise because the
//! payoff table has no entry for it.

use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::node::{Action, History, Player};

const RESPONSE_TO_RAISE: [Action; 2] = [Action::Fold, Action::Call];

/// Immutable game parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Payoff unit for the raise-then-call showdown
    pub stack_size: f64,
    /// Side payment added to the pot
    pub bounty: f64,
    /// Seat holding the bounty
    pub player_with_bounty: Player,
}

impl GameConfig {
    pub fn new(stack_size: f64, bounty: f64, player_with_bounty: Player) -> Self {
        GameConfig {
            stack_size,
            bounty,
            player_with_bounty,
        }
    }

    /// Check the numeric ranges of the configuration surface.
    ///
    /// The solver itself never calls this; it trusts its caller.
    pub fn validate(&self) -> Result<(), GameError> {
        if !self.stack_size.is_finite() || self.stack_size <= 0.0 {
            return Err(GameError::InvalidConfig(format!(
                "stack_size must be positive, got {}",
                self.stack_size
            )));
        }
        if !self.bounty.is_finite() || self.bounty < 0.0 {
            return Err(GameError::InvalidConfig(format!(
                "bounty must be non-negative, got {}",
                self.bounty
            )));
        }
        Ok(())
    }
}

impl Default for GameConfig {
    /// 5-unit stacks, a bounty of 1, held by player 1 (the big blind)
    fn default() -> Self {
        GameConfig::new(5.0, 1.0, Player::P1)
    }
}

/// Whether `history` ends the hand.
pub fn is_terminal(history: &History) -> bool {
    match history.actions() {
        [Action::Fold] | [Action::Call] => true,
        actions => actions.len() >= 2,
    }
}

/// Actions the player to act at `history` may choose from.
///
/// Only meaningful at decision nodes.
pub fn legal_actions(history: &History) -> &'static [Action] {
    match history.actions() {
        [Action::Raise] => &RESPONSE_TO_RAISE,
        _ => &Action::ALL,
    }
}
