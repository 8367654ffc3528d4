//! Terminal payoff evaluation for the bounty game
//!
//! Values are expressed for the player who would act at the terminal
//! history (player `len % 2`); the parent decision negates them.

use crate::error::GameError;
use crate::game::GameConfig;
use crate::node::{Action, History, PayoffEvaluator, Player};

impl PayoffEvaluator for GameConfig {
    fn payoff(&self, history: &History) -> Result<f64, GameError> {
        let holder_is_p0 = self.player_with_bounty == Player::P0;
        let value = match history.actions() {
            [Action::Fold] => {
                if holder_is_p0 {
                    0.0
                } else {
                    1.0
                }
            }
            [Action::Call] => {
                if holder_is_p0 {
                    self.bounty
                } else {
                    -self.bounty
                }
            }
            [Action::Raise, Action::Fold] => {
                if holder_is_p0 {
                    -(1.0 + self.bounty)
                } else {
                    1.0 + self.bounty
                }
            }
            [Action::Raise, Action::Call] => {
                if holder_is_p0 {
                    self.stack_size
                } else {
                    -self.stack_size
                }
            }
            _ => return Err(GameError::UndefinedPayoff(history.clone())),
        };
        Ok(value)
    }
}
