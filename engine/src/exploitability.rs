//! Best-response values and exploitability of an average strategy
//!
//! The bounty game has no private information, so every decision node is
//! its own information set and a best response is a plain max over the
//! responder's legal actions.

use log::debug;

use crate::cfr::Policy;
use crate::error::GameError;
use crate::game::{is_terminal, legal_actions};
use crate::node::{History, PayoffEvaluator, Player, NUM_ACTIONS};

/// Policy entry for `history`, or uniform over the legal actions if missing.
fn policy_at(policy: &Policy, history: &History) -> [f64; NUM_ACTIONS] {
    if let Some(strategy) = policy.get(history) {
        return *strategy;
    }
    let legal = legal_actions(history);
    let mut uniform = [0.0_f64; NUM_ACTIONS];
    for &action in legal {
        uniform[action.index()] = 1.0 / legal.len() as f64;
    }
    uniform
}

/// Value of `history` for the player acting there, when `br_player` plays a
/// best response and the other player follows `policy`.
fn best_response_at<E: PayoffEvaluator>(
    evaluator: &E,
    policy: &Policy,
    history: &History,
    br_player: Player,
) -> Result<f64, GameError> {
    if is_terminal(history) {
        return evaluator.payoff(history);
    }
    let legal = legal_actions(history);
    let mut child_values = [0.0_f64; NUM_ACTIONS];
    for &action in legal {
        child_values[action.index()] =
            -best_response_at(evaluator, policy, &history.with(action), br_player)?;
    }

    if history.player() == br_player {
        Ok(legal
            .iter()
            .map(|a| child_values[a.index()])
            .fold(f64::NEG_INFINITY, f64::max))
    } else {
        let strategy = policy_at(policy, history);
        Ok(legal
            .iter()
            .map(|a| strategy[a.index()] * child_values[a.index()])
            .sum())
    }
}

/// Value a best response for `br_player` achieves against `policy`, from
/// `br_player`'s perspective.
pub fn best_response_value<E: PayoffEvaluator>(
    evaluator: &E,
    policy: &Policy,
    br_player: Player,
) -> Result<f64, GameError> {
    let root = History::root();
    let value = best_response_at(evaluator, policy, &root, br_player)?;
    if root.player() == br_player {
        Ok(value)
    } else {
        Ok(-value)
    }
}

/// Average gain of the two best responses against `policy`.
///
/// Zero at an exact equilibrium, positive otherwise.
pub fn compute_exploitability<E: PayoffEvaluator>(
    evaluator: &E,
    policy: &Policy,
) -> Result<f64, GameError> {
    let br0 = best_response_value(evaluator, policy, Player::P0)?;
    let br1 = best_response_value(evaluator, policy, Player::P1)?;
    let exploitability = (br0 + br1) / 2.0;
    debug!(
        "best responses: player 0 {:.6}, player 1 {:.6}, exploitability {:.6}",
        br0, br1, exploitability
    );
    Ok(exploitability)
}
