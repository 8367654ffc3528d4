//! Error type shared by the engine and its collaborators

use crate::node::History;

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// A terminal history the payoff table does not cover. This is a
    /// tree-construction defect, never a recoverable condition.
    #[error("no payoff defined for terminal history `{0}`")]
    UndefinedPayoff(History),
    #[error("player index must be 0 or 1, got {0}")]
    InvalidPlayer(u8),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
