//! Node definitions for the bounty game tree
//!
//! This module defines the action tokens, the history key that identifies an
//! information set, and the explicit node arena used to display the tree.
//! Nodes are immutable and separate from solver state (regrets, strategies).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Number of slots in every accumulator vector (one per [`Action`]).
pub const NUM_ACTIONS: usize = 3;

/// Action available at a decision node
///
/// The discriminant is the slot of the action in every regret/strategy vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Give up the pot
    Fold = 0,
    /// Match the current price
    Call = 1,
    /// Shove the stack; the other player must answer
    Raise = 2,
}

impl Action {
    /// All actions in slot order.
    pub const ALL: [Action; NUM_ACTIONS] = [Action::Fold, Action::Call, Action::Raise];

    /// Slot of this action in an accumulator vector
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Action::Fold => "fold",
            Action::Call => "call",
            Action::Raise => "raise",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Player seat. Player 0 acts first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Player {
    P0,
    P1,
}

impl Player {
    /// Get the opponent of this player
    pub fn opponent(self) -> Player {
        match self {
            Player::P0 => Player::P1,
            Player::P1 => Player::P0,
        }
    }

    /// Player to act after `len` actions have been taken
    pub fn from_history_len(len: usize) -> Player {
        if len % 2 == 0 {
            Player::P0
        } else {
            Player::P1
        }
    }

    pub fn index(self) -> usize {
        match self {
            Player::P0 => 0,
            Player::P1 => 1,
        }
    }
}

impl TryFrom<u8> for Player {
    type Error = GameError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Player::P0),
            1 => Ok(Player::P1),
            other => Err(GameError::InvalidPlayer(other)),
        }
    }
}

impl From<Player> for u8 {
    fn from(player: Player) -> u8 {
        player.index() as u8
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player {}", self.index())
    }
}

/// Sequence of actions taken so far in the hand.
///
/// This is the information-set key. Depth is always measured in tokens,
/// never in the length of any textual rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct History(Vec<Action>);

impl History {
    /// The empty history at the root of the tree
    pub fn root() -> Self {
        History(Vec::new())
    }

    /// A new history with `action` appended
    pub fn with(&self, action: Action) -> Self {
        let mut actions = Vec::with_capacity(self.0.len() + 1);
        actions.extend_from_slice(&self.0);
        actions.push(action);
        History(actions)
    }

    pub fn actions(&self) -> &[Action] {
        &self.0
    }

    /// Number of action tokens
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Player to act at this history
    pub fn player(&self) -> Player {
        Player::from_history_len(self.0.len())
    }
}

impl From<Vec<Action>> for History {
    fn from(actions: Vec<Action>) -> Self {
        History(actions)
    }
}

impl From<&[Action]> for History {
    fn from(actions: &[Action]) -> Self {
        History(actions.to_vec())
    }
}

impl fmt::Display for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("(root)");
        }
        for (i, action) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" -> ")?;
            }
            write!(f, "{}", action)?;
        }
        Ok(())
    }
}

/// Terminal payoff evaluator
///
/// Returns the value of a terminal history from the perspective of the
/// player who would act there; the parent decision negates it.
pub trait PayoffEvaluator {
    fn payoff(&self, history: &History) -> Result<f64, GameError>;
}

/// Node ID type (index into flat array storage)
pub type NodeId = u32;

/// Represents a node in the game tree
#[derive(Debug, Clone)]
pub enum Node {
    /// Decision node where a player must act
    Decision {
        /// Unique identifier for this node (index in flat array)
        id: NodeId,
        /// Parent node ID (None for root)
        parent: Option<NodeId>,
        /// Player to act
        player: Player,
        /// Actions leading to this node; also its information-set key
        history: History,
        /// Legal actions at this node
        actions: Vec<Action>,
        /// Child node IDs indexed like `actions`
        children: Vec<NodeId>,
    },
    /// Terminal node (fold, call or showdown after a raise)
    Terminal {
        id: NodeId,
        parent: Option<NodeId>,
        history: History,
        /// Value for the player who would act here
        payoff: f64,
    },
}

impl Node {
    /// Get the node ID
    pub fn id(&self) -> NodeId {
        match self {
            Node::Decision { id, .. } => *id,
            Node::Terminal { id, .. } => *id,
        }
    }

    /// Get the parent node ID
    pub fn parent(&self) -> Option<NodeId> {
        match self {
            Node::Decision { parent, .. } => *parent,
            Node::Terminal { parent, .. } => *parent,
        }
    }

    pub fn history(&self) -> &History {
        match self {
            Node::Decision { history, .. } => history,
            Node::Terminal { history, .. } => history,
        }
    }

    /// Get child node IDs
    pub fn children(&self) -> &[NodeId] {
        match self {
            Node::Decision { children, .. } => children,
            Node::Terminal { .. } => &[],
        }
    }

    /// Check if this is a terminal node
    pub fn is_terminal(&self) -> bool {
        matches!(self, Node::Terminal { .. })
    }

    /// Check if this is a decision node
    pub fn is_decision(&self) -> bool {
        matches!(self, Node::Decision { .. })
    }
}

/// Game tree wrapper
///
/// Contains a flat array of nodes; the root is node 0.
#[derive(Debug, Clone)]
pub struct GameTree {
    /// Flat array of nodes indexed by NodeId
    pub nodes: Vec<Node>,
}

impl GameTree {
    /// Create a new empty game tree
    pub fn new() -> Self {
        GameTree { nodes: Vec::new() }
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id as usize)
    }

    /// Get a mutable reference to a node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id as usize)
    }

    /// Get the number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn decisions(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_decision())
    }

    pub fn terminals(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_terminal())
    }
}

impl Default for GameTree {
    fn default() -> Self {
        Self::new()
    }
}
