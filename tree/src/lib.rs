//! bountycfr Tree Builder - Game tree construction module
//!
//! Builds the explicit node arena for the bounty game from a `GameConfig`,
//! using the engine's betting rules and payoff evaluator. The solver itself
//! walks histories directly; this arena is for inspection and reporting.

use std::collections::VecDeque;

use bountycfr_engine::error::GameError;
use bountycfr_engine::game::{is_terminal, legal_actions, GameConfig};
use bountycfr_engine::node::{GameTree, History, Node, NodeId, PayoffEvaluator};
use log::debug;

/// Build the full game tree breadth-first. The root is node 0 and every
/// child id is greater than its parent's.
pub fn build_tree(config: &GameConfig) -> Result<GameTree, GameError> {
    let mut tree = GameTree::new();
    let mut queue: VecDeque<(History, Option<NodeId>)> = VecDeque::new();
    queue.push_back((History::root(), None));

    while let Some((history, parent)) = queue.pop_front() {
        let id = tree.len() as NodeId;
        let node = if is_terminal(&history) {
            let payoff = config.payoff(&history)?;
            Node::Terminal {
                id,
                parent,
                history,
                payoff,
            }
        } else {
            let actions = legal_actions(&history).to_vec();
            for &action in &actions {
                queue.push_back((history.with(action), Some(id)));
            }
            Node::Decision {
                id,
                parent,
                player: history.player(),
                history,
                actions,
                children: Vec::new(),
            }
        };
        tree.nodes.push(node);

        if let Some(parent_id) = parent {
            if let Some(Node::Decision { children, .. }) = tree.get_mut(parent_id) {
                children.push(id);
            }
        }
    }

    debug!(
        "built game tree: {} nodes ({} decisions)",
        tree.len(),
        tree.decisions().count()
    );
    Ok(tree)
}
