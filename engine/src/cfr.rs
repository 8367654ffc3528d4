//! Vanilla CFR: regret storage, strategy accumulation, and tree traversal
//!
//! Every value returned by the traversal is from the perspective of the
//! player acting at that history; each level negates its children.
//! The whole tree is enumerated on every iteration (no sampling), and
//! regrets are weighted by the opponent's reach probability.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::time::Instant;

use log::{debug, info};

use crate::error::GameError;
use crate::game::{is_terminal, legal_actions, GameConfig};
use crate::node::{Action, History, PayoffEvaluator, Player, NUM_ACTIONS};

/// Iterations between progress messages during training.
pub const LOG_INTERVAL: u64 = 1_000;

/// Time-averaged strategy per information set
pub type Policy = BTreeMap<History, [f64; NUM_ACTIONS]>;

/// Regret matching restricted to the legal slots.
/// σ(I,a) = r+(I,a) / Σr+(I,a); uniform over legal actions if all regrets ≤ 0.
fn regret_matching(regrets: &[f64; NUM_ACTIONS], legal: &[Action]) -> [f64; NUM_ACTIONS] {
    let mut strategy = [0.0_f64; NUM_ACTIONS];
    let mut pos_sum = 0.0;
    for &action in legal {
        let weight = regrets[action.index()].max(0.0);
        strategy[action.index()] = weight;
        pos_sum += weight;
    }
    if pos_sum > 0.0 {
        for s in &mut strategy {
            *s /= pos_sum;
        }
    } else {
        let q = 1.0 / legal.len() as f64;
        for &action in legal {
            strategy[action.index()] = q;
        }
    }
    strategy
}

/// Accumulators for one information set. All three vectors are indexed by
/// [`Action::index`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Infoset {
    /// Cumulative counterfactual regret
    pub regret_sum: [f64; NUM_ACTIONS],
    /// Strategy computed at the most recent visit
    pub strategy: [f64; NUM_ACTIONS],
    /// Plain running sum of every strategy computed here
    pub strategy_sum: [f64; NUM_ACTIONS],
}

impl Infoset {
    /// Average strategy: S(I,a) / ΣS(I,a); uniform if nothing was accumulated.
    pub fn average_strategy(&self) -> [f64; NUM_ACTIONS] {
        let total: f64 = self.strategy_sum.iter().sum();
        if total <= 0.0 {
            return [1.0 / NUM_ACTIONS as f64; NUM_ACTIONS];
        }
        self.strategy_sum.map(|x| x / total)
    }
}

/// Information-set table, keyed by history.
///
/// Entries are inserted lazily on first visit and never removed.
#[derive(Debug, Default)]
pub struct InfosetTable {
    infosets: BTreeMap<History, Infoset>,
}

impl InfosetTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, history: &History) -> Option<&Infoset> {
        self.infosets.get(history)
    }

    pub fn contains(&self, history: &History) -> bool {
        self.infosets.contains_key(history)
    }

    pub fn len(&self) -> usize {
        self.infosets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.infosets.is_empty()
    }

    /// Information sets in history order
    pub fn iter(&self) -> btree_map::Iter<'_, History, Infoset> {
        self.infosets.iter()
    }

    /// The record for `history`, created zeroed if unseen.
    fn entry(&mut self, history: &History) -> &mut Infoset {
        self.infosets.entry(history.clone()).or_insert_with(|| {
            debug!("new information set: {}", history);
            Infoset::default()
        })
    }

    fn update_regrets(&mut self, history: &History, deltas: &[f64; NUM_ACTIONS]) {
        let infoset = self.entry(history);
        for (r, &d) in infoset.regret_sum.iter_mut().zip(deltas.iter()) {
            *r += d;
        }
    }

    pub fn average_strategy(&self) -> Policy {
        self.infosets
            .iter()
            .map(|(history, infoset)| (history.clone(), infoset.average_strategy()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a InfosetTable {
    type Item = (&'a History, &'a Infoset);
    type IntoIter = btree_map::Iter<'a, History, Infoset>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Vanilla CFR solver for the bounty game.
///
/// The solver exclusively owns its information-set table; training is
/// sequential so each iteration sees every regret update of the last.
#[derive(Debug)]
pub struct CfrSolver<E: PayoffEvaluator = GameConfig> {
    evaluator: E,
    table: InfosetTable,
    iteration: u64,
}

impl<E: PayoffEvaluator> CfrSolver<E> {
    /// Create a solver with an empty information-set table.
    pub fn new(evaluator: E) -> Self {
        CfrSolver {
            evaluator,
            table: InfosetTable::new(),
            iteration: 0,
        }
    }

    /// The payoff evaluator (game configuration) this solver was built with
    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Iterations run so far
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    pub fn infosets(&self) -> &InfosetTable {
        &self.table
    }

    /// Current strategy at `history` by regret matching.
    ///
    /// Creates the information set on first visit and adds the returned
    /// strategy into its strategy sum.
    pub fn strategy_for(&mut self, history: &History) -> [f64; NUM_ACTIONS] {
        let infoset = self.table.entry(history);
        let strategy = regret_matching(&infoset.regret_sum, legal_actions(history));
        infoset.strategy = strategy;
        for (s, &p) in infoset.strategy_sum.iter_mut().zip(strategy.iter()) {
            *s += p;
        }
        strategy
    }

    /// Recursive CFR traversal. Returns the expected value of `history` for
    /// the player acting there.
    pub fn traverse(
        &mut self,
        history: &History,
        reach_p0: f64,
        reach_p1: f64,
    ) -> Result<f64, GameError> {
        if is_terminal(history) {
            return self.evaluator.payoff(history);
        }

        let player = history.player();
        let legal = legal_actions(history);
        let strategy = self.strategy_for(history);

        let mut util = [0.0_f64; NUM_ACTIONS];
        let mut node_util = 0.0;
        for &action in legal {
            let a = action.index();
            let (next_p0, next_p1) = match player {
                Player::P0 => (reach_p0 * strategy[a], reach_p1),
                Player::P1 => (reach_p0, reach_p1 * strategy[a]),
            };
            util[a] = -self.traverse(&history.with(action), next_p0, next_p1)?;
            node_util += strategy[a] * util[a];
        }

        let opponent_reach = match player {
            Player::P0 => reach_p1,
            Player::P1 => reach_p0,
        };
        let mut deltas = [0.0_f64; NUM_ACTIONS];
        for &action in legal {
            let a = action.index();
            deltas[a] = opponent_reach * (util[a] - node_util);
        }
        self.table.update_regrets(history, &deltas);

        Ok(node_util)
    }

    /// Run one traversal from the root. Returns the root value for player 0.
    pub fn run_iteration(&mut self) -> Result<f64, GameError> {
        self.iteration += 1;
        self.traverse(&History::root(), 1.0, 1.0)
    }

    /// Run `iterations` sequential traversals from the root.
    pub fn train(&mut self, iterations: u64) -> Result<(), GameError> {
        if iterations == 0 {
            return Ok(());
        }
        info!("training {} iterations", iterations);
        let start = Instant::now();
        let mut root_value = 0.0;
        for _ in 0..iterations {
            root_value = self.run_iteration()?;
            if self.iteration % LOG_INTERVAL == 0 {
                debug!(
                    "iteration {}: root value {:.6}, {} information sets",
                    self.iteration,
                    root_value,
                    self.table.len()
                );
            }
        }
        info!(
            "trained {} iterations in {:.2?} (last root value {:.6}, {} information sets)",
            iterations,
            start.elapsed(),
            root_value,
            self.table.len()
        );
        Ok(())
    }

    /// Time-averaged strategy for every discovered information set.
    pub fn average_strategy(&self) -> Policy {
        self.table.average_strategy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    const THIRD: f64 = 1.0 / 3.0;

    fn reference_solver() -> CfrSolver {
        CfrSolver::new(GameConfig::new(5.0, 1.0, Player::P1))
    }

    fn raise() -> History {
        History::root().with(Action::Raise)
    }

    fn assert_sums_to_one(v: &[f64; NUM_ACTIONS], what: &str) {
        let sum: f64 = v.iter().sum();
        assert!((sum - 1.0).abs() < 1e-10, "{} sums to {}", what, sum);
    }

    #[test]
    fn test_regret_matching_uniform_initial() {
        let strategy = regret_matching(&[0.0; NUM_ACTIONS], &Action::ALL);
        assert_eq!(strategy, [THIRD; NUM_ACTIONS]);
    }

    #[test]
    fn test_regret_matching_proportional() {
        let strategy = regret_matching(&[2.0, 1.0, -1.0], &Action::ALL);
        assert!((strategy[0] - 2.0 / 3.0).abs() < 1e-10);
        assert!((strategy[1] - 1.0 / 3.0).abs() < 1e-10);
        assert_eq!(strategy[2], 0.0);
    }

    #[test]
    fn test_regret_matching_ignores_illegal_slots() {
        let strategy = regret_matching(&[0.0, 0.0, 5.0], &[Action::Fold, Action::Call]);
        assert_eq!(strategy, [0.5, 0.5, 0.0]);
    }

    #[test]
    fn test_strategy_for_creates_and_accumulates() {
        let mut solver = reference_solver();
        assert!(solver.infosets().is_empty());

        let root = History::root();
        let s = solver.strategy_for(&root);
        assert_eq!(s, [THIRD; NUM_ACTIONS]);
        solver.strategy_for(&root);

        let infoset = solver.infosets().get(&root).unwrap();
        assert_eq!(infoset.regret_sum, [0.0; NUM_ACTIONS]);
        assert_eq!(infoset.strategy, [THIRD; NUM_ACTIONS]);
        for &x in &infoset.strategy_sum {
            assert!((x - 2.0 * THIRD).abs() < 1e-12);
        }
        assert_eq!(solver.infosets().len(), 1);
    }

    #[test]
    fn test_non_positive_regrets_give_uniform() {
        let mut solver = reference_solver();
        let root = History::root();
        solver.table.entry(&root).regret_sum = [-1.0, -2.5, 0.0];
        assert_eq!(solver.strategy_for(&root), [THIRD; NUM_ACTIONS]);
    }

    #[test]
    fn test_current_strategy_sums_to_one_after_each_visit() {
        let mut solver = reference_solver();
        for _ in 0..50 {
            solver.run_iteration().unwrap();
            for (history, infoset) in solver.infosets() {
                assert_sums_to_one(&infoset.strategy, &history.to_string());
            }
        }
    }

    #[test]
    fn test_first_iteration_regrets() {
        let mut solver = reference_solver();
        let root_value = solver.run_iteration().unwrap();
        // fold -1, call +1, raise -1.5 (responder is uniform over fold/call)
        assert!((root_value + 0.5).abs() < 1e-12);

        let root = solver.infosets().get(&History::root()).unwrap();
        let expected = [-0.5, 1.5, -1.0];
        for (got, want) in root.regret_sum.iter().zip(expected.iter()) {
            assert!((got - want).abs() < 1e-12, "root regret {} != {}", got, want);
        }

        // responder regrets are weighted by player 0's reach (1/3)
        let facing = solver.infosets().get(&raise()).unwrap();
        assert!((facing.regret_sum[0] + 7.0 / 6.0).abs() < 1e-12);
        assert!((facing.regret_sum[1] - 7.0 / 6.0).abs() < 1e-12);
        assert_eq!(facing.regret_sum[2], 0.0);
    }

    #[test]
    fn test_train_zero_leaves_tables_empty() {
        let mut solver = reference_solver();
        solver.train(0).unwrap();
        assert!(solver.infosets().is_empty());
        assert!(solver.average_strategy().is_empty());
        assert_eq!(solver.iteration(), 0);
    }

    #[test]
    fn test_raise_infoset_is_discovered() {
        // The responder's decision after a raise is a real information set.
        let mut solver = reference_solver();
        solver.train(1).unwrap();
        let keys: Vec<History> = solver.infosets().iter().map(|(h, _)| h.clone()).collect();
        assert_eq!(keys, vec![History::root(), raise()]);
    }

    #[test]
    fn test_infosets_grow_monotonically() {
        let mut solver = reference_solver();
        solver.train(3).unwrap();
        let before: BTreeSet<History> = solver.infosets().iter().map(|(h, _)| h.clone()).collect();
        solver.train(7).unwrap();
        let after: BTreeSet<History> = solver.infosets().iter().map(|(h, _)| h.clone()).collect();
        assert!(before.is_subset(&after));
        assert_eq!(solver.iteration(), 10);
    }

    #[test]
    fn test_average_strategy_sums_to_one() {
        let mut solver = CfrSolver::new(GameConfig::new(5.0, 1.0, Player::P0));
        solver.train(2_000).unwrap();
        let avg = solver.average_strategy();
        assert_eq!(avg.len(), 2);
        for (history, strategy) in &avg {
            assert_sums_to_one(strategy, &history.to_string());
        }
    }

    #[test]
    fn test_solve_golden_regression() {
        // Calling dominates at both decisions: after the first iteration
        // the current strategy is pure call, so the averages are exact.
        let mut solver = reference_solver();
        solver.train(10_000).unwrap();
        let avg = solver.average_strategy();

        let root = avg[&History::root()];
        let baseline = [1.0 / 30_000.0, 1.0 - 2.0 / 30_000.0, 1.0 / 30_000.0];
        for (got, want) in root.iter().zip(baseline.iter()) {
            assert!((got - want).abs() < 1e-9, "root {:?} vs {:?}", root, baseline);
        }

        let facing = avg[&raise()];
        let baseline = [0.5 / 10_000.0, 1.0 - 0.5 / 10_000.0, 0.0];
        for (got, want) in facing.iter().zip(baseline.iter()) {
            assert!((got - want).abs() < 1e-9, "raise {:?} vs {:?}", facing, baseline);
        }
    }

    #[test]
    fn test_bounty_on_first_seat_prefers_fold() {
        let mut solver = CfrSolver::new(GameConfig::new(5.0, 1.0, Player::P0));
        solver.train(10_000).unwrap();
        let root = solver.average_strategy()[&History::root()];
        assert!(root[Action::Fold.index()] > root[Action::Call.index()]);
        assert!(root[Action::Fold.index()] > root[Action::Raise.index()]);
    }

    struct NoShowdown(GameConfig);

    impl PayoffEvaluator for NoShowdown {
        fn payoff(&self, history: &History) -> Result<f64, GameError> {
            if history.actions() == [Action::Raise, Action::Call] {
                return Err(GameError::UndefinedPayoff(history.clone()));
            }
            self.0.payoff(history)
        }
    }

    #[test]
    fn test_payoff_error_propagates_out_of_train() {
        let mut solver = CfrSolver::new(NoShowdown(GameConfig::default()));
        match solver.train(5) {
            Err(GameError::UndefinedPayoff(h)) => {
                assert_eq!(h, History::from(vec![Action::Raise, Action::Call]));
            }
            other => panic!("expected UndefinedPayoff, got {:?}", other),
        }
    }
}
