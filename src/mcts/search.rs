//! MCTS search implementation.
//!
//! One call builds a fresh tree for a single decision:
//! 1. Root setup: the board is rotated into the mover's canonical frame
//! 2. Initial expansion: one child per empty cell, each simulated once
//! 3. Iterations: selection by UCB1, expansion, simulation, backpropagation
//! 4. Robust child: the most visited root child, mapped back to its real cell
//!
//! Rewards are always relative to the root player (+1 win, -1 any other player
//! wins, 0 draw) and are never flipped on the way up.

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, trace, warn};

use super::config::MctsConfig;
use super::node::{NodeId, SearchNode};
use super::tree::SearchTree;
use crate::board::{Board, CellPos};
use crate::connectivity::has_winning_path;
use crate::evaluator::{Evaluation, Evaluator, EvaluatorError};
use crate::game::{GamePhase, GameState};
use crate::hex::PLAYER_COUNT;
use crate::symmetry::canonicalize;

/// Errors that can occur during MCTS search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("No legal moves available")]
    NoLegalMoves,

    #[error("Game is not in progress ({0:?})")]
    GameNotInProgress(GamePhase),

    #[error("Player {player} asked for a move but player {current} is to move")]
    NotPlayersTurn { player: u8, current: u8 },

    #[error("Evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("Could not build the search thread pool: {0}")]
    ThreadPool(#[from] ThreadPoolBuildError),
}

/// Why a batch of iterations stopped early.
enum Halt {
    Cancelled,
    Failed(SearchError),
}

impl Halt {
    /// `Ok(true)` for a cancellation, the error otherwise.
    fn into_cancelled(self) -> Result<bool, SearchError> {
        match self {
            Halt::Cancelled => Ok(true),
            Halt::Failed(e) => Err(e),
        }
    }
}

/// Cooperative cancellation flag shared between a search and its caller.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Statistics of one root child.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildStats {
    pub cell_index: usize,
    pub visits: u32,
    pub total_reward: f64,
    pub prior: f32,
}

/// Result of an MCTS search.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Real index of the chosen cell.
    pub cell_index: usize,

    /// Slot of the chosen cell in the root player's canonical frame.
    pub position: CellPos,

    pub root_visits: u32,

    /// Iterations completed after the initial pass.
    pub iterations: u64,

    pub total_nodes: usize,

    pub max_depth: u32,

    /// Root children in expansion order.
    pub children: Vec<ChildStats>,

    pub elapsed: Duration,

    /// The search stopped early on its cancellation token.
    pub cancelled: bool,
}

impl SearchResult {
    /// Visit counts of the root children normalized to sum to 1.
    pub fn visit_distribution(&self) -> Vec<(usize, f32)> {
        let total: u32 = self.children.iter().map(|c| c.visits).sum();
        if total == 0 {
            return Vec::new();
        }
        self.children
            .iter()
            .map(|c| (c.cell_index, c.visits as f32 / total as f32))
            .collect()
    }

    /// Simulations per second, counting the initial pass.
    pub fn simulations_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.root_visits as f64 / secs
        } else {
            0.0
        }
    }
}

/// Parallel MCTS engine. Holds configuration, an optional evaluator and the worker
/// pool; every search builds and drops its own tree.
pub struct MctsEngine {
    config: MctsConfig,
    evaluator: Option<Arc<dyn Evaluator>>,
    /// `None` when the search runs on the calling thread.
    pool: Option<ThreadPool>,
}

impl MctsEngine {
    pub fn new(config: MctsConfig) -> Result<Self, SearchError> {
        let threads = config.resolved_threads();
        let pool = if threads > 1 {
            Some(ThreadPoolBuilder::new().num_threads(threads).build()?)
        } else {
            None
        };
        Ok(Self {
            config,
            evaluator: None,
            pool,
        })
    }

    /// Attaches an evaluator used for priors and, if configured, leaf values.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.evaluator = Some(evaluator);
        self
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Searches for `player`'s move in `game`.
    pub fn search(
        &self,
        game: &GameState,
        player: u8,
        cancel: &CancellationToken,
    ) -> Result<SearchResult, SearchError> {
        check_turn(game, player)?;
        self.search_board(&game.board(), player, cancel)
    }

    /// Searches for `player`'s move on a real-frame board.
    pub fn search_board(
        &self,
        board: &Board,
        player: u8,
        cancel: &CancellationToken,
    ) -> Result<SearchResult, SearchError> {
        let started = Instant::now();
        let seed = self.config.seed.unwrap_or_else(rand::random);
        let tree = SearchTree::new(canonicalize(board, player), player);
        let root_id = tree.root();
        let root = tree.get(root_id);

        {
            let mut children = root.children.lock();
            if !root.terminal {
                self.expand(&tree, root_id, &root, &mut children)?;
            }
        }
        let child_ids = root.child_ids();
        if child_ids.is_empty() {
            return Err(SearchError::NoLegalMoves);
        }

        // initial pass: every child gets one simulation
        let initial = child_ids.len() as u64;
        self.run_indexed(initial, |j| {
            let child_id = child_ids[j as usize];
            let child = tree.get(child_id);
            let reward = self
                .simulate(&child, player, None, seed.wrapping_add(j))
                .map_err(Halt::Failed)?;
            tree.backpropagate(child_id, reward);
            Ok(())
        })
        .map_or_else(Halt::into_cancelled, |()| Ok(false))?;

        let completed = AtomicU64::new(0);
        let cancelled = self
            .run_indexed(self.config.iterations as u64, |i| {
                if cancel.is_cancelled() {
                    return Err(Halt::Cancelled);
                }
                self.iterate(&tree, player, seed.wrapping_add(initial + i))
                    .map_err(Halt::Failed)?;
                completed.fetch_add(1, Ordering::Relaxed);
                Ok(())
            })
            .map_or_else(Halt::into_cancelled, |()| Ok(false))?;

        let result = self.collect(&tree, started, completed.into_inner(), cancelled)?;
        if result.cancelled {
            warn!(
                iterations = result.iterations,
                budget = self.config.iterations,
                "search cancelled, returning best move so far"
            );
        }
        debug!(
            player,
            cell = result.cell_index,
            root_visits = result.root_visits,
            nodes = result.total_nodes,
            depth = result.max_depth,
            elapsed_ms = result.elapsed.as_millis() as u64,
            "search finished"
        );
        Ok(result)
    }

    /// Runs `job(0..count)` on the pool, or in order on this thread.
    /// Stops handing out new indices at the first `Err`.
    fn run_indexed<F>(&self, count: u64, job: F) -> Result<(), Halt>
    where
        F: Fn(u64) -> Result<(), Halt> + Send + Sync,
    {
        match &self.pool {
            Some(pool) => pool.install(|| (0..count).into_par_iter().try_for_each(&job)),
            None => (0..count).try_for_each(job),
        }
    }

    /// One iteration: selection, expansion, simulation, backpropagation.
    fn iterate(&self, tree: &SearchTree, root_player: u8, seed: u64) -> Result<(), SearchError> {
        let mut id = tree.root();
        let (leaf, evaluation) = loop {
            let node = tree.get(id);
            let mut children = node.children.lock();
            if children.is_empty() {
                let evaluation = if node.terminal {
                    None
                } else {
                    self.expand(tree, id, &node, &mut children)?
                };
                drop(children);
                break (node, evaluation);
            }
            let ids = children.clone();
            drop(children);
            id = self.select_child(tree, &ids, node.visits());
        };

        let reward = self.simulate(&leaf, root_player, evaluation, seed)?;
        trace!(depth = leaf.depth, reward, "iteration");
        tree.backpropagate(id, reward);
        Ok(())
    }

    fn blends_prior(&self) -> bool {
        self.evaluator.is_some() && self.config.policy_weight > 0.0
    }

    fn uses_evaluator_value(&self) -> bool {
        self.evaluator.is_some() && self.config.evaluator_value
    }

    /// Child maximizing UCB1, or the blended score with an evaluator. Ties go to the
    /// earliest child.
    fn select_child(&self, tree: &SearchTree, ids: &[NodeId], parent_visits: u32) -> NodeId {
        let alpha = if self.blends_prior() { self.config.policy_weight } else { 0.0 };
        let children = tree.get_many(ids);

        let mut best = ids[0];
        let mut best_score = f64::NEG_INFINITY;
        for (&id, child) in ids.iter().zip(&children) {
            let ucb = child.ucb1(parent_visits, self.config.exploration);
            let score = if ucb.is_infinite() {
                ucb
            } else {
                alpha * child.prior as f64 + (1.0 - alpha) * ucb
            };
            if score > best_score {
                best = id;
                best_score = score;
            }
        }
        best
    }

    /// Creates every child of `id`. The caller holds the node's child-list lock.
    /// Returns the evaluation made for the priors, if any.
    fn expand(
        &self,
        tree: &SearchTree,
        id: NodeId,
        node: &SearchNode,
        children: &mut Vec<NodeId>,
    ) -> Result<Option<Evaluation>, SearchError> {
        let evaluation = match &self.evaluator {
            Some(evaluator) if self.blends_prior() || self.uses_evaluator_value() => {
                Some(evaluator.evaluate(&node.board)?.validated()?)
            }
            _ => None,
        };

        let batch: Vec<SearchNode> = node
            .board
            .empty_cells()
            .into_iter()
            .map(|pos| {
                let prior = match (&evaluation, node.board.index_at(pos)) {
                    (Some(eval), Some(index)) => eval.prior(index),
                    _ => 0.0,
                };
                SearchNode::new_child(id, node, pos, prior)
            })
            .collect();

        children.extend(tree.allocate(batch));
        Ok(evaluation)
    }

    /// Reward of `node` for `root_player`.
    fn simulate(
        &self,
        node: &SearchNode,
        root_player: u8,
        evaluation: Option<Evaluation>,
        seed: u64,
    ) -> Result<f64, SearchError> {
        if node.terminal {
            return Ok(reward_for(node.winner, root_player));
        }

        if let (true, Some(evaluator)) = (self.config.evaluator_value, &self.evaluator) {
            let value = match evaluation {
                Some(eval) => eval.value,
                None => evaluator.evaluate(&node.board)?.validated()?.value,
            };
            return Ok(value.clamp(-1.0, 1.0) as f64);
        }

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let mut board = node.board.clone();
        self.config.rollout.play_out(&mut board, node.player_to_move, &mut rng);

        let winner = (1..=PLAYER_COUNT).find(|&p| has_winning_path(&board, p));
        Ok(reward_for(winner, root_player))
    }

    fn collect(
        &self,
        tree: &SearchTree,
        started: Instant,
        iterations: u64,
        cancelled: bool,
    ) -> Result<SearchResult, SearchError> {
        let root = tree.get(tree.root());
        let best_id = tree.robust_child().ok_or(SearchError::NoLegalMoves)?;
        let best = tree.get(best_id);

        let position = best.move_pos.ok_or(SearchError::NoLegalMoves)?;
        let cell_index = real_index(&root.board, position);

        let ids = root.child_ids();
        let children = tree
            .get_many(&ids)
            .iter()
            .map(|child| ChildStats {
                cell_index: child.move_pos.map_or(usize::MAX, |pos| real_index(&root.board, pos)),
                visits: child.visits(),
                total_reward: child.total_reward(),
                prior: child.prior,
            })
            .collect();

        Ok(SearchResult {
            cell_index,
            position,
            root_visits: root.visits(),
            iterations,
            total_nodes: tree.node_count(),
            max_depth: tree.max_depth(),
            children,
            elapsed: started.elapsed(),
            cancelled,
        })
    }
}

/// Fails unless `game` is in progress and waiting on `player`.
pub(crate) fn check_turn(game: &GameState, player: u8) -> Result<(), SearchError> {
    if game.phase() != GamePhase::InProgress {
        return Err(SearchError::GameNotInProgress(game.phase()));
    }
    if game.current_player() != player {
        return Err(SearchError::NotPlayersTurn {
            player,
            current: game.current_player(),
        });
    }
    Ok(())
}

fn reward_for(winner: Option<u8>, root_player: u8) -> f64 {
    match winner {
        Some(w) if w == root_player => 1.0,
        Some(_) => -1.0,
        None => 0.0,
    }
}

/// Real cell index behind a canonical-frame slot.
///
/// # Panics
/// If the index grid has no cell there, which means the grid was corrupted.
fn real_index(board: &Board, pos: CellPos) -> usize {
    board
        .index_at(pos)
        .unwrap_or_else(|| panic!("index grid has no cell behind playable slot {pos}"))
}

/// Chooses a move for `player` with a default-configured engine and the given
/// iteration budget. Returns the real cell index.
pub fn select_move(
    game: &GameState,
    player: u8,
    iteration_budget: u32,
    cancellation: &CancellationToken,
) -> Result<usize, SearchError> {
    let engine = MctsEngine::new(MctsConfig::default().with_iterations(iteration_budget))?;
    Ok(engine.search(game, player, cancellation)?.cell_index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::UniformEvaluator;
    use crate::hex::{generate_hexagons, HexCoord};
    use crate::rollout::RolloutPolicy;

    fn engine(config: MctsConfig) -> MctsEngine {
        MctsEngine::new(config).unwrap()
    }

    fn empty_board(radius: i32) -> Board {
        Board::from_cells(radius, &generate_hexagons(radius))
    }

    fn total_child_visits(result: &SearchResult) -> u32 {
        result.children.iter().map(|c| c.visits).sum()
    }

    struct FailingEvaluator;

    impl Evaluator for FailingEvaluator {
        fn evaluate(&self, _board: &Board) -> Result<Evaluation, EvaluatorError> {
            Err(EvaluatorError::ModelError("no model loaded".to_string()))
        }
    }

    struct NanEvaluator;

    impl Evaluator for NanEvaluator {
        fn evaluate(&self, _board: &Board) -> Result<Evaluation, EvaluatorError> {
            Ok(Evaluation { value: f32::NAN, ..Evaluation::default() })
        }
    }

    #[test]
    fn test_visit_conservation_single_thread() {
        let config = MctsConfig::for_testing().with_iterations(100);
        let result = engine(config)
            .search_board(&empty_board(2), 1, &CancellationToken::new())
            .unwrap();

        assert_eq!(result.children.len(), 19);
        assert_eq!(result.iterations, 100);
        assert_eq!(result.root_visits, 100 + 19);
        assert_eq!(total_child_visits(&result), 100 + 19);
        assert!(!result.cancelled);
    }

    #[test]
    fn test_visit_conservation_parallel() {
        let config = MctsConfig::for_testing().with_iterations(300).with_threads(4);
        let result = engine(config)
            .search_board(&empty_board(2), 2, &CancellationToken::new())
            .unwrap();

        assert_eq!(result.root_visits, 300 + 19);
        assert_eq!(total_child_visits(&result), 300 + 19);
        assert!(result.total_nodes > 20);
    }

    #[test]
    fn test_fixed_seed_is_deterministic() {
        let board = empty_board(2);
        for policy in [RolloutPolicy::Random, RolloutPolicy::PathBiased] {
            let config = MctsConfig::for_testing().with_rollout(policy).with_seed(1234);
            let a = engine(config.clone()).search_board(&board, 3, &CancellationToken::new()).unwrap();
            let b = engine(config).search_board(&board, 3, &CancellationToken::new()).unwrap();
            assert_eq!(a.cell_index, b.cell_index);
            assert_eq!(a.children, b.children);
        }
    }

    #[test]
    fn test_full_board_has_no_legal_moves() {
        let cells: Vec<_> = generate_hexagons(1)
            .into_iter()
            .enumerate()
            .map(|(i, c)| if c.is_playable(1) { c.with_owner((i % 3) as u8 + 1) } else { c })
            .collect();
        let board = Board::from_cells(1, &cells);
        let result = engine(MctsConfig::for_testing()).search_board(&board, 1, &CancellationToken::new());
        assert!(matches!(result, Err(SearchError::NoLegalMoves)));
    }

    #[test]
    fn test_cancelled_search_still_answers() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = engine(MctsConfig::for_testing())
            .search_board(&empty_board(2), 1, &cancel)
            .unwrap();

        assert!(result.cancelled);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.root_visits, 19);
        assert_eq!(total_child_visits(&result), 19);
    }

    #[test]
    fn test_finds_winning_move() {
        // player 1 holds q = -2..1 on r = 0; player 2 blocks (2, -1) so only (2, 0) closes
        let mut game = GameState::with_ai_players(2);
        let script = [(-2, 0), (-1, -1), (-2, 2), (-1, 0), (0, -1), (-1, 2), (0, 0), (1, -1), (0, 2), (1, 0), (2, -1), (1, 1)];
        for &(q, r) in &script {
            let index = game.cell_index_at(HexCoord::new(q, r)).unwrap();
            game = game.apply_move(game.current_player(), index).unwrap();
        }
        assert_eq!(game.current_player(), 1);

        let config = MctsConfig::for_testing().with_iterations(400);
        let result = engine(config).search(&game, 1, &CancellationToken::new()).unwrap();
        assert_eq!(Some(result.cell_index), game.cell_index_at(HexCoord::new(2, 0)));
        let closing = result.children.iter().find(|c| c.cell_index == result.cell_index).unwrap();
        assert_eq!(closing.total_reward, closing.visits as f64);
    }

    #[test]
    fn test_move_maps_to_real_cell_for_every_player() {
        let game = GameState::with_ai_players(2);
        let board = game.board();
        for player in 1..=3 {
            let config = MctsConfig::for_testing().with_iterations(20);
            let result = engine(config).search_board(&board, player, &CancellationToken::new()).unwrap();
            let cell = game.hexagons()[result.cell_index];
            assert!(cell.is_playable(2));
            assert!(!cell.is_taken());
        }
    }

    #[test]
    fn test_search_rejects_wrong_player() {
        let game = GameState::with_ai_players(2);
        let result = engine(MctsConfig::for_testing()).search(&game, 2, &CancellationToken::new());
        assert!(matches!(
            result,
            Err(SearchError::NotPlayersTurn { player: 2, current: 1 })
        ));

        let waiting = GameState::new(2);
        let result = engine(MctsConfig::for_testing()).search(&waiting, 1, &CancellationToken::new());
        assert!(matches!(result, Err(SearchError::GameNotInProgress(_))));
    }

    #[test]
    fn test_guided_search_with_uniform_evaluator() {
        let config = MctsConfig::for_testing().with_iterations(60).with_evaluator_value(true);
        let engine = engine(config).with_evaluator(Arc::new(UniformEvaluator::new()));
        let result = engine
            .search_board(&empty_board(2), 1, &CancellationToken::new())
            .unwrap();

        assert_eq!(result.root_visits, 60 + 19);
        for child in &result.children {
            assert!((child.prior - 1.0 / 19.0).abs() < 1e-6);
        }
        let distribution: f32 = result.visit_distribution().iter().map(|(_, p)| p).sum();
        assert!((distribution - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_evaluator_failure_aborts_search() {
        let engine = engine(MctsConfig::for_testing()).with_evaluator(Arc::new(FailingEvaluator));
        let result = engine.search_board(&empty_board(2), 1, &CancellationToken::new());
        assert!(matches!(result, Err(SearchError::Evaluator(_))));
    }

    #[test]
    fn test_non_finite_evaluation_aborts_search() {
        let config = MctsConfig::for_testing().with_evaluator_value(true);
        let engine = engine(config).with_evaluator(Arc::new(NanEvaluator));
        let result = engine.search_board(&empty_board(2), 1, &CancellationToken::new());
        assert!(matches!(
            result,
            Err(SearchError::Evaluator(EvaluatorError::EvaluationFailed(_)))
        ));
    }

    #[test]
    fn test_cancel_mid_search_keeps_tree_consistent() {
        let config = MctsConfig::for_testing().with_iterations(u32::MAX).with_threads(4);
        let engine = engine(config);
        let cancel = CancellationToken::new();
        let timer = {
            let cancel = cancel.clone();
            std::thread::spawn(move || {
                std::thread::sleep(Duration::from_millis(200));
                cancel.cancel();
            })
        };

        let result = engine.search_board(&empty_board(4), 1, &cancel).unwrap();
        timer.join().unwrap();

        assert!(result.cancelled);
        assert_eq!(result.children.len(), 61);
        assert!(result.iterations < u32::MAX as u64);
        assert_eq!(result.root_visits as u64, result.iterations + 61);
        assert_eq!(total_child_visits(&result), result.root_visits);
    }

    #[test]
    fn test_select_move_returns_playable_cell() {
        let game = GameState::with_ai_players(1);
        let index = select_move(&game, 1, 30, &CancellationToken::new()).unwrap();
        assert!(game.playable_cells().contains(&index));
    }
}
