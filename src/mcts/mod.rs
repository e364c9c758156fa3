//! Parallel Monte Carlo Tree Search over canonical boards.
//!
//! # Overview
//!
//! Every search answers one question: which empty cell should the player to move
//! claim? The engine rotates the board into that player's canonical frame, grows a
//! tree of candidate continuations and returns the most visited first move,
//! translated back to the real cell index through the board's index grid.
//!
//! Iterations run concurrently on a `rayon` pool against a shared arena tree.
//! Node statistics are atomics; the only lock a worker takes is the child list
//! of the node it expands.
//!
//! # Evaluators
//!
//! An optional [`Evaluator`](crate::evaluator::Evaluator) blends a move prior into
//! selection (`α·prior + (1-α)·UCB1`) and can replace rollouts with its value
//! estimate. Without one the engine is plain UCB1 with rollouts.

pub mod config;
pub mod node;
pub mod search;
pub mod tree;

pub use config::MctsConfig;
pub use node::{NodeId, SearchNode};
pub use search::{select_move, CancellationToken, ChildStats, MctsEngine, SearchError, SearchResult};
pub use tree::SearchTree;
