//! # hexsquared
//!
//! Decision engine for a three-player connection game on a hexagonal board. Each
//! player owns one pair of opposite sides and wins by linking them with an
//! unbroken chain of their own cells.
//!
//! ## Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  game_controller / player        (driving a table)      │
//! ├─────────────────────────────────────────────────────────┤
//! │  mcts                            (parallel tree search) │
//! │  rollout                         (simulation policies)  │
//! │  evaluator                       (external value/prior) │
//! ├─────────────────────────────────────────────────────────┤
//! │  game                            (rules, pure updates)  │
//! │  connectivity / symmetry         (paths, frames)        │
//! │  board / hex                     (geometry, projection) │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Frames
//! Every board carries the rotation it was produced with. Rotating by
//! `player - 1` steps of 120° puts that player's edges on the q-sides, so the
//! search always reasons as "the player connecting left to right". The index grid
//! rides along with every rotation and maps decisions back to real cells.
//!
//! ## Quick Start
//! ```rust,no_run
//! use hexsquared::game::GameState;
//! use hexsquared::mcts::{select_move, CancellationToken};
//!
//! let game = GameState::with_ai_players(4);
//! let player = game.current_player();
//! let cell = select_move(&game, player, 2_000, &CancellationToken::new()).unwrap();
//! let game = game.apply_move(player, cell).unwrap();
//! assert_eq!(game.current_player(), 2);
//! ```

pub mod board;
pub mod connectivity;
pub mod evaluator;
pub mod game;
pub mod game_controller;
pub mod hex;
pub mod mcts;
pub mod player;
pub mod rollout;
pub mod symmetry;
pub mod training;

pub use board::{Board, CellPos};
pub use game::{GamePhase, GameState, MoveRejected, Outcome};
pub use mcts::{select_move, CancellationToken, MctsConfig, MctsEngine, SearchError, SearchResult};
pub use player::AiPlayer;
pub use rollout::RolloutPolicy;
