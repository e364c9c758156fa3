//! # AI Players - Closed Set of Move Choosers
//!
//! Every automated seat is one variant of [`AiPlayer`]. The variant is picked once,
//! when the seat is configured, and dispatch is a plain `match`; there is no
//! registry of strategies to discover at runtime.
//!
//! ## Strength Ladder
//! ```text
//! Random < EdgeControl < CenterControl < PathConnection < Mcts <= GuidedMcts
//! ```
//! The first four reuse the rollout policies directly and answer instantly. The
//! search-based players spend their configured iteration budget.
//!
//! ## Frames
//! Heuristic players read the real board; the policies resolve each player's edges
//! through the board frame, so no rotation is needed. The search players rotate
//! internally and hand back real cell indices as well.

use crate::evaluator::Evaluator;
use crate::game::GameState;
use crate::mcts::search::check_turn;
use crate::mcts::{CancellationToken, MctsConfig, MctsEngine, SearchError, SearchResult};
use crate::rollout::RolloutPolicy;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub enum AiPlayer {
    Random,
    CenterControl,
    EdgeControl,
    PathConnection,
    Mcts(MctsConfig),
    GuidedMcts {
        config: MctsConfig,
        evaluator: Arc<dyn Evaluator>,
    },
}

impl fmt::Debug for AiPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AiPlayer::Mcts(config) => f.debug_tuple("Mcts").field(config).finish(),
            AiPlayer::GuidedMcts { config, .. } => {
                f.debug_struct("GuidedMcts").field("config", config).finish_non_exhaustive()
            }
            other => write!(f, "{}", other.name()),
        }
    }
}

impl AiPlayer {
    pub fn name(&self) -> &'static str {
        match self {
            AiPlayer::Random => "Random",
            AiPlayer::CenterControl => "CenterControl",
            AiPlayer::EdgeControl => "EdgeControl",
            AiPlayer::PathConnection => "PathConnection",
            AiPlayer::Mcts(_) => "Mcts",
            AiPlayer::GuidedMcts { .. } => "GuidedMcts",
        }
    }

    /// The rollout policy behind a heuristic player.
    fn heuristic(&self) -> Option<RolloutPolicy> {
        match self {
            AiPlayer::Random => Some(RolloutPolicy::Random),
            AiPlayer::CenterControl => Some(RolloutPolicy::CenterBias),
            AiPlayer::EdgeControl => Some(RolloutPolicy::EdgeBias),
            AiPlayer::PathConnection => Some(RolloutPolicy::PathBiased),
            AiPlayer::Mcts(_) | AiPlayer::GuidedMcts { .. } => None,
        }
    }

    /// Runs the search behind a search-based player. `None` for heuristic players.
    pub fn search(
        &self,
        game: &GameState,
        player: u8,
        cancel: &CancellationToken,
    ) -> Option<Result<SearchResult, SearchError>> {
        let engine = match self {
            AiPlayer::Mcts(config) => MctsEngine::new(config.clone()),
            AiPlayer::GuidedMcts { config, evaluator } => {
                MctsEngine::new(config.clone()).map(|engine| engine.with_evaluator(Arc::clone(evaluator)))
            }
            _ => return None,
        };
        Some(engine.and_then(|engine| engine.search(game, player, cancel)))
    }

    /// Picks the real cell index `player` should claim next.
    pub fn choose_move(
        &self,
        game: &GameState,
        player: u8,
        cancel: &CancellationToken,
    ) -> Result<usize, SearchError> {
        check_turn(game, player)?;
        if let Some(result) = self.search(game, player, cancel) {
            return result.map(|r| r.cell_index);
        }

        let policy = self.heuristic().ok_or(SearchError::NoLegalMoves)?;
        let board = game.board();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(rand::random());
        let pos = policy
            .choose_move(&board, player, &mut rng)
            .ok_or(SearchError::NoLegalMoves)?;
        let index = board.index_at(pos).ok_or(SearchError::NoLegalMoves)?;
        debug!(player, ai = self.name(), cell = index, "heuristic move");
        Ok(index)
    }
}
