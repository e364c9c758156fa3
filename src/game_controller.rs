//! # Game Controller Module - Driving a Game to the End
//!
//! The `GameController` owns the authoritative [`GameState`] of one table and is
//! the only thing that replaces it. Human moves come in as cell indices; AI seats
//! are asked for their move through their [`AiPlayer`].
//!
//! ## Responsibilities
//! - **Move Validation**: every move goes through [`GameState::apply_move`]
//! - **Move History**: numbered entries with timestamps and coordinates
//! - **Training Data**: searched positions go to an optional [`TrainingCollector`],
//!   labelled and drained when the game ends
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │                GameController                │
//! │  GameState ◄── apply_move / concede / reset  │
//! │      │                                       │
//! │      ├──► AiPlayer (per seat) ──► cell index │
//! │      └──► TrainingCollector (optional)       │
//! └──────────────────────────────────────────────┘
//! ```

use crate::game::{GamePhase, GameState, MoveRejected, Outcome};
use crate::hex::HexCoord;
use crate::mcts::{CancellationToken, SearchError};
use crate::player::AiPlayer;
use crate::training::{TrainingCollector, TrainingSample};
use std::sync::Arc;
use std::time::SystemTime;

/// Result of attempting to apply a move
#[derive(Debug, Clone, PartialEq)]
pub enum MoveResult {
    /// Move was successfully applied
    Success {
        cell_index: usize,
        player: u8,
        /// Whether the game is now over
        game_over: bool,
        outcome: Option<Outcome>,
    },
    /// Move was rejected; the game is unchanged
    Invalid { reason: MoveRejected },
    /// Game is already over, no more moves allowed
    GameOver,
}

/// A single entry in the move history
#[derive(Debug, Clone)]
pub struct MoveHistoryEntry {
    pub timestamp: SystemTime,
    pub player: u8,
    pub cell_index: usize,
    pub coord: HexCoord,
    /// Move number (1-indexed)
    pub move_number: usize,
}

/// Owns one table: the game, the AI seats and the move history.
pub struct GameController {
    game: GameState,
    ai: [Option<AiPlayer>; 3],
    history: Vec<MoveHistoryEntry>,
    collector: Option<Arc<TrainingCollector>>,
    labelled: Vec<TrainingSample>,
}

impl GameController {
    pub fn new(game: GameState) -> Self {
        Self {
            game,
            ai: [None, None, None],
            history: Vec::new(),
            collector: None,
            labelled: Vec::new(),
        }
    }

    /// Lets `ai` play the seat of `color`.
    pub fn with_ai(mut self, color: u8, ai: AiPlayer) -> Self {
        if let Some(seat) = self.ai.get_mut(color.wrapping_sub(1) as usize) {
            *seat = Some(ai);
        }
        self
    }

    pub fn with_collector(mut self, collector: Arc<TrainingCollector>) -> Self {
        self.collector = Some(collector);
        self
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn current_player(&self) -> u8 {
        self.game.current_player()
    }

    pub fn is_game_over(&self) -> bool {
        self.game.phase() != GamePhase::InProgress
    }

    pub fn ai_for(&self, color: u8) -> Option<&AiPlayer> {
        self.ai.get(color.wrapping_sub(1) as usize)?.as_ref()
    }

    pub fn history(&self) -> &[MoveHistoryEntry] {
        &self.history
    }

    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    pub fn last_move(&self) -> Option<&MoveHistoryEntry> {
        self.history.last()
    }

    /// Attempt to make a move for `player`.
    pub fn try_make_move(&mut self, player: u8, cell_index: usize) -> MoveResult {
        if self.game.phase() == GamePhase::Finished {
            return MoveResult::GameOver;
        }

        match self.game.apply_move(player, cell_index) {
            Ok(next) => {
                self.game = next;
                self.history.push(MoveHistoryEntry {
                    timestamp: SystemTime::now(),
                    player,
                    cell_index,
                    coord: self.game.hexagons()[cell_index].coord,
                    move_number: self.history.len() + 1,
                });

                let game_over = self.game.is_finished();
                if game_over {
                    self.flush_training();
                }
                MoveResult::Success {
                    cell_index,
                    player,
                    game_over,
                    outcome: self.game.outcome(),
                }
            }
            Err(reason) => MoveResult::Invalid { reason },
        }
    }

    /// Lets the AI seated at the current player's color move. `Ok(None)` when that
    /// seat has no AI.
    pub fn play_ai_turn(&mut self, cancel: &CancellationToken) -> Result<Option<MoveResult>, SearchError> {
        if self.is_game_over() {
            return Ok(Some(MoveResult::GameOver));
        }
        let player = self.current_player();
        let Some(ai) = self.ai_for(player).cloned() else {
            return Ok(None);
        };

        let cell_index = match ai.search(&self.game, player, cancel) {
            Some(result) => {
                let result = result?;
                if let Some(collector) = &self.collector {
                    collector.record(TrainingSample::new(&self.game.board(), player, &result));
                }
                result.cell_index
            }
            None => ai.choose_move(&self.game, player, cancel)?,
        };
        Ok(Some(self.try_make_move(player, cell_index)))
    }

    /// `player` gives up.
    pub fn concede(&mut self, player: u8) -> Result<(), MoveRejected> {
        self.game = self.game.concede(player)?;
        if self.game.winner().is_some() {
            self.flush_training();
        }
        Ok(())
    }

    /// Starts a fresh board and clears the history.
    pub fn reset(&mut self) {
        self.game = self.game.reset();
        self.history.clear();
        if let Some(collector) = &self.collector {
            collector.clear();
        }
    }

    fn flush_training(&mut self) {
        if let Some(collector) = &self.collector {
            let samples = collector.flush(self.game.outcome());
            self.labelled.extend(samples);
        }
    }

    /// Labelled samples of finished games, handed over once.
    pub fn take_training_samples(&mut self) -> Vec<TrainingSample> {
        std::mem::take(&mut self.labelled)
    }

    fn player_name(&self, player: u8) -> String {
        match self.game.seat(player) {
            Some(seat) => format!("{} ({})", seat.name, player),
            None => format!("Player {}", player),
        }
    }

    /// Format move history as plain text
    pub fn format_history(&self) -> String {
        if self.history.is_empty() {
            return String::from("No moves made yet.");
        }

        let mut output = format!("=== Radius {} Game History ===\n\n", self.game.radius());
        for entry in &self.history {
            output.push_str(&format!(
                "{}. {} - cell {} (q={}, r={}, s={})\n",
                entry.move_number,
                self.player_name(entry.player),
                entry.cell_index,
                entry.coord.q,
                entry.coord.r,
                entry.coord.s()
            ));
        }

        match (self.game.phase(), self.game.outcome()) {
            (_, Some(Outcome::Winner(winner))) => {
                output.push_str(&format!("\nResult: {} wins!\n", self.player_name(winner)));
            }
            (_, Some(Outcome::Draw)) => output.push_str("\nResult: Draw\n"),
            (GamePhase::InProgress, None) => {
                output.push_str(&format!(
                    "\n(Game in progress - {} to move)\n",
                    self.player_name(self.current_player())
                ));
            }
            (phase, None) => output.push_str(&format!("\n({:?})\n", phase)),
        }

        output
    }
}
