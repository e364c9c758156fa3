//! Training-data collection.
//!
//! A [`TrainingCollector`] is handed to whoever drives a game (the
//! [`GameController`](crate::game_controller::GameController) in this crate). It
//! keeps immutable snapshots of searched positions until the game ends, then labels
//! them with the outcome. Serialization is left to the consumer.

use crate::board::Board;
use crate::game::Outcome;
use crate::hex::PLAYER_COUNT;
use crate::mcts::SearchResult;
use parking_lot::Mutex;
use tracing::debug;

/// One searched position.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSample {
    /// Player who was to move.
    pub player: u8,

    /// Occupancy planes of players 1..=3 over the real-frame grid.
    pub planes: [Vec<u8>; 3],

    /// Normalized root visit counts keyed by real cell index.
    pub visit_distribution: Vec<(usize, f32)>,

    /// Final result for `player`: +1 win, -1 loss, 0 draw. Set on flush.
    pub value: Option<f32>,
}

impl TrainingSample {
    pub fn new(board: &Board, player: u8, result: &SearchResult) -> Self {
        Self {
            player,
            planes: [board.occupancy(1), board.occupancy(2), board.occupancy(3)],
            visit_distribution: result.visit_distribution(),
            value: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct TrainingCollector {
    pending: Mutex<Vec<TrainingSample>>,
}

impl TrainingCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, sample: TrainingSample) {
        debug_assert!((1..=PLAYER_COUNT).contains(&sample.player));
        self.pending.lock().push(sample);
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Labels every pending sample with `outcome` and hands them over.
    /// `None` (the game ended with no winner and no draw) labels everything 0.
    pub fn flush(&self, outcome: Option<Outcome>) -> Vec<TrainingSample> {
        let mut samples = std::mem::take(&mut *self.pending.lock());
        for sample in &mut samples {
            sample.value = Some(match outcome {
                Some(Outcome::Winner(w)) if w == sample.player => 1.0,
                Some(Outcome::Winner(_)) => -1.0,
                Some(Outcome::Draw) | None => 0.0,
            });
        }
        debug!(samples = samples.len(), ?outcome, "flushed training samples");
        samples
    }

    /// Drops every pending sample.
    pub fn clear(&self) {
        self.pending.lock().clear();
    }
}
