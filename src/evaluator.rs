//! Evaluator trait for position evaluation.
//!
//! An evaluator supplies a value estimate and a move prior for a board. The search
//! treats it as a black box; model formats and runtimes live with the implementor.
//! [`UniformEvaluator`] is provided for testing the guided search without a model.

use crate::board::Board;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Model error: {0}")]
    ModelError(String),
}

/// Result of evaluating a board.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Value estimate in `[-1, 1]` for the player whose canonical frame the board is in
    /// (`board.rotation() + 1`).
    pub value: f32,

    /// Prior over moves keyed by real cell index. Missing cells count as 0.
    pub move_policy: HashMap<usize, f32>,
}

impl Evaluation {
    /// Prior assigned to a cell.
    pub fn prior(&self, cell_index: usize) -> f32 {
        self.move_policy.get(&cell_index).copied().unwrap_or(0.0)
    }

    /// Rejects NaN or infinite values and priors.
    pub fn validated(self) -> Result<Self, EvaluatorError> {
        if !self.value.is_finite() {
            return Err(EvaluatorError::EvaluationFailed(format!("non-finite value {}", self.value)));
        }
        if let Some((index, prior)) = self.move_policy.iter().find(|(_, p)| !p.is_finite()) {
            return Err(EvaluatorError::EvaluationFailed(format!(
                "non-finite prior {} for cell {}",
                prior, index
            )));
        }
        Ok(self)
    }
}

/// Trait for position evaluators.
///
/// Implementations must be shareable across the search's worker threads.
pub trait Evaluator: Send + Sync {
    /// Evaluate a single board.
    fn evaluate(&self, board: &Board) -> Result<Evaluation, EvaluatorError>;
}

/// Uniform evaluator that assigns equal probability to every empty cell.
/// Value is always 0.0 (neutral).
#[derive(Debug, Clone, Default)]
pub struct UniformEvaluator;

impl UniformEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(&self, board: &Board) -> Result<Evaluation, EvaluatorError> {
        let empty = board.empty_cells();
        if empty.is_empty() {
            return Ok(Evaluation::default());
        }

        let prob = 1.0 / empty.len() as f32;
        let move_policy = empty
            .into_iter()
            .filter_map(|pos| board.index_at(pos))
            .map(|index| (index, prob))
            .collect();

        Ok(Evaluation { value: 0.0, move_policy })
    }
}
