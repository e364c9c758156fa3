//! Search-level properties: rotation laws on real game boards, visit
//! conservation, reproducibility and error signalling.

use hexsquared::board::Board;
use hexsquared::evaluator::{Evaluation, Evaluator, EvaluatorError};
use hexsquared::game::GameState;
use hexsquared::hex::{generate_hexagons, HexCoord};
use hexsquared::mcts::{CancellationToken, MctsConfig, MctsEngine, SearchError};
use hexsquared::rollout::RolloutPolicy;
use hexsquared::symmetry::{rotate, to_real_frame};
use std::collections::HashMap;
use std::sync::Arc;

fn midgame() -> GameState {
    let mut game = GameState::with_ai_players(3);
    for &(q, r) in &[(0, 0), (1, -1), (-1, 1), (2, 0), (-2, 3), (0, -3)] {
        let index = game.cell_index_at(HexCoord::new(q, r)).unwrap();
        game = game.apply_move(game.current_player(), index).unwrap();
    }
    game
}

#[test]
fn test_rotation_laws_on_game_board() {
    let board = midgame().board();
    assert_eq!(rotate(&board, 0), board);
    assert_eq!(rotate(&rotate(&rotate(&board, 1), 1), 1), board);

    for step in 0..3 {
        let rotated = rotate(&board, step);
        assert_eq!(to_real_frame(&rotated), board);
        for cell in midgame().hexagons() {
            let pos = rotated.position_of_index(cell.index).unwrap();
            assert_eq!(rotated.index_at(pos), Some(cell.index));
        }
    }
}

#[test]
fn test_visit_conservation_across_thread_counts() {
    let game = midgame();
    let children = game.playable_cells().len() as u32;

    for threads in [1, 2, 8] {
        let config = MctsConfig::for_testing().with_iterations(150).with_threads(threads);
        let result = MctsEngine::new(config)
            .unwrap()
            .search(&game, game.current_player(), &CancellationToken::new())
            .unwrap();

        assert_eq!(result.children.len() as u32, children);
        assert_eq!(result.root_visits, 150 + children);
        assert_eq!(result.children.iter().map(|c| c.visits).sum::<u32>(), 150 + children);
    }
}

#[test]
fn test_same_seed_same_move() {
    let game = midgame();
    let player = game.current_player();
    let run = |policy| {
        let config = MctsConfig::for_testing()
            .with_iterations(250)
            .with_rollout(policy)
            .with_seed(2024);
        MctsEngine::new(config)
            .unwrap()
            .search(&game, player, &CancellationToken::new())
            .unwrap()
    };

    for policy in [RolloutPolicy::Random, RolloutPolicy::CenterBias] {
        let (a, b) = (run(policy), run(policy));
        assert_eq!(a.cell_index, b.cell_index);
        assert_eq!(a.children, b.children);
    }
}

#[test]
fn test_chosen_cell_is_legal_in_real_frame() {
    let game = midgame();
    let player = game.current_player();
    let result = MctsEngine::new(MctsConfig::for_testing().with_iterations(100))
        .unwrap()
        .search(&game, player, &CancellationToken::new())
        .unwrap();

    assert!(game.playable_cells().contains(&result.cell_index));
    assert!(game.apply_move(player, result.cell_index).is_ok());
}

#[test]
fn test_no_legal_moves_is_recoverable() {
    let cells: Vec<_> = generate_hexagons(2)
        .into_iter()
        .map(|c| if c.is_playable(2) { c.with_owner(3) } else { c })
        .collect();
    let board = Board::from_cells(2, &cells);
    let engine = MctsEngine::new(MctsConfig::for_testing()).unwrap();
    let result = engine.search_board(&board, 1, &CancellationToken::new());
    assert!(matches!(result, Err(SearchError::NoLegalMoves)));
}

/// Prefers one cell and rates every position as won.
struct FavouriteCell(usize);

impl Evaluator for FavouriteCell {
    fn evaluate(&self, board: &Board) -> Result<Evaluation, EvaluatorError> {
        let mut move_policy = HashMap::new();
        move_policy.insert(self.0, 1.0);
        let value = if board.empty_count() > 0 { 1.0 } else { 0.0 };
        Ok(Evaluation { value, move_policy })
    }
}

#[test]
fn test_prior_steers_guided_search() {
    let game = GameState::with_ai_players(3);
    let favourite = game.cell_index_at(HexCoord::new(2, -3)).unwrap();
    let config = MctsConfig::for_testing()
        .with_iterations(200)
        .with_policy_weight(0.9)
        .with_evaluator_value(true);
    let engine = MctsEngine::new(config)
        .unwrap()
        .with_evaluator(Arc::new(FavouriteCell(favourite)));

    let result = engine.search(&game, 1, &CancellationToken::new()).unwrap();
    assert_eq!(result.cell_index, favourite);
}
