//! Whole-game scenarios on a radius-2 board: a scripted win, a scripted draw and
//! a table emptied by concessions.

use hexsquared::connectivity::{has_winning_path, path_exists};
use hexsquared::game::{GamePhase, GameState, MoveRejected, Outcome};
use hexsquared::hex::HexCoord;
use hexsquared::symmetry::canonicalize;

fn cell(game: &GameState, q: i32, r: i32) -> usize {
    game.cell_index_at(HexCoord::new(q, r))
        .unwrap_or_else(|| panic!("no cell at ({q}, {r})"))
}

/// Plays `moves` in turn order and returns every intermediate state.
fn play(mut game: GameState, moves: &[(i32, i32)]) -> Vec<GameState> {
    let mut states = vec![game.clone()];
    for &(q, r) in moves {
        let player = game.current_player();
        game = game
            .apply_move(player, cell(&game, q, r))
            .unwrap_or_else(|e| panic!("player {player} at ({q}, {r}): {e}"));
        states.push(game.clone());
    }
    states
}

#[test]
fn test_player_one_closes_the_chain() {
    let game = GameState::with_ai_players(2);
    assert_eq!(game.playable_cells().len(), 19);

    // player 1 walks r = 0 from left to right, the others stay off that row
    let moves = [
        (-2, 0), (-1, -1), (-2, 1),
        (-1, 0), (0, -1), (-1, 1),
        (0, 0), (1, -1), (0, 1),
        (1, 0), (2, -1), (1, 1),
        (2, 0),
    ];
    let states = play(game, &moves);
    let (last, before) = states.split_last().unwrap();

    for state in before {
        assert_eq!(state.phase(), GamePhase::InProgress);
        assert_eq!(state.outcome(), None);
    }
    assert_eq!(last.phase(), GamePhase::Finished);
    assert_eq!(last.outcome(), Some(Outcome::Winner(1)));
    assert!(has_winning_path(&last.board(), 1));

    // nothing is accepted after the closing move
    let free = last.playable_cells()[0];
    for player in 1..=3 {
        assert_eq!(
            last.apply_move(player, free),
            Err(MoveRejected::NotInProgress(GamePhase::Finished))
        );
    }
}

#[test]
fn test_full_board_without_chain_is_a_draw() {
    let moves = [
        (2, -1), (-2, 0), (2, 0), (1, 0), (0, 0), (1, 1), (-1, 0), (1, -1), (0, 2), (1, -2),
        (-1, 1), (-1, -1), (0, -1), (-2, 2), (-2, 1), (-1, 2), (0, 1), (0, -2), (2, -2),
    ];
    let states = play(GameState::with_ai_players(2), &moves);

    // one move before the end, player 2 could still connect through (2, -2)
    let almost = &states[states.len() - 2];
    assert_eq!(almost.phase(), GamePhase::InProgress);
    assert!(path_exists(&canonicalize(&almost.board(), 2), 2, true));

    let last = states.last().unwrap();
    assert!(last.board().is_full());
    assert_eq!(last.phase(), GamePhase::Finished);
    assert_eq!(last.outcome(), Some(Outcome::Draw));
    for player in 1..=3 {
        assert!(!has_winning_path(&canonicalize(&last.board(), player), player));
    }
}

#[test]
fn test_two_concessions_leave_a_halted_table() {
    let game = play(GameState::with_ai_players(2), &[(0, 0), (1, 0)]).pop().unwrap();
    assert_eq!(game.current_player(), 3);

    let game = game.concede(1).unwrap();
    assert_eq!(game.phase(), GamePhase::InProgress);
    assert_eq!(game.current_player(), 3);

    let game = game.concede(3).unwrap();
    assert_eq!(game.winner(), Some(2));
    assert_eq!(game.phase(), GamePhase::Halted);
    assert_eq!(game.playable_cells().len(), 19, "board is reset");
    assert_eq!(game.seat(2).map(|s| s.wins), Some(1));

    let center = cell(&game, 0, 0);
    assert_eq!(
        game.apply_move(1, center),
        Err(MoveRejected::NotInProgress(GamePhase::Halted))
    );
}

#[test]
fn test_operations_never_mutate_their_input() {
    let game = GameState::with_ai_players(2);
    let snapshot = game.clone();

    let _ = game.apply_move(1, cell(&game, 0, 0));
    let _ = game.concede(2);
    let _ = game.reset();
    assert_eq!(game, snapshot);
}
