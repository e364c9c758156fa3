//! # Symmetry Mapper
//!
//! The board has 3-fold rotational symmetry. Rotating by `player - 1` steps of 120°
//! brings that player's edge pair onto the canonical q-sides, so a single set of
//! connectivity rules serves every seat.
//!
//! Rotation moves owners *and* the index grid together: after any number of steps
//! the index grid still names the real cell behind every slot, which is how a move
//! chosen in the canonical frame is translated back to the real board.

use crate::board::{Board, NO_INDEX, UNPLAYABLE};
use crate::hex::PLAYER_COUNT;

/// Rotates `board` by `step` 120° steps. `step` must be 0, 1 or 2.
///
/// # Panics
/// On any other step; a malformed step means the caller's frame bookkeeping is broken.
pub fn rotate(board: &Board, step: u8) -> Board {
    assert!(step < PLAYER_COUNT, "malformed rotation step {step}");
    if step == 0 {
        return board.clone();
    }

    let size = board.size();
    let mut owners = vec![UNPLAYABLE; size * size];
    let mut indices = vec![NO_INDEX; size * size];

    for row in 0..size {
        for col in 0..size {
            let pos = crate::board::CellPos::new(row, col);
            let index = board.index_at(pos);
            if index.is_none() && board.get(pos) == UNPLAYABLE {
                continue;
            }

            let mut coord = board.coord_at(pos);
            for _ in 0..step {
                coord = coord.rotated();
            }
            let target = board
                .pos_of(coord)
                .unwrap_or_else(|| panic!("rotation moved {pos} off the grid"));
            let slot = target.row * size + target.col;
            owners[slot] = board.get(pos);
            indices[slot] = index.map_or(NO_INDEX, |i| i as u32);
        }
    }

    Board::from_parts(board.radius(), (board.rotation() + step) % PLAYER_COUNT, owners, indices)
}

/// Rotation step that brings `player`'s edges onto the canonical sides.
#[inline]
pub fn canonical_step(player: u8) -> u8 {
    assert!(
        (1..=PLAYER_COUNT).contains(&player),
        "player id must be 1..=3, got {player}"
    );
    player - 1
}

/// Rotates a real-frame board into `player`'s canonical frame.
pub fn canonicalize(board: &Board, player: u8) -> Board {
    assert_eq!(board.rotation(), 0, "canonicalize expects a real-frame board");
    rotate(board, canonical_step(player))
}

/// Rotates any board back into the real frame.
pub fn to_real_frame(board: &Board) -> Board {
    rotate(board, (PLAYER_COUNT - board.rotation()) % PLAYER_COUNT)
}
