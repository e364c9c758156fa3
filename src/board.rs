//! # Board Projection
//!
//! A `Board` is the dense 2D projection of the hex lattice that the connectivity
//! rules, the rollout policies and the search tree all operate on.
//!
//! ## Layout
//! The grid is `(2·radius + 3)²` slots. The slot of axial `(q, r)` is
//! `row = r + radius + 1`, `col = q + radius + 1`, so the border ring fits exactly.
//! Two projections travel together:
//! - the **owner grid**: `EMPTY`, a player id, or [`UNPLAYABLE`]
//! - the **index grid**: for every slot, the stable index of the real cell that sits
//!   there in this frame (or [`NO_INDEX`])
//!
//! The index grid never changes after a board is projected or rotated, so it is
//! shared between clones.
//!
//! ## Frames
//! Every board remembers the rotation it was produced with. In frame `k`, the edges
//! of player `p` lie on axis `(p - 1 - k) mod 3`; that axis is the player's *slot*.

use crate::hex::{HexCell, HexCoord, DIRECTIONS, EMPTY, PLAYER_COUNT};
use std::fmt;
use std::sync::Arc;

/// Owner value of slots that can never be played: off-lattice slots and the
/// unowned corners of the border ring.
pub const UNPLAYABLE: u8 = u8::MAX;

/// Index-grid value of slots with no real cell behind them.
pub const NO_INDEX: u32 = u32::MAX;

/// A slot of the 2D projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    radius: i32,
    rotation: u8,
    owners: Vec<u8>,
    indices: Arc<[u32]>,
}

impl Board {
    /// Projects the cells of a game with playable `radius` in the real (unrotated) frame.
    pub fn from_cells(radius: i32, cells: &[HexCell]) -> Self {
        let size = Self::size_for(radius);
        let mut owners = vec![UNPLAYABLE; size * size];
        let mut indices = vec![NO_INDEX; size * size];

        for cell in cells {
            let row = cell.r() + radius + 1;
            let col = cell.q() + radius + 1;
            assert!(
                row >= 0 && col >= 0 && (row as usize) < size && (col as usize) < size,
                "hex out of bounds: q={}, r={} for radius {}",
                cell.q(),
                cell.r(),
                radius
            );
            let slot = row as usize * size + col as usize;

            owners[slot] = if cell.owner == EMPTY && !cell.is_playable(radius) {
                UNPLAYABLE
            } else {
                cell.owner
            };
            indices[slot] = cell.index as u32;
        }

        Self {
            radius,
            rotation: 0,
            owners,
            indices: indices.into(),
        }
    }

    pub(crate) fn from_parts(radius: i32, rotation: u8, owners: Vec<u8>, indices: Vec<u32>) -> Self {
        Self {
            radius,
            rotation,
            owners,
            indices: indices.into(),
        }
    }

    /// Side length of the grid for a playable radius.
    #[inline]
    pub fn size_for(radius: i32) -> usize {
        (2 * radius + 3) as usize
    }

    #[inline]
    pub fn size(&self) -> usize {
        Self::size_for(self.radius)
    }

    #[inline]
    pub fn radius(&self) -> i32 {
        self.radius
    }

    /// Rotation step (0..=2) this board was produced with.
    #[inline]
    pub fn rotation(&self) -> u8 {
        self.rotation
    }

    /// The edge axis of `player` in this board's frame.
    #[inline]
    pub fn slot_of(&self, player: u8) -> usize {
        debug_assert!((1..=PLAYER_COUNT).contains(&player));
        (player as usize + 2 * PLAYER_COUNT as usize - 1 - self.rotation as usize) % 3
    }

    #[inline]
    fn slot(&self, pos: CellPos) -> usize {
        pos.row * self.size() + pos.col
    }

    #[inline]
    pub fn get(&self, pos: CellPos) -> u8 {
        self.owners[self.slot(pos)]
    }

    /// Sets the owner of a slot. Only empty, playable slots may be claimed.
    pub fn set(&mut self, pos: CellPos, player: u8) {
        let slot = self.slot(pos);
        debug_assert_eq!(self.owners[slot], EMPTY, "slot {pos} is not empty");
        self.owners[slot] = player;
    }

    #[inline]
    pub fn is_empty_cell(&self, pos: CellPos) -> bool {
        self.get(pos) == EMPTY
    }

    /// Raw owner grid in row-major order.
    pub fn owners(&self) -> &[u8] {
        &self.owners
    }

    /// Real cell index occupying `pos` in this frame.
    pub fn index_at(&self, pos: CellPos) -> Option<usize> {
        match self.indices[self.slot(pos)] {
            NO_INDEX => None,
            index => Some(index as usize),
        }
    }

    /// Slot holding the real cell `index` in this frame.
    pub fn position_of_index(&self, index: usize) -> Option<CellPos> {
        let size = self.size();
        self.indices
            .iter()
            .position(|&i| i != NO_INDEX && i as usize == index)
            .map(|slot| CellPos::new(slot / size, slot % size))
    }

    /// Axial coordinates of a slot in this board's frame.
    #[inline]
    pub fn coord_at(&self, pos: CellPos) -> HexCoord {
        let offset = self.radius + 1;
        HexCoord::new(pos.col as i32 - offset, pos.row as i32 - offset)
    }

    /// Slot of an axial coordinate in this board's frame, if it is on the grid.
    pub fn pos_of(&self, coord: HexCoord) -> Option<CellPos> {
        let offset = self.radius + 1;
        let row = coord.r + offset;
        let col = coord.q + offset;
        let size = self.size() as i32;
        if row < 0 || col < 0 || row >= size || col >= size {
            return None;
        }
        Some(CellPos::new(row as usize, col as usize))
    }

    /// On-grid hex neighbours of a slot.
    pub fn neighbors(&self, pos: CellPos) -> impl Iterator<Item = CellPos> + '_ {
        let size = self.size() as i32;
        DIRECTIONS.iter().filter_map(move |&(dq, dr)| {
            let row = pos.row as i32 + dr;
            let col = pos.col as i32 + dq;
            (row >= 0 && col >= 0 && row < size && col < size).then(|| CellPos::new(row as usize, col as usize))
        })
    }

    /// Every empty slot in row-major order.
    pub fn empty_cells(&self) -> Vec<CellPos> {
        let size = self.size();
        self.owners
            .iter()
            .enumerate()
            .filter(|(_, &owner)| owner == EMPTY)
            .map(|(slot, _)| CellPos::new(slot / size, slot % size))
            .collect()
    }

    pub fn empty_count(&self) -> usize {
        self.owners.iter().filter(|&&o| o == EMPTY).count()
    }

    pub fn is_full(&self) -> bool {
        !self.owners.contains(&EMPTY)
    }

    /// One-hot occupancy plane of `player` over the grid.
    pub fn occupancy(&self, player: u8) -> Vec<u8> {
        self.owners.iter().map(|&o| u8::from(o == player)).collect()
    }
}

impl fmt::Display for Board {
    /// Prints the owner grid, `-1` for unplayable slots.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let size = self.size();
        for row in 0..size {
            for col in 0..size {
                match self.get(CellPos::new(row, col)) {
                    UNPLAYABLE => write!(f, "{:>3}", -1)?,
                    owner => write!(f, "{:>3}", owner)?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::generate_hexagons;

    fn board(radius: i32) -> Board {
        Board::from_cells(radius, &generate_hexagons(radius))
    }

    #[test]
    fn test_projection_dimensions() {
        let b = board(2);
        assert_eq!(b.size(), 7);
        assert_eq!(b.owners().len(), 49);
        assert_eq!(b.empty_count(), 19);
        assert!(!b.is_full());
    }

    #[test]
    fn test_corners_are_unplayable() {
        let b = board(2);
        let corner = b.pos_of(HexCoord::new(-3, 0)).unwrap();
        assert_eq!(b.get(corner), UNPLAYABLE);
        // the corner still keeps its identity in the index grid
        assert!(b.index_at(corner).is_some());

        let edge = b.pos_of(HexCoord::new(-3, 1)).unwrap();
        assert_eq!(b.get(edge), 1);
    }

    #[test]
    fn test_off_lattice_slots() {
        let b = board(2);
        let pos = CellPos::new(0, 0);
        assert_eq!(b.get(pos), UNPLAYABLE);
        assert_eq!(b.index_at(pos), None);
    }

    #[test]
    fn test_index_lookup_roundtrip() {
        let cells = generate_hexagons(3);
        let b = Board::from_cells(3, &cells);
        for cell in &cells {
            let pos = b.position_of_index(cell.index).unwrap();
            assert_eq!(b.index_at(pos), Some(cell.index));
            assert_eq!(b.coord_at(pos), cell.coord);
        }
    }

    #[test]
    fn test_neighbors_stay_on_grid() {
        let b = board(2);
        assert_eq!(b.neighbors(CellPos::new(0, 0)).count(), 2);
        assert_eq!(b.neighbors(CellPos::new(3, 3)).count(), 6);
    }

    #[test]
    fn test_slot_of_in_real_frame() {
        let b = board(2);
        assert_eq!(b.slot_of(1), 0);
        assert_eq!(b.slot_of(2), 1);
        assert_eq!(b.slot_of(3), 2);
    }

    #[test]
    fn test_display_marks_unplayable() {
        let text = board(1).to_string();
        assert_eq!(text.lines().count(), 5);
        assert!(text.starts_with(" -1"));
    }
}
