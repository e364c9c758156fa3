//! # Hex Coordinates and Cells
//!
//! Cube/axial coordinates for the hexagonal board together with the immutable
//! `HexCell` record the game state is built from.
//!
//! ## Coordinate System
//! Every cell is addressed by `(q, r, s)` with `q + r + s = 0`. The playable area
//! of a game with radius `R` is every cell with `max(|q|, |r|, |s|) <= R`. Around it
//! sits a border ring at distance `R + 1` whose non-corner cells are pre-owned by
//! the player whose edge they form:
//! - `|q| == R + 1` → player 1
//! - `|r| == R + 1` → player 2
//! - `|s| == R + 1` → player 3
//!
//! Corner cells of the ring touch two edges and belong to nobody.

/// Owner value of an empty cell.
pub const EMPTY: u8 = 0;

/// Number of seats at the table.
pub const PLAYER_COUNT: u8 = 3;

/// Axial offsets `(dq, dr)` of the six neighbours.
pub const DIRECTIONS: [(i32, i32); 6] = [
    (1, 0),  // E
    (-1, 0), // W
    (0, 1),  // SE
    (0, -1), // NW
    (1, -1), // NE
    (-1, 1), // SW
];

/// Returns the player that moves after `player`, ignoring concessions.
#[inline]
pub fn next_player(player: u8) -> u8 {
    (player % PLAYER_COUNT) + 1
}

/// Cube coordinates of a single hexagon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The third cube coordinate, always `-q - r`.
    #[inline]
    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Get all 6 neighboring hex coordinates
    pub fn neighbors(&self) -> [HexCoord; 6] {
        DIRECTIONS.map(|(dq, dr)| HexCoord::new(self.q + dq, self.r + dr))
    }

    /// Hex distance to the board center.
    #[inline]
    pub fn distance_to_center(&self) -> i32 {
        self.q.abs().max(self.r.abs()).max(self.s().abs())
    }

    /// Hex distance between two cells.
    pub fn distance(&self, other: &HexCoord) -> i32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        dq.max(dr).max(ds)
    }

    /// Coordinate along one of the three axes: 0 = q, 1 = r, 2 = s.
    #[inline]
    pub fn axis(&self, axis: usize) -> i32 {
        match axis {
            0 => self.q,
            1 => self.r,
            2 => self.s(),
            _ => panic!("hex axis must be 0, 1 or 2, got {axis}"),
        }
    }

    /// One 120° rotation step: `(q, r, s) -> (r, s, q)`.
    ///
    /// The r-axis lands on the q-axis, so player 2's edges become the canonical
    /// q-edges after one step and player 3's after two.
    #[inline]
    pub fn rotated(&self) -> HexCoord {
        HexCoord::new(self.r, self.s())
    }

    /// Builds a coordinate whose component on `axis` is `a`, followed cyclically by `b`
    /// and `c`. Used to express edge geometry once for all three axes.
    pub fn from_axis(axis: usize, a: i32, b: i32, c: i32) -> HexCoord {
        debug_assert_eq!(a + b + c, 0);
        let mut cube = [0; 3];
        cube[axis % 3] = a;
        cube[(axis + 1) % 3] = b;
        cube[(axis + 2) % 3] = c;
        HexCoord::new(cube[0], cube[1])
    }
}

/// A single board cell. Immutable: ownership changes produce a new cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HexCell {
    pub coord: HexCoord,
    /// Stable identity, equal to the cell's position in generation order.
    pub index: usize,
    pub owner: u8,
}

impl HexCell {
    pub fn new(coord: HexCoord, index: usize, owner: u8) -> Self {
        Self { coord, index, owner }
    }

    pub fn q(&self) -> i32 {
        self.coord.q
    }

    pub fn r(&self) -> i32 {
        self.coord.r
    }

    pub fn s(&self) -> i32 {
        self.coord.s()
    }

    pub fn is_taken(&self) -> bool {
        self.owner != EMPTY
    }

    /// Returns a copy of this cell owned by `player`.
    pub fn with_owner(&self, player: u8) -> HexCell {
        HexCell { owner: player, ..*self }
    }

    /// Whether the cell lies inside the playable hexagon of `radius`.
    pub fn is_playable(&self, radius: i32) -> bool {
        self.coord.distance_to_center() <= radius
    }
}

/// Generates every cell of a game with the given playable radius, border ring
/// included, in stable index order (rows of `r`, then `q`).
pub fn generate_hexagons(radius: i32) -> Vec<HexCell> {
    assert!(radius >= 1, "board radius must be at least 1, got {radius}");
    let outer = radius + 1;
    let mut cells = Vec::with_capacity((3 * outer * (outer + 1) + 1) as usize);

    for r in -outer..=outer {
        let q_min = (-outer).max(-r - outer);
        let q_max = outer.min(-r + outer);
        for q in q_min..=q_max {
            let coord = HexCoord::new(q, r);
            let on_q = q.abs() == outer;
            let on_r = r.abs() == outer;
            let on_s = coord.s().abs() == outer;
            let corner = (on_q && on_r) || (on_r && on_s) || (on_s && on_q);

            let owner = if corner {
                EMPTY
            } else if on_q {
                1
            } else if on_r {
                2
            } else if on_s {
                3
            } else {
                EMPTY
            };

            cells.push(HexCell::new(coord, cells.len(), owner));
        }
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_counts() {
        let cells = generate_hexagons(2);
        // radius 3 lattice including the border ring
        assert_eq!(cells.len(), 37);
        assert_eq!(cells.iter().filter(|c| c.is_playable(2)).count(), 19);
    }

    #[test]
    fn test_indices_follow_generation_order() {
        let cells = generate_hexagons(3);
        for (i, cell) in cells.iter().enumerate() {
            assert_eq!(cell.index, i);
            assert_eq!(cell.q() + cell.r() + cell.s(), 0);
        }
    }

    #[test]
    fn test_edge_seeding_skips_corners() {
        let radius = 2;
        let cells = generate_hexagons(radius);
        for cell in &cells {
            if cell.is_playable(radius) {
                assert_eq!(cell.owner, EMPTY);
                continue;
            }
            let edges = [cell.q(), cell.r(), cell.s()]
                .iter()
                .filter(|v| v.abs() == radius + 1)
                .count();
            if edges == 2 {
                assert_eq!(cell.owner, EMPTY, "corner {:?} must not be seeded", cell.coord);
            } else {
                assert!(cell.owner >= 1 && cell.owner <= 3);
            }
        }
        // each player owns two sides of `radius` cells
        for player in 1..=3 {
            assert_eq!(cells.iter().filter(|c| c.owner == player).count(), 2 * radius as usize);
        }
    }

    #[test]
    fn test_rotation_cycles_axes() {
        let c = HexCoord::new(2, -3);
        let once = c.rotated();
        assert_eq!(once.q, c.r);
        assert_eq!(once.r, c.s());
        assert_eq!(once.rotated().rotated(), c);
    }

    #[test]
    fn test_distance() {
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(2, -1);
        assert_eq!(a.distance(&b), 2);
        assert_eq!(b.distance_to_center(), 2);
        assert_eq!(HexCoord::from_axis(1, -3, 2, 1), HexCoord::new(1, -3));
    }

    #[test]
    fn test_next_player_wraps() {
        assert_eq!(next_player(1), 2);
        assert_eq!(next_player(2), 3);
        assert_eq!(next_player(3), 1);
    }
}
