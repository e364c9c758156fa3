//! # Rollout Policies
//!
//! Move choosers used to play simulations to the end of the game inside the search,
//! and on their own as the light-weight AI levels. Each policy only looks at the
//! board and the player about to move; ties are broken by the lowest real cell
//! index so the deterministic policies give the same answer in every frame.

use crate::board::{Board, CellPos};
use crate::connectivity::{edges_for, shortest_guided_path};
use crate::hex::next_player;
use rand::seq::{IndexedRandom, SliceRandom};
use rand::Rng;
use std::cmp::Reverse;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RolloutPolicy {
    /// Uniform choice among empty cells.
    #[default]
    Random,
    /// Closest cell to the board center.
    CenterBias,
    /// Farthest cell from the board center.
    EdgeBias,
    /// Middle of the best guided path between the player's edges.
    PathBiased,
}

fn tie_break(board: &Board, pos: CellPos) -> usize {
    board.index_at(pos).unwrap_or(usize::MAX)
}

impl RolloutPolicy {
    pub fn all() -> &'static [RolloutPolicy] {
        &[
            RolloutPolicy::Random,
            RolloutPolicy::CenterBias,
            RolloutPolicy::EdgeBias,
            RolloutPolicy::PathBiased,
        ]
    }

    /// Picks an empty cell for `player`, or `None` on a full board.
    pub fn choose_move<R: Rng + ?Sized>(&self, board: &Board, player: u8, rng: &mut R) -> Option<CellPos> {
        let empty = board.empty_cells();
        if empty.is_empty() {
            return None;
        }

        match self {
            RolloutPolicy::Random => empty.choose(rng).copied(),
            RolloutPolicy::CenterBias => empty
                .into_iter()
                .min_by_key(|&pos| (board.coord_at(pos).distance_to_center(), tie_break(board, pos))),
            RolloutPolicy::EdgeBias => empty
                .into_iter()
                .min_by_key(|&pos| (Reverse(board.coord_at(pos).distance_to_center()), tie_break(board, pos))),
            RolloutPolicy::PathBiased => Some(path_biased(board, player, empty)),
        }
    }

    /// Fills every empty cell, alternating players starting with `first`.
    pub fn play_out<R: Rng + ?Sized>(&self, board: &mut Board, first: u8, rng: &mut R) {
        let mut player = first;

        if *self == RolloutPolicy::Random {
            // uniform picks one by one are equivalent to a single shuffle
            let mut empty = board.empty_cells();
            empty.shuffle(rng);
            for pos in empty {
                board.set(pos, player);
                player = next_player(player);
            }
            return;
        }

        while let Some(pos) = self.choose_move(board, player, rng) {
            board.set(pos, player);
            player = next_player(player);
        }
    }
}

fn path_biased(board: &Board, player: u8, empty: Vec<CellPos>) -> CellPos {
    let edges = edges_for(board, player);

    if let Some(path) = shortest_guided_path(board, &edges.start, &edges.target, player) {
        let middle = path.len() / 2;
        let pick = path
            .iter()
            .enumerate()
            .filter(|(_, &pos)| board.is_empty_cell(pos))
            .min_by_key(|(i, _)| (i.abs_diff(middle), *i))
            .map(|(_, &pos)| pos);
        if let Some(pos) = pick {
            return pos;
        }
    }

    // no usable path: stay close to the starting edge
    let slot = board.slot_of(player);
    let radius = board.radius();
    empty
        .into_iter()
        .min_by_key(|&pos| {
            let coord = board.coord_at(pos);
            (coord.axis(slot) + radius, coord.distance_to_center(), tie_break(board, pos))
        })
        .unwrap_or_else(|| unreachable!("caller checked for empty cells"))
}

impl fmt::Display for RolloutPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RolloutPolicy::Random => "random",
            RolloutPolicy::CenterBias => "center",
            RolloutPolicy::EdgeBias => "edge",
            RolloutPolicy::PathBiased => "path",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for RolloutPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "random" => Ok(RolloutPolicy::Random),
            "center" | "center-bias" => Ok(RolloutPolicy::CenterBias),
            "edge" | "edge-bias" => Ok(RolloutPolicy::EdgeBias),
            "path" | "path-biased" => Ok(RolloutPolicy::PathBiased),
            other => Err(format!("unknown rollout policy '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hex::{generate_hexagons, HexCoord, EMPTY};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn empty_board(radius: i32) -> Board {
        Board::from_cells(radius, &generate_hexagons(radius))
    }

    fn rng() -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(7)
    }

    #[test]
    fn test_random_picks_empty_cell() {
        let board = empty_board(2);
        let mut rng = rng();
        for _ in 0..20 {
            let pos = RolloutPolicy::Random.choose_move(&board, 1, &mut rng).unwrap();
            assert_eq!(board.get(pos), EMPTY);
        }
    }

    #[test]
    fn test_center_bias_takes_center() {
        let board = empty_board(3);
        let pos = RolloutPolicy::CenterBias.choose_move(&board, 2, &mut rng()).unwrap();
        assert_eq!(board.coord_at(pos), HexCoord::new(0, 0));
    }

    #[test]
    fn test_edge_bias_takes_outer_ring() {
        let board = empty_board(3);
        let pos = RolloutPolicy::EdgeBias.choose_move(&board, 1, &mut rng()).unwrap();
        assert_eq!(board.coord_at(pos).distance_to_center(), 3);
    }

    #[test]
    fn test_path_biased_takes_path_middle() {
        let board = empty_board(2);
        let pos = RolloutPolicy::PathBiased.choose_move(&board, 1, &mut rng()).unwrap();
        assert_eq!(board.coord_at(pos), HexCoord::new(0, 0));
    }

    #[test]
    fn test_path_biased_falls_back_to_start_edge() {
        let cells: Vec<_> = generate_hexagons(2)
            .into_iter()
            .map(|c| if c.q() == 0 && c.is_playable(2) { c.with_owner(2) } else { c })
            .collect();
        let board = Board::from_cells(2, &cells);
        let pos = RolloutPolicy::PathBiased.choose_move(&board, 1, &mut rng()).unwrap();
        assert_eq!(board.coord_at(pos).q, -2);
    }

    #[test]
    fn test_play_out_fills_board() {
        for policy in RolloutPolicy::all() {
            let mut board = empty_board(2);
            policy.play_out(&mut board, 1, &mut rng());
            assert!(board.is_full(), "{policy} left empty cells");
            let ones = board.owners().iter().filter(|&&o| o == 1).count();
            // 19 cells alternate 7/6/6 on top of the 4 seeded border cells
            assert_eq!(ones, 4 + 7);
        }
    }

    #[test]
    fn test_full_board_has_no_move() {
        let mut board = empty_board(1);
        RolloutPolicy::CenterBias.play_out(&mut board, 3, &mut rng());
        assert_eq!(RolloutPolicy::Random.choose_move(&board, 1, &mut rng()), None);
    }

    #[test]
    fn test_parse_roundtrip_names() {
        for policy in RolloutPolicy::all() {
            assert_eq!(policy.to_string().parse::<RolloutPolicy>().unwrap(), *policy);
        }
        assert!("sideways".parse::<RolloutPolicy>().is_err());
    }
}
