//! # Connectivity Engine
//!
//! Reachability questions over a board's owner grid. Every function works in the
//! board's own frame: the edges of a player are looked up through
//! [`Board::slot_of`], so a board canonicalized for player `p` always has `p`
//! connecting the q-sides.
//!
//! Each edge has two *reference cells* on the border ring, one per side. They are
//! pre-owned by the edge's player and stay that way for the whole game; a reference
//! cell holding anything else means the board was built or rotated incorrectly and
//! the check panics instead of answering.

use crate::board::{Board, CellPos};
use crate::hex::{HexCoord, EMPTY};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet, VecDeque};

/// Start and target cells of a player's edges inside the playable area.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgePair {
    pub start: Vec<CellPos>,
    pub target: Vec<CellPos>,
}

/// Border reference cells `(start, end)` of the edge on `slot`.
pub fn reference_cells(board: &Board, slot: usize) -> (CellPos, CellPos) {
    let outer = board.radius() + 1;
    let start = HexCoord::from_axis(slot, -outer, outer - 1, 1);
    let end = HexCoord::from_axis(slot, outer, 1 - outer, -1);
    match (board.pos_of(start), board.pos_of(end)) {
        (Some(s), Some(e)) => (s, e),
        _ => panic!("reference cells of slot {slot} fall off the grid"),
    }
}

fn checked_reference_cells(board: &Board, player: u8) -> (CellPos, CellPos) {
    let (start, end) = reference_cells(board, board.slot_of(player));
    let (start_owner, end_owner) = (board.get(start), board.get(end));
    assert!(
        start_owner == player && end_owner == player,
        "edge reference cells of player {player} hold owners {start_owner}/{end_owner}; board frame is inconsistent"
    );
    (start, end)
}

/// Breadth-first flood fill from `start` through cells accepted by `passable`.
/// Stops early once `goal` is reached and reports whether it was.
fn flood<F>(board: &Board, start: CellPos, goal: Option<CellPos>, passable: F) -> (bool, Vec<bool>)
where
    F: Fn(u8) -> bool,
{
    let size = board.size();
    let mut visited = vec![false; size * size];
    if !passable(board.get(start)) {
        return (false, visited);
    }

    let mut queue = VecDeque::new();
    visited[start.row * size + start.col] = true;
    queue.push_back(start);

    while let Some(pos) = queue.pop_front() {
        if Some(pos) == goal {
            return (true, visited);
        }
        for next in board.neighbors(pos) {
            let slot = next.row * size + next.col;
            if !visited[slot] && passable(board.get(next)) {
                visited[slot] = true;
                queue.push_back(next);
            }
        }
    }

    (false, visited)
}

/// Every cell reachable from `start` through cells owned by `player`.
/// Empty when `start` itself is not owned by `player`.
pub fn reachable_set(board: &Board, start: CellPos, player: u8) -> HashSet<CellPos> {
    let size = board.size();
    let (_, visited) = flood(board, start, None, |owner| owner == player);
    visited
        .iter()
        .enumerate()
        .filter(|(_, &seen)| seen)
        .map(|(slot, _)| CellPos::new(slot / size, slot % size))
        .collect()
}

/// Whether `player` owns an unbroken chain between their two edges.
pub fn has_winning_path(board: &Board, player: u8) -> bool {
    let (start, end) = checked_reference_cells(board, player);
    flood(board, start, Some(end), |owner| owner == player).0
}

/// Whether `player` could still connect their edges, optionally treating empty
/// cells as their own.
pub fn path_exists(board: &Board, player: u8, allow_empty: bool) -> bool {
    let (start, end) = checked_reference_cells(board, player);
    flood(board, start, Some(end), |owner| {
        owner == player || (allow_empty && owner == EMPTY)
    })
    .0
}

/// Playable cells on `player`'s starting and target sides.
pub fn edges_for(board: &Board, player: u8) -> EdgePair {
    let slot = board.slot_of(player);
    let radius = board.radius();
    let size = board.size();
    let mut start = Vec::new();
    let mut target = Vec::new();

    for row in 0..size {
        for col in 0..size {
            let pos = CellPos::new(row, col);
            let coord = board.coord_at(pos);
            if coord.distance_to_center() > radius {
                continue;
            }
            match coord.axis(slot) {
                a if a == -radius => start.push(pos),
                a if a == radius => target.push(pos),
                _ => {}
            }
        }
    }

    EdgePair { start, target }
}

/// Best-first search from `start_edge` to `target_edge` through cells that are
/// empty or owned by `player`. The priority of a cell is its distance to the board
/// center plus its distance to the nearest target cell, which pulls paths through
/// the middle of the board.
///
/// Returns the path from a start cell to a target cell, both inclusive.
pub fn shortest_guided_path(
    board: &Board,
    start_edge: &[CellPos],
    target_edge: &[CellPos],
    player: u8,
) -> Option<Vec<CellPos>> {
    if target_edge.is_empty() {
        return None;
    }

    let passable = |pos: CellPos| {
        let owner = board.get(pos);
        owner == EMPTY || owner == player
    };
    let targets: Vec<HexCoord> = target_edge.iter().map(|&p| board.coord_at(p)).collect();
    let priority = |pos: CellPos| {
        let coord = board.coord_at(pos);
        let to_target = targets.iter().map(|t| coord.distance(t)).min().unwrap_or(0);
        coord.distance_to_center() + to_target
    };

    let mut parents: HashMap<CellPos, Option<CellPos>> = HashMap::new();
    let mut heap = BinaryHeap::new();
    let mut seq = 0usize;

    for &pos in start_edge.iter().filter(|&&p| passable(p)) {
        if parents.insert(pos, None).is_none() {
            heap.push(Reverse((priority(pos), seq, pos)));
            seq += 1;
        }
    }

    while let Some(Reverse((_, _, pos))) = heap.pop() {
        if target_edge.contains(&pos) {
            let mut path = vec![pos];
            let mut current = pos;
            while let Some(Some(parent)) = parents.get(&current) {
                path.push(*parent);
                current = *parent;
            }
            path.reverse();
            return Some(path);
        }

        for next in board.neighbors(pos) {
            if !parents.contains_key(&next) && passable(next) {
                parents.insert(next, Some(pos));
                heap.push(Reverse((priority(next), seq, next)));
                seq += 1;
            }
        }
    }

    None
}
