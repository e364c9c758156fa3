//! Search tree node.
//!
//! Nodes live in the arena of a [`SearchTree`](super::tree::SearchTree) and refer to
//! each other by [`NodeId`]. Statistics are atomics so that concurrent iterations can
//! update them without locking; only the child list sits behind a mutex.

use crate::board::{Board, CellPos};
use crate::connectivity::has_winning_path;
use crate::hex::next_player;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Index into the node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
pub struct SearchNode {
    /// Position after `move_pos` was played, in the root player's canonical frame.
    pub board: Board,

    pub player_to_move: u8,

    /// Cell filled to reach this node from its parent. `None` for the root.
    pub move_pos: Option<CellPos>,

    pub parent: Option<NodeId>,

    pub depth: u32,

    /// Player whose move completed a chain at this node.
    pub winner: Option<u8>,

    /// No further moves: the board is full or somebody just won.
    pub terminal: bool,

    /// Evaluator prior of the move leading here, 0 without an evaluator.
    pub prior: f32,

    visits: AtomicU32,
    /// `f64` bits of the summed reward.
    reward: AtomicU64,

    pub(crate) children: Mutex<Vec<NodeId>>,
}

impl SearchNode {
    pub fn new_root(board: Board, player_to_move: u8) -> Self {
        let terminal = board.is_full();
        Self {
            board,
            player_to_move,
            move_pos: None,
            parent: None,
            depth: 0,
            winner: None,
            terminal,
            prior: 1.0,
            visits: AtomicU32::new(0),
            reward: AtomicU64::new(0f64.to_bits()),
            children: Mutex::new(Vec::new()),
        }
    }

    /// The node reached from `parent` by its mover claiming `pos`.
    pub fn new_child(parent_id: NodeId, parent: &SearchNode, pos: CellPos, prior: f32) -> Self {
        let mover = parent.player_to_move;
        let mut board = parent.board.clone();
        board.set(pos, mover);

        let winner = has_winning_path(&board, mover).then_some(mover);
        let terminal = winner.is_some() || board.is_full();

        Self {
            board,
            player_to_move: next_player(mover),
            move_pos: Some(pos),
            parent: Some(parent_id),
            depth: parent.depth + 1,
            winner,
            terminal,
            prior,
            visits: AtomicU32::new(0),
            reward: AtomicU64::new(0f64.to_bits()),
            children: Mutex::new(Vec::new()),
        }
    }

    #[inline]
    pub fn visits(&self) -> u32 {
        self.visits.load(Ordering::Acquire)
    }

    #[inline]
    pub fn total_reward(&self) -> f64 {
        f64::from_bits(self.reward.load(Ordering::Acquire))
    }

    /// Adds one visit carrying `reward`.
    pub fn record(&self, reward: f64) {
        self.reward
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |bits| {
                Some((f64::from_bits(bits) + reward).to_bits())
            })
            .ok();
        self.visits.fetch_add(1, Ordering::AcqRel);
    }

    /// Mean reward, 0 for unvisited nodes.
    pub fn mean_reward(&self) -> f64 {
        match self.visits() {
            0 => 0.0,
            n => self.total_reward() / n as f64,
        }
    }

    /// UCB1 score as seen from a parent with `parent_visits` visits. Unvisited
    /// nodes score `+∞`.
    pub fn ucb1(&self, parent_visits: u32, exploration: f64) -> f64 {
        let visits = self.visits();
        if visits == 0 {
            return f64::INFINITY;
        }
        let visits = visits as f64;
        self.total_reward() / visits + exploration * ((parent_visits.max(1) as f64).ln() / visits).sqrt()
    }

    pub fn child_ids(&self) -> Vec<NodeId> {
        self.children.lock().clone()
    }
}
