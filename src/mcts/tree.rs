//! MCTS tree structure with arena allocation.
//!
//! Nodes are stored in a `Vec` behind a read-write lock and referenced by
//! [`NodeId`]. The arena only grows during a search, so ids stay valid until the
//! tree is dropped. The arena lock is held just long enough to clone a node handle
//! or push new nodes and is never held while a child list is locked.

use super::node::{NodeId, SearchNode};
use crate::board::Board;
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug)]
pub struct SearchTree {
    nodes: RwLock<Vec<Arc<SearchNode>>>,
}

impl SearchTree {
    pub fn new(root_board: Board, player_to_move: u8) -> Self {
        Self {
            nodes: RwLock::new(vec![Arc::new(SearchNode::new_root(root_board, player_to_move))]),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> Arc<SearchNode> {
        Arc::clone(&self.nodes.read()[id.index()])
    }

    /// Handles of several nodes under a single read lock.
    pub fn get_many(&self, ids: &[NodeId]) -> Vec<Arc<SearchNode>> {
        let nodes = self.nodes.read();
        ids.iter().map(|id| Arc::clone(&nodes[id.index()])).collect()
    }

    /// Appends nodes and returns their ids in order.
    pub fn allocate(&self, batch: Vec<SearchNode>) -> Vec<NodeId> {
        let mut nodes = self.nodes.write();
        let first = nodes.len() as u32;
        let count = batch.len() as u32;
        nodes.extend(batch.into_iter().map(Arc::new));
        (first..first + count).map(NodeId).collect()
    }

    /// Number of nodes, root included.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.read().len()
    }

    /// Records `reward` on `leaf` and every ancestor up to the root.
    pub fn backpropagate(&self, leaf: NodeId, reward: f64) {
        let mut current = Some(leaf);
        while let Some(id) = current {
            let node = self.get(id);
            node.record(reward);
            current = node.parent;
        }
    }

    /// Child of the root with the most visits; ties go to the earliest child.
    pub fn robust_child(&self) -> Option<NodeId> {
        let root = self.get(self.root());
        let ids = root.child_ids();
        let children = self.get_many(&ids);

        ids.into_iter()
            .zip(children)
            .fold(None, |best: Option<(NodeId, u32)>, (id, child)| {
                let visits = child.visits();
                match best {
                    Some((_, best_visits)) if best_visits >= visits => best,
                    _ => Some((id, visits)),
                }
            })
            .map(|(id, _)| id)
    }

    /// Deepest node in the arena.
    pub fn max_depth(&self) -> u32 {
        self.nodes.read().iter().map(|node| node.depth).max().unwrap_or(0)
    }
}
