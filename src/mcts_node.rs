use crate::moves::Move;
use ego_tree::NodeId;
use std::collections::BTreeMap;

/// Represents a single node in the Monte Carlo search tree.
///
/// Nodes live in an arena (`ego_tree::Tree`); the parent link is the arena's, so a node
/// never owns its parent. The game state is not stored: it is rebuilt by replaying moves
/// from the root on each descent.
#[derive(Debug, Clone)]
pub struct MctsNode {
    /// The depth of the node in the tree.
    pub height: u32,
    /// The move that led to this node from its parent. `None` for the root node.
    pub prev_move: Option<Move>,
    /// Legal moves at this node that have no child yet.
    pub unexplored_moves: BTreeMap<String, Move>,
    /// Expanded children keyed by move name.
    pub children: BTreeMap<String, NodeId>,
    /// The number of times this node has been visited during the search.
    pub visits: u32,
    /// Sum of rewards backpropagated through this node. `-inf` marks a forced loss.
    pub wins: f64,
}

impl MctsNode {
    /// Creates an unvisited node with the given legal moves.
    pub fn new(prev_move: Option<Move>, moves: BTreeMap<String, Move>, height: u32) -> Self {
        MctsNode {
            height,
            prev_move,
            unexplored_moves: moves,
            children: BTreeMap::new(),
            visits: 0,
            wins: 0.0,
        }
    }

    /// Whether the node has neither children nor moves left to try.
    pub fn is_exhausted(&self) -> bool {
        self.unexplored_moves.is_empty() && self.children.is_empty()
    }

    pub fn is_fully_expanded(&self) -> bool {
        self.unexplored_moves.is_empty()
    }

    /// Calculates the average reward of this node.
    pub fn wins_rate(&self) -> f64 {
        if self.visits == 0 {
            0.0
        } else {
            self.wins / (self.visits as f64)
        }
    }

    /// UCT score of this node given its parent's visit count.
    pub fn uct(&self, parent_visits: u32, exploration: f64) -> f64 {
        if self.visits == 0 {
            return f64::INFINITY;
        }
        let visits = self.visits as f64;
        self.wins / visits + exploration * f64::sqrt(f64::ln(parent_visits as f64) / visits)
    }

    /// Name of the move that led here, empty for the root.
    pub fn move_name(&self) -> &str {
        self.prev_move.as_ref().map_or("", |m| m.name.as_str())
    }
}
