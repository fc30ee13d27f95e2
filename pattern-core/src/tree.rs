use crate::types::{NodeId, Position};
use glam::Vec2;

#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode<P = Vec2> {
    pub pos: P,
    /// `None` for roots.
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Append-only forest of growth nodes.
///
/// Nodes are never moved or removed, and a child is always pushed after
/// its parent, so every parent id is smaller than its child's id.
#[derive(Clone, Debug, PartialEq)]
pub struct Tree<P = Vec2> {
    pub nodes: Vec<TreeNode<P>>,
}

impl<P> Default for Tree<P> {
    fn default() -> Self {
        Self { nodes: Vec::new() }
    }
}

impl<P: Position> TreeNode<P> {
    pub fn new_root(pos: P) -> Self {
        Self {
            pos,
            parent: None,
            children: Vec::with_capacity(4),
        }
    }

    pub fn new_child(pos: P, parent: NodeId) -> Self {
        Self {
            pos,
            parent: Some(parent),
            children: Vec::with_capacity(4),
        }
    }
}

impl<P: Position> Tree<P> {
    /// A forest whose nodes are all roots.
    pub fn from_roots(roots: impl IntoIterator<Item = P>) -> Self {
        Self {
            nodes: roots.into_iter().map(TreeNode::new_root).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_root(&mut self, pos: P) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(TreeNode::new_root(pos));
        id
    }

    pub fn add_child(&mut self, parent: NodeId, pos: P) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(TreeNode::new_child(pos, parent));
        self.nodes[parent].children.push(id);
        id
    }

    /// Nearest node to `pos` and its distance, scanning every node.
    ///
    /// Ties go to the lowest id.
    pub fn find_nearest_node(&self, pos: P) -> Option<(NodeId, f32)> {
        let mut best = None;
        let mut best_d = f32::INFINITY;
        for (id, n) in self.nodes.iter().enumerate() {
            let d = n.pos.distance(pos);
            if d < best_d {
                best_d = d;
                best = Some(id);
            }
        }
        best.map(|id| (id, best_d))
    }

    pub fn positions(&self) -> Vec<P> {
        self.nodes.iter().map(|n| n.pos).collect()
    }

    pub fn parents(&self) -> Vec<Option<NodeId>> {
        self.nodes.iter().map(|n| n.parent).collect()
    }

    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(id, n)| n.parent.is_none().then_some(id))
    }

    /// `(parent, child)` pairs in child order.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.nodes
            .iter()
            .enumerate()
            .filter_map(|(id, n)| n.parent.map(|p| (p, id)))
            .collect()
    }

    /// Splits the forest into maximal branch-free chains of node ids.
    ///
    /// A chain starts at a root or at a child of a branching node and
    /// follows single children until it reaches a leaf or a node with
    /// several children; that node closes the chain and each of its
    /// children opens a new one. Every node appears in exactly one chain.
    ///
    /// Uses an explicit stack, so chain length is not bounded by the call
    /// stack. Chains are emitted root by root, depth first, children in
    /// creation order.
    pub fn polyline_indices(&self) -> Vec<Vec<NodeId>> {
        let mut lines = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();

        for root in self.roots() {
            stack.push(root);
            while let Some(start) = stack.pop() {
                let mut line = vec![start];
                let mut current = start;
                while let [only] = self.nodes[current].children.as_slice() {
                    current = *only;
                    line.push(current);
                }
                // Reverse so the first child is traced first.
                stack.extend(self.nodes[current].children.iter().rev());
                lines.push(line);
            }
        }
        lines
    }

    pub fn polylines(&self) -> Vec<Vec<P>> {
        self.polyline_indices()
            .into_iter()
            .map(|line| line.into_iter().map(|id| self.nodes[id].pos).collect())
            .collect()
    }
}
