//! Uniform grid hash over tree nodes.
//!
//! Growth only ever asks "which node is nearest, provided it lies within
//! radius R" (kill/influence tests for attractors, spacing tests for
//! candidates). [`SpatialGrid::nearest_within`] answers exactly that by
//! scanning the cells that overlap the query box, and it picks the same
//! node the brute-force scan in [`Tree::find_nearest_node`] picks: smallest
//! distance, lowest id on ties.

use crate::tree::{Tree, TreeNode};
use crate::types::{CellKey, NodeId, Position};
use std::collections::HashMap;

#[derive(Clone, Debug)]
pub struct SpatialGrid {
    cell_size: f32,
    cells: HashMap<CellKey, Vec<NodeId>>,
    len: usize,
}

impl SpatialGrid {
    /// Creates an empty grid. Non-positive or non-finite sizes fall back to `1.0`.
    pub fn new(cell_size: f32) -> Self {
        let cell_size = if cell_size.is_finite() && cell_size > 0.0 {
            cell_size
        } else {
            1.0
        };
        Self {
            cell_size,
            cells: HashMap::new(),
            len: 0,
        }
    }

    /// Builds a grid holding every node of `tree`.
    pub fn from_tree<P: Position>(tree: &Tree<P>, cell_size: f32) -> Self {
        let mut grid = Self::new(cell_size);
        for (id, node) in tree.nodes.iter().enumerate() {
            grid.insert(id, node.pos);
        }
        grid
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert<P: Position>(&mut self, id: NodeId, pos: P) {
        self.cells.entry(pos.cell(self.cell_size)).or_default().push(id);
        self.len += 1;
    }

    /// Nearest node to `query` if its distance is `<= radius`.
    ///
    /// `nodes` must be the slice the grid was filled from.
    pub fn nearest_within<P: Position>(
        &self,
        nodes: &[TreeNode<P>],
        query: P,
        radius: f32,
    ) -> Option<(NodeId, f32)> {
        let mut lo = query.offset_all(-radius).cell(self.cell_size);
        let mut hi = query.offset_all(radius).cell(self.cell_size);
        // One cell of slack absorbs rounding in the box corners.
        for axis in 0..P::DIM {
            lo[axis] = lo[axis].saturating_sub(1);
            hi[axis] = hi[axis].saturating_add(1);
        }

        let volume: f64 = (0..3)
            .map(|a| f64::from(hi[a]) - f64::from(lo[a]) + 1.0)
            .product();

        let mut best: Option<(NodeId, f32)> = None;
        let mut consider = |ids: &[NodeId]| {
            for &id in ids {
                let d = nodes[id].pos.distance(query);
                let better = match best {
                    // Same start as the brute-force scan: NaN never wins.
                    None => d < f32::INFINITY,
                    Some((best_id, best_d)) => d < best_d || (d == best_d && id < best_id),
                };
                if better {
                    best = Some((id, d));
                }
            }
        };

        if volume > self.cells.len() as f64 {
            // Query box spans more cells than are occupied.
            for (key, ids) in &self.cells {
                if (0..3).all(|a| lo[a] <= key[a] && key[a] <= hi[a]) {
                    consider(ids);
                }
            }
        } else {
            for x in lo[0]..=hi[0] {
                for y in lo[1]..=hi[1] {
                    for z in lo[2]..=hi[2] {
                        if let Some(ids) = self.cells.get(&[x, y, z]) {
                            consider(ids);
                        }
                    }
                }
            }
        }

        best.filter(|&(_, d)| d <= radius)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn brute_within<P: Position>(tree: &Tree<P>, q: P, radius: f32) -> Option<(NodeId, f32)> {
        tree.find_nearest_node(q).filter(|&(_, d)| d <= radius)
    }

    #[test]
    fn empty_grid_finds_nothing() {
        let tree: Tree = Tree::default();
        let grid = SpatialGrid::from_tree(&tree, 2.0);
        assert!(grid.is_empty());
        assert_eq!(grid.nearest_within(&tree.nodes, Vec2::ZERO, 100.0), None);
    }

    #[test]
    fn radius_is_inclusive() {
        let tree = Tree::from_roots([Vec2::new(3.0, 0.0)]);
        let grid = SpatialGrid::from_tree(&tree, 1.0);
        assert_eq!(grid.nearest_within(&tree.nodes, Vec2::ZERO, 3.0), Some((0, 3.0)));
        assert_eq!(grid.nearest_within(&tree.nodes, Vec2::ZERO, 2.99), None);
    }

    #[test]
    fn ties_go_to_lowest_id_across_cells() {
        // Insert the higher id first so cell order cannot decide the tie.
        let tree = Tree::from_roots([Vec2::new(-2.0, 0.0), Vec2::new(2.0, 0.0)]);
        let mut grid = SpatialGrid::new(1.0);
        grid.insert(1, tree.nodes[1].pos);
        grid.insert(0, tree.nodes[0].pos);

        assert_eq!(grid.nearest_within(&tree.nodes, Vec2::ZERO, 5.0), Some((0, 2.0)));
    }

    #[test]
    fn nan_node_does_not_shadow_finite_neighbour() {
        let tree = Tree::from_roots([Vec2::NAN, Vec2::new(0.2, 0.2)]);
        let grid = SpatialGrid::from_tree(&tree, 1.0);
        let q = Vec2::new(0.5, 0.5);

        let found = grid.nearest_within(&tree.nodes, q, 5.0);
        assert_eq!(found.map(|r| r.0), Some(1));
        assert_eq!(found, brute_within(&tree, q, 5.0));
    }

    #[test]
    fn invalid_cell_size_falls_back() {
        assert_eq!(SpatialGrid::new(0.0).cell_size(), 1.0);
        assert_eq!(SpatialGrid::new(f32::NAN).cell_size(), 1.0);
    }

    #[test]
    fn huge_radius_scans_occupied_cells() {
        let tree = Tree::from_roots([Vec2::new(1000.0, -1000.0), Vec2::new(5.0, 5.0)]);
        let grid = SpatialGrid::from_tree(&tree, 0.5);
        assert_eq!(
            grid.nearest_within(&tree.nodes, Vec2::ZERO, 1.0e6).map(|r| r.0),
            Some(1)
        );
    }

    #[test]
    fn matches_brute_force_on_random_2d_points() {
        let mut rng = ChaCha8Rng::seed_from_u64(17);
        let tree = Tree::from_roots((0..400).map(|_| {
            Vec2::new(rng.random_range(-50.0..50.0), rng.random_range(-50.0..50.0))
        }));
        let grid = SpatialGrid::from_tree(&tree, 4.0);

        for _ in 0..500 {
            let q = Vec2::new(rng.random_range(-60.0..60.0), rng.random_range(-60.0..60.0));
            let r = rng.random_range(0.5..12.0);
            assert_eq!(grid.nearest_within(&tree.nodes, q, r), brute_within(&tree, q, r));
        }
    }

    #[test]
    fn matches_brute_force_on_lattice_ties_3d() {
        // Integer lattice, integer queries: lots of exact distance ties.
        let mut tree = Tree::default();
        for x in -3..=3 {
            for y in -3..=3 {
                for z in -3..=3 {
                    tree.add_root(Vec3::new(x as f32, y as f32, z as f32) * 2.0);
                }
            }
        }
        let grid = SpatialGrid::from_tree(&tree, 2.0);

        for x in -4..=4 {
            for y in -4..=4 {
                let q = Vec3::new(x as f32, y as f32, 1.0);
                assert_eq!(
                    grid.nearest_within(&tree.nodes, q, 3.0),
                    brute_within(&tree, q, 3.0)
                );
            }
        }
    }
}
