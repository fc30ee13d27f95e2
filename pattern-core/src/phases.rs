//! The two phases of one space-colonization iteration.
//!
//! 1. [`attraction_phase`] - every active attractor finds its nearest node;
//!    it is killed if closer than the kill radius, otherwise it pulls that
//!    node if within the influence radius. All pulls are accumulated in an
//!    [`InfluenceBuffer`] before any node is created.
//! 2. [`growth_phase`] - every pulled node proposes one child along its
//!    normalized pull. Proposals are spacing-checked against the nodes that
//!    existed before the phase, then appended together.

use crate::{
    attractor::AttractorSet, config::GrowthConfig, influence_buffer::InfluenceBuffer,
    spatial_grid::SpatialGrid, tree::Tree, types::NodeId, types::Position,
};
use tracing::trace;

/// Fraction of `min_node_spacing` a new node must keep from existing nodes.
pub const SPACING_TOLERANCE: f32 = 0.8;

/// Counts from one [`attraction_phase`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AttractionSummary {
    pub killed: usize,
    pub influencing: usize,
}

/// Nearest node to `query` provided it lies within `radius`.
///
/// With a grid the lookup is bounded; without one every node is scanned.
/// Both return the same node (lowest id on distance ties).
pub fn nearest_within<P: Position>(
    tree: &Tree<P>,
    grid: Option<&SpatialGrid>,
    query: P,
    radius: f32,
) -> Option<(NodeId, f32)> {
    match grid {
        Some(grid) => grid.nearest_within(&tree.nodes, query, radius),
        None => tree.find_nearest_node(query).filter(|&(_, d)| d <= radius),
    }
}

/// Kills reached attractors and accumulates pull from the rest.
///
/// For each alive attractor:
///
/// 1. Find the nearest node.
/// 2. If its distance is `< cfg.kill_radius`, mark the attractor dead and
///    move on.
/// 3. Else if its distance is `<= cfg.influence_radius`, add the unit
///    vector from that node to the attractor into `acc`.
///
/// `acc` is resized (and cleared) to `tree.nodes.len()` first.
///
/// ### Parameters
/// - `tree` - The current tree; only read access is required.
/// - `grid` - Spatial index over `tree`, or `None` for brute force.
/// - `attractors` - Attractor set; reached attractors are marked dead.
/// - `cfg` - Provides the kill and influence radii.
/// - `acc` - Scratch buffer receiving per-node pull.
pub fn attraction_phase<P: Position>(
    tree: &Tree<P>,
    grid: Option<&SpatialGrid>,
    attractors: &mut AttractorSet<P>,
    cfg: &GrowthConfig,
    acc: &mut InfluenceBuffer<P>,
) -> AttractionSummary {
    acc.ensure_len(tree.nodes.len());

    // Beyond both radii the nearest node is irrelevant.
    let reach = cfg.influence_radius.max(cfg.kill_radius);
    let mut summary = AttractionSummary::default();

    for a in attractors.points.iter_mut().filter(|a| a.alive) {
        let Some((id, d)) = nearest_within(tree, grid, a.pos, reach) else {
            continue;
        };

        if d < cfg.kill_radius {
            a.alive = false;
            summary.killed += 1;
        } else if d <= cfg.influence_radius {
            let dir = (a.pos - tree.nodes[id].pos).normalize_or_zero();
            acc.add(id, dir);
            summary.influencing += 1;
        }
    }

    summary
}

/// Grows one child per influenced node, subject to spacing.
///
/// For each node with a nonzero counter in `acc`, in id order:
///
/// 1. Normalize the accumulated pull.
/// 2. Propose `pos + dir * cfg.step_size`.
/// 3. Reject the proposal if any node that existed before this phase is
///    closer than `SPACING_TOLERANCE * cfg.min_node_spacing`.
///
/// Accepted proposals are appended afterwards in one batch, so proposals
/// from the same phase never see each other. New nodes are also added to
/// `grid` when one is given.
///
/// ### Returns
/// The ids of the new nodes, in creation order.
pub fn growth_phase<P: Position>(
    tree: &mut Tree<P>,
    mut grid: Option<&mut SpatialGrid>,
    acc: &InfluenceBuffer<P>,
    cfg: &GrowthConfig,
) -> Vec<NodeId> {
    let min_dist = SPACING_TOLERANCE * cfg.min_node_spacing;
    let mut to_add = Vec::with_capacity(16);

    for id in acc.influenced_indices() {
        let dir = acc.direction(id);
        let new_pos = tree.nodes[id].pos + dir * cfg.step_size;

        let crowded = nearest_within(tree, grid.as_deref(), new_pos, min_dist)
            .is_some_and(|(_, d)| d < min_dist);
        if crowded {
            trace!(parent = id, "rejected crowded growth candidate");
            continue;
        }

        to_add.push((id, new_pos));
    }

    let mut new_ids = Vec::with_capacity(to_add.len());
    for (parent, pos) in to_add {
        let id = tree.add_child(parent, pos);
        if let Some(grid) = grid.as_deref_mut() {
            grid.insert(id, pos);
        }
        new_ids.push(id);
    }
    new_ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn cfg() -> GrowthConfig {
        GrowthConfig {
            influence_radius: 20.0,
            kill_radius: 5.0,
            step_size: 2.0,
            min_node_spacing: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn attraction_phase_accumulates_influence() {
        let tree = Tree::from_roots([Vec2::ZERO]);
        let mut attractors = AttractorSet::from_positions(vec![Vec2::new(10.0, 0.0)]);
        let mut acc = InfluenceBuffer::with_len(0);

        let summary = attraction_phase(&tree, None, &mut attractors, &cfg(), &mut acc);

        assert_eq!(summary, AttractionSummary { killed: 0, influencing: 1 });
        assert_eq!(acc.len(), 1);
        assert_eq!(acc.count[0], 1);
        assert_eq!(acc.direction(0), Vec2::X);
        assert!(attractors.points[0].alive);
    }

    #[test]
    fn attraction_phase_kills_close_attractors_without_pulling() {
        let tree = Tree::from_roots([Vec2::ZERO]);
        let mut attractors =
            AttractorSet::from_positions(vec![Vec2::new(2.0, 0.0), Vec2::new(100.0, 0.0)]);
        let mut acc = InfluenceBuffer::with_len(0);

        let summary = attraction_phase(&tree, None, &mut attractors, &cfg(), &mut acc);

        assert_eq!(summary.killed, 1);
        assert!(!attractors.points[0].alive, "close attractor should die");
        assert!(attractors.points[1].alive, "far attractor should survive");
        assert!(!acc.is_influenced(0));
    }

    #[test]
    fn attraction_phase_uses_only_the_nearest_node() {
        let tree = Tree::from_roots([Vec2::ZERO, Vec2::new(8.0, 0.0)]);
        let mut attractors = AttractorSet::from_positions(vec![Vec2::new(15.0, 0.0)]);
        let mut acc = InfluenceBuffer::with_len(0);

        attraction_phase(&tree, None, &mut attractors, &cfg(), &mut acc);

        assert!(!acc.is_influenced(0));
        assert!(acc.is_influenced(1));
    }

    #[test]
    fn attraction_phase_with_empty_tree_is_noop() {
        let tree: Tree = Tree::default();
        let mut attractors = AttractorSet::from_positions(vec![Vec2::new(1.0, 0.0)]);
        let mut acc = InfluenceBuffer::with_len(3);

        let summary = attraction_phase(&tree, None, &mut attractors, &cfg(), &mut acc);

        assert_eq!(summary, AttractionSummary::default());
        assert!(acc.is_empty());
        assert!(attractors.points[0].alive);
    }

    #[test]
    fn attraction_phase_grid_and_brute_force_agree() {
        let tree = Tree::from_roots([Vec2::ZERO, Vec2::new(6.0, 0.0), Vec2::new(0.0, 6.0)]);
        let grid = SpatialGrid::from_tree(&tree, 20.0);
        let points = vec![
            Vec2::new(3.0, 0.0),
            Vec2::new(3.0, 3.0),
            Vec2::new(12.0, 0.0),
            Vec2::new(-15.0, 0.0),
            Vec2::new(40.0, 40.0),
        ];

        let mut a = AttractorSet::from_positions(points.clone());
        let mut b = AttractorSet::from_positions(points);
        let mut acc_a = InfluenceBuffer::with_len(0);
        let mut acc_b = InfluenceBuffer::with_len(0);

        let sa = attraction_phase(&tree, None, &mut a, &cfg(), &mut acc_a);
        let sb = attraction_phase(&tree, Some(&grid), &mut b, &cfg(), &mut acc_b);

        assert_eq!(sa, sb);
        assert_eq!(a, b);
        assert_eq!(acc_a.count, acc_b.count);
    }

    #[test]
    fn growth_phase_creates_child_in_influence_direction() {
        let mut tree = Tree::from_roots([Vec2::ZERO]);
        let mut acc = InfluenceBuffer::with_len(1);
        acc.add(0, Vec2::X);

        let new_ids = growth_phase(&mut tree, None, &acc, &cfg());

        assert_eq!(new_ids, vec![1]);
        assert_eq!(tree.nodes[1].pos, Vec2::new(2.0, 0.0));
        assert_eq!(tree.nodes[1].parent, Some(0));
        assert_eq!(tree.nodes[0].children, vec![1]);
    }

    #[test]
    fn growth_phase_skips_crowded_candidates() {
        let mut tree = Tree::from_roots([Vec2::ZERO]);
        // Existing node right where the candidate would land.
        tree.add_child(0, Vec2::new(2.0, 0.3));
        let mut acc = InfluenceBuffer::with_len(2);
        acc.add(0, Vec2::X);

        let new_ids = growth_phase(&mut tree, None, &acc, &cfg());

        assert!(new_ids.is_empty());
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn growth_phase_spacing_boundary_is_accepted() {
        let mut tree = Tree::from_roots([Vec2::ZERO]);
        let mut acc = InfluenceBuffer::with_len(1);
        acc.add(0, Vec2::X);

        // Candidate lands exactly SPACING_TOLERANCE * spacing from its parent.
        let cfg = GrowthConfig {
            step_size: 0.8,
            min_node_spacing: 1.0,
            ..cfg()
        };
        assert_eq!(growth_phase(&mut tree, None, &acc, &cfg), vec![1]);
    }

    #[test]
    fn growth_phase_candidates_do_not_see_each_other() {
        // Two roots pulled toward the same point: the candidates coincide
        // but both are accepted, since only pre-existing nodes count.
        let mut tree = Tree::from_roots([Vec2::new(-2.0, 0.0), Vec2::new(2.0, 0.0)]);
        let mut acc = InfluenceBuffer::with_len(2);
        acc.add(0, Vec2::X);
        acc.add(1, -Vec2::X);

        let mut grid = SpatialGrid::from_tree(&tree, 20.0);
        let new_ids = growth_phase(&mut tree, Some(&mut grid), &acc, &cfg());

        assert_eq!(new_ids, vec![2, 3]);
        assert_eq!(tree.nodes[2].pos, tree.nodes[3].pos);
        assert_eq!(grid.len(), 4);
    }

    #[test]
    fn growth_phase_rejects_cancelled_pull() {
        let mut tree = Tree::from_roots([Vec2::ZERO]);
        let mut acc = InfluenceBuffer::with_len(1);
        acc.add(0, Vec2::X);
        acc.add(0, -Vec2::X);

        // Zero direction puts the candidate on top of its parent.
        assert!(growth_phase(&mut tree, None, &acc, &cfg()).is_empty());
    }
}
