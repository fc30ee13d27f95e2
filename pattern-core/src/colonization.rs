//! Space-colonization growth engine.
//!
//! [`SpaceColonization`] owns the node forest, the attractor cloud, the
//! per-node influence scratch buffer and (optionally) a spatial index, and
//! drives them through [`phases::attraction_phase`] and
//! [`phases::growth_phase`] once per [`SpaceColonization::grow_step`].

use crate::{
    attractor::AttractorSet,
    config::{GrowthConfig, NearestSearch},
    influence_buffer::InfluenceBuffer,
    phases,
    spatial_grid::SpatialGrid,
    tree::Tree,
    types::{NodeId, Position},
};
use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

/// Node positions plus `(parent, child)` edges, roots excluded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GrowthStructure<P = Vec2> {
    pub nodes: Vec<P>,
    pub edges: Vec<(NodeId, NodeId)>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthStats {
    pub total_nodes: usize,
    pub active_attractors: usize,
    pub total_attractors: usize,
    /// Number of roots.
    pub branches: usize,
}

/// Grows a branching forest toward a cloud of attractors.
///
/// ### Example
/// ```
/// use glam::Vec2;
/// use pattern_core::colonization::SpaceColonization;
/// use pattern_core::config::GrowthConfig;
///
/// let cfg = GrowthConfig {
///     influence_radius: 20.0,
///     kill_radius: 5.0,
///     step_size: 2.0,
///     ..Default::default()
/// };
/// let mut growth = SpaceColonization::new(cfg);
/// growth.add_initial_nodes([Vec2::ZERO]);
/// growth.add_attractors([Vec2::new(10.0, 0.0)]);
/// assert!(growth.grow_step());
/// assert_eq!(growth.statistics().total_nodes, 2);
/// ```
#[derive(Debug)]
pub struct SpaceColonization<P = Vec2> {
    config: GrowthConfig,
    tree: Tree<P>,
    attractors: AttractorSet<P>,
    acc: InfluenceBuffer<P>,
    grid: Option<SpatialGrid>,
    iterations: usize,
}

impl<P: Position> SpaceColonization<P> {
    pub fn new(config: GrowthConfig) -> Self {
        if !config.radii_ordered() {
            warn!(
                kill_radius = config.kill_radius,
                influence_radius = config.influence_radius,
                "kill radius is not smaller than influence radius; attractors will die before pulling"
            );
        }

        let grid = match config.nearest {
            NearestSearch::Grid => Some(SpatialGrid::new(grid_cell_size(&config))),
            NearestSearch::BruteForce => None,
        };

        Self {
            config,
            tree: Tree::default(),
            attractors: AttractorSet::default(),
            acc: InfluenceBuffer::with_len(0),
            grid,
            iterations: 0,
        }
    }

    pub fn config(&self) -> &GrowthConfig {
        &self.config
    }

    /// Replaces the attractor cloud; every attractor starts active.
    pub fn add_attractors(&mut self, points: impl IntoIterator<Item = P>) {
        self.set_attractors(AttractorSet::from_positions(points));
    }

    /// Replaces the attractor cloud with a prepared set.
    pub fn set_attractors(&mut self, attractors: AttractorSet<P>) {
        self.attractors = attractors;
        debug!(
            total = self.attractors.len(),
            active = self.attractors.active_count(),
            "installed attractors"
        );
    }

    /// Replaces the node forest with one root per point.
    pub fn add_initial_nodes(&mut self, points: impl IntoIterator<Item = P>) {
        self.tree = Tree::from_roots(points);
        if let Some(grid) = self.grid.as_mut() {
            *grid = SpatialGrid::from_tree(&self.tree, grid.cell_size());
        }
        debug!(roots = self.tree.len(), "installed seed nodes");
    }

    /// Runs one growth iteration.
    ///
    /// Returns `true` if at least one node was added. With no active
    /// attractor nothing happens and `false` is returned; attractors may
    /// still be killed in an iteration that adds no node.
    pub fn grow_step(&mut self) -> bool {
        if !self.attractors.any_active() {
            return false;
        }
        self.iterations += 1;

        let summary = phases::attraction_phase(
            &self.tree,
            self.grid.as_ref(),
            &mut self.attractors,
            &self.config,
            &mut self.acc,
        );
        let new_ids =
            phases::growth_phase(&mut self.tree, self.grid.as_mut(), &self.acc, &self.config);

        trace!(
            iteration = self.iterations,
            killed = summary.killed,
            influencing = summary.influencing,
            added = new_ids.len(),
            "growth step"
        );

        !new_ids.is_empty()
    }

    /// Steps until growth stops or `max_iterations` is reached.
    pub fn grow(&mut self) -> usize {
        self.grow_with(|_, _| {})
    }

    /// Like [`Self::grow`], calling `progress(iteration, node_count)` after
    /// every iteration that added nodes.
    ///
    /// ### Returns
    /// Iterations performed, counting the final one that added nothing.
    pub fn grow_with(&mut self, mut progress: impl FnMut(usize, usize)) -> usize {
        let max = self.config.max_iterations;
        let mut performed = max;
        for i in 0..max {
            if !self.grow_step() {
                performed = i + 1;
                break;
            }
            progress(i + 1, self.tree.len());
        }

        let stats = self.statistics();
        info!(
            iterations = performed,
            nodes = stats.total_nodes,
            active_attractors = stats.active_attractors,
            total_attractors = stats.total_attractors,
            "growth finished"
        );
        performed
    }

    /// Total grow iterations that ran with at least one active attractor.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn tree(&self) -> &Tree<P> {
        &self.tree
    }

    pub fn attractors(&self) -> &AttractorSet<P> {
        &self.attractors
    }

    /// Parent of every node, `None` for roots.
    pub fn parents(&self) -> Vec<Option<NodeId>> {
        self.tree.parents()
    }

    pub fn structure(&self) -> GrowthStructure<P> {
        GrowthStructure {
            nodes: self.tree.positions(),
            edges: self.tree.edges(),
        }
    }

    /// Maximal branch-free chains as node ids. See [`Tree::polyline_indices`].
    pub fn polyline_indices(&self) -> Vec<Vec<NodeId>> {
        self.tree.polyline_indices()
    }

    /// Maximal branch-free chains as positions.
    pub fn polylines(&self) -> Vec<Vec<P>> {
        self.tree.polylines()
    }

    pub fn statistics(&self) -> GrowthStats {
        GrowthStats {
            total_nodes: self.tree.len(),
            active_attractors: self.attractors.active_count(),
            total_attractors: self.attractors.len(),
            branches: self.tree.roots().count(),
        }
    }
}

fn grid_cell_size(cfg: &GrowthConfig) -> f32 {
    cfg.influence_radius.max(cfg.kill_radius)
}
