use crate::types::{NodeId, Position};
use glam::Vec2;

/// A per-iteration scratch buffer that accumulates attractor pull per node.
///
/// For each `NodeId`, this buffer stores:
///
/// - The sum of the unit vectors pointing from the node to every attractor
///   that picked it as nearest.
/// - The number of such attractors.
///
/// `sum[i]` and `count[i]` correspond to node `i`.
#[derive(Debug)]
pub struct InfluenceBuffer<P = Vec2> {
    /// Accumulated direction vectors for each node.
    sum: Vec<P>,
    /// Number of contributions for each node.
    pub count: Vec<u32>,
}

impl<P: Position> InfluenceBuffer<P> {
    /// Creates a new [`InfluenceBuffer`] with the given length.
    ///
    /// ### Parameters
    /// - `len` - Number of nodes this buffer can store influences for.
    pub fn with_len(len: usize) -> Self {
        Self {
            sum: vec![P::ZERO; len],
            count: vec![0; len],
        }
    }

    /// Resizes to `len` entries and clears every entry.
    ///
    /// Called at the start of each attraction phase, since the node set
    /// grows between iterations.
    ///
    /// ### Parameters
    /// - `len` - Desired length of the internal buffers.
    pub fn ensure_len(&mut self, len: usize) {
        if self.sum.len() != len {
            self.sum.resize(len, P::ZERO);
            self.count.resize(len, 0);
        }
        self.clear();
    }

    /// Clears all accumulated influences without changing the length.
    pub fn clear(&mut self) {
        self.sum.fill(P::ZERO);
        self.count.fill(0);
    }

    /// Adds one directional influence for the given node.
    ///
    /// ### Panics
    /// Panics if `id` is out of bounds for the internal arrays.
    #[inline]
    pub fn add(&mut self, id: NodeId, dir: P) {
        self.sum[id] += dir;
        self.count[id] += 1;
    }

    /// Unit growth direction for a node.
    ///
    /// This is the normalized sum of contributions (the same direction as
    /// their average). Returns zero when the node received no influence or
    /// when the contributions cancel out exactly.
    #[inline]
    pub fn direction(&self, id: NodeId) -> P {
        if self.count[id] == 0 {
            P::ZERO
        } else {
            self.sum[id].normalize_or_zero()
        }
    }

    /// Returns `true` if the given node has received any influences.
    #[inline]
    pub fn is_influenced(&self, id: NodeId) -> bool {
        self.count[id] > 0
    }

    /// Node ids with a nonzero counter, in ascending order.
    pub fn influenced_indices(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.count
            .iter()
            .enumerate()
            .filter_map(|(i, &c)| if c > 0 { Some(i) } else { None })
    }

    pub fn len(&self) -> usize {
        self.count.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3};

    #[test]
    fn with_len_initializes_zeroed_state() {
        let buf: InfluenceBuffer = InfluenceBuffer::with_len(5);

        assert_eq!(buf.len(), 5);
        assert!(buf.sum.iter().all(|v| *v == Vec2::ZERO));
        assert!(buf.count.iter().all(|c| *c == 0));
    }

    #[test]
    fn ensure_len_resizes_and_clears() {
        let mut buf: InfluenceBuffer = InfluenceBuffer::with_len(2);
        buf.add(0, Vec2::X);

        buf.ensure_len(4);
        assert_eq!(buf.len(), 4);
        assert!(!buf.is_influenced(0));

        // Same length still clears.
        buf.add(3, Vec2::Y);
        buf.ensure_len(4);
        assert!(!buf.is_influenced(3));
        assert_eq!(buf.sum[3], Vec2::ZERO);
    }

    #[test]
    fn direction_is_normalized_sum() {
        let mut buf: InfluenceBuffer = InfluenceBuffer::with_len(2);
        let id: NodeId = 1;

        assert_eq!(buf.direction(id), Vec2::ZERO);

        buf.add(id, Vec2::X);
        buf.add(id, Vec2::Y);

        assert_eq!(buf.count[id], 2);
        let dir = buf.direction(id);
        assert!((dir.length() - 1.0).abs() < 1e-6);
        assert!((dir.x - dir.y).abs() < 1e-6);
    }

    #[test]
    fn opposing_pulls_cancel_to_zero() {
        let mut buf = InfluenceBuffer::<Vec3>::with_len(1);
        buf.add(0, Vec3::Z);
        buf.add(0, -Vec3::Z);

        assert!(buf.is_influenced(0));
        assert_eq!(buf.direction(0), Vec3::ZERO);
    }

    #[test]
    fn influenced_indices_returns_only_nodes_with_nonzero_count() {
        let mut buf: InfluenceBuffer = InfluenceBuffer::with_len(4);
        buf.add(0, Vec2::X);
        buf.add(2, Vec2::Y);

        let ids: Vec<NodeId> = buf.influenced_indices().collect();
        assert_eq!(ids, vec![0, 2]);

        buf.clear();
        assert_eq!(buf.influenced_indices().count(), 0);
    }
}
