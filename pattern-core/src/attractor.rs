use crate::types::Position;
use glam::Vec2;
use rand::Rng;

/// A growth target. Once killed it never becomes active again.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attractor<P = Vec2> {
    pub pos: P,
    pub alive: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AttractorSet<P = Vec2> {
    pub points: Vec<Attractor<P>>,
}

impl<P> Default for AttractorSet<P> {
    fn default() -> Self {
        Self { points: Vec::new() }
    }
}

impl<P: Position> AttractorSet<P> {
    pub fn from_positions(positions: impl IntoIterator<Item = P>) -> Self {
        let points = positions
            .into_iter()
            .map(|pos| Attractor { pos, alive: true })
            .collect();

        Self { points }
    }

    /// Draws `count` points from `sample`.
    pub fn random_in_box<R: Rng>(
        count: usize,
        rng: &mut R,
        mut sample: impl FnMut(&mut R) -> P,
    ) -> Self {
        Self::from_positions((0..count).map(|_| sample(rng)).collect::<Vec<_>>())
    }

    /// Rejection sampling: draws from `sample` until `count` points pass
    /// `accept` or `max_attempts` draws have been made, whichever comes
    /// first. May return fewer than `count` attractors.
    pub fn sample_where<R: Rng>(
        count: usize,
        max_attempts: usize,
        rng: &mut R,
        mut sample: impl FnMut(&mut R) -> P,
        mut accept: impl FnMut(P) -> bool,
    ) -> Self {
        let mut positions = Vec::with_capacity(count);
        let mut attempts = 0;
        while positions.len() < count && attempts < max_attempts {
            attempts += 1;
            let p = sample(rng);
            if accept(p) {
                positions.push(p);
            }
        }
        Self::from_positions(positions)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.points.iter().filter(|a| a.alive).count()
    }

    pub fn any_active(&self) -> bool {
        self.points.iter().any(|a| a.alive)
    }
}

impl AttractorSet<Vec2> {
    pub fn random_in_square(count: usize, half_range: f32, rng: &mut impl Rng) -> Self {
        let positions = (0..count)
            .map(|_| {
                let x = rng.random_range(-half_range..=half_range);
                let y = rng.random_range(-half_range..=half_range);
                Vec2::new(x, y)
            })
            .collect::<Vec<_>>();

        Self::from_positions(positions)
    }
}
