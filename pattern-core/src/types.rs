use glam::{Vec2, Vec3};
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Mul, Sub};

/// Identifier for a node in a [`crate::tree::Tree`].
///
/// This is an index into `Tree::nodes`. Nodes are append-only, so an id
/// stays valid for the lifetime of the tree that issued it.
pub type NodeId = usize;

/// Integer cell coordinate used by [`crate::spatial_grid::SpatialGrid`].
///
/// 2D positions always map to `z = 0`.
pub type CellKey = [i32; 3];

/// A point the growth engine can operate on.
///
/// Implemented for [`Vec2`] and [`Vec3`], so the same colonization code
/// grows flat venation patterns and volumetric root systems.
pub trait Position:
    Copy
    + Debug
    + PartialEq
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + AddAssign
    + Mul<f32, Output = Self>
{
    /// The origin.
    const ZERO: Self;

    /// Number of spatial axes.
    const DIM: usize;

    /// Euclidean length.
    fn length(self) -> f32;

    /// Unit vector in the same direction, or zero for a zero vector.
    fn normalize_or_zero(self) -> Self;

    /// Grid cell containing this point for a given cell size.
    fn cell(self, cell_size: f32) -> CellKey;

    /// Euclidean distance to `other`.
    ///
    /// Every nearest-node comparison in the crate goes through this one
    /// function so brute-force and indexed searches agree bit for bit.
    #[inline]
    fn distance(self, other: Self) -> f32 {
        (self - other).length()
    }

    /// Componentwise offset by `delta` on every axis this type has.
    fn offset_all(self, delta: f32) -> Self;
}

#[inline]
fn axis_cell(v: f32, cell_size: f32) -> i32 {
    // `as` saturates, so far-away points collapse onto the outermost cells.
    (v / cell_size).floor() as i32
}

impl Position for Vec2 {
    const ZERO: Self = Vec2::ZERO;
    const DIM: usize = 2;

    #[inline]
    fn length(self) -> f32 {
        Vec2::length(self)
    }

    #[inline]
    fn normalize_or_zero(self) -> Self {
        Vec2::normalize_or_zero(self)
    }

    #[inline]
    fn cell(self, cell_size: f32) -> CellKey {
        [axis_cell(self.x, cell_size), axis_cell(self.y, cell_size), 0]
    }

    #[inline]
    fn offset_all(self, delta: f32) -> Self {
        self + Vec2::splat(delta)
    }
}

impl Position for Vec3 {
    const ZERO: Self = Vec3::ZERO;
    const DIM: usize = 3;

    #[inline]
    fn length(self) -> f32 {
        Vec3::length(self)
    }

    #[inline]
    fn normalize_or_zero(self) -> Self {
        Vec3::normalize_or_zero(self)
    }

    #[inline]
    fn cell(self, cell_size: f32) -> CellKey {
        [
            axis_cell(self.x, cell_size),
            axis_cell(self.y, cell_size),
            axis_cell(self.z, cell_size),
        ]
    }

    #[inline]
    fn offset_all(self, delta: f32) -> Self {
        self + Vec3::splat(delta)
    }
}
