//! Generative engines behind printable organic surfaces.
//!
//! Two independent engines produce raw pattern data for downstream mesh
//! builders:
//!
//! - [`gray_scott`] - Gray-Scott reaction-diffusion on a periodic grid,
//!   producing a scalar [`field::Field`] in `[0, 1]`.
//! - [`colonization`] - space-colonization growth, producing a node forest
//!   (positions plus parent links) and its branch-free polylines.
//!
//! Supporting modules:
//! - [`config`] - configuration records, presets and TOML loading.
//! - [`error`] - crate error type.
//! - [`stencil`] - sequential and data-parallel reaction-diffusion backends.
//! - [`attractor`] - attractor points and sets.
//! - [`tree`] - tree nodes, nearest-node scan and polyline extraction.
//! - [`influence_buffer`] - per-node pull accumulated during an iteration.
//! - [`spatial_grid`] - grid hash for bounded nearest-node queries.
//! - [`phases`] - the attraction and growth phases of one iteration.
//! - [`types`] - node ids and the [`types::Position`] point trait.

pub mod attractor;
pub mod colonization;
pub mod config;
pub mod error;
pub mod field;
pub mod gray_scott;
pub mod influence_buffer;
pub mod phases;
pub mod spatial_grid;
pub mod stencil;
pub mod tree;
pub mod types;

pub use colonization::{GrowthStats, GrowthStructure, SpaceColonization};
pub use config::{
    BackendKind, GeneratorConfig, GrowthConfig, NearestSearch, PatternPreset,
    ReactionDiffusionConfig,
};
pub use error::{PatternError, Result};
pub use field::Field;
pub use gray_scott::{GrayScott, generate_pattern};
