//! Configuration records for both generative engines.
//!
//! Every record derives serde and has a `Default` carrying the reference
//! parameters, so a TOML file only needs the values it changes:
//!
//! ```toml
//! [reaction_diffusion]
//! pattern_preset = "custom"
//! feed_rate = 0.030
//! kill_rate = 0.057
//!
//! [growth]
//! influence_radius = 20.0
//! kill_radius = 4.0
//! nearest = "brute_force"
//! ```

use crate::error::{PatternError, Result};
use serde::{Deserialize, Serialize};

/// Named `(feed_rate, kill_rate)` pairs for the Gray-Scott system.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternPreset {
    #[default]
    Spots,
    Stripes,
    Waves,
    Holes,
    /// Use the explicitly supplied rates.
    Custom,
}

impl PatternPreset {
    /// The fixed `(feed_rate, kill_rate)` pair, or `None` for [`PatternPreset::Custom`].
    pub const fn rates(self) -> Option<(f32, f32)> {
        match self {
            PatternPreset::Spots => Some((0.055, 0.062)),
            PatternPreset::Stripes => Some((0.035, 0.060)),
            PatternPreset::Waves => Some((0.014, 0.054)),
            PatternPreset::Holes => Some((0.039, 0.058)),
            PatternPreset::Custom => None,
        }
    }
}

/// Which [`crate::stencil::StencilBackend`] integrates the fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Sequential reference stencil.
    #[default]
    Reference,
    /// Row-parallel stencil on the rayon pool (`parallel` feature).
    Parallel,
}

/// Gray-Scott reaction-diffusion parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionDiffusionConfig {
    pub feed_rate: f32,
    pub kill_rate: f32,
    pub diffusion_u: f32,
    pub diffusion_v: f32,
    pub timestep: f32,
    pub pattern_preset: PatternPreset,
}

impl Default for ReactionDiffusionConfig {
    fn default() -> Self {
        Self {
            feed_rate: 0.055,
            kill_rate: 0.062,
            diffusion_u: 2e-5,
            diffusion_v: 1e-5,
            timestep: 1.0,
            pattern_preset: PatternPreset::Spots,
        }
    }
}

impl ReactionDiffusionConfig {
    /// Default parameters with the given preset.
    pub fn with_preset(preset: PatternPreset) -> Self {
        Self {
            pattern_preset: preset,
            ..Self::default()
        }
        .resolved()
    }

    /// Explicit rates under the [`PatternPreset::Custom`] tag.
    pub fn custom(feed_rate: f32, kill_rate: f32) -> Self {
        Self {
            feed_rate,
            kill_rate,
            pattern_preset: PatternPreset::Custom,
            ..Self::default()
        }
    }

    /// Effective `(feed_rate, kill_rate)`.
    ///
    /// Any named preset wins over the stored rates; only
    /// [`PatternPreset::Custom`] keeps them.
    pub fn rates(&self) -> (f32, f32) {
        self.pattern_preset
            .rates()
            .unwrap_or((self.feed_rate, self.kill_rate))
    }

    /// Copy with the effective rates written back into the record.
    pub fn resolved(mut self) -> Self {
        (self.feed_rate, self.kill_rate) = self.rates();
        self
    }

    pub fn validate(&self) -> Result<()> {
        let (feed, kill) = self.rates();
        ensure_finite_non_negative("feed_rate", feed)?;
        ensure_finite_non_negative("kill_rate", kill)?;
        ensure_finite_non_negative("diffusion_u", self.diffusion_u)?;
        ensure_finite_non_negative("diffusion_v", self.diffusion_v)?;
        ensure_positive("timestep", self.timestep)?;
        Ok(())
    }
}

/// How the growth engine finds the nearest node to a point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NearestSearch {
    /// Scan every node. O(attractors x nodes) per iteration.
    BruteForce,
    /// Bounded lookups in a uniform [`crate::spatial_grid::SpatialGrid`].
    #[default]
    Grid,
}

/// Space-colonization parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrowthConfig {
    /// Attractors farther than this from their nearest node are ignored.
    pub influence_radius: f32,
    /// Attractors closer than this to their nearest node are consumed.
    pub kill_radius: f32,
    /// Distance a new node is placed from its parent.
    pub step_size: f32,
    /// New nodes closer than `0.8 * min_node_spacing` to an existing node are rejected.
    pub min_node_spacing: f32,
    pub max_iterations: usize,
    pub nearest: NearestSearch,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            influence_radius: 16.0,
            kill_radius: 3.5,
            step_size: 1.8,
            min_node_spacing: 1.6,
            max_iterations: 2000,
            nearest: NearestSearch::Grid,
        }
    }
}

impl GrowthConfig {
    /// `kill_radius < influence_radius`, the convention growth relies on.
    pub fn radii_ordered(&self) -> bool {
        self.kill_radius < self.influence_radius
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive("influence_radius", self.influence_radius)?;
        ensure_positive("kill_radius", self.kill_radius)?;
        ensure_positive("step_size", self.step_size)?;
        ensure_finite_non_negative("min_node_spacing", self.min_node_spacing)?;
        if !self.radii_ordered() {
            return Err(PatternError::invalid_config(format!(
                "kill_radius ({}) must be smaller than influence_radius ({})",
                self.kill_radius, self.influence_radius
            )));
        }
        Ok(())
    }
}

/// Combined configuration file for both engines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub reaction_diffusion: ReactionDiffusionConfig,
    pub growth: GrowthConfig,
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        self.reaction_diffusion.validate()?;
        self.growth.validate()?;
        Ok(())
    }

    /// Parses and validates a TOML document.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config = toml::from_str::<Self>(content)?;
        config.validate()?;
        Ok(config)
    }
}

fn ensure_positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PatternError::invalid_config(format!(
            "{name} must be positive and finite, got {value}"
        )))
    }
}

fn ensure_finite_non_negative(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(PatternError::invalid_config(format!(
            "{name} must be non-negative and finite, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_configs_validate() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn default_growth_radii_are_ordered() {
        let cfg = GrowthConfig::default();
        assert!(cfg.kill_radius > 0.0);
        assert!(cfg.radii_ordered());
        assert!(cfg.step_size > 0.0);
        assert!(cfg.min_node_spacing > 0.0);
        assert!(cfg.max_iterations > 0);
    }

    #[test]
    fn named_preset_overrides_explicit_rates() {
        let cfg = ReactionDiffusionConfig {
            feed_rate: 0.01,
            kill_rate: 0.02,
            pattern_preset: PatternPreset::Stripes,
            ..Default::default()
        };
        assert_eq!(cfg.rates(), (0.035, 0.060));

        let resolved = cfg.resolved();
        assert_eq!(resolved.feed_rate, 0.035);
        assert_eq!(resolved.kill_rate, 0.060);
    }

    #[test]
    fn custom_keeps_explicit_rates() {
        let cfg = ReactionDiffusionConfig::custom(0.01, 0.02);
        assert_eq!(cfg.rates(), (0.01, 0.02));
        assert_eq!(cfg.resolved(), cfg);
    }

    #[test]
    fn preset_table() {
        assert_eq!(PatternPreset::Spots.rates(), Some((0.055, 0.062)));
        assert_eq!(PatternPreset::Waves.rates(), Some((0.014, 0.054)));
        assert_eq!(PatternPreset::Holes.rates(), Some((0.039, 0.058)));
        assert_eq!(PatternPreset::Custom.rates(), None);
    }

    #[test]
    fn validate_rejects_inverted_radii() {
        let cfg = GrowthConfig {
            kill_radius: 20.0,
            influence_radius: 10.0,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(PatternError::InvalidConfig(_))
        ));
    }

    #[test]
    fn validate_rejects_zero_timestep() {
        let cfg = ReactionDiffusionConfig {
            timestep: 0.0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn from_toml_fills_defaults() {
        let cfg = GeneratorConfig::from_toml(
            r#"
            [reaction_diffusion]
            pattern_preset = "custom"
            feed_rate = 0.03
            kill_rate = 0.057

            [growth]
            influence_radius = 20.0
            nearest = "brute_force"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.reaction_diffusion.rates(), (0.03, 0.057));
        assert_eq!(cfg.reaction_diffusion.timestep, 1.0);
        assert_eq!(cfg.growth.influence_radius, 20.0);
        assert_eq!(cfg.growth.kill_radius, 3.5);
        assert_eq!(cfg.growth.nearest, NearestSearch::BruteForce);
    }

    #[test]
    fn from_toml_rejects_unknown_preset() {
        let err = GeneratorConfig::from_toml(
            r#"
            [reaction_diffusion]
            pattern_preset = "zebra"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, PatternError::ConfigParse(_)));
    }

    #[test]
    fn from_toml_validates() {
        let err = GeneratorConfig::from_toml(
            r#"
            [growth]
            kill_radius = 30.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, PatternError::InvalidConfig(_)));
    }
}
