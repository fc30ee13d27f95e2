//! Gray-Scott reaction-diffusion on a periodic grid.
//!
//! The engine owns the `(U, V)` concentration pair plus a second pair of
//! scratch buffers. Each [`GrayScott::step`] reads the current pair, lets
//! the configured [`StencilBackend`] write the advanced values into the
//! scratch pair, then swaps. Callers may stop between any two steps.

use crate::config::{BackendKind, ReactionDiffusionConfig};
use crate::error::{PatternError, Result};
use crate::field::Field;
use crate::stencil::{StencilBackend, StepParams, create_backend};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;
use tracing::{debug, info, trace};

/// Steps between progress callbacks when the caller has no preference.
pub const DEFAULT_CALLBACK_INTERVAL: usize = 100;

/// Concentration of `U` written into every seed patch.
pub const SEED_U: f32 = 0.5;
/// Concentration of `V` written into every seed patch.
pub const SEED_V: f32 = 0.25;

/// Reaction-diffusion simulator.
///
/// ### Example
/// ```
/// use pattern_core::config::{BackendKind, PatternPreset, ReactionDiffusionConfig};
/// use pattern_core::gray_scott::GrayScott;
///
/// let cfg = ReactionDiffusionConfig::with_preset(PatternPreset::Spots);
/// let mut sim = GrayScott::new(32, cfg, BackendKind::Reference).unwrap();
/// sim.initialize_random(1, Some(42));
/// let v = sim.run(100);
/// assert_eq!(v.shape(), (32, 32));
/// ```
pub struct GrayScott {
    config: ReactionDiffusionConfig,
    params: StepParams,
    u: Field,
    v: Field,
    u_next: Field,
    v_next: Field,
    backend: Box<dyn StencilBackend>,
    steps_taken: usize,
}

impl fmt::Debug for GrayScott {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrayScott")
            .field("shape", &self.u.shape())
            .field("config", &self.config)
            .field("backend", &self.backend.name())
            .field("steps_taken", &self.steps_taken)
            .finish()
    }
}

impl GrayScott {
    /// Creates a square `resolution x resolution` simulator with `U = 1`, `V = 0`.
    pub fn new(
        resolution: usize,
        config: ReactionDiffusionConfig,
        backend: BackendKind,
    ) -> Result<Self> {
        Self::with_shape(resolution, resolution, config, backend)
    }

    /// Creates a `rows x cols` simulator with `U = 1`, `V = 0`.
    ///
    /// The preset in `config` is resolved here; the stored configuration
    /// always carries the effective feed and kill rates.
    ///
    /// ### Errors
    /// - [`PatternError::InvalidConfig`] for an empty grid or out-of-range parameters.
    /// - [`PatternError::BackendUnavailable`] if `backend` is not compiled in.
    pub fn with_shape(
        rows: usize,
        cols: usize,
        config: ReactionDiffusionConfig,
        backend: BackendKind,
    ) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(PatternError::invalid_config(format!(
                "grid must be non-empty, got {rows}x{cols}"
            )));
        }
        config.validate()?;
        let backend = create_backend(backend)?;
        let config = config.resolved();

        debug!(
            rows,
            cols,
            feed = config.feed_rate,
            kill = config.kill_rate,
            preset = ?config.pattern_preset,
            backend = backend.name(),
            "created reaction-diffusion grid"
        );

        Ok(Self {
            params: StepParams::from(&config),
            config,
            u: Field::filled(rows, cols, 1.0),
            v: Field::filled(rows, cols, 0.0),
            u_next: Field::filled(rows, cols, 1.0),
            v_next: Field::filled(rows, cols, 0.0),
            backend,
            steps_taken: 0,
        })
    }

    /// Effective configuration, preset already resolved.
    pub fn config(&self) -> &ReactionDiffusionConfig {
        &self.config
    }

    /// `(rows, cols)` of both fields.
    pub fn shape(&self) -> (usize, usize) {
        self.u.shape()
    }

    /// Side length of a square grid (the row count for rectangular ones).
    pub fn resolution(&self) -> usize {
        self.u.rows()
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Total steps executed since construction.
    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// Stamps `n_seeds` square perturbation patches onto the fields.
    ///
    /// Patch centres are drawn per axis from `[n/4, 3n/4)` in a ChaCha8
    /// stream seeded with `seed`; each patch covers `[c - r, c + r)` with
    /// `r = max(2, min(rows, cols) / 20)` and sets `U = 0.5`, `V = 0.25`.
    /// Overlaps overwrite rather than accumulate. With `seed = None` a
    /// fresh seed is drawn and logged.
    pub fn initialize_random(&mut self, n_seeds: usize, seed: Option<u64>) {
        let seed = seed.unwrap_or_else(|| rand::rng().random());
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let (rows, cols) = self.shape();
        let r = (rows.min(cols) / 20).max(2);

        for _ in 0..n_seeds {
            let cr = centre_in_middle_half(&mut rng, rows);
            let cc = centre_in_middle_half(&mut rng, cols);

            let row_span = cr.saturating_sub(r)..cr + r;
            let col_span = cc.saturating_sub(r)..cc + r;
            self.u.fill_rect(row_span.clone(), col_span.clone(), SEED_U);
            self.v.fill_rect(row_span, col_span, SEED_V);
        }

        debug!(n_seeds, seed, half_width = r, "seeded reaction-diffusion grid");
    }

    /// Replaces both fields wholesale.
    ///
    /// ### Errors
    /// [`PatternError::ShapeMismatch`] if either field's shape differs from
    /// the grid's. The current state is untouched on error.
    pub fn initialize_custom(&mut self, u0: Field, v0: Field) -> Result<()> {
        let expected = self.shape();
        for (name, field) in [("U", &u0), ("V", &v0)] {
            if field.shape() != expected {
                return Err(PatternError::ShapeMismatch {
                    field: name,
                    expected,
                    actual: field.shape(),
                });
            }
        }
        self.u = u0;
        self.v = v0;
        debug!(rows = expected.0, cols = expected.1, "installed custom fields");
        Ok(())
    }

    /// Advances both fields by one timestep.
    pub fn step(&mut self) {
        self.backend.step(
            &self.params,
            &self.u,
            &self.v,
            &mut self.u_next,
            &mut self.v_next,
        );
        std::mem::swap(&mut self.u, &mut self.u_next);
        std::mem::swap(&mut self.v, &mut self.v_next);
        self.steps_taken += 1;
    }

    /// Runs `steps` steps and returns a copy of the final `V` field.
    pub fn run(&mut self, steps: usize) -> Field {
        for _ in 0..steps {
            self.step();
        }
        self.log_run(steps);
        self.v.clone()
    }

    /// Runs `steps` steps, calling `callback(step, &V)` after every
    /// `interval`-th step of this run, and returns a copy of the final `V`.
    ///
    /// The callback sees steps `interval, 2 * interval, ...` up to the
    /// largest multiple not exceeding `steps`.
    ///
    /// ### Errors
    /// [`PatternError::InvalidConfig`] if `interval` is zero.
    pub fn run_with<F>(&mut self, steps: usize, interval: usize, mut callback: F) -> Result<Field>
    where
        F: FnMut(usize, &Field),
    {
        if interval == 0 {
            return Err(PatternError::invalid_config(
                "callback interval must be at least 1",
            ));
        }
        for i in 1..=steps {
            self.step();
            if i % interval == 0 {
                trace!(step = i, "reaction-diffusion progress");
                callback(i, &self.v);
            }
        }
        self.log_run(steps);
        Ok(self.v.clone())
    }

    /// Copies of `(U, V)`.
    pub fn state(&self) -> (Field, Field) {
        (self.u.clone(), self.v.clone())
    }

    fn log_run(&self, steps: usize) {
        let (v_min, v_max) = self.v.min_max().unwrap_or((0.0, 0.0));
        info!(
            steps,
            total_steps = self.steps_taken,
            v_min,
            v_max,
            v_mean = self.v.mean(),
            "reaction-diffusion run complete"
        );
    }
}

fn centre_in_middle_half(rng: &mut impl Rng, n: usize) -> usize {
    let (lo, hi) = (n / 4, 3 * n / 4);
    if lo < hi { rng.random_range(lo..hi) } else { lo }
}

/// Seeds a reference-backend grid, runs it and returns the final `(U, V)`.
pub fn generate_pattern(
    rows: usize,
    cols: usize,
    steps: usize,
    config: &ReactionDiffusionConfig,
    seed: u64,
    n_seeds: usize,
) -> Result<(Field, Field)> {
    let mut sim = GrayScott::with_shape(rows, cols, *config, BackendKind::Reference)?;
    sim.initialize_random(n_seeds, Some(seed));
    sim.run(steps);
    Ok(sim.state())
}
