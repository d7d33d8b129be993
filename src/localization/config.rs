//! Tunables for the particle filter engine

use std::time::Duration;

use crate::common::error::{invalid_config, LocalizationResult};
use crate::common::World;
use crate::localization::agent::{NoiseRange, NoiseRanges};
use crate::localization::likelihood::{HEADING_SIGMA, RANGE_SIGMA};
use crate::localization::resampling::ResamplingStrategy;

/// Default pause between the end of one cycle and the start of the next
pub const CYCLE_PERIOD: Duration = Duration::from_millis(150);

/// Configuration for the particle filter engine
#[derive(Debug, Clone, PartialEq)]
pub struct FilterConfig {
    /// World width; x lives in [0, width]
    pub width: f64,
    /// World height; y lives in [0, height]
    pub height: f64,
    /// Population size K, constant for the filter's lifetime
    pub n_particles: usize,
    /// Standard deviation of the per-landmark range likelihood
    pub range_sigma: f64,
    /// Standard deviation of the heading likelihood
    pub heading_sigma: f64,
    /// Ranges particle noise is seeded and re-seeded from
    pub particle_noise: NoiseRanges,
    /// Ranges the robot's fixed noise is drawn from, once
    pub robot_noise: NoiseRanges,
    /// Range the per-cycle travel distance is drawn from
    pub control_dist: NoiseRange,
    /// Range the per-cycle heading change is drawn from
    pub control_rot: NoiseRange,
    /// Pause between cycles when driven by the runner
    pub cycle_period: Duration,
    /// Index selection used during resampling
    pub resampling: ResamplingStrategy,
    /// Normalize theta after every motion step, not only on resampling
    pub normalize_heading_on_move: bool,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 400.0,
            n_particles: 800,
            range_sigma: RANGE_SIGMA,
            heading_sigma: HEADING_SIGMA,
            particle_noise: NoiseRanges::particle_default(),
            robot_noise: NoiseRanges::robot_default(),
            control_dist: NoiseRange::new(0.0, 4.0),
            control_rot: NoiseRange::symmetric(0.15),
            cycle_period: CYCLE_PERIOD,
            resampling: ResamplingStrategy::default(),
            normalize_heading_on_move: false,
            seed: None,
        }
    }
}

impl FilterConfig {
    pub fn new(width: f64, height: f64, n_particles: usize) -> Self {
        Self {
            width,
            height,
            n_particles,
            ..Self::default()
        }
    }

    pub fn world(&self) -> World {
        World::new(self.width, self.height)
    }

    pub fn with_sigmas(mut self, range_sigma: f64, heading_sigma: f64) -> Self {
        self.range_sigma = range_sigma;
        self.heading_sigma = heading_sigma;
        self
    }

    pub fn with_particle_noise(mut self, noise: NoiseRanges) -> Self {
        self.particle_noise = noise;
        self
    }

    pub fn with_robot_noise(mut self, noise: NoiseRanges) -> Self {
        self.robot_noise = noise;
        self
    }

    pub fn with_control_ranges(mut self, dist: NoiseRange, rot: NoiseRange) -> Self {
        self.control_dist = dist;
        self.control_rot = rot;
        self
    }

    pub fn with_cycle_period(mut self, period: Duration) -> Self {
        self.cycle_period = period;
        self
    }

    pub fn with_resampling(mut self, strategy: ResamplingStrategy) -> Self {
        self.resampling = strategy;
        self
    }

    pub fn with_heading_normalization(mut self, enabled: bool) -> Self {
        self.normalize_heading_on_move = enabled;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Reject anything the engine cannot start from
    pub fn validate(&self) -> LocalizationResult<()> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return invalid_config(format!("world width must be positive, got {}", self.width));
        }
        if !(self.height.is_finite() && self.height > 0.0) {
            return invalid_config(format!("world height must be positive, got {}", self.height));
        }
        if self.n_particles == 0 {
            return invalid_config("particle count must be at least 1");
        }
        if !(self.range_sigma.is_finite() && self.range_sigma > 0.0) {
            return invalid_config(format!("range sigma must be positive, got {}", self.range_sigma));
        }
        if !(self.heading_sigma.is_finite() && self.heading_sigma > 0.0) {
            return invalid_config(format!("heading sigma must be positive, got {}", self.heading_sigma));
        }
        if !self.particle_noise.is_valid() {
            return invalid_config(format!("bad particle noise ranges: {:?}", self.particle_noise));
        }
        if !self.robot_noise.is_valid() {
            return invalid_config(format!("bad robot noise ranges: {:?}", self.robot_noise));
        }
        if !self.control_dist.is_valid() || !self.control_rot.is_valid() {
            return invalid_config(format!(
                "bad control ranges: dist {:?}, rot {:?}",
                self.control_dist, self.control_rot
            ));
        }
        Ok(())
    }
}
