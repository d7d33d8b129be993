// Range-only particle filter localization

pub mod agent;
pub mod config;
pub mod likelihood;
pub mod particle_filter;
pub mod resampling;
pub mod runner;
pub mod snapshot;

// Re-exports
pub use agent::{Agent, NoiseProfile, NoiseRange, NoiseRanges, Observations};
pub use config::{FilterConfig, CYCLE_PERIOD};
pub use likelihood::{gaussian, LikelihoodModel, HEADING_SIGMA, RANGE_SIGMA};
pub use particle_filter::ParticleFilterEngine;
pub use resampling::{effective_sample_size, normalize_weights, NormalizedWeights, ResamplingStrategy};
pub use runner::{FilterHandle, FilterRunner, RunnerOptions};
pub use snapshot::{
    snapshot_channel, FilterPhase, FilterSnapshot, ParticleView, PoseEstimate, SnapshotPublisher,
    SnapshotReader,
};
