//! range_localization - particle filter localization from range readings
//!
//! A robot moves through a bounded 2D world and measures its distance to a
//! set of fixed landmarks. A population of weighted pose hypotheses is moved
//! with the robot's control input, scored against its readings and
//! resampled every cycle.

// Core modules
pub mod common;
pub mod utils;

// Algorithm modules
pub mod localization;

// Re-export common types for convenience
pub use common::{ControlInput, Landmark, Pose2D, World};
pub use common::{MotionModel, ObservationModel, Resampler, StateEstimator};
pub use common::{LocalizationError, LocalizationResult};
pub use localization::{FilterConfig, FilterRunner, FilterSnapshot, ParticleFilterEngine, RunnerOptions};
