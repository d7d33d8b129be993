//! Common traits defining the seams of the localization engine

use crate::common::types::*;
use rand::Rng;

/// Trait for anything that can be propagated through the motion model
pub trait MotionModel {
    /// Apply one control step inside the given world, mutating in place
    fn apply_motion(&mut self, control: &ControlInput, world: &World);
}

/// Trait for predicting range readings from the current state
pub trait ObservationModel {
    /// Lazy readings, one per landmark, in landmark order
    type Readings<'a>: Iterator<Item = f64> + Clone
    where
        Self: 'a;

    /// Predict one range reading per landmark
    fn observe<'a>(&'a self, landmarks: &'a [Landmark]) -> Self::Readings<'a>;
}

/// Trait for turning a normalized weight distribution into selected indices
pub trait Resampler {
    /// Draw one index; `weights` must be normalized and non-empty
    fn select<R: Rng + ?Sized>(&self, weights: &[f64], rng: &mut R) -> usize;

    /// Draw `count` indices
    fn select_many<R: Rng + ?Sized>(&self, weights: &[f64], count: usize, rng: &mut R) -> Vec<usize> {
        (0..count).map(|_| self.select(weights, rng)).collect()
    }
}

/// Trait for estimators driven one discrete cycle at a time
pub trait StateEstimator {
    /// Immutable view published after each cycle
    type Snapshot;

    /// Run one full cycle to completion
    fn step(&mut self);

    /// Build a consistent snapshot of the current state
    fn snapshot(&self) -> Self::Snapshot;

    /// Number of completed cycles
    fn cycles(&self) -> u64;
}
