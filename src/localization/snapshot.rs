//! Published filter state and the handle-swap slot consumers read it from
//!
//! The engine owns its population exclusively. After each cycle it builds
//! an immutable `FilterSnapshot` and swaps it into a shared slot; readers
//! clone the current handle and never see a half-written population.

use std::sync::{Arc, RwLock};

use nalgebra::Vector2;
use ordered_float::OrderedFloat;

use crate::common::{Landmark, Pose2D};
use crate::localization::agent::Agent;
use crate::localization::resampling::{effective_sample_size, normalize_weights};

/// Stage of the sample -> weight -> resample cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterPhase {
    Idle,
    Sampling,
    Weighting,
    Resampling,
}

/// What a consumer needs to draw one particle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleView {
    pub pose: Pose2D,
    pub weight: f64,
    pub color: &'static str,
}

impl From<&Agent> for ParticleView {
    fn from(agent: &Agent) -> Self {
        ParticleView {
            pose: agent.pose,
            weight: agent.weight,
            color: agent.color,
        }
    }
}

/// Population summary
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoseEstimate {
    /// Weighted mean position with circular mean heading
    pub mean: Pose2D,
    /// Pose of the heaviest particle
    pub best: Pose2D,
    pub best_weight: f64,
    pub effective_sample_size: f64,
}

impl PoseEstimate {
    /// Summarize a population; `None` if it is empty
    pub fn from_particles(particles: &[Agent]) -> Option<PoseEstimate> {
        let best = particles.iter().max_by_key(|p| OrderedFloat(p.weight))?;

        let raw: Vec<f64> = particles.iter().map(|p| p.weight).collect();
        let normalized = normalize_weights(&raw).weights;

        let mut position = Vector2::<f64>::zeros();
        let mut heading = Vector2::<f64>::zeros();
        for (particle, w) in particles.iter().zip(&normalized) {
            position += particle.pose.position() * *w;
            heading += Vector2::new(particle.pose.theta.cos(), particle.pose.theta.sin()) * *w;
        }

        Some(PoseEstimate {
            mean: Pose2D::new(position[0], position[1], heading[1].atan2(heading[0])),
            best: best.pose,
            best_weight: best.weight,
            effective_sample_size: effective_sample_size(&normalized),
        })
    }

    /// Distance from the mean estimate to a reference pose
    pub fn position_error(&self, truth: &Pose2D) -> f64 {
        (self.mean.position() - truth.position()).norm()
    }
}

/// Immutable state published after each cycle
#[derive(Debug, Clone)]
pub struct FilterSnapshot {
    pub cycle: u64,
    pub phase: FilterPhase,
    pub robot: Pose2D,
    pub particles: Vec<ParticleView>,
    pub landmarks: Arc<[Landmark]>,
    pub estimate: Option<PoseEstimate>,
    /// Weights all collapsed to zero and the uniform fallback was used
    pub degenerate_weights: bool,
}

impl FilterSnapshot {
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

/// Create a connected publisher/reader pair seeded with `initial`
pub fn snapshot_channel(initial: FilterSnapshot) -> (SnapshotPublisher, SnapshotReader) {
    let slot = Arc::new(RwLock::new(Arc::new(initial)));
    (
        SnapshotPublisher { slot: Arc::clone(&slot) },
        SnapshotReader { slot },
    )
}

/// Write side, held by the estimation loop
#[derive(Debug)]
pub struct SnapshotPublisher {
    slot: Arc<RwLock<Arc<FilterSnapshot>>>,
}

impl SnapshotPublisher {
    /// Swap in a completed snapshot; the lock covers only the handle swap
    pub fn publish(&self, snapshot: FilterSnapshot) {
        let next = Arc::new(snapshot);
        // The slot only ever holds a whole handle, so a poisoned lock
        // still guards a consistent value.
        let mut guard = self.slot.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = next;
    }

    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader { slot: Arc::clone(&self.slot) }
    }
}

/// Read side, cheap to clone and share across consumer threads
#[derive(Debug, Clone)]
pub struct SnapshotReader {
    slot: Arc<RwLock<Arc<FilterSnapshot>>>,
}

impl SnapshotReader {
    /// Most recently published snapshot
    pub fn latest(&self) -> Arc<FilterSnapshot> {
        let guard = self.slot.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&*guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::localization::agent::NoiseProfile;
    use std::f64::consts::PI;
    use std::thread;

    fn agent(x: f64, y: f64, theta: f64, weight: f64) -> Agent {
        let mut a = Agent::new(Pose2D::new(x, y, theta), NoiseProfile::zero(), "pink");
        a.weight = weight;
        a
    }

    fn snapshot(cycle: u64, n: usize) -> FilterSnapshot {
        FilterSnapshot {
            cycle,
            phase: FilterPhase::Idle,
            robot: Pose2D::origin(),
            particles: vec![ParticleView::from(&agent(cycle as f64, 0.0, 0.0, 1.0)); n],
            landmarks: Arc::from(vec![Landmark::new(1.0, 1.0)]),
            estimate: None,
            degenerate_weights: false,
        }
    }

    #[test]
    fn test_estimate_weighted_mean() {
        let particles = vec![agent(0.0, 0.0, 0.0, 1.0), agent(10.0, 20.0, 0.0, 3.0)];
        let est = PoseEstimate::from_particles(&particles).unwrap();
        assert!((est.mean.x - 7.5).abs() < 1e-10);
        assert!((est.mean.y - 15.0).abs() < 1e-10);
        assert_eq!(est.best, Pose2D::new(10.0, 20.0, 0.0));
        assert_eq!(est.best_weight, 3.0);
    }

    #[test]
    fn test_estimate_heading_wraps_around_pi() {
        let particles = vec![agent(0.0, 0.0, PI - 0.1, 1.0), agent(0.0, 0.0, -PI + 0.1, 1.0)];
        let est = PoseEstimate::from_particles(&particles).unwrap();
        assert!((est.mean.theta.abs() - PI).abs() < 1e-9);
    }

    #[test]
    fn test_estimate_zero_weights_uses_uniform() {
        let particles = vec![agent(0.0, 0.0, 0.0, 0.0), agent(4.0, 8.0, 0.0, 0.0)];
        let est = PoseEstimate::from_particles(&particles).unwrap();
        assert!((est.mean.x - 2.0).abs() < 1e-10);
        assert!((est.effective_sample_size - 2.0).abs() < 1e-10);
    }

    #[test]
    fn test_estimate_empty_population() {
        assert!(PoseEstimate::from_particles(&[]).is_none());
    }

    #[test]
    fn test_publish_replaces_latest() {
        let (publisher, reader) = snapshot_channel(snapshot(0, 3));
        let held = reader.latest();
        publisher.publish(snapshot(1, 3));
        assert_eq!(held.cycle, 0);
        assert_eq!(reader.latest().cycle, 1);
        assert_eq!(publisher.reader().latest().cycle, 1);
    }

    #[test]
    fn test_concurrent_readers_never_see_torn_snapshot() {
        let (publisher, reader) = snapshot_channel(snapshot(0, 50));
        let consumers: Vec<_> = (0..3)
            .map(|_| {
                let reader = reader.clone();
                thread::spawn(move || {
                    for _ in 0..2000 {
                        let snap = reader.latest();
                        let x = snap.cycle as f64;
                        assert_eq!(snap.len(), 50);
                        assert!(snap.particles.iter().all(|p| p.pose.x == x));
                    }
                })
            })
            .collect();
        for cycle in 1..500 {
            publisher.publish(snapshot(cycle, 50));
        }
        for c in consumers {
            c.join().unwrap();
        }
    }
}
