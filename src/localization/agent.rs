//! Agent motion and observation model
//!
//! The robot and every particle are `Agent`s: a pose, a per-agent noise
//! profile, a weight and a display color. Noise is a set of scalar offsets,
//! not per-axis draws: the same linear offset is added to both x and y, and
//! the same measurement offset is added to every range reading.

use rand::Rng;
use rand_distr::{Distribution, Uniform};

use crate::common::{normalize_angle, ControlInput, Landmark, MotionModel, ObservationModel, Pose2D, World};

/// Closed interval a noise offset is drawn from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseRange {
    pub low: f64,
    pub high: f64,
}

impl NoiseRange {
    pub fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Range [-magnitude, magnitude]
    pub fn symmetric(magnitude: f64) -> Self {
        Self { low: -magnitude, high: magnitude }
    }

    pub fn zero() -> Self {
        Self { low: 0.0, high: 0.0 }
    }

    pub fn is_valid(&self) -> bool {
        self.low.is_finite() && self.high.is_finite() && self.low <= self.high
    }

    pub fn contains(&self, value: f64) -> bool {
        (self.low..=self.high).contains(&value)
    }

    /// Uniform draw from the interval; callers validate the bounds first
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        Uniform::new_inclusive(self.low, self.high).sample(rng)
    }
}

/// Ranges for the three per-agent noise offsets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseRanges {
    pub linear: NoiseRange,
    pub angular: NoiseRange,
    pub measurement: NoiseRange,
}

impl NoiseRanges {
    pub fn new(linear: NoiseRange, angular: NoiseRange, measurement: NoiseRange) -> Self {
        Self { linear, angular, measurement }
    }

    /// Ranges particles are seeded and re-seeded from
    pub fn particle_default() -> Self {
        Self {
            linear: NoiseRange::symmetric(1.0),
            angular: NoiseRange::symmetric(0.15),
            measurement: NoiseRange::symmetric(1.0),
        }
    }

    /// Ranges the robot's fixed profile is drawn from
    pub fn robot_default() -> Self {
        Self {
            linear: NoiseRange::symmetric(0.5),
            angular: NoiseRange::symmetric(0.03),
            measurement: NoiseRange::symmetric(2.0),
        }
    }

    /// All ranges collapsed to zero; used for deterministic runs
    pub fn zero() -> Self {
        Self {
            linear: NoiseRange::zero(),
            angular: NoiseRange::zero(),
            measurement: NoiseRange::zero(),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.linear.is_valid() && self.angular.is_valid() && self.measurement.is_valid()
    }

    /// Draw an independent offset for each component
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> NoiseProfile {
        NoiseProfile {
            linear: self.linear.sample(rng),
            angular: self.angular.sample(rng),
            measurement: self.measurement.sample(rng),
        }
    }
}

/// Per-agent perturbation magnitudes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseProfile {
    pub linear: f64,
    pub angular: f64,
    pub measurement: f64,
}

impl NoiseProfile {
    pub fn new(linear: f64, angular: f64, measurement: f64) -> Self {
        Self { linear, angular, measurement }
    }

    pub fn zero() -> Self {
        Self { linear: 0.0, angular: 0.0, measurement: 0.0 }
    }
}

/// Robot or particle
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub pose: Pose2D,
    pub noise: NoiseProfile,
    pub weight: f64,
    pub color: &'static str,
}

impl Agent {
    pub fn new(pose: Pose2D, noise: NoiseProfile, color: &'static str) -> Self {
        Agent {
            pose,
            noise,
            weight: 0.0,
            color,
        }
    }

    /// Move by `dist` along the noisy heading, then turn by `rot`.
    ///
    /// The heading used for translation is normalized; the stored heading
    /// after `theta += rot` is not.
    pub fn move_by(&mut self, dist: f64, rot: f64, world: &World) {
        let angle = normalize_angle(self.pose.theta + self.noise.angular);

        let new_x = self.pose.x + (dist * angle.cos() + self.noise.linear);
        let new_y = self.pose.y + (dist * angle.sin() + self.noise.linear);

        self.pose.x = world.wrap_x(new_x);
        self.pose.y = world.wrap_y(new_y);
        self.pose.theta += rot;
    }

    /// Successor built during resampling, before its noise is re-seeded.
    ///
    /// Reuses this agent's current noise offsets for the jitter.
    pub fn successor(&self) -> Agent {
        Agent {
            pose: Pose2D::new(
                self.pose.x + self.noise.linear,
                self.pose.y + self.noise.linear,
                normalize_angle(self.pose.theta + self.noise.angular),
            ),
            noise: self.noise,
            weight: self.weight,
            color: self.color,
        }
    }
}

impl MotionModel for Agent {
    fn apply_motion(&mut self, control: &ControlInput, world: &World) {
        self.move_by(control.dist, control.rot, world);
    }
}

impl ObservationModel for Agent {
    type Readings<'a> = Observations<'a>;

    fn observe<'a>(&'a self, landmarks: &'a [Landmark]) -> Observations<'a> {
        Observations {
            pose: self.pose,
            offset: self.noise.measurement,
            landmarks: landmarks.iter(),
        }
    }
}

/// Lazy range readings from one pose; clone it to restart
#[derive(Debug, Clone)]
pub struct Observations<'a> {
    pose: Pose2D,
    offset: f64,
    landmarks: std::slice::Iter<'a, Landmark>,
}

impl Iterator for Observations<'_> {
    type Item = f64;

    fn next(&mut self) -> Option<f64> {
        self.landmarks
            .next()
            .map(|landmark| self.pose.range_to(landmark) + self.offset)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.landmarks.size_hint()
    }
}

impl ExactSizeIterator for Observations<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::f64::consts::PI;

    fn world() -> World {
        World::new(900.0, 400.0)
    }

    #[test]
    fn test_move_straight_without_noise() {
        let mut agent = Agent::new(Pose2D::new(100.0, 100.0, 0.0), NoiseProfile::zero(), "red");
        agent.move_by(4.0, 0.1, &world());
        assert!((agent.pose.x - 104.0).abs() < 1e-10);
        assert!((agent.pose.y - 100.0).abs() < 1e-10);
        assert!((agent.pose.theta - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_move_adds_same_linear_noise_to_both_axes() {
        let noise = NoiseProfile::new(0.75, 0.0, 0.0);
        let mut agent = Agent::new(Pose2D::new(50.0, 60.0, PI / 2.0), noise, "pink");
        agent.move_by(2.0, 0.0, &world());
        assert!((agent.pose.x - 50.75).abs() < 1e-9);
        assert!((agent.pose.y - 62.75).abs() < 1e-9);
    }

    #[test]
    fn test_move_uses_angular_noise_for_translation_only() {
        let noise = NoiseProfile::new(0.0, PI / 2.0, 0.0);
        let mut agent = Agent::new(Pose2D::new(10.0, 10.0, 0.0), noise, "pink");
        agent.move_by(3.0, 0.0, &world());
        assert!((agent.pose.x - 10.0).abs() < 1e-9);
        assert!((agent.pose.y - 13.0).abs() < 1e-9);
        assert_eq!(agent.pose.theta, 0.0);
    }

    #[test]
    fn test_move_does_not_normalize_rotation() {
        let mut agent = Agent::new(Pose2D::new(10.0, 10.0, PI - 0.01), NoiseProfile::zero(), "pink");
        agent.move_by(0.0, 0.1, &world());
        assert!(agent.pose.theta > PI);
    }

    #[test]
    fn test_move_wraps_past_right_edge_to_zero() {
        let mut agent = Agent::new(Pose2D::new(899.0, 200.0, 0.0), NoiseProfile::zero(), "pink");
        agent.move_by(4.0, 0.0, &world());
        assert_eq!(agent.pose.x, 0.0);
        assert!((agent.pose.y - 200.0).abs() < 1e-10);
    }

    #[test]
    fn test_move_wraps_below_zero_to_bound() {
        let mut agent = Agent::new(Pose2D::new(1.0, 1.0, -PI / 2.0), NoiseProfile::zero(), "pink");
        agent.move_by(4.0, 0.0, &world());
        assert_eq!(agent.pose.y, 400.0);

        let mut agent = Agent::new(Pose2D::new(1.0, 1.0, PI), NoiseProfile::zero(), "pink");
        agent.move_by(4.0, 0.0, &world());
        assert_eq!(agent.pose.x, 900.0);
    }

    #[test]
    fn test_observe_one_reading_per_landmark_in_order() {
        let landmarks = vec![
            Landmark::new(3.0, 4.0),
            Landmark::new(0.0, 10.0),
            Landmark::new(6.0, 8.0),
        ];
        let agent = Agent::new(Pose2D::origin(), NoiseProfile::zero(), "pink");
        let readings: Vec<f64> = agent.observe(&landmarks).collect();
        assert_eq!(readings.len(), 3);
        assert!((readings[0] - 5.0).abs() < 1e-10);
        assert!((readings[1] - 10.0).abs() < 1e-10);
        assert!((readings[2] - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_observe_adds_same_offset_and_restarts() {
        let landmarks = vec![Landmark::new(3.0, 4.0), Landmark::new(0.0, 10.0)];
        let agent = Agent::new(Pose2D::origin(), NoiseProfile::new(0.0, 0.0, -1.5), "pink");
        let readings = agent.observe(&landmarks);
        assert_eq!(readings.len(), 2);
        let first: Vec<f64> = readings.clone().collect();
        let second: Vec<f64> = readings.collect();
        assert_eq!(first, second);
        assert!((first[0] - 3.5).abs() < 1e-10);
        assert!((first[1] - 8.5).abs() < 1e-10);
    }

    #[test]
    fn test_successor_reuses_noise_and_normalizes_heading() {
        let noise = NoiseProfile::new(0.5, 0.2, 0.1);
        let mut agent = Agent::new(Pose2D::new(10.0, 20.0, PI - 0.1), noise, "pink");
        agent.weight = 0.25;
        let next = agent.successor();
        assert!((next.pose.x - 10.5).abs() < 1e-12);
        assert!((next.pose.y - 20.5).abs() < 1e-12);
        assert!((next.pose.theta - (-PI + 0.1)).abs() < 1e-9);
        assert_eq!(next.weight, 0.25);
        assert_eq!(next.color, "pink");
        assert_eq!(next.noise, noise);
    }

    #[test]
    fn test_noise_draws_stay_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let ranges = NoiseRanges::particle_default();
        for _ in 0..500 {
            let n = ranges.draw(&mut rng);
            assert!(ranges.linear.contains(n.linear));
            assert!(ranges.angular.contains(n.angular));
            assert!(ranges.measurement.contains(n.measurement));
        }
    }

    #[test]
    fn test_zero_noise_range_draws_zero() {
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(NoiseRanges::zero().draw(&mut rng), NoiseProfile::zero());
    }

    #[test]
    fn test_noise_range_validity() {
        assert!(NoiseRange::symmetric(1.0).is_valid());
        assert!(NoiseRange::zero().is_valid());
        assert!(!NoiseRange::new(1.0, -1.0).is_valid());
        assert!(!NoiseRange::new(f64::NAN, 1.0).is_valid());
    }
}
