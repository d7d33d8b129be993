//! Gaussian measurement likelihood

use itertools::Itertools;
use std::f64::consts::PI;

/// Default standard deviation for range readings [distance units]
pub const RANGE_SIGMA: f64 = 15.0;
/// Default standard deviation for the heading term, applied linearly to theta
pub const HEADING_SIGMA: f64 = 30.0;

/// Gaussian probability density of `x` under N(mu, sigma^2)
pub fn gaussian(mu: f64, sigma: f64, x: f64) -> f64 {
    (-(mu - x).powi(2) / (2.0 * sigma.powi(2))).exp() / (2.0 * PI * sigma.powi(2)).sqrt()
}

/// Scores a particle's predicted readings against the robot's readings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LikelihoodModel {
    pub range_sigma: f64,
    pub heading_sigma: f64,
}

impl LikelihoodModel {
    pub fn new(range_sigma: f64, heading_sigma: f64) -> Self {
        Self { range_sigma, heading_sigma }
    }

    /// Unnormalized weight: product of per-landmark range densities times
    /// one heading density. Zero or underflowed results are legal.
    ///
    /// Panics if the two reading sequences differ in length.
    pub fn score<I, J>(&self, robot_readings: I, particle_readings: J, robot_theta: f64, particle_theta: f64) -> f64
    where
        I: IntoIterator<Item = f64>,
        J: IntoIterator<Item = f64>,
    {
        let range_term: f64 = robot_readings
            .into_iter()
            .zip_eq(particle_readings)
            .map(|(expected, predicted)| gaussian(expected, self.range_sigma, predicted))
            .product();

        range_term * gaussian(robot_theta, self.heading_sigma, particle_theta)
    }
}

impl Default for LikelihoodModel {
    fn default() -> Self {
        Self::new(RANGE_SIGMA, HEADING_SIGMA)
    }
}
