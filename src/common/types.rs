//! Common types used throughout range_localization

use nalgebra::Vector2;
use std::f64::consts::PI;

/// Wrap an angle into the half-open interval (-pi, pi]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(2.0 * PI);
    if wrapped > PI {
        wrapped - 2.0 * PI
    } else {
        wrapped
    }
}

/// Fixed landmark with a known position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }
}

/// 2D pose (position + heading)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose2D {
    pub x: f64,
    pub y: f64,
    pub theta: f64,
}

impl Pose2D {
    pub fn new(x: f64, y: f64, theta: f64) -> Self {
        Self { x, y, theta }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0, theta: 0.0 }
    }

    pub fn position(&self) -> Vector2<f64> {
        Vector2::new(self.x, self.y)
    }

    /// Euclidean distance from this pose's position to a landmark
    pub fn range_to(&self, landmark: &Landmark) -> f64 {
        (landmark.to_vector() - self.position()).norm()
    }

    /// Normalize theta to (-pi, pi]
    pub fn normalize_theta(&mut self) {
        self.theta = normalize_angle(self.theta);
    }
}

/// Control input shared by the robot and all particles within one cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlInput {
    pub dist: f64, // linear distance travelled
    pub rot: f64,  // heading change
}

impl ControlInput {
    pub fn new(dist: f64, rot: f64) -> Self {
        Self { dist, rot }
    }

    pub fn zero() -> Self {
        Self { dist: 0.0, rot: 0.0 }
    }
}

/// Bounded toroidal world the agents move in
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct World {
    pub width: f64,
    pub height: f64,
}

impl World {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height / 2.0)
    }

    /// Teleport a coordinate that left [0, bound] to the opposite edge.
    ///
    /// Not a modulo wrap: anything above `bound` becomes 0 and anything
    /// below 0 becomes `bound`, however far out it was.
    pub fn wrap_coordinate(value: f64, bound: f64) -> f64 {
        if value > bound {
            0.0
        } else if value < 0.0 {
            bound
        } else {
            value
        }
    }

    pub fn wrap_x(&self, x: f64) -> f64 {
        Self::wrap_coordinate(x, self.width)
    }

    pub fn wrap_y(&self, y: f64) -> f64 {
        Self::wrap_coordinate(y, self.height)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y)
    }
}
