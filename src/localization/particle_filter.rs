//! Particle filter localization against fixed range-only landmarks
//!
//! One cycle is sample -> weight -> resample:
//! 1. draw a shared control input and move the robot and every particle
//!    with it, each through its own noise profile;
//! 2. score every particle's predicted ranges against the robot's ranges;
//! 3. normalize, draw K indices, jitter the selected particles with their
//!    old noise and give every survivor fresh noise.

use std::f64::consts::PI;
use std::sync::Arc;

use log::{debug, info, trace, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::error::{invalid_config, LocalizationResult};
use crate::common::{
    normalize_angle, ControlInput, Landmark, MotionModel, ObservationModel, Pose2D, Resampler,
    StateEstimator, World,
};
use crate::localization::agent::Agent;
use crate::localization::config::FilterConfig;
use crate::localization::likelihood::LikelihoodModel;
use crate::localization::resampling::{effective_sample_size, normalize_weights};
use crate::localization::snapshot::{FilterPhase, FilterSnapshot, ParticleView, PoseEstimate};
use crate::utils::colors;

/// Particle filter engine; owns the robot and the population exclusively
pub struct ParticleFilterEngine {
    config: FilterConfig,
    world: World,
    landmarks: Arc<[Landmark]>,
    robot: Agent,
    particles: Vec<Agent>,
    likelihood: LikelihoodModel,
    rng: StdRng,
    phase: FilterPhase,
    cycle: u64,
    degenerate_weights: bool,
    effective_particles: f64,
    best_weight: f64,
}

impl ParticleFilterEngine {
    /// Build the robot at the world centre and spread K particles over the world
    pub fn new(config: FilterConfig, landmarks: Vec<Landmark>) -> LocalizationResult<Self> {
        config.validate()?;
        Self::check_landmarks(&landmarks)?;

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let world = config.world();
        let (cx, cy) = world.center();
        let robot = Agent::new(
            Pose2D::new(cx, cy, 0.0),
            config.robot_noise.draw(&mut rng),
            colors::ROBOT,
        );
        let particles = Self::create_particles(&config, &landmarks, &mut rng);

        info!(
            "particle filter ready: world {}x{}, {} landmarks, {} particles",
            config.width,
            config.height,
            landmarks.len(),
            particles.len()
        );

        Ok(Self::assemble(config, landmarks, robot, particles, rng))
    }

    /// Start from a prepared robot and population
    pub fn from_parts(
        config: FilterConfig,
        landmarks: Vec<Landmark>,
        robot: Agent,
        particles: Vec<Agent>,
    ) -> LocalizationResult<Self> {
        config.validate()?;
        Self::check_landmarks(&landmarks)?;
        if particles.len() != config.n_particles {
            return invalid_config(format!(
                "expected {} particles, got {}",
                config.n_particles,
                particles.len()
            ));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self::assemble(config, landmarks, robot, particles, rng))
    }

    fn assemble(
        config: FilterConfig,
        landmarks: Vec<Landmark>,
        robot: Agent,
        particles: Vec<Agent>,
        rng: StdRng,
    ) -> Self {
        let likelihood = LikelihoodModel::new(config.range_sigma, config.heading_sigma);
        let effective_particles = particles.len() as f64;
        ParticleFilterEngine {
            world: config.world(),
            landmarks: Arc::from(landmarks),
            robot,
            particles,
            likelihood,
            rng,
            phase: FilterPhase::Idle,
            cycle: 0,
            degenerate_weights: false,
            effective_particles,
            best_weight: 0.0,
            config,
        }
    }

    fn check_landmarks(landmarks: &[Landmark]) -> LocalizationResult<()> {
        if landmarks.is_empty() {
            return invalid_config("at least one landmark is required");
        }
        if let Some(bad) = landmarks.iter().find(|lm| !(lm.x.is_finite() && lm.y.is_finite())) {
            return invalid_config(format!("landmark has non-finite position: {:?}", bad));
        }
        Ok(())
    }

    /// True if either coordinate exactly matches some landmark's
    fn conflicts_with_landmarks(landmarks: &[Landmark], x: f64, y: f64) -> bool {
        landmarks.iter().any(|lm| lm.x == x || lm.y == y)
    }

    fn create_particles<R: Rng + ?Sized>(
        config: &FilterConfig,
        landmarks: &[Landmark],
        rng: &mut R,
    ) -> Vec<Agent> {
        let mut particles = Vec::with_capacity(config.n_particles);

        while particles.len() < config.n_particles {
            let x = rng.gen_range(0.0..=config.width);
            let y = rng.gen_range(0.0..=config.height);
            if Self::conflicts_with_landmarks(landmarks, x, y) {
                continue;
            }
            let theta = normalize_angle(rng.gen_range(-PI..=PI));
            let noise = config.particle_noise.draw(rng);
            particles.push(Agent::new(Pose2D::new(x, y, theta), noise, colors::PARTICLE));
        }

        particles
    }

    /// Draw the control input shared by the robot and all particles this cycle
    pub fn draw_control(&mut self) -> ControlInput {
        ControlInput::new(
            self.config.control_dist.sample(&mut self.rng),
            self.config.control_rot.sample(&mut self.rng),
        )
    }

    /// Move the robot and every particle with the same control input
    pub fn sample(&mut self, control: &ControlInput) {
        self.phase = FilterPhase::Sampling;

        self.robot.apply_motion(control, &self.world);
        for particle in &mut self.particles {
            particle.apply_motion(control, &self.world);
        }

        if self.config.normalize_heading_on_move {
            self.robot.pose.normalize_theta();
            for particle in &mut self.particles {
                particle.pose.normalize_theta();
            }
        }
    }

    /// Score every particle against the robot's readings
    pub fn weight(&mut self) {
        self.phase = FilterPhase::Weighting;

        let robot_readings: Vec<f64> = self.robot.observe(&self.landmarks).collect();
        let robot_theta = self.robot.pose.theta;

        for particle in &mut self.particles {
            let weight = self.likelihood.score(
                robot_readings.iter().copied(),
                particle.observe(&self.landmarks),
                robot_theta,
                particle.pose.theta,
            );
            particle.weight = weight;
        }
    }

    /// Replace the population with K weighted draws, jittered and re-seeded
    pub fn resample(&mut self) {
        self.phase = FilterPhase::Resampling;

        let raw: Vec<f64> = self.particles.iter().map(|p| p.weight).collect();
        let normalized = normalize_weights(&raw);
        if normalized.degenerate {
            warn!(
                "cycle {}: all {} particle weights vanished, resampling uniformly",
                self.cycle,
                raw.len()
            );
        }
        self.degenerate_weights = normalized.degenerate;
        self.effective_particles = effective_sample_size(&normalized.weights);
        self.best_weight = raw.iter().copied().fold(0.0, f64::max);

        let picks = self
            .config
            .resampling
            .select_many(&normalized.weights, self.particles.len(), &mut self.rng);

        let mut successors: Vec<Agent> = picks.iter().map(|&i| self.particles[i].successor()).collect();
        for successor in &mut successors {
            successor.noise = self.config.particle_noise.draw(&mut self.rng);
        }

        self.particles = successors;
    }

    /// Run one full cycle with an explicit control input
    pub fn step_with_control(&mut self, control: ControlInput) {
        self.sample(&control);
        self.weight();
        self.resample();

        self.cycle += 1;
        self.phase = FilterPhase::Idle;

        debug!(
            "cycle {}: n_eff {:.1}/{}, best weight {:.3e}, robot ({:.1}, {:.1}, {:.3})",
            self.cycle,
            self.effective_particles,
            self.particles.len(),
            self.best_weight,
            self.robot.pose.x,
            self.robot.pose.y,
            self.robot.pose.theta
        );
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn world(&self) -> World {
        self.world
    }

    pub fn robot(&self) -> &Agent {
        &self.robot
    }

    pub fn particles(&self) -> &[Agent] {
        &self.particles
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn phase(&self) -> FilterPhase {
        self.phase
    }

    pub fn effective_particles(&self) -> f64 {
        self.effective_particles
    }

    /// Largest raw weight seen by the last resampling step
    pub fn best_weight(&self) -> f64 {
        self.best_weight
    }

    pub fn estimate(&self) -> Option<PoseEstimate> {
        PoseEstimate::from_particles(&self.particles)
    }
}

impl StateEstimator for ParticleFilterEngine {
    type Snapshot = FilterSnapshot;

    fn step(&mut self) {
        let control = self.draw_control();
        trace!("cycle {}: control {:?}", self.cycle + 1, control);
        self.step_with_control(control);
    }

    fn snapshot(&self) -> FilterSnapshot {
        FilterSnapshot {
            cycle: self.cycle,
            phase: self.phase,
            robot: self.robot.pose,
            particles: self.particles.iter().map(ParticleView::from).collect(),
            landmarks: Arc::clone(&self.landmarks),
            estimate: self.estimate(),
            degenerate_weights: self.degenerate_weights,
        }
    }

    fn cycles(&self) -> u64 {
        self.cycle
    }
}
