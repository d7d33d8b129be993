//! Visualization utilities for range_localization
//!
//! Renders published filter snapshots using gnuplot.

use gnuplot::{AutoOption, AxesCommon, Caption, Color, Figure, LineWidth, PointSize, PointSymbol};

use crate::common::{Landmark, LocalizationError, LocalizationResult, Pose2D};
use crate::localization::snapshot::{FilterSnapshot, ParticleView};

/// Color palette for consistent styling
pub mod colors {
    pub const BLACK: &str = "#000000";
    pub const RED: &str = "#FF0000";
    pub const BLUE: &str = "#0000FF";
    pub const PINK: &str = "#FFC0CB";

    // Semantic colors
    pub const LANDMARK: &str = BLUE;
    pub const ROBOT: &str = RED;
    pub const PARTICLE: &str = PINK;
    pub const ESTIMATED: &str = "#35C788";
    pub const HEADING: &str = BLACK;
}

/// Style for point rendering
#[derive(Debug, Clone)]
pub struct PointStyle {
    pub color: String,
    pub size: f64,
    pub symbol: char,
    pub caption: String,
}

impl PointStyle {
    pub fn new(color: &str, caption: &str) -> Self {
        Self {
            color: color.to_string(),
            size: 1.0,
            symbol: 'O',
            caption: caption.to_string(),
        }
    }

    pub fn with_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    pub fn with_symbol(mut self, symbol: char) -> Self {
        self.symbol = symbol;
        self
    }
}

/// x/y columns for one plotted layer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Series {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

impl<'a> FromIterator<&'a Landmark> for Series {
    fn from_iter<I: IntoIterator<Item = &'a Landmark>>(iter: I) -> Self {
        let (x, y) = iter.into_iter().map(|lm| (lm.x, lm.y)).unzip();
        Series { x, y }
    }
}

impl<'a> FromIterator<&'a ParticleView> for Series {
    fn from_iter<I: IntoIterator<Item = &'a ParticleView>>(iter: I) -> Self {
        let (x, y) = iter.into_iter().map(|p| (p.pose.x, p.pose.y)).unzip();
        Series { x, y }
    }
}

/// Segment from a pose along its heading
pub fn heading_segment(pose: &Pose2D, length: f64) -> Series {
    Series {
        x: vec![pose.x, pose.x + length * pose.theta.cos()],
        y: vec![pose.y, pose.y + length * pose.theta.sin()],
    }
}

/// Main visualizer struct
pub struct Visualizer {
    figure: Figure,
    title: String,
    x_range: Option<(f64, f64)>,
    y_range: Option<(f64, f64)>,
    aspect_ratio: Option<f64>,
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            figure: Figure::new(),
            title: String::new(),
            x_range: None,
            y_range: None,
            aspect_ratio: Some(1.0),
        }
    }

    pub fn set_title(&mut self, title: &str) -> &mut Self {
        self.title = title.to_string();
        self
    }

    /// Fix both axes to the world rectangle
    pub fn set_world(&mut self, width: f64, height: f64) -> &mut Self {
        self.x_range = Some((0.0, width));
        self.y_range = Some((0.0, height));
        self
    }

    pub fn plot_points(&mut self, series: &Series, style: &PointStyle) -> &mut Self {
        self.figure.axes2d().points(
            &series.x,
            &series.y,
            &[
                Caption(&style.caption),
                Color(&style.color),
                PointSymbol(style.symbol),
                PointSize(style.size),
            ],
        );
        self
    }

    /// Plot a pose as a point with a heading line
    pub fn plot_pose(&mut self, pose: &Pose2D, style: &PointStyle) -> &mut Self {
        let segment = heading_segment(pose, 18.0);
        self.figure.axes2d().points(
            &[pose.x],
            &[pose.y],
            &[
                Caption(&style.caption),
                Color(&style.color),
                PointSymbol(style.symbol),
                PointSize(style.size),
            ],
        );
        self.figure
            .axes2d()
            .lines(&segment.x, &segment.y, &[Color(colors::HEADING), LineWidth(2.0)]);
        self
    }

    /// Landmarks, particles, robot and estimate of one snapshot
    pub fn plot_snapshot(&mut self, snapshot: &FilterSnapshot) -> &mut Self {
        let landmarks: Series = snapshot.landmarks.iter().collect();
        let particles: Series = snapshot.particles.iter().collect();

        self.plot_points(
            &landmarks,
            &PointStyle::new(colors::LANDMARK, "Landmarks").with_symbol('S').with_size(2.0),
        );
        self.plot_points(&particles, &PointStyle::new(colors::PARTICLE, "Particles").with_size(0.5));
        self.plot_pose(&snapshot.robot, &PointStyle::new(colors::ROBOT, "Robot").with_size(1.5));
        if let Some(estimate) = &snapshot.estimate {
            self.plot_pose(
                &estimate.mean,
                &PointStyle::new(colors::ESTIMATED, "Estimate").with_symbol('x').with_size(1.5),
            );
        }
        self
    }

    /// Save plot to PNG file
    pub fn save_png(&mut self, path: &str, width: u32, height: u32) -> LocalizationResult<()> {
        self.apply_settings();
        self.figure
            .save_to_png(path, width, height)
            .map_err(|e| LocalizationError::VisualizationError(e.to_string()))
    }

    fn apply_settings(&mut self) {
        let axes = self.figure.axes2d();

        if !self.title.is_empty() {
            axes.set_title(&self.title, &[]);
        }
        axes.set_x_label("X", &[]);
        axes.set_y_label("Y", &[]);

        if let Some((min, max)) = self.x_range {
            axes.set_x_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some((min, max)) = self.y_range {
            axes.set_y_range(AutoOption::Fix(min), AutoOption::Fix(max));
        }
        if let Some(ratio) = self.aspect_ratio {
            axes.set_aspect_ratio(AutoOption::Fix(ratio));
        }
    }
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Render one snapshot of a `width` x `height` world to a PNG
pub fn render_snapshot(snapshot: &FilterSnapshot, width: f64, height: f64, path: &str) -> LocalizationResult<()> {
    let mut vis = Visualizer::new();
    vis.set_title(&format!("Particle Filter 2D - cycle {}", snapshot.cycle))
        .set_world(width, height)
        .plot_snapshot(snapshot);
    vis.save_png(path, 900, 400)
}
