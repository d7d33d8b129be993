//! Utility modules for range_localization

pub mod landmark_layout;
pub mod visualization;

pub use landmark_layout::{prepare_landmarks, BORDER_MARGIN};
pub use visualization::{colors, render_snapshot, PointStyle, Series, Visualizer};
