//! Common types, traits, and error definitions for range_localization
//!
//! This module provides the foundational building blocks shared by the
//! agent model, the filter engine and the snapshot consumers.

pub mod types;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
