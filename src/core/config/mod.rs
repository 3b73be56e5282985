//! Configuration management for the preprocessing pipeline.
//!
//! This module provides the detection preprocessing configuration, its
//! validation trait and the per-instance logging switches.

pub mod detection;
pub mod errors;
pub mod logging;

pub use detection::DetPreprocessConfig;
pub use errors::{ConfigError, ConfigValidator, ConfigValidatorExt};
pub use logging::LogConfig;
