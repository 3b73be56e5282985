//! Detector-facing entry points.
//!
//! This module contains the batch preprocessor that prepares images for a DB
//! text detection network. It sequences the stages in [`crate::processors`]
//! and owns the state that persists between calls.

/// Batch preprocessor for DB (Differentiable Binarization) text detection
pub mod db_preprocessor;

pub use db_preprocessor::{
    DBDetectorPreprocessor, DBDetectorPreprocessorBuilder, DetPreprocessOutput,
};
