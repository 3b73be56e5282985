//! Image processing stages for detection preprocessing.
//!
//! This module provides the building blocks the detector preprocessor
//! sequences: target size computation, per-batch geometry bookkeeping,
//! resize/pad and normalization.
//!
//! # Modules
//!
//! * `geometry` - Per-image geometry records and the batch geometry table
//! * `normalization` - Whole-batch normalization and channel permutation
//! * `resize_pad` - Resize and pad primitives and the transform pipeline
//! * `target_size` - Sizing policies (static, two-threshold, legacy)
//! * `types` - Type definitions used across the processors module

pub mod geometry;
mod normalization;
pub mod resize_pad;
pub mod target_size;
pub mod types;

pub use geometry::*;
pub use normalization::*;
pub use resize_pad::*;
pub use target_size::*;
pub use types::*;
