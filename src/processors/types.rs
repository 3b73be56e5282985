//! Types used in image processing operations
//!
//! This module defines the enums and parameter structs shared by the sizing,
//! resize/pad and normalization stages of the detection preprocessor.

use serde::{Deserialize, Serialize};

/// Specifies the order of channels in an image tensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChannelOrder {
    /// Channel, Height, Width order (planar)
    CHW,
    /// Height, Width, Channel order (interleaved)
    HWC,
}

/// Selects which dynamic sizing rule a configuration uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SizingRule {
    /// Long-side / short-side minimums with alignment quantization.
    #[default]
    TwoThreshold,
    /// Cap the larger side at `max_side_len`, round to the nearest multiple of 32.
    LegacySingleThreshold,
}

/// Fully resolved sizing policy used by the target size calculator.
///
/// Built from a configuration snapshot, so a policy never changes while a
/// batch is being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingPolicy {
    /// Ignore the source size and use a fixed target.
    StaticShape {
        /// Fixed target width
        width: u32,
        /// Fixed target height
        height: u32,
    },
    /// Scale to satisfy a long-side and short-side minimum.
    TwoThreshold {
        /// Minimum length of the long side
        long_min: u32,
        /// Minimum length of the short side
        short_min: u32,
        /// Quantization granularity for both output sides
        base: u32,
    },
    /// Shrink the larger side to `max_size_len` if it exceeds it.
    LegacySingleThreshold {
        /// Maximum length of the larger side
        max_size_len: u32,
    },
}

/// Parameters for a single resize operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeParams {
    /// Target width
    pub width: u32,
    /// Target height
    pub height: u32,
}

/// Parameters for a single pad operation, in pixels per side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PadParams {
    pub top: u32,
    pub bottom: u32,
    pub left: u32,
    pub right: u32,
}

impl PadParams {
    /// Padding that only grows the bottom and right edges.
    ///
    /// Keeps the top-left origin fixed, so coordinates in the padded image
    /// equal coordinates in the resized image.
    pub fn bottom_right(bottom: u32, right: u32) -> Self {
        Self {
            top: 0,
            bottom,
            left: 0,
            right,
        }
    }

    /// Returns true if no side is padded.
    pub fn is_empty(&self) -> bool {
        self.top == 0 && self.bottom == 0 && self.left == 0 && self.right == 0
    }
}
