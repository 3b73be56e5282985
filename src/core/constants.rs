//! Constants used throughout the detection preprocessing pipeline.
//!
//! Default values for sizing thresholds, alignment, normalization statistics
//! and parallelism.

/// The default alignment base for computed target sizes.
///
/// Every computed side is rounded up to a multiple of this value, which is the
/// total stride of DB-style detection backbones.
pub const DEFAULT_ALIGNMENT_BASE: u32 = 32;

/// The default long-side minimum for two-threshold sizing.
pub const DEFAULT_LONGSIDE_SIZE: u32 = 960;

/// The default short-side minimum for two-threshold sizing.
pub const DEFAULT_SHORTSIDE_SIZE: u32 = 540;

/// The default limit for the legacy single-threshold sizing rule.
pub const DEFAULT_MAX_SIDE_LEN: u32 = 960;

/// The default upper bound on either side of a computed target size.
///
/// Targets above it are rejected as invalid geometry instead of being
/// allocated.
pub const DEFAULT_MAX_TARGET_SIDE: u32 = 4000;

/// Granularity used by the legacy single-threshold rule.
///
/// The legacy rule always rounds to 32 regardless of the configured
/// alignment base.
pub const LEGACY_ALIGNMENT: u32 = 32;

/// The default fixed shape `(channels, height, width)` for static shape inference.
pub const DEFAULT_DET_IMAGE_SHAPE: [u32; 3] = [3, 960, 960];

/// Per-channel mean used for detection normalization (ImageNet statistics).
pub const DEFAULT_NORMALIZE_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Per-channel standard deviation used for detection normalization.
pub const DEFAULT_NORMALIZE_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Scale applied to raw 8-bit pixel values before mean/std normalization.
pub const DEFAULT_NORMALIZE_SCALE: f32 = 1.0 / 255.0;

/// The default padding color.
pub const DEFAULT_PAD_VALUE: [u8; 3] = [0, 0, 0];

/// The default threshold for parallel processing.
///
/// Batches with more images than this use rayon for the per-image passes.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

/// Number of channels in the images handled by the pipeline.
pub const RGB_CHANNELS: usize = 3;
