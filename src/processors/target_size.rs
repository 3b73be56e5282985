//! Target size computation for detection preprocessing
//!
//! This module computes, for each source image, the size it is resized to
//! before batching. Three policies are supported, selected by configuration
//! through [`SizingPolicy`]:
//!
//! - StaticShape: every image gets the configured fixed shape
//! - TwoThreshold: scale until a long-side and a short-side minimum are met,
//!   then align both sides up to a multiple of the alignment base
//! - LegacySingleThreshold: shrink the larger side to a limit, then round both
//!   sides to the nearest multiple of 32
//!
//! Every computed size is bounded by a maximum target side, so a very
//! elongated source cannot blow up the batch canvas.
//!
//! All functions are pure; the only state is the policy and the bound.

use crate::core::OCRError;
use crate::core::constants::{DEFAULT_MAX_TARGET_SIDE, LEGACY_ALIGNMENT};
use crate::core::validation::validate_source_dimensions;
use crate::processors::geometry::ImageGeometry;
use crate::processors::types::SizingPolicy;

/// Rounds `value` up to the next multiple of `base`, never below `base`.
#[inline]
pub fn align_up(value: u32, base: u32) -> u32 {
    (value.div_ceil(base) * base).max(base)
}

/// Computes the destination size for two-threshold sizing.
///
/// The long side of the source is compared against `long_min` and the short
/// side against `short_min`. Images that already exceed both minimums keep
/// their size; others are scaled by whichever minimum is binding for their
/// aspect ratio. Both sides are then aligned up to a multiple of `base`.
///
/// Height is the long side only when `src_height > src_width`; square images
/// treat width as the long side.
///
/// # Parameters
/// * `src_height` - Source image height
/// * `src_width` - Source image width
/// * `long_min` - Minimum length of the long side
/// * `short_min` - Minimum length of the short side
/// * `base` - Alignment granularity
///
/// # Returns
/// `(dst_height, dst_width)`
///
/// # Errors
/// * `OCRError::InvalidGeometry` if a source dimension is zero
/// * `OCRError::UnsupportedConfiguration` if a threshold or `base` is zero
pub fn cal_dst_size(
    src_height: u32,
    src_width: u32,
    long_min: u32,
    short_min: u32,
    base: u32,
) -> Result<(u32, u32), OCRError> {
    validate_source_dimensions(src_width, src_height, "cal_dst_size")?;
    if long_min == 0 || short_min == 0 || base == 0 {
        return Err(OCRError::unsupported_config(format!(
            "two-threshold sizing needs non-zero thresholds and base, got long_min={}, short_min={}, base={}",
            long_min, short_min, base
        )));
    }

    let base_ratio = long_min as f32 / short_min as f32;

    // swap is true when width is the long side
    let (cur_long, cur_short, swap) = if src_height > src_width {
        (src_height, src_width, false)
    } else {
        (src_width, src_height, true)
    };
    let cur_ratio = cur_long as f32 / cur_short as f32;

    let (dst_long, dst_short) = if cur_long > long_min && cur_short > short_min {
        (cur_long, cur_short)
    } else if cur_ratio > base_ratio {
        let ratio = short_min as f32 / cur_short as f32;
        let new_long = (ratio * cur_long as f32).ceil() as u32;
        (new_long, short_min)
    } else {
        let ratio = long_min as f32 / cur_long as f32;
        let new_short = (ratio * cur_short as f32).ceil() as u32;
        (long_min, new_short)
    };

    let dst_long = align_up(dst_long, base);
    let dst_short = align_up(dst_short, base);

    if swap {
        Ok((dst_short, dst_long))
    } else {
        Ok((dst_long, dst_short))
    }
}

/// Computes the destination size for the legacy single-threshold rule.
///
/// If the larger side exceeds `max_size_len`, both sides are scaled by the
/// same ratio so that the larger side equals `max_size_len`. Each side is then
/// rounded to the nearest multiple of 32 and floored at 32.
///
/// # Returns
/// `(dst_height, dst_width)`
///
/// # Errors
/// * `OCRError::InvalidGeometry` if a source dimension is zero
/// * `OCRError::UnsupportedConfiguration` if `max_size_len` is zero
pub fn legacy_dst_size(
    src_height: u32,
    src_width: u32,
    max_size_len: u32,
) -> Result<(u32, u32), OCRError> {
    validate_source_dimensions(src_width, src_height, "legacy_dst_size")?;
    if max_size_len == 0 {
        return Err(OCRError::unsupported_config(
            "legacy sizing needs a non-zero max_size_len",
        ));
    }

    let max_wh = src_width.max(src_height);
    let ratio = if max_wh > max_size_len {
        max_size_len as f32 / max_wh as f32
    } else {
        1.0
    };

    let resize_h = (src_height as f32 * ratio) as u32;
    let resize_w = (src_width as f32 * ratio) as u32;

    Ok((round_to_legacy_grid(resize_h), round_to_legacy_grid(resize_w)))
}

/// Rounds to the nearest multiple of 32 (halves away from zero), floored at 32.
fn round_to_legacy_grid(value: u32) -> u32 {
    let steps = (value as f32 / LEGACY_ALIGNMENT as f32).round() as u32;
    (steps * LEGACY_ALIGNMENT).max(LEGACY_ALIGNMENT)
}

/// Computes the geometry record of one image under `policy`.
///
/// Static shapes ignore the source size entirely, so the result only depends
/// on the configuration.
///
/// # Errors
/// * `OCRError::InvalidGeometry` if a source dimension is zero, or if either
///   computed side exceeds `max_target_side`
/// * `OCRError::UnsupportedConfiguration` if the policy itself is unusable
pub fn compute_geometry(
    policy: &SizingPolicy,
    src_width: u32,
    src_height: u32,
    max_target_side: u32,
) -> Result<ImageGeometry, OCRError> {
    let (dst_h, dst_w) = match *policy {
        SizingPolicy::StaticShape { width, height } => {
            if width == 0 || height == 0 {
                return Err(OCRError::unsupported_config(format!(
                    "static shape {}x{} has a zero side",
                    width, height
                )));
            }
            (height, width)
        }
        SizingPolicy::TwoThreshold {
            long_min,
            short_min,
            base,
        } => cal_dst_size(src_height, src_width, long_min, short_min, base)?,
        SizingPolicy::LegacySingleThreshold { max_size_len } => {
            legacy_dst_size(src_height, src_width, max_size_len)?
        }
    };

    if dst_w > max_target_side || dst_h > max_target_side {
        return Err(OCRError::invalid_geometry(format!(
            "target {}x{} for source {}x{} exceeds the maximum side of {}",
            dst_w, dst_h, src_width, src_height, max_target_side
        )));
    }

    Ok(ImageGeometry::new(src_width, src_height, dst_w, dst_h))
}

/// Stateless calculator bound to one sizing policy and a maximum target side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSizeCalculator {
    policy: SizingPolicy,
    max_target_side: u32,
}

impl TargetSizeCalculator {
    /// Creates a calculator bounded by [`DEFAULT_MAX_TARGET_SIDE`].
    pub fn new(policy: SizingPolicy) -> Self {
        Self {
            policy,
            max_target_side: DEFAULT_MAX_TARGET_SIDE,
        }
    }

    /// Replaces the maximum target side.
    pub fn with_max_target_side(mut self, max_target_side: u32) -> Self {
        self.max_target_side = max_target_side;
        self
    }

    pub fn policy(&self) -> &SizingPolicy {
        &self.policy
    }

    pub fn max_target_side(&self) -> u32 {
        self.max_target_side
    }

    /// Computes the geometry record for a source of `width` x `height`.
    pub fn compute(&self, width: u32, height: u32) -> Result<ImageGeometry, OCRError> {
        compute_geometry(&self.policy, width, height, self.max_target_side)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: u32 = 960;
    const SHORT: u32 = 540;

    fn two_threshold() -> TargetSizeCalculator {
        TargetSizeCalculator::new(SizingPolicy::TwoThreshold {
            long_min: LONG,
            short_min: SHORT,
            base: 32,
        })
    }

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(1, 32), 32);
        assert_eq!(align_up(32, 32), 32);
        assert_eq!(align_up(33, 32), 64);
        assert_eq!(align_up(600, 32), 608);
        assert_eq!(align_up(0, 32), 32);
    }

    #[test]
    fn test_large_image_is_not_shrunk() {
        // Both sides exceed their minimums: only alignment applies.
        assert_eq!(cal_dst_size(1000, 2000, LONG, SHORT, 32).unwrap(), (1024, 2016));
        assert_eq!(cal_dst_size(2000, 600, LONG, SHORT, 32).unwrap(), (2016, 608));
        assert_eq!(cal_dst_size(1024, 2048, LONG, SHORT, 32).unwrap(), (1024, 2048));
    }

    #[test]
    fn test_portrait_scaled_by_long_side() {
        // 800x500 (h x w): ratio 1.6 <= 960/540, so the long side goes to 960
        // and the short side to ceil(500 * 1.2) = 600, aligned to 608.
        assert_eq!(cal_dst_size(800, 500, LONG, SHORT, 32).unwrap(), (960, 608));
        // Landscape version of the same image.
        assert_eq!(cal_dst_size(500, 800, LONG, SHORT, 32).unwrap(), (608, 960));
    }

    #[test]
    fn test_elongated_image_scaled_by_short_side() {
        // 100x400 (h x w): ratio 4 > 1.78, so the short side goes to 540 and
        // the long side to ceil(400 * 5.4) = 2160.
        assert_eq!(cal_dst_size(100, 400, LONG, SHORT, 32).unwrap(), (544, 2176));
    }

    #[test]
    fn test_square_image_treats_width_as_long() {
        // 300x300: ratio 1 <= base ratio, long side (width) goes to 960.
        assert_eq!(cal_dst_size(300, 300, LONG, SHORT, 32).unwrap(), (960, 960));
    }

    #[test]
    fn test_outputs_are_aligned() {
        let sizes = [
            (1, 1),
            (7, 13),
            (31, 33),
            (100, 50),
            (480, 640),
            (541, 961),
            (1080, 1920),
            (3000, 20),
        ];
        for &(h, w) in &sizes {
            for base in [8, 16, 32, 64] {
                let (dh, dw) = cal_dst_size(h, w, LONG, SHORT, base).unwrap();
                assert_eq!(dh % base, 0, "{h}x{w} base {base}");
                assert_eq!(dw % base, 0, "{h}x{w} base {base}");
                assert!(dh >= base && dw >= base);
            }
        }
    }

    #[test]
    fn test_transpose_symmetry() {
        let sizes = [(7, 13), (100, 400), (480, 640), (541, 961), (1080, 1920), (300, 301)];
        for &(h, w) in &sizes {
            let (dh, dw) = cal_dst_size(h, w, LONG, SHORT, 32).unwrap();
            let (th, tw) = cal_dst_size(w, h, LONG, SHORT, 32).unwrap();
            assert_eq!((dh, dw), (tw, th), "{h}x{w}");
        }
    }

    #[test]
    fn test_zero_dimension_is_invalid_geometry() {
        assert!(matches!(
            cal_dst_size(0, 100, LONG, SHORT, 32),
            Err(OCRError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            cal_dst_size(100, 0, LONG, SHORT, 32),
            Err(OCRError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            legacy_dst_size(0, 100, 960),
            Err(OCRError::InvalidGeometry { .. })
        ));
        assert!(matches!(
            two_threshold().compute(50, 0),
            Err(OCRError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_zero_thresholds_are_unsupported() {
        assert!(matches!(
            cal_dst_size(100, 100, 0, SHORT, 32),
            Err(OCRError::UnsupportedConfiguration { .. })
        ));
        assert!(matches!(
            cal_dst_size(100, 100, LONG, SHORT, 0),
            Err(OCRError::UnsupportedConfiguration { .. })
        ));
        assert!(matches!(
            legacy_dst_size(100, 100, 0),
            Err(OCRError::UnsupportedConfiguration { .. })
        ));
    }

    #[test]
    fn test_legacy_small_image_is_rounded() {
        // 100x50 (h x w) under 960: 100/32 = 3.125 -> 96, 50/32 = 1.5625 -> 64.
        assert_eq!(legacy_dst_size(100, 50, 960).unwrap(), (96, 64));
        // Tiny images floor at 32.
        assert_eq!(legacy_dst_size(5, 10, 960).unwrap(), (32, 32));
    }

    #[test]
    fn test_legacy_large_image_is_shrunk() {
        // 1920x1080 (w x h): ratio 0.5 -> 960x540 -> 540/32 = 16.875 -> 544.
        assert_eq!(legacy_dst_size(1080, 1920, 960).unwrap(), (544, 960));
        assert_eq!(legacy_dst_size(1920, 1080, 960).unwrap(), (960, 544));
    }

    #[test]
    fn test_static_shape_ignores_source() {
        let calc = TargetSizeCalculator::new(SizingPolicy::StaticShape {
            width: 1280,
            height: 736,
        });
        let a = calc.compute(100, 50).unwrap();
        let b = calc.compute(100, 50).unwrap();
        let c = calc.compute(4000, 3000).unwrap();
        assert_eq!(a, b);
        assert_eq!((a.dst_w, a.dst_h), (1280, 736));
        assert_eq!((c.dst_w, c.dst_h), (1280, 736));
        assert_eq!((a.src_w, a.src_h), (100, 50));
    }

    #[test]
    fn test_elongated_target_is_bounded() {
        // 32768x1 would scale the long side by 540 to 17694720 pixels.
        let err = two_threshold().compute(32768, 1).unwrap_err();
        assert!(matches!(err, OCRError::InvalidGeometry { .. }));
        assert!(err.to_string().contains("32768x1"));

        // 4000x2 would give 1080000 pixels.
        assert!(matches!(
            two_threshold().compute(4000, 2),
            Err(OCRError::InvalidGeometry { .. })
        ));

        // 400x100 fits: 2176 <= 4000.
        let geo = two_threshold().compute(400, 100).unwrap();
        assert_eq!((geo.dst_w, geo.dst_h), (2176, 544));
    }

    #[test]
    fn test_max_target_side_is_inclusive() {
        let calc = two_threshold().with_max_target_side(2176);
        assert_eq!(calc.max_target_side(), 2176);
        assert!(calc.compute(400, 100).is_ok());

        let calc = two_threshold().with_max_target_side(2175);
        assert!(matches!(
            calc.compute(400, 100),
            Err(OCRError::InvalidGeometry { .. })
        ));

        // Large sources that need no scaling are bounded too.
        assert!(matches!(
            two_threshold().compute(5000, 3000),
            Err(OCRError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_compute_geometry_reports_width_first() {
        let geo = two_threshold().compute(500, 800).unwrap();
        assert_eq!(geo, ImageGeometry::new(500, 800, 608, 960));
    }
}
