//! Input Validation Utilities
//!
//! Checks shared by the sizing, transform and normalization stages. Each
//! helper maps a failed check onto the error kind the caller contract names.

use crate::core::OCRError;
use image::RgbImage;

/// Reasonable upper bound on a side length, to keep buffer sizes sane.
pub const MAX_DIMENSION: u32 = 32768;

/// Validates source dimensions used in ratio computations.
///
/// A zero side would divide by zero, so it is reported as
/// `OCRError::InvalidGeometry`.
#[inline]
pub fn validate_source_dimensions(width: u32, height: u32, context: &str) -> Result<(), OCRError> {
    if width == 0 || height == 0 {
        return Err(OCRError::invalid_geometry(format!(
            "{}: source dimensions must be positive, got {}x{}",
            context, width, height
        )));
    }
    Ok(())
}

/// Validates that a batch item carries a usable pixel buffer.
///
/// Images without pixels or with absurd dimensions are rejected as
/// `OCRError::PreconditionViolation` before any work is done.
pub fn validate_batch_image(image: &RgbImage, index: usize) -> Result<(), OCRError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(OCRError::precondition(format!(
            "image {} has invalid dimensions {}x{}",
            index, width, height
        )));
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(OCRError::precondition(format!(
            "image {} dimensions {}x{} exceed maximum of {}x{}",
            index, width, height, MAX_DIMENSION, MAX_DIMENSION
        )));
    }
    Ok(())
}

/// Validates that every image in a batch has the same dimensions.
///
/// Returns the shared `(width, height)`, or `None` for an empty batch.
pub fn validate_uniform_batch(images: &[RgbImage]) -> Result<Option<(u32, u32)>, OCRError> {
    let Some(first) = images.first() else {
        return Ok(None);
    };
    let expected = first.dimensions();
    for (i, img) in images.iter().enumerate().skip(1) {
        if img.dimensions() != expected {
            return Err(OCRError::precondition(format!(
                "all images in batch must have the same dimensions. Image 0: {}x{}, Image {}: {}x{}",
                expected.0,
                expected.1,
                i,
                img.width(),
                img.height()
            )));
        }
    }
    Ok(Some(expected))
}

/// Validates that two collections have the same length.
#[inline]
pub fn validate_same_length<T, U>(
    items1: &[T],
    items2: &[U],
    name1: &str,
    name2: &str,
) -> Result<(), OCRError> {
    if items1.len() != items2.len() {
        return Err(OCRError::precondition(format!(
            "Length mismatch: {} has {} elements, but {} has {} elements",
            name1,
            items1.len(),
            name2,
            items2.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_source_dimensions() {
        assert!(validate_source_dimensions(10, 10, "test").is_ok());
        assert!(matches!(
            validate_source_dimensions(10, 0, "test"),
            Err(OCRError::InvalidGeometry { .. })
        ));
    }

    #[test]
    fn test_validate_batch_image() {
        assert!(validate_batch_image(&RgbImage::new(4, 4), 0).is_ok());
        assert!(matches!(
            validate_batch_image(&RgbImage::new(0, 4), 0),
            Err(OCRError::PreconditionViolation { .. })
        ));
    }

    #[test]
    fn test_validate_uniform_batch() {
        assert_eq!(validate_uniform_batch(&[]).unwrap(), None);

        let same = vec![RgbImage::new(8, 4), RgbImage::new(8, 4)];
        assert_eq!(validate_uniform_batch(&same).unwrap(), Some((8, 4)));

        let mixed = vec![RgbImage::new(8, 4), RgbImage::new(4, 8)];
        assert!(validate_uniform_batch(&mixed).is_err());
    }

    #[test]
    fn test_validate_same_length() {
        assert!(validate_same_length(&[1, 2], &["a", "b"], "x", "y").is_ok());
        assert!(validate_same_length(&[1], &["a", "b"], "x", "y").is_err());
    }
}
