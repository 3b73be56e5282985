//! Image and file loading helpers.
//!
//! Loaders decode any format enabled on the `image` crate and always hand
//! back 8-bit RGB, which is what the detection preprocessor consumes.

use crate::core::constants::{DEFAULT_PARALLEL_THRESHOLD, RGB_CHANNELS};
use crate::core::{OCRError, ProcessingStage};
use image::{ImageBuffer, RgbImage};
use rayon::prelude::*;
use std::io::Read;
use std::path::Path;

/// Loads an image from a file path and converts it to RgbImage.
///
/// # Errors
///
/// Returns `OCRError::ImageLoad` if the file cannot be opened or decoded.
pub fn load_image(path: &Path) -> Result<RgbImage, OCRError> {
    let img = image::open(path).map_err(OCRError::ImageLoad)?;
    Ok(img.to_rgb8())
}

/// Decodes an in-memory encoded image (PNG, JPEG, ...) into an RgbImage.
pub fn load_image_from_bytes(bytes: &[u8]) -> Result<RgbImage, OCRError> {
    let img = image::load_from_memory(bytes).map_err(OCRError::ImageLoad)?;
    Ok(img.to_rgb8())
}

/// Reads a whole file into a byte buffer.
///
/// Works for files whose size is not known up front (pipes, special files)
/// by reading to end of stream.
///
/// # Errors
///
/// Returns `OCRError::Io` if the file cannot be opened or read.
pub fn read_binary_from_file(path: impl AsRef<Path>) -> Result<Vec<u8>, OCRError> {
    let mut file = std::fs::File::open(path.as_ref())?;
    let capacity = file
        .metadata()
        .map(|m| m.len() as usize)
        .unwrap_or_default();
    let mut contents = Vec::with_capacity(capacity);
    file.read_to_end(&mut contents)?;
    Ok(contents)
}

/// Creates an RgbImage from raw interleaved RGB pixel data.
///
/// Returns `None` if `data.len()` is not `width * height * 3`.
pub fn create_rgb_image(width: u32, height: u32, data: Vec<u8>) -> Option<RgbImage> {
    let expected = (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(RGB_CHANNELS)?;
    if data.len() != expected {
        return None;
    }
    ImageBuffer::from_raw(width, height, data)
}

/// Loads a batch of images from file paths.
///
/// Uses the rayon pool when the batch is larger than
/// `DEFAULT_PARALLEL_THRESHOLD`.
pub fn load_images_batch<P: AsRef<Path> + Send + Sync>(
    paths: &[P],
) -> Result<Vec<RgbImage>, OCRError> {
    load_images_batch_with_threshold(paths, None)
}

/// Loads a batch of images with a custom parallel threshold.
///
/// # Arguments
///
/// * `paths` - Image files to load, in batch order
/// * `parallel_threshold` - Batches larger than this load in parallel.
///   If `None`, `DEFAULT_PARALLEL_THRESHOLD` is used.
///
/// # Errors
///
/// The first failing file aborts the batch. The error names its 1-based
/// position and wraps the underlying `OCRError`.
pub fn load_images_batch_with_threshold<P: AsRef<Path> + Send + Sync>(
    paths: &[P],
    parallel_threshold: Option<usize>,
) -> Result<Vec<RgbImage>, OCRError> {
    let threshold = parallel_threshold.unwrap_or(DEFAULT_PARALLEL_THRESHOLD);
    let total = paths.len();
    let load = |(i, p): (usize, &P)| {
        load_image(p.as_ref())
            .map_err(|e| OCRError::batch_item_error(ProcessingStage::Generic, i, total, e))
    };

    if total > threshold {
        paths.par_iter().enumerate().map(load).collect()
    } else {
        paths.iter().enumerate().map(load).collect()
    }
}
