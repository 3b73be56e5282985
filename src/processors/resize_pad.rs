//! Per-image resize and batch padding
//!
//! Every image is first resized to its own target size and then padded on the
//! bottom and right to the batch canvas, so that all images in a batch end up
//! with identical dimensions and can be packed into one tensor. Keeping the
//! top-left corner fixed means no offset correction is needed when mapping
//! detections back.
//!
//! The resize and pad operators are owned by [`ImageTransformPipeline`] and
//! take their parameters per call, so the pipeline can be shared across
//! worker threads without hidden state.

use crate::core::errors::ImageProcessError;
use crate::core::{OCRError, validate_same_length};
use crate::processors::geometry::ImageGeometry;
use crate::processors::types::{PadParams, ResizeParams};
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use rayon::prelude::*;
use tracing::debug;

/// Resize primitive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOp {
    /// Interpolation filter
    pub filter: FilterType,
}

impl Default for ResizeOp {
    /// Bilinear interpolation.
    fn default() -> Self {
        Self {
            filter: FilterType::Triangle,
        }
    }
}

impl ResizeOp {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }

    /// Resizes `img` in place to exactly `params.width` x `params.height`.
    ///
    /// Leaves the image untouched when it already has the requested size.
    pub fn apply(&self, img: &mut RgbImage, params: ResizeParams) -> Result<(), ImageProcessError> {
        if params.width == 0 || params.height == 0 {
            return Err(ImageProcessError::InvalidTargetSize {
                width: params.width,
                height: params.height,
            });
        }
        if img.dimensions() == (params.width, params.height) {
            return Ok(());
        }
        *img = imageops::resize(img, params.width, params.height, self.filter);
        Ok(())
    }
}

/// Constant-fill pad primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PadOp {
    /// Fill color, per channel
    pub fill: [u8; 3],
}

impl PadOp {
    pub fn new(fill: [u8; 3]) -> Self {
        Self { fill }
    }

    /// Grows `img` in place by the given number of pixels on each side.
    pub fn apply(&self, img: &mut RgbImage, params: PadParams) -> Result<(), ImageProcessError> {
        if params.is_empty() {
            return Ok(());
        }
        let (w, h) = img.dimensions();
        let new_w = grow(w, params.left, params.right)?;
        let new_h = grow(h, params.top, params.bottom)?;

        let mut canvas = RgbImage::from_pixel(new_w, new_h, Rgb(self.fill));
        imageops::overlay(&mut canvas, &*img, params.left as i64, params.top as i64);
        *img = canvas;
        Ok(())
    }
}

fn grow(side: u32, a: u32, b: u32) -> Result<u32, ImageProcessError> {
    side.checked_add(a)
        .and_then(|v| v.checked_add(b))
        .ok_or(ImageProcessError::PaddingOverflow {
            side,
            extra: a.saturating_add(b),
        })
}

/// Resize-then-pad stage of the detection preprocessor.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageTransformPipeline {
    resize: ResizeOp,
    pad: PadOp,
}

impl ImageTransformPipeline {
    pub fn new(resize: ResizeOp, pad: PadOp) -> Self {
        Self { resize, pad }
    }

    pub fn resize_op(&self) -> &ResizeOp {
        &self.resize
    }

    pub fn pad_op(&self) -> &PadOp {
        &self.pad
    }

    /// Resizes one image to its target and pads it to `canvas` (`(width, height)`).
    ///
    /// # Errors
    /// * `OCRError::InvalidGeometry` if the canvas is smaller than the target
    /// * `OCRError::Processing` if a primitive fails
    pub fn transform(
        &self,
        img: &mut RgbImage,
        geometry: &ImageGeometry,
        canvas: (u32, u32),
    ) -> Result<(), OCRError> {
        let (canvas_w, canvas_h) = canvas;
        if canvas_w < geometry.dst_w || canvas_h < geometry.dst_h {
            return Err(OCRError::invalid_geometry(format!(
                "canvas {}x{} is smaller than target {}x{}",
                canvas_w, canvas_h, geometry.dst_w, geometry.dst_h
            )));
        }

        self.resize
            .apply(
                img,
                ResizeParams {
                    width: geometry.dst_w,
                    height: geometry.dst_h,
                },
            )
            .map_err(|e| OCRError::resize_error("failed to resize image to its target", e))?;

        self.pad
            .apply(
                img,
                PadParams::bottom_right(canvas_h - geometry.dst_h, canvas_w - geometry.dst_w),
            )
            .map_err(|e| OCRError::pad_error("failed to pad image to the batch canvas", e))
    }

    /// Transforms every image of a batch to the shared canvas.
    ///
    /// `geometry` must be index-aligned with `images`. With `parallel` set,
    /// images are processed on the rayon pool; each worker owns a disjoint
    /// image, so no locking is needed.
    pub fn transform_batch(
        &self,
        images: &mut [RgbImage],
        geometry: &[ImageGeometry],
        canvas: (u32, u32),
        parallel: bool,
    ) -> Result<(), OCRError> {
        validate_same_length(images, geometry, "images", "geometry")?;

        let total = images.len();
        if parallel {
            images
                .par_iter_mut()
                .zip(geometry.par_iter())
                .enumerate()
                .try_for_each(|(i, (img, geo))| {
                    self.transform(img, geo, canvas)
                        .map_err(|e| e.at_batch_item(i, total))
                })
        } else {
            for (i, (img, geo)) in images.iter_mut().zip(geometry).enumerate() {
                self.transform(img, geo, canvas)
                    .map_err(|e| e.at_batch_item(i, total))?;
                debug!(
                    "image {}: {}x{} -> {}x{} on {}x{} canvas",
                    i, geo.src_w, geo.src_h, geo.dst_w, geo.dst_h, canvas.0, canvas.1
                );
            }
            Ok(())
        }
    }
}
