//! Image normalization and channel layout for detection batches.
//!
//! This module turns a batch of equally sized RGB images into one contiguous
//! tensor. Two independent switches control the output:
//!
//! - normalization: `value * alpha + beta` per channel (f32 output), or raw
//!   `u8` values when disabled
//! - permutation: planar CHW output, or interleaved HWC when disabled
//!
//! The tensor is written into a working buffer owned by [`NormalizationStage`]
//! and handed out as a borrowed [`TensorView`].

use crate::core::constants::{
    DEFAULT_NORMALIZE_MEAN, DEFAULT_NORMALIZE_SCALE, DEFAULT_NORMALIZE_STD, RGB_CHANNELS,
};
use crate::core::tensor::{Tensor4D, TensorData, TensorView};
use crate::core::{OCRError, validate_uniform_batch};
use crate::processors::types::ChannelOrder;
use image::RgbImage;
use ndarray::{Array4, ArrayViewMut3, Axis};
use rayon::prelude::*;

/// Per-channel affine normalization.
///
/// `alpha = scale / std` and `beta = -mean / std`, so
/// `value * alpha + beta == (value * scale - mean) / std`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizeImage {
    /// Scaling factors for each channel (alpha = scale / std)
    pub alpha: [f32; 3],
    /// Offset values for each channel (beta = -mean / std)
    pub beta: [f32; 3],
}

impl Default for NormalizeImage {
    /// ImageNet statistics on `[0, 1]`-scaled pixels.
    fn default() -> Self {
        Self::from_stats(
            DEFAULT_NORMALIZE_SCALE,
            DEFAULT_NORMALIZE_MEAN,
            DEFAULT_NORMALIZE_STD,
        )
    }
}

impl NormalizeImage {
    /// Creates a new NormalizeImage instance with the specified parameters.
    ///
    /// # Arguments
    ///
    /// * `scale` - Optional scaling factor (defaults to 1.0/255.0)
    /// * `mean` - Optional mean values for each channel (defaults to [0.485, 0.456, 0.406])
    /// * `std` - Optional standard deviation values for each channel (defaults to [0.229, 0.224, 0.225])
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// * Scale is less than or equal to 0
    /// * Any standard deviation value is less than or equal to 0
    /// * The resulting coefficients are not finite
    pub fn new(
        scale: Option<f32>,
        mean: Option<[f32; 3]>,
        std: Option<[f32; 3]>,
    ) -> Result<Self, OCRError> {
        let scale = scale.unwrap_or(DEFAULT_NORMALIZE_SCALE);
        let mean = mean.unwrap_or(DEFAULT_NORMALIZE_MEAN);
        let std = std.unwrap_or(DEFAULT_NORMALIZE_STD);

        if scale <= 0.0 {
            return Err(OCRError::config_error(format!(
                "scale must be greater than 0, got {scale}"
            )));
        }

        for (i, &s) in std.iter().enumerate() {
            if s <= 0.0 {
                return Err(OCRError::config_error(format!(
                    "std[{i}] must be greater than 0, got {s}"
                )));
            }
        }

        let normalizer = Self::from_stats(scale, mean, std);
        normalizer.validate_config()?;
        Ok(normalizer)
    }

    fn from_stats(scale: f32, mean: [f32; 3], std: [f32; 3]) -> Self {
        Self {
            alpha: std.map(|s| scale / s),
            beta: [0, 1, 2].map(|c| -mean[c] / std[c]),
        }
    }

    /// Validates that every coefficient is finite.
    pub fn validate_config(&self) -> Result<(), OCRError> {
        for (i, &alpha) in self.alpha.iter().enumerate() {
            if !alpha.is_finite() {
                return Err(OCRError::config_error(format!(
                    "alpha[{i}] is not finite: {alpha}"
                )));
            }
        }

        for (i, &beta) in self.beta.iter().enumerate() {
            if !beta.is_finite() {
                return Err(OCRError::config_error(format!(
                    "beta[{i}] is not finite: {beta}"
                )));
            }
        }

        Ok(())
    }

    /// Normalizes one channel value.
    #[inline]
    pub fn apply_value(&self, value: u8, channel: usize) -> f32 {
        value as f32 * self.alpha[channel] + self.beta[channel]
    }
}

/// Which of the two batch transforms are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLayout {
    /// Apply per-channel normalization (f32 output)
    pub normalize: bool,
    /// Permute HWC to CHW
    pub permute: bool,
}

impl Default for BatchLayout {
    fn default() -> Self {
        Self {
            normalize: true,
            permute: true,
        }
    }
}

impl BatchLayout {
    /// Channel order of the produced tensor.
    pub fn order(&self) -> ChannelOrder {
        if self.permute {
            ChannelOrder::CHW
        } else {
            ChannelOrder::HWC
        }
    }

    /// Tensor shape for `batch` images of `width` x `height`.
    pub fn shape(&self, batch: usize, width: usize, height: usize) -> (usize, usize, usize, usize) {
        match self.order() {
            ChannelOrder::CHW => (batch, RGB_CHANNELS, height, width),
            ChannelOrder::HWC => (batch, height, width, RGB_CHANNELS),
        }
    }
}

/// Whole-batch normalization and permutation into a reusable buffer.
#[derive(Debug, Clone)]
pub struct NormalizationStage {
    normalizer: NormalizeImage,
    layout: BatchLayout,
    f32_buffer: Tensor4D,
    u8_buffer: Array4<u8>,
}

impl NormalizationStage {
    pub fn new(normalizer: NormalizeImage, layout: BatchLayout) -> Self {
        Self {
            normalizer,
            layout,
            f32_buffer: Tensor4D::zeros((0, 0, 0, 0)),
            u8_buffer: Array4::from_elem((0, 0, 0, 0), 0u8),
        }
    }

    pub fn normalizer(&self) -> &NormalizeImage {
        &self.normalizer
    }

    pub fn layout(&self) -> BatchLayout {
        self.layout
    }

    /// Writes `images` into the working buffer and returns a view of it.
    ///
    /// All images must share one size. The buffer is only reallocated when
    /// the batch shape changes; every element is overwritten on each call.
    ///
    /// # Errors
    /// * `OCRError::PreconditionViolation` if image sizes differ
    pub fn run(&mut self, images: &[RgbImage], parallel: bool) -> Result<TensorView<'_>, OCRError> {
        let (width, height) = validate_uniform_batch(images)?.unwrap_or((0, 0));
        let shape = self.layout.shape(images.len(), width as usize, height as usize);
        let order = self.layout.order();

        if self.layout.normalize {
            let normalizer = self.normalizer;
            write_batch(
                &mut self.f32_buffer,
                shape,
                images,
                order,
                parallel,
                move |v, c| normalizer.apply_value(v, c),
            );
            Ok(TensorView::cpu(TensorData::F32(self.f32_buffer.view()), order))
        } else {
            write_batch(&mut self.u8_buffer, shape, images, order, parallel, |v, _| v);
            Ok(TensorView::cpu(TensorData::U8(self.u8_buffer.view()), order))
        }
    }
}

fn write_batch<T, F>(
    buffer: &mut Array4<T>,
    shape: (usize, usize, usize, usize),
    images: &[RgbImage],
    order: ChannelOrder,
    parallel: bool,
    map: F,
) where
    T: Copy + Default + Send + Sync,
    F: Fn(u8, usize) -> T + Sync,
{
    if buffer.dim() != shape {
        *buffer = Array4::from_elem(shape, T::default());
    }

    if parallel {
        buffer
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .zip(images.par_iter())
            .for_each(|(dst, img)| write_image(img, dst, order, &map));
    } else {
        for (dst, img) in buffer.axis_iter_mut(Axis(0)).zip(images) {
            write_image(img, dst, order, &map);
        }
    }
}

/// Writes one interleaved RGB image into its batch slot in the requested order.
fn write_image<T, F>(img: &RgbImage, mut dst: ArrayViewMut3<'_, T>, order: ChannelOrder, map: &F)
where
    F: Fn(u8, usize) -> T,
{
    for (x, y, px) in img.enumerate_pixels() {
        let (x, y) = (x as usize, y as usize);
        for (c, &v) in px.0.iter().enumerate() {
            let index = match order {
                ChannelOrder::CHW => [c, y, x],
                ChannelOrder::HWC => [y, x, c],
            };
            dst[index] = map(v, c);
        }
    }
}
