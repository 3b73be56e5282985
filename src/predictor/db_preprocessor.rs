//! DB (Differentiable Binarization) text detection preprocessor
//!
//! This module turns a batch of arbitrarily sized RGB images into one
//! network-ready tensor for a DB text detector, and records the per-image
//! geometry needed to map detections back to source coordinates.
//!
//! Each call runs in two passes:
//! 1. compute the target size of every image and the batch canvas (the
//!    element-wise maximum of all targets);
//! 2. resize every image to its target, pad it bottom/right to the canvas,
//!    then normalize and lay out the whole batch in one write.
//!
//! The main components are:
//! - `DBDetectorPreprocessor`: The preprocessor holding configuration and working buffers
//! - `DBDetectorPreprocessorBuilder`: Builder for creating preprocessor instances
//! - `DetPreprocessOutput`: Owned result for callers that cannot hold a borrow

use crate::core::config::{ConfigValidatorExt, DetPreprocessConfig, LogConfig};
use crate::core::tensor::{OwnedTensor, TensorView};
use crate::core::{OCRError, validate_batch_image};
use crate::processors::{
    BatchGeometryTracker, BatchLayout, ImageGeometry, ImageTransformPipeline, NormalizationStage,
    NormalizeImage, PadOp, ResizeOp, SizingRule, TargetSizeCalculator,
};
use crate::{log_info, log_warn};
use image::RgbImage;
use rayon::prelude::*;
use tracing::debug;

/// Owned output of [`DBDetectorPreprocessor::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct DetPreprocessOutput {
    /// Batch tensor (`f32` when normalized, raw `u8` otherwise)
    pub tensor: OwnedTensor,
    /// Per-image geometry, index-aligned with the input batch
    pub geometry: Vec<ImageGeometry>,
}

/// Batch preprocessor for DB text detection.
///
/// The configuration is fixed at construction. The geometry table and the
/// tensor buffer are reused across calls and overwritten by each one.
#[derive(Debug, Clone)]
pub struct DBDetectorPreprocessor {
    config: DetPreprocessConfig,
    calculator: TargetSizeCalculator,
    pipeline: ImageTransformPipeline,
    stage: NormalizationStage,
    tracker: BatchGeometryTracker,
    logging: LogConfig,
}

impl DBDetectorPreprocessor {
    /// Creates a new `DBDetectorPreprocessor`
    ///
    /// # Errors
    ///
    /// * `OCRError::UnsupportedConfiguration` for an unusable static shape
    /// * `OCRError::ConfigError` for any other invalid value
    pub fn new(config: DetPreprocessConfig) -> Result<Self, OCRError> {
        let config = config.validate_and_wrap_ocr_error()?;

        let calculator = TargetSizeCalculator::new(config.sizing_policy())
            .with_max_target_side(config.max_target_side);
        let pipeline =
            ImageTransformPipeline::new(ResizeOp::default(), PadOp::new(config.pad_value));
        let normalizer =
            NormalizeImage::new(Some(config.scale), Some(config.mean), Some(config.std))?;
        let layout = BatchLayout {
            normalize: config.normalize_enabled(),
            permute: config.permute_enabled(),
        };

        Ok(Self {
            logging: config.logging,
            calculator,
            pipeline,
            stage: NormalizationStage::new(normalizer, layout),
            tracker: BatchGeometryTracker::new(),
            config,
        })
    }

    /// Returns a builder with default settings.
    pub fn builder() -> DBDetectorPreprocessorBuilder {
        DBDetectorPreprocessorBuilder::new()
    }

    pub fn config(&self) -> &DetPreprocessConfig {
        &self.config
    }

    /// Geometry of the most recent batch, one record per input image.
    pub fn geometry(&self) -> &[ImageGeometry] {
        self.tracker.as_slice()
    }

    /// Preprocesses a batch in place and returns a view of the batch tensor.
    ///
    /// On success every image in `images` has been resized and padded to the
    /// batch canvas, and [`geometry`](Self::geometry) holds one record per
    /// image. The returned view borrows the preprocessor's working buffer and
    /// stays valid until the next call.
    ///
    /// An empty batch yields a tensor with batch size 0 and an empty
    /// geometry table.
    ///
    /// # Errors
    ///
    /// * `OCRError::PreconditionViolation` if an image has no pixels or a
    ///   side above [`MAX_DIMENSION`](crate::core::validation::MAX_DIMENSION)
    /// * `OCRError::InvalidGeometry` if a target size cannot be computed or
    ///   exceeds `max_target_side`
    /// * `OCRError::Processing` if resizing, padding or normalization fails
    ///
    /// The geometry table is unspecified after an error.
    pub fn apply(&mut self, images: &mut [RgbImage]) -> Result<TensorView<'_>, OCRError> {
        for (i, img) in images.iter().enumerate() {
            validate_batch_image(img, i)?;
        }

        let batch_size = images.len();
        let parallel = batch_size > self.config.parallel_threshold;
        self.tracker.reset(batch_size);

        // Pass 1: geometry table.
        let calculator = &self.calculator;
        if parallel {
            self.tracker
                .records_mut()
                .par_iter_mut()
                .zip(images.par_iter())
                .enumerate()
                .try_for_each(|(i, (record, img))| {
                    *record = calculator
                        .compute(img.width(), img.height())
                        .map_err(|e| e.at_batch_item(i, batch_size))?;
                    Ok::<(), OCRError>(())
                })?;
        } else {
            for (i, (record, img)) in self
                .tracker
                .records_mut()
                .iter_mut()
                .zip(images.iter())
                .enumerate()
            {
                *record = calculator
                    .compute(img.width(), img.height())
                    .map_err(|e| e.at_batch_item(i, batch_size))?;
            }
        }

        let canvas = self.tracker.max_target();
        let target_area: u64 = self.tracker.as_slice().iter().map(|g| g.target_area()).sum();
        let canvas_area = u64::from(canvas.0) * u64::from(canvas.1) * batch_size as u64;
        if target_area * 2 < canvas_area {
            log_warn!(
                self.logging,
                canvas_w = canvas.0,
                canvas_h = canvas.1,
                target_area,
                canvas_area,
                "more than half of the detection batch is padding"
            );
        }
        debug!(
            "batch of {} images, canvas {}x{}, parallel: {}",
            batch_size, canvas.0, canvas.1, parallel
        );

        // Pass 2: resize + pad, then normalize the whole batch.
        self.pipeline
            .transform_batch(images, self.tracker.as_slice(), canvas, parallel)?;

        log_info!(
            self.logging,
            batch_size,
            canvas_w = canvas.0,
            canvas_h = canvas.1,
            "preprocessed detection batch"
        );

        self.stage.run(images, parallel)
    }

    /// Owned form of [`apply`](Self::apply).
    ///
    /// Takes the images by value and returns a copy of the tensor together
    /// with the geometry table.
    pub fn run(&mut self, mut images: Vec<RgbImage>) -> Result<DetPreprocessOutput, OCRError> {
        let tensor = self.apply(&mut images)?.to_owned_tensor();
        Ok(DetPreprocessOutput {
            tensor,
            geometry: self.tracker.to_vec(),
        })
    }
}

/// Builder for `DBDetectorPreprocessor`
///
/// Starts from the default configuration; every setter overrides one field.
#[derive(Debug, Clone, Default)]
pub struct DBDetectorPreprocessorBuilder {
    config: DetPreprocessConfig,
}

impl DBDetectorPreprocessorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing configuration.
    pub fn from_config(config: DetPreprocessConfig) -> Self {
        Self { config }
    }

    /// Uses a fixed `(channels, height, width)` shape for every image.
    pub fn static_shape(mut self, shape: [u32; 3]) -> Self {
        self.config.static_shape_infer = true;
        self.config.det_image_shape = shape;
        self
    }

    /// Sets the long-side minimum of the two-threshold rule.
    pub fn longside_size(mut self, size: u32) -> Self {
        self.config.longside_size = size;
        self
    }

    /// Sets the short-side minimum of the two-threshold rule.
    pub fn shortside_size(mut self, size: u32) -> Self {
        self.config.shortside_size = size;
        self
    }

    /// Sets the larger-side limit of the legacy rule.
    pub fn max_side_len(mut self, len: u32) -> Self {
        self.config.max_side_len = len;
        self
    }

    /// Sets the upper bound on either side of a computed target size.
    pub fn max_target_side(mut self, side: u32) -> Self {
        self.config.max_target_side = side;
        self
    }

    pub fn sizing_rule(mut self, rule: SizingRule) -> Self {
        self.config.sizing_rule = rule;
        self
    }

    pub fn disable_normalize(mut self) -> Self {
        self.config.disable_normalize = true;
        self
    }

    pub fn disable_permute(mut self) -> Self {
        self.config.disable_permute = true;
        self
    }

    pub fn alignment_base(mut self, base: u32) -> Self {
        self.config.alignment_base = base;
        self
    }

    /// Sets the normalization statistics.
    pub fn normalize_stats(mut self, scale: f32, mean: [f32; 3], std: [f32; 3]) -> Self {
        self.config.scale = scale;
        self.config.mean = mean;
        self.config.std = std;
        self
    }

    pub fn pad_value(mut self, value: [u8; 3]) -> Self {
        self.config.pad_value = value;
        self
    }

    /// Batches larger than `threshold` are processed on the rayon pool.
    pub fn parallel_threshold(mut self, threshold: usize) -> Self {
        self.config.parallel_threshold = threshold;
        self
    }

    pub fn logging(mut self, logging: LogConfig) -> Self {
        self.config.logging = logging;
        self
    }

    /// Validates the configuration and builds the preprocessor.
    pub fn build(self) -> Result<DBDetectorPreprocessor, OCRError> {
        DBDetectorPreprocessor::new(self.config)
    }
}
