//! Error types for the detection preprocessing pipeline.
//!
//! This module defines the error types that can occur while sizing, resizing,
//! padding and normalizing a batch of images, together with helper
//! constructors that attach context to them.

use thiserror::Error;

/// Enum representing different stages of the preprocessing pipeline.
///
/// This enum is used to identify which stage an error occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessingStage {
    /// Error occurred during image resizing.
    Resize,
    /// Error occurred during image padding.
    Pad,
    /// Error occurred during batch processing.
    BatchProcessing,
    /// Generic processing error.
    Generic,
}

impl std::fmt::Display for ProcessingStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProcessingStage::Resize => write!(f, "resize"),
            ProcessingStage::Pad => write!(f, "pad"),
            ProcessingStage::BatchProcessing => write!(f, "batch processing"),
            ProcessingStage::Generic => write!(f, "processing"),
        }
    }
}

/// Errors raised by the primitive image operators (resize, pad).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageProcessError {
    /// The requested output size has a zero dimension.
    #[error("invalid target size {width}x{height}")]
    InvalidTargetSize { width: u32, height: u32 },

    /// The padded canvas would overflow `u32`.
    #[error("padding {extra} pixels onto a side of {side} overflows")]
    PaddingOverflow { side: u32, extra: u32 },
}

/// Enum representing the errors that can occur in the preprocessing pipeline.
#[derive(Error, Debug)]
pub enum OCRError {
    /// A source or target geometry cannot be used for size computation
    /// (zero dimension, degenerate ratio, canvas smaller than target).
    #[error("invalid geometry: {message}")]
    InvalidGeometry {
        /// A message describing the geometry problem.
        message: String,
    },

    /// Input violated a precondition of the call (malformed image, mismatched
    /// batch dimensions).
    #[error("precondition violated: {message}")]
    PreconditionViolation {
        /// A message describing the violated precondition.
        message: String,
    },

    /// The configuration requests a mode the pipeline cannot run.
    #[error("unsupported configuration: {message}")]
    UnsupportedConfiguration {
        /// A message describing the unsupported configuration.
        message: String,
    },

    /// Error occurred during processing.
    #[error("{kind} failed: {context}")]
    Processing {
        /// The stage of processing where the error occurred.
        kind: ProcessingStage,
        /// Additional context about the error.
        context: String,
        /// The underlying error that caused this error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// Error occurred while loading an image.
    #[error("image load")]
    ImageLoad(#[source] image::ImageError),

    /// Error while parsing a JSON configuration.
    #[error("json")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl OCRError {
    /// Creates an `InvalidGeometry` error.
    pub fn invalid_geometry(message: impl Into<String>) -> Self {
        Self::InvalidGeometry {
            message: message.into(),
        }
    }

    /// Creates a `PreconditionViolation` error.
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::PreconditionViolation {
            message: message.into(),
        }
    }

    /// Creates an `UnsupportedConfiguration` error.
    pub fn unsupported_config(message: impl Into<String>) -> Self {
        Self::UnsupportedConfiguration {
            message: message.into(),
        }
    }

    /// Creates an OCRError for processing operations.
    ///
    /// # Arguments
    ///
    /// * `kind` - The stage of processing where the error occurred.
    /// * `context` - Additional context about the error.
    /// * `error` - The underlying error that caused this error.
    pub fn processing_error(
        kind: ProcessingStage,
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind,
            context: context.to_string(),
            source: Box::new(error),
        }
    }

    /// Creates an OCRError for resize operations.
    pub fn resize_error(
        context: &str,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::processing_error(ProcessingStage::Resize, context, error)
    }

    /// Creates an OCRError for pad operations.
    pub fn pad_error(context: &str, error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::processing_error(ProcessingStage::Pad, context, error)
    }

    /// Creates an OCRError for configuration errors.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Wraps a failure for a single batch item so the caller can tell which
    /// image aborted the batch.
    ///
    /// The index is reported 1-based.
    pub fn batch_item_error(
        stage: ProcessingStage,
        index: usize,
        total: usize,
        error: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Processing {
            kind: ProcessingStage::BatchProcessing,
            context: format!("{} failed for item {}/{}", stage, index + 1, total),
            source: Box::new(error),
        }
    }

    /// Attaches the 1-based position of the failing batch item.
    ///
    /// Geometry, precondition and configuration errors keep their variant and
    /// gain an `item i/n: ` prefix. Processing errors keep their stage. Any
    /// other error is wrapped with [`batch_item_error`](Self::batch_item_error).
    pub fn at_batch_item(self, index: usize, total: usize) -> Self {
        let prefix = format!("item {}/{}", index + 1, total);
        match self {
            Self::InvalidGeometry { message } => Self::InvalidGeometry {
                message: format!("{prefix}: {message}"),
            },
            Self::PreconditionViolation { message } => Self::PreconditionViolation {
                message: format!("{prefix}: {message}"),
            },
            Self::UnsupportedConfiguration { message } => Self::UnsupportedConfiguration {
                message: format!("{prefix}: {message}"),
            },
            Self::Processing {
                kind,
                context,
                source,
            } => Self::Processing {
                kind,
                context: format!("{prefix}: {context}"),
                source,
            },
            other => Self::batch_item_error(ProcessingStage::Generic, index, total, other),
        }
    }
}

impl From<image::ImageError> for OCRError {
    fn from(error: image::ImageError) -> Self {
        Self::ImageLoad(error)
    }
}

impl From<crate::core::config::ConfigError> for OCRError {
    fn from(error: crate::core::config::ConfigError) -> Self {
        use crate::core::config::ConfigError;
        match error {
            ConfigError::Unsupported { message } => Self::UnsupportedConfiguration { message },
            other => Self::ConfigError {
                message: other.to_string(),
            },
        }
    }
}

/// Convenient result alias for preprocessing operations.
pub type OcrResult<T> = Result<T, OCRError>;
