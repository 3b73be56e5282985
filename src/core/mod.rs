//! The core module of the preprocessing pipeline.
//!
//! This module contains the fundamental components shared by the processors
//! and the detector preprocessor:
//! - Configuration management
//! - Constants used throughout the pipeline
//! - Error handling
//! - Tensor descriptors
//! - Input validation
//!
//! It also provides re-exports of commonly used types and functions for convenience.

pub mod config;
pub mod constants;
pub mod errors;
#[macro_use]
pub mod macros;
pub mod tensor;
pub mod validation;

pub use crate::utils::{init_tracing, load_image, load_images_batch};
pub use config::{ConfigError, ConfigValidator, DetPreprocessConfig, LogConfig};
pub use constants::*;
pub use errors::{ImageProcessError, OCRError, OcrResult, ProcessingStage};
pub use tensor::{DataType, Device, OwnedTensor, Tensor4D, TensorData, TensorView};
pub use validation::{
    validate_batch_image, validate_same_length, validate_source_dimensions,
    validate_uniform_batch,
};
