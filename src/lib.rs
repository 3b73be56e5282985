//! # OAR Detection Preprocessing
//!
//! Batch-aware image preprocessing for DB (Differentiable Binarization) text
//! detection models. A batch of arbitrarily sized RGB images goes in; one
//! uniformly shaped tensor and a per-image geometry table come out.
//!
//! ## Features
//!
//! - Static, two-threshold and legacy single-threshold sizing rules
//! - Resize then bottom/right padding to a shared batch canvas
//! - Independent normalization and HWC -> CHW permutation switches
//! - Reusable tensor buffer, handed out as a borrowed view
//! - Rayon parallelism above a configurable batch size
//! - JSON-loadable, validated configuration
//!
//! ## Modules
//!
//! * [`core`] - Configuration, errors, tensor descriptors and validation
//! * [`predictor`] - The detector preprocessor and its builder
//! * [`processors`] - Sizing, resize/pad and normalization stages
//! * [`utils`] - Image and file loading, logging setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oar_det_preprocess::prelude::*;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut preprocessor = DBDetectorPreprocessor::builder()
//!     .longside_size(960)
//!     .shortside_size(540)
//!     .build()?;
//!
//! let mut images = vec![load_image(Path::new("document.jpg"))?];
//! let tensor = preprocessor.apply(&mut images)?;
//! println!("tensor shape: {:?}", tensor.shape());
//!
//! for geo in preprocessor.geometry() {
//!     println!("{}x{} -> {}x{}", geo.src_w, geo.src_h, geo.dst_w, geo.dst_h);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ### JSON Configuration
//!
//! ```rust
//! use oar_det_preprocess::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DetPreprocessConfig::from_json_str(
//!     r#"{ "static_shape_infer": true, "det_image_shape": [3, 736, 736] }"#,
//! )?;
//! let preprocessor = DBDetectorPreprocessor::new(config)?;
//! assert!(preprocessor.config().static_shape_infer);
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod core;
pub mod predictor;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
///
/// ```rust
/// use oar_det_preprocess::prelude::*;
/// ```
///
/// Included items:
/// - The preprocessor and its builder (`DBDetectorPreprocessor`, `DBDetectorPreprocessorBuilder`)
/// - Configuration (`DetPreprocessConfig`, `LogConfig`, `SizingRule`)
/// - Outputs (`TensorView`, `OwnedTensor`, `ImageGeometry`, `ChannelOrder`)
/// - Essential error and result types (`OCRError`, `OcrResult`)
/// - Basic image loading (`load_image`, `load_images_batch`)
pub mod prelude {
    pub use crate::predictor::{
        DBDetectorPreprocessor, DBDetectorPreprocessorBuilder, DetPreprocessOutput,
    };

    pub use crate::core::config::{DetPreprocessConfig, LogConfig};
    pub use crate::core::tensor::{DataType, OwnedTensor, TensorView};
    pub use crate::processors::{ChannelOrder, ImageGeometry, SizingRule};

    // Error Handling (essential)
    pub use crate::core::{OCRError, OcrResult};

    // Image Utility (minimal)
    pub use crate::utils::{load_image, load_images_batch};
}
