//! Utility functions for the preprocessing pipeline.
//!
//! This module provides image and file loading helpers and logging setup.

pub mod image;

pub use image::{
    create_rgb_image, load_image, load_image_from_bytes, load_images_batch,
    load_images_batch_with_threshold, read_binary_from_file,
};

/// Initializes the tracing subscriber for logging.
///
/// This function sets up the tracing subscriber with environment filter and formatting layer.
/// It's typically called at the start of an application to enable logging.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
