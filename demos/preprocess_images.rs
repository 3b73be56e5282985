//! Detection Preprocessing Example
//!
//! This example loads a batch of images, runs the DB detection preprocessor
//! over them and reports the resulting tensor and per-image geometry.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example preprocess_images -- [OPTIONS] <IMAGES>...
//! ```
//!
//! # Arguments
//!
//! * `-c, --config` - JSON configuration file (other sizing flags are ignored)
//! * `--longside` / `--shortside` - Two-threshold sizing minimums
//! * `--legacy` - Use the single-threshold rule with `--max-side-len`
//! * `--static-shape` - Fixed `C,H,W` shape for every image
//! * `--no-normalize` / `--no-permute` - Disable the batch transforms
//! * `<IMAGES>...` - Paths to input images to process
//!
//! # Example
//!
//! ```bash
//! cargo run --example preprocess_images -- --longside 1280 --shortside 736 a.jpg b.png
//! ```

use clap::Parser;
use oar_det_preprocess::prelude::*;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

/// Command-line arguments for the detection preprocessing example
#[derive(Parser)]
#[command(name = "preprocess_images")]
#[command(about = "Detection Preprocessing Example - batches images into a detector tensor")]
struct Args {
    /// Paths to input images to process
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Long-side minimum for two-threshold sizing
    #[arg(long, default_value = "960")]
    longside: u32,

    /// Short-side minimum for two-threshold sizing
    #[arg(long, default_value = "540")]
    shortside: u32,

    /// Use the legacy single-threshold sizing rule
    #[arg(long)]
    legacy: bool,

    /// Larger-side limit for the legacy rule
    #[arg(long, default_value = "960")]
    max_side_len: u32,

    /// Fixed shape as C,H,W (e.g. 3,960,960)
    #[arg(long, value_delimiter = ',', num_args = 3)]
    static_shape: Option<Vec<u32>>,

    /// Keep raw u8 pixel values
    #[arg(long)]
    no_normalize: bool,

    /// Keep HWC layout
    #[arg(long)]
    no_permute: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn build_preprocessor(args: &Args) -> Result<DBDetectorPreprocessor, OCRError> {
    if let Some(path) = &args.config {
        info!("Loading configuration from {}", path.display());
        let config = DetPreprocessConfig::from_json_file(path)?;
        return DBDetectorPreprocessorBuilder::from_config(config).build();
    }

    let mut builder = DBDetectorPreprocessor::builder()
        .longside_size(args.longside)
        .shortside_size(args.shortside)
        .max_side_len(args.max_side_len);
    if args.legacy {
        builder = builder.sizing_rule(SizingRule::LegacySingleThreshold);
    }
    if let Some(&[c, h, w]) = args.static_shape.as_deref() {
        builder = builder.static_shape([c, h, w]);
    }
    if args.no_normalize {
        builder = builder.disable_normalize();
    }
    if args.no_permute {
        builder = builder.disable_permute();
    }
    builder.build()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing for logging
    oar_det_preprocess::utils::init_tracing();

    let args = Args::parse();

    info!("Detection Preprocessing Example");

    let existing_images: Vec<PathBuf> = args
        .images
        .iter()
        .filter(|path| {
            let exists = path.exists();
            if !exists {
                error!("Image file not found: {}", path.display());
            }
            exists
        })
        .cloned()
        .collect();

    if existing_images.is_empty() {
        error!("No valid image files found");
        return Err("No valid image files found".into());
    }

    let mut preprocessor = build_preprocessor(&args)?;
    if args.verbose {
        info!("Configuration: {:?}", preprocessor.config());
    }

    let mut images = load_images_batch(&existing_images)?;
    info!("Loaded {} images", images.len());

    let start = Instant::now();
    let tensor = preprocessor.apply(&mut images)?;
    let duration = start.elapsed();

    info!(
        "Preprocessing completed in {:.2}ms",
        duration.as_secs_f64() * 1000.0
    );
    info!(
        "Tensor: shape {:?}, dtype {:?}, layout {:?}, {} bytes",
        tensor.shape(),
        tensor.dtype(),
        tensor.layout(),
        tensor.nbytes()
    );

    for (path, geo) in existing_images.iter().zip(preprocessor.geometry()) {
        info!(
            "{}: {}x{} -> {}x{} (ratio {:.3}, {:.3})",
            path.display(),
            geo.src_w,
            geo.src_h,
            geo.dst_w,
            geo.dst_h,
            geo.ratio_w(),
            geo.ratio_h()
        );
    }

    Ok(())
}
