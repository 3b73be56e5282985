//! End-to-end behavior of the detection preprocessor.

use image::{Rgb, RgbImage};
use oar_det_preprocess::prelude::*;

fn solid(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
    RgbImage::from_pixel(width, height, Rgb(color))
}

fn quiet() -> DBDetectorPreprocessorBuilder {
    DBDetectorPreprocessor::builder().logging(LogConfig::silent())
}

#[test]
fn batch_is_padded_to_max_target() {
    let mut pre = quiet().build().unwrap();
    let mut images = vec![
        solid(500, 800, [255, 0, 0]),
        solid(800, 500, [0, 255, 0]),
        solid(1200, 1100, [0, 0, 255]),
    ];

    let shape = pre.apply(&mut images).unwrap().shape();
    let geometry = pre.geometry().to_vec();
    assert_eq!(geometry.len(), 3);

    let max_w = geometry.iter().map(|g| g.dst_w).max().unwrap();
    let max_h = geometry.iter().map(|g| g.dst_h).max().unwrap();
    assert_eq!(shape, [3, 3, max_h as usize, max_w as usize]);
    for img in &images {
        assert_eq!(img.dimensions(), (max_w, max_h));
    }

    assert_eq!(geometry[0], ImageGeometry::new(500, 800, 608, 960));
    assert_eq!(geometry[1], ImageGeometry::new(800, 500, 960, 608));
    // Both sides already exceed their minimums: aligned but not shrunk.
    assert_eq!(geometry[2], ImageGeometry::new(1200, 1100, 1216, 1120));
}

#[test]
fn padding_is_bottom_right_with_fill_value() {
    let mut pre = quiet()
        .pad_value([9, 9, 9])
        .disable_normalize()
        .disable_permute()
        .build()
        .unwrap();
    let mut images = vec![
        solid(500, 800, [200, 100, 50]),
        solid(800, 500, [200, 100, 50]),
    ];

    let view = pre.apply(&mut images).unwrap();
    assert_eq!(view.dtype(), DataType::U8);
    assert_eq!(view.layout(), ChannelOrder::HWC);
    assert_eq!(view.shape(), [2, 960, 960, 3]);

    let data = view.as_u8().unwrap();
    // Image 0 is 608 wide: content at the left, fill on the right.
    assert_eq!(data[[0, 0, 0, 0]], 200);
    assert_eq!(data[[0, 959, 607, 2]], 50);
    assert_eq!(data[[0, 0, 608, 0]], 9);
    // Image 1 is 608 high: content at the top, fill at the bottom.
    assert_eq!(data[[1, 607, 959, 1]], 100);
    assert_eq!(data[[1, 608, 0, 1]], 9);
}

#[test]
fn normalized_chw_values() {
    let mut pre = quiet()
        .normalize_stats(1.0 / 255.0, [0.5, 0.5, 0.5], [0.5, 0.5, 0.5])
        .build()
        .unwrap();
    let mut images = vec![solid(640, 640, [255, 0, 51])];

    let view = pre.apply(&mut images).unwrap();
    assert_eq!(view.dtype(), DataType::F32);
    assert_eq!(view.shape(), [1, 3, 960, 960]);

    let data = view.as_f32().unwrap();
    assert!((data[[0, 0, 10, 10]] - 1.0).abs() < 1e-5);
    assert!((data[[0, 1, 10, 10]] + 1.0).abs() < 1e-5);
    assert!((data[[0, 2, 10, 10]] + 0.6).abs() < 1e-5);
}

#[test]
fn geometry_is_overwritten_on_each_call() {
    let mut pre = quiet().build().unwrap();

    let mut first = vec![
        solid(100, 100, [0; 3]),
        solid(200, 50, [0; 3]),
        solid(30, 90, [0; 3]),
    ];
    pre.apply(&mut first).unwrap();
    assert_eq!(pre.geometry().len(), 3);

    let mut second = vec![solid(64, 32, [0; 3])];
    pre.apply(&mut second).unwrap();
    assert_eq!(pre.geometry().len(), 1);
    assert_eq!(pre.geometry()[0].src_w, 64);
    assert_eq!(pre.geometry()[0].src_h, 32);
}

#[test]
fn empty_batch_yields_empty_tensor() {
    let mut pre = quiet().build().unwrap();
    let mut images: Vec<RgbImage> = Vec::new();
    let view = pre.apply(&mut images).unwrap();
    assert_eq!(view.shape(), [0, 3, 0, 0]);
    assert!(view.is_empty());
    assert!(pre.geometry().is_empty());

    let mut hwc = quiet().disable_permute().build().unwrap();
    let view = hwc.apply(&mut images).unwrap();
    assert_eq!(view.shape(), [0, 0, 0, 3]);
}

#[test]
fn zero_sized_image_is_rejected() {
    let mut pre = quiet().build().unwrap();
    let mut images = vec![RgbImage::new(10, 0)];
    let err = pre.apply(&mut images).unwrap_err();
    assert!(matches!(err, OCRError::PreconditionViolation { .. }));
}

#[test]
fn static_shape_ignores_content() {
    let mut pre = quiet().static_shape([3, 640, 1280]).build().unwrap();
    let mut images = vec![solid(17, 3000, [1; 3]), solid(4000, 12, [2; 3])];

    let shape = pre.apply(&mut images).unwrap().shape();
    assert_eq!(shape, [2, 3, 640, 1280]);
    for geo in pre.geometry() {
        assert_eq!((geo.dst_w, geo.dst_h), (1280, 640));
    }

    // Running the already resized batch again changes nothing.
    let before = images.clone();
    pre.apply(&mut images).unwrap();
    assert_eq!(images, before);
}

#[test]
fn legacy_rule() {
    let mut pre = quiet()
        .sizing_rule(SizingRule::LegacySingleThreshold)
        .max_side_len(960)
        .build()
        .unwrap();
    let mut images = vec![solid(50, 100, [0; 3]), solid(1920, 1080, [0; 3])];

    pre.apply(&mut images).unwrap();
    assert_eq!(pre.geometry()[0], ImageGeometry::new(50, 100, 64, 96));
    assert_eq!(pre.geometry()[1], ImageGeometry::new(1920, 1080, 960, 544));
    assert_eq!(images[0].dimensions(), (960, 544));
}

#[test]
fn owned_run_matches_view() {
    let sources = vec![solid(300, 200, [10, 20, 30]), solid(90, 400, [40, 50, 60])];

    let mut pre = quiet().build().unwrap();
    let mut images = sources.clone();
    let expected = pre.apply(&mut images).unwrap().to_owned_tensor();
    let expected_geo = pre.geometry().to_vec();

    let output = pre.run(sources).unwrap();
    assert_eq!(output.tensor, expected);
    assert_eq!(output.geometry, expected_geo);
    assert_eq!(output.tensor.shape()[0], 2);
}

#[test]
fn config_from_json_builds_preprocessor() {
    let config = DetPreprocessConfig::from_json_str(
        r#"{ "disable_normalize": true, "pad_value": [255, 255, 255] }"#,
    )
    .unwrap();
    let mut pre = DBDetectorPreprocessor::new(config).unwrap();
    let mut images = vec![solid(600, 1000, [0; 3])];
    let view = pre.apply(&mut images).unwrap();
    assert_eq!(view.dtype(), DataType::U8);
    assert_eq!(view.layout(), ChannelOrder::CHW);
}

#[test]
fn elongated_image_is_bounded_by_max_target_side() {
    let config = DetPreprocessConfig::from_json_str(r#"{ "max_target_side": 2048 }"#).unwrap();
    let mut pre = DBDetectorPreprocessorBuilder::from_config(config)
        .logging(LogConfig::silent())
        .build()
        .unwrap();

    // 400x100 needs a 2176-pixel wide target.
    let mut images = vec![solid(120, 90, [0; 3]), solid(400, 100, [0; 3])];
    let err = pre.apply(&mut images).unwrap_err();
    assert!(matches!(err, OCRError::InvalidGeometry { .. }));
    assert!(err.to_string().contains("item 2/2"), "{err}");
    assert_eq!(images[1].dimensions(), (400, 100));

    let mut images = vec![solid(120, 90, [0; 3]), solid(300, 100, [0; 3])];
    let view = pre.apply(&mut images).unwrap();
    assert!(view.shape()[3] <= 2048);
}
