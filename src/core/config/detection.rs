//! Configuration for the DB text detection preprocessor.

use super::errors::{ConfigError, ConfigValidator};
use super::logging::LogConfig;
use crate::core::OCRError;
use crate::core::constants::*;
use crate::processors::{SizingPolicy, SizingRule};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration surface of [`DBDetectorPreprocessor`].
///
/// The configuration is moved into the preprocessor when it is built and is
/// read-only afterwards.
///
/// [`DBDetectorPreprocessor`]: crate::predictor::DBDetectorPreprocessor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetPreprocessConfig {
    /// Use `det_image_shape` for every image instead of computing a size.
    pub static_shape_infer: bool,
    /// Fixed `(channels, height, width)` used when `static_shape_infer` is set.
    pub det_image_shape: [u32; 3],
    /// Long-side minimum for two-threshold sizing.
    pub longside_size: u32,
    /// Short-side minimum for two-threshold sizing.
    pub shortside_size: u32,
    /// Larger-side limit for the legacy single-threshold rule.
    pub max_side_len: u32,
    /// Upper bound on either side of a computed target size.
    pub max_target_side: u32,
    /// Which dynamic sizing rule to apply.
    pub sizing_rule: SizingRule,
    /// Skip the `(v - mean) * scale` transform; the tensor keeps raw `u8` values.
    pub disable_normalize: bool,
    /// Skip the HWC -> CHW permutation.
    pub disable_permute: bool,
    /// Quantization granularity of computed sizes.
    pub alignment_base: u32,
    /// Per-channel mean, in units of `scale`-ed pixels.
    pub mean: [f32; 3],
    /// Per-channel standard deviation.
    pub std: [f32; 3],
    /// Factor applied to raw pixel values before subtracting the mean.
    pub scale: f32,
    /// Fill color for the bottom/right batch padding.
    pub pad_value: [u8; 3],
    /// Batches with more images than this are processed with rayon.
    pub parallel_threshold: usize,
    /// Diagnostic switches.
    pub logging: LogConfig,
}

impl Default for DetPreprocessConfig {
    fn default() -> Self {
        Self {
            static_shape_infer: false,
            det_image_shape: DEFAULT_DET_IMAGE_SHAPE,
            longside_size: DEFAULT_LONGSIDE_SIZE,
            shortside_size: DEFAULT_SHORTSIDE_SIZE,
            max_side_len: DEFAULT_MAX_SIDE_LEN,
            max_target_side: DEFAULT_MAX_TARGET_SIDE,
            sizing_rule: SizingRule::default(),
            disable_normalize: false,
            disable_permute: false,
            alignment_base: DEFAULT_ALIGNMENT_BASE,
            mean: DEFAULT_NORMALIZE_MEAN,
            std: DEFAULT_NORMALIZE_STD,
            scale: DEFAULT_NORMALIZE_SCALE,
            pad_value: DEFAULT_PAD_VALUE,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            logging: LogConfig::default(),
        }
    }
}

impl DetPreprocessConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// Missing fields take their default values.
    pub fn from_json_str(json: &str) -> Result<Self, OCRError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, OCRError> {
        let contents = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&contents)
    }

    /// Resolves the sizing policy described by this configuration.
    ///
    /// Static shape inference takes precedence over the dynamic rules.
    pub fn sizing_policy(&self) -> SizingPolicy {
        if self.static_shape_infer {
            return SizingPolicy::StaticShape {
                width: self.det_image_shape[2],
                height: self.det_image_shape[1],
            };
        }
        match self.sizing_rule {
            SizingRule::TwoThreshold => SizingPolicy::TwoThreshold {
                long_min: self.longside_size,
                short_min: self.shortside_size,
                base: self.alignment_base,
            },
            SizingRule::LegacySingleThreshold => SizingPolicy::LegacySingleThreshold {
                max_size_len: self.max_side_len,
            },
        }
    }

    /// Returns true if the numeric normalization runs.
    pub fn normalize_enabled(&self) -> bool {
        !self.disable_normalize
    }

    /// Returns true if the channel permutation runs.
    pub fn permute_enabled(&self) -> bool {
        !self.disable_permute
    }
}

impl ConfigValidator for DetPreprocessConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        self.validate_positive_u32(self.alignment_base, "alignment_base")?;
        self.validate_positive_u32(self.max_target_side, "max_target_side")?;

        if self.static_shape_infer {
            let [channels, height, width] = self.det_image_shape;
            if channels as usize != RGB_CHANNELS || height == 0 || width == 0 {
                return Err(ConfigError::Unsupported {
                    message: format!(
                        "static shape inference needs a {}-channel det_image_shape with non-zero sides, got {:?}",
                        RGB_CHANNELS, self.det_image_shape
                    ),
                });
            }
            if height > self.max_target_side || width > self.max_target_side {
                return Err(ConfigError::Unsupported {
                    message: format!(
                        "static shape {}x{} exceeds max_target_side {}",
                        width, height, self.max_target_side
                    ),
                });
            }
        } else {
            match self.sizing_rule {
                SizingRule::TwoThreshold => {
                    self.validate_positive_u32(self.longside_size, "longside_size")?;
                    self.validate_positive_u32(self.shortside_size, "shortside_size")?;
                }
                SizingRule::LegacySingleThreshold => {
                    self.validate_positive_u32(self.max_side_len, "max_side_len")?;
                }
            }
        }

        self.validate_positive_f32(self.scale, "scale")?;
        for (i, &s) in self.std.iter().enumerate() {
            self.validate_positive_f32(s, &format!("std[{i}]"))?;
        }
        if let Some(m) = self.mean.iter().find(|m| !m.is_finite()) {
            return Err(ConfigError::InvalidConfig {
                message: format!("mean values must be finite, got {m}"),
            });
        }

        Ok(())
    }

    fn get_defaults() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = DetPreprocessConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.sizing_policy(),
            SizingPolicy::TwoThreshold {
                long_min: 960,
                short_min: 540,
                base: 32
            }
        );
    }

    #[test]
    fn test_static_shape_takes_precedence() {
        let config = DetPreprocessConfig {
            static_shape_infer: true,
            det_image_shape: [3, 640, 1280],
            sizing_rule: SizingRule::LegacySingleThreshold,
            ..Default::default()
        };
        assert_eq!(
            config.sizing_policy(),
            SizingPolicy::StaticShape {
                width: 1280,
                height: 640
            }
        );
    }

    #[test]
    fn test_static_shape_without_valid_shape_is_unsupported() {
        let config = DetPreprocessConfig {
            static_shape_infer: true,
            det_image_shape: [3, 0, 960],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Unsupported { .. })
        ));

        let config = DetPreprocessConfig {
            static_shape_infer: true,
            det_image_shape: [4, 960, 960],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Unsupported { .. })
        ));
    }

    #[test]
    fn test_max_target_side_limits_static_shape() {
        let config = DetPreprocessConfig {
            static_shape_infer: true,
            det_image_shape: [3, 960, 4096],
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::Unsupported { .. })
        ));

        let config = DetPreprocessConfig {
            max_target_side: 4096,
            ..config
        };
        assert!(config.validate().is_ok());

        let config = DetPreprocessConfig {
            max_target_side: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config = DetPreprocessConfig {
            alignment_base: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DetPreprocessConfig {
            std: [0.229, 0.0, 0.225],
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DetPreprocessConfig {
            sizing_rule: SizingRule::LegacySingleThreshold,
            max_side_len: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_str() {
        let config = DetPreprocessConfig::from_json_str(
            r#"{"longside_size": 1280, "shortside_size": 736, "disable_permute": true}"#,
        )
        .unwrap();
        assert_eq!(config.longside_size, 1280);
        assert_eq!(config.shortside_size, 736);
        assert!(config.disable_permute);
        assert!(!config.disable_normalize);
        assert_eq!(config.alignment_base, DEFAULT_ALIGNMENT_BASE);

        let err = DetPreprocessConfig::from_json_str(r#"{"alignment_base": 0}"#).unwrap_err();
        assert!(matches!(err, OCRError::ConfigError { .. }));

        let err = DetPreprocessConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, OCRError::Json(_)));
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("det.json");
        std::fs::write(
            &path,
            r#"{"static_shape_infer": true, "det_image_shape": [3, 736, 736]}"#,
        )
        .unwrap();

        let config = DetPreprocessConfig::from_json_file(&path).unwrap();
        assert!(config.static_shape_infer);
        assert_eq!(config.det_image_shape, [3, 736, 736]);

        let missing = DetPreprocessConfig::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(OCRError::Io(_))));
    }
}
