//! Configuration error types and validation traits.

use thiserror::Error;

/// Errors that can occur during configuration validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Error indicating that a configuration is invalid.
    #[error("invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The configuration is well-formed but asks for a mode that cannot run,
    /// such as static shape inference without a usable fixed shape.
    #[error("unsupported configuration: {message}")]
    Unsupported { message: String },
}

/// A trait for validating configuration parameters.
///
/// Implementors provide `validate` and `get_defaults`; the remaining methods
/// are reusable checks for the parameter shapes used by preprocessing
/// configurations.
pub trait ConfigValidator {
    /// Validates the configuration.
    fn validate(&self) -> Result<(), ConfigError>;

    /// Returns the default configuration.
    fn get_defaults() -> Self
    where
        Self: Sized;

    /// Validates a float value is positive and finite.
    fn validate_positive_f32(&self, value: f32, field_name: &str) -> Result<(), ConfigError> {
        if !value.is_finite() || value <= 0.0 {
            Err(ConfigError::InvalidConfig {
                message: format!("{} must be greater than 0, got {}", field_name, value),
            })
        } else {
            Ok(())
        }
    }

    /// Validates a u32 value is positive.
    fn validate_positive_u32(&self, value: u32, field_name: &str) -> Result<(), ConfigError> {
        if value == 0 {
            Err(ConfigError::InvalidConfig {
                message: format!("{} must be greater than 0, got {}", field_name, value),
            })
        } else {
            Ok(())
        }
    }
}

/// Extension trait that wraps validation failures into `OCRError`.
pub trait ConfigValidatorExt: ConfigValidator {
    /// Validates configuration and converts any error into `OCRError`.
    ///
    /// `ConfigError::Unsupported` becomes `OCRError::UnsupportedConfiguration`,
    /// everything else becomes `OCRError::ConfigError`.
    fn validate_and_wrap_ocr_error(self) -> Result<Self, crate::core::errors::OCRError>
    where
        Self: Sized,
    {
        self.validate()?;
        Ok(self)
    }
}

impl<T: ConfigValidator> ConfigValidatorExt for T {}
