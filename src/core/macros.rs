//! Macros for the preprocessing pipeline.
//!
//! Logging helpers that respect a per-instance [`LogConfig`] instead of
//! process-wide switches.
//!
//! [`LogConfig`]: crate::core::config::LogConfig

/// Emits an info event if the given `LogConfig` allows it.
///
/// # Example
///
/// ```rust
/// use oar_det_preprocess::core::config::LogConfig;
/// use oar_det_preprocess::log_info;
///
/// let logging = LogConfig::default();
/// log_info!(logging, batch_size = 2, "preprocessed batch");
/// ```
#[macro_export]
macro_rules! log_info {
    ($cfg:expr, $($arg:tt)+) => {
        if $cfg.enable_info {
            ::tracing::info!($($arg)+);
        }
    };
}

/// Emits a warn event if the given `LogConfig` allows it.
#[macro_export]
macro_rules! log_warn {
    ($cfg:expr, $($arg:tt)+) => {
        if $cfg.enable_warning {
            ::tracing::warn!($($arg)+);
        }
    };
}
