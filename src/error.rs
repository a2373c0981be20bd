// Error types for the tremor monitor
//
// This module defines custom error types for sensor acquisition, spectral engine
// setup, configuration and monitor lifecycle, with numeric error codes suitable
// for reporting over a constrained transport.

use std::fmt;
use tracing::error;

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling across
/// the crate boundary.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}

/// Log a sensor error with structured context
///
/// Sensor errors are transient: the caller abandons the current cycle and
/// retries on the next scheduled one.
pub fn log_sensor_error(err: &SensorError, context: &str) {
    error!(
        "Sensor error in {}: code={}, component=SensorDriver, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Log a monitor lifecycle error with structured context
pub fn log_monitor_error(err: &MonitorError, context: &str) {
    error!(
        "Monitor error in {}: code={}, component=Monitor, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Sensor-related errors
///
/// Raised by [`crate::sensor::SensorDriver`] implementations. None of these are
/// fatal; a failed read abandons the cycle without producing a partial window.
///
/// Error code ranges: 1001-1003
#[derive(Debug, Clone, PartialEq)]
pub enum SensorError {
    /// Device did not signal new-data-ready within the retry budget
    SensorUnavailable { retries: u32 },

    /// The producing side of the sample transport has gone away
    Disconnected,

    /// A recorded fixture ran out of samples
    FixtureExhausted { samples_delivered: usize },
}

impl ErrorCode for SensorError {
    fn code(&self) -> i32 {
        match self {
            SensorError::SensorUnavailable { .. } => 1001,
            SensorError::Disconnected => 1002,
            SensorError::FixtureExhausted { .. } => 1003,
        }
    }

    fn message(&self) -> String {
        match self {
            SensorError::SensorUnavailable { retries } => {
                format!("Sensor unavailable: no data ready after {} polls", retries)
            }
            SensorError::Disconnected => "Sensor transport disconnected".to_string(),
            SensorError::FixtureExhausted { samples_delivered } => {
                format!(
                    "Fixture exhausted after {} samples",
                    samples_delivered
                )
            }
        }
    }
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SensorError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SensorError {}

/// Spectral engine errors
///
/// `UnsupportedSize` is fatal at startup: the monitor must not begin sampling
/// with a window size the transform cannot handle.
///
/// Error code ranges: 2001-2002
#[derive(Debug, Clone, PartialEq)]
pub enum SpectralError {
    /// Transform size is not a supported power of two
    UnsupportedSize { size: usize },
    /// Window handed to the engine does not hold exactly N samples
    WindowLengthMismatch { expected: usize, actual: usize },
}

impl ErrorCode for SpectralError {
    fn code(&self) -> i32 {
        match self {
            SpectralError::UnsupportedSize { .. } => 2001,
            SpectralError::WindowLengthMismatch { .. } => 2002,
        }
    }

    fn message(&self) -> String {
        match self {
            SpectralError::UnsupportedSize { size } => {
                format!(
                    "Unsupported transform size {} (expected power of two in 32..=4096)",
                    size
                )
            }
            SpectralError::WindowLengthMismatch { expected, actual } => {
                format!(
                    "Window holds {} samples, transform expects {}",
                    actual, expected
                )
            }
        }
    }
}

impl fmt::Display for SpectralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SpectralError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for SpectralError {}

/// Configuration validation errors
///
/// Error code ranges: 3001-3006
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Window size must be a power of two
    WindowSizeInvalid { size: usize },

    /// Sample rate must be finite and positive
    SampleRateInvalid { rate: f32 },

    /// Smoothing constant must lie strictly between 0 and 1
    FilterAlphaInvalid { alpha: f32 },

    /// Band edges must be ordered and below Nyquist
    BandLayoutInvalid { reason: String },

    /// Detection thresholds must be finite and non-negative
    ThresholdInvalid { name: String, value: f32 },

    /// Voter capacity or debounce ratio out of range
    VoterLayoutInvalid { reason: String },
}

impl ErrorCode for ConfigError {
    fn code(&self) -> i32 {
        match self {
            ConfigError::WindowSizeInvalid { .. } => 3001,
            ConfigError::SampleRateInvalid { .. } => 3002,
            ConfigError::FilterAlphaInvalid { .. } => 3003,
            ConfigError::BandLayoutInvalid { .. } => 3004,
            ConfigError::ThresholdInvalid { .. } => 3005,
            ConfigError::VoterLayoutInvalid { .. } => 3006,
        }
    }

    fn message(&self) -> String {
        match self {
            ConfigError::WindowSizeInvalid { size } => {
                format!("Window size must be a power of two (got {})", size)
            }
            ConfigError::SampleRateInvalid { rate } => {
                format!("Sample rate must be positive (got {})", rate)
            }
            ConfigError::FilterAlphaInvalid { alpha } => {
                format!("Filter alpha must be in (0, 1) (got {})", alpha)
            }
            ConfigError::BandLayoutInvalid { reason } => {
                format!("Invalid band layout: {}", reason)
            }
            ConfigError::ThresholdInvalid { name, value } => {
                format!("Threshold {} must be non-negative (got {})", name, value)
            }
            ConfigError::VoterLayoutInvalid { reason } => {
                format!("Invalid voter layout: {}", reason)
            }
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ConfigError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for ConfigError {}

/// Monitor lifecycle errors
///
/// Error code ranges: 4001-4007
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorError {
    /// Monitor is already running
    AlreadyRunning,

    /// Monitor is not running
    NotRunning,

    /// Mutex was poisoned
    LockPoisoned { component: String },

    /// Configuration rejected at startup
    Config(ConfigError),

    /// Spectral engine rejected the configured window size
    SpectralInit(SpectralError),

    /// The pipeline thread could not be spawned
    SpawnFailed { reason: String },

    /// The pipeline thread panicked before it could be joined
    WorkerPanicked,
}

impl ErrorCode for MonitorError {
    fn code(&self) -> i32 {
        match self {
            MonitorError::AlreadyRunning => 4001,
            MonitorError::NotRunning => 4002,
            MonitorError::LockPoisoned { .. } => 4003,
            MonitorError::Config(_) => 4004,
            MonitorError::SpectralInit(_) => 4005,
            MonitorError::SpawnFailed { .. } => 4006,
            MonitorError::WorkerPanicked => 4007,
        }
    }

    fn message(&self) -> String {
        match self {
            MonitorError::AlreadyRunning => {
                "Monitor already running. Call stop() first.".to_string()
            }
            MonitorError::NotRunning => "Monitor not running. Call start() first.".to_string(),
            MonitorError::LockPoisoned { component } => {
                format!("Lock poisoned for component: {}", component)
            }
            MonitorError::Config(err) => format!("Configuration rejected: {}", err.message()),
            MonitorError::SpectralInit(err) => {
                format!("Spectral engine init failed: {}", err.message())
            }
            MonitorError::SpawnFailed { reason } => {
                format!("Failed to spawn pipeline thread: {}", reason)
            }
            MonitorError::WorkerPanicked => "Pipeline thread panicked".to_string(),
        }
    }
}

impl fmt::Display for MonitorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MonitorError (code {}): {}",
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for MonitorError {}

impl From<ConfigError> for MonitorError {
    fn from(err: ConfigError) -> Self {
        MonitorError::Config(err)
    }
}

impl From<SpectralError> for MonitorError {
    fn from(err: SpectralError) -> Self {
        MonitorError::SpectralInit(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sensor_error_codes() {
        assert_eq!(SensorError::SensorUnavailable { retries: 3 }.code(), 1001);
        assert_eq!(SensorError::Disconnected.code(), 1002);
        assert_eq!(
            SensorError::FixtureExhausted {
                samples_delivered: 10
            }
            .code(),
            1003
        );
    }

    #[test]
    fn test_spectral_and_config_error_codes() {
        assert_eq!(SpectralError::UnsupportedSize { size: 100 }.code(), 2001);
        let mismatch = SpectralError::WindowLengthMismatch {
            expected: 512,
            actual: 256,
        };
        assert_eq!(mismatch.code(), 2002);
        assert!(mismatch.to_string().contains("256 samples"));
        assert_eq!(ConfigError::WindowSizeInvalid { size: 100 }.code(), 3001);
        assert_eq!(ConfigError::SampleRateInvalid { rate: 0.0 }.code(), 3002);
        assert_eq!(ConfigError::FilterAlphaInvalid { alpha: 1.5 }.code(), 3003);
        assert_eq!(
            ConfigError::BandLayoutInvalid {
                reason: "test".to_string()
            }
            .code(),
            3004
        );
        assert_eq!(
            ConfigError::ThresholdInvalid {
                name: "tremor".to_string(),
                value: -1.0
            }
            .code(),
            3005
        );
        assert_eq!(
            ConfigError::VoterLayoutInvalid {
                reason: "test".to_string()
            }
            .code(),
            3006
        );
    }

    #[test]
    fn test_monitor_error_codes() {
        assert_eq!(MonitorError::AlreadyRunning.code(), 4001);
        assert_eq!(MonitorError::NotRunning.code(), 4002);
        assert_eq!(
            MonitorError::LockPoisoned {
                component: "test".to_string()
            }
            .code(),
            4003
        );
        assert_eq!(
            MonitorError::SpawnFailed {
                reason: "test".to_string()
            }
            .code(),
            4006
        );
        assert_eq!(MonitorError::WorkerPanicked.code(), 4007);
    }

    #[test]
    fn test_sensor_error_display() {
        let err = SensorError::SensorUnavailable { retries: 250 };
        assert!(err.message().contains("after 250 polls"));

        let err = SensorError::FixtureExhausted {
            samples_delivered: 512,
        };
        assert!(err.to_string().contains("code 1003"));
    }

    #[test]
    fn test_spectral_error_converts_into_monitor_error() {
        fn start() -> Result<(), MonitorError> {
            Err(SpectralError::UnsupportedSize { size: 500 })?;
            Ok(())
        }

        match start() {
            Err(MonitorError::SpectralInit(SpectralError::UnsupportedSize { size })) => {
                assert_eq!(size, 500)
            }
            other => panic!("Expected SpectralInit, got {:?}", other),
        }
    }

    #[test]
    fn test_error_code_trait() {
        let sensor_err: &dyn ErrorCode = &SensorError::Disconnected;
        assert_eq!(sensor_err.code(), 1002);

        let monitor_err: &dyn ErrorCode =
            &MonitorError::Config(ConfigError::WindowSizeInvalid { size: 3 });
        assert_eq!(monitor_err.code(), 4004);
        assert!(monitor_err.message().contains("power of two"));
    }
}
