//! Configuration management for the classification pipeline
//!
//! All parameters are read once at startup from a JSON file (falling back to
//! defaults) and are immutable afterwards. The frequency-domain interpretation
//! of every stage depends on `window.sample_rate_hz` matching the rate the
//! sensor driver actually delivers.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::analysis::voter::MAX_VOTER_CAPACITY;
use crate::error::ConfigError;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub bands: BandConfig,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub sensor: SensorConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Sample window acquisition parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Samples per window; also the transform size (power of two)
    pub window_size: usize,
    /// Rate the sensor driver delivers samples at
    pub sample_rate_hz: f32,
    /// Exponential low-pass smoothing constant, in (0, 1)
    pub filter_alpha: f32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            // 104 Hz for ~5 seconds, rounded to a power of two
            window_size: 512,
            sample_rate_hz: 104.0,
            filter_alpha: 0.2,
        }
    }
}

/// Frequency band edges in Hz
///
/// Tremor band is `[tremor_low_hz, tremor_high_hz]`, dyskinesia band is
/// `(tremor_high_hz, dyskinesia_high_hz]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BandConfig {
    pub tremor_low_hz: f32,
    pub tremor_high_hz: f32,
    pub dyskinesia_high_hz: f32,
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            tremor_low_hz: 3.0,
            tremor_high_hz: 5.0,
            dyskinesia_high_hz: 7.0,
        }
    }
}

/// Detection and debounce parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Minimum tremor-band energy for a tremor vote
    pub tremor_threshold: f32,
    /// Minimum dyskinesia-band energy for a dyskinesia vote
    pub dyskinesia_threshold: f32,
    /// Number of cycles in the debounce horizon
    pub voter_capacity: usize,
    /// Fraction of the horizon that must vote for a category
    pub debounce_ratio: f32,
    /// Raw band energy per displayed intensity step
    pub intensity_divisor: f32,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            tremor_threshold: 30.0,
            dyskinesia_threshold: 30.0,
            // One window per ~5 s over a 60 s horizon
            voter_capacity: 12,
            debounce_ratio: 0.75,
            intensity_divisor: 11.0,
        }
    }
}

/// Sensor transport parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Empty polls tolerated before a read reports `SensorUnavailable`
    pub retry_budget: u32,
    /// Sleep between polls in microseconds
    pub poll_interval_us: u64,
    /// Capacity of the driver-to-pipeline sample queue
    pub queue_capacity: usize,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            retry_budget: 1000,
            poll_interval_us: 100,
            queue_capacity: 1024,
        }
    }
}

/// Cycle scheduling parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Idle time between cycles in milliseconds (0 = back-to-back)
    pub cycle_interval_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cycle_interval_ms: 0,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or defaults if the file is missing or invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the conventional location
    pub fn load() -> Self {
        Self::load_from_file("assets/monitor_config.json")
    }

    /// Frequency spacing between adjacent spectrum bins
    pub fn bin_width_hz(&self) -> f32 {
        self.window.sample_rate_hz / self.window.window_size as f32
    }

    /// Check every parameter before the pipeline is built
    pub fn validate(&self) -> Result<(), ConfigError> {
        let window = &self.window;
        if window.window_size < 2 || !window.window_size.is_power_of_two() {
            return Err(ConfigError::WindowSizeInvalid {
                size: window.window_size,
            });
        }
        if !window.sample_rate_hz.is_finite() || window.sample_rate_hz <= 0.0 {
            return Err(ConfigError::SampleRateInvalid {
                rate: window.sample_rate_hz,
            });
        }
        if !(window.filter_alpha > 0.0 && window.filter_alpha < 1.0) {
            return Err(ConfigError::FilterAlphaInvalid {
                alpha: window.filter_alpha,
            });
        }

        let bands = &self.bands;
        let nyquist = window.sample_rate_hz / 2.0;
        if !(bands.tremor_low_hz >= 0.0
            && bands.tremor_low_hz <= bands.tremor_high_hz
            && bands.tremor_high_hz < bands.dyskinesia_high_hz)
        {
            return Err(ConfigError::BandLayoutInvalid {
                reason: format!(
                    "expected 0 <= {} <= {} < {}",
                    bands.tremor_low_hz, bands.tremor_high_hz, bands.dyskinesia_high_hz
                ),
            });
        }
        if bands.dyskinesia_high_hz > nyquist {
            return Err(ConfigError::BandLayoutInvalid {
                reason: format!(
                    "upper edge {} Hz exceeds Nyquist {} Hz",
                    bands.dyskinesia_high_hz, nyquist
                ),
            });
        }

        let detection = &self.detection;
        for (name, value) in [
            ("tremor_threshold", detection.tremor_threshold),
            ("dyskinesia_threshold", detection.dyskinesia_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::ThresholdInvalid {
                    name: name.to_string(),
                    value,
                });
            }
        }
        if !detection.intensity_divisor.is_finite() || detection.intensity_divisor <= 0.0 {
            return Err(ConfigError::ThresholdInvalid {
                name: "intensity_divisor".to_string(),
                value: detection.intensity_divisor,
            });
        }
        if detection.voter_capacity == 0 || detection.voter_capacity > MAX_VOTER_CAPACITY {
            return Err(ConfigError::VoterLayoutInvalid {
                reason: format!(
                    "capacity {} outside 1..={}",
                    detection.voter_capacity, MAX_VOTER_CAPACITY
                ),
            });
        }
        if !(detection.debounce_ratio > 0.0 && detection.debounce_ratio <= 1.0) {
            return Err(ConfigError::VoterLayoutInvalid {
                reason: format!("debounce ratio {} outside (0, 1]", detection.debounce_ratio),
            });
        }

        Ok(())
    }
}
