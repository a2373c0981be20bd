// Classifier - band-energy voting and debounced symptom decision
//
// Per-cycle vote:
// 1. IF dominant frequency in tremor band AND tremor energy >= T_TREMOR THEN tremor
// 2. ELSE IF dominant frequency in dyskinesia band AND dyskinesia energy >= T_DYSK THEN dyskinesia
// 3. ELSE stable
//
// Debounced decision over the voter horizon:
// 1. IF tremor sum >= ceil(capacity * ratio) THEN Tremor
// 2. ELSE IF dyskinesia sum >= ceil(capacity * ratio) THEN Dyskinesia
// 3. ELSE Stable
//
// Tremor is checked first, so it wins whenever both sums cross. Every cycle
// re-evaluates the sums; there is no latching beyond the voter history.

use serde::{Deserialize, Serialize};

use super::bands::{BandScore, FrequencyBands, SymptomBand};
use super::voter::VoterSums;
use crate::config::AppConfig;

/// Externally visible motion classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Symptom {
    Stable,
    Tremor,
    Dyskinesia,
}

impl Symptom {
    /// Display label used by the notification transport (at most 11 bytes)
    pub fn label(&self) -> &'static str {
        match self {
            Symptom::Stable => "STABLE",
            Symptom::Tremor => "TREMOR",
            Symptom::Dyskinesia => "DYSKINESIA",
        }
    }

    /// Parse a label case-insensitively
    pub fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_uppercase().as_str() {
            "STABLE" => Some(Symptom::Stable),
            "TREMOR" => Some(Symptom::Tremor),
            "DYSKINESIA" => Some(Symptom::Dyskinesia),
            _ => None,
        }
    }
}

/// One cycle's vote
///
/// At most one of `tremor` / `dyskinesia` is set by [`ClassificationPolicy::classify`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VoteRecord {
    pub tremor: bool,
    pub dyskinesia: bool,
    /// Energy of the band holding the dominant frequency (0 outside both bands)
    pub intensity: f32,
}

/// Final per-cycle output handed to the notification subsystem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationState {
    pub symptom: Symptom,
    /// Intensity pre-scaled and clamped to one byte
    pub intensity: u8,
}

impl Default for ClassificationState {
    fn default() -> Self {
        Self {
            symptom: Symptom::Stable,
            intensity: 0,
        }
    }
}

/// Calibrated decision rules
#[derive(Debug, Clone)]
pub struct ClassificationPolicy {
    bands: FrequencyBands,
    tremor_threshold: f32,
    dyskinesia_threshold: f32,
    debounce_count: u32,
    intensity_divisor: f32,
}

/// Tolerance for f32 representation error in `capacity * ratio`
const DEBOUNCE_SLACK: f64 = 1e-4;

impl ClassificationPolicy {
    /// Create a policy from explicit constants
    ///
    /// # Arguments
    /// * `bands` - Band edges used to gate the dominant frequency
    /// * `tremor_threshold` - Minimum tremor-band energy for a tremor vote
    /// * `dyskinesia_threshold` - Minimum dyskinesia-band energy for a dyskinesia vote
    /// * `voter_capacity` - Debounce horizon in cycles
    /// * `debounce_ratio` - Fraction of the horizon required to report a symptom
    /// * `intensity_divisor` - Raw energy per displayed intensity step
    pub fn new(
        bands: FrequencyBands,
        tremor_threshold: f32,
        dyskinesia_threshold: f32,
        voter_capacity: usize,
        debounce_ratio: f32,
        intensity_divisor: f32,
    ) -> Self {
        // f32 ratios such as 0.3 sit just above their decimal value; the
        // slack keeps 50 * 0.3 at 15 votes instead of rounding up to 16.
        let required = voter_capacity as f64 * f64::from(debounce_ratio) - DEBOUNCE_SLACK;
        let debounce_count = (required.ceil() as u32).max(1);
        Self {
            bands,
            tremor_threshold,
            dyskinesia_threshold,
            debounce_count,
            intensity_divisor,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let detection = &config.detection;
        Self::new(
            FrequencyBands::from_config(&config.bands),
            detection.tremor_threshold,
            detection.dyskinesia_threshold,
            detection.voter_capacity,
            detection.debounce_ratio,
            detection.intensity_divisor,
        )
    }

    /// Votes a category needs within the horizon
    pub fn debounce_count(&self) -> u32 {
        self.debounce_count
    }

    /// Turn one window's band score into a vote
    pub fn classify(&self, score: &BandScore) -> VoteRecord {
        let dominant_band = self.bands.band_of(score.dominant_frequency_hz);
        let intensity = dominant_band.map(|band| score.energy(band)).unwrap_or(0.0);

        match dominant_band {
            Some(SymptomBand::Tremor) if score.tremor_energy >= self.tremor_threshold => {
                VoteRecord {
                    tremor: true,
                    dyskinesia: false,
                    intensity,
                }
            }
            Some(SymptomBand::Dyskinesia)
                if score.dyskinesia_energy >= self.dyskinesia_threshold =>
            {
                VoteRecord {
                    tremor: false,
                    dyskinesia: true,
                    intensity,
                }
            }
            _ => VoteRecord {
                tremor: false,
                dyskinesia: false,
                intensity,
            },
        }
    }

    /// Debounced decision from the voters' rolling sums
    ///
    /// The reported intensity comes from the current cycle's vote, not from
    /// the rolling intensity sums.
    pub fn decide(&self, sums: &VoterSums, vote: &VoteRecord) -> ClassificationState {
        let symptom = if sums.tremor >= self.debounce_count {
            Symptom::Tremor
        } else if sums.dyskinesia >= self.debounce_count {
            Symptom::Dyskinesia
        } else {
            Symptom::Stable
        };

        ClassificationState {
            symptom,
            intensity: self.scale_intensity(vote.intensity),
        }
    }

    /// Scale raw band energy into the one-byte display range
    pub fn scale_intensity(&self, raw: f32) -> u8 {
        let scaled = raw / self.intensity_divisor;
        if scaled.is_nan() || scaled <= 0.0 {
            0
        } else {
            scaled.min(u8::MAX as f32) as u8
        }
    }
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

#[cfg(test)]
#[path = "classifier_tests.rs"]
mod tests;
