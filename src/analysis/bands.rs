// Bands module - frequency-band energy scoring
//
// Two independent scans over the magnitude spectrum:
// - Band energy: walks bins in increasing frequency, summing magnitudes into
//   the tremor band [low, mid] and the dyskinesia band (mid, high]. The walk
//   stops at the first bin above `high`.
// - Dominant bin: linear max over the whole spectrum, ties to the lowest bin.

use serde::{Deserialize, Serialize};

use super::spectrum::Spectrum;
use crate::config::BandConfig;

/// Symptom frequency band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymptomBand {
    Tremor,
    Dyskinesia,
}

/// Band edges shared by the extractor and the classification policy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyBands {
    tremor_low_hz: f32,
    tremor_high_hz: f32,
    dyskinesia_high_hz: f32,
}

impl FrequencyBands {
    pub fn new(tremor_low_hz: f32, tremor_high_hz: f32, dyskinesia_high_hz: f32) -> Self {
        Self {
            tremor_low_hz,
            tremor_high_hz,
            dyskinesia_high_hz,
        }
    }

    pub fn from_config(config: &BandConfig) -> Self {
        Self::new(
            config.tremor_low_hz,
            config.tremor_high_hz,
            config.dyskinesia_high_hz,
        )
    }

    /// Band a frequency belongs to, if any
    ///
    /// The shared edge belongs to the tremor band.
    pub fn band_of(&self, frequency_hz: f32) -> Option<SymptomBand> {
        if frequency_hz >= self.tremor_low_hz && frequency_hz <= self.tremor_high_hz {
            Some(SymptomBand::Tremor)
        } else if frequency_hz > self.tremor_high_hz && frequency_hz <= self.dyskinesia_high_hz {
            Some(SymptomBand::Dyskinesia)
        } else {
            None
        }
    }

    pub fn upper_edge_hz(&self) -> f32 {
        self.dyskinesia_high_hz
    }
}

impl Default for FrequencyBands {
    fn default() -> Self {
        Self::from_config(&BandConfig::default())
    }
}

/// Per-window spectral score
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BandScore {
    /// Sum of magnitudes in the tremor band
    pub tremor_energy: f32,
    /// Sum of magnitudes in the dyskinesia band
    pub dyskinesia_energy: f32,
    /// Index of the largest-magnitude bin
    pub dominant_bin: usize,
    /// Frequency of the largest-magnitude bin in Hz
    pub dominant_frequency_hz: f32,
    /// Magnitude of the largest-magnitude bin
    pub dominant_magnitude: f32,
}

impl BandScore {
    /// Energy of the given band
    pub fn energy(&self, band: SymptomBand) -> f32 {
        match band {
            SymptomBand::Tremor => self.tremor_energy,
            SymptomBand::Dyskinesia => self.dyskinesia_energy,
        }
    }
}

/// Computes [`BandScore`]s from magnitude spectra
pub struct BandEnergyExtractor {
    bands: FrequencyBands,
}

impl BandEnergyExtractor {
    pub fn new(bands: FrequencyBands) -> Self {
        Self { bands }
    }

    pub fn bands(&self) -> &FrequencyBands {
        &self.bands
    }

    pub fn extract(&self, spectrum: &Spectrum<'_>) -> BandScore {
        let mut tremor_energy = 0.0f32;
        let mut dyskinesia_energy = 0.0f32;

        for (_, frequency, magnitude) in spectrum.bins() {
            match self.bands.band_of(frequency) {
                Some(SymptomBand::Tremor) => tremor_energy += magnitude,
                Some(SymptomBand::Dyskinesia) => dyskinesia_energy += magnitude,
                None if frequency > self.bands.upper_edge_hz() => break,
                None => {}
            }
        }

        let (dominant_bin, dominant_magnitude) = dominant_bin(spectrum.as_slice());

        BandScore {
            tremor_energy,
            dyskinesia_energy,
            dominant_bin,
            dominant_frequency_hz: spectrum.frequency_of(dominant_bin),
            dominant_magnitude,
        }
    }
}

/// Index and value of the first maximum
fn dominant_bin(magnitudes: &[f32]) -> (usize, f32) {
    let mut best_index = 0;
    let mut best_value = match magnitudes.first() {
        Some(&value) => value,
        None => return (0, 0.0),
    };

    for (i, &value) in magnitudes.iter().enumerate().skip(1) {
        if value > best_value {
            best_index = i;
            best_value = value;
        }
    }

    (best_index, best_value)
}
