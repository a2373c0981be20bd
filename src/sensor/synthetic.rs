//! Deterministic synthetic motion for desktop runs and tests.
//!
//! Gravity sits on the z axis; an optional sinusoidal oscillation is added on
//! top of it, plus uniform noise on every axis from a seeded RNG so runs are
//! reproducible.

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

use super::{Sample, SensorDriver};
use crate::error::SensorError;

/// Default noise seed
const DEFAULT_SEED: u64 = 0x5A5A_FFF0;

/// Description of the motion to synthesize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticMotion {
    /// Oscillation frequency in Hz (0 disables the oscillation)
    pub frequency_hz: f32,
    /// Oscillation amplitude in g
    pub amplitude_g: f32,
    /// Peak uniform noise per axis in g
    pub noise_g: f32,
    /// Static gravity component on z in g
    pub gravity_g: f32,
}

impl SyntheticMotion {
    /// Oscillation at `frequency_hz` with the given amplitude and no noise
    pub fn oscillation(frequency_hz: f32, amplitude_g: f32) -> Self {
        Self {
            frequency_hz,
            amplitude_g,
            noise_g: 0.0,
            gravity_g: 1.0,
        }
    }

    /// Wearer at rest with a small amount of sensor noise
    pub fn still(noise_g: f32) -> Self {
        Self {
            frequency_hz: 0.0,
            amplitude_g: 0.0,
            noise_g,
            gravity_g: 1.0,
        }
    }

    pub fn with_noise(mut self, noise_g: f32) -> Self {
        self.noise_g = noise_g;
        self
    }
}

/// Infinite sample source following a [`SyntheticMotion`]
pub struct SyntheticSensor {
    motion: SyntheticMotion,
    sample_rate_hz: f32,
    rng: StdRng,
    samples_emitted: u64,
}

impl SyntheticSensor {
    pub fn new(motion: SyntheticMotion, sample_rate_hz: f32) -> Self {
        Self::with_seed(motion, sample_rate_hz, DEFAULT_SEED)
    }

    pub fn with_seed(motion: SyntheticMotion, sample_rate_hz: f32, seed: u64) -> Self {
        Self {
            motion,
            sample_rate_hz,
            rng: StdRng::seed_from_u64(seed),
            samples_emitted: 0,
        }
    }

    /// Switch to a different motion without resetting the time base
    pub fn set_motion(&mut self, motion: SyntheticMotion) {
        self.motion = motion;
    }

    pub fn samples_emitted(&self) -> u64 {
        self.samples_emitted
    }

    fn noise(&mut self) -> f32 {
        if self.motion.noise_g > 0.0 {
            self.rng.gen_range(-self.motion.noise_g..self.motion.noise_g)
        } else {
            0.0
        }
    }
}

impl SensorDriver for SyntheticSensor {
    fn read_sample(&mut self) -> Result<Sample, SensorError> {
        let t = self.samples_emitted as f32 / self.sample_rate_hz;
        let oscillation = if self.motion.frequency_hz > 0.0 {
            self.motion.amplitude_g * (2.0 * PI * self.motion.frequency_hz * t).sin()
        } else {
            0.0
        };

        let x = self.noise();
        let y = self.noise();
        let z = self.motion.gravity_g + oscillation + self.noise();
        self.samples_emitted += 1;

        Ok(Sample::new(x, y, z))
    }
}
