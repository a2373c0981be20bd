//! Replay of recorded motion captures.
//!
//! A fixture is a JSON document holding the capture's sample rate and its
//! samples as `[x, y, z]` triples in g. Replaying a fixture through the
//! pipeline is deterministic; once the samples run out every read reports
//! `FixtureExhausted`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

use super::{Sample, SensorDriver};
use crate::error::SensorError;

/// Recorded motion capture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionFixture {
    pub name: String,
    pub sample_rate_hz: f32,
    pub samples: Vec<Sample>,
}

impl MotionFixture {
    /// Load a fixture from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let contents = fs::read_to_string(&path)?;
        let fixture: MotionFixture = serde_json::from_str(&contents)?;
        tracing::debug!(
            "[Fixture] Loaded {} ({} samples at {} Hz) from {:?}",
            fixture.name,
            fixture.samples.len(),
            fixture.sample_rate_hz,
            path.as_ref()
        );
        Ok(fixture)
    }

    /// Write the fixture as JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json)
    }

    /// Capture `count` samples from any driver into a fixture
    pub fn record<S: SensorDriver + ?Sized>(
        name: impl Into<String>,
        sample_rate_hz: f32,
        sensor: &mut S,
        count: usize,
    ) -> Result<Self, SensorError> {
        let samples = (0..count)
            .map(|_| sensor.read_sample())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            name: name.into(),
            sample_rate_hz,
            samples,
        })
    }

    pub fn into_sensor(self) -> FixtureSensor {
        FixtureSensor::new(self.samples)
    }
}

/// Sensor that replays a fixed sample sequence once
pub struct FixtureSensor {
    samples: Vec<Sample>,
    cursor: usize,
}

impl FixtureSensor {
    pub fn new(samples: Vec<Sample>) -> Self {
        Self { samples, cursor: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.samples.len() - self.cursor
    }
}

impl SensorDriver for FixtureSensor {
    fn read_sample(&mut self) -> Result<Sample, SensorError> {
        match self.samples.get(self.cursor) {
            Some(&sample) => {
                self.cursor += 1;
                Ok(sample)
            }
            None => Err(SensorError::FixtureExhausted {
                samples_delivered: self.cursor,
            }),
        }
    }
}
