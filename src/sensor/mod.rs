// Sensor module - motion sample acquisition boundary
//
// The classification pipeline pulls samples one at a time through the
// `SensorDriver` trait. Bus-level access to the accelerometer lives outside
// this crate; the implementations here cover the transports the pipeline is
// driven by on desktop and in tests:
// - queue: lock-free SPSC ring fed by a driver thread
// - synthetic: deterministic sine/noise motion generator
// - fixture: replay of a recorded JSON capture

use serde::{Deserialize, Serialize};

use crate::error::SensorError;

pub mod fixture;
pub mod queue;
pub mod synthetic;

pub use fixture::{FixtureSensor, MotionFixture};
pub use queue::{sample_channel, QueueSensor, SampleProducer};
pub use synthetic::{SyntheticMotion, SyntheticSensor};

/// Accelerometer sensitivity at the ±2 g range, in mg per LSB
pub const SENSITIVITY_2G_MG_PER_LSB: f32 = 0.061;

/// One 3-axis accelerometer reading in g
///
/// Serialized as a compact `[x, y, z]` triple.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 3]", into = "[f32; 3]")]
pub struct Sample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Sample {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Convert raw 16-bit output register counts to g
    pub fn from_raw_counts(raw: [i16; 3], sensitivity_mg_per_lsb: f32) -> Self {
        let scale = sensitivity_mg_per_lsb / 1000.0;
        Self {
            x: raw[0] as f32 * scale,
            y: raw[1] as f32 * scale,
            z: raw[2] as f32 * scale,
        }
    }

    /// Euclidean norm of the acceleration vector
    pub fn magnitude(&self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }
}

impl From<[f32; 3]> for Sample {
    fn from(axes: [f32; 3]) -> Self {
        Self::new(axes[0], axes[1], axes[2])
    }
}

impl From<Sample> for [f32; 3] {
    fn from(sample: Sample) -> Self {
        [sample.x, sample.y, sample.z]
    }
}

/// Source of motion samples consumed by the window builder
///
/// `read_sample` blocks until the device has a new reading. Implementations
/// give up with [`SensorError::SensorUnavailable`] once their bounded retry
/// budget is spent instead of blocking forever.
pub trait SensorDriver: Send {
    fn read_sample(&mut self) -> Result<Sample, SensorError>;
}

impl<S: SensorDriver + ?Sized> SensorDriver for Box<S> {
    fn read_sample(&mut self) -> Result<Sample, SensorError> {
        (**self).read_sample()
    }
}
