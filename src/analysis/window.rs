// Window module - time-domain window acquisition
//
// Pulls one window of samples from the sensor, low-pass filters each axis,
// reduces the axes to a magnitude series and removes the window's DC offset.
//
// Algorithm:
// 1. Read sample 0 and use its magnitude directly; it seeds the three axis filters
// 2. For samples 1..N, filter each axis with y' = x + alpha * (y - x), then take the norm
// 3. Subtract the window mean from every element in place
//
// The filters restart cold at the first sample of every window. The backing
// buffer is allocated once at construction and reused for every cycle.

use crate::error::SensorError;
use crate::sensor::{Sample, SensorDriver};

/// Single-pole exponential low-pass filter
#[derive(Debug, Clone, Copy)]
pub struct LowPassFilter {
    state: f32,
    alpha: f32,
}

impl LowPassFilter {
    /// Create a filter whose state starts at `initial`
    pub fn seeded(initial: f32, alpha: f32) -> Self {
        Self {
            state: initial,
            alpha,
        }
    }

    pub fn filter(&mut self, x: f32) -> f32 {
        self.state = x + self.alpha * (self.state - x);
        self.state
    }
}

/// Per-axis filter triple
#[derive(Debug, Clone, Copy)]
struct AxisFilters {
    x: LowPassFilter,
    y: LowPassFilter,
    z: LowPassFilter,
}

impl AxisFilters {
    fn seeded(first: Sample, alpha: f32) -> Self {
        Self {
            x: LowPassFilter::seeded(first.x, alpha),
            y: LowPassFilter::seeded(first.y, alpha),
            z: LowPassFilter::seeded(first.z, alpha),
        }
    }

    fn filter(&mut self, sample: Sample) -> Sample {
        Sample::new(
            self.x.filter(sample.x),
            self.y.filter(sample.y),
            self.z.filter(sample.z),
        )
    }
}

/// A complete, DC-removed magnitude window ready for spectral analysis
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    magnitudes: &'a [f32],
}

impl<'a> Window<'a> {
    /// Wrap an already-prepared magnitude series
    pub fn new(magnitudes: &'a [f32]) -> Self {
        Self { magnitudes }
    }

    pub fn as_slice(&self) -> &'a [f32] {
        self.magnitudes
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    pub fn mean(&self) -> f32 {
        if self.magnitudes.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.magnitudes.iter().map(|&v| v as f64).sum();
        (sum / self.magnitudes.len() as f64) as f32
    }
}

/// Builds fixed-length windows from a sensor
pub struct WindowBuilder {
    buffer: Vec<f32>,
    alpha: f32,
}

impl WindowBuilder {
    /// Create a builder for windows of `window_size` samples
    ///
    /// # Arguments
    /// * `window_size` - Samples per window (must match the transform size)
    /// * `alpha` - Smoothing constant in (0, 1)
    pub fn new(window_size: usize, alpha: f32) -> Self {
        Self {
            buffer: vec![0.0; window_size],
            alpha,
        }
    }

    pub fn window_size(&self) -> usize {
        self.buffer.len()
    }

    /// Acquire one full window from `sensor`
    ///
    /// Blocks until `window_size` samples have been read. A sensor failure
    /// aborts the window and nothing is handed downstream.
    pub fn build_window<S: SensorDriver + ?Sized>(
        &mut self,
        sensor: &mut S,
    ) -> Result<Window<'_>, SensorError> {
        if self.buffer.is_empty() {
            return Ok(Window::new(&self.buffer));
        }

        let first = sensor.read_sample()?;
        let mut filters = AxisFilters::seeded(first, self.alpha);
        self.buffer[0] = first.magnitude();
        let mut sum = self.buffer[0] as f64;

        for slot in self.buffer[1..].iter_mut() {
            let sample = sensor.read_sample()?;
            *slot = filters.filter(sample).magnitude();
            sum += *slot as f64;
        }

        let mean = (sum / self.buffer.len() as f64) as f32;
        for value in self.buffer.iter_mut() {
            *value -= mean;
        }

        Ok(Window::new(&self.buffer))
    }
}
