// Spectrum module - magnitude spectrum of a time-domain window
//
// Module organization:
// - fft: rustfft-backed transform used in production
// - dft: direct O(N^2) transform used as a numeric reference
// - mod.rs: SpectralTransform capability and SpectralEngine wrapper
//
// Bin i of the spectrum corresponds to frequency i * sample_rate / N. Only the
// first N/2 bins are kept since the input is real-valued.

mod dft;
mod fft;

pub use dft::DirectDft;
pub use fft::{RustFftTransform, MAX_TRANSFORM_SIZE, MIN_TRANSFORM_SIZE};

use super::window::Window;
use crate::error::SpectralError;

/// Fixed-size real-input transform producing magnitudes
///
/// Implementations plan once for their size and must not allocate per call.
pub trait SpectralTransform: Send {
    /// Transform size N
    fn size(&self) -> usize;

    /// Write the N/2 bin magnitudes of `input` into `output`
    ///
    /// `input` holds N samples and `output` holds N/2 slots. A shorter
    /// `input` is zero-padded to N.
    fn magnitudes(&mut self, input: &[f32], output: &mut [f32]);
}

/// Check a size against the range the production transform accepts
pub fn ensure_supported_size(size: usize) -> Result<(), SpectralError> {
    if size.is_power_of_two() && (MIN_TRANSFORM_SIZE..=MAX_TRANSFORM_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(SpectralError::UnsupportedSize { size })
    }
}

/// Magnitude spectrum view with its frequency axis
#[derive(Debug, Clone, Copy)]
pub struct Spectrum<'a> {
    magnitudes: &'a [f32],
    bin_width_hz: f32,
}

impl<'a> Spectrum<'a> {
    pub fn new(magnitudes: &'a [f32], bin_width_hz: f32) -> Self {
        Self {
            magnitudes,
            bin_width_hz,
        }
    }

    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }

    pub fn bin_width_hz(&self) -> f32 {
        self.bin_width_hz
    }

    pub fn frequency_of(&self, bin: usize) -> f32 {
        bin as f32 * self.bin_width_hz
    }

    pub fn as_slice(&self) -> &'a [f32] {
        self.magnitudes
    }

    /// Iterate `(bin, frequency_hz, magnitude)` in increasing frequency order
    pub fn bins(&self) -> impl Iterator<Item = (usize, f32, f32)> + 'a {
        let width = self.bin_width_hz;
        self.magnitudes
            .iter()
            .enumerate()
            .map(move |(i, &mag)| (i, i as f32 * width, mag))
    }
}

/// Wraps a [`SpectralTransform`] with its output buffer and frequency axis
pub struct SpectralEngine {
    transform: Box<dyn SpectralTransform>,
    output: Vec<f32>,
    bin_width_hz: f32,
}

impl SpectralEngine {
    /// Create an engine around an injected transform
    pub fn new(transform: Box<dyn SpectralTransform>, sample_rate_hz: f32) -> Self {
        let size = transform.size();
        Self {
            transform,
            output: vec![0.0; size / 2],
            bin_width_hz: sample_rate_hz / size as f32,
        }
    }

    /// Create an engine backed by rustfft
    ///
    /// # Errors
    /// `SpectralError::UnsupportedSize` if `size` is not a power of two in the
    /// supported range. This is a startup failure, not a runtime fault.
    pub fn with_rustfft(size: usize, sample_rate_hz: f32) -> Result<Self, SpectralError> {
        let transform = RustFftTransform::new(size)?;
        Ok(Self::new(Box::new(transform), sample_rate_hz))
    }

    pub fn size(&self) -> usize {
        self.transform.size()
    }

    pub fn bin_width_hz(&self) -> f32 {
        self.bin_width_hz
    }

    /// Compute the magnitude spectrum of `window`
    ///
    /// # Errors
    /// `SpectralError::WindowLengthMismatch` if `window` does not hold exactly
    /// `size()` samples. The output buffer is left as it was.
    pub fn transform(&mut self, window: &Window<'_>) -> Result<Spectrum<'_>, SpectralError> {
        if window.len() != self.size() {
            return Err(SpectralError::WindowLengthMismatch {
                expected: self.size(),
                actual: window.len(),
            });
        }
        Ok(self.transform_sized(window))
    }

    /// Transform a window already known to hold `size()` samples
    ///
    /// Used by the pipeline, whose window builder is sized from this engine.
    pub(super) fn transform_sized(&mut self, window: &Window<'_>) -> Spectrum<'_> {
        self.transform
            .magnitudes(window.as_slice(), &mut self.output);
        Spectrum::new(&self.output, self.bin_width_hz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn sine(size: usize, sample_rate: f32, frequency: f32, amplitude: f32) -> Vec<f32> {
        (0..size)
            .map(|i| amplitude * (2.0 * PI * frequency * i as f32 / sample_rate).sin())
            .collect()
    }

    fn peak_bin(spectrum: &Spectrum<'_>) -> usize {
        let mut best = 0;
        for (i, _, mag) in spectrum.bins() {
            if mag > spectrum.as_slice()[best] {
                best = i;
            }
        }
        best
    }

    #[test]
    fn test_supported_sizes() {
        assert!(ensure_supported_size(32).is_ok());
        assert!(ensure_supported_size(512).is_ok());
        assert!(ensure_supported_size(4096).is_ok());
        assert_eq!(
            ensure_supported_size(16),
            Err(SpectralError::UnsupportedSize { size: 16 })
        );
        assert!(ensure_supported_size(8192).is_err());
        assert!(ensure_supported_size(1000).is_err());
        assert!(ensure_supported_size(0).is_err());
    }

    #[test]
    fn test_engine_rejects_unsupported_size() {
        assert!(matches!(
            SpectralEngine::with_rustfft(500, 104.0),
            Err(SpectralError::UnsupportedSize { size: 500 })
        ));
    }

    #[test]
    fn test_output_length_is_half_window() {
        let mut engine = SpectralEngine::with_rustfft(512, 104.0).unwrap();
        let input = vec![0.0; 512];
        let spectrum = engine.transform(&Window::new(&input)).unwrap();
        assert_eq!(spectrum.len(), 256);
        assert_eq!(spectrum.bin_width_hz(), 0.203125);
        assert!(spectrum.as_slice().iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_transform_rejects_wrong_window_length() {
        let mut engine = SpectralEngine::with_rustfft(512, 104.0).unwrap();
        let short = vec![0.5; 256];
        assert!(matches!(
            engine.transform(&Window::new(&short)),
            Err(SpectralError::WindowLengthMismatch {
                expected: 512,
                actual: 256
            })
        ));
        let long = vec![0.5; 513];
        assert!(engine.transform(&Window::new(&long)).is_err());

        // A rejected window leaves the engine usable
        let silent = vec![0.0; 512];
        let spectrum = engine.transform(&Window::new(&silent)).unwrap();
        assert!(spectrum.as_slice().iter().all(|&m| m == 0.0));
    }

    #[test]
    fn test_on_bin_sinusoid_peaks_at_its_frequency() {
        let sample_rate = 104.0;
        let size = 512;
        let mut engine = SpectralEngine::with_rustfft(size, sample_rate).unwrap();

        for bin in [15usize, 20, 24, 30, 100] {
            let frequency = bin as f32 * sample_rate / size as f32;
            let input = sine(size, sample_rate, frequency, 0.5);
            let spectrum = engine.transform(&Window::new(&input)).unwrap();
            let peak = peak_bin(&spectrum);
            assert!(
                (spectrum.frequency_of(peak) - frequency).abs() <= spectrum.bin_width_hz(),
                "peak at {} Hz for {} Hz input",
                spectrum.frequency_of(peak),
                frequency
            );
            // Coherent sinusoid of amplitude A lands A * N / 2 in its bin
            assert!((spectrum.as_slice()[bin] - 128.0).abs() < 0.5);
        }
    }

    #[test]
    fn test_fft_matches_direct_reference() {
        let sample_rate = 104.0;
        let size = 256;
        let mut fast = SpectralEngine::with_rustfft(size, sample_rate).unwrap();
        let mut reference = SpectralEngine::new(Box::new(DirectDft::new(size)), sample_rate);

        let input: Vec<f32> = sine(size, sample_rate, 4.3, 0.7)
            .iter()
            .zip(sine(size, sample_rate, 6.1, 0.2))
            .map(|(a, b)| a + b)
            .collect();

        let fast_spectrum = fast.transform(&Window::new(&input)).unwrap().as_slice().to_vec();
        let reference_spectrum = reference.transform(&Window::new(&input)).unwrap();

        for (i, (a, b)) in fast_spectrum
            .iter()
            .zip(reference_spectrum.as_slice())
            .enumerate()
        {
            assert!((a - b).abs() < 1e-2, "bin {}: fft {} vs dft {}", i, a, b);
        }
    }

    #[test]
    fn test_transform_is_deterministic() {
        let mut engine = SpectralEngine::with_rustfft(128, 104.0).unwrap();
        let input = sine(128, 104.0, 3.7, 1.0);
        let first = engine.transform(&Window::new(&input)).unwrap().as_slice().to_vec();
        let second = engine.transform(&Window::new(&input)).unwrap().as_slice().to_vec();
        assert_eq!(first, second);
    }
}
