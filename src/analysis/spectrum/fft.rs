// FFT transform - rustfft-backed SpectralTransform
//
// The plan and scratch space are created once for the configured size; each
// call only copies the window into the complex work buffer and runs the plan
// in place.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

use super::{ensure_supported_size, SpectralTransform};
use crate::error::SpectralError;

/// Smallest supported transform size
pub const MIN_TRANSFORM_SIZE: usize = 32;

/// Largest supported transform size
pub const MAX_TRANSFORM_SIZE: usize = 4096;

/// Forward FFT planned for a fixed power-of-two size
pub struct RustFftTransform {
    fft: Arc<dyn Fft<f32>>,
    buffer: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    size: usize,
}

impl RustFftTransform {
    /// Plan a forward FFT of `size` points
    pub fn new(size: usize) -> Result<Self, SpectralError> {
        ensure_supported_size(size)?;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(size);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        tracing::debug!("[Spectrum] Planned {}-point FFT", size);

        Ok(Self {
            fft,
            buffer: vec![Complex::new(0.0, 0.0); size],
            scratch,
            size,
        })
    }
}

impl SpectralTransform for RustFftTransform {
    fn size(&self) -> usize {
        self.size
    }

    fn magnitudes(&mut self, input: &[f32], output: &mut [f32]) {
        let padded = input.iter().copied().chain(std::iter::repeat(0.0));
        for (slot, sample) in self.buffer.iter_mut().zip(padded) {
            *slot = Complex::new(sample, 0.0);
        }

        self.fft
            .process_with_scratch(&mut self.buffer, &mut self.scratch);

        for (magnitude, bin) in output.iter_mut().zip(&self.buffer[..self.size / 2]) {
            *magnitude = bin.norm();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dc_input_lands_in_bin_zero() {
        let mut transform = RustFftTransform::new(64).unwrap();
        let input = vec![1.0; 64];
        let mut output = vec![0.0; 32];
        transform.magnitudes(&input, &mut output);
        assert!((output[0] - 64.0).abs() < 1e-4);
        assert!(output[1..].iter().all(|&m| m < 1e-4));
    }

    #[test]
    fn test_short_input_is_zero_padded() {
        let mut transform = RustFftTransform::new(64).unwrap();
        let mut output = vec![0.0; 32];
        // Leave a non-zero spectrum in the working buffer first
        transform.magnitudes(&[1.0; 64], &mut output);

        transform.magnitudes(&[], &mut output);
        assert!(output.iter().all(|&m| m == 0.0));

        transform.magnitudes(&[1.0; 32], &mut output);
        assert!((output[0] - 32.0).abs() < 1e-4);
    }

    #[test]
    fn test_rejects_sizes_outside_range() {
        assert!(RustFftTransform::new(MIN_TRANSFORM_SIZE / 2).is_err());
        assert!(RustFftTransform::new(MAX_TRANSFORM_SIZE * 2).is_err());
        assert!(RustFftTransform::new(96).is_err());
    }
}
