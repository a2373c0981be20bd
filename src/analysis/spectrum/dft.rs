// Direct DFT - reference SpectralTransform
//
// Evaluates X[k] = sum_n x[n] * e^(-2*pi*i*k*n/N) term by term in f64. Slow,
// but independent of any FFT library, which makes it the yardstick the
// production transform is checked against.

use std::f64::consts::PI;

use super::SpectralTransform;

/// O(N^2) discrete Fourier transform
pub struct DirectDft {
    size: usize,
}

impl DirectDft {
    pub fn new(size: usize) -> Self {
        Self { size }
    }
}

impl SpectralTransform for DirectDft {
    fn size(&self) -> usize {
        self.size
    }

    fn magnitudes(&mut self, input: &[f32], output: &mut [f32]) {
        let n = self.size as f64;
        for (k, magnitude) in output.iter_mut().enumerate().take(self.size / 2) {
            let mut re = 0.0f64;
            let mut im = 0.0f64;
            for (i, &x) in input.iter().enumerate().take(self.size) {
                let angle = 2.0 * PI * (k * i % self.size) as f64 / n;
                re += x as f64 * angle.cos();
                im -= x as f64 * angle.sin();
            }
            *magnitude = (re * re + im * im).sqrt() as f32;
        }
    }
}
