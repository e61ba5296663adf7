use ndarray::Array2;
use num_complex::Complex32;
use rustfft::{num_traits::Zero, Fft, FftPlanner};
use std::sync::Arc;

/// Separable 2-D FFT that wraps the `rustfft` planner for reuse.
///
/// Plans are built once per frame geometry; `forward`/`inverse` run the
/// row pass then the column pass through a scratch line buffer.
pub struct Fft2 {
    width: usize,
    height: usize,
    row_forward: Arc<dyn Fft<f32>>,
    row_inverse: Arc<dyn Fft<f32>>,
    col_forward: Arc<dyn Fft<f32>>,
    col_inverse: Arc<dyn Fft<f32>>,
}

impl Fft2 {
    pub fn new(width: usize, height: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            width,
            height,
            row_forward: planner.plan_fft_forward(width),
            row_inverse: planner.plan_fft_inverse(width),
            col_forward: planner.plan_fft_forward(height),
            col_inverse: planner.plan_fft_inverse(height),
        }
    }

    /// Forward transform of a real sample grid.
    pub fn forward(&self, input: &Array2<f32>) -> Array2<Complex32> {
        let mut grid = input.mapv(|v| Complex32::new(v, 0.0));
        self.pass_rows(&mut grid, &self.row_forward);
        self.pass_cols(&mut grid, &self.col_forward);
        grid
    }

    /// Inverse transform, normalized by 1/(width*height).
    pub fn inverse(&self, grid: &mut Array2<Complex32>) {
        self.pass_rows(grid, &self.row_inverse);
        self.pass_cols(grid, &self.col_inverse);
        let norm = 1.0 / (self.width * self.height) as f32;
        grid.mapv_inplace(|v| v * norm);
    }

    fn pass_rows(&self, grid: &mut Array2<Complex32>, fft: &Arc<dyn Fft<f32>>) {
        let mut line = vec![Complex32::zero(); self.width];
        for y in 0..self.height {
            for x in 0..self.width {
                line[x] = grid[(y, x)];
            }
            fft.process(&mut line);
            for x in 0..self.width {
                grid[(y, x)] = line[x];
            }
        }
    }

    fn pass_cols(&self, grid: &mut Array2<Complex32>, fft: &Arc<dyn Fft<f32>>) {
        let mut line = vec![Complex32::zero(); self.height];
        for x in 0..self.width {
            for y in 0..self.height {
                line[y] = grid[(y, x)];
            }
            fft.process(&mut line);
            for y in 0..self.height {
                grid[(y, x)] = line[y];
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_preserves_shape_and_dc_term() {
        let fft = Fft2::new(4, 3);
        let input = Array2::from_elem((3, 4), 2.0_f32);
        let spectrum = fft.forward(&input);
        assert_eq!(spectrum.dim(), (3, 4));
        // DC term is the sample sum
        assert!((spectrum[(0, 0)].re - 24.0).abs() < 1e-4);
        assert!(spectrum[(0, 0)].im.abs() < 1e-4);
    }

    #[test]
    fn inverse_recovers_input() {
        let fft = Fft2::new(8, 8);
        let mut input = Array2::zeros((8, 8));
        input[(2, 5)] = 1.0;
        input[(6, 1)] = -0.5;
        let mut spectrum = fft.forward(&input);
        fft.inverse(&mut spectrum);
        for ((y, x), value) in input.indexed_iter() {
            let round = spectrum[(y, x)];
            assert!((round.re - value).abs() < 1e-5, "({y},{x})");
            assert!(round.im.abs() < 1e-5);
        }
    }
}
