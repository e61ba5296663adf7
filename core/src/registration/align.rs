use ndarray::Array2;
use num_complex::Complex32;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::frame::RasterImage;
use crate::math::{Fft2, StatsHelper};
use crate::prelude::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AlignParams {
    /// Shifts beyond this many pixels mark the result low-confidence.
    pub max_shift: f64,
    /// Correlation peaks below this response mark the result low-confidence.
    pub min_peak_response: f64,
}

impl Default for AlignParams {
    fn default() -> Self {
        Self {
            max_shift: 100.0,
            min_peak_response: 0.1,
        }
    }
}

/// Result of registering an old frame onto a new frame's grid.
///
/// `dx`/`dy` are the translation applied to the old frame's sampling grid:
/// `aligned_old(x, y) = old(x - dx, y - dy)`. A source sitting at
/// `(x + 3, y)` in the old frame therefore reports `dx = -3`. The new frame
/// is never moved or resampled.
#[derive(Debug, Clone)]
pub struct AlignmentResult {
    pub dx: f64,
    pub dy: f64,
    /// Rotation slot for rotational solvers; the translational phase
    /// correlator always reports 0.0.
    pub rotation: f64,
    /// Normalized correlation peak response, 1.0 for a perfect match.
    pub peak_response: f64,
    /// RMS of (new - aligned old) over the frame after registration.
    pub residual_rms: f32,
    pub low_confidence: bool,
    pub aligned_old: RasterImage,
}

/// Register `old` onto `new`'s pixel grid by FFT phase correlation.
///
/// A weak correlation peak or an implausibly large shift flags the result
/// low-confidence instead of failing; only incompatible dimensions are a
/// hard error.
pub fn align(
    new: &RasterImage,
    old: &RasterImage,
    params: &AlignParams,
) -> CoreResult<AlignmentResult> {
    if new.width() != old.width() || new.height() != old.height() {
        return Err(CoreError::ShapeMismatch {
            new_width: new.width(),
            new_height: new.height(),
            old_width: old.width(),
            old_height: old.height(),
        });
    }

    let w = new.width();
    let h = new.height();
    let fft = Fft2::new(w, h);

    let spec_new = fft.forward(new.data());
    let spec_old = fft.forward(old.data());

    // Normalized cross-power spectrum.
    let mut cross: Array2<Complex32> = Array2::zeros((h, w));
    for ((y, x), value) in cross.indexed_iter_mut() {
        let c = spec_new[(y, x)] * spec_old[(y, x)].conj();
        let mag = c.norm();
        if mag > 1e-12 {
            *value = c / mag;
        }
    }
    fft.inverse(&mut cross);

    // Correlation peak and parabolic sub-pixel refinement.
    let mut peak = (0usize, 0usize);
    let mut peak_value = f32::MIN;
    for ((y, x), value) in cross.indexed_iter() {
        if value.re > peak_value {
            peak_value = value.re;
            peak = (y, x);
        }
    }
    let (py, px) = peak;
    let refine = |minus: f32, center: f32, plus: f32| -> f64 {
        let denom = minus - 2.0 * center + plus;
        if denom.abs() < 1e-12 {
            return 0.0;
        }
        let frac = (0.5 * (minus - plus) / denom).clamp(-0.5, 0.5) as f64;
        // Fractions below measurement noise are snapped so an exact match
        // registers at exactly zero and resamples losslessly.
        if frac.abs() < 1e-4 {
            0.0
        } else {
            frac
        }
    };
    let frac_x = refine(
        cross[(py, (px + w - 1) % w)].re,
        peak_value,
        cross[(py, (px + 1) % w)].re,
    );
    let frac_y = refine(
        cross[((py + h - 1) % h, px)].re,
        peak_value,
        cross[((py + 1) % h, px)].re,
    );

    let signed = |index: usize, extent: usize, frac: f64| -> f64 {
        let raw = index as f64 + frac;
        if raw > extent as f64 / 2.0 {
            raw - extent as f64
        } else {
            raw
        }
    };
    let dx = signed(px, w, frac_x);
    let dy = signed(py, h, frac_y);

    let low_confidence = (peak_value as f64) < params.min_peak_response
        || dx.abs() > params.max_shift
        || dy.abs() > params.max_shift;

    // Resample the old frame onto the new grid; bilinear weighting preserves
    // flux under pure translation, out-of-field samples are zero. Zero shift
    // copies the samples through unchanged.
    let aligned = if dx == 0.0 && dy == 0.0 {
        old.data().clone()
    } else {
        let mut grid = Array2::zeros((h, w));
        for ((y, x), value) in grid.indexed_iter_mut() {
            *value = old.sample_bilinear(x as f64 - dx, y as f64 - dy);
        }
        grid
    };

    let residual: Vec<f32> = new
        .data()
        .iter()
        .zip(aligned.iter())
        .map(|(a, b)| a - b)
        .collect();

    Ok(AlignmentResult {
        dx,
        dy,
        rotation: 0.0,
        peak_response: peak_value as f64,
        residual_rms: StatsHelper::rms(&residual),
        low_confidence,
        aligned_old: RasterImage::new(aligned, old.sample_type()),
    })
}

/// Align N pairs independently and in parallel, preserving pair order.
///
/// Each pair's failure is isolated in its own slot; one incompatible pair
/// never aborts the batch.
pub fn batch_align(
    pairs: &[(&RasterImage, &RasterImage)],
    params: &AlignParams,
) -> Vec<CoreResult<AlignmentResult>> {
    pairs
        .par_iter()
        .map(|&(new, old)| align(new, old, params))
        .collect()
}
