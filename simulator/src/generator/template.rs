/// Stamp a Gaussian point source additively onto a row-major sample grid,
/// truncated at four sigma.
pub fn gaussian_spot(
    samples: &mut [f32],
    width: usize,
    height: usize,
    x: f64,
    y: f64,
    peak: f32,
    sigma: f64,
) {
    let reach = (4.0 * sigma).ceil() as isize;
    let cx = x.round() as isize;
    let cy = y.round() as isize;
    for gy in (cy - reach).max(0)..=(cy + reach).min(height as isize - 1) {
        for gx in (cx - reach).max(0)..=(cx + reach).min(width as isize - 1) {
            let d2 = (gx as f64 - x).powi(2) + (gy as f64 - y).powi(2);
            let value = peak * (-d2 / (2.0 * sigma * sigma)).exp() as f32;
            samples[gy as usize * width + gx as usize] += value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spot_peaks_at_its_center() {
        let mut samples = vec![0.0; 32 * 32];
        gaussian_spot(&mut samples, 32, 32, 16.0, 16.0, 100.0, 1.5);
        assert!((samples[16 * 32 + 16] - 100.0).abs() < 1e-4);
        assert!(samples[16 * 32 + 17] < 100.0);
        assert_eq!(samples[0], 0.0);
    }

    #[test]
    fn spot_near_the_border_is_clipped_not_wrapped() {
        let mut samples = vec![0.0; 16 * 16];
        gaussian_spot(&mut samples, 16, 16, 0.5, 0.5, 50.0, 2.0);
        // Opposite corner must stay untouched.
        assert_eq!(samples[16 * 16 - 1], 0.0);
    }
}
