use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::prelude::{CoreError, CoreResult};

/// Sample type the image was materialized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleType {
    U8,
    I16,
    I32,
    F32,
}

/// Immutable 2-D sample grid.
///
/// Samples are held as `f32` regardless of the on-disk type; `sample_type`
/// records what the loader read. Processed outputs are always new values,
/// never in-place edits of a loaded frame.
#[derive(Debug, Clone)]
pub struct RasterImage {
    data: Array2<f32>,
    sample_type: SampleType,
}

impl RasterImage {
    pub fn new(data: Array2<f32>, sample_type: SampleType) -> Self {
        Self { data, sample_type }
    }

    /// Build a frame from a row-major sample vector.
    pub fn from_vec(
        width: usize,
        height: usize,
        samples: Vec<f32>,
        sample_type: SampleType,
    ) -> CoreResult<Self> {
        if samples.len() != width * height {
            return Err(CoreError::InvalidInput(format!(
                "expected {} samples for a {}x{} frame, got {}",
                width * height,
                width,
                height,
                samples.len()
            )));
        }
        let data = Array2::from_shape_vec((height, width), samples)
            .map_err(|e| CoreError::InvalidInput(e.to_string()))?;
        Ok(Self { data, sample_type })
    }

    pub fn width(&self) -> usize {
        self.data.ncols()
    }

    pub fn height(&self) -> usize {
        self.data.nrows()
    }

    pub fn sample_type(&self) -> SampleType {
        self.sample_type
    }

    /// Read-only view of the sample grid, indexed `[row, col]`.
    pub fn data(&self) -> &Array2<f32> {
        &self.data
    }

    /// Sample at pixel (x, y); `None` outside the frame.
    pub fn get(&self, x: usize, y: usize) -> Option<f32> {
        self.data.get((y, x)).copied()
    }

    /// Bilinear sample at a fractional pixel position; 0.0 outside the frame.
    pub fn sample_bilinear(&self, x: f64, y: f64) -> f32 {
        let (w, h) = (self.width() as f64, self.height() as f64);
        if x < 0.0 || y < 0.0 || x > w - 1.0 || y > h - 1.0 {
            return 0.0;
        }
        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(self.width() - 1);
        let y1 = (y0 + 1).min(self.height() - 1);
        let fx = (x - x0 as f64) as f32;
        let fy = (y - y0 as f64) as f32;

        let p00 = self.data[(y0, x0)];
        let p10 = self.data[(y0, x1)];
        let p01 = self.data[(y1, x0)];
        let p11 = self.data[(y1, x1)];

        let top = p00 * (1.0 - fx) + p10 * fx;
        let bottom = p01 * (1.0 - fx) + p11 * fx;
        top * (1.0 - fy) + bottom * fy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_vec_rejects_wrong_length() {
        let result = RasterImage::from_vec(3, 3, vec![0.0; 8], SampleType::F32);
        assert!(matches!(result, Err(CoreError::InvalidInput(_))));
    }

    #[test]
    fn bilinear_interpolates_between_samples() {
        let img = RasterImage::from_vec(2, 1, vec![0.0, 10.0], SampleType::F32).unwrap();
        assert_eq!(img.sample_bilinear(0.5, 0.0), 5.0);
        assert_eq!(img.sample_bilinear(-1.0, 0.0), 0.0);
    }

    #[test]
    fn indexing_is_row_major() {
        let img = RasterImage::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0], SampleType::I16).unwrap();
        assert_eq!(img.get(1, 0), Some(2.0));
        assert_eq!(img.get(0, 1), Some(3.0));
        assert_eq!(img.get(2, 0), None);
    }
}
