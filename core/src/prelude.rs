use serde::{Deserialize, Serialize};

/// Telescope and camera geometry threaded into the pipeline by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelescopeConfig {
    pub pixel_size_um: f64,
    pub focal_length_mm: f64,
    pub camera_rotation_deg: f64,
}

impl TelescopeConfig {
    /// Pixel resolution in arcseconds per pixel from the plate-scale relation.
    pub fn pixel_scale_arcsec(&self) -> f64 {
        if self.focal_length_mm <= 0.0 {
            return 0.0;
        }
        206.265 * self.pixel_size_um / self.focal_length_mm
    }
}

impl Default for TelescopeConfig {
    fn default() -> Self {
        Self {
            pixel_size_um: 9.0,
            focal_length_mm: 0.0,
            camera_rotation_deg: 0.0,
        }
    }
}

/// Observing-site metadata, consumed read-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservatoryConfig {
    /// Three-character MPC observatory code.
    pub code: String,
    pub name: String,
    pub longitude_deg: f64,
    pub latitude_deg: f64,
    pub altitude_m: f64,
}

/// Common error type for every core operation.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("shape mismatch: new frame is {new_width}x{new_height}, old frame is {old_width}x{old_height}")]
    ShapeMismatch {
        new_width: usize,
        new_height: usize,
        old_width: usize,
        old_height: usize,
    },
    #[error("insufficient star matches for a plate solution: needed {needed}, got {got}")]
    InsufficientMatches { needed: usize, got: usize },
    #[error("plate solution diverged: rms residual {residual:.4} px exceeds bound {bound:.4} px")]
    FitDivergence { residual: f64, bound: f64 },
    #[error("Kepler solver did not converge after {iterations} iterations (e = {eccentricity:.6})")]
    NoConvergence {
        iterations: usize,
        eccentricity: f64,
    },
    #[error("unrepresentable designation: {0}")]
    UnrepresentableDesignation(String),
    #[error("malformed packed designation: {0}")]
    MalformedPackedForm(String),
    #[error("field overflow in {field}: {value:?} does not fit {width} columns")]
    FieldOverflow {
        field: &'static str,
        width: usize,
        value: String,
    },
    #[error("malformed element record on line {line}: {reason}")]
    MalformedElementLine { line: usize, reason: String },
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_scale_from_focal_length() {
        let tel = TelescopeConfig {
            pixel_size_um: 9.0,
            focal_length_mm: 2000.0,
            camera_rotation_deg: 0.0,
        };
        let scale = tel.pixel_scale_arcsec();
        assert!((scale - 0.9281925).abs() < 1e-6);
    }

    #[test]
    fn pixel_scale_zero_without_focal_length() {
        assert_eq!(TelescopeConfig::default().pixel_scale_arcsec(), 0.0);
    }
}
