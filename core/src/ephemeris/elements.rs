use serde::{Deserialize, Serialize};

use crate::designation::Designation;

/// Keplerian orbital elements of a catalogued object. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitalElements {
    pub designation: Designation,
    /// Epoch of osculation, Julian date.
    pub epoch_jd: f64,
    pub semi_major_axis_au: f64,
    pub eccentricity: f64,
    pub inclination_deg: f64,
    pub ascending_node_deg: f64,
    pub arg_perihelion_deg: f64,
    pub mean_anomaly_deg: f64,
    /// Absolute magnitude H.
    pub abs_magnitude: f64,
    /// Slope parameter G of the H-G phase model.
    pub slope_param: f64,
}

/// Keep catalog entries at least as bright as `limit_mag` in absolute
/// magnitude. Pure filter; catalog order is preserved.
pub fn filter_by_magnitude(catalog: &[OrbitalElements], limit_mag: f64) -> Vec<OrbitalElements> {
    catalog
        .iter()
        .filter(|e| e.abs_magnitude <= limit_mag)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(number: u32, h: f64) -> OrbitalElements {
        OrbitalElements {
            designation: Designation::MinorPlanet(number),
            epoch_jd: 2_460_600.5,
            semi_major_axis_au: 2.5,
            eccentricity: 0.1,
            inclination_deg: 5.0,
            ascending_node_deg: 100.0,
            arg_perihelion_deg: 50.0,
            mean_anomaly_deg: 10.0,
            abs_magnitude: h,
            slope_param: 0.15,
        }
    }

    #[test]
    fn magnitude_filter_preserves_catalog_order() {
        let catalog = vec![entry(3, 14.0), entry(1, 3.3), entry(2, 22.0), entry(4, 18.0)];
        let filtered = filter_by_magnitude(&catalog, 18.0);
        let numbers: Vec<u32> = filtered
            .iter()
            .map(|e| match e.designation {
                Designation::MinorPlanet(n) => n,
                _ => unreachable!(),
            })
            .collect();
        assert_eq!(numbers, vec![3, 1, 4]);
    }

    #[test]
    fn magnitude_filter_keeps_boundary_value() {
        let catalog = vec![entry(1, 20.0)];
        assert_eq!(filter_by_magnitude(&catalog, 20.0).len(), 1);
    }
}
