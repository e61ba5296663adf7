use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::designation::Designation;
use crate::ephemeris::elements::OrbitalElements;
use crate::ephemeris::time::gmst_rad;
use crate::prelude::{CoreError, CoreResult, ObservatoryConfig};
use crate::wcs::SkyPosition;

/// Convergence tolerance on the eccentric-anomaly update, radians.
pub const CONVERGENCE_TOL: f64 = 1e-12;
/// Iteration cap; the solver never loops unbounded.
pub const MAX_ITERATIONS: usize = 50;

/// Gaussian gravitational constant, radians per day.
const GAUSS_K: f64 = 0.017_202_098_95;
const OBLIQUITY_J2000_DEG: f64 = 23.439_291_1;
/// Light travel time per astronomical unit, days.
const LIGHT_DAYS_PER_AU: f64 = 0.005_775_518_3;
const EARTH_RADIUS_AU: f64 = 4.263_52e-5;
const EARTH_RADIUS_M: f64 = 6_378_137.0;

/// Solve Kepler's equation `M = E - e sin E` for the eccentric anomaly by
/// Newton iteration. Returns `(E, iterations)`; a circular orbit converges
/// on the first iteration with zero residual.
pub fn solve_kepler(mean_anomaly_rad: f64, eccentricity: f64) -> CoreResult<(f64, usize)> {
    if !(0.0..1.0).contains(&eccentricity) {
        return Err(CoreError::InvalidInput(format!(
            "eccentricity {eccentricity} is outside the elliptic range [0, 1)"
        )));
    }
    let m = mean_anomaly_rad;
    let mut e_anom = if eccentricity < 0.8 {
        m
    } else {
        std::f64::consts::PI
    };
    for iteration in 1..=MAX_ITERATIONS {
        let delta =
            (e_anom - eccentricity * e_anom.sin() - m) / (1.0 - eccentricity * e_anom.cos());
        e_anom -= delta;
        if delta.abs() < CONVERGENCE_TOL {
            return Ok((e_anom, iteration));
        }
    }
    Err(CoreError::NoConvergence {
        iterations: MAX_ITERATIONS,
        eccentricity,
    })
}

/// Heliocentric equatorial position of the body at a Julian date, AU.
pub(crate) fn heliocentric_equatorial(
    elements: &OrbitalElements,
    jd: f64,
) -> CoreResult<[f64; 3]> {
    let a = elements.semi_major_axis_au;
    if a <= 0.0 {
        return Err(CoreError::InvalidInput(format!(
            "semi-major axis {a} must be positive"
        )));
    }
    let e = elements.eccentricity;
    let n = GAUSS_K / (a * a * a).sqrt();
    let m = (elements.mean_anomaly_deg.to_radians() + n * (jd - elements.epoch_jd))
        .rem_euclid(std::f64::consts::TAU);
    let (e_anom, _) = solve_kepler(m, e)?;

    // Perifocal coordinates.
    let xv = a * (e_anom.cos() - e);
    let yv = a * (1.0 - e * e).sqrt() * e_anom.sin();

    // Rotate by argument of perihelion, inclination, ascending node.
    let w = elements.arg_perihelion_deg.to_radians();
    let i = elements.inclination_deg.to_radians();
    let node = elements.ascending_node_deg.to_radians();
    let (sw, cw) = w.sin_cos();
    let (si, ci) = i.sin_cos();
    let (sn, cn) = node.sin_cos();

    let x_ecl = (cw * cn - sw * sn * ci) * xv + (-sw * cn - cw * sn * ci) * yv;
    let y_ecl = (cw * sn + sw * cn * ci) * xv + (-sw * sn + cw * cn * ci) * yv;
    let z_ecl = (sw * si) * xv + (cw * si) * yv;

    Ok(ecliptic_to_equatorial([x_ecl, y_ecl, z_ecl]))
}

fn ecliptic_to_equatorial(v: [f64; 3]) -> [f64; 3] {
    let (se, ce) = OBLIQUITY_J2000_DEG.to_radians().sin_cos();
    [v[0], v[1] * ce - v[2] * se, v[1] * se + v[2] * ce]
}

/// Heliocentric equatorial position of the Earth from low-precision solar
/// theory, AU. Good to a few arcseconds, well under a survey's astrometric
/// budget.
pub(crate) fn earth_heliocentric(jd: f64) -> [f64; 3] {
    let d = jd - 2_451_545.0;
    let g = (357.529 + 0.985_600_28 * d).to_radians();
    let q = 280.459 + 0.985_647_36 * d;
    let lambda = (q + 1.915 * g.sin() + 0.020 * (2.0 * g).sin()).to_radians();
    let r = 1.000_14 - 0.016_71 * g.cos() - 0.000_14 * (2.0 * g).cos();

    let sun_ecliptic = [r * lambda.cos(), r * lambda.sin(), 0.0];
    let sun = ecliptic_to_equatorial(sun_ecliptic);
    [-sun[0], -sun[1], -sun[2]]
}

/// Observer's geocentric equatorial position, AU.
fn observer_geocentric(observatory: &ObservatoryConfig, jd: f64) -> [f64; 3] {
    let theta = gmst_rad(jd) + observatory.longitude_deg.to_radians();
    let phi = observatory.latitude_deg.to_radians();
    let radius = EARTH_RADIUS_AU * (1.0 + observatory.altitude_m / EARTH_RADIUS_M);
    [
        radius * phi.cos() * theta.cos(),
        radius * phi.cos() * theta.sin(),
        radius * phi.sin(),
    ]
}

fn norm(v: [f64; 3]) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

/// Predicted apparent position of a catalogued object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictedPosition {
    pub designation: Designation,
    pub sky: SkyPosition,
    pub helio_distance_au: f64,
    pub geo_distance_au: f64,
    /// Apparent magnitude from the H-G phase model.
    pub magnitude: f64,
}

/// Predict where a catalogued object appears at `jd` for an observer.
///
/// Applies one light-time pass and, when an observatory is given, the
/// topocentric parallax from its geodetic position.
pub fn predict_position(
    elements: &OrbitalElements,
    jd: f64,
    observatory: Option<&ObservatoryConfig>,
) -> CoreResult<PredictedPosition> {
    let earth = earth_heliocentric(jd);
    let body = heliocentric_equatorial(elements, jd)?;
    let rho = sub(body, earth);

    // One light-time pass: re-evaluate the body where it was when the light
    // left it.
    let tau = norm(rho) * LIGHT_DAYS_PER_AU;
    let body = heliocentric_equatorial(elements, jd - tau)?;
    let mut rho = sub(body, earth);

    if let Some(obs) = observatory {
        rho = sub(rho, observer_geocentric(obs, jd));
    }

    let geo_distance = norm(rho);
    let helio_distance = norm(body);
    let mut ra = rho[1].atan2(rho[0]).to_degrees();
    if ra < 0.0 {
        ra += 360.0;
    }
    let dec = (rho[2] / geo_distance).asin().to_degrees();

    // H-G apparent magnitude at the predicted geometry.
    let sun_distance = norm(earth);
    let cos_phase = ((helio_distance * helio_distance + geo_distance * geo_distance
        - sun_distance * sun_distance)
        / (2.0 * helio_distance * geo_distance))
        .clamp(-1.0, 1.0);
    let phase = cos_phase.acos();
    let g = elements.slope_param;
    let phi1 = (-3.33 * (phase / 2.0).tan().powf(0.63)).exp();
    let phi2 = (-1.87 * (phase / 2.0).tan().powf(1.22)).exp();
    let phase_term = ((1.0 - g) * phi1 + g * phi2).max(1e-9);
    let magnitude = elements.abs_magnitude
        + 5.0 * (helio_distance * geo_distance).log10()
        - 2.5 * phase_term.log10();

    Ok(PredictedPosition {
        designation: elements.designation,
        sky: SkyPosition {
            ra_deg: ra,
            dec_deg: dec,
        },
        helio_distance_au: helio_distance,
        geo_distance_au: geo_distance,
        magnitude,
    })
}

/// Predict positions for a whole catalog in parallel, preserving catalog
/// order. A per-object solver failure occupies its own slot and never aborts
/// the batch.
pub fn predict_catalog(
    catalog: &[OrbitalElements],
    jd: f64,
    observatory: Option<&ObservatoryConfig>,
) -> Vec<CoreResult<PredictedPosition>> {
    catalog
        .par_iter()
        .map(|elements| predict_position(elements, jd, observatory))
        .collect()
}
