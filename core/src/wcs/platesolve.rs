use ndarray::array;

use crate::math::MatrixHelper;
use crate::prelude::{CoreError, CoreResult};
use crate::wcs::projection::{project_tangent, sky_to_pixel};
use crate::wcs::solution::AstrometricSolution;

/// One correspondence between a detected star and a reference catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct StarMatch {
    pub x: f64,
    pub y: f64,
    pub ra_deg: f64,
    pub dec_deg: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct PlateSolveParams {
    /// Minimum number of correspondences before a fit is attempted.
    pub min_matches: usize,
    /// Post-fit rms residual bound in pixels.
    pub max_rms_px: f64,
}

impl Default for PlateSolveParams {
    fn default() -> Self {
        Self {
            min_matches: 5,
            max_rms_px: 1.0,
        }
    }
}

/// Fit an astrometric solution from matched star positions by least squares.
///
/// The tangent point is the normalized centroid of the matched unit vectors,
/// the reference pixel the centroid of the matched pixel positions, and the
/// CD matrix the normal-equation solution of the linear tangent-plane fit.
pub fn plate_solve(
    matches: &[StarMatch],
    params: &PlateSolveParams,
) -> CoreResult<AstrometricSolution> {
    let n = matches.len();
    if n < params.min_matches {
        return Err(CoreError::InsufficientMatches {
            needed: params.min_matches,
            got: n,
        });
    }

    // Tangent point from the unit-vector centroid of the matched stars.
    let (mut cx, mut cy, mut cz) = (0.0, 0.0, 0.0);
    for m in matches {
        let ra = m.ra_deg.to_radians();
        let dec = m.dec_deg.to_radians();
        cx += ra.cos() * dec.cos();
        cy += ra.sin() * dec.cos();
        cz += dec.sin();
    }
    let norm = (cx * cx + cy * cy + cz * cz).sqrt();
    if norm < 1e-12 {
        return Err(CoreError::InsufficientMatches {
            needed: params.min_matches,
            got: 0,
        });
    }
    let mut ra0 = cy.atan2(cx).to_degrees();
    if ra0 < 0.0 {
        ra0 += 360.0;
    }
    let dec0 = (cz / norm).asin().to_degrees();
    let crval = [ra0, dec0];

    let crpix = [
        matches.iter().map(|m| m.x).sum::<f64>() / n as f64,
        matches.iter().map(|m| m.y).sum::<f64>() / n as f64,
    ];

    // Accumulate the normal equations of xi = cd00*u + cd01*v and
    // eta = cd10*u + cd11*v.
    let (mut suu, mut suv, mut svv) = (0.0, 0.0, 0.0);
    let (mut su_xi, mut sv_xi, mut su_eta, mut sv_eta) = (0.0, 0.0, 0.0, 0.0);
    for m in matches {
        let (xi, eta) = project_tangent(m.ra_deg, m.dec_deg, &crval)?;
        let (xi, eta) = (xi.to_degrees(), eta.to_degrees());
        let u = m.x - crpix[0];
        let v = m.y - crpix[1];
        suu += u * u;
        suv += u * v;
        svv += v * v;
        su_xi += u * xi;
        sv_xi += v * xi;
        su_eta += u * eta;
        sv_eta += v * eta;
    }

    let normal = array![[suu, suv], [suv, svv]];
    // A singular normal matrix means the matches are degenerate (collinear or
    // coincident), which is an insufficiency of independent correspondences.
    let row_xi = MatrixHelper::solve(&normal, &[su_xi, sv_xi]).ok_or(
        CoreError::InsufficientMatches {
            needed: params.min_matches,
            got: n,
        },
    )?;
    let row_eta = MatrixHelper::solve(&normal, &[su_eta, sv_eta]).ok_or(
        CoreError::InsufficientMatches {
            needed: params.min_matches,
            got: n,
        },
    )?;

    let solution = AstrometricSolution {
        crpix,
        crval,
        cd: [[row_xi[0], row_xi[1]], [row_eta[0], row_eta[1]]],
        distortion: None,
    };

    // Residual check against the fitted solution.
    let mut sum_sq = 0.0;
    for m in matches {
        let (px, py) = sky_to_pixel(m.ra_deg, m.dec_deg, &solution)?;
        sum_sq += (px - m.x).powi(2) + (py - m.y).powi(2);
    }
    let rms = (sum_sq / n as f64).sqrt();
    if rms > params.max_rms_px {
        return Err(CoreError::FitDivergence {
            residual: rms,
            bound: params.max_rms_px,
        });
    }

    Ok(solution)
}
