use crate::prelude::{CoreError, CoreResult};
use crate::wcs::solution::{AstrometricSolution, SkyPosition};

/// Gnomonic (TAN) projection of a sky position onto the tangent plane at
/// `crval`. Returns (xi, eta) in radians. Fails past the projection horizon.
pub(crate) fn project_tangent(
    ra_deg: f64,
    dec_deg: f64,
    crval: &[f64; 2],
) -> CoreResult<(f64, f64)> {
    let ra = ra_deg.to_radians();
    let dec = dec_deg.to_radians();
    let ra0 = crval[0].to_radians();
    let dec0 = crval[1].to_radians();

    let cos_c = dec0.sin() * dec.sin() + dec0.cos() * dec.cos() * (ra - ra0).cos();
    if cos_c <= 1e-9 {
        return Err(CoreError::InvalidInput(format!(
            "sky position ({ra_deg:.4}, {dec_deg:.4}) is beyond the tangent-plane horizon"
        )));
    }

    let xi = dec.cos() * (ra - ra0).sin() / cos_c;
    let eta = (dec0.cos() * dec.sin() - dec0.sin() * dec.cos() * (ra - ra0).cos()) / cos_c;
    Ok((xi, eta))
}

/// Inverse gnomonic projection: tangent-plane (xi, eta) in radians back to a
/// sky position about `crval`.
pub(crate) fn deproject_tangent(xi: f64, eta: f64, crval: &[f64; 2]) -> SkyPosition {
    let ra0 = crval[0].to_radians();
    let dec0 = crval[1].to_radians();

    let d = dec0.cos() - eta * dec0.sin();
    let ra = ra0 + xi.atan2(d);
    let dec = (dec0.sin() + eta * dec0.cos()).atan2((xi * xi + d * d).sqrt());

    let mut ra_deg = ra.to_degrees() % 360.0;
    if ra_deg < 0.0 {
        ra_deg += 360.0;
    }
    SkyPosition {
        ra_deg,
        dec_deg: dec.to_degrees(),
    }
}

/// Map a pixel position to the sky through an astrometric solution.
pub fn pixel_to_sky(x: f64, y: f64, solution: &AstrometricSolution) -> SkyPosition {
    let mut u = x - solution.crpix[0];
    let mut v = y - solution.crpix[1];
    if let Some(dist) = &solution.distortion {
        let (iu, iv) = dist.undistort(u, v);
        u = iu;
        v = iv;
    }

    let xi = (solution.cd[0][0] * u + solution.cd[0][1] * v).to_radians();
    let eta = (solution.cd[1][0] * u + solution.cd[1][1] * v).to_radians();
    deproject_tangent(xi, eta, &solution.crval)
}

/// Map a sky position to pixel coordinates; exact inverse of `pixel_to_sky`
/// to numerical tolerance for well-conditioned solutions.
pub fn sky_to_pixel(
    ra_deg: f64,
    dec_deg: f64,
    solution: &AstrometricSolution,
) -> CoreResult<(f64, f64)> {
    let (xi, eta) = project_tangent(ra_deg, dec_deg, &solution.crval)?;
    let xi_deg = xi.to_degrees();
    let eta_deg = eta.to_degrees();

    let det = solution.cd_determinant();
    if det.abs() < 1e-18 {
        return Err(CoreError::InvalidInput(
            "astrometric solution has a singular CD matrix".into(),
        ));
    }
    let mut u = (solution.cd[1][1] * xi_deg - solution.cd[0][1] * eta_deg) / det;
    let mut v = (-solution.cd[1][0] * xi_deg + solution.cd[0][0] * eta_deg) / det;

    if let Some(dist) = &solution.distortion {
        let (du, dv) = dist.distort(u, v);
        u = du;
        v = dv;
    }
    Ok((u + solution.crpix[0], v + solution.crpix[1]))
}
