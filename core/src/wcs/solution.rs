use serde::{Deserialize, Serialize};

use crate::frame::ImageHeader;

/// A position on the celestial sphere, ICRS, degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyPosition {
    pub ra_deg: f64,
    pub dec_deg: f64,
}

/// Quadratic pixel-space distortion terms.
///
/// `distort` maps ideal (projection-plane) pixel offsets to measured ones;
/// `undistort` inverts it by fixed-point iteration, which converges fast for
/// the small corrections real optics produce.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PolynomialDistortion {
    /// dx = a[0] + a[1]*u + a[2]*v + a[3]*u^2 + a[4]*u*v + a[5]*v^2
    pub a: [f64; 6],
    /// dy, same basis
    pub b: [f64; 6],
}

impl PolynomialDistortion {
    fn delta(&self, u: f64, v: f64) -> (f64, f64) {
        let basis = [1.0, u, v, u * u, u * v, v * v];
        let mut dx = 0.0;
        let mut dy = 0.0;
        for i in 0..6 {
            dx += self.a[i] * basis[i];
            dy += self.b[i] * basis[i];
        }
        (dx, dy)
    }

    pub fn distort(&self, u: f64, v: f64) -> (f64, f64) {
        let (dx, dy) = self.delta(u, v);
        (u + dx, v + dy)
    }

    pub fn undistort(&self, u: f64, v: f64) -> (f64, f64) {
        let mut iu = u;
        let mut iv = v;
        for _ in 0..5 {
            let (dx, dy) = self.delta(iu, iv);
            iu = u - dx;
            iv = v - dy;
        }
        (iu, iv)
    }
}

/// Astrometric solution: the mapping between pixel and sky coordinates.
///
/// `crpix` is the reference pixel, `crval` the reference sky coordinate in
/// degrees, `cd` the scale/rotation matrix in degrees per pixel. Owned by one
/// frame's processing session and immutable within it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstrometricSolution {
    pub crpix: [f64; 2],
    pub crval: [f64; 2],
    pub cd: [[f64; 2]; 2],
    pub distortion: Option<PolynomialDistortion>,
}

impl AstrometricSolution {
    /// Read the solution from standard WCS header cards. CD-matrix cards are
    /// preferred; CDELT scales are the fallback.
    pub fn from_header(header: &ImageHeader) -> Option<Self> {
        let crpix = [header.get_f64("CRPIX1")?, header.get_f64("CRPIX2")?];
        let crval = [header.get_f64("CRVAL1")?, header.get_f64("CRVAL2")?];

        let cd = if let (Some(cd11), Some(cd12), Some(cd21), Some(cd22)) = (
            header.get_f64("CD1_1"),
            header.get_f64("CD1_2"),
            header.get_f64("CD2_1"),
            header.get_f64("CD2_2"),
        ) {
            [[cd11, cd12], [cd21, cd22]]
        } else {
            let cdelt1 = header.get_f64("CDELT1")?;
            let cdelt2 = header.get_f64("CDELT2")?;
            let rota = header.get_f64("CROTA2").unwrap_or(0.0).to_radians();
            [
                [cdelt1 * rota.cos(), -cdelt2 * rota.sin()],
                [cdelt1 * rota.sin(), cdelt2 * rota.cos()],
            ]
        };

        Some(Self {
            crpix,
            crval,
            cd,
            distortion: None,
        })
    }

    /// Determinant of the CD matrix, degrees^2 per pixel^2.
    pub fn cd_determinant(&self) -> f64 {
        self.cd[0][0] * self.cd[1][1] - self.cd[0][1] * self.cd[1][0]
    }

    /// Mean pixel scale in arcseconds per pixel.
    pub fn pixel_scale_arcsec(&self) -> f64 {
        self.cd_determinant().abs().sqrt() * 3600.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::HeaderValue;

    #[test]
    fn from_header_reads_cd_matrix() {
        let mut h = ImageHeader::new();
        h.push("CRPIX1", HeaderValue::Real(512.0));
        h.push("CRPIX2", HeaderValue::Real(512.0));
        h.push("CRVAL1", HeaderValue::Real(150.0));
        h.push("CRVAL2", HeaderValue::Real(2.2));
        h.push("CD1_1", HeaderValue::Real(-2.8e-4));
        h.push("CD1_2", HeaderValue::Real(0.0));
        h.push("CD2_1", HeaderValue::Real(0.0));
        h.push("CD2_2", HeaderValue::Real(2.8e-4));

        let sol = AstrometricSolution::from_header(&h).unwrap();
        assert_eq!(sol.crval, [150.0, 2.2]);
        assert!((sol.pixel_scale_arcsec() - 1.008).abs() < 1e-3);
    }

    #[test]
    fn from_header_missing_wcs_is_none() {
        let h = ImageHeader::new();
        assert!(AstrometricSolution::from_header(&h).is_none());
    }

    #[test]
    fn distortion_roundtrip() {
        let dist = PolynomialDistortion {
            a: [0.0, 1e-4, 0.0, 1e-7, 0.0, 0.0],
            b: [0.0, 0.0, 1e-4, 0.0, 0.0, 1e-7],
        };
        let (du, dv) = dist.distort(150.0, -80.0);
        let (u, v) = dist.undistort(du, dv);
        assert!((u - 150.0).abs() < 1e-8);
        assert!((v + 80.0).abs() < 1e-8);
    }
}
