use anyhow::Context;
use blinkcore::frame::{FramePair, HeaderValue, ImageHeader, RasterImage, SampleType};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::generator::template::gaussian_spot;

/// A planted moving source: at `(x, y)` in the new epoch, displaced by
/// `motion_px` since the old one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TransientSpec {
    pub x: f64,
    pub y: f64,
    pub peak: f32,
    pub motion_px: (f64, f64),
}

/// Configuration for the synthetic star-field generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub width: usize,
    pub height: usize,
    pub star_count: usize,
    pub star_peak_range: (f32, f32),
    pub noise: f32,
    pub psf_sigma_px: f64,
    pub seed: u64,
    /// Pointing offset of the old frame relative to the new one, pixels.
    pub shift_px: (f64, f64),
    pub transient: Option<TransientSpec>,
    pub crval: (f64, f64),
    pub pixel_scale_arcsec: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            star_count: 40,
            star_peak_range: (150.0, 600.0),
            noise: 4.0,
            psf_sigma_px: 1.8,
            seed: 7,
            shift_px: (2.0, -1.0),
            transient: Some(TransientSpec {
                x: 128.4,
                y: 96.7,
                peak: 400.0,
                motion_px: (15.0, -11.0),
            }),
            crval: (159.62, 7.74),
            pixel_scale_arcsec: 1.2,
        }
    }
}

fn render_noise(samples: &mut [f32], noise: f32, seed: u64) {
    if noise <= 0.0 {
        return;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    for value in samples.iter_mut() {
        *value += rng.gen_range(-noise..noise);
    }
}

fn wcs_cards(config: &GeneratorConfig, date_obs: &str) -> ImageHeader {
    let scale = config.pixel_scale_arcsec / 3600.0;
    let mut header = ImageHeader::new();
    header.push("NAXIS1", HeaderValue::Integer(config.width as i64));
    header.push("NAXIS2", HeaderValue::Integer(config.height as i64));
    header.push("DATE-OBS", HeaderValue::Text(date_obs.into()));
    header.push("EXPTIME", HeaderValue::Real(120.0));
    header.push("CRPIX1", HeaderValue::Real(config.width as f64 / 2.0));
    header.push("CRPIX2", HeaderValue::Real(config.height as f64 / 2.0));
    header.push("CRVAL1", HeaderValue::Real(config.crval.0));
    header.push("CRVAL2", HeaderValue::Real(config.crval.1));
    header.push("CD1_1", HeaderValue::Real(-scale));
    header.push("CD1_2", HeaderValue::Real(0.0));
    header.push("CD2_1", HeaderValue::Real(0.0));
    header.push("CD2_2", HeaderValue::Real(scale));
    header
}

/// Build a synthetic new/old pair of the same star field: the old frame is
/// offset by the configured pointing shift, carries its own noise, and holds
/// the transient at its earlier position.
pub fn build_frame_pair(config: &GeneratorConfig) -> anyhow::Result<FramePair> {
    let sample_count = config
        .width
        .checked_mul(config.height)
        .filter(|&n| n > 0)
        .context("frame dimensions must be positive")?;

    let mut star_rng = StdRng::seed_from_u64(config.seed);
    let margin = 12.0;
    let stars: Vec<(f64, f64, f32)> = (0..config.star_count)
        .map(|_| {
            (
                star_rng.gen_range(margin..config.width as f64 - margin),
                star_rng.gen_range(margin..config.height as f64 - margin),
                star_rng.gen_range(config.star_peak_range.0..config.star_peak_range.1),
            )
        })
        .collect();

    let mut new_samples = vec![0.0f32; sample_count];
    let mut old_samples = vec![0.0f32; sample_count];
    render_noise(&mut new_samples, config.noise, config.seed.wrapping_add(1));
    render_noise(&mut old_samples, config.noise, config.seed.wrapping_add(2));

    let (w, h) = (config.width, config.height);
    let (sx, sy) = config.shift_px;
    for &(x, y, peak) in &stars {
        gaussian_spot(&mut new_samples, w, h, x, y, peak, config.psf_sigma_px);
        gaussian_spot(&mut old_samples, w, h, x + sx, y + sy, peak, config.psf_sigma_px);
    }
    if let Some(t) = &config.transient {
        gaussian_spot(&mut new_samples, w, h, t.x, t.y, t.peak, config.psf_sigma_px);
        gaussian_spot(
            &mut old_samples,
            w,
            h,
            t.x - t.motion_px.0 + sx,
            t.y - t.motion_px.1 + sy,
            t.peak,
            config.psf_sigma_px,
        );
    }

    Ok(FramePair {
        name: format!("field-{}", config.seed),
        new_frame: RasterImage::from_vec(w, h, new_samples, SampleType::F32)?,
        new_header: wcs_cards(config, "2025-12-20T20:35:38.112"),
        old_frame: RasterImage::from_vec(w, h, old_samples, SampleType::F32)?,
        old_header: wcs_cards(config, "2025-12-19T20:31:12.000"),
    })
}
