use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::detection::components::connected_components;
use crate::detection::features::{compute_features, FeatureVector};
use crate::frame::RasterImage;
use crate::math::StatsHelper;
use crate::prelude::{CoreError, CoreResult};
use crate::wcs::SkyPosition;

/// Detection thresholds and artifact filters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionParams {
    /// Threshold multiplier over the local background standard deviation.
    pub k_sigma: f32,
    /// Background estimation tile size in pixels.
    pub tile_size: usize,
    pub min_area: usize,
    pub max_area: usize,
    /// Components whose bounding box enters this border band are dropped.
    pub edge_margin: usize,
    pub min_sharpness: f32,
    pub max_sharpness: f32,
    pub min_contrast: f32,
    pub max_elongation: f32,
    /// Reject flat residuals by the sharpness/contrast bounds.
    pub kill_flat: bool,
    /// Reject dipoles: a negative lobe beside the positive residual is the
    /// signature of a mis-subtracted static source.
    pub kill_dipole: bool,
    /// Depth of the negative lobe that triggers dipole rejection.
    pub dipole_depth: f32,
    /// Distance scale for the motion-consistency score, pixels.
    pub motion_gate_px: f64,
    /// Keep only the strongest K candidates after ordering.
    pub top_k: Option<usize>,
}

impl Default for DetectionParams {
    fn default() -> Self {
        Self {
            k_sigma: 5.0,
            tile_size: 64,
            min_area: 5,
            max_area: 600,
            edge_margin: 10,
            min_sharpness: 1.2,
            max_sharpness: 12.0,
            min_contrast: 10.0,
            max_elongation: 3.0,
            kill_flat: true,
            kill_dipole: true,
            dipole_depth: 15.0,
            motion_gate_px: 20.0,
            top_k: None,
        }
    }
}

/// Reviewer/classifier verdict attached to a candidate after detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CandidateLabel {
    Unknown,
    Real,
    Bogus,
}

/// One candidate transient source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// Flux-weighted centroid in the new frame's pixel coordinates.
    pub x: f64,
    pub y: f64,
    /// Resolved sky position; `None` until a solution is applied.
    pub sky: Option<SkyPosition>,
    pub features: FeatureVector,
    pub label: CandidateLabel,
    /// Identifier of the known object this candidate matched, if any.
    pub known_id: Option<String>,
}

/// Detect candidate sources in the difference of two registered frames.
pub fn detect(
    new: &RasterImage,
    aligned_old: &RasterImage,
    params: &DetectionParams,
) -> CoreResult<Vec<Candidate>> {
    detect_with_prior(new, aligned_old, params, None)
}

/// `detect`, scoring motion consistency against a prior epoch's candidates.
pub fn detect_with_prior(
    new: &RasterImage,
    aligned_old: &RasterImage,
    params: &DetectionParams,
    prior: Option<&[Candidate]>,
) -> CoreResult<Vec<Candidate>> {
    if new.width() != aligned_old.width() || new.height() != aligned_old.height() {
        return Err(CoreError::ShapeMismatch {
            new_width: new.width(),
            new_height: new.height(),
            old_width: aligned_old.width(),
            old_height: aligned_old.height(),
        });
    }

    let width = new.width();
    let height = new.height();
    let diff: Array2<f32> = new.data() - aligned_old.data();

    // Noise-adaptive threshold per background tile: median + k * sigma.
    let tile = params.tile_size.max(8);
    let tiles_x = width.div_ceil(tile);
    let tiles_y = height.div_ceil(tile);
    let mut tile_threshold: Array2<f32> = Array2::zeros((tiles_y, tiles_x));
    let mut tile_sigma: Array2<f32> = Array2::zeros((tiles_y, tiles_x));
    let mut samples = Vec::with_capacity(tile * tile);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            samples.clear();
            for y in (ty * tile)..((ty + 1) * tile).min(height) {
                for x in (tx * tile)..((tx + 1) * tile).min(width) {
                    samples.push(diff[(y, x)]);
                }
            }
            let median = StatsHelper::median(&samples);
            let sigma = StatsHelper::std_dev(&samples);
            tile_threshold[(ty, tx)] = median + params.k_sigma * sigma;
            tile_sigma[(ty, tx)] = sigma;
        }
    }

    let mut mask = Array2::from_elem((height, width), false);
    for ((y, x), flagged) in mask.indexed_iter_mut() {
        *flagged = diff[(y, x)] > tile_threshold[(y / tile, x / tile)];
    }

    let mut candidates = Vec::new();
    for pixels in connected_components(&mask) {
        if pixels.len() < params.min_area || pixels.len() > params.max_area {
            continue;
        }

        let (mut x0, mut y0, mut x1, mut y1) = (usize::MAX, usize::MAX, 0usize, 0usize);
        for &(x, y) in &pixels {
            x0 = x0.min(x);
            y0 = y0.min(y);
            x1 = x1.max(x);
            y1 = y1.max(y);
        }
        if x0 < params.edge_margin
            || y0 < params.edge_margin
            || x1 + params.edge_margin >= width
            || y1 + params.edge_margin >= height
        {
            continue;
        }

        // Flux-weighted centroid over the component.
        let (mut wx, mut wy, mut wsum) = (0.0f64, 0.0f64, 0.0f64);
        for &(x, y) in &pixels {
            let w = diff[(y, x)].max(0.0) as f64;
            wx += w * x as f64;
            wy += w * y as f64;
            wsum += w;
        }
        if wsum <= 0.0 {
            continue;
        }
        let centroid = (wx / wsum, wy / wsum);

        let sigma = tile_sigma[(
            (centroid.1 as usize).min(height - 1) / tile,
            (centroid.0 as usize).min(width - 1) / tile,
        )];
        let mut features = compute_features(
            &diff,
            new.data(),
            aligned_old.data(),
            &pixels,
            centroid,
            sigma,
        );

        if params.kill_flat
            && (features.sharpness < params.min_sharpness
                || features.sharpness > params.max_sharpness
                || features.contrast < params.min_contrast)
        {
            continue;
        }
        if features.elongation > params.max_elongation {
            continue;
        }
        if params.kill_dipole {
            let pad = 4usize;
            let dy0 = y0.saturating_sub(pad);
            let dy1 = (y1 + pad).min(height - 1);
            let dx0 = x0.saturating_sub(pad);
            let dx1 = (x1 + pad).min(width - 1);
            let mut local_min = f32::MAX;
            for y in dy0..=dy1 {
                for x in dx0..=dx1 {
                    local_min = local_min.min(diff[(y, x)]);
                }
            }
            if local_min < -params.dipole_depth {
                continue;
            }
        }

        if let Some(prior) = prior {
            features.motion_score = motion_score(centroid, prior, params.motion_gate_px);
        }

        candidates.push(Candidate {
            x: centroid.0,
            y: centroid.1,
            sky: None,
            features,
            label: CandidateLabel::Unknown,
            known_id: None,
        });
    }

    // Deterministic ordering: descending flux, ties by ascending (y, x).
    candidates.sort_by(|a, b| {
        b.features
            .flux
            .total_cmp(&a.features.flux)
            .then(a.y.total_cmp(&b.y))
            .then(a.x.total_cmp(&b.x))
    });
    if let Some(k) = params.top_k {
        candidates.truncate(k);
    }
    Ok(candidates)
}

/// Proximity-based association score against a prior epoch, in (0, 1];
/// 0 when nothing from the prior epoch lies anywhere near.
fn motion_score(centroid: (f64, f64), prior: &[Candidate], gate_px: f64) -> f32 {
    let mut best = f64::MAX;
    for p in prior {
        let d = ((p.x - centroid.0).powi(2) + (p.y - centroid.1).powi(2)).sqrt();
        best = best.min(d);
    }
    if best == f64::MAX || gate_px <= 0.0 {
        return 0.0;
    }
    (-best / gate_px).exp() as f32
}

/// Resolve candidate sky positions through an astrometric solution.
pub fn resolve_sky(
    candidates: &mut [Candidate],
    solution: &crate::wcs::AstrometricSolution,
) {
    for c in candidates.iter_mut() {
        c.sky = Some(crate::wcs::pixel_to_sky(c.x, c.y, solution));
    }
}
