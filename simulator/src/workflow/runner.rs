use anyhow::Context;
use blinkcore::designation::unpack;
use blinkcore::detection::{detect, resolve_sky, Candidate};
use blinkcore::ephemeris::{julian_day_utc, predict_catalog, OrbitalElements, PredictedPosition};
use blinkcore::frame::FramePair;
use blinkcore::registration::{align, batch_align, AlignmentResult};
use blinkcore::report::{format_report, Observation, ReportStyle};
use blinkcore::telemetry::{LogManager, MetricsRecorder, MetricsSnapshot};
use blinkcore::wcs::AstrometricSolution;

use crate::workflow::config::WorkflowConfig;

/// Everything one pair's run produced.
pub struct SurveyOutcome {
    pub name: String,
    pub dx: f64,
    pub dy: f64,
    pub peak_response: f64,
    pub low_confidence: bool,
    pub candidates: Vec<Candidate>,
    pub known_matches: usize,
    pub report: String,
}

pub struct Runner {
    config: WorkflowConfig,
    catalog: Vec<OrbitalElements>,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl Runner {
    pub fn new(config: WorkflowConfig, catalog: Vec<OrbitalElements>) -> Self {
        Self {
            config,
            catalog,
            metrics: MetricsRecorder::new(),
            logger: LogManager::new(),
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Run the full pipeline on one pair: register, detect, resolve sky
    /// positions, suppress known objects, and format the report.
    pub fn execute(&self, pair: &FramePair) -> anyhow::Result<SurveyOutcome> {
        let alignment = align(&pair.new_frame, &pair.old_frame, &self.config.alignment)
            .with_context(|| format!("registering pair {}", pair.name))?;
        self.finish(pair, alignment)
    }

    /// Run a whole batch: the pairs are registered in parallel, then each
    /// pair finishes independently. Output order follows input order and a
    /// failed pair occupies its own slot without aborting the rest.
    pub fn execute_batch(&self, pairs: &[FramePair]) -> Vec<anyhow::Result<SurveyOutcome>> {
        let frame_refs: Vec<_> = pairs
            .iter()
            .map(|p| (&p.new_frame, &p.old_frame))
            .collect();
        let alignments = batch_align(&frame_refs, &self.config.alignment);

        pairs
            .iter()
            .zip(alignments)
            .map(|(pair, alignment)| match alignment {
                Ok(alignment) => self.finish(pair, alignment),
                Err(error) => {
                    self.metrics.record_item_failure();
                    Err(anyhow::Error::from(error)
                        .context(format!("registering pair {}", pair.name)))
                }
            })
            .collect()
    }

    fn finish(&self, pair: &FramePair, alignment: AlignmentResult) -> anyhow::Result<SurveyOutcome> {
        self.metrics.record_pair_aligned();
        self.logger.record(&format!(
            "pair {}: dx {:.2} dy {:.2} response {:.3}",
            pair.name, alignment.dx, alignment.dy, alignment.peak_response
        ));
        if alignment.low_confidence {
            self.logger
                .warn(&format!("pair {}: low-confidence registration", pair.name));
        }

        let mut candidates = detect(
            &pair.new_frame,
            &alignment.aligned_old,
            &self.config.detection,
        )
        .with_context(|| format!("detecting candidates in pair {}", pair.name))?;
        self.metrics.record_candidates(candidates.len());

        let solution = AstrometricSolution::from_header(&pair.new_header);
        if let Some(solution) = &solution {
            resolve_sky(&mut candidates, solution);
        }

        let epoch = pair.new_header.observation_datetime();
        let mut known_matches = 0;
        if let (Some(epoch), false) = (epoch, self.catalog.is_empty()) {
            let jd = julian_day_utc(&epoch);
            let predictions = predict_catalog(&self.catalog, jd, Some(&self.config.observatory));
            let mut resolved = Vec::new();
            for prediction in predictions {
                match prediction {
                    // Objects fainter than the survey limit at their
                    // predicted geometry cannot be the source of a candidate.
                    Ok(p) if p.magnitude <= self.config.limit_magnitude => resolved.push(p),
                    Ok(_) => {}
                    Err(error) => {
                        self.metrics.record_item_failure();
                        self.logger.warn(&format!("ephemeris: {error}"));
                    }
                }
            }
            known_matches =
                suppress_known(&mut candidates, &resolved, self.config.match_radius_arcsec);
        }

        let report = match epoch {
            Some(epoch) => self.build_report(&candidates, epoch)?,
            None => String::new(),
        };

        Ok(SurveyOutcome {
            name: pair.name.clone(),
            dx: alignment.dx,
            dy: alignment.dy,
            peak_response: alignment.peak_response,
            low_confidence: alignment.low_confidence,
            candidates,
            known_matches,
            report,
        })
    }

    /// Format the strongest unsuppressed candidate under the configured
    /// suspect designation. No designation configured means no records.
    fn build_report(
        &self,
        candidates: &[Candidate],
        epoch: chrono::DateTime<chrono::Utc>,
    ) -> anyhow::Result<String> {
        let packed = match &self.config.report.designation {
            Some(packed) => packed,
            None => return Ok(String::new()),
        };
        let designation = unpack(packed)
            .with_context(|| format!("parsing report designation {packed:?}"))?;

        let suspect = candidates
            .iter()
            .find(|c| c.known_id.is_none() && c.sky.is_some());
        let (candidate, sky) = match suspect {
            Some(c) => match c.sky {
                Some(sky) => (c, sky),
                None => return Ok(String::new()),
            },
            None => return Ok(String::new()),
        };

        let magnitude =
            self.config.photometric_zero_point - 2.5 * f64::from(candidate.features.flux.max(1.0)).log10();
        let observation = Observation {
            designation,
            discovery: self.config.report.discovery,
            note1: ' ',
            note2: self.config.report.method_code,
            epoch,
            ra_deg: sky.ra_deg,
            dec_deg: sky.dec_deg,
            magnitude: Some(magnitude),
            band: self.config.report.band,
            site_code: self.config.observatory.code.clone(),
        };

        let (text, errors) = format_report(&[observation], &ReportStyle::default(), true);
        for error in &errors {
            self.metrics.record_item_failure();
            self.logger.warn(&format!("report: {error}"));
        }
        if !text.is_empty() {
            self.metrics.record_record_formatted();
        }
        Ok(text)
    }
}

/// Mark candidates lying within `radius_arcsec` of a predicted known-object
/// position; returns how many were matched.
pub fn suppress_known(
    candidates: &mut [Candidate],
    predictions: &[PredictedPosition],
    radius_arcsec: f64,
) -> usize {
    let mut matched = 0;
    for candidate in candidates.iter_mut() {
        let sky = match &candidate.sky {
            Some(sky) => sky,
            None => continue,
        };
        for prediction in predictions {
            let dra = (sky.ra_deg - prediction.sky.ra_deg)
                * sky.dec_deg.to_radians().cos();
            let ddec = sky.dec_deg - prediction.sky.dec_deg;
            let separation_arcsec = (dra * dra + ddec * ddec).sqrt() * 3600.0;
            if separation_arcsec <= radius_arcsec {
                candidate.known_id = Some(prediction.designation.to_string());
                matched += 1;
                break;
            }
        }
    }
    matched
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::profile::{build_frame_pair, GeneratorConfig};
    use blinkcore::designation::Designation;
    use blinkcore::detection::{CandidateLabel, FeatureVector};
    use blinkcore::frame::{RasterImage, SampleType};
    use blinkcore::wcs::SkyPosition;

    fn survey_config() -> WorkflowConfig {
        let mut config = WorkflowConfig::default();
        config.observatory.code = "N89".into();
        config.report.designation = Some("K25D50B".into());
        config
    }

    #[test]
    fn runner_executes_pipeline_on_synthetic_pair() {
        let runner = Runner::new(survey_config(), Vec::new());
        let pair = build_frame_pair(&GeneratorConfig::default()).unwrap();
        let outcome = runner.execute(&pair).unwrap();

        // The generator offsets the old frame by (2, -1).
        assert!((outcome.dx + 2.0).abs() < 0.3, "dx = {}", outcome.dx);
        assert!((outcome.dy - 1.0).abs() < 0.3, "dy = {}", outcome.dy);
        assert!(!outcome.low_confidence);

        // The planted transient is the strongest candidate, with a resolved
        // sky position.
        assert!(!outcome.candidates.is_empty());
        let top = &outcome.candidates[0];
        assert!((top.x - 128.4).abs() < 1.0, "x = {}", top.x);
        assert!((top.y - 96.7).abs() < 1.0, "y = {}", top.y);
        assert!(top.sky.is_some());
        assert_eq!(outcome.known_matches, 0);

        // One 80-column record under the configured suspect designation.
        let lines: Vec<&str> = outcome.report.lines().collect();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 80);
        assert!(lines[0].starts_with("     K25D50B"));
        assert!(lines[0].ends_with("N89"));

        let metrics = runner.metrics();
        assert_eq!(metrics.pairs_aligned, 1);
        assert_eq!(metrics.records_formatted, 1);
    }

    #[test]
    fn batch_preserves_order_and_isolates_failures() {
        let runner = Runner::new(survey_config(), Vec::new());
        let good = build_frame_pair(&GeneratorConfig::default()).unwrap();
        let mut bad = build_frame_pair(&GeneratorConfig::default()).unwrap();
        bad.old_frame =
            RasterImage::from_vec(16, 16, vec![0.0; 256], SampleType::F32).unwrap();
        bad.name = "mismatched".into();

        let results = runner.execute_batch(&[good, bad]);
        assert_eq!(results.len(), 2);
        assert!(results[0].is_ok());
        assert!(results[1].is_err());
        assert_eq!(runner.metrics().item_failures, 1);
    }

    #[test]
    fn known_objects_are_suppressed_within_the_match_radius() {
        let features = FeatureVector {
            flux: 1000.0,
            peak: 100.0,
            snr: 20.0,
            sharpness: 2.0,
            contrast: 80.0,
            elongation: 1.1,
            fwhm: 3.0,
            rise: 90.0,
            motion_score: 0.0,
        };
        let mut candidates = vec![
            Candidate {
                x: 10.0,
                y: 10.0,
                sky: Some(SkyPosition {
                    ra_deg: 150.0,
                    dec_deg: 2.2,
                }),
                features,
                label: CandidateLabel::Unknown,
                known_id: None,
            },
            Candidate {
                x: 50.0,
                y: 50.0,
                sky: None,
                features,
                label: CandidateLabel::Unknown,
                known_id: None,
            },
        ];
        let prediction = PredictedPosition {
            designation: Designation::MinorPlanet(1),
            sky: SkyPosition {
                // 5 arcseconds away in declination
                ra_deg: 150.0,
                dec_deg: 2.2 + 5.0 / 3600.0,
            },
            helio_distance_au: 2.8,
            geo_distance_au: 2.0,
            magnitude: 14.0,
        };

        let matched = suppress_known(&mut candidates, &[prediction.clone()], 15.0);
        assert_eq!(matched, 1);
        assert_eq!(candidates[0].known_id.as_deref(), Some("(1)"));
        assert!(candidates[1].known_id.is_none());

        // Outside the radius nothing matches.
        candidates[0].known_id = None;
        let matched = suppress_known(&mut candidates, &[prediction], 2.0);
        assert_eq!(matched, 0);
    }
}
