use anyhow::Context;
use blinkcore::detection::DetectionParams;
use blinkcore::prelude::{ObservatoryConfig, TelescopeConfig};
use blinkcore::registration::AlignParams;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Report settings for the suspect records a run emits.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Packed designation assigned to the reported suspect; no records are
    /// emitted while this is unset.
    pub designation: Option<String>,
    pub discovery: bool,
    pub method_code: char,
    pub band: char,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            designation: None,
            discovery: true,
            method_code: 'C',
            band: 'V',
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub telescope: TelescopeConfig,
    pub observatory: ObservatoryConfig,
    pub detection: DetectionParams,
    pub alignment: AlignParams,
    /// Catalog entries fainter than this absolute magnitude are dropped.
    pub limit_magnitude: f64,
    /// Candidates within this distance of a predicted known object are
    /// suppressed from the report.
    pub match_radius_arcsec: f64,
    /// Instrumental zero point for the flux-to-magnitude estimate.
    pub photometric_zero_point: f64,
    pub report: ReportSettings,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        let mut detection = DetectionParams::default();
        detection.top_k = Some(20);
        Self {
            telescope: TelescopeConfig::default(),
            observatory: ObservatoryConfig::default(),
            detection,
            alignment: AlignParams::default(),
            limit_magnitude: 20.0,
            match_radius_arcsec: 15.0,
            photometric_zero_point: 25.0,
            report: ReportSettings::default(),
        }
    }
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config_carries_the_survey_top_k() {
        let cfg = WorkflowConfig::default();
        assert_eq!(cfg.detection.top_k, Some(20));
        assert!(cfg.report.designation.is_none());
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"telescope:\n  pixel_size_um: 9.0\n  focal_length_mm: 2000.0\n  camera_rotation_deg: 0.0\nlimit_magnitude: 19.5\nreport:\n  designation: K25D50B\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert!((cfg.telescope.pixel_scale_arcsec() - 0.9281925).abs() < 1e-6);
        assert!((cfg.limit_magnitude - 19.5).abs() < 1e-12);
        assert_eq!(cfg.report.designation.as_deref(), Some("K25D50B"));
        // Unlisted sections keep their defaults.
        assert!((cfg.match_radius_arcsec - 15.0).abs() < 1e-12);
    }
}
