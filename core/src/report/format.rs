use chrono::{Datelike, Timelike};

use crate::designation::pack_record_columns;
use crate::prelude::{CoreError, CoreResult};
use crate::report::observation::{validate_method_code, Observation};

/// Precision selection for the numeric report fields. Both choices are
/// self-describing by field width; the default matches standard practice
/// (1e-5 day, column 32 blank), `extended` fills the date field to 1e-6 day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportStyle {
    pub date_decimals: usize,
    pub ra_decimals: usize,
    pub dec_decimals: usize,
}

impl Default for ReportStyle {
    fn default() -> Self {
        Self {
            date_decimals: 5,
            ra_decimals: 3,
            dec_decimals: 2,
        }
    }
}

impl ReportStyle {
    pub fn extended() -> Self {
        Self {
            date_decimals: 6,
            ..Default::default()
        }
    }
}

fn pad_to(mut s: String, width: usize, field: &'static str) -> CoreResult<String> {
    if s.len() > width {
        return Err(CoreError::FieldOverflow {
            field,
            width,
            value: s,
        });
    }
    while s.len() < width {
        s.push(' ');
    }
    Ok(s)
}

fn format_date_field(obs: &Observation, decimals: usize) -> CoreResult<String> {
    let t = &obs.epoch;
    let year = t.year();
    if !(0..=9999).contains(&year) || decimals > 6 {
        return Err(CoreError::FieldOverflow {
            field: "date",
            width: 17,
            value: format!("{t:?}"),
        });
    }
    let seconds = t.hour() as f64 * 3600.0
        + t.minute() as f64 * 60.0
        + t.second() as f64
        + t.nanosecond() as f64 * 1e-9;
    let day = t.day() as f64 + seconds / 86_400.0;
    let s = format!(
        "{year:04} {:02} {day:0w$.p$}",
        t.month(),
        w = 3 + decimals,
        p = decimals
    );
    pad_to(s, 17, "date")
}

/// Sexagesimal with integer-tick rounding so second values never print as
/// `60.0`; a carry past the top wraps (RA) or is capped by validation (Dec).
fn format_ra_field(ra_deg: f64, decimals: usize) -> CoreResult<String> {
    if decimals > 3 || !ra_deg.is_finite() {
        return Err(CoreError::FieldOverflow {
            field: "right ascension",
            width: 12,
            value: format!("{ra_deg}"),
        });
    }
    let scale = 10u64.pow(decimals as u32);
    let ticks_per_day = 24 * 3600 * scale;
    let ticks =
        ((ra_deg.rem_euclid(360.0) / 15.0) * 3600.0 * scale as f64).round() as u64 % ticks_per_day;
    let hours = ticks / (3600 * scale);
    let minutes = ticks % (3600 * scale) / (60 * scale);
    let seconds = (ticks % (60 * scale)) as f64 / scale as f64;
    let s = format!(
        "{hours:02} {minutes:02} {seconds:0w$.p$}",
        w = 3 + decimals,
        p = decimals
    );
    pad_to(s, 12, "right ascension")
}

fn format_dec_field(dec_deg: f64, decimals: usize) -> CoreResult<String> {
    if decimals > 2 || !dec_deg.is_finite() || dec_deg.abs() > 90.0 {
        return Err(CoreError::FieldOverflow {
            field: "declination",
            width: 12,
            value: format!("{dec_deg}"),
        });
    }
    let sign = if dec_deg < 0.0 { '-' } else { '+' };
    let scale = 10u64.pow(decimals as u32);
    let ticks = (dec_deg.abs() * 3600.0 * scale as f64).round() as u64;
    let degrees = ticks / (3600 * scale);
    let minutes = ticks % (3600 * scale) / (60 * scale);
    let seconds = (ticks % (60 * scale)) as f64 / scale as f64;
    let s = format!(
        "{sign}{degrees:02} {minutes:02} {seconds:0w$.p$}",
        w = 3 + decimals,
        p = decimals
    );
    pad_to(s, 12, "declination")
}

fn format_magnitude_field(obs: &Observation) -> CoreResult<String> {
    match obs.magnitude {
        None => Ok("      ".into()),
        Some(mag) => {
            let value = format!("{mag:5.2}");
            if value.len() != 5 || !mag.is_finite() {
                return Err(CoreError::FieldOverflow {
                    field: "magnitude",
                    width: 5,
                    value,
                });
            }
            if !(obs.band.is_ascii_alphanumeric() || obs.band == ' ') {
                return Err(CoreError::InvalidInput(format!(
                    "bad photometric band {:?}",
                    obs.band
                )));
            }
            Ok(format!("{value}{}", obs.band))
        }
    }
}

/// Serialize one observation into the fixed 80-column record.
///
/// Every field occupies its exact column range and unused columns are ASCII
/// spaces. Any value that cannot fit its columns fails with `FieldOverflow`
/// rather than being truncated.
pub fn format_record(obs: &Observation, style: &ReportStyle) -> CoreResult<String> {
    let designation = pack_record_columns(&obs.designation)?;
    validate_method_code(obs.note2, false)?;
    if !(obs.note1 == ' ' || obs.note1.is_ascii_graphic()) {
        return Err(CoreError::InvalidInput(format!(
            "bad note 1 code {:?}",
            obs.note1
        )));
    }
    if obs.site_code.len() != 3 || !obs.site_code.is_ascii() {
        return Err(CoreError::FieldOverflow {
            field: "observatory code",
            width: 3,
            value: obs.site_code.clone(),
        });
    }

    let discovery = if obs.discovery { '*' } else { ' ' };
    let date = format_date_field(obs, style.date_decimals)?;
    let ra = format_ra_field(obs.ra_deg, style.ra_decimals)?;
    let dec = format_dec_field(obs.dec_deg, style.dec_decimals)?;
    let magnitude = format_magnitude_field(obs)?;

    let record = format!(
        "{designation}{discovery}{}{}{date}{ra}{dec}{:9}{magnitude}{:6}{}",
        obs.note1, obs.note2, "", "", obs.site_code
    );
    debug_assert_eq!(record.len(), 80);
    Ok(record)
}

/// Format a batch of observations, newline-joined in designation-then-time
/// order (or caller order when `sorted` is false). Per-record failures are
/// collected alongside the successfully formatted lines.
pub fn format_report(
    observations: &[Observation],
    style: &ReportStyle,
    sorted: bool,
) -> (String, Vec<CoreError>) {
    let mut ordered: Vec<&Observation> = observations.iter().collect();
    if sorted {
        ordered.sort_by(|a, b| {
            let key_a = pack_record_columns(&a.designation).unwrap_or_else(|_| a.designation.to_string());
            let key_b = pack_record_columns(&b.designation).unwrap_or_else(|_| b.designation.to_string());
            key_a.cmp(&key_b).then(a.epoch.cmp(&b.epoch))
        });
    }

    let mut lines = Vec::new();
    let mut errors = Vec::new();
    for obs in ordered {
        match format_record(obs, style) {
            Ok(line) => lines.push(line),
            Err(error) => errors.push(error),
        }
    }
    (lines.join("\n"), errors)
}
