use crate::designation::unpack;
use crate::ephemeris::elements::OrbitalElements;
use crate::ephemeris::time::julian_day;
use crate::prelude::{CoreError, CoreResult};
use crate::telemetry::LogManager;

/// Result of a catalog load: parsed elements plus the per-line failures.
/// A malformed record is skipped and reported, never fatal to the load.
#[derive(Debug)]
pub struct CatalogLoad {
    pub elements: Vec<OrbitalElements>,
    pub skipped: Vec<CoreError>,
}

/// Column layout of an orbital-element record (0-based, end-exclusive).
const COL_DESIGNATION: (usize, usize) = (0, 7);
const COL_H: (usize, usize) = (8, 13);
const COL_G: (usize, usize) = (14, 19);
const COL_EPOCH: (usize, usize) = (20, 25);
const COL_MEAN_ANOMALY: (usize, usize) = (26, 35);
const COL_ARG_PERIHELION: (usize, usize) = (37, 46);
const COL_ASCENDING_NODE: (usize, usize) = (48, 57);
const COL_INCLINATION: (usize, usize) = (59, 68);
const COL_ECCENTRICITY: (usize, usize) = (70, 79);
const COL_SEMI_MAJOR: (usize, usize) = (92, 103);
const RECORD_MIN_LEN: usize = COL_SEMI_MAJOR.1;

/// Load a line-oriented orbital-element catalog in the MPCORB column layout.
///
/// A preamble is tolerated: records start after the first `----` rule when
/// one is present. Each malformed record is reported in `skipped` with its
/// 1-based line number while the rest of the load proceeds.
pub fn load_catalog(text: &str) -> CatalogLoad {
    let logger = LogManager::new();
    let mut elements = Vec::new();
    let mut skipped = Vec::new();

    let lines: Vec<&str> = text.lines().collect();
    let first_record = lines
        .iter()
        .position(|line| line.starts_with("----"))
        .map(|i| i + 1)
        .unwrap_or(0);

    for (index, line) in lines.iter().enumerate().skip(first_record) {
        if line.trim().is_empty() {
            continue;
        }
        match parse_record(line, index + 1) {
            Ok(entry) => elements.push(entry),
            Err(error) => {
                logger.warn(&format!("catalog: {error}"));
                skipped.push(error);
            }
        }
    }
    CatalogLoad { elements, skipped }
}

fn parse_record(line: &str, line_no: usize) -> CoreResult<OrbitalElements> {
    if !line.is_ascii() {
        return Err(CoreError::MalformedElementLine {
            line: line_no,
            reason: "record contains non-ASCII characters".into(),
        });
    }
    if line.len() < RECORD_MIN_LEN {
        return Err(CoreError::MalformedElementLine {
            line: line_no,
            reason: format!("record is {} columns, need {RECORD_MIN_LEN}", line.len()),
        });
    }

    let field = |(start, end): (usize, usize)| line[start..end].trim();
    let number = |cols: (usize, usize), what: &str| -> CoreResult<f64> {
        field(cols)
            .parse()
            .map_err(|_| CoreError::MalformedElementLine {
                line: line_no,
                reason: format!("bad {what} field {:?}", field(cols)),
            })
    };

    let designation =
        unpack(field(COL_DESIGNATION)).map_err(|e| CoreError::MalformedElementLine {
            line: line_no,
            reason: e.to_string(),
        })?;
    let abs_magnitude = number(COL_H, "absolute magnitude")?;
    let slope_param = if field(COL_G).is_empty() {
        0.15
    } else {
        number(COL_G, "slope parameter")?
    };
    let epoch_jd =
        unpack_epoch(field(COL_EPOCH)).map_err(|reason| CoreError::MalformedElementLine {
            line: line_no,
            reason,
        })?;
    let mean_anomaly_deg = number(COL_MEAN_ANOMALY, "mean anomaly")?;
    let arg_perihelion_deg = number(COL_ARG_PERIHELION, "argument of perihelion")?;
    let ascending_node_deg = number(COL_ASCENDING_NODE, "ascending node")?;
    let inclination_deg = number(COL_INCLINATION, "inclination")?;
    let eccentricity = number(COL_ECCENTRICITY, "eccentricity")?;
    let semi_major_axis_au = number(COL_SEMI_MAJOR, "semi-major axis")?;

    if !(0.0..1.0).contains(&eccentricity) {
        return Err(CoreError::MalformedElementLine {
            line: line_no,
            reason: format!("eccentricity {eccentricity} is outside the elliptic range"),
        });
    }
    if semi_major_axis_au <= 0.0 {
        return Err(CoreError::MalformedElementLine {
            line: line_no,
            reason: format!("semi-major axis {semi_major_axis_au} is not positive"),
        });
    }

    Ok(OrbitalElements {
        designation,
        epoch_jd,
        semi_major_axis_au,
        eccentricity,
        inclination_deg,
        ascending_node_deg,
        arg_perihelion_deg,
        mean_anomaly_deg,
        abs_magnitude,
        slope_param,
    })
}

/// Decode a packed epoch (century letter, two-digit year, extended-digit
/// month and day) to a Julian date at 0h.
fn unpack_epoch(s: &str) -> Result<f64, String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() != 5 {
        return Err(format!("packed epoch {s:?} is not 5 characters"));
    }
    let century = match chars[0] {
        'I' => 1800,
        'J' => 1900,
        'K' => 2000,
        c => return Err(format!("bad epoch century letter {c:?}")),
    };
    let yy = match (chars[1].to_digit(10), chars[2].to_digit(10)) {
        (Some(a), Some(b)) => a * 10 + b,
        _ => return Err(format!("bad epoch year digits in {s:?}")),
    };
    let month = extended_digit(chars[3]).ok_or_else(|| format!("bad epoch month in {s:?}"))?;
    let day = extended_digit(chars[4]).ok_or_else(|| format!("bad epoch day in {s:?}"))?;
    if !(1..=12).contains(&month) {
        return Err(format!("epoch month {month} out of range in {s:?}"));
    }
    if !(1..=31).contains(&day) {
        return Err(format!("epoch day {day} out of range in {s:?}"));
    }
    Ok(julian_day(century + yy as i32, month, day as f64))
}

/// Extended digit: 1-9, then A=10 up to V=31.
fn extended_digit(c: char) -> Option<u32> {
    match c {
        '1'..='9' => c.to_digit(10),
        'A'..='V' => Some(c as u32 - 'A' as u32 + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::designation::Designation;

    fn put_right(buf: &mut [u8], (_start, end): (usize, usize), text: &str) {
        let from = end - text.len();
        buf[from..end].copy_from_slice(text.as_bytes());
    }

    fn put_left(buf: &mut [u8], (start, _end): (usize, usize), text: &str) {
        buf[start..start + text.len()].copy_from_slice(text.as_bytes());
    }

    fn ceres_line() -> String {
        let mut buf = vec![b' '; RECORD_MIN_LEN];
        put_left(&mut buf, COL_DESIGNATION, "00001");
        put_right(&mut buf, COL_H, "3.34");
        put_right(&mut buf, COL_G, "0.15");
        put_left(&mut buf, COL_EPOCH, "K25AP");
        put_right(&mut buf, COL_MEAN_ANOMALY, "188.70269");
        put_right(&mut buf, COL_ARG_PERIHELION, "73.27343");
        put_right(&mut buf, COL_ASCENDING_NODE, "80.25221");
        put_right(&mut buf, COL_INCLINATION, "10.58780");
        put_right(&mut buf, COL_ECCENTRICITY, "0.0794013");
        put_right(&mut buf, COL_SEMI_MAJOR, "2.7660512");
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn well_formed_record_parses() {
        let load = load_catalog(&ceres_line());
        assert!(load.skipped.is_empty());
        assert_eq!(load.elements.len(), 1);
        let e = &load.elements[0];
        assert_eq!(e.designation, Designation::MinorPlanet(1));
        assert!((e.abs_magnitude - 3.34).abs() < 1e-9);
        assert!((e.epoch_jd - 2_460_973.5).abs() < 1e-9);
        assert!((e.semi_major_axis_au - 2.7660512).abs() < 1e-9);
        assert!((e.eccentricity - 0.0794013).abs() < 1e-9);
    }

    #[test]
    fn preamble_is_skipped_after_the_rule() {
        let text = format!(
            "Orbital element file\ngenerated for testing\n{}\n{}",
            "-".repeat(40),
            ceres_line()
        );
        let load = load_catalog(&text);
        assert_eq!(load.elements.len(), 1);
        assert!(load.skipped.is_empty());
    }

    #[test]
    fn malformed_lines_are_skipped_and_reported() {
        let mut bad_ecc = ceres_line();
        bad_ecc.replace_range(COL_ECCENTRICITY.0..COL_ECCENTRICITY.1, "1.2000000");
        let text = format!("{}\nshort line\n{}\n{}", ceres_line(), bad_ecc, ceres_line());
        let load = load_catalog(&text);
        assert_eq!(load.elements.len(), 2);
        assert_eq!(load.skipped.len(), 2);
        assert!(matches!(
            load.skipped[0],
            CoreError::MalformedElementLine { line: 2, .. }
        ));
        assert!(matches!(
            load.skipped[1],
            CoreError::MalformedElementLine { line: 3, .. }
        ));
    }

    #[test]
    fn blank_slope_parameter_takes_the_default() {
        let mut line = ceres_line();
        line.replace_range(COL_G.0..COL_G.1, "     ");
        let load = load_catalog(&line);
        assert_eq!(load.elements.len(), 1);
        assert!((load.elements[0].slope_param - 0.15).abs() < 1e-12);
    }

    #[test]
    fn packed_epochs_decode() {
        assert!((unpack_epoch("K25AP").unwrap() - 2_460_973.5).abs() < 1e-9);
        // J9611 = 1996-01-01
        assert!((unpack_epoch("J9611").unwrap() - julian_day(1996, 1, 1.0)).abs() < 1e-9);
        assert!(unpack_epoch("K25D0").is_err());
        assert!(unpack_epoch("X25AP").is_err());
        assert!(unpack_epoch("K2").is_err());
    }

    #[test]
    fn provisional_designations_in_the_catalog_parse() {
        let mut line = ceres_line();
        line.replace_range(COL_DESIGNATION.0..COL_DESIGNATION.1, "K25D50B");
        let load = load_catalog(&line);
        assert_eq!(load.elements.len(), 1);
        assert_eq!(
            load.elements[0].designation.to_string(),
            "2025 DB50"
        );
    }
}
