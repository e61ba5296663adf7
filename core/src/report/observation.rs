use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::designation::Designation;
use crate::prelude::{CoreError, CoreResult};

/// Observation-method (note 2) codes accepted on newly encoded records.
pub const SUBMITTABLE_METHOD_CODES: &[char] = &['C', 'B', 'S', 'V', 'R', 'E', 'O', 'N', 'n'];

/// Method codes that appear in archives but must not be written on new
/// records. Accepted only when validating in archival mode.
pub const ARCHIVAL_METHOD_CODES: &[char] = &['P', 'e', 'c', 'T', 'M', 'H', 'X', 'x'];

/// Check a note-2 method code. `archival` additionally admits the legacy
/// codes that exist only for parsing old records.
pub fn validate_method_code(code: char, archival: bool) -> CoreResult<()> {
    if SUBMITTABLE_METHOD_CODES.contains(&code) {
        return Ok(());
    }
    if ARCHIVAL_METHOD_CODES.contains(&code) {
        if archival {
            return Ok(());
        }
        return Err(CoreError::InvalidInput(format!(
            "method code {code:?} is archival-only and must not be written on new records"
        )));
    }
    Err(CoreError::InvalidInput(format!(
        "unknown observation-method code {code:?}"
    )))
}

/// One astrometric observation, the unit the report formatter serializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub designation: Designation,
    /// Discovery asterisk for column 13.
    pub discovery: bool,
    /// Note 1: program code, or space.
    pub note1: char,
    /// Note 2: observation-method code.
    pub note2: char,
    pub epoch: DateTime<Utc>,
    pub ra_deg: f64,
    pub dec_deg: f64,
    pub magnitude: Option<f64>,
    /// Photometric band letter accompanying the magnitude.
    pub band: char,
    /// Three-character observatory code.
    pub site_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_codes_pass_both_modes() {
        for &code in SUBMITTABLE_METHOD_CODES {
            assert!(validate_method_code(code, false).is_ok());
            assert!(validate_method_code(code, true).is_ok());
        }
    }

    #[test]
    fn legacy_codes_only_pass_archival_mode() {
        for &code in ARCHIVAL_METHOD_CODES {
            assert!(validate_method_code(code, true).is_ok());
            assert!(validate_method_code(code, false).is_err());
        }
    }

    #[test]
    fn unknown_codes_fail_everywhere() {
        assert!(validate_method_code('?', false).is_err());
        assert!(validate_method_code('?', true).is_err());
    }
}
