pub mod format;
pub mod observation;

pub use format::{format_record, format_report, ReportStyle};
pub use observation::{
    validate_method_code, Observation, ARCHIVAL_METHOD_CODES, SUBMITTABLE_METHOD_CODES,
};
