pub mod components;
pub mod detect;
pub mod features;

pub use detect::{
    detect, detect_with_prior, resolve_sky, Candidate, CandidateLabel, DetectionParams,
};
pub use features::{compute_features, FeatureVector};
