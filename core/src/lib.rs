//! Image-differencing, astrometry, and reporting core for the Rust
//! blink-survey platform.
//!
//! The modules mirror the classic blink-comparison pipeline while keeping
//! every operation a pure function over immutable frames: registration,
//! differential candidate detection, pixel/sky transforms, known-object
//! ephemeris prediction, and the fixed-column observation record codec.

pub mod designation;
pub mod detection;
pub mod ephemeris;
pub mod frame;
pub mod math;
pub mod prelude;
pub mod registration;
pub mod report;
pub mod telemetry;
pub mod wcs;

pub use prelude::{CoreError, CoreResult, ObservatoryConfig, TelescopeConfig};
