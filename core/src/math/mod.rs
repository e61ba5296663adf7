pub mod fft;
pub mod matrix;
pub mod stats;

pub use fft::Fft2;
pub use matrix::MatrixHelper;
pub use stats::StatsHelper;
