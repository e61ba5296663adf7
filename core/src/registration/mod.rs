pub mod align;

pub use align::{align, batch_align, AlignParams, AlignmentResult};
