use crate::frame::header::ImageHeader;
use crate::frame::raster::RasterImage;

/// A new/old frame pairing of the same field, the unit one survey run
/// processes. Headers ride along read-only; processed outputs derive fresh
/// headers rather than rewriting these.
#[derive(Debug, Clone)]
pub struct FramePair {
    pub name: String,
    pub new_frame: RasterImage,
    pub new_header: ImageHeader,
    pub old_frame: RasterImage,
    pub old_header: ImageHeader,
}
