/// Raster acquisition for termreel: frame listing, image loading, resize,
/// and the external download / extraction tools.

pub mod frames;
pub mod image;
pub mod resize;
pub mod video;
