pub mod escape;
/// Glyph conversion engine for termreel.
///
/// Converts RGB rasters into styled glyph-frame strings.
pub mod mapper;
pub mod shading;

pub use mapper::GlyphMapper;
