use std::path::Path;

use anyhow::{Context, Result};
use tr_core::frame::{RasterFrame, TerminalSize};

use crate::resize::Resizer;

/// Charge une image et la ramène à la grille du terminal.
///
/// # Errors
/// Returns an error if the image cannot be decoded or resized.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use tr_core::frame::TerminalSize;
/// use tr_source::image::load_raster;
/// use tr_source::resize::Resizer;
/// let mut resizer = Resizer::new();
/// let size = TerminalSize::new(80, 24).unwrap();
/// let raster = load_raster(Path::new("frames/frame_000001.png"), size, &mut resizer).unwrap();
/// ```
pub fn load_raster(path: &Path, size: TerminalSize, resizer: &mut Resizer) -> Result<RasterFrame> {
    let img = image::open(path)
        .with_context(|| format!("Impossible de charger {}", path.display()))?;
    let rgb = img.to_rgb8();
    let (src_w, src_h) = rgb.dimensions();
    let (dst_w, dst_h) = size.raster_dimensions();
    resizer
        .resize_rgb(rgb.as_raw(), src_w, src_h, dst_w, dst_h)
        .with_context(|| format!("Redimensionnement impossible pour {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_and_resizes_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame_000001.png");
        image::RgbImage::from_pixel(40, 20, image::Rgb([0, 0, 0]))
            .save(&path)
            .unwrap();

        let mut resizer = Resizer::new();
        let size = TerminalSize::new(10, 6).unwrap();
        let raster = load_raster(&path, size, &mut resizer).unwrap();
        assert_eq!((raster.width(), raster.height()), (10, 5));
        assert!(raster.pixels().all(|px| px == [0, 0, 0]));
    }

    #[test]
    fn missing_file_is_an_error() {
        let mut resizer = Resizer::new();
        let size = TerminalSize::new(10, 6).unwrap();
        assert!(load_raster(Path::new("/nonexistent/frame.png"), size, &mut resizer).is_err());
    }
}
