use anyhow::{Context, Result};
use fast_image_resize::images::Image;
use fast_image_resize::{PixelType, ResizeOptions, Resizer as FirResizer};
use tr_core::frame::RasterFrame;

/// Resizer réutilisable wrappant fast_image_resize, pixels RGB 3 bytes.
///
/// Un resizer par worker rayon : l'état interne n'est pas partagé.
///
/// # Example
/// ```
/// use tr_source::resize::Resizer;
/// let mut r = Resizer::new();
/// let raster = r.resize_rgb(&vec![0u8; 100 * 50 * 3], 100, 50, 20, 10).unwrap();
/// assert_eq!((raster.width(), raster.height()), (20, 10));
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
    /// Scratch copy of the source (the API wants `&mut` on the source slice).
    src_buf: Vec<u8>,
}

impl Resizer {
    /// Create a new resizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new(),
            src_buf: Vec::new(),
        }
    }

    /// Resize an interleaved RGB buffer of `src_w × src_h` to `dst_w × dst_h`.
    ///
    /// # Errors
    /// Returns an error if the buffer does not match the source dimensions or
    /// if the resize operation fails.
    pub fn resize_rgb(
        &mut self,
        src: &[u8],
        src_w: u32,
        src_h: u32,
        dst_w: u16,
        dst_h: u16,
    ) -> Result<RasterFrame> {
        if src_w == u32::from(dst_w) && src_h == u32::from(dst_h) {
            return Ok(RasterFrame::from_rgb(dst_w, dst_h, src.to_vec())?);
        }

        self.src_buf.clear();
        self.src_buf.extend_from_slice(src);

        let src_image = Image::from_slice_u8(src_w, src_h, &mut self.src_buf, PixelType::U8x3)
            .context("Invalid source dimensions")?;

        let mut dst_data = vec![0u8; usize::from(dst_w) * usize::from(dst_h) * 3];
        let mut dst_image = Image::from_slice_u8(
            u32::from(dst_w),
            u32::from(dst_h),
            &mut dst_data,
            PixelType::U8x3,
        )
        .context("Invalid destination dimensions")?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .context("Resize failed")?;

        Ok(RasterFrame::from_rgb(dst_w, dst_h, dst_data)?)
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_size_is_a_copy() {
        let mut r = Resizer::new();
        let src: Vec<u8> = (0..12).collect();
        let raster = r.resize_rgb(&src, 2, 2, 2, 2).unwrap();
        assert_eq!(raster.pixels().next(), Some([0, 1, 2]));
    }

    #[test]
    fn uniform_color_survives_downscale() {
        let mut r = Resizer::new();
        let src: Vec<u8> = [255u8, 255, 255].repeat(64 * 32);
        let raster = r.resize_rgb(&src, 64, 32, 8, 4).unwrap();
        assert!(raster.pixels().all(|px| px.iter().all(|&c| c >= 250)));
    }

    #[test]
    fn rejects_short_source_buffer() {
        let mut r = Resizer::new();
        assert!(r.resize_rgb(&[0u8; 5], 4, 4, 2, 2).is_err());
    }
}
