use tr_core::config::RenderConfig;
use tr_core::error::CoreError;
use tr_core::frame::{GlyphFrame, RasterFrame, TerminalSize};
use tr_core::palette::SOLID_BLOCK;

use crate::escape::{MAX_ESCAPE_LEN, push_foreground};
use crate::shading::{brightness, bucket_index};

/// Convertit un raster RGB en frame de glyphes stylée.
///
/// Fonction pure : même raster + même config → même chaîne.
///
/// # Example
/// ```
/// use tr_core::config::RenderConfig;
/// use tr_core::frame::{RasterFrame, TerminalSize};
/// use tr_glyph::mapper::GlyphMapper;
///
/// let config = RenderConfig { color_enabled: false, ..RenderConfig::default() };
/// let mapper = GlyphMapper::new(config, TerminalSize::new(3, 3).unwrap());
/// let frame = mapper.map(&RasterFrame::filled(3, 2, [255, 255, 255])).unwrap();
/// assert_eq!(frame.as_str(), "######");
/// ```
#[derive(Clone, Debug)]
pub struct GlyphMapper {
    config: RenderConfig,
    size: TerminalSize,
}

impl GlyphMapper {
    /// Create a mapper for rasters sized to `size`.
    #[must_use]
    pub fn new(config: RenderConfig, size: TerminalSize) -> Self {
        Self { config, size }
    }

    /// Active render configuration.
    #[must_use]
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Terminal size rasters must match.
    #[must_use]
    pub fn terminal_size(&self) -> TerminalSize {
        self.size
    }

    /// Map one raster to one glyph frame, cells in row-major order.
    ///
    /// # Errors
    /// - [`CoreError::InvalidDimensions`] if the raster is not
    ///   `columns × (rows - 1)`.
    /// - [`CoreError::Invariant`] if a brightness bucket falls outside the
    ///   palette.
    pub fn map(&self, raster: &RasterFrame) -> Result<GlyphFrame, CoreError> {
        let (width, height) = self.size.raster_dimensions();
        if raster.width() != width || raster.height() != height {
            return Err(CoreError::InvalidDimensions {
                expected_width: width,
                expected_height: height,
                width: raster.width(),
                height: raster.height(),
            });
        }

        let cells = self.size.cell_count();
        let per_cell = if self.config.color_enabled {
            MAX_ESCAPE_LEN + 4
        } else {
            4
        };
        let mut out = String::with_capacity(cells * per_cell);
        let mut last_color: Option<[u8; 3]> = None;

        for rgb in raster.pixels() {
            let [r, g, b] = rgb;
            let glyph = self.glyph_for(r, g, b)?;

            if self.config.color_enabled {
                let repeat = self.config.merge_color_runs && last_color == Some(rgb);
                if !repeat {
                    push_foreground(&mut out, r, g, b);
                    last_color = Some(rgb);
                }
            }
            out.push(glyph);
        }

        Ok(GlyphFrame::new(out))
    }

    #[inline]
    fn glyph_for(&self, r: u8, g: u8, b: u8) -> Result<char, CoreError> {
        if !self.config.shading_enabled {
            return Ok(SOLID_BLOCK);
        }
        let bucket = bucket_index(brightness(r, g, b))?;
        self.config.palette.glyph(bucket).ok_or_else(|| {
            CoreError::Invariant(format!("niveau {bucket} absent de la palette"))
        })
    }
}
