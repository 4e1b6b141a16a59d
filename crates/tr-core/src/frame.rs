use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Taille du terminal cible, en cellules.
///
/// La dernière ligne est réservée : le raster fait `columns × (rows - 1)`.
///
/// # Example
/// ```
/// use tr_core::frame::TerminalSize;
/// let size = TerminalSize::new(80, 24).unwrap();
/// assert_eq!(size.raster_dimensions(), (80, 23));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalSize {
    /// Colonnes.
    pub columns: u16,
    /// Lignes, ligne réservée comprise.
    pub rows: u16,
}

impl TerminalSize {
    /// Validate and build a terminal size.
    ///
    /// # Errors
    /// [`CoreError::Config`] if `columns` is 0 or `rows` is below 2.
    pub fn new(columns: u16, rows: u16) -> Result<Self, CoreError> {
        let size = Self { columns, rows };
        size.validate()?;
        Ok(size)
    }

    /// Vérifie qu'il reste au moins une ligne de rendu.
    ///
    /// # Errors
    /// [`CoreError::Config`] on a degenerate size.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.columns == 0 || self.rows < 2 {
            return Err(CoreError::Config(format!(
                "taille de terminal trop petite : {}×{}",
                self.columns, self.rows
            )));
        }
        Ok(())
    }

    /// `(width, height)` of the raster expected by the mapper.
    #[must_use]
    pub fn raster_dimensions(&self) -> (u16, u16) {
        (self.columns, self.rows.saturating_sub(1))
    }

    /// Number of glyph cells per frame.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let (w, h) = self.raster_dimensions();
        usize::from(w) * usize::from(h)
    }
}

/// Un raster RGB décodé, déjà redimensionné à la grille du terminal.
///
/// Pixels row-major, 3 bytes par pixel. Immuable une fois construit.
///
/// # Example
/// ```
/// use tr_core::frame::RasterFrame;
/// let raster = RasterFrame::filled(4, 2, [255, 255, 255]);
/// assert_eq!(raster.pixels().count(), 8);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterFrame {
    data: Vec<u8>,
    width: u16,
    height: u16,
}

impl RasterFrame {
    /// Wrap an interleaved RGB buffer.
    ///
    /// # Errors
    /// [`CoreError::Config`] if `data.len() != width * height * 3`.
    pub fn from_rgb(width: u16, height: u16, data: Vec<u8>) -> Result<Self, CoreError> {
        let expected = usize::from(width) * usize::from(height) * 3;
        if data.len() != expected {
            return Err(CoreError::Config(format!(
                "buffer RGB de {} bytes pour un raster {width}×{height} ({expected} attendus)",
                data.len()
            )));
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Raster uniforme, pratique pour les tests.
    #[must_use]
    pub fn filled(width: u16, height: u16, rgb: [u8; 3]) -> Self {
        let cells = usize::from(width) * usize::from(height);
        let mut data = Vec::with_capacity(cells * 3);
        for _ in 0..cells {
            data.extend_from_slice(&rgb);
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Width in cells.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Height in cells.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Pixels in row-major order as `[r, g, b]`.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.data.chunks_exact(3).map(|px| [px[0], px[1], px[2]])
    }
}

/// Une frame de glyphes prête à être écrite dans le terminal.
///
/// Jamais de saut de ligne à l'intérieur : le codec en ajoute un entre frames.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlyphFrame(String);

impl GlyphFrame {
    /// Wrap a rendered string.
    #[must_use]
    pub fn new(text: String) -> Self {
        Self(text)
    }

    /// Borrow the styled text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Unwrap into the owned string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<&str> for GlyphFrame {
    fn from(text: &str) -> Self {
        Self(text.to_owned())
    }
}

impl From<String> for GlyphFrame {
    fn from(text: String) -> Self {
        Self(text)
    }
}
