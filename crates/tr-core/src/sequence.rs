use serde::{Deserialize, Serialize};

use crate::config::RenderConfig;
use crate::error::CoreError;
use crate::frame::{GlyphFrame, TerminalSize};
use crate::palette::ShadingPalette;

/// Shading used when the sequence was rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShadingDescriptor {
    /// Five-level brightness palette.
    Palette(ShadingPalette),
    /// Un seul bloc plein, pas d'ombrage.
    SingleBlock,
}

impl ShadingDescriptor {
    /// Descripteur correspondant à une configuration de rendu.
    #[must_use]
    pub fn from_config(config: &RenderConfig) -> Self {
        if config.shading_enabled {
            Self::Palette(config.palette)
        } else {
            Self::SingleBlock
        }
    }
}

/// Métadonnées de lecture d'une séquence.
///
/// # Example
/// ```
/// use tr_core::frame::TerminalSize;
/// use tr_core::sequence::{SequenceMeta, ShadingDescriptor};
/// let meta = SequenceMeta {
///     framerate: 30,
///     terminal_size: TerminalSize::new(80, 24).unwrap(),
///     color_enabled: false,
///     shading: ShadingDescriptor::SingleBlock,
/// };
/// assert!(meta.validate().is_ok());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceMeta {
    /// Frames per second, strictly positive.
    pub framerate: u32,
    /// Terminal size the frames were rendered for.
    pub terminal_size: TerminalSize,
    /// Whether frames carry 24-bit color escapes.
    pub color_enabled: bool,
    /// Palette or single-block marker.
    pub shading: ShadingDescriptor,
}

impl SequenceMeta {
    /// Check framerate and terminal size.
    ///
    /// # Errors
    /// [`CoreError::Config`] on a zero framerate or degenerate size.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.framerate == 0 {
            return Err(CoreError::Config("framerate nul dans les métadonnées".into()));
        }
        self.terminal_size.validate()
    }
}

/// Frames ordonnées (ordre d'insertion = ordre de lecture) et leurs métadonnées.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sequence {
    /// Glyph frames in playback order.
    pub frames: Vec<GlyphFrame>,
    /// Playback metadata.
    pub meta: SequenceMeta,
}

impl Sequence {
    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// `true` when the sequence holds no frame.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Nominal duration at the recorded framerate.
    #[must_use]
    pub fn nominal_duration(&self) -> std::time::Duration {
        let fps = f64::from(self.meta.framerate.max(1));
        std::time::Duration::from_secs_f64(self.len() as f64 / fps)
    }
}
