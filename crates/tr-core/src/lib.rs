/// Configuration, types, and shared structures for termreel.
///
/// This crate contains all shared types, traits, errors and configuration
/// logic used across the termreel workspace.

pub mod clock;
pub mod config;
pub mod error;
pub mod frame;
pub mod palette;
pub mod sequence;
pub mod traits;

pub use config::{AppConfig, PlaybackConfig, RenderConfig};
pub use error::CoreError;
pub use frame::{GlyphFrame, RasterFrame, TerminalSize};
pub use palette::ShadingPalette;
pub use sequence::{Sequence, SequenceMeta, ShadingDescriptor};
