/// Lecture terminal des séquences de glyphes : synchroniseur frames/audio,
/// sink crossterm, jeton d'annulation.

pub mod cancel;
pub mod fps;
pub mod sink;
pub mod sync;

pub use cancel::CancelToken;
pub use sink::TerminalSink;
pub use sync::{AudioOutcome, PlaybackReport, PlaybackSynchronizer};
