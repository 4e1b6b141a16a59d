use std::io;
use std::path::Path;
use std::time::Duration;

use crate::frame::GlyphFrame;

/// Destination des frames pendant la lecture.
///
/// Implémenté par : `TerminalSink` (tr-player) et les sinks de test.
///
/// # Example
/// ```
/// use std::io;
/// use tr_core::frame::GlyphFrame;
/// use tr_core::traits::FrameSink;
///
/// struct NullSink;
/// impl FrameSink for NullSink {
///     fn clear(&mut self) -> io::Result<()> { Ok(()) }
///     fn show(&mut self, _frame: &GlyphFrame) -> io::Result<()> { Ok(()) }
///     fn finish(&mut self) -> io::Result<()> { Ok(()) }
/// }
/// ```
pub trait FrameSink {
    /// Efface la zone d'affichage avant la première frame.
    ///
    /// # Errors
    /// Any write error from the underlying display.
    fn clear(&mut self) -> io::Result<()>;

    /// Affiche une frame complète.
    ///
    /// # Errors
    /// Any write error; the synchronizer aborts playback on the first one.
    fn show(&mut self, frame: &GlyphFrame) -> io::Result<()>;

    /// Restaure l'état du terminal après la lecture.
    ///
    /// # Errors
    /// Any write error from the underlying display.
    fn finish(&mut self) -> io::Result<()>;
}

/// Activité audio en cours, possédée par le synchroniseur.
pub trait AudioHandle {
    /// `true` tant que l'audio joue encore.
    fn is_alive(&mut self) -> bool;

    /// Arrête l'audio. Sans effet si déjà terminé.
    ///
    /// # Errors
    /// Returns an error if the activity could not be stopped.
    fn terminate(&mut self) -> anyhow::Result<()>;
}

/// Lance une activité audio indépendante (subprocess ou thread dédié).
///
/// # Example
/// ```
/// use std::path::Path;
/// use tr_core::traits::{AudioHandle, AudioLauncher};
///
/// struct Silent;
/// impl AudioHandle for Silent {
///     fn is_alive(&mut self) -> bool { false }
///     fn terminate(&mut self) -> anyhow::Result<()> { Ok(()) }
/// }
///
/// struct SilentLauncher;
/// impl AudioLauncher for SilentLauncher {
///     type Handle = Silent;
///     fn launch(&self, _path: &Path) -> anyhow::Result<Silent> { Ok(Silent) }
/// }
/// ```
pub trait AudioLauncher {
    /// Handle type owned for the lifetime of the playback.
    type Handle: AudioHandle;

    /// Démarre la lecture de `path` sans attendre sa fin.
    ///
    /// # Errors
    /// Returns an error if the activity cannot be started.
    fn launch(&self, path: &Path) -> anyhow::Result<Self::Handle>;

    /// Durée du fichier audio si elle est connue à bas coût.
    fn probe_duration(&self, _path: &Path) -> Option<Duration> {
        None
    }
}
