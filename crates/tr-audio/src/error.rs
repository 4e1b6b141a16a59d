use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors originating from the audio module.
#[derive(Error, Debug)]
pub enum AudioError {
    /// The external player could not be started.
    #[error("Impossible de lancer le lecteur audio '{program}' : {source}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Empty player command line.
    #[error("Commande du lecteur audio vide")]
    EmptyCommand,

    /// The requested backend is not compiled in.
    #[error("Backend audio indisponible : {0}")]
    BackendUnavailable(&'static str),

    /// Audio file cannot be opened.
    #[error("Impossible d'ouvrir {} : {source}", path.display())]
    Open {
        /// Audio file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// Container or codec probing failed.
    #[error("Format audio non supporté : {0}")]
    UnsupportedFormat(String),

    /// Audio decode error.
    #[error("Erreur de décodage : {0}")]
    DecodeError(String),

    /// No audio output device found.
    #[error("Aucun périphérique audio de sortie trouvé")]
    NoOutputDevice,

    /// Audio stream error.
    #[error("Erreur de stream audio : {0}")]
    StreamError(String),
}
