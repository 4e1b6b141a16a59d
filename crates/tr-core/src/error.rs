use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Raster dimensions do not match the configured terminal grid.
    #[error("Dimensions invalides : attendu {expected_width}×{expected_height}, reçu {width}×{height}")]
    InvalidDimensions {
        /// Expected width in cells.
        expected_width: u16,
        /// Expected height in cells.
        expected_height: u16,
        /// Actual width.
        width: u16,
        /// Actual height.
        height: u16,
    },

    /// A required artifact does not exist.
    #[error("Artefact introuvable : {}", path.display())]
    ArtifactMissing {
        /// Path that was not found.
        path: PathBuf,
    },

    /// The artifact exists but cannot be decoded.
    #[error("Artefact illisible {} : {reason}", path.display())]
    InvalidArtifact {
        /// Offending file.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// Unexpected I/O failure (distinct from expected absence).
    #[error("Erreur d'E/S sur {} : {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A value escaped its mathematically guaranteed range.
    #[error("Invariant interne violé : {0}")]
    Invariant(String),

    /// Writing a frame to the display failed; playback is aborted.
    #[error("Échec d'affichage à la frame {frame} : {source}")]
    Playback {
        /// Index of the frame being written.
        frame: usize,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
}

impl CoreError {
    /// Classify an I/O error on `path`: `NotFound` becomes [`CoreError::ArtifactMissing`],
    /// everything else stays an I/O failure.
    #[must_use]
    pub fn from_io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            Self::ArtifactMissing { path }
        } else {
            Self::Io { path, source }
        }
    }
}
