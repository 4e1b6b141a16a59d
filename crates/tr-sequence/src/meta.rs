use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tr_core::error::CoreError;
use tr_core::sequence::SequenceMeta;

use crate::codec::atomic_write;

/// Write the metadata artifact (pretty JSON) atomically.
///
/// # Errors
/// [`CoreError::Io`] on write failure.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use tr_core::frame::TerminalSize;
/// use tr_core::sequence::{SequenceMeta, ShadingDescriptor};
/// use tr_sequence::meta::write_meta;
/// let meta = SequenceMeta {
///     framerate: 30,
///     terminal_size: TerminalSize::new(80, 24).unwrap(),
///     color_enabled: true,
///     shading: ShadingDescriptor::SingleBlock,
/// };
/// write_meta(Path::new("assets/meta.json"), &meta).unwrap();
/// ```
pub fn write_meta(path: &Path, meta: &SequenceMeta) -> Result<(), CoreError> {
    let json = serde_json::to_vec_pretty(meta)
        .map_err(|e| CoreError::Invariant(format!("sérialisation des métadonnées : {e}")))?;
    atomic_write(path, |w| {
        w.write_all(&json)?;
        w.write_all(b"\n")
    })
}

/// Read the metadata artifact.
///
/// Un fichier absent n'est pas une erreur : `Ok(None)`, l'appelant retombe
/// sur son framerate par défaut.
///
/// # Errors
/// - [`CoreError::InvalidArtifact`] if the file is malformed or invalid.
/// - [`CoreError::Io`] on any read failure other than absence.
pub fn read_meta(path: &Path) -> Result<Option<SequenceMeta>, CoreError> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::debug!("Pas de métadonnées : {}", path.display());
            return Ok(None);
        }
        Err(source) => {
            return Err(CoreError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let meta: SequenceMeta =
        serde_json::from_slice(&bytes).map_err(|e| CoreError::InvalidArtifact {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
    meta.validate().map_err(|e| CoreError::InvalidArtifact {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(Some(meta))
}
