// Format de l'artefact séquence : une frame par ligne, chaque frame suivie
// de '\n', aucun en-tête. Les échappements couleur sont conservés tels quels.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tempfile::NamedTempFile;
use tr_core::error::CoreError;
use tr_core::frame::GlyphFrame;

/// Encode frames into artifact bytes.
///
/// # Errors
/// [`CoreError::Invariant`] if a frame contains a newline.
///
/// # Example
/// ```
/// use tr_core::frame::GlyphFrame;
/// use tr_sequence::codec::{decode, encode};
/// let frames = vec![GlyphFrame::from("##"), GlyphFrame::from("..")];
/// let bytes = encode(&frames).unwrap();
/// assert_eq!(bytes, b"##\n..\n");
/// assert_eq!(decode(&bytes).unwrap(), frames);
/// ```
pub fn encode(frames: &[GlyphFrame]) -> Result<Vec<u8>, CoreError> {
    let capacity = frames.iter().map(|f| f.as_str().len() + 1).sum();
    let mut out = Vec::with_capacity(capacity);
    // Seule erreur possible en mémoire : saut de ligne dans une frame.
    encode_into(&mut out, frames).map_err(|e| CoreError::Invariant(e.to_string()))?;
    Ok(out)
}

/// Decode artifact bytes into frames, in file order.
///
/// The empty tail after the final newline is not a frame; a missing final
/// newline is tolerated.
///
/// # Errors
/// [`CoreError::InvalidArtifact`] if the bytes are not UTF-8.
pub fn decode(bytes: &[u8]) -> Result<Vec<GlyphFrame>, CoreError> {
    decode_at(bytes, Path::new("<mémoire>"))
}

fn decode_at(bytes: &[u8], path: &Path) -> Result<Vec<GlyphFrame>, CoreError> {
    let text = std::str::from_utf8(bytes).map_err(|e| CoreError::InvalidArtifact {
        path: path.to_path_buf(),
        reason: format!("UTF-8 invalide : {e}"),
    })?;
    if text.is_empty() {
        return Ok(Vec::new());
    }
    let body = text.strip_suffix('\n').unwrap_or(text);
    Ok(body.split('\n').map(GlyphFrame::from).collect())
}

/// Écrit les frames dans `writer`, chacune suivie d'un saut de ligne.
fn encode_into<W: Write>(writer: &mut W, frames: &[GlyphFrame]) -> io::Result<()> {
    for (index, frame) in frames.iter().enumerate() {
        if frame.as_str().contains('\n') {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("la frame {index} contient un saut de ligne"),
            ));
        }
        writer.write_all(frame.as_str().as_bytes())?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Replace `path` atomically with what `write` produces.
///
/// Les octets vont dans un fichier temporaire du même dossier, vidé et
/// synchronisé, puis renommé sur la destination. Toute erreur avant le
/// renommage laisse l'ancien fichier intact et supprime le temporaire.
///
/// # Errors
/// [`CoreError::Io`] on any failure, including one returned by `write`.
pub fn atomic_write<F>(path: &Path, write: F) -> Result<(), CoreError>
where
    F: FnOnce(&mut BufWriter<&mut fs::File>) -> io::Result<()>,
{
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|source| CoreError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let io_err = |source: io::Error| CoreError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write(&mut writer).map_err(io_err)?;
        writer.flush().map_err(io_err)?;
    }
    tmp.as_file().sync_all().map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    log::debug!("Écriture atomique : {}", path.display());
    Ok(())
}

/// Write the sequence artifact at `path`, replacing any previous one.
///
/// # Errors
/// - [`CoreError::Invariant`] if a frame contains a newline (nothing written).
/// - [`CoreError::Io`] on write failure (previous artifact kept).
pub fn write_sequence(path: &Path, frames: &[GlyphFrame]) -> Result<(), CoreError> {
    if let Some(index) = frames.iter().position(|f| f.as_str().contains('\n')) {
        return Err(CoreError::Invariant(format!(
            "la frame {index} contient un saut de ligne"
        )));
    }
    atomic_write(path, |w| encode_into(w, frames))?;
    log::info!("{} frames écrites dans {}", frames.len(), path.display());
    Ok(())
}

/// Read the sequence artifact at `path`.
///
/// # Errors
/// - [`CoreError::ArtifactMissing`] if the file does not exist.
/// - [`CoreError::Io`] on any other read failure.
/// - [`CoreError::InvalidArtifact`] if the content is not UTF-8.
pub fn read_sequence(path: &Path) -> Result<Vec<GlyphFrame>, CoreError> {
    let bytes = fs::read(path).map_err(|e| CoreError::from_io(path, e))?;
    let frames = decode_at(&bytes, path)?;
    log::debug!("{} frames lues depuis {}", frames.len(), path.display());
    Ok(frames)
}
