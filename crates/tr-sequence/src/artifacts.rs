use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tr_core::error::CoreError;

use crate::codec::atomic_write;

/// Nom de l'artefact séquence.
pub const SEQUENCE_FILE: &str = "ascii.txt";
/// Nom de l'artefact audio.
pub const AUDIO_FILE: &str = "audio.mp3";
/// Nom de l'artefact métadonnées.
pub const META_FILE: &str = "meta.json";

/// Les trois artefacts d'un rendu dans un même dossier.
///
/// Sert à la fois pour l'emplacement actif (`assets/`) et pour chaque rendu
/// stocké (`stored/<nom>/`).
///
/// # Example
/// ```
/// use std::path::Path;
/// use tr_sequence::artifacts::ArtifactSet;
/// let active = ArtifactSet::new("assets");
/// assert_eq!(active.sequence_path(), Path::new("assets/ascii.txt"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtifactSet {
    dir: PathBuf,
}

impl ArtifactSet {
    /// Artifact set rooted at `dir` (not created).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the artifacts.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `ascii.txt`
    #[must_use]
    pub fn sequence_path(&self) -> PathBuf {
        self.dir.join(SEQUENCE_FILE)
    }

    /// `audio.mp3`
    #[must_use]
    pub fn audio_path(&self) -> PathBuf {
        self.dir.join(AUDIO_FILE)
    }

    /// `meta.json`
    #[must_use]
    pub fn meta_path(&self) -> PathBuf {
        self.dir.join(META_FILE)
    }

    /// Whether the sequence artifact exists.
    #[must_use]
    pub fn has_sequence(&self) -> bool {
        self.sequence_path().is_file()
    }

    /// Audio path if the artifact exists.
    #[must_use]
    pub fn existing_audio(&self) -> Option<PathBuf> {
        Some(self.audio_path()).filter(|p| p.is_file())
    }

    /// Create the directory if needed.
    ///
    /// # Errors
    /// [`CoreError::Io`] if the directory cannot be created.
    pub fn ensure_dir(&self) -> Result<(), CoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| CoreError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    /// Supprime les trois artefacts. Les absents sont ignorés.
    ///
    /// # Errors
    /// [`CoreError::Io`] on any removal failure other than absence.
    pub fn clear(&self) -> Result<(), CoreError> {
        for path in [self.sequence_path(), self.audio_path(), self.meta_path()] {
            remove_file_if_exists(&path)?;
        }
        Ok(())
    }
}

/// Remove a file; absence is not an error.
///
/// Returns `true` if a file was removed.
///
/// # Errors
/// [`CoreError::Io`] on any failure other than `NotFound`.
pub fn remove_file_if_exists(path: &Path) -> Result<bool, CoreError> {
    match fs::remove_file(path) {
        Ok(()) => {
            log::debug!("Supprimé : {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(CoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Remove a directory tree; absence is not an error.
///
/// # Errors
/// [`CoreError::Io`] on any failure other than `NotFound`.
pub fn remove_dir_if_exists(path: &Path) -> Result<bool, CoreError> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            log::debug!("Dossier supprimé : {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(source) => Err(CoreError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Copie `src` sur `dst` via un fichier temporaire renommé.
///
/// # Errors
/// - [`CoreError::ArtifactMissing`] if `src` does not exist.
/// - [`CoreError::Io`] on any other failure (`dst` left untouched).
pub fn atomic_copy(src: &Path, dst: &Path) -> Result<(), CoreError> {
    let mut input = fs::File::open(src).map_err(|e| CoreError::from_io(src, e))?;
    atomic_write(dst, |w| io::copy(&mut input, w).map(|_| ()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let set = ArtifactSet::new(dir.path());
        fs::write(set.sequence_path(), "x\n").unwrap();
        set.clear().unwrap();
        assert!(!set.has_sequence());
        // Deuxième passage : tout est déjà absent.
        set.clear().unwrap();
    }

    #[test]
    fn existing_audio_only_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let set = ArtifactSet::new(dir.path());
        assert_eq!(set.existing_audio(), None);
        fs::write(set.audio_path(), b"ID3").unwrap();
        assert_eq!(set.existing_audio(), Some(set.audio_path()));
    }

    #[test]
    fn atomic_copy_replaces_destination() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("src.bin");
        let dst = dir.path().join("out").join("dst.bin");
        fs::write(&src, [1u8, 2, 3]).unwrap();
        atomic_copy(&src, &dst).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), [1, 2, 3]);

        fs::write(&src, [9u8]).unwrap();
        atomic_copy(&src, &dst).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), [9]);
    }

    #[test]
    fn atomic_copy_of_missing_source() {
        let dir = tempfile::tempdir().unwrap();
        let dst = dir.path().join("dst.bin");
        fs::write(&dst, "keep").unwrap();
        let err = atomic_copy(&dir.path().join("absent"), &dst).unwrap_err();
        assert!(matches!(err, CoreError::ArtifactMissing { .. }));
        assert_eq!(fs::read_to_string(&dst).unwrap(), "keep");
    }

    #[test]
    fn remove_dir_reports_presence() {
        let dir = tempfile::tempdir().unwrap();
        let frames = dir.path().join("frames");
        fs::create_dir(&frames).unwrap();
        fs::write(frames.join("frame_000001.png"), b"").unwrap();
        assert!(remove_dir_if_exists(&frames).unwrap());
        assert!(!remove_dir_if_exists(&frames).unwrap());
    }
}
