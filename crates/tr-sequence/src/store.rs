// Rendus nommés : stored/<nom>/{ascii.txt, audio.mp3?, meta.json?}.
//
// save : préparation dans un dossier caché `.staging-*` du store, puis
// renommage. En écrasement, l'ancien dossier est supprimé juste avant le
// renommage. load : même préparation, dans l'emplacement actif, puis un
// renommage par artefact ; une copie ratée ne touche pas aux fichiers actifs.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tr_core::error::CoreError;

use crate::artifacts::{ArtifactSet, atomic_copy, remove_file_if_exists};

/// Errors originating from the sequence store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Empty name, separator, traversal, leading dot or NUL.
    #[error("Nom de rendu invalide : '{0}'")]
    InvalidName(String),

    /// A render with this name already exists and overwrite was not allowed.
    #[error("Le rendu '{0}' existe déjà")]
    NameCollision(String),

    /// No stored render (or no sequence artifact) under this name.
    #[error("Rendu introuvable : '{0}'")]
    NotFound(String),

    /// The source location has no sequence artifact.
    #[error("Aucune séquence à sauvegarder : {} absent", .0.display())]
    MissingRequiredArtifact(PathBuf),

    /// Unexpected filesystem failure.
    #[error(transparent)]
    Io(#[from] CoreError),
}

impl StoreError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io(CoreError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Préfixe des dossiers de préparation, ignorés par [`SequenceStore::list`].
const STAGING_PREFIX: &str = ".staging-";

/// Named renders under one root directory.
///
/// # Example
/// ```no_run
/// use tr_sequence::artifacts::ArtifactSet;
/// use tr_sequence::store::SequenceStore;
/// let store = SequenceStore::new("stored");
/// let active = ArtifactSet::new("assets");
/// store.save("bad-apple", &active, false).unwrap();
/// store.load("bad-apple", &active).unwrap();
/// ```
#[derive(Clone, Debug)]
pub struct SequenceStore {
    root: PathBuf,
}

impl SequenceStore {
    /// Store rooted at `root` (created lazily on save).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Check that `name` is a single plain path segment.
    ///
    /// # Errors
    /// [`StoreError::InvalidName`] for empty names, separators, `.`/`..`,
    /// a leading dot, or NUL.
    pub fn validate_name(name: &str) -> Result<(), StoreError> {
        let invalid = || StoreError::InvalidName(name.to_string());
        if name.is_empty() || name.starts_with('.') || name.contains('\0') {
            return Err(invalid());
        }
        if name.contains('/') || name.contains('\\') {
            return Err(invalid());
        }
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Ok(()),
            _ => Err(invalid()),
        }
    }

    /// Artifact set of the render `name`.
    ///
    /// # Errors
    /// [`StoreError::InvalidName`] if `name` is not valid.
    pub fn render(&self, name: &str) -> Result<ArtifactSet, StoreError> {
        Self::validate_name(name)?;
        Ok(ArtifactSet::new(self.root.join(name)))
    }

    /// Sauvegarde les artefacts de `source` sous `name`.
    ///
    /// # Errors
    /// - [`StoreError::InvalidName`] / [`StoreError::NameCollision`] /
    ///   [`StoreError::MissingRequiredArtifact`] with nothing modified.
    /// - [`StoreError::Io`] on filesystem failure (staging directory removed).
    pub fn save(
        &self,
        name: &str,
        source: &ArtifactSet,
        overwrite: bool,
    ) -> Result<(), StoreError> {
        let target = self.render(name)?;
        if !source.has_sequence() {
            return Err(StoreError::MissingRequiredArtifact(source.sequence_path()));
        }
        if target.dir().exists() && !overwrite {
            return Err(StoreError::NameCollision(name.to_string()));
        }

        fs::create_dir_all(&self.root).map_err(|e| StoreError::io(&self.root, e))?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.root)
            .map_err(|e| StoreError::io(&self.root, e))?;
        let staged = ArtifactSet::new(staging.path());

        atomic_copy(&source.sequence_path(), &staged.sequence_path())?;
        copy_optional(&source.audio_path(), &staged.audio_path())?;
        copy_optional(&source.meta_path(), &staged.meta_path())?;

        if target.dir().exists() {
            log::info!("Écrasement du rendu '{name}'");
            fs::remove_dir_all(target.dir()).map_err(|e| StoreError::io(target.dir(), e))?;
        }
        let staged_dir = staging.keep();
        if let Err(e) = fs::rename(&staged_dir, target.dir()) {
            let _ = fs::remove_dir_all(&staged_dir);
            return Err(StoreError::io(target.dir(), e));
        }

        log::info!("Rendu sauvegardé dans {}", target.dir().display());
        Ok(())
    }

    /// Copie le rendu `name` vers `dest`, en écrasant l'existant.
    ///
    /// Les artefacts optionnels absents du rendu sont retirés de `dest`.
    ///
    /// # Errors
    /// - [`StoreError::InvalidName`] / [`StoreError::NotFound`] with `dest`
    ///   untouched.
    /// - [`StoreError::Io`] on filesystem failure. A failed copy leaves `dest`
    ///   untouched; only the final renames modify it.
    pub fn load(&self, name: &str, dest: &ArtifactSet) -> Result<(), StoreError> {
        let stored = self.render(name)?;
        if !stored.has_sequence() {
            return Err(StoreError::NotFound(name.to_string()));
        }

        dest.ensure_dir()?;
        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(dest.dir())
            .map_err(|e| StoreError::io(dest.dir(), e))?;
        let staged = ArtifactSet::new(staging.path());

        atomic_copy(&stored.sequence_path(), &staged.sequence_path())?;
        copy_optional(&stored.audio_path(), &staged.audio_path())?;
        copy_optional(&stored.meta_path(), &staged.meta_path())?;

        // Séquence en dernier : elle rend le jeu actif visible.
        promote(&staged.audio_path(), &dest.audio_path())?;
        promote(&staged.meta_path(), &dest.meta_path())?;
        promote(&staged.sequence_path(), &dest.sequence_path())?;

        log::info!("Rendu '{name}' chargé depuis {}", stored.dir().display());
        Ok(())
    }

    /// Sorted names of stored renders.
    ///
    /// # Errors
    /// [`StoreError::Io`] if the root cannot be read. A missing root is an
    /// empty store.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("Store absent : {}", self.root.display());
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::io(&self.root, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&self.root, e))?;
            if !entry.path().is_dir() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if Self::validate_name(&name).is_ok() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }

    /// Supprime le rendu `name`.
    ///
    /// # Errors
    /// - [`StoreError::InvalidName`] / [`StoreError::NotFound`].
    /// - [`StoreError::Io`] on removal failure.
    pub fn delete(&self, name: &str) -> Result<(), StoreError> {
        let stored = self.render(name)?;
        match fs::remove_dir_all(stored.dir()) {
            Ok(()) => {
                log::info!("Rendu '{name}' supprimé");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(name.to_string()))
            }
            Err(e) => Err(StoreError::io(stored.dir(), e)),
        }
    }
}

fn copy_optional(src: &Path, dst: &Path) -> Result<(), CoreError> {
    match atomic_copy(src, dst) {
        Ok(()) => Ok(()),
        Err(CoreError::ArtifactMissing { .. }) => {
            log::debug!("Artefact optionnel absent : {}", src.display());
            Ok(())
        }
        Err(e) => Err(e),
    }
}

/// Renomme `staged` sur `dst` ; sans fichier préparé, `dst` est retiré.
fn promote(staged: &Path, dst: &Path) -> Result<(), CoreError> {
    if staged.is_file() {
        return fs::rename(staged, dst).map_err(|source| CoreError::Io {
            path: dst.to_path_buf(),
            source,
        });
    }
    if remove_file_if_exists(dst)? {
        log::debug!("Artefact actif retiré (absent du rendu) : {}", dst.display());
    }
    Ok(())
}
