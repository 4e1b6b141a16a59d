use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Extensions image reconnues.
const IMAGE_EXTS: &[&str] = &["png", "jpg", "jpeg", "bmp"];

/// Liste les frames d'un dossier, triées lexicographiquement.
///
/// Le nommage `frame_%06d.png` de ffmpeg garantit que l'ordre
/// lexicographique est l'ordre temporel. Non récursif.
///
/// # Errors
/// Returns an error if the directory cannot be read.
pub fn list_frames(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in
        fs::read_dir(dir).with_context(|| format!("Impossible de lire {}", dir.display()))?
    {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_image = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| IMAGE_EXTS.contains(&ext.to_lowercase().as_str()));
        if is_image {
            files.push(path);
        }
    }
    files.sort();
    log::debug!("{} frames trouvées dans {}", files.len(), dir.display());
    Ok(files)
}
