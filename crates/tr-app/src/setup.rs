// Préparation d'un rendu : vidéo → audio.mp3 + frames/ → ascii.txt + meta.json.
// Les quatre étapes sont annoncées sur stdout, le détail passe par le log.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tr_core::config::AppConfig;
use tr_core::frame::TerminalSize;
use tr_sequence::ArtifactSet;
use tr_sequence::artifacts::{remove_dir_if_exists, remove_file_if_exists};
use tr_source::video::{download_video, extract_audio, extract_frames};

use crate::pipeline::render_to_artifacts;

/// Issue de [`prepare`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Prepared {
    /// Cached audio + sequence reused.
    Cached,
    /// Full setup ran; number of frames rendered.
    Rendered(usize),
}

/// Chemin de la vidéo source dans le dossier assets.
#[must_use]
pub fn video_path(config: &AppConfig) -> PathBuf {
    config.paths.assets.join(&config.source.video_name)
}

/// Whether `skip_setup` can reuse what is already in `active`.
#[must_use]
pub fn cache_is_complete(active: &ArtifactSet) -> bool {
    active.has_sequence() && active.audio_path().is_file()
}

/// Télécharge, extrait et convertit, sauf si le cache suffit.
///
/// # Errors
/// Returns an error if an external tool fails or the render cannot be
/// written.
pub fn prepare(config: &AppConfig, size: TerminalSize) -> Result<Prepared> {
    let active = ArtifactSet::new(&config.paths.assets);
    let quiet = config.render.quiet;

    if config.source.skip_setup {
        if cache_is_complete(&active) {
            println!("Setup ignoré : audio et séquence en cache réutilisés.");
            return Ok(Prepared::Cached);
        }
        println!("Audio et séquence requis pour ignorer le setup : setup lancé.");
    }

    active.ensure_dir()?;
    let video = video_path(config);

    if video.is_file() {
        println!("[1/4] Vidéo trouvée : {}", video.display());
    } else {
        println!("[1/4] Téléchargement de la vidéo...");
        download_video(&config.source.url, &video, quiet)?;
    }

    println!("[2/4] Extraction de l'audio...");
    remove_file_if_exists(&active.audio_path())?;
    extract_audio(&video, &active.audio_path(), quiet)?;

    println!("[3/4] Extraction des frames...");
    extract_frames(&video, &config.paths.frames, config.playback.framerate, quiet)?;

    println!("[4/4] Conversion des frames en glyphes ({}×{})...", size.columns, size.rows);
    let count = render_to_artifacts(
        &config.paths.frames,
        &active,
        &config.render,
        config.playback.framerate,
        size,
    )
    .context("Conversion des frames")?;
    log::info!("{count} frames rendues dans {}", active.sequence_path().display());

    if config.source.delete_frames {
        remove_dir_if_exists(&config.paths.frames)?;
        log::info!("Frames extraites supprimées : {}", config.paths.frames.display());
    }

    Ok(Prepared::Rendered(count))
}

/// Supprime vidéo, audio, séquence, métadonnées et frames extraites.
///
/// Seule l'absence est tolérée.
///
/// # Errors
/// Returns the first removal failure other than `NotFound`.
pub fn reset(config: &AppConfig) -> Result<()> {
    let active = ArtifactSet::new(&config.paths.assets);
    active.clear()?;
    remove_file_if_exists(&video_path(config))?;
    remove_dir_if_exists(&config.paths.frames)?;
    log::info!("Fichiers actifs et frames supprimés");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn config_in(root: &std::path::Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.paths.assets = root.join("assets");
        config.paths.frames = root.join("frames");
        config.paths.store = root.join("stored");
        config
    }

    #[test]
    fn skip_setup_reuses_complete_cache() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.source.skip_setup = true;
        let active = ArtifactSet::new(&config.paths.assets);
        active.ensure_dir().unwrap();
        fs::write(active.sequence_path(), "#\n").unwrap();
        fs::write(active.audio_path(), "mp3").unwrap();

        let size = TerminalSize::new(10, 5).unwrap();
        assert_eq!(prepare(&config, size).unwrap(), Prepared::Cached);
    }

    #[test]
    fn incomplete_cache_is_detected() {
        let dir = tempfile::tempdir().unwrap();
        let active = ArtifactSet::new(dir.path());
        fs::write(active.sequence_path(), "#\n").unwrap();
        assert!(!cache_is_complete(&active));
        fs::write(active.audio_path(), "mp3").unwrap();
        assert!(cache_is_complete(&active));
    }

    #[test]
    fn reset_removes_everything_and_tolerates_absence() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let active = ArtifactSet::new(&config.paths.assets);
        active.ensure_dir().unwrap();
        fs::write(active.sequence_path(), "#\n").unwrap();
        fs::write(active.meta_path(), "{}").unwrap();
        fs::write(video_path(&config), "webm").unwrap();
        fs::create_dir_all(&config.paths.frames).unwrap();
        fs::write(config.paths.frames.join("frame_000001.png"), "").unwrap();

        reset(&config).unwrap();
        assert!(!active.has_sequence());
        assert!(!active.meta_path().exists());
        assert!(!video_path(&config).exists());
        assert!(!config.paths.frames.exists());

        reset(&config).unwrap();
    }
}
