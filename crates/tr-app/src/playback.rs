use anyhow::{Context, Result};
use tr_audio::SystemAudio;
use tr_core::config::AppConfig;
use tr_core::frame::TerminalSize;
use tr_core::sequence::SequenceMeta;
use tr_player::{CancelToken, PlaybackReport, PlaybackSynchronizer, TerminalSink};
use tr_sequence::ArtifactSet;
use tr_sequence::codec::read_sequence;
use tr_sequence::meta::read_meta;

/// Framerate de lecture : `--fps`, sinon meta.json, sinon la config.
#[must_use]
pub fn resolve_framerate(cli_fps: Option<u32>, meta: Option<&SequenceMeta>, fallback: u32) -> u32 {
    cli_fps.or(meta.map(|m| m.framerate)).unwrap_or(fallback)
}

/// Taille du terminal : `--cols`/`--rows` si fournis, sinon crossterm.
///
/// # Errors
/// Returns an error if the size cannot be queried and was not given, or is
/// degenerate (rows < 2).
pub fn terminal_size(cols: Option<u16>, rows: Option<u16>) -> Result<TerminalSize> {
    let (columns, rows) = match (cols, rows) {
        (Some(c), Some(r)) => (c, r),
        _ => {
            let (c, r) = crossterm::terminal::size()
                .context("Taille du terminal inconnue, précisez --cols et --rows")?;
            (cols.unwrap_or(c), rows.unwrap_or(r))
        }
    };
    Ok(TerminalSize::new(columns, rows)?)
}

/// Joue la séquence active avec son audio. Ctrl-C arrête proprement.
///
/// # Errors
/// Returns an error if the active sequence is missing or unreadable, if the
/// audio backend is misconfigured, or if the display fails.
pub fn play_active(config: &AppConfig, cli_fps: Option<u32>) -> Result<PlaybackReport> {
    let active = ArtifactSet::new(&config.paths.assets);
    let frames = read_sequence(&active.sequence_path())
        .context("Pas de séquence active : lancez `termreel render` ou `termreel load <nom>`")?;
    let meta = read_meta(&active.meta_path())?;

    let mut playback = config.playback.clone();
    playback.framerate = resolve_framerate(cli_fps, meta.as_ref(), config.playback.framerate);
    if meta.is_none() {
        log::debug!("meta.json absent, framerate {}", playback.framerate);
    }

    if let Some(meta) = &meta {
        warn_on_size_mismatch(meta.terminal_size);
    }

    let audio = active.existing_audio();
    if audio.is_none() {
        log::info!("Pas d'audio actif, lecture muette");
    }
    let launcher = SystemAudio::from_config(&playback.audio)?;

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("Impossible d'installer le gestionnaire Ctrl-C")?;

    let mut player = PlaybackSynchronizer::new(TerminalSink::stdout(), launcher, &playback, cancel);
    let report = player.play(&frames, audio.as_deref())?;

    if report.cancelled {
        println!("Lecture interrompue ({} frames).", report.frames_shown);
    }
    Ok(report)
}

fn warn_on_size_mismatch(rendered: TerminalSize) {
    match crossterm::terminal::size() {
        Ok((columns, rows)) if (columns, rows) != (rendered.columns, rendered.rows) => {
            log::warn!(
                "Séquence rendue pour {}×{}, terminal actuel {columns}×{rows} : affichage décalé possible",
                rendered.columns,
                rendered.rows
            );
        }
        Ok(_) => {}
        Err(e) => log::debug!("Taille du terminal inconnue : {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tr_core::sequence::ShadingDescriptor;

    fn meta(framerate: u32) -> SequenceMeta {
        SequenceMeta {
            framerate,
            terminal_size: TerminalSize::new(80, 24).unwrap(),
            color_enabled: true,
            shading: ShadingDescriptor::SingleBlock,
        }
    }

    #[test]
    fn cli_fps_wins() {
        assert_eq!(resolve_framerate(Some(12), Some(&meta(24)), 30), 12);
    }

    #[test]
    fn meta_beats_config() {
        assert_eq!(resolve_framerate(None, Some(&meta(24)), 30), 24);
    }

    #[test]
    fn config_is_the_fallback() {
        assert_eq!(resolve_framerate(None, None, 30), 30);
    }

    #[test]
    fn explicit_size_skips_the_terminal() {
        let size = terminal_size(Some(100), Some(40)).unwrap();
        assert_eq!((size.columns, size.rows), (100, 40));
        assert!(terminal_size(Some(100), Some(1)).is_err());
    }

    #[test]
    fn missing_sequence_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.paths.assets = dir.path().join("assets");
        let err = play_active(&config, None).unwrap_err();
        assert!(err.to_string().contains("termreel render"));
    }
}
