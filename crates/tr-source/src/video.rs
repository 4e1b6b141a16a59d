// Acquisition par subprocess : aucun binding FFI.
// Prérequis runtime : `ffmpeg` et `yt-dlp` accessibles dans PATH.
//
//   - `download_video` : yt-dlp → fichier vidéo local
//   - `extract_audio`  : ffmpeg → piste audio seule
//   - `extract_frames` : ffmpeg → une image PNG par frame, à `fps` images/s

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

/// Gabarit de nommage des frames extraites (tri lexicographique = ordre temporel).
pub const FRAME_PATTERN: &str = "frame_%06d.png";

/// Télécharge `url` vers `output` avec yt-dlp.
///
/// # Errors
/// Retourne une erreur si yt-dlp est introuvable ou termine en échec.
pub fn download_video(url: &str, output: &Path, quiet: bool) -> Result<()> {
    let out_str = output.to_str().context("Chemin vidéo invalide (non-UTF8)")?;
    let mut command = Command::new("yt-dlp");
    command.args(["-o", out_str]);
    if quiet {
        command.arg("--quiet");
    }
    command.arg(url);
    run_tool(&mut command, "yt-dlp", quiet)
}

/// Extrait la piste audio de `video` vers `output` (écrase l'existant).
///
/// # Errors
/// Retourne une erreur si ffmpeg est introuvable ou échoue.
pub fn extract_audio(video: &Path, output: &Path, quiet: bool) -> Result<()> {
    let video_str = video.to_str().context("Chemin vidéo invalide (non-UTF8)")?;
    let out_str = output.to_str().context("Chemin audio invalide (non-UTF8)")?;

    let mut command = Command::new("ffmpeg");
    command.args(["-y", "-hide_banner", "-loglevel", loglevel(quiet)]);
    command.args(["-i", video_str, "-vn", out_str]);
    run_tool(&mut command, "ffmpeg", quiet)
}

/// Extrait les frames de `video` dans `dir` à `fps` images/s.
///
/// Le dossier est vidé puis recréé avant l'extraction.
///
/// # Errors
/// Retourne une erreur si le dossier ne peut être recréé ou si ffmpeg échoue.
pub fn extract_frames(video: &Path, dir: &Path, fps: u32, quiet: bool) -> Result<()> {
    let video_str = video.to_str().context("Chemin vidéo invalide (non-UTF8)")?;

    match fs::remove_dir_all(dir) {
        Ok(()) => log::debug!("Ancien dossier de frames supprimé : {}", dir.display()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => {
            return Err(e).with_context(|| format!("Impossible de supprimer {}", dir.display()));
        }
    }
    fs::create_dir_all(dir).with_context(|| format!("Impossible de créer {}", dir.display()))?;

    let pattern = dir.join(FRAME_PATTERN);
    let pattern_str = pattern.to_str().context("Chemin de frames invalide (non-UTF8)")?;
    let filter = format!("fps={fps}");

    let mut command = Command::new("ffmpeg");
    command.args(["-y", "-hide_banner", "-loglevel", loglevel(quiet)]);
    command.args(["-i", video_str, "-vf", &filter, pattern_str]);
    run_tool(&mut command, "ffmpeg", quiet)
}

fn loglevel(quiet: bool) -> &'static str {
    if quiet { "quiet" } else { "info" }
}

/// Lance l'outil et attend sa fin. La sortie n'est héritée que hors mode quiet.
fn run_tool(command: &mut Command, tool: &str, quiet: bool) -> Result<()> {
    if quiet {
        command.stdout(Stdio::null()).stderr(Stdio::null());
    }
    command.stdin(Stdio::null());

    log::debug!("Lancement : {command:?}");
    let status = command
        .status()
        .with_context(|| format!("Impossible de lancer {tool}. Est-il installé et dans le PATH ?"))?;

    if !status.success() {
        anyhow::bail!("{tool} a échoué ({status})");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loglevel_follows_quiet_flag() {
        assert_eq!(loglevel(true), "quiet");
        assert_eq!(loglevel(false), "info");
    }

    #[test]
    fn missing_tool_is_reported() {
        let mut command = Command::new("termreel-tool-that-does-not-exist");
        let err = run_tool(&mut command, "fake", true).unwrap_err();
        assert!(err.to_string().contains("fake"));
    }
}
