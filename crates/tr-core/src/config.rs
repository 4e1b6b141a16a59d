use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::palette::ShadingPalette;

/// Configuration d'une passe de rendu. Lecture seule pendant la passe.
///
/// # Example
/// ```
/// use tr_core::config::RenderConfig;
/// let config = RenderConfig::default();
/// assert!(config.shading_enabled);
/// assert!(config.color_enabled);
/// ```
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct RenderConfig {
    /// Ombrage par palette ; sinon un bloc plein par cellule.
    pub shading_enabled: bool,
    /// Palette 5 niveaux, du plus sombre au plus clair.
    pub palette: ShadingPalette,
    /// Préfixe truecolor par cellule.
    pub color_enabled: bool,
    /// Pas de progression ni de sortie des outils externes.
    pub quiet: bool,
    /// N'émettre l'escape couleur que lorsque la couleur change.
    pub merge_color_runs: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            shading_enabled: true,
            palette: ShadingPalette::default(),
            color_enabled: true,
            quiet: false,
            merge_color_runs: false,
        }
    }
}

/// How the frame loop waits between frames.
///
/// # Example
/// ```
/// use tr_core::config::Pacing;
/// assert_eq!(Pacing::default(), Pacing::Fixed);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pacing {
    /// Sleep exactly `1 / framerate` after each frame. Drift accumulates.
    #[default]
    Fixed,
    /// Sleep `1 / framerate` minus the time spent writing the frame.
    Compensated,
}

/// Audio playback facility.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioBackend {
    /// Lecteur externe lancé en subprocess.
    #[default]
    Process,
    /// Sortie cpal dans un thread dédié (feature `native-audio`).
    Native,
}

/// Audio settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct AudioConfig {
    /// Backend choisi.
    pub backend: AudioBackend,
    /// Commande du lecteur externe ; le chemin audio est ajouté en dernier.
    pub player: Vec<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            backend: AudioBackend::Process,
            player: ["ffplay", "-nodisp", "-autoexit", "-loglevel", "quiet"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

/// Configuration de lecture.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PlaybackConfig {
    /// Frames par seconde (> 0). Sert aussi à l'extraction des frames.
    pub framerate: u32,
    /// Stratégie d'attente entre frames.
    pub pacing: Pacing,
    /// Audio.
    pub audio: AudioConfig,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            framerate: 30,
            pacing: Pacing::Fixed,
            audio: AudioConfig::default(),
        }
    }
}

impl PlaybackConfig {
    /// Reject a zero framerate.
    ///
    /// # Errors
    /// [`CoreError::Config`] if `framerate == 0`.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.framerate == 0 {
            return Err(CoreError::Config("le framerate doit être positif".into()));
        }
        Ok(())
    }
}

/// Acquisition de la vidéo source.
#[allow(clippy::struct_excessive_bools)]
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SourceConfig {
    /// URL téléchargée quand aucune copie locale n'existe.
    pub url: String,
    /// Nom du fichier vidéo dans le dossier assets.
    pub video_name: String,
    /// Réutiliser audio + séquence en cache s'ils existent.
    pub skip_setup: bool,
    /// Supprimer les frames extraites après le rendu.
    pub delete_frames: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: "https://www.youtube.com/watch?v=FtutLA63Cp8".into(),
            video_name: "video.webm".into(),
            skip_setup: false,
            delete_frames: false,
        }
    }
}

/// Working directories.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Artefacts actifs (vidéo, audio, séquence, métadonnées).
    pub assets: PathBuf,
    /// Frames extraites par ffmpeg.
    pub frames: PathBuf,
    /// Racine du store de rendus nommés.
    pub store: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            assets: PathBuf::from("assets"),
            frames: PathBuf::from("frames"),
            store: PathBuf::from("stored"),
        }
    }
}

/// Configuration complète de l'application, chargée une fois au démarrage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    /// Render pass.
    pub render: RenderConfig,
    /// Playback.
    pub playback: PlaybackConfig,
    /// Video acquisition.
    pub source: SourceConfig,
    /// Directories.
    pub paths: PathsConfig,
}

impl AppConfig {
    /// Validate cross-field constraints after merging.
    ///
    /// # Errors
    /// [`CoreError::Config`] on a zero framerate or an empty player command.
    pub fn validate(&self) -> Result<(), CoreError> {
        self.playback.validate()?;
        if self.playback.audio.backend == AudioBackend::Process
            && self.playback.audio.player.is_empty()
        {
            return Err(CoreError::Config("commande du lecteur audio vide".into()));
        }
        Ok(())
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    render: Option<RenderSection>,
    playback: Option<PlaybackSection>,
    source: Option<SourceSection>,
    paths: Option<PathsSection>,
}

#[derive(Deserialize)]
struct RenderSection {
    shading: Option<bool>,
    palette: Option<Vec<String>>,
    color: Option<bool>,
    quiet: Option<bool>,
    merge_color_runs: Option<bool>,
}

#[derive(Deserialize)]
struct PlaybackSection {
    framerate: Option<u32>,
    pacing: Option<Pacing>,
    audio_backend: Option<AudioBackend>,
    audio_player: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct SourceSection {
    url: Option<String>,
    video_name: Option<String>,
    skip_setup: Option<bool>,
    delete_frames: Option<bool>,
}

#[derive(Deserialize)]
struct PathsSection {
    assets: Option<PathBuf>,
    frames: Option<PathBuf>,
    store: Option<PathBuf>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed, or if a merged
/// value is invalid (palette, framerate).
///
/// # Example
/// ```no_run
/// use tr_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    parse_config(&content)
        .with_context(|| format!("Configuration invalide dans {}", path.display()))
}

/// Parse TOML text and merge it over [`AppConfig::default`].
///
/// # Errors
/// Returns an error on malformed TOML or invalid values.
pub fn parse_config(content: &str) -> Result<AppConfig> {
    let file: ConfigFile = toml::from_str(content).context("Erreur de parsing TOML")?;

    let mut config = AppConfig::default();

    if let Some(r) = file.render {
        if let Some(v) = r.shading {
            config.render.shading_enabled = v;
        }
        if let Some(v) = r.palette {
            config.render.palette = ShadingPalette::from_entries(&v)?;
        }
        if let Some(v) = r.color {
            config.render.color_enabled = v;
        }
        if let Some(v) = r.quiet {
            config.render.quiet = v;
        }
        if let Some(v) = r.merge_color_runs {
            config.render.merge_color_runs = v;
        }
    }

    if let Some(p) = file.playback {
        if let Some(v) = p.framerate {
            config.playback.framerate = v;
        }
        if let Some(v) = p.pacing {
            config.playback.pacing = v;
        }
        if let Some(v) = p.audio_backend {
            config.playback.audio.backend = v;
        }
        if let Some(v) = p.audio_player {
            config.playback.audio.player = v;
        }
    }

    if let Some(s) = file.source {
        if let Some(v) = s.url {
            config.source.url = v;
        }
        if let Some(v) = s.video_name {
            config.source.video_name = v;
        }
        if let Some(v) = s.skip_setup {
            config.source.skip_setup = v;
        }
        if let Some(v) = s.delete_frames {
            config.source.delete_frames = v;
        }
    }

    if let Some(p) = file.paths {
        if let Some(v) = p.assets {
            config.paths.assets = v;
        }
        if let Some(v) = p.frames {
            config.paths.frames = v;
        }
        if let Some(v) = p.store {
            config.paths.store = v;
        }
    }

    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_sections_override_fields() {
        let config = parse_config(
            r#"
            [render]
            color = false
            palette = [" ", "-", "+", "%%", "@"]

            [playback]
            framerate = 24
            pacing = "compensated"
            "#,
        )
        .unwrap();
        assert!(!config.render.color_enabled);
        assert!(config.render.shading_enabled);
        assert_eq!(config.render.palette.glyphs(), [' ', '-', '+', '%', '@']);
        assert_eq!(config.playback.framerate, 24);
        assert_eq!(config.playback.pacing, Pacing::Compensated);
        assert_eq!(config.paths, PathsConfig::default());
    }

    #[test]
    fn zero_framerate_is_a_configuration_error() {
        assert!(parse_config("[playback]\nframerate = 0\n").is_err());
    }

    #[test]
    fn short_palette_is_a_configuration_error() {
        assert!(parse_config("[render]\npalette = [\" \", \"#\"]\n").is_err());
    }

    #[test]
    fn load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("termreel.toml");
        std::fs::write(&path, "[source]\nskip_setup = true\n").unwrap();
        let config = load_config(&path).unwrap();
        assert!(config.source.skip_setup);
    }
}
