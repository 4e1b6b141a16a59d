use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tr_core::config::{AppConfig, Pacing};
use tr_core::palette::ShadingPalette;

/// termreel — vidéo → frames de glyphes terminal, lecture synchronisée à l'audio.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Action à exécuter.
    #[command(subcommand)]
    pub command: Command,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml", global = true)]
    pub config: PathBuf,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn", global = true)]
    pub log_level: String,

    /// Surcharges ponctuelles de la configuration.
    #[command(flatten)]
    pub overrides: Overrides,
}

/// Sous-commandes.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Télécharge la vidéo si besoin, extrait audio et frames, convertit en glyphes.
    Render,
    /// Joue la séquence active avec son audio.
    Play,
    /// Render, attend Entrée, puis joue.
    Run,
    /// Sauvegarde la séquence active sous un nom.
    Save {
        /// Nom du rendu.
        name: String,
        /// Écraser sans confirmation.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
    /// Remplace la séquence active par un rendu sauvegardé.
    Load {
        /// Nom du rendu.
        name: String,
        /// Ne pas demander de confirmation.
        #[arg(long, short, default_value_t = false)]
        yes: bool,
    },
    /// Liste les rendus sauvegardés.
    List,
    /// Supprime un rendu sauvegardé.
    Delete {
        /// Nom du rendu.
        name: String,
    },
    /// Supprime vidéo, audio, séquence et frames extraites.
    Reset,
}

/// Stratégie d'attente entre frames.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PacingArg {
    /// 1/F exact après chaque frame.
    Fixed,
    /// 1/F moins le temps d'écriture.
    Compensated,
}

impl From<PacingArg> for Pacing {
    fn from(arg: PacingArg) -> Self {
        match arg {
            PacingArg::Fixed => Pacing::Fixed,
            PacingArg::Compensated => Pacing::Compensated,
        }
    }
}

/// Flags qui écrasent la configuration chargée.
#[allow(clippy::struct_excessive_bools)]
#[derive(Args, Debug, Default, Clone, PartialEq, Eq)]
pub struct Overrides {
    /// Framerate d'extraction et de lecture (prioritaire sur meta.json).
    #[arg(long, global = true)]
    pub fps: Option<u32>,

    /// Désactiver la couleur.
    #[arg(long, default_value_t = false, global = true)]
    pub no_color: bool,

    /// Un bloc plein par cellule, sans ombrage.
    #[arg(long, default_value_t = false, global = true)]
    pub no_shading: bool,

    /// Palette compacte de 5 caractères, du plus sombre au plus clair (ex: " .:=#").
    #[arg(long, global = true)]
    pub palette: Option<String>,

    /// Sortie des outils externes masquée, pas de progression.
    #[arg(long, short, default_value_t = false, global = true)]
    pub quiet: bool,

    /// Stratégie d'attente entre frames.
    #[arg(long, value_enum, global = true)]
    pub pacing: Option<PacingArg>,

    /// Réutiliser audio et séquence en cache s'ils existent.
    #[arg(long, default_value_t = false, global = true)]
    pub skip_setup: bool,

    /// Largeur en colonnes (défaut : terminal courant).
    #[arg(long, global = true)]
    pub cols: Option<u16>,

    /// Hauteur en lignes (défaut : terminal courant).
    #[arg(long, global = true)]
    pub rows: Option<u16>,
}

impl Overrides {
    /// Apply the flags on top of `config`.
    ///
    /// # Errors
    /// Returns an error if `--palette` is not a valid 5-glyph palette.
    pub fn apply(&self, config: &mut AppConfig) -> anyhow::Result<()> {
        if let Some(fps) = self.fps {
            config.playback.framerate = fps;
        }
        if self.no_color {
            config.render.color_enabled = false;
        }
        if self.no_shading {
            config.render.shading_enabled = false;
        }
        if let Some(ref compact) = self.palette {
            config.render.palette = ShadingPalette::parse(compact)?;
        }
        if self.quiet {
            config.render.quiet = true;
        }
        if let Some(pacing) = self.pacing {
            config.playback.pacing = pacing.into();
        }
        if self.skip_setup {
            config.source.skip_setup = true;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subcommands_parse() {
        let cli = Cli::try_parse_from(["termreel", "save", "clip", "--force"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Save {
                name: "clip".into(),
                force: true
            }
        );
        let cli = Cli::try_parse_from(["termreel", "load", "clip", "-y"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Load {
                name: "clip".into(),
                yes: true
            }
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "termreel",
            "play",
            "--fps",
            "24",
            "--pacing",
            "compensated",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert_eq!(cli.command, Command::Play);
        assert_eq!(cli.overrides.fps, Some(24));
        assert_eq!(cli.overrides.pacing, Some(PacingArg::Compensated));
        assert_eq!(cli.log_level, "debug");
    }

    #[test]
    fn overrides_apply_to_config() {
        let overrides = Overrides {
            fps: Some(12),
            no_color: true,
            no_shading: true,
            palette: Some(" .oO@".into()),
            pacing: Some(PacingArg::Compensated),
            ..Overrides::default()
        };
        let mut config = AppConfig::default();
        overrides.apply(&mut config).unwrap();
        assert_eq!(config.playback.framerate, 12);
        assert!(!config.render.color_enabled);
        assert!(!config.render.shading_enabled);
        assert_eq!(config.render.palette.glyph(4), Some('@'));
        assert_eq!(config.playback.pacing, Pacing::Compensated);
    }

    #[test]
    fn bad_palette_override_rejected() {
        let overrides = Overrides {
            palette: Some("ab".into()),
            ..Overrides::default()
        };
        assert!(overrides.apply(&mut AppConfig::default()).is_err());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["termreel"]).is_err());
    }
}
