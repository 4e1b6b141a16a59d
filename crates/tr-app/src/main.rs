use anyhow::Result;
use clap::Parser;
use tr_core::config::{AppConfig, load_config};

pub mod cli;
pub mod commands;
pub mod pipeline;
pub mod playback;
pub mod prompt;
pub mod setup;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Charger la config puis appliquer les overrides CLI
    let mut config = resolve_config(&cli)?;
    cli.overrides.apply(&mut config)?;
    config.validate()?;

    // 4. Exécuter
    commands::dispatch(&cli.command, &cli.overrides, &config)
}

/// Fichier de config s'il existe, sinon les défauts.
fn resolve_config(cli: &cli::Cli) -> Result<AppConfig> {
    if cli.config.exists() {
        load_config(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(AppConfig::default())
    }
}
