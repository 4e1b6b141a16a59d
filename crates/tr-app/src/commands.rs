use anyhow::{Context, Result};
use tr_core::config::AppConfig;
use tr_sequence::{ArtifactSet, SequenceStore, StoreError};

use crate::cli::{Command, Overrides};
use crate::playback::{play_active, terminal_size};
use crate::prompt::{confirm_stdin, wait_for_enter};
use crate::setup::{Prepared, prepare, reset};

/// Exécute une sous-commande avec la configuration résolue.
///
/// # Errors
/// Propagates the error of the selected command.
pub fn dispatch(command: &Command, overrides: &Overrides, config: &AppConfig) -> Result<()> {
    let active = ArtifactSet::new(&config.paths.assets);
    let store = SequenceStore::new(&config.paths.store);

    match command {
        Command::Render => render(overrides, config).map(|_| ()),
        Command::Play => play_active(config, overrides.fps).map(|_| ()),
        Command::Run => {
            render(overrides, config)?;
            wait_for_enter(
                &mut std::io::stdin().lock(),
                &mut std::io::stdout(),
                "\n[PRÊT] Séquence prête. Appuyez sur Entrée pour lancer la lecture.",
            )?;
            play_active(config, overrides.fps).map(|_| ())
        }
        Command::Save { name, force } => save(&store, &active, name, *force),
        Command::Load { name, yes } => load(&store, &active, name, *yes),
        Command::List => {
            let names = store.list()?;
            if names.is_empty() {
                println!("Aucun rendu dans {}", store.root().display());
            }
            for name in names {
                println!("{name}");
            }
            Ok(())
        }
        Command::Delete { name } => {
            store.delete(name)?;
            println!("Rendu '{name}' supprimé.");
            Ok(())
        }
        Command::Reset => {
            reset(config)?;
            println!("Fichiers actifs supprimés.");
            Ok(())
        }
    }
}

fn render(overrides: &Overrides, config: &AppConfig) -> Result<Prepared> {
    let size = terminal_size(overrides.cols, overrides.rows)?;
    let prepared = prepare(config, size)?;
    if let Prepared::Rendered(count) = prepared {
        println!("{count} frames prêtes.");
    }
    Ok(prepared)
}

fn save(store: &SequenceStore, active: &ArtifactSet, name: &str, force: bool) -> Result<()> {
    match store.save(name, active, force) {
        Ok(()) => {}
        Err(StoreError::NameCollision(_)) => {
            let question = format!("Le rendu '{name}' existe déjà. L'écraser ?");
            if !confirm_stdin(&question)? {
                println!("Annulé.");
                return Ok(());
            }
            store.save(name, active, true)?;
        }
        Err(e) => return Err(e).context("Sauvegarde impossible"),
    }
    println!("Rendu sauvegardé dans {}", store.root().join(name).display());
    Ok(())
}

fn load(store: &SequenceStore, active: &ArtifactSet, name: &str, yes: bool) -> Result<()> {
    // Vérifier le rendu avant de poser la question.
    if !store.render(name)?.has_sequence() {
        return Err(StoreError::NotFound(name.to_string()).into());
    }
    if !yes && active.has_sequence() {
        let question = "Remplacer la séquence active ?";
        if !confirm_stdin(question)? {
            println!("Annulé.");
            return Ok(());
        }
    }
    store.load(name, active)?;
    println!("Rendu '{name}' chargé.");
    Ok(())
}
