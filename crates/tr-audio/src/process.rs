// Backend audio par défaut : un lecteur externe (ffplay) en subprocess.
// L'enfant est tué explicitement en fin de lecture, à l'annulation, au drop du
// handle et, sous Linux, par le noyau si le parent meurt (PR_SET_PDEATHSIG).

use std::io;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::Duration;

use tr_core::traits::{AudioHandle, AudioLauncher};

use crate::error::AudioError;
use crate::probe;

/// Lance un lecteur externe : `program args... <fichier>`.
///
/// # Example
/// ```
/// use tr_audio::process::ProcessLauncher;
/// let launcher = ProcessLauncher::new(&["ffplay".into(), "-nodisp".into()]).unwrap();
/// assert_eq!(launcher.program(), "ffplay");
/// ```
#[derive(Clone, Debug)]
pub struct ProcessLauncher {
    program: String,
    args: Vec<String>,
}

impl ProcessLauncher {
    /// Build a launcher from a command line (program first).
    ///
    /// # Errors
    /// [`AudioError::EmptyCommand`] if `command` is empty or its program is blank.
    pub fn new(command: &[String]) -> Result<Self, AudioError> {
        let (program, args) = command.split_first().ok_or(AudioError::EmptyCommand)?;
        if program.trim().is_empty() {
            return Err(AudioError::EmptyCommand);
        }
        Ok(Self {
            program: program.clone(),
            args: args.to_vec(),
        })
    }

    /// Program name.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    fn command(&self, path: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        tie_to_parent(&mut command);
        command
    }
}

impl AudioLauncher for ProcessLauncher {
    type Handle = ProcessAudio;

    fn launch(&self, path: &Path) -> anyhow::Result<ProcessAudio> {
        let child = self
            .command(path)
            .spawn()
            .map_err(|source| AudioError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        log::info!(
            "Lecteur audio lancé : {} (pid {}) — {}",
            self.program,
            child.id(),
            path.display()
        );
        Ok(ProcessAudio { child })
    }

    fn probe_duration(&self, path: &Path) -> Option<Duration> {
        probe::probe_duration(path).unwrap_or_else(|e| {
            log::debug!("Durée audio inconnue : {e}");
            None
        })
    }
}

/// Handle sur le lecteur externe. Tué au drop.
#[derive(Debug)]
pub struct ProcessAudio {
    child: Child,
}

impl ProcessAudio {
    /// Process id of the player.
    #[must_use]
    pub fn id(&self) -> u32 {
        self.child.id()
    }
}

impl AudioHandle for ProcessAudio {
    fn is_alive(&mut self) -> bool {
        match self.child.try_wait() {
            Ok(None) => true,
            Ok(Some(status)) => {
                log::debug!("Lecteur audio terminé ({status})");
                false
            }
            Err(e) => {
                log::warn!("État du lecteur audio illisible : {e}");
                false
            }
        }
    }

    fn terminate(&mut self) -> anyhow::Result<()> {
        match self.child.kill() {
            Ok(()) => {}
            // Déjà terminé et récolté.
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => {}
            Err(e) => return Err(e.into()),
        }
        let status = self.child.wait()?;
        log::debug!("Lecteur audio arrêté ({status})");
        Ok(())
    }
}

impl Drop for ProcessAudio {
    fn drop(&mut self) {
        if let Err(e) = self.terminate() {
            log::warn!("Arrêt du lecteur audio impossible : {e}");
        }
    }
}

/// Sous Linux, le noyau envoie SIGKILL à l'enfant si le parent meurt.
#[cfg(target_os = "linux")]
#[allow(unsafe_code)]
fn tie_to_parent(command: &mut Command) {
    use std::os::unix::process::CommandExt;

    // SAFETY: the closure runs between fork and exec and only calls prctl,
    // which is async-signal-safe; it allocates nothing and touches no lock.
    unsafe {
        command.pre_exec(|| {
            if libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGKILL) == -1 {
                return Err(io::Error::last_os_error());
            }
            Ok(())
        });
    }
}

#[cfg(not(target_os = "linux"))]
fn tie_to_parent(_command: &mut Command) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn launcher(command: &[&str]) -> ProcessLauncher {
        let owned: Vec<String> = command.iter().map(|s| (*s).to_string()).collect();
        ProcessLauncher::new(&owned).unwrap()
    }

    #[test]
    fn empty_command_rejected() {
        assert!(matches!(
            ProcessLauncher::new(&[]),
            Err(AudioError::EmptyCommand)
        ));
        assert!(ProcessLauncher::new(&["  ".to_string()]).is_err());
    }

    #[test]
    fn missing_player_is_spawn_error() {
        let err = launcher(&["termreel-player-that-does-not-exist"])
            .launch(Path::new("audio.mp3"))
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AudioError>(),
            Some(AudioError::Spawn { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn terminate_stops_a_running_player() {
        // `sleep 30` joue le rôle d'un lecteur qui ne finit pas seul.
        let mut handle = launcher(&["sleep"]).launch(Path::new("30")).unwrap();
        assert!(handle.is_alive());
        handle.terminate().unwrap();
        assert!(!handle.is_alive());
        // Idempotent.
        handle.terminate().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn finished_player_is_not_alive() {
        let mut handle = launcher(&["sleep"]).launch(Path::new("0")).unwrap();
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while handle.is_alive() {
            assert!(std::time::Instant::now() < deadline, "sleep 0 n'a pas terminé");
            std::thread::sleep(Duration::from_millis(10));
        }
        handle.terminate().unwrap();
    }
}
