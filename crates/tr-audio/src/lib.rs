/// Audio de lecture pour termreel : lecteur externe en subprocess (défaut)
/// ou lecture in-process cpal + symphonia (feature `native-audio`).

#[cfg(feature = "native-audio")]
pub mod decode;
pub mod error;
#[cfg(feature = "native-audio")]
pub mod native;
pub mod probe;
pub mod process;

use std::path::Path;
use std::time::Duration;

use tr_core::config::{AudioBackend, AudioConfig};
use tr_core::traits::{AudioHandle, AudioLauncher};

pub use error::AudioError;

/// Backend choisi par la configuration.
#[derive(Clone, Debug)]
pub enum SystemAudio {
    /// External player subprocess.
    Process(process::ProcessLauncher),
    /// In-process cpal stream.
    #[cfg(feature = "native-audio")]
    Native(native::NativeLauncher),
}

impl SystemAudio {
    /// Select the backend described by `config`.
    ///
    /// # Errors
    /// - [`AudioError::EmptyCommand`] for a blank player command line.
    /// - [`AudioError::BackendUnavailable`] if `native` is requested in a
    ///   build without the `native-audio` feature.
    ///
    /// # Example
    /// ```
    /// use tr_audio::SystemAudio;
    /// use tr_core::config::AudioConfig;
    /// let audio = SystemAudio::from_config(&AudioConfig::default()).unwrap();
    /// assert!(matches!(audio, SystemAudio::Process(_)));
    /// ```
    pub fn from_config(config: &AudioConfig) -> Result<Self, AudioError> {
        match config.backend {
            AudioBackend::Process => Ok(Self::Process(process::ProcessLauncher::new(
                &config.player,
            )?)),
            #[cfg(feature = "native-audio")]
            AudioBackend::Native => Ok(Self::Native(native::NativeLauncher)),
            #[cfg(not(feature = "native-audio"))]
            AudioBackend::Native => Err(AudioError::BackendUnavailable(
                "native (compiler avec --features native-audio)",
            )),
        }
    }
}

/// Handle renvoyé par [`SystemAudio`].
#[derive(Debug)]
pub enum SystemHandle {
    /// External player.
    Process(process::ProcessAudio),
    /// cpal stream thread.
    #[cfg(feature = "native-audio")]
    Native(native::NativeAudio),
}

impl AudioHandle for SystemHandle {
    fn is_alive(&mut self) -> bool {
        match self {
            Self::Process(h) => h.is_alive(),
            #[cfg(feature = "native-audio")]
            Self::Native(h) => h.is_alive(),
        }
    }

    fn terminate(&mut self) -> anyhow::Result<()> {
        match self {
            Self::Process(h) => h.terminate(),
            #[cfg(feature = "native-audio")]
            Self::Native(h) => h.terminate(),
        }
    }
}

impl AudioLauncher for SystemAudio {
    type Handle = SystemHandle;

    fn launch(&self, path: &Path) -> anyhow::Result<SystemHandle> {
        match self {
            Self::Process(l) => l.launch(path).map(SystemHandle::Process),
            #[cfg(feature = "native-audio")]
            Self::Native(l) => l.launch(path).map(SystemHandle::Native),
        }
    }

    fn probe_duration(&self, path: &Path) -> Option<Duration> {
        match self {
            Self::Process(l) => l.probe_duration(path),
            #[cfg(feature = "native-audio")]
            Self::Native(l) => l.probe_duration(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_player_rejected() {
        let config = AudioConfig {
            player: Vec::new(),
            ..AudioConfig::default()
        };
        assert!(matches!(
            SystemAudio::from_config(&config),
            Err(AudioError::EmptyCommand)
        ));
    }

    #[cfg(not(feature = "native-audio"))]
    #[test]
    fn native_requires_feature() {
        let config = AudioConfig {
            backend: AudioBackend::Native,
            ..AudioConfig::default()
        };
        assert!(matches!(
            SystemAudio::from_config(&config),
            Err(AudioError::BackendUnavailable(_))
        ));
    }
}
