// Backend audio in-process : fichier décodé une fois puis joué une seule fois
// sur le périphérique de sortie par défaut, dans un thread dédié qui possède
// le stream cpal (le stream n'est pas Send sur toutes les plateformes).
// La piste mono est rééchantillonnée au taux par défaut du périphérique et
// recopiée sur tous ses canaux.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tr_core::traits::{AudioHandle, AudioLauncher};

use crate::decode::{DecodedTrack, decode_file};
use crate::error::AudioError;
use crate::probe;

/// Période de scrutation du thread audio.
const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Lecture via cpal + symphonia.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeLauncher;

impl AudioLauncher for NativeLauncher {
    type Handle = NativeAudio;

    fn launch(&self, path: &Path) -> anyhow::Result<NativeAudio> {
        let track = decode_file(path)?;
        if track.samples.is_empty() {
            anyhow::bail!("Fichier audio vide : {}", path.display());
        }

        let stop = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), AudioError>>();

        let thread_stop = Arc::clone(&stop);
        let thread_finished = Arc::clone(&finished);
        let source: PathBuf = path.to_path_buf();
        let thread = thread::Builder::new()
            .name("tr-audio".to_string())
            .spawn(move || {
                run_output(track, &thread_stop, &thread_finished, &ready_tx);
                thread_finished.store(true, Ordering::Release);
            })?;

        // Attendre que le stream soit démarré pour signaler un échec au lanceur.
        match ready_rx.recv() {
            Ok(Ok(())) => {
                log::info!("Audio natif démarré — {}", source.display());
                Ok(NativeAudio {
                    stop,
                    finished,
                    thread: Some(thread),
                })
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e.into())
            }
            Err(_) => {
                let _ = thread.join();
                anyhow::bail!("Le thread audio s'est arrêté avant de démarrer")
            }
        }
    }

    fn probe_duration(&self, path: &Path) -> Option<Duration> {
        probe::probe_duration(path).unwrap_or_else(|e| {
            log::debug!("Durée audio inconnue : {e}");
            None
        })
    }
}

fn run_output(
    track: DecodedTrack,
    stop: &AtomicBool,
    finished: &Arc<AtomicBool>,
    ready: &mpsc::Sender<Result<(), AudioError>>,
) {
    let stream = match build_stream(track, finished) {
        Ok(stream) => stream,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };
    if let Err(e) = stream.play() {
        let _ = ready.send(Err(AudioError::StreamError(e.to_string())));
        return;
    }
    let _ = ready.send(Ok(()));

    while !stop.load(Ordering::Acquire) && !finished.load(Ordering::Acquire) {
        thread::sleep(POLL_INTERVAL);
    }
    drop(stream);
}

fn build_stream(
    track: DecodedTrack,
    finished: &Arc<AtomicBool>,
) -> Result<cpal::Stream, AudioError> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or(AudioError::NoOutputDevice)?;

    // Format imposé par le périphérique ; la piste s'y adapte.
    let supported = device
        .default_output_config()
        .map_err(|e| AudioError::StreamError(e.to_string()))?;
    if supported.sample_format() != cpal::SampleFormat::F32 {
        return Err(AudioError::UnsupportedFormat(format!(
            "sortie {:?} non prise en charge (f32 requis)",
            supported.sample_format()
        )));
    }
    let config: cpal::StreamConfig = supported.into();
    let channels = usize::from(config.channels.max(1));
    let track = track.resampled(config.sample_rate.0);

    let samples = Arc::new(track.samples);
    let position = AtomicUsize::new(0);
    let done = Arc::clone(finished);

    device
        .build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let total = samples.len();
                let mut pos = position.load(Ordering::Relaxed);
                for frame in data.chunks_mut(channels) {
                    // Lecture unique : silence une fois la piste épuisée.
                    let sample = samples.get(pos).copied().unwrap_or(0.0);
                    frame.fill(sample);
                    pos = (pos + 1).min(total);
                }
                position.store(pos, Ordering::Relaxed);
                if pos >= total {
                    done.store(true, Ordering::Release);
                }
            },
            |err| {
                log::error!("Audio output error: {err}");
            },
            None,
        )
        .map_err(|e| AudioError::StreamError(e.to_string()))
}

/// Handle sur le thread audio natif.
#[derive(Debug)]
pub struct NativeAudio {
    stop: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl AudioHandle for NativeAudio {
    fn is_alive(&mut self) -> bool {
        !self.finished.load(Ordering::Acquire)
    }

    fn terminate(&mut self) -> anyhow::Result<()> {
        self.stop.store(true, Ordering::Release);
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| anyhow::anyhow!("Le thread audio a paniqué"))?;
        }
        Ok(())
    }
}

impl Drop for NativeAudio {
    fn drop(&mut self) {
        if let Err(e) = self.terminate() {
            log::warn!("{e}");
        }
    }
}
