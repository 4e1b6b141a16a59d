// Deux activités indépendantes pendant la lecture :
//   - la boucle de frames (ce thread, bloquante, sleep entre deux frames)
//   - l'audio (subprocess ou thread natif), seulement piloté : lancement,
//     test de vie, arrêt. Ses erreurs n'atteignent jamais la boucle.
//
// Idle → Armed → Rendering → Drained → Teardown → Idle, y compris sur erreur
// d'affichage ou annulation. L'audio vit dans un `AudioGuard` : toute sortie
// anticipée (erreur, panic) l'arrête au drop.

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use tr_core::clock::FrameClock;
use tr_core::config::{Pacing, PlaybackConfig};
use tr_core::error::CoreError;
use tr_core::frame::GlyphFrame;
use tr_core::traits::{AudioHandle, AudioLauncher, FrameSink};

use crate::cancel::CancelToken;
use crate::fps::FpsCounter;

/// Écart audio / séquence au-delà duquel on avertit.
pub const DURATION_TOLERANCE: Duration = Duration::from_secs(1);

/// Taille maximale de la fenêtre du compteur FPS.
const FPS_WINDOW_MAX: u32 = 120;

/// Lifecycle of one playback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackState {
    /// Nothing in progress.
    Idle,
    /// Display cleared, audio launched (or not requested).
    Armed,
    /// Frame loop running.
    Rendering,
    /// Frame loop finished, cancelled or failed.
    Drained,
    /// Audio and display being released.
    Teardown,
}

/// Ce qu'il est advenu de l'audio.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AudioOutcome {
    /// No audio path given.
    NotRequested,
    /// The launcher failed; playback ran silently.
    LaunchFailed,
    /// Audio was still playing after the last frame and was stopped.
    Terminated,
    /// Audio had already ended on its own.
    AlreadyFinished,
}

/// Bilan d'une lecture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaybackReport {
    /// Frames written to the sink.
    pub frames_shown: usize,
    /// Loop ended on a cancel request.
    pub cancelled: bool,
    /// Wall time of the frame loop.
    pub elapsed: Duration,
    /// `frames_shown / elapsed`.
    pub achieved_fps: f64,
    /// Audio outcome.
    pub audio: AudioOutcome,
}

/// Possède le handle audio ; l'arrête au drop s'il n'a pas été rendu.
struct AudioGuard<H: AudioHandle> {
    handle: Option<H>,
}

impl<H: AudioHandle> AudioGuard<H> {
    fn new(handle: Option<H>) -> Self {
        Self { handle }
    }

    /// Arrête l'audio s'il joue encore.
    fn release(&mut self) -> Option<AudioOutcome> {
        let mut handle = self.handle.take()?;
        if handle.is_alive() {
            if let Err(e) = handle.terminate() {
                log::warn!("Arrêt de l'audio impossible : {e}");
            }
            Some(AudioOutcome::Terminated)
        } else {
            log::debug!("Audio déjà terminé");
            Some(AudioOutcome::AlreadyFinished)
        }
    }
}

impl<H: AudioHandle> Drop for AudioGuard<H> {
    fn drop(&mut self) {
        let Some(mut handle) = self.handle.take() else {
            return;
        };
        if let Err(e) = handle.terminate() {
            log::warn!("Arrêt de l'audio impossible : {e}");
        }
    }
}

/// Écart entre la durée audio et la durée nominale des frames, si > 1 s.
#[must_use]
pub fn duration_mismatch(audio: Duration, frames: Duration) -> Option<Duration> {
    let gap = if audio > frames {
        audio - frames
    } else {
        frames - audio
    };
    (gap > DURATION_TOLERANCE).then_some(gap)
}

/// Joue une séquence de frames à cadence fixe, audio en parallèle.
///
/// # Example
/// ```
/// use std::io;
/// use tr_core::config::PlaybackConfig;
/// use tr_core::frame::GlyphFrame;
/// use tr_core::traits::{AudioHandle, AudioLauncher, FrameSink};
/// use tr_player::cancel::CancelToken;
/// use tr_player::sync::{AudioOutcome, PlaybackSynchronizer};
///
/// struct Count(usize);
/// impl FrameSink for Count {
///     fn clear(&mut self) -> io::Result<()> { Ok(()) }
///     fn show(&mut self, _: &GlyphFrame) -> io::Result<()> { self.0 += 1; Ok(()) }
///     fn finish(&mut self) -> io::Result<()> { Ok(()) }
/// }
/// struct Mute;
/// impl AudioHandle for Mute {
///     fn is_alive(&mut self) -> bool { false }
///     fn terminate(&mut self) -> anyhow::Result<()> { Ok(()) }
/// }
/// struct NoAudio;
/// impl AudioLauncher for NoAudio {
///     type Handle = Mute;
///     fn launch(&self, _: &std::path::Path) -> anyhow::Result<Mute> { Ok(Mute) }
/// }
///
/// let config = PlaybackConfig { framerate: 200, ..PlaybackConfig::default() };
/// let mut player = PlaybackSynchronizer::new(Count(0), NoAudio, &config, CancelToken::new());
/// let frames = vec![GlyphFrame::from("#"); 4];
/// let report = player.play(&frames, None).unwrap();
/// assert_eq!(report.frames_shown, 4);
/// assert_eq!(report.audio, AudioOutcome::NotRequested);
/// assert_eq!(player.sink().0, 4);
/// ```
pub struct PlaybackSynchronizer<S: FrameSink, L: AudioLauncher> {
    sink: S,
    launcher: L,
    framerate: u32,
    pacing: Pacing,
    cancel: CancelToken,
    state: PlaybackState,
}

impl<S: FrameSink, L: AudioLauncher> PlaybackSynchronizer<S, L> {
    /// Build a synchronizer; the framerate is checked by [`Self::play`].
    pub fn new(sink: S, launcher: L, config: &PlaybackConfig, cancel: CancelToken) -> Self {
        Self {
            sink,
            launcher,
            framerate: config.framerate,
            pacing: config.pacing,
            cancel,
            state: PlaybackState::Idle,
        }
    }

    /// Current lifecycle state (always [`PlaybackState::Idle`] between calls).
    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Display sink.
    #[must_use]
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Joue `frames` dans l'ordre, avec `audio` en parallèle si fourni.
    ///
    /// # Errors
    /// - [`CoreError::Config`] if the framerate is zero (nothing touched).
    /// - [`CoreError::Playback`] if the display fails; audio is stopped and
    ///   the display restored before returning.
    pub fn play(
        &mut self,
        frames: &[GlyphFrame],
        audio: Option<&Path>,
    ) -> Result<PlaybackReport, CoreError> {
        let clock = FrameClock::new(self.framerate, self.pacing)?;

        if let Err(source) = self.sink.clear() {
            if let Err(e) = self.sink.finish() {
                log::debug!("Restauration de l'affichage : {e}");
            }
            return Err(CoreError::Playback { frame: 0, source });
        }

        let (mut guard, launch_outcome) = self.arm(audio, frames.len(), &clock);
        self.enter(PlaybackState::Armed);

        self.enter(PlaybackState::Rendering);
        let started = Instant::now();
        // Fenêtre et cadence de log bornées : le framerate n'est pas plafonné.
        let window = usize::try_from(self.framerate.min(FPS_WINDOW_MAX)).unwrap_or(1);
        let mut counter = FpsCounter::new(window);
        let mut shown = 0usize;
        let mut cancelled = false;
        let mut failure = None;

        for (index, frame) in frames.iter().enumerate() {
            if self.cancel.is_cancelled() {
                log::info!("Lecture annulée à la frame {index}/{}", frames.len());
                cancelled = true;
                break;
            }
            let frame_start = Instant::now();
            if let Err(source) = self.sink.show(frame) {
                failure = Some(CoreError::Playback {
                    frame: index,
                    source,
                });
                break;
            }
            shown += 1;
            counter.tick();
            if shown % window.max(1) == 0 {
                log::debug!("frame {shown}/{} — {:.1} fps", frames.len(), counter.fps());
            }
            thread::sleep(clock.delay_after(frame_start.elapsed()));
        }

        let elapsed = started.elapsed();
        self.enter(PlaybackState::Drained);

        self.enter(PlaybackState::Teardown);
        let audio_outcome = launch_outcome
            .or_else(|| guard.release())
            .unwrap_or(AudioOutcome::NotRequested);
        let restored = self.sink.finish();
        self.enter(PlaybackState::Idle);

        if let Some(err) = failure {
            if let Err(e) = restored {
                log::debug!("Restauration de l'affichage : {e}");
            }
            return Err(err);
        }
        restored.map_err(|source| CoreError::Playback {
            frame: shown,
            source,
        })?;

        let secs = elapsed.as_secs_f64();
        let report = PlaybackReport {
            frames_shown: shown,
            cancelled,
            elapsed,
            achieved_fps: if secs > 0.0 { shown as f64 / secs } else { 0.0 },
            audio: audio_outcome,
        };
        log::info!(
            "Lecture terminée : {} frames en {:.2}s ({:.1} fps, audio {:?})",
            report.frames_shown,
            secs,
            report.achieved_fps,
            report.audio
        );
        Ok(report)
    }

    /// Lance l'audio. Un échec est journalisé, la lecture continue sans son.
    fn arm(
        &mut self,
        audio: Option<&Path>,
        frame_count: usize,
        clock: &FrameClock,
    ) -> (AudioGuard<L::Handle>, Option<AudioOutcome>) {
        let Some(path) = audio else {
            return (AudioGuard::new(None), Some(AudioOutcome::NotRequested));
        };

        if let Some(audio_len) = self.launcher.probe_duration(path) {
            let frames_len = clock.nominal_span(frame_count);
            if let Some(gap) = duration_mismatch(audio_len, frames_len) {
                log::warn!(
                    "Durées différentes : audio {:.1}s, frames {:.1}s (écart {:.1}s)",
                    audio_len.as_secs_f64(),
                    frames_len.as_secs_f64(),
                    gap.as_secs_f64()
                );
            }
        }

        match self.launcher.launch(path) {
            Ok(handle) => (AudioGuard::new(Some(handle)), None),
            Err(e) => {
                log::warn!("Audio indisponible, lecture muette : {e:#}");
                (AudioGuard::new(None), Some(AudioOutcome::LaunchFailed))
            }
        }
    }

    fn enter(&mut self, next: PlaybackState) {
        log::trace!("{:?} → {next:?}", self.state);
        self.state = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Event {
        Clear,
        Show(String),
        Finish,
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Vec<Event>,
        fail_at: Option<usize>,
        cancel_after: Option<(usize, CancelToken)>,
    }

    impl RecordingSink {
        fn shown(&self) -> Vec<String> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Show(s) => Some(s.clone()),
                    _ => None,
                })
                .collect()
        }
    }

    impl FrameSink for RecordingSink {
        fn clear(&mut self) -> io::Result<()> {
            self.events.push(Event::Clear);
            Ok(())
        }

        fn show(&mut self, frame: &GlyphFrame) -> io::Result<()> {
            let count = self.shown().len();
            if self.fail_at == Some(count) {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal fermé"));
            }
            self.events.push(Event::Show(frame.as_str().to_string()));
            let due = self.cancel_after.as_ref().filter(|(after, _)| count + 1 == *after);
            if let Some((_, token)) = due {
                token.cancel();
            }
            Ok(())
        }

        fn finish(&mut self) -> io::Result<()> {
            self.events.push(Event::Finish);
            Ok(())
        }
    }

    /// Audio factice : `alive` fixe, compte les arrêts.
    #[derive(Clone, Default)]
    struct FakeAudio {
        alive: Arc<AtomicBool>,
        fail_launch: bool,
        launched: Arc<Mutex<Vec<PathBuf>>>,
        terminations: Arc<AtomicUsize>,
        duration: Option<Duration>,
    }

    struct FakeHandle {
        alive: Arc<AtomicBool>,
        terminations: Arc<AtomicUsize>,
    }

    impl AudioHandle for FakeHandle {
        fn is_alive(&mut self) -> bool {
            self.alive.load(Ordering::SeqCst)
        }

        fn terminate(&mut self) -> anyhow::Result<()> {
            self.alive.store(false, Ordering::SeqCst);
            self.terminations.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    impl AudioLauncher for FakeAudio {
        type Handle = FakeHandle;

        fn launch(&self, path: &Path) -> anyhow::Result<FakeHandle> {
            if self.fail_launch {
                anyhow::bail!("ffplay introuvable");
            }
            self.launched.lock().unwrap().push(path.to_path_buf());
            Ok(FakeHandle {
                alive: Arc::clone(&self.alive),
                terminations: Arc::clone(&self.terminations),
            })
        }

        fn probe_duration(&self, _path: &Path) -> Option<Duration> {
            self.duration
        }
    }

    fn config(framerate: u32) -> PlaybackConfig {
        PlaybackConfig {
            framerate,
            ..PlaybackConfig::default()
        }
    }

    fn frames(n: usize) -> Vec<GlyphFrame> {
        (0..n).map(|i| GlyphFrame::from(format!("f{i}"))).collect()
    }

    fn player(
        sink: RecordingSink,
        audio: FakeAudio,
        framerate: u32,
    ) -> PlaybackSynchronizer<RecordingSink, FakeAudio> {
        PlaybackSynchronizer::new(sink, audio, &config(framerate), CancelToken::new())
    }

    #[test]
    fn frames_shown_in_order_and_timed() {
        let mut p = player(RecordingSink::default(), FakeAudio::default(), 50);
        let report = p.play(&frames(10), None).unwrap();

        assert_eq!(report.frames_shown, 10);
        assert!(!report.cancelled);
        // 10 frames à 50 fps : 200 ms de sommeil, marge large pour la machine.
        assert!(report.elapsed >= Duration::from_millis(200));
        assert!(report.elapsed < Duration::from_millis(200 + 10 * 50));
        let expected: Vec<String> = (0..10).map(|i| format!("f{i}")).collect();
        assert_eq!(p.sink().shown(), expected);
        assert_eq!(p.sink().events.first(), Some(&Event::Clear));
        assert_eq!(p.sink().events.last(), Some(&Event::Finish));
        assert_eq!(p.state(), PlaybackState::Idle);
    }

    #[test]
    fn huge_framerate_plays_without_large_buffers() {
        let mut p = player(RecordingSink::default(), FakeAudio::default(), u32::MAX);
        let report = p.play(&frames(1), None).unwrap();
        assert_eq!(report.frames_shown, 1);
        assert_eq!(p.sink().events.last(), Some(&Event::Finish));
    }

    #[test]
    fn zero_framerate_touches_nothing() {
        let audio = FakeAudio::default();
        let mut p = player(RecordingSink::default(), audio.clone(), 0);
        let err = p.play(&frames(3), Some(Path::new("audio.mp3"))).unwrap_err();
        assert!(matches!(err, CoreError::Config(_)));
        assert!(p.sink().events.is_empty());
        assert!(audio.launched.lock().unwrap().is_empty());
    }

    #[test]
    fn live_audio_is_terminated_after_last_frame() {
        let audio = FakeAudio::default();
        audio.alive.store(true, Ordering::SeqCst);
        let mut p = player(RecordingSink::default(), audio.clone(), 100);
        let report = p.play(&frames(3), Some(Path::new("a.mp3"))).unwrap();

        assert_eq!(report.audio, AudioOutcome::Terminated);
        assert_eq!(audio.terminations.load(Ordering::SeqCst), 1);
        assert_eq!(*audio.launched.lock().unwrap(), vec![PathBuf::from("a.mp3")]);
    }

    #[test]
    fn finished_audio_is_left_alone() {
        let audio = FakeAudio::default();
        let mut p = player(RecordingSink::default(), audio.clone(), 100);
        let report = p.play(&frames(2), Some(Path::new("a.mp3"))).unwrap();

        assert_eq!(report.audio, AudioOutcome::AlreadyFinished);
        assert_eq!(audio.terminations.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn launch_failure_plays_silently() {
        let audio = FakeAudio {
            fail_launch: true,
            ..FakeAudio::default()
        };
        let mut p = player(RecordingSink::default(), audio, 100);
        let report = p.play(&frames(4), Some(Path::new("a.mp3"))).unwrap();
        assert_eq!(report.audio, AudioOutcome::LaunchFailed);
        assert_eq!(report.frames_shown, 4);
    }

    #[test]
    fn duration_mismatch_does_not_change_frame_count() {
        let audio = FakeAudio {
            duration: Some(Duration::from_secs(60)),
            ..FakeAudio::default()
        };
        let mut p = player(RecordingSink::default(), audio, 100);
        let report = p.play(&frames(5), Some(Path::new("a.mp3"))).unwrap();
        assert_eq!(report.frames_shown, 5);
    }

    #[test]
    fn cancellation_stops_loop_and_audio() {
        let token = CancelToken::new();
        let sink = RecordingSink {
            cancel_after: Some((3, token.clone())),
            ..RecordingSink::default()
        };
        let audio = FakeAudio::default();
        audio.alive.store(true, Ordering::SeqCst);
        let mut p = PlaybackSynchronizer::new(sink, audio.clone(), &config(100), token);

        let report = p.play(&frames(20), Some(Path::new("a.mp3"))).unwrap();
        assert!(report.cancelled);
        assert_eq!(report.frames_shown, 3);
        assert_eq!(report.audio, AudioOutcome::Terminated);
        assert_eq!(p.sink().events.last(), Some(&Event::Finish));
    }

    #[test]
    fn cancelled_before_first_frame() {
        let token = CancelToken::new();
        token.cancel();
        let mut p = PlaybackSynchronizer::new(
            RecordingSink::default(),
            FakeAudio::default(),
            &config(30),
            token,
        );
        let report = p.play(&frames(5), None).unwrap();
        assert!(report.cancelled);
        assert_eq!(report.frames_shown, 0);
    }

    #[test]
    fn display_failure_aborts_and_tears_down() {
        let sink = RecordingSink {
            fail_at: Some(2),
            ..RecordingSink::default()
        };
        let audio = FakeAudio::default();
        audio.alive.store(true, Ordering::SeqCst);
        let mut p = player(sink, audio.clone(), 100);

        let err = p.play(&frames(10), Some(Path::new("a.mp3"))).unwrap_err();
        assert!(matches!(err, CoreError::Playback { frame: 2, .. }));
        assert_eq!(p.sink().shown().len(), 2);
        assert_eq!(p.sink().events.last(), Some(&Event::Finish));
        assert_eq!(audio.terminations.load(Ordering::SeqCst), 1);
        assert_eq!(p.state(), PlaybackState::Idle);
    }

    #[test]
    fn compensated_pacing_still_shows_every_frame() {
        let config = PlaybackConfig {
            framerate: 100,
            pacing: Pacing::Compensated,
            ..PlaybackConfig::default()
        };
        let mut p = PlaybackSynchronizer::new(
            RecordingSink::default(),
            FakeAudio::default(),
            &config,
            CancelToken::new(),
        );
        let report = p.play(&frames(6), None).unwrap();
        assert_eq!(report.frames_shown, 6);
    }

    #[test]
    fn mismatch_threshold_is_one_second() {
        let s = Duration::from_secs;
        assert_eq!(duration_mismatch(s(10), s(10)), None);
        assert_eq!(duration_mismatch(s(11), s(10)), None);
        assert_eq!(duration_mismatch(s(12), s(10)), Some(s(2)));
        assert_eq!(duration_mismatch(s(10), s(13)), Some(s(3)));
    }

    #[test]
    fn empty_sequence_still_clears_and_finishes() {
        let mut p = player(RecordingSink::default(), FakeAudio::default(), 30);
        let report = p.play(&[], None).unwrap();
        assert_eq!(report.frames_shown, 0);
        assert_eq!(p.sink().events, vec![Event::Clear, Event::Finish]);
    }
}
