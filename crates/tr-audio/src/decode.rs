use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatReader, Packet};

use crate::error::AudioError;
use crate::probe::open_format;

/// Piste décodée en mémoire, mono f32.
#[derive(Clone, Debug)]
pub struct DecodedTrack {
    /// Mono samples in `[-1, 1]`.
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl DecodedTrack {
    /// Rééchantillonne à `rate` Hz par interpolation linéaire.
    ///
    /// # Example
    /// ```
    /// use tr_audio::decode::DecodedTrack;
    /// let track = DecodedTrack { samples: vec![0.0, 1.0], sample_rate: 1 };
    /// let up = track.resampled(2);
    /// assert_eq!(up.samples, vec![0.0, 0.5, 1.0, 1.0]);
    /// ```
    #[must_use]
    pub fn resampled(self, rate: u32) -> Self {
        if rate == self.sample_rate || self.sample_rate == 0 || rate == 0 {
            return self;
        }
        let step = f64::from(self.sample_rate) / f64::from(rate);
        let len = (self.samples.len() as f64 / step).round() as usize;
        let samples = (0..len)
            .map(|i| {
                let pos = i as f64 * step;
                let idx = pos as usize;
                let frac = (pos - idx as f64) as f32;
                let a = self.samples.get(idx).copied().unwrap_or(0.0);
                let b = self.samples.get(idx + 1).copied().unwrap_or(a);
                a + (b - a) * frac
            })
            .collect();
        log::debug!("Rééchantillonnage {}Hz → {rate}Hz", self.sample_rate);
        Self {
            samples,
            sample_rate: rate,
        }
    }
}

/// Decode an audio file into mono f32 samples.
///
/// Supports WAV, MP3, FLAC, OGG, AAC via symphonia. Une erreur sur un paquet
/// isolé est journalisée et ignorée.
///
/// # Errors
/// Returns an error if the file cannot be opened, probed, or has no
/// decodable track.
///
/// # Example
/// ```no_run
/// use tr_audio::decode::decode_file;
/// let track = decode_file("assets/audio.mp3").unwrap();
/// ```
pub fn decode_file(path: impl AsRef<Path>) -> Result<DecodedTrack, AudioError> {
    let path = path.as_ref();
    let mut format = open_format(path)?;
    let track = format
        .default_track()
        .ok_or_else(|| AudioError::UnsupportedFormat("aucune piste audio".into()))?;

    let sample_rate = track.codec_params.sample_rate.unwrap_or(44100);
    let channels = track
        .codec_params
        .channels
        .map_or(1, symphonia::core::audio::Channels::count);

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::DecodeError(e.to_string()))?;

    let track_id = track.id;
    let mut samples: Vec<f32> = Vec::new();
    let mut scratch: Option<SampleBuffer<f32>> = None;

    while let Some(packet) = next_packet(format.as_mut()) {
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(d) => d,
            Err(e) => {
                log::warn!("Paquet audio ignoré : {e}");
                continue;
            }
        };

        // Le buffer n'est réalloué que si le paquet dépasse sa capacité.
        let frames = decoded.capacity();
        if scratch.as_ref().is_none_or(|buf| buf.capacity() < frames * channels) {
            scratch = Some(SampleBuffer::<f32>::new(frames as u64, *decoded.spec()));
        }
        let Some(buf) = scratch.as_mut() else {
            continue;
        };
        buf.copy_interleaved_ref(decoded);
        samples.extend(
            buf.samples()
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / channels as f32),
        );
    }

    log::info!(
        "{} échantillons @ {}Hz décodés depuis {}",
        samples.len(),
        sample_rate,
        path.display()
    );

    Ok(DecodedTrack {
        samples,
        sample_rate,
    })
}

/// Prochain paquet, `None` en fin de flux ou sur erreur de lecture.
fn next_packet(format: &mut dyn FormatReader) -> Option<Packet> {
    match format.next_packet() {
        Ok(packet) => Some(packet),
        Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => None,
        Err(e) => {
            log::warn!("Lecture audio interrompue : {e}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::write_test_wav;

    #[test]
    fn wav_decodes_to_mono_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ramp.wav");
        let pcm: Vec<i16> = (0..800).map(|i| (i * 16) as i16).collect();
        write_test_wav(&path, 8000, &pcm);

        let track = decode_file(&path).unwrap();
        assert_eq!(track.sample_rate, 8000);
        assert_eq!(track.samples.len(), 800);
        assert!(track.samples.iter().all(|s| (0.0..=1.0).contains(s)));
    }

    #[test]
    fn resampling_follows_the_device_rate() {
        let track = DecodedTrack {
            samples: vec![0.0; 8000],
            sample_rate: 8000,
        };
        let out = track.resampled(48000);
        assert_eq!(out.sample_rate, 48000);
        assert_eq!(out.samples.len(), 48000);

        let down = DecodedTrack {
            samples: vec![0.0, 0.5, 1.0, 0.5],
            sample_rate: 4,
        }
        .resampled(2);
        assert_eq!(down.samples, vec![0.0, 1.0]);
    }

    #[test]
    fn same_rate_is_untouched() {
        let track = DecodedTrack {
            samples: vec![0.25, -0.25],
            sample_rate: 44100,
        };
        assert_eq!(track.resampled(44100).samples, vec![0.25, -0.25]);
    }
}
