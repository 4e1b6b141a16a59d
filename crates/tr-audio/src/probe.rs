use std::fs::File;
use std::path::Path;
use std::time::Duration;

use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::AudioError;

/// Ouvre et identifie le conteneur d'un fichier audio.
///
/// # Errors
/// [`AudioError::Open`] if the file cannot be opened,
/// [`AudioError::UnsupportedFormat`] if no demuxer recognises it.
pub fn open_format(path: &Path) -> Result<Box<dyn FormatReader>, AudioError> {
    let file = File::open(path).map_err(|source| AudioError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::UnsupportedFormat(e.to_string()))?;

    Ok(probed.format)
}

/// Durée de la piste par défaut, lue dans les en-têtes (pas de décodage).
///
/// `Ok(None)` quand le conteneur ne déclare pas de nombre de frames
/// (MP3 sans en-tête Xing, flux).
///
/// # Errors
/// Same as [`open_format`].
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use tr_audio::probe::probe_duration;
/// let duration = probe_duration(Path::new("assets/audio.mp3")).unwrap();
/// ```
pub fn probe_duration(path: &Path) -> Result<Option<Duration>, AudioError> {
    let format = open_format(path)?;
    let Some(track) = format.default_track() else {
        return Ok(None);
    };
    let params = &track.codec_params;
    let duration = match (params.n_frames, params.sample_rate) {
        (Some(frames), Some(rate)) if rate > 0 => {
            Some(Duration::from_secs_f64(frames as f64 / f64::from(rate)))
        }
        _ => None,
    };
    log::debug!("probe_duration: {duration:?} — {}", path.display());
    Ok(duration)
}

/// Minimal PCM WAV writer shared by the tests of this crate.
#[cfg(test)]
pub(crate) fn write_test_wav(path: &Path, sample_rate: u32, samples: &[i16]) {
    let data_len = (samples.len() * 2) as u32;
    let mut bytes = Vec::with_capacity(44 + samples.len() * 2);
    bytes.extend_from_slice(b"RIFF");
    bytes.extend_from_slice(&(36 + data_len).to_le_bytes());
    bytes.extend_from_slice(b"WAVE");
    bytes.extend_from_slice(b"fmt ");
    bytes.extend_from_slice(&16u32.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.extend_from_slice(&sample_rate.to_le_bytes());
    bytes.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&16u16.to_le_bytes());
    bytes.extend_from_slice(b"data");
    bytes.extend_from_slice(&data_len.to_le_bytes());
    for s in samples {
        bytes.extend_from_slice(&s.to_le_bytes());
    }
    std::fs::write(path, bytes).unwrap();
}
