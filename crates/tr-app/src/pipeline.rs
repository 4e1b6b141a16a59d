use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use rayon::prelude::*;
use tr_core::config::RenderConfig;
use tr_core::frame::{GlyphFrame, TerminalSize};
use tr_core::sequence::{Sequence, SequenceMeta, ShadingDescriptor};
use tr_glyph::GlyphMapper;
use tr_sequence::ArtifactSet;
use tr_sequence::artifacts::remove_file_if_exists;
use tr_sequence::codec::write_sequence;
use tr_sequence::meta::write_meta;
use tr_source::frames::list_frames;
use tr_source::image::load_raster;
use tr_source::resize::Resizer;

/// Intervalle de log de progression.
const PROGRESS_EVERY: usize = 100;

/// Convertit toutes les images de `dir` en frames de glyphes.
///
/// Conversion parallèle (un `Resizer` par worker rayon) ; l'ordre du résultat
/// est l'ordre lexicographique des fichiers.
///
/// # Errors
/// Returns an error if the directory is empty or unreadable, or if any
/// image fails to load or map.
pub fn render_directory(
    dir: &Path,
    render: &RenderConfig,
    size: TerminalSize,
) -> Result<Vec<GlyphFrame>> {
    let paths = list_frames(dir)?;
    if paths.is_empty() {
        anyhow::bail!("Aucune image dans {}", dir.display());
    }

    let total = paths.len();
    let mapper = GlyphMapper::new(render.clone(), size);
    let done = AtomicUsize::new(0);
    let quiet = render.quiet;

    let frames = paths
        .par_iter()
        .map_init(Resizer::new, |resizer, path| -> Result<GlyphFrame> {
            let raster = load_raster(path, size, resizer)?;
            let frame = mapper
                .map(&raster)
                .with_context(|| format!("Conversion de {}", path.display()))?;

            let n = done.fetch_add(1, Ordering::Relaxed) + 1;
            if !quiet && (n % PROGRESS_EVERY == 0 || n == total) {
                log::info!(
                    "{n}/{total} frames converties ({:.1}%)",
                    n as f64 / total as f64 * 100.0
                );
            }
            Ok(frame)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(frames)
}

/// Rend `frames_dir` et écrit séquence + métadonnées dans `active`.
///
/// Returns the number of frames written.
///
/// # Errors
/// Any render or write error. A failed render leaves the previous artifacts
/// intact; once writing starts, the old metadata is gone first.
pub fn render_to_artifacts(
    frames_dir: &Path,
    active: &ArtifactSet,
    render: &RenderConfig,
    framerate: u32,
    size: TerminalSize,
) -> Result<usize> {
    let sequence = Sequence {
        frames: render_directory(frames_dir, render, size)?,
        meta: SequenceMeta {
            framerate,
            terminal_size: size,
            color_enabled: render.color_enabled,
            shading: ShadingDescriptor::from_config(render),
        },
    };
    // Jamais une séquence neuve à côté d'un ancien meta.json.
    remove_file_if_exists(&active.meta_path())?;
    write_sequence(&active.sequence_path(), &sequence.frames)?;
    write_meta(&active.meta_path(), &sequence.meta)?;
    log::info!(
        "Séquence : {} frames, {:.1}s à {framerate} fps",
        sequence.len(),
        sequence.nominal_duration().as_secs_f64()
    );
    Ok(sequence.len())
}
