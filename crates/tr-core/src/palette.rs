use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Nombre de niveaux de la palette d'ombrage.
pub const PALETTE_LEVELS: usize = 5;

/// Bloc plein utilisé quand l'ombrage est désactivé.
pub const SOLID_BLOCK: char = '\u{2588}';

/// Palette historique, du plus sombre au plus clair.
pub const DEFAULT_PALETTE: [char; PALETTE_LEVELS] = [' ', '.', ':', '=', '#'];

/// Five glyphs ordered darkest → brightest.
///
/// Multi-character entries are truncated to their first character when the
/// palette is built, never at render time.
///
/// # Example
/// ```
/// use tr_core::palette::ShadingPalette;
/// let palette = ShadingPalette::from_entries(&[" ", "..", ":", "=", "#"]).unwrap();
/// assert_eq!(palette.glyph(1), Some('.'));
/// assert_eq!(palette.glyph(4), Some('#'));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct ShadingPalette {
    glyphs: [char; PALETTE_LEVELS],
}

impl ShadingPalette {
    /// Construit une palette depuis des entrées textuelles.
    ///
    /// # Errors
    /// [`CoreError::Config`] si le nombre d'entrées n'est pas 5, si une entrée
    /// est vide ou commence par un caractère de contrôle (saut de ligne inclus).
    pub fn from_entries<S: AsRef<str>>(entries: &[S]) -> Result<Self, CoreError> {
        if entries.len() != PALETTE_LEVELS {
            return Err(CoreError::Config(format!(
                "la palette doit contenir {PALETTE_LEVELS} caractères, reçu {}",
                entries.len()
            )));
        }
        let mut glyphs = [' '; PALETTE_LEVELS];
        for (slot, entry) in glyphs.iter_mut().zip(entries) {
            let entry = entry.as_ref();
            let Some(ch) = entry.chars().next() else {
                return Err(CoreError::Config("entrée de palette vide".into()));
            };
            if ch.is_control() {
                return Err(CoreError::Config(format!(
                    "caractère de contrôle interdit dans la palette : {ch:?}"
                )));
            }
            if entry.chars().count() > 1 {
                log::debug!("Palette : '{entry}' tronqué à '{ch}'");
            }
            *slot = ch;
        }
        Ok(Self { glyphs })
    }

    /// Parse a compact five-character string such as `" .:=#"`.
    ///
    /// # Errors
    /// Same conditions as [`ShadingPalette::from_entries`].
    pub fn parse(compact: &str) -> Result<Self, CoreError> {
        let entries: Vec<String> = compact.chars().map(String::from).collect();
        Self::from_entries(&entries)
    }

    /// Glyph for a bucket index, `None` outside 0..5.
    #[inline]
    #[must_use]
    pub fn glyph(&self, bucket: usize) -> Option<char> {
        self.glyphs.get(bucket).copied()
    }

    /// All five glyphs.
    #[must_use]
    pub fn glyphs(&self) -> [char; PALETTE_LEVELS] {
        self.glyphs
    }
}

impl Default for ShadingPalette {
    fn default() -> Self {
        Self {
            glyphs: DEFAULT_PALETTE,
        }
    }
}

impl TryFrom<Vec<String>> for ShadingPalette {
    type Error = CoreError;

    fn try_from(entries: Vec<String>) -> Result<Self, Self::Error> {
        Self::from_entries(&entries)
    }
}

impl From<ShadingPalette> for Vec<String> {
    fn from(palette: ShadingPalette) -> Self {
        palette.glyphs.iter().map(char::to_string).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_multi_char_entries() {
        let p = ShadingPalette::from_entries(&["ab", "cd", "e", "f", "gh"]).unwrap();
        assert_eq!(p.glyphs(), ['a', 'c', 'e', 'f', 'g']);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(ShadingPalette::from_entries(&["a", "b"]).is_err());
        assert!(ShadingPalette::parse(" .:=#@").is_err());
    }

    #[test]
    fn rejects_empty_and_control_entries() {
        assert!(ShadingPalette::from_entries(&["", ".", ":", "=", "#"]).is_err());
        assert!(ShadingPalette::from_entries(&["\n", ".", ":", "=", "#"]).is_err());
    }

    #[test]
    fn parse_compact_form() {
        let p = ShadingPalette::parse(" .:=#").unwrap();
        assert_eq!(p, ShadingPalette::default());
    }

    #[test]
    fn glyph_out_of_range_is_none() {
        assert_eq!(ShadingPalette::default().glyph(5), None);
    }
}
