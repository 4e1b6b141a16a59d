use std::fmt::Write;

/// Ajoute l'escape ANSI truecolor de premier plan pour `(r, g, b)`.
///
/// # Example
/// ```
/// use tr_glyph::escape::push_foreground;
/// let mut out = String::new();
/// push_foreground(&mut out, 10, 200, 30);
/// assert_eq!(out, "\x1b[38;2;10;200;30m");
/// ```
#[inline]
pub fn push_foreground(out: &mut String, r: u8, g: u8, b: u8) {
    // Writing into a String cannot fail.
    let _ = write!(out, "\x1b[38;2;{r};{g};{b}m");
}

/// Length in bytes of the longest foreground escape.
pub const MAX_ESCAPE_LEN: usize = "\x1b[38;2;255;255;255m".len();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_uses_exact_channels() {
        let mut out = String::new();
        push_foreground(&mut out, 0, 0, 0);
        assert_eq!(out, "\x1b[38;2;0;0;0m");
        out.clear();
        push_foreground(&mut out, 255, 255, 255);
        assert_eq!(out.len(), MAX_ESCAPE_LEN);
    }
}
