use std::io::{self, Write};

use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::queue;
use crossterm::style::ResetColor;
use crossterm::terminal::{Clear, ClearType};
use tr_core::frame::GlyphFrame;
use tr_core::traits::FrameSink;

/// Affichage terminal : chaque frame est réécrite depuis le coin haut-gauche.
///
/// Les frames n'ont pas de séparateur de ligne, le terminal replie à la
/// largeur ; la ligne réservée évite le défilement.
///
/// # Example
/// ```
/// use tr_core::frame::GlyphFrame;
/// use tr_core::traits::FrameSink;
/// use tr_player::sink::TerminalSink;
///
/// let mut sink = TerminalSink::new(Vec::new());
/// sink.clear().unwrap();
/// sink.show(&GlyphFrame::from("##")).unwrap();
/// sink.finish().unwrap();
/// assert!(sink.get_ref().windows(2).any(|w| w == b"##"));
/// ```
#[derive(Debug)]
pub struct TerminalSink<W: Write> {
    out: W,
    active: bool,
}

impl TerminalSink<io::Stdout> {
    /// Sink on standard output.
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> TerminalSink<W> {
    /// Wrap any writer.
    pub fn new(out: W) -> Self {
        Self { out, active: false }
    }

    /// Underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.out
    }
}

impl<W: Write> FrameSink for TerminalSink<W> {
    fn clear(&mut self) -> io::Result<()> {
        self.active = true;
        queue!(self.out, Hide, Clear(ClearType::All), MoveTo(0, 0))?;
        self.out.flush()
    }

    fn show(&mut self, frame: &GlyphFrame) -> io::Result<()> {
        queue!(self.out, MoveTo(0, 0))?;
        self.out.write_all(frame.as_str().as_bytes())?;
        self.out.flush()
    }

    fn finish(&mut self) -> io::Result<()> {
        self.active = false;
        queue!(self.out, ResetColor, Show)?;
        self.out.write_all(b"\r\n")?;
        self.out.flush()
    }
}

/// Restaure le curseur si la lecture s'est interrompue sans `finish`.
impl<W: Write> Drop for TerminalSink<W> {
    fn drop(&mut self) {
        if self.active {
            let _ = self.finish();
        }
    }
}
