// Invites utilisateur sur stdin. Nombre d'essais borné, pas de récursion :
// après MAX_ATTEMPTS réponses illisibles, la réponse est « non ».

use std::io::{self, BufRead, Write};

const MAX_ATTEMPTS: usize = 3;

/// Question oui/non, défaut non.
///
/// EOF or too many unreadable answers count as "no".
///
/// # Errors
/// Returns any read/write error on the streams.
pub fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    question: &str,
) -> io::Result<bool> {
    for _ in 0..MAX_ATTEMPTS {
        write!(output, "{question} [y/N]: ")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(false);
        }
        match parse_answer(&line) {
            Some(answer) => return Ok(answer),
            None => writeln!(output, "Répondez par y ou n.")?,
        }
    }
    Ok(false)
}

/// Affiche `message` et attend une ligne (Entrée).
///
/// # Errors
/// Returns any read/write error on the streams.
pub fn wait_for_enter<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> io::Result<()> {
    write!(output, "{message}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(())
}

/// [`confirm`] on the process stdin/stdout.
///
/// # Errors
/// Returns any terminal I/O error.
pub fn confirm_stdin(question: &str) -> io::Result<bool> {
    confirm(&mut io::stdin().lock(), &mut io::stdout(), question)
}

fn parse_answer(line: &str) -> Option<bool> {
    match line.trim().to_lowercase().as_str() {
        "" | "n" | "no" | "non" | "f" | "false" | "0" => Some(false),
        "y" | "yes" | "o" | "oui" | "t" | "true" | "1" => Some(true),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn ask(input: &str) -> (bool, String) {
        let mut out = Vec::new();
        let answer = confirm(&mut Cursor::new(input), &mut out, "Écraser ?").unwrap();
        (answer, String::from_utf8(out).unwrap())
    }

    #[test]
    fn yes_and_no() {
        assert!(ask("y\n").0);
        assert!(ask("  Oui \n").0);
        assert!(!ask("n\n").0);
    }

    #[test]
    fn empty_answer_defaults_to_no() {
        assert!(!ask("\n").0);
        assert!(!ask("").0);
    }

    #[test]
    fn retries_are_bounded() {
        let (answer, out) = ask("peut-être\nbof\n???\ny\n");
        assert!(!answer);
        assert_eq!(out.matches("[y/N]").count(), MAX_ATTEMPTS);
    }

    #[test]
    fn retry_then_accept() {
        let (answer, out) = ask("hmm\nyes\n");
        assert!(answer);
        assert_eq!(out.matches("Répondez").count(), 1);
    }

    #[test]
    fn enter_consumes_one_line() {
        let mut input = Cursor::new("\nreste");
        let mut out = Vec::new();
        wait_for_enter(&mut input, &mut out, "[PRÊT] ").unwrap();
        assert_eq!(out, b"[PR\xc3\x8aT] ");
        let mut rest = String::new();
        input.read_line(&mut rest).unwrap();
        assert_eq!(rest, "reste");
    }
}
