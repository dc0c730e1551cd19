//! Overwrite confirmation.
//!
//! Extracting into a non-empty directory mixes new frames with whatever is
//! already there, so [`extract_frames`](crate::extract_frames) asks a
//! [`ConfirmOverwrite`] decision first. The terminal prompt is one
//! implementation; tests and non-interactive callers pass [`AssumeYes`],
//! [`AssumeNo`] or a closure.

use std::io::{self, BufRead, BufReader, Stdin, Stdout, Write};
use std::path::Path;

use crate::error::FramecastError;

/// The only answer that counts as consent. Case-sensitive.
pub const AFFIRMATIVE_ANSWER: &str = "y";

/// Decides whether a non-empty output directory may be written into.
pub trait ConfirmOverwrite {
    /// Return `Ok(true)` to proceed, `Ok(false)` to stop without writing.
    fn confirm(&mut self, directory: &Path) -> Result<bool, FramecastError>;
}

impl<F> ConfirmOverwrite for F
where
    F: FnMut(&Path) -> bool,
{
    fn confirm(&mut self, directory: &Path) -> Result<bool, FramecastError> {
        Ok(self(directory))
    }
}

/// Always proceeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl ConfirmOverwrite for AssumeYes {
    fn confirm(&mut self, _directory: &Path) -> Result<bool, FramecastError> {
        Ok(true)
    }
}

/// Never proceeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeNo;

impl ConfirmOverwrite for AssumeNo {
    fn confirm(&mut self, _directory: &Path) -> Result<bool, FramecastError> {
        Ok(false)
    }
}

/// Whether a line read from the user is consent.
///
/// Only the line terminator is stripped: `"y\n"` is consent, `"Y"`,
/// `" y"` and `"yes"` are not.
pub fn is_affirmative(line: &str) -> bool {
    let answer = line
        .strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(line);
    answer == AFFIRMATIVE_ANSWER
}

/// Asks on a writer and reads one line of answer from a reader.
///
/// End of input counts as a refusal.
#[derive(Debug)]
pub struct LinePrompt<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> LinePrompt<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Give back the reader and writer.
    pub fn into_inner(self) -> (R, W) {
        (self.reader, self.writer)
    }
}

impl LinePrompt<BufReader<Stdin>, Stdout> {
    /// A prompt on the process's stdin and stdout.
    pub fn terminal() -> Self {
        Self::new(BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConfirmOverwrite for LinePrompt<R, W> {
    fn confirm(&mut self, directory: &Path) -> Result<bool, FramecastError> {
        write!(
            self.writer,
            "{} is not empty. Do you want to continue ({AFFIRMATIVE_ANSWER}/n)? ",
            directory.display()
        )?;
        self.writer.flush()?;

        let mut line = String::new();
        let read = self.reader.read_line(&mut line)?;
        let accepted = read > 0 && is_affirmative(&line);
        log::debug!("Overwrite prompt for {directory:?} answered {line:?} (accepted={accepted})");
        Ok(accepted)
    }
}
