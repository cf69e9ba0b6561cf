//! Interactive yes/no confirmation.
//!
//! # Invariants
//! - Re-prompting is a loop bounded by the input: end of input is an error,
//!   never another prompt.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io::{self, BufRead, Write};

const INVALID_ANSWER_HINT: &str = "Please answer with \"y\" or \"n\"";

/// Confirmation prompt failure.
#[derive(Debug)]
pub enum PromptError {
    Io(io::Error),
    /// Input ended before a valid answer was read.
    InputExhausted,
}

impl Display for PromptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read confirmation: {err}"),
            Self::InputExhausted => write!(f, "input ended before a y/n answer was given"),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::InputExhausted => None,
        }
    }
}

impl From<io::Error> for PromptError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

/// Asks `message` until a `y` or `n` answer is read.
pub fn confirm<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> Result<bool, PromptError> {
    let mut answer = String::new();
    loop {
        writeln!(output, "{message} [y/n]")?;
        output.flush()?;

        answer.clear();
        if input.read_line(&mut answer)? == 0 {
            return Err(PromptError::InputExhausted);
        }
        match answer.trim() {
            "y" => return Ok(true),
            "n" => return Ok(false),
            _ => writeln!(output, "{INVALID_ANSWER_HINT}")?,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{confirm, PromptError};
    use std::io::Cursor;

    fn ask(input: &str) -> (Result<bool, PromptError>, String) {
        let mut reader = Cursor::new(input.as_bytes().to_vec());
        let mut output = Vec::new();
        let result = confirm(&mut reader, &mut output, "Delete?");
        (result, String::from_utf8(output).unwrap())
    }

    #[test]
    fn accepts_yes_and_no() {
        assert!(ask("y\n").0.unwrap());
        assert!(!ask("n\n").0.unwrap());
        assert!(ask("  y  \n").0.unwrap());
    }

    #[test]
    fn reprompts_on_invalid_answers() {
        let (result, output) = ask("maybe\n\nyes\nn\n");
        assert!(!result.unwrap());
        assert_eq!(output.matches("Delete? [y/n]").count(), 4);
        assert_eq!(output.matches("Please answer with").count(), 3);
    }

    #[test]
    fn exhausted_input_is_an_error() {
        let (result, _) = ask("what\n");
        assert!(matches!(result, Err(PromptError::InputExhausted)));
        let (result, _) = ask("");
        assert!(matches!(result, Err(PromptError::InputExhausted)));
    }
}
