//! Interactive destination prompt

use std::io::{BufRead, Write};

use crate::TripBriefError;

pub const PROMPT: &str = "Enter your destination city: ";

/// Ask for the destination once and return the raw line, trimmed.
///
/// End of input and blank lines are validation errors; everything else is
/// left to the input guardrail.
pub fn prompt_destination<R: BufRead, W: Write>(
    reader: &mut R,
    writer: &mut W,
) -> crate::Result<String> {
    write!(writer, "{PROMPT}")?;
    writer.flush()?;

    let mut line = String::new();
    let read = reader.read_line(&mut line)?;
    let city = line.trim();

    if read == 0 || city.is_empty() {
        return Err(TripBriefError::validation("City name cannot be empty."));
    }

    Ok(city.to_string())
}
