//! Interactive suffix confirmation
//!
//! Suggested → (override)* → range check → collision check → confirmed.
//! A failed range or collision check goes back to the prompt. Port probing
//! happens afterwards and only warns; see [`confirm_continue`].
//!
//! Input and output are injected so the flow runs against in-memory buffers
//! in tests. End of input accepts the current candidate, like pressing Enter,
//! but a candidate that is out of range or still collides fails.

use std::io::{BufRead, Write};
use std::path::Path;

use tracing::debug;

use crate::errors::{Result, SailError};
use crate::output::{paint, Tone};
use crate::port::validate_suffix;
use crate::project::registry::{PortRegistry, Suggestion};
use crate::project::store::RegistryStore;

/// Starting suffix offered on the first run on a host
pub const DEFAULT_FIRST_SUFFIX: u32 = 48;

/// One answer line; None at end of input
fn read_answer<R: BufRead>(input: &mut R) -> Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Range-check a candidate, reporting a failure to `output`
fn check_range<W: Write>(
    value: i64,
    output: &mut W,
) -> Result<std::result::Result<u32, SailError>> {
    match validate_suffix(value) {
        Ok(suffix) => Ok(Ok(suffix)),
        Err(e) => {
            writeln!(output, "{}", paint(Tone::Error, &format!("Invalid suffix: {}", e)))?;
            Ok(Err(e))
        }
    }
}

/// Parse and range-check a typed suffix, reporting problems to `output`
fn parse_suffix<W: Write>(answer: &str, output: &mut W) -> Result<Option<u32>> {
    let Ok(value) = answer.parse::<i64>() else {
        writeln!(output, "{}", paint(Tone::Error, "Invalid suffix. Please enter a number."))?;
        return Ok(None);
    };
    Ok(check_range(value, output)?.ok())
}

/// Ask for the starting suffix on the very first run
///
/// Empty answer or end of input picks [`DEFAULT_FIRST_SUFFIX`].
pub fn prompt_first_suffix<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<u32> {
    writeln!(output, "{}", paint(Tone::Info, "First-ever setup detected."))?;
    loop {
        write!(
            output,
            "Enter the starting port suffix for your projects [default {}]: ",
            DEFAULT_FIRST_SUFFIX
        )?;
        output.flush()?;

        let answer = match read_answer(input)? {
            None => return Ok(DEFAULT_FIRST_SUFFIX),
            Some(answer) if answer.is_empty() => return Ok(DEFAULT_FIRST_SUFFIX),
            Some(answer) => answer,
        };
        if let Some(suffix) = parse_suffix(&answer, output)? {
            return Ok(suffix);
        }
    }
}

/// Run the confirmation loop for `project_dir`
///
/// # Returns
/// The confirmed suffix: in range and not held by another project. Nothing
/// is persisted here.
///
/// # Errors
/// At end of input, `SuffixOutOfRange` or `InputClosed` when the current
/// candidate cannot be confirmed.
pub fn confirm_suffix<S, R, W>(
    registry: &PortRegistry<S>,
    project_dir: &Path,
    suggestion: &Suggestion,
    input: &mut R,
    output: &mut W,
) -> Result<u32>
where
    S: RegistryStore,
    R: BufRead,
    W: Write,
{
    let suggested = if suggestion.is_first_run() {
        prompt_first_suffix(input, output)?
    } else {
        suggestion.suffix
    };

    if suggestion.is_existing_assignment() {
        writeln!(
            output,
            "{}",
            paint(Tone::Info, &format!("Detected existing port suffix: {}", suggested))
        )?;
    }

    let mut candidate = suggested;
    loop {
        write!(
            output,
            "Use suffix [{}]? (Press Enter to confirm, or type new suffix): ",
            candidate
        )?;
        output.flush()?;

        let answer = read_answer(input)?;
        let typed = answer.as_deref().filter(|a| !a.is_empty());

        if let Some(text) = typed {
            match parse_suffix(text, output)? {
                Some(suffix) => candidate = suffix,
                None => continue,
            }
        } else if let Err(e) = check_range(i64::from(candidate), output)? {
            // Suggestions come from the registry or .env and are not range-checked there
            if answer.is_none() {
                return Err(e);
            }
            continue;
        }

        match registry.ensure_available(project_dir, candidate) {
            Ok(()) => {
                debug!(suffix = candidate, "suffix confirmed");
                return Ok(candidate);
            }
            Err(SailError::SuffixCollision { suffix, path }) => {
                writeln!(
                    output,
                    "{}",
                    paint(
                        Tone::Error,
                        &format!(
                            "Error: Suffix {} is already in use by another project:\n{}",
                            suffix, path
                        )
                    )
                )?;
                if answer.is_none() {
                    return Err(SailError::InputClosed);
                }
                if typed.is_none() {
                    candidate = suggested;
                }
            }
            Err(e) => return Err(e),
        }
    }
}

/// Ask "Continue anyway? [y/N]"; only `y`/`Y` continues
pub fn confirm_continue<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> Result<bool> {
    write!(output, "Continue anyway? [y/N]: ")?;
    output.flush()?;
    Ok(matches!(read_answer(input)?.as_deref(), Some("y") | Some("Y")))
}
