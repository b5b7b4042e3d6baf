//! Core trait and error type shared by the block filters.

use thiserror::Error;

use crate::size::SizeError;

#[derive(Error, Debug)]
pub enum BlockError {
    /// An end-of-block line lacked a structurally required field.
    #[error("end-of-block line is missing the `{0}` field")]
    MissingField(&'static str),

    #[error("invalid size field: {0}")]
    Size(#[from] SizeError),
}

/// A stateful per-line filter over the log stream.
///
/// Implementations advance their internal state exactly once per call, so
/// callers must offer every line exactly once, in stream order. The
/// returned string is the exact, newline-complete text to emit for this
/// line; `None` means the line produces no output (absence, not an error).
pub trait LineFilter: Send {
    fn name(&self) -> &str;

    fn filter(&mut self, line: &str) -> Result<Option<String>, BlockError>;
}
