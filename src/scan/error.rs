//! Error types used to report failure in tag-grammar scanning
//!
//! This module defines [`ScanError`], the error type shared by every
//! scanning routine in [`scan`](crate::scan), along with the alias
//! [`ScanResult<T>`](ScanResult).
//!
//! A `ScanError` invalidates the entire raw tag string it arose in, not
//! merely the entry being scanned: once quoting or bracketing is known to
//! be malformed, no boundary later in the string can be trusted.

use std::error::Error;
use std::fmt::{Display, Formatter, Result};

/// Enumeration over the grammar-level failures of the tag scanner.
///
/// Both cases carry the byte offset, within the string handed to the
/// failing scan call, at which the offending construct was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanError {
    /// A `'`-quoted value was opened but no unescaped closing `'` was
    /// found before the end of the input.
    UnterminatedQuote {
        /// Byte offset of the opening quote
        at: usize,
    },
    /// A `[`-bracketed value was opened but no unescaped closing `]` was
    /// found before the end of the input.
    UnterminatedBracket {
        /// Byte offset of the opening bracket
        at: usize,
    },
}

impl ScanError {
    /// Shifts the reported offset forward by `base` bytes.
    ///
    /// Scanning routines report offsets relative to the slice they were
    /// handed; callers that scanned from the middle of a larger string use
    /// this to restate the offset in terms of the full input.
    #[inline]
    #[must_use]
    pub fn rebase(self, base: usize) -> Self {
        match self {
            ScanError::UnterminatedQuote { at } => ScanError::UnterminatedQuote { at: at + base },
            ScanError::UnterminatedBracket { at } => {
                ScanError::UnterminatedBracket { at: at + base }
            }
        }
    }
}

impl Display for ScanError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match *self {
            ScanError::UnterminatedQuote { at } => {
                write!(f, "missing end quote for quoted value opened at byte {}", at)
            }
            ScanError::UnterminatedBracket { at } => {
                write!(
                    f,
                    "missing end bracket for bracketed value opened at byte {}",
                    at
                )
            }
        }
    }
}

impl Error for ScanError {}

/// Type alias for `Result` with an error type of [`ScanError`]
pub type ScanResult<T> = std::result::Result<T, ScanError>;
