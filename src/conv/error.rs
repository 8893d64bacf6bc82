//! Error type for text-to-value conversion
//!
//! [`ConversionError`] covers every way a raw text token can fail to
//! become a typed value: malformed boolean, integer, floating-point,
//! complex, and duration literals, plus the catch-all case of asking the
//! converter for a kind it does not handle. The underlying standard
//! library (or `num-complex`) parse error is preserved as the
//! [`source`](std::error::Error::source) wherever one exists.

use std::error::Error;
use std::fmt::{Display, Formatter, Result};
use std::num::{ParseFloatError, ParseIntError};
use std::str::ParseBoolError;

use num_complex::ParseComplexError;

use crate::duration::DurationError;

/// Enumeration over the failure modes of [`convert`](crate::conv::convert)
/// and of the duration grammar.
#[derive(Debug)]
pub enum ConversionError {
    /// The token is not a canonical `true`/`false` spelling.
    Bool(ParseBoolError),
    /// The token is not a base-10 integer within the width of `kind`.
    Int {
        kind: &'static str,
        source: ParseIntError,
    },
    /// The token is not a decimal or scientific floating-point literal.
    Float {
        kind: &'static str,
        source: ParseFloatError,
    },
    /// The token is not an `a+bi`-form complex literal.
    Complex {
        kind: &'static str,
        source: ParseComplexError<ParseFloatError>,
    },
    /// The token is not a well-formed compound duration.
    Duration(DurationError),
    /// The converter was asked for a kind it has no conversion for.
    Unconvertible { kind: String },
}

impl From<DurationError> for ConversionError {
    fn from(err: DurationError) -> Self {
        Self::Duration(err)
    }
}

impl Display for ConversionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ConversionError::Bool(err) => {
                write!(f, "invalid boolean literal: {}", err)
            }
            ConversionError::Int { kind, source } => {
                write!(f, "invalid {} literal: {}", kind, source)
            }
            ConversionError::Float { kind, source } => {
                write!(f, "invalid {} literal: {}", kind, source)
            }
            ConversionError::Complex { kind, source } => {
                write!(f, "invalid {} literal: {}", kind, source)
            }
            ConversionError::Duration(err) => Display::fmt(err, f),
            ConversionError::Unconvertible { kind } => {
                write!(f, "no conversion from text to kind: {}", kind)
            }
        }
    }
}

impl Error for ConversionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ConversionError::Bool(err) => Some(err),
            ConversionError::Int { source, .. } => Some(source),
            ConversionError::Float { source, .. } => Some(source),
            ConversionError::Complex { source, .. } => Some(source),
            ConversionError::Duration(err) => Some(err),
            ConversionError::Unconvertible { .. } => None,
        }
    }
}

/// Type alias for `Result` with an error type of [`ConversionError`]
pub type ConvResult<T> = std::result::Result<T, ConversionError>;
