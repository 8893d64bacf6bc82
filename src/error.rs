//! Top-level error types
//!
//! Two failure domains exist, and they surface at different times:
//! schema-compilation errors ([`SchemaError`]) are programming mistakes
//! in an annotation declaration, reported once when a plan is first
//! built, while decode errors ([`DecodeError`]) are malformed annotation
//! text on some subject type, reported per decode call. Both wrap the
//! narrower errors of the scanning and resolution layers where one of
//! those is the proximate cause.

use std::fmt::{Display, Formatter};

use crate::resolve::ResolveError;
use crate::scan::ScanError;

/// Enumerated error type for invalid annotation declarations.
///
/// Raised while compiling a declaring type's option table, before any
/// subject type is decoded.
#[derive(Debug)]
pub enum SchemaError {
    /// Two declared options claimed the same key in one namespace.
    DuplicateKey { namespace: String, key: String },
    /// A declared option's kind has no native resolution strategy and no
    /// custom capability was attached.
    UnsupportedKind {
        namespace: String,
        field: String,
        kind: String,
    },
    /// A declared field's ordinal does not fit its own descriptor table.
    BadFieldIndex {
        namespace: String,
        field: String,
        index: usize,
        len: usize,
    },
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SchemaError::DuplicateKey { namespace, key } => {
                write!(f, "namespace `{}`: duplicate option key `{}`", namespace, key)
            }
            SchemaError::UnsupportedKind {
                namespace,
                field,
                kind,
            } => write!(
                f,
                "namespace `{}`: option field `{}` has kind {} with no resolution strategy",
                namespace, field, kind
            ),
            SchemaError::BadFieldIndex {
                namespace,
                field,
                index,
                len,
            } => write!(
                f,
                "namespace `{}`: option field `{}` declares index {} in a table of {} fields",
                namespace, field, index, len
            ),
        }
    }
}

impl std::error::Error for SchemaError {}

/// Type alias for `Result` with an error type of [`SchemaError`]
pub type SchemaResult<T> = std::result::Result<T, SchemaError>;

/// Enumerated error type for malformed annotation text on a subject type.
#[derive(Debug)]
pub enum DecodeError {
    /// A tag could not be split into entries at all; no values from that
    /// tag are usable.
    Grammar {
        /// Name of the subject field carrying the malformed tag
        field: String,
        source: ScanError,
    },
    /// A required option's value was present but failed to resolve.
    Option {
        /// Name of the subject field carrying the failing entry
        field: String,
        /// Key of the option whose value was rejected
        key: String,
        source: ResolveError,
    },
    /// An entry's key matched no declared option.
    ///
    /// Only produced when the `strict_keys` feature is enabled; without
    /// it, unmatched keys are ignored for forward compatibility.
    UnknownKey {
        /// Name of the subject field carrying the entry
        field: String,
        /// The unmatched key
        key: String,
    },
    /// One or more required options never received a usable value.
    MissingRequired {
        /// Name of the subject field missing the options
        field: String,
        /// Every unmet required key, in declaration order
        keys: Vec<String>,
    },
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::Grammar { field, source } => {
                write!(f, "field `{}`: malformed tag: {}", field, source)
            }
            DecodeError::Option { field, key, source } => {
                write!(f, "field `{}`: option `{}`: {}", field, key, source)
            }
            DecodeError::UnknownKey { field, key } => {
                write!(f, "field `{}`: unknown option key `{}`", field, key)
            }
            DecodeError::MissingRequired { field, keys } => {
                write!(
                    f,
                    "field `{}`: missing required option(s): {}",
                    field,
                    keys.join(", ")
                )
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Grammar { source, .. } => Some(source),
            DecodeError::Option { source, .. } => Some(source),
            DecodeError::UnknownKey { .. } | DecodeError::MissingRequired { .. } => None,
        }
    }
}

/// Type alias for `Result` with an error type of [`DecodeError`]
pub type DecodeResult<T> = std::result::Result<T, DecodeError>;
