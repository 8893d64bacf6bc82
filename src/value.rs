//! Typed values produced by tag decoding
//!
//! [`TagValue`] is the closed sum of every value the resolver tree can
//! produce: the primitive kinds handled by the value converter, elapsed
//! times, one-level lists, boxed optional values, and `Null` (the zero
//! value of optional and custom kinds).
//!
//! Every declared kind has a well-defined *zero value*, produced by
//! [`TagValue::default_for`]; decoded field records start out populated
//! with the zero value of every declared option, and only the options that
//! actually resolve overwrite their slot.

use std::time::Duration;

use num_complex::Complex;

use crate::field::FieldKind;

/// One decoded, typed tag-option value.
///
/// The `Complex64`/`Complex128` naming follows the declared kinds: total
/// width, so `Complex64` carries two `f32` components.
#[derive(Debug, Clone, PartialEq)]
pub enum TagValue {
    Bool(bool),
    String(String),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
    Complex64(Complex<f32>),
    Complex128(Complex<f64>),
    Duration(Duration),
    /// Ordered elements of a list-kinded option
    List(Vec<TagValue>),
    /// Present value of an optional-kinded option
    Boxed(Box<TagValue>),
    /// Zero value of optional and custom kinds
    Null,
}

impl TagValue {
    /// The zero value used to pre-populate an option slot of the given
    /// declared kind before any token resolves into it.
    #[must_use]
    pub fn default_for(kind: &FieldKind) -> Self {
        match kind {
            FieldKind::Bool => TagValue::Bool(false),
            FieldKind::String => TagValue::String(String::new()),
            FieldKind::I8 => TagValue::I8(0),
            FieldKind::I16 => TagValue::I16(0),
            FieldKind::I32 => TagValue::I32(0),
            FieldKind::I64 => TagValue::I64(0),
            FieldKind::U8 => TagValue::U8(0),
            FieldKind::U16 => TagValue::U16(0),
            FieldKind::U32 => TagValue::U32(0),
            FieldKind::U64 => TagValue::U64(0),
            FieldKind::F32 => TagValue::F32(0.0),
            FieldKind::F64 => TagValue::F64(0.0),
            FieldKind::Complex64 => TagValue::Complex64(Complex::new(0.0, 0.0)),
            FieldKind::Complex128 => TagValue::Complex128(Complex::new(0.0, 0.0)),
            FieldKind::Duration => TagValue::Duration(Duration::ZERO),
            FieldKind::List(_) => TagValue::List(Vec::new()),
            FieldKind::Optional(_) | FieldKind::Opaque(_) => TagValue::Null,
        }
    }

    /// Returns the contained `bool`, if this is a `Bool`.
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match *self {
            TagValue::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the contained string slice, if this is a `String`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TagValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the contained elements, if this is a `List`.
    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[TagValue]> {
        match self {
            TagValue::List(elems) => Some(elems),
            _ => None,
        }
    }

    /// Returns the contained elapsed time, if this is a `Duration`.
    #[inline]
    #[must_use]
    pub fn as_duration(&self) -> Option<Duration> {
        match *self {
            TagValue::Duration(d) => Some(d),
            _ => None,
        }
    }

    /// Returns `true` if this is `Null`.
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, TagValue::Null)
    }

    /// Strips one level of `Boxed`, if present.
    ///
    /// Non-boxed values are returned unchanged, so this is safe to chain
    /// after lookups on optional-kinded options regardless of whether the
    /// option resolved.
    #[must_use]
    pub fn unboxed(&self) -> &TagValue {
        match self {
            TagValue::Boxed(inner) => inner,
            other => other,
        }
    }
}
