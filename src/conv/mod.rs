//! Text-to-value conversion for primitive kinds
//!
//! This module is the leaf of the decoding stack: [`convert`] maps one raw
//! text token plus a declared primitive kind to a typed [`TagValue`], or
//! to a [`ConversionError`] describing exactly which literal form was
//! violated. It knows nothing about the tag grammar, resolver tree, or
//! schema; the resolver tree calls it for every primitive-resolved option
//! and for each element of a list.
//!
//! Parsing itself is delegated entirely to the standard library's
//! `FromStr` implementations (and `num-complex`'s, for `a+bi` literals):
//! booleans accept exactly the canonical `true`/`false` spellings,
//! integers are base-10 with per-width range checks, and floats accept
//! standard decimal and scientific notation. The converter's job is only
//! to pick the right parser for the kind and to preserve the library's
//! error as the failure's source.

pub mod error;

pub use error::{ConvResult, ConversionError};

use num_complex::Complex;

use crate::field::FieldKind;
use crate::value::TagValue;

/// Converts the raw token `raw` into a typed value of the primitive kind
/// `kind`.
///
/// `String` conversion is the identity. Compound kinds (`List`,
/// `Optional`), `Duration`, and `Opaque` are not primitive and are
/// rejected with [`ConversionError::Unconvertible`]; resolving those is
/// the resolver tree's business.
///
/// # Errors
///
/// Returns the [`ConversionError`] case matching `kind` when `raw` is not
/// a well-formed literal of that kind, with the underlying parse error
/// retained as its source.
pub fn convert(raw: &str, kind: &FieldKind) -> ConvResult<TagValue> {
    macro_rules! parsed {
        ( $t:ty, $variant:ident, Int ) => {
            raw.parse::<$t>()
                .map(TagValue::$variant)
                .map_err(|source| ConversionError::Int {
                    kind: kind.name(),
                    source,
                })
        };
        ( $t:ty, $variant:ident, Float ) => {
            raw.parse::<$t>()
                .map(TagValue::$variant)
                .map_err(|source| ConversionError::Float {
                    kind: kind.name(),
                    source,
                })
        };
    }

    match kind {
        FieldKind::Bool => raw.parse::<bool>().map(TagValue::Bool).map_err(ConversionError::Bool),
        FieldKind::String => Ok(TagValue::String(raw.to_string())),
        FieldKind::I8 => parsed!(i8, I8, Int),
        FieldKind::I16 => parsed!(i16, I16, Int),
        FieldKind::I32 => parsed!(i32, I32, Int),
        FieldKind::I64 => parsed!(i64, I64, Int),
        FieldKind::U8 => parsed!(u8, U8, Int),
        FieldKind::U16 => parsed!(u16, U16, Int),
        FieldKind::U32 => parsed!(u32, U32, Int),
        FieldKind::U64 => parsed!(u64, U64, Int),
        FieldKind::F32 => parsed!(f32, F32, Float),
        FieldKind::F64 => parsed!(f64, F64, Float),
        FieldKind::Complex64 => raw
            .parse::<Complex<f32>>()
            .map(TagValue::Complex64)
            .map_err(|source| ConversionError::Complex {
                kind: kind.name(),
                source,
            }),
        FieldKind::Complex128 => raw
            .parse::<Complex<f64>>()
            .map(TagValue::Complex128)
            .map_err(|source| ConversionError::Complex {
                kind: kind.name(),
                source,
            }),
        FieldKind::Duration
        | FieldKind::List(_)
        | FieldKind::Optional(_)
        | FieldKind::Opaque(_) => Err(ConversionError::Unconvertible {
            kind: kind.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert_table<const N: usize>(kind: FieldKind, table: [(&str, TagValue); N]) {
        for (raw, expected) in table {
            assert_eq!(
                convert(raw, &kind).unwrap(),
                expected,
                "kind {} raw {:?}",
                kind,
                raw
            );
        }
    }

    #[test]
    fn bool_literals() {
        convert_table(
            FieldKind::Bool,
            [("true", TagValue::Bool(true)), ("false", TagValue::Bool(false))],
        );
        assert!(matches!(
            convert("not true", &FieldKind::Bool),
            Err(ConversionError::Bool(_))
        ));
    }

    #[test]
    fn string_is_identity() {
        convert_table(
            FieldKind::String,
            [("", TagValue::String(String::new())), ("a string", TagValue::String("a string".into()))],
        );
    }

    #[test]
    fn signed_integers() {
        convert_table(FieldKind::I8, [("-1", TagValue::I8(-1)), ("127", TagValue::I8(127))]);
        convert_table(FieldKind::I16, [("3", TagValue::I16(3))]);
        convert_table(FieldKind::I32, [("4", TagValue::I32(4))]);
        convert_table(FieldKind::I64, [("5", TagValue::I64(5))]);
    }

    #[test]
    fn integer_range_checks() {
        assert!(matches!(
            convert("128", &FieldKind::I8),
            Err(ConversionError::Int { kind: "i8", .. })
        ));
        assert!(matches!(
            convert("-1", &FieldKind::U16),
            Err(ConversionError::Int { kind: "u16", .. })
        ));
        assert!(matches!(
            convert("twelve", &FieldKind::U64),
            Err(ConversionError::Int { .. })
        ));
    }

    #[test]
    fn unsigned_integers() {
        convert_table(
            FieldKind::U8,
            [("0", TagValue::U8(0)), ("255", TagValue::U8(255))],
        );
        convert_table(FieldKind::U64, [("5", TagValue::U64(5))]);
    }

    #[test]
    fn floats() {
        convert_table(
            FieldKind::F32,
            [("-1.0", TagValue::F32(-1.0)), ("2e3", TagValue::F32(2000.0))],
        );
        convert_table(FieldKind::F64, [("2", TagValue::F64(2.0))]);
        assert!(matches!(
            convert("2..0", &FieldKind::F64),
            Err(ConversionError::Float { .. })
        ));
    }

    #[test]
    fn complex_literals() {
        convert_table(
            FieldKind::Complex64,
            [("-1", TagValue::Complex64(Complex::new(-1.0, 0.0)))],
        );
        convert_table(
            FieldKind::Complex128,
            [("2+3i", TagValue::Complex128(Complex::new(2.0, 3.0)))],
        );
        assert!(matches!(
            convert("two+3i", &FieldKind::Complex128),
            Err(ConversionError::Complex { .. })
        ));
    }

    #[test]
    fn non_primitive_kinds_are_unconvertible() {
        for kind in [
            FieldKind::Duration,
            FieldKind::List(Box::new(FieldKind::I32)),
            FieldKind::Optional(Box::new(FieldKind::Bool)),
            FieldKind::Opaque("handle"),
        ] {
            assert!(matches!(
                convert("x", &kind),
                Err(ConversionError::Unconvertible { .. })
            ));
        }
    }
}
