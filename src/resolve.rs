//! Resolver tree: per-option decoding strategies
//!
//! Every declared option is bound, once, at schema-compilation time, to a
//! [`Resolver`]: the strategy that turns one raw token value into one
//! typed [`TagValue`]. Resolvers form a small recursive tree — the
//! name-carrier, list, and optional strategies each wrap the resolver of
//! their inner kind — and are stateless after construction, so a compiled
//! plan can share them across every decode call without synchronization.
//!
//! The seven strategies, from most to least specific (the order in which
//! [`Resolver::for_option`] selects them):
//!
//! 1. [`Name`](Resolver::Name) — name-carrier options: an empty value is
//!    replaced by the subject field's own declared name.
//! 2. [`List`](Resolver::List) — bracketed contents re-split with the tag
//!    grammar's own quoting rule, each element resolved by the inner
//!    resolver.
//! 3. [`Boxed`](Resolver::Boxed) — optional kinds: the inner result is
//!    moved into a fresh box.
//! 4. [`Custom`](Resolver::Custom) — a capability supplied by the
//!    declaring type, bound to the innermost non-container kind; the only
//!    open extension point.
//! 5. [`Duration`](Resolver::Duration) — compound elapsed-time literals.
//! 6. [`Flag`](Resolver::Flag) — boolean options, with the bare-flag rule.
//! 7. [`Primitive`](Resolver::Primitive) — everything else, via the value
//!    converter.

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crate::conv::{self, ConversionError};
use crate::duration::parse_duration;
use crate::field::{FieldKind, FieldSpec};
use crate::plan::NAME_KEY;
use crate::scan::{self, ScanError};
use crate::value::TagValue;

/// Opaque error type produced by custom resolution capabilities.
pub type CustomError = Box<dyn std::error::Error + Send + Sync>;

/// Custom resolution capability.
///
/// A type that wishes to own the decoding of its annotation values — any
/// kind this library does not natively understand, or a native kind whose
/// text form the type wants to reinterpret — implements this trait and
/// attaches itself to the declaring field via
/// [`FieldSpec::with_resolver`]. The capability is invoked for top-level
/// options of that kind and for custom element kinds nested inside list
/// and optional options.
pub trait ResolveTagValue: Send + Sync {
    /// Resolves the raw token value `raw`, annotated on the subject field
    /// described by `field`, into a typed value.
    ///
    /// # Errors
    ///
    /// Any error may be returned; the library reports it verbatim as the
    /// resolution failure of the option.
    fn resolve_tag_value(&self, field: &FieldSpec, raw: &str) -> Result<TagValue, CustomError>;
}

/// Enumeration over the ways one option can fail to resolve.
#[derive(Debug)]
pub enum ResolveError {
    /// The raw value was not a well-formed literal of the target kind.
    Conversion(ConversionError),
    /// A list's contents could not be split (unterminated quoting).
    Grammar(ScanError),
    /// A custom capability rejected the value.
    Custom(CustomError),
    /// One element of a list failed to resolve; the whole list fails.
    Element {
        /// Zero-based position of the failing element
        index: usize,
        source: Box<ResolveError>,
    },
}

impl From<ConversionError> for ResolveError {
    fn from(err: ConversionError) -> Self {
        Self::Conversion(err)
    }
}

impl From<ScanError> for ResolveError {
    fn from(err: ScanError) -> Self {
        Self::Grammar(err)
    }
}

impl Display for ResolveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ResolveError::Conversion(err) => Display::fmt(err, f),
            ResolveError::Grammar(err) => Display::fmt(err, f),
            ResolveError::Custom(err) => write!(f, "custom resolver failed: {}", err),
            ResolveError::Element { index, source } => {
                write!(f, "list element {} failed to resolve: {}", index, source)
            }
        }
    }
}

impl std::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolveError::Conversion(err) => Some(err),
            ResolveError::Grammar(err) => Some(err),
            ResolveError::Custom(err) => Some(err.as_ref()),
            ResolveError::Element { source, .. } => Some(source.as_ref()),
        }
    }
}

/// Type alias for `Result` with an error type of [`ResolveError`]
pub type ResolveResult<T> = std::result::Result<T, ResolveError>;

/// One bound decoding strategy.
///
/// See the [module documentation](self) for the selection order and the
/// semantics of each variant.
#[derive(Clone)]
pub enum Resolver {
    /// Name-carrier: substitutes the field's own name for an empty value,
    /// then delegates to the wrapped resolver.
    Name(Box<Resolver>),
    /// Boolean option: a value literally equal to the option's own key is
    /// the bare-flag form and resolves to `true` without conversion.
    Flag {
        /// The option's key, compared against the raw value verbatim
        key: String,
    },
    /// Optional kind: resolves via the inner resolver, then boxes.
    Boxed(Box<Resolver>),
    /// List kind: splits the bracket contents and resolves each element
    /// via the inner resolver.
    List(Box<Resolver>),
    /// Duration kind: the compound magnitude-and-unit grammar.
    Duration,
    /// User-supplied capability; wins over any native leaf strategy.
    Custom(Arc<dyn ResolveTagValue>),
    /// Default strategy: the value converter for the declared kind.
    Primitive(FieldKind),
}

impl Resolver {
    /// Builds the resolver for a declared option of kind `kind` keyed by
    /// `key`, preferring `custom` when a capability is attached.
    ///
    /// The name-carrier key wraps the resolver that would otherwise apply
    /// (built with an empty flag key, so that a boolean name-carrier does
    /// not accidentally treat its substituted value as a bare flag).
    #[must_use]
    pub fn for_option(
        kind: &FieldKind,
        key: &str,
        custom: Option<&Arc<dyn ResolveTagValue>>,
    ) -> Resolver {
        if key == NAME_KEY {
            return Resolver::Name(Box::new(Self::for_option(kind, "", custom)));
        }
        match kind {
            // containers recurse; a capability binds to the element kind
            FieldKind::List(inner) => {
                Resolver::List(Box::new(Self::for_option(inner, key, custom)))
            }
            FieldKind::Optional(inner) => {
                Resolver::Boxed(Box::new(Self::for_option(inner, key, custom)))
            }
            _ => {
                if let Some(hook) = custom {
                    return Resolver::Custom(Arc::clone(hook));
                }
                match kind {
                    FieldKind::Duration => Resolver::Duration,
                    FieldKind::Bool => Resolver::Flag {
                        key: key.to_string(),
                    },
                    other => Resolver::Primitive(other.clone()),
                }
            }
        }
    }

    /// Resolves the raw token value `raw` for the subject field `field`.
    ///
    /// # Errors
    ///
    /// Returns the [`ResolveError`] case describing the failing strategy;
    /// for lists, the first failing element fails the whole list.
    pub fn resolve(&self, field: &FieldSpec, raw: &str) -> ResolveResult<TagValue> {
        match self {
            Resolver::Name(inner) => {
                if raw.is_empty() {
                    inner.resolve(field, field.name())
                } else {
                    inner.resolve(field, raw)
                }
            }
            Resolver::Flag { key } => {
                if raw == key {
                    Ok(TagValue::Bool(true))
                } else {
                    Ok(conv::convert(raw, &FieldKind::Bool)?)
                }
            }
            Resolver::Boxed(inner) => Ok(TagValue::Boxed(Box::new(inner.resolve(field, raw)?))),
            Resolver::List(inner) => {
                let elems = scan::split_list(raw)?;
                let mut out = Vec::with_capacity(elems.len());
                for (index, elem) in elems.iter().enumerate() {
                    let value = inner.resolve(field, elem).map_err(|source| {
                        ResolveError::Element {
                            index,
                            source: Box::new(source),
                        }
                    })?;
                    out.push(value);
                }
                Ok(TagValue::List(out))
            }
            Resolver::Duration => {
                let elapsed = parse_duration(raw).map_err(ConversionError::from)?;
                Ok(TagValue::Duration(elapsed))
            }
            Resolver::Custom(hook) => hook
                .resolve_tag_value(field, raw)
                .map_err(ResolveError::Custom),
            Resolver::Primitive(kind) => Ok(conv::convert(raw, kind)?),
        }
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Resolver::Name(inner) => f.debug_tuple("Name").field(inner).finish(),
            Resolver::Flag { key } => f.debug_struct("Flag").field("key", key).finish(),
            Resolver::Boxed(inner) => f.debug_tuple("Boxed").field(inner).finish(),
            Resolver::List(inner) => f.debug_tuple("List").field(inner).finish(),
            Resolver::Duration => f.write_str("Duration"),
            Resolver::Custom(_) => f.write_str("Custom(..)"),
            Resolver::Primitive(kind) => f.debug_tuple("Primitive").field(kind).finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn subject_field() -> FieldSpec {
        FieldSpec::new("Color", 0, FieldKind::I32)
    }

    #[test]
    fn flag_bare_and_explicit_forms() {
        let resolver = Resolver::for_option(&FieldKind::Bool, "omitempty", None);
        let field = subject_field();
        assert_eq!(
            resolver.resolve(&field, "omitempty").unwrap(),
            TagValue::Bool(true)
        );
        assert_eq!(
            resolver.resolve(&field, "false").unwrap(),
            TagValue::Bool(false)
        );
        assert_eq!(
            resolver.resolve(&field, "true").unwrap(),
            TagValue::Bool(true)
        );
        assert!(resolver.resolve(&field, "not true").is_err());
    }

    #[test]
    fn name_substitutes_field_name_when_empty() {
        let resolver = Resolver::for_option(&FieldKind::String, NAME_KEY, None);
        let field = subject_field();
        assert_eq!(
            resolver.resolve(&field, "").unwrap(),
            TagValue::String("Color".to_string())
        );
        assert_eq!(
            resolver.resolve(&field, "customName").unwrap(),
            TagValue::String("customName".to_string())
        );
    }

    #[test]
    fn boxed_wraps_inner_result() {
        let kind = FieldKind::Optional(Box::new(FieldKind::U16));
        let resolver = Resolver::for_option(&kind, "p", None);
        assert_eq!(
            resolver.resolve(&subject_field(), "42").unwrap(),
            TagValue::Boxed(Box::new(TagValue::U16(42)))
        );
    }

    #[test]
    fn list_resolves_elements_in_order() {
        let kind = FieldKind::List(Box::new(FieldKind::I32));
        let resolver = Resolver::for_option(&kind, "ia", None);
        assert_eq!(
            resolver.resolve(&subject_field(), "-1,2").unwrap(),
            TagValue::List(vec![TagValue::I32(-1), TagValue::I32(2)])
        );
    }

    #[test]
    fn list_element_failure_fails_whole_list() {
        let kind = FieldKind::List(Box::new(FieldKind::I32));
        let resolver = Resolver::for_option(&kind, "ia", None);
        let err = resolver.resolve(&subject_field(), "1,x,3").unwrap_err();
        assert!(matches!(err, ResolveError::Element { index: 1, .. }));
    }

    #[test]
    fn list_of_strings_keeps_quoting_rule() {
        let kind = FieldKind::List(Box::new(FieldKind::String));
        let resolver = Resolver::for_option(&kind, "sa", None);
        assert_eq!(
            resolver
                .resolve(&subject_field(), "'quoted spaces',not quoted spaces,")
                .unwrap(),
            TagValue::List(vec![
                TagValue::String("quoted spaces".to_string()),
                TagValue::String("not quoted spaces".to_string()),
                TagValue::String(String::new()),
            ])
        );
    }

    #[test]
    fn duration_literals() {
        let resolver = Resolver::for_option(&FieldKind::Duration, "d", None);
        assert_eq!(
            resolver.resolve(&subject_field(), "5h").unwrap(),
            TagValue::Duration(Duration::from_secs(5 * 3600))
        );
        assert!(matches!(
            resolver.resolve(&subject_field(), "5x").unwrap_err(),
            ResolveError::Conversion(ConversionError::Duration(_))
        ));
    }

    struct Uppercase;

    impl ResolveTagValue for Uppercase {
        fn resolve_tag_value(&self, _field: &FieldSpec, raw: &str) -> Result<TagValue, CustomError> {
            if raw.is_empty() {
                return Err("empty custom value".into());
            }
            Ok(TagValue::String(raw.to_uppercase()))
        }
    }

    #[test]
    fn custom_capability_takes_precedence() {
        let hook: Arc<dyn ResolveTagValue> = Arc::new(Uppercase);
        let resolver = Resolver::for_option(&FieldKind::String, "ct", Some(&hook));
        assert_eq!(
            resolver.resolve(&subject_field(), "a value").unwrap(),
            TagValue::String("A VALUE".to_string())
        );
        assert!(matches!(
            resolver.resolve(&subject_field(), "").unwrap_err(),
            ResolveError::Custom(_)
        ));
    }

    #[test]
    fn custom_capability_binds_to_list_elements() {
        let kind = FieldKind::List(Box::new(FieldKind::Opaque("shout")));
        // without a hook an opaque element kind cannot resolve at all
        let resolver = Resolver::for_option(&kind, "ca", None);
        assert!(resolver.resolve(&subject_field(), "a").is_err());
        let hook: Arc<dyn ResolveTagValue> = Arc::new(Uppercase);
        let resolver = Resolver::for_option(&kind, "ca", Some(&hook));
        assert_eq!(
            resolver.resolve(&subject_field(), "a,b").unwrap(),
            TagValue::List(vec![
                TagValue::String("A".to_string()),
                TagValue::String("B".to_string()),
            ])
        );
    }
}
