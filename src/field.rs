//! Field descriptors and shape declarations
//!
//! The original motivation for this library is decoding the same annotation
//! grammar across many record types. Rather than discovering a record's
//! fields through runtime introspection on every call, a shape declares its
//! fields exactly once as an explicit descriptor table: the [`TagShape`]
//! trait hands back an ordered [`Vec<FieldSpec>`], one entry per field,
//! carrying everything the schema compiler and decoder ever need to know
//! about that field.
//!
//! Both *option shapes* (the record describing which annotation keys exist
//! and their target kinds) and *subject shapes* (the records whose fields
//! carry raw annotation strings) are declared this way; the two roles read
//! different parts of the descriptor.
//!
//! Downstream code generation or derive machinery may emit these tables,
//! but nothing in this crate requires it; hand-written tables are a few
//! lines per shape.

use std::sync::Arc;

use crate::resolve::ResolveTagValue;

/// The declared value-kind of one field.
///
/// The grammar is intentionally one level deep: `List` and `Optional` wrap
/// an element kind, but lists of lists, multi-dimensional sequences, and
/// the like are not expressible without a custom resolver capability.
///
/// `Opaque` stands in for every kind this library does not natively decode
/// (associative maps, nested records, closures, raw handles, ...). It
/// carries a short human-readable name used purely for diagnostics.
/// Declaring an `Opaque` field without attaching a custom resolver
/// capability is a schema error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    String,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
    Complex64,
    Complex128,
    Duration,
    /// One-dimensional sequence of the element kind
    List(Box<FieldKind>),
    /// Optional (boxed) value of the pointee kind
    Optional(Box<FieldKind>),
    /// Any kind the library does not natively understand
    Opaque(&'static str),
}

impl FieldKind {
    /// Returns `true` for the scalar kinds handled directly by the value
    /// converter, i.e. everything except `List`, `Optional`, `Duration`,
    /// and `Opaque`.
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        !matches!(
            self,
            FieldKind::List(_) | FieldKind::Optional(_) | FieldKind::Duration | FieldKind::Opaque(_)
        )
    }

    /// Short name of the kind, as used in error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::String => "string",
            FieldKind::I8 => "i8",
            FieldKind::I16 => "i16",
            FieldKind::I32 => "i32",
            FieldKind::I64 => "i64",
            FieldKind::U8 => "u8",
            FieldKind::U16 => "u16",
            FieldKind::U32 => "u32",
            FieldKind::U64 => "u64",
            FieldKind::F32 => "f32",
            FieldKind::F64 => "f64",
            FieldKind::Complex64 => "complex64",
            FieldKind::Complex128 => "complex128",
            FieldKind::Duration => "duration",
            FieldKind::List(_) => "list",
            FieldKind::Optional(_) => "optional",
            FieldKind::Opaque(name) => name,
        }
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::List(inner) => write!(f, "list of {}", inner),
            FieldKind::Optional(inner) => write!(f, "optional {}", inner),
            _ => f.write_str(self.name()),
        }
    }
}

/// Descriptor for one field of a declared shape.
///
/// A `FieldSpec` is the static analogue of a reflected struct field: its
/// name, ordinal position, declared value-kind, the raw tag strings it
/// carries per namespace, visibility flags, and (optionally) a custom
/// resolution capability owned by the field's type.
///
/// Constructed with [`new`](Self::new) followed by the builder-style
/// `with_*` methods:
///
/// ```
/// # use taglia::field::{FieldKind, FieldSpec};
/// let spec = FieldSpec::new("Name", 0, FieldKind::String)
///     .with_tag("structtag", "$name")
///     .with_tag("doc", "display name");
/// assert_eq!(spec.tag("structtag"), Some("$name"));
/// assert_eq!(spec.tag("other"), None);
/// ```
#[derive(Clone)]
pub struct FieldSpec {
    name: String,
    index: usize,
    kind: FieldKind,
    tags: Vec<(String, String)>,
    exported: bool,
    embedded: bool,
    custom: Option<Arc<dyn ResolveTagValue>>,
}

impl FieldSpec {
    /// Constructs a descriptor for an exported, non-embedded field with no
    /// tags and no custom capability.
    #[must_use]
    pub fn new(name: impl Into<String>, index: usize, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            index,
            kind,
            tags: Vec::new(),
            exported: true,
            embedded: false,
            custom: None,
        }
    }

    /// Attaches the raw tag string `raw` under the namespace `namespace`.
    ///
    /// Declaring the same namespace twice keeps the first entry, matching
    /// the first-wins lookup of [`tag`](Self::tag).
    #[must_use]
    pub fn with_tag(mut self, namespace: impl Into<String>, raw: impl Into<String>) -> Self {
        self.tags.push((namespace.into(), raw.into()));
        self
    }

    /// Marks the field as unexported. Unexported fields are skipped when
    /// decoding subject shapes.
    #[must_use]
    pub fn unexported(mut self) -> Self {
        self.exported = false;
        self
    }

    /// Marks the field as embedded.
    #[must_use]
    pub fn embedded(mut self) -> Self {
        self.embedded = true;
        self
    }

    /// Attaches the custom resolution capability owned by the field's
    /// type. Mandatory for `Opaque` kinds; optional (and overriding) for
    /// every other kind.
    #[must_use]
    pub fn with_resolver(mut self, hook: Arc<dyn ResolveTagValue>) -> Self {
        self.custom = Some(hook);
        self
    }

    /// The field's declared name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The field's ordinal position within its shape.
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The field's declared value-kind.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Looks up the raw tag string declared under `namespace`, if any.
    #[must_use]
    pub fn tag(&self, namespace: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(ns, _)| ns == namespace)
            .map(|(_, raw)| raw.as_str())
    }

    /// Whether the field is exported.
    #[inline]
    #[must_use]
    pub fn is_exported(&self) -> bool {
        self.exported
    }

    /// Whether the field is embedded.
    #[inline]
    #[must_use]
    pub fn is_embedded(&self) -> bool {
        self.embedded
    }

    /// The custom resolution capability attached to this field, if any.
    #[must_use]
    pub fn custom_resolver(&self) -> Option<&Arc<dyn ResolveTagValue>> {
        self.custom.as_ref()
    }
}

impl std::fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("index", &self.index)
            .field("kind", &self.kind)
            .field("tags", &self.tags)
            .field("exported", &self.exported)
            .field("embedded", &self.embedded)
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

/// Declared field-record shape.
///
/// Implementors are record types whose fields are known statically; the
/// descriptor table returned by [`field_specs`](Self::field_specs) must be
/// the same on every call (it is treated as immutable shape metadata and
/// memoized downstream). The `'static` bound gives every shape a stable
/// identity via [`std::any::TypeId`], which is what the decoded-record
/// cache keys on.
pub trait TagShape: 'static {
    /// The ordered descriptor table for this shape, one entry per field.
    fn field_specs() -> Vec<FieldSpec>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_lookup_is_first_wins() {
        let spec = FieldSpec::new("F", 3, FieldKind::Bool)
            .with_tag("test", "b")
            .with_tag("test", "shadowed");
        assert_eq!(spec.tag("test"), Some("b"));
        assert_eq!(spec.index(), 3);
    }

    #[test]
    fn kind_display() {
        assert_eq!(FieldKind::List(Box::new(FieldKind::I32)).to_string(), "list of i32");
        assert_eq!(
            FieldKind::Optional(Box::new(FieldKind::String)).to_string(),
            "optional string"
        );
        assert_eq!(FieldKind::Opaque("matrix").to_string(), "matrix");
    }
}
