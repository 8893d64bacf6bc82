//! Schema compilation: declared options to a decoding plan
//!
//! A [`TagPlan`] is the compiled form of one declaring type's annotation
//! schema within one namespace. Compilation walks the declaring shape's
//! field descriptors once, reads each field's option descriptor (carried
//! under the reserved [`OPTION_NAMESPACE`]), validates the schema, and
//! binds one [`Resolver`] per retained option. The result is immutable
//! and safe for unsynchronized concurrent reads, so one plan serves
//! every subsequent decode of every subject type.
//!
//! Option descriptor syntax, inside the `structtag` namespace:
//!
//! ```text
//! structtag = "<key>[,flag]..."
//! ```
//!
//! The first element is the option's key. An absent descriptor defaults
//! the key to the lower-cased field name; an empty first element or the
//! literal `-` drops the field from the schema. The only recognized flag
//! is [`required`](REQUIRED_FLAG). The reserved key [`$name`](NAME_KEY)
//! marks the name-carrier option; its leading `$` keeps it out of the
//! space of keys the tokenizer can ever scan explicitly, so it is only
//! reachable through the position-zero override.

use std::collections::HashMap;

use crate::error::{SchemaError, SchemaResult};
use crate::field::{FieldKind, FieldSpec, TagShape};
use crate::resolve::Resolver;
use crate::value::TagValue;

/// Namespace under which option descriptors are declared.
pub const OPTION_NAMESPACE: &str = "structtag";

/// Descriptor first element that drops a field from the schema.
pub const SKIP_KEY: &str = "-";

/// Descriptor flag marking an option as required on every decoded field.
pub const REQUIRED_FLAG: &str = "required";

/// Reserved key of the name-carrier option.
pub const NAME_KEY: &str = "$name";

/// One compiled option: a key bound to an output slot and a resolver.
#[derive(Debug, Clone)]
pub struct TagOption {
    key: String,
    field_index: usize,
    required: bool,
    resolver: Resolver,
}

impl TagOption {
    /// Returns the option's key.
    #[inline]
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the index of the declaring field, which is also the index
    /// of this option's slot in every decoded record.
    #[inline]
    #[must_use]
    pub fn field_index(&self) -> usize {
        self.field_index
    }

    /// Returns `true` if every decoded field must satisfy this option.
    #[inline]
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the bound resolution strategy.
    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }
}

/// Compiled decoding plan for one declaring shape in one namespace.
#[derive(Debug, Clone)]
pub struct TagPlan {
    namespace: String,
    options: Vec<TagOption>,
    by_key: HashMap<String, usize>,
    has_name: bool,
    required_keys: Vec<String>,
    defaults: Vec<TagValue>,
}

impl TagPlan {
    /// Compiles the annotation schema declared by `O` for the annotation
    /// namespace `namespace`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::DuplicateKey`] when two retained fields
    /// resolve to the same key, and [`SchemaError::UnsupportedKind`] when
    /// a retained field's kind has no native resolution strategy and no
    /// custom capability is attached to it.
    pub fn new<O: TagShape>(namespace: impl Into<String>) -> SchemaResult<Self> {
        let namespace = namespace.into();
        let specs = O::field_specs();

        let mut options = Vec::new();
        let mut by_key: HashMap<String, usize> = HashMap::new();
        let mut has_name = false;
        let mut required_keys = Vec::new();
        let mut defaults = vec![TagValue::Null; specs.len()];

        for spec in &specs {
            if spec.index() < defaults.len() {
                defaults[spec.index()] = TagValue::default_for(spec.kind());
            }
            if !spec.is_exported() && !spec.is_embedded() {
                continue;
            }
            let (key, required) = match declared_key(spec) {
                Some(parts) => parts,
                None => continue,
            };
            // a retained option's index addresses a slot in every decoded record
            if spec.index() >= specs.len() {
                return Err(SchemaError::BadFieldIndex {
                    namespace,
                    field: spec.name().to_string(),
                    index: spec.index(),
                    len: specs.len(),
                });
            }
            if !kind_supported(spec.kind()) && spec.custom_resolver().is_none() {
                return Err(SchemaError::UnsupportedKind {
                    namespace,
                    field: spec.name().to_string(),
                    kind: spec.kind().to_string(),
                });
            }
            if by_key.contains_key(&key) {
                return Err(SchemaError::DuplicateKey { namespace, key });
            }
            if key == NAME_KEY {
                has_name = true;
            }
            let resolver = Resolver::for_option(spec.kind(), &key, spec.custom_resolver());
            if required {
                required_keys.push(key.clone());
            }
            by_key.insert(key.clone(), options.len());
            options.push(TagOption {
                key,
                field_index: spec.index(),
                required,
                resolver,
            });
        }

        Ok(TagPlan {
            namespace,
            options,
            by_key,
            has_name,
            required_keys,
            defaults,
        })
    }

    /// Returns the annotation namespace this plan decodes.
    #[inline]
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns `true` if the schema declares a name-carrier option.
    #[inline]
    #[must_use]
    pub fn has_name_option(&self) -> bool {
        self.has_name
    }

    /// Returns the retained options in declaration order.
    #[inline]
    #[must_use]
    pub fn options(&self) -> &[TagOption] {
        &self.options
    }

    /// Looks up the option bound to `key`, if any.
    #[must_use]
    pub fn option(&self, key: &str) -> Option<&TagOption> {
        self.by_key.get(key).map(|&i| &self.options[i])
    }

    /// Returns the keys of every required option, in declaration order.
    #[inline]
    #[must_use]
    pub fn required_keys(&self) -> &[String] {
        &self.required_keys
    }

    /// Returns a fresh zero-value record, one slot per declaring-shape
    /// field, used to seed each decoded field's output.
    #[must_use]
    pub fn zero_values(&self) -> Vec<TagValue> {
        self.defaults.clone()
    }
}

/// Splits a field's option descriptor into its key and required flag.
///
/// `None` means the field is dropped from the schema.
fn declared_key(spec: &FieldSpec) -> Option<(String, bool)> {
    match spec.tag(OPTION_NAMESPACE) {
        None => Some((spec.name().to_lowercase(), false)),
        Some(descriptor) => {
            let mut parts = descriptor.split(',');
            let key = parts.next().unwrap_or_default();
            if key.is_empty() || key == SKIP_KEY {
                return None;
            }
            let required = parts.any(|flag| flag == REQUIRED_FLAG);
            Some((key.to_string(), required))
        }
    }
}

/// Reports whether a declared kind has a native resolution strategy.
///
/// Containers support one level of nesting over a non-container element
/// kind; anything deeper, and any opaque kind, needs a custom capability.
fn kind_supported(kind: &FieldKind) -> bool {
    match kind {
        FieldKind::Opaque(_) => false,
        FieldKind::List(inner) | FieldKind::Optional(inner) => !matches!(
            inner.as_ref(),
            FieldKind::List(_) | FieldKind::Optional(_) | FieldKind::Opaque(_)
        ),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{CustomError, ResolveTagValue};
    use std::sync::Arc;

    struct BasicOptions;

    impl TagShape for BasicOptions {
        fn field_specs() -> Vec<FieldSpec> {
            vec![
                FieldSpec::new("Name", 0, FieldKind::String).with_tag(OPTION_NAMESPACE, "$name"),
                FieldSpec::new("OmitEmpty", 1, FieldKind::Bool),
                FieldSpec::new("Level", 2, FieldKind::I32)
                    .with_tag(OPTION_NAMESPACE, "level,required"),
                FieldSpec::new("Ignored", 3, FieldKind::String).with_tag(OPTION_NAMESPACE, "-"),
                FieldSpec::new("hidden", 4, FieldKind::String).unexported(),
            ]
        }
    }

    #[test]
    fn compiles_keys_flags_and_defaults() {
        let plan = TagPlan::new::<BasicOptions>("conf").unwrap();
        assert_eq!(plan.namespace(), "conf");
        assert!(plan.has_name_option());
        assert_eq!(plan.options().len(), 3);
        // absent descriptor falls back to the lower-cased field name
        let omit = plan.option("omitempty").unwrap();
        assert_eq!(omit.field_index(), 1);
        assert!(!omit.is_required());
        let level = plan.option("level").unwrap();
        assert!(level.is_required());
        assert_eq!(plan.required_keys(), ["level"]);
        // skipped and unexported fields vanish from the key space
        assert!(plan.option("ignored").is_none());
        assert!(plan.option("hidden").is_none());
        // but every field keeps its zero-value slot
        let zeros = plan.zero_values();
        assert_eq!(zeros.len(), 5);
        assert_eq!(zeros[1], TagValue::Bool(false));
        assert_eq!(zeros[2], TagValue::I32(0));
    }

    struct Clashing;

    impl TagShape for Clashing {
        fn field_specs() -> Vec<FieldSpec> {
            vec![
                FieldSpec::new("A", 0, FieldKind::String).with_tag(OPTION_NAMESPACE, "same"),
                FieldSpec::new("B", 1, FieldKind::I32).with_tag(OPTION_NAMESPACE, "same"),
            ]
        }
    }

    #[test]
    fn duplicate_keys_are_rejected() {
        let err = TagPlan::new::<Clashing>("conf").unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateKey { ref key, .. } if key == "same"));
    }

    struct MisindexedOptions;

    impl TagShape for MisindexedOptions {
        fn field_specs() -> Vec<FieldSpec> {
            vec![FieldSpec::new("A", 5, FieldKind::String)]
        }
    }

    #[test]
    fn out_of_table_indices_are_rejected_at_compile() {
        let err = TagPlan::new::<MisindexedOptions>("conf").unwrap_err();
        assert!(matches!(
            err,
            SchemaError::BadFieldIndex {
                index: 5,
                len: 1,
                ..
            }
        ));
    }

    struct Unresolvable;

    impl TagShape for Unresolvable {
        fn field_specs() -> Vec<FieldSpec> {
            vec![FieldSpec::new(
                "Matrix",
                0,
                FieldKind::List(Box::new(FieldKind::List(Box::new(FieldKind::I32)))),
            )]
        }
    }

    #[test]
    fn nested_lists_need_a_custom_capability() {
        let err = TagPlan::new::<Unresolvable>("conf").unwrap_err();
        assert!(matches!(err, SchemaError::UnsupportedKind { .. }));
    }

    struct Hooked;

    impl ResolveTagValue for Hooked {
        fn resolve_tag_value(&self, _field: &FieldSpec, raw: &str) -> Result<TagValue, CustomError> {
            Ok(TagValue::String(raw.to_string()))
        }
    }

    struct HookedOptions;

    impl TagShape for HookedOptions {
        fn field_specs() -> Vec<FieldSpec> {
            vec![FieldSpec::new("Custom", 0, FieldKind::Opaque("custom"))
                .with_resolver(Arc::new(Hooked))]
        }
    }

    #[test]
    fn capability_makes_opaque_kinds_compile() {
        let plan = TagPlan::new::<HookedOptions>("conf").unwrap();
        assert!(plan.option("custom").is_some());
    }
}
