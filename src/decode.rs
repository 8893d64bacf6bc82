//! Tag decoding: subject fields against a compiled plan
//!
//! Decoding walks a subject shape's field descriptors in declaration
//! order and, for every exported, non-embedded field that carries an
//! annotation in the plan's namespace, produces one [`FieldTag`]: the
//! field's identity plus one typed value slot per declaring-shape field,
//! seeded with zero values and overwritten as entries resolve.
//!
//! The effective key of each entry is inferred in three steps. The first
//! entry of a tag is forced to the name-carrier key when the schema
//! declares one, overriding any explicit key. An entry without an
//! explicit key otherwise uses its own raw value as its key, which is
//! what makes a bare `omitempty` flag find the `omitempty` option.
//! Everything else uses the explicit key as written.
//!
//! Failure policy: a tokenizer error abandons the whole decode, a
//! required option that is present but fails to resolve abandons it
//! immediately too, and a non-required failure is swallowed, leaving the
//! slot at its zero value. Required keys that never produced a value are
//! reported together, after the field's entries are exhausted, naming
//! every unmet key.

use cfg_if::cfg_if;

use crate::error::{DecodeError, DecodeResult};
use crate::field::{FieldSpec, TagShape};
use crate::plan::{TagPlan, NAME_KEY};
use crate::scan;
use crate::value::TagValue;

/// The decoded annotation record of one subject field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldTag {
    field_name: String,
    field_index: usize,
    values: Vec<TagValue>,
}

impl FieldTag {
    /// Returns the declared name of the subject field.
    #[inline]
    #[must_use]
    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Returns the ordinal of the subject field in its shape.
    #[inline]
    #[must_use]
    pub fn field_index(&self) -> usize {
        self.field_index
    }

    /// Returns every option slot, indexed by declaring-shape field index.
    ///
    /// Slots whose option never resolved hold their kind's zero value.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[TagValue] {
        &self.values
    }

    /// Returns the slot of the option keyed by `key` in `plan`, if that
    /// key is declared.
    #[must_use]
    pub fn value(&self, plan: &TagPlan, key: &str) -> Option<&TagValue> {
        plan.option(key).map(|opt| &self.values[opt.field_index()])
    }
}

impl TagPlan {
    /// Decodes the annotations of subject shape `S` against this plan.
    ///
    /// # Errors
    ///
    /// See [`decode_fields`](TagPlan::decode_fields).
    pub fn decode<S: TagShape>(&self) -> DecodeResult<Vec<FieldTag>> {
        self.decode_fields(&S::field_specs())
    }

    /// Decodes the annotations of an explicit descriptor slice.
    ///
    /// Fields that are unexported, embedded, or carry no annotation in
    /// this plan's namespace are skipped; the output preserves the
    /// declaration order of the remaining fields.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Grammar`] when a field's annotation cannot
    /// be tokenized, [`DecodeError::Option`] when a required option is
    /// present but fails to resolve, and [`DecodeError::MissingRequired`]
    /// when a field's entries are exhausted with required keys unmet.
    /// With the `strict_keys` feature, [`DecodeError::UnknownKey`] is
    /// returned for any entry whose key matches no declared option.
    pub fn decode_fields(&self, fields: &[FieldSpec]) -> DecodeResult<Vec<FieldTag>> {
        let mut out = Vec::new();
        for field in fields {
            if !field.is_exported() || field.is_embedded() {
                continue;
            }
            let raw = match field.tag(self.namespace()) {
                Some(raw) => raw,
                None => continue,
            };
            out.push(self.decode_field(field, raw)?);
        }
        Ok(out)
    }

    fn decode_field(&self, field: &FieldSpec, raw: &str) -> DecodeResult<FieldTag> {
        let tokens = scan::tokenize(raw).map_err(|source| DecodeError::Grammar {
            field: field.name().to_string(),
            source,
        })?;

        let mut values = self.zero_values();
        let mut satisfied: Vec<&str> = Vec::new();

        for (position, token) in tokens.iter().enumerate() {
            let effective_key: &str = if position == 0 && self.has_name_option() {
                NAME_KEY
            } else {
                match &token.key {
                    Some(key) => key,
                    None => &token.raw,
                }
            };
            let option = match self.option(effective_key) {
                Some(option) => option,
                None => {
                    unknown_key(field, effective_key)?;
                    continue;
                }
            };
            match option.resolver().resolve(field, &token.raw) {
                Ok(value) => {
                    values[option.field_index()] = value;
                    if option.is_required() {
                        satisfied.push(option.key());
                    }
                }
                Err(source) => {
                    if option.is_required() {
                        return Err(DecodeError::Option {
                            field: field.name().to_string(),
                            key: option.key().to_string(),
                            source,
                        });
                    }
                    // non-required failures leave the slot at its zero value
                }
            }
        }

        let unmet: Vec<String> = self
            .required_keys()
            .iter()
            .filter(|key| !satisfied.iter().any(|s| *s == key.as_str()))
            .cloned()
            .collect();
        if !unmet.is_empty() {
            return Err(DecodeError::MissingRequired {
                field: field.name().to_string(),
                keys: unmet,
            });
        }

        Ok(FieldTag {
            field_name: field.name().to_string(),
            field_index: field.index(),
            values,
        })
    }
}

cfg_if! {
    if #[cfg(feature = "strict_keys")] {
        fn unknown_key(field: &FieldSpec, key: &str) -> DecodeResult<()> {
            Err(DecodeError::UnknownKey {
                field: field.name().to_string(),
                key: key.to_string(),
            })
        }
    } else {
        // unmatched keys are tolerated for forward compatibility
        fn unknown_key(_field: &FieldSpec, _key: &str) -> DecodeResult<()> {
            Ok(())
        }
    }
}
