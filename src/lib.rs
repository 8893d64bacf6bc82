//! Model for declaring and decoding typed struct-tag annotations
//!
//! # Overview
//!
//! This library is a typed decoding layer over the compact annotation
//! strings that field-record shapes carry on their fields, in the style of
//! `namespace:"customName,omitempty,precision=2"`. Such annotations are a
//! dense grammar rather than free text: entries are comma-delimited, may
//! carry an explicit `key=` prefix, and may quote or bracket their values
//! to embed the delimiter characters themselves. Hand-parsing them at
//! every use site produces subtle disagreements about quoting, key
//! inference, and failure handling; `taglia` centralizes those decisions
//! behind one declarative surface.
//!
//! Users describe the annotation vocabulary of a namespace once, as an
//! *option shape*: a field-record whose fields name the recognized keys
//! and declare the target kind of each key's value. Compiling that shape
//! ([`TagPlan::new`]) validates it and binds one resolution strategy per
//! option. The plan then decodes any number of *subject shapes* — the
//! real data structures whose fields carry raw annotation strings — into
//! ordered, fully-typed [`FieldTag`] records, with bare flags, quoted
//! strings, bracketed lists, durations, complex numbers, and custom
//! user-resolved kinds all handled by the same machinery.
//!
//! Because the motivating workload is serialization code that re-reads
//! the same few shapes on every call, [`TagCache`] layers a concurrent
//! memo over a plan: repeat lookups are lock-read cheap, cold shapes are
//! decoded exactly once however many threads race on them, and failed
//! decodes stay uncached so they can be corrected and retried.
//!
//! # Background
//!
//! Shape descriptions enter the library as static descriptor tables: a
//! shape implements [`TagShape`] by returning its ordered [`FieldSpec`]
//! list (name, ordinal, declared [`FieldKind`], per-namespace raw tags,
//! visibility, and an optional custom [`ResolveTagValue`] capability).
//! These tables are cheap to write by hand and are the natural output of
//! codegen or derive machinery; nothing in the library inspects types at
//! run time beyond their [`TypeId`](std::any::TypeId), which keys the
//! cache.
//!
//! The annotation grammar itself lives in [`scan`] as pure cursor
//! functions, value conversion in [`conv`], the compound elapsed-time
//! grammar in [`duration`], and the per-option strategies in [`resolve`].
//! Each layer is usable on its own; the [`plan`], [`decode`], and
//! [`cache`] modules compose them into the three public operations —
//! compile, decode, and cached decode.

pub mod cache;
pub mod conv;
pub mod decode;
pub mod duration;
pub mod error;
pub mod field;
pub mod plan;
pub mod prelude;
pub mod resolve;
pub mod scan;
pub mod value;

pub use crate::cache::{parse_tags_for, TagCache};
pub use crate::decode::FieldTag;
pub use crate::error::{DecodeError, SchemaError};
pub use crate::field::{FieldKind, FieldSpec, TagShape};
pub use crate::plan::{TagPlan, NAME_KEY, OPTION_NAMESPACE, REQUIRED_FLAG, SKIP_KEY};
pub use crate::resolve::{ResolveError, ResolveTagValue, Resolver};
pub use crate::scan::{error::ScanError, TagToken};
pub use crate::value::TagValue;

pub use ::lazy_static::lazy_static;
