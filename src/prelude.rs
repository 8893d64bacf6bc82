//! Assorted re-exports covering the common declare-compile-decode flow
//!
//! Pulling this module in with a glob import is enough to declare option
//! and subject shapes, compile a plan, and decode through a cache,
//! without naming the individual modules.

pub use crate::cache::TagCache;
pub use crate::decode::FieldTag;
pub use crate::error::{DecodeError, DecodeResult, SchemaError, SchemaResult};
pub use crate::field::{FieldKind, FieldSpec, TagShape};
pub use crate::plan::{TagPlan, NAME_KEY, OPTION_NAMESPACE, REQUIRED_FLAG, SKIP_KEY};
pub use crate::resolve::{CustomError, ResolveError, ResolveTagValue, Resolver};
pub use crate::value::TagValue;
