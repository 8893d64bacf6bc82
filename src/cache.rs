//! Decoded-record cache
//!
//! [`TagCache`] pairs a compiled [`TagPlan`] with a memo of decoded
//! subject shapes, keyed by [`TypeId`]. It is built for read-heavy,
//! highly concurrent workloads (the motivating case is serialization
//! code that looks up the same handful of shapes on every call): reads
//! go through a shared [`RwLock`]-guarded map, and misses are
//! deduplicated by an in-flight marker set so that at most one decode
//! per shape runs at a time, however many callers stampede the same
//! cold key. An entry is either absent or fully populated; failed
//! decodes are never stored, so callers can fix a shape's annotations
//! and retry against the same cache.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock};

use crate::decode::FieldTag;
use crate::error::{DecodeResult, SchemaResult};
use crate::field::TagShape;
use crate::plan::TagPlan;

/// A compiled plan plus a concurrent memo of decoded subject shapes.
///
/// `O` is the declaring option shape; its schema is compiled once at
/// construction and shared by every decode the cache performs.
pub struct TagCache<O: TagShape> {
    plan: TagPlan,
    entries: RwLock<HashMap<TypeId, Arc<[FieldTag]>>>,
    in_flight: Mutex<HashSet<TypeId>>,
    done: Condvar,
    _shape: PhantomData<fn() -> O>,
}

impl<O: TagShape> TagCache<O> {
    /// Compiles `O`'s schema for `namespace` and wraps it in an empty
    /// cache.
    ///
    /// # Errors
    ///
    /// Propagates any [`SchemaError`](crate::error::SchemaError) from
    /// plan compilation.
    pub fn new(namespace: impl Into<String>) -> SchemaResult<Self> {
        Ok(TagCache {
            plan: TagPlan::new::<O>(namespace)?,
            entries: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashSet::new()),
            done: Condvar::new(),
            _shape: PhantomData,
        })
    }

    /// Returns the compiled plan.
    #[inline]
    #[must_use]
    pub fn plan(&self) -> &TagPlan {
        &self.plan
    }

    /// Read-only lookup of a previously decoded shape.
    #[must_use]
    pub fn get<S: TagShape>(&self) -> Option<Arc<[FieldTag]>> {
        self.lookup(&TypeId::of::<S>())
    }

    /// Decodes `S` through the plan without touching the memo.
    ///
    /// # Errors
    ///
    /// Propagates any [`DecodeError`](crate::error::DecodeError).
    pub fn decode<S: TagShape>(&self) -> DecodeResult<Vec<FieldTag>> {
        self.plan.decode::<S>()
    }

    /// Returns the decoded record of `S`, decoding and storing it on the
    /// first call.
    ///
    /// Concurrent callers racing on a cold shape are collapsed into one
    /// decode; the losers block until the winner finishes and then read
    /// its stored result (or, if it failed, take their own turn).
    ///
    /// # Errors
    ///
    /// Propagates any [`DecodeError`](crate::error::DecodeError); the
    /// failure is returned to every caller that attempted the decode and
    /// nothing is stored.
    pub fn get_or_decode<S: TagShape>(&self) -> DecodeResult<Arc<[FieldTag]>> {
        let id = TypeId::of::<S>();
        if let Some(hit) = self.lookup(&id) {
            return Ok(hit);
        }

        // claim the decode, or wait out whoever holds the claim
        {
            let mut flying = lock_clean(&self.in_flight);
            loop {
                if let Some(hit) = self.lookup(&id) {
                    return Ok(hit);
                }
                if !flying.contains(&id) {
                    flying.insert(id);
                    break;
                }
                flying = self
                    .done
                    .wait(flying)
                    .unwrap_or_else(PoisonError::into_inner);
            }
        }

        let decoded = self.plan.decode::<S>();
        let result = match decoded {
            Ok(tags) => {
                let entry: Arc<[FieldTag]> = tags.into();
                self.entries
                    .write()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(id, Arc::clone(&entry));
                Ok(entry)
            }
            Err(err) => Err(err),
        };

        let mut flying = lock_clean(&self.in_flight);
        flying.remove(&id);
        drop(flying);
        self.done.notify_all();
        result
    }

    fn lookup(&self, id: &TypeId) -> Option<Arc<[FieldTag]>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }
}

impl<O: TagShape> std::fmt::Debug for TagCache<O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cached = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        f.debug_struct("TagCache")
            .field("namespace", &self.plan.namespace())
            .field("cached_shapes", &cached)
            .finish()
    }
}

/// Locks a mutex, recovering the guard if a holder panicked.
fn lock_clean<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One-shot convenience: compiles `O`'s schema for `namespace` and
/// decodes `S` against it, without retaining a cache.
///
/// # Errors
///
/// Propagates schema and decode errors boxed behind one trait object.
pub fn parse_tags_for<O: TagShape, S: TagShape>(
    namespace: impl Into<String>,
) -> Result<Vec<FieldTag>, Box<dyn std::error::Error + Send + Sync>> {
    let cache = TagCache::<O>::new(namespace)?;
    Ok(cache.decode::<S>()?)
}
