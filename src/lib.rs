//! oid-collections: identity hashing plus a set and a map that compare
//! their members by identity (`===`) instead of structural equality.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: give every value a cheap, stable identity hash, and build
//!   containers that use it with an identity check to resolve collisions.
//! - Layers:
//!   - `hash`: the `IdentityHash` trait and the hash providers. `Value`
//!     dispatches by kind: numbers hash their bytes, text hashes its
//!     UTF-16 units, booleans/undefined/null are fixed primes, objects
//!     hash their heap handle.
//!   - `Heap`/`ObjectRef`: a generational arena standing in for reference
//!     values. The handle *is* the identity, so no side table of assigned
//!     hashes is needed.
//!   - `BucketTable<K, V>`: hash -> bucket of entries, linear scan inside
//!     a bucket, size counter kept alongside. Shared by both containers.
//!   - `IdentitySet<T>` / `IdentityMap<K, V>`: public API over the table.
//!   - `dedup`: order-preserving filter built only from `IdentitySet::add`.
//!
//! Constraints
//! - Single-threaded: `Rc` in `Value` and the debug scan cell keep the
//!   containers off other threads.
//! - Hashes are 31-bit and non-zero for strings, numbers and references;
//!   they are stable within a process, not across runs, and not unique.
//! - Every container operation is total; absence is reported through
//!   `bool`/`Option` rather than sentinel values.
//!
//! Reentrancy policy
//! - `BucketTable` scans run caller code (`IdentityHash::is_identical`).
//!   Debug builds record the scanning operation and panic, naming it, if
//!   that code re-enters the same table.
//! - Mutating a container while `for_each`/`iter` runs is impossible: the
//!   traversal holds a shared borrow for its whole duration.
//!
//! Notes and non-goals
//! - No structural or deep equality.
//! - Iteration order is unspecified and may change after any mutation.
//! - `NaN` is never identical to itself, so a `NaN` key can be stored but
//!   never found again, matching `===`.

pub mod dedup;
pub mod hash;
pub mod heap;
pub mod identity_map;
pub mod identity_set;
pub mod value;

#[cfg(feature = "bench_internal")]
pub mod bucket_table;
#[cfg(not(feature = "bench_internal"))]
mod bucket_table;

#[cfg(test)]
mod identity_collections_proptest;

// Public surface
pub use dedup::{dedup, dedup_iter};
pub use hash::{
    hash, IdentityHash, FALSE_HASH, HASH_MASK, NULL_HASH, TRUE_HASH, UNDEFINED_HASH,
};
pub use heap::{Heap, Object, ObjectRef, StaleRef};
pub use identity_map::IdentityMap;
pub use identity_set::IdentitySet;
pub use value::{Value, ValueKind};

/// New, empty set of [`Value`]s.
pub fn create_set() -> IdentitySet<Value> {
    IdentitySet::new()
}

/// New, empty map from [`Value`] keys to `V`.
pub fn create_map<V>() -> IdentityMap<Value, V> {
    IdentityMap::new()
}
