//! BucketTable: identity-hash buckets with linear scan inside a bucket.
//!
//! Each distinct identity hash owns one bucket, a small vector of entries.
//! Lookups pick the bucket by hash and then compare keys with
//! [`IdentityHash::is_identical`], so colliding keys simply share a bucket.
//! Empty buckets are retired as soon as their last entry leaves.

use crate::hash::IdentityHash;
use hashbrown::hash_table::{self, HashTable};
#[cfg(debug_assertions)]
use core::cell::Cell;
#[cfg(not(debug_assertions))]
use core::marker::PhantomData;

// Identity hashes use only the low 31 bits; spread them over the full word
// so the table's control bytes see varied high bits.
const SPREAD: u64 = 0x9e37_79b9_7f4a_7c15;

#[inline]
fn spread(hash: u32) -> u64 {
    u64::from(hash).wrapping_mul(SPREAD)
}

// Scans call back into `IdentityHash::is_identical`. Debug builds record
// the operation currently scanning, so a comparison that reaches back into
// the same table panics naming both operations. Release builds keep nothing.
#[cfg(debug_assertions)]
type ScanSlot = Cell<Option<&'static str>>;
#[cfg(not(debug_assertions))]
type ScanSlot = ();

#[cfg(debug_assertions)]
struct ScanMark<'a>(&'a ScanSlot);

#[cfg(not(debug_assertions))]
struct ScanMark<'a>(PhantomData<&'a ()>);

#[cfg(debug_assertions)]
fn enter_scan<'a>(slot: &'a ScanSlot, op: &'static str) -> ScanMark<'a> {
    if let Some(running) = slot.replace(Some(op)) {
        panic!(
            "bucket_table: `{}` re-entered the table while `{}` was comparing keys",
            op, running
        );
    }
    ScanMark(slot)
}

#[cfg(not(debug_assertions))]
#[inline(always)]
fn enter_scan<'a>(_slot: &'a ScanSlot, _op: &'static str) -> ScanMark<'a> {
    ScanMark(PhantomData)
}

#[cfg(debug_assertions)]
impl Drop for ScanMark<'_> {
    fn drop(&mut self) {
        self.0.set(None);
    }
}

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

#[derive(Debug)]
struct Bucket<K, V> {
    hash: u32,
    entries: Vec<Entry<K, V>>,
}

pub struct BucketTable<K, V> {
    buckets: HashTable<Bucket<K, V>>,
    len: usize, // live entries across all buckets
    scanning: ScanSlot,
}

impl<K, V> Default for BucketTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> BucketTable<K, V> {
    pub fn new() -> Self {
        Self {
            buckets: HashTable::new(),
            len: 0,
            scanning: Default::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of distinct hashes currently holding entries.
    #[cfg(any(test, feature = "bench_internal"))]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn clear(&mut self) {
        self.buckets.clear();
        self.len = 0;
    }

    /// Visit every entry once. Buckets and entries come in no particular order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: self.buckets.iter(),
            entries: <&[Entry<K, V>]>::default().iter(),
            remaining: self.len,
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            buckets: self.buckets.iter_mut(),
            entries: <&mut [Entry<K, V>]>::default().iter_mut(),
            remaining: self.len,
        }
    }
}

impl<K, V> BucketTable<K, V>
where
    K: IdentityHash,
{
    pub fn get(&self, key: &K) -> Option<(&K, &V)> {
        let _scan = enter_scan(&self.scanning, "get");
        let hash = key.identity_hash();
        let bucket = self.buckets.find(spread(hash), |b| b.hash == hash)?;
        bucket
            .entries
            .iter()
            .rev()
            .find(|e| e.key.is_identical(key))
            .map(|e| (&e.key, &e.value))
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let _scan = enter_scan(&self.scanning, "get_mut");
        let hash = key.identity_hash();
        let bucket = self.buckets.find_mut(spread(hash), |b| b.hash == hash)?;
        bucket
            .entries
            .iter_mut()
            .rev()
            .find(|e| e.key.is_identical(key))
            .map(|e| &mut e.value)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Add a new entry. If an identical key is already present nothing
    /// changes and the rejected pair is handed back.
    pub fn insert(&mut self, key: K, value: V) -> Result<(), (K, V)> {
        let _scan = enter_scan(&self.scanning, "insert");
        let hash = key.identity_hash();
        let bucket = Self::bucket_for(&mut self.buckets, hash);
        if bucket.entries.iter().any(|e| e.key.is_identical(&key)) {
            return Err((key, value));
        }
        bucket.entries.push(Entry { key, value });
        self.len += 1;
        Ok(())
    }

    /// Add a new entry or overwrite the value of the identical key already
    /// present, returning the value it had. The stored key is kept.
    pub fn replace(&mut self, key: K, value: V) -> Option<V> {
        let _scan = enter_scan(&self.scanning, "replace");
        let hash = key.identity_hash();
        let bucket = Self::bucket_for(&mut self.buckets, hash);
        if let Some(e) = bucket
            .entries
            .iter_mut()
            .rev()
            .find(|e| e.key.is_identical(&key))
        {
            return Some(core::mem::replace(&mut e.value, value));
        }
        bucket.entries.push(Entry { key, value });
        self.len += 1;
        None
    }

    pub fn remove(&mut self, key: &K) -> Option<(K, V)> {
        let _scan = enter_scan(&self.scanning, "remove");
        let hash = key.identity_hash();
        let mut occupied = match self.buckets.find_entry(spread(hash), |b| b.hash == hash) {
            Ok(o) => o,
            Err(_) => return None,
        };
        let bucket = occupied.get_mut();
        let i = bucket.entries.iter().rposition(|e| e.key.is_identical(key))?;
        // Order within a bucket carries no meaning.
        let entry = bucket.entries.swap_remove(i);
        if bucket.entries.is_empty() {
            occupied.remove();
            log::trace!("bucket_table: retired bucket {:#010x}", hash);
        }
        self.len -= 1;
        Some((entry.key, entry.value))
    }

    fn bucket_for(buckets: &mut HashTable<Bucket<K, V>>, hash: u32) -> &mut Bucket<K, V> {
        match buckets.entry(spread(hash), |b| b.hash == hash, |b| spread(b.hash)) {
            hash_table::Entry::Occupied(o) => o.into_mut(),
            hash_table::Entry::Vacant(v) => {
                log::trace!("bucket_table: new bucket {:#010x}", hash);
                v.insert(Bucket {
                    hash,
                    entries: Vec::new(),
                })
                .into_mut()
            }
        }
    }

    /// Panics if the size counter, bucket placement or per-bucket
    /// uniqueness is off.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let mut total = 0;
        for bucket in self.buckets.iter() {
            assert!(!bucket.entries.is_empty(), "empty bucket left behind");
            for (i, e) in bucket.entries.iter().enumerate() {
                assert_eq!(e.key.identity_hash(), bucket.hash, "entry in wrong bucket");
                assert!(
                    !bucket.entries[i + 1..]
                        .iter()
                        .any(|other| other.key.is_identical(&e.key)),
                    "duplicate key within bucket"
                );
            }
            total += bucket.entries.len();
        }
        assert_eq!(total, self.len, "size counter out of sync");
    }
}

/// Iterator over `(&K, &V)` in unspecified order.
pub struct Iter<'a, K, V> {
    buckets: hash_table::Iter<'a, Bucket<K, V>>,
    entries: core::slice::Iter<'a, Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.entries.next() {
                self.remaining -= 1;
                return Some((&e.key, &e.value));
            }
            self.entries = self.buckets.next()?.entries.iter();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over `(&K, &mut V)` in unspecified order.
pub struct IterMut<'a, K, V> {
    buckets: hash_table::IterMut<'a, Bucket<K, V>>,
    entries: core::slice::IterMut<'a, Entry<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(e) = self.entries.next() {
                self.remaining -= 1;
                return Some((&e.key, &mut e.value));
            }
            self.entries = self.buckets.next()?.entries.iter_mut();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
