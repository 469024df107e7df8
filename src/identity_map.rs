//! IdentityMap: key/value association keyed by identity.

use crate::bucket_table::{self, BucketTable};
use crate::hash::IdentityHash;
use core::fmt;

/// Unordered map whose keys are compared by identity.
///
/// Values are stored verbatim and never inspected. Presence is tracked
/// separately from values, so a stored value that equals some fallback is
/// still reported as present by [`has`](Self::has).
///
/// Adding or removing keys during [`for_each`](Self::for_each) or
/// [`iter`](Self::iter) is not allowed; both hold a shared borrow of the map.
pub struct IdentityMap<K, V> {
    table: BucketTable<K, V>,
}

impl<K, V> IdentityMap<K, V> {
    pub fn new() -> Self {
        Self {
            table: BucketTable::new(),
        }
    }

    /// Number of keys.
    pub fn size(&self) -> usize {
        self.table.len()
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn clear(&mut self) {
        self.table.clear();
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            inner: self.table.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Call `visit` once per `(key, value)` pair, in no particular order.
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        for (k, v) in self.table.iter() {
            visit(k, v);
        }
    }
}

impl<K: IdentityHash, V> IdentityMap<K, V> {
    pub fn get(&self, key: &K) -> Option<&V> {
        self.table.get(key).map(|(_, v)| v)
    }

    /// The value mapped to `key`, or `fallback` if there is none.
    pub fn get_or<'a>(&'a self, key: &K, fallback: &'a V) -> &'a V {
        self.get(key).unwrap_or(fallback)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.table.get_mut(key)
    }

    /// The stored key identical to `key`, with its value.
    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        self.table.get(key)
    }

    pub fn has(&self, key: &K) -> bool {
        self.table.contains_key(key)
    }

    /// Map `key` to `value`, returning the previous value if the key was
    /// present. An existing key keeps its original stored instance.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        self.table.replace(key, value)
    }

    /// Like [`set`](Self::set), but returns `fallback` when the key is new.
    pub fn set_or(&mut self, key: K, value: V, fallback: V) -> V {
        self.set(key, value).unwrap_or(fallback)
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.table.remove(key).map(|(_, v)| v)
    }

    /// Like [`remove`](Self::remove), but returns `fallback` when the key
    /// is absent.
    pub fn remove_or(&mut self, key: &K, fallback: V) -> V {
        self.remove(key).unwrap_or(fallback)
    }

    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        self.table.remove(key)
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.table.assert_consistent();
    }
}

impl<K, V> Default for IdentityMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IdentityMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: IdentityHash, V> Extend<(K, V)> for IdentityMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K: IdentityHash, V> FromIterator<(K, V)> for IdentityMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V> IntoIterator for &'a IdentityMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut IdentityMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Iterator over `(&K, &V)` pairs.
pub struct Iter<'a, K, V> {
    inner: bucket_table::Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over `(&K, &mut V)` pairs.
pub struct IterMut<'a, K, V> {
    inner: bucket_table::IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
