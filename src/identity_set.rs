//! IdentitySet: a set whose members are distinguished by identity.

use crate::bucket_table::{self, BucketTable};
use crate::hash::IdentityHash;
use core::fmt;

/// Unordered set keyed by [`IdentityHash`].
///
/// Two members are the same iff they are identical: equal primitives, or the
/// same reference. Structurally equal but distinct references are separate
/// members.
///
/// The set cannot be modified while [`for_each`](Self::for_each) or
/// [`iter`](Self::iter) is running; the borrow checker rejects it.
pub struct IdentitySet<T> {
    table: BucketTable<T, ()>,
}

impl<T> IdentitySet<T> {
    pub fn new() -> Self {
        Self {
            table: BucketTable::new(),
        }
    }

    /// Number of members.
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

    /// Members in no particular order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Call `visit` once per member, in no particular order.
    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&T),
    {
        for (member, ()) in self.table.iter() {
            visit(member);
        }
    }
}

impl<T: IdentityHash> IdentitySet<T> {
    pub fn has(&self, value: &T) -> bool {
        self.table.contains_key(value)
    }

    /// Returns `true` if `value` was not yet a member and has been added.
    pub fn add(&mut self, value: T) -> bool {
        self.table.insert(value, ()).is_ok()
    }

    /// Returns `true` if `value` was a member and has been removed.
    pub fn remove(&mut self, value: &T) -> bool {
        self.table.remove(value).is_some()
    }

    /// Remove the member identical to `value` and hand it back.
    pub fn take(&mut self, value: &T) -> Option<T> {
        self.table.remove(value).map(|(member, ())| member)
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.table.assert_consistent();
    }
}

impl<T> Default for IdentitySet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for IdentitySet<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T: IdentityHash> Extend<T> for IdentitySet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.add(value);
        }
    }
}

impl<T: IdentityHash> FromIterator<T> for IdentitySet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<'a, T> IntoIterator for &'a IdentitySet<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over set members.
pub struct Iter<'a, T> {
    inner: bucket_table::Iter<'a, T, ()>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(member, ())| member)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
