//! Order-preserving deduplication by identity.

use crate::hash::IdentityHash;
use crate::identity_set::IdentitySet;

/// Copy of `items` keeping only the first of each group of identical
/// elements, in the original order.
pub fn dedup<T>(items: &[T]) -> Vec<T>
where
    T: IdentityHash + Clone,
{
    dedup_iter(items.iter().cloned())
}

/// Owning variant of [`dedup`].
pub fn dedup_iter<I>(items: I) -> Vec<I::Item>
where
    I: IntoIterator,
    I::Item: IdentityHash + Clone,
{
    let mut seen = IdentitySet::new();
    items
        .into_iter()
        .filter(|item| seen.add(item.clone()))
        .collect()
}
