//! Identity hashing: a 31-bit, non-negative hash for any value.
//!
//! Hashes are deterministic within a process but not unique; containers
//! must resolve collisions with [`IdentityHash::is_identical`].

use crate::heap::ObjectRef;
use crate::value::Value;
use std::rc::Rc;

/// Every identity hash fits in this mask.
pub const HASH_MASK: u32 = 0x7fff_ffff;
pub const NULL_HASH: u32 = 99961;
pub const UNDEFINED_HASH: u32 = 99971;
pub const TRUE_HASH: u32 = 99989;
pub const FALSE_HASH: u32 = 99991;

const NUMBER_SEED: i32 = 56081;
const KEY_MIX: u64 = 0x9e37_79b9_7f4a_7c15;

/// Types that have a notion of identity and a hash consistent with it.
///
/// Implementations must return the same hash for identical values for as
/// long as they stay identical; unrelated values may share a hash.
pub trait IdentityHash {
    /// Hash in `0..=HASH_MASK`.
    fn identity_hash(&self) -> u32;

    /// `===`-style identity, never structural equality for references.
    fn is_identical(&self, other: &Self) -> bool;
}

/// Identity hash of any [`Value`].
pub fn hash(value: &Value) -> u32 {
    match value {
        Value::Number(n) => number_hash(*n),
        Value::Text(s) => string_hash(s),
        Value::Bool(true) => TRUE_HASH,
        Value::Bool(false) => FALSE_HASH,
        Value::Undefined => UNDEFINED_HASH,
        Value::Null => NULL_HASH,
        Value::Object(r) => object_hash(*r),
    }
}

/// Polynomial hash over UTF-16 code units, `h = h * 31 + unit`, kept in 31
/// bits. Never 0: an empty (or zero-summing) string hashes to 1.
pub fn string_hash(s: &str) -> u32 {
    let h = s
        .encode_utf16()
        .fold(0u32, |h, unit| h.wrapping_mul(31).wrapping_add(u32::from(unit)) & HASH_MASK);
    nonzero(h)
}

/// Hash of the little-endian bytes of `n`. `-0.0` hashes like `0.0` since
/// the two are identical numbers.
pub fn number_hash(n: f64) -> u32 {
    let n = if n == 0.0 { 0.0 } else { n };
    let h = n
        .to_le_bytes()
        .iter()
        .fold(NUMBER_SEED, |h, &b| h.wrapping_mul(31).wrapping_add(i32::from(b)));
    nonzero(h as u32 & HASH_MASK)
}

/// Stable per-reference hash derived from the handle itself.
pub fn object_hash(r: ObjectRef) -> u32 {
    mix_bits(r.key_bits())
}

/// Address-based hash for handles whose identity is a pointer.
pub fn pointer_hash<T: ?Sized>(p: *const T) -> u32 {
    mix_bits(p.cast::<()>() as usize as u64)
}

fn mix_bits(bits: u64) -> u32 {
    let x = bits.wrapping_mul(KEY_MIX);
    nonzero((x >> 33) as u32 & HASH_MASK)
}

#[inline]
fn nonzero(h: u32) -> u32 {
    if h == 0 {
        1
    } else {
        h
    }
}

impl IdentityHash for Value {
    fn identity_hash(&self) -> u32 {
        hash(self)
    }

    fn is_identical(&self, other: &Self) -> bool {
        Value::is_identical(self, other)
    }
}

impl IdentityHash for ObjectRef {
    fn identity_hash(&self) -> u32 {
        object_hash(*self)
    }

    fn is_identical(&self, other: &Self) -> bool {
        self == other
    }
}

/// Shared allocations are identified by address. A container holding the
/// `Rc` keeps the allocation, and therefore the hash, alive.
impl<T: ?Sized> IdentityHash for Rc<T> {
    fn identity_hash(&self) -> u32 {
        pointer_hash(Rc::as_ptr(self))
    }

    fn is_identical(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}
