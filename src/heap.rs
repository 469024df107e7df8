//! Heap: arena for reference values with stable, generational handles.
//!
//! An [`ObjectRef`] is the only notion of reference identity in this crate.
//! Two handles name the same object iff they are equal; the arena's
//! generational keys guarantee a handle to a freed object never aliases an
//! object allocated later in the same slot.

use crate::value::Value;
use core::fmt;
use slotmap::{DefaultKey, Key, SlotMap};
use std::rc::Rc;

/// Handle to an object living in a [`Heap`].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObjectRef(DefaultKey);

impl ObjectRef {
    pub(crate) fn new(k: DefaultKey) -> Self {
        ObjectRef(k)
    }

    pub(crate) fn raw_key(&self) -> DefaultKey {
        self.0
    }

    /// Index and generation packed into one integer; distinct live handles
    /// always produce distinct bits.
    pub(crate) fn key_bits(&self) -> u64 {
        self.0.data().as_ffi()
    }

    pub fn get<'a>(&self, heap: &'a Heap) -> Result<&'a Object, StaleRef> {
        heap.get(*self)
    }
}

/// Payload of a heap object. Contents never take part in identity.
#[derive(Clone, Debug)]
pub enum Object {
    Array(Vec<Value>),
    Record(Vec<(Rc<str>, Value)>),
    RegExp(Rc<str>),
    Function(Rc<str>),
}

/// The handle does not name a live object (it was freed, or belongs to
/// another heap whose slot happens to be vacant).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StaleRef;

impl fmt::Display for StaleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("object reference is no longer live")
    }
}

impl std::error::Error for StaleRef {}

#[derive(Debug, Default)]
pub struct Heap {
    objects: SlotMap<DefaultKey, Object>,
}

impl Heap {
    pub fn new() -> Self {
        Self {
            objects: SlotMap::with_key(),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn alloc(&mut self, object: Object) -> ObjectRef {
        let k = self.objects.insert(object);
        log::trace!("heap: allocated object {:?}", k);
        ObjectRef::new(k)
    }

    pub fn array(&mut self, items: impl IntoIterator<Item = Value>) -> ObjectRef {
        self.alloc(Object::Array(items.into_iter().collect()))
    }

    pub fn record<N>(&mut self, fields: impl IntoIterator<Item = (N, Value)>) -> ObjectRef
    where
        N: Into<Rc<str>>,
    {
        let fields = fields.into_iter().map(|(n, v)| (n.into(), v)).collect();
        self.alloc(Object::Record(fields))
    }

    pub fn regexp(&mut self, source: &str) -> ObjectRef {
        self.alloc(Object::RegExp(source.into()))
    }

    pub fn function(&mut self, name: &str) -> ObjectRef {
        self.alloc(Object::Function(name.into()))
    }

    pub fn contains(&self, r: ObjectRef) -> bool {
        self.objects.contains_key(r.raw_key())
    }

    pub fn get(&self, r: ObjectRef) -> Result<&Object, StaleRef> {
        self.objects.get(r.raw_key()).ok_or(StaleRef)
    }

    pub fn get_mut(&mut self, r: ObjectRef) -> Result<&mut Object, StaleRef> {
        self.objects.get_mut(r.raw_key()).ok_or(StaleRef)
    }

    /// Release the object. Its handle stays a valid identity (it can still
    /// be hashed and compared) but no longer resolves.
    pub fn free(&mut self, r: ObjectRef) -> Result<Object, StaleRef> {
        let object = self.objects.remove(r.raw_key()).ok_or(StaleRef)?;
        log::trace!("heap: freed object {:?}", r.raw_key());
        Ok(object)
    }
}
