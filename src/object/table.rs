use crate::error::PdfError;
use crate::object::Value;

/// A stable handle to an object that may not yet have a value bound to
/// it. `allocate` returns an id before the value exists, so forward
/// references can be built up front.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId {
    pub number: u32,
    pub generation: u16,
}

impl ObjectId {
    pub fn to_ref(self) -> Value {
        Value::IndirectRef(self.number, self.generation)
    }
}

struct Slot {
    value: Option<Value>,
    byte_offset: Option<u64>,
}

/// A flat arena of indirect objects keyed by object number, with
/// sequential ids handed out from a counter. A two-phase `allocate`
/// (reserve a number) then `bind` (attach a value) lets a builder
/// create a forward reference — e.g. a page's `/Parent` — before the
/// referenced object exists.
#[derive(Default)]
pub struct ObjectTable {
    slots: Vec<Slot>,
}

impl ObjectTable {
    pub fn new() -> Self {
        ObjectTable { slots: Vec::new() }
    }

    /// Reserves the next object number with generation 0, leaving it
    /// unbound.
    pub fn allocate(&mut self) -> ObjectId {
        let number = (self.slots.len() + 1) as u32;
        self.slots.push(Slot {
            value: None,
            byte_offset: None,
        });
        ObjectId {
            number,
            generation: 0,
        }
    }

    /// Attaches `value` to a previously allocated id. Fails
    /// `AlreadyBound` if `id` already has a value — an id
    /// is bound exactly once, matching the single-assignment contract
    /// of `allocate`-then-`bind`.
    pub fn bind(&mut self, id: ObjectId, value: Value) -> Result<(), PdfError> {
        let slot = self
            .slots
            .get_mut((id.number - 1) as usize)
            .ok_or(PdfError::DanglingRef(id))?;
        if slot.value.is_some() {
            return Err(PdfError::AlreadyBound(id));
        }
        slot.value = Some(value);
        Ok(())
    }

    /// Allocates and binds in one step, for the common case where the
    /// value is already fully built.
    pub fn put(&mut self, value: Value) -> ObjectId {
        let id = self.allocate();
        self.bind(id, value).expect("just-allocated id cannot already be bound");
        id
    }

    /// Looks up the bound value for `id`. Fails `DanglingRef` if `id`
    /// was never allocated or was allocated but never bound.
    pub fn resolve(&self, id: ObjectId) -> Result<&Value, PdfError> {
        self.slots
            .get((id.number - 1) as usize)
            .and_then(|slot| slot.value.as_ref())
            .ok_or(PdfError::DanglingRef(id))
    }

    /// Iterates bound objects in ascending object-number order, the
    /// order the serializer emits them in.
    pub fn iter_in_number_order(&self) -> impl Iterator<Item = (ObjectId, &Value)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.value.as_ref().map(|v| {
                (
                    ObjectId {
                        number: (i + 1) as u32,
                        generation: 0,
                    },
                    v,
                )
            })
        })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub(crate) fn set_byte_offset(&mut self, id: ObjectId, offset: u64) {
        if let Some(slot) = self.slots.get_mut((id.number - 1) as usize) {
            slot.byte_offset = Some(offset);
        }
    }

    pub(crate) fn byte_offset(&self, id: ObjectId) -> Option<u64> {
        self.slots.get((id.number - 1) as usize)?.byte_offset
    }

    /// Checks that every allocated slot has been bound. Called once at
    /// the start of `save` — a dangling allocation at
    /// that point is a caller bug, not a recoverable condition, so the
    /// whole save fails rather than silently skipping the slot.
    pub(crate) fn validate_fully_bound(&self) -> Result<(), PdfError> {
        for (i, slot) in self.slots.iter().enumerate() {
            if slot.value.is_none() {
                return Err(PdfError::DanglingRef(ObjectId {
                    number: (i + 1) as u32,
                    generation: 0,
                }));
            }
        }
        Ok(())
    }
}
