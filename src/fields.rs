use std::collections::HashMap;

use crate::{
    error::DecodeErrorKind,
    target::{Slot, Target},
    value::Kind,
};

/// Field name to slot lookup for one record instance.
///
/// Built fresh for every record the decoder meets; nothing is cached across
/// records or calls.
pub struct FieldIndex<'a> {
    record_name: &'static str,
    slots: HashMap<&'static str, &'a mut dyn Target>,
}

impl<'a> FieldIndex<'a> {
    /// Index the fields of the record behind `slot`.
    ///
    /// Set pointer layers are followed; an unset one, or anything that is not
    /// a record, fails with `InvalidTarget`. Nothing is allocated or written.
    pub fn build(slot: Slot<'a>) -> Result<Self, DecodeErrorKind> {
        let mut slot = slot;
        loop {
            match slot {
                Slot::Indirect(ptr) => match ptr.pointee() {
                    Some(pointee) => slot = pointee.slot(),
                    None => return Err(DecodeErrorKind::InvalidTarget(Kind::Pointer)),
                },
                Slot::Record(record) => {
                    let record_name = record.record_name();
                    let slots = record.fields_mut().into_iter().collect();
                    return Ok(FieldIndex { record_name, slots });
                }
                other => return Err(DecodeErrorKind::InvalidTarget(other.kind())),
            }
        }
    }

    /// Name of the indexed record type.
    pub fn record_name(&self) -> &'static str {
        self.record_name
    }

    /// Number of indexed fields.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True for records without fields.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// True when the record declares a field called `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// The slot of field `name`, matched exactly and case-sensitively.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn Target + 'a)> {
        self.slots.get_mut(name).map(|slot| &mut **slot)
    }
}
