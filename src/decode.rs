//! The recursive decode walk.

use crate::{
    coerce::assign_scalar,
    error::{DecodeError, DecodeErrorKind, Side},
    fields::FieldIndex,
    target::{Slot, Target},
    value::{Map, Value},
};

type Result<T> = std::result::Result<T, DecodeError>;

/// Nesting limit used by [`Decoder::new`].
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Decodes [`Value`] trees into [`Target`]s.
///
/// A decoder holds configuration only; every call is independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoder {
    max_depth: usize,
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder {
    /// A decoder with the default depth limit.
    pub fn new() -> Self {
        Decoder {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Set how many levels of nesting a value tree may have.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// The configured depth limit.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Decode `source` into `destination`.
    ///
    /// Fields named by the source are overwritten, every other field keeps
    /// its value. On error the destination may be partially written.
    pub fn decode<T: Target + ?Sized>(&self, source: &Value, destination: &mut T) -> Result<()> {
        self.decode_into(source, Some(destination))
    }

    /// Decode `source` through a destination reference that may be null.
    pub fn decode_into<T: Target + ?Sized>(
        &self,
        source: &Value,
        destination: Option<&mut T>,
    ) -> Result<()> {
        if source.is_nil() {
            return Err(DecodeErrorKind::NilData.into());
        }
        let Some(destination) = destination else {
            return Err(DecodeErrorKind::DestinationNotPointer.into());
        };

        log::debug!(
            "decoding {} into {}",
            source.kind(),
            destination.type_name()
        );
        self.walker().convert(source, destination.slot(), 0)
    }

    /// Materialize the sequence `source` into `destination`.
    ///
    /// Unlike a full decode, both sides must be sequences: anything else fails
    /// with `NotASequence` naming the offending side. A nil sequence leaves the
    /// destination as it was.
    pub fn decode_seq<T: Target + ?Sized>(
        &self,
        source: &Value,
        destination: &mut T,
    ) -> Result<()> {
        match source {
            Value::Seq(items) => self
                .walker()
                .materialize(items.as_deref(), destination.slot(), 0),
            other => Err(DecodeErrorKind::NotASequence {
                side: Side::Source,
                kind: other.kind(),
            }
            .into()),
        }
    }

    fn walker(&self) -> Walker {
        Walker {
            max_depth: self.max_depth,
        }
    }
}

/// One decode call in progress.
#[derive(Clone, Copy)]
struct Walker {
    max_depth: usize,
}

impl Walker {
    /// Convert `source` into `slot`, dispatching on the source kind.
    fn convert(self, source: &Value, slot: Slot<'_>, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(DecodeErrorKind::MaxDepthExceeded {
                limit: self.max_depth,
            }
            .into());
        }
        log::trace!(
            "convert {} into {} at depth {depth}",
            source.kind(),
            slot.kind()
        );

        match source {
            Value::Null | Value::Variant(None) => Ok(()),
            Value::Variant(Some(inner)) => self.convert(inner, slot, depth + 1),
            scalar if scalar.is_scalar() => Ok(assign_scalar(resolve(slot), scalar)?),
            Value::Map(map) => self.merge(map.as_ref(), slot, depth),
            // checked before the destination so nothing gets allocated
            Value::KeyedMap(Some(map)) => {
                Err(DecodeErrorKind::NonStringKey(map.key_kind()).into())
            }
            Value::KeyedMap(None) => Ok(()),
            Value::Seq(items) => self.materialize(items.as_deref(), slot, depth),
            other => Err(DecodeErrorKind::UnsupportedKind {
                side: Side::Source,
                kind: other.kind(),
            }
            .into()),
        }
    }

    /// Write the entries of `map` into the record behind `slot`.
    ///
    /// Keys without a matching field are dropped.
    fn merge(self, map: Option<&Map>, slot: Slot<'_>, depth: usize) -> Result<()> {
        let Some(map) = map else {
            return Ok(());
        };

        let mut index = FieldIndex::build(resolve(slot))?;
        let record_name = index.record_name();
        for (name, value) in map.iter() {
            let Some(field) = index.get_mut(name) else {
                log::trace!("no field '{name}' on {record_name}, dropping it");
                continue;
            };
            self.convert(value, field.slot(), depth + 1)
                .map_err(|e| e.with_field(name))?;
        }
        Ok(())
    }

    /// Replace the sequence behind `slot` with the converted `items`.
    ///
    /// A nil sequence leaves the destination as it was.
    fn materialize(self, items: Option<&[Value]>, slot: Slot<'_>, depth: usize) -> Result<()> {
        match items {
            Some(items) => self.fill_sequence(items, resolve(slot), depth),
            None => Ok(()),
        }
    }

    fn fill_sequence(self, items: &[Value], slot: Slot<'_>, depth: usize) -> Result<()> {
        let seq = match slot {
            Slot::Seq(seq) => seq,
            other => {
                return Err(DecodeErrorKind::NotASequence {
                    side: Side::Destination,
                    kind: other.kind(),
                }
                .into());
            }
        };
        seq.replace_with(items.len(), &mut |index, element| {
            let Some(item) = items.get(index) else {
                return Err(DecodeErrorKind::IndexOutOfRange {
                    index,
                    len: items.len(),
                }
                .into());
            };
            self.convert(item, element.slot(), depth + 1)
                .map_err(|e| e.with_index(index))
        })
    }
}

/// Follow pointer layers down to the slot that holds data, allocating
/// default pointees along the way.
fn resolve(slot: Slot<'_>) -> Slot<'_> {
    let mut slot = slot;
    loop {
        match slot {
            Slot::Indirect(ptr) => slot = ptr.pointee_or_default().slot(),
            other => return other,
        }
    }
}

/// Materialize the sequence `source` into `destination` with a default
/// [`Decoder`].
///
/// See [`Decoder::decode_seq`].
pub fn decode_seq<T: Target + ?Sized>(source: &Value, destination: &mut T) -> Result<()> {
    Decoder::new().decode_seq(source, destination)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        error::PathSegment,
        target::{FillElement, Sequence},
        value::Kind,
    };

    #[test]
    fn decoder_defaults() {
        assert_eq!(Decoder::default(), Decoder::new());
        assert_eq!(Decoder::new().max_depth(), DEFAULT_MAX_DEPTH);
        assert_eq!(Decoder::new().with_max_depth(4).max_depth(), 4);
    }

    #[test]
    fn decode_seq_requires_a_source_sequence() {
        let mut out: Vec<i32> = Vec::new();
        let err = decode_seq(&Value::from(3), &mut out).unwrap_err();
        assert_eq!(
            err.kind(),
            &DecodeErrorKind::NotASequence {
                side: Side::Source,
                kind: Kind::Int,
            }
        );
    }

    #[test]
    fn decode_seq_requires_a_destination_sequence() {
        let mut out = 0u8;
        let err = decode_seq(&Value::seq([1, 2]), &mut out).unwrap_err();
        assert_eq!(
            err.kind(),
            &DecodeErrorKind::NotASequence {
                side: Side::Destination,
                kind: Kind::Uint,
            }
        );
    }

    #[test]
    fn decode_seq_of_nil_leaves_destination() {
        let mut out: Vec<i32> = vec![1, 2, 3];
        decode_seq(&Value::nil_seq(), &mut out).unwrap();
        assert_eq!(out, vec![1, 2, 3]);

        decode_seq(&Value::seq(Vec::<Value>::new()), &mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn decode_seq_reports_the_failing_element() {
        let mut out: Vec<u8> = Vec::new();
        let err = decode_seq(&Value::seq([1, 2, 300]), &mut out).unwrap_err();
        assert_eq!(err.path(), &[PathSegment::Index(2)]);
        assert!(out.is_empty());
    }

    #[test]
    fn decode_seq_allocates_through_pointers() {
        let mut out: Option<Vec<String>> = None;
        decode_seq(&Value::seq(["a", "b"]), &mut out).unwrap();
        assert_eq!(out, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn depth_counts_variant_layers() {
        let mut nested = Value::from(1);
        for _ in 0..3 {
            nested = Value::variant(nested);
        }

        let mut out = 0i64;
        let err = Decoder::new()
            .with_max_depth(2)
            .decode(&nested, &mut out)
            .unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::MaxDepthExceeded { limit: 2 });

        Decoder::new()
            .with_max_depth(3)
            .decode(&nested, &mut out)
            .unwrap();
        assert_eq!(out, 1);
    }

    /// Asks for one element more than it was given.
    #[derive(Default)]
    struct Overreaching(Vec<i32>);

    impl Sequence for Overreaching {
        fn replace_with(&mut self, len: usize, fill: &mut FillElement<'_>) -> Result<()> {
            for index in 0..=len {
                let mut element = 0i32;
                fill(index, &mut element)?;
                self.0.push(element);
            }
            Ok(())
        }
    }

    impl Target for Overreaching {
        fn slot(&mut self) -> Slot<'_> {
            Slot::Seq(self)
        }
    }

    #[test]
    fn element_past_the_source_is_an_error() {
        let mut out = Overreaching::default();
        let err = decode_seq(&Value::seq([1, 2]), &mut out).unwrap_err();
        assert_eq!(
            err.kind(),
            &DecodeErrorKind::IndexOutOfRange { index: 2, len: 2 }
        );
        assert_eq!(out.0, vec![1, 2]);
    }

    #[test]
    fn decode_seq_uses_the_configured_depth() {
        let source = Value::seq([Value::seq([Value::seq([1])])]);
        let mut out: Vec<Vec<Vec<i32>>> = Vec::new();

        let err = Decoder::new()
            .with_max_depth(2)
            .decode_seq(&source, &mut out)
            .unwrap_err();
        assert_eq!(err.kind(), &DecodeErrorKind::MaxDepthExceeded { limit: 2 });
        assert_eq!(err.path_string(), "[0][0][0]");

        Decoder::new()
            .with_max_depth(3)
            .decode_seq(&source, &mut out)
            .unwrap();
        assert_eq!(out, vec![vec![vec![1]]]);
    }
}
