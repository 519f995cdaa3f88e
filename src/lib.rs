#![warn(missing_docs)]
#![doc = include_str!("../README.md")]

// Lets `#[derive(Record)]` expand to `::i2s::...` inside this crate too.
extern crate self as i2s;

mod coerce;
mod decode;
mod error;
mod fields;
mod target;
mod value;

pub use decode::{DEFAULT_MAX_DEPTH, Decoder, decode_seq};
pub use error::{DecodeError, DecodeErrorKind, PathSegment, Side};
pub use fields::FieldIndex;
pub use i2s_derive::Record;
pub use num_complex::{Complex32, Complex64};
pub use target::{
    ComplexSlot, FillElement, FloatSlot, Indirect, IntSlot, Record, Sequence, Slot, Target,
    UintSlot,
};
pub use value::{Kind, KeyedMap, Map, Opaque, Value};

type Result<T> = std::result::Result<T, DecodeError>;

/// Decode `source` into `destination` with a default [`Decoder`].
///
/// Mapping keys are matched to record fields by exact name, scalars are
/// coerced where safe, and absent values leave their destination untouched.
///
/// ```
/// use i2s::{Record, value};
///
/// #[derive(Record, Debug, Default, PartialEq)]
/// struct Block {
///     id: u32,
///     label: Option<String>,
/// }
///
/// let mut block = Block::default();
/// i2s::decode(&value!({"id": 7, "label": "entry", "unused": true}), &mut block).unwrap();
/// assert_eq!(block, Block { id: 7, label: Some("entry".into()) });
/// ```
pub fn decode<T: Target + ?Sized>(source: &Value, destination: &mut T) -> Result<()> {
    Decoder::new().decode(source, destination)
}
