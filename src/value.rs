//! The untyped value tree consumed by the decoder.

use std::fmt::{self, Display};

use indexmap::IndexMap;
use num_complex::{Complex32, Complex64};

/// Runtime kind of a source value or destination slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// No value at all
    Invalid,
    /// `true` or `false`
    Bool,
    /// Signed integer
    Int,
    /// Unsigned integer
    Uint,
    /// Floating point number
    Float,
    /// Complex number
    Complex,
    /// UTF-8 string
    String,
    /// Ordered sequence
    Seq,
    /// Keyed mapping
    Map,
    /// Interface-like wrapper around another value
    Variant,
    /// Optional or owning pointer
    Pointer,
    /// Record with named fields
    Record,
    /// Function-valued host value
    Func,
    /// Channel-like host value
    Chan,
}

impl Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Invalid => "invalid",
            Kind::Bool => "bool",
            Kind::Int => "int",
            Kind::Uint => "uint",
            Kind::Float => "float",
            Kind::Complex => "complex",
            Kind::String => "string",
            Kind::Seq => "sequence",
            Kind::Map => "map",
            Kind::Variant => "variant",
            Kind::Pointer => "pointer",
            Kind::Record => "record",
            Kind::Func => "func",
            Kind::Chan => "chan",
        };
        f.write_str(name)
    }
}

/// A host value the value tree can carry but the decoder has no rule for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opaque {
    /// A function or closure
    Func,
    /// A channel endpoint
    Chan,
}

impl Opaque {
    /// Kind reported for this value.
    pub fn kind(self) -> Kind {
        match self {
            Opaque::Func => Kind::Func,
            Opaque::Chan => Kind::Chan,
        }
    }
}

/// A node of an untyped value tree, as produced by a JSON-like parser.
///
/// Sequences, mappings and variants distinguish "nil" (`None`) from empty:
/// decoding a nil container leaves the destination untouched, decoding an
/// empty one allocates an empty destination.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Unsigned integer
    Uint(u64),
    /// Floating point number
    Float(f64),
    /// Complex number
    Complex(Complex64),
    /// String
    String(String),
    /// Ordered sequence, `None` when nil
    Seq(Option<Vec<Value>>),
    /// String-keyed mapping, `None` when nil
    Map(Option<Map>),
    /// Mapping keyed by something other than strings, `None` when nil
    KeyedMap(Option<KeyedMap>),
    /// Wrapper around another value, `None` when nil
    Variant(Option<Box<Value>>),
    /// Host value without a decoding rule
    Opaque(Opaque),
}

impl Value {
    /// A sequence built from anything convertible to values.
    pub fn seq<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Value::Seq(Some(items.into_iter().map(Into::into).collect()))
    }

    /// A nil sequence.
    pub fn nil_seq() -> Self {
        Value::Seq(None)
    }

    /// A nil mapping.
    pub fn nil_map() -> Self {
        Value::Map(None)
    }

    /// Wrap a value in a variant layer.
    pub fn variant(inner: impl Into<Value>) -> Self {
        Value::Variant(Some(Box::new(inner.into())))
    }

    /// A nil variant.
    pub fn nil_variant() -> Self {
        Value::Variant(None)
    }

    /// Runtime kind of this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Invalid,
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Uint(_) => Kind::Uint,
            Value::Float(_) => Kind::Float,
            Value::Complex(_) => Kind::Complex,
            Value::String(_) => Kind::String,
            Value::Seq(_) => Kind::Seq,
            Value::Map(_) | Value::KeyedMap(_) => Kind::Map,
            Value::Variant(_) => Kind::Variant,
            Value::Opaque(opaque) => opaque.kind(),
        }
    }

    /// True for `Null` and nil variants, the values a top-level decode rejects.
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Null | Value::Variant(None))
    }

    /// True for boolean, numeric and string values, the sources that are
    /// assigned directly into a slot.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Bool(_)
                | Value::Int(_)
                | Value::Uint(_)
                | Value::Float(_)
                | Value::Complex(_)
                | Value::String(_)
        )
    }

    /// Borrow the mapping, if this is a non-nil mapping.
    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => map.as_ref(),
            _ => None,
        }
    }

    /// Borrow the elements, if this is a non-nil sequence.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(items) => items.as_deref(),
            _ => None,
        }
    }
}

macro_rules! impl_from {
    ($variant:ident <- $($ty:ty),+) => {
        $(
            impl From<$ty> for Value {
                fn from(value: $ty) -> Self {
                    Value::$variant(value.into())
                }
            }
        )+
    };
}

impl_from!(Int <- i8, i16, i32, i64);
impl_from!(Uint <- u8, u16, u32, u64);
impl_from!(Float <- f32, f64);
impl_from!(Bool <- bool);
impl_from!(Complex <- Complex64);
impl_from!(String <- String, &str);

impl From<isize> for Value {
    fn from(value: isize) -> Self {
        Value::Int(value as i64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Uint(value as u64)
    }
}

impl From<Complex32> for Value {
    fn from(value: Complex32) -> Self {
        Value::Complex(Complex64::new(value.re.into(), value.im.into()))
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Seq(Some(items))
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(Some(map))
    }
}

impl From<KeyedMap> for Value {
    fn from(map: KeyedMap) -> Self {
        Value::KeyedMap(Some(map))
    }
}

impl From<Opaque> for Value {
    fn from(opaque: Opaque) -> Self {
        Value::Opaque(opaque)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

/// A string-keyed mapping of values, in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Map {
    entries: IndexMap<String, Value>,
}

impl Map {
    /// An empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry, returning the value previously stored under `key`.
    ///
    /// A replaced entry stays where it was first inserted.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.entries.insert(key.into(), value.into())
    }

    /// Look up the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Map {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Map {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// A mapping whose keys are not strings, such as a host map keyed by integers.
///
/// The key kind is declared up front, the way a typed host map carries its key
/// type even when empty. The decoder only accepts string keys, so a non-nil
/// `KeyedMap` always fails to decode with `NonStringKey`.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedMap {
    key_kind: Kind,
    entries: Vec<(Value, Value)>,
}

impl KeyedMap {
    /// An empty mapping whose keys are of `key_kind`.
    pub fn new(key_kind: Kind) -> Self {
        KeyedMap {
            key_kind,
            entries: Vec::new(),
        }
    }

    /// Declared kind of the keys.
    pub fn key_kind(&self) -> Kind {
        self.key_kind
    }

    /// Append an entry. Entries are kept as given, duplicates included.
    pub fn push(&mut self, key: impl Into<Value>, value: impl Into<Value>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in the order they were pushed.
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }
}

/// Build a [`Value`] tree with JSON-like syntax.
///
/// Object keys must be literals. Values that span several tokens, such as
/// negative numbers or function calls, must be wrapped in parentheses.
///
/// ```
/// use i2s::{value, Value};
///
/// let v = value!({
///     "name": "sensor",
///     "offsets": [1, 2, (-3)],
///     "parent": null,
/// });
/// assert_eq!(v.as_map().and_then(|m| m.get("name")), Some(&Value::from("sensor")));
/// ```
#[macro_export]
macro_rules! value {
    (null) => {
        $crate::Value::Null
    };
    ([ $($elem:tt),* $(,)? ]) => {
        $crate::Value::Seq(::std::option::Option::Some(::std::vec![ $( $crate::value!($elem) ),* ]))
    };
    ({ $($key:literal : $val:tt),* $(,)? }) => {{
        #[allow(unused_mut)]
        let mut map = $crate::Map::new();
        $( map.insert($key, $crate::value!($val)); )*
        $crate::Value::Map(::std::option::Option::Some(map))
    }};
    ($other:expr) => {
        $crate::Value::from($other)
    };
}
