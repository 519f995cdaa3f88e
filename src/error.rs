use std::{
    error::Error,
    fmt::{self, Display},
};

use crate::value::Kind;

/// Error type for decoding a [`Value`](crate::Value) into a [`Target`](crate::Target).
#[derive(Debug)]
pub struct DecodeError {
    kind: DecodeErrorKind,
    path: Vec<PathSegment>,
}

impl DecodeError {
    /// Returns a reference to the error kind for detailed error inspection.
    pub fn kind(&self) -> &DecodeErrorKind {
        &self.kind
    }

    /// Consumes the error, returning its kind.
    pub fn into_kind(self) -> DecodeErrorKind {
        self.kind
    }

    /// Location of the failure, outermost segment first.
    pub fn path(&self) -> &[PathSegment] {
        &self.path
    }

    /// Format the path as a string, e.g. `.blocks[1].id`.
    pub fn path_string(&self) -> String {
        if self.path.is_empty() {
            return "<root>".into();
        }
        self.path.iter().map(ToString::to_string).collect()
    }

    /// Record that the error happened while decoding the field `name`.
    ///
    /// Type mismatches raised directly by the field's scalar slot also learn
    /// the field name here.
    pub(crate) fn with_field(mut self, name: &str) -> Self {
        if let DecodeErrorKind::TypeMismatch { field, .. } = &mut self.kind {
            if field.is_none() {
                *field = Some(name.to_owned());
            }
        }
        self.path.insert(0, PathSegment::Field(name.to_owned()));
        self
    }

    /// Record that the error happened while decoding element `index`.
    pub(crate) fn with_index(mut self, index: usize) -> Self {
        self.path.insert(0, PathSegment::Index(index));
        self
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = &self.kind;
        if self.path.is_empty() {
            write!(f, "{kind}")
        } else {
            write!(f, "at {}: {kind}", self.path_string())
        }
    }
}

impl Error for DecodeError {}

impl<K: Into<DecodeErrorKind>> From<K> for DecodeError {
    fn from(value: K) -> Self {
        let kind = value.into();
        DecodeError {
            kind,
            path: Vec::new(),
        }
    }
}

/// A segment in a decode path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A record field, named by the mapping key that matched it
    Field(String),
    /// An element of a sequence
    Index(usize),
}

impl Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Field(name) => write!(f, ".{name}"),
            PathSegment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// Which side of a conversion an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// The untyped value being read
    Source,
    /// The typed slot being written
    Destination,
}

impl Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Source => f.write_str("source"),
            Side::Destination => f.write_str("destination"),
        }
    }
}

/// Detailed classification of decode errors.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    /// The top-level source value is absent.
    NilData,
    /// The top-level destination is a null reference.
    DestinationNotPointer,
    /// A mapping was decoded into something that is not a record.
    InvalidTarget(Kind),
    /// The source mapping is keyed by something other than strings.
    NonStringKey(Kind),
    /// The source scalar cannot be assigned to the destination scalar.
    TypeMismatch {
        /// Name of the record field being written, when known.
        field: Option<String>,
        /// Rust type of the destination slot.
        type_name: &'static str,
        /// Kind of the destination slot.
        expected: Kind,
        /// Kind of the source value.
        got: Kind,
    },
    /// The source number does not fit the destination integer.
    Overflow {
        /// The offending value, as written in the source.
        value: String,
        /// Rust type of the destination slot.
        type_name: &'static str,
    },
    /// A negative number was assigned to an unsigned destination.
    NegativeValue {
        /// The offending value, as written in the source.
        value: String,
        /// Rust type of the destination slot.
        type_name: &'static str,
    },
    /// No conversion rule exists for this kind.
    UnsupportedKind {
        /// Side carrying the unsupported kind.
        side: Side,
        /// The unsupported kind.
        kind: Kind,
    },
    /// A sequence conversion was attempted on something that is not a sequence.
    NotASequence {
        /// Side that is not a sequence.
        side: Side,
        /// What that side actually is.
        kind: Kind,
    },
    /// A fixed-size destination received a sequence of the wrong length.
    LengthMismatch {
        /// Length of the destination array.
        expected: usize,
        /// Length of the source sequence.
        got: usize,
    },
    /// A destination sequence asked for an element the source does not have.
    IndexOutOfRange {
        /// The requested element.
        index: usize,
        /// Length of the source sequence.
        len: usize,
    },
    /// The value tree nests deeper than the decoder allows.
    MaxDepthExceeded {
        /// The configured depth limit.
        limit: usize,
    },
}

impl Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeErrorKind::NilData => write!(f, "data cannot be nil"),
            DecodeErrorKind::DestinationNotPointer => {
                write!(f, "destination must be a non-null reference")
            }
            DecodeErrorKind::InvalidTarget(kind) => write!(f, "expected record, got {kind}"),
            DecodeErrorKind::NonStringKey(kind) => {
                write!(f, "expected map with string keys, got {kind} keys")
            }
            DecodeErrorKind::TypeMismatch {
                field,
                type_name,
                expected,
                got,
            } => match field {
                Some(field) => write!(
                    f,
                    "cannot assign value of kind {got} to {expected} field '{field}' ({type_name})"
                ),
                None => write!(
                    f,
                    "cannot assign value of kind {got} to {expected} ({type_name})"
                ),
            },
            DecodeErrorKind::Overflow { value, type_name } => {
                write!(f, "value {value} is out of range for {type_name}")
            }
            DecodeErrorKind::NegativeValue { value, type_name } => {
                write!(f, "cannot convert negative value {value} to {type_name}")
            }
            DecodeErrorKind::UnsupportedKind { side, kind } => {
                write!(f, "unsupported {side} kind: {kind}")
            }
            DecodeErrorKind::NotASequence { side, kind } => {
                write!(f, "{side} is not a sequence, got {kind}")
            }
            DecodeErrorKind::LengthMismatch { expected, got } => {
                write!(f, "expected a sequence of {expected} elements, got {got}")
            }
            DecodeErrorKind::IndexOutOfRange { index, len } => {
                write!(f, "element {index} requested from a sequence of {len}")
            }
            DecodeErrorKind::MaxDepthExceeded { limit } => {
                write!(f, "value nests deeper than the limit of {limit} levels")
            }
        }
    }
}
