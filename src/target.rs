//! Typed destinations the decoder writes into.
//!
//! Every destination type implements [`Target`], which hands out a [`Slot`]:
//! a mutable handle tagged with the slot's kind. Records implement [`Record`]
//! (normally through `#[derive(Record)]`), optional and boxed values implement
//! [`Indirect`], and growable or fixed sequences implement [`Sequence`].

use num_complex::{Complex32, Complex64};

use crate::{
    error::{DecodeError, DecodeErrorKind},
    value::Kind,
};

/// A type the decoder can write into.
pub trait Target {
    /// Hand out a mutable handle to this value's storage.
    fn slot(&mut self) -> Slot<'_>;

    /// Type name used in diagnostics.
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// A record with named fields.
pub trait Record {
    /// Name of the record type.
    fn record_name(&self) -> &'static str;

    /// Declared field names, in declaration order.
    fn field_names(&self) -> &'static [&'static str];

    /// Every field paired with its name, in declaration order.
    fn fields_mut(&mut self) -> Vec<(&'static str, &mut dyn Target)>;
}

/// An optional or pointer-like layer around another target.
pub trait Indirect {
    /// The pointee, if one is present.
    fn pointee(&mut self) -> Option<&mut dyn Target>;

    /// The pointee, allocating a default one first when absent.
    fn pointee_or_default(&mut self) -> &mut dyn Target;
}

/// Callback producing element `index` of a sequence being materialized.
pub type FillElement<'f> = dyn FnMut(usize, &mut dyn Target) -> Result<(), DecodeError> + 'f;

/// A destination sequence.
pub trait Sequence {
    /// Replace the contents with `len` freshly defaulted elements, each passed
    /// through `fill` in order.
    ///
    /// `fill` only accepts indices below `len`; anything else fails with
    /// `IndexOutOfRange`.
    ///
    /// If `fill` fails the sequence is left as it was.
    fn replace_with(&mut self, len: usize, fill: &mut FillElement<'_>) -> Result<(), DecodeError>;
}

/// Mutable handle to one destination slot.
pub enum Slot<'a> {
    /// Signed integer
    Int(IntSlot<'a>),
    /// Unsigned integer
    Uint(UintSlot<'a>),
    /// Floating point
    Float(FloatSlot<'a>),
    /// Complex number
    Complex(ComplexSlot<'a>),
    /// Boolean
    Bool(&'a mut bool),
    /// String
    String(&'a mut String),
    /// Optional or pointer layer
    Indirect(&'a mut dyn Indirect),
    /// Sequence
    Seq(&'a mut dyn Sequence),
    /// Record
    Record(&'a mut dyn Record),
}

impl Slot<'_> {
    /// Kind of this slot.
    pub fn kind(&self) -> Kind {
        match self {
            Slot::Int(_) => Kind::Int,
            Slot::Uint(_) => Kind::Uint,
            Slot::Float(_) => Kind::Float,
            Slot::Complex(_) => Kind::Complex,
            Slot::Bool(_) => Kind::Bool,
            Slot::String(_) => Kind::String,
            Slot::Indirect(_) => Kind::Pointer,
            Slot::Seq(_) => Kind::Seq,
            Slot::Record(_) => Kind::Record,
        }
    }

    /// Rust type name of this slot, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Slot::Int(slot) => slot.type_name(),
            Slot::Uint(slot) => slot.type_name(),
            Slot::Float(slot) => slot.type_name(),
            Slot::Complex(slot) => slot.type_name(),
            Slot::Bool(_) => "bool",
            Slot::String(_) => "String",
            Slot::Indirect(_) => "pointer",
            Slot::Seq(_) => "sequence",
            Slot::Record(record) => record.record_name(),
        }
    }
}

fn narrow<S, V>(value: V, type_name: &'static str) -> Result<S, DecodeErrorKind>
where
    S: TryFrom<V>,
    V: ToString + Copy,
{
    S::try_from(value).map_err(|_| DecodeErrorKind::Overflow {
        value: value.to_string(),
        type_name,
    })
}

/// A signed integer slot of any width.
pub enum IntSlot<'a> {
    /// `i8`
    I8(&'a mut i8),
    /// `i16`
    I16(&'a mut i16),
    /// `i32`
    I32(&'a mut i32),
    /// `i64`
    I64(&'a mut i64),
    /// `isize`
    Isize(&'a mut isize),
}

impl IntSlot<'_> {
    /// Rust type name of the slot.
    pub fn type_name(&self) -> &'static str {
        match self {
            IntSlot::I8(_) => "i8",
            IntSlot::I16(_) => "i16",
            IntSlot::I32(_) => "i32",
            IntSlot::I64(_) => "i64",
            IntSlot::Isize(_) => "isize",
        }
    }

    /// Store `value`, failing with `Overflow` if it does not fit.
    pub fn set(self, value: i64) -> Result<(), DecodeErrorKind> {
        let type_name = self.type_name();
        match self {
            IntSlot::I8(dst) => *dst = narrow(value, type_name)?,
            IntSlot::I16(dst) => *dst = narrow(value, type_name)?,
            IntSlot::I32(dst) => *dst = narrow(value, type_name)?,
            IntSlot::I64(dst) => *dst = value,
            IntSlot::Isize(dst) => *dst = narrow(value, type_name)?,
        }
        Ok(())
    }
}

/// An unsigned integer slot of any width.
pub enum UintSlot<'a> {
    /// `u8`
    U8(&'a mut u8),
    /// `u16`
    U16(&'a mut u16),
    /// `u32`
    U32(&'a mut u32),
    /// `u64`
    U64(&'a mut u64),
    /// `usize`
    Usize(&'a mut usize),
}

impl UintSlot<'_> {
    /// Rust type name of the slot.
    pub fn type_name(&self) -> &'static str {
        match self {
            UintSlot::U8(_) => "u8",
            UintSlot::U16(_) => "u16",
            UintSlot::U32(_) => "u32",
            UintSlot::U64(_) => "u64",
            UintSlot::Usize(_) => "usize",
        }
    }

    /// Store `value`, failing with `Overflow` if it does not fit.
    pub fn set(self, value: u64) -> Result<(), DecodeErrorKind> {
        let type_name = self.type_name();
        match self {
            UintSlot::U8(dst) => *dst = narrow(value, type_name)?,
            UintSlot::U16(dst) => *dst = narrow(value, type_name)?,
            UintSlot::U32(dst) => *dst = narrow(value, type_name)?,
            UintSlot::U64(dst) => *dst = value,
            UintSlot::Usize(dst) => *dst = narrow(value, type_name)?,
        }
        Ok(())
    }
}

/// A floating point slot.
pub enum FloatSlot<'a> {
    /// `f32`
    F32(&'a mut f32),
    /// `f64`
    F64(&'a mut f64),
}

impl FloatSlot<'_> {
    /// Rust type name of the slot.
    pub fn type_name(&self) -> &'static str {
        match self {
            FloatSlot::F32(_) => "f32",
            FloatSlot::F64(_) => "f64",
        }
    }

    /// Store `value`, narrowing to `f32` if needed.
    pub fn set(self, value: f64) {
        match self {
            FloatSlot::F32(dst) => *dst = value as f32,
            FloatSlot::F64(dst) => *dst = value,
        }
    }
}

/// A complex number slot.
pub enum ComplexSlot<'a> {
    /// `Complex<f32>`
    C32(&'a mut Complex32),
    /// `Complex<f64>`
    C64(&'a mut Complex64),
}

impl ComplexSlot<'_> {
    /// Rust type name of the slot.
    pub fn type_name(&self) -> &'static str {
        match self {
            ComplexSlot::C32(_) => "Complex32",
            ComplexSlot::C64(_) => "Complex64",
        }
    }

    /// Store `value`, narrowing both parts to `f32` if needed.
    pub fn set(self, value: Complex64) {
        match self {
            ComplexSlot::C32(dst) => *dst = Complex32::new(value.re as f32, value.im as f32),
            ComplexSlot::C64(dst) => *dst = value,
        }
    }
}

macro_rules! impl_scalar_target {
    ($($ty:ty => $variant:ident($slot:ident::$inner:ident)),+ $(,)?) => {
        $(
            impl Target for $ty {
                fn slot(&mut self) -> Slot<'_> {
                    Slot::$variant($slot::$inner(self))
                }

                fn type_name(&self) -> &'static str {
                    stringify!($ty)
                }
            }
        )+
    };
}

impl_scalar_target! {
    i8 => Int(IntSlot::I8),
    i16 => Int(IntSlot::I16),
    i32 => Int(IntSlot::I32),
    i64 => Int(IntSlot::I64),
    isize => Int(IntSlot::Isize),
    u8 => Uint(UintSlot::U8),
    u16 => Uint(UintSlot::U16),
    u32 => Uint(UintSlot::U32),
    u64 => Uint(UintSlot::U64),
    usize => Uint(UintSlot::Usize),
    f32 => Float(FloatSlot::F32),
    f64 => Float(FloatSlot::F64),
    Complex32 => Complex(ComplexSlot::C32),
    Complex64 => Complex(ComplexSlot::C64),
}

impl Target for bool {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Bool(self)
    }

    fn type_name(&self) -> &'static str {
        "bool"
    }
}

impl Target for String {
    fn slot(&mut self) -> Slot<'_> {
        Slot::String(self)
    }

    fn type_name(&self) -> &'static str {
        "String"
    }
}

impl<T: Target + Default> Indirect for Option<T> {
    fn pointee(&mut self) -> Option<&mut dyn Target> {
        self.as_mut().map(|inner| inner as &mut dyn Target)
    }

    fn pointee_or_default(&mut self) -> &mut dyn Target {
        self.get_or_insert_with(T::default)
    }
}

impl<T: Target + Default> Target for Option<T> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Indirect(self)
    }
}

impl<T: Target> Indirect for Box<T> {
    fn pointee(&mut self) -> Option<&mut dyn Target> {
        Some(&mut **self as &mut dyn Target)
    }

    fn pointee_or_default(&mut self) -> &mut dyn Target {
        &mut **self
    }
}

impl<T: Target> Target for Box<T> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Indirect(self)
    }
}

impl<T: Target + Default> Sequence for Vec<T> {
    fn replace_with(&mut self, len: usize, fill: &mut FillElement<'_>) -> Result<(), DecodeError> {
        let mut fresh = Vec::with_capacity(len);
        for index in 0..len {
            let mut element = T::default();
            fill(index, &mut element)?;
            fresh.push(element);
        }
        *self = fresh;
        Ok(())
    }
}

impl<T: Target + Default> Target for Vec<T> {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Seq(self)
    }
}

impl<T: Target + Default, const N: usize> Sequence for [T; N] {
    fn replace_with(&mut self, len: usize, fill: &mut FillElement<'_>) -> Result<(), DecodeError> {
        if len != N {
            return Err(DecodeErrorKind::LengthMismatch {
                expected: N,
                got: len,
            }
            .into());
        }
        let mut fresh: [T; N] = core::array::from_fn(|_| T::default());
        for (index, element) in fresh.iter_mut().enumerate() {
            fill(index, element)?;
        }
        *self = fresh;
        Ok(())
    }
}

impl<T: Target + Default, const N: usize> Target for [T; N] {
    fn slot(&mut self) -> Slot<'_> {
        Slot::Seq(self)
    }
}
