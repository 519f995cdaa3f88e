//! Scalar assignment with numeric coercion.

use crate::{
    error::{DecodeErrorKind, Side},
    target::Slot,
    value::{Kind, Value},
};

/// 2^63, the first float past `i64::MAX` after truncation.
const I64_END: f64 = 9_223_372_036_854_775_808.0;
/// 2^64, the first float past `u64::MAX` after truncation.
const U64_END: f64 = 18_446_744_073_709_551_616.0;

/// Assign the scalar `source` into `slot`.
///
/// | destination | accepted sources |
/// |---|---|
/// | signed int | int, uint up to `i64::MAX`, float (truncated) |
/// | unsigned int | uint, non-negative int, float (truncated) |
/// | float | int, uint, float |
/// | complex | complex |
/// | bool | bool |
/// | string | string |
///
/// Pointer layers are allocated and assigned through. Records and sequences
/// have no scalar rule and fail with `UnsupportedKind`.
pub(crate) fn assign_scalar(slot: Slot<'_>, source: &Value) -> Result<(), DecodeErrorKind> {
    log::trace!("assigning {} into {}", source.kind(), slot.type_name());

    match slot {
        Slot::Indirect(ptr) => assign_scalar(ptr.pointee_or_default().slot(), source),
        Slot::Int(dst) => {
            let type_name = dst.type_name();
            let value = match source {
                Value::Int(v) => *v,
                Value::Uint(v) => i64::try_from(*v).map_err(|_| DecodeErrorKind::Overflow {
                    value: v.to_string(),
                    type_name,
                })?,
                Value::Float(f) => truncate_signed(*f, type_name)?,
                other => return Err(mismatch(type_name, Kind::Int, other)),
            };
            dst.set(value)
        }
        Slot::Uint(dst) => {
            let type_name = dst.type_name();
            let value = match source {
                Value::Uint(v) => *v,
                Value::Int(v) => u64::try_from(*v).map_err(|_| DecodeErrorKind::NegativeValue {
                    value: v.to_string(),
                    type_name,
                })?,
                Value::Float(f) => truncate_unsigned(*f, type_name)?,
                other => return Err(mismatch(type_name, Kind::Uint, other)),
            };
            dst.set(value)
        }
        Slot::Float(dst) => {
            let value = match source {
                Value::Int(v) => *v as f64,
                Value::Uint(v) => *v as f64,
                Value::Float(f) => *f,
                other => return Err(mismatch(dst.type_name(), Kind::Float, other)),
            };
            dst.set(value);
            Ok(())
        }
        Slot::Complex(dst) => match source {
            Value::Complex(c) => {
                dst.set(*c);
                Ok(())
            }
            other => Err(mismatch(dst.type_name(), Kind::Complex, other)),
        },
        Slot::Bool(dst) => match source {
            Value::Bool(b) => {
                *dst = *b;
                Ok(())
            }
            other => Err(mismatch("bool", Kind::Bool, other)),
        },
        Slot::String(dst) => match source {
            Value::String(s) => {
                dst.clone_from(s);
                Ok(())
            }
            other => Err(mismatch("String", Kind::String, other)),
        },
        other @ (Slot::Seq(_) | Slot::Record(_)) => Err(DecodeErrorKind::UnsupportedKind {
            side: Side::Destination,
            kind: other.kind(),
        }),
    }
}

fn mismatch(type_name: &'static str, expected: Kind, got: &Value) -> DecodeErrorKind {
    DecodeErrorKind::TypeMismatch {
        field: None,
        type_name,
        expected,
        got: got.kind(),
    }
}

fn truncate_signed(value: f64, type_name: &'static str) -> Result<i64, DecodeErrorKind> {
    let truncated = value.trunc();
    if truncated.is_nan() || truncated < -I64_END || truncated >= I64_END {
        return Err(DecodeErrorKind::Overflow {
            value: value.to_string(),
            type_name,
        });
    }
    Ok(truncated as i64)
}

fn truncate_unsigned(value: f64, type_name: &'static str) -> Result<u64, DecodeErrorKind> {
    let truncated = value.trunc();
    if truncated < 0.0 {
        return Err(DecodeErrorKind::NegativeValue {
            value: value.to_string(),
            type_name,
        });
    }
    if truncated.is_nan() || truncated >= U64_END {
        return Err(DecodeErrorKind::Overflow {
            value: value.to_string(),
            type_name,
        });
    }
    Ok(truncated as u64)
}

#[cfg(test)]
mod tests {
    use num_complex::{Complex32, Complex64};

    use super::*;
    use crate::target::Target;

    fn assign<T: Target + Default>(source: impl Into<Value>) -> Result<T, DecodeErrorKind> {
        let mut dst = T::default();
        assign_scalar(dst.slot(), &source.into())?;
        Ok(dst)
    }

    #[test]
    fn signed_destinations() {
        assert_eq!(assign::<i64>(42), Ok(42));
        assert_eq!(assign::<i64>(42u64), Ok(42));
        assert_eq!(assign::<i64>(42.9), Ok(42));
        assert_eq!(assign::<i64>(-42.9), Ok(-42));
        assert_eq!(assign::<i8>(-128), Ok(-128));
        assert_eq!(
            assign::<i64>(u64::MAX),
            Err(DecodeErrorKind::Overflow {
                value: u64::MAX.to_string(),
                type_name: "i64",
            })
        );
        assert!(matches!(
            assign::<i16>(70_000),
            Err(DecodeErrorKind::Overflow { type_name: "i16", .. })
        ));
        assert!(matches!(
            assign::<i64>(f64::NAN),
            Err(DecodeErrorKind::Overflow { .. })
        ));
        assert!(matches!(
            assign::<i64>(1e19),
            Err(DecodeErrorKind::Overflow { .. })
        ));
        assert_eq!(assign::<i64>(i64::MIN as f64), Ok(i64::MIN));
    }

    #[test]
    fn unsigned_destinations() {
        assert_eq!(assign::<u64>(42), Ok(42));
        assert_eq!(assign::<u64>(u64::MAX), Ok(u64::MAX));
        assert_eq!(assign::<u32>(42.5), Ok(42));
        assert_eq!(assign::<u8>(-0.5), Ok(0));
        assert_eq!(
            assign::<u64>(-1),
            Err(DecodeErrorKind::NegativeValue {
                value: "-1".into(),
                type_name: "u64",
            })
        );
        assert!(matches!(
            assign::<u32>(-1.5),
            Err(DecodeErrorKind::NegativeValue { .. })
        ));
        assert!(matches!(
            assign::<u8>(256u64),
            Err(DecodeErrorKind::Overflow { type_name: "u8", .. })
        ));
    }

    #[test]
    fn float_destinations() {
        assert_eq!(assign::<f64>(42), Ok(42.0));
        assert_eq!(assign::<f64>(42u64), Ok(42.0));
        assert_eq!(assign::<f64>(42.5), Ok(42.5));
        assert_eq!(assign::<f32>(0.25), Ok(0.25));
    }

    #[test]
    fn complex_destinations_take_only_complex() {
        assert_eq!(
            assign::<Complex32>(Complex64::new(1.0, 2.0)),
            Ok(Complex32::new(1.0, 2.0))
        );
        assert_eq!(
            assign::<Complex64>(42),
            Err(DecodeErrorKind::TypeMismatch {
                field: None,
                type_name: "Complex64",
                expected: Kind::Complex,
                got: Kind::Int,
            })
        );
    }

    #[test]
    fn bool_and_string_take_only_themselves() {
        assert_eq!(assign::<bool>(true), Ok(true));
        assert_eq!(assign::<String>("test"), Ok("test".to_string()));
        assert!(matches!(
            assign::<bool>(1),
            Err(DecodeErrorKind::TypeMismatch { expected: Kind::Bool, got: Kind::Int, .. })
        ));
        assert!(matches!(
            assign::<String>(42),
            Err(DecodeErrorKind::TypeMismatch { expected: Kind::String, got: Kind::Int, .. })
        ));
        assert!(matches!(
            assign::<i32>("42"),
            Err(DecodeErrorKind::TypeMismatch { expected: Kind::Int, got: Kind::String, .. })
        ));
    }

    #[test]
    fn pointer_layers_are_allocated() {
        assert_eq!(assign::<Option<Option<i32>>>(7), Ok(Some(Some(7))));
        assert_eq!(assign::<Box<String>>("boxed"), Ok(Box::new("boxed".to_string())));
    }

    #[test]
    fn containers_have_no_scalar_rule() {
        assert_eq!(
            assign::<Vec<i32>>(1),
            Err(DecodeErrorKind::UnsupportedKind {
                side: Side::Destination,
                kind: Kind::Seq,
            })
        );
    }
}
