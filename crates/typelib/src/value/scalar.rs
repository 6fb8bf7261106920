// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Scalar access: typed reads and writes of numeric, enum and string leaves.

use crate::convert::RichValue;
use crate::error::{Error, Result};
use crate::layout::{ContainerKind, NumericKind, TypeKind};
use crate::value::Value;

/// Rust types that map onto a native numeric leaf (native endianness).
pub trait Scalar: Copy + Sized {
    /// True if this Rust type can read and write a leaf of `kind`.
    fn accepts(kind: NumericKind) -> bool;
    fn decode(bytes: &[u8]) -> Self;
    fn encode(self) -> Vec<u8>;
}

macro_rules! impl_scalar {
    ($ty:ty, $($kind:ident)|+) => {
        impl Scalar for $ty {
            fn accepts(kind: NumericKind) -> bool {
                matches!(kind, $(NumericKind::$kind)|+)
            }

            fn decode(bytes: &[u8]) -> Self {
                let mut raw = [0u8; std::mem::size_of::<$ty>()];
                raw.copy_from_slice(&bytes[..std::mem::size_of::<$ty>()]);
                <$ty>::from_ne_bytes(raw)
            }

            fn encode(self) -> Vec<u8> {
                self.to_ne_bytes().to_vec()
            }
        }
    };
}

impl_scalar!(i8, I8 | Char);
impl_scalar!(u8, U8 | Char);
impl_scalar!(i16, I16);
impl_scalar!(u16, U16);
impl_scalar!(i32, I32);
impl_scalar!(u32, U32);
impl_scalar!(i64, I64);
impl_scalar!(u64, U64);
impl_scalar!(f32, F32);
impl_scalar!(f64, F64);

impl Scalar for bool {
    fn accepts(kind: NumericKind) -> bool {
        kind == NumericKind::Bool
    }

    fn decode(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }

    fn encode(self) -> Vec<u8> {
        vec![u8::from(self)]
    }
}

fn numeric_of(value: &Value, operation: &'static str) -> Result<NumericKind> {
    value.descriptor().numeric_kind().ok_or_else(|| {
        Error::invalid(operation, value.type_name(), "not a numeric leaf")
    })
}

impl Value {
    /// Read a numeric leaf as `T`. The Rust type must match the native kind.
    pub fn get<T: Scalar>(&self) -> Result<T> {
        let kind = numeric_of(self, "Value::get")?;
        if !T::accepts(kind) {
            return Err(Error::invalid(
                "Value::get",
                self.type_name(),
                format!("cannot read {:?} as {}", kind, std::any::type_name::<T>()),
            ));
        }
        let bytes = self.read_bytes("Value::get")?;
        Ok(T::decode(&bytes))
    }

    /// Write a numeric leaf from `T`. The Rust type must match the native kind.
    pub fn set<T: Scalar>(&self, value: T) -> Result<()> {
        let kind = numeric_of(self, "Value::set")?;
        if !T::accepts(kind) {
            return Err(Error::invalid(
                "Value::set",
                self.type_name(),
                format!("cannot write {} into {:?}", std::any::type_name::<T>(), kind),
            ));
        }
        self.write_bytes("Value::set", &value.encode())
    }

    pub(crate) fn read_numeric(&self) -> Result<RichValue> {
        let kind = numeric_of(self, "Value::read_rich")?;
        let bytes = self.read_bytes("Value::read_rich")?;
        Ok(match kind {
            NumericKind::Bool => RichValue::Bool(bool::decode(&bytes)),
            NumericKind::Char | NumericKind::I8 => RichValue::I8(i8::decode(&bytes)),
            NumericKind::U8 => RichValue::U8(u8::decode(&bytes)),
            NumericKind::I16 => RichValue::I16(i16::decode(&bytes)),
            NumericKind::U16 => RichValue::U16(u16::decode(&bytes)),
            NumericKind::I32 => RichValue::I32(i32::decode(&bytes)),
            NumericKind::U32 => RichValue::U32(u32::decode(&bytes)),
            NumericKind::I64 => RichValue::I64(i64::decode(&bytes)),
            NumericKind::U64 => RichValue::U64(u64::decode(&bytes)),
            NumericKind::F32 => RichValue::F32(f32::decode(&bytes)),
            NumericKind::F64 => RichValue::F64(f64::decode(&bytes)),
        })
    }

    /// Write any numeric rich value into a numeric leaf. Integers are
    /// range-checked; floats only go into integer leaves when integral.
    pub(crate) fn write_numeric(&self, rich: &RichValue) -> Result<()> {
        const OP: &str = "Value::write_rich";
        let kind = numeric_of(self, OP)?;
        let out_of_range = || {
            Error::invalid(
                OP,
                self.type_name(),
                format!("{:?} does not fit in {:?}", rich, kind),
            )
        };

        let bytes = if kind.is_float() {
            let v = rich.as_f64_lossy().ok_or_else(out_of_range)?;
            match kind {
                NumericKind::F32 => (v as f32).encode(),
                _ => v.encode(),
            }
        } else {
            let v = match rich.as_i128() {
                Some(v) => v,
                None => match rich.as_f64_lossy() {
                    Some(f) if f.fract() == 0.0 && f.is_finite() => f as i128,
                    _ => return Err(out_of_range()),
                },
            };
            let (min, max) = kind.integer_range().ok_or_else(out_of_range)?;
            if v < min || v > max {
                return Err(out_of_range());
            }
            match kind {
                NumericKind::Bool => (v != 0).encode(),
                NumericKind::Char | NumericKind::I8 => (v as i8).encode(),
                NumericKind::U8 => (v as u8).encode(),
                NumericKind::I16 => (v as i16).encode(),
                NumericKind::U16 => (v as u16).encode(),
                NumericKind::I32 => (v as i32).encode(),
                NumericKind::U32 => (v as u32).encode(),
                NumericKind::I64 => (v as i64).encode(),
                _ => (v as u64).encode(),
            }
        };
        self.write_bytes(OP, &bytes)
    }

    /// Integer value of an enum leaf.
    pub fn enum_value(&self) -> Result<i32> {
        if self.descriptor().enum_values().is_none() {
            return Err(Error::invalid(
                "Value::enum_value",
                self.type_name(),
                "not an enum",
            ));
        }
        let bytes = self.read_bytes("Value::enum_value")?;
        Ok(i32::decode(&bytes))
    }

    /// Symbol of an enum leaf (`None` if the value has no symbol).
    pub fn enum_symbol(&self) -> Result<Option<String>> {
        let value = self.enum_value()?;
        Ok(self
            .descriptor()
            .enum_values()
            .and_then(|values| values.name_of(value))
            .map(str::to_owned))
    }

    /// Set an enum leaf by symbol.
    pub fn set_enum(&self, symbol: &str) -> Result<()> {
        let values = self.descriptor().enum_values().ok_or_else(|| {
            Error::invalid("Value::set_enum", self.type_name(), "not an enum")
        })?;
        let value = values.value_of(symbol).ok_or_else(|| {
            Error::invalid(
                "Value::set_enum",
                self.type_name(),
                format!("unknown symbol '{}'", symbol),
            )
        })?;
        self.write_bytes("Value::set_enum", &value.encode())
    }

    /// Read a fixed string (up to the first NUL) or a string container.
    pub fn read_string(&self) -> Result<String> {
        match self.descriptor().kind() {
            TypeKind::FixedString(_) => {
                let bytes = self.read_bytes("Value::read_string")?;
                let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
                Ok(String::from_utf8_lossy(&bytes[..end]).into_owned())
            }
            TypeKind::Container(container) if container.kind == ContainerKind::String => {
                let bytes = self.container_bytes("Value::read_string")?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            _ => Err(Error::invalid(
                "Value::read_string",
                self.type_name(),
                "not a string",
            )),
        }
    }

    /// Write a fixed string or a string container.
    ///
    /// A fixed string needs room for the terminating NUL: strings of
    /// `length` bytes or more are rejected. The remainder is zero-filled.
    pub fn write_string(&self, text: &str) -> Result<()> {
        match self.descriptor().kind() {
            TypeKind::FixedString(array) => {
                if text.len() >= array.length {
                    return Err(Error::invalid(
                        "Value::write_string",
                        self.type_name(),
                        format!(
                            "string of {} bytes does not fit (capacity {} with NUL)",
                            text.len(),
                            array.length
                        ),
                    ));
                }
                let mut bytes = vec![0u8; self.size()];
                bytes[..text.len()].copy_from_slice(text.as_bytes());
                self.write_bytes("Value::write_string", &bytes)
            }
            TypeKind::Container(container) if container.kind == ContainerKind::String => {
                self.container_set_bytes("Value::write_string", text.as_bytes())
            }
            _ => Err(Error::invalid(
                "Value::write_string",
                self.type_name(),
                "not a string",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::TypeDescriptor;
    use std::sync::Arc;

    fn numeric(kind: NumericKind) -> Value {
        Value::new(&Arc::new(TypeDescriptor::numeric("/n", kind)))
    }

    #[test]
    fn test_get_set_matching_kind() {
        let v = numeric(NumericKind::F64);
        v.set(2.5f64).expect("set");
        assert_eq!(v.get::<f64>().expect("get"), 2.5);
        assert!(v.get::<i64>().is_err());
        assert!(v.set(1i32).is_err());
    }

    #[test]
    fn test_char_accepts_both_byte_types() {
        let v = numeric(NumericKind::Char);
        v.set(b'a').expect("set u8");
        assert_eq!(v.get::<i8>().expect("get"), b'a' as i8);
    }

    #[test]
    fn test_numeric_writes_are_range_checked() {
        let v = numeric(NumericKind::U8);
        v.write_numeric(&RichValue::I64(200)).expect("fits");
        assert_eq!(v.get::<u8>().expect("get"), 200);
        assert!(v.write_numeric(&RichValue::I64(256)).is_err());
        assert!(v.write_numeric(&RichValue::I32(-1)).is_err());
        assert!(v.write_numeric(&RichValue::F64(1.5)).is_err());
        v.write_numeric(&RichValue::F64(3.0)).expect("integral float");
        assert_eq!(v.get::<u8>().expect("get"), 3);
    }

    #[test]
    fn test_fixed_string_needs_room_for_nul() {
        let char_t = Arc::new(TypeDescriptor::numeric("/char", NumericKind::Char));
        let v = Value::new(&Arc::new(TypeDescriptor::array_of(&char_t, 4)));
        v.write_string("abc").expect("fits");
        assert_eq!(v.read_string().expect("read"), "abc");
        assert!(v.write_string("abcd").is_err());
        v.write_string("x").expect("shorter");
        assert_eq!(v.read_string().expect("read"), "x");
        assert_eq!(v.to_byte_array().expect("bytes"), vec![b'x', 0, 0, 0]);
    }
}
