// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Rich (application-level) values.

/// Application-level representation of a native value.
#[derive(Debug, Clone, PartialEq)]
pub enum RichValue {
    // Primitives
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    F32(f32),
    F64(f64),
    String(String),
    /// Raw bytes of an opaque type.
    Bytes(Vec<u8>),

    // Composites
    /// Compound fields in declaration order.
    Struct(Vec<(String, RichValue)>),
    /// Container elements.
    Sequence(Vec<RichValue>),
    /// Fixed-length array elements.
    Array(Vec<RichValue>),
    Enum(i64, String), // (value, symbol)
    /// Native pointer (address).
    Pointer(u64),

    // Special
    Null,
}

impl RichValue {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Self::I32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::I64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::F64(v) => Some(*v),
            _ => None,
        }
    }

    /// Any integer-like variant widened to `i128` (booleans are 0/1, enums
    /// their value).
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            Self::Bool(v) => Some(i128::from(*v)),
            Self::U8(v) => Some(i128::from(*v)),
            Self::U16(v) => Some(i128::from(*v)),
            Self::U32(v) => Some(i128::from(*v)),
            Self::U64(v) => Some(i128::from(*v)),
            Self::I8(v) => Some(i128::from(*v)),
            Self::I16(v) => Some(i128::from(*v)),
            Self::I32(v) => Some(i128::from(*v)),
            Self::I64(v) => Some(i128::from(*v)),
            Self::Enum(v, _) => Some(i128::from(*v)),
            _ => None,
        }
    }

    /// Any numeric variant as `f64` (may lose precision for 64-bit integers).
    pub fn as_f64_lossy(&self) -> Option<f64> {
        match self {
            Self::F32(v) => Some(f64::from(*v)),
            Self::F64(v) => Some(*v),
            other => other.as_i128().map(|v| v as f64),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    /// Elements of a sequence or array.
    pub fn as_sequence(&self) -> Option<&[RichValue]> {
        match self {
            Self::Sequence(v) | Self::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_sequence_mut(&mut self) -> Option<&mut Vec<RichValue>> {
        match self {
            Self::Sequence(v) | Self::Array(v) => Some(v),
            _ => None,
        }
    }

    pub fn get_field(&self, name: &str) -> Option<&RichValue> {
        match self {
            Self::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn get_field_mut(&mut self, name: &str) -> Option<&mut RichValue> {
        match self {
            Self::Struct(fields) => fields
                .iter_mut()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Set (or append) a struct field. Returns false on non-struct values.
    pub fn set_field(&mut self, name: impl Into<String>, value: RichValue) -> bool {
        match self {
            Self::Struct(fields) => {
                let name = name.into();
                match fields.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, slot)) => *slot = value,
                    None => fields.push((name, value)),
                }
                true
            }
            _ => false,
        }
    }

    pub fn enum_symbol(&self) -> Option<&str> {
        match self {
            Self::Enum(_, name) => Some(name),
            _ => None,
        }
    }
}

macro_rules! impl_from_scalar {
    ($ty:ty, $variant:ident) => {
        impl From<$ty> for RichValue {
            fn from(v: $ty) -> Self {
                Self::$variant(v)
            }
        }
    };
}

impl_from_scalar!(bool, Bool);
impl_from_scalar!(u8, U8);
impl_from_scalar!(u16, U16);
impl_from_scalar!(u32, U32);
impl_from_scalar!(u64, U64);
impl_from_scalar!(i8, I8);
impl_from_scalar!(i16, I16);
impl_from_scalar!(i32, I32);
impl_from_scalar!(i64, I64);
impl_from_scalar!(f32, F32);
impl_from_scalar!(f64, F64);
impl_from_scalar!(String, String);

impl From<&str> for RichValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl<T: Into<RichValue>> From<Vec<T>> for RichValue {
    fn from(v: Vec<T>) -> Self {
        Self::Sequence(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_widening() {
        assert_eq!(RichValue::from(200u8).as_i128(), Some(200));
        assert_eq!(RichValue::from(-3i16).as_i128(), Some(-3));
        assert_eq!(RichValue::from(true).as_i128(), Some(1));
        assert_eq!(RichValue::from(1.5f32).as_f64_lossy(), Some(1.5));
        assert_eq!(RichValue::from("x").as_i128(), None);
    }

    #[test]
    fn test_struct_fields_keep_order() {
        let mut v = RichValue::Struct(Vec::new());
        assert!(v.set_field("b", 2i32.into()));
        assert!(v.set_field("a", 1i32.into()));
        assert!(v.set_field("b", 3i32.into()));
        assert_eq!(v.get_field("b").and_then(RichValue::as_i32), Some(3));
        match &v {
            RichValue::Struct(fields) => {
                let names: Vec<&str> = fields.iter().map(|(n, _)| n.as_str()).collect();
                assert_eq!(names, vec!["b", "a"]);
            }
            other => panic!("expected struct, got {:?}", other),
        }
        assert!(!RichValue::Null.clone().set_field("x", RichValue::Null));
    }

    #[test]
    fn test_sequence_from_vec() {
        let mut v = RichValue::from(vec![1i64, 2, 3]);
        assert_eq!(v.as_sequence().map(<[RichValue]>::len), Some(3));
        v.as_sequence_mut().expect("sequence").push(4i64.into());
        assert_eq!(v.as_sequence().and_then(|s| s[3].as_i64()), Some(4));
    }
}
