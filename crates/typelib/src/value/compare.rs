// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structural comparison, casting and in-place copy.
//!
//! Equality walks the layout: numbers compare by value, compounds field by
//! field, arrays element by element, fixed strings up to the first NUL,
//! containers by length and elements. Bytes no field covers (padding) are
//! never looked at, which is what separates `structural_eq` from
//! `memory_eql`.

use crate::error::{Error, Result};
use crate::layout::{NumericKind, TypeDescriptor, TypeKind};
use crate::memory::Zone;
use crate::value::Value;
use std::ops::Deref;
use std::sync::Arc;

/// Outcome of [`Value::cast`].
#[derive(Debug)]
pub enum Cast<'a> {
    /// The target is the value's own descriptor instance.
    Same(&'a Value),
    /// The target is an equivalent descriptor: a new view over the same
    /// zone and offset.
    Reinterpreted(Value),
}

impl Cast<'_> {
    /// Owned view (an alias when the cast was a no-op).
    pub fn into_value(self) -> Value {
        match self {
            Cast::Same(value) => value.alias(),
            Cast::Reinterpreted(value) => value,
        }
    }

    pub fn is_same(&self) -> bool {
        matches!(self, Cast::Same(_))
    }
}

impl Deref for Cast<'_> {
    type Target = Value;

    fn deref(&self) -> &Value {
        match self {
            Cast::Same(value) => value,
            Cast::Reinterpreted(value) => value,
        }
    }
}

fn require_equivalent(operation: &'static str, a: &Value, b: &Value) -> Result<()> {
    if a.descriptor().is_equivalent(b.descriptor()) {
        Ok(())
    } else {
        Err(Error::invalid(
            operation,
            a.type_name(),
            format!("not structurally equivalent to {}", b.type_name()),
        ))
    }
}

impl Value {
    /// Field-aware equality.
    ///
    /// Comparing values whose descriptors are not structurally equivalent is
    /// a usage error (`InvalidArgument`), not a plain `false`.
    pub fn structural_eq(&self, other: &Value) -> Result<bool> {
        require_equivalent("Value::structural_eq", self, other)?;
        values_equal(self, other)
    }

    /// Reinterpret under `target` without copying.
    pub fn cast(&self, target: &Arc<TypeDescriptor>) -> Result<Cast<'_>> {
        if Arc::ptr_eq(self.descriptor(), target) {
            return Ok(Cast::Same(self));
        }
        if !self.descriptor().is_equivalent(target) {
            return Err(Error::invalid(
                "Value::cast",
                self.type_name(),
                format!("not structurally equivalent to {}", target.name()),
            ));
        }
        self.zone().ensure_live("Value::cast")?;
        Ok(Cast::Reinterpreted(Value::view(
            self.zone().clone(),
            self.offset(),
            Arc::clone(target),
        )))
    }
}

/// Overwrite `destination` with the bytes of `source`, in place.
///
/// The descriptors must be equivalent. Container storage reachable from the
/// source range is duplicated, so `destination.memory_eql(source)` holds
/// afterwards and later mutations of either side stay invisible to the
/// other.
pub fn copy(destination: &Value, source: &Value) -> Result<()> {
    require_equivalent("value::copy", destination, source)?;
    if destination.size() != source.size() {
        return Err(Error::invalid(
            "value::copy",
            destination.type_name(),
            format!("size {} differs from {}", destination.size(), source.size()),
        ));
    }
    Zone::copy_range(
        source.zone(),
        source.offset(),
        destination.zone(),
        destination.offset(),
        destination.size(),
    )?;
    destination.converted_cache().lock().clear();
    Ok(())
}

fn values_equal(a: &Value, b: &Value) -> Result<bool> {
    match a.descriptor().kind() {
        TypeKind::Numeric(kind) => numeric_equal(*kind, a, b),
        TypeKind::Enum(_) => Ok(a.enum_value()? == b.enum_value()?),
        TypeKind::Pointer(_) => Ok(a.pointer_address()? == b.pointer_address()?),
        TypeKind::Opaque => {
            Ok(a.read_bytes("Value::structural_eq")? == b.read_bytes("Value::structural_eq")?)
        }
        TypeKind::FixedString(_) => {
            let left = a.read_bytes("Value::structural_eq")?;
            let right = b.read_bytes("Value::structural_eq")?;
            Ok(until_nul(&left) == until_nul(&right))
        }
        TypeKind::Array(array) => {
            for i in 0..array.length {
                if !values_equal(&a.element(i)?, &b.element(i)?)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        TypeKind::Compound(fields) => {
            for field in fields {
                if !values_equal(&a.field(&field.name)?, &b.field(&field.name)?)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        TypeKind::Container(_) => {
            let len = a.len()?;
            if len != b.len()? {
                return Ok(false);
            }
            for i in 0..len {
                if !values_equal(&a.element(i)?, &b.element(i)?)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
    }
}

fn numeric_equal(kind: NumericKind, a: &Value, b: &Value) -> Result<bool> {
    Ok(match kind {
        NumericKind::F32 => a.get::<f32>()? == b.get::<f32>()?,
        NumericKind::F64 => a.get::<f64>()? == b.get::<f64>()?,
        NumericKind::Bool => a.get::<bool>()? == b.get::<bool>()?,
        _ => a.read_bytes("Value::structural_eq")? == b.read_bytes("Value::structural_eq")?,
    })
}

fn until_nul(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
    &bytes[..end]
}
