// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Conversion between native layouts and rich values.
//!
//! A [`ConversionRegistry`] maps descriptors (by structural identity, so
//! equivalent descriptors from different type registries share converters)
//! to a pair of functions: native → rich and rich → native. Compounds,
//! arrays and vectors without a converter of their own are converted
//! recursively, so a `vector<vector<T>>` with a converter for `T` becomes a
//! sequence of sequences of converted `T`. Everything else falls back to
//! the generic leaf conversion.
//!
//! # Example
//!
//! ```rust
//! use typelib::{ConversionRegistry, Registry, RichValue, Value};
//!
//! let registry = Registry::with_standard_types();
//! let int_t = registry.get("/int").unwrap();
//! let conversions = ConversionRegistry::new();
//! conversions.register(
//!     &int_t,
//!     |v| Ok(RichValue::String(v.get::<i32>()?.to_string())),
//!     |rich, desc| {
//!         let v = Value::new(desc);
//!         v.set(rich.as_str().unwrap_or("0").parse::<i32>().unwrap_or(0))?;
//!         Ok(v)
//!     },
//! );
//!
//! let v = Value::new(&int_t);
//! v.set(7i32).unwrap();
//! assert_eq!(conversions.to_rich(&v).unwrap(), RichValue::from("7"));
//! ```

mod cache;
mod rich;

pub use cache::{ConvertedView, FieldValue};
pub use rich::RichValue;

use crate::error::{Error, Result};
use crate::layout::{ContainerKind, EquivalenceHash, TypeDescriptor, TypeKind};
use crate::value::{copy, Value};
use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;

/// Native → rich conversion function.
pub type ToRichFn = Arc<dyn Fn(&Value) -> Result<RichValue> + Send + Sync>;

/// Rich → native conversion function. Returns a value described by (an
/// equivalent of) the given descriptor.
pub type FromRichFn = Arc<dyn Fn(&RichValue, &Arc<TypeDescriptor>) -> Result<Value> + Send + Sync>;

/// A registered converter pair.
pub struct Converter {
    descriptor: Arc<TypeDescriptor>,
    to_rich: ToRichFn,
    from_rich: FromRichFn,
}

impl Converter {
    /// Descriptor the pair was registered for.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn to_rich(&self, value: &Value) -> Result<RichValue> {
        (self.to_rich)(value)
    }

    pub fn from_rich(&self, rich: &RichValue, descriptor: &Arc<TypeDescriptor>) -> Result<Value> {
        (self.from_rich)(rich, descriptor)
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("descriptor", &self.descriptor.name())
            .finish_non_exhaustive()
    }
}

/// Converter pairs keyed by descriptor equivalence.
#[derive(Default)]
pub struct ConversionRegistry {
    converters: DashMap<EquivalenceHash, Arc<Converter>>,
}

impl ConversionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Associate `descriptor` (and every equivalent descriptor) with a
    /// converter pair, replacing any previous pair.
    pub fn register<F, G>(&self, descriptor: &Arc<TypeDescriptor>, to_rich: F, from_rich: G)
    where
        F: Fn(&Value) -> Result<RichValue> + Send + Sync + 'static,
        G: Fn(&RichValue, &Arc<TypeDescriptor>) -> Result<Value> + Send + Sync + 'static,
    {
        let converter = Converter {
            descriptor: Arc::clone(descriptor),
            to_rich: Arc::new(to_rich),
            from_rich: Arc::new(from_rich),
        };
        if self
            .converters
            .insert(descriptor.equivalence_hash(), Arc::new(converter))
            .is_some()
        {
            log::debug!(
                "[ConversionRegistry::register] replaced converter for {}",
                descriptor.name()
            );
        } else {
            log::debug!(
                "[ConversionRegistry::register] converter for {}",
                descriptor.name()
            );
        }
    }

    /// Converter registered for `descriptor` or an equivalent one.
    pub fn lookup(&self, descriptor: &TypeDescriptor) -> Option<Arc<Converter>> {
        if self.converters.is_empty() {
            return None;
        }
        let converter = self
            .converters
            .get(&descriptor.equivalence_hash())
            .map(|entry| Arc::clone(entry.value()))?;
        converter
            .descriptor
            .is_equivalent(descriptor)
            .then_some(converter)
    }

    pub fn len(&self) -> usize {
        self.converters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.converters.is_empty()
    }

    /// True if `descriptor` has a converter, directly or through a field,
    /// array element or vector element.
    pub fn needs_conversion(&self, descriptor: &TypeDescriptor) -> bool {
        if self.converters.is_empty() {
            return false;
        }
        if self.lookup(descriptor).is_some() {
            return true;
        }
        match descriptor.kind() {
            TypeKind::Compound(fields) => fields
                .iter()
                .any(|field| self.needs_conversion(&field.type_desc)),
            TypeKind::Array(array) => self.needs_conversion(&array.element),
            TypeKind::Container(container) if container.kind == ContainerKind::Vector => {
                self.needs_conversion(&container.element)
            }
            _ => false,
        }
    }

    /// Convert a native value to its rich form.
    pub fn to_rich(&self, value: &Value) -> Result<RichValue> {
        read(value, Some(self))
    }

    /// Write a rich value into an existing native value.
    pub fn write_rich(&self, rich: &RichValue, value: &Value) -> Result<()> {
        write(rich, value, Some(self))
    }

    /// Build a fresh native value from a rich one.
    pub fn from_rich(&self, rich: &RichValue, descriptor: &Arc<TypeDescriptor>) -> Result<Value> {
        let value = Value::new(descriptor);
        self.write_rich(rich, &value)?;
        Ok(value)
    }
}

impl fmt::Debug for ConversionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionRegistry")
            .field("converters", &self.converters.len())
            .finish()
    }
}

pub(crate) fn read(value: &Value, conversions: Option<&ConversionRegistry>) -> Result<RichValue> {
    if let Some(converter) = conversions.and_then(|c| c.lookup(value.descriptor())) {
        return converter.to_rich(value);
    }

    match value.descriptor().kind() {
        TypeKind::Numeric(_) => value.read_numeric(),
        TypeKind::Enum(_) => Ok(RichValue::Enum(
            i64::from(value.enum_value()?),
            value.enum_symbol()?.unwrap_or_default(),
        )),
        TypeKind::Pointer(_) => Ok(match value.pointer_address()? {
            0 => RichValue::Null,
            address => RichValue::Pointer(address as u64),
        }),
        TypeKind::Opaque => Ok(RichValue::Bytes(value.read_bytes("Value::read_rich")?)),
        TypeKind::FixedString(_) => Ok(RichValue::String(value.read_string()?)),
        TypeKind::Array(array) => {
            let items = (0..array.length)
                .map(|i| read(&value.element(i)?, conversions))
                .collect::<Result<Vec<_>>>()?;
            Ok(RichValue::Array(items))
        }
        TypeKind::Compound(fields) => {
            let items = fields
                .iter()
                .map(|field| {
                    let rich = read(&value.field(&field.name)?, conversions)?;
                    Ok((field.name.clone(), rich))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(RichValue::Struct(items))
        }
        TypeKind::Container(container) => match container.kind {
            ContainerKind::String => Ok(RichValue::String(value.read_string()?)),
            ContainerKind::Vector => {
                let items = (0..value.len()?)
                    .map(|i| read(&value.element(i)?, conversions))
                    .collect::<Result<Vec<_>>>()?;
                Ok(RichValue::Sequence(items))
            }
        },
    }
}

fn mismatch(value: &Value, rich: &RichValue) -> Error {
    Error::invalid(
        "Value::write_rich",
        value.type_name(),
        format!("cannot write {:?}", rich),
    )
}

pub(crate) fn write(
    rich: &RichValue,
    value: &Value,
    conversions: Option<&ConversionRegistry>,
) -> Result<()> {
    if let Some(converter) = conversions.and_then(|c| c.lookup(value.descriptor())) {
        let native = converter.from_rich(rich, value.descriptor())?;
        return copy(value, &native);
    }

    match (value.descriptor().kind(), rich) {
        (TypeKind::Numeric(_), _) => value.write_numeric(rich),
        (TypeKind::Enum(_), RichValue::String(symbol)) => value.set_enum(symbol),
        (TypeKind::Enum(values), RichValue::Enum(number, symbol)) => {
            match values.value_of(symbol) {
                Some(_) => value.set_enum(symbol),
                None => {
                    let number = i32::try_from(*number).map_err(|_| mismatch(value, rich))?;
                    value.write_bytes("Value::write_rich", &number.to_ne_bytes())
                }
            }
        }
        (TypeKind::Enum(_), _) => {
            let number = rich
                .as_i128()
                .and_then(|v| i32::try_from(v).ok())
                .ok_or_else(|| mismatch(value, rich))?;
            value.write_bytes("Value::write_rich", &number.to_ne_bytes())
        }
        (TypeKind::Pointer(_), RichValue::Null) => value.set_null(),
        (TypeKind::Pointer(_), RichValue::Pointer(address)) => {
            let address = usize::try_from(*address).map_err(|_| mismatch(value, rich))?;
            value.write_bytes("Value::write_rich", &address.to_ne_bytes())
        }
        (TypeKind::Opaque, RichValue::Bytes(bytes)) => value.write_bytes("Value::write_rich", bytes),
        (TypeKind::FixedString(_), RichValue::String(text)) => value.write_string(text),
        (TypeKind::Array(array), RichValue::Array(items) | RichValue::Sequence(items)) => {
            if items.len() != array.length {
                return Err(Error::invalid(
                    "Value::write_rich",
                    value.type_name(),
                    format!("expected {} elements, got {}", array.length, items.len()),
                ));
            }
            for (i, item) in items.iter().enumerate() {
                write(item, &value.element(i)?, conversions)?;
            }
            Ok(())
        }
        (TypeKind::Compound(_), RichValue::Struct(fields)) => {
            for (name, item) in fields {
                write(item, &value.field(name)?, conversions)?;
            }
            Ok(())
        }
        (TypeKind::Container(container), RichValue::String(text))
            if container.kind == ContainerKind::String =>
        {
            value.write_string(text)
        }
        (TypeKind::Container(container), RichValue::Sequence(items) | RichValue::Array(items))
            if container.kind == ContainerKind::Vector =>
        {
            value.resize(items.len())?;
            for (i, item) in items.iter().enumerate() {
                write(item, &value.element(i)?, conversions)?;
            }
            Ok(())
        }
        _ => Err(mismatch(value, rich)),
    }
}
