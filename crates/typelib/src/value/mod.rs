// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Typed views over memory zones.
//!
//! A [`Value`] is a `(Zone, offset, descriptor)` triple. It never owns memory
//! on its own: sub-views (fields, elements, casts, aliases) share the zone of
//! the value they were taken from, and the zone stays allocated as long as
//! any view holds it. Every access checks the zone liveness first, so a
//! view whose zone was released fails with `StaleReference`.
//!
//! # Example
//!
//! ```rust
//! use typelib::{Registry, Value};
//!
//! let registry = Registry::with_standard_types();
//! let int_t = registry.get("/int").unwrap();
//! let v = Value::new(&int_t);
//! v.set(42i32).unwrap();
//! assert_eq!(v.get::<i32>().unwrap(), 42);
//! assert_eq!(v.to_byte_array().unwrap(), 42i32.to_ne_bytes().to_vec());
//! ```

mod compare;
mod container;
mod pointer;
mod scalar;

pub use compare::{copy, Cast};
pub use scalar::Scalar;

use crate::convert::{self, ConvertedView, RichValue};
use crate::error::{Error, Result};
use crate::layout::{TypeDescriptor, TypeKind};
use crate::memory::Zone;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::ptr::NonNull;
use std::sync::Arc;

/// A typed view into a memory zone.
pub struct Value {
    zone: Zone,
    offset: usize,
    descriptor: Arc<TypeDescriptor>,
    /// Converted field views, cached per instance.
    converted: Mutex<HashMap<String, ConvertedView>>,
}

impl Value {
    pub(crate) fn view(zone: Zone, offset: usize, descriptor: Arc<TypeDescriptor>) -> Self {
        Self {
            zone,
            offset,
            descriptor,
            converted: Mutex::new(HashMap::new()),
        }
    }

    /// Instantiate `descriptor` over a fresh zero-filled zone.
    pub fn new(descriptor: &Arc<TypeDescriptor>) -> Self {
        Self::view(Zone::zeroed(descriptor.size()), 0, Arc::clone(descriptor))
    }

    /// Take `bytes` as the backing storage of a new value (no copy).
    ///
    /// The buffer length must equal the descriptor size exactly; nothing is
    /// truncated or padded.
    pub fn wrap(descriptor: &Arc<TypeDescriptor>, bytes: Vec<u8>) -> Result<Self> {
        if bytes.len() != descriptor.size() {
            return Err(Error::invalid(
                "Value::wrap",
                descriptor.name(),
                format!(
                    "expected a buffer of {} bytes, got {}",
                    descriptor.size(),
                    bytes.len()
                ),
            ));
        }
        Ok(Self::view(Zone::owned(bytes), 0, Arc::clone(descriptor)))
    }

    /// View caller memory without copying or taking ownership.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes of `len` bytes, and the caller
    /// must keep that memory alive at least as long as any value (including
    /// sub-views, casts and aliases) wraps it. The engine never frees it.
    pub unsafe fn wrap_raw(
        descriptor: &Arc<TypeDescriptor>,
        ptr: *mut u8,
        len: usize,
    ) -> Result<Self> {
        let Some(ptr) = NonNull::new(ptr) else {
            return Err(Error::invalid(
                "Value::wrap_raw",
                descriptor.name(),
                "null buffer",
            ));
        };
        if len != descriptor.size() {
            return Err(Error::invalid(
                "Value::wrap_raw",
                descriptor.name(),
                format!("expected {} bytes, got {}", descriptor.size(), len),
            ));
        }
        // SAFETY: forwarded to the caller through this function's contract.
        let zone = unsafe { Zone::borrowed(ptr, len) };
        Ok(Self::view(zone, 0, Arc::clone(descriptor)))
    }

    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    pub fn type_name(&self) -> &str {
        self.descriptor.name()
    }

    pub fn size(&self) -> usize {
        self.descriptor.size()
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    /// Byte offset inside the zone.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Identity of the view: `(zone_address, offset)`.
    pub fn address(&self) -> (usize, usize) {
        (self.zone.address(), self.offset)
    }

    /// Root address of the zone, shared by every sub-view.
    pub fn zone_address(&self) -> usize {
        self.zone.address()
    }

    /// Native address of the first byte of the view.
    pub fn native_address(&self) -> usize {
        self.zone.address() + self.offset
    }

    pub fn is_live(&self) -> bool {
        self.zone.is_live()
    }

    /// Release the zone behind this view (and every other view over it).
    pub fn release(&self) {
        self.zone.release();
    }

    pub(crate) fn read_bytes(&self, operation: &'static str) -> Result<Vec<u8>> {
        self.zone
            .read(operation, self.offset, self.descriptor.size())
    }

    pub(crate) fn write_bytes(&self, operation: &'static str, bytes: &[u8]) -> Result<()> {
        if bytes.len() != self.descriptor.size() {
            return Err(Error::invalid(
                operation,
                self.descriptor.name(),
                format!(
                    "expected {} bytes, got {}",
                    self.descriptor.size(),
                    bytes.len()
                ),
            ));
        }
        self.zone.write(operation, self.offset, bytes)
    }

    /// Overwrite the whole byte range with zeros. Container storage attached
    /// inside the range is released.
    pub fn zero(&self) -> Result<&Self> {
        self.zone
            .clear("Value::zero", self.offset, self.descriptor.size())?;
        self.converted.lock().clear();
        Ok(self)
    }

    /// Raw bytes of the view, exactly `size` of them.
    pub fn to_byte_array(&self) -> Result<Vec<u8>> {
        self.read_bytes("Value::to_byte_array")
    }

    /// Bitwise comparison, padding included.
    pub fn memory_eql(&self, other: &Value) -> Result<bool> {
        if self.size() != other.size() {
            return Ok(false);
        }
        let mine = self.read_bytes("Value::memory_eql")?;
        let theirs = other.read_bytes("Value::memory_eql")?;
        Ok(mine == theirs)
    }

    /// Identity: same zone and same offset. Never compares content.
    pub fn eql(&self, other: &Value) -> bool {
        self.zone.same_zone(&other.zone) && self.offset == other.offset
    }

    /// Another view over the same bytes, with its own converted-view cache.
    pub fn alias(&self) -> Value {
        Self::view(self.zone.clone(), self.offset, Arc::clone(&self.descriptor))
    }

    /// Deep copy into a new, independent owned zone. Container storage is
    /// duplicated as well.
    pub fn dup(&self) -> Result<Value> {
        let zone = Zone::zeroed(self.size());
        Zone::copy_range(&self.zone, self.offset, &zone, 0, self.size())?;
        Ok(Self::view(zone, 0, Arc::clone(&self.descriptor)))
    }

    /// True if the value is described by `descriptor` (same name or
    /// structurally equivalent), or if its first field at offset 0 is, as
    /// for a C struct embedding its base as first member.
    pub fn is_a(&self, descriptor: &TypeDescriptor) -> bool {
        descriptor_is_a(&self.descriptor, descriptor)
    }

    /// True if the descriptor carries `name` (a missing leading `/` is added).
    pub fn has_type_name(&self, name: &str) -> bool {
        match name.strip_prefix('/') {
            Some(_) => self.descriptor.name() == name,
            None => self.descriptor.name().strip_prefix('/') == Some(name),
        }
    }

    /// Sub-view of a compound field.
    pub fn field(&self, name: &str) -> Result<Value> {
        let Some(fields) = self.descriptor.fields() else {
            return Err(Error::invalid(
                "Value::field",
                self.descriptor.name(),
                "not a compound",
            ));
        };
        let field = fields.iter().find(|f| f.name == name).ok_or_else(|| {
            Error::invalid(
                "Value::field",
                self.descriptor.name(),
                format!("no field named '{}'", name),
            )
        })?;
        self.zone.ensure_live("Value::field")?;
        Ok(Self::view(
            self.zone.clone(),
            self.offset + field.offset,
            Arc::clone(&field.type_desc),
        ))
    }

    /// Sub-view of an array, fixed string or container element.
    pub fn element(&self, index: usize) -> Result<Value> {
        match self.descriptor.kind() {
            TypeKind::Array(array) | TypeKind::FixedString(array) => {
                if index >= array.length {
                    return Err(Error::invalid(
                        "Value::element",
                        self.descriptor.name(),
                        format!("index {} out of bounds (length {})", index, array.length),
                    ));
                }
                self.zone.ensure_live("Value::element")?;
                Ok(Self::view(
                    self.zone.clone(),
                    self.offset + index * array.element.size(),
                    Arc::clone(&array.element),
                ))
            }
            TypeKind::Container(container) => {
                self.container_element(index, &container.element)
            }
            _ => Err(Error::invalid(
                "Value::element",
                self.descriptor.name(),
                "not an array or container",
            )),
        }
    }

    /// Number of elements of an array, fixed string or container.
    pub fn len(&self) -> Result<usize> {
        match self.descriptor.kind() {
            TypeKind::Array(array) | TypeKind::FixedString(array) => {
                self.zone.ensure_live("Value::len")?;
                Ok(array.length)
            }
            TypeKind::Container(_) => self.container_len(),
            _ => Err(Error::invalid(
                "Value::len",
                self.descriptor.name(),
                "not an array or container",
            )),
        }
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Resolve a leaf path as produced by [`TypeDescriptor::leaf_paths`]
    /// (`.a.b`, `.fields[2]`, `[0].x`).
    pub fn path(&self, path: &str) -> Result<Value> {
        let mut current = self.alias();
        let mut rest = path;
        while !rest.is_empty() {
            if let Some(tail) = rest.strip_prefix('.') {
                let end = tail.find(|c| c == '.' || c == '[').unwrap_or(tail.len());
                current = current.field(&tail[..end])?;
                rest = &tail[end..];
            } else if let Some(tail) = rest.strip_prefix('[') {
                let end = tail.find(']').ok_or_else(|| {
                    Error::invalid("Value::path", self.descriptor.name(), "unterminated index")
                })?;
                let index = tail[..end].parse::<usize>().map_err(|_| {
                    Error::invalid(
                        "Value::path",
                        self.descriptor.name(),
                        format!("invalid index '{}'", &tail[..end]),
                    )
                })?;
                current = current.element(index)?;
                rest = &tail[end + 1..];
            } else {
                return Err(Error::invalid(
                    "Value::path",
                    self.descriptor.name(),
                    format!("unexpected '{}' in path '{}'", rest, path),
                ));
            }
        }
        Ok(current)
    }

    /// Every leaf of the value with its rich representation, in
    /// [`TypeDescriptor::leaf_paths`] order.
    pub fn flatten(&self) -> Result<Vec<(String, RichValue)>> {
        self.descriptor
            .leaves()
            .into_iter()
            .map(|leaf| {
                let view = Self::view(
                    self.zone.clone(),
                    self.offset + leaf.offset,
                    leaf.descriptor,
                );
                Ok((leaf.path, view.read_rich()?))
            })
            .collect()
    }

    /// Generic conversion to a rich value (no registered converters).
    pub fn read_rich(&self) -> Result<RichValue> {
        convert::read(self, None)
    }

    /// Generic write of a rich value into the native bytes.
    pub fn write_rich(&self, rich: &RichValue) -> Result<()> {
        convert::write(rich, self, None)
    }

    pub(crate) fn converted_cache(&self) -> &Mutex<HashMap<String, ConvertedView>> {
        &self.converted
    }
}

fn descriptor_is_a(mine: &TypeDescriptor, other: &TypeDescriptor) -> bool {
    if mine.name() == other.name() || mine.is_equivalent(other) {
        return true;
    }
    mine.fields()
        .and_then(|fields| fields.first())
        .filter(|first| first.offset == 0)
        .is_some_and(|first| descriptor_is_a(&first.type_desc, other))
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type", &self.descriptor.name())
            .field("zone", &format_args!("0x{:016X}", self.zone.address()))
            .field("offset", &self.offset)
            .field("live", &self.zone.is_live())
            .finish()
    }
}
