// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Native containers (`/std/vector<T>`, `/std/string`).
//!
//! The slot embedded in the parent layout holds the element count and the
//! capacity. Elements live in a separate zone attached to the parent zone
//! at the slot offset; growing the container allocates a new element zone
//! and releases the old one, so element views taken before a reallocation
//! fail with `StaleReference` instead of reading freed memory.

use crate::config::{CONTAINER_CAPACITY_OFFSET, CONTAINER_LENGTH_OFFSET, MIN_CONTAINER_CAPACITY};
use crate::error::{Error, Result};
use crate::layout::{ContainerDescriptor, TypeDescriptor, TypeKind};
use crate::memory::Zone;
use crate::value::{copy, Value};
use std::sync::Arc;

impl Value {
    fn container_desc(&self, operation: &'static str) -> Result<&ContainerDescriptor> {
        match self.descriptor().kind() {
            TypeKind::Container(container) => Ok(container),
            _ => Err(Error::invalid(operation, self.type_name(), "not a container")),
        }
    }

    fn read_slot_word(&self, operation: &'static str, at: usize) -> Result<usize> {
        let bytes = self.zone().read(operation, self.offset() + at, 8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&bytes);
        Ok(u64::from_ne_bytes(raw) as usize)
    }

    fn write_slot(&self, operation: &'static str, len: usize, capacity: usize) -> Result<()> {
        let zone = self.zone();
        zone.write(
            operation,
            self.offset() + CONTAINER_LENGTH_OFFSET,
            &(len as u64).to_ne_bytes(),
        )?;
        zone.write(
            operation,
            self.offset() + CONTAINER_CAPACITY_OFFSET,
            &(capacity as u64).to_ne_bytes(),
        )
    }

    /// Element storage, which must exist for a non-empty container.
    fn element_zone(&self, operation: &'static str) -> Result<Zone> {
        self.zone().container(self.offset()).ok_or_else(|| {
            Error::invalid(
                operation,
                self.type_name(),
                "element storage is not attached to this slot",
            )
        })
    }

    pub(crate) fn container_len(&self) -> Result<usize> {
        self.container_desc("Value::len")?;
        self.read_slot_word("Value::len", CONTAINER_LENGTH_OFFSET)
    }

    /// Allocated element count of a container.
    pub fn capacity(&self) -> Result<usize> {
        self.container_desc("Value::capacity")?;
        self.read_slot_word("Value::capacity", CONTAINER_CAPACITY_OFFSET)
    }

    pub(crate) fn container_element(
        &self,
        index: usize,
        element: &Arc<TypeDescriptor>,
    ) -> Result<Value> {
        const OP: &str = "Value::element";
        let len = self.read_slot_word(OP, CONTAINER_LENGTH_OFFSET)?;
        if index >= len {
            return Err(Error::invalid(
                OP,
                self.type_name(),
                format!("index {} out of bounds (length {})", index, len),
            ));
        }
        let data = self.element_zone(OP)?;
        data.ensure_live(OP)?;
        Ok(Value::view(data, index * element.size(), Arc::clone(element)))
    }

    /// Resize to `len` elements. New elements are zero-filled; dropped
    /// elements are cleared (their own container storage released).
    pub fn resize(&self, len: usize) -> Result<()> {
        const OP: &str = "Value::resize";
        let element_size = self.container_desc(OP)?.element.size();
        let current = self.read_slot_word(OP, CONTAINER_LENGTH_OFFSET)?;
        let capacity = self.read_slot_word(OP, CONTAINER_CAPACITY_OFFSET)?;
        let existing = self.zone().container(self.offset());

        if len > capacity || (existing.is_none() && len > 0) {
            let new_capacity = len.max(capacity * 2).max(MIN_CONTAINER_CAPACITY);
            let data = Zone::zeroed(new_capacity * element_size);
            if let Some(old) = &existing {
                let keep = current.min(len) * element_size;
                Zone::copy_range(old, 0, &data, 0, keep)?;
            }
            if let Some(old) = self.zone().attach_container(self.offset(), data) {
                old.release();
            }
            log::trace!(
                "[Value::resize] {} grew to capacity {} ({} -> {} elements)",
                self.type_name(),
                new_capacity,
                current,
                len
            );
            return self.write_slot(OP, len, new_capacity);
        }

        if len < current {
            if let Some(data) = &existing {
                data.clear(
                    OP,
                    len * element_size,
                    (current - len) * element_size,
                )?;
            }
        }
        self.write_slot(OP, len, capacity)
    }

    /// Append a copy of `item`, whose type must be equivalent to the element
    /// type.
    pub fn push(&self, item: &Value) -> Result<()> {
        let element = Arc::clone(&self.container_desc("Value::push")?.element);
        if !element.is_equivalent(item.descriptor()) {
            return Err(Error::invalid(
                "Value::push",
                self.type_name(),
                format!("cannot push a {}", item.type_name()),
            ));
        }
        let index = self.container_len()?;
        self.resize(index + 1)?;
        copy(&self.container_element(index, &element)?, item)
    }

    /// Remove every element. The capacity is kept.
    pub fn clear(&self) -> Result<()> {
        self.resize(0)
    }

    pub(crate) fn container_bytes(&self, operation: &'static str) -> Result<Vec<u8>> {
        let element_size = self.container_desc(operation)?.element.size();
        let len = self.read_slot_word(operation, CONTAINER_LENGTH_OFFSET)?;
        if len == 0 {
            return Ok(Vec::new());
        }
        self.element_zone(operation)?
            .read(operation, 0, len * element_size)
    }

    pub(crate) fn container_set_bytes(&self, operation: &'static str, bytes: &[u8]) -> Result<()> {
        let element_size = self.container_desc(operation)?.element.size();
        if element_size == 0 || bytes.len() % element_size != 0 {
            return Err(Error::invalid(
                operation,
                self.type_name(),
                format!("{} bytes is not a whole number of elements", bytes.len()),
            ));
        }
        self.resize(bytes.len() / element_size)?;
        if bytes.is_empty() {
            return Ok(());
        }
        self.element_zone(operation)?.write(operation, 0, bytes)
    }
}
