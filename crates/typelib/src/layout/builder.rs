// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fluent builders for compound and enumeration descriptors.

use crate::error::{Error, Result};
use crate::layout::{EnumDescriptor, EnumValue, FieldDescriptor, TypeDescriptor};
use std::sync::Arc;

fn align_up(value: usize, alignment: usize) -> usize {
    let alignment = alignment.max(1);
    value.div_ceil(alignment) * alignment
}

#[derive(Debug)]
struct PendingField {
    name: String,
    type_desc: Arc<TypeDescriptor>,
    offset: Option<usize>,
}

/// Builder for compound (struct) descriptors.
///
/// Fields without an explicit offset are placed at the next naturally
/// aligned position after the previous field; the total size is rounded up
/// to the largest field alignment unless given explicitly.
#[derive(Debug)]
pub struct CompoundBuilder {
    name: String,
    fields: Vec<PendingField>,
    size: Option<usize>,
}

impl CompoundBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
            size: None,
        }
    }

    /// Append a field at its natural offset.
    pub fn field(mut self, name: impl Into<String>, type_desc: &Arc<TypeDescriptor>) -> Self {
        self.fields.push(PendingField {
            name: name.into(),
            type_desc: Arc::clone(type_desc),
            offset: None,
        });
        self
    }

    /// Append a field at an explicit byte offset.
    pub fn field_at(
        mut self,
        name: impl Into<String>,
        type_desc: &Arc<TypeDescriptor>,
        offset: usize,
    ) -> Self {
        self.fields.push(PendingField {
            name: name.into(),
            type_desc: Arc::clone(type_desc),
            offset: Some(offset),
        });
        self
    }

    /// Force the total size (trailing padding included).
    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Compute offsets and build the descriptor.
    ///
    /// Fails with `InvalidArgument` on duplicate field names, on an explicit
    /// offset that does not respect the field alignment or overlaps the
    /// previous field, and on an explicit size too small for the fields.
    pub fn build(self) -> Result<TypeDescriptor> {
        const OP: &str = "CompoundBuilder::build";

        let mut fields: Vec<FieldDescriptor> = Vec::with_capacity(self.fields.len());
        let mut cursor = 0usize;
        let mut alignment = 1usize;

        for pending in self.fields {
            if fields.iter().any(|f| f.name == pending.name) {
                return Err(Error::invalid(
                    OP,
                    &self.name,
                    format!("duplicate field '{}'", pending.name),
                ));
            }
            let field_alignment = pending.type_desc.alignment();
            let offset = match pending.offset {
                Some(offset) if offset < cursor => {
                    return Err(Error::invalid(
                        OP,
                        &self.name,
                        format!(
                            "field '{}' at offset {} overlaps the previous field (ends at {})",
                            pending.name, offset, cursor
                        ),
                    ));
                }
                Some(offset) if offset % field_alignment != 0 => {
                    return Err(Error::invalid(
                        OP,
                        &self.name,
                        format!(
                            "field '{}' at offset {} is not {}-aligned",
                            pending.name, offset, field_alignment
                        ),
                    ));
                }
                Some(offset) => offset,
                None => align_up(cursor, field_alignment),
            };
            alignment = alignment.max(field_alignment);
            cursor = offset + pending.type_desc.size();
            fields.push(FieldDescriptor::new(pending.name, offset, pending.type_desc));
        }

        let size = match self.size {
            Some(size) if size < cursor => {
                return Err(Error::invalid(
                    OP,
                    &self.name,
                    format!("declared size {} is smaller than the fields ({})", size, cursor),
                ));
            }
            Some(size) => size,
            None => align_up(cursor, alignment),
        };

        log::trace!(
            "[CompoundBuilder::build] {} size={} align={} fields={}",
            self.name,
            size,
            alignment,
            fields.len()
        );
        Ok(TypeDescriptor::compound(self.name, size, alignment, fields))
    }
}

/// Builder for enumeration descriptors.
#[derive(Debug)]
pub struct EnumBuilder {
    name: String,
    values: Vec<EnumValue>,
    next_value: i32,
}

impl EnumBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
            next_value: 0,
        }
    }

    /// Add a symbol with auto-incrementing value.
    pub fn variant(self, name: impl Into<String>) -> Self {
        let value = self.next_value;
        self.variant_value(name, value)
    }

    /// Add a symbol with explicit value.
    pub fn variant_value(mut self, name: impl Into<String>, value: i32) -> Self {
        self.values.push(EnumValue::new(name, value));
        self.next_value = value.wrapping_add(1);
        self
    }

    /// Fails on duplicate symbols.
    pub fn build(self) -> Result<TypeDescriptor> {
        for (i, value) in self.values.iter().enumerate() {
            if self.values[..i].iter().any(|v| v.name == value.name) {
                return Err(Error::invalid(
                    "EnumBuilder::build",
                    &self.name,
                    format!("duplicate symbol '{}'", value.name),
                ));
            }
        }
        Ok(TypeDescriptor::enumeration(
            self.name,
            EnumDescriptor::new(self.values),
        ))
    }
}
