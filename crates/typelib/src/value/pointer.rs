// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Pointer values: null checks, dereference through the zone index,
//! address-of.

use crate::config::POINTER_SIZE;
use crate::error::{Error, Result};
use crate::layout::TypeDescriptor;
use crate::memory::{resolve, Lookup};
use crate::value::Value;
use std::sync::Arc;

impl Value {
    fn pointer_target_or(&self, operation: &'static str) -> Result<&Arc<TypeDescriptor>> {
        self.descriptor()
            .pointer_target()
            .ok_or_else(|| Error::invalid(operation, self.type_name(), "not a pointer"))
    }

    fn read_address(&self, operation: &'static str) -> Result<usize> {
        let bytes = self.read_bytes(operation)?;
        let mut raw = [0u8; POINTER_SIZE];
        raw.copy_from_slice(&bytes);
        Ok(usize::from_ne_bytes(raw))
    }

    /// Address stored in a pointer value.
    pub fn pointer_address(&self) -> Result<usize> {
        self.pointer_target_or("Value::pointer_address")?;
        self.read_address("Value::pointer_address")
    }

    /// True if the pointer holds the zero address. Pointers only.
    pub fn is_null(&self) -> Result<bool> {
        self.pointer_target_or("Value::is_null")?;
        Ok(self.read_address("Value::is_null")? == 0)
    }

    /// View the pointee.
    ///
    /// Fails with `InvalidArgument` on non-pointers, on null pointers and on
    /// addresses outside every zone known to the engine, and with
    /// `StaleReference` when the pointee zone has been released.
    #[allow(clippy::should_implement_trait)]
    pub fn deref(&self) -> Result<Value> {
        const OP: &str = "Value::deref";
        let target = self.pointer_target_or(OP)?;
        let address = self.read_address(OP)?;
        if address == 0 {
            return Err(Error::invalid(OP, self.type_name(), "null pointer"));
        }

        match resolve(address) {
            Lookup::Live { zone, offset } => {
                if offset + target.size() > zone.size() {
                    return Err(Error::invalid(
                        OP,
                        self.type_name(),
                        format!(
                            "pointee of {} bytes overruns zone 0x{:016X} at offset {}",
                            target.size(),
                            zone.address(),
                            offset
                        ),
                    ));
                }
                Ok(Value::view(zone, offset, Arc::clone(target)))
            }
            Lookup::Released { zone_address } => Err(Error::StaleReference {
                operation: OP,
                zone_address,
            }),
            Lookup::Unknown => Err(Error::invalid(
                OP,
                self.type_name(),
                format!("address 0x{:016X} is not owned by any zone", address),
            )),
        }
    }

    /// New pointer value (`<type>*`) holding this value's address.
    pub fn to_ptr(&self) -> Result<Value> {
        self.zone().ensure_live("Value::to_ptr")?;
        let pointer_t = Arc::new(TypeDescriptor::pointer_to(self.descriptor()));
        let pointer = Value::new(&pointer_t);
        pointer.write_bytes("Value::to_ptr", &self.native_address().to_ne_bytes())?;
        Ok(pointer)
    }

    /// Point at `target`, whose type must be equivalent to the pointee type.
    pub fn set_pointer(&self, target: &Value) -> Result<()> {
        const OP: &str = "Value::set_pointer";
        let pointee = self.pointer_target_or(OP)?;
        if !pointee.is_equivalent(target.descriptor()) {
            return Err(Error::invalid(
                OP,
                self.type_name(),
                format!("cannot point to {}", target.type_name()),
            ));
        }
        target.zone().ensure_live(OP)?;
        self.write_bytes(OP, &target.native_address().to_ne_bytes())
    }

    /// Store the zero address.
    pub fn set_null(&self) -> Result<()> {
        self.pointer_target_or("Value::set_null")?;
        self.write_bytes("Value::set_null", &0usize.to_ne_bytes())
    }
}
