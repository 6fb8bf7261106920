// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Memory zones: the ownership unit behind every value.

use crate::error::{Error, Result};
use crate::memory::index;
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::ops::Range;
use std::ptr::NonNull;
use std::sync::Arc;

enum Storage {
    /// Engine-owned allocation.
    Owned(Box<[u8]>),
    /// Caller memory; never freed here.
    Borrowed { ptr: NonNull<u8>, len: usize },
    Released,
}

pub(crate) struct ZoneInner {
    address: usize,
    size: usize,
    borrowed: bool,
    storage: RwLock<Storage>,
    /// Element storage of the containers embedded in this zone, keyed by the
    /// offset of their slot.
    containers: Mutex<BTreeMap<usize, Zone>>,
}

// SAFETY: the borrowed pointer is only dereferenced while holding the storage
// lock, and `Zone::borrowed` requires the caller to keep the memory valid and
// free of concurrent foreign writes for the zone's lifetime. Owned storage is
// a plain heap buffer.
unsafe impl Send for ZoneInner {}
unsafe impl Sync for ZoneInner {}

impl ZoneInner {
    pub(crate) fn address(&self) -> usize {
        self.address
    }

    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn is_live(&self) -> bool {
        !matches!(*self.storage.read(), Storage::Released)
    }
}

impl Drop for ZoneInner {
    fn drop(&mut self) {
        if self.size > 0 {
            index::unregister(self.address, self as *const ZoneInner);
        }
    }
}

/// A contiguous allocation (owned or borrowed) with a liveness state.
///
/// Cloning a `Zone` shares it. Owned storage is freed when the last clone
/// drops or on [`Zone::release`]; borrowed storage is never freed.
#[derive(Clone)]
pub struct Zone {
    inner: Arc<ZoneInner>,
}

impl Zone {
    fn register(storage: Storage, address: usize, size: usize, borrowed: bool) -> Self {
        let inner = Arc::new(ZoneInner {
            address,
            size,
            borrowed,
            storage: RwLock::new(storage),
            containers: Mutex::new(BTreeMap::new()),
        });
        if size > 0 {
            index::register(&inner);
        }
        log::trace!(
            "[Zone::new] 0x{:016X} size={} borrowed={}",
            address,
            size,
            borrowed
        );
        Self { inner }
    }

    /// Take ownership of `bytes` as zone storage (no copy).
    pub fn owned(bytes: Vec<u8>) -> Self {
        let storage = bytes.into_boxed_slice();
        let address = storage.as_ptr() as usize;
        let size = storage.len();
        Self::register(Storage::Owned(storage), address, size, false)
    }

    /// Fresh zero-filled owned zone.
    pub fn zeroed(size: usize) -> Self {
        Self::owned(vec![0u8; size])
    }

    /// Borrow caller memory.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes of `len` bytes for as long as
    /// this zone, or any value over it, is alive. The caller keeps ownership:
    /// the engine never frees borrowed memory, not even on release.
    pub unsafe fn borrowed(ptr: NonNull<u8>, len: usize) -> Self {
        Self::register(
            Storage::Borrowed { ptr, len },
            ptr.as_ptr() as usize,
            len,
            true,
        )
    }

    pub(crate) fn from_inner(inner: Arc<ZoneInner>) -> Self {
        Self { inner }
    }

    /// Root address of the allocation.
    pub fn address(&self) -> usize {
        self.inner.address
    }

    pub fn size(&self) -> usize {
        self.inner.size
    }

    pub fn is_borrowed(&self) -> bool {
        self.inner.borrowed
    }

    pub fn is_live(&self) -> bool {
        self.inner.is_live()
    }

    /// Same allocation (not merely equal bytes).
    pub fn same_zone(&self, other: &Zone) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn stale(&self, operation: &'static str) -> Error {
        Error::StaleReference {
            operation,
            zone_address: self.inner.address,
        }
    }

    fn check_range(&self, operation: &'static str, offset: usize, len: usize) -> Result<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.inner.size => Ok(()),
            _ => Err(Error::invalid(
                operation,
                format!("zone 0x{:016X}", self.inner.address),
                format!(
                    "range {}..{} outside zone of {} bytes",
                    offset,
                    offset.saturating_add(len),
                    self.inner.size
                ),
            )),
        }
    }

    /// Run `f` over `len` bytes at `offset`.
    pub fn with_bytes<R>(
        &self,
        operation: &'static str,
        offset: usize,
        len: usize,
        f: impl FnOnce(&[u8]) -> R,
    ) -> Result<R> {
        self.check_range(operation, offset, len)?;
        let storage = self.inner.storage.read();
        match &*storage {
            Storage::Owned(bytes) => Ok(f(&bytes[offset..offset + len])),
            Storage::Borrowed { ptr, len: total } => {
                // SAFETY: validity of `ptr` for `total` bytes is the contract
                // of `Zone::borrowed`; the range was checked above.
                let bytes = unsafe { std::slice::from_raw_parts(ptr.as_ptr(), *total) };
                Ok(f(&bytes[offset..offset + len]))
            }
            Storage::Released => Err(self.stale(operation)),
        }
    }

    /// Run `f` over a mutable view of `len` bytes at `offset`.
    pub fn with_bytes_mut<R>(
        &self,
        operation: &'static str,
        offset: usize,
        len: usize,
        f: impl FnOnce(&mut [u8]) -> R,
    ) -> Result<R> {
        self.check_range(operation, offset, len)?;
        let mut storage = self.inner.storage.write();
        match &mut *storage {
            Storage::Owned(bytes) => Ok(f(&mut bytes[offset..offset + len])),
            Storage::Borrowed { ptr, len: total } => {
                // SAFETY: see `with_bytes`; the write lock excludes other
                // engine accesses to this zone.
                let bytes = unsafe { std::slice::from_raw_parts_mut(ptr.as_ptr(), *total) };
                Ok(f(&mut bytes[offset..offset + len]))
            }
            Storage::Released => Err(self.stale(operation)),
        }
    }

    /// Copy `len` bytes out of the zone.
    pub fn read(&self, operation: &'static str, offset: usize, len: usize) -> Result<Vec<u8>> {
        self.with_bytes(operation, offset, len, <[u8]>::to_vec)
    }

    pub fn write(&self, operation: &'static str, offset: usize, data: &[u8]) -> Result<()> {
        self.with_bytes_mut(operation, offset, data.len(), |dst| {
            dst.copy_from_slice(data)
        })
    }

    pub fn fill(&self, operation: &'static str, offset: usize, len: usize, byte: u8) -> Result<()> {
        self.with_bytes_mut(operation, offset, len, |dst| dst.fill(byte))
    }

    /// Zero a range and release the container storage attached inside it.
    pub fn clear(&self, operation: &'static str, offset: usize, len: usize) -> Result<()> {
        self.fill(operation, offset, len, 0)?;
        for old in self.detach_containers_in(offset..offset + len) {
            old.release();
        }
        Ok(())
    }

    /// Fail with `StaleReference` if the zone was released.
    pub fn ensure_live(&self, operation: &'static str) -> Result<()> {
        if self.is_live() {
            Ok(())
        } else {
            Err(self.stale(operation))
        }
    }

    /// Release the zone: owned storage is freed, attached container storage
    /// is released recursively, and every view fails with `StaleReference`
    /// from now on. Borrowed memory is left to the caller. Idempotent.
    pub fn release(&self) {
        {
            let mut storage = self.inner.storage.write();
            if matches!(*storage, Storage::Released) {
                return;
            }
            *storage = Storage::Released;
        }
        let children = std::mem::take(&mut *self.inner.containers.lock());
        for child in children.values() {
            child.release();
        }
        log::debug!(
            "[Zone::release] 0x{:016X} size={} borrowed={} containers={}",
            self.inner.address,
            self.inner.size,
            self.inner.borrowed,
            children.len()
        );
    }

    /// Element storage attached to the container slot at `slot_offset`.
    pub(crate) fn container(&self, slot_offset: usize) -> Option<Zone> {
        self.inner.containers.lock().get(&slot_offset).cloned()
    }

    /// Attach element storage to a slot, returning the previous storage.
    pub(crate) fn attach_container(&self, slot_offset: usize, data: Zone) -> Option<Zone> {
        self.inner.containers.lock().insert(slot_offset, data)
    }

    pub(crate) fn detach_container(&self, slot_offset: usize) -> Option<Zone> {
        self.inner.containers.lock().remove(&slot_offset)
    }

    fn containers_in(&self, range: Range<usize>) -> Vec<(usize, Zone)> {
        self.inner
            .containers
            .lock()
            .range(range)
            .map(|(offset, zone)| (*offset, zone.clone()))
            .collect()
    }

    fn detach_containers_in(&self, range: Range<usize>) -> Vec<Zone> {
        let mut containers = self.inner.containers.lock();
        let keys: Vec<usize> = containers.range(range).map(|(k, _)| *k).collect();
        keys.iter()
            .filter_map(|key| containers.remove(key))
            .collect()
    }

    /// Independent owned copy of the whole zone, container storage included.
    pub fn deep_copy(&self) -> Result<Zone> {
        let bytes = self.read("Zone::deep_copy", 0, self.inner.size)?;
        let copy = Zone::owned(bytes);
        for (offset, child) in self.containers_in(0..self.inner.size) {
            copy.attach_container(offset, child.deep_copy()?);
        }
        Ok(copy)
    }

    /// Copy `len` bytes from `src` to `dst`, duplicating container storage
    /// attached inside the source range. Storage previously attached inside
    /// the destination range is released.
    pub fn copy_range(
        src: &Zone,
        src_offset: usize,
        dst: &Zone,
        dst_offset: usize,
        len: usize,
    ) -> Result<()> {
        const OP: &str = "Zone::copy_range";
        dst.check_range(OP, dst_offset, len)?;
        let bytes = src.read(OP, src_offset, len)?;
        let mut copies = Vec::new();
        for (offset, child) in src.containers_in(src_offset..src_offset + len) {
            copies.push((offset - src_offset + dst_offset, child.deep_copy()?));
        }

        dst.write(OP, dst_offset, &bytes)?;
        for old in dst.detach_containers_in(dst_offset..dst_offset + len) {
            old.release();
        }
        for (offset, copy) in copies {
            dst.attach_container(offset, copy);
        }
        Ok(())
    }
}

impl std::fmt::Debug for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Zone")
            .field("address", &format_args!("0x{:016X}", self.inner.address))
            .field("size", &self.inner.size)
            .field("borrowed", &self.inner.borrowed)
            .field("live", &self.is_live())
            .finish()
    }
}
