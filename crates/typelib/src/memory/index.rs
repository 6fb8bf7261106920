// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-wide address index.
//!
//! Maps the root address of every non-empty zone to a weak reference so a
//! pointer value can find the zone it points into. Released zones stay in
//! the index until their last reference drops, which lets a dereference
//! report a stale target instead of an unknown address.

use crate::memory::zone::{Zone, ZoneInner};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, Weak};

struct Entry {
    size: usize,
    zone: Weak<ZoneInner>,
}

static INDEX: OnceLock<RwLock<BTreeMap<usize, Entry>>> = OnceLock::new();

fn index() -> &'static RwLock<BTreeMap<usize, Entry>> {
    INDEX.get_or_init(|| RwLock::new(BTreeMap::new()))
}

pub(crate) fn register(zone: &Arc<ZoneInner>) {
    index().write().insert(
        zone.address(),
        Entry {
            size: zone.size(),
            zone: Arc::downgrade(zone),
        },
    );
}

/// Remove `address` only if it still belongs to `owner` (the allocator may
/// already have handed the address to a newer zone).
pub(crate) fn unregister(address: usize, owner: *const ZoneInner) {
    let mut index = index().write();
    if index
        .get(&address)
        .is_some_and(|entry| std::ptr::eq(entry.zone.as_ptr(), owner))
    {
        index.remove(&address);
    }
}

/// Result of resolving a native address.
#[derive(Debug)]
pub enum Lookup {
    /// The address lies inside a live zone.
    Live { zone: Zone, offset: usize },
    /// The address lies inside a zone that has been released.
    Released { zone_address: usize },
    /// No zone known to the engine contains the address.
    Unknown,
}

/// Resolve `address` to the zone containing it.
pub fn resolve(address: usize) -> Lookup {
    let candidate = {
        let index = index().read();
        index
            .range(..=address)
            .rev()
            .find(|(root, entry)| address < *root + entry.size)
            .map(|(root, entry)| (*root, entry.zone.clone()))
    };
    // The index guard is gone before any upgrade: dropping the last strong
    // reference below unregisters, which takes the write lock.
    let Some((root, weak)) = candidate else {
        return Lookup::Unknown;
    };
    match weak.upgrade() {
        Some(inner) if inner.is_live() => Lookup::Live {
            offset: address - root,
            zone: Zone::from_inner(inner),
        },
        _ => Lookup::Released { zone_address: root },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_interior_address() {
        let zone = Zone::zeroed(32);
        match resolve(zone.address() + 20) {
            Lookup::Live { zone: found, offset } => {
                assert!(found.same_zone(&zone));
                assert_eq!(offset, 20);
            }
            other => panic!("expected live zone, got {:?}", other),
        }
    }

    #[test]
    fn test_released_zone_resolves_as_released() {
        let zone = Zone::zeroed(4099);
        let address = zone.address();
        zone.release();
        assert!(matches!(
            resolve(address),
            Lookup::Released { zone_address } if zone_address == address
        ));
    }

    #[test]
    fn test_dropped_zone_is_unregistered() {
        let zone = Zone::zeroed(8);
        let address = zone.address();
        drop(zone);
        assert!(!matches!(resolve(address), Lookup::Released { .. }));
    }
}
