// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Memory zones and the address index.
//!
//! A [`Zone`] owns one allocation (or borrows caller memory) and carries the
//! liveness state every value checks before touching bytes. Zones of
//! non-zero size are registered in a process-wide index so that a pointer
//! value can be dereferenced back into the zone it points into.

mod index;
mod zone;

pub use index::{resolve, Lookup};
pub use zone::Zone;
