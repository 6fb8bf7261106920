// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layout descriptors.
//!
//! A [`TypeDescriptor`] is the immutable description of one type's memory
//! shape: size, alignment and kind-specific structure (fields with offsets,
//! element type and count, pointee, enumeration symbols, container element).
//!
//! # Example
//!
//! ```rust
//! use typelib::layout::{CompoundBuilder, NumericKind, TypeDescriptor};
//! use std::sync::Arc;
//!
//! let int_t = Arc::new(TypeDescriptor::numeric("/int", NumericKind::I32));
//! let char_t = Arc::new(TypeDescriptor::numeric("/char", NumericKind::Char));
//! let desc = CompoundBuilder::new("/Sample")
//!     .field("id", &int_t)
//!     .field("tag", &char_t)
//!     .build()
//!     .unwrap();
//! assert_eq!(desc.size(), 8);
//! ```

mod builder;
mod descriptor;
mod equivalence;
mod flatten;

pub use builder::{CompoundBuilder, EnumBuilder};
pub use descriptor::{
    ArrayDescriptor, ContainerDescriptor, ContainerKind, EnumDescriptor, EnumValue,
    FieldDescriptor, NumericKind, TypeDescriptor, TypeKind,
};
pub use equivalence::EquivalenceHash;
pub use flatten::Leaf;
