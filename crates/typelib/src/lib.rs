// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Runtime layout registry and typed views over native memory.
//!
//! Given descriptions of native data layouts (numerics, compounds with
//! field offsets, fixed arrays, pointers, enumerations, containers), typelib
//! builds a registry of type descriptors and lets callers inspect and edit
//! raw byte buffers through typed views without copying them.
//!
//! # Features
//!
//! - **Registry**: qualified names, derived types (`/A*`, `/A[4]`,
//!   `/std/vector</A>`), YAML and XML (tlb) importers
//! - **Zero-copy values**: fields, elements, pointers and containers are
//!   views into one memory zone
//! - **Structural equality**: values compare by content, never by padding
//! - **Conversions**: per-type converters to application-level values, with
//!   cached converted views
//!
//! # Architecture
//!
//! ```text
//!   Registry (descriptors by name)
//!        |
//!        v
//!   Value = (Zone, offset, TypeDescriptor)
//!        |                      |
//!        v                      v
//!   structural_eq / cast   ConversionRegistry (rich values)
//! ```
//!
//! # Example
//!
//! ```rust
//! use typelib::{Registry, Value};
//!
//! let registry = Registry::with_standard_types();
//! registry
//!     .import_str(
//!         r#"<typelib>
//!              <compound name="/Reading">
//!                <field name="id" type="/int"/>
//!                <field name="value" type="/double"/>
//!              </compound>
//!            </typelib>"#,
//!         "tlb",
//!     )
//!     .unwrap();
//!
//! let reading = Value::new(&registry.get("/Reading").unwrap());
//! reading.field("value").unwrap().set(21.5f64).unwrap();
//! assert_eq!(reading.size(), 16);
//! assert_eq!(reading.field("value").unwrap().get::<f64>().unwrap(), 21.5);
//! ```

pub mod config;
pub mod convert;
pub mod error;
pub mod layout;
pub mod memory;
pub mod registry;
pub mod value;

pub use config::RegistryConfig;
pub use convert::{ConversionRegistry, ConvertedView, Converter, FieldValue, RichValue};
pub use error::{Error, ParseError, Result};
pub use layout::{
    CompoundBuilder, EnumBuilder, EquivalenceHash, FieldDescriptor, Leaf, NumericKind,
    TypeDescriptor, TypeKind,
};
pub use memory::Zone;
pub use registry::{Declaration, Importer, Registry};
pub use value::{copy, Cast, Scalar, Value};
