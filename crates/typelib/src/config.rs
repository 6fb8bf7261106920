// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layout constants and registry configuration.
//!
//! # Architecture
//!
//! - **Level 1 (Static)**: layout constants of the native target (pointer
//!   width, container slot shape, enum width).
//! - **Level 2 (Dynamic)**: [`RegistryConfig`] for per-registry options
//!   (standard types, import search paths).
//!
//! ```ignore
//! use typelib::config::RegistryConfig;
//!
//! let config = RegistryConfig::new()
//!     .with_standard_types()
//!     .search_path("/usr/share/typelib");
//! let registry = typelib::Registry::with_config(config);
//! ```

use std::path::{Path, PathBuf};

/// Size in bytes of a native pointer on the host.
pub const POINTER_SIZE: usize = std::mem::size_of::<usize>();

/// Alignment of a native pointer on the host.
pub const POINTER_ALIGNMENT: usize = std::mem::align_of::<usize>();

/// Size of a container slot: element count (u64) followed by capacity (u64).
pub const CONTAINER_SLOT_SIZE: usize = 16;

/// Alignment of a container slot.
pub const CONTAINER_ALIGNMENT: usize = 8;

/// Byte offset of the element count inside a container slot.
pub const CONTAINER_LENGTH_OFFSET: usize = 0;

/// Byte offset of the capacity inside a container slot.
pub const CONTAINER_CAPACITY_OFFSET: usize = 8;

/// Smallest capacity allocated when a container grows from empty.
pub const MIN_CONTAINER_CAPACITY: usize = 4;

/// Width of an enumeration (C `int`).
pub const ENUM_SIZE: usize = 4;

/// Name prefix of vector containers (`/std/vector<T>`).
pub const VECTOR_PREFIX: &str = "/std/vector<";

/// Qualified name of the string container.
pub const STRING_CONTAINER_NAME: &str = "/std/string";

/// Environment variable holding extra import search paths.
pub const IMPORT_PATH_ENV: &str = "TYPELIB_IMPORT_PATH";

/// File extensions recognised as YAML type descriptions.
pub const YAML_EXTENSIONS: &[&str] = &["yaml", "yml"];

/// File extensions recognised as XML type descriptions.
pub const XML_EXTENSIONS: &[&str] = &["tlb", "xml"];

/// Per-registry configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Register the C/C++ fundamental types at construction.
    pub standard_types: bool,
    /// Directories searched for relative import sources.
    pub search_paths: Vec<PathBuf>,
}

impl RegistryConfig {
    /// Empty configuration: no standard types, no search paths.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration built from `TYPELIB_IMPORT_PATH`, with standard types.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::new().with_standard_types();
        if let Some(paths) = std::env::var_os(IMPORT_PATH_ENV) {
            config.search_paths = std::env::split_paths(&paths).collect();
        }
        config
    }

    /// Register the standard types at construction.
    #[must_use]
    pub fn with_standard_types(mut self) -> Self {
        self.standard_types = true;
        self
    }

    /// Append an import search directory.
    #[must_use]
    pub fn search_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.search_paths.push(path.into());
        self
    }

    /// Resolve an import source against the working directory, then the
    /// search paths. Returns the source unchanged when nothing matches so the
    /// caller reports the original path.
    pub fn resolve_source(&self, source: &Path) -> PathBuf {
        if source.is_absolute() || source.exists() {
            return source.to_path_buf();
        }
        self.search_paths
            .iter()
            .map(|dir| dir.join(source))
            .find(|candidate| candidate.exists())
            .unwrap_or_else(|| source.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_container_slot_fields_fit() {
        assert!(CONTAINER_CAPACITY_OFFSET + 8 <= CONTAINER_SLOT_SIZE);
        assert!(CONTAINER_LENGTH_OFFSET + 8 <= CONTAINER_CAPACITY_OFFSET);
    }

    #[test]
    fn test_resolve_source_uses_search_paths() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("types.yaml"), "types: []\n").expect("write fixture");

        let config = RegistryConfig::new().search_path(dir.path());
        let resolved = config.resolve_source(Path::new("types.yaml"));
        assert_eq!(resolved, dir.path().join("types.yaml"));

        let missing = config.resolve_source(Path::new("missing.yaml"));
        assert_eq!(missing, PathBuf::from("missing.yaml"));
    }

    #[test]
    fn test_builder_flags() {
        let config = RegistryConfig::new().with_standard_types();
        assert!(config.standard_types);
        assert!(config.search_paths.is_empty());
    }
}
