// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type registry.
//!
//! Maps qualified names (`/A`, `/NS1/Test`, `/int*`, `/std/vector</A>`) to
//! shared descriptors. The registry is append-only: a name, once added,
//! always resolves to the same instance. Adding a name again succeeds only
//! with a structurally equivalent descriptor.
//!
//! # Example
//!
//! ```rust
//! use typelib::Registry;
//!
//! let registry = Registry::with_standard_types();
//! registry
//!     .import_str(
//!         "types:\n  - kind: compound\n    name: /Point\n    fields:\n      - { name: x, type: /int }\n      - { name: y, type: /int }\n",
//!         "yaml",
//!     )
//!     .unwrap();
//!
//! let points = registry.build("/Point[3]").unwrap();
//! assert_eq!(points.size(), 24);
//! assert!(std::sync::Arc::ptr_eq(&points, &registry.get("/Point[3]").unwrap()));
//! ```

mod expr;
pub mod import;
mod standard;

pub use import::{Declaration, EnumDeclaration, FieldDeclaration, Importer};

#[cfg(feature = "loaders")]
pub use import::{XmlImporter, YamlImporter};

use crate::config::RegistryConfig;
use crate::convert::ConversionRegistry;
use crate::error::{Error, ParseError, Result};
use crate::layout::TypeDescriptor;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use expr::{qualify, Resolved, TypeScope};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Name → descriptor registry.
pub struct Registry {
    types: DashMap<String, Arc<TypeDescriptor>>,
    importers: RwLock<HashMap<String, Arc<dyn Importer>>>,
    conversions: Arc<ConversionRegistry>,
    config: RegistryConfig,
}

impl Registry {
    /// Empty registry with the default importers.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::new())
    }

    /// Registry pre-filled with the C/C++ fundamental types.
    pub fn with_standard_types() -> Self {
        Self::with_config(RegistryConfig::new().with_standard_types())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        let registry = Self {
            types: DashMap::new(),
            importers: RwLock::new(HashMap::new()),
            conversions: Arc::new(ConversionRegistry::new()),
            config,
        };
        registry.register_default_importers();
        if registry.config.standard_types {
            if let Err(err) = registry.add_standard_types() {
                log::warn!("[Registry::with_config] standard types: {}", err);
            }
        }
        registry
    }

    /// Replace the conversion registry (e.g. to share one between registries).
    #[must_use]
    pub fn with_conversions(mut self, conversions: Arc<ConversionRegistry>) -> Self {
        self.conversions = conversions;
        self
    }

    #[cfg(feature = "loaders")]
    fn register_default_importers(&self) {
        use crate::config::{XML_EXTENSIONS, YAML_EXTENSIONS};

        let yaml: Arc<dyn Importer> = Arc::new(YamlImporter);
        let xml: Arc<dyn Importer> = Arc::new(XmlImporter);
        let mut importers = self.importers.write();
        for ext in YAML_EXTENSIONS {
            importers.insert((*ext).to_string(), Arc::clone(&yaml));
        }
        for ext in XML_EXTENSIONS {
            importers.insert((*ext).to_string(), Arc::clone(&xml));
        }
    }

    #[cfg(not(feature = "loaders"))]
    fn register_default_importers(&self) {}

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Converters used for values built from this registry's types.
    pub fn conversions(&self) -> &Arc<ConversionRegistry> {
        &self.conversions
    }

    /// Register the fundamental types of an LP64 target and `/std/string`.
    pub fn add_standard_types(&self) -> Result<()> {
        let types = standard::standard_types();
        let count = types.len();
        for (name, desc) in types {
            self.merge(name, desc)?;
        }
        log::debug!("[Registry::add_standard_types] {} names", count);
        Ok(())
    }

    /// Insert `desc` under `name`, keeping an existing equivalent instance.
    pub(crate) fn merge(
        &self,
        name: String,
        desc: Arc<TypeDescriptor>,
    ) -> core::result::Result<Arc<TypeDescriptor>, ParseError> {
        match self.types.entry(name) {
            Entry::Occupied(entry) => {
                let existing = Arc::clone(entry.get());
                if Arc::ptr_eq(&existing, &desc) {
                    return Ok(existing);
                }
                if !existing.is_equivalent(&desc) {
                    return Err(ParseError::Conflict {
                        name: entry.key().clone(),
                    });
                }
                log::warn!(
                    "[Registry::merge] {} redefined with an equivalent layout; keeping the first definition",
                    entry.key()
                );
                Ok(existing)
            }
            Entry::Vacant(entry) => {
                log::trace!("[Registry::merge] added {}", entry.key());
                entry.insert(Arc::clone(&desc));
                Ok(desc)
            }
        }
    }

    /// Add a descriptor under its own (qualified) name. Returns the instance
    /// that is registered under that name afterwards.
    pub fn add(&self, desc: Arc<TypeDescriptor>) -> Result<Arc<TypeDescriptor>> {
        let name = qualify(desc.name());
        Ok(self.merge(name, desc)?)
    }

    /// Register `target` (a type expression) under a second name.
    pub fn alias(&self, name: &str, target: &str) -> Result<Arc<TypeDescriptor>> {
        let desc = self.build(target)?;
        let registered = self.merge(qualify(name), desc)?;
        log::debug!("[Registry::alias] {} -> {}", qualify(name), registered.name());
        Ok(registered)
    }

    /// Exact lookup; a missing leading `/` is added.
    pub fn get(&self, name: &str) -> Result<Arc<TypeDescriptor>> {
        let name = qualify(name);
        self.find(&name).ok_or_else(|| Error::not_found(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(&qualify(name))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Resolve a type expression (`/A*`, `/int[4][2]`, `/std/vector</A>`),
    /// registering every derived descriptor on the way. Repeated builds of
    /// the same expression return the same instance.
    pub fn build(&self, expr: &str) -> Result<Arc<TypeDescriptor>> {
        match expr::resolve(self, expr)? {
            Resolved::Found(desc) => Ok(desc),
            Resolved::Missing(name) => Err(Error::not_found(name)),
        }
    }

    /// Plug an importer for `format` (matched case-insensitively against
    /// format hints and file extensions).
    pub fn register_importer(&self, format: &str, importer: Arc<dyn Importer>) {
        let format = format.to_ascii_lowercase();
        log::debug!("[Registry::register_importer] {}", format);
        self.importers.write().insert(format, importer);
    }

    /// Formats with a registered importer, sorted.
    pub fn formats(&self) -> Vec<String> {
        let mut formats: Vec<String> = self.importers.read().keys().cloned().collect();
        formats.sort();
        formats
    }

    fn importer(&self, format: &str) -> core::result::Result<Arc<dyn Importer>, ParseError> {
        self.importers
            .read()
            .get(format)
            .cloned()
            .ok_or_else(|| ParseError::UnknownFormat {
                format: format.to_string(),
            })
    }

    /// Import the type declarations of a file.
    ///
    /// The format comes from `format_hint` when given, else from the file
    /// extension. Relative paths missing from the working directory are
    /// searched in [`RegistryConfig::search_paths`]. Nothing is added to the
    /// registry unless the whole file resolves.
    pub fn import(
        &self,
        source: impl AsRef<Path>,
        format_hint: Option<&str>,
    ) -> Result<Vec<Arc<TypeDescriptor>>> {
        let path = self.config.resolve_source(source.as_ref());
        let label = path.display().to_string();

        let format = match format_hint {
            Some(hint) => hint.to_ascii_lowercase(),
            None => path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(str::to_ascii_lowercase)
                .filter(|ext| self.importers.read().contains_key(ext))
                .ok_or_else(|| ParseError::AmbiguousFormat {
                    source: label.clone(),
                })?,
        };
        let importer = self.importer(&format)?;

        let content = std::fs::read_to_string(&path).map_err(|error| ParseError::Io {
            path: path.clone(),
            error,
        })?;
        log::debug!("[Registry::import] {} as {}", label, format);
        let declarations = importer.parse(&content, &label)?;
        Ok(import::resolve_declarations(self, &declarations, &label)?)
    }

    /// Import declarations from an in-memory source.
    pub fn import_str(&self, content: &str, format: &str) -> Result<Vec<Arc<TypeDescriptor>>> {
        let format = format.to_ascii_lowercase();
        let importer = self.importer(&format)?;
        let label = format!("<{}>", format);
        let declarations = importer.parse(content, &label)?;
        Ok(import::resolve_declarations(self, &declarations, &label)?)
    }
}

impl TypeScope for Registry {
    fn find(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        self.types.get(name).map(|entry| Arc::clone(entry.value()))
    }

    fn memoize(&self, descriptor: Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
        let name = descriptor.name().to_string();
        let registered = Arc::clone(self.types.entry(name).or_insert(descriptor).value());
        log::trace!("[Registry::build] memoized {}", registered.name());
        registered
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.types.len())
            .field("formats", &self.formats())
            .field("config", &self.config)
            .finish()
    }
}
