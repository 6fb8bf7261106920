// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type importers.
//!
//! An [`Importer`] turns the text of one source into [`Declaration`]s. The
//! registry then resolves them as a whole: field types may reference types
//! declared later in the same source, and nothing reaches the registry
//! unless every declaration resolves and none conflicts with an existing
//! definition.
//!
//! Two importers ship with the `loaders` feature:
//!
//! | Format | Extensions | Importer |
//! |--------|------------|----------|
//! | YAML | `.yaml`, `.yml` | [`YamlImporter`] |
//! | XML (tlb) | `.tlb`, `.xml` | [`XmlImporter`] |

mod model;

#[cfg(feature = "loaders")]
mod xml;

#[cfg(feature = "loaders")]
mod yaml;

pub use model::{Declaration, EnumDeclaration, FieldDeclaration};

#[cfg(feature = "loaders")]
pub use xml::XmlImporter;

#[cfg(feature = "loaders")]
pub use yaml::YamlImporter;

use super::expr::{self, qualify, Resolved, TypeScope};
use super::Registry;
use crate::error::ParseError;
use crate::layout::{CompoundBuilder, EnumBuilder, TypeDescriptor};
use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::Arc;

/// Parser of one import format.
pub trait Importer: Send + Sync {
    /// Parse `content`; `source` names it in error messages.
    fn parse(&self, content: &str, source: &str) -> Result<Vec<Declaration>, ParseError>;
}

/// Declarations staged over the registry while an import is resolved.
struct ImportScope<'r> {
    registry: &'r Registry,
    staged: RefCell<HashMap<String, Arc<TypeDescriptor>>>,
    order: RefCell<Vec<String>>,
}

impl<'r> ImportScope<'r> {
    fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            staged: RefCell::new(HashMap::new()),
            order: RefCell::new(Vec::new()),
        }
    }

    /// Stage `descriptor` under `name`. A name already known (staged or
    /// registered) keeps its instance when equivalent and conflicts
    /// otherwise.
    fn stage(
        &self,
        name: String,
        descriptor: Arc<TypeDescriptor>,
    ) -> Result<Arc<TypeDescriptor>, ParseError> {
        if let Some(existing) = self.find(&name) {
            if existing.is_equivalent(&descriptor) {
                return Ok(existing);
            }
            return Err(ParseError::Conflict { name });
        }
        self.staged
            .borrow_mut()
            .insert(name.clone(), Arc::clone(&descriptor));
        self.order.borrow_mut().push(name);
        Ok(descriptor)
    }

    fn into_staged(self) -> Vec<(String, Arc<TypeDescriptor>)> {
        let mut staged = self.staged.into_inner();
        self.order
            .into_inner()
            .into_iter()
            .filter_map(|name| staged.remove(&name).map(|desc| (name, desc)))
            .collect()
    }
}

impl TypeScope for ImportScope<'_> {
    fn find(&self, name: &str) -> Option<Arc<TypeDescriptor>> {
        if let Some(found) = self.staged.borrow().get(name) {
            return Some(Arc::clone(found));
        }
        self.registry.find(name)
    }

    fn memoize(&self, descriptor: Arc<TypeDescriptor>) -> Arc<TypeDescriptor> {
        let name = descriptor.name().to_string();
        if let Some(found) = self.find(&name) {
            return found;
        }
        self.staged
            .borrow_mut()
            .insert(name.clone(), Arc::clone(&descriptor));
        self.order.borrow_mut().push(name);
        descriptor
    }
}

enum Attempt {
    Built(Arc<TypeDescriptor>),
    /// Waiting on a type that is not known yet.
    Blocked(String),
}

fn attempt(
    scope: &ImportScope<'_>,
    declaration: &Declaration,
    source: &str,
) -> Result<Attempt, ParseError> {
    let name = qualify(declaration.name());
    let built = match declaration {
        Declaration::Compound { size, fields, .. } => {
            let mut builder = CompoundBuilder::new(name.as_str());
            for field in fields {
                let resolved = match expr::resolve(scope, &field.type_expr)? {
                    Resolved::Found(desc) => desc,
                    Resolved::Missing(missing) => return Ok(Attempt::Blocked(missing)),
                };
                builder = match field.offset {
                    Some(offset) => builder.field_at(field.name.as_str(), &resolved, offset),
                    None => builder.field(field.name.as_str(), &resolved),
                };
            }
            if let Some(size) = size {
                builder = builder.size(*size);
            }
            builder
                .build()
                .map_err(|err| ParseError::syntax(source, err.to_string()))?
        }
        Declaration::Enum { values, .. } => {
            let mut builder = EnumBuilder::new(name.as_str());
            for value in values {
                builder = match value.value {
                    Some(explicit) => builder.variant_value(value.name.as_str(), explicit),
                    None => builder.variant(value.name.as_str()),
                };
            }
            builder
                .build()
                .map_err(|err| ParseError::syntax(source, err.to_string()))?
        }
        Declaration::Opaque {
            size, alignment, ..
        } => {
            let alignment = alignment.unwrap_or(1);
            if alignment == 0 || !alignment.is_power_of_two() {
                return Err(ParseError::syntax(
                    source,
                    format!("opaque '{}': alignment {} is not a power of two", name, alignment),
                ));
            }
            TypeDescriptor::opaque(name.as_str(), *size, alignment)
        }
        Declaration::Alias { target, .. } => {
            return match expr::resolve(scope, target)? {
                Resolved::Found(desc) => Ok(Attempt::Built(scope.stage(name, desc)?)),
                Resolved::Missing(missing) => Ok(Attempt::Blocked(missing)),
            };
        }
    };
    Ok(Attempt::Built(scope.stage(name, Arc::new(built))?))
}

/// Resolve `declarations` against themselves and the registry, then merge
/// them. Returns the declared descriptors in declaration order.
pub(crate) fn resolve_declarations(
    registry: &Registry,
    declarations: &[Declaration],
    source: &str,
) -> Result<Vec<Arc<TypeDescriptor>>, ParseError> {
    let scope = ImportScope::new(registry);
    let mut resolved: Vec<Option<Arc<TypeDescriptor>>> = vec![None; declarations.len()];
    let mut remaining = declarations.len();

    while remaining > 0 {
        let mut blocked_on = None;
        let mut progress = false;
        for (slot, declaration) in resolved.iter_mut().zip(declarations) {
            if slot.is_some() {
                continue;
            }
            match attempt(&scope, declaration, source)? {
                Attempt::Built(desc) => {
                    *slot = Some(desc);
                    remaining -= 1;
                    progress = true;
                }
                Attempt::Blocked(name) => {
                    blocked_on.get_or_insert(name);
                }
            }
        }
        if !progress {
            let name = blocked_on.unwrap_or_default();
            log::debug!("[Registry::import] {}: unresolved type {}", source, name);
            return Err(ParseError::UnresolvedType { name });
        }
    }

    let staged = scope.into_staged();
    log::debug!(
        "[Registry::import] {}: merging {} types ({} declared)",
        source,
        staged.len(),
        declarations.len()
    );
    for (name, desc) in staged {
        registry.merge(name, desc)?;
    }
    Ok(resolved.into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, type_expr: &str) -> FieldDeclaration {
        FieldDeclaration {
            name: name.into(),
            type_expr: type_expr.into(),
            offset: None,
        }
    }

    #[test]
    fn test_forward_references_resolve() {
        let registry = Registry::with_standard_types();
        let declarations = vec![
            Declaration::Compound {
                name: "/Outer".into(),
                size: None,
                fields: vec![field("inner", "/Inner"), field("peer", "/Inner*")],
            },
            Declaration::Compound {
                name: "/Inner".into(),
                size: None,
                fields: vec![field("x", "/int")],
            },
        ];
        let types =
            resolve_declarations(&registry, &declarations, "test").expect("resolves");
        let names: Vec<&str> = types.iter().map(|t| t.name()).collect();
        assert_eq!(names, vec!["/Outer", "/Inner"]);
        assert!(registry.contains("/Inner*"));
        assert_eq!(registry.get("/Outer").expect("outer").size(), 16);
    }

    #[test]
    fn test_unresolved_type_leaves_registry_untouched() {
        let registry = Registry::with_standard_types();
        let before = registry.len();
        let declarations = vec![
            Declaration::Compound {
                name: "/Good".into(),
                size: None,
                fields: vec![field("x", "/int")],
            },
            Declaration::Compound {
                name: "/Bad".into(),
                size: None,
                fields: vec![field("y", "/Missing[2]")],
            },
        ];
        let err = resolve_declarations(&registry, &declarations, "test").expect_err("fails");
        assert!(matches!(err, ParseError::UnresolvedType { ref name } if name == "/Missing"));
        assert_eq!(registry.len(), before);
        assert!(!registry.contains("/Good"));
    }

    #[test]
    fn test_conflicting_redefinition() {
        let registry = Registry::with_standard_types();
        let declarations = vec![Declaration::Opaque {
            name: "/int".into(),
            size: 4,
            alignment: Some(4),
        }];
        let err = resolve_declarations(&registry, &declarations, "test").expect_err("conflict");
        assert!(matches!(err, ParseError::Conflict { ref name } if name == "/int"));
    }

    #[test]
    fn test_alias_shares_target_instance() {
        let registry = Registry::with_standard_types();
        let declarations = vec![Declaration::Alias {
            name: "/Counter".into(),
            target: "/unsigned int".into(),
        }];
        resolve_declarations(&registry, &declarations, "test").expect("alias");
        assert!(Arc::ptr_eq(
            &registry.get("/Counter").expect("alias"),
            &registry.get("/unsigned int").expect("target")
        ));
    }
}
