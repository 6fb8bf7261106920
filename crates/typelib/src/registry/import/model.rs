// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Declaration model shared by every importer.
//!
//! Importers only parse; name resolution, layout and the registry merge are
//! done once for all formats by [`super::resolve_declarations`].

#[cfg(feature = "loaders")]
use serde::Deserialize;

/// One type declaration of an import source.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "loaders", derive(Deserialize))]
#[cfg_attr(feature = "loaders", serde(tag = "kind", rename_all = "lowercase"))]
pub enum Declaration {
    /// Struct with ordered fields. Offsets and size are computed with
    /// natural alignment when omitted.
    Compound {
        name: String,
        #[cfg_attr(feature = "loaders", serde(default))]
        size: Option<usize>,
        #[cfg_attr(feature = "loaders", serde(default))]
        fields: Vec<FieldDeclaration>,
    },
    Enum {
        name: String,
        #[cfg_attr(feature = "loaders", serde(default))]
        values: Vec<EnumDeclaration>,
    },
    /// Type known only by its size.
    Opaque {
        name: String,
        size: usize,
        #[cfg_attr(feature = "loaders", serde(default))]
        alignment: Option<usize>,
    },
    /// Second name for an existing type expression (typedef).
    Alias { name: String, target: String },
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Compound { name, .. }
            | Declaration::Enum { name, .. }
            | Declaration::Opaque { name, .. }
            | Declaration::Alias { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "loaders", derive(Deserialize))]
pub struct FieldDeclaration {
    pub name: String,
    /// Type expression (`/int`, `/char[20]`, `/std/vector</A>`...).
    #[cfg_attr(feature = "loaders", serde(rename = "type"))]
    pub type_expr: String,
    #[cfg_attr(feature = "loaders", serde(default))]
    pub offset: Option<usize>,
}

/// Enum symbol; the value defaults to the previous one plus one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "loaders", derive(Deserialize))]
pub struct EnumDeclaration {
    pub name: String,
    #[cfg_attr(feature = "loaders", serde(default))]
    pub value: Option<i32>,
}
