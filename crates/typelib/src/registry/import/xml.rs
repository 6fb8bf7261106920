// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! XML (tlb) type importer.
//!
//! ```xml
//! <typelib>
//!   <compound name="/Sample" size="24">
//!     <field name="id" type="/int" offset="0"/>
//!     <field name="value" type="/double" offset="8"/>
//!   </compound>
//!   <enum name="/Mode">
//!     <value symbol="IDLE" value="0"/>
//!     <value symbol="RUNNING"/>
//!   </enum>
//!   <opaque name="/Handle" size="8" alignment="8"/>
//!   <alias name="/Identifier" source="/int"/>
//! </typelib>
//! ```
//!
//! Unknown elements are skipped so files written by other tools (which
//! may carry documentation or metadata nodes) still import.

use super::{Declaration, EnumDeclaration, FieldDeclaration, Importer};
use crate::error::ParseError;
use roxmltree::{Document, Node};
use std::str::FromStr;

/// Importer for the XML (tlb) format.
#[derive(Debug, Default, Clone, Copy)]
pub struct XmlImporter;

fn required<'a>(node: &Node<'a, '_>, attribute: &str, source: &str) -> Result<&'a str, ParseError> {
    node.attribute(attribute).ok_or_else(|| {
        ParseError::syntax(
            source,
            format!(
                "<{}> at byte {} is missing the '{}' attribute",
                node.tag_name().name(),
                node.range().start,
                attribute
            ),
        )
    })
}

fn number<T: FromStr>(node: &Node<'_, '_>, attribute: &str, source: &str) -> Result<Option<T>, ParseError> {
    match node.attribute(attribute) {
        None => Ok(None),
        Some(text) => text.trim().parse::<T>().map(Some).map_err(|_| {
            ParseError::syntax(
                source,
                format!(
                    "<{}> attribute '{}': '{}' is not a valid number",
                    node.tag_name().name(),
                    attribute,
                    text
                ),
            )
        }),
    }
}

fn children<'a, 'input>(
    node: &Node<'a, 'input>,
    tag: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == tag)
}

fn compound(node: &Node<'_, '_>, source: &str) -> Result<Declaration, ParseError> {
    let fields = children(node, "field")
        .map(|field| {
            Ok(FieldDeclaration {
                name: required(&field, "name", source)?.to_string(),
                type_expr: required(&field, "type", source)?.to_string(),
                offset: number(&field, "offset", source)?,
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;
    Ok(Declaration::Compound {
        name: required(node, "name", source)?.to_string(),
        size: number(node, "size", source)?,
        fields,
    })
}

fn enumeration(node: &Node<'_, '_>, source: &str) -> Result<Declaration, ParseError> {
    let values = children(node, "value")
        .map(|value| {
            Ok(EnumDeclaration {
                name: required(&value, "symbol", source)?.to_string(),
                value: number(&value, "value", source)?,
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;
    Ok(Declaration::Enum {
        name: required(node, "name", source)?.to_string(),
        values,
    })
}

impl Importer for XmlImporter {
    fn parse(&self, content: &str, source: &str) -> Result<Vec<Declaration>, ParseError> {
        let doc = Document::parse(content)
            .map_err(|e| ParseError::syntax(source, format!("Failed to parse XML: {}", e)))?;

        let root = doc.root_element();
        if root.tag_name().name() != "typelib" {
            return Err(ParseError::syntax(
                source,
                format!("expected a <typelib> root element, found <{}>", root.tag_name().name()),
            ));
        }

        let mut declarations = Vec::new();
        for node in root.children().filter(|n| n.is_element()) {
            let declaration = match node.tag_name().name() {
                "compound" => compound(&node, source)?,
                "enum" => enumeration(&node, source)?,
                "opaque" => Declaration::Opaque {
                    name: required(&node, "name", source)?.to_string(),
                    size: number(&node, "size", source)?.ok_or_else(|| {
                        ParseError::syntax(source, "<opaque> is missing the 'size' attribute")
                    })?,
                    alignment: number(&node, "alignment", source)?,
                },
                "alias" => Declaration::Alias {
                    name: required(&node, "name", source)?.to_string(),
                    target: required(&node, "source", source)?.to_string(),
                },
                other => {
                    log::trace!("[XmlImporter::parse] {}: skipping <{}>", source, other);
                    continue;
                }
            };
            declarations.push(declaration);
        }
        log::trace!(
            "[XmlImporter::parse] {}: {} declarations",
            source,
            declarations.len()
        );
        Ok(declarations)
    }
}
