// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type expressions: `<base>` followed by `*` and `[N]` suffixes.
//!
//! The base may carry template arguments (`/std/vector</int*>`); suffixes
//! are only recognised outside of angle brackets and apply left to right, so
//! `/int*[4]` is an array of four pointers and `/int[4]*` a pointer to an
//! array.

use crate::config::VECTOR_PREFIX;
use crate::error::ParseError;
use crate::layout::TypeDescriptor;
use std::sync::Arc;

/// One derivation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Suffix {
    Pointer,
    Array(usize),
}

#[derive(Debug, PartialEq, Eq)]
pub(crate) struct TypeExpr {
    /// Qualified base name (leading `/` added when missing).
    pub base: String,
    pub suffixes: Vec<Suffix>,
}

/// Add the leading `/` of qualified names.
pub(crate) fn qualify(name: &str) -> String {
    let name = name.trim();
    if name.starts_with('/') {
        name.to_string()
    } else {
        format!("/{}", name)
    }
}

pub(crate) fn parse(expr: &str) -> Result<TypeExpr, ParseError> {
    let text = expr.trim();
    let mut depth = 0usize;
    let mut base_end = text.len();
    for (i, c) in text.char_indices() {
        match c {
            '<' => depth += 1,
            '>' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| ParseError::syntax(expr, "unbalanced '>'"))?;
            }
            '*' | '[' if depth == 0 => {
                base_end = i;
                break;
            }
            ']' if depth == 0 => return Err(ParseError::syntax(expr, "unexpected ']'")),
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ParseError::syntax(expr, "unbalanced '<'"));
    }

    let base = text[..base_end].trim();
    if base.is_empty() || base == "/" {
        return Err(ParseError::syntax(expr, "missing base type"));
    }

    let mut suffixes = Vec::new();
    let mut rest = text[base_end..].trim_start();
    while let Some(c) = rest.chars().next() {
        match c {
            '*' => {
                suffixes.push(Suffix::Pointer);
                rest = rest[1..].trim_start();
            }
            '[' => {
                let close = rest
                    .find(']')
                    .ok_or_else(|| ParseError::syntax(expr, "unterminated '['"))?;
                let count = rest[1..close].trim();
                let length = count.parse::<usize>().map_err(|_| {
                    ParseError::syntax(expr, format!("invalid array length '{}'", count))
                })?;
                if length == 0 {
                    return Err(ParseError::syntax(expr, "array length must be positive"));
                }
                suffixes.push(Suffix::Array(length));
                rest = rest[close + 1..].trim_start();
            }
            other => {
                return Err(ParseError::syntax(
                    expr,
                    format!("unexpected '{}' after the base type", other),
                ));
            }
        }
    }

    Ok(TypeExpr {
        base: qualify(base),
        suffixes,
    })
}

/// Element expression of a `/std/vector<...>` base.
pub(crate) fn vector_argument(base: &str) -> Option<&str> {
    base.strip_prefix(VECTOR_PREFIX)?.strip_suffix('>')
}

/// Outcome of resolving an expression against a scope.
#[derive(Debug)]
pub(crate) enum Resolved {
    Found(Arc<TypeDescriptor>),
    /// Name that the scope does not define.
    Missing(String),
}

/// Where expressions are resolved: the registry itself, or an import in
/// progress (staged declarations over the registry).
pub(crate) trait TypeScope {
    fn find(&self, name: &str) -> Option<Arc<TypeDescriptor>>;

    /// Record a derived descriptor under its own name; returns the instance
    /// that ends up registered (an earlier one wins).
    fn memoize(&self, descriptor: Arc<TypeDescriptor>) -> Arc<TypeDescriptor>;
}

fn find_or_memoize(scope: &impl TypeScope, derived: TypeDescriptor) -> Arc<TypeDescriptor> {
    match scope.find(derived.name()) {
        Some(existing) => existing,
        None => scope.memoize(Arc::new(derived)),
    }
}

pub(crate) fn resolve(scope: &impl TypeScope, expr: &str) -> Result<Resolved, ParseError> {
    let parsed = parse(expr)?;

    let mut current = match scope.find(&parsed.base) {
        Some(found) => found,
        None => match vector_argument(&parsed.base) {
            Some(argument) => match resolve(scope, argument)? {
                Resolved::Found(element) => {
                    find_or_memoize(scope, TypeDescriptor::vector_of(&element))
                }
                missing => return Ok(missing),
            },
            None => return Ok(Resolved::Missing(parsed.base)),
        },
    };

    for suffix in parsed.suffixes {
        let derived = match suffix {
            Suffix::Pointer => TypeDescriptor::pointer_to(&current),
            Suffix::Array(length) => TypeDescriptor::array_of(&current, length),
        };
        current = find_or_memoize(scope, derived);
    }
    Ok(Resolved::Found(current))
}
