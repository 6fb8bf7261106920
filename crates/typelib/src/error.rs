// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error taxonomy shared by the registry, the memory layer and the value API.
//!
//! Every failure is raised synchronously by the call that violates a
//! contract. Variants carry the operation name and enough of the descriptor
//! or zone state to tell the four kinds apart without inspecting internals.

use std::fmt;
use std::path::PathBuf;

/// Errors returned by typelib operations.
#[derive(Debug)]
pub enum Error {
    /// Registry lookup by name with no match.
    NotFound {
        /// Qualified name that was requested.
        name: String,
    },
    /// Import source is malformed, ambiguous, or inconsistent with the registry.
    Parse(ParseError),
    /// Usage-level contract violation (wrong-sized buffer, null dereference,
    /// structurally incompatible descriptors, ...).
    InvalidArgument {
        /// Operation that rejected its arguments (e.g. `Value::wrap`).
        operation: &'static str,
        /// Name of the descriptor involved.
        type_name: String,
        /// Human readable reason.
        reason: String,
    },
    /// Access through a value whose zone has been released.
    StaleReference {
        /// Operation that attempted the access.
        operation: &'static str,
        /// Root address of the released zone.
        zone_address: usize,
    },
}

impl Error {
    pub(crate) fn invalid(
        operation: &'static str,
        type_name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidArgument {
            operation,
            type_name: type_name.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(name: impl Into<String>) -> Self {
        Error::NotFound { name: name.into() }
    }

    /// True for [`Error::InvalidArgument`].
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Error::InvalidArgument { .. })
    }

    /// True for [`Error::StaleReference`].
    pub fn is_stale(&self) -> bool {
        matches!(self, Error::StaleReference { .. })
    }

    /// True for [`Error::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound { name } => write!(f, "Type not found: {}", name),
            Error::Parse(err) => write!(f, "Parse error: {}", err),
            Error::InvalidArgument {
                operation,
                type_name,
                reason,
            } => write!(f, "{}({}): {}", operation, type_name, reason),
            Error::StaleReference {
                operation,
                zone_address,
            } => write!(
                f,
                "{}: zone 0x{:016X} has been released",
                operation, zone_address
            ),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ParseError> for Error {
    fn from(value: ParseError) -> Self {
        Error::Parse(value)
    }
}

/// Failures raised while importing type declarations.
#[derive(Debug)]
pub enum ParseError {
    /// No format hint was given and the source does not identify its format.
    AmbiguousFormat { source: String },
    /// The format hint names no registered importer.
    UnknownFormat { format: String },
    /// The source content is malformed.
    Syntax { source: String, message: String },
    /// A declaration references a type that neither the source nor the
    /// registry defines.
    UnresolvedType { name: String },
    /// A name is already registered with a structurally different layout.
    Conflict { name: String },
    /// The source could not be read.
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
}

impl ParseError {
    pub(crate) fn syntax(source: impl Into<String>, message: impl Into<String>) -> Self {
        ParseError::Syntax {
            source: source.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::AmbiguousFormat { source } => write!(
                f,
                "cannot detect the format of '{}'; pass an explicit format",
                source
            ),
            ParseError::UnknownFormat { format } => {
                write!(f, "no importer registered for format '{}'", format)
            }
            ParseError::Syntax { source, message } => write!(f, "{}: {}", source, message),
            ParseError::UnresolvedType { name } => write!(f, "unresolved type '{}'", name),
            ParseError::Conflict { name } => write!(
                f,
                "'{}' is already defined with a different layout",
                name
            ),
            ParseError::Io { path, error } => {
                write!(f, "cannot read '{}': {}", path.display(), error)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Convenient alias for API results using the crate `Error` type.
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_argument_display_names_operation() {
        let err = Error::invalid("Value::wrap", "/short", "expected 2 bytes, got 0");
        assert_eq!(err.to_string(), "Value::wrap(/short): expected 2 bytes, got 0");
        assert!(err.is_invalid_argument());
        assert!(!err.is_stale());
    }

    #[test]
    fn test_parse_error_converts_and_keeps_source() {
        let err: Error = ParseError::UnknownFormat {
            format: "idl".into(),
        }
        .into();
        assert!(matches!(err, Error::Parse(ParseError::UnknownFormat { .. })));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_stale_reference_display() {
        let err = Error::StaleReference {
            operation: "Value::to_byte_array",
            zone_address: 0x1000,
        };
        assert_eq!(
            err.to_string(),
            "Value::to_byte_array: zone 0x0000000000001000 has been released"
        );
    }
}
