// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML type importer.
//!
//! # Example YAML
//!
//! ```yaml
//! types:
//!   - kind: compound
//!     name: /Sample
//!     fields:
//!       - { name: id, type: /int }
//!       - { name: label, type: "/char[16]" }
//!       - { name: samples, type: "/std/vector</double>" }
//!   - kind: enum
//!     name: /Mode
//!     values:
//!       - { name: IDLE }
//!       - { name: RUNNING, value: 4 }
//!   - kind: opaque
//!     name: /Handle
//!     size: 8
//!     alignment: 8
//!   - kind: alias
//!     name: /Identifier
//!     target: /int
//! ```

use super::{Declaration, Importer};
use crate::error::ParseError;
use serde::Deserialize;

/// Root YAML document structure.
#[derive(Debug, Deserialize)]
pub struct YamlTypeDocument {
    #[serde(default)]
    pub types: Vec<Declaration>,
}

/// Importer for the YAML format.
#[derive(Debug, Default, Clone, Copy)]
pub struct YamlImporter;

impl Importer for YamlImporter {
    fn parse(&self, content: &str, source: &str) -> Result<Vec<Declaration>, ParseError> {
        let document: YamlTypeDocument = serde_yaml::from_str(content)
            .map_err(|e| ParseError::syntax(source, format!("Failed to parse YAML: {}", e)))?;
        log::trace!(
            "[YamlImporter::parse] {}: {} declarations",
            source,
            document.types.len()
        );
        Ok(document.types)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_declaration_kinds() {
        let yaml = r#"
types:
  - kind: compound
    name: /Sample
    size: 24
    fields:
      - { name: id, type: /int }
      - { name: value, type: /double, offset: 8 }
  - kind: enum
    name: /Mode
    values:
      - { name: IDLE }
      - { name: RUNNING, value: 4 }
  - kind: opaque
    name: /Handle
    size: 8
  - kind: alias
    name: /Identifier
    target: /int
"#;
        let declarations = YamlImporter.parse(yaml, "inline").expect("parse");
        assert_eq!(declarations.len(), 4);
        match &declarations[0] {
            Declaration::Compound { name, size, fields } => {
                assert_eq!(name, "/Sample");
                assert_eq!(*size, Some(24));
                assert_eq!(fields[1].type_expr, "/double");
                assert_eq!(fields[1].offset, Some(8));
                assert_eq!(fields[0].offset, None);
            }
            other => panic!("expected compound, got {:?}", other),
        }
        assert!(matches!(
            &declarations[3],
            Declaration::Alias { target, .. } if target == "/int"
        ));
    }

    #[test]
    fn test_unknown_kind_is_a_syntax_error() {
        let yaml = "types:\n  - kind: union\n    name: /U\n";
        let err = YamlImporter.parse(yaml, "inline").expect_err("rejected");
        assert!(matches!(err, ParseError::Syntax { ref source, .. } if source == "inline"));
    }

    #[test]
    fn test_empty_document() {
        let declarations = YamlImporter.parse("types: []\n", "inline").expect("parse");
        assert!(declarations.is_empty());
    }
}
