// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! YAML loading for domain-model documents.
//!
//! Input files are plain YAML, optionally written as a multi-document stream
//! where leading documents carry front-matter metadata. Only the last
//! document is the model; everything before it is ignored.
//!
//! # Example
//!
//! ```
//! use s2doc::parser::parse_document;
//!
//! let yaml = "\
//! title: front matter
//! ---
//! bounded_context:
//!   id: bc_payments
//!   aggregates: []
//! ";
//!
//! let doc = parse_document(yaml).unwrap();
//! assert!(doc.get("bounded_context").is_some());
//! assert!(doc.get("title").is_none());
//! ```

use serde::Deserialize;
use serde_yaml::Value;
use snafu::prelude::*;

/// Error type for YAML parsing failures.
#[derive(Debug, Snafu)]
pub enum ParseError {
    /// The input is not valid YAML.
    #[snafu(display("failed to parse YAML: {source}"))]
    Yaml {
        /// The underlying YAML error.
        source: serde_yaml::Error,
    },
}

/// Parses YAML text and returns the last document of the stream.
///
/// An empty stream yields [`Value::Null`], which the detector classifies as
/// an unknown schema rather than a parse failure.
///
/// # Errors
///
/// Returns an error if any document in the stream is malformed.
pub fn parse_document(yaml: &str) -> Result<Value, ParseError> {
    let mut last = Value::Null;
    for document in serde_yaml::Deserializer::from_str(yaml) {
        last = Value::deserialize(document).context(YamlSnafu)?;
    }
    Ok(last)
}

/// Renders a scalar YAML value as display text.
///
/// Strings are returned as-is, numbers and booleans in their YAML spelling,
/// null as the empty string. Sequences and mappings have no scalar form and
/// also yield the empty string.
#[must_use]
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_document() {
        let doc = parse_document("system:\n  id: sys-1\n").unwrap();
        assert_eq!(doc["system"]["id"].as_str(), Some("sys-1"));
    }

    #[test]
    fn keeps_last_document_of_stream() {
        let doc = parse_document("meta: 1\n---\nstories: []\n").unwrap();
        assert!(doc.get("stories").is_some());
        assert!(doc.get("meta").is_none());
    }

    #[test]
    fn empty_input_is_null() {
        assert_eq!(parse_document("").unwrap(), Value::Null);
    }

    #[test]
    fn returns_error_for_invalid_yaml() {
        assert!(parse_document("key: [unclosed").is_err());
    }

    #[test]
    fn scalar_text_formats_scalars() {
        assert_eq!(scalar_text(&Value::from("v1")), "v1");
        assert_eq!(scalar_text(&Value::from(2)), "2");
        assert_eq!(scalar_text(&Value::from(true)), "true");
        assert_eq!(scalar_text(&Value::Null), "");
    }
}
