// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! The conversion pipeline: detect the schema, read the typed records, render.
//!
//! # Example
//!
//! ```
//! use s2doc::convert::convert;
//! use s2doc::detector::SchemaKind;
//! use s2doc::renderer::RenderOptions;
//!
//! let doc = s2doc::parser::parse_document("
//! bounded_context:
//!   id: bc_payments
//!   name: Payments
//!   aggregates: []
//! ").unwrap();
//!
//! let conversion = convert(&doc, &RenderOptions::default()).unwrap();
//! assert_eq!(conversion.kind, SchemaKind::TacticalDdd);
//! assert_eq!(conversion.output_name.as_deref(), Some("bc_payments"));
//! assert!(conversion.markdown.starts_with("# Payments"));
//! ```

use crate::detector::{SUPPORTED_SCHEMAS, SchemaKind, detect};
use crate::model::data_eng::DataEngDocument;
use crate::model::stories::StoriesDocument;
use crate::model::strategic::StrategicDocument;
use crate::model::tactical::TacticalDocument;
use crate::renderer::{self, RenderOptions};
use log::debug;
use serde::Deserialize;
use serde_yaml::Value;
use snafu::prelude::*;

/// Error type for conversion failures.
#[derive(Debug, Snafu)]
pub enum ConvertError {
    /// The document matches none of the supported shapes.
    #[snafu(display("could not detect schema type\n{SUPPORTED_SCHEMAS}"))]
    UnknownSchema,

    /// The root key the detected kind is built on is absent.
    #[snafu(display("{kind} document is missing required key '{key}'"))]
    MissingRequiredField {
        /// The detected schema kind.
        kind: SchemaKind,
        /// The absent key.
        key: &'static str,
    },

    /// The document cannot be read into typed records at all.
    #[snafu(display("{kind} document is malformed: {source}"))]
    MalformedSection {
        /// The detected schema kind.
        kind: SchemaKind,
        /// The underlying deserialization error.
        source: serde_yaml::Error,
    },
}

/// A document read into the typed records of its kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Model {
    /// A domain stories document.
    DomainStories(StoriesDocument),
    /// A strategic DDD document.
    StrategicDdd(StrategicDocument),
    /// A tactical DDD document.
    TacticalDdd(TacticalDocument),
    /// A data engineering document.
    DataEngineering(DataEngDocument),
}

impl Model {
    /// Detects the document's kind and reads it.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind cannot be detected, if its root key is
    /// missing, or if the document's structure does not fit the kind.
    pub fn load(document: &Value) -> Result<Self, ConvertError> {
        let kind = detect(document);
        debug!(kind = kind.description(); "detected schema");
        match kind {
            SchemaKind::Unknown => UnknownSchemaSnafu.fail(),
            SchemaKind::DomainStories => read(document, kind).map(Self::DomainStories),
            SchemaKind::StrategicDdd => {
                require(document, kind, "system")?;
                read(document, kind).map(Self::StrategicDdd)
            }
            SchemaKind::TacticalDdd => {
                require(document, kind, "bounded_context")?;
                read(document, kind).map(Self::TacticalDdd)
            }
            SchemaKind::DataEngineering => {
                require(document, kind, "system")?;
                read(document, kind).map(Self::DataEngineering)
            }
        }
    }

    /// The schema kind the document was read as.
    #[must_use]
    pub const fn kind(&self) -> SchemaKind {
        match self {
            Self::DomainStories(_) => SchemaKind::DomainStories,
            Self::StrategicDdd(_) => SchemaKind::StrategicDdd,
            Self::TacticalDdd(_) => SchemaKind::TacticalDdd,
            Self::DataEngineering(_) => SchemaKind::DataEngineering,
        }
    }

    /// Renders the document with its kind's renderer.
    #[must_use]
    pub fn render(&self, opts: &RenderOptions) -> String {
        match self {
            Self::DomainStories(doc) => renderer::stories::render(doc, opts),
            Self::StrategicDdd(doc) => renderer::strategic::render(doc, opts),
            Self::TacticalDdd(doc) => renderer::tactical::render(doc, opts),
            Self::DataEngineering(doc) => renderer::data_eng::render(doc, opts),
        }
    }

    /// Output file stem chosen by the document itself: a tactical document is
    /// named after its bounded context. Other kinds take the input's name.
    ///
    /// The stem is always a single path component; see [`file_stem`].
    #[must_use]
    pub fn output_name(&self) -> Option<String> {
        match self {
            Self::TacticalDdd(doc) => file_stem(&doc.bounded_context.id),
            _ => None,
        }
    }
}

/// Turns an id into a file stem that stays inside its directory: path
/// separators and control characters become `_` and leading dots are
/// dropped. `None` if nothing is left.
#[must_use]
pub fn file_stem(id: &str) -> Option<String> {
    let stem: String = id
        .chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | ':') || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    let stem = stem.trim_start_matches('.').trim();
    (!stem.is_empty()).then(|| stem.to_owned())
}

fn require(document: &Value, kind: SchemaKind, key: &'static str) -> Result<(), ConvertError> {
    ensure!(
        document.get(key).is_some_and(|value| !value.is_null()),
        MissingRequiredFieldSnafu { kind, key }
    );
    Ok(())
}

fn read<'de, T: Deserialize<'de>>(document: &'de Value, kind: SchemaKind) -> Result<T, ConvertError> {
    T::deserialize(document).context(MalformedSectionSnafu { kind })
}

/// The result of converting one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// The detected schema kind.
    pub kind: SchemaKind,
    /// The rendered document.
    pub markdown: String,
    /// See [`Model::output_name`].
    pub output_name: Option<String>,
}

/// Converts a parsed document to Markdown.
///
/// # Errors
///
/// Returns an error if the document's schema cannot be detected or if its
/// required root key is absent or malformed.
pub fn convert(document: &Value, opts: &RenderOptions) -> Result<Conversion, ConvertError> {
    let model = Model::load(document)?;
    Ok(Conversion {
        kind: model.kind(),
        markdown: model.render(opts),
        output_name: model.output_name(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_document;

    fn convert_yaml(yaml: &str) -> Result<Conversion, ConvertError> {
        convert(&parse_document(yaml).unwrap(), &RenderOptions::default())
    }

    #[test]
    fn unknown_schema_lists_supported_shapes() {
        let err = convert_yaml("foo: bar").unwrap_err();
        assert!(matches!(err, ConvertError::UnknownSchema));
        assert!(err.to_string().contains("Tactical DDD (expects 'bounded_context'"));
    }

    #[test]
    fn schema_url_without_root_key_is_missing_field() {
        let err = convert_yaml("$schema: https://example.com/tactical.json\nname: x").unwrap_err();
        assert!(matches!(
            err,
            ConvertError::MissingRequiredField {
                kind: SchemaKind::TacticalDdd,
                key: "bounded_context"
            }
        ));
    }

    #[test]
    fn malformed_root_is_reported() {
        let err = convert_yaml("bounded_context:\n  id: bc\n  aggregates: 5").unwrap_err();
        assert!(matches!(err, ConvertError::MalformedSection { .. }));
    }

    #[test]
    fn tactical_output_named_after_context() {
        let conversion =
            convert_yaml("bounded_context:\n  id: bc_orders\n  entities: []").unwrap();
        assert_eq!(conversion.output_name.as_deref(), Some("bc_orders"));

        let unnamed = convert_yaml("bounded_context:\n  entities: []").unwrap();
        assert_eq!(unnamed.output_name, None);
    }

    #[test]
    fn output_name_stays_in_output_directory() {
        let escaping = convert_yaml("bounded_context:\n  id: ../../etc/passwd\n  entities: []").unwrap();
        assert_eq!(escaping.output_name.as_deref(), Some("_.._etc_passwd"));

        let absolute = convert_yaml("bounded_context:\n  id: /tmp/bc\n  entities: []").unwrap();
        assert_eq!(absolute.output_name.as_deref(), Some("_tmp_bc"));

        let dots = convert_yaml("bounded_context:\n  id: '..'\n  entities: []").unwrap();
        assert_eq!(dots.output_name, None);
    }

    #[test]
    fn file_stem_keeps_plain_ids() {
        assert_eq!(file_stem("bc_orders.v2").as_deref(), Some("bc_orders.v2"));
        assert_eq!(file_stem(r"a\b:c").as_deref(), Some("a_b_c"));
        assert_eq!(file_stem(".hidden").as_deref(), Some("hidden"));
        assert_eq!(file_stem(""), None);
    }

    #[test]
    fn null_and_numeric_fields_still_render() {
        let conversion = convert_yaml(
            "
bounded_context:
  id: bc
  name: Billing
  domain_ref: ~
  entities:
    - {id: 42, name: Invoice}
  aggregates:
    - id: agg_invoice
      name:
      root_ref: 42
      entities: 42
",
        )
        .unwrap();
        assert!(conversion.markdown.starts_with("# Billing"));
        assert!(!conversion.markdown.contains("**Domain**"));
        assert!(conversion.markdown.contains("<a id=\"agg_invoice\"></a>"));
        assert!(conversion.markdown.contains("- [Invoice](#42) (root)"));
    }

    #[test]
    fn stories_under_both_keys_are_rendered() {
        let conversion = convert_yaml(
            "
domain_stories:
  - {domain_story_id: dst_first, title: First}
stories:
  - {domain_story_id: dst_second, title: Second}
",
        )
        .unwrap();
        assert!(conversion.markdown.contains("<a id=\"dst_first\"></a>"));
        assert!(conversion.markdown.contains("<a id=\"dst_second\"></a>"));
    }

    #[test]
    fn other_kinds_take_input_name() {
        let conversion = convert_yaml("domain_stories: []").unwrap();
        assert_eq!(conversion.kind, SchemaKind::DomainStories);
        assert_eq!(conversion.output_name, None);
    }

    #[test]
    fn conversion_is_deterministic() {
        let yaml = "
system:
  id: s
  domains: [dom]
domains:
  - {id: dom, pipelines: [p1, p2]}
pipelines:
  - {id: p1, stages: [{id: a, inputs: [x, y], outputs: [z]}]}
  - {id: p2, stages: [{id: b, inputs: [z, y], outputs: [w]}]}
datasets: []
";
        assert_eq!(convert_yaml(yaml).unwrap(), convert_yaml(yaml).unwrap());
    }
}
