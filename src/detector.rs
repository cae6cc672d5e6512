// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Schema detection for parsed documents.
//!
//! Classification looks only at key presence, in a fixed priority order, so
//! it is total and never fails: anything unrecognised is [`SchemaKind::Unknown`].

use crate::parser::scalar_text;
use serde_yaml::Value;
use std::fmt;

/// The document shapes the converter understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    /// Narrative scenarios with actors, commands, events and policies.
    DomainStories,
    /// System architecture: domains, bounded contexts, context mappings.
    StrategicDdd,
    /// One bounded context: aggregates, entities, value objects, services.
    TacticalDdd,
    /// Domains, pipelines, datasets and their governance.
    DataEngineering,
    /// None of the above.
    Unknown,
}

impl SchemaKind {
    /// Human-readable description of the schema kind.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::DomainStories => "Domain Stories (narrative scenarios)",
            Self::StrategicDdd => "Strategic DDD (system architecture)",
            Self::TacticalDdd => "Tactical DDD (bounded context details)",
            Self::DataEngineering => "Data Engineering (pipeline and dataset modeling)",
            Self::Unknown => "Unknown schema type",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Supported shapes, listed for users whose document was not recognised.
pub const SUPPORTED_SCHEMAS: &str = "\
supported schemas:
  - Domain Stories (expects 'domain_story', 'domain_stories' or 'stories' key)
  - Strategic DDD (expects 'system' key with domains/bounded_contexts)
  - Tactical DDD (expects 'bounded_context' key with aggregates/entities/value_objects)
  - Data Engineering (expects 'system', 'pipelines', and 'datasets' keys)";

/// Classifies a parsed document. First match wins:
///
/// 1. non-mapping → `Unknown`
/// 2. `$schema` substring match (case-insensitive)
/// 3. story keys → `DomainStories`
/// 4. `system.domains` + `pipelines` + `datasets` → `DataEngineering`
/// 5. `system` with `domains` or `bounded_contexts` → `StrategicDdd`
/// 6. `bounded_context` with building blocks → `TacticalDdd`
///
/// ```
/// use s2doc::detector::{detect, SchemaKind};
///
/// let doc: serde_yaml::Value = serde_yaml::from_str("stories: []").unwrap();
/// assert_eq!(detect(&doc), SchemaKind::DomainStories);
/// ```
#[must_use]
pub fn detect(document: &Value) -> SchemaKind {
    let Some(map) = document.as_mapping() else {
        return SchemaKind::Unknown;
    };
    let has = |value: &Value, key: &str| value.get(key).is_some();

    if let Some(schema) = map.get("$schema")
        && let Some(kind) = kind_from_schema_url(&scalar_text(schema))
    {
        return kind;
    }

    if ["domain_story", "domain_stories", "stories"]
        .iter()
        .any(|key| has(document, key))
    {
        return SchemaKind::DomainStories;
    }

    if let Some(system) = document.get("system") {
        if has(document, "pipelines") && has(document, "datasets") && has(system, "domains") {
            return SchemaKind::DataEngineering;
        }
        if has(system, "domains") || has(system, "bounded_contexts") {
            return SchemaKind::StrategicDdd;
        }
    }

    if let Some(context) = document.get("bounded_context")
        && ["aggregates", "entities", "value_objects"]
            .iter()
            .any(|key| has(context, key))
    {
        return SchemaKind::TacticalDdd;
    }

    SchemaKind::Unknown
}

fn kind_from_schema_url(url: &str) -> Option<SchemaKind> {
    let url = url.to_lowercase();
    if url.contains("domain-stories") || url.contains("domain_stories") {
        Some(SchemaKind::DomainStories)
    } else if url.contains("strategic") {
        Some(SchemaKind::StrategicDdd)
    } else if url.contains("tactical") {
        Some(SchemaKind::TacticalDdd)
    } else if url.contains("data-eng") {
        Some(SchemaKind::DataEngineering)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn non_mapping_is_unknown() {
        assert_eq!(detect(&yaml("- a\n- b")), SchemaKind::Unknown);
        assert_eq!(detect(&yaml("just text")), SchemaKind::Unknown);
        assert_eq!(detect(&Value::Null), SchemaKind::Unknown);
    }

    #[test]
    fn schema_field_wins_over_keys() {
        let doc = yaml("$schema: https://example.com/Tactical-DDD.json\nstories: []");
        assert_eq!(detect(&doc), SchemaKind::TacticalDdd);
    }

    #[test]
    fn schema_field_variants() {
        for (url, kind) in [
            ("schemas/domain-stories.json", SchemaKind::DomainStories),
            ("schemas/domain_stories.json", SchemaKind::DomainStories),
            ("STRATEGIC", SchemaKind::StrategicDdd),
            ("data-engineering.schema.json", SchemaKind::DataEngineering),
            ("data-eng", SchemaKind::DataEngineering),
        ] {
            assert_eq!(detect(&yaml(&format!("$schema: {url}"))), kind, "{url}");
        }
    }

    #[test]
    fn unmatched_schema_field_falls_through_to_keys() {
        let doc = yaml("$schema: other.json\ndomain_story: {}");
        assert_eq!(detect(&doc), SchemaKind::DomainStories);
    }

    #[test]
    fn detects_story_keys() {
        for key in ["domain_story", "domain_stories", "stories"] {
            assert_eq!(detect(&yaml(&format!("{key}: []"))), SchemaKind::DomainStories);
        }
    }

    #[test]
    fn data_engineering_needs_all_keys() {
        let full = yaml("system: {domains: []}\npipelines: []\ndatasets: []");
        assert_eq!(detect(&full), SchemaKind::DataEngineering);

        let no_datasets = yaml("system: {domains: []}\npipelines: []");
        assert_eq!(detect(&no_datasets), SchemaKind::StrategicDdd);
    }

    #[test]
    fn detects_strategic() {
        assert_eq!(
            detect(&yaml("system: {bounded_contexts: []}")),
            SchemaKind::StrategicDdd
        );
        assert_eq!(detect(&yaml("system: {name: x}")), SchemaKind::Unknown);
    }

    #[test]
    fn detects_tactical() {
        for key in ["aggregates", "entities", "value_objects"] {
            let doc = yaml(&format!("bounded_context: {{{key}: []}}"));
            assert_eq!(detect(&doc), SchemaKind::TacticalDdd);
        }
        assert_eq!(
            detect(&yaml("bounded_context: {id: bc}")),
            SchemaKind::Unknown
        );
    }

    #[test]
    fn detection_is_deterministic() {
        let doc = yaml("system: {domains: []}");
        assert_eq!(detect(&doc), detect(&doc));
    }
}
