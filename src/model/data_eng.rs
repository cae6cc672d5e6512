// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Data engineering: domains own pipelines, pipelines run stages, stages read
//! and write datasets. Contracts, checks, lineage and governance all point at
//! datasets by id.

use super::{flag, identified, opt_text, text, text_list};
use serde::Deserialize;
use serde_yaml::{Mapping, Value};

/// Root of a data engineering document.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DataEngDocument {
    /// The system header.
    pub system: System,
    /// Domains, each owning pipelines.
    pub domains: Vec<Domain>,
    /// Pipelines in declared order.
    pub pipelines: Vec<Pipeline>,
    /// Datasets in declared order.
    pub datasets: Vec<Dataset>,
    /// Data contracts.
    pub contracts: Vec<Contract>,
    /// Quality checks.
    pub checks: Vec<Check>,
    /// Dataset lineage edges.
    pub lineage: Vec<Lineage>,
    /// Retention, access and PII policies.
    pub governance: Governance,
    /// Metrics, SLOs and alerts.
    pub observability: Observability,
}

/// The system header. `domains` lists domain ids in authoring order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct System {
    /// System id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name, if given.
    #[serde(deserialize_with = "opt_text")]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Owning teams.
    pub owners: Vec<Owner>,
    /// Free-form tags.
    #[serde(deserialize_with = "text_list")]
    pub tags: Vec<String>,
    /// Domain ids.
    #[serde(deserialize_with = "text_list")]
    pub domains: Vec<String>,
}

/// An owning team and how to reach it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Owner {
    /// Team name.
    #[serde(deserialize_with = "opt_text")]
    pub team: Option<String>,
    /// Contact address.
    #[serde(deserialize_with = "opt_text")]
    pub contact: Option<String>,
}

impl Owner {
    /// `team (contact)`, with placeholders for missing parts.
    #[must_use]
    pub fn label(&self) -> String {
        format!(
            "{} ({})",
            self.team.as_deref().unwrap_or("Unknown"),
            self.contact.as_deref().unwrap_or("N/A")
        )
    }
}

/// Formats owners as a comma-separated list of [`Owner::label`]s.
#[must_use]
pub fn owner_list(owners: &[Owner]) -> String {
    owners.iter().map(Owner::label).collect::<Vec<_>>().join(", ")
}

/// A data domain owning pipelines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Domain {
    /// Domain id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Owning teams.
    pub owners: Vec<Owner>,
    /// Pipeline ids.
    #[serde(deserialize_with = "text_list")]
    pub pipelines: Vec<String>,
}

/// A scheduled chain of stages.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Pipeline {
    /// Pipeline id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Mode.
    #[serde(deserialize_with = "opt_text")]
    pub mode: Option<String>,
    /// Properties such as `idempotent`.
    #[serde(deserialize_with = "text_list")]
    pub traits: Vec<String>,
    /// Free-form tags.
    #[serde(deserialize_with = "text_list")]
    pub tags: Vec<String>,
    /// When the pipeline runs, if declared.
    pub schedule: Option<Schedule>,
    /// Stages in declared order.
    pub stages: Vec<Stage>,
}

impl Pipeline {
    /// Distinct dataset ids read by any stage, in first-seen order.
    #[must_use]
    pub fn inputs(&self) -> Vec<&str> {
        distinct(self.stages.iter().flat_map(|s| &s.inputs))
    }

    /// Distinct dataset ids written by any stage, in first-seen order.
    #[must_use]
    pub fn outputs(&self) -> Vec<&str> {
        distinct(self.stages.iter().flat_map(|s| &s.outputs))
    }

    /// Distinct dataset ids touched by any stage, inputs before outputs per stage.
    #[must_use]
    pub fn datasets(&self) -> Vec<&str> {
        distinct(
            self.stages
                .iter()
                .flat_map(|s| s.inputs.iter().chain(&s.outputs)),
        )
    }
}

pub(crate) fn distinct<'a>(ids: impl IntoIterator<Item = &'a String>) -> Vec<&'a str> {
    let mut seen = Vec::new();
    for id in ids {
        if !seen.contains(&id.as_str()) {
            seen.push(id.as_str());
        }
    }
    seen
}

/// When a pipeline runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Schedule {
    /// Schedule id, if given.
    #[serde(deserialize_with = "opt_text")]
    pub id: Option<String>,
    /// `cron`, `interval` or `event` (`type:`).
    #[serde(rename = "type", deserialize_with = "opt_text")]
    pub kind: Option<String>,
    /// Cron expression for cron schedules.
    #[serde(deserialize_with = "opt_text")]
    pub cron_expression: Option<String>,
    /// Period for interval schedules, as written.
    #[serde(deserialize_with = "opt_text")]
    pub interval_minutes: Option<String>,
    /// Events that start the pipeline.
    pub triggers: Vec<Trigger>,
}

/// An event that starts a pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Trigger {
    /// Trigger kind (`type:`).
    #[serde(rename = "type", deserialize_with = "opt_text")]
    pub kind: Option<String>,
    /// Where the event comes from.
    #[serde(deserialize_with = "opt_text")]
    pub source: Option<String>,
}

/// A step of a pipeline. `inputs`, `outputs` and `depends_on` are id lists.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Stage {
    /// Stage id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Ids of patterns used.
    #[serde(deserialize_with = "text_list")]
    pub uses_patterns: Vec<String>,
    /// Stage ids that must finish first.
    #[serde(deserialize_with = "text_list")]
    pub depends_on: Vec<String>,
    /// Dataset ids read.
    #[serde(deserialize_with = "text_list")]
    pub inputs: Vec<String>,
    /// Dataset ids written.
    #[serde(deserialize_with = "text_list")]
    pub outputs: Vec<String>,
    /// Transforms in declared order.
    pub transforms: Vec<Transform>,
}

/// One transformation step of a stage.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Transform {
    /// Transform id, if given.
    #[serde(deserialize_with = "opt_text")]
    pub id: Option<String>,
    /// Transform kind (`type:`).
    #[serde(rename = "type", deserialize_with = "opt_text")]
    pub kind: Option<String>,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Free-form settings, in authored order.
    pub config: Mapping,
}

/// A table, stream or file set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Dataset {
    /// Dataset id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Dataset kind (`type:`).
    #[serde(rename = "type", deserialize_with = "opt_text")]
    pub kind: Option<String>,
    /// Storage format.
    #[serde(deserialize_with = "opt_text")]
    pub format: Option<String>,
    /// Where the data lives.
    #[serde(deserialize_with = "opt_text")]
    pub location: Option<String>,
    /// Sensitivity class.
    #[serde(deserialize_with = "opt_text")]
    pub classification: Option<String>,
    /// Whether any field holds personal data.
    #[serde(deserialize_with = "flag")]
    pub contains_pii: bool,
    /// Names of fields holding personal data.
    #[serde(deserialize_with = "text_list")]
    pub pii_fields: Vec<String>,
    /// Free-form tags.
    #[serde(deserialize_with = "text_list")]
    pub tags: Vec<String>,
    /// Field list.
    pub schema: DatasetSchema,
    /// Partition layout, if declared.
    pub partitioning: Option<Partitioning>,
    /// Quality dimensions tracked.
    #[serde(deserialize_with = "text_list")]
    pub quality_dimensions: Vec<String>,
}

/// The fields of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatasetSchema {
    /// Fields in declared order.
    pub fields: Vec<SchemaField>,
}

/// One field of a dataset schema.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SchemaField {
    /// Field name.
    #[serde(deserialize_with = "opt_text")]
    pub name: Option<String>,
    /// Declared type (`type:`).
    #[serde(rename = "type", deserialize_with = "opt_text")]
    pub ty: Option<String>,
    /// Defaults to `true`.
    #[serde(default = "super::yes", deserialize_with = "flag")]
    pub nullable: bool,
    /// Whether the field holds personal data.
    #[serde(deserialize_with = "flag")]
    pub pii: bool,
    /// Free-form description.
    #[serde(deserialize_with = "opt_text")]
    pub description: Option<String>,
}

impl Default for SchemaField {
    fn default() -> Self {
        Self {
            name: None,
            ty: None,
            nullable: true,
            pii: false,
            description: None,
        }
    }
}

/// How a dataset is partitioned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Partitioning {
    /// Partition columns.
    #[serde(deserialize_with = "text_list")]
    pub columns: Vec<String>,
    /// Strategy name, if given.
    #[serde(deserialize_with = "opt_text")]
    pub strategy: Option<String>,
    /// Id of a shared partitioning strategy, if given.
    #[serde(deserialize_with = "opt_text")]
    pub strategy_ref: Option<String>,
}

/// An agreement on a dataset's shape and service levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Contract {
    /// Contract id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Id of the covered dataset.
    #[serde(deserialize_with = "text")]
    pub dataset: String,
    /// Contract version.
    #[serde(deserialize_with = "opt_text")]
    pub version: Option<String>,
    /// How the schema may change.
    #[serde(deserialize_with = "opt_text")]
    pub evolution_policy: Option<String>,
    /// Reference to the agreed schema.
    pub schema: ContractSchema,
    /// Service levels, if declared.
    pub sla: Option<Sla>,
    /// Owning teams.
    pub owners: Vec<Owner>,
    /// Teams relying on the contract.
    pub consumers: Vec<Consumer>,
}

/// Where a contract's schema is defined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContractSchema {
    /// Schema location, if given.
    #[serde(rename = "$ref", deserialize_with = "opt_text")]
    pub reference: Option<String>,
}

/// Service levels; numbers are kept as written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Sla {
    /// Maximum data age.
    #[serde(deserialize_with = "opt_text")]
    pub freshness_minutes: Option<String>,
    /// Minimum share of expected rows.
    #[serde(deserialize_with = "opt_text")]
    pub completeness_percent: Option<String>,
    /// Minimum uptime.
    #[serde(deserialize_with = "opt_text")]
    pub availability_percent: Option<String>,
}

/// A team relying on a contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Consumer {
    /// Team name.
    #[serde(deserialize_with = "opt_text")]
    pub team: Option<String>,
    /// Use case.
    #[serde(deserialize_with = "opt_text")]
    pub use_case: Option<String>,
}

/// A data-quality check against one dataset.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Check {
    /// Check id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Check kind (`type:`).
    #[serde(rename = "type", deserialize_with = "opt_text")]
    pub kind: Option<String>,
    /// Id of the checked dataset.
    #[serde(deserialize_with = "text")]
    pub dataset: String,
    /// Severity on failure.
    #[serde(deserialize_with = "opt_text")]
    pub severity: Option<String>,
    /// Threshold settings, in authored order.
    pub threshold: Mapping,
    /// Conditions the data must meet.
    pub assertions: Vec<Assertion>,
    /// Who is told on failure, if declared.
    pub alert: Option<Alert>,
}

/// A condition a check asserts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Assertion {
    /// The condition expression.
    #[serde(deserialize_with = "opt_text")]
    pub condition: Option<String>,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
}

/// Where check failures are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Alert {
    /// Notification channel.
    #[serde(deserialize_with = "opt_text")]
    pub channel: Option<String>,
    /// Escalation path.
    #[serde(deserialize_with = "opt_text")]
    pub escalation: Option<String>,
}

/// One upstream → downstream edge between datasets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Lineage {
    /// Source dataset id.
    #[serde(deserialize_with = "text")]
    pub upstream: String,
    /// Derived dataset id.
    #[serde(deserialize_with = "text")]
    pub downstream: String,
    /// Transform applied on the way.
    #[serde(deserialize_with = "text")]
    pub transform: String,
    /// Kind of derivation.
    #[serde(deserialize_with = "text")]
    pub relationship: String,
}

/// Data governance policies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Governance {
    /// Retention policies.
    pub retention: Vec<Retention>,
    /// Access rules.
    pub access: Vec<Access>,
    /// PII masking rules.
    pub pii_handling: Vec<PiiHandling>,
}

impl Governance {
    /// Whether no policy is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.retention.is_empty() && self.access.is_empty() && self.pii_handling.is_empty()
    }
}

/// How long a dataset is kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Retention {
    /// Dataset id.
    #[serde(deserialize_with = "text")]
    pub dataset: String,
    /// Policy name.
    #[serde(deserialize_with = "opt_text")]
    pub policy: Option<String>,
    /// Retention in days.
    #[serde(deserialize_with = "opt_text")]
    pub days: Option<String>,
    /// Retention in years.
    #[serde(deserialize_with = "opt_text")]
    pub years: Option<String>,
}

impl Retention {
    /// How long the dataset is kept, as display text.
    #[must_use]
    pub fn duration(&self) -> String {
        match (&self.days, &self.years) {
            (Some(days), _) => format!("{days} days"),
            (None, Some(years)) => format!("{years} years"),
            (None, None) if self.policy.as_deref() == Some("retain-indefinitely") => {
                "Indefinitely".to_owned()
            }
            (None, None) => "N/A".to_owned(),
        }
    }
}

/// Who may read a dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Access {
    /// Dataset id.
    #[serde(deserialize_with = "text")]
    pub dataset: String,
    /// Access tier.
    #[serde(deserialize_with = "opt_text")]
    pub tier: Option<String>,
    /// Roles granted access.
    #[serde(deserialize_with = "text_list")]
    pub roles: Vec<String>,
}

/// How personal data in a dataset is masked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PiiHandling {
    /// Dataset id.
    #[serde(deserialize_with = "text")]
    pub dataset: String,
    /// Masked field names.
    #[serde(deserialize_with = "text_list")]
    pub masking: Vec<String>,
    /// Masking method.
    #[serde(deserialize_with = "opt_text")]
    pub masking_method: Option<String>,
}

/// Runtime monitoring of the system.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Observability {
    /// Collected metrics.
    pub metrics: Vec<Metric>,
    /// Service level objectives.
    pub slos: Vec<Slo>,
    /// Alert rules.
    pub alerts: Vec<ObservabilityAlert>,
}

impl Observability {
    /// Whether nothing is declared.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.metrics.is_empty() && self.slos.is_empty() && self.alerts.is_empty()
    }
}

/// A collected metric.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Metric {
    /// Metric name.
    #[serde(deserialize_with = "opt_text")]
    pub name: Option<String>,
    /// Measured dataset id.
    #[serde(deserialize_with = "text")]
    pub dataset: String,
    /// Metric kind (`type:`).
    #[serde(rename = "type", deserialize_with = "opt_text")]
    pub kind: Option<String>,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
}

/// A service level objective.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Slo {
    /// Objective name.
    #[serde(deserialize_with = "opt_text")]
    pub name: Option<String>,
    /// Target value.
    #[serde(deserialize_with = "opt_text")]
    pub target: Option<String>,
    /// Unit of the target.
    #[serde(deserialize_with = "opt_text")]
    pub unit: Option<String>,
    /// Measurement window.
    #[serde(deserialize_with = "opt_text")]
    pub window: Option<String>,
    /// Id of the check measuring it.
    #[serde(deserialize_with = "text")]
    pub linked_check: String,
}

/// An alert rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ObservabilityAlert {
    /// Alert name.
    #[serde(deserialize_with = "opt_text")]
    pub name: Option<String>,
    /// When it fires.
    #[serde(deserialize_with = "opt_text")]
    pub condition: Option<String>,
    /// Severity.
    #[serde(deserialize_with = "opt_text")]
    pub severity: Option<String>,
    /// Notification channel.
    #[serde(deserialize_with = "opt_text")]
    pub channel: Option<String>,
}

identified! {
    Domain => (id, name),
    Pipeline => (id, name),
    Stage => (id, name),
    Dataset => (id, name),
    Contract => (id, name),
    Check => (id, name),
}

/// Summarizes a configuration mapping as `key: value` pairs, at most three,
/// with `...` when more keys exist. Nested values show their kind only.
#[must_use]
pub fn summarize_config(config: &Mapping) -> String {
    if config.is_empty() {
        return "-".to_owned();
    }
    let mut items: Vec<String> = config
        .iter()
        .take(3)
        .map(|(key, value)| {
            let key = crate::parser::scalar_text(key);
            match value {
                Value::Sequence(_) => format!("{key}: list"),
                Value::Mapping(_) => format!("{key}: dict"),
                other => format!("{key}: {}", crate::parser::scalar_text(other)),
            }
        })
        .collect();
    if config.len() > 3 {
        items.push("...".to_owned());
    }
    items.join(", ")
}
