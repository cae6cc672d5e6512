// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Tactical DDD: the building blocks of one bounded context.

use super::{flag, identified, opt_text, text, text_list, yes};
use serde::Deserialize;

/// Root of a tactical document (`bounded_context:`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TacticalDocument {
    /// The single bounded context described by the document.
    pub bounded_context: BoundedContext,
}

/// A bounded context and every building block declared inside it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BoundedContext {
    /// Context id; also names the output file.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Id of the strategic domain the context belongs to.
    #[serde(deserialize_with = "text")]
    pub domain_ref: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Entities, aggregate roots included.
    pub entities: Vec<Entity>,
    /// Value objects.
    pub value_objects: Vec<ValueObject>,
    /// Aggregates, referring to entities and value objects by id.
    pub aggregates: Vec<Aggregate>,
    /// One repository per persisted aggregate.
    pub repositories: Vec<Repository>,
    /// Stateless domain operations.
    pub domain_services: Vec<DomainService>,
    /// Use-case orchestration.
    pub application_services: Vec<ApplicationService>,
    /// Events raised by aggregates.
    pub domain_events: Vec<DomainEvent>,
    /// Write-side interfaces.
    pub command_interfaces: Vec<CommandInterface>,
    /// Read-side interfaces.
    pub query_interfaces: Vec<QueryInterface>,
}

/// An object with identity and a lifecycle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Entity {
    /// Entity id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Attributes in declared order.
    pub attributes: Vec<Attribute>,
    /// Behaviour the entity exposes.
    pub business_methods: Vec<Method>,
    /// Rules that always hold; the first one summarizes an aggregate it roots.
    #[serde(deserialize_with = "text_list")]
    pub invariants: Vec<String>,
}

/// A typed attribute of an entity or value object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Attribute {
    /// Attribute name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Declared type (`type:`).
    #[serde(rename = "type", deserialize_with = "text")]
    pub ty: String,
    /// Value object that gives this attribute its type, if any.
    #[serde(deserialize_with = "opt_text")]
    pub value_object_ref: Option<String>,
    /// Whether a value must be present. Defaults to `true`.
    #[serde(default = "yes", deserialize_with = "flag")]
    pub required: bool,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
}

impl Default for Attribute {
    fn default() -> Self {
        Self {
            name: String::new(),
            ty: String::new(),
            value_object_ref: None,
            required: true,
            description: String::new(),
        }
    }
}

/// An immutable value compared by its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValueObject {
    /// Value object id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Defaults to `true`.
    #[serde(default = "yes", deserialize_with = "flag")]
    pub immutability: bool,
    /// Attributes in declared order.
    pub attributes: Vec<Attribute>,
    /// Checks applied on construction.
    #[serde(deserialize_with = "text_list")]
    pub validation_rules: Vec<String>,
    /// Attribute names that decide equality.
    #[serde(deserialize_with = "text_list")]
    pub equality_criteria: Vec<String>,
}

impl Default for ValueObject {
    fn default() -> Self {
        Self {
            id: String::new(),
            name: String::new(),
            description: String::new(),
            immutability: true,
            attributes: Vec::new(),
            validation_rules: Vec::new(),
            equality_criteria: Vec::new(),
        }
    }
}

impl ValueObject {
    /// Only value objects with several attributes get their own diagram class;
    /// single-attribute ones are shown as their underlying type.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        self.attributes.len() > 1
    }
}

/// A consistency boundary. `entities` and `value_objects` are id references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Aggregate {
    /// Aggregate id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Id of the root entity.
    #[serde(deserialize_with = "text")]
    pub root_ref: String,
    /// Member entity ids.
    #[serde(deserialize_with = "text_list")]
    pub entities: Vec<String>,
    /// Member value object ids.
    #[serde(deserialize_with = "text_list")]
    pub value_objects: Vec<String>,
    /// `small`, `medium` or `large`.
    #[serde(deserialize_with = "opt_text")]
    pub size_estimate: Option<String>,
    /// Rules enforced within one transaction.
    #[serde(deserialize_with = "text_list")]
    pub consistency_rules: Vec<String>,
    /// Rules that always hold for the aggregate.
    #[serde(deserialize_with = "text_list")]
    pub invariants: Vec<String>,
}

/// Persistence interface for one aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Repository {
    /// Repository id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Id of the persisted aggregate.
    #[serde(deserialize_with = "text")]
    pub aggregate_ref: String,
    /// Interface methods.
    pub interface_methods: Vec<Method>,
}

/// A method signature: repository interface, domain service or entity method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Method {
    /// Method name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Parameters in declared order.
    pub parameters: Vec<Parameter>,
    /// Return type, if declared.
    #[serde(deserialize_with = "opt_text")]
    pub returns: Option<String>,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
}

impl Method {
    /// Return type, `void` when none is declared.
    #[must_use]
    pub fn returns_or_void(&self) -> &str {
        self.returns.as_deref().unwrap_or("void")
    }
}

/// A method or command parameter.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Parameter {
    /// Parameter name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Declared type (`type:`).
    #[serde(rename = "type", deserialize_with = "text")]
    pub ty: String,
    /// Defaults to `true`.
    #[serde(default = "yes", deserialize_with = "flag")]
    pub required: bool,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
}

impl Default for Parameter {
    fn default() -> Self {
        Self {
            name: String::new(),
            ty: String::new(),
            required: true,
            description: String::new(),
        }
    }
}

/// Formats parameters as `name: Type, name: Type`.
#[must_use]
pub fn parameter_list(parameters: &[Parameter]) -> String {
    parameters
        .iter()
        .map(|p| format!("{}: {}", p.name, p.ty))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Domain logic that belongs to no single entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DomainService {
    /// Service id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Operations as method signatures.
    pub operations: Vec<Method>,
}

/// Orchestrates use cases over aggregates and domain services.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ApplicationService {
    /// Service id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Use cases in declared order.
    pub operations: Vec<Operation>,
}

/// A use case exposed by an application service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Operation {
    /// Operation name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// `command` or `query`.
    #[serde(rename = "type", deserialize_with = "text")]
    pub kind: String,
    /// Parameters in declared order.
    pub parameters: Vec<Parameter>,
    /// Return type, if declared.
    #[serde(deserialize_with = "opt_text")]
    pub returns: Option<String>,
    /// Transaction settings, if declared.
    pub transaction_boundary: Option<TransactionBoundary>,
    /// Steps performed, if declared.
    pub workflow: Option<Workflow>,
}

impl Operation {
    /// Whether the operation changes state.
    #[must_use]
    pub fn is_command(&self) -> bool {
        self.kind == "command"
    }
}

/// How an operation's changes are committed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TransactionBoundary {
    /// Defaults to `true`.
    #[serde(default = "yes", deserialize_with = "flag")]
    pub is_transactional: bool,
    /// Ids of aggregates modified.
    #[serde(deserialize_with = "text_list")]
    pub modifies_aggregates: Vec<String>,
    /// `strong` or `eventual`, if declared.
    #[serde(deserialize_with = "opt_text")]
    pub consistency_type: Option<String>,
}

impl Default for TransactionBoundary {
    fn default() -> Self {
        Self {
            is_transactional: true,
            modifies_aggregates: Vec::new(),
            consistency_type: None,
        }
    }
}

/// The ordered steps an application operation performs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Workflow {
    /// Input is validated first.
    #[serde(deserialize_with = "flag")]
    pub validates_input: bool,
    /// Aggregate ids loaded.
    #[serde(deserialize_with = "text_list")]
    pub loads_aggregates: Vec<String>,
    /// Domain operations called, by name.
    #[serde(deserialize_with = "text_list")]
    pub invokes_domain_operations: Vec<String>,
    /// Domain service ids called.
    #[serde(deserialize_with = "text_list")]
    pub invokes_domain_services: Vec<String>,
    /// Changed aggregates are saved.
    #[serde(deserialize_with = "flag")]
    pub persists_aggregates: bool,
    /// Event ids published.
    #[serde(deserialize_with = "text_list")]
    pub publishes_events: Vec<String>,
    /// Name of the returned DTO, if any.
    #[serde(deserialize_with = "opt_text")]
    pub returns_dto: Option<String>,
}

/// Something that happened to an aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DomainEvent {
    /// Event id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Id of the aggregate that raises it.
    #[serde(deserialize_with = "text")]
    pub aggregate_ref: String,
    /// Payload fields.
    pub data_carried: Vec<Field>,
}

/// A named, typed field of an event payload or query result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Field {
    /// Field name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Declared type (`type:`).
    #[serde(rename = "type", deserialize_with = "text")]
    pub ty: String,
    /// Wire format hint.
    #[serde(deserialize_with = "text")]
    pub serialization: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
}

/// A write-side interface grouping command records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommandInterface {
    /// Interface id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Commands in declared order.
    pub command_records: Vec<CommandRecord>,
}

/// One command of a command interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommandRecord {
    /// Command name.
    #[serde(deserialize_with = "text")]
    pub record_name: String,
    /// What the caller wants to happen.
    #[serde(deserialize_with = "text")]
    pub intent: String,
    /// Parameters in declared order.
    pub parameters: Vec<Parameter>,
    /// Return type, if declared.
    #[serde(deserialize_with = "opt_text")]
    pub returns: Option<String>,
    /// Id of the returned record type, if any.
    #[serde(deserialize_with = "opt_text")]
    pub return_type_ref: Option<String>,
    /// Id of the aggregate modified, if any.
    #[serde(deserialize_with = "opt_text")]
    pub modifies_aggregate: Option<String>,
    /// Event ids published.
    #[serde(deserialize_with = "text_list")]
    pub publishes_events: Vec<String>,
    /// Fields recorded for auditing.
    #[serde(deserialize_with = "text_list")]
    pub audit_fields: Vec<String>,
}

/// A read-side interface grouping query methods.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryInterface {
    /// Interface id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Queries in declared order.
    pub query_methods: Vec<QueryMethod>,
}

/// One query of a query interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct QueryMethod {
    /// Query name.
    #[serde(deserialize_with = "text")]
    pub method_name: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Parameters in declared order.
    pub parameters: Vec<Parameter>,
    /// Name of the result record.
    #[serde(deserialize_with = "text")]
    pub result_record_name: String,
    /// Result fields, if declared.
    pub result_structure: Option<ResultStructure>,
    /// Reads storage directly instead of loading aggregates.
    #[serde(deserialize_with = "flag")]
    pub bypasses_domain_model: bool,
    /// Read optimizations, if declared.
    pub optimizations: Option<Optimizations>,
}

/// Fields of a query result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ResultStructure {
    /// Fields in declared order.
    pub fields: Vec<Field>,
}

/// Read-side optimizations of a query.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Optimizations {
    /// Served from a denormalized view.
    #[serde(deserialize_with = "flag")]
    pub denormalized: bool,
    /// Results are cached.
    #[serde(deserialize_with = "flag")]
    pub cached: bool,
    /// Backed by an index. Defaults to `true`.
    #[serde(default = "yes", deserialize_with = "flag")]
    pub indexed: bool,
}

impl Default for Optimizations {
    fn default() -> Self {
        Self {
            denormalized: false,
            cached: false,
            indexed: true,
        }
    }
}

identified! {
    Entity => (id, name),
    ValueObject => (id, name),
    Aggregate => (id, name),
    Repository => (id, name),
    DomainService => (id, name),
    ApplicationService => (id, name),
    DomainEvent => (id, name),
    CommandInterface => (id, name),
    QueryInterface => (id, name),
}
