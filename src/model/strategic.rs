// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Strategic DDD: domains, bounded contexts, backend-for-frontend scopes and
//! the mappings between contexts.

use super::{flag, identified, opt_text, text, text_list};
use crate::markdown::capitalize;
use serde::Deserialize;
use serde_yaml::Mapping;

/// Root of a strategic document (`system:`).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StrategicDocument {
    /// The described system.
    pub system: System,
}

/// A system and everything mapped inside it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct System {
    /// System id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name, if given.
    #[serde(deserialize_with = "opt_text")]
    pub name: Option<String>,
    /// Model version, shown in the header.
    #[serde(deserialize_with = "text")]
    pub version: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Business domains.
    pub domains: Vec<Domain>,
    /// Bounded contexts across all domains.
    pub bounded_contexts: Vec<BoundedContext>,
    /// Backend-for-frontend scopes.
    pub bff_scopes: Vec<BffScope>,
    /// Client-facing interfaces of the scopes.
    pub bff_interfaces: Vec<BffInterface>,
    /// Relationships between contexts.
    pub context_mappings: Vec<ContextMapping>,
}

impl System {
    /// Display name, `System` when the document leaves it out.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("System")
    }
}

/// A business domain. `bounded_contexts` lists context ids in authoring order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Domain {
    /// Domain id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// `core`, `supporting` or `generic`.
    #[serde(rename = "type", deserialize_with = "opt_text")]
    pub kind: Option<String>,
    /// How much the domain matters to the business.
    #[serde(deserialize_with = "text")]
    pub strategic_importance: String,
    /// Where effort goes: build, buy or outsource.
    #[serde(deserialize_with = "text")]
    pub investment_strategy: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Free-form notes.
    #[serde(deserialize_with = "text")]
    pub notes: String,
    /// Context ids.
    #[serde(deserialize_with = "text_list")]
    pub bounded_contexts: Vec<String>,
}

/// A bounded context as seen from the system level.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BoundedContext {
    /// Context id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Id of the owning domain.
    #[serde(deserialize_with = "text")]
    pub domain_ref: String,
    /// Owning team.
    #[serde(deserialize_with = "text")]
    pub team_ownership: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Shared vocabulary of the context.
    pub ubiquitous_language: UbiquitousLanguage,
    /// Aggregate ids, detailed in the tactical model.
    #[serde(deserialize_with = "text_list")]
    pub aggregates: Vec<String>,
    /// Repository ids.
    #[serde(deserialize_with = "text_list")]
    pub repositories: Vec<String>,
    /// Domain service ids.
    #[serde(deserialize_with = "text_list")]
    pub domain_services: Vec<String>,
    /// Application service ids.
    #[serde(deserialize_with = "text_list")]
    pub application_services: Vec<String>,
    /// Domain event ids.
    #[serde(deserialize_with = "text_list")]
    pub domain_events: Vec<String>,
}

/// The vocabulary a context's team and code share.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UbiquitousLanguage {
    /// Terms in declared order.
    pub glossary: Vec<GlossaryTerm>,
}

/// One term of a ubiquitous language.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GlossaryTerm {
    /// The term.
    #[serde(deserialize_with = "text")]
    pub term: String,
    /// What it means in this context.
    #[serde(deserialize_with = "text")]
    pub definition: String,
    /// Usage examples.
    #[serde(deserialize_with = "text_list")]
    pub examples: Vec<String>,
}

/// A backend-for-frontend serving one client type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BffScope {
    /// Scope id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// The client served, such as `web` or `mobile`.
    #[serde(deserialize_with = "text")]
    pub client_type: String,
    /// Id of the interface the scope serves.
    #[serde(deserialize_with = "text")]
    pub serves_interface: String,
    /// Owning team.
    #[serde(deserialize_with = "text")]
    pub owned_by_team: String,
    /// Team topology type of the owner.
    #[serde(deserialize_with = "text")]
    pub team_type: String,
    /// Context ids the scope reads from.
    #[serde(deserialize_with = "text_list")]
    pub aggregates_from_contexts: Vec<String>,
    /// What the scope offers its client, if declared.
    pub provides: Option<Provides>,
    /// Concerns the scope does and does not take on.
    pub responsibilities: Option<Responsibilities>,
    /// Layer the scope sits in.
    #[serde(deserialize_with = "text")]
    pub architecture_layer: String,
    /// Architectural pattern name.
    #[serde(deserialize_with = "text")]
    pub pattern_type: String,
    /// Context ids the scope depends on.
    #[serde(deserialize_with = "text_list")]
    pub upstream_dependencies: Vec<String>,
    /// Context ids called directly.
    #[serde(deserialize_with = "text_list")]
    pub calls: Vec<String>,
    /// Anti-patterns the scope avoids, if declared.
    pub anti_patterns: Option<AntiPatterns>,
}

/// The offering of a BFF scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Provides {
    /// Endpoints in declared order.
    pub endpoints: Vec<ScopeEndpoint>,
    /// How data from several contexts is combined.
    pub data_aggregation: Option<DataAggregation>,
    /// Shape changes applied to upstream data.
    pub transformations: Vec<Transformation>,
    /// Client-specific optimizations.
    #[serde(deserialize_with = "text_list")]
    pub client_optimizations: Vec<String>,
}

impl Provides {
    /// Whether any part is filled in.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
            && self.data_aggregation.is_none()
            && self.transformations.is_empty()
            && self.client_optimizations.is_empty()
    }
}

/// An endpoint offered by a BFF scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScopeEndpoint {
    /// Request path.
    #[serde(deserialize_with = "text")]
    pub path: String,
    /// HTTP method.
    #[serde(deserialize_with = "text")]
    pub method: String,
    /// Context ids combined in the response.
    #[serde(deserialize_with = "text_list")]
    pub aggregates_from: Vec<String>,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
}

/// How a BFF scope combines upstream data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DataAggregation {
    /// Strategy name, such as `parallel`.
    #[serde(deserialize_with = "text")]
    pub strategy: String,
    /// Worked example, if given.
    #[serde(deserialize_with = "opt_text")]
    pub example: Option<String>,
}

/// A shape change applied to data from one context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Transformation {
    /// Source context id.
    #[serde(deserialize_with = "text")]
    pub from_context: String,
    /// Kind of change.
    #[serde(deserialize_with = "text")]
    pub transformation_type: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
}

/// Concerns a BFF scope takes on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Responsibilities {
    /// Combines data from several contexts.
    #[serde(deserialize_with = "flag")]
    pub data_aggregation: bool,
    /// Orchestrates calls for its client.
    #[serde(deserialize_with = "flag")]
    pub client_specific_orchestration: bool,
    /// Shapes data for display.
    #[serde(deserialize_with = "flag")]
    pub presentation_logic: bool,
    /// Translates between wire formats.
    #[serde(deserialize_with = "flag")]
    pub format_translation: bool,
    /// Holds business rules.
    #[serde(deserialize_with = "flag")]
    pub business_logic: bool,
    /// Manages transactions.
    #[serde(deserialize_with = "flag")]
    pub transaction_management: bool,
    /// Writes to storage itself.
    #[serde(deserialize_with = "flag")]
    pub direct_persistence: bool,
}

/// Anti-patterns a BFF scope avoids.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct AntiPatterns {
    /// Business logic shared across clients.
    #[serde(deserialize_with = "flag")]
    pub shared_business_logic: bool,
    /// Generic concerns better kept in a gateway.
    #[serde(deserialize_with = "flag")]
    pub generic_cross_cutting_concerns: bool,
    /// Reading another context's storage.
    #[serde(deserialize_with = "flag")]
    pub direct_database_access: bool,
    /// One BFF for several kinds of client.
    #[serde(deserialize_with = "flag")]
    pub serving_multiple_client_types: bool,
}

/// A client-facing API surface belonging to a BFF scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BffInterface {
    /// Interface id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Id of the owning scope.
    #[serde(deserialize_with = "text")]
    pub bff_scope_ref: String,
    /// Id of the context most calls go to.
    #[serde(deserialize_with = "text")]
    pub primary_bounded_context_ref: String,
    /// Path prefix of every endpoint.
    #[serde(deserialize_with = "text")]
    pub base_path: String,
    /// Other context ids called.
    #[serde(deserialize_with = "text_list")]
    pub additional_context_refs: Vec<String>,
    /// Endpoints in declared order.
    pub endpoints: Vec<InterfaceEndpoint>,
    /// Synchronous or asynchronous handling.
    #[serde(deserialize_with = "text")]
    pub execution_model: String,
    /// Error strategy, if declared.
    pub error_handling: Option<ErrorHandling>,
    /// Implementation stack, if declared.
    pub technology_stack: Option<TechnologyStack>,
    /// Layer the interface sits in.
    #[serde(deserialize_with = "text")]
    pub layer: String,
    /// Value object conversions at the boundary, if declared.
    pub value_object_conversion: Option<ValueObjectConversion>,
}

/// An endpoint of a BFF interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct InterfaceEndpoint {
    /// Request path below the base path.
    #[serde(deserialize_with = "text")]
    pub path: String,
    /// HTTP method.
    #[serde(deserialize_with = "text")]
    pub method: String,
    /// `command` or `query`.
    #[serde(deserialize_with = "text")]
    pub operation_type: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Command ids handled by this endpoint.
    #[serde(deserialize_with = "text_list")]
    pub delegates_to_commands: Vec<String>,
    /// Query ids handled by this endpoint.
    #[serde(deserialize_with = "text_list")]
    pub delegates_to_queries: Vec<String>,
    /// Context ids combined in the response.
    #[serde(deserialize_with = "text_list")]
    pub aggregates_data_from: Vec<String>,
}

/// How an interface reports failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ErrorHandling {
    /// Strategy name.
    #[serde(deserialize_with = "text")]
    pub strategy: String,
    /// Free-form description, if given.
    #[serde(deserialize_with = "opt_text")]
    pub description: Option<String>,
}

/// How an interface is implemented.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TechnologyStack {
    /// Framework name, if given.
    #[serde(deserialize_with = "opt_text")]
    pub framework: Option<String>,
    /// Controller annotation, if given.
    #[serde(deserialize_with = "opt_text")]
    pub controller_annotation: Option<String>,
}

/// Conversions between value objects and strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ValueObjectConversion {
    /// Parsing from request strings.
    pub from_string: Vec<Conversion>,
    /// Formatting for responses.
    pub to_string: Vec<Conversion>,
}

/// One value-object ↔ string conversion. `field` is `from_field` or `to_field`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Conversion {
    /// Id of the converted value object.
    #[serde(deserialize_with = "text")]
    pub value_object_ref: String,
    /// The string field converted.
    #[serde(alias = "from_field", alias = "to_field", deserialize_with = "text")]
    pub field: String,
    /// Conversion method name.
    #[serde(deserialize_with = "text")]
    pub method: String,
}

/// A directed relationship between two contexts (or an external system).
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ContextMapping {
    /// Mapping id.
    #[serde(deserialize_with = "text")]
    pub id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Upstream context or external system id.
    #[serde(deserialize_with = "text")]
    pub upstream_context: String,
    /// Downstream context or external system id.
    #[serde(deserialize_with = "text")]
    pub downstream_context: String,
    /// Relationship pattern, such as `customer_supplier` or `acl`.
    #[serde(deserialize_with = "text")]
    pub relationship_type: String,
    /// How the two sides integrate.
    #[serde(deserialize_with = "text")]
    pub integration_pattern: String,
    /// Upstream term to downstream term, in authored order.
    pub translation_map: Mapping,
    /// Anti-corruption layer parts, if declared.
    pub acl_details: Option<AclDetails>,
    /// Elements shared by both sides.
    #[serde(deserialize_with = "text_list")]
    pub shared_elements: Vec<String>,
    /// Free-form notes.
    #[serde(deserialize_with = "text")]
    pub notes: String,
}

/// Parts of an anti-corruption layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AclDetails {
    /// Facades in front of the upstream model.
    #[serde(deserialize_with = "text_list")]
    pub facades: Vec<String>,
    /// Adapters calling the upstream side.
    #[serde(deserialize_with = "text_list")]
    pub adapters: Vec<String>,
    /// Translators between the two models.
    #[serde(deserialize_with = "text_list")]
    pub translators: Vec<String>,
}

identified! {
    Domain => (id, name),
    BoundedContext => (id, name),
    BffScope => (id, name),
    BffInterface => (id, name),
    ContextMapping => (id, name),
}

/// Converts `snake_case` relationship types to words, keeping ACL/API upper-case.
///
/// ```
/// use s2doc::model::strategic::humanize_relationship;
///
/// assert_eq!(humanize_relationship("customer_supplier"), "Customer Supplier");
/// assert_eq!(humanize_relationship("acl"), "ACL");
/// ```
#[must_use]
pub fn humanize_relationship(kind: &str) -> String {
    kind.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| match word.to_ascii_lowercase().as_str() {
            "acl" | "api" => word.to_ascii_uppercase(),
            _ => capitalize(word),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_mapping_with_translation_map_in_order() {
        let mapping: ContextMapping = serde_yaml::from_str(
            "
id: cm_1
upstream_context: bc_a
downstream_context: external_bank
translation_map:
  zeta: Z
  alpha: A
",
        )
        .unwrap();
        let keys: Vec<_> = mapping
            .translation_map
            .keys()
            .filter_map(|k| k.as_str())
            .collect();
        assert_eq!(keys, ["zeta", "alpha"]);
    }

    #[test]
    fn conversion_accepts_either_field_name() {
        let from: Conversion = serde_yaml::from_str("from_field: iban").unwrap();
        let to: Conversion = serde_yaml::from_str("to_field: amount").unwrap();
        assert_eq!(from.field, "iban");
        assert_eq!(to.field, "amount");
    }

    #[test]
    fn humanizes_relationship_types() {
        assert_eq!(humanize_relationship("anti_corruption_layer"), "Anti Corruption Layer");
        assert_eq!(humanize_relationship("open_host_api"), "Open Host API");
        assert_eq!(humanize_relationship(""), "");
    }

    #[test]
    fn system_name_defaults() {
        assert_eq!(System::default().display_name(), "System");
    }
}
