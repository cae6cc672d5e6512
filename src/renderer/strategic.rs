// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Strategic DDD rendering: the system, its domains and bounded contexts,
//! backend-for-frontend scopes and the mappings between contexts.

use super::RenderOptions;
use crate::diagram::{Direction, Edge, Flowchart, Node};
use crate::markdown::{Block, Table, anchor, check_mark, code, humanize, link, sections};
use crate::model::strategic::{
    BffInterface, BffScope, BoundedContext, ContextMapping, Conversion, Domain,
    StrategicDocument, System, humanize_relationship,
};
use crate::parser::scalar_text;
use crate::resolver::StrategicResolver;
use log::debug;
use std::collections::HashMap;

const CLASS_DEFS: [(&str, &str); 7] = [
    ("systemStyle", "fill:#e1f5ff,stroke:#01579b,stroke-width:3px,color:#000"),
    ("coreStyle", "fill:#c8e6c9,stroke:#2e7d32,stroke-width:2px,color:#000"),
    ("supportingStyle", "fill:#fff9c4,stroke:#f57f17,stroke-width:2px,color:#000"),
    ("genericStyle", "fill:#f5f5f5,stroke:#616161,stroke-width:2px,color:#000"),
    ("bcStyle", "fill:#bbdefb,stroke:#1976d2,stroke-width:1px,color:#000"),
    ("bffStyle", "fill:#ffe0b2,stroke:#e65100,stroke-width:2px,color:#000"),
    ("bffIfStyle", "fill:#fff3e0,stroke:#ef6c00,stroke-width:1px,color:#000"),
];

/// Renders a strategic document as Markdown.
#[must_use]
pub fn render(document: &StrategicDocument, opts: &RenderOptions) -> String {
    let system = &document.system;
    let renderer = Renderer {
        system,
        resolver: StrategicResolver::new(system),
    };
    let parts = [
        renderer.header(),
        renderer.index(),
        if opts.diagrams {
            renderer.architecture()
        } else {
            String::new()
        },
        renderer.domains_table(),
        sections(system.domains.iter().map(|d| renderer.domain(d))),
        renderer.bff_scopes(),
        renderer.mappings_table(),
        sections(system.context_mappings.iter().map(|m| renderer.mapping(m))),
    ];
    debug!(system = system.id.as_str(); "rendered strategic document");
    sections(parts)
}

struct Renderer<'a> {
    system: &'a System,
    resolver: StrategicResolver<'a>,
}

impl Renderer<'_> {
    fn header(&self) -> String {
        let system = self.system;
        let mut block = Block::new();
        block
            .line(format!("# {}", humanize(system.display_name())))
            .blank()
            .field("System ID", &code(&system.id))
            .field("Version", &system.version)
            .blank()
            .para(&system.description);
        block.finish()
    }

    fn index(&self) -> String {
        let system = self.system;
        let mut block = Block::new();

        let mut domains = Vec::new();
        for domain in &system.domains {
            domains.push(link(&domain.id, &humanize(&domain.name)));
            for context in self.resolver.contexts_for_domain(&domain.id) {
                domains.push(format!("  - {}", link(&context.id, &humanize(&context.name))));
            }
        }
        push_index_list(&mut block, "### Domains and Bounded Contexts", &domains);

        let mut scopes = Vec::new();
        for scope in &system.bff_scopes {
            scopes.push(link(&scope.id, &humanize(&scope.name)));
            for interface in self.resolver.interfaces_for_scope(&scope.id) {
                scopes.push(format!(
                    "  - {}",
                    link(&interface.id, &humanize(&interface.name))
                ));
            }
        }
        push_index_list(
            &mut block,
            "### Backend-for-Frontend (BFF) Scopes and Interfaces",
            &scopes,
        );

        // Grouped by the domain of the upstream context, in first-seen order.
        let mut groups: Vec<(&Domain, Vec<&ContextMapping>)> = Vec::new();
        for mapping in &system.context_mappings {
            let Some(domain) = self.resolver.domain_of_context(&mapping.upstream_context) else {
                continue;
            };
            match groups.iter_mut().find(|(d, _)| d.id == domain.id) {
                Some((_, members)) => members.push(mapping),
                None => groups.push((domain, vec![mapping])),
            }
        }
        let mut mappings = Vec::new();
        for (domain, members) in groups {
            mappings.push(format!("**{}**", humanize(&domain.name)));
            for mapping in members {
                mappings.push(format!("  - {}", link(&mapping.id, &humanize(&mapping.name))));
            }
        }
        push_index_list(&mut block, "### Context Mappings", &mappings);

        if block.is_empty() {
            return String::new();
        }
        format!("## Index\n\n{}", block.finish())
    }

    fn architecture(&self) -> String {
        let system = self.system;
        let mut chart = Flowchart::new(Direction::TopBottom);
        chart.node(Node::new(
            "System",
            format!("«System»<br/>{}", system.display_name()),
        ));

        let mut context_nodes: HashMap<&str, String> = HashMap::new();
        let mut by_kind: [Vec<String>; 3] = Default::default();
        let mut edges = Vec::new();
        for (i, domain) in system.domains.iter().enumerate() {
            let node = format!("Domain{}", i + 1);
            let kind = domain.kind.as_deref().unwrap_or("core");
            chart.node(Node::new(
                &node,
                format!("«Domain»<br/>{}<br/>(type: {kind})", domain.name),
            ));
            edges.push(Edge::new("System", &node));
            match kind {
                "core" => by_kind[0].push(node.clone()),
                "supporting" => by_kind[1].push(node.clone()),
                "generic" => by_kind[2].push(node.clone()),
                _ => {}
            }
            for context in self.resolver.contexts_for_domain(&domain.id) {
                if let Some(bc) = context_nodes.get(context.id.as_str()) {
                    edges.push(Edge::new(&node, bc));
                    continue;
                }
                let bc = format!("BC{}", context_nodes.len() + 1);
                chart.node(Node::new(
                    &bc,
                    format!("«Bounded Context»<br/>{}", context.name),
                ));
                edges.push(Edge::new(&node, &bc));
                context_nodes.insert(context.id.as_str(), bc);
            }
        }

        let mut scope_nodes: HashMap<&str, String> = HashMap::new();
        for (i, scope) in system.bff_scopes.iter().enumerate() {
            let node = format!("BFF{}", i + 1);
            chart.node(Node::new(
                &node,
                format!("«BFF»<br/>{}<br/>({})", scope.name, scope.client_type),
            ));
            edges.push(Edge::new("System", &node));
            scope_nodes.insert(scope.id.as_str(), node);
        }

        let mut interface_nodes = Vec::new();
        for (i, interface) in system.bff_interfaces.iter().enumerate() {
            let node = format!("BFFIF{}", i + 1);
            chart.node(Node::new(
                &node,
                format!("«BFF Interface»<br/>{}", interface.name),
            ));
            if let Some(scope) = scope_nodes.get(interface.bff_scope_ref.as_str()) {
                edges.push(Edge::new(scope, &node));
            }
            if let Some(context) = context_nodes.get(interface.primary_bounded_context_ref.as_str())
            {
                edges.push(Edge::new(&node, context).dotted());
            }
            interface_nodes.push(node);
        }

        // Endpoints outside the modelled contexts become plain nodes.
        let mut external: Vec<&str> = Vec::new();
        for mapping in &system.context_mappings {
            let ends = [
                mapping.upstream_context.as_str(),
                mapping.downstream_context.as_str(),
            ];
            for end in ends {
                if !end.is_empty() && !context_nodes.contains_key(end) && !external.contains(&end)
                {
                    external.push(end);
                    chart.node(Node::new(end, end));
                }
            }
            let node_of = |id: &str| context_nodes.get(id).cloned().unwrap_or_else(|| id.to_owned());
            let kind = if mapping.relationship_type.is_empty() {
                "dependency"
            } else {
                mapping.relationship_type.as_str()
            };
            edges.push(
                Edge::new(
                    &node_of(&mapping.upstream_context),
                    &node_of(&mapping.downstream_context),
                )
                .dotted()
                .labelled(kind),
            );
        }

        for edge in edges {
            chart.edge(edge);
        }
        for (name, style) in CLASS_DEFS {
            chart.class_def(name, style);
        }
        let [core, supporting, generic] = by_kind;
        let mut contexts: Vec<String> = context_nodes.into_values().collect();
        contexts.sort_by_key(|node| node_number(node));
        let mut scopes: Vec<String> = scope_nodes.into_values().collect();
        scopes.sort_by_key(|node| node_number(node));
        chart
            .class(vec!["System".to_owned()], "systemStyle")
            .class(core, "coreStyle")
            .class(supporting, "supportingStyle")
            .class(generic, "genericStyle")
            .class(contexts, "bcStyle")
            .class(scopes, "bffStyle")
            .class(interface_nodes, "bffIfStyle");

        format!("## System Architecture\n\n{}", chart.emit())
    }

    fn domains_table(&self) -> String {
        let mut table = Table::new(["Name", "Type", "Strategic Importance", "Description"]);
        for domain in &self.system.domains {
            table.row([
                link(&domain.id, &humanize(&domain.name)),
                domain.kind.clone().unwrap_or_default(),
                domain.strategic_importance.clone(),
                domain.description.clone(),
            ]);
        }
        if table.is_empty() {
            return String::new();
        }
        format!("## Domains\n\n{}", table.render())
    }

    fn domain(&self, domain: &Domain) -> String {
        let mut block = Block::new();
        block
            .line(format!("## {}{}", anchor(&domain.id), humanize(&domain.name)))
            .blank()
            .field("Domain ID", &code(&domain.id))
            .field("Type", domain.kind.as_deref().unwrap_or_default())
            .field("Strategic Importance", &domain.strategic_importance)
            .field("Investment Strategy", domain.investment_strategy.trim())
            .blank()
            .para(&domain.description);
        if !domain.notes.trim().is_empty() {
            block.field("Notes", domain.notes.trim()).blank();
        }
        for context in self.resolver.contexts_for_domain(&domain.id) {
            block.push_block(&self.context(context));
        }
        block.finish()
    }

    fn context(&self, context: &BoundedContext) -> String {
        let mut block = Block::new();
        block
            .line(format!("### {}{}", anchor(&context.id), humanize(&context.name)))
            .blank()
            .field("Context ID", &code(&context.id));
        if !context.domain_ref.is_empty() {
            block.field(
                "Domain",
                &format!(
                    "{} ({})",
                    self.resolver.domains.reference(&context.domain_ref),
                    code(&context.domain_ref)
                ),
            );
        }
        block
            .field("Team Ownership", context.team_ownership.trim())
            .blank()
            .para(&context.description);

        let mut glossary = Table::new(["Term", "Definition", "Examples"]);
        for term in &context.ubiquitous_language.glossary {
            glossary.row([
                term.term.clone(),
                term.definition.clone(),
                term.examples.join(", "),
            ]);
        }
        if !glossary.is_empty() {
            block
                .blank()
                .line("#### Ubiquitous Language")
                .push_block(&glossary.render());
        }
        block
            .list("#### Aggregates", &context.aggregates)
            .list("#### Repositories", &context.repositories)
            .list("#### Domain Services", &context.domain_services)
            .list("#### Application Services", &context.application_services)
            .list("#### Domain Events", &context.domain_events);
        block.finish()
    }

    fn bff_scopes(&self) -> String {
        let scopes: Vec<String> = self
            .system
            .bff_scopes
            .iter()
            .map(|s| self.bff_scope(s))
            .collect();
        if scopes.is_empty() {
            return String::new();
        }
        sections(std::iter::once("## Backend-for-Frontend (BFF) Scopes".to_owned()).chain(scopes))
    }

    fn bff_scope(&self, scope: &BffScope) -> String {
        let mut block = Block::new();
        block
            .line(format!("## {}{}", anchor(&scope.id), humanize(&scope.name)))
            .blank()
            .field("BFF ID", &code(&scope.id))
            .field("Client Type", &scope.client_type)
            .field("Serves Interface", scope.serves_interface.trim());
        if !scope.owned_by_team.is_empty() {
            block.field(
                "Owned By Team",
                &format!("{} ({})", scope.owned_by_team, scope.team_type),
            );
        }
        let sources: Vec<String> = scope
            .aggregates_from_contexts
            .iter()
            .map(|id| self.resolver.contexts.reference(id))
            .collect();
        block.list("#### Aggregates From Contexts", &sources);

        if let Some(provides) = scope.provides.as_ref().filter(|p| !p.is_empty()) {
            block.blank().line("#### Provides").blank();
            let mut endpoints = Table::new(["Path", "Method", "Aggregates From", "Description"]);
            for endpoint in &provides.endpoints {
                endpoints.row([
                    endpoint.path.clone(),
                    endpoint.method.clone(),
                    endpoint.aggregates_from.join(", "),
                    endpoint.description.clone(),
                ]);
            }
            if !endpoints.is_empty() {
                block.line("**Endpoints**:").push_block(&endpoints.render());
            }
            if let Some(aggregation) = &provides.data_aggregation {
                let mut items = vec![format!("Strategy: {}", aggregation.strategy)];
                if let Some(example) = &aggregation.example {
                    items.push(format!("Example: {example}"));
                }
                block.bullets("Data Aggregation", &items);
            }
            let mut transformations =
                Table::new(["From Context", "Transformation Type", "Description"]);
            for t in &provides.transformations {
                transformations.row([&t.from_context, &t.transformation_type, &t.description]);
            }
            if !transformations.is_empty() {
                block
                    .blank()
                    .line("**Transformations**:")
                    .push_block(&transformations.render());
            }
            block.bullets("Client Optimizations", &provides.client_optimizations);
        }

        if let Some(r) = &scope.responsibilities {
            block.list(
                "#### Responsibilities",
                &[
                    format!("Data Aggregation: {}", check_mark(r.data_aggregation)),
                    format!(
                        "Client-Specific Orchestration: {}",
                        check_mark(r.client_specific_orchestration)
                    ),
                    format!("Presentation Logic: {}", check_mark(r.presentation_logic)),
                    format!("Format Translation: {}", check_mark(r.format_translation)),
                    format!("Business Logic: {}", check_mark(r.business_logic)),
                    format!(
                        "Transaction Management: {}",
                        check_mark(r.transaction_management)
                    ),
                    format!("Direct Persistence: {}", check_mark(r.direct_persistence)),
                ],
            );
        }

        let mut architecture = vec![
            format!("**Layer**: {}", scope.architecture_layer),
            format!("**Pattern Type**: {}", scope.pattern_type),
        ];
        if !scope.upstream_dependencies.is_empty() {
            architecture.push(format!(
                "**Upstream Dependencies**: {}",
                scope.upstream_dependencies.join(", ")
            ));
        }
        if !scope.calls.is_empty() {
            architecture.push(format!("**Calls**: {}", scope.calls.join(", ")));
        }
        block.list("#### Architecture", &architecture);

        if let Some(a) = &scope.anti_patterns {
            block.list(
                "#### Anti-Patterns (What to Avoid)",
                &[
                    format!("Shared Business Logic: {}", check_mark(a.shared_business_logic)),
                    format!(
                        "Generic Cross-Cutting Concerns: {}",
                        check_mark(a.generic_cross_cutting_concerns)
                    ),
                    format!(
                        "Direct Database Access: {}",
                        check_mark(a.direct_database_access)
                    ),
                    format!(
                        "Serving Multiple Client Types: {}",
                        check_mark(a.serving_multiple_client_types)
                    ),
                ],
            );
        }

        for interface in self.resolver.interfaces_for_scope(&scope.id) {
            block.push_block(&self.bff_interface(interface));
        }
        block.finish()
    }

    fn bff_interface(&self, interface: &BffInterface) -> String {
        let mut block = Block::new();
        block
            .line(format!(
                "### {}{}",
                anchor(&interface.id),
                humanize(&interface.name)
            ))
            .blank()
            .field("Interface ID", &code(&interface.id))
            .field(
                "BFF Scope",
                &self.resolver.bff_scopes.reference(&interface.bff_scope_ref),
            )
            .field(
                "Primary Context",
                &self
                    .resolver
                    .contexts
                    .reference(&interface.primary_bounded_context_ref),
            );
        if !interface.base_path.is_empty() {
            block.field("Base Path", &code(&interface.base_path));
        }
        let additional: Vec<String> = interface
            .additional_context_refs
            .iter()
            .map(|id| self.resolver.contexts.reference(id))
            .collect();
        block.list("#### Additional Contexts", &additional);

        let mut endpoints = Table::new([
            "Path",
            "Method",
            "Operation Type",
            "Description",
            "Delegates To",
            "Aggregates From",
        ]);
        for endpoint in &interface.endpoints {
            let delegates: Vec<&str> = endpoint
                .delegates_to_commands
                .iter()
                .chain(&endpoint.delegates_to_queries)
                .map(String::as_str)
                .collect();
            endpoints.row([
                endpoint.path.clone(),
                endpoint.method.clone(),
                endpoint.operation_type.clone(),
                endpoint.description.clone(),
                delegates.join(", "),
                endpoint.aggregates_data_from.join(", "),
            ]);
        }
        if !endpoints.is_empty() {
            block
                .blank()
                .line("#### Endpoints")
                .push_block(&endpoints.render());
        }

        let mut execution = Vec::new();
        if !interface.execution_model.is_empty() {
            execution.push(format!("**Model**: {}", interface.execution_model));
        }
        if let Some(handling) = &interface.error_handling {
            execution.push(format!("**Error Handling Strategy**: {}", handling.strategy));
            if let Some(description) = &handling.description {
                execution.push(format!("**Error Handling Description**: {description}"));
            }
        }
        block.list("#### Execution Model", &execution);

        if let Some(stack) = &interface.technology_stack {
            let mut items = Vec::new();
            if let Some(framework) = &stack.framework {
                items.push(format!("**Framework**: {framework}"));
            }
            if let Some(annotation) = &stack.controller_annotation {
                items.push(format!("**Controller Annotation**: {annotation}"));
            }
            items.push(format!("**Layer**: {}", interface.layer));
            block.list("#### Technology Stack", &items);
        }

        if let Some(conversion) = &interface.value_object_conversion {
            let from = conversion_table("From Field", &conversion.from_string);
            let to = conversion_table("To Field", &conversion.to_string);
            if !from.is_empty() || !to.is_empty() {
                block.blank().line("#### Value Object Conversion");
                if !from.is_empty() {
                    block.blank().line("**From String**:").push_block(&from);
                }
                if !to.is_empty() {
                    block.blank().line("**To String**:").push_block(&to);
                }
            }
        }
        block.finish()
    }

    fn mappings_table(&self) -> String {
        let mut table = Table::new([
            "Mapping",
            "Upstream Context",
            "Downstream Context",
            "Relationship Type",
            "Integration Pattern",
        ]);
        for mapping in &self.system.context_mappings {
            table.row([
                link(&mapping.id, &humanize(&mapping.name)),
                self.resolver.contexts.reference(&mapping.upstream_context),
                self.resolver.contexts.reference(&mapping.downstream_context),
                humanize_relationship(&mapping.relationship_type),
                mapping.integration_pattern.clone(),
            ]);
        }
        if table.is_empty() {
            return String::new();
        }
        format!("## Bounded Context Relationships\n\n{}", table.render())
    }

    fn mapping(&self, mapping: &ContextMapping) -> String {
        let mut block = Block::new();
        block
            .line(format!("### {}{}", anchor(&mapping.id), humanize(&mapping.name)))
            .blank()
            .field("Mapping ID", &code(&mapping.id))
            .field(
                "Upstream",
                &self.resolver.contexts.reference(&mapping.upstream_context),
            )
            .field(
                "Downstream",
                &self.resolver.contexts.reference(&mapping.downstream_context),
            )
            .field(
                "Relationship Type",
                &humanize_relationship(&mapping.relationship_type),
            )
            .field("Integration Pattern", mapping.integration_pattern.trim());

        let translations: Vec<String> = mapping
            .translation_map
            .iter()
            .map(|(from, to)| format!("{} → {}", scalar_text(from), scalar_text(to)))
            .collect();
        block.list("#### Translation Map", &translations);

        if let Some(acl) = &mapping.acl_details {
            let mut details = Block::new();
            details
                .bullets("Facades", &acl.facades)
                .bullets("Adapters", &acl.adapters)
                .bullets("Translators", &acl.translators);
            if !details.is_empty() {
                block
                    .blank()
                    .line("#### Anti-Corruption Layer Details")
                    .push_block(&details.finish());
            }
        }
        block
            .list("#### Shared Elements", &mapping.shared_elements)
            .blank()
            .field("Notes", mapping.notes.trim());
        block.finish()
    }
}

fn push_index_list(block: &mut Block, heading: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    block.blank().line(heading).blank();
    for item in items {
        if item.starts_with("  - ") {
            block.line(item.as_str());
        } else {
            block.line(format!("- {item}"));
        }
    }
    block.blank();
}

fn conversion_table(field_header: &str, conversions: &[Conversion]) -> String {
    let mut table = Table::new(["Value Object", field_header, "Method"]);
    for c in conversions {
        table.row([&c.value_object_ref, &c.field, &c.method]);
    }
    table.render()
}

/// Trailing number of a generated node id, for declaration-order sorting.
fn node_number(node: &str) -> usize {
    node.trim_start_matches(|c: char| !c.is_ascii_digit())
        .parse()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SYSTEM: &str = "
system:
  id: sys_shop
  name: WebShop
  version: 1.2
  description: Online store.
  domains:
    - id: dom_sales
      name: Sales
      type: core
      bounded_contexts: [bc_orders]
    - id: dom_billing
      name: Billing
      type: supporting
      bounded_contexts: [bc_invoices]
  bounded_contexts:
    - id: bc_orders
      name: Orders
      domain_ref: dom_sales
      ubiquitous_language:
        glossary:
          - {term: Order, definition: A purchase | request, examples: [O-1, O-2]}
    - id: bc_invoices
      name: Invoices
      domain_ref: dom_billing
  context_mappings:
    - id: cm_orders_invoices
      name: OrdersToInvoices
      upstream_context: bc_orders
      downstream_context: bc_invoices
      relationship_type: customer_supplier
    - id: cm_orders_bank
      name: OrdersToBank
      upstream_context: bc_orders
      downstream_context: ext_bank
      relationship_type: anti_corruption_layer
      translation_map: {order_id: reference}
";

    fn output() -> String {
        let doc: StrategicDocument = serde_yaml::from_str(SYSTEM).unwrap();
        render(&doc, &RenderOptions::default())
    }

    #[test]
    fn header_and_index() {
        let output = output();
        assert!(output.starts_with("# Web Shop\n\n**System ID**: `sys_shop`  \n**Version**: 1.2"));
        assert!(output.contains("## Index\n\n### Domains and Bounded Contexts\n\n- [Sales](#dom_sales)\n  - [Orders](#bc_orders)"));
        assert!(output.contains("### Context Mappings\n\n- **Sales**\n  - [Orders To Invoices](#cm_orders_invoices)\n  - [Orders To Bank](#cm_orders_bank)"));
    }

    #[test]
    fn architecture_graph_styles_domains_by_type() {
        let output = output();
        assert!(output.contains("    Domain1[\"«Domain»<br/>Sales<br/>(type: core)\"]"));
        assert!(output.contains("    Domain1 --> BC1"));
        assert!(output.contains("    ext_bank[\"ext_bank\"]"));
        assert!(output.contains("    BC1 -.->|\"customer_supplier\"| BC2"));
        assert!(output.contains("    class Domain1 coreStyle"));
        assert!(output.contains("    class Domain2 supportingStyle"));
        assert!(output.contains("    class BC1,BC2 bcStyle"));
        assert!(!output.contains("bffStyle\n"));
    }

    #[test]
    fn mapping_table_links_name_to_detail() {
        let output = output();
        assert!(output.contains(
            "| [Orders To Invoices](#cm_orders_invoices) | [Orders](#bc_orders) | [Invoices](#bc_invoices) | Customer Supplier |  |"
        ));
        assert!(output.contains("### <a id=\"cm_orders_invoices\"></a>Orders To Invoices"));
    }

    #[test]
    fn mapping_detail_links_only_known_contexts() {
        let output = output();
        let detail = output
            .split("<a id=\"cm_orders_bank\"></a>")
            .nth(1)
            .unwrap();
        assert!(detail.contains("**Upstream**: [Orders](#bc_orders)"));
        assert!(detail.contains("**Downstream**: ext_bank  "));
        assert!(detail.contains("**Relationship Type**: Anti Corruption Layer"));
        assert!(detail.contains("- order_id → reference"));
    }

    #[test]
    fn glossary_cells_are_escaped() {
        assert!(output().contains("| Order | A purchase \\| request | O-1, O-2 |"));
    }

    #[test]
    fn contexts_nest_under_their_domain() {
        let output = output();
        let sales = output.find("## <a id=\"dom_sales\"></a>Sales").unwrap();
        let orders = output.find("### <a id=\"bc_orders\"></a>Orders").unwrap();
        let billing = output.find("## <a id=\"dom_billing\"></a>Billing").unwrap();
        assert!(sales < orders && orders < billing);
        assert!(output.contains("**Domain**: [Sales](#dom_sales) (`dom_sales`)"));
    }

    #[test]
    fn bff_scope_with_nested_interface() {
        let doc: StrategicDocument = serde_yaml::from_str(
            "
system:
  name: Shop
  bounded_contexts: [{id: bc_orders, name: Orders}]
  bff_scopes:
    - id: bff_web
      name: WebBff
      client_type: web
      responsibilities: {data_aggregation: true}
  bff_interfaces:
    - id: bffif_web
      name: WebApi
      bff_scope_ref: bff_web
      primary_bounded_context_ref: bc_orders
      base_path: /api
",
        )
        .unwrap();
        let output = render(&doc, &RenderOptions::default());
        assert!(output.contains("## Backend-for-Frontend (BFF) Scopes"));
        assert!(output.contains("- Data Aggregation: ✓\n- Client-Specific Orchestration: ✗"));
        assert!(output.contains("### <a id=\"bffif_web\"></a>Web Api"));
        assert!(output.contains("**Primary Context**: [Orders](#bc_orders)"));
        assert!(output.contains("    BFF1 --> BFFIF1"));
        assert!(output.contains("    class BFF1 bffStyle"));
    }
}
