// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Tactical DDD rendering: one bounded context with its building blocks.
//!
//! Section order: header, the four summary tables (application services,
//! domain services, aggregates, repositories), then details for aggregates,
//! value objects, repositories, domain services and application services,
//! then domain events, command interfaces and query interfaces.

use super::RenderOptions;
use crate::diagram::ClassDiagram;
use crate::markdown::{
    Block, Table, anchor, capitalize, check_mark, code, humanize, join_or, link, sections,
};
use crate::model::tactical::{
    Aggregate, ApplicationService, Attribute, BoundedContext, CommandInterface, DomainEvent,
    DomainService, Entity, Method, Operation, Parameter, QueryInterface, Repository,
    TacticalDocument, ValueObject, parameter_list,
};
use crate::model::Identified;
use crate::resolver::TacticalResolver;
use log::debug;

/// Renders a tactical document as Markdown.
///
/// ```
/// use s2doc::model::tactical::TacticalDocument;
/// use s2doc::renderer::{tactical, RenderOptions};
///
/// let doc: TacticalDocument = serde_yaml::from_str(
///     "bounded_context: {id: bc_orders, name: Orders, aggregates: []}",
/// ).unwrap();
/// let markdown = tactical::render(&doc, &RenderOptions::default());
/// assert!(markdown.starts_with("# Orders"));
/// ```
#[must_use]
pub fn render(document: &TacticalDocument, opts: &RenderOptions) -> String {
    let context = &document.bounded_context;
    let renderer = Renderer {
        context,
        resolver: TacticalResolver::new(context),
        opts,
    };
    let parts = [
        renderer.header(),
        summary("Application Services", &context.application_services, |s| {
            s.description.clone()
        }),
        summary("Domain Services", &context.domain_services, |s| {
            s.description.clone()
        }),
        summary("Aggregates", &context.aggregates, |a| {
            renderer.aggregate_summary(a)
        }),
        summary("Repositories", &context.repositories, |r| {
            renderer.repository_summary(r)
        }),
        join_details(&context.aggregates, |a| renderer.aggregate(a)),
        join_details(&context.value_objects, value_object),
        join_details(&context.repositories, |r| renderer.repository(r)),
        join_details(&context.domain_services, domain_service),
        join_details(&context.application_services, |s| {
            renderer.application_service(s)
        }),
        renderer.domain_events(),
        renderer.command_interfaces(),
        renderer.query_interfaces(),
    ];
    debug!(context = context.id.as_str(); "rendered tactical document");
    sections(parts)
}

struct Renderer<'a> {
    context: &'a BoundedContext,
    resolver: TacticalResolver<'a>,
    opts: &'a RenderOptions,
}

fn summary<T: Identified>(title: &str, items: &[T], describe: impl Fn(&T) -> String) -> String {
    let mut table = Table::new(["Name", "Description"]);
    for item in items {
        table.row([link(item.id(), &humanize(item.name())), describe(item)]);
    }
    if table.is_empty() {
        return String::new();
    }
    format!("## {title}\n\n{}", table.render())
}

fn join_details<T>(items: &[T], render: impl Fn(&T) -> String) -> String {
    sections(items.iter().map(render))
}

fn heading(level: usize, id: &str, name: &str) -> String {
    format!("{} {}{}", "#".repeat(level), anchor(id), humanize(name))
}

fn method_table(methods: &[Method]) -> String {
    let mut table = Table::new(["Method", "Parameters", "Returns", "Description"]);
    for method in methods {
        table.row([
            method.name.clone(),
            parameter_list(&method.parameters),
            method.returns_or_void().to_owned(),
            method.description.clone(),
        ]);
    }
    table.render()
}

fn parameter_table(parameters: &[Parameter]) -> String {
    let mut table = Table::new(["Name", "Type", "Required", "Description"]);
    for p in parameters {
        table.row([
            p.name.as_str(),
            p.ty.as_str(),
            check_mark(p.required),
            p.description.as_str(),
        ]);
    }
    table.render()
}

fn value_object(vo: &ValueObject) -> String {
    let mut block = Block::new();
    block
        .line(format!("{} Value Object", heading(3, &vo.id, &vo.name)))
        .blank()
        .field("Value Object ID", &code(&vo.id))
        .field("Name", &humanize(&vo.name))
        .field("Description", vo.description.trim())
        .field("Immutable", check_mark(vo.immutability));

    let mut attributes = Table::new(["Name", "Type", "Required", "Description"]);
    for attr in &vo.attributes {
        attributes.row([
            attr.name.as_str(),
            attr.ty.as_str(),
            check_mark(attr.required),
            attr.description.as_str(),
        ]);
    }
    if !attributes.is_empty() {
        block.blank().line("#### Attributes").push_block(&attributes.render());
    }
    block
        .list("#### Validation Rules", &vo.validation_rules)
        .list("#### Equality Criteria", &vo.equality_criteria);
    block.finish()
}

fn domain_service(service: &DomainService) -> String {
    let mut block = Block::new();
    block
        .line(heading(2, &service.id, &service.name))
        .blank()
        .field("Service ID", &code(&service.id))
        .field("Type", "Domain Service");
    if !service.description.trim().is_empty() {
        block.blank().line("### Description").blank().para(&service.description);
    }
    let methods = method_table(&service.operations);
    if !methods.is_empty() {
        block.blank().line("### Methods").push_block(&methods);
    }
    block.finish()
}

impl Renderer<'_> {
    fn header(&self) -> String {
        let context = self.context;
        let mut block = Block::new();
        block
            .line(format!("# {}", humanize(&context.name)))
            .blank()
            .field("Context ID", &code(&context.id))
            .field("Domain", &context.domain_ref)
            .field("Description", context.description.trim())
            .blank()
            .line("---");
        block.finish()
    }

    fn aggregate_summary(&self, aggregate: &Aggregate) -> String {
        self.resolver
            .entities
            .get(&aggregate.root_ref)
            .map(|root| {
                root.invariants.first().cloned().unwrap_or_else(|| {
                    format!("Manages {} lifecycle", humanize(&root.name))
                })
            })
            .unwrap_or_default()
    }

    fn repository_summary(&self, repository: &Repository) -> String {
        self.resolver
            .aggregates
            .get(&repository.aggregate_ref)
            .map(|a| format!("Persistence for {}", humanize(&a.name)))
            .unwrap_or_default()
    }

    fn aggregate(&self, aggregate: &Aggregate) -> String {
        let root = self.resolver.entities.get(&aggregate.root_ref);
        let mut block = Block::new();
        block
            .line(heading(2, &aggregate.id, &aggregate.name))
            .blank()
            .field("Aggregate ID", &code(&aggregate.id))
            .field(
                "Root Entity",
                &self.resolver.entities.reference(&aggregate.root_ref),
            )
            .field(
                "Size Estimate",
                &capitalize(aggregate.size_estimate.as_deref().unwrap_or_default()),
            );

        if let Some(invariant) = root.and_then(|r| r.invariants.first()) {
            block.blank().line("### Description").blank().para(invariant);
        }

        let entities: Vec<String> = self
            .resolver
            .aggregate_entities(aggregate)
            .into_iter()
            .map(|e| {
                let marker = if e.id == aggregate.root_ref { " (root)" } else { "" };
                format!("{}{marker}", link(&e.id, &humanize(&e.name)))
            })
            .collect();
        let value_objects: Vec<String> = self
            .resolver
            .aggregate_value_objects(aggregate)
            .into_iter()
            .map(|vo| link(&vo.id, &humanize(&vo.name)))
            .collect();
        block
            .list("### Entities", &entities)
            .list("### Value Objects", &value_objects)
            .list("### Consistency Rules", &aggregate.consistency_rules)
            .list("### Invariants", &aggregate.invariants);

        if self.opts.diagrams {
            let diagram = self.class_diagram(aggregate, root);
            if !diagram.is_empty() {
                block
                    .blank()
                    .line("### Aggregate UML Diagram")
                    .push_block(&diagram.emit());
            }
        }
        block.finish()
    }

    /// Root entity class, plus a class for each composite value object of the
    /// aggregate. Single-attribute value objects show up as their inner type.
    fn class_diagram(&self, aggregate: &Aggregate, root: Option<&Entity>) -> ClassDiagram {
        let mut diagram = ClassDiagram::new();
        if let Some(root) = root {
            let mut members: Vec<String> = root
                .attributes
                .iter()
                .map(|attr| format!("{} {}", self.display_type(attr), attr.name))
                .collect();
            members.extend(root.business_methods.iter().map(|m| {
                format!(
                    "{}({}) {}",
                    m.name,
                    parameter_list(&m.parameters),
                    m.returns_or_void()
                )
            }));
            diagram.class(&root.name, "Entity Root", members);
        }

        for vo in self.resolver.aggregate_value_objects(aggregate) {
            if vo.is_composite() {
                let members = vo
                    .attributes
                    .iter()
                    .map(|a| format!("{} {}", a.ty, a.name))
                    .collect();
                diagram.class(&vo.name, "Value Object", members);
            }
        }

        if let Some(root) = root {
            for attr in &root.attributes {
                if let Some(vo) = self.composite_value_object(attr) {
                    diagram.relation(&root.name, &vo.name);
                }
            }
        }
        diagram
    }

    fn composite_value_object(&self, attr: &Attribute) -> Option<&ValueObject> {
        attr.value_object_ref
            .as_deref()
            .and_then(|id| self.resolver.value_objects.get(id))
            .filter(|vo| vo.is_composite())
    }

    fn display_type<'b>(&'b self, attr: &'b Attribute) -> &'b str {
        let vo = attr
            .value_object_ref
            .as_deref()
            .and_then(|id| self.resolver.value_objects.get(id));
        match vo {
            Some(vo) if vo.is_composite() => vo.name.as_str(),
            Some(vo) => vo
                .attributes
                .first()
                .map_or(attr.ty.as_str(), |inner| inner.ty.as_str()),
            None => attr.ty.as_str(),
        }
    }

    fn repository(&self, repository: &Repository) -> String {
        let mut block = Block::new();
        block
            .line(heading(2, &repository.id, &repository.name))
            .blank()
            .field("Repository ID", &code(&repository.id))
            .field(
                "Aggregate",
                &self.resolver.aggregates.reference(&repository.aggregate_ref),
            );
        let methods = method_table(&repository.interface_methods);
        if !methods.is_empty() {
            block.blank().line("### Interface Methods").push_block(&methods);
        }
        block.finish()
    }

    fn application_service(&self, service: &ApplicationService) -> String {
        let mut block = Block::new();
        block
            .line(heading(2, &service.id, &service.name))
            .blank()
            .field("Service ID", &code(&service.id))
            .field("Type", "Application Service");
        if !service.description.trim().is_empty() {
            block.blank().line("### Description").blank().para(&service.description);
        }
        if !service.operations.is_empty() {
            block.blank().line("### Operations");
            for operation in &service.operations {
                block.push_block(&self.operation(operation));
            }
        }
        block.finish()
    }

    fn operation(&self, operation: &Operation) -> String {
        let kind = capitalize(&operation.kind);
        let mut block = Block::new();
        block
            .line(format!("#### {} ({kind})", operation.name))
            .blank()
            .field("Type", &kind);

        let parameters: Vec<String> = operation
            .parameters
            .iter()
            .map(|p| {
                let marker = if p.required { "required" } else { "optional" };
                format!("{}: {} ({marker})", p.name, p.ty)
            })
            .collect();
        block
            .bullets("Parameters", &parameters)
            .field("Returns", operation.returns.as_deref().unwrap_or_default());

        if operation.is_command()
            && let Some(boundary) = &operation.transaction_boundary
        {
            let mut items = vec![format!(
                "Is Transactional: {}",
                check_mark(boundary.is_transactional)
            )];
            if !boundary.modifies_aggregates.is_empty() {
                items.push(format!(
                    "Modifies Aggregates: {}",
                    self.aggregate_refs(&boundary.modifies_aggregates)
                ));
            }
            if let Some(consistency) = &boundary.consistency_type {
                items.push(format!("Consistency Type: {consistency}"));
            }
            block.bullets("Transaction Boundary", &items);
        }

        if let Some(workflow) = &operation.workflow {
            let mut steps = Vec::new();
            if workflow.validates_input {
                steps.push("Validates input (✓)".to_owned());
            }
            if !workflow.loads_aggregates.is_empty() {
                steps.push(format!(
                    "Loads aggregates: {}",
                    self.aggregate_refs(&workflow.loads_aggregates)
                ));
            } else if operation.is_command() {
                steps.push("Creates new aggregate".to_owned());
            }
            if !workflow.invokes_domain_operations.is_empty() {
                let services: Vec<String> = workflow
                    .invokes_domain_services
                    .iter()
                    .map(|id| self.resolver.domain_services.reference(id))
                    .collect();
                let via = if services.is_empty() {
                    String::new()
                } else {
                    format!(" (via {})", services.join(", "))
                };
                steps.push(format!(
                    "Invokes domain operations: {}{via}",
                    workflow.invokes_domain_operations.join(", ")
                ));
            }
            if workflow.persists_aggregates {
                steps.push("Persists aggregate (✓)".to_owned());
            }
            if !workflow.publishes_events.is_empty() {
                let events: Vec<String> = workflow
                    .publishes_events
                    .iter()
                    .map(|id| self.resolver.domain_events.reference(id))
                    .collect();
                steps.push(format!("Publishes events: {}", events.join(", ")));
            }
            if let Some(dto) = &workflow.returns_dto {
                steps.push(format!("Returns DTO: {dto}"));
            }
            if !steps.is_empty() {
                block.blank().line("**Workflow**:");
                for (n, step) in steps.iter().enumerate() {
                    block.line(format!("{}. {step}", n + 1));
                }
            }
        }
        block.finish()
    }

    fn aggregate_refs(&self, ids: &[String]) -> String {
        let refs: Vec<String> = ids
            .iter()
            .map(|id| self.resolver.aggregates.reference(id))
            .collect();
        join_or(&refs, "-")
    }

    fn domain_events(&self) -> String {
        let events: Vec<String> = self
            .context
            .domain_events
            .iter()
            .map(|e| self.domain_event(e))
            .collect();
        if events.is_empty() {
            return String::new();
        }
        sections(std::iter::once("## Domain Events".to_owned()).chain(events))
    }

    fn domain_event(&self, event: &DomainEvent) -> String {
        let mut block = Block::new();
        block
            .line(heading(3, &event.id, &event.name))
            .blank()
            .field("Event ID", &code(&event.id))
            .field(
                "Aggregate",
                &self.resolver.aggregates.reference(&event.aggregate_ref),
            );
        let mut payload = Table::new(["Field", "Type", "Description"]);
        for field in &event.data_carried {
            payload.row([&field.name, &field.ty, &field.description]);
        }
        if !payload.is_empty() {
            block.blank().line("#### Payload").push_block(&payload.render());
        }
        block.finish()
    }

    fn command_interfaces(&self) -> String {
        let interfaces: Vec<String> = self
            .context
            .command_interfaces
            .iter()
            .map(|i| self.command_interface(i))
            .collect();
        if interfaces.is_empty() {
            return String::new();
        }
        sections(std::iter::once("## Command Interfaces".to_owned()).chain(interfaces))
    }

    fn command_interface(&self, interface: &CommandInterface) -> String {
        let mut block = Block::new();
        block
            .line(format!(
                "{} Interface",
                heading(3, &interface.id, &interface.name)
            ))
            .blank()
            .field("Command Interface ID", &code(&interface.id))
            .field("Description", interface.description.trim());

        for record in &interface.command_records {
            block
                .blank()
                .line(format!("#### {}", humanize(&record.record_name)))
                .blank()
                .field("Record Name", &record.record_name)
                .field("Intent", record.intent.trim());
            let parameters = parameter_table(&record.parameters);
            if !parameters.is_empty() {
                block.blank().line("**Parameters**:").push_block(&parameters);
            }

            let mut returns = vec![format!(
                "Type: {}",
                record.returns.as_deref().unwrap_or("void")
            )];
            if let Some(vo) = &record.return_type_ref {
                returns.push(format!(
                    "Value Object: {}",
                    self.resolver.value_objects.reference(vo)
                ));
            }
            block.bullets("Returns", &returns);
            if let Some(aggregate) = &record.modifies_aggregate {
                block.field(
                    "Modifies Aggregate",
                    &self.resolver.aggregates.reference(aggregate),
                );
            }
            let events: Vec<String> = record
                .publishes_events
                .iter()
                .map(|id| self.resolver.domain_events.reference(id))
                .collect();
            block
                .bullets("Publishes Events", &events)
                .field("Audit Fields", &record.audit_fields.join(", "));
        }
        block.finish()
    }

    fn query_interfaces(&self) -> String {
        let interfaces: Vec<String> = self
            .context
            .query_interfaces
            .iter()
            .map(query_interface)
            .collect();
        if interfaces.is_empty() {
            return String::new();
        }
        sections(std::iter::once("## Query Interfaces".to_owned()).chain(interfaces))
    }
}

fn query_interface(interface: &QueryInterface) -> String {
    let mut block = Block::new();
    block
        .line(format!(
            "{} Interface",
            heading(3, &interface.id, &interface.name)
        ))
        .blank()
        .field("Query Interface ID", &code(&interface.id))
        .field("Description", interface.description.trim());

    for method in &interface.query_methods {
        block
            .blank()
            .line(format!("#### {}", humanize(&method.method_name)))
            .blank()
            .field("Method Name", &method.method_name)
            .field("Description", method.description.trim());
        let parameters = parameter_table(&method.parameters);
        if !parameters.is_empty() {
            block.blank().line("**Parameters**:").push_block(&parameters);
        }
        block
            .blank()
            .field("Result Record", &method.result_record_name);

        if let Some(structure) = &method.result_structure {
            let mut table = Table::new(["Field", "Type", "Serialization", "Description"]);
            for field in &structure.fields {
                table.row([&field.name, &field.ty, &field.serialization, &field.description]);
            }
            if !table.is_empty() {
                block
                    .blank()
                    .line("**Result Structure**:")
                    .push_block(&table.render());
            }
        }
        block.field(
            "Bypasses Domain Model",
            check_mark(method.bypasses_domain_model),
        );
        if let Some(opt) = &method.optimizations {
            block.bullets(
                "Optimizations",
                &[
                    format!("Denormalized: {}", check_mark(opt.denormalized)),
                    format!("Cached: {}", check_mark(opt.cached)),
                    format!("Indexed: {}", check_mark(opt.indexed)),
                ],
            );
        }
    }
    block.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(yaml: &str) -> TacticalDocument {
        serde_yaml::from_str(yaml).unwrap()
    }

    const ORDERS: &str = "
bounded_context:
  id: bc_orders
  name: OrderManagement
  domain_ref: dom_sales
  entities:
    - id: ent_order
      name: Order
      attributes:
        - {name: id, type: String, value_object_ref: vo_order_id}
        - {name: total, type: Money, value_object_ref: vo_money}
      business_methods:
        - name: addLine
          parameters: [{name: sku, type: String}]
      invariants: [Total is never negative]
  value_objects:
    - id: vo_order_id
      name: OrderId
      attributes: [{name: value, type: UUID}]
    - id: vo_money
      name: Money
      attributes: [{name: amount, type: Decimal}, {name: currency, type: String}]
  aggregates:
    - id: agg_order
      name: OrderAggregate
      root_ref: ent_order
      entities: [ent_order, ent_missing]
      value_objects: [vo_order_id, vo_money]
      size_estimate: small
  repositories:
    - id: repo_order
      name: OrderRepository
      aggregate_ref: agg_order
      interface_methods:
        - {name: findById, parameters: [{name: id, type: OrderId}], returns: Order}
";

    #[test]
    fn renders_header_and_summary_tables() {
        let output = render(&document(ORDERS), &RenderOptions::default());
        assert!(output.starts_with("# Order Management\n\n**Context ID**: `bc_orders`"));
        assert!(output.contains("## Aggregates\n\n| Name | Description |"));
        assert!(output.contains("| [Order Aggregate](#agg_order) | Total is never negative |"));
        assert!(output.contains("| [Order Repository](#repo_order) | Persistence for Order Aggregate |"));
    }

    #[test]
    fn aggregate_section_marks_root_and_drops_dangling_entities() {
        let output = render(&document(ORDERS), &RenderOptions::default());
        assert!(output.contains("## <a id=\"agg_order\"></a>Order Aggregate"));
        assert!(output.contains("- [Order](#ent_order) (root)"));
        assert!(!output.contains("ent_missing"));
        assert!(output.contains("**Size Estimate**: Small"));
    }

    #[test]
    fn class_diagram_uses_value_object_types() {
        let output = render(&document(ORDERS), &RenderOptions::default());
        assert!(output.contains("    class Order {\n        <<Entity Root>>"));
        assert!(output.contains("        +UUID id"));
        assert!(output.contains("        +Money total"));
        assert!(output.contains("        +addLine(sku: String) void"));
        assert!(output.contains("    class Money {\n        <<Value Object>>"));
        assert!(!output.contains("class OrderId"));
        assert!(output.contains("    Order --> Money"));
    }

    #[test]
    fn diagrams_can_be_disabled() {
        let opts = RenderOptions {
            diagrams: false,
            ..RenderOptions::default()
        };
        let output = render(&document(ORDERS), &opts);
        assert!(!output.contains("```mermaid"));
        assert!(!output.contains("Aggregate UML Diagram"));
    }

    #[test]
    fn value_object_and_repository_details() {
        let output = render(&document(ORDERS), &RenderOptions::default());
        assert!(output.contains("### <a id=\"vo_money\"></a>Money Value Object"));
        assert!(output.contains("| amount | Decimal | ✓ |  |"));
        assert!(output.contains("| findById | id: OrderId | Order |  |"));
    }

    #[test]
    fn root_named_only_by_root_ref_is_listed_first() {
        let doc = document(
            "
bounded_context:
  id: bc_cart
  entities:
    - {id: ent_cart, name: Cart}
    - {id: ent_item, name: CartItem}
  aggregates:
    - {id: agg_cart, name: Cart, root_ref: ent_cart, entities: [ent_item]}
",
        );
        let output = render(&doc, &RenderOptions::default());
        assert!(output.contains("### Entities\n- [Cart](#ent_cart) (root)\n- [Cart Item](#ent_item)"));
    }

    #[test]
    fn dangling_aggregate_reference_shows_raw_id() {
        let doc = document(
            "
bounded_context:
  id: bc
  name: Billing
  entities: []
  domain_events:
    - id: evt_paid
      name: InvoicePaid
      aggregate_ref: agg_gone
",
        );
        let output = render(&doc, &RenderOptions::default());
        assert!(output.contains("## Domain Events"));
        assert!(output.contains("**Aggregate**: agg_gone"));
        assert!(!output.contains("(#agg_gone)"));
    }

    #[test]
    fn empty_sections_leave_no_headings() {
        let output = render(
            &document("bounded_context: {id: bc, name: Empty, aggregates: []}"),
            &RenderOptions::default(),
        );
        assert!(!output.contains("## Aggregates"));
        assert!(!output.contains("## Domain Events"));
        assert!(output.ends_with("---"));
    }

    #[test]
    fn operation_workflow_is_numbered() {
        let doc = document(
            "
bounded_context:
  id: bc
  name: Orders
  aggregates: [{id: agg_order, name: Order}]
  domain_events: [{id: evt_placed, name: OrderPlaced}]
  application_services:
    - id: svc_app
      name: OrderApplicationService
      operations:
        - name: placeOrder
          type: command
          parameters: [{name: cart, type: CartId, required: false}]
          transaction_boundary: {modifies_aggregates: [agg_order]}
          workflow:
            validates_input: true
            persists_aggregates: true
            publishes_events: [evt_placed, evt_unknown]
",
        );
        let output = render(&doc, &RenderOptions::default());
        assert!(output.contains("#### placeOrder (Command)"));
        assert!(output.contains("- cart: CartId (optional)"));
        assert!(output.contains("- Modifies Aggregates: [Order](#agg_order)"));
        assert!(output.contains(
            "1. Validates input (✓)\n2. Creates new aggregate\n3. Persists aggregate (✓)\n\
             4. Publishes events: [Order Placed](#evt_placed), evt_unknown"
        ));
    }
}
