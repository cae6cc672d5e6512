// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Integration tests for s2doc detection, conversion and rendering.

use s2doc::detector::{SchemaKind, detect};
use s2doc::diagram::DiagramCaps;
use s2doc::markdown::humanize;
use s2doc::renderer::RenderOptions;
use s2doc::{ConvertError, convert, parser};

fn convert_yaml(yaml: &str, opts: &RenderOptions) -> String {
    let doc = parser::parse_document(yaml).expect("valid YAML");
    convert(&doc, opts).expect("convertible document").markdown
}

/// The text between `start` and the next occurrence of `end` after it.
fn between<'a>(text: &'a str, start: &str, end: &str) -> &'a str {
    let from = text
        .find(start)
        .unwrap_or_else(|| panic!("missing {start:?}"));
    let rest = &text[from..];
    rest.find(end).map_or(rest, |to| &rest[..to])
}

/// A tactical aggregate links its root entity and draws it as a class.
#[test]
fn tactical_aggregate_with_root_and_value_object() {
    let yaml = "
bounded_context:
  id: bc_orders
  name: Orders
  entities:
    - id: ent_order
      name: Order
      attributes:
        - {name: total, type: Money, value_object_ref: vo_money}
  value_objects:
    - id: vo_money
      name: Money
      attributes: [{name: amount, type: Decimal}, {name: currency, type: String}]
  aggregates:
    - id: agg_order
      name: Order
      root_ref: ent_order
      value_objects: [vo_money]
";
    let output = convert_yaml(yaml, &RenderOptions::default());

    assert!(output.contains("<a id=\"agg_order\"></a>"));
    assert!(output.contains("- [Order](#ent_order) (root)"));
    let diagram = between(&output, "```mermaid", "\n```");
    assert!(diagram.contains("classDiagram"));
    assert!(diagram.contains("class Order {"));
}

/// Mapping endpoints link when the context exists and stay plain otherwise.
#[test]
fn strategic_mapping_links_known_contexts_only() {
    let yaml = "
system:
  id: sys_shop
  name: Shop
  domains:
    - {id: dom_sales, name: Sales, type: core, bounded_contexts: [bc_orders]}
    - {id: dom_billing, name: Billing, type: generic, bounded_contexts: [bc_invoices]}
  bounded_contexts:
    - {id: bc_orders, name: Orders, domain_ref: dom_sales}
    - {id: bc_invoices, name: Invoices, domain_ref: dom_billing}
  context_mappings:
    - id: cm_orders_invoices
      name: Orders To Invoices
      upstream_context: bc_orders
      downstream_context: bc_invoices
      relationship_type: customer_supplier
    - id: cm_invoices_tax
      name: Invoices To Tax
      upstream_context: bc_invoices
      downstream_context: tax_authority
      relationship_type: conformist
";
    let output = convert_yaml(yaml, &RenderOptions::default());

    assert!(output.contains("| [Orders To Invoices](#cm_orders_invoices) | [Orders](#bc_orders) |"));

    let linked = between(&output, "<a id=\"cm_orders_invoices\"></a>", "<a id=\"cm_invoices_tax\"></a>");
    assert!(linked.contains("**Upstream**: [Orders](#bc_orders)"));
    assert!(linked.contains("**Downstream**: [Invoices](#bc_invoices)"));

    let external = &output[output.rfind("<a id=\"cm_invoices_tax\"></a>").unwrap()..];
    assert!(external.contains("**Upstream**: [Invoices](#bc_invoices)"));
    assert!(external.contains("**Downstream**: tax_authority"));
    assert!(!external.contains("(#tax_authority)"));
}

/// Eleven inputs under a cap of ten: ten dataset nodes, one "+1 more" node,
/// while the stage table keeps every input.
#[test]
fn data_engineering_flow_collapses_datasets_past_cap() {
    let inputs: Vec<String> = (1..=11).map(|i| format!("ds-input-{i:02}")).collect();
    let yaml = format!(
        "
system:
  id: sys_ingest
  name: Ingest
  domains: [dom_raw]
domains:
  - {{id: dom_raw, name: Raw, pipelines: [pl_merge]}}
pipelines:
  - id: pl_merge
    name: Merge
    stages:
      - id: stg_merge
        name: Merge All
        inputs: [{}]
datasets: []
",
        inputs.join(", ")
    );
    let opts = RenderOptions {
        diagrams: true,
        caps: DiagramCaps {
            max_nodes: 10,
            max_edges: 5,
        },
    };
    let output = convert_yaml(&yaml, &opts);

    let flow = between(&output, "##### Pipeline Flow", "##### Stages");
    assert!(flow.contains("more_datasets[\"+1 more\"]"));
    for shown in &inputs[..10] {
        let node = format!("{}[", shown.replace('-', "_"));
        assert!(flow.contains(&node), "{node} missing");
    }
    assert!(!flow.contains("ds_input_11["));
    assert_eq!(flow.matches("fill:#ffe6cc").count(), 10);

    let stages = &output[output.find("##### Stages").unwrap()..];
    for input in &inputs {
        assert!(stages.contains(input.as_str()), "{input} missing from stage table");
    }
}

#[test]
fn dangling_references_render_without_links() {
    let yaml = "
bounded_context:
  id: bc_orders
  entities: [{id: ent_order, name: Order}]
  aggregates:
    - {id: agg_order, name: Order, root_ref: ent_order, entities: [ent_order, ent_ghost]}
  repositories:
    - {id: repo_lost, name: LostRepository, aggregate_ref: agg_ghost}
  domain_events:
    - {id: evt_lost, name: Lost, aggregate_ref: agg_ghost}
";
    let output = convert_yaml(yaml, &RenderOptions::default());

    assert!(!output.contains("ent_ghost"));
    assert!(output.contains("agg_ghost"));
    assert!(!output.contains("(#agg_ghost)"));
}

#[test]
fn humanizes_names() {
    assert_eq!(humanize("UserEvents"), "User Events");
    assert_eq!(humanize("user-events"), "User Events");
    assert_eq!(humanize("User Events"), "User Events");
    assert_eq!(humanize(""), "");
    assert_eq!(humanize("MLFeatureStore"), "ML Feature Store");
    assert_eq!(humanize("XMLParser"), "XML Parser");
    assert_eq!(humanize("ID"), "ID");

    for name in ["UserEvents", "user-events", "MLFeatureStore", "plain"] {
        assert_eq!(humanize(&humanize(name)), humanize(name), "{name}");
    }
}

#[test]
fn conversion_is_byte_identical_across_runs() {
    let yaml = "
domain_stories:
  - domain_story_id: dst_checkout
    title: Checkout
    tags: [sales, web]
    actors: [{actor_id: act_customer, name: Customer}]
    commands:
      - {command_id: cmd_pay, name: Pay, actor_ids: [act_customer], emits_events: [evt_paid]}
    events: [{event_id: evt_paid, name: Paid}]
";
    let first = convert_yaml(yaml, &RenderOptions::default());
    let second = convert_yaml(yaml, &RenderOptions::default());
    assert_eq!(first, second);
}

#[test]
fn detection_is_total() {
    let documents = [
        "",
        "42",
        "- a\n- b",
        "null",
        "stories: []",
        "system: {domains: []}",
        "system: {domains: []}\npipelines: []\ndatasets: []",
        "bounded_context: {aggregates: []}",
        "bounded_context: 7",
        "$schema: 12",
    ];
    let kinds: Vec<SchemaKind> = documents
        .iter()
        .map(|text| detect(&parser::parse_document(text).unwrap()))
        .collect();
    assert_eq!(
        kinds,
        [
            SchemaKind::Unknown,
            SchemaKind::Unknown,
            SchemaKind::Unknown,
            SchemaKind::Unknown,
            SchemaKind::DomainStories,
            SchemaKind::StrategicDdd,
            SchemaKind::DataEngineering,
            SchemaKind::TacticalDdd,
            SchemaKind::Unknown,
            SchemaKind::Unknown,
        ]
    );
}

#[test]
fn unknown_documents_fail_with_guidance() {
    let doc = parser::parse_document("title: notes").unwrap();
    let err = convert(&doc, &RenderOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::UnknownSchema));
    assert!(err.to_string().contains("Data Engineering"));
}

#[test]
fn last_document_of_a_stream_is_converted() {
    let yaml = "
author: someone
---
stories:
  - {domain_story_id: dst_one, title: One}
";
    let output = convert_yaml(yaml, &RenderOptions::default());
    assert!(output.contains("One"));
    assert!(!output.contains("someone"));
}
