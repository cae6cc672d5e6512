// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Domain story rendering: one document for all stories, with per-story
//! sections and catalogs of the actors, aggregates and commands they share.

use super::RenderOptions;
use crate::diagram::{Direction, Edge, Flowchart, Node, SequenceDiagram, cap};
use crate::markdown::{Block, Table, capitalize, code, link, sections};
use crate::model::Identified;
use crate::model::stories::{Command, Event, StoriesDocument, Story, short_actor};
use crate::resolver::StoryResolver;
use log::debug;
use std::collections::BTreeMap;

const BACK_TO_TOP: &str = "[↑ Back to Top](#-table-of-contents)";

/// Node budget of the command-event-policy flow.
const FLOW_NODES: usize = 15;
const EVENTS_PER_COMMAND: usize = 2;
const STORIES_PER_CATALOG_ENTRY: usize = 3;

/// Renders a stories document as Markdown.
#[must_use]
pub fn render(document: &StoriesDocument, opts: &RenderOptions) -> String {
    let stories: Vec<&Story> = document.stories().collect();
    let actors = catalog(&stories, |s| &s.actors);
    let aggregates = catalog(&stories, |s| &s.aggregates);
    let commands = catalog(&stories, |s| &s.commands);

    let actor_table = {
        let mut table = Table::new(["Actor ID", "Name", "Kind", "Used in Stories"]);
        for (id, (actor, used)) in &actors {
            table.row([code(id), actor.name.clone(), actor.kind.clone(), used_in(used)]);
        }
        table
    };
    let aggregate_table = {
        let mut table = Table::new(["Aggregate ID", "Name", "Used in Stories"]);
        for (id, (aggregate, used)) in &aggregates {
            table.row([code(id), aggregate.name.clone(), used_in(used)]);
        }
        table
    };
    let command_table = {
        let mut table = Table::new(["Command ID", "Name", "Used in Stories"]);
        for (id, (command, used)) in &commands {
            table.row([code(id), command.name.clone(), used_in(used)]);
        }
        table
    };
    let catalogs = [
        ("Actor Catalog", "actor-catalog", "Actors", actors.len(), actor_table),
        ("Aggregate Catalog", "aggregate-catalog", "Aggregates", aggregates.len(), aggregate_table),
        ("Command Catalog", "command-catalog", "Commands", commands.len(), command_table),
    ];

    let mut parts = vec![header(document, stories.len())];
    if !stories.is_empty() {
        parts.push(toc(&stories, &catalogs));
        parts.push(all_stories(&stories));
        for story in &stories {
            parts.push(story_section(story, opts));
        }
    }
    for (title, _, noun, count, table) in &catalogs {
        if table.is_empty() {
            continue;
        }
        parts.push(format!(
            "## {title}\n\n{BACK_TO_TOP}\n\n**Total Unique {noun}**: {count}\n\n{}",
            table.render()
        ));
    }
    debug!(stories = stories.len(); "rendered domain stories");
    sections(with_rules(parts))
}

/// Puts a horizontal rule between non-empty parts.
fn with_rules(parts: Vec<String>) -> Vec<String> {
    let mut out = Vec::with_capacity(parts.len() * 2);
    for part in parts.into_iter().filter(|p| !p.trim().is_empty()) {
        if !out.is_empty() {
            out.push("---".to_owned());
        }
        out.push(part);
    }
    out
}

fn header(document: &StoriesDocument, count: usize) -> String {
    let mut block = Block::new();
    block
        .line("# Domain Stories - Complete Documentation")
        .blank()
        .field("Total Stories", &count.to_string())
        .field("Version", document.version.as_deref().unwrap_or("N/A"));
    block.finish()
}

fn tag_display(tag: &str) -> String {
    tag.replace('_', " ")
        .split_whitespace()
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

type CatalogSection<'a> = (&'a str, &'a str, &'a str, usize, Table);

fn toc(stories: &[&Story], catalogs: &[CatalogSection<'_>]) -> String {
    let mut block = Block::new();
    block
        .line("## 📑 Table of Contents")
        .blank()
        .line("### Quick Navigation")
        .line("- [Stories by Tag](#stories-by-tag)")
        .line("- [All Stories](#all-stories)");
    for (title, slug, _, _, table) in catalogs {
        if !table.is_empty() {
            block.line(format!("- [{title}](#{slug})"));
        }
    }

    let mut by_tag: BTreeMap<&str, Vec<&Story>> = BTreeMap::new();
    for story in stories {
        if story.tags.is_empty() {
            by_tag.entry("untagged").or_default().push(story);
        }
        for tag in &story.tags {
            by_tag.entry(tag).or_default().push(story);
        }
    }
    block.blank().line("### Stories by Tag");
    for (tag, tagged) in by_tag {
        block
            .blank()
            .line(format!("#### {} ({})", tag_display(tag), tagged.len()));
        for story in tagged {
            block.line(format!("- {}", link(story.anchor(), story.display_title())));
        }
    }
    block.finish()
}

fn all_stories(stories: &[&Story]) -> String {
    let mut table = Table::new(["#", "Story ID", "Title", "Tags"]);
    for (i, story) in stories.iter().enumerate() {
        table.row([
            (i + 1).to_string(),
            link(story.anchor(), story.anchor()),
            story.display_title().to_owned(),
            story.tags.join(", "),
        ]);
    }
    format!("## All Stories\n\n{}", table.render())
}

fn codes(ids: &[String]) -> String {
    ids.iter().map(|id| code(id)).collect::<Vec<_>>().join(", ")
}

fn story_section(story: &Story, opts: &RenderOptions) -> String {
    let resolver = StoryResolver::new(story);
    let mut block = Block::new();
    block
        .line(format!("## {}", story.display_title()))
        .blank()
        .line(format!("<a id=\"{}\"></a>", story.anchor()))
        .blank()
        .line(BACK_TO_TOP)
        .blank()
        .field("Story ID", &code(story.anchor()))
        .field("Tags", &story.tags.join(", "));
    if !story.description.trim().is_empty() {
        block.blank().line("### Description").blank().para(&story.description);
    }

    let mut actors = Table::new(["Actor ID", "Name", "Kind", "Description"]);
    for actor in &story.actors {
        actors.row([
            code(&actor.actor_id),
            actor.name.clone(),
            actor.kind.clone(),
            actor.description.clone(),
        ]);
    }
    if !actors.is_empty() {
        block.blank().line("### Actors").push_block(&actors.render());
    }

    if !story.aggregates.is_empty() || !story.work_objects.is_empty() {
        block.blank().line("### Domain Model");
        if !story.aggregates.is_empty() {
            block.blank().line("#### Aggregates");
            for aggregate in &story.aggregates {
                block
                    .blank()
                    .line(format!(
                        "##### {} ({})",
                        aggregate.name,
                        code(&aggregate.aggregate_id)
                    ))
                    .blank()
                    .para(&aggregate.description)
                    .bullets("Invariants", &aggregate.invariants);
            }
        }
        if !story.work_objects.is_empty() {
            block.blank().line("#### Work Objects");
            for object in &story.work_objects {
                block
                    .blank()
                    .line(format!(
                        "##### {} ({})",
                        object.name,
                        code(&object.work_object_id)
                    ))
                    .blank()
                    .para(&object.description);
                let mut attributes = Table::new(["Name", "Type", "Required", "Description"]);
                for attr in &object.attributes {
                    attributes.row([
                        attr.name.as_str(),
                        attr.ty.as_str(),
                        if attr.required { "✓" } else { "" },
                        attr.description.as_str(),
                    ]);
                }
                if !attributes.is_empty() {
                    block
                        .line("**Attributes**:")
                        .push_block(&attributes.render());
                }
            }
        }
    }

    if !story.commands.is_empty() {
        block.blank().line("### Commands");
        for command in &story.commands {
            block
                .blank()
                .line(format!("#### {} ({})", command.name, code(&command.command_id)))
                .blank()
                .para(&command.description)
                .field("Actors", &codes(&command.actor_ids));
            if let Some(target) = command.target_aggregate_id.as_deref().filter(|t| !t.is_empty()) {
                let value = match resolver.aggregates.get(target) {
                    Some(aggregate) if !aggregate.name.is_empty() => {
                        format!("{} ({})", aggregate.name, code(target))
                    }
                    _ => code(target),
                };
                block.field("Target Aggregate", &value);
            }
            block.field("Emits Events", &codes(&command.emits_events));
        }
    }

    let mut events = Table::new(["Event ID", "Name", "Description", "Caused By"]);
    for event in &story.events {
        let source = event.caused_by.source();
        events.row([
            code(&event.event_id),
            event.name.clone(),
            event.description.clone(),
            if source.is_empty() { String::new() } else { code(source) },
        ]);
    }
    if !events.is_empty() {
        block.blank().line("### Events").push_block(&events.render());
    }

    let mut policies = Table::new(["Policy ID", "Name", "When Event", "Issues Command"]);
    for policy in &story.policies {
        policies.row([
            code(&policy.policy_id),
            policy.name.clone(),
            code(&policy.when_event_id),
            policy.issues_command_id.as_deref().map(code).unwrap_or_default(),
        ]);
    }
    if !policies.is_empty() {
        block.blank().line("### Policies").push_block(&policies.render());
    }

    if opts.diagrams {
        let sequence = (!story.commands.is_empty() && !story.actors.is_empty())
            .then(|| sequence_diagram(story, &resolver, opts));
        let flow = (!story.commands.is_empty()
            || !story.events.is_empty()
            || !story.policies.is_empty())
        .then(|| flow_diagram(story, &resolver, opts));
        if sequence.is_some() || flow.is_some() {
            block.blank().line("### Visualizations");
        }
        if let Some(sequence) = sequence {
            block
                .blank()
                .line("#### Sequence Diagram")
                .push_block(&sequence);
        }
        if let Some(flow) = flow {
            block
                .blank()
                .line("#### Command-Event-Policy Flow")
                .push_block(&flow);
        }
    }
    block.finish()
}

/// Actors call `System` with a command; `System` answers with the events it
/// emits. Commands past the edge cap are left out.
fn sequence_diagram(story: &Story, resolver: &StoryResolver<'_>, opts: &RenderOptions) -> String {
    let mut diagram = SequenceDiagram::new();
    for actor in &story.actors {
        diagram.participant(actor.short_id(), Some(actor.name.as_str()));
    }
    if !story.aggregates.is_empty() {
        diagram.participant("System", None);
    }
    let (shown, _) = cap(&story.commands, opts.caps.max_edges, "story commands");
    for command in shown {
        let Some(actor) = command.actor_ids.first() else {
            continue;
        };
        let actor = short_actor(actor);
        diagram.call(actor, "System", &command.name);
        let events = emitted(command, resolver);
        for (i, event) in events.iter().enumerate() {
            if i + 1 == events.len() {
                diagram.reply("System", actor, &event.name);
            } else {
                diagram.message("System", actor, &event.name);
            }
        }
    }
    diagram.emit()
}

/// Commands, the events they emit and the first policy each event triggers,
/// within a fixed node budget.
fn flow_diagram(story: &Story, resolver: &StoryResolver<'_>, opts: &RenderOptions) -> String {
    let mut chart = Flowchart::new(Direction::LeftRight);
    let mut nodes = 0;
    let (shown, _) = cap(&story.commands, opts.caps.max_edges, "story flow commands");
    'commands: for command in shown {
        if nodes >= FLOW_NODES {
            break;
        }
        nodes += declare(&mut chart, Node::new(&command.command_id, &command.name));
        for event in emitted(command, resolver) {
            if nodes >= FLOW_NODES {
                break 'commands;
            }
            nodes += declare(&mut chart, Node::new(&event.event_id, &event.name));
            chart.edge(Edge::new(&command.command_id, &event.event_id).labelled("emits"));

            let Some(policy) = event
                .policies_triggered
                .iter()
                .find_map(|id| resolver.policies.get(id))
            else {
                continue;
            };
            if nodes >= FLOW_NODES {
                break 'commands;
            }
            nodes += declare(&mut chart, Node::new(&policy.policy_id, &policy.name).hexagon());
            chart.edge(Edge::new(&event.event_id, &policy.policy_id).labelled("triggers"));
            if let Some(issued) = policy.issues_command_id.as_deref().filter(|c| !c.is_empty()) {
                chart.edge(Edge::new(&policy.policy_id, issued).labelled("issues"));
            }
        }
    }
    if nodes == 0 {
        chart.node(Node::new("Note", "No command-event-policy flows in this story"));
    }
    chart.emit()
}

/// Events a command emits that the story defines, up to the per-command limit.
fn emitted<'a>(command: &Command, resolver: &StoryResolver<'a>) -> Vec<&'a Event> {
    command
        .emits_events
        .iter()
        .filter_map(|id| resolver.events.get(id))
        .take(EVENTS_PER_COMMAND)
        .collect()
}

/// Declares a node once; returns how many nodes were added.
fn declare(chart: &mut Flowchart, node: Node) -> usize {
    if chart.declares(&node.id) {
        0
    } else {
        chart.node(node);
        1
    }
}

/// Entities by id across stories, sorted by id. The first definition wins;
/// each entry keeps the stories it appears in.
fn catalog<'a, T, F>(stories: &[&'a Story], members: F) -> BTreeMap<&'a str, (&'a T, Vec<&'a Story>)>
where
    T: Identified + 'a,
    F: Fn(&'a Story) -> &'a Vec<T>,
{
    let mut entries: BTreeMap<&'a str, (&'a T, Vec<&'a Story>)> = BTreeMap::new();
    for &story in stories {
        for item in members(story) {
            if item.id().is_empty() {
                continue;
            }
            let (_, used) = entries.entry(item.id()).or_insert_with(|| (item, Vec::new()));
            if !used.last().is_some_and(|last| std::ptr::eq(*last, story)) {
                used.push(story);
            }
        }
    }
    entries
}

fn used_in(stories: &[&Story]) -> String {
    let (shown, hidden) = cap(stories, STORIES_PER_CATALOG_ENTRY, "catalog stories");
    let mut text = shown
        .iter()
        .map(|s| link(s.anchor(), s.display_title()))
        .collect::<Vec<_>>()
        .join(", ");
    if hidden > 0 {
        text.push_str(&format!(" (+{hidden} more)"));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    const STORIES: &str = "
version: 1.0
domain_stories:
  - domain_story_id: dst_checkout
    title: Checkout
    tags: [sales_flow]
    description: A customer buys things.
    actors:
      - {actor_id: act_customer, name: Customer, kind: person}
    aggregates:
      - {aggregate_id: agg_order, name: Order, invariants: [Total is positive]}
    commands:
      - command_id: cmd_place
        name: PlaceOrder
        actor_ids: [act_customer]
        target_aggregate_id: agg_order
        emits_events: [evt_placed, evt_reserved, evt_extra]
    events:
      - {event_id: evt_placed, name: OrderPlaced, caused_by: {command_id: cmd_place}, policies_triggered: [pol_bill]}
      - {event_id: evt_reserved, name: StockReserved, caused_by: {command_id: cmd_place}}
      - {event_id: evt_extra, name: Extra}
    policies:
      - {policy_id: pol_bill, name: BillCustomer, when_event_id: evt_placed, issues_command_id: cmd_bill}
  - domain_story_id: dst_refund
    title: Refund
    actors:
      - {actor_id: act_customer, name: Shopper, kind: person}
";

    fn output() -> String {
        let doc: StoriesDocument = serde_yaml::from_str(STORIES).unwrap();
        render(&doc, &RenderOptions::default())
    }

    #[test]
    fn header_and_tag_index() {
        let output = output();
        assert!(output.starts_with(
            "# Domain Stories - Complete Documentation\n\n**Total Stories**: 2  \n**Version**: 1.0\n\n---"
        ));
        assert!(output.contains("#### Sales Flow (1)\n- [Checkout](#dst_checkout)"));
        assert!(output.contains("#### Untagged (1)\n- [Refund](#dst_refund)"));
        assert!(output.contains("| 1 | [dst_checkout](#dst_checkout) | Checkout | sales_flow |"));
    }

    #[test]
    fn story_sections() {
        let output = output();
        assert!(output.contains("## Checkout\n\n<a id=\"dst_checkout\"></a>"));
        assert!(output.contains("| `act_customer` | Customer | person |  |"));
        assert!(output.contains("**Invariants**:\n- Total is positive"));
        assert!(output.contains("**Target Aggregate**: Order (`agg_order`)"));
        assert!(output.contains("| `evt_placed` | OrderPlaced |  | `cmd_place` |"));
        assert!(output.contains("| `pol_bill` | BillCustomer | `evt_placed` | `cmd_bill` |"));
    }

    #[test]
    fn sequence_diagram_limits_events_per_command() {
        let output = output();
        assert!(output.contains("    participant customer as Customer\n    participant System\n"));
        assert!(output.contains(
            "    customer->>+System: PlaceOrder\n    System-->>customer: OrderPlaced\n    System-->>-customer: StockReserved\n"
        ));
        assert!(!output.contains("customer: Extra"));
    }

    #[test]
    fn flow_diagram_chains_command_event_policy() {
        let output = output();
        assert!(output.contains("    cmd_place -->|\"emits\"| evt_placed"));
        assert!(output.contains("    pol_bill{{\"BillCustomer\"}}"));
        assert!(output.contains("    evt_placed -->|\"triggers\"| pol_bill"));
        assert!(output.contains("    pol_bill -->|\"issues\"| cmd_bill"));
    }

    #[test]
    fn story_without_flows_gets_no_visualizations() {
        let output = output();
        let refund = &output[output.find("## Refund").unwrap()..];
        let refund = &refund[..refund.find("---").unwrap()];
        assert!(!refund.contains("Visualizations"));
    }

    #[test]
    fn catalogs_are_sorted_and_keep_first_definition() {
        let output = output();
        assert!(output.contains("**Total Unique Actors**: 1"));
        assert!(output.contains(
            "| `act_customer` | Customer | person | [Checkout](#dst_checkout), [Refund](#dst_refund) |"
        ));
        assert!(output.contains("## Command Catalog"));
    }

    #[test]
    fn catalog_lists_at_most_three_stories() {
        let stories: String = (1..=5)
            .map(|i| format!("  - domain_story_id: dst_{i}\n    title: S{i}\n    actors: [{{actor_id: act_a, name: A}}]\n"))
            .collect();
        let doc: StoriesDocument =
            serde_yaml::from_str(&format!("domain_stories:\n{stories}")).unwrap();
        let output = render(&doc, &RenderOptions::default());
        assert!(output.contains("[S1](#dst_1), [S2](#dst_2), [S3](#dst_3) (+2 more) |"));
    }

    #[test]
    fn empty_document_has_only_a_header() {
        let output = render(&StoriesDocument::default(), &RenderOptions::default());
        assert_eq!(
            output,
            "# Domain Stories - Complete Documentation\n\n**Total Stories**: 0  \n**Version**: N/A"
        );
    }

    #[test]
    fn tags_are_title_cased() {
        assert_eq!(tag_display("payment_flow"), "Payment Flow");
        assert_eq!(tag_display("untagged"), "Untagged");
    }
}
