// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Data engineering rendering.
//!
//! Sections are separated by horizontal rules. A section with nothing to show
//! is dropped together with its rule and its table-of-contents entry.

use super::RenderOptions;
use crate::diagram::{Direction, Edge, Flowchart, Node, cap};
use crate::markdown::{Block, Table, anchor, code, humanize, link, sections};
use crate::model::data_eng::{
    Check, Contract, DataEngDocument, Dataset, Domain, Pipeline, Schedule, Stage, owner_list,
    summarize_config,
};
use crate::parser::scalar_text;
use crate::resolver::DataEngResolver;
use log::debug;

const STAGE_FILL: &str = "fill:#80ccff";
const DATASET_FILL: &str = "fill:#ffe6cc";
const MORE_FILL: &str = "fill:#f5f5f5,stroke-dasharray:3 3";

/// Renders a data engineering document as Markdown.
#[must_use]
pub fn render(document: &DataEngDocument, opts: &RenderOptions) -> String {
    let renderer = Renderer {
        document,
        resolver: DataEngResolver::new(document),
        opts,
    };

    let body = [
        ("Hierarchical Index", "hierarchical-index", renderer.index()),
        (
            "System Architecture",
            "system-architecture",
            renderer.architecture(),
        ),
        ("Domains", "domains", renderer.domains()),
        ("Datasets", "datasets", renderer.datasets()),
        ("Data Contracts", "data-contracts", renderer.contracts()),
        ("Data Quality Checks", "data-quality-checks", renderer.checks()),
        ("Data Lineage", "data-lineage", renderer.lineage()),
        ("Governance", "governance", renderer.governance()),
        ("Observability", "observability", renderer.observability()),
    ];
    let present: Vec<_> = body.iter().filter(|(_, _, text)| !text.is_empty()).collect();
    debug!(sections = present.len(); "rendered data engineering document");

    let mut parts = vec![renderer.header(), renderer.toc(&present)];
    for (_, _, text) in &present {
        parts.push("---".to_owned());
        parts.push(text.clone());
    }
    sections(parts)
}

struct Renderer<'a> {
    document: &'a DataEngDocument,
    resolver: DataEngResolver<'a>,
    opts: &'a RenderOptions,
}

/// Display value for an optional scalar.
fn or_na(value: Option<&String>) -> &str {
    value.map_or("N/A", String::as_str)
}

fn label(name: &str, id: &str) -> String {
    if name.is_empty() {
        id.to_owned()
    } else {
        humanize(name)
    }
}

impl Renderer<'_> {
    fn header(&self) -> String {
        let system = &self.document.system;
        let name = system.name.as_deref().unwrap_or("Data Engineering System");
        let mut block = Block::new();
        block.line(format!("# {}", humanize(name))).blank();
        if !system.description.trim().is_empty() {
            block.line(format!("> {}", system.description.trim())).blank();
        }
        block
            .field("Owners", &owner_list(&system.owners))
            .field("Tags", &system.tags.join(", "));
        block.finish()
    }

    fn toc(&self, present: &[&(&str, &str, String)]) -> String {
        let mut block = Block::new();
        block.line("## Table of Contents").blank();
        for (title, slug, _) in present {
            block.line(format!("- [{title}](#{slug})"));
            if *slug == "domains" {
                for domain in self.resolver.system_domains() {
                    block.line(format!(
                        "  - {}",
                        link(&domain.id, &format!("Domain: {}", label(&domain.name, &domain.id)))
                    ));
                }
            }
        }
        if present.is_empty() {
            return String::new();
        }
        block.finish()
    }

    /// Diagram label: the humanized name when the dataset is known, else the raw id.
    fn dataset_label(&self, id: &str) -> String {
        self.resolver
            .datasets
            .get(id)
            .map_or_else(|| id.to_owned(), |d| label(&d.name, id))
    }

    fn dataset_ref(&self, id: &str) -> String {
        if id.is_empty() {
            return "N/A".to_owned();
        }
        self.resolver.datasets.reference(id)
    }

    fn index(&self) -> String {
        let domains = self.resolver.system_domains();
        if domains.is_empty() {
            return String::new();
        }
        let mut block = Block::new();
        block.line("## Hierarchical Index").blank().line("### Domains").blank();
        for domain in domains {
            block.line(format!(
                "- **{}** - {}",
                link(&domain.id, &label(&domain.name, &domain.id)),
                domain.description.trim()
            ));
            let pipelines = self.resolver.pipelines_for_domain(domain);
            if pipelines.is_empty() {
                continue;
            }
            block.line("  - Pipelines:");
            for pipeline in pipelines {
                block.line(format!(
                    "    - **{}** - {}",
                    link(&pipeline.id, &label(&pipeline.name, &pipeline.id)),
                    pipeline.description.trim()
                ));
                let stages: Vec<String> = pipeline
                    .stages
                    .iter()
                    .map(|s| link(&s.id, &label(&s.name, &s.id)))
                    .collect();
                if !stages.is_empty() {
                    block.line(format!("      - Stages: {}", stages.join(", ")));
                }
            }
        }
        block.finish()
    }

    fn architecture(&self) -> String {
        if !self.opts.diagrams {
            return String::new();
        }
        let system = &self.document.system;
        let caps = self.opts.caps;
        let domains = self.resolver.system_domains();
        let system_id = if system.id.is_empty() { "sys" } else { &system.id };
        let mut chart = Flowchart::new(Direction::TopBottom);
        chart.node(Node::new(
            system_id,
            system.name.as_deref().unwrap_or("System"),
        ));
        chart.subgraph(
            "Domains",
            domains
                .iter()
                .map(|d| Node::new(&d.id, label(&d.name, &d.id)))
                .collect(),
        );

        let pipeline_ids = self.resolver.system_pipeline_ids();
        let (shown_pipelines, hidden_pipelines) =
            cap(&pipeline_ids, caps.max_nodes, "system pipelines");
        let mut pipeline_nodes: Vec<Node> = shown_pipelines
            .iter()
            .filter_map(|id| self.resolver.pipelines.get(id))
            .map(|p| Node::new(&p.id, label(&p.name, &p.id)))
            .collect();
        if hidden_pipelines > 0 {
            pipeline_nodes.push(Node::new(
                "more_pipelines",
                format!("+{hidden_pipelines} more"),
            ));
        }
        chart.subgraph("Pipelines", pipeline_nodes);

        let ranked = self.resolver.datasets_by_references();
        let (top, _) = cap(&ranked, caps.max_nodes, "system datasets");
        let top: Vec<&str> = top.iter().map(|(id, _)| *id).collect();
        chart.subgraph(
            "Datasets",
            top.iter()
                .map(|id| Node::new(id, self.dataset_label(id)))
                .collect(),
        );

        for domain in &domains {
            chart.edge(Edge::new(system_id, &domain.id));
        }
        for domain in &domains {
            let declared: Vec<&String> = domain
                .pipelines
                .iter()
                .filter(|id| chart.declares(id))
                .collect();
            let (shown, _) = cap(&declared, caps.max_edges, "domain pipeline edges");
            for id in shown {
                chart.edge(Edge::new(&domain.id, id));
            }
        }

        let mut examples = 0;
        'pipelines: for pipeline in shown_pipelines
            .iter()
            .filter_map(|id| self.resolver.pipelines.get(id))
        {
            for stage in &pipeline.stages {
                let flows = stage
                    .inputs
                    .iter()
                    .map(|id| (id, "reads"))
                    .chain(stage.outputs.iter().map(|id| (id, "writes")));
                for (id, verb) in flows {
                    if examples >= caps.max_edges {
                        break 'pipelines;
                    }
                    if top.contains(&id.as_str()) {
                        chart.edge(Edge::new(&pipeline.id, id).labelled(verb));
                        examples += 1;
                    }
                }
            }
        }

        chart.style(system_id, "fill:#e1f5ff");
        for domain in &domains {
            chart.style(&domain.id, "fill:#b3e0ff");
        }
        for id in shown_pipelines {
            if self.resolver.pipelines.contains(id) {
                chart.style(id, STAGE_FILL);
            }
        }
        for id in &top {
            chart.style(id, DATASET_FILL);
        }

        format!("## System Architecture\n\n{}", chart.emit())
    }

    fn domains(&self) -> String {
        let domains = self.resolver.system_domains();
        if domains.is_empty() {
            return String::new();
        }
        sections(std::iter::once("## Domains".to_owned()).chain(domains.into_iter().map(|d| self.domain(d))))
    }

    fn domain(&self, domain: &Domain) -> String {
        let pipelines = self.resolver.pipelines_for_domain(domain);
        let mut referenced: Vec<&str> = Vec::new();
        for id in pipelines.iter().flat_map(|p| p.datasets()) {
            if !referenced.contains(&id) {
                referenced.push(id);
            }
        }

        let mut block = Block::new();
        block
            .line(format!(
                "### {}{}",
                anchor(&domain.id),
                label(&domain.name, &domain.id)
            ))
            .blank()
            .field("ID", &code(&domain.id))
            .field("Description", domain.description.trim())
            .field("Owners", &owner_list(&domain.owners));

        let mut summary = Table::new(["Metric", "Count"]);
        summary
            .row(["Pipelines".to_owned(), domain.pipelines.len().to_string()])
            .row(["Datasets Referenced".to_owned(), referenced.len().to_string()]);
        block
            .blank()
            .line("#### Summary")
            .push_block(&summary.render());

        let mut table = Table::new([
            "Pipeline",
            "Mode",
            "Schedule Type",
            "Stages",
            "Input Datasets",
            "Output Datasets",
        ]);
        for pipeline in &pipelines {
            table.row([
                link(&pipeline.id, &label(&pipeline.name, &pipeline.id)),
                or_na(pipeline.mode.as_ref()).to_owned(),
                or_na(pipeline.schedule.as_ref().and_then(|s| s.kind.as_ref())).to_owned(),
                pipeline.stages.len().to_string(),
                pipeline.inputs().len().to_string(),
                pipeline.outputs().len().to_string(),
            ]);
        }
        if !table.is_empty() {
            block.line("#### Pipelines").push_block(&table.render());
        }
        for pipeline in pipelines {
            block.push_block(&self.pipeline(pipeline));
        }
        block.finish()
    }

    fn pipeline(&self, pipeline: &Pipeline) -> String {
        let mut block = Block::new();
        block
            .line(format!(
                "#### {}Pipeline: {}",
                anchor(&pipeline.id),
                label(&pipeline.name, &pipeline.id)
            ))
            .blank()
            .field("ID", &code(&pipeline.id))
            .field("Mode", or_na(pipeline.mode.as_ref()))
            .field("Description", pipeline.description.trim())
            .field("Traits", &pipeline.traits.join(", "))
            .field("Tags", &pipeline.tags.join(", "));
        if let Some(schedule) = &pipeline.schedule {
            block.push_block(&schedule_section(schedule));
        }
        if self.opts.diagrams && !pipeline.stages.is_empty() {
            block
                .blank()
                .line("##### Pipeline Flow")
                .push_block(&self.pipeline_flow(pipeline));
        }
        if !pipeline.stages.is_empty() {
            let mut table = Table::new(["Stage", "Inputs", "Outputs", "Depends On"]);
            for stage in &pipeline.stages {
                table.row([
                    link(&stage.id, &label(&stage.name, &stage.id)),
                    stage.inputs.join(", "),
                    stage.outputs.join(", "),
                    stage.depends_on.join(", "),
                ]);
            }
            block.blank().line("##### Stages").push_block(&table.render());
            for stage in &pipeline.stages {
                block.push_block(&self.stage(stage));
            }
        }
        block.finish()
    }

    /// Stages, then the pipeline's datasets up to the node cap. Datasets past
    /// the cap collapse into one "+K more" node and get no edges.
    fn pipeline_flow(&self, pipeline: &Pipeline) -> String {
        let mut chart = Flowchart::new(Direction::LeftRight);
        for stage in &pipeline.stages {
            chart.node(Node::new(&stage.id, label(&stage.name, &stage.id)));
        }
        let datasets = pipeline.datasets();
        let (shown, hidden) = cap(&datasets, self.opts.caps.max_nodes, "pipeline datasets");
        for id in shown {
            chart.node(Node::new(id, self.dataset_label(id)));
        }
        if hidden > 0 {
            chart.node(Node::new("more_datasets", format!("+{hidden} more")));
        }

        for stage in &pipeline.stages {
            for id in stage.inputs.iter().filter(|id| shown.contains(&id.as_str())) {
                chart.edge(Edge::new(id, &stage.id).labelled("reads"));
            }
            for id in stage.outputs.iter().filter(|id| shown.contains(&id.as_str())) {
                chart.edge(Edge::new(&stage.id, id).labelled("writes"));
            }
        }
        for stage in &pipeline.stages {
            for dependency in &stage.depends_on {
                chart.edge(Edge::new(dependency, &stage.id).dotted().labelled("depends"));
            }
        }

        for stage in &pipeline.stages {
            chart.style(&stage.id, STAGE_FILL);
        }
        for id in shown {
            chart.style(id, DATASET_FILL);
        }
        if hidden > 0 {
            chart.style("more_datasets", MORE_FILL);
        }
        chart.emit()
    }

    fn stage(&self, stage: &Stage) -> String {
        let mut block = Block::new();
        block
            .line(format!(
                "###### {}Stage: {}",
                anchor(&stage.id),
                label(&stage.name, &stage.id)
            ))
            .blank()
            .field("ID", &code(&stage.id))
            .field("Description", stage.description.trim())
            .field("Patterns Used", &stage.uses_patterns.join(", "))
            .field(
                "Depends On",
                &stage
                    .depends_on
                    .iter()
                    .map(|id| code(id))
                    .collect::<Vec<_>>()
                    .join(", "),
            );
        let dataset_items = |ids: &[String]| -> Vec<String> {
            ids.iter()
                .map(|id| format!("{} ({})", self.dataset_ref(id), code(id)))
                .collect()
        };
        block
            .bullets("Input Datasets", &dataset_items(&stage.inputs))
            .bullets("Output Datasets", &dataset_items(&stage.outputs));

        let mut transforms = Table::new(["Transform ID", "Type", "Description", "Configuration"]);
        for transform in &stage.transforms {
            transforms.row([
                transform.id.as_deref().map_or_else(|| "N/A".to_owned(), code),
                or_na(transform.kind.as_ref()).to_owned(),
                transform.description.clone(),
                summarize_config(&transform.config),
            ]);
        }
        if !transforms.is_empty() {
            block
                .blank()
                .line("**Transforms**:")
                .push_block(&transforms.render());
        }
        block.finish()
    }

    fn datasets(&self) -> String {
        let datasets = &self.document.datasets;
        if datasets.is_empty() {
            return String::new();
        }
        let mut table = Table::new([
            "Dataset",
            "Type",
            "Format",
            "Location",
            "Classification",
            "Contains PII",
            "Tags",
        ]);
        for dataset in datasets {
            table.row([
                link(&dataset.id, &label(&dataset.name, &dataset.id)),
                or_na(dataset.kind.as_ref()).to_owned(),
                or_na(dataset.format.as_ref()).to_owned(),
                code(or_na(dataset.location.as_ref())),
                or_na(dataset.classification.as_ref()).to_owned(),
                yes_no(dataset.contains_pii).to_owned(),
                dataset.tags.join(", "),
            ]);
        }
        sections(
            [format!("## Datasets\n\n{}", table.render())]
                .into_iter()
                .chain(datasets.iter().map(|d| self.dataset(d))),
        )
    }

    fn dataset(&self, dataset: &Dataset) -> String {
        let mut block = Block::new();
        block
            .line(format!(
                "### {}{}",
                anchor(&dataset.id),
                label(&dataset.name, &dataset.id)
            ))
            .blank()
            .field("ID", &code(&dataset.id))
            .field("Type", or_na(dataset.kind.as_ref()))
            .field("Format", or_na(dataset.format.as_ref()))
            .field("Location", &code(or_na(dataset.location.as_ref())))
            .field("Classification", or_na(dataset.classification.as_ref()))
            .field("Contains PII", yes_no(dataset.contains_pii))
            .field("PII Fields", &dataset.pii_fields.join(", "))
            .field("Tags", &dataset.tags.join(", "));

        let contracts: Vec<String> = self
            .resolver
            .contracts_for_dataset(&dataset.id)
            .iter()
            .map(|c| link(&c.id, &label(&c.name, &c.id)))
            .collect();
        let checks: Vec<String> = self
            .resolver
            .checks_for_dataset(&dataset.id)
            .iter()
            .map(|c| link(&c.id, &label(&c.name, &c.id)))
            .collect();
        block
            .field("Contracts", &contracts.join(", "))
            .field("Checks", &checks.join(", "));

        let mut schema = Table::new(["Field", "Type", "Nullable", "PII", "Description"]);
        for field in &dataset.schema.fields {
            schema.row([
                code(or_na(field.name.as_ref())),
                or_na(field.ty.as_ref()).to_owned(),
                yes_no(field.nullable).to_owned(),
                yes_no(field.pii).to_owned(),
                field.description.clone().unwrap_or_else(|| "-".to_owned()),
            ]);
        }
        if !schema.is_empty() {
            block.blank().line("#### Schema").push_block(&schema.render());
        }

        if let Some(partitioning) = &dataset.partitioning {
            let mut items = Vec::new();
            if !partitioning.columns.is_empty() {
                items.push(format!("**Columns**: {}", partitioning.columns.join(", ")));
            }
            if let Some(strategy) = &partitioning.strategy {
                items.push(format!("**Strategy**: {strategy}"));
            }
            if let Some(reference) = &partitioning.strategy_ref {
                items.push(format!("**Strategy Reference**: {}", code(reference)));
            }
            block.list("#### Partitioning", &items);
        }
        let dimensions: Vec<String> = dataset.quality_dimensions.iter().map(|d| code(d)).collect();
        block.list("#### Quality Dimensions", &dimensions);
        block.finish()
    }

    fn contracts(&self) -> String {
        let contracts = &self.document.contracts;
        if contracts.is_empty() {
            return String::new();
        }
        let mut table = Table::new([
            "Contract",
            "Dataset",
            "Version",
            "Owners",
            "Consumers",
            "SLA Freshness",
            "SLA Completeness",
        ]);
        for contract in contracts {
            let sla = contract.sla.as_ref();
            let teams: Vec<&str> = contract
                .owners
                .iter()
                .map(|o| o.team.as_deref().unwrap_or("Unknown"))
                .collect();
            table.row([
                link(&contract.id, &label(&contract.name, &contract.id)),
                self.dataset_ref(&contract.dataset),
                or_na(contract.version.as_ref()).to_owned(),
                teams.join(", "),
                contract.consumers.len().to_string(),
                sla.and_then(|s| s.freshness_minutes.as_ref())
                    .map_or_else(|| "N/A".to_owned(), |m| format!("{m}m")),
                sla.and_then(|s| s.completeness_percent.as_ref())
                    .map_or_else(|| "N/A".to_owned(), |p| format!("{p}%")),
            ]);
        }
        sections(
            [format!("## Data Contracts\n\n{}", table.render())]
                .into_iter()
                .chain(contracts.iter().map(|c| self.contract(c))),
        )
    }

    fn contract(&self, contract: &Contract) -> String {
        let mut block = Block::new();
        block
            .line(format!(
                "### {}{}",
                anchor(&contract.id),
                label(&contract.name, &contract.id)
            ))
            .blank()
            .field("ID", &code(&contract.id))
            .field("Dataset", &self.dataset_ref(&contract.dataset))
            .field("Version", or_na(contract.version.as_ref()))
            .field(
                "Evolution Policy",
                contract.evolution_policy.as_deref().unwrap_or_default(),
            );
        if let Some(reference) = &contract.schema.reference {
            block.field("Schema Reference", &code(reference));
        }
        if let Some(sla) = &contract.sla {
            let mut items = Vec::new();
            if let Some(minutes) = &sla.freshness_minutes {
                items.push(format!("**Freshness**: {minutes} minutes"));
            }
            if let Some(percent) = &sla.completeness_percent {
                items.push(format!("**Completeness**: {percent}%"));
            }
            if let Some(percent) = &sla.availability_percent {
                items.push(format!("**Availability**: {percent}%"));
            }
            block.list("#### SLA", &items);
        }
        let owners: Vec<String> = contract
            .owners
            .iter()
            .map(|o| {
                format!(
                    "**{}** ({})",
                    o.team.as_deref().unwrap_or("Unknown"),
                    o.contact.as_deref().unwrap_or("N/A")
                )
            })
            .collect();
        block.list("#### Owners", &owners);
        let consumers: Vec<String> = contract
            .consumers
            .iter()
            .map(|c| {
                format!(
                    "**{}** - {}",
                    c.team.as_deref().unwrap_or("Unknown"),
                    c.use_case.as_deref().unwrap_or("N/A")
                )
            })
            .collect();
        block.list("#### Consumers", &consumers);
        block.finish()
    }

    fn checks(&self) -> String {
        let checks = &self.document.checks;
        if checks.is_empty() {
            return String::new();
        }
        let mut table = Table::new([
            "Check",
            "Type",
            "Dataset",
            "Severity",
            "Alert Channel",
            "Threshold",
        ]);
        for check in checks {
            table.row([
                link(&check.id, &label(&check.name, &check.id)),
                or_na(check.kind.as_ref()).to_owned(),
                self.dataset_ref(&check.dataset),
                or_na(check.severity.as_ref()).to_owned(),
                or_na(check.alert.as_ref().and_then(|a| a.channel.as_ref())).to_owned(),
                summarize_config(&check.threshold),
            ]);
        }
        sections(
            [format!("## Data Quality Checks\n\n{}", table.render())]
                .into_iter()
                .chain(checks.iter().map(|c| self.check(c))),
        )
    }

    fn check(&self, check: &Check) -> String {
        let mut block = Block::new();
        block
            .line(format!(
                "### {}{}",
                anchor(&check.id),
                label(&check.name, &check.id)
            ))
            .blank()
            .field("ID", &code(&check.id))
            .field("Type", or_na(check.kind.as_ref()))
            .field("Dataset", &self.dataset_ref(&check.dataset))
            .field("Severity", or_na(check.severity.as_ref()));

        let threshold: Vec<String> = check
            .threshold
            .iter()
            .map(|(key, value)| format!("**{}**: {}", humanize(&scalar_text(key)), scalar_text(value)))
            .collect();
        block.list("#### Threshold", &threshold);

        let assertions: Vec<String> = check
            .assertions
            .iter()
            .map(|a| {
                let condition = code(or_na(a.condition.as_ref()));
                if a.description.trim().is_empty() {
                    condition
                } else {
                    format!("**{}**: {condition}", a.description.trim())
                }
            })
            .collect();
        block.list("#### Assertions", &assertions);

        if let Some(alert) = &check.alert {
            let mut items = vec![format!("**Channel**: {}", or_na(alert.channel.as_ref()))];
            if let Some(escalation) = &alert.escalation {
                items.push(format!("**Escalation**: {escalation}"));
            }
            block.list("#### Alert Configuration", &items);
        }
        block.finish()
    }

    fn lineage(&self) -> String {
        let lineage = &self.document.lineage;
        if lineage.is_empty() {
            return String::new();
        }
        let mut block = Block::new();
        block.line("## Data Lineage");

        if self.opts.diagrams {
            let mut chart = Flowchart::new(Direction::LeftRight);
            let mut seen: Vec<&str> = Vec::new();
            for id in lineage.iter().flat_map(|l| [&l.upstream, &l.downstream]) {
                if !id.is_empty() && !seen.contains(&id.as_str()) {
                    seen.push(id.as_str());
                    chart.node(Node::new(id, self.dataset_label(id)));
                }
            }
            for edge in lineage {
                if edge.upstream.is_empty() || edge.downstream.is_empty() {
                    continue;
                }
                let text = [edge.transform.trim(), edge.relationship.trim()]
                    .into_iter()
                    .filter(|s| !s.is_empty())
                    .collect::<Vec<_>>()
                    .join("<br/>");
                chart.edge(Edge::new(&edge.upstream, &edge.downstream).labelled(text));
            }
            for id in &seen {
                chart.style(id, DATASET_FILL);
            }
            block.push_block(&chart.emit());
        }

        let mut table = Table::new([
            "Upstream Dataset",
            "Downstream Dataset",
            "Transform",
            "Relationship",
        ]);
        for edge in lineage {
            table.row([
                self.dataset_ref(&edge.upstream),
                self.dataset_ref(&edge.downstream),
                if edge.transform.is_empty() {
                    "N/A".to_owned()
                } else {
                    code(&edge.transform)
                },
                if edge.relationship.is_empty() {
                    "N/A".to_owned()
                } else {
                    edge.relationship.clone()
                },
            ]);
        }
        block.push_block(&table.render());
        block.finish()
    }

    fn governance(&self) -> String {
        let governance = &self.document.governance;
        if governance.is_empty() {
            return String::new();
        }
        let mut retention = Table::new(["Dataset", "Policy", "Duration"]);
        for policy in &governance.retention {
            retention.row([
                self.dataset_ref(&policy.dataset),
                or_na(policy.policy.as_ref()).to_owned(),
                policy.duration(),
            ]);
        }
        let mut access = Table::new(["Dataset", "Tier", "Roles"]);
        for policy in &governance.access {
            access.row([
                self.dataset_ref(&policy.dataset),
                or_na(policy.tier.as_ref()).to_owned(),
                policy.roles.join(", "),
            ]);
        }
        let mut pii = Table::new(["Dataset", "Masked Fields", "Masking Method"]);
        for policy in &governance.pii_handling {
            pii.row([
                self.dataset_ref(&policy.dataset),
                policy.masking.join(", "),
                or_na(policy.masking_method.as_ref()).to_owned(),
            ]);
        }
        sections([
            "## Governance".to_owned(),
            titled("### Retention Policies", &retention),
            titled("### Access Control", &access),
            titled("### PII Handling", &pii),
        ])
    }

    fn observability(&self) -> String {
        let observability = &self.document.observability;
        if observability.is_empty() {
            return String::new();
        }
        let mut metrics = Table::new(["Metric", "Dataset", "Type", "Description"]);
        for metric in &observability.metrics {
            metrics.row([
                or_na(metric.name.as_ref()).to_owned(),
                self.dataset_ref(&metric.dataset),
                or_na(metric.kind.as_ref()).to_owned(),
                metric.description.clone(),
            ]);
        }
        let mut slos = Table::new(["SLO", "Target", "Unit", "Window", "Linked Check"]);
        for slo in &observability.slos {
            slos.row([
                or_na(slo.name.as_ref()).to_owned(),
                or_na(slo.target.as_ref()).to_owned(),
                or_na(slo.unit.as_ref()).to_owned(),
                or_na(slo.window.as_ref()).to_owned(),
                if slo.linked_check.is_empty() {
                    "N/A".to_owned()
                } else {
                    self.resolver.checks.reference(&slo.linked_check)
                },
            ]);
        }
        let mut alerts = Table::new(["Alert", "Condition", "Severity", "Channel"]);
        for alert in &observability.alerts {
            alerts.row([
                or_na(alert.name.as_ref()).to_owned(),
                code(or_na(alert.condition.as_ref())),
                or_na(alert.severity.as_ref()).to_owned(),
                or_na(alert.channel.as_ref()).to_owned(),
            ]);
        }
        sections([
            "## Observability".to_owned(),
            titled("### Metrics", &metrics),
            titled("### Service Level Objectives (SLOs)", &slos),
            titled("### Alerts", &alerts),
        ])
    }
}

fn schedule_section(schedule: &Schedule) -> String {
    let mut block = Block::new();
    block
        .line("##### Schedule")
        .blank()
        .line(format!("- **Type**: {}", or_na(schedule.kind.as_ref())))
        .line(format!(
            "- **Schedule ID**: {}",
            code(or_na(schedule.id.as_ref()))
        ));
    if let Some(cron) = &schedule.cron_expression {
        block.line(format!("- **Cron Expression**: {}", code(cron)));
    }
    if let Some(minutes) = &schedule.interval_minutes {
        block.line(format!("- **Interval**: {minutes} minutes"));
    }
    if !schedule.triggers.is_empty() {
        block.line("- **Triggers**:");
        for trigger in &schedule.triggers {
            block.line(format!(
                "  - {} (source: {})",
                trigger.kind.as_deref().unwrap_or("unknown"),
                or_na(trigger.source.as_ref())
            ));
        }
    }
    block.finish()
}

fn titled(heading: &str, table: &Table) -> String {
    if table.is_empty() {
        return String::new();
    }
    format!("{heading}\n\n{}", table.render())
}

const fn yes_no(value: bool) -> &'static str {
    if value { "Yes" } else { "No" }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagram::DiagramCaps;

    fn document(yaml: &str) -> DataEngDocument {
        serde_yaml::from_str(yaml).unwrap()
    }

    fn wide_pipeline(inputs: usize) -> DataEngDocument {
        let ids: Vec<String> = (1..=inputs).map(|i| format!("ds-input-{i:02}")).collect();
        document(&format!(
            "
system:
  id: sys_wide
  name: Wide
  domains: [dom_a]
domains:
  - id: dom_a
    name: Ingest
    pipelines: [pl_wide]
pipelines:
  - id: pl_wide
    name: WidePipeline
    stages:
      - id: stg_merge
        name: Merge
        inputs: [{}]
        outputs: [ds-merged]
datasets: []
",
            ids.join(", ")
        ))
    }

    fn pipeline_flow_block(output: &str) -> &str {
        let start = output.find("##### Pipeline Flow").unwrap();
        let rest = &output[start..];
        let end = rest.find("##### Stages").unwrap();
        &rest[..end]
    }

    #[test]
    fn pipeline_flow_caps_datasets_but_stage_lists_all() {
        let doc = wide_pipeline(11);
        let opts = RenderOptions {
            diagrams: true,
            caps: DiagramCaps {
                max_nodes: 10,
                max_edges: 5,
            },
        };
        let output = render(&doc, &opts);
        let flow = pipeline_flow_block(&output);
        assert!(flow.contains("more_datasets[\"+2 more\"]"));
        assert!(flow.contains("ds_input_10[\"ds-input-10\"]"));
        assert!(!flow.contains("ds_input_11["));
        assert!(!flow.contains("ds_merged["));
        assert_eq!(flow.matches(DATASET_FILL).count(), 10);
        assert!(flow.contains("ds_input_01 -->|\"reads\"| stg_merge"));

        let stages = &output[output.find("##### Stages").unwrap()..];
        assert!(stages.contains("ds-input-11"));
        assert!(stages.contains("ds-merged (`ds-merged`)"));
    }

    fn architecture_block(output: &str) -> &str {
        let start = output.find("## System Architecture").unwrap();
        let rest = &output[start..];
        let body = rest.find("```mermaid").unwrap() + "```mermaid".len();
        let end = body + rest[body..].find("```").unwrap();
        &rest[..end]
    }

    fn example_edge_targets<'a>(block: &'a str, pipeline: &str) -> Vec<(&'a str, &'a str)> {
        block
            .lines()
            .filter_map(|line| line.trim().strip_prefix(pipeline))
            .filter_map(|rest| rest.strip_prefix(" -->|\""))
            .filter_map(|rest| rest.split_once("\"| "))
            .collect()
    }

    #[test]
    fn architecture_shows_capped_pipeline_dataset_examples() {
        let opts = RenderOptions {
            diagrams: true,
            caps: DiagramCaps {
                max_nodes: 10,
                max_edges: 5,
            },
        };
        let output = render(&wide_pipeline(11), &opts);
        let block = architecture_block(&output);
        let edges = example_edge_targets(block, "pl_wide");
        assert_eq!(edges.len(), 5);
        for (verb, target) in &edges {
            assert_eq!(*verb, "reads");
            assert!(block.contains(&format!("        {target}[\"")), "{target} is not declared");
        }
        assert_eq!(edges[0].1, "ds_input_01");
        assert!(block.contains("        ds_input_06[\""));
        assert!(!block.contains("pl_wide -->|\"reads\"| ds_input_06"));
    }

    #[test]
    fn architecture_examples_include_writes() {
        let doc = document(
            "
system: {id: sys, domains: [dom]}
domains: [{id: dom, pipelines: [pl_etl]}]
pipelines:
  - id: pl_etl
    stages:
      - {id: stg_load, inputs: [ds-a, ds-b], outputs: [ds-c, ds-d]}
datasets: [{id: ds-a, name: A}]
",
        );
        let opts = RenderOptions {
            diagrams: true,
            caps: DiagramCaps {
                max_nodes: 10,
                max_edges: 3,
            },
        };
        let output = render(&doc, &opts);
        let block = architecture_block(&output);
        let edges = example_edge_targets(block, "pl_etl");
        assert_eq!(edges, vec![("reads", "ds_a"), ("reads", "ds_b"), ("writes", "ds_c")]);
        assert!(block.contains("        ds_a[\"A\"]"));
        assert!(block.contains("        ds_c[\"ds-c\"]"));
        assert!(!block.contains("pl_etl -->|\"writes\"| ds_d"));
    }

    #[test]
    fn header_toc_and_rules() {
        let output = render(&wide_pipeline(1), &RenderOptions::default());
        assert!(output.starts_with("# Wide\n\n## Table of Contents"));
        assert!(output.contains("- [Domains](#domains)\n  - [Domain: Ingest](#dom_a)"));
        assert!(!output.contains("Data Contracts"));
        assert!(!output.contains("## Governance"));
        assert!(output.contains("---\n\n## Hierarchical Index"));
        assert!(output.contains("    - **[Wide Pipeline](#pl_wide)** - \n      - Stages: [Merge](#stg_merge)"));
    }

    #[test]
    fn no_diagrams_drops_architecture_and_flow() {
        let opts = RenderOptions {
            diagrams: false,
            ..RenderOptions::default()
        };
        let output = render(&wide_pipeline(2), &opts);
        assert!(!output.contains("```mermaid"));
        assert!(!output.contains("System Architecture"));
        assert!(output.contains("##### Stages"));
    }

    #[test]
    fn architecture_collapses_extra_pipelines() {
        let pipelines: Vec<String> = (1..=4).map(|i| format!("pl_{i}")).collect();
        let defs: String = pipelines
            .iter()
            .map(|id| format!("  - id: {id}\n    name: P{id}\n"))
            .collect();
        let doc = document(&format!(
            "
system:
  id: sys
  domains: [dom]
domains:
  - id: dom
    pipelines: [{}]
pipelines:
{defs}
datasets: []
",
            pipelines.join(", ")
        ));
        let opts = RenderOptions {
            diagrams: true,
            caps: DiagramCaps {
                max_nodes: 3,
                max_edges: 2,
            },
        };
        let output = render(&doc, &opts);
        assert!(output.contains("more_pipelines[\"+1 more\"]"));
        assert!(output.contains("    dom --> pl_1\n    dom --> pl_2\n"));
        assert!(!output.contains("dom --> pl_3"));
    }

    #[test]
    fn datasets_contracts_and_checks_link_each_other() {
        let doc = document(
            "
system: {id: s, domains: []}
pipelines: []
datasets:
  - id: ds-orders
    name: orders-raw
    type: table
    contains_pii: true
    schema:
      fields:
        - {name: email, type: string, pii: true, nullable: false}
contracts:
  - id: ctr-orders
    name: OrdersContract
    dataset: ds-orders
    sla: {freshness_minutes: 60}
checks:
  - id: chk-rows
    name: RowCount
    dataset: ds-missing
    threshold: {min_rows: 100}
",
        );
        let output = render(&doc, &RenderOptions::default());
        assert!(output.contains("| [Orders Raw](#ds-orders) | table | N/A | `N/A` | N/A | Yes |  |"));
        assert!(output.contains("| `email` | string | No | Yes | - |"));
        assert!(output.contains("**Contracts**: [Orders Contract](#ctr-orders)"));
        assert!(output.contains("| [Orders Contract](#ctr-orders) | [Orders Raw](#ds-orders) | N/A |  | 0 | 60m | N/A |"));
        assert!(output.contains("**Dataset**: ds-missing  "));
        assert!(output.contains("- **min_rows**: 100"));
    }

    #[test]
    fn lineage_graph_and_governance() {
        let doc = document(
            "
system: {id: s, domains: []}
pipelines: []
datasets: [{id: ds-a, name: A}, {id: ds-b, name: B}]
lineage:
  - {upstream: ds-a, downstream: ds-b, transform: dedupe, relationship: derived}
governance:
  retention:
    - {dataset: ds-a, policy: retain-indefinitely}
",
        );
        let output = render(&doc, &RenderOptions::default());
        assert!(output.contains("ds_a -->|\"dedupe<br/>derived\"| ds_b"));
        assert!(output.contains("| [A](#ds-a) | [B](#ds-b) | `dedupe` | derived |"));
        assert!(output.contains("### Retention Policies\n\n| Dataset | Policy | Duration |"));
        assert!(output.contains("| [A](#ds-a) | retain-indefinitely | Indefinitely |"));
        assert!(!output.contains("## Observability"));
    }
}
