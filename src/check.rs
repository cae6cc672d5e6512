// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Document lint: duplicate ids, dangling references and story conventions.
//!
//! Rendering tolerates all of these. The check makes them visible so authors
//! can fix their documents before the output silently drops or unlinks
//! something.

use crate::convert::Model;
use crate::model::Identified;
use crate::model::data_eng::DataEngDocument;
use crate::model::stories::{Story, StoriesDocument};
use crate::model::strategic::StrategicDocument;
use crate::model::tactical::{Attribute, TacticalDocument};
use crate::resolver::{
    DataEngResolver, Duplicates, Index, StoryResolver, StrategicResolver, TacticalResolver,
};
use log::debug;
use std::fmt;
use std::slice;

/// One problem found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// An id defined more than once in its category.
    DuplicateId {
        /// Entity category, such as `aggregate`.
        category: &'static str,
        /// The repeated id.
        id: String,
    },
    /// A reference field naming an id that is defined nowhere.
    DanglingReference {
        /// The referring entity, as `category id`.
        owner: String,
        /// The field holding the reference.
        field: &'static str,
        /// The unknown id.
        id: String,
    },
    /// A domain story breaking a naming convention.
    Convention {
        /// Story id, `unknown` when missing.
        story: String,
        /// The broken rule.
        rule: &'static str,
    },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateId { category, id } => write!(f, "duplicate {category} id '{id}'"),
            Self::DanglingReference { owner, field, id } => {
                write!(f, "{owner}: {field} references unknown id '{id}'")
            }
            Self::Convention { story, rule } => write!(f, "story '{story}': {rule}"),
        }
    }
}

/// Lints a loaded document. An empty result means the document is clean.
#[must_use]
pub fn check(model: &Model) -> Vec<Finding> {
    let mut lint = Lint::default();
    match model {
        Model::TacticalDdd(doc) => lint.tactical(doc),
        Model::StrategicDdd(doc) => lint.strategic(doc),
        Model::DataEngineering(doc) => lint.data_eng(doc),
        Model::DomainStories(doc) => lint.stories(doc),
    }
    debug!(kind = model.kind().description(), findings = lint.findings.len(); "checked document");
    lint.findings
}

#[derive(Default)]
struct Lint {
    findings: Vec<Finding>,
}

impl Lint {
    fn duplicates(&mut self, resolver: &impl Duplicates) {
        self.findings.extend(
            resolver
                .duplicates()
                .into_iter()
                .map(|(category, id)| Finding::DuplicateId { category, id }),
        );
    }

    /// Records every non-empty id in `ids` that `index` does not define.
    fn refs<'i, T: Identified>(
        &mut self,
        owner: &str,
        field: &'static str,
        index: &Index<'_, T>,
        ids: impl IntoIterator<Item = &'i String>,
    ) {
        for id in ids {
            if !id.is_empty() && !index.contains(id) {
                self.findings.push(Finding::DanglingReference {
                    owner: owner.to_owned(),
                    field,
                    id: id.clone(),
                });
            }
        }
    }

    fn attributes(&mut self, owner: &str, resolver: &TacticalResolver<'_>, attributes: &[Attribute]) {
        for attribute in attributes {
            self.refs(
                owner,
                "value_object_ref",
                &resolver.value_objects,
                &attribute.value_object_ref,
            );
        }
    }

    fn tactical(&mut self, doc: &TacticalDocument) {
        let context = &doc.bounded_context;
        let resolver = TacticalResolver::new(context);
        self.duplicates(&resolver);

        for aggregate in &context.aggregates {
            let owner = format!("aggregate {}", aggregate.id);
            self.refs(&owner, "root_ref", &resolver.entities, slice::from_ref(&aggregate.root_ref));
            self.refs(&owner, "entities", &resolver.entities, &aggregate.entities);
            self.refs(&owner, "value_objects", &resolver.value_objects, &aggregate.value_objects);
        }
        for entity in &context.entities {
            self.attributes(&format!("entity {}", entity.id), &resolver, &entity.attributes);
        }
        for value_object in &context.value_objects {
            let owner = format!("value object {}", value_object.id);
            self.attributes(&owner, &resolver, &value_object.attributes);
        }
        for repository in &context.repositories {
            self.refs(
                &format!("repository {}", repository.id),
                "aggregate_ref",
                &resolver.aggregates,
                slice::from_ref(&repository.aggregate_ref),
            );
        }
        for event in &context.domain_events {
            self.refs(
                &format!("domain event {}", event.id),
                "aggregate_ref",
                &resolver.aggregates,
                slice::from_ref(&event.aggregate_ref),
            );
        }
        for service in &context.application_services {
            for operation in &service.operations {
                let owner = format!("application service {} / {}", service.id, operation.name);
                if let Some(boundary) = &operation.transaction_boundary {
                    self.refs(
                        &owner,
                        "modifies_aggregates",
                        &resolver.aggregates,
                        &boundary.modifies_aggregates,
                    );
                }
                if let Some(workflow) = &operation.workflow {
                    self.refs(&owner, "loads_aggregates", &resolver.aggregates, &workflow.loads_aggregates);
                    self.refs(
                        &owner,
                        "invokes_domain_services",
                        &resolver.domain_services,
                        &workflow.invokes_domain_services,
                    );
                    self.refs(&owner, "publishes_events", &resolver.domain_events, &workflow.publishes_events);
                }
            }
        }
        for interface in &context.command_interfaces {
            for record in &interface.command_records {
                let owner = format!("command interface {} / {}", interface.id, record.record_name);
                self.refs(&owner, "modifies_aggregate", &resolver.aggregates, &record.modifies_aggregate);
                self.refs(&owner, "publishes_events", &resolver.domain_events, &record.publishes_events);
            }
        }
    }

    // Mapping endpoints are not checked: they may name systems outside the document.
    fn strategic(&mut self, doc: &StrategicDocument) {
        let system = &doc.system;
        let resolver = StrategicResolver::new(system);
        self.duplicates(&resolver);

        for domain in &system.domains {
            self.refs(
                &format!("domain {}", domain.id),
                "bounded_contexts",
                &resolver.contexts,
                &domain.bounded_contexts,
            );
        }
        for context in &system.bounded_contexts {
            self.refs(
                &format!("bounded context {}", context.id),
                "domain_ref",
                &resolver.domains,
                slice::from_ref(&context.domain_ref),
            );
        }
        for scope in &system.bff_scopes {
            self.refs(
                &format!("bff scope {}", scope.id),
                "aggregates_from_contexts",
                &resolver.contexts,
                &scope.aggregates_from_contexts,
            );
        }
        for interface in &system.bff_interfaces {
            let owner = format!("bff interface {}", interface.id);
            self.refs(&owner, "bff_scope_ref", &resolver.bff_scopes, slice::from_ref(&interface.bff_scope_ref));
            self.refs(
                &owner,
                "primary_bounded_context_ref",
                &resolver.contexts,
                slice::from_ref(&interface.primary_bounded_context_ref),
            );
            self.refs(
                &owner,
                "additional_context_refs",
                &resolver.contexts,
                &interface.additional_context_refs,
            );
        }
    }

    fn data_eng(&mut self, doc: &DataEngDocument) {
        let resolver = DataEngResolver::new(doc);
        self.duplicates(&resolver);

        self.refs(
            &format!("system {}", doc.system.id),
            "domains",
            &resolver.domains,
            &doc.system.domains,
        );
        for domain in &doc.domains {
            self.refs(&format!("domain {}", domain.id), "pipelines", &resolver.pipelines, &domain.pipelines);
        }
        for pipeline in &doc.pipelines {
            let stages = Index::build("stage", &pipeline.stages);
            for duplicate in stages.duplicates() {
                self.findings.push(Finding::DuplicateId {
                    category: stages.category(),
                    id: format!("{}/{duplicate}", pipeline.id),
                });
            }
            for stage in &pipeline.stages {
                let owner = format!("stage {}/{}", pipeline.id, stage.id);
                self.refs(&owner, "inputs", &resolver.datasets, &stage.inputs);
                self.refs(&owner, "outputs", &resolver.datasets, &stage.outputs);
                self.refs(&owner, "depends_on", &stages, &stage.depends_on);
            }
        }
        for contract in &doc.contracts {
            self.refs(
                &format!("contract {}", contract.id),
                "dataset",
                &resolver.datasets,
                slice::from_ref(&contract.dataset),
            );
        }
        for check in &doc.checks {
            self.refs(
                &format!("check {}", check.id),
                "dataset",
                &resolver.datasets,
                slice::from_ref(&check.dataset),
            );
        }
        for edge in &doc.lineage {
            let owner = format!("lineage {} -> {}", edge.upstream, edge.downstream);
            self.refs(&owner, "upstream", &resolver.datasets, slice::from_ref(&edge.upstream));
            self.refs(&owner, "downstream", &resolver.datasets, slice::from_ref(&edge.downstream));
        }
        let governance = &doc.governance;
        let governed = governance
            .retention
            .iter()
            .map(|r| ("retention", &r.dataset))
            .chain(governance.access.iter().map(|a| ("access", &a.dataset)))
            .chain(governance.pii_handling.iter().map(|p| ("pii_handling", &p.dataset)));
        for (rule, dataset) in governed {
            self.refs(
                &format!("governance {rule}"),
                "dataset",
                &resolver.datasets,
                slice::from_ref(dataset),
            );
        }
    }

    fn stories(&mut self, doc: &StoriesDocument) {
        let stories: Vec<&Story> = doc.stories().collect();
        let index = Index::build("domain story", stories.iter().copied());
        for id in index.duplicates() {
            self.findings.push(Finding::DuplicateId {
                category: index.category(),
                id: (*id).to_owned(),
            });
        }
        for story in stories {
            self.conventions(story);
            self.story(story);
        }
    }

    fn conventions(&mut self, story: &Story) {
        let mut report = |rule| {
            self.findings.push(Finding::Convention {
                story: story.anchor().to_owned(),
                rule,
            });
        };
        if story.domain_story_id.is_empty() {
            report("domain_story_id is missing");
        } else if !story.domain_story_id.starts_with("dst_") {
            report("domain_story_id should start with 'dst_'");
        }
        if story.title.is_empty() {
            report("title is missing");
        }
    }

    fn story(&mut self, story: &Story) {
        let resolver = StoryResolver::new(story);
        self.duplicates(&resolver);

        let story_id = story.anchor();
        for command in &story.commands {
            let owner = format!("{story_id}: command {}", command.command_id);
            self.refs(&owner, "actor_ids", &resolver.actors, &command.actor_ids);
            self.refs(
                &owner,
                "target_aggregate_id",
                &resolver.aggregates,
                &command.target_aggregate_id,
            );
            self.refs(&owner, "emits_events", &resolver.events, &command.emits_events);
        }
        for event in &story.events {
            let owner = format!("{story_id}: event {}", event.event_id);
            self.refs(&owner, "caused_by.command_id", &resolver.commands, &event.caused_by.command_id);
            self.refs(&owner, "policies_triggered", &resolver.policies, &event.policies_triggered);
        }
        for policy in &story.policies {
            let owner = format!("{story_id}: policy {}", policy.policy_id);
            self.refs(&owner, "when_event_id", &resolver.events, slice::from_ref(&policy.when_event_id));
            self.refs(&owner, "issues_command_id", &resolver.commands, &policy.issues_command_id);
        }
    }
}
