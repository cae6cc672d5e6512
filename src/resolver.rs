// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Id → entity indexes, built once per document and read-only afterwards.
//!
//! [`Index`] is the building block: one per entity category. Each document
//! kind has a resolver bundling the indexes it needs with the "children of"
//! queries its renderer asks. Two rules hold throughout:
//!
//! - Duplicate ids: the later definition wins, with a warning. The shadowed
//!   ids are kept so a document check can report them.
//! - Dangling ids: structural queries ([`Index::children_of`]) drop them,
//!   while [`Index::reference`] keeps the raw id as plain text.

use crate::markdown::{humanize, link};
use crate::model::data_eng::{DataEngDocument, Pipeline};
use crate::model::stories::Story;
use crate::model::{Identified, data_eng, stories, strategic, tactical};
use log::{debug, warn};
use std::collections::HashMap;

/// Index of one entity category.
#[derive(Debug)]
pub struct Index<'a, T> {
    category: &'static str,
    by_id: HashMap<&'a str, &'a T>,
    duplicates: Vec<&'a str>,
}

impl<'a, T: Identified> Index<'a, T> {
    /// Indexes `items` by id. Entities without an id are left out.
    pub fn build(category: &'static str, items: impl IntoIterator<Item = &'a T>) -> Self {
        let mut by_id = HashMap::new();
        let mut duplicates = Vec::new();
        for item in items {
            let id = item.id();
            if id.is_empty() {
                continue;
            }
            if by_id.insert(id, item).is_some() {
                warn!(category, id; "duplicate id, later definition wins");
                duplicates.push(id);
            }
        }
        Self {
            category,
            by_id,
            duplicates,
        }
    }

    /// The entity with this id, if any.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&'a T> {
        self.by_id.get(id).copied()
    }

    /// Whether an entity with this id exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Resolves an ordered id list, dropping ids that do not resolve.
    pub fn children_of<'b, I>(&self, ids: I) -> Vec<&'a T>
    where
        I: IntoIterator<Item = &'b String>,
    {
        ids.into_iter().filter_map(|id| self.get(id)).collect()
    }

    /// A link labelled with the humanized name when `id` resolves, otherwise
    /// the raw id as plain text.
    #[must_use]
    pub fn reference(&self, id: &str) -> String {
        match self.get(id) {
            Some(item) => link(id, &humanize(item.name())),
            None => {
                if !id.is_empty() {
                    debug!(category = self.category, id; "dangling reference");
                }
                id.to_owned()
            }
        }
    }

    /// Display name for `id`: the entity's name, or the id itself.
    #[must_use]
    pub fn name_of<'s>(&self, id: &'s str) -> &'s str
    where
        'a: 's,
    {
        self.get(id)
            .map(Identified::name)
            .filter(|name| !name.is_empty())
            .unwrap_or(id)
    }

    /// Category name used in log and lint messages.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        self.category
    }

    /// Number of distinct ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether no id was indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Ids defined more than once, once per extra definition.
    #[must_use]
    pub fn duplicates(&self) -> &[&'a str] {
        &self.duplicates
    }
}

/// Duplicate ids across a resolver's indexes, as `(category, id)`.
pub trait Duplicates {
    /// Every extra definition of an id, in index order.
    fn duplicates(&self) -> Vec<(&'static str, String)>;
}

macro_rules! collect_duplicates {
    ($self:ident: $($index:ident),+) => {{
        let mut found = Vec::new();
        $(found.extend(
            $self.$index
                .duplicates()
                .iter()
                .map(|id| ($self.$index.category(), (*id).to_owned())),
        );)+
        found
    }};
}

/// Indexes for one bounded context.
#[derive(Debug)]
pub struct TacticalResolver<'a> {
    /// Entities by id.
    pub entities: Index<'a, tactical::Entity>,
    /// Value objects by id.
    pub value_objects: Index<'a, tactical::ValueObject>,
    /// Aggregates by id.
    pub aggregates: Index<'a, tactical::Aggregate>,
    /// Repositories by id.
    pub repositories: Index<'a, tactical::Repository>,
    /// Domain services by id.
    pub domain_services: Index<'a, tactical::DomainService>,
    /// Application services by id.
    pub application_services: Index<'a, tactical::ApplicationService>,
    /// Domain events by id.
    pub domain_events: Index<'a, tactical::DomainEvent>,
    /// Command interfaces by id.
    pub command_interfaces: Index<'a, tactical::CommandInterface>,
    /// Query interfaces by id.
    pub query_interfaces: Index<'a, tactical::QueryInterface>,
}

impl<'a> TacticalResolver<'a> {
    /// Indexes every building block of the context.
    #[must_use]
    pub fn new(context: &'a tactical::BoundedContext) -> Self {
        Self {
            entities: Index::build("entity", &context.entities),
            value_objects: Index::build("value object", &context.value_objects),
            aggregates: Index::build("aggregate", &context.aggregates),
            repositories: Index::build("repository", &context.repositories),
            domain_services: Index::build("domain service", &context.domain_services),
            application_services: Index::build(
                "application service",
                &context.application_services,
            ),
            domain_events: Index::build("domain event", &context.domain_events),
            command_interfaces: Index::build("command interface", &context.command_interfaces),
            query_interfaces: Index::build("query interface", &context.query_interfaces),
        }
    }

    /// Entities of an aggregate in declared order. A root named only by
    /// `root_ref` is put first.
    #[must_use]
    pub fn aggregate_entities(&self, aggregate: &tactical::Aggregate) -> Vec<&'a tactical::Entity> {
        let mut members = self.entities.children_of(&aggregate.entities);
        if let Some(root) = self.entities.get(&aggregate.root_ref)
            && !aggregate.entities.contains(&aggregate.root_ref)
        {
            members.insert(0, root);
        }
        members
    }

    /// Value objects of an aggregate in declared order; unknown ids dropped.
    #[must_use]
    pub fn aggregate_value_objects(
        &self,
        aggregate: &tactical::Aggregate,
    ) -> Vec<&'a tactical::ValueObject> {
        self.value_objects.children_of(&aggregate.value_objects)
    }
}

impl Duplicates for TacticalResolver<'_> {
    fn duplicates(&self) -> Vec<(&'static str, String)> {
        collect_duplicates!(self: entities, value_objects, aggregates, repositories,
            domain_services, application_services, domain_events, command_interfaces,
            query_interfaces)
    }
}

/// Indexes for a strategic system.
#[derive(Debug)]
pub struct StrategicResolver<'a> {
    system: &'a strategic::System,
    /// Domains by id.
    pub domains: Index<'a, strategic::Domain>,
    /// Bounded contexts by id.
    pub contexts: Index<'a, strategic::BoundedContext>,
    /// BFF scopes by id.
    pub bff_scopes: Index<'a, strategic::BffScope>,
    /// BFF interfaces by id.
    pub bff_interfaces: Index<'a, strategic::BffInterface>,
    /// Context mappings by id.
    pub context_mappings: Index<'a, strategic::ContextMapping>,
}

impl<'a> StrategicResolver<'a> {
    /// Indexes every entity list of the system.
    #[must_use]
    pub fn new(system: &'a strategic::System) -> Self {
        Self {
            system,
            domains: Index::build("domain", &system.domains),
            contexts: Index::build("bounded context", &system.bounded_contexts),
            bff_scopes: Index::build("bff scope", &system.bff_scopes),
            bff_interfaces: Index::build("bff interface", &system.bff_interfaces),
            context_mappings: Index::build("context mapping", &system.context_mappings),
        }
    }

    /// Bounded contexts a domain lists, in its order; unknown ids dropped.
    #[must_use]
    pub fn contexts_for_domain(&self, domain_id: &str) -> Vec<&'a strategic::BoundedContext> {
        self.domains
            .get(domain_id)
            .map(|domain| self.contexts.children_of(&domain.bounded_contexts))
            .unwrap_or_default()
    }

    /// Interfaces that name `scope_id` as their scope, in document order.
    #[must_use]
    pub fn interfaces_for_scope(&self, scope_id: &str) -> Vec<&'a strategic::BffInterface> {
        self.system
            .bff_interfaces
            .iter()
            .filter(|interface| interface.bff_scope_ref == scope_id)
            .collect()
    }

    /// The domain owning a context, via the context's `domain_ref`.
    #[must_use]
    pub fn domain_of_context(&self, context_id: &str) -> Option<&'a strategic::Domain> {
        self.contexts
            .get(context_id)
            .and_then(|context| self.domains.get(&context.domain_ref))
    }
}

impl Duplicates for StrategicResolver<'_> {
    fn duplicates(&self) -> Vec<(&'static str, String)> {
        collect_duplicates!(self: domains, contexts, bff_scopes, bff_interfaces, context_mappings)
    }
}

/// Indexes for a data engineering document.
#[derive(Debug)]
pub struct DataEngResolver<'a> {
    document: &'a DataEngDocument,
    /// Domains by id.
    pub domains: Index<'a, data_eng::Domain>,
    /// Pipelines by id.
    pub pipelines: Index<'a, Pipeline>,
    /// Datasets by id.
    pub datasets: Index<'a, data_eng::Dataset>,
    /// Contracts by id.
    pub contracts: Index<'a, data_eng::Contract>,
    /// Checks by id.
    pub checks: Index<'a, data_eng::Check>,
}

impl<'a> DataEngResolver<'a> {
    /// Indexes every entity list of the document.
    #[must_use]
    pub fn new(document: &'a DataEngDocument) -> Self {
        Self {
            document,
            domains: Index::build("domain", &document.domains),
            pipelines: Index::build("pipeline", &document.pipelines),
            datasets: Index::build("dataset", &document.datasets),
            contracts: Index::build("contract", &document.contracts),
            checks: Index::build("check", &document.checks),
        }
    }

    /// Domains the system header lists, in its order; unknown ids dropped.
    #[must_use]
    pub fn system_domains(&self) -> Vec<&'a data_eng::Domain> {
        self.domains.children_of(&self.document.system.domains)
    }

    /// Pipelines a domain lists, in its order; unknown ids dropped.
    #[must_use]
    pub fn pipelines_for_domain(&self, domain: &data_eng::Domain) -> Vec<&'a Pipeline> {
        self.pipelines.children_of(&domain.pipelines)
    }

    /// Pipeline ids across all system domains, in order, dangling ids kept.
    #[must_use]
    pub fn system_pipeline_ids(&self) -> Vec<&'a String> {
        self.system_domains()
            .into_iter()
            .flat_map(|domain| &domain.pipelines)
            .collect()
    }

    /// Dataset ids by how often stages read or write them, most first.
    /// Equal counts keep first-seen order.
    #[must_use]
    pub fn datasets_by_references(&self) -> Vec<(&'a str, usize)> {
        let mut counts: Vec<(&'a str, usize)> = Vec::new();
        let ids = self
            .document
            .pipelines
            .iter()
            .flat_map(|p| &p.stages)
            .flat_map(|s| s.inputs.iter().chain(&s.outputs));
        for id in ids {
            match counts.iter_mut().find(|(seen, _)| *seen == id.as_str()) {
                Some((_, count)) => *count += 1,
                None => counts.push((id.as_str(), 1)),
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }

    /// Contracts attached to a dataset.
    #[must_use]
    pub fn contracts_for_dataset(&self, dataset_id: &str) -> Vec<&'a data_eng::Contract> {
        self.document
            .contracts
            .iter()
            .filter(|c| c.dataset == dataset_id)
            .collect()
    }

    /// Checks attached to a dataset.
    #[must_use]
    pub fn checks_for_dataset(&self, dataset_id: &str) -> Vec<&'a data_eng::Check> {
        self.document
            .checks
            .iter()
            .filter(|c| c.dataset == dataset_id)
            .collect()
    }
}

impl Duplicates for DataEngResolver<'_> {
    fn duplicates(&self) -> Vec<(&'static str, String)> {
        collect_duplicates!(self: domains, pipelines, datasets, contracts, checks)
    }
}

/// Indexes for one story; stories do not share ids across each other.
#[derive(Debug)]
pub struct StoryResolver<'a> {
    /// Actors by id.
    pub actors: Index<'a, stories::Actor>,
    /// Aggregates by id.
    pub aggregates: Index<'a, stories::Aggregate>,
    /// Work objects by id.
    pub work_objects: Index<'a, stories::WorkObject>,
    /// Commands by id.
    pub commands: Index<'a, stories::Command>,
    /// Events by id.
    pub events: Index<'a, stories::Event>,
    /// Policies by id.
    pub policies: Index<'a, stories::Policy>,
}

impl<'a> StoryResolver<'a> {
    /// Indexes every entity list of the story.
    #[must_use]
    pub fn new(story: &'a Story) -> Self {
        Self {
            actors: Index::build("actor", &story.actors),
            aggregates: Index::build("aggregate", &story.aggregates),
            work_objects: Index::build("work object", &story.work_objects),
            commands: Index::build("command", &story.commands),
            events: Index::build("event", &story.events),
            policies: Index::build("policy", &story.policies),
        }
    }
}

impl Duplicates for StoryResolver<'_> {
    fn duplicates(&self) -> Vec<(&'static str, String)> {
        collect_duplicates!(self: actors, aggregates, work_objects, commands, events, policies)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tactical::{Aggregate, BoundedContext, Entity};

    fn entity(id: &str, name: &str) -> Entity {
        Entity {
            id: id.into(),
            name: name.into(),
            ..Entity::default()
        }
    }

    #[test]
    fn get_returns_the_indexed_entity() {
        let items = [entity("ent_a", "Order"), entity("ent_b", "Line")];
        let index = Index::build("entity", &items);
        assert_eq!(index.get("ent_b"), Some(&items[1]));
        assert_eq!(index.get("ent_c"), None);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn duplicate_ids_last_definition_wins() {
        let items = [entity("ent_a", "First"), entity("ent_a", "Second")];
        let index = Index::build("entity", &items);
        assert_eq!(index.get("ent_a").map(|e| e.name.as_str()), Some("Second"));
        assert_eq!(index.duplicates(), ["ent_a"]);
    }

    #[test]
    fn empty_ids_are_not_indexed() {
        let items = [entity("", "Anonymous")];
        let index = Index::build("entity", &items);
        assert!(index.is_empty());
    }

    #[test]
    fn children_of_drops_dangling_ids_and_keeps_order() {
        let items = [entity("ent_a", "A"), entity("ent_b", "B")];
        let index = Index::build("entity", &items);
        let ids = vec!["ent_b".to_owned(), "ent_x".to_owned(), "ent_a".to_owned()];
        let children: Vec<_> = index.children_of(&ids).iter().map(|e| e.id.as_str()).collect();
        assert_eq!(children, ["ent_b", "ent_a"]);
    }

    #[test]
    fn reference_links_known_and_keeps_unknown_raw() {
        let items = [entity("ent_a", "OrderLine")];
        let index = Index::build("entity", &items);
        assert_eq!(index.reference("ent_a"), "[Order Line](#ent_a)");
        assert_eq!(index.reference("ent_x"), "ent_x");
        assert_eq!(index.name_of("ent_a"), "OrderLine");
        assert_eq!(index.name_of("ent_x"), "ent_x");
    }

    #[test]
    fn empty_category_gives_empty_index() {
        let context = BoundedContext::default();
        let resolver = TacticalResolver::new(&context);
        assert!(resolver.aggregates.is_empty());
        assert!(resolver.duplicates().is_empty());
    }

    #[test]
    fn aggregate_children_resolve_in_declared_order() {
        let context = BoundedContext {
            entities: vec![entity("ent_a", "A"), entity("ent_b", "B")],
            aggregates: vec![Aggregate {
                id: "agg".into(),
                entities: vec!["ent_b".into(), "missing".into(), "ent_a".into()],
                ..Aggregate::default()
            }],
            ..BoundedContext::default()
        };
        let resolver = TacticalResolver::new(&context);
        let names: Vec<_> = resolver
            .aggregate_entities(&context.aggregates[0])
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["B", "A"]);
    }

    #[test]
    fn aggregate_root_joins_its_entities() {
        let context = BoundedContext {
            entities: vec![entity("ent_root", "Root"), entity("ent_line", "Line")],
            aggregates: vec![
                Aggregate {
                    id: "agg_only_root".into(),
                    root_ref: "ent_root".into(),
                    entities: vec!["ent_line".into()],
                    ..Aggregate::default()
                },
                Aggregate {
                    id: "agg_listed".into(),
                    root_ref: "ent_root".into(),
                    entities: vec!["ent_line".into(), "ent_root".into()],
                    ..Aggregate::default()
                },
                Aggregate {
                    id: "agg_dangling_root".into(),
                    root_ref: "ent_gone".into(),
                    ..Aggregate::default()
                },
            ],
            ..BoundedContext::default()
        };
        let resolver = TacticalResolver::new(&context);
        let names = |i: usize| -> Vec<&str> {
            resolver
                .aggregate_entities(&context.aggregates[i])
                .iter()
                .map(|e| e.name.as_str())
                .collect()
        };
        assert_eq!(names(0), ["Root", "Line"]);
        assert_eq!(names(1), ["Line", "Root"]);
        assert!(names(2).is_empty());
    }

    #[test]
    fn dataset_reference_counts_are_stable() {
        let document: DataEngDocument = serde_yaml::from_str(
            "
pipelines:
  - id: p1
    stages:
      - id: s1
        inputs: [ds-a, ds-b]
        outputs: [ds-c]
      - id: s2
        inputs: [ds-c, ds-b]
",
        )
        .unwrap();
        let resolver = DataEngResolver::new(&document);
        assert_eq!(
            resolver.datasets_by_references(),
            [("ds-b", 2), ("ds-c", 2), ("ds-a", 1)]
        );
    }

    #[test]
    fn contexts_for_domain_follow_domain_order() {
        let system: strategic::System = serde_yaml::from_str(
            "
domains:
  - id: dom_a
    bounded_contexts: [bc_2, bc_gone, bc_1]
bounded_contexts:
  - id: bc_1
    domain_ref: dom_a
  - id: bc_2
    domain_ref: dom_a
",
        )
        .unwrap();
        let resolver = StrategicResolver::new(&system);
        let ids: Vec<_> = resolver
            .contexts_for_domain("dom_a")
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, ["bc_2", "bc_1"]);
        assert!(resolver.contexts_for_domain("dom_x").is_empty());
        assert_eq!(
            resolver.domain_of_context("bc_1").map(|d| d.id.as_str()),
            Some("dom_a")
        );
    }
}
