// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Domain stories: narrative scenarios of actors issuing commands that emit
//! events, which trigger policies that issue further commands.

use super::{flag, identified, opt_text, text, text_list};
use serde::Deserialize;

/// Root of a stories document. Both list keys may hold stories; a single
/// `domain_story` is appended after the lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoriesDocument {
    /// Model version, if given.
    #[serde(deserialize_with = "opt_text")]
    pub version: Option<String>,
    /// Stories under `domain_stories:`.
    pub domain_stories: Vec<Story>,
    /// Stories under `stories:`.
    pub stories: Vec<Story>,
    /// A lone story under `domain_story:`.
    pub domain_story: Option<Story>,
}

impl StoriesDocument {
    /// All stories in authoring order: `domain_stories`, then `stories`,
    /// then `domain_story`.
    pub fn stories(&self) -> impl Iterator<Item = &Story> {
        self.domain_stories
            .iter()
            .chain(&self.stories)
            .chain(&self.domain_story)
    }
}

/// One narrative scenario and the building blocks it mentions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Story {
    /// Story id, by convention prefixed `dst_`.
    #[serde(deserialize_with = "text")]
    pub domain_story_id: String,
    /// Display title.
    #[serde(deserialize_with = "text")]
    pub title: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Free-form tags, indexed at the top of the document.
    #[serde(deserialize_with = "text_list")]
    pub tags: Vec<String>,
    /// People and systems taking part.
    pub actors: Vec<Actor>,
    /// Things the actors work with.
    pub work_objects: Vec<WorkObject>,
    /// Aggregates commands are sent to.
    pub aggregates: Vec<Aggregate>,
    /// Commands in story order.
    pub commands: Vec<Command>,
    /// Events in story order.
    pub events: Vec<Event>,
    /// Reactions from events to commands.
    pub policies: Vec<Policy>,
}

impl Story {
    /// Story id, `unknown` when left out.
    #[must_use]
    pub fn anchor(&self) -> &str {
        if self.domain_story_id.is_empty() {
            "unknown"
        } else {
            &self.domain_story_id
        }
    }

    /// Title, `Untitled` when left out.
    #[must_use]
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }
}

/// A person or system taking part in a story.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Actor {
    /// Actor id, by convention prefixed `act_`.
    #[serde(deserialize_with = "text")]
    pub actor_id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// `person`, `system` and the like.
    #[serde(deserialize_with = "text")]
    pub kind: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
}

impl Actor {
    /// Participant name in sequence diagrams: the id without its `act_` prefix.
    #[must_use]
    pub fn short_id(&self) -> &str {
        short_actor(&self.actor_id)
    }
}

pub(crate) fn short_actor(id: &str) -> &str {
    id.strip_prefix("act_").unwrap_or(id)
}

/// A thing actors work with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorkObject {
    /// Work object id.
    #[serde(deserialize_with = "text")]
    pub work_object_id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Attributes in declared order.
    pub attributes: Vec<WorkObjectAttribute>,
}

/// A typed attribute of a work object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WorkObjectAttribute {
    /// Attribute name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Declared type (`type:`).
    #[serde(rename = "type", deserialize_with = "text")]
    pub ty: String,
    /// Whether a value must be present.
    #[serde(deserialize_with = "flag")]
    pub required: bool,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
}

/// An aggregate receiving commands in a story.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Aggregate {
    /// Aggregate id.
    #[serde(deserialize_with = "text")]
    pub aggregate_id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Rules that always hold.
    #[serde(deserialize_with = "text_list")]
    pub invariants: Vec<String>,
}

/// A request an actor sends to an aggregate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Command {
    /// Command id.
    #[serde(deserialize_with = "text")]
    pub command_id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// Ids of the actors issuing it.
    #[serde(deserialize_with = "text_list")]
    pub actor_ids: Vec<String>,
    /// Id of the receiving aggregate, if any.
    #[serde(deserialize_with = "opt_text")]
    pub target_aggregate_id: Option<String>,
    /// Ids of the events it produces.
    #[serde(deserialize_with = "text_list")]
    pub emits_events: Vec<String>,
}

/// Something that happened in a story.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Event {
    /// Event id.
    #[serde(deserialize_with = "text")]
    pub event_id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Free-form description.
    #[serde(deserialize_with = "text")]
    pub description: String,
    /// What produced the event.
    pub caused_by: CausedBy,
    /// Ids of the policies it triggers.
    #[serde(deserialize_with = "text_list")]
    pub policies_triggered: Vec<String>,
}

/// What produced an event: a command, or an activity outside the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CausedBy {
    /// Producing command id.
    #[serde(deserialize_with = "opt_text")]
    pub command_id: Option<String>,
    /// Producing activity id, for events with no command.
    #[serde(deserialize_with = "opt_text")]
    pub activity_id: Option<String>,
}

impl CausedBy {
    /// The command id if given, otherwise the activity id, otherwise "".
    #[must_use]
    pub fn source(&self) -> &str {
        self.command_id
            .as_deref()
            .or(self.activity_id.as_deref())
            .unwrap_or_default()
    }
}

/// A rule issuing a command when an event happens.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Policy {
    /// Policy id.
    #[serde(deserialize_with = "text")]
    pub policy_id: String,
    /// Display name.
    #[serde(deserialize_with = "text")]
    pub name: String,
    /// Id of the triggering event.
    #[serde(deserialize_with = "text")]
    pub when_event_id: String,
    /// Id of the issued command, if any.
    #[serde(deserialize_with = "opt_text")]
    pub issues_command_id: Option<String>,
}

identified! {
    Story => (domain_story_id, title),
    Actor => (actor_id, name),
    WorkObject => (work_object_id, name),
    Aggregate => (aggregate_id, name),
    Command => (command_id, name),
    Event => (event_id, name),
    Policy => (policy_id, name),
}
