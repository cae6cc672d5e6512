// SPDX-License-Identifier: GPL-3.0-only
// Copyright (C) 2025 Brian Hetro <whee@smaertness.net>

//! Typed records for the four document kinds.
//!
//! Every record declares its optional fields once, with their defaults, so
//! rendering never has to guess: a missing list is empty, a missing flag is
//! `false` (or `true` where the schema says so), a missing string is empty.
//! Scalar text fields accept numbers and booleans as well as strings, since
//! YAML authors write `version: 1.0` as often as `version: "1.0"`.

pub mod data_eng;
pub mod stories;
pub mod strategic;
pub mod tactical;

use crate::parser::scalar_text;
use serde::{Deserialize, Deserializer};
use serde_yaml::Value;

/// An entity with a stable, document-unique id.
pub trait Identified {
    /// The entity's id, used as index key and anchor.
    fn id(&self) -> &str;

    /// The authored name, possibly empty.
    fn name(&self) -> &str;
}

/// Implements [`Identified`] for records, naming their id and name fields.
macro_rules! identified {
    ($($ty:ty => ($id:ident, $name:ident)),+ $(,)?) => {
        $(impl $crate::model::Identified for $ty {
            fn id(&self) -> &str {
                &self.$id
            }

            fn name(&self) -> &str {
                &self.$name
            }
        })+
    };
}
pub(crate) use identified;

/// Deserializes any scalar as text; null, sequences and mappings become "".
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(scalar_text(&Value::deserialize(deserializer)?))
}

/// Like [`text`] but keeps absence and null distinct from "".
pub(crate) fn opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(scalar_text(&other)),
    })
}

/// Deserializes a list of scalars as text. A lone scalar is a one-item list;
/// null gives an empty list, and items without scalar text are dropped.
pub(crate) fn text_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let items = match Value::deserialize(deserializer)? {
        Value::Null => Vec::new(),
        Value::Sequence(items) => items,
        other => vec![other],
    };
    Ok(items
        .iter()
        .map(scalar_text)
        .filter(|item| !item.is_empty())
        .collect())
}

/// Deserializes YAML truthiness: `false`, null, 0, "" and empty collections
/// are false, everything else is true.
pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Sequence(seq) => !seq.is_empty(),
        Value::Mapping(map) => !map.is_empty(),
        Value::Tagged(_) => true,
    })
}

/// Default for flags that the schemas define as `true` when absent.
pub(crate) const fn yes() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize, Default)]
    #[serde(default)]
    struct Fields {
        #[serde(deserialize_with = "text")]
        version: String,
        #[serde(deserialize_with = "opt_text")]
        returns: Option<String>,
        #[serde(deserialize_with = "flag")]
        persists: bool,
        #[serde(default = "yes")]
        required: bool,
        #[serde(deserialize_with = "text_list")]
        refs: Vec<String>,
    }

    #[test]
    fn text_accepts_numbers() {
        let fields: Fields = serde_yaml::from_str("version: 1.5").unwrap();
        assert_eq!(fields.version, "1.5");
    }

    #[test]
    fn missing_fields_take_defaults() {
        let fields: Fields = serde_yaml::from_str("{}").unwrap();
        assert_eq!(fields.version, "");
        assert_eq!(fields.returns, None);
        assert!(!fields.persists);
        assert!(fields.required);
    }

    #[test]
    fn null_and_numeric_scalars_become_text() {
        let fields: Fields = serde_yaml::from_str("version:\nreturns: 7\nrefs: [ent_a, 42, ~]").unwrap();
        assert_eq!(fields.version, "");
        assert_eq!(fields.returns.as_deref(), Some("7"));
        assert_eq!(fields.refs, ["ent_a", "42"]);
    }

    #[test]
    fn text_list_accepts_a_lone_scalar() {
        let fields: Fields = serde_yaml::from_str("refs: ent_a").unwrap();
        assert_eq!(fields.refs, ["ent_a"]);
        let fields: Fields = serde_yaml::from_str("refs:").unwrap();
        assert!(fields.refs.is_empty());
    }

    #[test]
    fn flag_follows_truthiness() {
        let fields: Fields = serde_yaml::from_str("persists: [agg_a]").unwrap();
        assert!(fields.persists);
        let fields: Fields = serde_yaml::from_str("persists: []").unwrap();
        assert!(!fields.persists);
    }
}
