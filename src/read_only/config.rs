// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Configuration types for the ReadOnly mixin

use std::collections::BTreeMap;
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::error::{ReadOnlyError, Result};

/// Write operations the mixin intercepts
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Operation {
    Create,
    Upsert,
    UpdateAttributes,
    UpdateAll,
    /// Update of a hasOne / embedsOne related singleton
    Update,
    /// Tag not known to the mixin; never matches an intercepted operation
    Other(String),
}

impl Operation {
    pub fn as_str(&self) -> &str {
        match self {
            Operation::Create => "create",
            Operation::Upsert => "upsert",
            Operation::UpdateAttributes => "updateAttributes",
            Operation::UpdateAll => "updateAll",
            Operation::Update => "update",
            Operation::Other(tag) => tag,
        }
    }
}

/// Parse a tag. The remote method name `prototype.updateAttributes` is
/// accepted as an alias of `updateAttributes`, so skip rules written
/// against the method name keep matching the instance update hook.
impl From<&str> for Operation {
    fn from(tag: &str) -> Self {
        match tag {
            "create" => Operation::Create,
            "upsert" => Operation::Upsert,
            "updateAttributes" | "prototype.updateAttributes" => Operation::UpdateAttributes,
            "updateAll" => Operation::UpdateAll,
            "update" => Operation::Update,
            other => Operation::Other(other.to_string()),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let tag = String::deserialize(deserializer)?;
        Ok(Operation::from(tag.as_str()))
    }
}

/// Rule attached to a single read-only field.
///
/// `skip` is always normalized to a list: `{ "skip": "create" }` and
/// `{ "skip": ["create"] }` produce the same rule. An empty skip list is
/// folded into `Always`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRule {
    /// Stripped from every intercepted write
    Always,
    /// Stripped except for the listed operations
    Skip(Vec<Operation>),
}

impl FieldRule {
    pub fn skip<I, O>(operations: I) -> Self
    where
        I: IntoIterator<Item = O>,
        O: Into<Operation>,
    {
        let operations: Vec<Operation> = operations.into_iter().map(Into::into).collect();
        if operations.is_empty() {
            FieldRule::Always
        } else {
            FieldRule::Skip(operations)
        }
    }

    /// True when the field must be left untouched for `operation`
    pub fn skips(&self, operation: &Operation) -> bool {
        match self {
            FieldRule::Always => false,
            FieldRule::Skip(operations) => operations.contains(operation),
        }
    }

    /// Build a rule from a mixin option value.
    ///
    /// Any non-object value (`true`, `false`, numbers...) means the field is
    /// always stripped. Objects are inspected for a `skip` key holding a tag
    /// or a list of tags.
    pub fn from_value(value: &Value) -> Result<Self> {
        let Value::Object(rule) = value else {
            return Ok(FieldRule::Always);
        };

        match rule.get("skip") {
            None | Some(Value::Null) => Ok(FieldRule::Always),
            Some(Value::String(tag)) => Ok(FieldRule::skip([tag.as_str()])),
            Some(Value::Array(tags)) => {
                let tags = tags
                    .iter()
                    .map(|tag| {
                        tag.as_str().map(Operation::from).ok_or_else(|| {
                            ReadOnlyError::InvalidConfig(format!(
                                "skip entries must be operation names, got {}",
                                tag
                            ))
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(FieldRule::skip(tags))
            }
            Some(other) => Err(ReadOnlyError::InvalidConfig(format!(
                "skip must be an operation name or a list of names, got {}",
                other
            ))),
        }
    }
}

impl Serialize for FieldRule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct SkipRule<'a> {
            skip: &'a [Operation],
        }

        match self {
            FieldRule::Always => serializer.serialize_bool(true),
            FieldRule::Skip(operations) => SkipRule { skip: operations }.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for FieldRule {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        FieldRule::from_value(&value).map_err(D::Error::custom)
    }
}

/// Read-only field configuration of one model.
///
/// An empty configuration marks the whole model read-only: every
/// intercepted write is rejected instead of filtered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReadOnlyConfig {
    fields: BTreeMap<String, FieldRule>,
}

impl<'de> Deserialize<'de> for ReadOnlyConfig {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        ReadOnlyConfig::from_value(&value).map_err(D::Error::custom)
    }
}

impl ReadOnlyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field, replacing any previous rule for it
    pub fn with_field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.fields.insert(name.into(), rule);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn rule(&self, field: &str) -> Option<&FieldRule> {
        self.fields.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.fields.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    /// Parse mixin options given as a JSON value.
    ///
    /// `true` is accepted as shorthand for `{}` (fully read-only model),
    /// matching how model definitions enable a mixin without options.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(true) | Value::Null => Ok(Self::default()),
            Value::Object(options) => {
                let mut config = Self::default();
                for (name, setting) in options {
                    config
                        .fields
                        .insert(name.clone(), FieldRule::from_value(setting)?);
                }
                Ok(config)
            }
            other => Err(ReadOnlyError::InvalidConfig(format!(
                "mixin options must be an object, got {}",
                other
            ))),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Extract configuration from Python dict
    #[cfg(feature = "python")]
    pub fn from_py_dict(dict: &pyo3::Bound<'_, pyo3::types::PyDict>) -> pyo3::PyResult<Self> {
        use pyo3::exceptions::PyValueError;
        use pyo3::prelude::*;
        use pyo3::types::{PyDict, PyList, PyTuple};

        let mut config = Self::default();

        for (key, setting) in dict.iter() {
            let name: String = key.extract()?;

            let rule = match setting.downcast::<PyDict>() {
                Ok(rule_dict) => match rule_dict.get_item("skip")? {
                    None => FieldRule::Always,
                    Some(skip) if skip.is_none() => FieldRule::Always,
                    Some(skip) => {
                        if let Ok(tag) = skip.extract::<String>() {
                            FieldRule::skip([tag.as_str()])
                        } else if skip.downcast::<PyList>().is_ok()
                            || skip.downcast::<PyTuple>().is_ok()
                        {
                            let tags: Vec<String> = skip.extract().map_err(|_| {
                                PyValueError::new_err(format!(
                                    "skip entries for '{}' must be operation names",
                                    name
                                ))
                            })?;
                            FieldRule::skip(tags.iter().map(String::as_str))
                        } else {
                            return Err(PyValueError::new_err(format!(
                                "skip for '{}' must be an operation name or a list of names",
                                name
                            )));
                        }
                    }
                },
                Err(_) => FieldRule::Always,
            };

            config.fields.insert(name, rule);
        }

        Ok(config)
    }
}

impl<K: Into<String>> FromIterator<(K, FieldRule)> for ReadOnlyConfig {
    fn from_iter<T: IntoIterator<Item = (K, FieldRule)>>(iter: T) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(name, rule)| (name.into(), rule))
                .collect(),
        }
    }
}
