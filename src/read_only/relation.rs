// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Relation descriptors read from model settings

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::model::ReadOnlyCapable;

/// Relation types a model definition can declare
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RelationKind {
    BelongsTo,
    HasMany,
    HasAndBelongsToMany,
    HasOne,
    EmbedsOne,
    EmbedsMany,
    ReferencesMany,
    Other(String),
}

/// How nested endpoints of a relation expose the related model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationStyle {
    /// `__create__` / `__updateById__` on a related collection
    Collection,
    /// `__create__` / `__update__` on a related singleton
    Singleton,
}

impl RelationKind {
    pub fn as_str(&self) -> &str {
        match self {
            RelationKind::BelongsTo => "belongsTo",
            RelationKind::HasMany => "hasMany",
            RelationKind::HasAndBelongsToMany => "hasAndBelongsToMany",
            RelationKind::HasOne => "hasOne",
            RelationKind::EmbedsOne => "embedsOne",
            RelationKind::EmbedsMany => "embedsMany",
            RelationKind::ReferencesMany => "referencesMany",
            RelationKind::Other(kind) => kind,
        }
    }

    /// Nested endpoint style, or `None` when read-only filtering is not
    /// extended to this kind of relation
    pub fn style(&self) -> Option<RelationStyle> {
        match self {
            RelationKind::HasMany | RelationKind::EmbedsMany => Some(RelationStyle::Collection),
            RelationKind::HasOne | RelationKind::EmbedsOne => Some(RelationStyle::Singleton),
            _ => None,
        }
    }
}

impl From<&str> for RelationKind {
    fn from(kind: &str) -> Self {
        match kind {
            "belongsTo" => RelationKind::BelongsTo,
            "hasMany" => RelationKind::HasMany,
            "hasAndBelongsToMany" => RelationKind::HasAndBelongsToMany,
            "hasOne" => RelationKind::HasOne,
            "embedsOne" => RelationKind::EmbedsOne,
            "embedsMany" => RelationKind::EmbedsMany,
            "referencesMany" => RelationKind::ReferencesMany,
            other => RelationKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RelationKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for RelationKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let kind = String::deserialize(deserializer)?;
        Ok(RelationKind::from(kind.as_str()))
    }
}

/// One entry of a model definition's `relations` section.
/// Keys other than `type` and `model` are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSettings {
    #[serde(rename = "type")]
    pub kind: RelationKind,
    /// Name of the related model
    #[serde(default)]
    pub model: Option<String>,
}

/// A declared relation with its resolved target model
#[derive(Clone)]
pub struct RelationDescriptor {
    pub name: String,
    pub kind: RelationKind,
    pub target: Arc<dyn ReadOnlyCapable>,
}

impl RelationDescriptor {
    pub fn new(
        name: impl Into<String>,
        kind: impl Into<RelationKind>,
        target: Arc<dyn ReadOnlyCapable>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            target,
        }
    }
}

impl fmt::Debug for RelationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationDescriptor")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("target", &self.target.model_name())
            .finish()
    }
}
