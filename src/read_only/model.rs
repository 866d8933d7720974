// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Models, the read-only capability and bootstrap from model definitions

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::config::ReadOnlyConfig;
use super::error::Result;
use super::filter::FieldFilter;
use super::hooks::{attach, Attachment, RemoteHooks};
use super::relation::{RelationDescriptor, RelationSettings};

/// Key of the mixin in a model definition's `mixins` section
pub const MIXIN_NAME: &str = "ReadOnly";

/// Optional read-only capability of a model.
///
/// Relation hooks delegate to the related model's filter only when it
/// reports one here.
pub trait ReadOnlyCapable: Send + Sync {
    fn model_name(&self) -> &str;

    fn read_only_filter(&self) -> Option<&FieldFilter> {
        None
    }
}

impl ReadOnlyCapable for FieldFilter {
    fn model_name(&self) -> &str {
        FieldFilter::model_name(self)
    }

    fn read_only_filter(&self) -> Option<&FieldFilter> {
        Some(self)
    }
}

/// A model without the ReadOnly mixin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainModel {
    name: String,
}

impl PlainModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl ReadOnlyCapable for PlainModel {
    fn model_name(&self) -> &str {
        &self.name
    }
}

/// Subset of a model definition document used by the mixin
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelSettings {
    pub name: String,
    #[serde(default)]
    pub relations: BTreeMap<String, RelationSettings>,
    #[serde(default)]
    pub mixins: BTreeMap<String, Value>,
}

impl ModelSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read-only configuration, or `None` when the mixin is not enabled
    pub fn read_only_config(&self) -> Result<Option<ReadOnlyConfig>> {
        match self.mixins.get(MIXIN_NAME) {
            None | Some(Value::Bool(false)) => Ok(None),
            Some(options) => ReadOnlyConfig::from_value(options).map(Some),
        }
    }

    pub fn field_filter(&self) -> Result<Option<FieldFilter>> {
        Ok(self
            .read_only_config()?
            .map(|config| FieldFilter::new(self.name.clone(), config)))
    }
}

/// Models known at bootstrap, by name
#[derive(Default)]
pub struct ModelRegistry {
    models: BTreeMap<String, Arc<dyn ReadOnlyCapable>>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, model: Arc<dyn ReadOnlyCapable>) {
        self.models.insert(model.model_name().to_string(), model);
    }

    /// Register a model from its definition, with or without the mixin
    pub fn register_settings(
        &mut self,
        settings: &ModelSettings,
    ) -> Result<Arc<dyn ReadOnlyCapable>> {
        let model: Arc<dyn ReadOnlyCapable> = match settings.field_filter()? {
            Some(filter) => Arc::new(filter),
            None => Arc::new(PlainModel::new(settings.name.clone())),
        };
        self.register(Arc::clone(&model));
        Ok(model)
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn ReadOnlyCapable>> {
        self.models.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Resolve the relations of a model definition against the registry.
    ///
    /// Targets that were never registered behave like models without the
    /// mixin.
    pub fn relations_for(&self, settings: &ModelSettings) -> Vec<RelationDescriptor> {
        settings
            .relations
            .iter()
            .map(|(name, relation)| {
                let target_name = relation.model.as_deref().unwrap_or(name);
                let target = self.get(target_name).unwrap_or_else(|| {
                    debug!(relation = %name, model = target_name, "related model not registered");
                    Arc::new(PlainModel::new(target_name))
                });
                RelationDescriptor::new(name.clone(), relation.kind.clone(), target)
            })
            .collect()
    }

    /// Install the mixin hooks of a registered model.
    ///
    /// Returns `None` for models that do not carry the mixin.
    pub fn attach_model<H>(&self, settings: &ModelSettings, hooks: &mut H) -> Option<Attachment>
    where
        H: RemoteHooks + ?Sized,
    {
        let model = self.get(&settings.name)?;
        if model.read_only_filter().is_none() {
            return None;
        }
        let relations = self.relations_for(settings);
        Some(attach(model, &relations, hooks))
    }
}
