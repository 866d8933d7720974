// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Field filter: strips read-only properties from incoming write payloads

use serde_json::{Map, Value};
use tracing::debug;

use super::config::{Operation, ReadOnlyConfig};
use super::error::{ReadOnlyError, Result};

/// Where an intercepted remote method carries its write payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadShape {
    /// Raw request body of a collection-level method (`create`, `updateAll`, ...)
    RequestBody,
    /// The `data` argument of an instance-level method (nested relation endpoints)
    DataArgument,
}

impl PayloadShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayloadShape::RequestBody => "body",
            PayloadShape::DataArgument => "data",
        }
    }
}

/// Read-only field filter bound to one model.
///
/// Immutable once built, so a single instance can be shared by every hook
/// and request thread.
#[derive(Debug, Clone)]
pub struct FieldFilter {
    model: String,
    config: ReadOnlyConfig,
}

impl FieldFilter {
    pub fn new(model: impl Into<String>, config: ReadOnlyConfig) -> Self {
        let model = model.into();
        debug!(model = %model, "ReadOnly mixin applied");
        Self { model, config }
    }

    pub fn model_name(&self) -> &str {
        &self.model
    }

    pub fn config(&self) -> &ReadOnlyConfig {
        &self.config
    }

    /// No field list means the entire model is read-only
    pub fn is_fully_read_only(&self) -> bool {
        self.config.is_empty()
    }

    /// Reject the write outright when the model is fully read-only
    pub fn check_writable(&self) -> Result<()> {
        if self.is_fully_read_only() {
            debug!(model = %self.model, "rejecting write on read-only model");
            return Err(ReadOnlyError::forbidden(&self.model));
        }
        Ok(())
    }

    /// Fields that must be removed from a payload for `operation`
    pub fn stripped_fields<'a>(
        &'a self,
        operation: &'a Operation,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.config.iter().filter_map(move |(field, rule)| {
            if rule.skips(operation) {
                debug!(
                    model = %self.model,
                    field,
                    %operation,
                    "read only property is marked as skipped"
                );
                None
            } else {
                Some(field)
            }
        })
    }

    /// Remove read-only fields from one record, returning how many were present
    pub fn strip_object(&self, record: &mut Map<String, Value>, operation: &Operation) -> usize {
        let mut removed = 0;
        for field in self.stripped_fields(operation) {
            if record.remove(field).is_some() {
                debug!(model = %self.model, field, "property is read only, removing incoming data");
                removed += 1;
            }
        }
        removed
    }

    /// Filter a payload in place.
    ///
    /// A single object and every object of a list are filtered the same way;
    /// list length and order never change. Non-object list entries and scalar
    /// payloads carry no fields and are left alone. `None` and `null` count as
    /// an absent payload, which still fails on a fully read-only model.
    pub fn strip(&self, payload: Option<&mut Value>, operation: &Operation) -> Result<()> {
        self.check_writable()?;

        let Some(payload) = payload else {
            return Ok(());
        };

        debug!(
            model = %self.model,
            %operation,
            properties = self.config.len(),
            "stripping read only properties"
        );

        match payload {
            Value::Object(record) => {
                self.strip_object(record, operation);
            }
            Value::Array(records) => {
                for record in records.iter_mut() {
                    if let Value::Object(record) = record {
                        self.strip_object(record, operation);
                    }
                }
            }
            _ => {}
        }

        Ok(())
    }
}
