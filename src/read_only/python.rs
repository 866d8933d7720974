// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// PyO3 bindings for the ReadOnly field filter

use std::sync::Arc;

use pyo3::exceptions::{PyPermissionError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};
use tracing::debug;

use super::config::{Operation, ReadOnlyConfig};
use super::error::ReadOnlyError;
use super::filter::FieldFilter;
use super::hooks::plan_hooks;
use super::relation::RelationKind;

pyo3::create_exception!(
    readonly_mixin,
    ForbiddenError,
    PyPermissionError,
    "Write rejected by a fully read-only model. Carries `status_code`."
);

fn to_py_err(py: Python<'_>, err: ReadOnlyError) -> PyErr {
    match err {
        ReadOnlyError::InvalidConfig(msg) => {
            PyValueError::new_err(format!("Invalid config: {}", msg))
        }
        forbidden => {
            let status = forbidden.status_code();
            let py_err = ForbiddenError::new_err(forbidden.to_string());
            if let Err(e) = py_err.value(py).setattr("status_code", status) {
                return e;
            }
            py_err
        }
    }
}

/// Read-only field filter exposed to Python
///
/// # Example (Python)
/// ```python
/// from readonly_mixin import ReadOnlyFilterRust, ForbiddenError
///
/// product = ReadOnlyFilterRust("Product", {"status": True})
/// body = {"name": "book", "status": "active"}
/// product.strip(body, "create")
/// print(body)  # {"name": "book"}
///
/// audit = ReadOnlyFilterRust("AuditTrail", {})
/// try:
///     audit.strip({"event": "edit"}, "updateAttributes")
/// except ForbiddenError as err:
///     print(err.status_code)  # 403
/// ```
#[pyclass]
pub struct ReadOnlyFilterRust {
    filter: Arc<FieldFilter>,
}

#[pymethods]
impl ReadOnlyFilterRust {
    /// Create a filter for `model_name`
    ///
    /// # Arguments
    /// * `model_name` - Name used in rejection messages
    /// * `config` - `{field: True | {"skip": op | [op, ...]}}`; empty makes
    ///   the model fully read-only
    #[new]
    pub fn new(model_name: &str, config: &Bound<'_, PyDict>) -> PyResult<Self> {
        let config = ReadOnlyConfig::from_py_dict(config)
            .map_err(|e| PyValueError::new_err(format!("Invalid config: {}", e)))?;

        Ok(Self {
            filter: Arc::new(FieldFilter::new(model_name, config)),
        })
    }

    #[getter]
    pub fn model_name(&self) -> &str {
        self.filter.model_name()
    }

    #[getter]
    pub fn is_fully_read_only(&self) -> bool {
        self.filter.is_fully_read_only()
    }

    /// Names of the configured read-only fields
    pub fn read_only_properties(&self) -> Vec<String> {
        self.filter
            .config()
            .iter()
            .map(|(name, _)| name.to_string())
            .collect()
    }

    /// Remove read-only fields from `payload` in place
    ///
    /// # Arguments
    /// * `payload` - dict, list of dicts, or None
    /// * `operation` - "create", "upsert", "updateAttributes", "updateAll" or "update"
    ///
    /// # Raises
    /// `ForbiddenError` (status_code 403) when the model is fully read-only
    pub fn strip(
        &self,
        py: Python<'_>,
        payload: &Bound<'_, PyAny>,
        operation: &str,
    ) -> PyResult<()> {
        let operation = Operation::from(operation);
        self.filter
            .check_writable()
            .map_err(|e| to_py_err(py, e))?;

        if payload.is_none() {
            return Ok(());
        }

        if let Ok(dict) = payload.downcast::<PyDict>() {
            self.strip_dict(dict, &operation)?;
        } else if let Ok(list) = payload.downcast::<PyList>() {
            for item in list.iter() {
                if let Ok(dict) = item.downcast::<PyDict>() {
                    self.strip_dict(dict, &operation)?;
                }
            }
        }

        Ok(())
    }

    /// Hooks a Python host must install for this model
    ///
    /// # Arguments
    /// * `relations` - the model's `relations` settings, `{name: {"type": kind, ...}}`
    ///
    /// # Returns
    /// List of `(remote_method, operation, relation_or_None)`
    pub fn remote_hooks(
        &self,
        relations: &Bound<'_, PyDict>,
    ) -> PyResult<Vec<(String, String, Option<String>)>> {
        let mut declared: Vec<(String, RelationKind)> = Vec::new();
        for (name, settings) in relations.iter() {
            let name: String = name.extract()?;
            let kind: String = match settings.downcast::<PyDict>() {
                Ok(settings) => match settings.get_item("type")? {
                    Some(kind) => kind.extract()?,
                    None => String::new(),
                },
                Err(_) => String::new(),
            };
            declared.push((name, RelationKind::from(kind.as_str())));
        }

        Ok(
            plan_hooks(declared.iter().map(|(name, kind)| (name.as_str(), kind)))
                .into_iter()
                .map(|plan| {
                    (
                        plan.method.to_string(),
                        plan.operation.to_string(),
                        plan.relation,
                    )
                })
                .collect(),
        )
    }

    fn __repr__(&self) -> String {
        format!(
            "ReadOnlyFilterRust(model={:?}, properties={})",
            self.filter.model_name(),
            self.filter.config().len()
        )
    }
}

// Internal methods
impl ReadOnlyFilterRust {
    fn strip_dict(&self, dict: &Bound<'_, PyDict>, operation: &Operation) -> PyResult<()> {
        for field in self.filter.stripped_fields(operation) {
            if dict.contains(field)? {
                debug!(
                    model = self.filter.model_name(),
                    field,
                    "property is read only, removing incoming data"
                );
                dict.del_item(field)?;
            }
        }
        Ok(())
    }
}
