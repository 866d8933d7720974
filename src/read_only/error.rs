// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Error types for the ReadOnly mixin

use thiserror::Error;

/// Status code attached to rejected writes against a fully read-only model.
pub const FORBIDDEN_STATUS: u16 = 403;

/// Status code reported when a configuration error reaches a request pipeline.
pub const INTERNAL_ERROR_STATUS: u16 = 500;

/// Errors raised by the ReadOnly mixin
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadOnlyError {
    /// Write attempted against a model whose configuration has no fields,
    /// i.e. the whole model is read-only.
    #[error("Unable to update: {model} is read only.")]
    Forbidden { model: String },

    /// Mixin options could not be parsed. Only raised at bootstrap.
    #[error("invalid read-only configuration: {0}")]
    InvalidConfig(String),
}

impl ReadOnlyError {
    pub fn forbidden(model: impl Into<String>) -> Self {
        ReadOnlyError::Forbidden {
            model: model.into(),
        }
    }

    /// HTTP-style status code the host framework should respond with
    pub fn status_code(&self) -> u16 {
        match self {
            ReadOnlyError::Forbidden { .. } => FORBIDDEN_STATUS,
            ReadOnlyError::InvalidConfig(_) => INTERNAL_ERROR_STATUS,
        }
    }
}

impl From<serde_json::Error> for ReadOnlyError {
    fn from(err: serde_json::Error) -> Self {
        ReadOnlyError::InvalidConfig(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReadOnlyError>;
