// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// ReadOnly mixin - Rust Implementation
//
// Marks model fields as read-only for REST remote methods:
// - Field filter stripping protected properties from write payloads in place
// - Hook registrar covering create/upsert/updateAttributes/updateAll
// - Delegation to related models on hasMany/hasOne nested endpoints

pub mod config;
pub mod error;
pub mod filter;
pub mod hooks;
pub mod model;
#[cfg(feature = "python")]
pub mod python;
pub mod relation;

pub use config::{FieldRule, Operation, ReadOnlyConfig};
pub use error::{ReadOnlyError, Result};
pub use filter::{FieldFilter, PayloadShape};
pub use hooks::{attach, Attachment, InvocationContext, RemoteHook, RemoteHooks, RemoteMethod};
pub use model::{ModelRegistry, ModelSettings, PlainModel, ReadOnlyCapable};
#[cfg(feature = "python")]
pub use python::ReadOnlyFilterRust;
pub use relation::{RelationDescriptor, RelationKind};
