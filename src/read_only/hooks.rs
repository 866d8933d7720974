// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Hook registrar: installs the field filter in front of remote write methods

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use super::config::Operation;
use super::error::Result;
use super::filter::PayloadShape;
use super::model::ReadOnlyCapable;
use super::relation::{RelationDescriptor, RelationKind, RelationStyle};

/// Request state of one remote method invocation, as seen by a hook
pub trait InvocationContext {
    /// Parsed request body
    fn request_body(&mut self) -> Option<&mut Value>;

    /// The `data` argument of instance-level methods
    fn data_argument(&mut self) -> Option<&mut Value>;

    fn payload(&mut self, shape: PayloadShape) -> Option<&mut Value> {
        match shape {
            PayloadShape::RequestBody => self.request_body(),
            PayloadShape::DataArgument => self.data_argument(),
        }
    }
}

/// Pre-invocation hook. `Ok` lets the request continue, `Err` aborts it and
/// carries the status code for the response.
pub type RemoteHook = Arc<dyn Fn(&mut dyn InvocationContext) -> Result<()> + Send + Sync>;

/// Hook registration offered by the host framework
pub trait RemoteHooks {
    fn before_remote(&mut self, method: &str, hook: RemoteHook);
}

/// Remote method names the mixin hooks into
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RemoteMethod {
    Create,
    Upsert,
    UpdateAttributes,
    UpdateAll,
    CreateRelated(String),
    UpdateRelatedById(String),
    UpdateRelated(String),
}

impl fmt::Display for RemoteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteMethod::Create => f.write_str("create"),
            RemoteMethod::Upsert => f.write_str("upsert"),
            RemoteMethod::UpdateAttributes => f.write_str("prototype.updateAttributes"),
            RemoteMethod::UpdateAll => f.write_str("updateAll"),
            RemoteMethod::CreateRelated(relation) => write!(f, "prototype.__create__{}", relation),
            RemoteMethod::UpdateRelatedById(relation) => {
                write!(f, "prototype.__updateById__{}", relation)
            }
            RemoteMethod::UpdateRelated(relation) => write!(f, "prototype.__update__{}", relation),
        }
    }
}

/// Collection-level write methods of every model carrying the mixin
const DEFAULT_METHODS: [(RemoteMethod, Operation); 4] = [
    (RemoteMethod::Create, Operation::Create),
    (RemoteMethod::Upsert, Operation::Upsert),
    (RemoteMethod::UpdateAttributes, Operation::UpdateAttributes),
    (RemoteMethod::UpdateAll, Operation::UpdateAll),
];

/// One hook to install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookPlan {
    pub method: RemoteMethod,
    pub operation: Operation,
    pub shape: PayloadShape,
    /// Relation whose target model does the filtering; `None` for the
    /// model's own methods
    pub relation: Option<String>,
}

/// Hooks needed by a model with the given relations.
///
/// Relations of unsupported kinds are logged and left out.
pub fn plan_hooks<'a, I>(relations: I) -> Vec<HookPlan>
where
    I: IntoIterator<Item = (&'a str, &'a RelationKind)>,
{
    let mut plans: Vec<HookPlan> = DEFAULT_METHODS
        .into_iter()
        .map(|(method, operation)| HookPlan {
            method,
            operation,
            shape: PayloadShape::RequestBody,
            relation: None,
        })
        .collect();

    for (name, kind) in relations {
        let related = |method: RemoteMethod, operation: Operation| HookPlan {
            method,
            operation,
            shape: PayloadShape::DataArgument,
            relation: Some(name.to_string()),
        };

        match kind.style() {
            Some(RelationStyle::Collection) => {
                plans.push(related(
                    RemoteMethod::CreateRelated(name.to_string()),
                    Operation::Create,
                ));
                plans.push(related(
                    RemoteMethod::UpdateRelatedById(name.to_string()),
                    Operation::UpdateAttributes,
                ));
            }
            Some(RelationStyle::Singleton) => {
                plans.push(related(
                    RemoteMethod::CreateRelated(name.to_string()),
                    Operation::Create,
                ));
                plans.push(related(
                    RemoteMethod::UpdateRelated(name.to_string()),
                    Operation::Update,
                ));
            }
            None => {
                debug!(relation = name, kind = %kind, "relation type is not supported");
            }
        }
    }

    plans
}

/// A hook installed by [`attach`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledHook {
    pub plan: HookPlan,
    /// Model whose filter runs; `None` when the related model has no
    /// read-only capability and the hook always passes
    pub delegate: Option<String>,
}

/// Result of attaching the mixin to one model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub model: String,
    pub hooks: Vec<InstalledHook>,
}

impl Attachment {
    pub fn methods(&self) -> impl Iterator<Item = String> + '_ {
        self.hooks.iter().map(|hook| hook.plan.method.to_string())
    }
}

/// Install the read-only hooks of `model`.
///
/// Runs once per model during bootstrap. The model's own write methods run
/// its filter against the request body; nested relation endpoints run the
/// related model's filter against the `data` argument.
pub fn attach<H>(
    model: Arc<dyn ReadOnlyCapable>,
    relations: &[RelationDescriptor],
    hooks: &mut H,
) -> Attachment
where
    H: RemoteHooks + ?Sized,
{
    let plans = plan_hooks(
        relations
            .iter()
            .map(|relation| (relation.name.as_str(), &relation.kind)),
    );

    let mut installed = Vec::with_capacity(plans.len());
    for plan in plans {
        let target = match &plan.relation {
            None => Arc::clone(&model),
            Some(name) => relations
                .iter()
                .find(|relation| &relation.name == name)
                .map(|relation| Arc::clone(&relation.target))
                .unwrap_or_else(|| Arc::clone(&model)),
        };

        let delegate = target
            .read_only_filter()
            .map(|filter| filter.model_name().to_string());
        let method = plan.method.to_string();
        debug!(
            model = model.model_name(),
            method = %method,
            operation = %plan.operation,
            delegate = delegate.as_deref().unwrap_or("-"),
            "installing read only hook"
        );

        hooks.before_remote(&method, filter_hook(target, plan.operation.clone(), plan.shape));
        installed.push(InstalledHook { plan, delegate });
    }

    Attachment {
        model: model.model_name().to_string(),
        hooks: installed,
    }
}

fn filter_hook(
    target: Arc<dyn ReadOnlyCapable>,
    operation: Operation,
    shape: PayloadShape,
) -> RemoteHook {
    Arc::new(move |ctx: &mut dyn InvocationContext| match target.read_only_filter() {
        Some(filter) => filter.strip(ctx.payload(shape), &operation),
        None => Ok(()),
    })
}
