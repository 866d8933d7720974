// Copyright 2025
// SPDX-License-Identifier: Apache-2.0
//
// Integration tests: ReadOnly hooks driven through an in-memory host

use std::collections::HashMap;

use readonly_mixin::read_only::{
    InvocationContext, ModelRegistry, ModelSettings, ReadOnlyError, RemoteHook, RemoteHooks,
};
use serde_json::{json, Value};

const PRODUCT: &str = r#"{
    "name": "Product",
    "properties": {"name": "string", "type": "string", "status": "string"},
    "mixins": {"ReadOnly": {"status": true}}
}"#;

const PERSON: &str = r#"{
    "name": "Person",
    "properties": {"name": "string", "status": "string", "role": "string"},
    "relations": {
        "audittrails": {"type": "hasMany", "model": "AuditTrail"},
        "friends": {"type": "hasMany", "model": "Friend", "foreignKey": "personId"},
        "balance": {"type": "hasOne", "model": "Balance"},
        "profile": {"type": "embedsOne", "model": "Profile"},
        "company": {"type": "belongsTo", "model": "Company"},
        "notes": {"type": "hasMany", "model": "Note"}
    },
    "mixins": {"ReadOnly": {"status": true, "role": true}}
}"#;

const AUDIT_TRAIL: &str = r#"{
    "name": "AuditTrail",
    "properties": {"event": "string", "user": "string"},
    "mixins": {"ReadOnly": {}}
}"#;

const FRIEND: &str = r#"{
    "name": "Friend",
    "properties": {"friendId": "number", "since": "date", "numberOfFriends": "number"},
    "mixins": {"ReadOnly": {"numberOfFriends": true}}
}"#;

const BALANCE: &str = r#"{
    "name": "Balance",
    "properties": {"credit": "number", "created": "date"},
    "mixins": {"ReadOnly": true}
}"#;

const PROFILE: &str = r#"{
    "name": "Profile",
    "properties": {
        "age": "number",
        "address": "string",
        "numberOfFriends": "number",
        "username": "string"
    },
    "mixins": {
        "ReadOnly": {"numberOfFriends": {"skip": "create"}, "username": {"skip": ["create"]}}
    }
}"#;

const NOTE: &str = r#"{"name": "Note", "properties": {"text": "string"}}"#;

/// Minimal stand-in for the host framework's remote method dispatch.
/// Hooks are keyed by `Model.method`.
#[derive(Default)]
struct App {
    hooks: HashMap<String, Vec<RemoteHook>>,
}

/// Hook registration of one model inside `App`
struct ModelHooks<'a> {
    model: &'a str,
    app: &'a mut App,
}

impl RemoteHooks for ModelHooks<'_> {
    fn before_remote(&mut self, method: &str, hook: RemoteHook) {
        let key = format!("{}.{}", self.model, method);
        self.app.hooks.entry(key).or_default().push(hook);
    }
}

#[derive(Default)]
struct Invocation {
    body: Option<Value>,
    data: Option<Value>,
}

impl InvocationContext for Invocation {
    fn request_body(&mut self) -> Option<&mut Value> {
        self.body.as_mut()
    }

    fn data_argument(&mut self) -> Option<&mut Value> {
        self.data.as_mut()
    }
}

impl App {
    fn boot() -> Self {
        let definitions: Vec<ModelSettings> =
            [PRODUCT, PERSON, AUDIT_TRAIL, FRIEND, BALANCE, PROFILE, NOTE]
                .iter()
                .map(|json| ModelSettings::from_json_str(json).expect("model definition"))
                .collect();

        let mut registry = ModelRegistry::new();
        for settings in &definitions {
            registry.register_settings(settings).expect("register model");
        }

        let mut app = App::default();
        for settings in &definitions {
            let mut hooks = ModelHooks {
                model: &settings.name,
                app: &mut app,
            };
            registry.attach_model(settings, &mut hooks);
        }
        app
    }

    /// Run the before-remote hooks of `model.method`, returning the HTTP-style status
    fn call(&self, model: &str, method: &str, invocation: &mut Invocation) -> u16 {
        let ctx: &mut dyn InvocationContext = invocation;
        let key = format!("{}.{}", model, method);
        for hook in self.hooks.get(&key).into_iter().flatten() {
            if let Err(err) = hook(&mut *ctx) {
                return err.status_code();
            }
        }
        200
    }

    fn post(&self, model: &str, method: &str, body: Value) -> (u16, Option<Value>) {
        let mut invocation = Invocation {
            body: Some(body),
            data: None,
        };
        let status = self.call(model, method, &mut invocation);
        (status, invocation.body)
    }

    fn post_related(&self, model: &str, method: &str, data: Value) -> (u16, Option<Value>) {
        let mut invocation = Invocation {
            body: None,
            data: Some(data),
        };
        let status = self.call(model, method, &mut invocation);
        (status, invocation.data)
    }
}

#[test]
fn test_boot_installs_hooks_for_mixin_models_only() {
    let app = App::boot();
    for model in ["Product", "Person", "AuditTrail", "Friend", "Balance", "Profile"] {
        for method in ["create", "upsert", "prototype.updateAttributes", "updateAll"] {
            let key = format!("{}.{}", model, method);
            assert_eq!(app.hooks.get(&key).map(Vec::len), Some(1), "{}", key);
        }
    }
    // models without the mixin get no hooks at all
    assert!(!app.hooks.keys().any(|key| key.starts_with("Note.")));
}

#[test]
fn test_create_strips_readonly_property() {
    let app = App::boot();
    let (status, body) = app.post(
        "Product",
        "create",
        json!({"name": "test product", "status": "active"}),
    );
    assert_eq!(status, 200);
    assert_eq!(body, Some(json!({"name": "test product"})));
}

#[test]
fn test_update_strips_multiple_readonly_properties() {
    let app = App::boot();
    let (status, body) = app.post(
        "Person",
        "prototype.updateAttributes",
        json!({"name": "Tom (edited)", "status": "active", "role": "user"}),
    );
    assert_eq!(status, 200);
    assert_eq!(body, Some(json!({"name": "Tom (edited)"})));
}

#[test]
fn test_bulk_update_strips_readonly_property() {
    let app = App::boot();
    let (status, body) = app.post("Product", "updateAll", json!({"status": "disabled"}));
    assert_eq!(status, 200);
    assert_eq!(body, Some(json!({})));
}

#[test]
fn test_upsert_list_payload() {
    let app = App::boot();
    let (status, body) = app.post(
        "Product",
        "upsert",
        json!([
            {"name": "book 1", "status": "disabled"},
            {"name": "book 2", "status": "pending"}
        ]),
    );
    assert_eq!(status, 200);
    assert_eq!(body, Some(json!([{"name": "book 1"}, {"name": "book 2"}])));
}

#[test]
fn test_fully_read_only_model_update_forbidden() {
    let app = App::boot();
    let (status, body) = app.post(
        "AuditTrail",
        "prototype.updateAttributes",
        json!({"event": "update", "user": "john"}),
    );
    assert_eq!(status, 403);
    assert_eq!(body, Some(json!({"event": "update", "user": "john"})));
}

#[test]
fn test_has_many_into_fully_read_only_model_forbidden() {
    let app = App::boot();
    let payload = json!({"event": "update", "user": "john"});

    let (status, _) =
        app.post_related("Person", "prototype.__create__audittrails", payload.clone());
    assert_eq!(status, 403);

    let (status, _) = app.post_related("Person", "prototype.__updateById__audittrails", payload);
    assert_eq!(status, 403);
}

#[test]
fn test_has_many_create_without_readonly_fields_passes() {
    let app = App::boot();
    let friend = json!({"friendId": 1, "since": "2015-06-01T10:00:00.000Z"});
    let (status, data) = app.post_related("Person", "prototype.__create__friends", friend.clone());
    assert_eq!(status, 200);
    assert_eq!(data, Some(friend));
}

#[test]
fn test_has_many_update_strips_related_readonly_field() {
    let app = App::boot();
    let (status, data) = app.post_related(
        "Person",
        "prototype.__updateById__friends",
        json!({"friendId": 5, "numberOfFriends": 10}),
    );
    assert_eq!(status, 200);
    assert_eq!(data, Some(json!({"friendId": 5})));
}

#[test]
fn test_has_one_into_fully_read_only_model_forbidden() {
    let app = App::boot();
    let payload = json!({"credit": 99999, "created": "2015-06-01T10:00:00.000Z"});

    let (status, _) = app.post_related("Person", "prototype.__create__balance", payload.clone());
    assert_eq!(status, 403);

    let (status, _) = app.post_related("Person", "prototype.__update__balance", payload);
    assert_eq!(status, 403);
}

#[test]
fn test_has_one_skip_rule_on_create_only() {
    let app = App::boot();
    let data = json!({
        "age": 23,
        "address": "New York",
        "numberOfFriends": 234,
        "username": "test"
    });

    let (status, created) =
        app.post_related("Person", "prototype.__create__profile", data.clone());
    assert_eq!(status, 200);
    assert_eq!(created, Some(data));

    let (status, updated) = app.post_related(
        "Person",
        "prototype.__update__profile",
        json!({"age": 25, "numberOfFriends": 2, "username": "change"}),
    );
    assert_eq!(status, 200);
    assert_eq!(updated, Some(json!({"age": 25})));
}

#[test]
fn test_relation_to_model_without_mixin_is_noop() {
    let app = App::boot();
    let note = json!({"text": "hello", "status": "x"});
    let (status, data) = app.post_related("Person", "prototype.__create__notes", note.clone());
    assert_eq!(status, 200);
    assert_eq!(data, Some(note));
}

#[test]
fn test_unsupported_relation_kind_is_skipped() {
    let app = App::boot();
    assert!(!app.hooks.contains_key("Person.prototype.__create__company"));
    assert!(!app.hooks.contains_key("Person.prototype.__update__company"));
    assert!(app.hooks.contains_key("Person.prototype.__create__friends"));
}

#[test]
fn test_missing_body_passes_unless_fully_read_only() {
    let app = App::boot();

    let mut empty = Invocation::default();
    assert_eq!(app.call("Product", "create", &mut empty), 200);

    let mut empty = Invocation::default();
    assert_eq!(app.call("AuditTrail", "create", &mut empty), 403);
}

#[test]
fn test_forbidden_error_message() {
    let err = ReadOnlyError::forbidden("AuditTrail");
    assert_eq!(err.to_string(), "Unable to update: AuditTrail is read only.");
}
