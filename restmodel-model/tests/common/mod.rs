//! Shared test helpers for entity tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::sync::Mutex;

use async_trait::async_trait;
use restmodel_model::{
    Action, Attributes, CastError, CastFn, Casts, Definition, ErrorResponse, IntegerCast,
    ModelError, ModelResult, Options, Provider, Resource, Status, StringCast,
};
use serde_json::{json, Value};

/// Builds attributes from a `json!` object literal.
pub fn attrs(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// Installs a test-writer subscriber. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

// ── Definitions ──────────────────────────────────────────────────

/// A resource with no defaults and no casts.
pub struct Post;

impl Definition for Post {
    const RESOURCE: &'static str = "posts";
}

/// A resource with defaults and typed casts.
pub struct Article;

impl Definition for Article {
    const RESOURCE: &'static str = "articles";

    fn defaults() -> Attributes {
        attrs(json!({"title": "Untitled", "views": 0, "published": false}))
    }

    fn casts() -> Casts {
        Casts::new()
            .with("title", StringCast)
            .with("views", IntegerCast)
    }
}

/// A resource identified by a nested attribute.
pub struct Document;

impl Definition for Document {
    const RESOURCE: &'static str = "/documents/";
    const PRIMARY_KEY: &'static str = "meta.uuid";
}

/// A resource with a custom save body and fetch query.
pub struct Comment;

impl Definition for Comment {
    const RESOURCE: &'static str = "comments";

    fn fetch_params(attributes: &Attributes) -> Attributes {
        let mut params = Attributes::new();
        if let Some(post_id) = attributes.get("post_id") {
            params.insert("post_id".into(), post_id.clone());
        }
        params
    }

    fn save_data(attributes: &Attributes) -> Attributes {
        let mut data = attributes.clone();
        data.shift_remove("post_id");
        data
    }
}

thread_local! {
    static RECORDED: RefCell<Vec<Value>> = const { RefCell::new(Vec::new()) };
}

/// Values the [`Recorded`] casts have seen on this thread, in order.
pub fn recorded() -> Vec<Value> {
    RECORDED.with(|values| values.borrow().clone())
}

pub fn clear_recorded() {
    RECORDED.with(|values| values.borrow_mut().clear());
}

/// A resource whose every attribute is cast through a recording cast, and
/// where `"strict"` rejects anything but strings.
pub struct Recorded;

impl Definition for Recorded {
    const RESOURCE: &'static str = "recorded";

    fn casts() -> Casts {
        let record = |value: Value| -> Result<Value, CastError> {
            RECORDED.with(|values| values.borrow_mut().push(value.clone()));
            Ok(value)
        };

        Casts::new()
            .with("a", CastFn(record))
            .with("b", CastFn(record))
            .with("c", CastFn(record))
            .with(
                "strict",
                CastFn(|value: Value| match value {
                    Value::String(_) => Ok(value),
                    other => Err(CastError::Custom(format!("not a string: {other}"))),
                }),
            )
    }
}

// ── Stub provider ────────────────────────────────────────────────

type Responder = Box<dyn Fn(Action, &mut dyn Resource) -> ModelResult<Value> + Send + Sync>;

/// One provider invocation as seen by [`StubProvider`].
#[derive(Debug, Clone)]
pub struct Call {
    pub action: Action,
    pub endpoint: String,
    pub options: Options,
    pub fetch_params: Attributes,
    pub save_data: Attributes,
    /// Status of the resource while the call was in flight.
    pub status: Status,
    /// Number of field errors on the resource when the call started.
    pub errors: usize,
}

/// A provider that answers from a closure and records every call.
pub struct StubProvider {
    respond: Responder,
    calls: Mutex<Vec<Call>>,
    cancels: Mutex<Vec<Option<String>>>,
}

impl StubProvider {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(Action, &mut dyn Resource) -> ModelResult<Value> + Send + Sync + 'static,
    {
        Self {
            respond: Box::new(respond),
            calls: Mutex::new(Vec::new()),
            cancels: Mutex::new(Vec::new()),
        }
    }

    /// Resolves every call with `value`.
    pub fn resolving(value: Value) -> Self {
        Self::new(move |_, _| Ok(value.clone()))
    }

    /// Rejects every call with `ModelError::Provider(message)`.
    pub fn rejecting(message: &'static str) -> Self {
        Self::new(move |_, _| Err(ModelError::Provider(message.to_string())))
    }

    /// Rejects like a failed HTTP response, recording it on the error bag.
    pub fn failing_with(status: u16, data: Value) -> Self {
        Self::new(move |_, resource| {
            let response = ErrorResponse::new(status, data.clone());
            if status == 422 {
                let errors = response.data.get("errors").cloned().unwrap_or_default();
                resource.errors_mut().set_errors_from_value(&errors);
            }
            resource.errors_mut().set_response(Some(response.clone()));
            Err(ModelError::Response(response))
        })
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn actions(&self) -> Vec<Action> {
        self.calls().into_iter().map(|call| call.action).collect()
    }

    pub fn cancels(&self) -> Vec<Option<String>> {
        self.cancels.lock().unwrap().clone()
    }

    fn answer(
        &self,
        action: Action,
        resource: &mut dyn Resource,
        options: &Options,
    ) -> ModelResult<Value> {
        self.calls.lock().unwrap().push(Call {
            action,
            endpoint: resource.endpoint(action),
            options: options.clone(),
            fetch_params: resource.fetch_params(),
            save_data: resource.save_data(),
            status: *resource.status(),
            errors: resource.errors().len(),
        });
        (self.respond)(action, resource)
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn provider_name(&self) -> &'static str {
        "Stub"
    }

    async fn fetch(&self, resource: &mut dyn Resource, options: &Options) -> ModelResult<Value> {
        self.answer(Action::Fetch, resource, options)
    }

    async fn create(&self, resource: &mut dyn Resource, options: &Options) -> ModelResult<Value> {
        self.answer(Action::Create, resource, options)
    }

    async fn update(&self, resource: &mut dyn Resource, options: &Options) -> ModelResult<Value> {
        self.answer(Action::Update, resource, options)
    }

    async fn delete(&self, resource: &mut dyn Resource, options: &Options) -> ModelResult<Value> {
        self.answer(Action::Delete, resource, options)
    }

    fn cancel(&self, message: Option<String>) {
        self.cancels.lock().unwrap().push(message);
    }
}
