//! Provider abstraction.
//!
//! A [`Provider`] executes CRUD actions against a remote endpoint on behalf of
//! an entity. The entity is handed over as a [`Resource`], which exposes only
//! what a provider needs: endpoints, payloads, and the error state it fills
//! on failure.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::ErrorBag;
use crate::status::Status;
use crate::{Action, Attributes, ModelResult, Options};

/// Cancellation state of the last request made for an entity.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Cancelled {
    #[default]
    No,
    /// Cancelled without a message.
    Yes,
    Message(String),
}

impl Cancelled {
    pub fn is_cancelled(&self) -> bool {
        !matches!(self, Cancelled::No)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Cancelled::Message(message) => Some(message),
            _ => None,
        }
    }
}

/// An empty message counts as no message.
impl From<Option<String>> for Cancelled {
    fn from(message: Option<String>) -> Self {
        match message {
            Some(message) if !message.is_empty() => Cancelled::Message(message),
            _ => Cancelled::Yes,
        }
    }
}

/// The view of an entity a provider works against.
pub trait Resource: Send {
    /// Endpoint path for `action`, relative to the provider's base URL.
    fn endpoint(&self, action: Action) -> String;

    /// Query parameters for the fetch action.
    fn fetch_params(&self) -> Attributes;

    /// Body for the create and update actions.
    fn save_data(&self) -> Attributes;

    fn status(&self) -> &Status;

    fn errors(&self) -> &ErrorBag;

    fn errors_mut(&mut self) -> &mut ErrorBag;

    fn set_cancelled(&mut self, cancelled: Cancelled);
}

/// Executes actions against a remote endpoint.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Returns the name of the provider.
    fn provider_name(&self) -> &'static str;

    async fn fetch(&self, resource: &mut dyn Resource, options: &Options) -> ModelResult<Value>;

    async fn create(&self, resource: &mut dyn Resource, options: &Options) -> ModelResult<Value>;

    async fn update(&self, resource: &mut dyn Resource, options: &Options) -> ModelResult<Value>;

    async fn delete(&self, resource: &mut dyn Resource, options: &Options) -> ModelResult<Value>;

    /// Aborts the request currently bound to this provider. Without a message
    /// the resource's `cancelled` becomes [`Cancelled::Yes`].
    fn cancel(&self, message: Option<String>);

    /// Dispatches `action` to the matching method.
    async fn call(
        &self,
        action: Action,
        resource: &mut dyn Resource,
        options: &Options,
    ) -> ModelResult<Value> {
        match action {
            Action::Fetch => self.fetch(resource, options).await,
            Action::Create => self.create(resource, options).await,
            Action::Update => self.update(resource, options).await,
            Action::Delete => self.delete(resource, options).await,
        }
    }
}
