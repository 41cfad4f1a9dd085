//! Attribute state and the provider choke point shared by every entity.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::attributes::{self, get_path};
use crate::cast::Casts;
use crate::definition::Definition;
use crate::errors::ErrorBag;
use crate::provider::{Cancelled, Provider, Resource};
use crate::status::Status;
use crate::{Action, Attributes, ModelError, ModelResult, Options};

/// Attributes, status, errors and provider binding of one entity.
///
/// `Base` on its own is an entity without original-value tracking; see
/// [`crate::Model`] for the snapshotting variant.
pub struct Base<D: Definition> {
    attributes: Attributes,
    casts: Casts,
    status: Status,
    errors: ErrorBag,
    cancelled: Cancelled,
    provider: Option<Arc<dyn Provider>>,
    definition: PhantomData<fn() -> D>,
}

impl<D: Definition> Base<D> {
    /// Builds an entity from `D::defaults()` overlaid with `attributes`.
    ///
    /// Every key goes through [`Base::set`], so casts apply.
    pub fn new(attributes: Attributes) -> ModelResult<Self> {
        let mut base = Self {
            attributes: Attributes::new(),
            casts: D::casts(),
            status: Status::default(),
            errors: ErrorBag::new(),
            cancelled: Cancelled::No,
            provider: None,
            definition: PhantomData,
        };

        let mut defaulted = D::defaults();
        defaulted.extend(attributes);
        base.fill_attributes(defaulted)?;

        Ok(base)
    }

    pub fn from_value(value: Value) -> ModelResult<Self> {
        Self::new(attributes::from_value(value)?)
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn set_provider(&mut self, provider: Option<Arc<dyn Provider>>) {
        self.provider = provider;
    }

    pub fn provider(&self) -> Option<&Arc<dyn Provider>> {
        self.provider.as_ref()
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.get_attribute(key)
    }

    pub fn get_attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Casts `value` with the cast registered for `key` and stores it.
    ///
    /// A key written for the first time is appended to the attributes.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> ModelResult<()> {
        let casted = self.casted(key, value.into())?;
        self.set_attribute(key, casted);
        Ok(())
    }

    /// Stores `value` without casting it.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: Value) {
        self.attributes.insert(key.into(), value);
    }

    /// Applies the cast registered for `key`, if any.
    pub fn casted(&self, key: &str, value: Value) -> ModelResult<Value> {
        match self.casts.get(key) {
            Some(cast) => cast.cast(value).map_err(|source| ModelError::Cast {
                key: key.to_string(),
                source,
            }),
            None => Ok(value),
        }
    }

    /// Forgets `key`, keeping the order of the remaining attributes.
    pub fn unset(&mut self, key: &str) -> Option<Value> {
        self.attributes.shift_remove(key)
    }

    /// Sets every entry in order.
    ///
    /// There is no rollback: when a cast fails, the keys before it stay
    /// applied and the keys after it are skipped.
    pub fn fill_attributes(&mut self, attributes: Attributes) -> ModelResult<()> {
        for (key, value) in attributes {
            self.set(&key, value)?;
        }
        Ok(())
    }

    pub fn casts(&self) -> &Casts {
        &self.casts
    }

    pub fn primary_key(&self) -> &'static str {
        D::PRIMARY_KEY
    }

    /// Value at the primary key path. `null` counts as no identifier.
    pub fn identifier(&self) -> Option<&Value> {
        get_path(&self.attributes, D::PRIMARY_KEY).filter(|id| !id.is_null())
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn errors(&self) -> &ErrorBag {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ErrorBag {
        &mut self.errors
    }

    /// `message` of the last failed response body.
    pub fn error_message(&self) -> Option<&str> {
        self.errors.response().and_then(|response| response.message())
    }

    /// Status code of the last failed response.
    pub fn error_status(&self) -> Option<u16> {
        self.errors.response().map(|response| response.status)
    }

    pub fn cancelled(&self) -> &Cancelled {
        &self.cancelled
    }

    /// Cancels the request in flight on the bound provider.
    pub fn cancel(&self, message: Option<String>) {
        if let Some(provider) = &self.provider {
            provider.cancel(message);
        }
    }

    pub fn reset_status(&mut self) {
        self.status.reset();
        self.errors.clear();
    }

    /// Runs `action` on the bound provider.
    ///
    /// Without a provider this resolves to `Ok(None)` and touches no state.
    /// Otherwise the status is marked in flight and the field errors cleared
    /// before dispatch; after the call the status returns to idle with the
    /// outcome recorded, and any error is handed back unchanged.
    pub async fn call_provider(
        &mut self,
        action: Action,
        options: Options,
    ) -> ModelResult<Option<Value>> {
        let Some(provider) = self.provider.clone() else {
            return Ok(None);
        };

        self.status.begin(action);
        self.errors.clear();

        debug!(
            "Calling {} provider: {} {}",
            provider.provider_name(),
            action,
            D::RESOURCE
        );

        let result = provider.call(action, &mut *self, &options).await;
        self.status.finish(action, result.is_ok());

        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("{} {} failed: {}", action, D::RESOURCE, e);
                Err(e)
            }
        }
    }
}

impl<D: Definition> Resource for Base<D> {
    fn endpoint(&self, action: Action) -> String {
        D::endpoint(action, self.identifier())
    }

    fn fetch_params(&self) -> Attributes {
        D::fetch_params(&self.attributes)
    }

    fn save_data(&self) -> Attributes {
        D::save_data(&self.attributes)
    }

    fn status(&self) -> &Status {
        &self.status
    }

    fn errors(&self) -> &ErrorBag {
        &self.errors
    }

    fn errors_mut(&mut self) -> &mut ErrorBag {
        &mut self.errors
    }

    fn set_cancelled(&mut self, cancelled: Cancelled) {
        self.cancelled = cancelled;
    }
}

impl<D: Definition> fmt::Debug for Base<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Base")
            .field("resource", &D::RESOURCE)
            .field("attributes", &self.attributes)
            .field("status", &self.status)
            .field("errors", &self.errors)
            .field("cancelled", &self.cancelled)
            .field(
                "provider",
                &self.provider.as_ref().map(|provider| provider.provider_name()),
            )
            .finish()
    }
}
