use async_trait::async_trait;
use serde_json::Value;

use crate::base::Base;
use crate::definition::Definition;
use crate::{Action, Attributes, ModelResult, Options, SaveAction};

/// The action surface of an entity.
///
/// Implementors supply `fill`, which decides what absorbing remote data means
/// (plain overwrite for [`Base`], overwrite plus snapshot for
/// [`crate::Model`]). Every action goes through [`Base::call_provider`].
///
/// Actions take `&mut self`, so at most one of them is in flight per entity.
#[async_trait]
pub trait Entity: Send {
    type Definition: Definition;

    fn base(&self) -> &Base<Self::Definition>;

    fn base_mut(&mut self) -> &mut Base<Self::Definition>;

    /// Absorbs attributes returned by the remote end.
    fn fill(&mut self, attributes: Attributes) -> ModelResult<()>;

    /// Called with the body of a successful fetch. Objects are filled in,
    /// anything else is ignored.
    fn on_fetch_success(&mut self, result: &Value) -> ModelResult<()> {
        match result {
            Value::Object(attributes) => self.fill(attributes.clone()),
            _ => Ok(()),
        }
    }

    async fn fetch(&mut self, options: Options) -> ModelResult<Option<Value>> {
        let result = self
            .base_mut()
            .call_provider(Action::Fetch, options)
            .await?;

        if let Some(value) = &result {
            self.on_fetch_success(value)?;
        }

        Ok(result)
    }

    /// Creates or updates the entity.
    ///
    /// Without an explicit action, an entity with an identifier is updated
    /// and one without is created. An object result is filled back in, which
    /// picks up server-assigned values such as a generated id.
    async fn save(
        &mut self,
        options: Options,
        action: Option<SaveAction>,
    ) -> ModelResult<Option<Value>> {
        let action = action.unwrap_or_else(|| {
            if self.base().identifier().is_some() {
                SaveAction::Update
            } else {
                SaveAction::Create
            }
        });

        let result = self
            .base_mut()
            .call_provider(action.into(), options)
            .await?;

        if let Some(Value::Object(attributes)) = &result {
            self.fill(attributes.clone())?;
        }

        Ok(result)
    }

    async fn create(&mut self, options: Options) -> ModelResult<Option<Value>> {
        self.save(options, Some(SaveAction::Create)).await
    }

    async fn update(&mut self, options: Options) -> ModelResult<Option<Value>> {
        self.save(options, Some(SaveAction::Update)).await
    }

    async fn delete(&mut self, options: Options) -> ModelResult<()> {
        self.base_mut()
            .call_provider(Action::Delete, options)
            .await?;
        Ok(())
    }
}

impl<D: Definition> Entity for Base<D> {
    type Definition = D;

    fn base(&self) -> &Base<D> {
        self
    }

    fn base_mut(&mut self) -> &mut Base<D> {
        self
    }

    fn fill(&mut self, attributes: Attributes) -> ModelResult<()> {
        self.fill_attributes(attributes)
    }
}
