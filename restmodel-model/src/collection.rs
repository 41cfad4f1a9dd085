//! Ordered sets of models.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::attributes;
use crate::definition::Definition;
use crate::model::Model;
use crate::provider::Provider;
use crate::{Attributes, ModelError, ModelResult};

/// Either plain attribute data or an already built model.
pub enum Item<D: Definition> {
    Data(Attributes),
    Model(Model<D>),
}

impl<D: Definition> From<Attributes> for Item<D> {
    fn from(attributes: Attributes) -> Self {
        Item::Data(attributes)
    }
}

impl<D: Definition> From<Model<D>> for Item<D> {
    fn from(model: Model<D>) -> Self {
        Item::Model(model)
    }
}

/// An ordered sequence of models of one type.
///
/// Plain data handed to the collection is rehydrated into [`Model`]s, each
/// bound to the collection's provider.
pub struct Collection<D: Definition> {
    models: Vec<Model<D>>,
    provider: Option<Arc<dyn Provider>>,
}

impl<D: Definition> Collection<D> {
    pub fn new() -> Self {
        Self {
            models: Vec::new(),
            provider: None,
        }
    }

    pub fn from_items<I>(items: I) -> ModelResult<Self>
    where
        I: IntoIterator<Item = Item<D>>,
    {
        let mut collection = Self::new();
        collection.models = collection.map_items(items)?;
        Ok(collection)
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Builds a model from plain data, bound to this collection's provider.
    pub fn get_model(&self, attributes: Attributes) -> ModelResult<Model<D>> {
        let model = Model::new(attributes)?;
        Ok(match &self.provider {
            Some(provider) => model.with_provider(Arc::clone(provider)),
            None => model,
        })
    }

    /// Turns plain data into models. Models pass through untouched.
    pub fn map_items<I>(&self, items: I) -> ModelResult<Vec<Model<D>>>
    where
        I: IntoIterator<Item = Item<D>>,
    {
        items
            .into_iter()
            .map(|item| match item {
                Item::Data(attributes) => self.get_model(attributes),
                Item::Model(model) => Ok(model),
            })
            .collect()
    }

    /// Replaces the contents with a JSON array of objects.
    pub fn fill_from_value(&mut self, value: Value) -> ModelResult<()> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(ModelError::InvalidAttributes(format!(
                    "expected a JSON array, got {other}"
                )));
            }
        };

        let items = items
            .into_iter()
            .map(|item| attributes::from_value(item).map(Item::Data))
            .collect::<ModelResult<Vec<_>>>()?;

        self.models = self.map_items(items)?;
        Ok(())
    }

    pub fn push(&mut self, item: impl Into<Item<D>>) -> ModelResult<()> {
        let mut mapped = self.map_items([item.into()])?;
        self.models.append(&mut mapped);
        Ok(())
    }

    pub fn all(&self) -> &[Model<D>] {
        &self.models
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Model<D>> {
        self.models.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Model<D>> {
        self.models.iter_mut()
    }

    pub fn first(&self) -> Option<&Model<D>> {
        self.models.first()
    }

    /// First model whose attribute at `path` equals `value`.
    pub fn first_where(&self, path: &str, value: &Value) -> Option<&Model<D>> {
        self.models
            .iter()
            .find(|model| attributes::get_path(model.attributes(), path) == Some(value))
    }

    pub fn filter<P>(&self, mut predicate: P) -> Vec<&Model<D>>
    where
        P: FnMut(&Model<D>) -> bool,
    {
        self.models.iter().filter(|model| predicate(*model)).collect()
    }

    pub fn find(&self, identifier: &Value) -> Option<&Model<D>> {
        self.models
            .iter()
            .find(|model| model.identifier() == Some(identifier))
    }

    /// Removes and returns the model with the given identifier.
    pub fn remove(&mut self, identifier: &Value) -> Option<Model<D>> {
        let index = self
            .models
            .iter()
            .position(|model| model.identifier() == Some(identifier))?;
        Some(self.models.remove(index))
    }

    pub fn into_vec(self) -> Vec<Model<D>> {
        self.models
    }
}

impl<D: Definition> Default for Collection<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Definition> fmt::Debug for Collection<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("resource", &D::RESOURCE)
            .field("models", &self.models)
            .finish()
    }
}

impl<'a, D: Definition> IntoIterator for &'a Collection<D> {
    type Item = &'a Model<D>;
    type IntoIter = std::slice::Iter<'a, Model<D>>;

    fn into_iter(self) -> Self::IntoIter {
        self.models.iter()
    }
}
