//! Entities with original-value tracking.

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use serde_json::Value;

use crate::attributes;
use crate::base::Base;
use crate::definition::Definition;
use crate::entity::Entity;
use crate::provider::Provider;
use crate::{Attributes, ModelResult};

/// A [`Base`] entity that keeps a snapshot of its last synced attributes.
///
/// The snapshot is taken at construction and after every successful
/// [`Entity::fill`]. It is a deep copy: editing the live attributes never
/// reaches it.
pub struct Model<D: Definition> {
    base: Base<D>,
    original: Attributes,
}

impl<D: Definition> Model<D> {
    pub fn new(attributes: Attributes) -> ModelResult<Self> {
        let mut model = Self {
            base: Base::new(attributes)?,
            original: Attributes::new(),
        };
        model.sync_original();
        Ok(model)
    }

    pub fn from_value(value: Value) -> ModelResult<Self> {
        Self::new(attributes::from_value(value)?)
    }

    pub fn with_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        self.base.set_provider(Some(provider));
        self
    }

    pub fn original(&self) -> &Attributes {
        &self.original
    }

    /// Copies the current attributes into the snapshot.
    pub fn sync_original(&mut self) {
        self.original = self.base.attributes().clone();
    }

    /// Restores `key` from the snapshot through [`Base::set`], so casts run
    /// again.
    ///
    /// Does nothing unless both the current and the original value exist.
    pub fn reset_attribute(&mut self, key: &str) -> ModelResult<()> {
        if self.base.get_attribute(key).is_none() {
            return Ok(());
        }

        match self.original.get(key) {
            Some(original) => {
                let original = original.clone();
                self.base.set(key, original)
            }
            None => Ok(()),
        }
    }

    /// Resets each of `keys` in the given order.
    pub fn reset_attributes<I, K>(&mut self, keys: I) -> ModelResult<()>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            self.reset_attribute(key.as_ref())?;
        }
        Ok(())
    }

    /// Resets every current attribute, in attribute order.
    pub fn reset_all_attributes(&mut self) -> ModelResult<()> {
        let keys: Vec<String> = self.base.attributes().keys().cloned().collect();
        self.reset_attributes(keys)
    }

    /// Fills the defaults back in, which also re-syncs the snapshot.
    pub fn reset_to_defaults(&mut self) -> ModelResult<()> {
        self.fill(D::defaults())
    }

    /// Whether `key` differs from the snapshot.
    pub fn is_dirty(&self, key: &str) -> bool {
        self.base.get_attribute(key) != self.original.get(key)
    }

    /// Keys that differ from the snapshot, including ones added since and
    /// ones removed since.
    pub fn dirty(&self) -> Vec<&str> {
        let current = self.base.attributes();

        let mut keys: Vec<&str> = current
            .keys()
            .filter(|key| self.is_dirty(key))
            .map(String::as_str)
            .collect();

        keys.extend(
            self.original
                .keys()
                .filter(|key| !current.contains_key(key.as_str()))
                .map(String::as_str),
        );

        keys
    }

    pub fn into_base(self) -> Base<D> {
        self.base
    }
}

impl<D: Definition> fmt::Debug for Model<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("base", &self.base)
            .field("original", &self.original)
            .finish()
    }
}

impl<D: Definition> Deref for Model<D> {
    type Target = Base<D>;

    fn deref(&self) -> &Base<D> {
        &self.base
    }
}

impl<D: Definition> DerefMut for Model<D> {
    fn deref_mut(&mut self) -> &mut Base<D> {
        &mut self.base
    }
}

impl<D: Definition> Entity for Model<D> {
    type Definition = D;

    fn base(&self) -> &Base<D> {
        &self.base
    }

    fn base_mut(&mut self) -> &mut Base<D> {
        &mut self.base
    }

    /// Fills the attributes and re-syncs the snapshot. An empty map is a no-op.
    fn fill(&mut self, attributes: Attributes) -> ModelResult<()> {
        if attributes.is_empty() {
            return Ok(());
        }

        self.base.fill_attributes(attributes)?;
        self.sync_original();
        Ok(())
    }
}
