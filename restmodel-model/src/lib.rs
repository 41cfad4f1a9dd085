//! Client-side entity model for restmodel.
//!
//! Defines the types every restmodel entity is built from:
//! - [`Base`]: attributes, casting, status, error bag and provider binding
//! - [`Model`]: a [`Base`] with an original-value snapshot for dirty tracking and resets
//! - [`Entity`]: the fetch/create/update/delete/save action surface
//! - [`Provider`] / [`Resource`]: the capability that runs actions remotely, and
//!   the view of an entity it works against
//! - [`Cast`] / [`Casts`]: per-attribute value transformations applied on write
//! - [`ErrorBag`]: per-field validation messages plus the last failed response
//! - [`Collection`]: an ordered set of models rehydrated from plain data
//!
//! Transport lives elsewhere: `restmodel-http` provides the HTTP [`Provider`].

mod action;
pub mod attributes;
mod base;
pub mod cast;
mod collection;
mod definition;
mod entity;
mod error;
mod errors;
mod model;
mod provider;
mod status;

pub use action::{Action, Options, SaveAction};
pub use attributes::Attributes;
pub use base::Base;
pub use cast::{
    BooleanCast, Cast, CastError, CastFn, Casts, DateTimeCast, FloatCast, IntegerCast, StringCast,
};
pub use collection::{Collection, Item};
pub use definition::{path_segment, Definition};
pub use entity::Entity;
pub use error::{ModelError, ModelResult};
pub use errors::{ErrorBag, ErrorResponse};
pub use model::Model;
pub use provider::{Cancelled, Provider, Resource};
pub use status::{Activity, Outcome, Status};
