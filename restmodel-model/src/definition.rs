use serde_json::Value;

use crate::cast::Casts;
use crate::{Action, Attributes};

/// Static description of an entity type: where it lives remotely, how it is
/// identified, its default attributes and the casts applied on write.
///
/// Only [`Definition::RESOURCE`] is required.
pub trait Definition: Send + Sync + 'static {
    /// Collection path of the resource (e.g. `"posts"`).
    const RESOURCE: &'static str;

    /// Attribute path holding the identity. Dotted paths are allowed.
    const PRIMARY_KEY: &'static str = "id";

    fn defaults() -> Attributes {
        Attributes::new()
    }

    fn casts() -> Casts {
        Casts::new()
    }

    /// `RESOURCE` for create, `RESOURCE/{id}` for the other actions when an
    /// identifier is known.
    fn endpoint(action: Action, identifier: Option<&Value>) -> String {
        let resource = Self::RESOURCE.trim_matches('/');

        match (action, identifier) {
            (Action::Create, _) | (_, None) => resource.to_string(),
            (_, Some(id)) => format!("{resource}/{}", urlencoding::encode(&path_segment(id))),
        }
    }

    fn fetch_params(_attributes: &Attributes) -> Attributes {
        Attributes::new()
    }

    fn save_data(attributes: &Attributes) -> Attributes {
        attributes.clone()
    }
}

/// Renders an identifier as a URL path segment. Strings are used unquoted.
pub fn path_segment(identifier: &Value) -> String {
    match identifier {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
