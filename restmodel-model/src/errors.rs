//! Per-field error storage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The response of the last failed request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: u16,
    pub data: Value,
}

impl ErrorResponse {
    pub fn new(status: u16, data: Value) -> Self {
        Self { status, data }
    }

    /// The `message` field of the response body, if it carries one.
    pub fn message(&self) -> Option<&str> {
        self.data.get("message").and_then(Value::as_str)
    }
}

/// Field name to ordered messages, plus the last failed response.
///
/// `first("title")` yields the first message for a field and `all("title")`
/// the whole sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorBag {
    errors: BTreeMap<String, Vec<String>>,
    response: Option<ErrorResponse>,
}

impl ErrorBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every field error. Never merges.
    pub fn set_errors(&mut self, errors: BTreeMap<String, Vec<String>>) -> &mut Self {
        self.errors = errors;
        self
    }

    /// Replaces every field error with the contents of a JSON `errors` payload.
    ///
    /// Message arrays are taken as-is, a lone string becomes a one-element
    /// sequence. Anything that is not an object empties the bag.
    pub fn set_errors_from_value(&mut self, payload: &Value) -> &mut Self {
        let errors = payload
            .as_object()
            .map(|fields| {
                fields
                    .iter()
                    .map(|(field, messages)| (field.clone(), messages_of(messages)))
                    .collect()
            })
            .unwrap_or_default();

        self.set_errors(errors)
    }

    pub fn set_response(&mut self, response: Option<ErrorResponse>) -> &mut Self {
        self.response = response;
        self
    }

    /// Drops the field errors. The recorded response is kept.
    pub fn clear(&mut self) {
        self.errors.clear();
    }

    /// First message recorded for `field`.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .and_then(|messages| messages.first())
            .map(String::as_str)
    }

    /// Every message recorded for `field`, in order.
    pub fn all(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn has(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }

    pub fn response(&self) -> Option<&ErrorResponse> {
        self.response.as_ref()
    }

    /// Number of fields with errors.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.errors
            .iter()
            .map(|(field, messages)| (field.as_str(), messages.as_slice()))
    }
}

impl<'a> IntoIterator for &'a ErrorBag {
    type Item = (&'a String, &'a Vec<String>);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Vec<String>>;

    fn into_iter(self) -> Self::IntoIter {
        self.errors.iter()
    }
}

fn messages_of(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        Value::String(s) => vec![s.clone()],
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}
