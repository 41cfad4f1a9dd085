//! HTTP provider implementation.
//!
//! Maps entity actions onto REST verbs: fetch is a GET with the entity's
//! fetch params as query, create and update POST/PUT the entity's save data as
//! JSON, delete is a bare DELETE.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, StatusCode};
use restmodel_model::{
    Action, Attributes, Cancelled, ErrorResponse, ModelError, ModelResult, Options, Provider,
    Resource,
};
use serde_json::Value;
use tracing::{debug, info};

use crate::cancel::CancelSource;
use crate::config::HttpProviderConfig;

/// A [`Provider`] that talks to a REST endpoint over HTTP.
///
/// Cancellation is scoped to the provider instance: [`Provider::cancel`]
/// aborts whatever request this provider has in flight, and every later
/// request on it fails as cancelled. Bind a fresh provider to start over.
#[derive(Debug)]
pub struct HttpProvider {
    config: HttpProviderConfig,
    client: Client,
    source: CancelSource,
}

impl HttpProvider {
    /// Creates a provider with a client built from `config`.
    pub fn new(config: HttpProviderConfig) -> ModelResult<Self> {
        if config.timeout_secs == 0 {
            return Err(ModelError::Config(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ModelError::Config(format!("invalid header name {name}: {e}")))?;
            let value = HeaderValue::from_str(value).map_err(|e| {
                ModelError::Config(format!("invalid header value for {}: {e}", name.as_str()))
            })?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| ModelError::Config(format!("failed to create HTTP client: {e}")))?;

        Ok(Self::with_client(config, client))
    }

    /// Creates a provider around an existing client. `config.headers` and
    /// `config.timeout_secs` are not applied to it.
    pub fn with_client(config: HttpProviderConfig, client: Client) -> Self {
        Self {
            config,
            client,
            source: CancelSource::new(),
        }
    }

    pub fn config(&self) -> &HttpProviderConfig {
        &self.config
    }

    /// The client used to make requests.
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn is_cancelled(&self) -> bool {
        self.source.is_cancelled()
    }

    /// Joins an entity endpoint to the base URL. Absolute URLs are kept as-is.
    pub fn url(&self, endpoint: &str) -> String {
        if endpoint.starts_with("http://") || endpoint.starts_with("https://") {
            return endpoint.to_string();
        }

        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }

    /// Executes one request on behalf of `resource`.
    ///
    /// The resource's `cancelled` is reset first. On failure the response (or
    /// `None` when there is none) is recorded on its error bag; a 422 also
    /// replaces the field errors with the body's `errors`; a cancellation
    /// marks the resource cancelled. The error is always returned.
    async fn make_request(
        &self,
        resource: &mut dyn Resource,
        method: Method,
        endpoint: &str,
        params: Option<Attributes>,
        data: Option<Attributes>,
        options: &Options,
    ) -> ModelResult<Value> {
        resource.set_cancelled(Cancelled::No);

        let url = self.url(endpoint);
        let mut request = self.client.request(method.clone(), &url);

        if let Some(params) = &params {
            request = request.query(&query_pairs(params));
        }
        if let Some(data) = &data {
            request = request.json(data);
        }
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }

        debug!("{} {}", method, url);

        let mut token = self.source.token();
        let exchange = async {
            let response = request
                .send()
                .await
                .map_err(|e| ModelError::Network(format!("{method} {url} failed: {e}")))?;
            let status = response.status();
            let body = response
                .bytes()
                .await
                .map_err(|e| ModelError::Network(format!("read {url} body failed: {e}")))?;
            Ok::<_, ModelError>((status, parse_body(&body)))
        };

        let outcome = tokio::select! {
            biased;
            cancelled = token.cancelled() => Err(cancelled),
            exchange = exchange => Ok(exchange),
        };

        match outcome {
            Err(cancelled) => {
                debug!("{} {} cancelled", method, url);
                resource.errors_mut().set_response(None);
                let message = cancelled.message().map(str::to_string);
                resource.set_cancelled(cancelled);
                Err(ModelError::Cancelled(message))
            }
            Ok(Err(e)) => {
                resource.errors_mut().set_response(None);
                Err(e)
            }
            Ok(Ok((status, data))) if status.is_success() => Ok(data),
            Ok(Ok((status, data))) => {
                let response = ErrorResponse::new(status.as_u16(), data);

                if status == StatusCode::UNPROCESSABLE_ENTITY {
                    let errors = response.data.get("errors").cloned().unwrap_or_default();
                    resource.errors_mut().set_errors_from_value(&errors);
                }
                resource.errors_mut().set_response(Some(response.clone()));

                Err(ModelError::Response(response))
            }
        }
    }
}

#[async_trait]
impl Provider for HttpProvider {
    fn provider_name(&self) -> &'static str {
        "HTTP"
    }

    async fn fetch(&self, resource: &mut dyn Resource, options: &Options) -> ModelResult<Value> {
        let endpoint = resource.endpoint(Action::Fetch);
        let params = options
            .params
            .clone()
            .unwrap_or_else(|| resource.fetch_params());

        self.make_request(
            resource,
            Method::GET,
            &endpoint,
            Some(params),
            options.data.clone(),
            options,
        )
        .await
    }

    async fn create(&self, resource: &mut dyn Resource, options: &Options) -> ModelResult<Value> {
        let endpoint = resource.endpoint(Action::Create);
        let data = options.data.clone().unwrap_or_else(|| resource.save_data());

        let created = self
            .make_request(
                resource,
                Method::POST,
                &endpoint,
                options.params.clone(),
                Some(data),
                options,
            )
            .await?;

        info!("Created resource at {}", endpoint);
        Ok(created)
    }

    async fn update(&self, resource: &mut dyn Resource, options: &Options) -> ModelResult<Value> {
        let endpoint = resource.endpoint(Action::Update);
        let data = options.data.clone().unwrap_or_else(|| resource.save_data());

        let updated = self
            .make_request(
                resource,
                Method::PUT,
                &endpoint,
                options.params.clone(),
                Some(data),
                options,
            )
            .await?;

        info!("Updated resource: {}", endpoint);
        Ok(updated)
    }

    async fn delete(&self, resource: &mut dyn Resource, options: &Options) -> ModelResult<Value> {
        let endpoint = resource.endpoint(Action::Delete);

        let deleted = self
            .make_request(
                resource,
                Method::DELETE,
                &endpoint,
                options.params.clone(),
                options.data.clone(),
                options,
            )
            .await?;

        info!("Deleted resource: {}", endpoint);
        Ok(deleted)
    }

    fn cancel(&self, message: Option<String>) {
        if self.source.cancel(message) {
            info!("Cancelled {} provider requests", self.provider_name());
        }
    }
}

/// Flattens attributes into query pairs. Strings go unquoted, arrays repeat
/// the key as `key[]`, nulls are dropped, objects are sent as JSON.
fn query_pairs(params: &Attributes) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(params.len());

    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::Array(items) => pairs.extend(
                items
                    .iter()
                    .filter(|item| !item.is_null())
                    .map(|item| (format!("{key}[]"), scalar(item))),
            ),
            other => pairs.push((key.clone(), scalar(other))),
        }
    }

    pairs
}

fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Empty bodies become `null`, non-JSON bodies a string.
fn parse_body(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }

    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
