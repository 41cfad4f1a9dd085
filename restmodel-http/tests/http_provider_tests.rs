use std::collections::BTreeMap;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use restmodel_http::{HttpProvider, HttpProviderConfig};
use restmodel_model::{
    Attributes, Base, Definition, Entity, Model, ModelError, Options, Provider, SaveAction,
};
use serde_json::{json, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Post;

impl Definition for Post {
    const RESOURCE: &'static str = "posts";
}

struct Comment;

impl Definition for Comment {
    const RESOURCE: &'static str = "comments";

    fn fetch_params(attributes: &Attributes) -> Attributes {
        let mut params = Attributes::new();
        for key in ["post_id", "tags", "draft"] {
            if let Some(value) = attributes.get(key) {
                params.insert(key.to_string(), value.clone());
            }
        }
        params
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn provider_for(server: &MockServer) -> Arc<HttpProvider> {
    init_tracing();
    Arc::new(HttpProvider::new(HttpProviderConfig::with_base_url(server.uri())).unwrap())
}

fn post(value: Value, provider: &Arc<HttpProvider>) -> Model<Post> {
    Model::from_value(value).unwrap().with_provider(provider.clone())
}

// ── Config ───────────────────────────────────────────────────────

#[test]
fn config_default() {
    let cfg = HttpProviderConfig::default();
    assert_eq!(cfg.base_url, "http://localhost");
    assert_eq!(cfg.timeout_secs, 30);
    assert!(cfg.headers.is_empty());
}

#[test]
fn config_deserializes_with_defaults() {
    let cfg: HttpProviderConfig =
        serde_json::from_value(json!({"base_url": "https://api.example.com"})).unwrap();
    assert_eq!(cfg, HttpProviderConfig::with_base_url("https://api.example.com"));
}

#[test]
fn config_serde_roundtrip() {
    let cfg = HttpProviderConfig {
        base_url: "https://api.example.com/v1".to_string(),
        timeout_secs: 5,
        headers: BTreeMap::from([("x-api-key".to_string(), "secret".to_string())]),
    };
    let encoded = serde_json::to_string(&cfg).unwrap();
    let decoded: HttpProviderConfig = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, cfg);
}

// ── Construction ─────────────────────────────────────────────────

#[test]
fn provider_name() {
    let provider = HttpProvider::new(HttpProviderConfig::default()).unwrap();
    assert_eq!(provider.provider_name(), "HTTP");
    assert!(!provider.is_cancelled());
}

#[test]
fn invalid_header_is_a_config_error() {
    let cfg = HttpProviderConfig {
        headers: BTreeMap::from([("bad header".to_string(), "x".to_string())]),
        ..Default::default()
    };
    assert!(matches!(HttpProvider::new(cfg), Err(ModelError::Config(_))));
}

#[test]
fn zero_timeout_is_a_config_error() {
    let cfg = HttpProviderConfig {
        timeout_secs: 0,
        ..Default::default()
    };
    assert!(matches!(HttpProvider::new(cfg), Err(ModelError::Config(_))));
}

#[test]
fn url_joins_base_and_endpoint() {
    let provider =
        HttpProvider::new(HttpProviderConfig::with_base_url("https://api.example.com/v1/"))
            .unwrap();

    assert_eq!(provider.url("posts/1"), "https://api.example.com/v1/posts/1");
    assert_eq!(provider.url("/posts"), "https://api.example.com/v1/posts");
    assert_eq!(
        provider.url("https://other.example.com/x"),
        "https://other.example.com/x"
    );
}

// ── Fetch ────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_gets_resource_and_syncs_original() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 1, "title": "remote"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let mut model = post(json!({"id": 1, "title": "local"}), &provider);

    let result = model.fetch(Options::new()).await.unwrap();

    assert_eq!(result, Some(json!({"id": 1, "title": "remote"})));
    assert_eq!(model.get("title"), Some(&json!("remote")));
    assert_eq!(model.original(), model.attributes());
    assert!(!model.status().is_loading());
    assert!(!model.status().is_error());
}

#[tokio::test]
async fn fetch_sends_definition_params_as_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/comments"))
        .and(query_param("post_id", "3"))
        .and(query_param("tags[]", "a"))
        .and(query_param("tags[]", "b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let mut comment =
        Model::<Comment>::from_value(json!({"post_id": 3, "tags": ["a", "b"], "draft": null}))
            .unwrap()
            .with_provider(provider.clone());

    comment.fetch(Options::new()).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert!(!requests[0].url.query().unwrap_or_default().contains("draft"));
}

#[tokio::test]
async fn fetch_options_params_replace_definition_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/comments"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let mut comment = Model::<Comment>::from_value(json!({"post_id": 3}))
        .unwrap()
        .with_provider(provider.clone());

    let params: Attributes = serde_json::from_value(json!({"page": 2})).unwrap();
    comment.fetch(Options::new().with_params(params)).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].url.query(), Some("page=2"));
}

// ── Save ─────────────────────────────────────────────────────────

#[tokio::test]
async fn save_posts_new_entity_and_absorbs_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .and(body_json(json!({"title": "Hello"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": 5, "title": "Hello"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let mut model = post(json!({"title": "Hello"}), &provider);

    model.save(Options::new(), None).await.unwrap();

    assert_eq!(model.identifier(), Some(&json!(5)));
    assert!(model.status().is_success());
    assert!(model.dirty().is_empty());
}

#[tokio::test]
async fn save_puts_existing_entity() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/posts/5"))
        .and(body_json(json!({"id": 5, "title": "Edited"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 5, "title": "Edited"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let mut model = post(json!({"id": 5, "title": "Hello"}), &provider);
    model.set("title", "Edited").unwrap();

    model.save(Options::new(), None).await.unwrap();

    assert!(model.status().is_success());
    assert!(!model.is_dirty("title"));
}

#[tokio::test]
async fn options_data_and_headers_override_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .and(header("x-trace", "t-1"))
        .and(body_json(json!({"only": "this"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let mut model = post(json!({"id": 5, "title": "Hello"}), &provider);

    let data: Attributes = serde_json::from_value(json!({"only": "this"})).unwrap();
    let options = Options::new().with_data(data).with_header("x-trace", "t-1");
    model.save(options, Some(SaveAction::Create)).await.unwrap();
}

#[tokio::test]
async fn config_headers_sent_with_every_request() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/posts/9"))
        .and(header("x-api-key", "secret"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let cfg = HttpProviderConfig {
        base_url: server.uri(),
        headers: BTreeMap::from([("x-api-key".to_string(), "secret".to_string())]),
        ..Default::default()
    };
    let provider = Arc::new(HttpProvider::new(cfg).unwrap());
    let mut model = post(json!({"id": 9}), &provider);

    model.delete(Options::new()).await.unwrap();

    assert!(model.status().is_success());
}

// ── Failures ─────────────────────────────────────────────────────

#[tokio::test]
async fn validation_failure_fills_error_bag() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "message": "The given data was invalid.",
            "errors": {"title": ["required", "too short"], "body": "required"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let mut model = post(json!({}), &provider);

    let err = model.save(Options::new(), None).await.unwrap_err();

    assert!(err.is_validation());
    assert_eq!(model.errors().first("title"), Some("required"));
    assert_eq!(model.errors().all("title"), ["required", "too short"]);
    assert_eq!(model.errors().all("body"), ["required"]);
    assert_eq!(model.error_message(), Some("The given data was invalid."));
    assert_eq!(model.error_status(), Some(422));
    assert!(model.status().is_error());
    assert!(!model.status().is_saving());
}

#[tokio::test]
async fn next_request_clears_field_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"errors": {"title": ["required"]}})),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 1})))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let mut model = post(json!({}), &provider);

    model.save(Options::new(), None).await.unwrap_err();
    assert!(model.errors().has("title"));

    model.save(Options::new(), None).await.unwrap();
    assert!(model.errors().is_empty());
    assert!(model.status().is_success());
}

#[tokio::test]
async fn server_error_records_response_only() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/posts/1"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(json!({"message": "down", "errors": {"x": ["y"]}})),
        )
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let mut model = post(json!({"id": 1}), &provider);

    let err = model.fetch(Options::new()).await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert!(model.errors().is_empty());
    assert_eq!(model.error_message(), Some("down"));
    assert_eq!(model.error_status(), Some(500));
}

#[tokio::test]
async fn non_json_error_body_kept_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/posts/1"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .mount(&server)
        .await;

    let provider = provider_for(&server);
    let mut model = post(json!({"id": 1}), &provider);

    model.delete(Options::new()).await.unwrap_err();

    let response = model.errors().response().unwrap();
    assert_eq!(response.status, 503);
    assert_eq!(response.data, json!("unavailable"));
    assert_eq!(model.error_message(), None);
}

#[tokio::test]
async fn network_failure_has_no_response() {
    init_tracing();
    let config = HttpProviderConfig::with_base_url("http://127.0.0.1:1");
    let provider = Arc::new(HttpProvider::new(config).unwrap());
    let mut entity = Base::<Post>::from_value(json!({"id": 1}))
        .unwrap()
        .with_provider(provider);

    let err = entity.fetch(Options::new()).await.unwrap_err();

    assert!(matches!(err, ModelError::Network(_)));
    assert!(entity.errors().response().is_none());
    assert!(entity.status().is_error());
}
