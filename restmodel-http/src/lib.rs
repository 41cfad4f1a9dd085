//! HTTP provider for restmodel entities.
//!
//! [`HttpProvider`] runs entity actions as REST calls through `reqwest`:
//! GET for fetch, POST for create, PUT for update and DELETE for delete. Each
//! provider owns one [`CancelSource`], so `cancel` aborts the request that
//! provider currently has in flight.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use restmodel_http::{HttpProvider, HttpProviderConfig};
//! use restmodel_model::{Definition, Entity, Model, Options};
//!
//! struct Post;
//!
//! impl Definition for Post {
//!     const RESOURCE: &'static str = "posts";
//! }
//!
//! # async fn run() -> restmodel_model::ModelResult<()> {
//! let provider = HttpProvider::new(HttpProviderConfig::with_base_url("https://api.example.com"))?;
//! let mut post = Model::<Post>::from_value(serde_json::json!({"title": "Hello"}))?
//!     .with_provider(Arc::new(provider));
//!
//! post.save(Options::default(), None).await?;
//! # Ok(())
//! # }
//! ```

mod cancel;
mod config;
mod provider;

pub use cancel::{CancelSource, CancelToken};
pub use config::HttpProviderConfig;
pub use provider::HttpProvider;
