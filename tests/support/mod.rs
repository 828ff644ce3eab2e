#![allow(dead_code)]

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use http_body_util::BodyExt;
use serde_json::Value;

use polemap::application::bootstrap::BootstrapOptions;
use polemap::application::source::{FetchError, PostSource};
use polemap::domain::posts::RawPost;
use polemap::infra::catalog::PostCatalog;
use polemap::infra::http::HttpState;
use polemap::infra::sessions::PageSessions;

pub async fn body_to_string(body: Body) -> String {
    let bytes = body.collect().await.expect("collect body").to_bytes();
    String::from_utf8(bytes.to_vec()).expect("utf8 body")
}

/// Serves a fixed JSON payload, as the posts endpoint would.
pub struct StaticSource(pub Vec<Value>);

#[async_trait]
impl PostSource for StaticSource {
    async fn fetch_posts(&self) -> Result<Vec<RawPost>, FetchError> {
        Ok(self.0.iter().cloned().map(RawPost::from_value).collect())
    }
}

pub struct FailingSource;

#[async_trait]
impl PostSource for FailingSource {
    async fn fetch_posts(&self) -> Result<Vec<RawPost>, FetchError> {
        Err(FetchError::Status(500))
    }
}

pub fn http_state(catalog: PostCatalog) -> HttpState {
    HttpState {
        catalog: Arc::new(catalog),
        remote: None,
        page: Arc::new(BootstrapOptions::default()),
        viewport_height_px: 800,
        sessions: Arc::new(PageSessions::new(
            NonZeroUsize::new(16).expect("non-zero capacity"),
        )),
    }
}
