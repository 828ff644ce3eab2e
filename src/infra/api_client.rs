//! Remote `/api/posts` client used when the page is fed by another instance.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

use crate::application::source::{FetchError, PostSource};
use crate::domain::posts::RawPost;

use super::error::InfraError;

const POSTS_PATH: &str = "api/posts";

#[derive(Debug, Clone)]
pub struct HttpPostSource {
    client: Client,
    endpoint: Url,
}

impl HttpPostSource {
    pub fn new(base: &Url, timeout: Duration) -> Result<Self, InfraError> {
        let endpoint = posts_endpoint(base)?;
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::http(format!("failed to build client: {err}")))?;
        Ok(Self { client, endpoint })
    }

    pub fn user_agent() -> &'static str {
        concat!("polemap/", env!("CARGO_PKG_VERSION"))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn posts_endpoint(base: &Url) -> Result<Url, InfraError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(POSTS_PATH)
        .map_err(|err| InfraError::configuration(format!("invalid posts endpoint: {err}")))
}

#[async_trait]
impl PostSource for HttpPostSource {
    async fn fetch_posts(&self) -> Result<Vec<RawPost>, FetchError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(FetchError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(FetchError::transport)?;
        let records: Vec<Value> = serde_json::from_slice(&body).map_err(FetchError::decode)?;

        debug!(
            target = "polemap::api_client",
            endpoint = %self.endpoint,
            records = records.len(),
            "posts fetched"
        );
        Ok(records.into_iter().map(RawPost::from_value).collect())
    }
}
