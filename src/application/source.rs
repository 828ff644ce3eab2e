//! Source traits describing where a page session obtains its posts.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::posts::RawPost;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("transport error: {0}")]
    Transport(String),
    #[error("posts endpoint answered with status {0}")]
    Status(u16),
    #[error("failed to decode posts payload: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

/// One attempt at fetching the post list. Implementations never retry.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_posts(&self) -> Result<Vec<RawPost>, FetchError>;
}
