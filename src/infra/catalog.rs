//! In-process post catalog backing `/api/posts`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{info, warn};

use crate::application::source::{FetchError, PostSource};
use crate::domain::posts::{Post, RawPost, normalize_posts, sample_posts};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogOrigin {
    SeedFile(PathBuf),
    Sample,
}

impl CatalogOrigin {
    pub fn label(&self) -> &'static str {
        match self {
            CatalogOrigin::SeedFile(_) => "seed_file",
            CatalogOrigin::Sample => "sample",
        }
    }
}

/// Immutable post list loaded once at startup.
#[derive(Debug, Clone)]
pub struct PostCatalog {
    posts: Vec<Post>,
    origin: CatalogOrigin,
}

impl PostCatalog {
    pub fn sample() -> Self {
        Self {
            posts: sample_posts(),
            origin: CatalogOrigin::Sample,
        }
    }

    /// Read the seed file when given. Unreadable, malformed or empty seeds yield the sample.
    pub async fn load(seed_file: Option<&Path>) -> Self {
        let Some(path) = seed_file else {
            info!(
                target = "polemap::catalog",
                posts = sample_posts().len(),
                "no seed file configured; serving sample posts"
            );
            return Self::sample();
        };

        match read_seed(path).await {
            Ok(posts) if !posts.is_empty() => {
                info!(
                    target = "polemap::catalog",
                    path = %path.display(),
                    posts = posts.len(),
                    "post catalog loaded"
                );
                Self {
                    posts,
                    origin: CatalogOrigin::SeedFile(path.to_path_buf()),
                }
            }
            Ok(_) => {
                warn!(
                    target = "polemap::catalog",
                    path = %path.display(),
                    "seed file holds no usable posts; serving sample posts"
                );
                Self::sample()
            }
            Err(reason) => {
                warn!(
                    target = "polemap::catalog",
                    path = %path.display(),
                    error = %reason,
                    "failed to load seed file; serving sample posts"
                );
                Self::sample()
            }
        }
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn origin(&self) -> &CatalogOrigin {
        &self.origin
    }
}

async fn read_seed(path: &Path) -> Result<Vec<Post>, String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| format!("read failed: {err}"))?;
    let records: Vec<Value> =
        serde_json::from_slice(&bytes).map_err(|err| format!("invalid JSON array: {err}"))?;
    Ok(normalize_posts(records.into_iter().map(RawPost::from_value)).posts)
}

#[async_trait]
impl PostSource for PostCatalog {
    async fn fetch_posts(&self) -> Result<Vec<RawPost>, FetchError> {
        Ok(self.posts.iter().map(RawPost::from).collect())
    }
}
