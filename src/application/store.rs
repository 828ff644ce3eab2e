//! Owned page-session post state: the fetched list, the filter state and the derived view.

use metrics::counter;
use tracing::{debug, info, warn};

use crate::application::source::PostSource;
use crate::domain::filter::{FilterState, PostStats};
use crate::domain::posts::{Post, PostId, normalize_posts, sample_posts};
use crate::domain::types::StatusFilter;

const SOURCE: &str = "application::store::PostStore";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOrigin {
    Source,
    Fallback,
}

#[derive(Debug, Clone)]
pub struct PostStore {
    posts: Vec<Post>,
    filter: FilterState,
    view: Vec<usize>,
    origin: LoadOrigin,
}

impl PostStore {
    pub fn new(posts: Vec<Post>) -> Self {
        Self::with_origin(posts, LoadOrigin::Source)
    }

    fn with_origin(posts: Vec<Post>, origin: LoadOrigin) -> Self {
        let mut store = Self {
            posts,
            filter: FilterState::default(),
            view: Vec::new(),
            origin,
        };
        store.recompute();
        store
    }

    /// Fetch once from `source`. Any failure is absorbed by substituting the sample posts.
    pub async fn load(source: &dyn PostSource) -> Self {
        let raw = match source.fetch_posts().await {
            Ok(raw) => raw,
            Err(err) => {
                counter!("polemap_posts_fallback_total").increment(1);
                warn!(
                    target = "polemap::store",
                    source = SOURCE,
                    error = %err,
                    "posts fetch failed; rendering fallback sample"
                );
                return Self::with_origin(sample_posts(), LoadOrigin::Fallback);
            }
        };

        let fetched = raw.len();
        let normalized = normalize_posts(raw);
        if !normalized.rejected.is_empty() {
            counter!("polemap_posts_dropped_total").increment(normalized.rejected.len() as u64);
            for reason in &normalized.rejected {
                debug!(
                    target = "polemap::store",
                    reason = %reason,
                    "dropping malformed post"
                );
            }
        }

        info!(
            target = "polemap::store",
            fetched,
            usable = normalized.posts.len(),
            "posts loaded"
        );
        Self::with_origin(normalized.posts, LoadOrigin::Source)
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn origin(&self) -> LoadOrigin {
        self.origin
    }

    pub fn selected_id(&self) -> Option<&PostId> {
        self.filter.selected_id.as_ref()
    }

    pub fn get(&self, id: &PostId) -> Option<&Post> {
        self.posts.iter().find(|post| &post.id == id)
    }

    pub fn set_query(&mut self, text: impl Into<String>) {
        self.filter.query = text.into();
        self.recompute();
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.filter.status_filter = status;
        self.recompute();
    }

    /// Select a known post. Unknown ids leave the selection untouched and return `false`.
    pub fn set_selected(&mut self, id: &PostId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.filter.selected_id = Some(id.clone());
        self.recompute();
        true
    }

    pub fn clear_selection(&mut self) {
        self.filter.selected_id = None;
        self.recompute();
    }

    pub fn filtered_view(&self) -> FilteredView<'_> {
        FilteredView {
            posts: &self.posts,
            indices: &self.view,
        }
    }

    /// Counts over the filtered view, not the full list.
    pub fn stats(&self) -> PostStats {
        PostStats::tally(self.filtered_view().iter())
    }

    fn recompute(&mut self) {
        self.view = self.filter.select(&self.posts);
    }
}

/// Borrowed, ordered subsequence of the store's posts.
#[derive(Debug, Clone, Copy)]
pub struct FilteredView<'a> {
    posts: &'a [Post],
    indices: &'a [usize],
}

impl<'a> FilteredView<'a> {
    pub fn iter(self) -> impl Iterator<Item = &'a Post> {
        let posts = self.posts;
        self.indices.iter().map(move |&index| &posts[index])
    }

    pub fn len(self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(self) -> bool {
        self.indices.is_empty()
    }

    pub fn contains(self, id: &PostId) -> bool {
        self.iter().any(|post| &post.id == id)
    }

    pub fn ids(self) -> Vec<&'a PostId> {
        self.iter().map(|post| &post.id).collect()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::application::source::FetchError;
    use crate::domain::posts::RawPost;

    struct StaticSource(Vec<serde_json::Value>);

    #[async_trait]
    impl PostSource for StaticSource {
        async fn fetch_posts(&self) -> Result<Vec<RawPost>, FetchError> {
            Ok(self.0.iter().cloned().map(RawPost::from_value).collect())
        }
    }

    struct FailingSource(u16);

    #[async_trait]
    impl PostSource for FailingSource {
        async fn fetch_posts(&self) -> Result<Vec<RawPost>, FetchError> {
            Err(FetchError::Status(self.0))
        }
    }

    fn poles() -> StaticSource {
        StaticSource(vec![
            json!({"id": 1, "name": "Pole A", "lat": 40.0, "lng": -74.0, "status": "active"}),
            json!({"id": 2, "name": "Pole B", "lat": 40.1, "lng": -74.1, "status": "maintenance"}),
            json!({"id": 3, "name": "Mast C", "lat": 40.2, "lng": -74.2, "status": "retired"}),
            json!({"id": 4, "name": "Pole D", "lat": 40.3, "lng": -74.3, "status": "active"}),
        ])
    }

    #[tokio::test]
    async fn failed_fetch_substitutes_sample_posts() {
        let store = PostStore::load(&FailingSource(500)).await;
        assert_eq!(store.origin(), LoadOrigin::Fallback);
        assert_eq!(store.posts(), sample_posts().as_slice());
        assert_eq!(store.filtered_view().len(), 2);
    }

    #[tokio::test]
    async fn empty_response_is_not_replaced() {
        let store = PostStore::load(&StaticSource(Vec::new())).await;
        assert_eq!(store.origin(), LoadOrigin::Source);
        assert!(store.filtered_view().is_empty());
    }

    #[tokio::test]
    async fn view_preserves_fetch_order() {
        let mut store = PostStore::load(&poles()).await;
        store.set_query("pole");
        let ids: Vec<String> = store
            .filtered_view()
            .iter()
            .map(|post| post.id.to_string())
            .collect();
        assert_eq!(ids, vec!["1", "2", "4"]);

        store.set_status_filter(StatusFilter::Active);
        let ids: Vec<String> = store
            .filtered_view()
            .iter()
            .map(|post| post.id.to_string())
            .collect();
        assert_eq!(ids, vec!["1", "4"]);
    }

    #[tokio::test]
    async fn stats_follow_the_filtered_view() {
        let mut store = PostStore::load(&poles()).await;
        assert_eq!(
            store.stats(),
            PostStats {
                total: 4,
                active: 2,
                maintenance: 1,
                inactive: 1,
            }
        );

        store.set_query("pole");
        assert_eq!(
            store.stats(),
            PostStats {
                total: 3,
                active: 2,
                maintenance: 1,
                inactive: 0,
            }
        );
    }

    #[tokio::test]
    async fn selection_only_accepts_known_posts() {
        let mut store = PostStore::load(&poles()).await;
        assert!(store.set_selected(&PostId::from(2)));
        assert_eq!(store.selected_id(), Some(&PostId::from(2)));

        assert!(!store.set_selected(&PostId::from(99)));
        assert_eq!(store.selected_id(), Some(&PostId::from(2)));

        store.clear_selection();
        assert_eq!(store.selected_id(), None);
    }

    #[tokio::test]
    async fn clearing_the_query_restores_everything() {
        let mut store = PostStore::load(&poles()).await;
        store.set_query("mast");
        assert_eq!(store.filtered_view().len(), 1);
        store.set_query("");
        assert_eq!(store.filtered_view().len(), 4);
    }

    #[tokio::test]
    async fn leading_whitespace_narrows_the_view() {
        let mut store = PostStore::load(&StaticSource(vec![
            json!({"id": 1, "name": "Pole A", "lat": 40.0, "lng": -74.0}),
            json!({"id": 2, "name": "Alpha", "lat": 40.1, "lng": -74.1}),
        ]))
        .await;

        store.set_query("a");
        assert_eq!(store.filtered_view().len(), 2);

        store.set_query(" a");
        assert_eq!(store.filtered_view().ids(), vec![&PostId::from(1)]);
    }
}
