//! Filter state and the pure derivation of the filtered view.

use serde::Serialize;

use super::posts::{Post, PostId};
use super::types::{PostStatus, StatusFilter};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    pub query: String,
    pub status_filter: StatusFilter,
    pub selected_id: Option<PostId>,
}

impl FilterState {
    /// The query as typed, lowercased. Surrounding whitespace is part of the match.
    fn needle(&self) -> String {
        self.query.to_lowercase()
    }

    pub fn matches(&self, post: &Post) -> bool {
        self.status_filter.matches(post.status) && post.matches_needle(&self.needle())
    }

    /// Indices into `posts` of every match, in their original order.
    pub fn select(&self, posts: &[Post]) -> Vec<usize> {
        let needle = self.needle();
        posts
            .iter()
            .enumerate()
            .filter(|(_, post)| {
                self.status_filter.matches(post.status) && post.matches_needle(&needle)
            })
            .map(|(index, _)| index)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PostStats {
    pub total: usize,
    pub active: usize,
    pub maintenance: usize,
    pub inactive: usize,
}

impl PostStats {
    pub fn tally<'a>(posts: impl IntoIterator<Item = &'a Post>) -> Self {
        let mut stats = Self::default();
        for post in posts {
            stats.total += 1;
            match post.status {
                PostStatus::Active => stats.active += 1,
                PostStatus::Maintenance => stats.maintenance += 1,
                PostStatus::Inactive => stats.inactive += 1,
            }
        }
        stats
    }
}
