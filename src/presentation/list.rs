//! Sidebar list rendering, keyed by post identity.

use askama::Template;
use tracing::error;

use crate::application::page::{EventKind, ListenerTarget, MountKey, PageSurface, UiEvent};
use crate::application::store::FilteredView;
use crate::domain::filter::PostStats;
use crate::domain::posts::PostId;

use super::views::{SummaryTemplate, render_fragment};

struct ListEntryView<'a> {
    id: &'a str,
    name: &'a str,
    status: &'static str,
    selected: bool,
}

#[derive(Template)]
#[template(path = "partials/post_list.html")]
struct PostListTemplate<'a> {
    entries: Vec<ListEntryView<'a>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ListRenderer;

impl ListRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Listeners the list needs; only registered when the list mount exists.
    pub fn wire<S: PageSurface + ?Sized>(
        &self,
        surface: &mut S,
    ) -> Vec<(ListenerTarget, EventKind)> {
        if !surface.has_mount(MountKey::PostsList) {
            return Vec::new();
        }
        let target = ListenerTarget::Mount(MountKey::PostsList);
        let listeners = vec![(target, EventKind::Click), (target, EventKind::KeyDown)];
        for &(target, kind) in &listeners {
            surface.listen(target, kind);
        }
        listeners
    }

    /// Replace the list content with one entry per post in `view`.
    pub fn render<S: PageSurface + ?Sized>(
        &self,
        surface: &mut S,
        view: FilteredView<'_>,
        selected: Option<&PostId>,
    ) {
        if !surface.has_mount(MountKey::PostsList) {
            return;
        }

        let entries = view
            .iter()
            .map(|post| ListEntryView {
                id: post.id.as_str(),
                name: &post.name,
                status: post.status.as_str(),
                selected: selected == Some(&post.id),
            })
            .collect();

        match render_fragment(
            &PostListTemplate { entries },
            "presentation::list::ListRenderer::render",
        ) {
            Ok(html) => surface.replace_html(MountKey::PostsList, html),
            Err(err) => error!(
                target = "polemap::list",
                error = %err,
                "failed to render posts list"
            ),
        }
    }

    /// Count and summary displays, each skipped when its mount is absent.
    pub fn render_summary<S: PageSurface + ?Sized>(&self, surface: &mut S, stats: PostStats) {
        if surface.has_mount(MountKey::PostCount) {
            surface.set_text(MountKey::PostCount, format!("({})", stats.total));
        }

        if !surface.has_mount(MountKey::Summary) {
            return;
        }
        match render_fragment(
            &SummaryTemplate { stats },
            "presentation::list::ListRenderer::render_summary",
        ) {
            Ok(html) => surface.replace_html(MountKey::Summary, html),
            Err(err) => error!(
                target = "polemap::list",
                error = %err,
                "failed to render posts summary"
            ),
        }
    }

    /// The post an entry event selects: any click, or Enter/Space.
    pub fn activation(event: &UiEvent) -> Option<&PostId> {
        match event {
            UiEvent::EntryClicked(id) => Some(id),
            UiEvent::EntryKey { id, key } if key.activates() => Some(id),
            _ => None,
        }
    }
}
