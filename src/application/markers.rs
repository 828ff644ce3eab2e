//! One marker per post identity, toggled on and off the map to follow the filtered view.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::application::map::{FOCUS_ZOOM, MapView, MarkerIcon, MarkerSpec};
use crate::application::store::FilteredView;
use crate::domain::posts::{LatLng, LatLngBounds, Post, PostId};
use crate::presentation::popup::render_popup;

struct MarkerEntry<H> {
    id: PostId,
    position: LatLng,
    handle: H,
    on_map: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncSummary {
    pub added: usize,
    pub removed: usize,
}

impl SyncSummary {
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.removed == 0
    }
}

pub struct MarkerRegistry<H> {
    entries: Vec<MarkerEntry<H>>,
    index: HashMap<PostId, usize>,
}

impl<H> MarkerRegistry<H> {
    /// Create every marker up front. Markers start detached; call `sync` to place them.
    pub fn build<M>(map: &mut M, posts: &[Post]) -> Self
    where
        M: MapView<Marker = H>,
    {
        let mut entries = Vec::with_capacity(posts.len());
        let mut index = HashMap::with_capacity(posts.len());

        for post in posts {
            let popup_html = render_popup(post).unwrap_or_else(|err| {
                warn!(
                    target = "polemap::markers",
                    post_id = %post.id,
                    error = %err,
                    "popup rendering failed; marker has an empty popup"
                );
                String::new()
            });
            let handle = map.create_marker(MarkerSpec {
                position: post.position,
                icon: MarkerIcon::for_status(post.status),
                popup_html,
            });
            index.insert(post.id.clone(), entries.len());
            entries.push(MarkerEntry {
                id: post.id.clone(),
                position: post.position,
                handle,
                on_map: false,
            });
        }

        Self { entries, index }
    }

    /// Put exactly the markers of `view` on the map. Markers already in the right state are untouched.
    pub fn sync<M>(&mut self, map: &mut M, view: FilteredView<'_>) -> SyncSummary
    where
        M: MapView<Marker = H>,
    {
        let visible: HashSet<&PostId> = view.iter().map(|post| &post.id).collect();
        let mut summary = SyncSummary::default();

        for entry in &mut self.entries {
            let wanted = visible.contains(&entry.id);
            if wanted == entry.on_map {
                continue;
            }
            if wanted {
                map.add_marker(&entry.handle);
                summary.added += 1;
            } else {
                map.remove_marker(&entry.handle);
                summary.removed += 1;
            }
            entry.on_map = wanted;
        }

        if !summary.is_noop() {
            debug!(
                target = "polemap::markers",
                added = summary.added,
                removed = summary.removed,
                "markers synchronized"
            );
        }
        summary
    }

    /// Center on the post's marker and open its popup. Unknown ids are ignored.
    pub fn focus<M>(&self, map: &mut M, id: &PostId) -> bool
    where
        M: MapView<Marker = H>,
    {
        let Some(entry) = self.index.get(id).map(|&slot| &self.entries[slot]) else {
            return false;
        };

        map.set_view(entry.position, FOCUS_ZOOM);
        // A detached marker has no popup pane to open into.
        if entry.on_map {
            map.open_popup(&entry.handle);
        }
        true
    }

    pub fn bounds(&self) -> Option<LatLngBounds> {
        LatLngBounds::around(self.entries.iter().map(|entry| entry.position))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_on_map(&self, id: &PostId) -> Option<bool> {
        self.index.get(id).map(|&slot| self.entries[slot].on_map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::map::TileLayer;
    use crate::application::store::PostStore;
    use crate::domain::posts::sample_posts;
    use crate::domain::types::StatusFilter;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Create(MarkerSpec),
        Add(usize),
        Remove(usize),
        View(LatLng, u8),
        Popup(usize),
    }

    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
        created: usize,
    }

    impl MapView for Recorder {
        type Marker = usize;

        fn attach(&mut self, _container_id: &str) {}

        fn set_view(&mut self, center: LatLng, zoom: u8) {
            self.ops.push(Op::View(center, zoom));
        }

        fn add_tile_layer(&mut self, _layer: &TileLayer) {}

        fn create_marker(&mut self, spec: MarkerSpec) -> usize {
            self.ops.push(Op::Create(spec));
            self.created += 1;
            self.created - 1
        }

        fn add_marker(&mut self, marker: &usize) {
            self.ops.push(Op::Add(*marker));
        }

        fn remove_marker(&mut self, marker: &usize) {
            self.ops.push(Op::Remove(*marker));
        }

        fn open_popup(&mut self, marker: &usize) {
            self.ops.push(Op::Popup(*marker));
        }

        fn fit_bounds(&mut self, _bounds: LatLngBounds, _padding_px: u32) {}

        fn invalidate_size(&mut self) {}
    }

    #[test]
    fn markers_are_created_once_with_status_colors() {
        let mut map = Recorder::default();
        let posts = sample_posts();
        let registry = MarkerRegistry::build(&mut map, &posts);

        assert_eq!(registry.len(), 2);
        let colors: Vec<&str> = map
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Create(spec) => Some(spec.icon.color),
                _ => None,
            })
            .collect();
        assert_eq!(colors, vec!["#059669", "#b45309"]);
        assert_eq!(registry.is_on_map(&PostId::from(1)), Some(false));
    }

    #[test]
    fn sync_toggles_membership_and_is_idempotent() {
        let mut map = Recorder::default();
        let mut store = PostStore::new(sample_posts());
        let mut registry = MarkerRegistry::build(&mut map, store.posts());
        map.ops.clear();

        let first = registry.sync(&mut map, store.filtered_view());
        assert_eq!(first, SyncSummary { added: 2, removed: 0 });

        let again = registry.sync(&mut map, store.filtered_view());
        assert!(again.is_noop());
        assert_eq!(map.ops, vec![Op::Add(0), Op::Add(1)]);

        store.set_status_filter(StatusFilter::Maintenance);
        let narrowed = registry.sync(&mut map, store.filtered_view());
        assert_eq!(narrowed, SyncSummary { added: 0, removed: 1 });
        assert_eq!(map.ops.last(), Some(&Op::Remove(0)));
        assert_eq!(map.created, 2);
    }

    #[test]
    fn focus_centers_and_opens_popup_once() {
        let mut map = Recorder::default();
        let store = PostStore::new(sample_posts());
        let mut registry = MarkerRegistry::build(&mut map, store.posts());
        registry.sync(&mut map, store.filtered_view());
        map.ops.clear();

        assert!(registry.focus(&mut map, &PostId::from(2)));
        assert_eq!(
            map.ops,
            vec![Op::View(LatLng::new(40.7138, -74.0050), FOCUS_ZOOM), Op::Popup(1)]
        );

        map.ops.clear();
        assert!(!registry.focus(&mut map, &PostId::from(42)));
        assert!(map.ops.is_empty());
    }

    #[test]
    fn popup_html_escapes_names() {
        let mut map = Recorder::default();
        let mut posts = sample_posts();
        posts[0].name = "<script>alert(1)</script>".to_string();
        MarkerRegistry::build(&mut map, &posts);

        let Op::Create(spec) = &map.ops[0] else {
            panic!("first op should create a marker");
        };
        assert!(!spec.popup_html.contains("<script>"));
        assert!(spec.popup_html.contains("&lt;script&gt;"));
    }
}
