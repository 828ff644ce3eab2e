//! Page initialization and the resulting event-driven page session.

use tracing::{debug, info};

use crate::application::map::{DEFAULT_CENTER, DEFAULT_ZOOM, MapView, TileLayer};
use crate::application::markers::MarkerRegistry;
use crate::application::page::{EventKind, ListenerTarget, MountKey, PageSurface, UiEvent};
use crate::application::source::PostSource;
use crate::application::store::PostStore;
use crate::domain::posts::LatLng;
use crate::presentation::list::ListRenderer;

pub const DEFAULT_HEADER_HEIGHT_PX: u32 = 64;
pub const DEFAULT_FIT_PADDING_PX: u32 = 32;

#[derive(Debug, Clone)]
pub struct BootstrapOptions {
    pub header_height_px: u32,
    pub fit_padding_px: u32,
    pub center: LatLng,
    pub zoom: u8,
    pub tile_layer: TileLayer,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            header_height_px: DEFAULT_HEADER_HEIGHT_PX,
            fit_padding_px: DEFAULT_FIT_PADDING_PX,
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            tile_layer: TileLayer::default(),
        }
    }
}

/// Initialize the page. Returns `None` when the map or list mount is missing.
pub async fn bootstrap<S, M>(
    mut surface: S,
    mut map: M,
    source: &dyn PostSource,
    options: &BootstrapOptions,
) -> Option<MapPage<S, M>>
where
    S: PageSurface,
    M: MapView,
{
    for required in [MountKey::Map, MountKey::PostsList] {
        if !surface.has_mount(required) {
            debug!(
                target = "polemap::bootstrap",
                mount = required.element_id(),
                "required mount point missing; map page not initialized"
            );
            return None;
        }
    }

    let map_height = map_height_px(surface.viewport_height_px(), options.header_height_px);
    surface.set_height_px(MountKey::Map, map_height);

    map.attach(MountKey::Map.element_id());
    map.set_view(options.center, options.zoom);
    map.add_tile_layer(&options.tile_layer);

    let store = PostStore::load(source).await;
    let markers = MarkerRegistry::build(&mut map, store.posts());
    if let Some(bounds) = markers.bounds() {
        map.fit_bounds(bounds, options.fit_padding_px);
    }

    let mut page = MapPage {
        surface,
        map,
        store,
        markers,
        list: ListRenderer::new(),
        header_height_px: options.header_height_px,
        wired: Vec::new(),
    };
    page.refresh();
    page.wire_listeners();
    page.map.invalidate_size();

    info!(
        target = "polemap::bootstrap",
        posts = page.store.posts().len(),
        listeners = page.wired.len(),
        "map page ready"
    );
    Some(page)
}

fn map_height_px(viewport_height_px: u32, header_height_px: u32) -> u32 {
    viewport_height_px.saturating_sub(header_height_px)
}

/// A loaded page: owns the store, the markers and both capability surfaces.
pub struct MapPage<S, M: MapView> {
    surface: S,
    map: M,
    store: PostStore,
    markers: MarkerRegistry<M::Marker>,
    list: ListRenderer,
    header_height_px: u32,
    wired: Vec<(ListenerTarget, EventKind)>,
}

impl<S, M> MapPage<S, M>
where
    S: PageSurface,
    M: MapView,
{
    pub fn store(&self) -> &PostStore {
        &self.store
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn markers(&self) -> &MarkerRegistry<M::Marker> {
        &self.markers
    }

    pub fn listeners(&self) -> &[(ListenerTarget, EventKind)] {
        &self.wired
    }

    /// Mutable access for draining what the surface recorded; content stays owned by the page.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn map_mut(&mut self) -> &mut M {
        &mut self.map
    }

    /// Deliver one UI event. Events whose listener was never wired are dropped.
    pub fn dispatch(&mut self, event: UiEvent) {
        let unwired = event
            .listener()
            .is_some_and(|listener| !self.wired.contains(&listener));
        if unwired {
            debug!(
                target = "polemap::bootstrap",
                event = ?event,
                "event ignored; listener not wired"
            );
            return;
        }

        if let Some(id) = ListRenderer::activation(&event) {
            let id = id.clone();
            if self.store.set_selected(&id) {
                self.refresh();
                self.markers.focus(&mut self.map, &id);
            }
            return;
        }

        match event {
            UiEvent::SearchInput(text) => {
                self.store.set_query(text);
                self.refresh();
            }
            UiEvent::StatusFilterChanged(status) => {
                self.store.set_status_filter(status);
                self.refresh();
            }
            UiEvent::WindowResized { viewport_height_px } => {
                let height = map_height_px(viewport_height_px, self.header_height_px);
                self.surface.set_height_px(MountKey::Map, height);
                self.map.invalidate_size();
            }
            UiEvent::LayoutSettled => self.map.invalidate_size(),
            UiEvent::EntryClicked(_) | UiEvent::EntryKey { .. } => {}
        }
    }

    /// Reconcile markers, list and summary against the current filtered view.
    fn refresh(&mut self) {
        let view = self.store.filtered_view();
        self.markers.sync(&mut self.map, view);
        self.list.render(&mut self.surface, view, self.store.selected_id());
        self.list.render_summary(&mut self.surface, self.store.stats());
    }

    fn wire_listeners(&mut self) {
        let inputs = [
            (MountKey::Search, EventKind::Input),
            (MountKey::StatusFilter, EventKind::Change),
        ];
        for (key, kind) in inputs {
            if self.surface.has_mount(key) {
                self.surface.listen(ListenerTarget::Mount(key), kind);
                self.wired.push((ListenerTarget::Mount(key), kind));
            }
        }

        let list_listeners = self.list.wire(&mut self.surface);
        self.wired.extend(list_listeners);

        self.surface.listen(ListenerTarget::Window, EventKind::Resize);
        self.wired.push((ListenerTarget::Window, EventKind::Resize));
    }
}
