mod support;

use serde_json::json;

use polemap::application::bootstrap::{BootstrapOptions, MapPage, bootstrap};
use polemap::application::page::{EventKind, Key, ListenerTarget, MountKey, UiEvent};
use polemap::application::store::LoadOrigin;
use polemap::domain::posts::PostId;
use polemap::domain::types::StatusFilter;
use polemap::infra::leaflet::LeafletScript;
use polemap::presentation::document::HtmlDocument;

use support::{FailingSource, StaticSource};

fn three_posts() -> StaticSource {
    StaticSource(vec![
        json!({"id": 1, "name": "Pole A", "lat": 40.7128, "lng": -74.006, "status": "active"}),
        json!({"id": 2, "name": "Pole B", "lat": 40.7138, "lng": -74.005, "status": "maintenance"}),
        json!({"id": "c-3", "name": "Corner", "lat": "40.72", "lng": "-74.01", "status": "bogus"}),
    ])
}

async fn full_page(source: &StaticSource) -> MapPage<HtmlDocument, LeafletScript> {
    bootstrap(
        HtmlDocument::complete(900),
        LeafletScript::new(),
        source,
        &BootstrapOptions::default(),
    )
    .await
    .expect("all mounts present")
}

fn statement_count(page: &MapPage<HtmlDocument, LeafletScript>) -> usize {
    page.map().statements().len()
}

#[tokio::test]
async fn missing_required_mounts_abort_initialization() {
    let source = three_posts();

    let no_list = HtmlDocument::new([MountKey::Map, MountKey::Search], 900);
    let page = bootstrap(no_list, LeafletScript::new(), &source, &BootstrapOptions::default()).await;
    assert!(page.is_none());

    let no_map = HtmlDocument::new([MountKey::PostsList], 900);
    let page = bootstrap(no_map, LeafletScript::new(), &source, &BootstrapOptions::default()).await;
    assert!(page.is_none());
}

#[tokio::test]
async fn initial_render_shows_every_post() {
    let source = three_posts();
    let page = full_page(&source).await;

    let surface = page.surface();
    assert_eq!(surface.height_px(MountKey::Map), Some(836));
    assert_eq!(surface.text(MountKey::PostCount), "(3)");
    let list = surface.html(MountKey::PostsList);
    assert_eq!(list.matches("post-entry").count(), 3);
    assert!(list.contains(r#"data-post-id="c-3""#));
    assert!(list.contains("status-inactive"));

    let statements = page.map().statements();
    assert_eq!(statements[0], r#"const map = L.map("map");"#);
    assert!(statements.iter().any(|s| s.starts_with("map.fitBounds(")));
    for index in 0..3 {
        let add = format!("markers[{index}].addTo(map);");
        assert_eq!(statements.iter().filter(|s| **s == add).count(), 1);
    }
    assert!(statements.last().expect("statements").contains("invalidateSize"));
}

#[tokio::test]
async fn listeners_follow_present_mounts() {
    let source = three_posts();
    let page = full_page(&source).await;
    assert_eq!(
        page.listeners(),
        &[
            (ListenerTarget::Mount(MountKey::Search), EventKind::Input),
            (ListenerTarget::Mount(MountKey::StatusFilter), EventKind::Change),
            (ListenerTarget::Mount(MountKey::PostsList), EventKind::Click),
            (ListenerTarget::Mount(MountKey::PostsList), EventKind::KeyDown),
            (ListenerTarget::Window, EventKind::Resize),
        ]
    );

    let minimal = HtmlDocument::new([MountKey::Map, MountKey::PostsList], 900);
    let mut page = bootstrap(minimal, LeafletScript::new(), &source, &BootstrapOptions::default())
        .await
        .expect("required mounts present");
    assert!(
        !page
            .listeners()
            .contains(&(ListenerTarget::Mount(MountKey::Search), EventKind::Input))
    );

    page.dispatch(UiEvent::SearchInput("corner".to_string()));
    assert_eq!(page.store().filtered_view().len(), 3);
}

#[tokio::test]
async fn search_and_status_sync_markers_and_list() {
    let source = three_posts();
    let mut page = full_page(&source).await;

    page.dispatch(UiEvent::SearchInput("POLE".to_string()));
    assert_eq!(page.store().filtered_view().len(), 2);
    assert_eq!(page.surface().text(MountKey::PostCount), "(2)");
    assert_eq!(
        page.map().statements().last().map(String::as_str),
        Some("markers[2].remove();")
    );

    let before = statement_count(&page);
    page.dispatch(UiEvent::SearchInput("pole".to_string()));
    assert_eq!(statement_count(&page), before);

    page.dispatch(UiEvent::StatusFilterChanged(StatusFilter::Maintenance));
    let view = page.store().filtered_view();
    assert_eq!(view.ids(), vec![&PostId::from(2)]);
    assert_eq!(page.markers().is_on_map(&PostId::from(1)), Some(false));
    assert_eq!(page.markers().is_on_map(&PostId::from(2)), Some(true));
    assert!(page.surface().html(MountKey::Summary).contains("<dd>1</dd>"));

    page.dispatch(UiEvent::SearchInput(String::new()));
    page.dispatch(UiEvent::StatusFilterChanged(StatusFilter::All));
    assert_eq!(page.store().filtered_view().len(), 3);
    assert_eq!(page.markers().is_on_map(&PostId::from("c-3")), Some(true));
}

#[tokio::test]
async fn activation_selects_and_focuses_once() {
    let source = three_posts();
    let mut page = full_page(&source).await;

    let before = statement_count(&page);
    page.dispatch(UiEvent::EntryKey {
        id: PostId::from(2),
        key: Key::from_dom("Escape"),
    });
    assert_eq!(statement_count(&page), before);
    assert!(page.store().selected_id().is_none());

    page.dispatch(UiEvent::EntryKey {
        id: PostId::from(2),
        key: Key::from_dom(" "),
    });
    assert_eq!(page.store().selected_id(), Some(&PostId::from(2)));
    let statements = &page.map().statements()[before..];
    assert_eq!(
        statements,
        &[
            "map.setView([40.7138, -74.005], 16);".to_string(),
            "markers[1].openPopup();".to_string(),
        ]
    );
    let list = page.surface().html(MountKey::PostsList);
    assert_eq!(list.matches("is-selected").count(), 1);

    let before = statement_count(&page);
    page.dispatch(UiEvent::EntryClicked(PostId::from(404)));
    assert_eq!(statement_count(&page), before);
    assert_eq!(page.store().selected_id(), Some(&PostId::from(2)));
}

#[tokio::test]
async fn focusing_a_hidden_post_skips_the_popup() {
    let source = three_posts();
    let mut page = full_page(&source).await;

    page.dispatch(UiEvent::StatusFilterChanged(StatusFilter::Active));
    let before = statement_count(&page);
    page.dispatch(UiEvent::EntryClicked(PostId::from(2)));

    let statements = &page.map().statements()[before..];
    assert_eq!(statements, &["map.setView([40.7138, -74.005], 16);".to_string()]);
    assert!(!page.surface().html(MountKey::PostsList).contains("is-selected"));
}

#[tokio::test]
async fn resize_recomputes_map_height() {
    let source = three_posts();
    let mut page = full_page(&source).await;

    page.dispatch(UiEvent::WindowResized {
        viewport_height_px: 40,
    });
    assert_eq!(page.surface().height_px(MountKey::Map), Some(0));
    assert!(
        page.map()
            .statements()
            .last()
            .expect("statements")
            .contains("invalidateSize")
    );

    let before = statement_count(&page);
    page.dispatch(UiEvent::LayoutSettled);
    assert_eq!(statement_count(&page), before + 1);
}

#[tokio::test]
async fn failed_fetch_renders_the_sample() {
    let page = bootstrap(
        HtmlDocument::complete(900),
        LeafletScript::new(),
        &FailingSource,
        &BootstrapOptions::default(),
    )
    .await
    .expect("all mounts present");

    assert_eq!(page.store().origin(), LoadOrigin::Fallback);
    assert_eq!(page.store().posts().len(), 2);
    assert_eq!(page.surface().text(MountKey::PostCount), "(2)");
}

#[tokio::test]
async fn empty_fetch_keeps_default_view() {
    let source = StaticSource(Vec::new());
    let page = full_page(&source).await;

    assert_eq!(page.store().origin(), LoadOrigin::Source);
    assert!(page.markers().is_empty());
    assert!(
        !page
            .map()
            .statements()
            .iter()
            .any(|s| s.starts_with("map.fitBounds("))
    );
    assert!(page.surface().html(MountKey::PostsList).contains("post-empty"));
    assert_eq!(page.surface().text(MountKey::PostCount), "(0)");
}
