use std::sync::Arc;

use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use metrics::counter;
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use crate::{
    application::{
        bootstrap::{BootstrapOptions, bootstrap},
        error::HttpError,
        page::{MountKey, UiEvent},
        source::PostSource,
        store::LoadOrigin,
    },
    domain::{posts::PostId, types::StatusFilter},
    infra::{
        api_client::HttpPostSource, catalog::PostCatalog, leaflet::LeafletScript,
        sessions::PageSessions,
    },
    presentation::{
        document::HtmlDocument,
        views::{
            IndexTemplate, MapPageView, StatusOptionView, render_template_response,
            render_unavailable_response,
        },
    },
};

use super::{
    api::list_posts,
    events::post_event,
    health_response,
    middleware::{ServedPosts, observe_requests},
};

const PAGE_TITLE: &str = "Utility Pole Map";

#[derive(Clone)]
pub struct HttpState {
    pub catalog: Arc<PostCatalog>,
    /// When set, the page reads posts from this remote instance instead of `catalog`.
    pub remote: Option<Arc<HttpPostSource>>,
    pub page: Arc<BootstrapOptions>,
    pub viewport_height_px: u32,
    /// Pages rendered by `/` stay live here and receive their follow-up events.
    pub sessions: Arc<PageSessions>,
}

impl HttpState {
    fn source(&self) -> &dyn PostSource {
        match self.remote.as_deref() {
            Some(remote) => remote,
            None => self.catalog.as_ref(),
        }
    }

    fn source_label(&self) -> &'static str {
        match self.remote {
            Some(_) => "remote",
            None => self.catalog.origin().label(),
        }
    }
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/posts", get(list_posts))
        .route("/pages/{id}/events", post(post_event))
        .route("/_health", get(health))
        .fallback(not_found)
        .with_state(state)
        .layer(middleware::from_fn(observe_requests))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PageQuery {
    q: Option<String>,
    status: Option<String>,
    selected: Option<String>,
}

impl PageQuery {
    /// The page events encoded by the query string, in search, filter, selection order.
    fn events(&self) -> Vec<UiEvent> {
        let mut events = Vec::new();

        if let Some(text) = self.q.as_deref().filter(|text| !text.is_empty()) {
            events.push(UiEvent::SearchInput(text.to_string()));
        }

        let status = self
            .status
            .as_deref()
            .map(|value| StatusFilter::try_from(value).unwrap_or_default())
            .unwrap_or_default();
        if status != StatusFilter::All {
            events.push(UiEvent::StatusFilterChanged(status));
        }

        if let Some(id) = self.selected.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            events.push(UiEvent::EntryClicked(PostId::from(id)));
        }

        events
    }
}

async fn index(State(state): State<HttpState>, Query(query): Query<PageQuery>) -> Response {
    let surface = HtmlDocument::complete(state.viewport_height_px);
    let Some(mut page) =
        bootstrap(surface, LeafletScript::new(), state.source(), &state.page).await
    else {
        return render_unavailable_response();
    };

    for event in query.events() {
        page.dispatch(event);
    }

    let page_id = Uuid::new_v4();
    let store = page.store();
    debug!(
        target = "polemap::http::public",
        page = %page_id,
        posts = store.posts().len(),
        visible = store.filtered_view().len(),
        selected = store.selected_id().map(PostId::as_str).unwrap_or(""),
        "map page assembled"
    );
    counter!("polemap_page_renders_total").increment(1);

    let served = ServedPosts {
        route: "/",
        source: state.source_label(),
        fallback: store.origin() == LoadOrigin::Fallback,
        posts: store.posts().len(),
    };

    let mut script = page.map_mut().take_script();
    let surface = page.surface();
    script.push_str(&surface.listener_script(&format!("/pages/{page_id}/events")));

    let store = page.store();
    let view = MapPageView {
        title: PAGE_TITLE.to_string(),
        query: store.filter().query.clone(),
        status_options: StatusOptionView::all(store.filter().status_filter),
        map_height_px: surface.height_px(MountKey::Map),
        list_html: surface.html(MountKey::PostsList).to_string(),
        count_text: surface.text(MountKey::PostCount).to_string(),
        summary_html: surface.html(MountKey::Summary).to_string(),
        script,
    };
    state.sessions.insert(page_id, page);

    let mut response = render_template_response(IndexTemplate { view }, StatusCode::OK);
    response.extensions_mut().insert(served);
    response
}

async fn health() -> Response {
    health_response()
}

async fn not_found() -> Response {
    HttpError::new(
        "infra::http::public::not_found",
        StatusCode::NOT_FOUND,
        "Page not found",
        "no route matched",
    )
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_replays_in_fixed_order() {
        let query = PageQuery {
            q: Some("pole".to_string()),
            status: Some("Maintenance".to_string()),
            selected: Some(" 2 ".to_string()),
        };

        assert_eq!(
            query.events(),
            vec![
                UiEvent::SearchInput("pole".to_string()),
                UiEvent::StatusFilterChanged(StatusFilter::Maintenance),
                UiEvent::EntryClicked(PostId::from(2)),
            ]
        );
    }

    #[test]
    fn empty_and_unknown_values_produce_no_events() {
        let query = PageQuery {
            q: Some(String::new()),
            status: Some("retired".to_string()),
            selected: Some(String::new()),
        };
        assert!(query.events().is_empty());
        assert!(PageQuery::default().events().is_empty());
    }

    #[test]
    fn whitespace_queries_are_replayed_verbatim() {
        let query = PageQuery {
            q: Some(" a".to_string()),
            ..PageQuery::default()
        };
        assert_eq!(query.events(), vec![UiEvent::SearchInput(" a".to_string())]);
    }
}
