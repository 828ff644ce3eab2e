use axum::{
    Json,
    extract::State,
    http::{HeaderValue, header::CACHE_CONTROL},
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::{HttpState, middleware::ServedPosts};

/// `GET /api/posts`: the catalog as a JSON array, in catalog order.
pub(super) async fn list_posts(State(state): State<HttpState>) -> Response {
    let posts = state.catalog.posts();
    debug!(
        target = "polemap::http::api",
        posts = posts.len(),
        "serving posts"
    );

    let mut response = Json(posts).into_response();
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response.extensions_mut().insert(ServedPosts {
        route: "/api/posts",
        source: state.catalog.origin().label(),
        fallback: false,
        posts: posts.len(),
    });
    response
}
