use std::time::Instant;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request, StatusCode},
    middleware::Next,
    response::Response,
};
use metrics::histogram;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::application::error::ErrorReport;

/// Attached by handlers that serve posts: where they came from and how many.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServedPosts {
    pub route: &'static str,
    pub source: &'static str,
    pub fallback: bool,
    pub posts: usize,
}

/// Tags every response with `x-request-id`, logs where served posts came from
/// together with the handler latency, and reports failed requests.
pub async fn observe_requests(request: Request<Body>, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let start = Instant::now();

    let mut response = next.run(request).await;
    let elapsed = start.elapsed();

    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-request-id"), value);
    }

    if let Some(served) = response.extensions_mut().remove::<ServedPosts>() {
        histogram!("polemap_posts_response_seconds", "route" => served.route)
            .record(elapsed.as_secs_f64());
        info!(
            target = "polemap::http::response",
            route = served.route,
            source = served.source,
            fallback = served.fallback,
            posts = served.posts,
            elapsed_ms = elapsed.as_millis(),
            request_id = %request_id,
            "posts served"
        );
    }

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        let report = response.extensions_mut().remove::<ErrorReport>();
        log_failure(status, &method, &uri, report, elapsed.as_millis(), request_id);
    }

    response
}

fn log_failure(
    status: StatusCode,
    method: &axum::http::Method,
    uri: &axum::http::Uri,
    report: Option<ErrorReport>,
    elapsed_ms: u128,
    request_id: Uuid,
) {
    let (source, messages) = match report {
        Some(report) => (report.source, report.messages),
        None => ("unknown", Vec::new()),
    };
    let detail = messages
        .first()
        .map(String::as_str)
        .unwrap_or("no diagnostic available");

    if status.is_server_error() {
        error!(
            target = "polemap::http::response",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            elapsed_ms,
            source,
            detail,
            chain = ?messages,
            request_id = %request_id,
            "request failed"
        );
    } else {
        warn!(
            target = "polemap::http::response",
            status = status.as_u16(),
            method = %method,
            path = %uri.path(),
            elapsed_ms,
            source,
            detail,
            request_id = %request_id,
            "client request error"
        );
    }
}
