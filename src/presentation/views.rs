use crate::application::error::{ErrorReport, HttpError};
use crate::domain::filter::PostStats;
use crate::domain::types::StatusFilter;
use askama::{Error as AskamaError, Template};
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("{public_message}")]
pub struct TemplateRenderError {
    pub(crate) source: &'static str,
    pub(crate) public_message: &'static str,
    #[source]
    pub(crate) error: AskamaError,
}

impl TemplateRenderError {
    pub fn new(source: &'static str, public_message: &'static str, error: AskamaError) -> Self {
        Self {
            source,
            public_message,
            error,
        }
    }
}

impl From<TemplateRenderError> for HttpError {
    fn from(err: TemplateRenderError) -> Self {
        let TemplateRenderError {
            source,
            public_message,
            error,
        } = err;

        HttpError::from_error(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            public_message,
            &error,
        )
    }
}

/// Render a partial into an owned markup string.
pub fn render_fragment<T: Template>(
    template: &T,
    source: &'static str,
) -> Result<String, TemplateRenderError> {
    template
        .render()
        .map_err(|err| TemplateRenderError::new(source, "Fragment rendering failed", err))
}

pub fn render_template<T: Template>(template: T) -> Result<Html<String>, HttpError> {
    template.render().map(Html).map_err(|err| {
        TemplateRenderError::new(
            "presentation::views::render_template",
            "Template rendering failed",
            err,
        )
        .into()
    })
}

pub fn render_template_response<T: Template>(template: T, status: StatusCode) -> Response {
    match render_template(template) {
        Ok(html) => (status, html).into_response(),
        Err(err) => err.into_response(),
    }
}

pub fn render_unavailable_response() -> Response {
    let mut response =
        render_template_response(UnavailableTemplate, StatusCode::SERVICE_UNAVAILABLE);
    ErrorReport::from_message(
        "presentation::views::render_unavailable_response",
        StatusCode::SERVICE_UNAVAILABLE,
        "map page is missing a required mount point",
    )
    .attach(&mut response);
    response
}

#[derive(Clone)]
pub struct StatusOptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl StatusOptionView {
    pub fn all(current: StatusFilter) -> Vec<Self> {
        StatusFilter::ALL
            .iter()
            .map(|&filter| Self {
                value: filter.as_str(),
                label: filter.label(),
                selected: filter == current,
            })
            .collect()
    }
}

pub struct MapPageView {
    pub title: String,
    pub query: String,
    pub status_options: Vec<StatusOptionView>,
    pub map_height_px: Option<u32>,
    pub list_html: String,
    pub count_text: String,
    pub summary_html: String,
    pub script: String,
}

#[derive(Template)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub view: MapPageView,
}

#[derive(Template)]
#[template(path = "unavailable.html")]
pub struct UnavailableTemplate;

#[derive(Template)]
#[template(path = "partials/summary.html")]
pub struct SummaryTemplate {
    pub stats: PostStats,
}
