use askama::Template;

use crate::domain::posts::Post;

use super::views::{TemplateRenderError, render_fragment};

#[derive(Template)]
#[template(path = "partials/popup.html")]
struct PopupTemplate<'a> {
    name: &'a str,
    status: &'static str,
    area: Option<&'a str>,
}

/// Escaped popup body bound to a post's marker.
pub fn render_popup(post: &Post) -> Result<String, TemplateRenderError> {
    render_fragment(
        &PopupTemplate {
            name: &post.name,
            status: post.status.as_str(),
            area: post.area.as_deref(),
        },
        "presentation::popup::render_popup",
    )
}
