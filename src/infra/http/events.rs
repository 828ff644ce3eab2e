//! `POST /pages/{id}/events`: one browser event in, one page patch out.

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    application::{
        error::AppError,
        page::{Key, UiEvent},
    },
    domain::{posts::PostId, types::StatusFilter},
    infra::sessions::PagePatch,
};

use super::HttpState;

/// Browser event payload, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub(super) enum PageEvent {
    Search { query: String },
    Status { status: String },
    Select { id: String },
    Key { id: String, key: String },
    Resize { viewport_height_px: u32 },
}

impl From<PageEvent> for UiEvent {
    fn from(event: PageEvent) -> Self {
        match event {
            PageEvent::Search { query } => UiEvent::SearchInput(query),
            PageEvent::Status { status } => UiEvent::StatusFilterChanged(
                StatusFilter::try_from(status.as_str()).unwrap_or_default(),
            ),
            PageEvent::Select { id } => UiEvent::EntryClicked(PostId::from(id.as_str())),
            PageEvent::Key { id, key } => UiEvent::EntryKey {
                id: PostId::from(id.as_str()),
                key: Key::from_dom(&key),
            },
            PageEvent::Resize { viewport_height_px } => {
                UiEvent::WindowResized { viewport_height_px }
            }
        }
    }
}

pub(super) async fn post_event(
    State(state): State<HttpState>,
    Path(id): Path<Uuid>,
    Json(event): Json<PageEvent>,
) -> Result<Json<PagePatch>, AppError> {
    state
        .sessions
        .dispatch(&id, event.into())
        .map(Json)
        .ok_or(AppError::PageExpired(id))
}
