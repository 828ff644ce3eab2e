//! The page-surface capability: fixed mount points, content replacement and listener wiring.

use crate::domain::posts::PostId;
use crate::domain::types::StatusFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MountKey {
    Map,
    PostsList,
    Search,
    StatusFilter,
    PostCount,
    Summary,
}

impl MountKey {
    pub const ALL: [MountKey; 6] = [
        MountKey::Map,
        MountKey::PostsList,
        MountKey::Search,
        MountKey::StatusFilter,
        MountKey::PostCount,
        MountKey::Summary,
    ];

    /// Element id of the mount point in the page markup.
    pub fn element_id(self) -> &'static str {
        match self {
            MountKey::Map => "map",
            MountKey::PostsList => "posts-list",
            MountKey::Search => "post-search",
            MountKey::StatusFilter => "status-filter",
            MountKey::PostCount => "post-count",
            MountKey::Summary => "post-summary",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    Mount(MountKey),
    Window,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Input,
    Change,
    Click,
    KeyDown,
    Resize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Other(String),
}

impl Key {
    /// Interpret a `KeyboardEvent.key` value.
    pub fn from_dom(value: &str) -> Self {
        match value {
            "Enter" => Key::Enter,
            " " | "Space" | "Spacebar" => Key::Space,
            other => Key::Other(other.to_string()),
        }
    }

    pub fn activates(&self) -> bool {
        matches!(self, Key::Enter | Key::Space)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    SearchInput(String),
    StatusFilterChanged(StatusFilter),
    EntryClicked(PostId),
    EntryKey { id: PostId, key: Key },
    WindowResized { viewport_height_px: u32 },
    LayoutSettled,
}

impl UiEvent {
    /// The listener that must be registered for this event to be delivered.
    pub fn listener(&self) -> Option<(ListenerTarget, EventKind)> {
        let listener = match self {
            UiEvent::SearchInput(_) => (ListenerTarget::Mount(MountKey::Search), EventKind::Input),
            UiEvent::StatusFilterChanged(_) => (
                ListenerTarget::Mount(MountKey::StatusFilter),
                EventKind::Change,
            ),
            UiEvent::EntryClicked(_) => {
                (ListenerTarget::Mount(MountKey::PostsList), EventKind::Click)
            }
            UiEvent::EntryKey { .. } => {
                (ListenerTarget::Mount(MountKey::PostsList), EventKind::KeyDown)
            }
            UiEvent::WindowResized { .. } => (ListenerTarget::Window, EventKind::Resize),
            UiEvent::LayoutSettled => return None,
        };
        Some(listener)
    }
}

pub trait PageSurface {
    fn has_mount(&self, key: MountKey) -> bool;
    /// Replace the mount's children with pre-escaped markup.
    fn replace_html(&mut self, key: MountKey, html: String);
    fn set_text(&mut self, key: MountKey, text: String);
    fn set_height_px(&mut self, key: MountKey, height_px: u32);
    fn viewport_height_px(&self) -> u32;
    fn listen(&mut self, target: ListenerTarget, kind: EventKind);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_enter_and_space_activate() {
        assert!(Key::from_dom("Enter").activates());
        assert!(Key::from_dom(" ").activates());
        assert!(!Key::from_dom("Tab").activates());
    }

    #[test]
    fn layout_settled_needs_no_listener() {
        assert_eq!(UiEvent::LayoutSettled.listener(), None);
        assert_eq!(
            UiEvent::WindowResized {
                viewport_height_px: 10
            }
            .listener(),
            Some((ListenerTarget::Window, EventKind::Resize))
        );
    }
}
