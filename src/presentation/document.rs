//! Server-side page surface: collects mount content and listeners for the rendered document.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::application::page::{EventKind, ListenerTarget, MountKey, PageSurface};

/// One mount update for the browser, addressed by element id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MountPatch {
    Html { id: &'static str, html: String },
    Text { id: &'static str, text: String },
    Height { id: &'static str, px: u32 },
}

#[derive(Debug, Clone)]
pub struct HtmlDocument {
    mounts: HashSet<MountKey>,
    html: HashMap<MountKey, String>,
    text: HashMap<MountKey, String>,
    heights: HashMap<MountKey, u32>,
    viewport_height_px: u32,
    listeners: Vec<(ListenerTarget, EventKind)>,
    changed: Vec<MountKey>,
}

impl HtmlDocument {
    pub fn new(mounts: impl IntoIterator<Item = MountKey>, viewport_height_px: u32) -> Self {
        Self {
            mounts: mounts.into_iter().collect(),
            html: HashMap::new(),
            text: HashMap::new(),
            heights: HashMap::new(),
            viewport_height_px,
            listeners: Vec::new(),
            changed: Vec::new(),
        }
    }

    /// A document with every known mount point present.
    pub fn complete(viewport_height_px: u32) -> Self {
        Self::new(MountKey::ALL, viewport_height_px)
    }

    pub fn html(&self, key: MountKey) -> &str {
        self.html.get(&key).map(String::as_str).unwrap_or_default()
    }

    pub fn text(&self, key: MountKey) -> &str {
        self.text.get(&key).map(String::as_str).unwrap_or_default()
    }

    pub fn height_px(&self, key: MountKey) -> Option<u32> {
        self.heights.get(&key).copied()
    }

    /// Mounts whose content changed since the last call, in first-change order.
    pub fn take_changes(&mut self) -> Vec<MountPatch> {
        let changed = std::mem::take(&mut self.changed);
        changed
            .into_iter()
            .flat_map(|key| {
                let id = key.element_id();
                let content = if let Some(html) = self.html.get(&key) {
                    Some(MountPatch::Html {
                        id,
                        html: html.clone(),
                    })
                } else {
                    self.text.get(&key).map(|text| MountPatch::Text {
                        id,
                        text: text.clone(),
                    })
                };
                let height = self
                    .heights
                    .get(&key)
                    .map(|&px| MountPatch::Height { id, px });
                content.into_iter().chain(height)
            })
            .collect()
    }

    /// Browser-side handlers for every registered listener.
    ///
    /// Expects `map` and `markers` bindings in scope. Each handler posts one
    /// event to `events_url`; requests run one at a time, in order, and the
    /// returned patch is applied to the mounts and the live map in place.
    pub fn listener_script(&self, events_url: &str) -> String {
        let mut script = format!(
            "var eventsUrl = {};\n\
             var pending = Promise.resolve();\n\
             function applyPatch(patch) {{\n  \
             patch.mounts.forEach(function (mount) {{\n    \
             var el = document.getElementById(mount.id);\n    \
             if (!el) return;\n    \
             if (mount.kind === \"html\") el.innerHTML = mount.html;\n    \
             else if (mount.kind === \"text\") el.textContent = mount.text;\n    \
             else if (mount.kind === \"height\") el.style.height = mount.px + \"px\";\n  \
             }});\n  \
             if (patch.script) new Function(\"map\", \"markers\", patch.script)(map, markers);\n\
             }}\n\
             function sendEvent(event) {{\n  \
             pending = pending.then(function () {{\n    \
             return fetch(eventsUrl, {{\n      \
             method: \"POST\",\n      \
             headers: {{ \"Content-Type\": \"application/json\" }},\n      \
             body: JSON.stringify(event)\n    \
             }}).then(function (response) {{\n      \
             if (response.status === 404) {{ window.location.reload(); return null; }}\n      \
             return response.ok ? response.json() : null;\n    \
             }}).then(function (patch) {{\n      \
             if (patch) applyPatch(patch);\n    \
             }}).catch(function (error) {{\n      \
             console.warn(\"map page update failed\", error);\n    \
             }});\n  \
             }});\n\
             }}\n",
            serde_json::Value::String(events_url.to_string())
        );

        for &(target, kind) in &self.listeners {
            let snippet = match (target, kind) {
                (ListenerTarget::Mount(MountKey::Search), EventKind::Input) => format!(
                    "(function (el) {{\n  \
                     if (!el) return;\n  \
                     if (el.form) el.form.addEventListener(\"submit\", function (event) {{ event.preventDefault(); }});\n  \
                     el.addEventListener(\"input\", function () {{ sendEvent({{ type: \"search\", query: el.value }}); }});\n\
                     }})(document.getElementById(\"{}\"));\n",
                    MountKey::Search.element_id()
                ),
                (ListenerTarget::Mount(MountKey::StatusFilter), EventKind::Change) => format!(
                    "(function (el) {{\n  \
                     if (!el) return;\n  \
                     if (el.form) el.form.addEventListener(\"submit\", function (event) {{ event.preventDefault(); }});\n  \
                     el.addEventListener(\"change\", function () {{ sendEvent({{ type: \"status\", status: el.value }}); }});\n\
                     }})(document.getElementById(\"{}\"));\n",
                    MountKey::StatusFilter.element_id()
                ),
                (ListenerTarget::Mount(MountKey::PostsList), EventKind::Click) => format!(
                    "document.getElementById(\"{}\").addEventListener(\"click\", function (event) {{\n  \
                     var entry = event.target.closest(\"[data-post-id]\");\n  \
                     if (entry) sendEvent({{ type: \"select\", id: entry.dataset.postId }});\n\
                     }});\n",
                    MountKey::PostsList.element_id()
                ),
                (ListenerTarget::Mount(MountKey::PostsList), EventKind::KeyDown) => format!(
                    "document.getElementById(\"{}\").addEventListener(\"keydown\", function (event) {{\n  \
                     if (event.key !== \"Enter\" && event.key !== \" \") return;\n  \
                     var entry = event.target.closest(\"[data-post-id]\");\n  \
                     if (!entry) return;\n  \
                     event.preventDefault();\n  \
                     sendEvent({{ type: \"key\", id: entry.dataset.postId, key: event.key }});\n\
                     }});\n",
                    MountKey::PostsList.element_id()
                ),
                (ListenerTarget::Window, EventKind::Resize) => {
                    "function reportViewport() {\n  \
                     sendEvent({ type: \"resize\", viewport_height_px: window.innerHeight });\n\
                     }\n\
                     window.addEventListener(\"resize\", reportViewport);\n\
                     reportViewport();\n"
                        .to_string()
                }
                _ => continue,
            };
            script.push_str(&snippet);
        }

        script
    }

    fn mark_changed(&mut self, key: MountKey) {
        if !self.changed.contains(&key) {
            self.changed.push(key);
        }
    }
}

impl PageSurface for HtmlDocument {
    fn has_mount(&self, key: MountKey) -> bool {
        self.mounts.contains(&key)
    }

    fn replace_html(&mut self, key: MountKey, html: String) {
        if self.html.get(&key) == Some(&html) {
            return;
        }
        self.text.remove(&key);
        self.html.insert(key, html);
        self.mark_changed(key);
    }

    fn set_text(&mut self, key: MountKey, text: String) {
        if self.text.get(&key) == Some(&text) {
            return;
        }
        self.html.remove(&key);
        self.text.insert(key, text);
        self.mark_changed(key);
    }

    fn set_height_px(&mut self, key: MountKey, height_px: u32) {
        if self.heights.insert(key, height_px) != Some(height_px) {
            self.mark_changed(key);
        }
    }

    fn viewport_height_px(&self) -> u32 {
        self.viewport_height_px
    }

    fn listen(&mut self, target: ListenerTarget, kind: EventKind) {
        if !self.listeners.contains(&(target, kind)) {
            self.listeners.push((target, kind));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_replacement_is_exclusive() {
        let mut doc = HtmlDocument::complete(800);
        doc.replace_html(MountKey::PostCount, "<b>2</b>".to_string());
        doc.set_text(MountKey::PostCount, "(2)".to_string());
        assert_eq!(doc.html(MountKey::PostCount), "");
        assert_eq!(doc.text(MountKey::PostCount), "(2)");
    }

    #[test]
    fn unchanged_content_produces_no_patch() {
        let mut doc = HtmlDocument::complete(800);
        doc.replace_html(MountKey::PostsList, "<li>a</li>".to_string());
        doc.set_text(MountKey::PostCount, "(1)".to_string());
        doc.set_height_px(MountKey::Map, 736);
        assert_eq!(
            doc.take_changes(),
            vec![
                MountPatch::Html {
                    id: "posts-list",
                    html: "<li>a</li>".to_string(),
                },
                MountPatch::Text {
                    id: "post-count",
                    text: "(1)".to_string(),
                },
                MountPatch::Height {
                    id: "map",
                    px: 736,
                },
            ]
        );

        doc.replace_html(MountKey::PostsList, "<li>a</li>".to_string());
        doc.set_text(MountKey::PostCount, "(1)".to_string());
        doc.set_height_px(MountKey::Map, 736);
        assert!(doc.take_changes().is_empty());
    }

    #[test]
    fn listeners_are_registered_once() {
        let mut doc = HtmlDocument::complete(800);
        doc.listen(ListenerTarget::Window, EventKind::Resize);
        doc.listen(ListenerTarget::Window, EventKind::Resize);

        let script = doc.listener_script("/pages/abc/events");
        assert_eq!(script.matches("window.addEventListener(\"resize\"").count(), 1);
        assert!(script.contains("var eventsUrl = \"/pages/abc/events\";"));
        assert!(!script.contains("type: \"select\""));
    }

    #[test]
    fn handlers_post_events_instead_of_navigating() {
        let mut doc = HtmlDocument::complete(800);
        let list = ListenerTarget::Mount(MountKey::PostsList);
        doc.listen(ListenerTarget::Mount(MountKey::Search), EventKind::Input);
        doc.listen(ListenerTarget::Mount(MountKey::StatusFilter), EventKind::Change);
        doc.listen(list, EventKind::Click);
        doc.listen(list, EventKind::KeyDown);

        let script = doc.listener_script("/pages/abc/events");
        assert!(script.contains("el.addEventListener(\"input\""));
        assert!(script.contains("type: \"search\", query: el.value"));
        assert!(script.contains("type: \"status\", status: el.value"));
        assert!(script.contains("type: \"select\", id: entry.dataset.postId"));
        assert!(script.contains("event.key !== \" \""));
        assert!(!script.contains("requestSubmit"));
        assert!(!script.contains("location.assign"));
    }
}
