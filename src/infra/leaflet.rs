//! Leaflet-backed map view that records its calls as a browser script.
//!
//! Every `MapView` call becomes one JavaScript statement. The page embeds the
//! statements recorded during bootstrap; later statements are shipped with each
//! page patch, so the browser map follows the server-side session call for call.

use std::fmt::Write as _;

use crate::application::map::{MapView, MarkerIcon, MarkerSpec, TileLayer};
use crate::domain::posts::{LatLng, LatLngBounds};

/// Deferral before re-measuring the container, giving the layout time to settle.
const INVALIDATE_DELAY_MS: u32 = 100;

/// Index into the script's `markers` array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LeafletMarker(usize);

impl LeafletMarker {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct LeafletScript {
    statements: Vec<String>,
    markers: usize,
}

impl LeafletScript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Statements recorded since the last `take_script`.
    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Drain the pending statements as one script body. Marker handles stay valid.
    pub fn take_script(&mut self) -> String {
        let mut script = String::new();
        for statement in self.statements.drain(..) {
            script.push_str(&statement);
            script.push('\n');
        }
        script
    }

    fn push(&mut self, statement: String) {
        self.statements.push(statement);
    }
}

impl MapView for LeafletScript {
    type Marker = LeafletMarker;

    fn attach(&mut self, container_id: &str) {
        self.push(format!("const map = L.map({});", js_string(container_id)));
        self.push("const markers = [];".to_string());
    }

    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.push(format!("map.setView({}, {zoom});", js_latlng(center)));
    }

    fn add_tile_layer(&mut self, layer: &TileLayer) {
        self.push(format!(
            "L.tileLayer({}, {{ maxZoom: {}, attribution: {} }}).addTo(map);",
            js_string(&layer.url_template),
            layer.max_zoom,
            js_string(&layer.attribution)
        ));
    }

    fn create_marker(&mut self, spec: MarkerSpec) -> LeafletMarker {
        let marker = LeafletMarker(self.markers);
        self.markers += 1;
        self.push(format!(
            "markers[{}] = L.marker({}, {{ icon: {} }}).bindPopup({});",
            marker.0,
            js_latlng(spec.position),
            js_icon(spec.icon),
            js_string(&spec.popup_html)
        ));
        marker
    }

    fn add_marker(&mut self, marker: &LeafletMarker) {
        self.push(format!("markers[{}].addTo(map);", marker.0));
    }

    fn remove_marker(&mut self, marker: &LeafletMarker) {
        self.push(format!("markers[{}].remove();", marker.0));
    }

    fn open_popup(&mut self, marker: &LeafletMarker) {
        self.push(format!("markers[{}].openPopup();", marker.0));
    }

    fn fit_bounds(&mut self, bounds: LatLngBounds, padding_px: u32) {
        self.push(format!(
            "map.fitBounds([{}, {}], {{ padding: [{padding_px}, {padding_px}] }});",
            js_latlng(bounds.south_west),
            js_latlng(bounds.north_east)
        ));
    }

    fn invalidate_size(&mut self) {
        self.push(format!(
            "setTimeout(function () {{ map.invalidateSize(); }}, {INVALIDATE_DELAY_MS});"
        ));
    }
}

fn js_latlng(position: LatLng) -> String {
    format!("[{}, {}]", position.lat, position.lng)
}

fn js_icon(icon: MarkerIcon) -> String {
    let html = format!(
        "<span class=\"post-marker-dot\" style=\"background:{};width:{size}px;height:{size}px\"></span>",
        icon.color,
        size = icon.size_px
    );
    format!(
        "L.divIcon({{ className: \"post-marker\", html: {}, iconSize: [{size}, {size}], iconAnchor: [{anchor}, {anchor}] }})",
        js_string(&html),
        size = icon.size_px,
        anchor = icon.anchor_px
    )
}

/// A double-quoted JavaScript literal that is also safe inside an inline `<script>`.
fn js_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '<' | '>' | '&' | '\u{2028}' | '\u{2029}' => {
                let _ = write!(out, "\\u{:04x}", ch as u32);
            }
            ch if (ch as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", ch as u32);
            }
            ch => out.push(ch),
        }
    }
    out.push('"');
    out
}
