//! The map-view capability consumed by the page session.
//!
//! Only this surface is relied upon; the tile rendering library behind it is opaque.

use crate::domain::posts::{LatLng, LatLngBounds};
use crate::domain::types::PostStatus;

pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 40.7128,
    lng: -74.006,
};
pub const DEFAULT_ZOOM: u8 = 13;
pub const FOCUS_ZOOM: u8 = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    pub url_template: String,
    pub max_zoom: u8,
    pub attribution: String,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            max_zoom: 19,
            attribution: "© OpenStreetMap contributors".to_string(),
        }
    }
}

/// Round status dot drawn for each marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerIcon {
    pub color: &'static str,
    pub size_px: u32,
    pub anchor_px: u32,
}

impl MarkerIcon {
    pub fn for_status(status: PostStatus) -> Self {
        Self {
            color: status.color(),
            size_px: 14,
            anchor_px: 7,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub position: LatLng,
    pub icon: MarkerIcon,
    pub popup_html: String,
}

pub trait MapView {
    type Marker;

    /// Bind the map to the element identified by `container_id`.
    fn attach(&mut self, container_id: &str);
    fn set_view(&mut self, center: LatLng, zoom: u8);
    fn add_tile_layer(&mut self, layer: &TileLayer);
    /// Create a detached marker. It is not visible until passed to `add_marker`.
    fn create_marker(&mut self, spec: MarkerSpec) -> Self::Marker;
    fn add_marker(&mut self, marker: &Self::Marker);
    fn remove_marker(&mut self, marker: &Self::Marker);
    fn open_popup(&mut self, marker: &Self::Marker);
    fn fit_bounds(&mut self, bounds: LatLngBounds, padding_px: u32);
    /// Re-measure the container. Implementations may defer this until layout settles.
    fn invalidate_size(&mut self);
}
