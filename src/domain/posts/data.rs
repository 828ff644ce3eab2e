use super::{LatLng, Post, PostId};
use crate::domain::types::PostStatus;

struct SamplePost {
    id: i64,
    name: &'static str,
    lat: f64,
    lng: f64,
    status: PostStatus,
}

static SAMPLE_POSTS: [SamplePost; 2] = [
    SamplePost {
        id: 1,
        name: "Pole A",
        lat: 40.7128,
        lng: -74.0060,
        status: PostStatus::Active,
    },
    SamplePost {
        id: 2,
        name: "Pole B",
        lat: 40.7138,
        lng: -74.0050,
        status: PostStatus::Maintenance,
    },
];

/// Fixed sample served whenever the real post list cannot be obtained.
pub fn sample_posts() -> Vec<Post> {
    SAMPLE_POSTS
        .iter()
        .map(|sample| Post {
            id: PostId::from(sample.id),
            name: sample.name.to_string(),
            position: LatLng::new(sample.lat, sample.lng),
            status: sample.status,
            area: None,
        })
        .collect()
}
