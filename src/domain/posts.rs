mod data;

use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Serialize, Serializer};
use serde_json::{Map, Number, Value};

use super::error::DomainError;
use super::types::PostStatus;

pub use data::sample_posts;

/// Opaque post identity.
///
/// Identity is the textual key, so `2` and `"2"` name the same post. Numeric
/// identifiers keep the number they arrived as and serialize back unchanged.
#[derive(Debug, Clone)]
pub struct PostId {
    key: String,
    number: Option<Number>,
}

impl PostId {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            key: value.into(),
            number: None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => Some(Self::from(number.clone())),
            Value::String(text) => {
                let trimmed = text.trim();
                (!trimmed.is_empty()).then(|| Self::new(trimmed))
            }
            _ => None,
        }
    }
}

impl PartialEq for PostId {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for PostId {}

impl Hash for PostId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl From<Number> for PostId {
    fn from(number: Number) -> Self {
        Self {
            key: number.to_string(),
            number: Some(number),
        }
    }
}

impl From<i64> for PostId {
    fn from(value: i64) -> Self {
        Self::from(Number::from(value))
    }
}

impl From<&str> for PostId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl Serialize for PostId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.number {
            Some(number) => number.serialize(serializer),
            None => serializer.serialize_str(&self.key),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Axis-aligned box enclosing a set of positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn around(positions: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        let mut positions = positions.into_iter();
        let first = positions.next()?;
        let mut bounds = Self {
            south_west: first,
            north_east: first,
        };
        for position in positions {
            bounds.extend(position);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, position: LatLng) {
        self.south_west.lat = self.south_west.lat.min(position.lat);
        self.south_west.lng = self.south_west.lng.min(position.lng);
        self.north_east.lat = self.north_east.lat.max(position.lat);
        self.north_east.lng = self.north_east.lng.max(position.lng);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Post {
    pub id: PostId,
    pub name: String,
    #[serde(flatten)]
    pub position: LatLng,
    pub status: PostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
}

impl Post {
    /// Case-insensitive substring match over id and name. `needle` must already be lowercase.
    pub fn matches_needle(&self, needle: &str) -> bool {
        if needle.is_empty() {
            return true;
        }
        self.id.as_str().to_lowercase().contains(needle)
            || self.name.to_lowercase().contains(needle)
    }
}

/// A post as it arrives on the wire, before any validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPost {
    pub id: Option<Value>,
    pub name: Option<Value>,
    pub lat: Option<Value>,
    pub lng: Option<Value>,
    pub status: Option<Value>,
    pub area: Option<Value>,
}

impl RawPost {
    /// Non-object values produce an empty record, which is rejected later for lacking an id.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::from_map(map),
            _ => Self::default(),
        }
    }

    fn from_map(mut map: Map<String, Value>) -> Self {
        let mut take = |key: &str| map.remove(key).filter(|value| !value.is_null());
        Self {
            id: take("id"),
            name: take("name"),
            lat: take("lat"),
            lng: take("lng"),
            status: take("status"),
            area: take("area"),
        }
    }
}

impl From<&Post> for RawPost {
    fn from(post: &Post) -> Self {
        Self {
            id: serde_json::to_value(&post.id).ok(),
            name: Some(Value::String(post.name.clone())),
            lat: serde_json::Number::from_f64(post.position.lat).map(Value::Number),
            lng: serde_json::Number::from_f64(post.position.lng).map(Value::Number),
            status: Some(Value::String(post.status.as_str().to_string())),
            area: post.area.clone().map(Value::String),
        }
    }
}

impl TryFrom<RawPost> for Post {
    type Error = DomainError;

    fn try_from(raw: RawPost) -> Result<Self, Self::Error> {
        let id = raw
            .id
            .as_ref()
            .and_then(PostId::from_json)
            .ok_or(DomainError::MissingId)?;

        let lat = raw
            .lat
            .as_ref()
            .and_then(coordinate)
            .ok_or_else(|| DomainError::invalid_coordinate(id.as_str(), "lat"))?;
        let lng = raw
            .lng
            .as_ref()
            .and_then(coordinate)
            .ok_or_else(|| DomainError::invalid_coordinate(id.as_str(), "lng"))?;

        let name = raw
            .name
            .as_ref()
            .and_then(text)
            .unwrap_or_else(|| format!("Post {id}"));
        let status = PostStatus::normalize(raw.status.as_ref().and_then(text).as_deref());
        let area = raw.area.as_ref().and_then(text);

        Ok(Post {
            id,
            name,
            position: LatLng::new(lat, lng),
            status,
            area,
        })
    }
}

/// Outcome of validating a fetched batch: the usable posts in fetch order plus what was dropped.
#[derive(Debug, Default)]
pub struct NormalizedPosts {
    pub posts: Vec<Post>,
    pub rejected: Vec<DomainError>,
}

pub fn normalize_posts(raw: impl IntoIterator<Item = RawPost>) -> NormalizedPosts {
    let mut seen = HashSet::new();
    let mut normalized = NormalizedPosts::default();

    for record in raw {
        match Post::try_from(record) {
            Ok(post) if seen.insert(post.id.clone()) => normalized.posts.push(post),
            Ok(post) => normalized.rejected.push(DomainError::DuplicateId {
                id: post.id.to_string(),
            }),
            Err(err) => normalized.rejected.push(err),
        }
    }

    normalized
}

fn coordinate(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(text) => text.trim().to_string(),
        Value::Number(number) => number.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}
