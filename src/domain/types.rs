//! Shared domain enumerations for post status and status filtering.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStatus {
    Active,
    Maintenance,
    Inactive,
}

impl PostStatus {
    pub const ALL: [PostStatus; 3] = [
        PostStatus::Active,
        PostStatus::Maintenance,
        PostStatus::Inactive,
    ];

    /// Map a raw status label onto the known set. Anything unrecognised is `Inactive`.
    pub fn normalize(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return PostStatus::Inactive;
        };

        match value.trim().to_ascii_lowercase().as_str() {
            "active" => PostStatus::Active,
            "maintenance" => PostStatus::Maintenance,
            _ => PostStatus::Inactive,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Active => "active",
            PostStatus::Maintenance => "maintenance",
            PostStatus::Inactive => "inactive",
        }
    }

    /// Marker fill color used on the map.
    pub fn color(self) -> &'static str {
        match self {
            PostStatus::Active => "#059669",
            PostStatus::Maintenance => "#b45309",
            PostStatus::Inactive => "#64748b",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Maintenance,
    Inactive,
}

impl StatusFilter {
    pub const ALL: [StatusFilter; 4] = [
        StatusFilter::All,
        StatusFilter::Active,
        StatusFilter::Maintenance,
        StatusFilter::Inactive,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Maintenance => "maintenance",
            StatusFilter::Inactive => "inactive",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All",
            StatusFilter::Active => "Active",
            StatusFilter::Maintenance => "Maintenance",
            StatusFilter::Inactive => "Inactive",
        }
    }

    pub fn matches(self, status: PostStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == PostStatus::Active,
            StatusFilter::Maintenance => status == PostStatus::Maintenance,
            StatusFilter::Inactive => status == PostStatus::Inactive,
        }
    }
}

impl TryFrom<&str> for StatusFilter {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "maintenance" => Ok(StatusFilter::Maintenance),
            "inactive" => Ok(StatusFilter::Inactive),
            _ => Err(()),
        }
    }
}
