//! Challenge catalog model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::services::geofence::Coordinates;

/// Challenge category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Recycling,
    Community,
    Environment,
    Transport,
}

impl Category {
    /// Database / query-string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Recycling => "recycling",
            Category::Community => "community",
            Category::Environment => "environment",
            Category::Transport => "transport",
        }
    }

    /// Parse from database / query-string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "recycling" => Some(Category::Recycling),
            "community" => Some(Category::Community),
            "environment" => Some(Category::Environment),
            "transport" => Some(Category::Transport),
            _ => None,
        }
    }

    /// All categories, in catalog display order
    pub fn all() -> [Category; 4] {
        [
            Category::Recycling,
            Category::Community,
            Category::Environment,
            Category::Transport,
        ]
    }
}

/// A predefined good-deed task with location, category, and point reward
///
/// Immutable after creation except for the is_active flag.
#[derive(Debug, Clone, Serialize)]
pub struct Challenge {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Category,
    pub points: i64,
    pub latitude: f64,
    pub longitude: f64,
    pub verification_prompt: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Challenge {
    /// Target coordinates for the geofence check
    pub fn location(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}
