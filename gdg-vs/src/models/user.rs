//! User model and level derivation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User level, derived from total points
///
/// Thresholds are fixed: 200+ Gold, 100+ Silver, below that Bronze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Bronze,
    Silver,
    Gold,
}

impl Level {
    /// Recompute level from a point total
    pub fn from_points(total_points: i64) -> Self {
        if total_points >= 200 {
            Level::Gold
        } else if total_points >= 100 {
            Level::Silver
        } else {
            Level::Bronze
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Bronze => "Bronze",
            Level::Silver => "Silver",
            Level::Gold => "Gold",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Bronze" => Some(Level::Bronze),
            "Silver" => Some(Level::Silver),
            "Gold" => Some(Level::Gold),
            _ => None,
        }
    }
}

/// A registered (possibly anonymous) user
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub total_points: i64,
    pub level: Level,
    #[serde(skip_serializing)]
    pub session_token: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_thresholds() {
        assert_eq!(Level::from_points(0), Level::Bronze);
        assert_eq!(Level::from_points(99), Level::Bronze);
        assert_eq!(Level::from_points(100), Level::Silver);
        assert_eq!(Level::from_points(199), Level::Silver);
        assert_eq!(Level::from_points(200), Level::Gold);
        assert_eq!(Level::from_points(1000), Level::Gold);
    }

    #[test]
    fn test_level_roundtrip() {
        for level in [Level::Bronze, Level::Silver, Level::Gold] {
            assert_eq!(Level::parse(level.as_str()), Some(level));
        }
        assert_eq!(Level::parse("Platinum"), None);
    }
}
