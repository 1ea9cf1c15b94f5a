//! Achievement model

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A badge awarded once per user per qualifying milestone
#[derive(Debug, Clone, Serialize)]
pub struct Achievement {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub badge_icon: String,
    pub earned_at: DateTime<Utc>,
}

impl Achievement {
    pub fn new(user_id: Uuid, title: &str, description: &str, badge_icon: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            description: description.to_string(),
            badge_icon: badge_icon.to_string(),
            earned_at: Utc::now(),
        }
    }
}
