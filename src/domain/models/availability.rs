use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One weekly schedule row per coach. `version` increments on every replace
/// and guards against lost updates from concurrent writers.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct WeeklySchedule {
    pub coach_id: String,
    pub timezone: String,
    pub buffer_minutes: i32,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

impl WeeklySchedule {
    pub fn new(coach_id: String, timezone: String, buffer_minutes: i32) -> Self {
        Self {
            coach_id,
            timezone,
            buffer_minutes,
            version: 1,
            updated_at: Utc::now(),
        }
    }
}

/// A recurring weekly interval during which a coach is bookable.
/// `day_of_week` runs 0-6 with 0 = Monday; times are "HH:MM" in the
/// schedule's timezone.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct AvailabilitySlot {
    pub id: String,
    pub coach_id: String,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
}

impl AvailabilitySlot {
    pub fn new(coach_id: String, day_of_week: i32, start_time: String, end_time: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            coach_id,
            day_of_week,
            start_time,
            end_time,
        }
    }
}
