use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_SCHEDULED: &str = "SCHEDULED";
pub const STATUS_IN_PROGRESS: &str = "IN_PROGRESS";
pub const STATUS_COMPLETED: &str = "COMPLETED";
pub const STATUS_CANCELLED: &str = "CANCELLED";

/// A scheduled coaching appointment between one coach and one client.
/// Sessions are never hard-deleted; cancellation is a status transition.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Session {
    pub id: String,
    pub coach_id: String,
    pub client_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub rate_cents: i64,
    pub status: String,
    pub cancellation_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewSessionParams {
    pub coach_id: String,
    pub client_id: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_minutes: i32,
    pub rate_cents: i64,
}

impl Session {
    pub fn new(params: NewSessionParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            coach_id: params.coach_id,
            client_id: params.client_id,
            scheduled_at: params.scheduled_at,
            duration_minutes: params.duration_minutes,
            rate_cents: params.rate_cents,
            status: STATUS_SCHEDULED.to_string(),
            cancellation_reason: None,
            created_at: Utc::now(),
        }
    }

    /// COMPLETED and CANCELLED are terminal.
    pub fn is_terminal(&self) -> bool {
        self.status == STATUS_COMPLETED || self.status == STATUS_CANCELLED
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.scheduled_at + chrono::Duration::minutes(self.duration_minutes as i64)
    }
}
