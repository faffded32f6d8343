use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Deserialize)]
pub struct SlotInput {
    pub day_of_week: i32,
    pub start: String,
    pub end: String,
}

#[derive(Deserialize)]
pub struct ReplaceAvailabilityRequest {
    pub slots: Vec<SlotInput>,
    pub timezone: Option<String>,
    pub buffer_minutes: Option<i32>,
    /// Expected schedule version; a mismatch is rejected with 409.
    pub version: Option<i64>,
}

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
    pub duration: Option<i64>,
    pub detailed: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub coach_id: String,
    pub date: String,
    pub time: String,
    pub duration_minutes: Option<i64>,
    pub rate_cents: Option<i64>,
    pub client_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateSessionRequest {
    pub status: String,
}

#[derive(Deserialize, Default)]
pub struct CancelSessionRequest {
    pub reason: Option<String>,
    pub cancellation_type: Option<String>,
    pub refund_requested: Option<bool>,
    pub reschedule_requested: Option<bool>,
}
