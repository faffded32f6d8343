use serde::Serialize;
use crate::domain::models::availability::AvailabilitySlot;

#[derive(Serialize)]
pub struct AvailabilityResponse {
    pub date: String,
    pub duration_minutes: i64,
    pub slots: Vec<String>,
}

#[derive(Serialize)]
pub struct DetailedSlot {
    pub start_time: String,
    pub end_time: String,
    pub duration_minutes: i64,
}

#[derive(Serialize)]
pub struct DetailedAvailabilityResponse {
    pub date: String,
    pub duration_minutes: i64,
    pub slots: Vec<DetailedSlot>,
}

#[derive(Serialize)]
pub struct ScheduleResponse {
    pub coach_id: String,
    pub timezone: String,
    pub buffer_minutes: i32,
    pub version: i64,
    pub slots: Vec<AvailabilitySlot>,
}
