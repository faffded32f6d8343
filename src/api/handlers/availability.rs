use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{AvailabilityQuery, ReplaceAvailabilityRequest};
use crate::api::dtos::responses::{AvailabilityResponse, DetailedAvailabilityResponse, DetailedSlot, ScheduleResponse};
use crate::domain::models::availability::{AvailabilitySlot, WeeklySchedule};
use crate::domain::models::user::ROLE_COACH;
use crate::domain::services::availability::{
    calculate_open_slots, validate_weekly_slots, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES,
};
use crate::error::AppError;
use std::sync::Arc;
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::info;

pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    Path(coach_id): Path<String>,
    Query(params): Query<AvailabilityQuery>,
) -> Result<impl IntoResponse, AppError> {
    let duration = params.duration.unwrap_or(60);
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration) {
        return Err(AppError::Validation("Duration must be between 15 and 480 minutes".into()));
    }

    let date = NaiveDate::parse_from_str(&params.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format".into()))?;

    let coach = state.user_repo.find_by_id(&coach_id).await?
        .filter(|u| u.role == ROLE_COACH)
        .ok_or(AppError::NotFound("Coach not found".into()))?;

    let detailed = params.detailed.unwrap_or(false);

    let Some(schedule) = state.availability_repo.find_schedule(&coach.id).await? else {
        // No schedule means no availability, not an error.
        return Ok(availability_body(&params.date, duration, &[], detailed));
    };

    let slots = state.availability_repo.list_slots(&coach.id).await?;

    let tz: Tz = schedule.timezone.parse().unwrap_or(chrono_tz::UTC);
    let day_start_tz = tz.from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap()).single();
    let day_end_tz = tz.from_local_datetime(&date.and_hms_opt(23, 59, 59).unwrap()).single();

    let (Some(day_start), Some(day_end)) = (day_start_tz, day_end_tz) else {
        return Err(AppError::Validation("Invalid date format".into()));
    };

    let sessions = state.session_repo
        .list_by_coach_range(&coach.id, day_start.with_timezone(&Utc), day_end.with_timezone(&Utc))
        .await?;

    let open = calculate_open_slots(&schedule, &slots, date, duration, &sessions, Utc::now());

    Ok(availability_body(&params.date, duration, &open, detailed))
}

fn availability_body(
    date: &str,
    duration_minutes: i64,
    open: &[chrono::DateTime<Utc>],
    detailed: bool,
) -> axum::response::Response {
    if detailed {
        let slots = open
            .iter()
            .map(|start| DetailedSlot {
                start_time: start.to_rfc3339(),
                end_time: (*start + Duration::minutes(duration_minutes)).to_rfc3339(),
                duration_minutes,
            })
            .collect();
        Json(DetailedAvailabilityResponse {
            date: date.to_string(),
            duration_minutes,
            slots,
        }).into_response()
    } else {
        Json(AvailabilityResponse {
            date: date.to_string(),
            duration_minutes,
            slots: open.iter().map(|s| s.to_rfc3339()).collect(),
        }).into_response()
    }
}

pub async fn replace_availability(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(coach_id): Path<String>,
    Json(payload): Json<ReplaceAvailabilityRequest>,
) -> Result<impl IntoResponse, AppError> {
    if caller.0.id != coach_id && !caller.0.is_admin() {
        return Err(AppError::Forbidden("You can only modify your own availability".into()));
    }

    let target = state.user_repo.find_by_id(&coach_id).await?
        .ok_or(AppError::NotFound("Coach not found".into()))?;
    if target.role != ROLE_COACH {
        return Err(AppError::Validation("Target user is not a coach".into()));
    }

    let slot_tuples: Vec<(i32, String, String)> = payload.slots
        .iter()
        .map(|s| (s.day_of_week, s.start.clone(), s.end.clone()))
        .collect();
    validate_weekly_slots(&slot_tuples).map_err(AppError::Validation)?;

    let existing = state.availability_repo.find_schedule(&coach_id).await?;

    let timezone = payload.timezone
        .or_else(|| existing.as_ref().map(|s| s.timezone.clone()))
        .unwrap_or_else(|| "UTC".to_string());
    if timezone.parse::<Tz>().is_err() {
        return Err(AppError::Validation(format!("Invalid timezone '{}'", timezone)));
    }

    let buffer_minutes = payload.buffer_minutes
        .or_else(|| existing.as_ref().map(|s| s.buffer_minutes))
        .unwrap_or(0);
    if buffer_minutes < 0 {
        return Err(AppError::Validation("buffer_minutes must not be negative".into()));
    }

    let schedule = WeeklySchedule::new(coach_id.clone(), timezone, buffer_minutes);
    let slots: Vec<AvailabilitySlot> = payload.slots
        .iter()
        .map(|s| AvailabilitySlot::new(coach_id.clone(), s.day_of_week, s.start.clone(), s.end.clone()))
        .collect();

    let stored = state.availability_repo
        .replace_schedule(&schedule, &slots, payload.version)
        .await?;

    info!("Replaced availability for coach {} (version {})", coach_id, stored.version);

    Ok(Json(ScheduleResponse {
        coach_id: stored.coach_id,
        timezone: stored.timezone,
        buffer_minutes: stored.buffer_minutes,
        version: stored.version,
        slots,
    }))
}

pub async fn get_schedule(
    State(state): State<Arc<AppState>>,
    Path(coach_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let coach = state.user_repo.find_by_id(&coach_id).await?
        .filter(|u| u.role == ROLE_COACH)
        .ok_or(AppError::NotFound("Coach not found".into()))?;

    let Some(schedule) = state.availability_repo.find_schedule(&coach.id).await? else {
        return Ok(Json(ScheduleResponse {
            coach_id: coach.id,
            timezone: "UTC".to_string(),
            buffer_minutes: 0,
            version: 0,
            slots: Vec::new(),
        }));
    };

    let slots = state.availability_repo.list_slots(&coach.id).await?;

    Ok(Json(ScheduleResponse {
        coach_id: schedule.coach_id,
        timezone: schedule.timezone,
        buffer_minutes: schedule.buffer_minutes,
        version: schedule.version,
        slots,
    }))
}
