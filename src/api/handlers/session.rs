use axum::{body::Bytes, extract::{State, Path}, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::requests::{CancelSessionRequest, CreateSessionRequest, UpdateSessionRequest};
use crate::domain::models::session::{
    NewSessionParams, Session, STATUS_COMPLETED, STATUS_IN_PROGRESS, STATUS_SCHEDULED,
};
use crate::domain::models::user::{User, ROLE_CLIENT, ROLE_COACH};
use crate::domain::services::availability::{is_start_available, MAX_DURATION_MINUTES, MIN_DURATION_MINUTES};
use crate::domain::services::cancellation::{self, CancellationActor};
use crate::error::AppError;
use std::sync::Arc;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::{error, info, warn};

pub async fn create_session(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let client_id = if caller.0.role == ROLE_CLIENT {
        if payload.client_id.as_ref().is_some_and(|id| *id != caller.0.id) {
            return Err(AppError::Forbidden("Clients can only book for themselves".into()));
        }
        caller.0.id.clone()
    } else {
        payload.client_id.clone()
            .ok_or(AppError::Validation("client_id is required".into()))?
    };

    let duration = payload.duration_minutes.unwrap_or(60);
    if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&duration) {
        return Err(AppError::Validation("Duration must be between 15 and 480 minutes".into()));
    }

    let coach = state.user_repo.find_by_id(&payload.coach_id).await?
        .filter(|u| u.role == ROLE_COACH)
        .ok_or(AppError::NotFound("Coach not found".into()))?;

    let schedule = state.availability_repo.find_schedule(&coach.id).await?
        .ok_or(AppError::Conflict("Coach has no availability configured".into()))?;

    let tz: Tz = schedule.timezone.parse().unwrap_or(chrono_tz::UTC);

    let date = NaiveDate::parse_from_str(&payload.date, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Invalid date format".into()))?;

    let time = if payload.time.contains('T') {
        let dt = chrono::DateTime::parse_from_rfc3339(&payload.time)
            .map_err(|_| AppError::Validation("Invalid ISO time format".into()))?;
        dt.with_timezone(&tz).time()
    } else {
        NaiveTime::parse_from_str(&payload.time, "%H:%M")
            .map_err(|_| AppError::Validation("Invalid time format (HH:MM)".into()))?
    };

    let start = tz.from_local_datetime(&date.and_time(time))
        .single()
        .ok_or(AppError::Validation("Invalid local time (ambiguous or skipped due to DST)".into()))?
        .with_timezone(&Utc);

    let now = Utc::now();
    if start < now {
        return Err(AppError::Validation("Cannot book in the past".into()));
    }

    let slots = state.availability_repo.list_slots(&coach.id).await?;

    let day_start = tz.from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap()).single();
    let day_end = tz.from_local_datetime(&date.and_hms_opt(23, 59, 59).unwrap()).single();
    let (Some(day_start), Some(day_end)) = (day_start, day_end) else {
        return Err(AppError::Validation("Invalid date format".into()));
    };

    let existing = state.session_repo
        .list_by_coach_range(&coach.id, day_start.with_timezone(&Utc), day_end.with_timezone(&Utc))
        .await?;

    if !is_start_available(&schedule, &slots, start, duration, &existing, now) {
        warn!("Booking rejected for coach {}: {} not in open slots", coach.id, start.to_rfc3339());
        return Err(AppError::Conflict("Selected time slot is not available".into()));
    }

    let session = Session::new(NewSessionParams {
        coach_id: coach.id,
        client_id,
        scheduled_at: start,
        duration_minutes: duration as i32,
        rate_cents: payload.rate_cents.unwrap_or(state.config.default_rate_cents),
    });

    let created = state.session_repo.create(&session).await?;

    info!("Booked session {} for coach {} at {}", created.id, created.coach_id, created.scheduled_at);

    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn get_session(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session_repo.find_by_id(&session_id).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;

    ensure_participant(&caller.0, &session)?;

    Ok(Json(session))
}

pub async fn list_sessions(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let sessions = state.session_repo.list_for_user(&caller.0.id).await?;
    Ok(Json(sessions))
}

pub async fn update_session(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(session_id): Path<String>,
    Json(payload): Json<UpdateSessionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session_repo.find_by_id(&session_id).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;

    if caller.0.id != session.coach_id && !caller.0.is_admin() {
        return Err(AppError::Forbidden("Only the coach or an admin can update a session".into()));
    }

    // Cancellation is a policy decision, not a plain status write.
    let allowed = matches!(
        (session.status.as_str(), payload.status.as_str()),
        (STATUS_SCHEDULED, STATUS_IN_PROGRESS)
            | (STATUS_SCHEDULED, STATUS_COMPLETED)
            | (STATUS_IN_PROGRESS, STATUS_COMPLETED)
    );
    if !allowed {
        return Err(AppError::Validation(format!(
            "Cannot change session status from {} to {}",
            session.status, payload.status
        )));
    }

    let updated = state.session_repo.update_status(&session.id, &payload.status).await?;

    info!("Session {} moved to {}", updated.id, updated.status);

    Ok(Json(updated))
}

pub async fn delete_session(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    cancel_with_policy(state, caller, session_id, CancelSessionRequest::default()).await
}

// The cancel body is optional, so the payload is read as raw bytes instead
// of going through the Json extractor.
pub async fn cancel_session(
    State(state): State<Arc<AppState>>,
    caller: AuthUser,
    Path(session_id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload = if body.is_empty() {
        CancelSessionRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|_| AppError::Validation("Invalid cancellation payload".into()))?
    };
    cancel_with_policy(state, caller, session_id, payload).await
}

async fn cancel_with_policy(
    state: Arc<AppState>,
    caller: AuthUser,
    session_id: String,
    payload: CancelSessionRequest,
) -> Result<axum::response::Response, AppError> {
    let session = state.session_repo.find_by_id(&session_id).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;

    ensure_participant(&caller.0, &session)?;

    let actor = match payload.cancellation_type.as_deref() {
        Some(raw) => {
            let actor = CancellationActor::parse(raw)
                .ok_or(AppError::Validation(format!("Invalid cancellation_type '{}'", raw)))?;
            if actor.is_privileged() && !caller.0.is_admin() {
                return Err(AppError::Forbidden("Admin role required for this cancellation type".into()));
            }
            actor
        }
        None => {
            if caller.0.is_admin() {
                CancellationActor::Admin
            } else if caller.0.id == session.coach_id {
                CancellationActor::Coach
            } else {
                CancellationActor::Client
            }
        }
    };

    let result = cancellation::evaluate(&state.config.cancellation_policy, &session, actor, Utc::now());

    if !result.is_allowed {
        return Err(AppError::Validation(result.message));
    }

    let reason = cancellation::build_reason(
        actor,
        &result,
        payload.reason.as_deref(),
        payload.refund_requested.unwrap_or(false),
        payload.reschedule_requested.unwrap_or(false),
    );

    let cancelled = state.session_repo.cancel(&session.id, &reason).await?;

    info!(
        "Session {} cancelled by {} ({}% refund, fee {} cents)",
        cancelled.id, actor.label(), result.refund_percentage, result.fee_cents
    );

    // Privileged cancellations notify as the practice side.
    let cancelled_by = if actor.is_privileged() { "coach" } else { actor.label() };

    if let Err(e) = state.notification_service.session_cancelled(&cancelled, cancelled_by).await {
        error!("Cancellation notification failed for session {}: {:?}", cancelled.id, e);
    }

    Ok(Json(serde_json::json!({
        "session": cancelled,
        "policy_result": result
    })).into_response())
}

fn ensure_participant(user: &User, session: &Session) -> Result<(), AppError> {
    if user.id == session.coach_id || user.id == session.client_id || user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden("You are not a participant in this session".into()))
    }
}
