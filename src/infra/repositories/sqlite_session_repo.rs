use crate::domain::{models::session::Session, ports::SessionRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteSessionRepo {
    pool: SqlitePool,
}

impl SqliteSessionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepo {
    async fn create(&self, session: &Session) -> Result<Session, AppError> {
        sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (id, coach_id, client_id, scheduled_at, duration_minutes, rate_cents, status, cancellation_reason, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *",
        )
            .bind(&session.id)
            .bind(&session.coach_id)
            .bind(&session.client_id)
            .bind(session.scheduled_at)
            .bind(session.duration_minutes)
            .bind(session.rate_cents)
            .bind(&session.status)
            .bind(&session.cancellation_reason)
            .bind(session.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Session>, AppError> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_by_coach_range(&self, coach_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Session>, AppError> {
        // Sessions starting before the window can still reach into it; pad
        // the lower bound by the maximum session duration and let callers
        // do the exact interval math.
        let padded_start = start - chrono::Duration::minutes(crate::domain::services::availability::MAX_DURATION_MINUTES);
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE coach_id = ? AND scheduled_at < ? AND scheduled_at > ? AND status != 'CANCELLED'",
        )
            .bind(coach_id)
            .bind(end)
            .bind(padded_start)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Session>, AppError> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE coach_id = ? OR client_id = ? ORDER BY scheduled_at ASC",
        )
            .bind(user_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn update_status(&self, id: &str, status: &str) -> Result<Session, AppError> {
        sqlx::query_as::<_, Session>("UPDATE sessions SET status = ? WHERE id = ? RETURNING *")
            .bind(status)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn cancel(&self, id: &str, reason: &str) -> Result<Session, AppError> {
        sqlx::query_as::<_, Session>(
            "UPDATE sessions SET status = 'CANCELLED', cancellation_reason = ? WHERE id = ? RETURNING *",
        )
            .bind(reason)
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
