use crate::domain::{
    models::availability::{AvailabilitySlot, WeeklySchedule},
    ports::AvailabilityRepository,
};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{PgPool, Row};

pub struct PostgresAvailabilityRepo {
    pool: PgPool,
}

impl PostgresAvailabilityRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AvailabilityRepository for PostgresAvailabilityRepo {
    async fn find_schedule(&self, coach_id: &str) -> Result<Option<WeeklySchedule>, AppError> {
        sqlx::query_as::<_, WeeklySchedule>(
            "SELECT coach_id, timezone, buffer_minutes, version, updated_at FROM weekly_schedules WHERE coach_id = $1",
        )
            .bind(coach_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list_slots(&self, coach_id: &str) -> Result<Vec<AvailabilitySlot>, AppError> {
        sqlx::query_as::<_, AvailabilitySlot>(
            "SELECT id, coach_id, day_of_week, start_time, end_time FROM availability_slots WHERE coach_id = $1 ORDER BY day_of_week, start_time",
        )
            .bind(coach_id)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn replace_schedule(
        &self,
        schedule: &WeeklySchedule,
        slots: &[AvailabilitySlot],
        expected_version: Option<i64>,
    ) -> Result<WeeklySchedule, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // FOR UPDATE serializes concurrent replacements for one coach.
        let current_version: i64 = sqlx::query(
            "SELECT version FROM weekly_schedules WHERE coach_id = $1 FOR UPDATE",
        )
            .bind(&schedule.coach_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(AppError::Database)?
            .map(|row| row.get("version"))
            .unwrap_or(0);

        if let Some(expected) = expected_version
            && expected != current_version
        {
            return Err(AppError::Conflict(format!(
                "Schedule version mismatch: expected {}, found {}",
                expected, current_version
            )));
        }

        let updated = sqlx::query_as::<_, WeeklySchedule>(
            "INSERT INTO weekly_schedules (coach_id, timezone, buffer_minutes, version, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (coach_id) DO UPDATE SET
             timezone = EXCLUDED.timezone,
             buffer_minutes = EXCLUDED.buffer_minutes,
             version = EXCLUDED.version,
             updated_at = EXCLUDED.updated_at
             RETURNING coach_id, timezone, buffer_minutes, version, updated_at",
        )
            .bind(&schedule.coach_id)
            .bind(&schedule.timezone)
            .bind(schedule.buffer_minutes)
            .bind(current_version + 1)
            .bind(schedule.updated_at)
            .fetch_one(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        sqlx::query("DELETE FROM availability_slots WHERE coach_id = $1")
            .bind(&schedule.coach_id)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

        for slot in slots {
            sqlx::query(
                "INSERT INTO availability_slots (id, coach_id, day_of_week, start_time, end_time) VALUES ($1, $2, $3, $4, $5)",
            )
                .bind(&slot.id)
                .bind(&slot.coach_id)
                .bind(slot.day_of_week)
                .bind(&slot.start_time)
                .bind(&slot.end_time)
                .execute(&mut *tx)
                .await
                .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(updated)
    }
}
