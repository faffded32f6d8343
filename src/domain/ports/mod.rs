use crate::domain::models::{
    auth::RefreshTokenRecord,
    availability::{AvailabilitySlot, WeeklySchedule},
    session::Session,
    user::User,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn list(&self) -> Result<Vec<User>, AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AuthRepository: Send + Sync {
    async fn create_refresh_token(&self, record: &RefreshTokenRecord) -> Result<(), AppError>;
    async fn find_refresh_token(&self, token_hash: &str) -> Result<Option<RefreshTokenRecord>, AppError>;
    async fn delete_refresh_token(&self, token_hash: &str) -> Result<(), AppError>;
    async fn delete_refresh_family(&self, family_id: &str) -> Result<(), AppError>;

    /// Records a failed login and returns the failure count inside the
    /// current window. Counters live in the database so they hold up under
    /// multi-instance deployment.
    async fn register_failed_login(&self, username: &str, window_start: DateTime<Utc>) -> Result<i32, AppError>;
    async fn clear_failed_logins(&self, username: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait AvailabilityRepository: Send + Sync {
    async fn find_schedule(&self, coach_id: &str) -> Result<Option<WeeklySchedule>, AppError>;
    async fn list_slots(&self, coach_id: &str) -> Result<Vec<AvailabilitySlot>, AppError>;

    /// Replaces a coach's weekly schedule in one transaction. When
    /// `expected_version` is given and does not match the stored version
    /// (0 for an absent schedule), the replace fails with a conflict and
    /// nothing changes.
    async fn replace_schedule(
        &self,
        schedule: &WeeklySchedule,
        slots: &[AvailabilitySlot],
        expected_version: Option<i64>,
    ) -> Result<WeeklySchedule, AppError>;
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, session: &Session) -> Result<Session, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Session>, AppError>;
    /// Non-cancelled sessions for a coach intersecting [start, end).
    async fn list_by_coach_range(&self, coach_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Session>, AppError>;
    /// Sessions where the user is either the coach or the client.
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<Session>, AppError>;
    async fn update_status(&self, id: &str, status: &str) -> Result<Session, AppError>;
    async fn cancel(&self, id: &str, reason: &str) -> Result<Session, AppError>;
}

#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Best-effort dispatch; callers log failures and never roll back.
    async fn session_cancelled(&self, session: &Session, cancelled_by: &str) -> Result<(), AppError>;
}
