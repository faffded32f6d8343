use std::sync::Arc;
use crate::domain::ports::{
    AuthRepository, AvailabilityRepository, NotificationService, SessionRepository, UserRepository,
};
use crate::domain::services::auth_service::AuthService;
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub auth_repo: Arc<dyn AuthRepository>,
    pub availability_repo: Arc<dyn AvailabilityRepository>,
    pub session_repo: Arc<dyn SessionRepository>,
    pub auth_service: Arc<AuthService>,
    pub notification_service: Arc<dyn NotificationService>,
}
