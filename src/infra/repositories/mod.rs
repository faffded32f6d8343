pub mod postgres_auth_repo;
pub mod postgres_availability_repo;
pub mod postgres_session_repo;
pub mod postgres_user_repo;
pub mod sqlite_auth_repo;
pub mod sqlite_availability_repo;
pub mod sqlite_session_repo;
pub mod sqlite_user_repo;
