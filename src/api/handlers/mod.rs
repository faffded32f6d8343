pub mod auth;
pub mod availability;
pub mod health;
pub mod session;
pub mod user;
