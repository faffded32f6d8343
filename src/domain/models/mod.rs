pub mod auth;
pub mod availability;
pub mod policy;
pub mod session;
pub mod user;
