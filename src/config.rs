use std::env;
use crate::domain::models::policy::{CancellationPolicy, FeeTier};

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub notify_service_url: String,
    pub notify_service_token: String,
    pub jwt_secret_key: String, // Private key (PEM)
    pub jwt_public_key: String, // Public key (PEM)
    pub auth_issuer: String,
    pub admin_username: String,
    pub admin_password: String,
    pub default_rate_cents: i64,
    pub cancellation_policy: CancellationPolicy,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().expect("PORT must be a number"),
            notify_service_url: env::var("NOTIFY_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/notify".to_string()),
            notify_service_token: env::var("NOTIFY_SERVICE_TOKEN").unwrap_or_else(|_| "test-token-1".to_string()),
            jwt_secret_key: env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set (Ed25519 Private Key)"),
            jwt_public_key: env::var("JWT_PUBLIC_KEY").expect("JWT_PUBLIC_KEY must be set (Ed25519 Public Key)"),
            auth_issuer: env::var("AUTH_ISSUER").unwrap_or_else(|_| "https://api.loom.local".to_string()),
            admin_username: env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").expect("ADMIN_PASSWORD must be set"),
            default_rate_cents: env::var("DEFAULT_RATE_CENTS").unwrap_or_else(|_| "10000".to_string()).parse().expect("DEFAULT_RATE_CENTS must be a number"),
            cancellation_policy: policy_from_env(),
        }
    }
}

/// CANCELLATION_FEE_TIERS is "hours:refund_pct" pairs, comma-separated and
/// ordered by decreasing hours, e.g. "12:50,0:0".
fn policy_from_env() -> CancellationPolicy {
    let free_window_hours = env::var("CANCELLATION_FREE_WINDOW_HOURS")
        .map(|v| v.parse().expect("CANCELLATION_FREE_WINDOW_HOURS must be a number"))
        .unwrap_or(24.0);

    let fee_tiers = match env::var("CANCELLATION_FEE_TIERS") {
        Ok(raw) => raw
            .split(',')
            .map(|pair| {
                let (hours, pct) = pair
                    .split_once(':')
                    .expect("CANCELLATION_FEE_TIERS entries must be hours:percent");
                FeeTier {
                    hours_before: hours.trim().parse().expect("Invalid tier hours"),
                    refund_percentage: pct.trim().parse().expect("Invalid tier percentage"),
                }
            })
            .collect(),
        Err(_) => CancellationPolicy::default().fee_tiers,
    };

    CancellationPolicy { free_window_hours, fee_tiers }
}
