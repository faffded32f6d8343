use crate::domain::models::session::Session;
use crate::domain::ports::NotificationService;
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::error;

/// Dispatches cancellation notifications to the external notification
/// collaborator over HTTP.
pub struct HttpNotificationService {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpNotificationService {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct CancellationPayload<'a> {
    session: &'a Session,
    cancelled_by: &'a str,
}

#[async_trait]
impl NotificationService for HttpNotificationService {
    async fn session_cancelled(&self, session: &Session, cancelled_by: &str) -> Result<(), AppError> {
        let payload = CancellationPayload { session, cancelled_by };

        let response = self.client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("Notification dispatch failed: {}", e);
                AppError::InternalWithMsg(format!("Notification dispatch failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            error!("Notification service returned {}", status);
            return Err(AppError::InternalWithMsg(format!(
                "Notification service returned {}",
                status
            )));
        }

        Ok(())
    }
}
