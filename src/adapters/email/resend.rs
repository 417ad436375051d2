//! Resend email client.
//!
//! Plain-text mail only. Callers treat a failed send as non-fatal; the
//! in-app notice is the record of truth.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::config::EmailConfig;
use crate::domain::foundation::DomainError;

const RESEND_API_URL: &str = "https://api.resend.com/emails";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    text: &'a str,
}

pub struct ResendEmailSender {
    http_client: reqwest::Client,
    api_key: SecretString,
    from: String,
    endpoint: String,
}

impl ResendEmailSender {
    /// # Errors
    ///
    /// `Internal` if the HTTP client cannot be built.
    pub fn new(config: &EmailConfig) -> Result<Self, DomainError> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| DomainError::internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key: SecretString::new(config.resend_api_key.clone()),
            from: config.from_header(),
            endpoint: RESEND_API_URL.to_string(),
        })
    }

    /// Point at a different endpoint (local mock servers).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn from_header(&self) -> &str {
        &self.from
    }

    pub async fn send(&self, to: &str, subject: &str, text: &str) -> Result<(), DomainError> {
        let request = SendEmailRequest {
            from: &self.from,
            to: [to],
            subject,
            text,
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| DomainError::internal(format!("Resend request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, error = %error_text, "Resend send failed");
            return Err(DomainError::internal(format!(
                "Resend API error ({}): {}",
                status, error_text
            )));
        }

        Ok(())
    }
}
