// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Worker error types.

/// Application error type shared by the provider client, queue client and runner.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Garmin login failed: {0}")]
    ProviderAuth(String),

    #[error("Garmin API error: {0}")]
    Provider(String),

    #[error("Job queue error: {0}")]
    Queue(String),

    #[error("Failed to upload data: {0}")]
    Upload(String),

    #[error("Invalid job: {0}")]
    InvalidJob(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Returns true if the provider rejected our credentials or session.
    pub fn is_provider_auth_error(&self) -> bool {
        matches!(self, AppError::ProviderAuth(_))
    }
}

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, AppError>;

/// Map a non-success HTTP response into an error message `HTTP <status>: <body>`.
pub(crate) async fn http_error_message(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    format!("HTTP {}: {}", status, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_error_mentions_upload() {
        let err = AppError::Upload("HTTP 500 Internal Server Error: boom".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to upload data: HTTP 500 Internal Server Error: boom"
        );
    }

    #[test]
    fn test_is_provider_auth_error() {
        assert!(AppError::ProviderAuth("bad password".to_string()).is_provider_auth_error());
        assert!(!AppError::Provider("HTTP 503".to_string()).is_provider_auth_error());
        assert!(!AppError::Queue("down".to_string()).is_provider_auth_error());
    }
}
