// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Job queue (rehab platform) client.
//!
//! Every request carries the shared secret as a bearer token.

use crate::config::Config;
use crate::error::{http_error_message, AppError, Result};
use crate::models::{CollectionResult, Job, StatusUpdate};
use serde_json::Value;
use validator::Validate;

/// HTTP client for the job queue API.
#[derive(Clone)]
pub struct QueueClient {
    http: reqwest::Client,
    base_url: String,
    shared_secret: String,
}

impl QueueClient {
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(&config.queue_url, config.shared_secret.clone())
    }

    pub fn with_base_url(base_url: &str, shared_secret: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            shared_secret,
        }
    }

    /// Fetch pending jobs. An empty list means no work.
    ///
    /// Entries without a usable `job_id` are skipped.
    pub async fn pending_jobs(&self) -> Result<Vec<Job>> {
        let url = format!("{}/api/jobs/pending", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.shared_secret)
            .send()
            .await
            .map_err(|e| AppError::Queue(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Queue(http_error_message(response).await));
        }

        let value: Value = response
            .json()
            .await
            .map_err(|e| AppError::Queue(format!("JSON parse error: {}", e)))?;

        let items = match value {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => {
                return Err(AppError::Queue(format!(
                    "Expected a list of jobs, got: {}",
                    other
                )))
            }
        };

        Ok(items.into_iter().filter_map(decode_job).collect())
    }

    /// Report a job status transition.
    pub async fn update_status(&self, job_id: &str, update: &StatusUpdate) -> Result<()> {
        let url = format!(
            "{}/api/jobs/{}/status",
            self.base_url,
            urlencoding::encode(job_id)
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.shared_secret)
            .json(update)
            .send()
            .await
            .map_err(|e| AppError::Queue(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Queue(http_error_message(response).await));
        }

        tracing::info!(job_id, status = %update.status, "Updated job status");
        Ok(())
    }

    /// Upload the collected data for a job.
    pub async fn upload_data(&self, job_id: &str, result: &CollectionResult) -> Result<()> {
        let url = format!(
            "{}/api/jobs/{}/data",
            self.base_url,
            urlencoding::encode(job_id)
        );

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.shared_secret)
            .json(result)
            .send()
            .await
            .map_err(|e| AppError::Upload(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AppError::Upload(http_error_message(response).await));
        }

        tracing::info!(job_id, "Uploaded collected data");
        Ok(())
    }
}

fn decode_job(item: Value) -> Option<Job> {
    let job: Job = match serde_json::from_value(item) {
        Ok(job) => job,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping undecodable job");
            return None;
        }
    };

    if let Err(e) = job.validate() {
        tracing::warn!(job_id = %job.job_id, error = %e, "Skipping invalid job");
        return None;
    }

    Some(job)
}
