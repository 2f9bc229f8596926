// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Collection jobs and the status updates reported back to the queue.

use crate::error::{AppError, Result};
use crate::models::collection::CollectionResult;
use crate::time_utils::{format_utc_rfc3339, parse_date};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A pending job as returned by `GET /api/jobs/pending`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Job {
    #[validate(length(min = 1, max = 128))]
    pub job_id: String,
    /// Requested date, `YYYY-MM-DD`. Kept raw so a bad date fails the job, not the poll.
    #[serde(default)]
    pub target_date: Option<String>,
}

impl Job {
    pub fn new(job_id: impl Into<String>, target_date: NaiveDate) -> Self {
        Self {
            job_id: job_id.into(),
            target_date: Some(target_date.format("%Y-%m-%d").to_string()),
        }
    }

    /// Parse the requested date.
    pub fn target_date(&self) -> Result<NaiveDate> {
        let raw = self
            .target_date
            .as_deref()
            .ok_or_else(|| AppError::InvalidJob("missing target_date".to_string()))?;
        parse_date(raw)
            .ok_or_else(|| AppError::InvalidJob(format!("invalid target_date {:?}", raw)))
    }
}

/// Job status as understood by the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Running => "running",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of `POST /api/jobs/{job_id}/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: JobStatus,
    pub updated_at: String,
    /// `CollectionResult` serialized as a JSON string.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl StatusUpdate {
    fn now(status: JobStatus) -> Self {
        Self {
            status,
            updated_at: format_utc_rfc3339(Utc::now()),
            result: None,
            error_message: None,
        }
    }

    pub fn running() -> Self {
        Self::now(JobStatus::Running)
    }

    pub fn completed(result: &CollectionResult) -> Result<Self> {
        let encoded = serde_json::to_string(result)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("JSON error: {}", e)))?;
        Ok(Self {
            result: Some(encoded),
            ..Self::now(JobStatus::Completed)
        })
    }

    pub fn failed(error_message: impl Into<String>) -> Self {
        Self {
            error_message: Some(error_message.into()),
            ..Self::now(JobStatus::Failed)
        }
    }

    /// Decode the attached result, if any.
    pub fn decode_result(&self) -> Option<CollectionResult> {
        self.result
            .as_deref()
            .and_then(|raw| serde_json::from_str(raw).ok())
    }
}
