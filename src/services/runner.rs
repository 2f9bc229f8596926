// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Job runner: polls the queue and runs one job at a time.
//!
//! Status flow per job: `running` is reported before any Garmin call, then
//! `completed` or `failed`. "No data for this date" is `completed`.

use crate::error::Result;
use crate::models::{Job, JobStatus, StatusUpdate};
use crate::services::collector::Collector;
use crate::services::garmin::FitnessProvider;
use crate::services::queue::QueueClient;
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tokio::sync::watch;

/// Sequential job runner.
pub struct JobRunner<P> {
    queue: QueueClient,
    collector: Collector<P>,
    poll_interval: Duration,
}

impl<P: FitnessProvider> JobRunner<P> {
    pub fn new(queue: QueueClient, collector: Collector<P>, poll_interval: Duration) -> Self {
        Self {
            queue,
            collector,
            poll_interval,
        }
    }

    /// Run one job to completion and report its final status.
    ///
    /// Never returns an error: every failure ends up as a `failed` status.
    pub async fn run_job(&self, job: &Job) -> JobStatus {
        let job_id = job.job_id.as_str();
        tracing::info!(job_id, target_date = ?job.target_date, "Starting job");

        self.report(job_id, &StatusUpdate::running()).await;

        let update = match AssertUnwindSafe(self.execute(job)).catch_unwind().await {
            Ok(Ok(update)) => update,
            Ok(Err(e)) => {
                tracing::error!(job_id, error = %e, "Job failed");
                if e.is_provider_auth_error() {
                    tracing::warn!(
                        job_id,
                        "Garmin rejected the session; check GARMIN_EMAIL and GARMIN_PASSWORD"
                    );
                }
                StatusUpdate::failed(e.to_string())
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                tracing::error!(job_id, error = %message, "Job panicked");
                StatusUpdate::failed(message)
            }
        };

        self.report(job_id, &update).await;
        update.status
    }

    async fn execute(&self, job: &Job) -> Result<StatusUpdate> {
        let date = job.target_date()?;
        let result = self.collector.collect(date).await?;

        if result.success {
            self.queue.upload_data(&job.job_id, &result).await?;
            tracing::info!(job_id = %job.job_id, "Job completed successfully");
        } else {
            tracing::info!(job_id = %job.job_id, "Job completed with no data found");
        }

        StatusUpdate::completed(&result)
    }

    async fn report(&self, job_id: &str, update: &StatusUpdate) {
        if let Err(e) = self.queue.update_status(job_id, update).await {
            tracing::error!(
                job_id,
                status = %update.status,
                error = %e,
                "Failed to update job status"
            );
        }
    }

    /// Poll once and run every returned job in order. Returns the number run.
    ///
    /// Stops between jobs if shutdown was requested.
    pub async fn poll_once(&self, shutdown: &watch::Receiver<bool>) -> usize {
        let jobs = match self.queue.pending_jobs().await {
            Ok(jobs) => jobs,
            Err(e) => {
                tracing::error!(error = %e, "Failed to poll for jobs");
                return 0;
            }
        };

        if jobs.is_empty() {
            tracing::debug!("No pending jobs found");
            return 0;
        }
        tracing::info!(count = jobs.len(), "Found pending jobs");

        let mut processed = 0;
        for job in &jobs {
            if *shutdown.borrow() {
                tracing::info!(
                    remaining = jobs.len() - processed,
                    "Shutdown requested, leaving remaining jobs pending"
                );
                break;
            }
            self.run_job(job).await;
            processed += 1;
        }
        processed
    }

    /// Poll until `shutdown` becomes true (or its sender goes away).
    ///
    /// A job in progress always runs to completion first.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!(
            interval_secs = self.poll_interval.as_secs(),
            "Starting polling loop"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }

            self.poll_once(&shutdown).await;

            let stop = tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => false,
                changed = shutdown.changed() => changed.is_err(),
            };
            if stop {
                break;
            }
        }

        tracing::info!("Polling loop stopped");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("Unexpected error: {}", s)
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("Unexpected error: {}", s)
    } else {
        "Unexpected error".to_string()
    }
}
