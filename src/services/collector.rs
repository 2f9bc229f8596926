// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data collection for one date.
//!
//! Handles the core workflow:
//! 1. Log in to Garmin
//! 2. Fetch the day's heart rate (no data ends collection early)
//! 3. Fetch the day's activities
//! 4. Fetch detail metrics per activity and extract HR/breathing series
//! 5. Assemble the result document

use crate::error::Result;
use crate::models::{ActivityRecord, ActivitySummary, CollectionResult};
use crate::services::extractor::{breathing_rate_series, heart_rate_series};
use crate::services::garmin::FitnessProvider;
use chrono::NaiveDate;

/// Collects heart rate and activity data from a fitness provider.
pub struct Collector<P> {
    provider: P,
}

impl<P: FitnessProvider> Collector<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Collect data for `date`, folding any error into a failure document.
    pub async fn collect_for_date(&self, date: NaiveDate) -> CollectionResult {
        match self.collect(date).await {
            Ok(result) => result,
            Err(e) => {
                tracing::error!(%date, error = %e, "Error collecting data");
                CollectionResult::failure(format!("Error collecting data: {}", e))
            }
        }
    }

    /// Collect data for `date`.
    ///
    /// Errors only on login or the daily heart rate query. Activity-level
    /// failures are logged and leave the activity out of the result.
    pub async fn collect(&self, date: NaiveDate) -> Result<CollectionResult> {
        tracing::info!(%date, "Starting data collection");

        self.provider.login().await?;

        let daily = self.provider.heart_rates(date).await?.unwrap_or_default();
        let Some(series) = daily.heart_rate_values else {
            tracing::info!(%date, "No heart rate data found");
            return Ok(CollectionResult::no_data(date));
        };
        tracing::info!(
            %date,
            points = series.len(),
            resting_heart_rate = ?daily.resting_heart_rate,
            "Collected day heart rate"
        );

        let activities = self.collect_activities(date).await;

        tracing::info!(
            %date,
            activities = activities.len(),
            "Data collection completed"
        );
        Ok(CollectionResult::collected(date, series, activities))
    }

    async fn collect_activities(&self, date: NaiveDate) -> Vec<ActivityRecord> {
        let summaries = match self.provider.activities_for_date(date).await {
            Ok(summaries) => summaries,
            Err(e) => {
                tracing::error!(%date, error = %e, "Error collecting activities");
                return Vec::new();
            }
        };

        if summaries.is_empty() {
            tracing::info!(%date, "No activities found");
            return Vec::new();
        }
        tracing::info!(%date, count = summaries.len(), "Found activities");

        let mut records = Vec::with_capacity(summaries.len());
        for summary in &summaries {
            let Some(activity_id) = summary.id() else {
                tracing::debug!(name = ?summary.activity_name, "Skipping activity without ID");
                continue;
            };

            match self.collect_activity(activity_id, date, summary).await {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(activity_id, error = %e, "Failed to get activity details");
                }
            }
        }

        records
    }

    async fn collect_activity(
        &self,
        activity_id: u64,
        date: NaiveDate,
        summary: &ActivitySummary,
    ) -> Result<ActivityRecord> {
        tracing::info!(activity_id, "Processing activity");

        let metrics = self.provider.activity_details(activity_id).await?;

        let mut record = ActivityRecord::from_summary(activity_id, date, summary);
        record.heart_rate_series = heart_rate_series(&metrics);
        record.breathing_rate_series = breathing_rate_series(&metrics);

        tracing::info!(
            activity_id,
            hr_points = record.heart_rate_series.len(),
            breathing_points = record.breathing_rate_series.len(),
            "Extracted activity series"
        );

        Ok(record)
    }
}
