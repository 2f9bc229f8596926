// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Result document produced by one collection job.

use crate::models::activity::ActivityRecord;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Daily heart rate sample `[timestamp, bpm]`, relayed exactly as Garmin sent it.
///
/// The bpm is null when the watch was not worn.
pub type DailyHeartRatePoint = Value;

/// Whole-day heart rate series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeartRateData {
    pub date: NaiveDate,
    #[serde(rename = "heartRateValues")]
    pub series: Vec<DailyHeartRatePoint>,
}

/// Outcome of collecting one date, uploaded to the queue as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionResult {
    pub success: bool,
    pub data_found: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heart_rate_data: Option<HeartRateData>,
    #[serde(default)]
    pub activities: Vec<ActivityRecord>,
}

impl CollectionResult {
    /// Data was found for the date.
    pub fn collected(
        date: NaiveDate,
        series: Vec<DailyHeartRatePoint>,
        activities: Vec<ActivityRecord>,
    ) -> Self {
        Self {
            success: true,
            data_found: true,
            message: format!("Successfully collected data for {}", date),
            heart_rate_data: Some(HeartRateData { date, series }),
            activities,
        }
    }

    /// No heart rate data exists for the date. Not an error.
    pub fn no_data(date: NaiveDate) -> Self {
        Self {
            success: false,
            data_found: false,
            message: format!("No heart rate data found for {}", date),
            heart_rate_data: None,
            activities: Vec::new(),
        }
    }

    /// Collection failed before any data could be gathered.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data_found: false,
            message: message.into(),
            heart_rate_data: None,
            activities: Vec::new(),
        }
    }

    /// Number of whole-day heart rate points.
    pub fn day_point_count(&self) -> usize {
        self.heart_rate_data
            .as_ref()
            .map(|d| d.series.len())
            .unwrap_or(0)
    }

    /// Short multi-line summary: status, day points and per-activity series sizes.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Success: {}", self.success),
            format!("Data found: {}", self.data_found),
            format!("Message: {}", self.message),
            format!("Day HR points: {}", self.day_point_count()),
            format!("Activities: {}", self.activities.len()),
        ];
        for (i, activity) in self.activities.iter().enumerate() {
            lines.push(format!(
                "  {}. {} ({}) HR series: {} points, breathing series: {} points",
                i + 1,
                activity.activity_name,
                activity.activity_id,
                activity.heart_rate_series.len(),
                activity.breathing_rate_series.len()
            ));
        }
        lines.join("\n")
    }
}
