// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Garmin activity summaries and the activity records we report.

use crate::models::metrics::{BreathingRatePoint, HeartRatePoint};
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Activity summary from the activities-for-date endpoint.
///
/// Field shapes have changed across Garmin API versions, so every field is
/// optional and the ambiguous ones accept either form. A field of an
/// unexpected type decodes as absent instead of rejecting the whole summary.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySummary {
    #[serde(default, deserialize_with = "lenient")]
    pub activity_id: Option<ActivityId>,
    #[serde(default, deserialize_with = "lenient")]
    pub activity_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub activity_type: Option<ActivityType>,
    #[serde(default, deserialize_with = "lenient")]
    pub start_time_local: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub elapsed_duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub duration: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub distance: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub elevation_gain: Option<f64>,
    #[serde(default, rename = "averageHR", deserialize_with = "lenient")]
    pub average_hr: Option<f64>,
    #[serde(default, rename = "maxHR", deserialize_with = "lenient")]
    pub max_hr: Option<f64>,
}

/// Decode an optional field, mapping a value of the wrong type to `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

/// Activity identifier, sent as a number or as a numeric string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ActivityId {
    Number(u64),
    Text(String),
}

/// Activity type, either `{"typeKey": "running"}` or a flat `"running"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ActivityType {
    Nested {
        #[serde(rename = "typeKey", default)]
        type_key: Option<String>,
    },
    Flat(String),
}

impl ActivitySummary {
    /// The activity ID, if present and valid (non-zero).
    pub fn id(&self) -> Option<u64> {
        let id = match self.activity_id.as_ref()? {
            ActivityId::Number(n) => *n,
            ActivityId::Text(s) => s.trim().parse().ok()?,
        };
        (id != 0).then_some(id)
    }

    /// Activity type key (e.g. "running"), empty if unknown.
    pub fn type_key(&self) -> &str {
        match &self.activity_type {
            Some(ActivityType::Nested { type_key }) => type_key.as_deref().unwrap_or(""),
            Some(ActivityType::Flat(key)) => key,
            None => "",
        }
    }

    /// Elapsed duration in seconds, falling back to moving duration.
    pub fn duration_seconds(&self) -> Option<f64> {
        self.elapsed_duration.or(self.duration)
    }
}

/// One exercise session as reported to the job queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Garmin activity ID
    pub activity_id: u64,
    /// Date the activity was collected for
    pub date: NaiveDate,
    /// Activity name/title
    pub activity_name: String,
    /// Activity type key (running, cycling, ...)
    pub activity_type: String,
    /// Local start time as reported by Garmin
    pub start_time_local: Option<String>,
    /// Elapsed duration in seconds
    pub duration_seconds: Option<f64>,
    /// Distance in meters
    pub distance_meters: Option<f64>,
    /// Elevation gain in meters
    pub elevation_gain: Option<f64>,
    /// Summary average heart rate
    pub average_hr: Option<f64>,
    /// Summary maximum heart rate
    pub max_hr: Option<f64>,
    pub heart_rate_series: Vec<HeartRatePoint>,
    pub breathing_rate_series: Vec<BreathingRatePoint>,
}

impl ActivityRecord {
    /// Build a record from a summary, with empty series.
    pub fn from_summary(activity_id: u64, date: NaiveDate, summary: &ActivitySummary) -> Self {
        Self {
            activity_id,
            date,
            activity_name: summary.activity_name.clone().unwrap_or_default(),
            activity_type: summary.type_key().to_string(),
            start_time_local: summary.start_time_local.clone(),
            duration_seconds: summary.duration_seconds(),
            distance_meters: summary.distance,
            elevation_gain: summary.elevation_gain,
            average_hr: summary.average_hr,
            max_hr: summary.max_hr,
            heart_rate_series: Vec::new(),
            breathing_rate_series: Vec::new(),
        }
    }
}
