// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Per-activity detail metrics as returned by Garmin Connect.
//!
//! Each activity carries a list of metric descriptors that name the columns
//! of its metrics rows. The column layout differs between activity types and
//! between API versions, so nothing here assumes a fixed position.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Descriptor key for heart rate (bpm).
pub const HEART_RATE_KEY: &str = "directHeartRate";
/// Descriptor key for respiration rate (breaths/min).
pub const RESPIRATION_RATE_KEY: &str = "directRespirationRate";
/// Descriptor key for the sample timestamp (epoch millis).
pub const TIMESTAMP_KEY: &str = "directTimestamp";

/// Declares that column `metrics_index` of every row holds the quantity `key`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricDescriptor {
    pub key: String,
    pub metrics_index: usize,
    #[serde(default)]
    pub unit: Option<MetricUnit>,
}

/// Unit of a metric column and the factor converting raw values to display units.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricUnit {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub factor: Option<f64>,
}

/// One sample: numeric-or-null cells indexed by descriptor `metrics_index`.
pub type MetricsRow = Vec<Option<f64>>;

/// A `(timestamp, value)` sample of one channel.
///
/// Serialized as a two-element JSON array, e.g. `[1729955063000, 142]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint<T>(pub i64, pub T);

impl<T> SeriesPoint<T> {
    pub fn timestamp(&self) -> i64 {
        self.0
    }

    pub fn value(&self) -> &T {
        &self.1
    }
}

/// Heart rate sample in whole beats per minute.
pub type HeartRatePoint = SeriesPoint<i64>;

/// Breathing rate sample in breaths per minute.
pub type BreathingRatePoint = SeriesPoint<f64>;

/// Decoded metrics of one activity: the column schema plus its rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricsBlock {
    pub descriptors: Vec<MetricDescriptor>,
    pub rows: Vec<MetricsRow>,
}

impl MetricsBlock {
    /// Decode an activity-details response.
    ///
    /// Accepted layouts for `activityDetailMetrics`:
    /// - a list of `{"metrics": [...]}` objects (current API)
    /// - a list of bare arrays
    /// - an object `{"metricDescriptors": [...], "metrics": [[...], ...]}` (older API)
    ///
    /// Anything else decodes as an empty block rather than an error.
    pub fn from_json(details: &Value) -> Self {
        let metrics = details.get("activityDetailMetrics");

        let (descriptor_source, row_source) = match metrics {
            Some(Value::Object(inner)) => (
                inner
                    .get("metricDescriptors")
                    .or_else(|| details.get("metricDescriptors")),
                inner.get("metrics"),
            ),
            other => (details.get("metricDescriptors"), other),
        };

        Self {
            descriptors: decode_descriptors(descriptor_source),
            rows: decode_rows(row_source),
        }
    }

    /// True when there are no usable rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn decode_descriptors(value: Option<&Value>) -> Vec<MetricDescriptor> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match MetricDescriptor::deserialize(item) {
            Ok(descriptor) => Some(descriptor),
            Err(e) => {
                tracing::debug!(error = %e, "Skipping undecodable metric descriptor");
                None
            }
        })
        .collect()
}

fn decode_rows(value: Option<&Value>) -> Vec<MetricsRow> {
    let Some(Value::Array(entries)) = value else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::Object(obj) => match obj.get("metrics") {
                Some(Value::Array(cells)) => Some(decode_cells(cells)),
                _ => None,
            },
            Value::Array(cells) => Some(decode_cells(cells)),
            _ => None,
        })
        .collect()
}

fn decode_cells(cells: &[Value]) -> MetricsRow {
    cells.iter().map(Value::as_f64).collect()
}
