// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Metric series extraction.
//!
//! Column positions come from the activity's metric descriptors, never from
//! fixed offsets. Missing columns, short rows and null cells all produce
//! fewer points, not errors.

use crate::models::metrics::{
    BreathingRatePoint, HeartRatePoint, MetricDescriptor, MetricsBlock, MetricsRow, SeriesPoint,
    HEART_RATE_KEY, RESPIRATION_RATE_KEY, TIMESTAMP_KEY,
};

/// Heart rate readings above this (bpm) are sensor artifacts.
pub const MAX_PLAUSIBLE_HEART_RATE: f64 = 200.0;

/// Find the column index of each wanted key in one pass over the descriptors.
///
/// The first descriptor matching a key wins. Keys with no descriptor map to `None`.
pub fn locate_columns<const N: usize>(
    descriptors: &[MetricDescriptor],
    wanted: [&str; N],
) -> [Option<usize>; N] {
    let mut found = [None; N];
    for descriptor in descriptors {
        for (slot, key) in found.iter_mut().zip(wanted.iter()) {
            if slot.is_none() && descriptor.key == *key {
                *slot = Some(descriptor.metrics_index);
            }
        }
    }
    found
}

/// Unit factor of the first descriptor matching `key`, or 1.0.
pub fn resolve_scale_factor(descriptors: &[MetricDescriptor], key: &str) -> f64 {
    descriptors
        .iter()
        .find(|d| d.key == key)
        .and_then(|d| d.unit.as_ref())
        .and_then(|u| u.factor)
        .unwrap_or(1.0)
}

/// Turn rows into `(timestamp, value * scale_factor)` points.
///
/// Rows too short for either column, or with a null in either cell, are
/// skipped. Values for which `accept` returns false are dropped. Input order
/// is kept.
pub fn extract_series(
    rows: &[MetricsRow],
    value_column: usize,
    timestamp_column: usize,
    scale_factor: f64,
    accept: impl Fn(f64) -> bool,
) -> Vec<SeriesPoint<f64>> {
    let mut series = Vec::new();
    let mut rejected = 0usize;

    for row in rows {
        let timestamp = row.get(timestamp_column).copied().flatten();
        let raw = row.get(value_column).copied().flatten();
        let (Some(timestamp), Some(raw)) = (timestamp, raw) else {
            continue;
        };

        let scaled = raw * scale_factor;
        if !accept(scaled) {
            rejected += 1;
            if rejected <= 10 {
                tracing::debug!(value = scaled, column = value_column, "Rejected reading");
            }
            continue;
        }

        series.push(SeriesPoint(timestamp as i64, scaled));
    }

    if rejected > 0 {
        tracing::info!(
            column = value_column,
            rejected,
            kept = series.len(),
            "Filtered implausible readings"
        );
    }

    series
}

/// Heart rate filter: keep readings up to the plausibility ceiling.
pub fn is_plausible_heart_rate(bpm: f64) -> bool {
    bpm <= MAX_PLAUSIBLE_HEART_RATE
}

/// Heart rate series in whole bpm, scaled by the descriptor factor and filtered.
pub fn heart_rate_series(block: &MetricsBlock) -> Vec<HeartRatePoint> {
    if block.is_empty() {
        tracing::debug!("No activity detail metrics");
        return Vec::new();
    }

    let [hr_column, ts_column] =
        locate_columns(&block.descriptors, [HEART_RATE_KEY, TIMESTAMP_KEY]);
    let (Some(hr_column), Some(ts_column)) = (hr_column, ts_column) else {
        tracing::warn!(
            heart_rate_column = ?hr_column,
            timestamp_column = ?ts_column,
            "Heart rate or timestamp column missing from metric descriptors"
        );
        return Vec::new();
    };

    let factor = resolve_scale_factor(&block.descriptors, HEART_RATE_KEY);
    tracing::debug!(hr_column, ts_column, factor, "Extracting heart rate");

    extract_series(
        &block.rows,
        hr_column,
        ts_column,
        factor,
        is_plausible_heart_rate,
    )
    .into_iter()
    .map(|SeriesPoint(ts, bpm)| SeriesPoint(ts, bpm as i64))
    .collect()
}

/// Breathing rate series in breaths/min. Unscaled and unfiltered.
pub fn breathing_rate_series(block: &MetricsBlock) -> Vec<BreathingRatePoint> {
    if block.is_empty() {
        return Vec::new();
    }

    let [br_column, ts_column] =
        locate_columns(&block.descriptors, [RESPIRATION_RATE_KEY, TIMESTAMP_KEY]);
    let (Some(br_column), Some(ts_column)) = (br_column, ts_column) else {
        // Many activity types have no respiration channel.
        tracing::debug!(
            breathing_column = ?br_column,
            timestamp_column = ?ts_column,
            "Breathing rate or timestamp column missing from metric descriptors"
        );
        return Vec::new();
    };

    extract_series(&block.rows, br_column, ts_column, 1.0, |_| true)
}

/// Human-readable summary of an activity's metric schema and what extraction finds.
pub fn metrics_report(block: &MetricsBlock) -> String {
    let mut lines = vec![format!("Descriptors ({}):", block.descriptors.len())];
    for d in &block.descriptors {
        let unit = d.unit.clone().unwrap_or_default();
        lines.push(format!(
            "  [{:>2}] {} ({}, factor={})",
            d.metrics_index,
            d.key,
            unit.key.as_deref().unwrap_or("unknown"),
            unit.factor.unwrap_or(1.0)
        ));
    }
    lines.push(format!("Metrics rows: {}", block.rows.len()));

    let columns = locate_columns(
        &block.descriptors,
        [HEART_RATE_KEY, RESPIRATION_RATE_KEY, TIMESTAMP_KEY],
    );
    for (label, column) in ["Heart rate", "Breathing rate", "Timestamp"]
        .iter()
        .zip(columns)
    {
        match column {
            Some(index) => lines.push(format!("{} column: {}", label, index)),
            None => lines.push(format!("{} column: not found", label)),
        }
    }
    lines.push(format!(
        "Heart rate factor: {}",
        resolve_scale_factor(&block.descriptors, HEART_RATE_KEY)
    ));
    lines.push(format!(
        "Extracted: {} heart rate points, {} breathing rate points",
        heart_rate_series(block).len(),
        breathing_rate_series(block).len()
    ));

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::metrics::MetricUnit;

    fn descriptor(key: &str, index: usize, factor: Option<f64>) -> MetricDescriptor {
        MetricDescriptor {
            key: key.to_string(),
            metrics_index: index,
            unit: factor.map(|f| MetricUnit {
                key: None,
                factor: Some(f),
            }),
        }
    }

    fn rows(values: &[&[Option<f64>]]) -> Vec<MetricsRow> {
        values.iter().map(|r| r.to_vec()).collect()
    }

    #[test]
    fn test_locate_columns() {
        let descriptors = vec![
            descriptor("directSpeed", 0, None),
            descriptor(HEART_RATE_KEY, 4, Some(1.0)),
            descriptor(TIMESTAMP_KEY, 2, None),
        ];

        let [hr, ts, br] = locate_columns(
            &descriptors,
            [HEART_RATE_KEY, TIMESTAMP_KEY, RESPIRATION_RATE_KEY],
        );
        assert_eq!(hr, Some(4));
        assert_eq!(ts, Some(2));
        assert_eq!(br, None);
    }

    #[test]
    fn test_locate_columns_first_match_wins() {
        let descriptors = vec![
            descriptor(HEART_RATE_KEY, 3, None),
            descriptor(HEART_RATE_KEY, 9, None),
        ];
        assert_eq!(locate_columns(&descriptors, [HEART_RATE_KEY]), [Some(3)]);
    }

    #[test]
    fn test_locate_columns_empty_descriptors() {
        assert_eq!(
            locate_columns(&[], [HEART_RATE_KEY, TIMESTAMP_KEY]),
            [None, None]
        );
    }

    #[test]
    fn test_resolve_scale_factor() {
        let descriptors = vec![
            descriptor(HEART_RATE_KEY, 1, Some(0.5)),
            descriptor(HEART_RATE_KEY, 2, Some(2.0)),
            descriptor(TIMESTAMP_KEY, 0, None),
            MetricDescriptor {
                key: RESPIRATION_RATE_KEY.to_string(),
                metrics_index: 3,
                unit: Some(MetricUnit::default()),
            },
        ];

        assert_eq!(resolve_scale_factor(&descriptors, HEART_RATE_KEY), 0.5);
        assert_eq!(resolve_scale_factor(&descriptors, TIMESTAMP_KEY), 1.0);
        assert_eq!(resolve_scale_factor(&descriptors, RESPIRATION_RATE_KEY), 1.0);
        assert_eq!(resolve_scale_factor(&descriptors, "directSpeed"), 1.0);
        assert_eq!(resolve_scale_factor(&[], HEART_RATE_KEY), 1.0);
    }

    #[test]
    fn test_extract_series_skips_short_rows_and_nulls() {
        let data = rows(&[
            &[Some(1000.0), Some(60.0)],
            &[Some(1001.0)],
            &[None, Some(61.0)],
            &[Some(1003.0), None],
            &[],
            &[Some(1004.0), Some(62.0), Some(99.0)],
        ]);

        let series = extract_series(&data, 1, 0, 1.0, |_| true);
        assert_eq!(series, vec![SeriesPoint(1000, 60.0), SeriesPoint(1004, 62.0)]);
    }

    #[test]
    fn test_extract_series_preserves_order() {
        let data = rows(&[
            &[Some(3000.0), Some(1.0)],
            &[Some(1000.0), Some(2.0)],
            &[Some(2000.0), Some(3.0)],
            &[Some(1000.0), Some(4.0)],
        ]);

        let timestamps: Vec<i64> = extract_series(&data, 1, 0, 1.0, |_| true)
            .iter()
            .map(SeriesPoint::timestamp)
            .collect();
        assert_eq!(timestamps, vec![3000, 1000, 2000, 1000]);
    }

    #[test]
    fn test_extract_series_empty_input() {
        assert!(extract_series(&[], 1, 0, 1.0, |_| true).is_empty());
    }

    #[test]
    fn test_extract_series_applies_factor_before_filter() {
        let data = rows(&[&[Some(1.0), Some(150.0)], &[Some(2.0), Some(90.0)]]);

        // 150 * 2 = 300 rejected, 90 * 2 = 180 kept
        let series = extract_series(&data, 1, 0, 2.0, is_plausible_heart_rate);
        assert_eq!(series, vec![SeriesPoint(2, 180.0)]);
    }

    #[test]
    fn test_heart_rate_filter_scenario() {
        let block = MetricsBlock {
            descriptors: vec![
                descriptor(TIMESTAMP_KEY, 0, None),
                descriptor(HEART_RATE_KEY, 1, Some(1.0)),
            ],
            rows: rows(&[
                &[Some(1000.0), Some(65.0)],
                &[Some(1001.0), Some(205.0)],
                &[Some(1002.0), Some(70.0)],
            ]),
        };

        assert_eq!(
            heart_rate_series(&block),
            vec![SeriesPoint(1000, 65), SeriesPoint(1002, 70)]
        );
    }

    #[test]
    fn test_heart_rate_ceiling_is_inclusive_and_truncates() {
        let block = MetricsBlock {
            descriptors: vec![
                descriptor(HEART_RATE_KEY, 0, None),
                descriptor(TIMESTAMP_KEY, 1, None),
            ],
            rows: rows(&[
                &[Some(200.0), Some(1.0)],
                &[Some(200.5), Some(2.0)],
                &[Some(72.9), Some(3.0)],
            ]),
        };

        assert_eq!(
            heart_rate_series(&block),
            vec![SeriesPoint(1, 200), SeriesPoint(3, 72)]
        );
    }

    #[test]
    fn test_heart_rate_missing_timestamp_column() {
        let block = MetricsBlock {
            descriptors: vec![descriptor(HEART_RATE_KEY, 1, Some(1.0))],
            rows: rows(&[&[Some(1000.0), Some(65.0)]]),
        };
        assert!(heart_rate_series(&block).is_empty());
    }

    #[test]
    fn test_heart_rate_missing_heart_rate_column() {
        let block = MetricsBlock {
            descriptors: vec![descriptor(TIMESTAMP_KEY, 0, None)],
            rows: rows(&[&[Some(1000.0), Some(65.0)]]),
        };
        assert!(heart_rate_series(&block).is_empty());
    }

    #[test]
    fn test_empty_block_yields_empty_series() {
        let block = MetricsBlock::default();
        assert!(heart_rate_series(&block).is_empty());
        assert!(breathing_rate_series(&block).is_empty());
    }

    #[test]
    fn test_breathing_rate_unscaled_and_unfiltered() {
        let block = MetricsBlock {
            descriptors: vec![
                descriptor(TIMESTAMP_KEY, 0, None),
                descriptor(HEART_RATE_KEY, 1, Some(1.0)),
                descriptor(RESPIRATION_RATE_KEY, 2, Some(10.0)),
            ],
            rows: rows(&[
                &[Some(1000.0), Some(65.0), Some(14.5)],
                &[Some(1001.0), Some(66.0)],
                &[Some(1002.0), Some(250.0), Some(240.0)],
            ]),
        };

        assert_eq!(
            breathing_rate_series(&block),
            vec![SeriesPoint(1000, 14.5), SeriesPoint(1002, 240.0)]
        );
    }

    #[test]
    fn test_breathing_rate_missing_column() {
        let block = MetricsBlock {
            descriptors: vec![
                descriptor(TIMESTAMP_KEY, 0, None),
                descriptor(HEART_RATE_KEY, 1, None),
            ],
            rows: rows(&[&[Some(1000.0), Some(65.0)]]),
        };
        assert!(breathing_rate_series(&block).is_empty());
    }

    #[test]
    fn test_metrics_report() {
        let block = MetricsBlock {
            descriptors: vec![
                MetricDescriptor {
                    key: TIMESTAMP_KEY.to_string(),
                    metrics_index: 0,
                    unit: Some(MetricUnit {
                        key: Some("gmt".to_string()),
                        factor: Some(0.0),
                    }),
                },
                descriptor(HEART_RATE_KEY, 1, Some(1.0)),
            ],
            rows: rows(&[&[Some(1000.0), Some(65.0)], &[Some(1001.0), Some(205.0)]]),
        };

        let report = metrics_report(&block);
        assert!(report.starts_with("Descriptors (2):"));
        assert!(report.contains("[ 0] directTimestamp (gmt, factor=0)"));
        assert!(report.contains("[ 1] directHeartRate (unknown, factor=1)"));
        assert!(report.contains("Metrics rows: 2"));
        assert!(report.contains("Heart rate column: 1"));
        assert!(report.contains("Breathing rate column: not found"));
        assert!(report.contains("Timestamp column: 0"));
        assert!(report.ends_with("Extracted: 1 heart rate points, 0 breathing rate points"));
    }
}
