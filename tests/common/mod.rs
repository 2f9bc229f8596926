// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use chrono::NaiveDate;
use garmin_collector::error::{AppError, Result};
use garmin_collector::models::{ActivitySummary, MetricsBlock};
use garmin_collector::services::{DailyHeartRate, FitnessProvider};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Mutex;

/// Load a JSON fixture from `tests/fixtures`.
#[allow(dead_code)]
pub fn fixture(name: &str) -> Value {
    let path = format!("tests/fixtures/{}", name);
    let raw = std::fs::read_to_string(&path).expect("Failed to read fixture");
    serde_json::from_str(&raw).expect("Failed to parse fixture")
}

/// Decoded metrics of the sample activity fixture.
#[allow(dead_code)]
pub fn sample_metrics() -> MetricsBlock {
    MetricsBlock::from_json(&fixture("activity_details.json"))
}

#[allow(dead_code)]
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, 26).unwrap()
}

/// Activity summary with a nested activity type.
#[allow(dead_code)]
pub fn summary(id: u64, name: &str) -> ActivitySummary {
    serde_json::from_value(json!({
        "activityId": id,
        "activityName": name,
        "activityType": {"typeId": 1, "typeKey": "running"},
        "startTimeLocal": "2025-10-26 07:12:03",
        "elapsedDuration": 1800.0,
        "distance": 5000.0,
        "elevationGain": 12.0,
        "averageHR": 140.0,
        "maxHR": 165.0
    }))
    .expect("valid summary")
}

/// Daily heart rate with a few samples.
#[allow(dead_code)]
pub fn daily_heart_rate() -> DailyHeartRate {
    DailyHeartRate {
        heart_rate_values: Some(vec![
            json!([1761436800000i64, 55]),
            json!([1761436920000i64, null]),
            json!([1761437040000i64, 58]),
        ]),
        resting_heart_rate: Some(52),
    }
}

/// In-memory fitness provider for collector and runner tests.
#[allow(dead_code)]
#[derive(Default)]
pub struct FakeProvider {
    pub login_error: Option<String>,
    pub heart_rates: Option<DailyHeartRate>,
    pub heart_rate_error: Option<String>,
    pub activities: Vec<ActivitySummary>,
    pub activities_error: Option<String>,
    /// Per-activity detail responses; missing IDs return an empty block.
    pub details: HashMap<u64, std::result::Result<MetricsBlock, String>>,
    /// Activity ID whose detail fetch panics.
    pub panic_on: Option<u64>,
    pub calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl FakeProvider {
    /// Provider with day heart rate and the given activities, all with sample metrics.
    pub fn with_activities(activities: Vec<ActivitySummary>) -> Self {
        let details = activities
            .iter()
            .filter_map(|a| a.id())
            .map(|id| (id, Ok(sample_metrics())))
            .collect();
        Self {
            heart_rates: Some(daily_heart_rate()),
            activities,
            details,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl FitnessProvider for FakeProvider {
    async fn login(&self) -> Result<()> {
        self.record("login".to_string());
        match &self.login_error {
            Some(msg) => Err(AppError::ProviderAuth(msg.clone())),
            None => Ok(()),
        }
    }

    async fn heart_rates(&self, date: NaiveDate) -> Result<Option<DailyHeartRate>> {
        self.record(format!("heart_rates {}", date));
        match &self.heart_rate_error {
            Some(msg) => Err(AppError::Provider(msg.clone())),
            None => Ok(self.heart_rates.clone()),
        }
    }

    async fn activities_for_date(&self, date: NaiveDate) -> Result<Vec<ActivitySummary>> {
        self.record(format!("activities {}", date));
        match &self.activities_error {
            Some(msg) => Err(AppError::Provider(msg.clone())),
            None => Ok(self.activities.clone()),
        }
    }

    async fn activity_details(&self, activity_id: u64) -> Result<MetricsBlock> {
        self.record(format!("details {}", activity_id));
        if self.panic_on == Some(activity_id) {
            panic!("corrupt metrics for activity {}", activity_id);
        }
        match self.details.get(&activity_id) {
            Some(Ok(block)) => Ok(block.clone()),
            Some(Err(msg)) => Err(AppError::Provider(msg.clone())),
            None => Ok(MetricsBlock::default()),
        }
    }
}
