// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Garmin Connect API client.
//!
//! Handles:
//! - Session login with account credentials
//! - Daily heart rate retrieval
//! - Activities for a date (unwrapping the mobile-gateway envelope)
//! - Activity detail metrics

use crate::config::Config;
use crate::error::{http_error_message, AppError, Result};
use crate::models::collection::DailyHeartRatePoint;
use crate::models::{ActivitySummary, MetricsBlock};
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

/// Source of heart rate and activity data for one account.
#[async_trait]
pub trait FitnessProvider: Send + Sync {
    /// Establish a session. Called once per collection.
    async fn login(&self) -> Result<()>;

    /// Whole-day heart rate, or `None` if the provider has nothing for the date.
    async fn heart_rates(&self, date: NaiveDate) -> Result<Option<DailyHeartRate>>;

    /// Summaries of the activities recorded on `date`.
    async fn activities_for_date(&self, date: NaiveDate) -> Result<Vec<ActivitySummary>>;

    /// Detail metrics for one activity.
    async fn activity_details(&self, activity_id: u64) -> Result<MetricsBlock>;
}

/// Daily heart rate response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyHeartRate {
    #[serde(default)]
    pub heart_rate_values: Option<Vec<DailyHeartRatePoint>>,
    #[serde(default)]
    pub resting_heart_rate: Option<i64>,
}

/// Normalize the activities-for-date response into a list of summaries.
///
/// Newer API versions wrap the list as `{"ActivitiesForDay": {"payload": [...]}}`.
/// Entries that cannot be decoded are skipped.
pub fn unwrap_activities(response: Value) -> Vec<ActivitySummary> {
    let list = match response {
        Value::Object(mut obj) => match obj.remove("ActivitiesForDay") {
            Some(Value::Object(mut afd)) => afd.remove("payload").unwrap_or(Value::Null),
            _ => Value::Null,
        },
        other => other,
    };

    let Value::Array(items) = list else {
        return Vec::new();
    };

    items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<ActivitySummary>(item) {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping undecodable activity summary");
                None
            }
        })
        .collect()
}

/// Authenticated session state.
#[derive(Clone)]
struct Session {
    access_token: String,
    display_name: String,
}

/// OAuth token response.
#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Social profile response (we only need the display name).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SocialProfile {
    display_name: String,
}

/// Garmin Connect API client.
pub struct GarminClient {
    http: reqwest::Client,
    base_url: String,
    email: String,
    password: String,
    session: RwLock<Option<Session>>,
}

impl GarminClient {
    /// Create a new client from the worker configuration.
    pub fn new(config: &Config) -> Self {
        Self::with_base_url(
            &config.garmin_api_url,
            config.garmin_email.clone(),
            config.garmin_password.clone(),
        )
    }

    /// Create a client against a specific API base URL.
    pub fn with_base_url(base_url: &str, email: String, password: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            email,
            password,
            session: RwLock::new(None),
        }
    }

    async fn session(&self) -> Result<Session> {
        self.session
            .read()
            .await
            .clone()
            .ok_or_else(|| AppError::ProviderAuth("not logged in".to_string()))
    }

    /// GET a path under the API base and return the JSON body.
    ///
    /// An empty body (204 or zero-length 200) is returned as `Value::Null`.
    async fn get_value(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let session = self.session().await?;
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&session.access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(AppError::ProviderAuth(http_error_message(response).await));
        }
        if status.as_u16() == 429 {
            tracing::warn!("Garmin rate limit hit (429)");
        }
        if !status.is_success() {
            return Err(AppError::Provider(http_error_message(response).await));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::Provider(e.to_string()))?;
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&body)
            .map_err(|e| AppError::Provider(format!("JSON parse error: {}", e)))
    }
}

#[async_trait]
impl FitnessProvider for GarminClient {
    async fn login(&self) -> Result<()> {
        let response = self
            .http
            .post(format!("{}/oauth-service/oauth/token", self.base_url))
            .form(&[
                ("grant_type", "password"),
                ("username", self.email.as_str()),
                ("password", self.password.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ProviderAuth(format!("Token request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ProviderAuth(http_error_message(response).await));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::ProviderAuth(format!("Failed to parse token response: {}", e)))?;

        let profile_response = self
            .http
            .get(format!("{}/userprofile-service/socialProfile", self.base_url))
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| AppError::ProviderAuth(format!("Profile request failed: {}", e)))?;

        if !profile_response.status().is_success() {
            return Err(AppError::ProviderAuth(
                http_error_message(profile_response).await,
            ));
        }

        let profile: SocialProfile = profile_response
            .json()
            .await
            .map_err(|e| AppError::ProviderAuth(format!("Failed to parse profile: {}", e)))?;

        tracing::info!(display_name = %profile.display_name, "Connected to Garmin");

        *self.session.write().await = Some(Session {
            access_token: token.access_token,
            display_name: profile.display_name,
        });
        Ok(())
    }

    async fn heart_rates(&self, date: NaiveDate) -> Result<Option<DailyHeartRate>> {
        let session = self.session().await?;
        let path = format!(
            "/wellness-service/wellness/dailyHeartRate/{}",
            urlencoding::encode(&session.display_name)
        );

        let value = self.get_value(&path, &[("date", date.to_string())]).await?;
        if value.is_null() {
            return Ok(None);
        }

        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| AppError::Provider(format!("Unexpected heart rate response: {}", e)))
    }

    async fn activities_for_date(&self, date: NaiveDate) -> Result<Vec<ActivitySummary>> {
        let path = format!("/mobile-gateway/heartRate/forDate/{}", date);
        let value = self.get_value(&path, &[]).await?;
        Ok(unwrap_activities(value))
    }

    async fn activity_details(&self, activity_id: u64) -> Result<MetricsBlock> {
        let path = format!("/activity-service/activity/{}/details", activity_id);
        let value = self
            .get_value(
                &path,
                &[
                    ("maxChartSize", "2000".to_string()),
                    ("maxPolylineSize", "4000".to_string()),
                ],
            )
            .await?;
        Ok(MetricsBlock::from_json(&value))
    }
}
