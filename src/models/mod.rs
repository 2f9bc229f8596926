// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the worker.

pub mod activity;
pub mod collection;
pub mod job;
pub mod metrics;

pub use activity::{ActivityRecord, ActivitySummary};
pub use collection::{CollectionResult, DailyHeartRatePoint, HeartRateData};
pub use job::{Job, JobStatus, StatusUpdate};
pub use metrics::{
    BreathingRatePoint, HeartRatePoint, MetricDescriptor, MetricUnit, MetricsBlock, MetricsRow,
    SeriesPoint,
};
