// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - collection logic and external API clients.

pub mod collector;
pub mod extractor;
pub mod garmin;
pub mod queue;
pub mod runner;

pub use collector::Collector;
pub use garmin::{DailyHeartRate, FitnessProvider, GarminClient};
pub use queue::QueueClient;
pub use runner::JobRunner;
