// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Garmin collector: fetch heart rate and activity data for queued dates
//!
//! This crate polls the rehab platform's job queue, collects Garmin Connect
//! heart rate and per-activity HR/breathing series for each requested date,
//! and reports the results back to the queue.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;
