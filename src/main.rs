// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Garmin collector worker
//!
//! Polls the rehab platform for collection jobs and uploads Garmin heart
//! rate and activity data for each requested date.

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use garmin_collector::{
    config::Config,
    services::{extractor, Collector, FitnessProvider, GarminClient, JobRunner, QueueClient},
};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::watch;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Collect Garmin heart rate and activity data for queued dates.
#[derive(Parser, Debug)]
#[command(name = "garmin-collector", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Poll the job queue and run jobs until interrupted (default)
    Run {
        /// Seconds between polls (overrides POLL_INTERVAL)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        poll_interval: Option<u64>,
    },
    /// Collect one date and write the result document as JSON
    Collect {
        /// Date to collect (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the metric schema and extraction results for one activity
    Inspect {
        /// Garmin activity ID
        #[arg(long)]
        activity_id: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;

    match cli.command.unwrap_or(Command::Run {
        poll_interval: None,
    }) {
        Command::Run { poll_interval } => run(config, poll_interval).await,
        Command::Collect { date, output } => collect(config, date, output).await,
        Command::Inspect { activity_id } => inspect(config, activity_id).await,
    }
}

async fn run(config: Config, poll_interval: Option<u64>) -> anyhow::Result<()> {
    let poll_interval = poll_interval
        .map(Duration::from_secs)
        .unwrap_or_else(|| config.poll_interval());

    tracing::info!(
        queue_url = %config.queue_url,
        garmin_email = %config.garmin_email,
        interval_secs = poll_interval.as_secs(),
        "Starting Garmin collector"
    );

    let runner = JobRunner::new(
        QueueClient::new(&config),
        Collector::new(GarminClient::new(&config)),
        poll_interval,
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, finishing current job");
        let _ = shutdown_tx.send(true);
    });

    runner.run(shutdown_rx).await;
    Ok(())
}

async fn collect(config: Config, date: NaiveDate, output: Option<PathBuf>) -> anyhow::Result<()> {
    let collector = Collector::new(GarminClient::new(&config));
    let result = collector.collect_for_date(date).await;

    let json = serde_json::to_string_pretty(&result)?;
    match &output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Saved to: {}", path.display());
            println!("{}", result.summary());
        }
        None => {
            println!("{}", json);
            eprintln!("{}", result.summary());
        }
    }
    Ok(())
}

async fn inspect(config: Config, activity_id: u64) -> anyhow::Result<()> {
    let client = GarminClient::new(&config);
    client.login().await?;

    let metrics = client.activity_details(activity_id).await?;
    println!("Activity {}", activity_id);
    println!("{}", extractor::metrics_report(&metrics));
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

/// Initialize structured JSON logging on stderr.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("garmin_collector=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
