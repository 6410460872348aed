//! Pizzeria Admin - Back-office pricing and financial engine
//!
//! Recommended ingredient costs per pizza size, channel selling prices,
//! cost and price warnings, and the monthly profit-and-loss close.

pub mod config;
pub mod db;
pub mod error;
pub mod finance;
pub mod services;
pub mod state;

use config::AppConfig;
use services::ReportService;
use state::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize logging, open the database and print the back-office report
pub fn run() -> anyhow::Result<()> {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pizzeria_admin=debug,pizzeria_admin_lib=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Pizzeria Admin...");

    let config = AppConfig::from_env()?;
    let app_state = AppState::new(&config)?;

    tracing::info!("Application state initialized");

    let report = ReportService::build(&app_state)?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
