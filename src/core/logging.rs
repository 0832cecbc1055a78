//! Logging initialization and configuration checking
//!
//! This module provides:
//! - Logger initialization (console + file)
//! - Startup diagnostics for the effective configuration

use anyhow::Result;
use simplelog::*;
use std::fs::OpenOptions;

use crate::core::config::Settings;

/// Initialize logger for both console and file output
///
/// The log file is appended to, so restarts keep earlier history.
///
/// # Arguments
/// * `log_file_path` - Path to the log file
///
/// # Returns
/// * `Ok(())` - Logger initialized successfully
/// * `Err(anyhow::Error)` - Failed to initialize logger
pub fn init_logger(log_file_path: &str) -> Result<()> {
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file_path)
        .map_err(|e| anyhow::anyhow!("Failed to open log file: {}", e))?;

    let config = ConfigBuilder::new()
        .add_filter_ignore_str("hyper")
        .add_filter_ignore_str("reqwest")
        .build();

    CombinedLogger::init(vec![
        TermLogger::new(LevelFilter::Info, config.clone(), TerminalMode::Mixed, ColorChoice::Auto),
        WriteLogger::new(LevelFilter::Info, config, log_file),
    ])
    .map_err(|e| anyhow::anyhow!("Failed to initialize logger: {}", e))?;

    Ok(())
}

/// Logs the effective configuration at application startup
///
/// The token itself is never logged, only whether it is present.
pub fn log_startup_configuration(settings: &Settings) {
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    log::info!("🤖 Team Distributor configuration");
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    if settings.bot_token.is_empty() {
        log::error!("❌ BOT_TOKEN: not set");
    } else {
        log::info!("✅ BOT_TOKEN: set");
    }
    log::info!("📁 Database: {}", settings.database_path);
    log::info!("📊 Teams: {}", settings.team_count);
    log::info!(
        "📋 Empty teams in listings: {}",
        if settings.show_empty_teams { "shown" } else { "hidden" }
    );

    if settings.admin_ids.is_empty() {
        log::warn!("⚠️  ADMIN_IDS: not set, /restart is unavailable to everyone");
    } else {
        log::info!("👑 Admins: {:?}", settings.admin_ids);
    }

    if settings.web_enabled {
        log::info!("🌐 Keep-alive web server on port {}", settings.web_port);
    } else {
        log::info!("🌐 Keep-alive web server disabled (WEB_ENABLED=false)");
    }
    log::info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
}
