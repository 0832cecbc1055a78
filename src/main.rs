use anyhow::Result;
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use tokio::time::sleep;

use team_distributor::cli::{Cli, Commands};
use team_distributor::core::{config, init_logger, log_startup_configuration, start_web_server, Settings};
use team_distributor::storage::{create_pool, TeamStore, TeamStoreConfig};
use team_distributor::telegram::format;
use team_distributor::telegram::{create_bot, schema, setup_bot_commands, HandlerDeps, RegistrationFlow};

/// Main entry point for the Telegram bot
///
/// Parses CLI arguments and dispatches to appropriate subcommand.
///
/// # Errors
/// Returns an error if initialization fails (logging, configuration, database, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Log panics from the dispatcher task instead of losing them on stderr
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {:?}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
        if let Some(msg) = panic_info.payload().downcast_ref::<&str>() {
            log::error!("Panic message: {}", msg);
        }
    }));

    // .env must be loaded before the config statics are first read
    let _ = dotenv();

    init_logger(&config::LOG_FILE_PATH)?;

    let settings = Settings::from_env();

    match cli.command {
        Some(Commands::Run) => run_bot(settings).await,
        Some(Commands::Stats) => print_stats(&settings),
        Some(Commands::List) => print_rosters(&settings),
        Some(Commands::Assign { user_id, name }) => assign_by_hand(&settings, user_id, &name),
        None => {
            log::info!("No command specified, running bot in default mode");
            run_bot(settings).await
        }
    }
}

fn open_store(settings: &Settings) -> Result<TeamStore> {
    settings.validate_storage()?;
    let pool = create_pool(&settings.database_path)
        .map_err(|e| anyhow::anyhow!("Failed to create database pool: {}", e))?;
    let store = TeamStore::new(Arc::new(pool), TeamStoreConfig::from_settings(settings))?;
    Ok(store)
}

/// `stats` subcommand
fn print_stats(settings: &Settings) -> Result<()> {
    let store = open_store(settings)?;
    let stats = store.stats()?;
    println!("{}", format::format_stats(&stats).unwrap_or_else(format::empty_stats));
    Ok(())
}

/// `list` subcommand
fn print_rosters(settings: &Settings) -> Result<()> {
    let store = open_store(settings)?;
    let rosters = store.rosters()?;
    println!("{}", format::format_rosters(&rosters).unwrap_or_else(format::empty_rosters));
    Ok(())
}

/// `assign` subcommand
fn assign_by_hand(settings: &Settings, user_id: i64, name: &str) -> Result<()> {
    let full_name = team_distributor::core::validation::validate_full_name(name)
        .map_err(|e| anyhow::anyhow!("Invalid name {:?}: {}", name, e))?;
    let store = open_store(settings)?;
    let team_number = store.assign(user_id, &full_name)?;
    println!("{} -> team {}", full_name, team_number);
    Ok(())
}

/// Runs the bot: store, keep-alive server, command menu and the dispatcher loop
async fn run_bot(settings: Settings) -> Result<()> {
    settings.validate()?;
    log_startup_configuration(&settings);

    let store = open_store(&settings)?;
    log::info!(
        "Team store ready: {} teams, {} registrations",
        store.team_count(),
        store.total_count()?
    );

    if settings.web_enabled {
        let web_store = store.clone();
        let port = settings.web_port;
        tokio::spawn(async move {
            if let Err(e) = start_web_server(port, web_store).await {
                log::error!("Web server error: {}", e);
            }
        });
    }

    let bot = create_bot(&settings.bot_token)?;

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let flow = Arc::new(RegistrationFlow::new(store, settings.admin_ids.clone()));
    let handler = schema(HandlerDeps::new(flow));

    let mut retry_count = 0;
    let max_retries = config::retry::MAX_DISPATCHER_RETRIES;

    log::info!("Starting bot in long polling mode");

    loop {
        let bot_clone = bot.clone();
        let handler_clone = handler.clone();

        // A separate task so a panic in the dispatcher surfaces as a JoinError
        let handle = tokio::spawn(async move {
            use teloxide::update_listeners::Polling;

            let listener = Polling::builder(bot_clone.clone()).drop_pending_updates().build();

            Dispatcher::builder(bot_clone, handler_clone)
                .dependencies(DependencyMap::new())
                .enable_ctrlc_handler()
                .build()
                .dispatch_with_listener(
                    listener,
                    LoggingErrorHandler::with_custom_text("An error from the update listener"),
                )
                .await
        });

        match handle.await {
            Ok(()) => {
                log::info!("Dispatcher shutdown gracefully");
                break;
            }
            Err(join_err) => {
                if join_err.is_panic() {
                    log::error!("Dispatcher panicked: {}", join_err);

                    if retry_count < max_retries {
                        retry_count += 1;
                        log::info!(
                            "Retrying dispatcher connection after panic (attempt {}/{})...",
                            retry_count,
                            max_retries
                        );
                        exponential_backoff(retry_count).await;
                    } else {
                        log::error!("Max retries reached after panic. Exiting...");
                        break;
                    }
                } else {
                    log::warn!("Dispatcher task was cancelled: {}", join_err);
                    break;
                }
            }
        }

        if retry_count > 0 {
            sleep(config::retry::dispatcher_delay()).await;
        }
    }

    Ok(())
}

/// Exponential backoff delay for retries
async fn exponential_backoff(retry_count: u32) {
    let delay = Duration::from_secs(config::retry::EXPONENTIAL_BACKOFF_BASE.pow(retry_count));
    sleep(delay).await;
}
