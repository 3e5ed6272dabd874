//! CLI command implementations
//!
//! Each command loads the config, builds a tokio runtime, does its work and
//! prints one JSON object. `serve` runs until Ctrl-C.

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use crate::clock::SystemClock;
use crate::http_server::HttpServer;
use crate::observability::{log_event, log_event_with_fields, Event, Logger, ObservationScope};
use crate::store::{Database, DatabaseConfig, NewProfile, ProfileStore, StoreResult, UserStore};

use super::args::Command;
use super::config::Config;
use super::errors::{CliError, CliResult};
use super::io::write_response;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port } => serve(&config, port),
        Command::Migrate { config } => migrate(&config),
        Command::Rollback { config, target } => rollback(&config, target),
        Command::AddProfile {
            config,
            user_id,
            bio,
        } => add_profile(&config, user_id, bio),
    }
}

/// Start the HTTP server
///
/// 1. Load config, set log level
/// 2. Connect to the database
/// 3. Apply migrations (unless `auto_migrate` is off)
/// 4. Serve until Ctrl-C, then close the pool
pub fn serve(config_path: &Path, port: Option<u16>) -> CliResult<()> {
    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.http.port = port;
    }

    runtime()?.block_on(async {
        let db = boot(&config).await.map_err(|e| {
            log_event_with_fields(Event::BootFailed, &[("reason", e.message())]);
            e
        })?;

        let users = UserStore::new(db.clone(), Arc::new(SystemClock));
        let server = HttpServer::new(config.http.clone(), users);
        let result = server.start(shutdown_signal()).await;

        db.close().await;
        log_event(Event::ShutdownComplete);

        result.map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
    })
}

/// Apply pending migrations and exit
pub fn migrate(config_path: &Path) -> CliResult<()> {
    let config = load_config(config_path)?;

    runtime()?.block_on(async {
        let db = connect(&config.database).await?;
        let outcome = observed("MIGRATE", &[], db.migrate()).await;
        let tables = match outcome {
            Ok(()) => db.table_names().await.map_err(CliError::from),
            Err(e) => Err(e),
        };
        db.close().await;

        let tables = tables?;
        log_event(Event::MigrationsApplied);
        write_response(json!({ "migrated": true, "tables": tables }))
    })
}

/// Revert migrations newer than `target` and exit
pub fn rollback(config_path: &Path, target: i64) -> CliResult<()> {
    let config = load_config(config_path)?;
    let target_field = target.to_string();

    runtime()?.block_on(async {
        let db = connect(&config.database).await?;
        let outcome = observed(
            "ROLLBACK",
            &[("target", target_field.as_str())],
            db.rollback(target),
        )
        .await;
        let tables = match outcome {
            Ok(()) => db.table_names().await.map_err(CliError::from),
            Err(e) => Err(e),
        };
        db.close().await;

        let tables = tables?;
        log_event_with_fields(Event::MigrationsReverted, &[("target", target_field.as_str())]);
        write_response(json!({ "rolled_back_to": target, "tables": tables }))
    })
}

/// Attach a profile to a user and print it
pub fn add_profile(config_path: &Path, user_id: i64, bio: Option<String>) -> CliResult<()> {
    let config = load_config(config_path)?;

    runtime()?.block_on(async {
        let db = connect(&config.database).await?;
        let profiles = ProfileStore::new(db.clone(), Arc::new(SystemClock));
        let created = profiles.create(NewProfile { user_id, bio }).await;
        db.close().await;

        write_response(serde_json::to_value(created?)?)
    })
}

fn load_config(path: &Path) -> CliResult<Config> {
    let config = Config::load(path)?;
    Logger::set_min_severity(config.severity()?);

    let path_field = path.display().to_string();
    log_event_with_fields(Event::ConfigLoaded, &[("path", path_field.as_str())]);
    Ok(config)
}

fn runtime() -> CliResult<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))
}

async fn connect(config: &DatabaseConfig) -> CliResult<Database> {
    let db = Database::connect(config).await?;
    log_event_with_fields(Event::DatabaseConnected, &[("url", config.url.as_str())]);
    Ok(db)
}

async fn boot(config: &Config) -> CliResult<Database> {
    let db = connect(&config.database).await?;
    if config.auto_migrate {
        if let Err(e) = observed("MIGRATE", &[], db.migrate()).await {
            db.close().await;
            return Err(e);
        }
        log_event(Event::MigrationsApplied);
    }
    Ok(db)
}

/// Run `work` inside an [`ObservationScope`] named `name`
async fn observed<T, F>(name: &str, fields: &[(&str, &str)], work: F) -> CliResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    let scope = ObservationScope::with_fields(name, fields);
    match work.await {
        Ok(value) => {
            scope.complete();
            Ok(value)
        }
        Err(e) => {
            scope.fail(&e.to_string());
            Err(e.into())
        }
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => log_event(Event::ShutdownStart),
        Err(e) => {
            let reason = e.to_string();
            Logger::warn("SIGNAL_HANDLER_FAILED", &[("reason", reason.as_str())]);
            std::future::pending::<()>().await
        }
    }
}
