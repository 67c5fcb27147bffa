use crate::config::DatabaseSettings;
use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection, Statement};
use std::{io, time::Duration};

/// SeaORM pool handle.
pub type DB = DatabaseConnection;

fn connect_options_from_settings(settings: &DatabaseSettings) -> ConnectOptions {
    let mut opt = ConnectOptions::new(settings.url.clone());
    opt.max_connections(20)
        .min_connections(5)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(600))
        .sqlx_logging(false);

    if let Some(v) = settings.max_connections {
        opt.max_connections(v);
    }
    if let Some(v) = settings.min_connections {
        opt.min_connections(v);
    }
    if let Some(v) = settings.connect_timeout_secs {
        opt.connect_timeout(Duration::from_secs(v));
    }
    if let Some(v) = settings.acquire_timeout_secs {
        opt.acquire_timeout(Duration::from_secs(v));
    }
    if let Some(v) = settings.idle_timeout_secs {
        opt.idle_timeout(Duration::from_secs(v));
    }
    if let Some(v) = settings.sql_log {
        opt.sqlx_logging(v);
    }

    opt
}

/// Establish a connection pool from a URL, reading pool tuning from `DATABASE_*` env vars.
///
/// Supported env vars:
/// - `DATABASE_MAX_CONNECTIONS` (u32)
/// - `DATABASE_MIN_CONNECTIONS` (u32)
/// - `DATABASE_CONNECT_TIMEOUT_SECS` (u64)
/// - `DATABASE_ACQUIRE_TIMEOUT_SECS` (u64)
/// - `DATABASE_IDLE_TIMEOUT_SECS` (u64)
/// - `DATABASE_SQL_LOG` (bool)
pub async fn connect_from_url(url: &str) -> io::Result<DB> {
    let settings = DatabaseSettings::default_from_url(url.to_string());
    connect_with_settings(&settings).await
}

pub async fn connect_with_settings(settings: &DatabaseSettings) -> io::Result<DB> {
    let opt = connect_options_from_settings(settings);
    let db = Database::connect(opt)
        .await
        .map_err(|e| io::Error::other(format!("Failed to connect to database: {}", e)))?;

    ping(&db)
        .await
        .map_err(|e| io::Error::other(format!("Failed to ping database: {}", e)))?;

    Ok(db)
}

/// Cheap health check, valid on every supported backend.
pub async fn ping(db: &DB) -> Result<()> {
    db.execute(Statement::from_string(
        db.get_database_backend(),
        "SELECT 1",
    ))
    .await
    .context("DB ping failed")?;
    Ok(())
}
