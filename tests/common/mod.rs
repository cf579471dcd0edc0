//! Test utilities for database and API testing.
//!
//! Provides in-memory SQLite databases with migrations applied and a fully
//! wired router for request-level tests.

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use migration::{Migrator, MigratorTrait};
use rbac::config::AppConfig;
use rbac::server::{AppState, create_app};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Bearer token accepted by routers built with [`setup_test_app`].
#[allow(dead_code)]
pub const TEST_TOKEN: &str = "test-token";

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// The pool is pinned to a single connection; separate connections would
/// each see their own empty in-memory database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new("sqlite::memory:");
    opt.max_connections(1).sqlx_logging(false);

    let db = Database::connect(opt).await?;
    Migrator::up(&db, None).await?;

    Ok(db)
}

/// Sets up a migrated database plus a router configured with [`TEST_TOKEN`].
#[allow(dead_code)]
pub async fn setup_test_app() -> Result<(Router, DatabaseConnection)> {
    let db = setup_test_db().await?;

    let config = AppConfig {
        operator_tokens: vec![TEST_TOKEN.to_string()],
        ..Default::default()
    };

    let state = AppState {
        db: db.clone(),
        config: Arc::new(config),
    };

    Ok((create_app(state), db))
}
