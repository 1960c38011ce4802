//! Database connection pool initialization.
//!
//! Reads `DATABASE_URL` and builds a bounded PostgreSQL pool. The pool is
//! the only shared mutable state in the process; it is created once during
//! startup and cloned into the application state.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::env;

/// Initializes the PostgreSQL connection pool (max 5 connections).
///
/// # Panics
///
/// Panics if `DATABASE_URL` is not set or the connection fails; the server
/// cannot run without a database.
pub async fn init_db_pool() -> PgPool {
    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database")
}
