//! Database access for the analytics dashboard.
//!
//! Each page load owns exactly one PostgreSQL connection, opened through a
//! [`SessionProvider`] and released with [`AnalyticsSession::close`]. There
//! is no pool.

use std::fmt;
use std::time::Duration;

use sqlx::postgres::{PgConnectOptions, PgSslMode};
use sqlx::PgConnection;

pub mod models;
pub mod repositories;
pub mod session;

pub use session::{AnalyticsSession, PgSession, PgSessionProvider, SessionProvider};

/// Connection settings supplied by the deployment environment.
#[derive(Clone)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
    pub ssl_mode: PgSslMode,
    /// Upper bound on establishing the connection.
    pub connect_timeout: Duration,
    /// Server-side `statement_timeout` applied to every query.
    pub statement_timeout: Duration,
}

impl DbConfig {
    /// Build sqlx connect options from these settings.
    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
            .ssl_mode(self.ssl_mode)
            .application_name("autodash")
            .options([(
                "statement_timeout",
                format!("{}ms", self.statement_timeout.as_millis()),
            )])
    }
}

impl fmt::Debug for DbConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("ssl_mode", &self.ssl_mode)
            .field("connect_timeout", &self.connect_timeout)
            .field("statement_timeout", &self.statement_timeout)
            .finish()
    }
}

/// Parse a `DB_SSL_MODE` value (`disable`, `allow`, `prefer`, `require`,
/// `verify-ca`, `verify-full`).
pub fn parse_ssl_mode(value: &str) -> Option<PgSslMode> {
    value.parse().ok()
}

/// Verify the connection is alive with a trivial round-trip.
pub async fn health_check(conn: &mut PgConnection) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(conn).await?;
    Ok(())
}

/// Apply the reference schema migrations.
pub async fn run_migrations(conn: &mut PgConnection) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../db/migrations").run(conn).await
}
