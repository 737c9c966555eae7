use std::time::Duration;

use autodash_db::{parse_ssl_mode, DbConfig};
use sqlx::postgres::PgSslMode;

/// Log output format selected with `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the database credentials have defaults suitable for
/// local development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `60`).
    pub request_timeout_secs: u64,
    /// Per-query timeout in seconds (default: `30`).
    pub query_timeout_secs: u64,
    pub log_format: LogFormat,
    /// Apply the reference schema at startup (default: `false`).
    pub run_migrations: bool,
    /// Credentials for the analytics database.
    pub database: DbConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `60`                       |
    /// | `QUERY_TIMEOUT_SECS`      | `30`                       |
    /// | `LOG_FORMAT`              | `pretty`                   |
    /// | `RUN_MIGRATIONS`          | `false`                    |
    /// | `DB_HOST`                 | `localhost`                |
    /// | `DB_PORT`                 | `5432`                     |
    /// | `DB_NAME`                 | (required)                 |
    /// | `DB_USER`                 | (required)                 |
    /// | `DB_PASSWORD`             | (required)                 |
    /// | `DB_SSL_MODE`             | `prefer`                   |
    /// | `DB_CONNECT_TIMEOUT_SECS` | `10`                       |
    ///
    /// Panics on missing credentials, unparsable values or a zero timeout;
    /// misconfiguration should stop the server at startup.
    pub fn from_env() -> Self {
        let host = env_or("HOST", "0.0.0.0");

        let port: u16 = env_or("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins = parse_origins(&env_or("CORS_ORIGINS", "http://localhost:5173"));

        let request_timeout_secs = timeout_secs_from_env("REQUEST_TIMEOUT_SECS", "60");
        let query_timeout_secs = timeout_secs_from_env("QUERY_TIMEOUT_SECS", "30");

        let log_format = match env_or("LOG_FORMAT", "pretty").to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let run_migrations = parse_bool(&env_or("RUN_MIGRATIONS", "false"));

        let database = DbConfig {
            host: env_or("DB_HOST", "localhost"),
            port: env_or("DB_PORT", "5432")
                .parse()
                .expect("DB_PORT must be a valid u16"),
            database: std::env::var("DB_NAME").expect("DB_NAME must be set"),
            user: std::env::var("DB_USER").expect("DB_USER must be set"),
            password: std::env::var("DB_PASSWORD").expect("DB_PASSWORD must be set"),
            ssl_mode: parse_ssl_mode(&env_or("DB_SSL_MODE", "prefer"))
                .expect("DB_SSL_MODE must be one of disable, allow, prefer, require, verify-ca, verify-full"),
            connect_timeout: Duration::from_secs(timeout_secs_from_env(
                "DB_CONNECT_TIMEOUT_SECS",
                "10",
            )),
            statement_timeout: Duration::from_secs(query_timeout_secs),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            query_timeout_secs,
            log_format,
            run_migrations,
            database,
        }
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Settings for local development, used where no environment is available.
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_origins: vec!["http://localhost:5173".to_string()],
            request_timeout_secs: 60,
            query_timeout_secs: 30,
            log_format: LogFormat::Pretty,
            run_migrations: false,
            database: DbConfig {
                host: "localhost".to_string(),
                port: 5432,
                database: "automotive".to_string(),
                user: "postgres".to_string(),
                password: String::new(),
                ssl_mode: PgSslMode::Prefer,
                connect_timeout: Duration::from_secs(10),
                statement_timeout: Duration::from_secs(30),
            },
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn timeout_secs_from_env(key: &str, default: &str) -> u64 {
    parse_timeout_secs(&env_or(key, default)).unwrap_or_else(|e| panic!("{key} {e}"))
}

/// Parse a timeout in whole seconds. Zero is rejected: it would expire every
/// query at once, and `statement_timeout = 0` disables the server-side limit.
fn parse_timeout_secs(raw: &str) -> Result<u64, String> {
    match raw.trim().parse::<u64>() {
        Ok(0) => Err("must be at least 1 second".to_string()),
        Ok(secs) => Ok(secs),
        Err(e) => Err(format!("must be a whole number of seconds: {e}")),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
