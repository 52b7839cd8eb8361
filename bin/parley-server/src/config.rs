//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for parley-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:5000"`).
    pub bind_address: String,

    /// Directory holding the flat-file record store (default: `"data"`).
    /// Created on startup if missing.
    pub data_dir: String,

    /// Secret used to sign the session cookie.
    pub secret_key: String,

    /// Postgres URL for the external chat-history table.
    /// `DATABASE_URL` wins; otherwise assembled from the `DB_*` variables.
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Serve Swagger UI at `/swagger-ui` (default: `true`).
    pub enable_swagger: bool,

    /// Comma-separated allowed CORS origins; `None` means wildcard.
    pub cors_allowed_origins: Option<String>,

    /// Round-trip timeout for webhook calls, in seconds.
    pub webhook_timeout_secs: u64,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("PARLEY_BIND", "0.0.0.0:5000"),
            data_dir: env_or("PARLEY_DATA_DIR", "data"),
            secret_key: env_or("PARLEY_SECRET_KEY", "dev-secret-key-change-in-production"),
            database_url: database_url_from_env(),
            log_level: env_or("PARLEY_LOG", "info"),
            log_json: env_flag("PARLEY_LOG_JSON", false),
            enable_swagger: env_flag("PARLEY_ENABLE_SWAGGER", true),
            cors_allowed_origins: std::env::var("PARLEY_CORS_ORIGINS").ok(),
            webhook_timeout_secs: parse_env("PARLEY_WEBHOOK_TIMEOUT_SECS", 120),
        }
    }
}

/// `DATABASE_URL` takes precedence; otherwise the connection string is
/// assembled from the same `DB_*` variables the workflow engine deployment
/// already defines.
fn database_url_from_env() -> String {
    if let Ok(url) = std::env::var("DATABASE_URL") {
        return url;
    }
    let host = env_or("DB_HOST", "localhost");
    let port = env_or("DB_PORT", "5432");
    let name = env_or("DB_NAME", "n8n");
    let user = env_or("DB_USER", "postgres");
    let password = env_or("DB_PASSWORD", "");
    format!("postgres://{user}:{password}@{host}:{port}/{name}")
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(default)
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
