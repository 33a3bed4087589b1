//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for tutor-server.
///
/// Every field has a sensible default so the server works out-of-the-box
/// without any environment variables set.  Without an OpenRouter API key
/// the chat endpoint still answers, using canned fallback responses.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// SQLite database URL (default: `"sqlite://tutor.db"`).
    pub database_url: String,

    /// Maximum connections held by the SQLite pool.
    pub db_max_connections: u32,

    /// Seconds a caller waits for a pooled connection before erroring.
    pub db_acquire_timeout_secs: u64,

    /// Secret used to sign and verify session tokens (HS256).
    pub jwt_secret: String,

    /// OpenRouter API key.  `None` forces the fallback response path.
    pub openrouter_api_key: Option<String>,

    /// Model identifier sent to the completion provider.
    pub openrouter_model: String,

    /// Chat-completions endpoint URL (OpenAI-compatible).
    pub openrouter_url: String,

    /// Upper bound, in seconds, on a single completion request.
    pub provider_timeout_secs: u64,

    /// Comma-separated allowed CORS origins; `None` means wildcard.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI at `/swagger-ui` (disable in production).
    pub enable_swagger: bool,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("TUTOR_BIND", "0.0.0.0:3000"),
            database_url: env_or("TUTOR_DATABASE_URL", "sqlite://tutor.db"),
            db_max_connections: parse_env("TUTOR_DB_MAX_CONNECTIONS", 5),
            db_acquire_timeout_secs: parse_env("TUTOR_DB_ACQUIRE_TIMEOUT_SECS", 30),
            jwt_secret: env_or("TUTOR_JWT_SECRET", "development-secret-change-me"),
            openrouter_api_key: std::env::var("TUTOR_OPENROUTER_API_KEY")
                .ok()
                .filter(|v| !v.is_empty()),
            openrouter_model: env_or("TUTOR_OPENROUTER_MODEL", "openai/gpt-4o-mini"),
            openrouter_url: env_or(
                "TUTOR_OPENROUTER_URL",
                "https://openrouter.ai/api/v1/chat/completions",
            ),
            provider_timeout_secs: parse_env("TUTOR_PROVIDER_TIMEOUT_SECS", 30),
            cors_allowed_origins: std::env::var("TUTOR_CORS_ORIGINS").ok(),
            enable_swagger: std::env::var("TUTOR_ENABLE_SWAGGER")
                .map(|v| !(v == "0" || v.eq_ignore_ascii_case("false")))
                .unwrap_or(true),
            log_level: env_or("TUTOR_LOG", "info"),
            log_json: std::env::var("TUTOR_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
