//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use crate::auth::token::TokenIssuer;
use crate::chat::context::ContextCache;
use crate::chat::provider::OpenRouterProvider;
use crate::chat::sentiment::KeywordSentiment;
use crate::config::Config;
use crate::entities::SqliteStore;

/// State shared across all HTTP handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Persistent user / message / mood store.
    pub store: Arc<SqliteStore>,
    /// Issues and verifies signed session tokens.
    pub tokens: Arc<TokenIssuer>,
    /// Per-(user, subject) uploaded reference text; process lifetime only.
    pub context_cache: Arc<ContextCache>,
    /// External completion provider (OpenRouter-compatible).
    pub provider: Arc<OpenRouterProvider>,
    /// Heuristic sentiment scorer for user messages.
    pub sentiment: Arc<KeywordSentiment>,
}

impl AppState {
    /// Assemble the state from a loaded configuration and a connected store.
    pub fn new(config: Config, store: SqliteStore) -> Result<Self, reqwest::Error> {
        let provider = OpenRouterProvider::new(&config)?;
        let tokens = TokenIssuer::new(&config.jwt_secret);
        Ok(Self {
            config: Arc::new(config),
            store: Arc::new(store),
            tokens: Arc::new(tokens),
            context_cache: Arc::new(ContextCache::new()),
            provider: Arc::new(provider),
            sentiment: Arc::new(KeywordSentiment),
        })
    }
}
