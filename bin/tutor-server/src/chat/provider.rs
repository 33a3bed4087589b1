//! External completion provider.
//!
//! [`OpenRouterProvider`] speaks the OpenAI-compatible chat-completions
//! wire format.  Exactly one attempt is made per chat turn; any failure
//! (missing key, network error, non-2xx status, malformed body) is reported
//! as a [`FallbackReason`] and the orchestrator substitutes a canned reply,
//! so a provider outage never reaches the end user as an error.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::Config;

/// Token budget for a single completion.
const MAX_COMPLETION_TOKENS: u32 = 512;

/// Fixed sampling temperature for tutoring replies.
const SAMPLING_TEMPERATURE: f32 = 0.7;

// ── Wire types (OpenAI-compatible) ────────────────────────────────────────────

/// A single message in the completion request.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionMessage {
    /// `"system"`, `"user"`, or `"assistant"`.
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [CompletionMessage],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionChoiceMessage {
    content: String,
}

// ── Outcome tagging ───────────────────────────────────────────────────────────

/// Why a canned reply was served instead of a provider completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    /// No API key configured.
    NotConfigured,
    /// The HTTP request itself failed (connect error, timeout, …).
    RequestFailed,
    /// The provider answered with a non-success status.
    BadStatus(u16),
    /// The response body did not match the expected shape.
    MalformedResponse,
    /// The provider returned a success with no usable text.
    EmptyCompletion,
}

/// Tagged chat result, so callers can tell a genuine completion from a
/// degraded one.
#[derive(Debug, Clone)]
pub enum CompletionOutcome {
    Answer(String),
    Fallback {
        text: String,
        reason: FallbackReason,
    },
}

impl CompletionOutcome {
    pub fn text(&self) -> &str {
        match self {
            CompletionOutcome::Answer(text) => text,
            CompletionOutcome::Fallback { text, .. } => text,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, CompletionOutcome::Fallback { .. })
    }
}

// ── Provider trait ────────────────────────────────────────────────────────────

pub trait CompletionProvider: Send + Sync + 'static {
    /// One attempt against the upstream API.  Never retries.
    fn complete(
        &self,
        messages: &[CompletionMessage],
    ) -> impl Future<Output = Result<String, FallbackReason>> + Send;

    fn is_configured(&self) -> bool;
}

/// OpenRouter-backed provider.
pub struct OpenRouterProvider {
    client: reqwest::Client,
    api_key: Option<String>,
    model: String,
    url: String,
}

impl std::fmt::Debug for OpenRouterProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterProvider")
            .field("model", &self.model)
            .field("configured", &self.api_key.is_some())
            .finish()
    }
}

impl OpenRouterProvider {
    /// Build the provider from configuration.  The HTTP client carries the
    /// configured timeout so a slow upstream cannot block a handler
    /// indefinitely.
    pub fn new(config: &Config) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.provider_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            api_key: config.openrouter_api_key.clone(),
            model: config.openrouter_model.clone(),
            url: config.openrouter_url.clone(),
        })
    }
}

impl CompletionProvider for OpenRouterProvider {
    async fn complete(&self, messages: &[CompletionMessage]) -> Result<String, FallbackReason> {
        let api_key = self.api_key.as_deref().ok_or(FallbackReason::NotConfigured)?;

        let body = CompletionRequest {
            model: &self.model,
            messages,
            max_tokens: MAX_COMPLETION_TOKENS,
            temperature: SAMPLING_TEMPERATURE,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "completion request failed");
                FallbackReason::RequestFailed
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "completion provider returned non-success status");
            return Err(FallbackReason::BadStatus(status.as_u16()));
        }

        let parsed: CompletionResponse = response.json().await.map_err(|e| {
            warn!(error = %e, "completion response body malformed");
            FallbackReason::MalformedResponse
        })?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        if text.trim().is_empty() {
            return Err(FallbackReason::EmptyCompletion);
        }
        Ok(text)
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

// ── Fallback synthesis ────────────────────────────────────────────────────────

const QUESTION_STARTERS: &[&str] = &[
    "what", "why", "how", "when", "where", "who", "which", "can ", "could ", "do ", "does ",
    "is ", "are ",
];

fn looks_like_question(message: &str) -> bool {
    let trimmed = message.trim();
    if trimmed.ends_with('?') {
        return true;
    }
    let lowered = trimmed.to_lowercase();
    QUESTION_STARTERS.iter().any(|q| lowered.starts_with(q))
}

/// Deterministic, subject-aware canned reply.  Always non-empty; never
/// mentions the provider or any failure.
pub fn fallback_response(subject: &str, message: &str) -> String {
    if looks_like_question(message) {
        format!(
            "That's a great {subject} question! Let's work through it together: \
             start by pinning down exactly what the question is asking, then list \
             what you already know about it, and we can build the answer step by \
             step from there. Which part feels least clear to you?"
        )
    } else {
        format!(
            "Let's keep exploring {subject} together. Tell me which part you'd \
             like to dig into next, and we'll take it one step at a time."
        )
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
