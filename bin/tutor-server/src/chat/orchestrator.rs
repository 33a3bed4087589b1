//! Chat orchestration.
//!
//! One chat turn: resolve the subject, splice in any uploaded context,
//! obtain a completion (or its fallback), then persist the exchange — two
//! message rows and one mood entry.  Storage failure after a successful
//! completion is surfaced as an internal error and the reply is withheld,
//! so "got a reply" and "recorded a reply" cannot diverge.

use chrono::{Duration, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::chat::context::ContextCache;
use crate::chat::provider::{
    fallback_response, CompletionMessage, CompletionOutcome, CompletionProvider,
};
use crate::chat::sentiment::{Sentiment, SentimentModel};
use crate::entities::{ChatMessage, ChatStore, MoodLog, MoodStore, SqliteStore, SubjectStore};
use crate::error::ServerError;

/// Upper bound on how much uploaded context is spliced into the prompt.
const CONTEXT_EXCERPT_CHARS: usize = 1500;

/// Result of one chat turn.
pub struct ChatReply {
    pub outcome: CompletionOutcome,
    /// Scored from the user's message only, never the AI's reply.
    pub sentiment: Sentiment,
}

/// Run one chat turn for an authenticated user.
pub async fn handle_chat(
    store: &SqliteStore,
    cache: &ContextCache,
    provider: &impl CompletionProvider,
    model: &impl SentimentModel,
    user_id: &str,
    subject_name: &str,
    message: &str,
) -> Result<ChatReply, ServerError> {
    let subject = store
        .get_subject_by_name(subject_name)
        .await?
        .ok_or_else(|| ServerError::BadRequest(format!("unknown subject: {subject_name}")))?;

    let context = cache.fetch(user_id, &subject.name);
    let messages = build_messages(&subject.name, context.as_deref(), message);

    let outcome = match provider.complete(&messages).await {
        Ok(text) => CompletionOutcome::Answer(text),
        Err(reason) => {
            debug!(?reason, subject = %subject.name, "serving fallback response");
            CompletionOutcome::Fallback {
                text: fallback_response(&subject.name, message),
                reason,
            }
        }
    };

    let sentiment = model.score(message);

    // Two rows per turn, user first; the +1 ms keeps history ordering
    // stable even within one clock tick.
    let now = Utc::now();
    store
        .append_message(ChatMessage {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            subject_id: subject.id.clone(),
            role: "user".to_owned(),
            content: message.to_owned(),
            sentiment_score: Some(sentiment.score),
            sentiment_magnitude: Some(sentiment.magnitude),
            saved: false,
            created_at: now,
        })
        .await?;
    store
        .append_message(ChatMessage {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            subject_id: subject.id.clone(),
            role: "ai".to_owned(),
            content: outcome.text().to_owned(),
            sentiment_score: None,
            sentiment_magnitude: None,
            saved: false,
            created_at: now + Duration::milliseconds(1),
        })
        .await?;
    store
        .append_mood(MoodLog {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_owned(),
            subject_id: subject.id.clone(),
            score: sentiment.score,
            magnitude: sentiment.magnitude,
            message: message.to_owned(),
            created_at: now,
        })
        .await?;

    info!(
        user_id = %user_id,
        subject = %subject.name,
        fallback = outcome.is_fallback(),
        "chat turn recorded"
    );

    Ok(ChatReply { outcome, sentiment })
}

/// Assemble the completion request: a system instruction naming the
/// subject, then one user turn.  When uploaded context exists, its first
/// [`CONTEXT_EXCERPT_CHARS`] characters are prepended to the message.
fn build_messages(
    subject: &str,
    context: Option<&str>,
    message: &str,
) -> Vec<CompletionMessage> {
    let system = format!(
        "You are a patient, encouraging tutor helping a student with {subject}. \
         Keep explanations clear and concrete, and invite follow-up questions."
    );

    let user_turn = match context {
        Some(ctx) if !ctx.trim().is_empty() => {
            let excerpt = truncate_chars(ctx, CONTEXT_EXCERPT_CHARS);
            format!(
                "Reference material from the student's document:\n{excerpt}\n\n\
                 Student's message: {message}"
            )
        }
        _ => message.to_owned(),
    };

    vec![
        CompletionMessage {
            role: "system".to_owned(),
            content: system,
        },
        CompletionMessage {
            role: "user".to_owned(),
            content: user_turn,
        },
    ]
}

/// Char-boundary-safe prefix of at most `max` characters.
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::chat::provider::FallbackReason;
    use crate::chat::sentiment::KeywordSentiment;
    use crate::entities::{User, UserStore};
    use std::sync::Mutex;
    use std::time::Duration as StdDuration;

    /// Provider double: replays a scripted reply and records every request.
    struct ScriptedProvider {
        reply: Option<String>,
        seen: Mutex<Vec<Vec<CompletionMessage>>>,
    }

    impl ScriptedProvider {
        fn answering(text: &str) -> Self {
            Self {
                reply: Some(text.to_owned()),
                seen: Mutex::new(Vec::new()),
            }
        }

        fn unconfigured() -> Self {
            Self {
                reply: None,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn last_request(&self) -> Vec<CompletionMessage> {
            self.seen.lock().unwrap().last().cloned().unwrap()
        }
    }

    impl CompletionProvider for ScriptedProvider {
        async fn complete(
            &self,
            messages: &[CompletionMessage],
        ) -> Result<String, FallbackReason> {
            self.seen.lock().unwrap().push(messages.to_vec());
            self.reply.clone().ok_or(FallbackReason::NotConfigured)
        }

        fn is_configured(&self) -> bool {
            self.reply.is_some()
        }
    }

    async fn memory_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:", 1, StdDuration::from_secs(5))
            .await
            .unwrap()
    }

    async fn seeded_user(store: &SqliteStore) -> String {
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: "Ada".to_owned(),
            email: format!("{}@x.com", Uuid::new_v4()),
            password_hash: "$argon2id$stub".to_owned(),
            created_at: Utc::now(),
            last_login: None,
        };
        store.insert_user(user.clone()).await.unwrap();
        user.id
    }

    #[tokio::test]
    async fn answer_is_persisted_with_mood_entry() {
        let store = memory_store().await;
        let user_id = seeded_user(&store).await;
        let provider = ScriptedProvider::answering("Entropy measures disorder.");

        let reply = handle_chat(
            &store,
            &ContextCache::new(),
            &provider,
            &KeywordSentiment,
            &user_id,
            "Quantum Physics",
            "What is entropy?",
        )
        .await
        .unwrap();

        assert!(!reply.outcome.is_fallback());
        assert_eq!(reply.outcome.text(), "Entropy measures disorder.");
        assert_eq!(reply.sentiment.score, 0.0);

        let history = store
            .list_history(&user_id, "quantum-physics", None)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, "user");
        assert_eq!(history[0].content, "What is entropy?");
        assert_eq!(history[0].sentiment_score, Some(0.0));
        assert_eq!(history[1].role, "ai");
        assert_eq!(history[1].content, "Entropy measures disorder.");
        assert!(history[1].sentiment_score.is_none());
        assert!(history[0].created_at < history[1].created_at);

        let moods = store.list_mood_logs(&user_id, None).await.unwrap();
        assert_eq!(moods.len(), 1);
        assert_eq!(moods[0].message, "What is entropy?");
    }

    #[tokio::test]
    async fn fallback_still_answers_and_records() {
        let store = memory_store().await;
        let user_id = seeded_user(&store).await;
        let provider = ScriptedProvider::unconfigured();

        let reply = handle_chat(
            &store,
            &ContextCache::new(),
            &provider,
            &KeywordSentiment,
            &user_id,
            "Quantum Physics",
            "What is entropy?",
        )
        .await
        .unwrap();

        assert!(reply.outcome.is_fallback());
        assert!(!reply.outcome.text().is_empty());
        assert!(reply.outcome.text().contains("Quantum Physics"));

        let history = store
            .list_history(&user_id, "quantum-physics", None)
            .await
            .unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].content, reply.outcome.text());
    }

    #[tokio::test]
    async fn unknown_subject_is_rejected_before_any_write() {
        let store = memory_store().await;
        let user_id = seeded_user(&store).await;
        let provider = ScriptedProvider::answering("unused");

        let result = handle_chat(
            &store,
            &ContextCache::new(),
            &provider,
            &KeywordSentiment,
            &user_id,
            "Astrology",
            "hello",
        )
        .await;

        assert!(matches!(result, Err(ServerError::BadRequest(_))));
        assert!(provider.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn uploaded_context_is_spliced_and_truncated() {
        let store = memory_store().await;
        let user_id = seeded_user(&store).await;
        let provider = ScriptedProvider::answering("ok");

        let cache = ContextCache::new();
        cache.store(&user_id, "Chemistry", "x".repeat(5000));

        handle_chat(
            &store,
            &cache,
            &provider,
            &KeywordSentiment,
            &user_id,
            "Chemistry",
            "Summarise my notes",
        )
        .await
        .unwrap();

        let request = provider.last_request();
        assert_eq!(request.len(), 2);
        assert_eq!(request[0].role, "system");
        assert!(request[0].content.contains("Chemistry"));

        let user_turn = &request[1].content;
        assert!(user_turn.contains("Reference material"));
        assert!(user_turn.contains("Summarise my notes"));
        assert!(user_turn.matches('x').count() <= CONTEXT_EXCERPT_CHARS);
    }

    #[tokio::test]
    async fn without_context_the_raw_message_is_sent() {
        let store = memory_store().await;
        let user_id = seeded_user(&store).await;
        let provider = ScriptedProvider::answering("ok");

        handle_chat(
            &store,
            &ContextCache::new(),
            &provider,
            &KeywordSentiment,
            &user_id,
            "Biology",
            "What is a ribosome?",
        )
        .await
        .unwrap();

        let request = provider.last_request();
        assert_eq!(request[1].content, "What is a ribosome?");
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "αβγδε";
        assert_eq!(truncate_chars(text, 3), "αβγ");
        assert_eq!(truncate_chars(text, 10), "αβγδε");
    }
}
