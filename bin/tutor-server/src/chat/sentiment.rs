//! Heuristic sentiment scoring.
//!
//! [`SentimentModel`] is the seam: the orchestrator only sees the trait, so
//! a real sentiment model can replace [`KeywordSentiment`] without touching
//! any orchestration code.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Polarity (`score`, in [-1, 1]) and intensity (`magnitude`, in [0, 1]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Sentiment {
    pub score: f64,
    pub magnitude: f64,
}

pub trait SentimentModel: Send + Sync + 'static {
    /// Score a message.  Pure; cannot fail; empty input scores (0, 0).
    fn score(&self, text: &str) -> Sentiment;
}

/// Keyword-lookup scorer: each positive-marker occurrence adds +0.1 to the
/// score, each negative-marker subtracts 0.1, and every hit adds +0.1 to
/// the magnitude.  Both outputs are clamped to their bounds.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordSentiment;

const POSITIVE_MARKERS: &[&str] = &[
    "good", "great", "love", "like", "happy", "excellent", "awesome", "amazing", "fun", "easy",
    "thanks", "thank", "clear", "helpful", "wonderful", "enjoy", "excited", "interesting",
    "cool", "nice",
];

const NEGATIVE_MARKERS: &[&str] = &[
    "bad", "hate", "sad", "angry", "confused", "hard", "difficult", "frustrated", "boring",
    "wrong", "terrible", "awful", "stuck", "stressed", "worried", "tired", "annoying", "fail",
    "failing", "impossible",
];

impl SentimentModel for KeywordSentiment {
    fn score(&self, text: &str) -> Sentiment {
        let mut score = 0.0_f64;
        let mut magnitude = 0.0_f64;

        let lowered = text.to_lowercase();
        for word in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            if POSITIVE_MARKERS.contains(&word) {
                score += 0.1;
                magnitude += 0.1;
            } else if NEGATIVE_MARKERS.contains(&word) {
                score -= 0.1;
                magnitude += 0.1;
            }
        }

        Sentiment {
            score: score.clamp(-1.0, 1.0),
            magnitude: magnitude.clamp(0.0, 1.0),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
