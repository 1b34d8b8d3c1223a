//! Per-turn orchestration and the append-only turn history.
//!
//! Each submission runs detect → extract → compose → generate and records
//! exactly one turn. Prompts are built from the current message only; the
//! history exists for display and is never fed back into generation.

use crate::detector::LanguageDetector;
use crate::emotion::{EmotionExtractor, EmotionProfile};
use crate::error::TurnError;
use crate::generation::ResponseGenerator;
use crate::i18n::SupportedLanguage;
use crate::metrics::{MetricsReport, PipelineMetrics};
use crate::prompt::compose;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// One completed message-to-reply cycle. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversationTurn {
    user_text: String,
    language_code: String,
    emotions: EmotionProfile,
    reply_text: String,
    timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user_text(&self) -> &str {
        &self.user_text
    }

    pub fn language_code(&self) -> &str {
        &self.language_code
    }

    pub fn emotions(&self) -> &EmotionProfile {
        &self.emotions
    }

    pub fn reply_text(&self) -> &str {
        &self.reply_text
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// `You: <text>`
    pub fn user_line(&self) -> String {
        format!("You: {}", self.user_text)
    }

    /// `AI: <reply> (joy (81%), excitement (64%))`
    pub fn reply_line(&self) -> String {
        format!("AI: {} ({})", self.reply_text, self.emotions.summary())
    }
}

/// Chronological, append-only sequence of turns.
#[derive(Debug, Default)]
struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    fn append(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    fn len(&self) -> usize {
        self.turns.len()
    }
}

/// Runs the reply pipeline and owns the session's history.
pub struct Conversation {
    detector: Arc<LanguageDetector>,
    extractor: Arc<EmotionExtractor>,
    generator: ResponseGenerator,
    top_k: usize,
    history: RwLock<ConversationHistory>,
    metrics: PipelineMetrics,
}

impl Conversation {
    pub fn new(
        detector: Arc<LanguageDetector>,
        extractor: Arc<EmotionExtractor>,
        generator: ResponseGenerator,
        top_k: usize,
    ) -> Self {
        Self {
            detector,
            extractor,
            generator,
            top_k,
            history: RwLock::new(ConversationHistory::default()),
            metrics: PipelineMetrics::new(),
        }
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Process one message.
    ///
    /// Returns `Ok(None)` for blank input (nothing recorded). A failed
    /// generation still records a turn whose reply carries the error; only
    /// analysis failures return `Err`, and they leave history untouched.
    pub async fn submit(&self, user_text: &str) -> Result<Option<ConversationTurn>, TurnError> {
        let text = user_text.trim();
        if text.is_empty() {
            debug!("Ignoring blank submission");
            self.metrics.record_blank_input();
            return Ok(None);
        }

        let (language, emotions) = match self.analyze(text.to_string()).await {
            Ok(analysis) => analysis,
            Err(e) => {
                warn!("Turn analysis failed: {}", e);
                self.metrics.record_turn_failure();
                return Err(e);
            }
        };
        debug!(
            "Detected language={} emotions=[{}]",
            language.code(),
            emotions.summary()
        );

        let prompt = compose(text, &emotions, &language);
        let reply = self.generator.generate(&prompt).await;
        if reply.is_failure() {
            self.metrics.record_generation_failure();
        }

        // Stamped under the lock: insertion order is timestamp order
        let mut history = self.history.write().await;
        let turn = ConversationTurn {
            user_text: text.to_string(),
            language_code: language.code,
            emotions,
            reply_text: reply.text,
            timestamp: Utc::now(),
        };
        history.append(turn.clone());
        self.metrics.record_turn();
        info!("Recorded turn {} ({})", history.len(), turn.language_code);

        Ok(Some(turn))
    }

    /// Language detection and emotion extraction, off the async executor.
    async fn analyze(&self, text: String) -> Result<(SupportedLanguage, EmotionProfile), TurnError> {
        let detector = Arc::clone(&self.detector);
        let extractor = Arc::clone(&self.extractor);
        let top_k = self.top_k;

        let (detection, extraction) = tokio::task::spawn_blocking(move || {
            (detector.detect(&text), extractor.extract(&text, top_k))
        })
        .await?;

        if detection.is_fallback() {
            self.metrics.record_language_fallback();
        }
        Ok((detection.language, extraction?))
    }

    /// Snapshot of all turns in chronological order.
    pub async fn history(&self) -> Vec<ConversationTurn> {
        self.history.read().await.turns().to_vec()
    }

    pub async fn history_len(&self) -> usize {
        self.history.read().await.len()
    }

    pub fn metrics(&self) -> MetricsReport {
        self.metrics.report()
    }
}
