//! Keyword lexicon classifier over the GoEmotions vocabulary.
//!
//! Needs no model download, which makes it the default backend for builds
//! without the `roberta` feature and for tests. Each label's logit grows
//! with the number of keyword stems found in the text; labels with no hits
//! stay strongly negative, and `neutral` wins when nothing matches.

use super::EmotionClassifier;
use crate::error::ClassifierError;
use regex::Regex;

/// GoEmotions labels in the order the pretrained model reports them.
pub const GO_EMOTIONS_LABELS: &[&str] = &[
    "admiration",
    "amusement",
    "anger",
    "annoyance",
    "approval",
    "caring",
    "confusion",
    "curiosity",
    "desire",
    "disappointment",
    "disapproval",
    "disgust",
    "embarrassment",
    "excitement",
    "fear",
    "gratitude",
    "grief",
    "joy",
    "love",
    "nervousness",
    "optimism",
    "pride",
    "realization",
    "relief",
    "remorse",
    "sadness",
    "surprise",
    "neutral",
];

const NEUTRAL: &str = "neutral";

/// (label, word stems, emoji)
const LEXICON: &[(&str, &[&str], &[&str])] = &[
    ("admiration", &["admir", "impress", "brilliant", "amazing", "incredibl", "respect"], &["👏"]),
    ("amusement", &["funny", "hilarious", "haha", "lol", "lmao", "amus"], &["😂", "🤣"]),
    ("anger", &["angry", "furious", "rage", "outrag", "hate", "livid"], &["😡", "😠"]),
    ("annoyance", &["annoy", "irritat", "ugh", "bother", "frustrat"], &["😒"]),
    ("approval", &["agree", "approve", "right", "exactly", "yes"], &["👍"]),
    ("caring", &["caring", "cares", "hope you", "take care", "support", "comfort"], &["🤗"]),
    ("confusion", &["confus", "puzzl", "unclear", "lost", "understand"], &["😕"]),
    ("curiosity", &["curious", "wonder", "interest", "why", "how"], &["🤔"]),
    ("desire", &["want", "wish", "crave", "long for", "desire"], &[]),
    ("disappointment", &["disappoint", "let down", "letdown", "failed"], &["😞"]),
    ("disapproval", &["disagree", "wrong", "disapprov", "unacceptable"], &["👎"]),
    ("disgust", &["disgust", "gross", "nasty", "revolting", "yuck"], &["🤢"]),
    ("embarrassment", &["embarrass", "ashamed", "awkward", "humiliat"], &["😳"]),
    ("excitement", &["excit", "thrill", "can't wait", "pumped", "eager"], &["🤩"]),
    ("fear", &["afraid", "scared", "fear", "terrif", "frighten"], &["😱", "😨"]),
    ("gratitude", &["thank", "grateful", "appreciat", "thx"], &["🙏"]),
    ("grief", &["grief", "griev", "mourn", "passed away", "funeral"], &[]),
    ("joy", &["happ", "joy", "glad", "delight", "cheer", "wonderful"], &["😊", "😄", "😁"]),
    ("love", &["love", "ador", "darling", "sweetheart"], &["❤", "😍", "💕"]),
    ("nervousness", &["nervous", "anxious", "anxiety", "worr", "tense"], &["😬"]),
    ("optimism", &["hope", "optimis", "looking forward", "believe", "better"], &["🤞"]),
    ("pride", &["proud", "pride", "accomplish", "achiev"], &[]),
    ("realization", &["realiz", "realis", "turns out", "now i see", "noticed"], &["💡"]),
    ("relief", &["relie", "phew", "finally", "calm"], &["😌"]),
    ("remorse", &["sorry", "regret", "apolog", "my fault", "guilty"], &[]),
    ("sadness", &["sad", "unhapp", "depress", "cry", "lonely", "miserable", "heartbroken"], &["😢", "😭"]),
    ("surprise", &["surpris", "wow", "shock", "unexpected", "astonish"], &["😮", "😲"]),
];

const NO_MATCH_LOGIT: f32 = -4.0;
const BASE_LOGIT: f32 = -3.0;
const HIT_WEIGHT: f32 = 2.5;
const EMPHASIS_BONUS: f32 = 0.5;

pub struct LexiconClassifier {
    labels: Vec<String>,
    word_pattern: Regex,
}

impl LexiconClassifier {
    pub fn new() -> Self {
        Self {
            labels: GO_EMOTIONS_LABELS.iter().map(|l| l.to_string()).collect(),
            word_pattern: Regex::new(r"[\p{L}\p{M}']+").expect("word pattern is valid"),
        }
    }

    fn hits(&self, words: &[String], normalized: &str, raw: &str, label: &str) -> usize {
        let Some((_, stems, emoji)) = LEXICON.iter().find(|(l, _, _)| *l == label) else {
            return 0;
        };

        let stem_hits = stems
            .iter()
            .map(|stem| {
                if stem.contains(' ') || stem.contains('\'') {
                    normalized.matches(stem).count()
                } else {
                    words.iter().filter(|w| w.starts_with(stem)).count()
                }
            })
            .sum::<usize>();
        let emoji_hits = emoji.iter().map(|e| raw.matches(e).count()).sum::<usize>();

        stem_hits + emoji_hits
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl EmotionClassifier for LexiconClassifier {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn max_input_chars(&self) -> usize {
        2048
    }

    fn logits(&self, text: &str) -> Result<Vec<f32>, ClassifierError> {
        let normalized = text.to_lowercase();
        let words: Vec<String> = self
            .word_pattern
            .find_iter(&normalized)
            .map(|m| m.as_str().to_string())
            .collect();
        let emphasis = if text.contains('!') { EMPHASIS_BONUS } else { 0.0 };

        let hits: Vec<usize> = self
            .labels
            .iter()
            .map(|label| self.hits(&words, &normalized, text, label))
            .collect();
        let any_hit = hits.iter().any(|&h| h > 0);

        let logits = self
            .labels
            .iter()
            .zip(&hits)
            .map(|(label, &h)| {
                if label == NEUTRAL {
                    if any_hit {
                        NO_MATCH_LOGIT
                    } else {
                        1.0
                    }
                } else if h == 0 {
                    NO_MATCH_LOGIT
                } else {
                    BASE_LOGIT + HIT_WEIGHT * h as f32 + emphasis
                }
            })
            .collect();

        Ok(logits)
    }
}
