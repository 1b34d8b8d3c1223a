//! Multi-label emotion extraction with top-k ranking.
//!
//! A classifier backend scores every label in its vocabulary independently
//! (raw logits); the extractor turns logits into probabilities with a
//! per-label sigmoid, so several emotions may score high at once.

pub mod lexicon;
#[cfg(feature = "roberta")]
pub mod roberta;

use crate::error::{ClassifierError, ExtractionError};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

pub use lexicon::LexiconClassifier;
#[cfg(feature = "roberta")]
pub use roberta::RobertaClassifier;

/// A loaded multi-label text classifier.
///
/// Implementations hold read-only model state and are shared across turns
/// (and threads) without mutation.
pub trait EmotionClassifier: Send + Sync {
    /// The fixed, ordered label vocabulary.
    fn labels(&self) -> &[String];

    /// Longest input (in characters) the classifier accepts.
    fn max_input_chars(&self) -> usize;

    /// One raw logit per label, in vocabulary order.
    fn logits(&self, text: &str) -> Result<Vec<f32>, ClassifierError>;
}

/// One label with its independent probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionScore {
    pub label: String,
    pub probability: f32,
}

impl EmotionScore {
    /// Probability as a rounded integer percentage, for display only.
    pub fn percent(&self) -> u32 {
        (self.probability * 100.0).round() as u32
    }
}

impl fmt::Display for EmotionScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}%)", self.label, self.percent())
    }
}

/// Top-k emotions, highest probability first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmotionProfile {
    scores: Vec<EmotionScore>,
}

impl EmotionProfile {
    pub fn scores(&self) -> &[EmotionScore] {
        &self.scores
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.scores.iter().map(|s| s.label.as_str())
    }

    /// `joy (81%), excitement (64%)`
    pub fn summary(&self) -> String {
        self.scores
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Runs a classifier and ranks its output.
#[derive(Clone)]
pub struct EmotionExtractor {
    classifier: Arc<dyn EmotionClassifier>,
}

impl EmotionExtractor {
    pub fn new(classifier: Arc<dyn EmotionClassifier>) -> Self {
        Self { classifier }
    }

    pub fn vocabulary_size(&self) -> usize {
        self.classifier.labels().len()
    }

    /// Score `text` and return the `k` most probable emotions.
    ///
    /// Text longer than the classifier limit is hard-cut before scoring.
    /// Ties keep vocabulary order.
    pub fn extract(&self, text: &str, k: usize) -> Result<EmotionProfile, ExtractionError> {
        let labels = self.classifier.labels();
        if k == 0 || k > labels.len() {
            return Err(ExtractionError::InvalidK {
                k,
                vocabulary: labels.len(),
            });
        }

        let input = truncate_chars(text, self.classifier.max_input_chars());
        let logits = self.classifier.logits(input)?;
        if logits.len() != labels.len() {
            return Err(ExtractionError::ScoreCount {
                expected: labels.len(),
                got: logits.len(),
            });
        }

        let probabilities = logits
            .iter()
            .zip(labels)
            .map(|(&logit, label)| {
                let p = sigmoid(logit);
                if p.is_finite() {
                    Ok(p)
                } else {
                    Err(ExtractionError::NonFinite {
                        label: label.clone(),
                    })
                }
            })
            .collect::<Result<Vec<f32>, _>>()?;

        Ok(EmotionProfile {
            scores: rank_top_k(labels, &probabilities, k),
        })
    }
}

/// Stable descending sort on probability, truncated to `k`.
fn rank_top_k(labels: &[String], probabilities: &[f32], k: usize) -> Vec<EmotionScore> {
    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| probabilities[b].total_cmp(&probabilities[a]));

    order
        .into_iter()
        .take(k)
        .map(|i| EmotionScore {
            label: labels[i].clone(),
            probability: probabilities[i],
        })
        .collect()
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
