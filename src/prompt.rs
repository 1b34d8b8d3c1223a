//! Generation instruction for one turn.

use crate::emotion::EmotionProfile;
use crate::i18n::SupportedLanguage;
use std::fmt;

/// A finished generation instruction. Built once per turn and consumed by
/// the generator; it is deliberately not `Clone`.
#[derive(Debug, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the instruction from this turn's text, emotions and language.
///
/// Layout:
/// ```text
/// The user is feeling: joy (81%), excitement (64%).
/// Respond empathetically and culturally sensitively in English with an emoji.
/// User: "<text>"
/// AI:
/// ```
pub fn compose(user_text: &str, emotions: &EmotionProfile, language: &SupportedLanguage) -> Prompt {
    Prompt(format!(
        "The user is feeling: {}.\n\
         Respond empathetically and culturally sensitively in {} with an emoji.\n\
         User: \"{}\"\n\
         AI:",
        emotions.summary(),
        language.name(),
        user_text
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emotion::{EmotionClassifier, EmotionExtractor};
    use crate::error::ClassifierError;
    use std::sync::Arc;

    struct TwoLabels;

    impl EmotionClassifier for TwoLabels {
        fn labels(&self) -> &[String] {
            static LABELS: std::sync::OnceLock<Vec<String>> = std::sync::OnceLock::new();
            LABELS.get_or_init(|| vec!["joy".to_string(), "excitement".to_string()])
        }

        fn max_input_chars(&self) -> usize {
            100
        }

        fn logits(&self, _text: &str) -> Result<Vec<f32>, ClassifierError> {
            Ok(vec![2.0, 1.0])
        }
    }

    fn profile() -> EmotionProfile {
        EmotionExtractor::new(Arc::new(TwoLabels))
            .extract("x", 2)
            .expect("extract")
    }

    #[test]
    fn test_prompt_layout() {
        let prompt = compose(
            "I am so happy and excited today!",
            &profile(),
            &SupportedLanguage::new("en", "English", "eng"),
        );

        assert_eq!(
            prompt.as_str(),
            "The user is feeling: joy (88%), excitement (73%).\n\
             Respond empathetically and culturally sensitively in English with an emoji.\n\
             User: \"I am so happy and excited today!\"\n\
             AI:"
        );
    }

    #[test]
    fn test_prompt_uses_display_name() {
        let prompt = compose("வணக்கம்", &profile(), &SupportedLanguage::new("ta", "Tamil", "tam"));
        assert!(prompt.as_str().contains("in Tamil with an emoji"));
        assert!(!prompt.as_str().contains(" ta "));
    }

    #[test]
    fn test_prompt_preserves_quotes_in_text() {
        let prompt = compose(
            r#"she said "fine" and left"#,
            &profile(),
            &SupportedLanguage::new("en", "English", "eng"),
        );
        assert!(prompt.as_str().contains(r#"User: "she said "fine" and left""#));
    }

    #[test]
    fn test_compose_is_deterministic() {
        let lang = SupportedLanguage::new("hi", "Hindi", "hin");
        let a = compose("text", &profile(), &lang);
        let b = compose("text", &profile(), &lang);
        assert_eq!(a, b);
        assert_eq!(a.to_string(), a.as_str());
    }
}
