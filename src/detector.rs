//! Statistical language identification constrained to the supported table.

use crate::error::DetectionError;
use crate::i18n::{LanguageRegistry, SupportedLanguage};
use std::sync::Arc;
use tracing::debug;

/// Identifies the language of a message.
///
/// Detection is a pure trigram/script analysis with no random state, so the
/// same input always yields the same language.
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    registry: Arc<LanguageRegistry>,
    min_confidence: f64,
}

impl LanguageDetector {
    /// Create a detector over `registry`.
    ///
    /// Results with a confidence below `min_confidence` count as "too little
    /// signal". Use `0.0` to accept any result the detector produces.
    pub fn new(registry: Arc<LanguageRegistry>, min_confidence: f64) -> Self {
        Self {
            registry,
            min_confidence,
        }
    }

    /// Detect the language, reporting why no supported language was found.
    pub fn try_detect(&self, text: &str) -> Result<SupportedLanguage, DetectionError> {
        let info = whatlang::detect(text).ok_or(DetectionError::NoSignal)?;
        let detected = info.lang().code();

        if info.confidence() < self.min_confidence {
            return Err(DetectionError::LowConfidence {
                detected: detected.to_string(),
                confidence: info.confidence(),
                threshold: self.min_confidence,
            });
        }

        self.registry
            .find_by_detector_code(detected)
            .cloned()
            .ok_or_else(|| DetectionError::Unsupported {
                detected: detected.to_string(),
            })
    }

    /// Detect the language, falling back to the registry default.
    ///
    /// Every detection failure (no signal, low confidence, or a language
    /// outside the table) resolves to the default language. The caller
    /// always gets exactly one supported language; the reason for a
    /// fallback is kept on the result.
    pub fn detect(&self, text: &str) -> Detection {
        match self.try_detect(text) {
            Ok(language) => Detection {
                language,
                fallback: None,
            },
            Err(e) => {
                debug!("Language detection fell back to default: {}", e);
                Detection {
                    language: self.registry.default_language().clone(),
                    fallback: Some(e),
                }
            }
        }
    }
}

/// A supported language, and why it is the default if detection failed.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub language: SupportedLanguage,
    pub fallback: Option<DetectionError>,
}

impl Detection {
    pub fn is_fallback(&self) -> bool {
        self.fallback.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detector() -> LanguageDetector {
        LanguageDetector::new(Arc::new(LanguageRegistry::default_table()), 0.0)
    }

    // ==================== Supported Language Tests ====================

    #[test]
    fn test_detects_english() {
        let detection = detector().detect("I am so happy and excited today, the weather is wonderful and my friends are visiting me.");
        assert!(!detection.is_fallback());
        assert_eq!(detection.language.code(), "en");
    }

    #[test]
    fn test_detects_hindi() {
        let detection = detector().detect(
            "मैं आज बहुत खुश हूँ क्योंकि मेरे सभी दोस्त मुझसे मिलने आ रहे हैं और हम साथ में खाना खाएंगे",
        );
        assert!(!detection.is_fallback());
        assert_eq!(detection.language.code(), "hi");
    }

    #[test]
    fn test_detects_tamil() {
        let detection = detector().detect("நான் இன்று மிகவும் மகிழ்ச்சியாக இருக்கிறேன், என் நண்பர்கள் என்னைப் பார்க்க வருகிறார்கள்");
        assert!(!detection.is_fallback());
        assert_eq!(detection.language.code(), "ta");
    }

    #[test]
    fn test_detects_telugu() {
        let detection = detector().detect("నేను ఈ రోజు చాలా సంతోషంగా ఉన్నాను, నా స్నేహితులు నన్ను చూడటానికి వస్తున్నారు");
        assert!(!detection.is_fallback());
        assert_eq!(detection.language.code(), "te");
    }

    #[test]
    fn test_detects_kannada() {
        let detection = detector().detect("ನಾನು ಇಂದು ತುಂಬಾ ಸಂತೋಷವಾಗಿದ್ದೇನೆ, ನನ್ನ ಸ್ನೇಹಿತರು ನನ್ನನ್ನು ನೋಡಲು ಬರುತ್ತಿದ್ದಾರೆ");
        assert!(!detection.is_fallback());
        assert_eq!(detection.language.code(), "kn");
    }

    #[test]
    fn test_detects_malayalam() {
        let detection = detector().detect("ഞാൻ ഇന്ന് വളരെ സന്തോഷവാനാണ്, എന്റെ സുഹൃത്തുക്കൾ എന്നെ കാണാൻ വരുന്നു");
        assert!(!detection.is_fallback());
        assert_eq!(detection.language.code(), "ml");
    }

    // ==================== Fallback Tests ====================

    #[test]
    fn test_unsupported_language_falls_back() {
        let text = "Je suis très heureux aujourd'hui parce que mes amis viennent me rendre visite ce soir";
        let detector = detector();

        let err = detector.try_detect(text).unwrap_err();
        assert!(matches!(err, DetectionError::Unsupported { .. }));
        assert_eq!(detector.detect(text).language.code(), "en");
    }

    #[test]
    fn test_no_signal_falls_back() {
        let detector = detector();
        assert_eq!(detector.try_detect("12345 !!! ???"), Err(DetectionError::NoSignal));
        let detection = detector.detect("12345 !!! ???");
        assert_eq!(detection.language.code(), "en");
        assert_eq!(detection.fallback, Some(DetectionError::NoSignal));
    }

    #[test]
    fn test_low_confidence_falls_back() {
        let strict = LanguageDetector::new(Arc::new(LanguageRegistry::default_table()), 1.1);
        let text = "I am so happy and excited today, the weather is wonderful.";

        let err = strict.try_detect(text).unwrap_err();
        assert!(matches!(err, DetectionError::LowConfidence { .. }));
        assert_eq!(strict.detect(text).language.code(), "en");
    }

    #[test]
    fn test_fallback_uses_registry_default() {
        let table = vec![
            SupportedLanguage::new("en", "English", "eng"),
            SupportedLanguage::new("ta", "Tamil", "tam"),
        ];
        let registry = LanguageRegistry::new(table, "ta").expect("valid table");
        let detector = LanguageDetector::new(Arc::new(registry), 0.0);

        let detection = detector.detect("...");
        assert_eq!(detection.language.code(), "ta");
        assert!(detection.is_fallback());
    }

    // ==================== Determinism Tests ====================

    #[test]
    fn test_detection_is_repeatable() {
        let detector = detector();
        let text = "Das ist ein ganz normaler deutscher Satz über das Wetter heute";
        let first = detector.detect(text);
        for _ in 0..10 {
            assert_eq!(detector.detect(text), first);
        }
    }
}
