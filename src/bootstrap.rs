//! Startup wiring: turn a [`Config`] into a ready [`Conversation`].
//!
//! Model state is loaded here once and handed to the pipeline as shared,
//! read-only handles. Nothing is re-initialised mid-session.

use crate::config::{Config, EmotionBackend, Provider};
use crate::conversation::Conversation;
use crate::detector::LanguageDetector;
use crate::emotion::{EmotionClassifier, EmotionExtractor, LexiconClassifier};
use crate::error::ConfigError;
use crate::generation::{GeminiClient, GenerationClient, GeneratorSettings, OpenAiClient, ResponseGenerator};
use crate::i18n::LanguageRegistry;
use crate::retry::RetryConfig;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// Load the language table named by the config, or the built-in one.
pub fn load_registry(config: &Config) -> Result<LanguageRegistry, ConfigError> {
    match &config.languages_file {
        Some(path) => LanguageRegistry::from_json_file(path, &config.default_language),
        None => {
            let builtin = LanguageRegistry::default_table();
            LanguageRegistry::new(builtin.list().to_vec(), &config.default_language)
        }
    }
}

/// Load the configured emotion classifier.
///
/// This may download model files and should run off the async executor.
pub fn load_classifier(config: &Config) -> Result<Arc<dyn EmotionClassifier>> {
    match config.emotion_backend {
        EmotionBackend::Lexicon => Ok(Arc::new(LexiconClassifier::new())),
        #[cfg(feature = "roberta")]
        EmotionBackend::Roberta => {
            let classifier = crate::emotion::RobertaClassifier::from_hub(&config.emotion_model)
                .with_context(|| format!("Failed to load emotion model {}", config.emotion_model))?;
            Ok(Arc::new(classifier))
        }
        #[cfg(not(feature = "roberta"))]
        EmotionBackend::Roberta => anyhow::bail!(
            "EMOTION_BACKEND=roberta requires building with `--features roberta`"
        ),
    }
}

/// Build the generation client and failure policy.
pub fn build_generator(config: &Config) -> Result<ResponseGenerator> {
    let client: Arc<dyn GenerationClient> = match config.provider {
        Provider::Gemini => Arc::new(
            GeminiClient::new(&config.api_url, &config.api_key, &config.model, config.request_timeout)
                .context("Failed to create Gemini client")?,
        ),
        Provider::OpenAi => Arc::new(
            OpenAiClient::new(&config.api_url, &config.api_key, &config.model, config.request_timeout)
                .context("Failed to create OpenAI client")?,
        ),
    };

    let retry = if config.max_attempts > 1 {
        RetryConfig::generation(config.max_attempts)
    } else {
        RetryConfig::single_attempt()
    };

    Ok(ResponseGenerator::new(
        client,
        GeneratorSettings {
            timeout: config.request_timeout,
            retry,
            error_marker: config.error_marker.clone(),
        },
    ))
}

/// Build the detector and extractor shared by every turn.
pub async fn load_analyzers(config: &Config) -> Result<(Arc<LanguageDetector>, Arc<EmotionExtractor>)> {
    let registry = Arc::new(load_registry(config)?);
    info!(
        "Supported languages: {} (default {})",
        registry
            .list()
            .iter()
            .map(|l| l.code())
            .collect::<Vec<_>>()
            .join(", "),
        registry.default_language().code()
    );
    let detector = Arc::new(LanguageDetector::new(registry, config.min_language_confidence));

    let classifier_config = config.clone();
    let classifier = tokio::task::spawn_blocking(move || load_classifier(&classifier_config))
        .await
        .context("Classifier loading task panicked")??;
    let extractor = Arc::new(EmotionExtractor::new(classifier));

    if config.top_k > extractor.vocabulary_size() {
        return Err(ConfigError::InvalidValue {
            var: "EMOTION_TOP_K",
            value: config.top_k.to_string(),
            reason: format!("classifier has only {} labels", extractor.vocabulary_size()),
        }
        .into());
    }
    info!(
        "Emotion classifier ready ({} labels, top {})",
        extractor.vocabulary_size(),
        config.top_k
    );

    Ok((detector, extractor))
}

/// Build the whole pipeline.
pub async fn build_conversation(config: &Config) -> Result<Conversation> {
    let (detector, extractor) = load_analyzers(config).await?;
    let generator = build_generator(config)?;
    info!("Generation via {:?} model {}", config.provider, config.model);

    Ok(Conversation::new(detector, extractor, generator, config.top_k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let mut map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        map.entry("GEMINI_API_KEY".into()).or_insert_with(|| "test-key".into());
        map.entry("EMOTION_BACKEND".into()).or_insert_with(|| "lexicon".into());
        Config::from_lookup(|k| map.get(k).cloned()).expect("config")
    }

    #[test]
    fn test_builtin_registry() {
        let registry = load_registry(&config(&[])).expect("registry");
        assert_eq!(registry.list().len(), 6);
        assert_eq!(registry.default_language().code(), "en");
    }

    #[test]
    fn test_default_language_must_be_in_table() {
        let err = load_registry(&config(&[("DEFAULT_LANGUAGE", "fr")])).unwrap_err();
        assert!(matches!(err, ConfigError::LanguageTable(_)));
    }

    #[test]
    fn test_registry_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[{{"code": "ml", "name": "Malayalam", "detector_code": "mal"}}]"#
        )
        .expect("write");
        let path = file.path().to_string_lossy().to_string();

        let registry = load_registry(&config(&[("LANGUAGES_FILE", path.as_str()), ("DEFAULT_LANGUAGE", "ml")]))
            .expect("registry");
        assert_eq!(registry.default_language().name(), "Malayalam");
    }

    #[tokio::test]
    async fn test_top_k_larger_than_vocabulary_is_rejected() {
        let err = load_analyzers(&config(&[("EMOTION_TOP_K", "99")]))
            .await
            .err()
            .expect("error");
        assert!(err.to_string().contains("EMOTION_TOP_K"));
    }

    #[tokio::test]
    async fn test_build_conversation() {
        let conversation = build_conversation(&config(&[])).await.expect("conversation");
        assert_eq!(conversation.top_k(), 2);
        assert_eq!(conversation.history_len().await, 0);
    }

    #[cfg(not(feature = "roberta"))]
    #[test]
    fn test_roberta_requires_feature() {
        let err = load_classifier(&config(&[("EMOTION_BACKEND", "roberta")])).err().expect("error");
        assert!(err.to_string().contains("--features roberta"));
    }

    #[test]
    fn test_retry_policy_follows_max_attempts() {
        let generator = build_generator(&config(&[("GENERATION_MAX_ATTEMPTS", "3")])).expect("generator");
        assert_eq!(generator.settings().retry.max_attempts, 3);

        let generator = build_generator(&config(&[])).expect("generator");
        assert_eq!(generator.settings().retry.max_attempts, 1);
        assert_eq!(generator.settings().error_marker, "❌ Gemini error");
    }
}
