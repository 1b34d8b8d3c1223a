use crate::error::ConfigError;
use crate::generation::gemini::DEFAULT_GEMINI_API_URL;
use crate::generation::openai::DEFAULT_OPENAI_API_URL;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Which generative text service answers the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gemini,
    OpenAi,
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(Provider::Gemini),
            "openai" => Ok(Provider::OpenAi),
            other => Err(format!("unknown provider '{}' (expected gemini or openai)", other)),
        }
    }
}

/// Which emotion classifier backend to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmotionBackend {
    Lexicon,
    Roberta,
}

impl EmotionBackend {
    fn compiled_default() -> Self {
        if cfg!(feature = "roberta") {
            EmotionBackend::Roberta
        } else {
            EmotionBackend::Lexicon
        }
    }
}

impl FromStr for EmotionBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexicon" => Ok(EmotionBackend::Lexicon),
            "roberta" => Ok(EmotionBackend::Roberta),
            other => Err(format!("unknown emotion backend '{}' (expected lexicon or roberta)", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Generation service
    pub provider: Provider,
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    pub request_timeout: Duration,
    pub max_attempts: u32,
    pub error_marker: String,

    // Emotion extraction
    pub emotion_backend: EmotionBackend,
    pub emotion_model: String,
    pub top_k: usize,

    // Language detection
    pub languages_file: Option<PathBuf>,
    pub default_language: String,
    pub min_language_confidence: f64,

    // Front end
    pub queue_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider: Provider = parse_or(&var, "GENERATION_PROVIDER", Provider::Gemini)?;

        let (api_key, api_url, model, default_marker) = match provider {
            Provider::Gemini => (
                var("GEMINI_API_KEY").ok_or(ConfigError::MissingVar("GEMINI_API_KEY"))?,
                var("GEMINI_API_URL").unwrap_or_else(|| DEFAULT_GEMINI_API_URL.to_string()),
                var("GEMINI_MODEL").unwrap_or_else(|| "gemini-1.5-flash".to_string()),
                "❌ Gemini error",
            ),
            Provider::OpenAi => (
                var("OPENAI_API_KEY").ok_or(ConfigError::MissingVar("OPENAI_API_KEY"))?,
                var("OPENAI_API_URL").unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string()),
                var("OPENAI_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
                "❌ OpenAI error",
            ),
        };

        let timeout_secs: u64 = parse_or(&var, "GENERATION_TIMEOUT_SECS", 30)?;
        if timeout_secs == 0 {
            return Err(invalid("GENERATION_TIMEOUT_SECS", "0", "must be greater than zero"));
        }

        let max_attempts: u32 = parse_or(&var, "GENERATION_MAX_ATTEMPTS", 1)?;
        if max_attempts == 0 {
            return Err(invalid("GENERATION_MAX_ATTEMPTS", "0", "must be at least 1"));
        }

        let top_k: usize = parse_or(&var, "EMOTION_TOP_K", 2)?;
        if top_k == 0 {
            return Err(invalid("EMOTION_TOP_K", "0", "must be at least 1"));
        }

        let min_language_confidence: f64 = parse_or(&var, "LANGUAGE_MIN_CONFIDENCE", 0.0)?;
        if !(0.0..=1.0).contains(&min_language_confidence) {
            return Err(invalid(
                "LANGUAGE_MIN_CONFIDENCE",
                &min_language_confidence.to_string(),
                "must be between 0 and 1",
            ));
        }

        Ok(Self {
            provider,
            api_key,
            api_url,
            model,
            request_timeout: Duration::from_secs(timeout_secs),
            max_attempts,
            error_marker: var("GENERATION_ERROR_MARKER").unwrap_or_else(|| default_marker.to_string()),

            emotion_backend: parse_or(&var, "EMOTION_BACKEND", EmotionBackend::compiled_default())?,
            emotion_model: var("EMOTION_MODEL")
                .unwrap_or_else(|| "SamLowe/roberta-base-go_emotions".to_string()),
            top_k,

            languages_file: var("LANGUAGES_FILE").map(PathBuf::from),
            default_language: var("DEFAULT_LANGUAGE").unwrap_or_else(|| "en".to_string()),
            min_language_confidence,

            queue_size: parse_or(&var, "TURN_QUEUE_SIZE", 16)?,
        })
    }
}

fn parse_or<T, V>(var: &V, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    V: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(key, &raw, &e.to_string())),
        None => Ok(default),
    }
}

fn invalid(var: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    // ==================== Credential Tests ====================

    #[test]
    fn test_missing_gemini_key_is_fatal() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("GEMINI_API_KEY")));
    }

    #[test]
    fn test_blank_key_counts_as_missing() {
        let err = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "   ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("GEMINI_API_KEY")));
    }

    #[test]
    fn test_openai_provider_requires_openai_key() {
        let err = Config::from_lookup(lookup(&[
            ("GENERATION_PROVIDER", "openai"),
            ("GEMINI_API_KEY", "g-key"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar("OPENAI_API_KEY")));
    }

    // ==================== Default Tests ====================

    #[test]
    fn test_gemini_defaults() {
        let config = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "g-key")])).expect("config");

        assert_eq!(config.provider, Provider::Gemini);
        assert_eq!(config.api_key, "g-key");
        assert_eq!(config.api_url, DEFAULT_GEMINI_API_URL);
        assert_eq!(config.model, "gemini-1.5-flash");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.error_marker, "❌ Gemini error");
        assert_eq!(config.top_k, 2);
        assert_eq!(config.default_language, "en");
        assert_eq!(config.min_language_confidence, 0.0);
        assert!(config.languages_file.is_none());
        assert_eq!(config.queue_size, 16);
        assert_eq!(config.emotion_model, "SamLowe/roberta-base-go_emotions");
    }

    #[test]
    fn test_openai_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("GENERATION_PROVIDER", "OpenAI"),
            ("OPENAI_API_KEY", "o-key"),
            ("OPENAI_MODEL", "gpt-4-turbo"),
            ("GENERATION_TIMEOUT_SECS", "5"),
            ("GENERATION_MAX_ATTEMPTS", "3"),
            ("EMOTION_TOP_K", "4"),
            ("EMOTION_BACKEND", "lexicon"),
            ("LANGUAGES_FILE", "/etc/langs.json"),
        ]))
        .expect("config");

        assert_eq!(config.provider, Provider::OpenAi);
        assert_eq!(config.model, "gpt-4-turbo");
        assert_eq!(config.api_url, DEFAULT_OPENAI_API_URL);
        assert_eq!(config.error_marker, "❌ OpenAI error");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.top_k, 4);
        assert_eq!(config.emotion_backend, EmotionBackend::Lexicon);
        assert_eq!(config.languages_file, Some(PathBuf::from("/etc/langs.json")));
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_unparseable_number_is_rejected() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("EMOTION_TOP_K", "two"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { var: "EMOTION_TOP_K", .. }));
    }

    #[test]
    fn test_zero_values_are_rejected() {
        for key in ["EMOTION_TOP_K", "GENERATION_TIMEOUT_SECS", "GENERATION_MAX_ATTEMPTS"] {
            let err = Config::from_lookup(lookup(&[("GEMINI_API_KEY", "k"), (key, "0")])).unwrap_err();
            assert!(err.to_string().contains(key), "{}", err);
        }
    }

    #[test]
    fn test_confidence_out_of_range() {
        let err = Config::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "k"),
            ("LANGUAGE_MIN_CONFIDENCE", "1.5"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("LANGUAGE_MIN_CONFIDENCE"));
    }

    #[test]
    fn test_unknown_provider() {
        let err = Config::from_lookup(lookup(&[("GENERATION_PROVIDER", "claude")])).unwrap_err();
        assert!(err.to_string().contains("unknown provider"));
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_reads_process_environment() {
        std::env::set_var("GENERATION_PROVIDER", "gemini");
        std::env::set_var("GEMINI_API_KEY", "env-key");
        std::env::set_var("EMOTION_TOP_K", "3");

        let config = Config::from_env();

        std::env::remove_var("GENERATION_PROVIDER");
        std::env::remove_var("GEMINI_API_KEY");
        std::env::remove_var("EMOTION_TOP_K");

        let config = config.expect("config");
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.top_k, 3);
    }
}
