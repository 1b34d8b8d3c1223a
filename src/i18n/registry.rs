//! Language registry: the validated table of supported languages.
//!
//! The table is plain data. It ships with a built-in default and can be
//! replaced by a JSON file at startup; either way it is checked against the
//! detector's output space before the pipeline is built, so adding a
//! language never requires a code change.

use crate::error::ConfigError;
use crate::i18n::SupportedLanguage;
use std::collections::HashSet;
use std::path::Path;

/// Immutable, validated set of supported languages with one default.
#[derive(Debug, Clone)]
pub struct LanguageRegistry {
    languages: Vec<SupportedLanguage>,
    default_index: usize,
}

impl LanguageRegistry {
    /// Build a registry from table rows.
    ///
    /// # Errors
    /// Returns `ConfigError::LanguageTable` if the table is empty, repeats a
    /// code or a detector code, names a detector code the detector cannot
    /// emit, or does not contain `default_code`.
    pub fn new(languages: Vec<SupportedLanguage>, default_code: &str) -> Result<Self, ConfigError> {
        if languages.is_empty() {
            return Err(ConfigError::LanguageTable("table is empty".into()));
        }

        let mut seen = HashSet::new();
        let mut seen_detector = HashSet::new();
        for lang in &languages {
            if lang.code.trim().is_empty() || lang.name.trim().is_empty() {
                return Err(ConfigError::LanguageTable(format!(
                    "entry {:?} has a blank code or name",
                    lang
                )));
            }
            if !seen.insert(lang.code.as_str()) {
                return Err(ConfigError::LanguageTable(format!(
                    "duplicate language code '{}'",
                    lang.code
                )));
            }
            if !seen_detector.insert(lang.detector_code.as_str()) {
                return Err(ConfigError::LanguageTable(format!(
                    "detector code '{}' is mapped twice (again for '{}')",
                    lang.detector_code, lang.code
                )));
            }
            if whatlang::Lang::from_code(&lang.detector_code).is_none() {
                return Err(ConfigError::LanguageTable(format!(
                    "detector cannot produce '{}' (for '{}')",
                    lang.detector_code, lang.code
                )));
            }
        }

        let default_index = languages
            .iter()
            .position(|lang| lang.code == default_code)
            .ok_or_else(|| {
                ConfigError::LanguageTable(format!(
                    "default language '{}' is not in the table",
                    default_code
                ))
            })?;

        Ok(Self {
            languages,
            default_index,
        })
    }

    /// The built-in table: English (default), Hindi, Tamil, Telugu,
    /// Kannada and Malayalam.
    pub fn default_table() -> Self {
        Self {
            languages: default_languages(),
            default_index: 0,
        }
    }

    /// Load table rows from a JSON array file.
    pub fn from_json_file(path: &Path, default_code: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::LanguageTable(format!("failed to read {}: {}", path.display(), e))
        })?;
        let languages: Vec<SupportedLanguage> = serde_json::from_str(&content).map_err(|e| {
            ConfigError::LanguageTable(format!("failed to parse {}: {}", path.display(), e))
        })?;
        Self::new(languages, default_code)
    }

    /// Get the language the detector reports as `detector_code`.
    pub fn find_by_detector_code(&self, detector_code: &str) -> Option<&SupportedLanguage> {
        self.languages
            .iter()
            .find(|lang| lang.detector_code == detector_code)
    }

    /// The fallback language.
    pub fn default_language(&self) -> &SupportedLanguage {
        &self.languages[self.default_index]
    }

    /// All supported languages in table order.
    pub fn list(&self) -> &[SupportedLanguage] {
        &self.languages
    }
}

fn default_languages() -> Vec<SupportedLanguage> {
    vec![
        SupportedLanguage::new("en", "English", "eng"),
        SupportedLanguage::new("hi", "Hindi", "hin"),
        SupportedLanguage::new("ta", "Tamil", "tam"),
        SupportedLanguage::new("te", "Telugu", "tel"),
        SupportedLanguage::new("kn", "Kannada", "kan"),
        SupportedLanguage::new("ml", "Malayalam", "mal"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // ==================== Default Table Tests ====================

    #[test]
    fn test_default_table_contents() {
        let registry = LanguageRegistry::default_table();
        let codes: Vec<&str> = registry.list().iter().map(|l| l.code()).collect();
        assert_eq!(codes, vec!["en", "hi", "ta", "te", "kn", "ml"]);
        assert_eq!(registry.default_language().code(), "en");
    }

    #[test]
    fn test_default_table_passes_validation() {
        let registry = LanguageRegistry::new(default_languages(), "en");
        assert!(registry.is_ok());
    }

    #[test]
    fn test_find_by_detector_code() {
        let registry = LanguageRegistry::default_table();
        assert_eq!(
            registry.find_by_detector_code("hin").map(|l| l.code()),
            Some("hi")
        );
        assert!(registry.find_by_detector_code("fra").is_none());
    }

    // ==================== Validation Tests ====================

    #[test]
    fn test_empty_table_rejected() {
        let err = LanguageRegistry::new(vec![], "en").unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_duplicate_code_rejected() {
        let table = vec![
            SupportedLanguage::new("en", "English", "eng"),
            SupportedLanguage::new("en", "English again", "eng"),
        ];
        let err = LanguageRegistry::new(table, "en").unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_duplicate_detector_code_rejected() {
        let table = vec![
            SupportedLanguage::new("hi", "Hindi", "hin"),
            SupportedLanguage::new("hi-IN", "Hindi (India)", "hin"),
        ];
        let err = LanguageRegistry::new(table, "hi").unwrap_err();
        assert!(matches!(err, ConfigError::LanguageTable(_)));
        assert!(err.to_string().contains("'hin' is mapped twice"));
    }

    #[test]
    fn test_unknown_detector_code_rejected() {
        let table = vec![SupportedLanguage::new("xx", "Nowhere", "zzz")];
        let err = LanguageRegistry::new(table, "xx").unwrap_err();
        assert!(err.to_string().contains("zzz"));
    }

    #[test]
    fn test_missing_default_rejected() {
        let table = vec![SupportedLanguage::new("hi", "Hindi", "hin")];
        let err = LanguageRegistry::new(table, "en").unwrap_err();
        assert!(err.to_string().contains("default language 'en'"));
    }

    #[test]
    fn test_custom_default() {
        let table = vec![
            SupportedLanguage::new("en", "English", "eng"),
            SupportedLanguage::new("fr", "French", "fra"),
        ];
        let registry = LanguageRegistry::new(table, "fr").expect("valid table");
        assert_eq!(registry.default_language().name(), "French");
    }

    // ==================== File Loading Tests ====================

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(
            file,
            r#"[
                {{"code": "en", "name": "English", "detector_code": "eng"}},
                {{"code": "es", "name": "Spanish", "detector_code": "spa"}}
            ]"#
        )
        .expect("write table");

        let registry = LanguageRegistry::from_json_file(file.path(), "en").expect("load table");
        assert_eq!(registry.list().len(), 2);
        assert_eq!(
            registry.find_by_detector_code("spa").map(|l| l.name()),
            Some("Spanish")
        );
    }

    #[test]
    fn test_from_json_file_missing() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = LanguageRegistry::from_json_file(&dir.path().join("nope.json"), "en").unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }

    #[test]
    fn test_from_json_file_malformed() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, "not json").expect("write");
        let err = LanguageRegistry::from_json_file(file.path(), "en").unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
