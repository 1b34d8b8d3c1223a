//! SupportedLanguage: one row of the language table.

use serde::{Deserialize, Serialize};

/// A language the reply pipeline can answer in.
///
/// Values are only handed out by [`LanguageRegistry`](crate::i18n::LanguageRegistry),
/// so a `SupportedLanguage` seen by the rest of the crate is always a member
/// of the configured table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupportedLanguage {
    /// Short code used in turns and prompts (e.g., "en", "hi")
    pub code: String,

    /// Display name used in generation instructions (e.g., "English")
    pub name: String,

    /// ISO 639-3 code the statistical detector reports for this language
    pub detector_code: String,
}

impl SupportedLanguage {
    pub fn new(code: &str, name: &str, detector_code: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            detector_code: detector_code.to_string(),
        }
    }

    /// Get the short language code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Get the display name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
