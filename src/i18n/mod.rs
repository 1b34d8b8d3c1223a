//! Supported-language table.
//!
//! # Architecture
//!
//! - `language`: `SupportedLanguage`, one validated row of the table
//! - `registry`: `LanguageRegistry`, the immutable table handle built at
//!   startup and shared with the detector
//!
//! # Example
//!
//! ```rust,ignore
//! use empathic_chat::i18n::LanguageRegistry;
//!
//! let registry = LanguageRegistry::default_table();
//! assert_eq!(registry.default_language().code(), "en");
//! assert_eq!(registry.find_by_detector_code("tam").unwrap().name(), "Tamil");
//! ```

mod language;
mod registry;

pub use language::SupportedLanguage;
pub use registry::LanguageRegistry;
