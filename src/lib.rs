//! Emotionally attuned, language-aware replies.
//!
//! Per message: detect the language, score emotions, compose a generation
//! instruction, call the generative service, record the turn.

pub mod bootstrap;
pub mod config;
pub mod conversation;
pub mod detector;
pub mod emotion;
pub mod error;
pub mod generation;
pub mod i18n;
pub mod metrics;
pub mod prompt;
pub mod retry;
pub mod worker;
