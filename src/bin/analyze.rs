//! Analyze binary - detects language and emotions without calling the generation service
//!
//! Usage:
//!   cargo run --bin analyze -- "I am so happy and excited today!"
//!   echo "நான் இன்று மகிழ்ச்சியாக இருக்கிறேன்" | cargo run --bin analyze
//!
//! No API key required.
//!
//! Optional:
//! - EMOTION_BACKEND (lexicon or roberta)
//! - EMOTION_TOP_K (defaults to 2)
//! - LANGUAGES_FILE, DEFAULT_LANGUAGE, LANGUAGE_MIN_CONFIDENCE

use anyhow::{Context, Result};
use empathic_chat::{bootstrap, config::Config, prompt};
use std::io::Read;
use tracing::info;

/// Read the analysis settings from the environment, ignoring generation settings
fn analysis_config() -> Result<Config> {
    Config::from_lookup(|key| match key {
        "GENERATION_PROVIDER" => Some("gemini".to_string()),
        "GEMINI_API_KEY" => Some("unused".to_string()),
        _ => std::env::var(key).ok(),
    })
    .context("Invalid configuration")
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("empathic_chat=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let text = if args.is_empty() {
        let mut input = String::new();
        std::io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read stdin")?;
        input
    } else {
        args.join(" ")
    };
    let text = text.trim();
    if text.is_empty() {
        anyhow::bail!("Nothing to analyze");
    }

    let config = analysis_config()?;
    let (detector, extractor) = bootstrap::load_analyzers(&config).await?;

    let detection = detector.detect(text);
    if let Some(reason) = &detection.fallback {
        info!("Using default language: {}", reason);
    }
    let language = detection.language;
    let emotions = extractor
        .extract(text, config.top_k)
        .context("Emotion extraction failed")?;

    println!("Language: {} ({})", language.name(), language.code());
    println!("Emotions:");
    for score in emotions.scores() {
        println!("  {:<16} {:.4}", score.label, score.probability);
    }
    println!();
    println!("{}", prompt::compose(text, &emotions, &language));

    Ok(())
}
