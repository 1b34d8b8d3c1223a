use anyhow::{Context, Result};
use empathic_chat::{
    bootstrap,
    config::Config,
    conversation::Conversation,
    worker::{ConversationWorker, TurnEvent},
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when variables come from the environment)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("empathic_chat=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    // Missing credentials stop us here, before the prompt is shown
    let config = Config::from_env().context("Invalid configuration")?;
    let conversation = Arc::new(bootstrap::build_conversation(&config).await?);

    let (worker, mut events, worker_handle) =
        ConversationWorker::spawn(Arc::clone(&conversation), config.queue_size);

    println!("🤗 Multilingual Emotional AI Chatbot");
    println!("Type how you feel in any supported language. Commands: /history, /stats, /quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" | "/exit" => break,
            "/history" => print_history(&conversation).await,
            "/stats" => println!("{}", serde_json::to_string_pretty(&conversation.metrics())?),
            _ => {
                worker.submit(line).await.context("Conversation worker stopped")?;
                match events.recv().await {
                    Some(TurnEvent::Recorded(turn)) => {
                        println!("{}", turn.user_line());
                        println!("{}", turn.reply_line());
                    }
                    Some(TurnEvent::Ignored) => {}
                    Some(TurnEvent::Failed(err)) => println!("⚠️  {}", err),
                    None => anyhow::bail!("Conversation worker stopped"),
                }
            }
        }
    }

    drop(worker);
    drop(events);
    worker_handle.await?;

    info!("Session ended after {} turns", conversation.history_len().await);
    Ok(())
}

async fn print_history(conversation: &Conversation) {
    for turn in conversation.history().await {
        println!(
            "[{}] ({}) {}",
            turn.timestamp().format("%H:%M:%S"),
            turn.language_code(),
            turn.user_line()
        );
        println!("           {}", turn.reply_line());
    }
}
