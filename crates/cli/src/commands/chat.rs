//! `chatbridge chat` — Resolve a single message from the command line.

use std::sync::Arc;

use chatbridge_agent::ResponseResolver;
use chatbridge_config::AppConfig;

pub async fn run(message: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let message = message.trim();
    if message.is_empty() {
        return Err("Message is empty".into());
    }

    let provider = Arc::new(chatbridge_providers::build_from_config(&config)?);
    let resolver = ResponseResolver::from_config(&config, provider);

    eprint!("  Thinking...");
    let resolution = resolver.resolve(message).await;
    eprint!("\r              \r");

    println!("{}", resolution.reply);
    eprintln!("  (answered by: {})", resolution.source);

    Ok(())
}
