//! `chatbridge gateway` — Start the HTTP chat server.

use chatbridge_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("chatbridge gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!(
        "   Inference token: {}",
        if config.has_api_token() { "set" } else { "not set" }
    );

    chatbridge_gateway::start(config).await?;

    Ok(())
}
