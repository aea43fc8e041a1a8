//! `chatbridge status` — Show the effective configuration.

use chatbridge_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let inference = &config.inference;
    let responder = &config.responder;

    println!("chatbridge status");
    println!("=================");
    println!("  Config dir:    {}", AppConfig::config_dir().display());
    println!("  Gateway:       {}:{}", config.gateway.host, config.gateway.port);
    println!("  History:       last {} exchanges per user", config.history.max_exchanges);
    println!("  Primary:       {}", inference.primary_url);
    println!("  Secondary:     {}", inference.secondary_url);
    println!("  Timeout:       {}s per attempt", inference.timeout_secs);
    println!(
        "  Token:         {}",
        if config.has_api_token() { "set" } else { "not set" }
    );
    println!(
        "  Keywords:      {}",
        responder.keywords.as_ref().map_or("built-in".to_string(), |k| format!("{} configured", k.len()))
    );
    println!(
        "  Canned:        {}",
        responder.canned.as_ref().map_or("built-in".to_string(), |c| format!("{} configured", c.len()))
    );

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `chatbridge onboard` first");
    }

    Ok(())
}
