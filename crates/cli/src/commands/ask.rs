//! `cornerman ask` — Single-message mode.

use cornerman_config::AppConfig;

pub async fn run(message: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let mut agent = super::build_agent(&config)?;

    let reply = agent.process(message).await;
    println!("{reply}");
    Ok(())
}
