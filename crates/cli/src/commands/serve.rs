//! `lucy serve`: start the browser chat.

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config()?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("🤖 Lucy Web Interface");
    println!("   Open: http://{}:{}", config.gateway.host, config.gateway.port);
    println!("   Model: {}", config.chat_model);

    lucy_gateway::start(config).await?;

    Ok(())
}
