//! `ledgerchat ask`: Answer one question from the command line.

use std::sync::Arc;

pub async fn run(message: String) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    if !config.has_api_key() && config.default_provider != "ollama" {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export OPENAI_API_KEY='sk-...'");
        eprintln!("    export LEDGERCHAT_API_KEY='sk-...'");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", ledgerchat_config::AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let ledger = Arc::new(super::load_ledger(&config)?);
    let pipeline = ledgerchat_gateway::build_pipeline(&config, ledger)?;

    let response = pipeline.answer(&message).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    if response.is_error() {
        return Err("The question could not be answered".into());
    }
    Ok(())
}
