//! `ledgerchat status`: Show configuration and ledger status.

use ledgerchat_config::AppConfig;
use ledgerchat_core::provider::Provider;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;

    println!("LedgerChat Status");
    println!("=================");
    println!("  Config dir:   {}", AppConfig::config_dir().display());
    println!("  Provider:     {}", config.default_provider);
    println!("  Model:        {}", ledgerchat_providers::default_model(&config));
    println!("  Temperature:  {}", config.temperature);
    println!("  API key:      {}", if config.has_api_key() { "configured" } else { "missing" });
    if let Some(provider) = ledgerchat_providers::build_from_config(&config).default() {
        println!("  Reachable:    {}", reachability(provider.as_ref()).await);
    }
    println!("  Gateway:      {}:{}", config.gateway.host, config.gateway.port);
    println!("  CORS:         {}", config.gateway.cors_origins.join(", "));
    println!("  Max results:  {}", config.query.max_results);
    match config.query.timeout_secs {
        Some(secs) => println!("  Timeout:      {secs}s"),
        None => println!("  Timeout:      client default"),
    }

    println!("  Data dir:     {}", config.ledger.data_dir.display());
    match super::load_ledger(&config) {
        Ok(ledger) => {
            let years = ledger.years();
            println!("  Ledger rows:  {}", ledger.len());
            if let (Some(first), Some(last)) = (years.first(), years.last()) {
                println!("  Years:        {first}–{last} ({} distinct)", years.len());
            }
        }
        Err(e) => println!("\n  ⚠️  {e}"),
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file: run `ledgerchat init` first");
    }

    Ok(())
}

/// Short verdict from the provider's health check.
async fn reachability(provider: &dyn Provider) -> String {
    match provider.health_check().await {
        Ok(true) => "yes".into(),
        Ok(false) => "no (endpoint answered with an error status)".into(),
        Err(e) => format!("no ({e})"),
    }
}
