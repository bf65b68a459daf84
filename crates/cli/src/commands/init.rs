//! `ledgerchat init`: First-time setup.

use ledgerchat_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("  Config file exists: {}", config_path.display());
    } else {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Wrote default config: {}", config_path.display());
    }

    println!();
    println!("Next steps:");
    println!("  1. Set an API key: export OPENAI_API_KEY='sk-...'");
    println!("  2. Put the yearly CSV extracts in ./csvs (or set ledger.data_dir)");
    println!("  3. Run `ledgerchat serve`");
    Ok(())
}
