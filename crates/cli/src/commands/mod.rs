pub mod ask;
pub mod filter;
pub mod init;
pub mod serve;
pub mod status;

use ledgerchat_config::AppConfig;
use ledgerchat_core::Ledger;

pub(crate) fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

pub(crate) fn load_ledger(config: &AppConfig) -> Result<Ledger, Box<dyn std::error::Error>> {
    let dir = &config.ledger.data_dir;
    Ok(ledgerchat_ledger::load_dir(dir)
        .map_err(|e| format!("Failed to load ledger from {}: {e}", dir.display()))?)
}
