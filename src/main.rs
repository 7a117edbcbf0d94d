use anyhow::{bail, Result};
use dialoguer::Input;
use farmton_bot::{
    accounts::{load_accounts, AccountEntry},
    config::{Config, ConfigLoader},
    display,
    logging::init_logger,
    worker::Supervisor,
};
use std::path::PathBuf;
use tokio::time::interval;
use tracing::{info, warn};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    init_logger()?;
    info!("Farmton Bot v{} starting", VERSION);

    let config_loader = ConfigLoader::new();
    let mut config = config_loader.load()?;
    info!("Config: {:?}", config_loader.path());

    // Ask for the account list if the configured one is missing
    if !config.accounts_file.exists() {
        warn!("Account list {:?} not found", config.accounts_file);
        let path: String = Input::new()
            .with_prompt("Path to your account list (one init data line per account)")
            .interact_text()?;
        config = config_loader.update_property(|c| c.accounts_file = PathBuf::from(path.trim()))?;
    }

    let accounts = load_accounts(&config.accounts_file)?;
    if accounts.is_empty() {
        bail!("No accounts found in {:?}", config.accounts_file);
    }

    log_settings(&config, &accounts);

    let supervisor = Supervisor::launch(&config.client_settings(), config.timing(), &accounts);

    info!("{}", display::LEGEND);
    info!("Press Ctrl+C to stop");

    let mut ticker = interval(config.status_interval());
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            _ = ticker.tick() => display::report(&supervisor.snapshot()),
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    warn!("Failed to listen for Ctrl+C: {}", e);
                }
                break;
            }
        }
    }

    info!("Bot stopped by user, waiting for in-flight requests...");
    supervisor.shutdown();
    supervisor.wait().await;
    Ok(())
}

fn log_settings(config: &Config, accounts: &[AccountEntry]) {
    info!("Accounts: {}", accounts.len());
    info!("API: {}", config.base_url);
    info!(
        "Timing: settle {}s, cycle pause {}s, error pause {}s, request timeout {}s",
        config.settle_delay_secs,
        config.cycle_pause_secs,
        config.error_pause_secs,
        config.request_timeout_secs
    );
}
