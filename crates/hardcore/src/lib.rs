//! # Hardcore Admin
//!
//! Offline administration for per-world hardcore servers: list and inspect
//! hardcore worlds, create and remove them, reload configuration and cull worlds
//! where every visitor has died.
//!
//! ## Quick Start
//!
//! ```bash
//! # List hardcore worlds from ./config.toml
//! hardcore_admin list
//!
//! # Create a world with a nether and pipe the world commands into the server
//! hardcore_admin create hc-2 --nether | ./server-console
//!
//! # Report, then delete, fully dead worlds
//! hardcore_admin cull
//! hardcore_admin cull --delete
//! ```
//!
//! ## Configuration
//!
//! The tool reads the server's `config.toml` (see `--config`). If the file doesn't
//! exist, a default configuration is created. Player state is read from the file
//! named by `storage.data-file`, next to the configuration, unless `--data` is
//! given.
//!
//! ## Output
//!
//! Command results and world commands go to stdout; logs go to stderr.

use tracing::error;

mod app;
mod cli;
mod config;
mod logging;

use app::Application;
use cli::CliArgs;
use config::AppConfig;

/// Runs the admin tool.
///
/// # Exit Codes
///
/// * **0**: The command succeeded
/// * **1**: Configuration, startup or command failure
pub async fn init() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Load configuration to get logging settings
    let mut config = AppConfig::load_from_file(&args.config_path)
        .await
        .unwrap_or_default();
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }

    if let Err(e) = logging::setup_logging(&config.logging, args.json_logs) {
        eprintln!("❌ Failed to setup logging: {e}");
        std::process::exit(1);
    }

    match Application::new(args).await {
        Ok(app) => {
            if let Err(e) = app.run().await {
                error!("❌ Command failed: {e}");
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("❌ Failed to start: {e}");
            std::process::exit(1);
        }
    }

    Ok(())
}

pub use cli::AdminCommand;
pub use config::{LoggingSettings, StorageSettings};
