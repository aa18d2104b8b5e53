pub mod cli;
pub mod core;
pub mod providers;
pub mod server;
pub mod service;
pub mod store;

use crate::core::config::AppConfig;
use crate::core::period::Period;
use anyhow::Result;
use tracing::{debug, info};

/// Commands that need a loaded configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Serve { bind: Option<String> },
    Show { period: Period },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("finboard starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    match command {
        AppCommand::Serve { bind } => cli::serve::run(&config, bind.as_deref()).await,
        AppCommand::Show { period } => cli::show::run(&config, period).await,
    }
}
