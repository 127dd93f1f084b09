//! CLI commands and handlers
use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use crate::app::{self, AppCfg};
use crate::config::{Config, MailerKind};
use crate::domain::checkout::PolicyPreset;

#[derive(Parser, Debug)]
#[command(name = "checkout-callback")]
#[command(version, about = "Checkout data-callback validation and receipt service")]
pub struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the checkout API
    Serve(ServeArgs),

    /// Validate a data-callback payload file and print the response
    Check {
        /// JSON file with the request body
        file: PathBuf,

        /// Path to config file (optional)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Rule set to apply (overrides config)
        #[arg(long)]
        preset: Option<PolicyPreset>,

        /// HTTP status for validation failures (overrides config)
        #[arg(long)]
        validation_error_status: Option<u16>,
    },
}

#[derive(Args, Debug, Default)]
pub struct ServeArgs {
    /// Path to config file (optional)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Listen address, e.g. 127.0.0.1:3000
    #[arg(long)]
    pub bind: Option<String>,

    /// Number of request worker threads
    #[arg(long)]
    pub workers: Option<usize>,

    /// Rule set to apply (overrides config)
    #[arg(long)]
    pub preset: Option<PolicyPreset>,

    /// HTTP status for validation failures
    #[arg(long)]
    pub validation_error_status: Option<u16>,

    /// Log receipts instead of sending them
    #[arg(long)]
    pub dry_run_email: bool,
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Ok(Config::default()),
    }
}

/// Build the runtime configuration. Priority: CLI args > config file > defaults.
pub fn resolve_serve_config(args: ServeArgs) -> Result<AppCfg> {
    let mut cfg = load_config(args.config.as_ref())?;

    if let Some(preset) = args.preset {
        cfg.validation.preset = preset;
        cfg.validation.policy = None;
    }
    if args.dry_run_email {
        cfg.email.provider = MailerKind::Log;
    }

    let mut app_cfg = AppCfg::from_config(cfg)?;
    if let Some(bind) = args.bind {
        app_cfg.bind = bind;
    }
    if let Some(workers) = args.workers {
        app_cfg.workers = workers;
    }
    if let Some(status) = args.validation_error_status {
        app_cfg.validation_error_status = status;
    }
    Ok(app_cfg)
}

pub async fn execute(command: Commands) -> Result<()> {
    match command {
        Commands::Serve(args) => {
            let app_cfg = resolve_serve_config(args)?;
            app::run(app_cfg).await
        }
        Commands::Check {
            file,
            config,
            preset,
            validation_error_status,
        } => {
            let cfg = load_config(config.as_ref())?;
            let status = validation_error_status.unwrap_or(cfg.server.validation_error_status);
            let policy = match preset {
                Some(preset) => preset.policy(),
                None => cfg.validation.resolve(),
            };
            info!(file = %file.display(), "Checking data-callback payload");
            let reply = app::check_payload(&file, policy, status)?;
            println!("{}", reply.status);
            println!("{}", serde_json::to_string_pretty(&reply.json())?);
            Ok(())
        }
    }
}
