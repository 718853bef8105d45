//! Logo command - set or remove the company logo.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;
use tracing::info;

use invgen_core::{InvgenConfig, LogoIngestor, Notifier, Toast};

use super::{load_invoice, save_invoice};
use crate::host::{ConsoleNotifier, FileUpload};

/// Arguments for the logo command.
#[derive(Args)]
pub struct LogoArgs {
    #[command(subcommand)]
    command: LogoCommand,
}

#[derive(Subcommand)]
enum LogoCommand {
    /// Embed an image file as the company logo
    Set {
        /// Invoice file
        file: PathBuf,
        /// Image file (PNG, JPG, etc.)
        image: PathBuf,
    },

    /// Remove the company logo
    Remove {
        /// Invoice file
        file: PathBuf,
    },
}

pub async fn run(args: LogoArgs, config: &InvgenConfig) -> anyhow::Result<()> {
    match args.command {
        LogoCommand::Set { file, image } => set_logo(file, image, config).await,
        LogoCommand::Remove { file } => {
            let mut invoice = load_invoice(&file)?;
            invoice.remove_logo();
            save_invoice(&file, &invoice)?;
            println!("{} Removed logo", style("✓").green());
            Ok(())
        }
    }
}

async fn set_logo(file: PathBuf, image: PathBuf, config: &InvgenConfig) -> anyhow::Result<()> {
    let mut invoice = load_invoice(&file)?;
    let upload = FileUpload::open(&image)?;
    let ingestor = LogoIngestor::new(config.logo.max_bytes);

    match ingestor.ingest(&upload).await {
        Ok(data_uri) => {
            info!("Encoded logo: {} characters", data_uri.len());
            invoice.set_logo(data_uri);
            save_invoice(&file, &invoice)?;
            println!("{} Logo set from {}", style("✓").green(), image.display());
            Ok(())
        }
        Err(err) => {
            ConsoleNotifier.notify(Toast::logo_rejected(&err, config.notifications.duration_ms));
            Err(err.into())
        }
    }
}
