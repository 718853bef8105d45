//! New command - create an invoice file with default values.

use std::path::PathBuf;

use clap::Args;
use console::style;

use invgen_core::{Invoice, InvgenConfig};

use super::save_invoice;

/// Arguments for the new command.
#[derive(Args)]
pub struct NewArgs {
    /// Output invoice file
    #[arg(short, long, default_value = "invoice.json")]
    output: PathBuf,

    /// Invoice number (default: generated from the current time)
    #[arg(short, long)]
    number: Option<String>,

    /// Overwrite existing file
    #[arg(long)]
    force: bool,
}

pub fn run(args: NewArgs, config: &InvgenConfig) -> anyhow::Result<()> {
    if args.output.exists() && !args.force {
        anyhow::bail!(
            "Invoice file already exists at {}. Use --force to overwrite.",
            args.output.display()
        );
    }

    let mut invoice = Invoice::from_defaults(&config.defaults);
    if let Some(number) = args.number {
        invoice.invoice_number = number;
    }
    save_invoice(&args.output, &invoice)?;

    println!(
        "{} Created invoice {} at {}",
        style("✓").green(),
        style(&invoice.invoice_number).cyan().bold(),
        args.output.display()
    );

    Ok(())
}
