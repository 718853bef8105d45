//! Totals command - show the derived invoice totals.

use std::path::PathBuf;

use clap::Args;

use invgen_core::invoice::format_amount;

use super::load_invoice;

/// Arguments for the totals command.
#[derive(Args)]
pub struct TotalsArgs {
    /// Invoice file
    file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Plain text summary
    Text,
    /// JSON output
    Json,
}

pub fn run(args: TotalsArgs) -> anyhow::Result<()> {
    let invoice = load_invoice(&args.file)?;
    let totals = invoice.totals();

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&totals)?),
        OutputFormat::Text => {
            println!("Subtotal: {}", format_amount(totals.subtotal));
            println!("Tax ({}%): {}", invoice.tax_rate(), format_amount(totals.tax_amount));
            println!("Total: {}", format_amount(totals.total));
        }
    }

    Ok(())
}
