//! Set command - replace an invoice-level field.

use std::path::PathBuf;

use clap::Args;
use console::style;

use invgen_core::InvoiceField;

use super::{load_invoice, save_invoice};

/// Arguments for the set command.
#[derive(Args)]
pub struct SetArgs {
    /// Invoice file
    file: PathBuf,

    /// Field: number, date, due-date, company.name, company.address,
    /// company.email, company.phone, client.name, client.address,
    /// client.email, client.phone, notes, tax-rate
    field: String,

    /// New value (dates as YYYY-MM-DD)
    #[arg(allow_hyphen_values = true)]
    value: String,
}

pub fn run(args: SetArgs) -> anyhow::Result<()> {
    let field: InvoiceField = args.field.parse()?;
    let mut invoice = load_invoice(&args.file)?;

    invoice.set_field(field, &args.value)?;
    save_invoice(&args.file, &invoice)?;

    println!("{} Set {} = {:?}", style("✓").green(), args.field, args.value);
    if field == InvoiceField::TaxRate {
        println!("  tax rate is now {}%", invoice.tax_rate());
    }

    Ok(())
}
