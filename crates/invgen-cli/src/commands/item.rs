//! Item command - manage line items.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use console::style;

use invgen_core::LineField;
use invgen_core::invoice::format_money;

use super::{load_invoice, save_invoice};

/// Arguments for the item command.
#[derive(Args)]
pub struct ItemArgs {
    #[command(subcommand)]
    command: ItemCommand,
}

#[derive(Subcommand)]
enum ItemCommand {
    /// Append a blank line item
    Add {
        /// Invoice file
        file: PathBuf,
    },

    /// Remove a line item (the last remaining item is kept)
    Remove {
        /// Invoice file
        file: PathBuf,
        /// Line item identifier
        id: String,
    },

    /// Update the description, quantity or rate of a line item
    Update {
        /// Invoice file
        file: PathBuf,
        /// Line item identifier
        id: String,
        /// Field: description, quantity, rate
        field: String,
        /// New value
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// List line items
    List {
        /// Invoice file
        file: PathBuf,
    },
}

pub fn run(args: ItemArgs) -> anyhow::Result<()> {
    match args.command {
        ItemCommand::Add { file } => {
            let mut invoice = load_invoice(&file)?;
            let id = invoice.add_line_item();
            save_invoice(&file, &invoice)?;
            println!("{} Added line item {}", style("✓").green(), style(id).cyan());
        }
        ItemCommand::Remove { file, id } => {
            let mut invoice = load_invoice(&file)?;
            if invoice.remove_line_item(&id) {
                save_invoice(&file, &invoice)?;
                println!("{} Removed line item {}", style("✓").green(), id);
            } else if invoice.line_item(&id).is_some() {
                println!(
                    "{} Line item {} is the only one left and was kept.",
                    style("⚠").yellow(),
                    id
                );
            } else {
                println!("{} No line item {}", style("ℹ").blue(), id);
            }
        }
        ItemCommand::Update {
            file,
            id,
            field,
            value,
        } => {
            let field: LineField = field.parse()?;
            let mut invoice = load_invoice(&file)?;
            if invoice.update_line_item(&id, field.update_from(&value)) {
                save_invoice(&file, &invoice)?;
                if let Some(item) = invoice.line_item(&id) {
                    println!(
                        "{} Line item {}: amount {}",
                        style("✓").green(),
                        id,
                        format_money(item.amount())
                    );
                }
            } else {
                println!("{} No line item {}", style("ℹ").blue(), id);
            }
        }
        ItemCommand::List { file } => {
            let invoice = load_invoice(&file)?;
            println!(
                "{:<6} {:<32} {:>10} {:>12} {:>12}",
                style("ID").bold(),
                style("Description").bold(),
                style("Qty").bold(),
                style("Rate").bold(),
                style("Amount").bold()
            );
            for item in invoice.line_items() {
                println!(
                    "{:<6} {:<32} {:>10} {:>12} {:>12}",
                    item.id().as_str(),
                    item.description(),
                    item.quantity(),
                    format_money(item.rate()),
                    format_money(item.amount())
                );
            }
        }
    }

    Ok(())
}
