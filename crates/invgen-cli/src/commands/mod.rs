//! Subcommands of the `invgen` binary.
//!
//! Every command except `new` and `config` works on an invoice file: the
//! JSON form of the invoice, read at the start and written back after a
//! change.

pub mod config;
pub mod export;
pub mod item;
pub mod logo;
pub mod new;
pub mod preview;
pub mod set;
pub mod totals;

use std::fs;
use std::path::Path;

use anyhow::Context;
use invgen_core::Invoice;

/// Read an invoice file.
pub fn load_invoice(path: &Path) -> anyhow::Result<Invoice> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Invoice file not found: {}", path.display()))?;
    Invoice::from_json(&content)
        .with_context(|| format!("Invalid invoice file: {}", path.display()))
}

/// Write an invoice file.
pub fn save_invoice(path: &Path, invoice: &Invoice) -> anyhow::Result<()> {
    fs::write(path, invoice.to_json()?)?;
    Ok(())
}
