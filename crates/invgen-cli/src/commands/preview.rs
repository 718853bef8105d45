//! Preview command - render the invoice as HTML.

use std::fs;
use std::path::PathBuf;

use clap::Args;
use console::style;

use invgen_core::render_preview_html;

use super::load_invoice;

/// Arguments for the preview command.
#[derive(Args)]
pub struct PreviewArgs {
    /// Invoice file
    file: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

pub fn run(args: PreviewArgs) -> anyhow::Result<()> {
    let invoice = load_invoice(&args.file)?;
    let html = render_preview_html(&invoice)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &html)?;
        println!(
            "{} Preview written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        print!("{}", html);
    }

    Ok(())
}
