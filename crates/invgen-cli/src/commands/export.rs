//! Export and print commands - turn the rendered preview into output.

use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use invgen_core::{InvgenConfig, LopdfAssembler, PdfExporter};

use super::load_invoice;
use crate::host::{CommandPrinter, ConsoleNotifier, DirectorySink, ImageFileRasterizer};

/// Arguments for the export command.
#[derive(Args)]
pub struct ExportArgs {
    /// Invoice file
    file: PathBuf,

    /// Rendered preview image (PNG, JPG) at 1x pixel density
    #[arg(short, long)]
    preview: PathBuf,

    /// Directory to save the PDF into
    #[arg(short, long, default_value = ".")]
    out_dir: PathBuf,
}

/// Arguments for the print command.
#[derive(Args)]
pub struct PrintArgs {
    /// Rendered preview file to print
    #[arg(short, long)]
    preview: PathBuf,

    /// Print spooler command
    #[arg(long, default_value = "lp")]
    command: String,
}

pub async fn run(args: ExportArgs, config: &InvgenConfig) -> anyhow::Result<()> {
    let invoice = load_invoice(&args.file)?;
    if !args.preview.exists() {
        anyhow::bail!("Preview file not found: {}", args.preview.display());
    }

    let exporter = PdfExporter::new(&config.export, config.notifications.duration_ms);
    let rasterizer = ImageFileRasterizer::new(&args.preview);
    let mut sink = DirectorySink::new(&args.out_dir);

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message("Generating...");

    let result = exporter
        .download(
            &invoice.invoice_number,
            &rasterizer,
            LopdfAssembler::a4(),
            &mut sink,
            &ConsoleNotifier,
        )
        .await;
    pb.finish_and_clear();
    debug!("Export state after download: {:?}", exporter.state());

    result?;
    for path in sink.saved() {
        debug!("Wrote {}", path.display());
    }
    Ok(())
}

pub fn print(args: PrintArgs, config: &InvgenConfig) -> anyhow::Result<()> {
    if !args.preview.exists() {
        anyhow::bail!("Preview file not found: {}", args.preview.display());
    }

    let exporter = PdfExporter::new(&config.export, config.notifications.duration_ms);
    exporter.print(&CommandPrinter::new(args.command, args.preview))?;
    Ok(())
}
