//! CLI application for composing invoices and exporting them as PDF.

mod commands;
mod host;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use commands::{config, export, item, logo, new, preview, set, totals};

/// Invoice generator - compose invoices and export them as PDF
#[derive(Parser)]
#[command(name = "invgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new invoice file with default values
    New(new::NewArgs),

    /// Set an invoice-level field
    Set(set::SetArgs),

    /// Add, remove, update or list line items
    Item(item::ItemArgs),

    /// Set or remove the company logo
    Logo(logo::LogoArgs),

    /// Show subtotal, tax and total
    Totals(totals::TotalsArgs),

    /// Render the invoice preview as HTML
    Preview(preview::PreviewArgs),

    /// Export the rendered preview as a PDF
    Export(export::ExportArgs),

    /// Send the rendered preview to the printer
    Print(export::PrintArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let config_path = cli.config.as_deref();

    // Execute command
    match cli.command {
        Commands::New(args) => new::run(args, &config::load_config(config_path)?),
        Commands::Set(args) => set::run(args),
        Commands::Item(args) => item::run(args),
        Commands::Logo(args) => logo::run(args, &config::load_config(config_path)?).await,
        Commands::Totals(args) => totals::run(args),
        Commands::Preview(args) => preview::run(args),
        Commands::Export(args) => export::run(args, &config::load_config(config_path)?).await,
        Commands::Print(args) => export::print(args, &config::load_config(config_path)?),
        Commands::Config(args) => config::run(args, config_path),
    }
}
