//! Core library for composing invoices and exporting them as documents.
//!
//! This crate provides:
//! - The invoice model (parties, dates, line items, notes, tax rate)
//! - Derived totals (subtotal, tax amount, grand total)
//! - Company logo ingestion into inline data URIs
//! - The PDF export pipeline (rasterize, paginate, assemble, save)
//! - HTML preview rendering and user-facing notifications

pub mod error;
pub mod export;
pub mod invoice;
pub mod models;
pub mod notify;
pub mod preview;

pub use error::{ExportError, InvgenError, LogoError, Result};
pub use export::{
    DocumentSink, ExportState, LopdfAssembler, PdfAssembler, PdfExporter, Printer, RasterOptions,
    Rasterizer,
};
pub use invoice::{LogoIngestor, LogoUpload, Totals};
pub use models::config::InvgenConfig;
pub use models::invoice::{
    Invoice, InvoiceField, LineField, LineItem, LineItemId, LineUpdate, Party,
};
pub use notify::{Notifier, Severity, Toast, TracingNotifier};
pub use preview::render_preview_html;
