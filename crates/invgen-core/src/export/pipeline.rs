//! Download-PDF orchestration and its Idle/Generating state.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::layout::{fit_to_width, paginate};
use super::{
    DocumentSink, PageSize, PdfAssembler, Placement, Printer, RasterOptions, Rasterizer, Result,
};
use crate::error::ExportError;
use crate::models::config::ExportConfig;
use crate::notify::{Notifier, Toast};

/// Whether a PDF is being generated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportState {
    #[default]
    Idle,
    Generating,
}

/// `<prefix><invoice number>.pdf`, e.g. `Invoice-INV-123456.pdf`.
pub fn invoice_filename(prefix: &str, invoice_number: &str) -> String {
    format!("{}{}.pdf", prefix, invoice_number)
}

/// Orchestrates printing and PDF export of the rendered preview.
///
/// The state is advisory: it is for the UI to disable its trigger while a
/// document is being generated, and [`PdfExporter::download`] does not refuse
/// to run while already generating.
#[derive(Debug)]
pub struct PdfExporter {
    options: RasterOptions,
    filename_prefix: String,
    page_size: PageSize,
    toast_duration_ms: u32,
    state: Cell<ExportState>,
}

impl PdfExporter {
    pub fn new(config: &ExportConfig, toast_duration_ms: u32) -> Self {
        Self {
            options: config.raster_options(),
            filename_prefix: config.filename_prefix.clone(),
            page_size: PageSize::A4,
            toast_duration_ms,
            state: Cell::new(ExportState::Idle),
        }
    }

    pub fn state(&self) -> ExportState {
        self.state.get()
    }

    pub fn is_generating(&self) -> bool {
        self.state() == ExportState::Generating
    }

    /// Open the print dialog. No layout of its own; the host paginates.
    pub fn print(&self, printer: &impl Printer) -> Result<()> {
        printer.print()
    }

    /// Rasterize the preview, lay it out on pages, and save it.
    ///
    /// Moves to Generating for the duration of the call and back to Idle
    /// however it ends. Success and failure are both reported through the
    /// notifier; nothing reaches the sink unless assembly succeeded.
    pub async fn download<R, A, S>(
        &self,
        invoice_number: &str,
        rasterizer: &R,
        assembler: A,
        sink: &mut S,
        notifier: &dyn Notifier,
    ) -> Result<String>
    where
        R: Rasterizer,
        A: PdfAssembler,
        S: DocumentSink,
    {
        let _generating = GeneratingGuard::enter(&self.state);
        let filename = invoice_filename(&self.filename_prefix, invoice_number);

        match self.generate(&filename, rasterizer, assembler, sink).await {
            Ok(()) => {
                info!("Saved {}", filename);
                notifier.notify(Toast::pdf_generated(&filename, self.toast_duration_ms));
                Ok(filename)
            }
            Err(err) => {
                error!("Error generating PDF: {}", err);
                notifier.notify(Toast::pdf_failed(self.toast_duration_ms));
                Err(err)
            }
        }
    }

    async fn generate<R, A, S>(
        &self,
        filename: &str,
        rasterizer: &R,
        mut assembler: A,
        sink: &mut S,
    ) -> Result<()>
    where
        R: Rasterizer,
        A: PdfAssembler,
        S: DocumentSink,
    {
        let image = Rc::new(rasterizer.rasterize(&self.options).await?);
        let image_width = self.page_size.width_mm;
        let image_height =
            fit_to_width(image.width(), image.height(), image_width).ok_or_else(|| {
                ExportError::Rasterize("preview rendered to an empty image".to_string())
            })?;

        let offsets = paginate(image_height, assembler.page_height());
        for (page, y) in offsets.iter().enumerate() {
            if page > 0 {
                assembler.add_page();
            }
            assembler.add_image(
                &image,
                Placement {
                    x: 0.0,
                    y: *y,
                    width: image_width,
                    height: image_height,
                },
            )?;
        }

        let bytes = assembler.finish()?;
        sink.save(filename, &bytes)
    }
}

impl Default for PdfExporter {
    fn default() -> Self {
        Self::new(&ExportConfig::default(), 5000)
    }
}

/// Holds the Generating state until dropped, including on early return
/// and when the download future is abandoned.
struct GeneratingGuard<'a> {
    state: &'a Cell<ExportState>,
}

impl<'a> GeneratingGuard<'a> {
    fn enter(state: &'a Cell<ExportState>) -> Self {
        state.set(ExportState::Generating);
        Self { state }
    }
}

impl Drop for GeneratingGuard<'_> {
    fn drop(&mut self) {
        self.state.set(ExportState::Idle);
    }
}
