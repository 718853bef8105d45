//! Printing and PDF export of the rendered invoice preview.
//!
//! The pipeline does not render anything itself. It drives three
//! collaborators:
//! - a [`Rasterizer`] turning the rendered preview into pixels
//! - a [`PdfAssembler`] laying those pixels out on fixed-size pages
//! - a [`DocumentSink`] handing the finished file to the user

mod assembler;
mod layout;
mod pipeline;

pub use assembler::LopdfAssembler;
pub use layout::{fit_to_width, paginate};
pub use pipeline::{ExportState, PdfExporter, invoice_filename};

use std::rc::Rc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::error::ExportError;

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

/// Options passed to the rasterizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterOptions {
    /// Pixel-density multiplier.
    pub scale: f64,
    /// Load cross-origin images through CORS.
    #[serde(rename = "useCORS")]
    pub use_cors: bool,
    /// Allow cross-origin images to taint the canvas.
    #[serde(rename = "allowTaint")]
    pub allow_taint: bool,
    /// Rasterizer-side logging.
    pub logging: bool,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 2.0,
            use_cors: true,
            allow_taint: true,
            logging: false,
        }
    }
}

/// Physical page size in millimetres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PageSize {
    /// ISO A4, portrait.
    pub const A4: PageSize = PageSize {
        width_mm: 210.0,
        height_mm: 297.0,
    };
}

/// Where an image is drawn on a page, in millimetres from the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Turns the rendered preview into a pixel buffer.
#[allow(async_fn_in_trait)]
pub trait Rasterizer {
    async fn rasterize(&self, options: &RasterOptions) -> Result<RgbaImage>;
}

/// Arranges raster images onto pages of a document.
///
/// A fresh assembler holds one empty page; images are drawn on the most
/// recently added page.
pub trait PdfAssembler {
    /// Draw an image on the current page.
    ///
    /// Passing the same `Rc` again draws the same image without embedding
    /// it a second time.
    fn add_image(&mut self, image: &Rc<RgbaImage>, placement: Placement) -> Result<()>;

    /// Start a new page and make it current.
    fn add_page(&mut self);

    /// Page height in millimetres.
    fn page_height(&self) -> f64;

    /// Serialize the finished document.
    fn finish(self) -> Result<Vec<u8>>;
}

/// Receives a finished document under its file name.
pub trait DocumentSink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<()>;
}

/// Opens the platform print dialog for the current preview.
pub trait Printer {
    fn print(&self) -> Result<()>;
}
