//! WASM bindings for the invoice form.
//!
//! This crate exposes the in-memory invoice session to a browser page. The
//! page renders the preview itself and hands over a rasterizer and a save
//! callback for PDF export.

use std::cell::RefCell;
use std::rc::Rc;

use image::RgbaImage;
use js_sys::{Function, Promise, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::Clamped;
use wasm_bindgen_futures::{JsFuture, future_to_promise};

use invgen_core::error::{ExportError, LogoError};
use invgen_core::export::{DocumentSink, Printer, RasterOptions, Rasterizer};
use invgen_core::{
    Invoice, InvoiceField, InvgenConfig, LineField, LogoIngestor, LogoUpload, LopdfAssembler,
    Notifier, PdfExporter, Severity, Toast,
};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// The invoice being composed on the page, with its export state.
#[wasm_bindgen]
pub struct InvoiceForm {
    invoice: Rc<RefCell<Invoice>>,
    exporter: Rc<PdfExporter>,
    ingestor: LogoIngestor,
    notifier: Rc<RefCell<Option<Function>>>,
    toast_duration_ms: u32,
}

#[wasm_bindgen]
impl InvoiceForm {
    /// Start a new session, optionally from a JSON configuration.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<InvoiceForm, JsValue> {
        let config = match config {
            Some(json) => InvgenConfig::from_json(&json).map_err(to_js)?,
            None => InvgenConfig::default(),
        };
        let toast_duration_ms = config.notifications.duration_ms;

        Ok(Self {
            invoice: Rc::new(RefCell::new(Invoice::from_defaults(&config.defaults))),
            exporter: Rc::new(PdfExporter::new(&config.export, toast_duration_ms)),
            ingestor: LogoIngestor::new(config.logo.max_bytes),
            notifier: Rc::new(RefCell::new(None)),
            toast_duration_ms,
        })
    }

    /// Register the callback that receives toasts as plain objects.
    #[wasm_bindgen]
    pub fn set_notifier(&self, callback: Function) {
        *self.notifier.borrow_mut() = Some(callback);
    }

    /// The whole invoice as a plain object.
    #[wasm_bindgen]
    pub fn invoice(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&*self.invoice.borrow()).map_err(to_js)
    }

    #[wasm_bindgen(getter)]
    pub fn invoice_number(&self) -> String {
        self.invoice.borrow().invoice_number.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn date(&self) -> String {
        self.invoice.borrow().date.format("%Y-%m-%d").to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn due_date(&self) -> String {
        self.invoice.borrow().due_date.format("%Y-%m-%d").to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn notes(&self) -> String {
        self.invoice.borrow().notes.clone()
    }

    #[wasm_bindgen(getter)]
    pub fn tax_rate(&self) -> f64 {
        self.invoice.borrow().tax_rate()
    }

    #[wasm_bindgen(getter)]
    pub fn company_logo(&self) -> Option<String> {
        self.invoice.borrow().company_logo.clone()
    }

    /// Set an invoice field from form input, e.g. `("client.email", "a@b.c")`.
    #[wasm_bindgen]
    pub fn set_field(&self, field: &str, value: &str) -> Result<(), JsValue> {
        let field: InvoiceField = field.parse().map_err(to_js)?;
        self.invoice
            .borrow_mut()
            .set_field(field, value)
            .map_err(to_js)
    }

    /// Append a blank line item and return its identifier.
    #[wasm_bindgen]
    pub fn add_line_item(&self) -> String {
        self.invoice.borrow_mut().add_line_item().to_string()
    }

    /// Remove a line item. The last remaining item is kept.
    #[wasm_bindgen]
    pub fn remove_line_item(&self, id: &str) -> bool {
        self.invoice.borrow_mut().remove_line_item(id)
    }

    /// Update `description`, `quantity` or `rate` of a line item.
    #[wasm_bindgen]
    pub fn update_line_item(&self, id: &str, field: &str, value: &str) -> Result<bool, JsValue> {
        let field: LineField = field.parse().map_err(to_js)?;
        Ok(self
            .invoice
            .borrow_mut()
            .update_line_item(id, field.update_from(value)))
    }

    #[wasm_bindgen]
    pub fn line_items(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.invoice.borrow().line_items()).map_err(to_js)
    }

    #[wasm_bindgen]
    pub fn totals(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.invoice.borrow().totals()).map_err(to_js)
    }

    /// Render the preview markup.
    #[wasm_bindgen]
    pub fn preview_html(&self) -> Result<String, JsValue> {
        invgen_core::render_preview_html(&self.invoice.borrow()).map_err(to_js)
    }

    /// Read an image file into the logo.
    ///
    /// The logo is replaced only once the file has been read. A rejected
    /// file leaves the current logo in place.
    #[wasm_bindgen]
    pub fn upload_logo(&self, file: web_sys::File) -> Promise {
        let invoice = Rc::clone(&self.invoice);
        let notifier = self.current_notifier();
        let ingestor = self.ingestor;
        let duration_ms = self.toast_duration_ms;

        future_to_promise(async move {
            match ingestor.ingest(&BrowserFile(file)).await {
                Ok(data_uri) => {
                    invoice.borrow_mut().set_logo(data_uri);
                    Ok(JsValue::UNDEFINED)
                }
                Err(err) => {
                    notifier.notify(Toast::logo_rejected(&err, duration_ms));
                    Err(to_js(err))
                }
            }
        })
    }

    #[wasm_bindgen]
    pub fn remove_logo(&self) {
        self.invoice.borrow_mut().remove_logo();
    }

    /// Whether a PDF is being generated.
    #[wasm_bindgen(getter)]
    pub fn is_generating(&self) -> bool {
        self.exporter.is_generating()
    }

    /// Export the preview as a PDF.
    ///
    /// `rasterize(options)` returns an `ImageData` (or a promise of one) of
    /// the rendered preview. `save(filename, bytes)` receives the finished
    /// document. Resolves to the file name.
    #[wasm_bindgen]
    pub fn download_pdf(&self, rasterize: Function, save: Function) -> Promise {
        let exporter = Rc::clone(&self.exporter);
        let notifier = self.current_notifier();
        let invoice_number = self.invoice.borrow().invoice_number.clone();

        future_to_promise(async move {
            let mut sink = CallbackSink(save);
            exporter
                .download(
                    &invoice_number,
                    &CanvasRasterizer(rasterize),
                    LopdfAssembler::a4(),
                    &mut sink,
                    &notifier,
                )
                .await
                .map(|filename| JsValue::from_str(&filename))
                .map_err(to_js)
        })
    }

    /// Open the browser print dialog.
    #[wasm_bindgen]
    pub fn print(&self) -> Result<(), JsValue> {
        self.exporter.print(&WindowPrinter).map_err(to_js)
    }

    fn current_notifier(&self) -> PageNotifier {
        PageNotifier(self.notifier.borrow().clone())
    }
}

/// A `File` picked through an `<input type="file">`.
struct BrowserFile(web_sys::File);

impl LogoUpload for BrowserFile {
    fn media_type(&self) -> String {
        self.0.type_()
    }

    fn size(&self) -> u64 {
        self.0.size() as u64
    }

    async fn read(&self) -> Result<Vec<u8>, LogoError> {
        let buffer = JsFuture::from(self.0.array_buffer())
            .await
            .map_err(|e| LogoError::Read(format!("{:?}", e)))?;
        Ok(Uint8Array::new(&buffer).to_vec())
    }
}

/// Calls back into the page to rasterize the preview.
struct CanvasRasterizer(Function);

impl Rasterizer for CanvasRasterizer {
    async fn rasterize(&self, options: &RasterOptions) -> Result<RgbaImage, ExportError> {
        let fail = |e: JsValue| ExportError::Rasterize(format!("{:?}", e));

        let options = serde_wasm_bindgen::to_value(options)
            .map_err(|e| ExportError::Rasterize(e.to_string()))?;
        let returned = self.0.call1(&JsValue::NULL, &options).map_err(fail)?;
        let resolved = JsFuture::from(Promise::resolve(&returned))
            .await
            .map_err(fail)?;

        let image_data: web_sys::ImageData = resolved.dyn_into().map_err(|_| {
            ExportError::Rasterize("rasterizer did not return ImageData".to_string())
        })?;
        let Clamped(pixels) = image_data.data();
        RgbaImage::from_raw(image_data.width(), image_data.height(), pixels).ok_or_else(|| {
            ExportError::Rasterize("ImageData size does not match its dimensions".to_string())
        })
    }
}

/// Hands the finished document to a page callback.
struct CallbackSink(Function);

impl DocumentSink for CallbackSink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<(), ExportError> {
        self.0
            .call2(
                &JsValue::NULL,
                &JsValue::from_str(filename),
                &Uint8Array::from(bytes),
            )
            .map_err(|e| ExportError::Save(format!("{:?}", e)))?;
        Ok(())
    }
}

struct WindowPrinter;

impl Printer for WindowPrinter {
    fn print(&self) -> Result<(), ExportError> {
        let window =
            web_sys::window().ok_or_else(|| ExportError::Print("no window".to_string()))?;
        window
            .print()
            .map_err(|e| ExportError::Print(format!("{:?}", e)))
    }
}

/// Delivers toasts to the registered callback, or to the console.
struct PageNotifier(Option<Function>);

impl Notifier for PageNotifier {
    fn notify(&self, toast: Toast) {
        let Some(callback) = &self.0 else {
            let line = JsValue::from_str(&format!("{}: {}", toast.title, toast.description));
            match toast.severity {
                Severity::Normal => web_sys::console::log_1(&line),
                Severity::Destructive => web_sys::console::error_1(&line),
            }
            return;
        };

        let delivered = serde_wasm_bindgen::to_value(&toast)
            .map_err(|e| JsValue::from_str(&e.to_string()))
            .and_then(|value| callback.call1(&JsValue::NULL, &value));
        if let Err(e) = delivered {
            web_sys::console::error_1(&e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_new_form() {
        let form = InvoiceForm::new(None).unwrap();
        assert!(form.invoice_number().starts_with("INV-"));
        assert_eq!(form.tax_rate(), 10.0);
        assert!(!form.is_generating());
        assert!(form.company_logo().is_none());
    }

    #[wasm_bindgen_test]
    fn test_line_items_never_empty() {
        let form = InvoiceForm::new(None).unwrap();
        let id = form.add_line_item();
        assert_eq!(id, "2");
        assert!(form.remove_line_item("1"));
        assert!(!form.remove_line_item("2"));
    }

    #[wasm_bindgen_test]
    fn test_update_and_preview() {
        let form = InvoiceForm::new(None).unwrap();
        form.set_field("client.name", "Globex").unwrap();
        assert!(form.update_line_item("1", "quantity", "2").unwrap());
        assert!(form.update_line_item("1", "rate", "50").unwrap());
        assert!(form.update_line_item("1", "colour", "red").is_err());

        let html = form.preview_html().unwrap();
        assert!(html.contains("Globex"));
        assert!(html.contains("110.00"));
    }

    #[wasm_bindgen_test]
    fn test_config_overrides() {
        let form = InvoiceForm::new(Some(r#"{"defaults":{"tax_rate":23}}"#.to_string())).unwrap();
        assert_eq!(form.tax_rate(), 23.0);
        assert!(InvoiceForm::new(Some("not json".to_string())).is_err());
    }
}
