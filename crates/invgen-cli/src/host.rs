//! Terminal-side implementations of the export and upload collaborators.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use console::style;
use image::RgbaImage;
use image::imageops::{self, FilterType};
use tracing::debug;

use invgen_core::error::{ExportError, LogoError};
use invgen_core::export::{DocumentSink, Printer, RasterOptions, Rasterizer};
use invgen_core::{LogoUpload, Notifier, Severity, Toast};

/// Rasterizes a preview that was already rendered to an image file.
///
/// The file is taken to be at 1x pixel density and is resampled by the
/// requested multiplier.
pub struct ImageFileRasterizer {
    path: PathBuf,
}

impl ImageFileRasterizer {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Rasterizer for ImageFileRasterizer {
    async fn rasterize(&self, options: &RasterOptions) -> Result<RgbaImage, ExportError> {
        let data = tokio::fs::read(&self.path).await.map_err(|e| {
            ExportError::Rasterize(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        let image = image::load_from_memory(&data)?.to_rgba8();

        let scale = if options.scale.is_finite() && options.scale > 0.0 {
            options.scale
        } else {
            1.0
        };
        if (scale - 1.0).abs() < f64::EPSILON {
            return Ok(image);
        }

        let width = ((f64::from(image.width()) * scale).round() as u32).max(1);
        let height = ((f64::from(image.height()) * scale).round() as u32).max(1);
        debug!(
            "Resampling preview {}x{} -> {}x{}",
            image.width(),
            image.height(),
            width,
            height
        );
        Ok(imageops::resize(&image, width, height, FilterType::Triangle))
    }
}

/// Saves documents into a directory.
pub struct DirectorySink {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            saved: Vec::new(),
        }
    }

    /// Paths written so far.
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl DocumentSink for DirectorySink {
    fn save(&mut self, filename: &str, bytes: &[u8]) -> Result<(), ExportError> {
        let name = safe_file_name(filename)
            .ok_or_else(|| ExportError::Save(format!("unusable file name: {}", filename)))?;
        let path = self.dir.join(name);
        fs::write(&path, bytes)
            .map_err(|e| ExportError::Save(format!("{}: {}", path.display(), e)))?;
        self.saved.push(path);
        Ok(())
    }
}

/// Reduce a document name to a single file name inside the target directory.
///
/// Path separators and characters that are not allowed in file names become `_`.
fn safe_file_name(filename: &str) -> Option<String> {
    let replaced: String = filename
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    Path::new(&replaced)
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
}

/// Hands a file to the system print spooler.
pub struct CommandPrinter {
    program: String,
    file: PathBuf,
}

impl CommandPrinter {
    pub fn new(program: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            file: file.into(),
        }
    }
}

impl Printer for CommandPrinter {
    fn print(&self) -> Result<(), ExportError> {
        let status = Command::new(&self.program)
            .arg(&self.file)
            .status()
            .map_err(|e| ExportError::Print(format!("failed to run {}: {}", self.program, e)))?;
        if !status.success() {
            return Err(ExportError::Print(format!("{} exited with {}", self.program, status)));
        }
        Ok(())
    }
}

/// A logo upload backed by a file on disk.
pub struct FileUpload {
    path: PathBuf,
    media_type: String,
    size: u64,
}

impl FileUpload {
    /// Inspect a file without reading its contents.
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let size = fs::metadata(path)?.len();
        let media_type = media_type_of(path);
        Ok(Self {
            path: path.to_path_buf(),
            media_type,
            size,
        })
    }
}

/// Media type from the file extension, the way a browser file picker reports it.
fn media_type_of(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    if matches!(extension.as_deref(), Some("svg" | "svgz")) {
        return "image/svg+xml".to_string();
    }
    image::ImageFormat::from_path(path)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| "application/octet-stream".to_string())
}

impl LogoUpload for FileUpload {
    fn media_type(&self) -> String {
        self.media_type.clone()
    }

    fn size(&self) -> u64 {
        self.size
    }

    async fn read(&self) -> Result<Vec<u8>, LogoError> {
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| LogoError::Read(format!("{}: {}", self.path.display(), e)))
    }
}

/// Prints notifications to the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, toast: Toast) {
        match toast.severity {
            Severity::Normal => println!(
                "{} {} - {}",
                style("✓").green(),
                style(&toast.title).bold(),
                toast.description
            ),
            Severity::Destructive => eprintln!(
                "{} {} - {}",
                style("✗").red(),
                style(&toast.title).bold(),
                toast.description
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[tokio::test]
    async fn test_rasterizer_scales() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.png");
        RgbaImage::from_pixel(10, 20, Rgba([1, 2, 3, 255])).save(&path).unwrap();

        let rasterizer = ImageFileRasterizer::new(&path);
        let image = rasterizer.rasterize(&RasterOptions::default()).await.unwrap();
        assert_eq!(image.dimensions(), (20, 40));

        let options = RasterOptions {
            scale: 1.0,
            ..RasterOptions::default()
        };
        let image = rasterizer.rasterize(&options).await.unwrap();
        assert_eq!(image.dimensions(), (10, 20));
    }

    #[tokio::test]
    async fn test_rasterizer_missing_file() {
        let err = ImageFileRasterizer::new("/nonexistent/preview.png")
            .rasterize(&RasterOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ExportError::Rasterize(_)));
    }

    #[test]
    fn test_file_upload_media_type() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("logo.png");
        let txt = dir.path().join("notes.txt");
        fs::write(&png, b"123").unwrap();
        fs::write(&txt, b"hello").unwrap();

        let upload = FileUpload::open(&png).unwrap();
        assert_eq!(upload.media_type(), "image/png");
        assert_eq!(upload.size(), 3);
        assert_eq!(FileUpload::open(&txt).unwrap().media_type(), "application/octet-stream");
    }

    #[test]
    fn test_svg_media_type() {
        assert_eq!(media_type_of(Path::new("logo.svg")), "image/svg+xml");
        assert_eq!(media_type_of(Path::new("LOGO.SVG")), "image/svg+xml");
        assert_eq!(media_type_of(Path::new("logo.jpg")), "image/jpeg");
    }

    #[test]
    fn test_directory_sink() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());
        sink.save("Invoice-1.pdf", b"%PDF").unwrap();
        assert_eq!(fs::read(dir.path().join("Invoice-1.pdf")).unwrap(), b"%PDF");
        assert_eq!(sink.saved().len(), 1);
    }

    #[test]
    fn test_directory_sink_keeps_names_inside_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = DirectorySink::new(dir.path());

        sink.save("Invoice-INV/2024/001.pdf", b"%PDF").unwrap();
        sink.save("Invoice-x/../../y.pdf", b"%PDF").unwrap();

        assert!(dir.path().join("Invoice-INV_2024_001.pdf").exists());
        assert!(dir.path().join("Invoice-x_.._.._y.pdf").exists());
        assert!(sink.saved().iter().all(|path| path.parent() == Some(dir.path())));
    }

    #[test]
    fn test_safe_file_name() {
        assert_eq!(safe_file_name("Invoice-42.pdf").as_deref(), Some("Invoice-42.pdf"));
        assert_eq!(safe_file_name("Invoice-a:b?.pdf").as_deref(), Some("Invoice-a_b_.pdf"));
        assert_eq!(safe_file_name(".."), None);
    }
}
