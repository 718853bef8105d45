//! Configuration structures for invoice defaults, logo limits, and export.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{InvgenError, Result};
use crate::export::RasterOptions;

/// Main configuration for invgen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvgenConfig {
    /// Defaults applied to freshly created invoices.
    pub defaults: DefaultsConfig,

    /// Logo upload limits.
    pub logo: LogoConfig,

    /// PDF export settings.
    pub export: ExportConfig,

    /// Notification settings.
    pub notifications: NotificationConfig,
}

/// Defaults for new invoices.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    /// Prefix of the generated invoice number.
    pub invoice_prefix: String,

    /// Number of trailing timestamp digits in the generated invoice number.
    pub number_digits: usize,

    /// Tax rate in percent.
    pub tax_rate: f64,

    /// Days between issue date and due date.
    pub due_in_days: i64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            invoice_prefix: "INV-".to_string(),
            number_digits: 6,
            tax_rate: 10.0,
            due_in_days: 30,
        }
    }
}

/// Logo upload configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogoConfig {
    /// Files of this size or larger are rejected.
    pub max_bytes: u64,
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            max_bytes: crate::invoice::logo::MAX_LOGO_BYTES,
        }
    }
}

/// PDF export configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Pixel-density multiplier used when rasterizing the preview.
    pub scale: f64,

    /// Load cross-origin images through CORS.
    pub use_cors: bool,

    /// Allow cross-origin images to taint the canvas.
    pub allow_taint: bool,

    /// Let the rasterizer emit its own logging.
    pub logging: bool,

    /// Prefix of the saved file name, followed by the invoice number.
    pub filename_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            scale: 2.0,
            use_cors: true,
            allow_taint: true,
            logging: false,
            filename_prefix: "Invoice-".to_string(),
        }
    }
}

impl ExportConfig {
    /// Rasterization options derived from this configuration.
    pub fn raster_options(&self) -> RasterOptions {
        RasterOptions {
            scale: self.scale,
            use_cors: self.use_cors,
            allow_taint: self.allow_taint,
            logging: self.logging,
        }
    }
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// How long a toast stays visible, in milliseconds.
    pub duration_ms: u32,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { duration_ms: 5000 }
    }
}

impl InvgenConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| InvgenError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
