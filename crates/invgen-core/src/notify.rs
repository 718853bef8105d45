//! Fire-and-forget user notifications.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::LogoError;

/// Visual weight of a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Normal,
    Destructive,
}

/// A transient message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub severity: Severity,
    pub duration_ms: u32,
}

impl Toast {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        duration_ms: u32,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
            duration_ms,
        }
    }

    pub fn pdf_generated(filename: &str, duration_ms: u32) -> Self {
        Self::new(
            "PDF Generated Successfully",
            format!("{} has been downloaded.", filename),
            Severity::Normal,
            duration_ms,
        )
    }

    pub fn pdf_failed(duration_ms: u32) -> Self {
        Self::new(
            "Error Generating PDF",
            "There was a problem creating your PDF. Please try again.",
            Severity::Destructive,
            duration_ms,
        )
    }

    /// The message for a rejected or unreadable logo upload.
    pub fn logo_rejected(err: &LogoError, duration_ms: u32) -> Self {
        match err {
            LogoError::TooLarge { .. } => Self::new(
                "File Too Large",
                "Please select an image file smaller than 2MB",
                Severity::Destructive,
                duration_ms,
            ),
            LogoError::InvalidType(_) => Self::new(
                "Invalid File Type",
                "Please select a valid image file (PNG, JPG, etc.)",
                Severity::Destructive,
                duration_ms,
            ),
            LogoError::Read(reason) => Self::new(
                "Could Not Read File",
                reason.clone(),
                Severity::Destructive,
                duration_ms,
            ),
        }
    }
}

/// Receives notifications. Delivery is best-effort and nothing is returned.
pub trait Notifier {
    fn notify(&self, toast: Toast);
}

impl<F: Fn(Toast)> Notifier for F {
    fn notify(&self, toast: Toast) {
        self(toast)
    }
}

/// Writes notifications to the tracing log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.severity {
            Severity::Normal => info!("{}: {}", toast.title, toast.description),
            Severity::Destructive => warn!("{}: {}", toast.title, toast.description),
        }
    }
}
