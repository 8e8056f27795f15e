//! Turning input documents into raw text.
//!
//! The variant is chosen once, from configuration or the file extension, and
//! never re-decided per document.

#[cfg(feature = "pdf")]
mod pdf;

#[cfg(feature = "pdf")]
pub use pdf::{extract_pdf_text, PdfText};

use std::path::Path;

use tracing::debug;

use crate::error::{SourceError, SuratError};
use crate::models::config::{SourceConfig, SourceKind};

/// Extensions of image files, which need an external OCR pass.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tif", "tiff", "bmp", "webp", "gif"];

/// Where raw text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// Text already produced by an OCR pass, read as UTF-8.
    Plain,
    /// Embedded text layer of a PDF.
    Pdf { min_text_length: usize },
}

impl TextSource {
    /// Source for `path` under the configured kind.
    pub fn from_config(config: &SourceConfig, path: &Path) -> Result<Self, SourceError> {
        match config.kind {
            SourceKind::Plain => Ok(Self::Plain),
            SourceKind::Pdf => Ok(Self::Pdf {
                min_text_length: config.min_text_length,
            }),
            SourceKind::Auto => Self::for_path(path, config.min_text_length),
        }
    }

    /// Source picked from the file extension; unknown extensions are plain text.
    pub fn for_path(path: &Path, min_text_length: usize) -> Result<Self, SourceError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if ext == "pdf" {
            Ok(Self::Pdf { min_text_length })
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Err(SourceError::Unsupported(format!(
                "{} is an image, run OCR on it first",
                path.display()
            )))
        } else {
            Ok(Self::Plain)
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Plain => "plain",
            Self::Pdf { .. } => "pdf",
        }
    }

    /// Read raw text from document bytes.
    pub fn read(&self, data: &[u8]) -> Result<String, SourceError> {
        match self {
            Self::Plain => Ok(String::from_utf8_lossy(data).into_owned()),
            #[cfg(feature = "pdf")]
            Self::Pdf { min_text_length } => {
                extract_pdf_text(data, *min_text_length).map(|pdf| pdf.text)
            }
            #[cfg(not(feature = "pdf"))]
            Self::Pdf { .. } => Err(SourceError::Unsupported(
                "PDF support is disabled (build with the `pdf` feature)".to_string(),
            )),
        }
    }

    /// Read raw text from a file.
    pub fn read_file(&self, path: &Path) -> Result<String, SuratError> {
        let data = std::fs::read(path)?;
        debug!("Reading {} ({} bytes) as {}", path.display(), data.len(), self.name());
        Ok(self.read(&data)?)
    }
}
