//! Source extraction: uploaded bytes → raw text.
//!
//! Uploads are written to a `NamedTempFile` owned by `UploadedFile`; the file is
//! deleted when the guard drops, whichever way the request ends.

use std::io::Write;
use std::path::Path;

use anyhow::Context;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Pdf,
    PlainText,
}

impl SourceFormat {
    /// Decided by file extension only.
    pub fn from_filename(filename: &str) -> Result<Self, AppError> {
        let extension = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("pdf") => Ok(SourceFormat::Pdf),
            Some("txt") => Ok(SourceFormat::PlainText),
            _ => Err(AppError::InvalidInput(format!(
                "unsupported file type for '{filename}'; upload a .pdf or .txt resume"
            ))),
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            SourceFormat::Pdf => ".pdf",
            SourceFormat::PlainText => ".txt",
        }
    }
}

/// A request-scoped copy of the uploaded file on disk.
pub struct UploadedFile {
    file: NamedTempFile,
    format: SourceFormat,
}

impl UploadedFile {
    pub fn persist(filename: &str, bytes: &[u8]) -> Result<Self, AppError> {
        let format = SourceFormat::from_filename(filename)?;
        let mut file = tempfile::Builder::new()
            .prefix("resume-upload-")
            .suffix(format.suffix())
            .tempfile()
            .context("creating upload temp file")?;
        file.write_all(bytes).context("writing upload temp file")?;
        file.flush().context("flushing upload temp file")?;

        debug!("Persisted {} byte upload to {}", bytes.len(), file.path().display());
        Ok(Self { file, format })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn format(&self) -> SourceFormat {
        self.format
    }
}

/// Black-box "extract text from binary". May legitimately return near-empty
/// text for scanned documents; the normalizer's length floor handles that.
pub trait SourceExtractor: Send + Sync {
    fn extract(&self, upload: &UploadedFile) -> Result<String, AppError>;
}

/// PDF via `pdf-extract`, plain text read directly (lossy UTF-8).
pub struct FileExtractor;

impl SourceExtractor for FileExtractor {
    fn extract(&self, upload: &UploadedFile) -> Result<String, AppError> {
        match upload.format() {
            SourceFormat::Pdf => pdf_extract::extract_text(upload.path())
                .map_err(|e| AppError::EmptySource(format!("PDF text extraction failed: {e}"))),
            SourceFormat::PlainText => {
                let bytes = std::fs::read(upload.path()).context("reading uploaded text file")?;
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
        }
    }
}
