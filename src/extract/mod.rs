//! Text extraction from article files.
//!
//! PDF parsing is delegated to the external `pdftotext` tool (poppler).
//! Plain-text files are read directly so that pre-extracted corpora can go
//! through the same pipeline.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during text extraction.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Handle command output, extracting stdout on success or returning appropriate error.
fn handle_cmd_output(
    result: std::io::Result<std::process::Output>,
    tool_name: &str,
    error_prefix: &str,
) -> Result<String, ExtractionError> {
    match result {
        Ok(output) if output.status.success() => {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ExtractionError::ExtractionFailed(format!(
                "{}: {}",
                error_prefix,
                stderr.trim()
            )))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ExtractionError::ToolNotFound(tool_name.to_string()))
        }
        Err(e) => Err(ExtractionError::Io(e)),
    }
}

/// Extraction settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Name or path of the pdftotext binary.
    #[serde(default = "default_pdftotext")]
    pub pdftotext: String,
}

fn default_pdftotext() -> String {
    "pdftotext".to_string()
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            pdftotext: default_pdftotext(),
        }
    }
}

/// Turns a document file into raw text.
///
/// Implementations must be usable from several worker threads at once.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}

/// Extracts PDF text with `pdftotext -enc UTF-8 <file> -`.
#[derive(Debug, Clone)]
pub struct PdfToTextExtractor {
    binary: PathBuf,
}

impl Default for PdfToTextExtractor {
    fn default() -> Self {
        Self::new(default_pdftotext())
    }
}

impl PdfToTextExtractor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(&config.pdftotext)
    }

    /// Whether the binary can be found (on PATH, or at the given path).
    pub fn is_available(&self) -> bool {
        which::which(&self.binary).is_ok()
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl DocumentExtractor for PdfToTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let output = Command::new(&self.binary)
            .args(["-enc", "UTF-8"])
            .arg(path)
            .arg("-")
            .output();

        handle_cmd_output(
            output,
            &self.binary.to_string_lossy(),
            &format!("pdftotext failed on {}", path.display()),
        )
    }
}

/// Reads text files as-is. Invalid UTF-8 is replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).to_string())
    }
}

/// Picks an extractor by file content, falling back to the extension.
///
/// Content sniffing catches PDFs saved without (or with the wrong) extension,
/// which happens often with downloaded articles.
#[derive(Debug, Clone, Default)]
pub struct AutoExtractor {
    pdf: PdfToTextExtractor,
    text: PlainTextExtractor,
}

impl AutoExtractor {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            pdf: PdfToTextExtractor::from_config(config),
            text: PlainTextExtractor,
        }
    }

    fn select(&self, path: &Path) -> Result<&dyn DocumentExtractor, ExtractionError> {
        let mime = detect_mime(path)?;
        match mime.as_deref() {
            Some("application/pdf") => return Ok(&self.pdf),
            Some(other) => {
                return Err(ExtractionError::UnsupportedFileType(other.to_string()));
            }
            None => {}
        }

        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "pdf" => Ok(&self.pdf),
            "txt" | "text" | "" => Ok(&self.text),
            other => Err(ExtractionError::UnsupportedFileType(other.to_string())),
        }
    }
}

impl DocumentExtractor for AutoExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        self.select(path)?.extract(path)
    }
}

/// Detect a MIME type from the first bytes of a file.
///
/// Returns `None` for content without a recognizable signature (plain text).
pub fn detect_mime(path: &Path) -> Result<Option<String>, ExtractionError> {
    let mut file = File::open(path)?;
    let mut buffer = [0u8; 8192];
    let bytes_read = file.read(&mut buffer)?;
    if bytes_read == 0 {
        return Ok(None);
    }
    Ok(infer::get(&buffer[..bytes_read]).map(|kind| kind.mime_type().to_string()))
}
