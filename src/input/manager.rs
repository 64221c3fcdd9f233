//! Extraction coordinator: direct extraction first, OCR when the result is
//! missing or too short.

use crate::config::{ExtractionConfig, OcrConfig};
use crate::error::ExtractionError;
use crate::input::file_detector::{Document, Format};
use crate::input::ocr::OpticalExtractor;
use crate::input::text_extractor::{DocxExtractor, PdfExtractor, PlainTextExtractor, TextExtractor};
use log::{error, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    DirectPdf,
    DirectDocx,
    DirectTxt,
    Ocr,
    Unknown,
    Failed,
}

impl ExtractionMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ExtractionMethod::DirectPdf => "direct_pdf",
            ExtractionMethod::DirectDocx => "direct_docx",
            ExtractionMethod::DirectTxt => "direct_txt",
            ExtractionMethod::Ocr => "ocr",
            ExtractionMethod::Unknown => "unknown",
            ExtractionMethod::Failed => "failed",
        }
    }
}

impl fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text recovered from one document and the strategy that produced it.
///
/// `method` is `Failed` exactly when `text` is empty; any other method
/// carries trimmed text at least `min_text_length` characters long.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub text: String,
    pub method: ExtractionMethod,
}

impl ExtractionResult {
    fn failed() -> Self {
        Self {
            text: String::new(),
            method: ExtractionMethod::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.method != ExtractionMethod::Failed
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

pub struct ExtractionCoordinator<O = OpticalExtractor> {
    config: ExtractionConfig,
    optical: O,
}

impl ExtractionCoordinator<OpticalExtractor> {
    pub fn new(config: ExtractionConfig, ocr: &OcrConfig) -> Self {
        Self::with_optical(config, OpticalExtractor::new(ocr))
    }
}

impl<O: TextExtractor> ExtractionCoordinator<O> {
    pub fn with_optical(config: ExtractionConfig, optical: O) -> Self {
        Self { config, optical }
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    /// Trimmed text if it passes the quality gate. Empty text never passes.
    fn gate(&self, text: &str) -> Result<String, ExtractionError> {
        let trimmed = text.trim();
        let chars = trimmed.chars().count();
        if chars > 0 && chars >= self.config.min_text_length {
            Ok(trimmed.to_string())
        } else {
            Err(ExtractionError::InsufficientText {
                chars,
                required: self.config.min_text_length.max(1),
            })
        }
    }

    /// Run the structured routine for `format`; `None` when there is none.
    async fn extract_direct(
        &self,
        format: Format,
        path: &Path,
    ) -> Option<(ExtractionMethod, Result<String, ExtractionError>)> {
        let outcome = match format {
            Format::Pdf => (ExtractionMethod::DirectPdf, PdfExtractor.extract(path).await),
            Format::Docx => (ExtractionMethod::DirectDocx, DocxExtractor.extract(path).await),
            Format::Text => (ExtractionMethod::DirectTxt, PlainTextExtractor.extract(path).await),
            Format::Image | Format::Paged | Format::Unknown => return None,
        };
        Some(outcome)
    }

    /// Extract usable text from `path`. Never fails: every strategy error is
    /// logged and the document is reported as `failed`.
    pub async fn extract(&self, path: &Path) -> ExtractionResult {
        let document = Document::new(path);
        let name = document.file_name();

        match self.extract_direct(document.format, path).await {
            Some((method, direct)) => match direct.and_then(|text| self.gate(&text)) {
                Ok(text) => {
                    info!("Direct extraction successful for {} using {}", name, method);
                    return ExtractionResult { text, method };
                }
                Err(e) => info!(
                    "Direct extraction with {} rejected for {} ({}), falling back to OCR",
                    method, name, e
                ),
            },
            None => info!(
                "Attempting OCR for {} as direct extraction method is {}",
                name,
                ExtractionMethod::Unknown
            ),
        }

        let recognized = match self.optical.extract(path).await {
            Ok(text) => self.gate(&text),
            Err(ExtractionError::OcrEngineUnavailable(reason)) => {
                error!(
                    "OCR engine unavailable while processing {}: {}. Install Tesseract and make sure it is on PATH",
                    name, reason
                );
                Err(ExtractionError::OcrEngineUnavailable(reason))
            }
            Err(e) => {
                warn!("Error during OCR extraction from {}: {}", name, e);
                Err(e)
            }
        };

        match recognized {
            Ok(text) => {
                info!("OCR extraction successful for {}", name);
                ExtractionResult {
                    text,
                    method: ExtractionMethod::Ocr,
                }
            }
            Err(e) => {
                warn!("All extraction strategies failed for {}: {}", name, e);
                ExtractionResult::failed()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct ScriptedOcr {
        reply: fn() -> Result<String, ExtractionError>,
        calls: AtomicUsize,
    }

    impl ScriptedOcr {
        fn new(reply: fn() -> Result<String, ExtractionError>) -> Self {
            Self {
                reply,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl TextExtractor for ScriptedOcr {
        async fn extract(&self, _path: &Path) -> Result<String, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.reply)()
        }
    }

    fn long_text() -> String {
        "Rust engineer with a decade of experience building parsers, storage engines and network services. "
            .repeat(2)
    }

    #[tokio::test]
    async fn test_accepts_direct_text_without_ocr() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resume.txt");
        std::fs::write(&path, format!("\n\n  {}  \n", long_text())).unwrap();

        let coordinator = ExtractionCoordinator::with_optical(
            ExtractionConfig::default(),
            ScriptedOcr::new(|| Ok("unused".to_string())),
        );
        let result = coordinator.extract(&path).await;

        assert_eq!(result.method, ExtractionMethod::DirectTxt);
        assert_eq!(result.text, long_text().trim());
        assert_eq!(coordinator.optical.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_short_text_falls_back_to_ocr_and_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("note.txt");
        std::fs::write(&path, "Too short to trust.").unwrap();

        let coordinator = ExtractionCoordinator::with_optical(
            ExtractionConfig::default(),
            ScriptedOcr::new(|| Err(ExtractionError::OcrFailed("not a paginated file".into()))),
        );
        let result = coordinator.extract(&path).await;

        assert_eq!(coordinator.optical.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result, ExtractionResult::failed());
    }

    #[tokio::test]
    async fn test_below_threshold_ocr_text_is_never_success() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("scan.png");
        std::fs::write(&path, b"pixels").unwrap();

        let coordinator = ExtractionCoordinator::with_optical(
            ExtractionConfig::default(),
            ScriptedOcr::new(|| Ok("   a few words   ".to_string())),
        );
        let result = coordinator.extract(&path).await;

        assert_eq!(result.method, ExtractionMethod::Failed);
        assert!(result.text.is_empty());
    }

    #[tokio::test]
    async fn test_threshold_counts_characters_not_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("resume.txt");
        // 60 two-byte characters: 120 bytes but only 60 characters
        std::fs::write(&path, "é".repeat(60)).unwrap();

        let coordinator = ExtractionCoordinator::with_optical(
            ExtractionConfig::default(),
            ScriptedOcr::new(|| Err(ExtractionError::OcrEngineUnavailable("missing".into()))),
        );
        let result = coordinator.extract(&path).await;
        assert_eq!(result.method, ExtractionMethod::Failed);
    }

    #[tokio::test]
    async fn test_custom_threshold_is_respected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("short.txt");
        std::fs::write(&path, "Twelve chars").unwrap();

        let config = ExtractionConfig {
            min_text_length: 12,
            ..ExtractionConfig::default()
        };
        let coordinator =
            ExtractionCoordinator::with_optical(config, ScriptedOcr::new(|| Ok(String::new())));
        let result = coordinator.extract(&path).await;

        assert_eq!(result.method, ExtractionMethod::DirectTxt);
        assert_eq!(result.text, "Twelve chars");
    }

    #[tokio::test]
    async fn test_whitespace_only_text_fails_even_with_zero_threshold() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "   \n\t\n").unwrap();

        let config = ExtractionConfig {
            min_text_length: 0,
            ..ExtractionConfig::default()
        };
        let coordinator =
            ExtractionCoordinator::with_optical(config, ScriptedOcr::new(|| Ok("  \n ".to_string())));
        let result = coordinator.extract(&path).await;

        assert_eq!(coordinator.optical.calls.load(Ordering::SeqCst), 1);
        assert_eq!(result, ExtractionResult::failed());
        assert!(!result.is_success());
    }

    #[test]
    fn test_method_tags() {
        assert_eq!(ExtractionMethod::DirectPdf.to_string(), "direct_pdf");
        assert_eq!(ExtractionMethod::Ocr.to_string(), "ocr");
        assert_eq!(
            serde_json::to_string(&ExtractionMethod::DirectDocx).unwrap(),
            "\"direct_docx\""
        );
    }
}
