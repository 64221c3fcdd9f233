//! Optical text recovery: page rasterization plus Tesseract OCR.
//!
//! Both external tools are invoked as subprocesses. Page rasters and
//! converted images live in a [`TempDir`] that is removed when the call
//! returns, whichever way it returns.

use crate::config::{OcrConfig, Rasterizer};
use crate::error::ExtractionError;
use crate::input::file_detector::Format;
use crate::input::text_extractor::TextExtractor;
use log::{debug, warn};
use regex::Regex;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Output;
use tempfile::TempDir;
use tokio::process::Command;

/// Resolution pages are rendered at when no DPI is configured.
pub const NATIVE_DPI: u32 = 72;

/// Map a finished subprocess to its stdout, or to the matching error kind.
fn command_output(
    result: std::io::Result<Output>,
    tool: &str,
    install_hint: &str,
) -> Result<String, ExtractionError> {
    match result {
        Ok(output) if output.status.success() => {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        }
        Ok(output) => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(ExtractionError::OcrFailed(format!(
                "{} exited with {}: {}",
                tool,
                output.status,
                stderr.trim()
            )))
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Err(ExtractionError::OcrEngineUnavailable(
            format!("{} not found ({})", tool, install_hint),
        )),
        Err(e) => Err(ExtractionError::FileAccess(e)),
    }
}

/// Tesseract invoked through its command line.
pub struct TesseractEngine {
    command: String,
    language: String,
}

impl TesseractEngine {
    pub fn new(command: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            language: language.into(),
        }
    }

    pub async fn recognize(&self, image_path: &Path) -> Result<String, ExtractionError> {
        let output = Command::new(&self.command)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.language])
            .output()
            .await;

        command_output(output, &self.command, "install tesseract-ocr")
    }
}

/// Renders every page of a paginated document to PNG files.
pub struct PageRasterizer {
    tool: Rasterizer,
    dpi: u32,
    page_number: Regex,
}

impl PageRasterizer {
    pub fn new(tool: Rasterizer, dpi: Option<u32>) -> Self {
        Self {
            tool,
            dpi: dpi.unwrap_or(NATIVE_DPI),
            page_number: Regex::new(r"-(\d+)\.png$").expect("Invalid page number regex"),
        }
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    /// Rasterize `document` into `output_dir`, returning page images in page order.
    pub async fn rasterize(
        &self,
        document: &Path,
        output_dir: &Path,
    ) -> Result<Vec<PathBuf>, ExtractionError> {
        let dpi = self.dpi.to_string();
        let (tool, hint, output) = match self.tool {
            Rasterizer::Pdftoppm => {
                let output = Command::new("pdftoppm")
                    .args(["-png", "-r", &dpi])
                    .arg(document)
                    .arg(output_dir.join("page"))
                    .output()
                    .await;
                ("pdftoppm", "install poppler-utils", output)
            }
            Rasterizer::Mutool => {
                let output = Command::new("mutool")
                    .args(["draw", "-q", "-r", &dpi, "-c", "rgb", "-o"])
                    .arg(output_dir.join("page-%d.png"))
                    .arg(document)
                    .output()
                    .await;
                ("mutool", "install mupdf-tools", output)
            }
        };
        command_output(output, tool, hint)?;

        let mut pages: Vec<(u32, PathBuf)> = std::fs::read_dir(output_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter_map(|path| self.page_index(&path).map(|n| (n, path)))
            .collect();

        if pages.is_empty() {
            return Err(ExtractionError::OcrFailed(format!(
                "{} produced no page images for {}",
                tool,
                document.display()
            )));
        }

        pages.sort_by_key(|(n, _)| *n);
        Ok(pages.into_iter().map(|(_, path)| path).collect())
    }

    /// Page number encoded in a raster file name such as `page-07.png`.
    pub fn page_index(&self, path: &Path) -> Option<u32> {
        let name = path.file_name()?.to_str()?;
        self.page_number
            .captures(name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
    }
}

/// Best-effort text recovery from rendered pages or raster images.
pub struct OpticalExtractor {
    engine: TesseractEngine,
    rasterizer: PageRasterizer,
}

impl OpticalExtractor {
    pub fn new(config: &OcrConfig) -> Self {
        Self {
            engine: TesseractEngine::new(&config.tesseract_command, &config.language),
            rasterizer: PageRasterizer::new(config.rasterizer, config.dpi),
        }
    }

    async fn recognize_pages(&self, path: &Path) -> Result<String, ExtractionError> {
        let workdir = TempDir::new()?;
        let pages = self.rasterizer.rasterize(path, workdir.path()).await?;
        debug!(
            "Rasterized {} page(s) of {} at {} dpi",
            pages.len(),
            path.display(),
            self.rasterizer.dpi()
        );

        let mut text = String::new();
        for page in &pages {
            let page_text = self.engine.recognize(page).await?;
            text.push_str(&page_text);
            text.push('\n');
        }
        Ok(text)
    }

    async fn recognize_image(&self, path: &Path) -> Result<String, ExtractionError> {
        let workdir = TempDir::new()?;
        let source = path.to_path_buf();
        let converted = workdir.path().join("image.png");
        let target = converted.clone();

        tokio::task::spawn_blocking(move || -> Result<(), ExtractionError> {
            let image = image::open(&source).map_err(|e| match e {
                image::ImageError::IoError(io) => ExtractionError::FileAccess(io),
                other => ExtractionError::parse("image", other),
            })?;
            image
                .to_rgb8()
                .save(&target)
                .map_err(|e| ExtractionError::OcrFailed(format!("cannot stage raster: {}", e)))
        })
        .await
        .map_err(|e| ExtractionError::parse("image", e))??;

        self.engine.recognize(&converted).await
    }
}

impl TextExtractor for OpticalExtractor {
    async fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let format = Format::from_path(path);
        let text = match format {
            Format::Pdf | Format::Paged => self.recognize_pages(path).await?,
            Format::Image => self.recognize_image(path).await?,
            Format::Docx | Format::Text | Format::Unknown => {
                warn!(
                    "Attempting OCR on potentially unsupported file type {}",
                    path.display()
                );
                self.recognize_pages(path).await?
            }
        };
        Ok(text.trim().to_string())
    }
}
