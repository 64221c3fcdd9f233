//! File type detection

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Pdf,
    Docx,
    Text,
    /// Raster images recognized in one OCR pass.
    Image,
    /// Paginated containers without a direct text routine.
    Paged,
    Unknown,
}

impl Format {
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Format::Pdf,
            "docx" => Format::Docx,
            "txt" => Format::Text,
            "png" | "jpg" | "jpeg" | "tiff" | "bmp" | "gif" => Format::Image,
            "xps" | "epub" | "fb2" => Format::Paged,
            _ => Format::Unknown,
        }
    }

    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(Format::Unknown)
    }
}

/// A document on disk. Never modified by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub path: PathBuf,
    pub format: Format,
}

impl Document {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let format = Format::from_path(&path);
        Self { path, format }
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}
