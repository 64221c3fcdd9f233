//! Input processing module
//! Handles file detection, text extraction with OCR fallback, and candidate discovery

pub mod file_detector;
pub mod text_extractor;
pub mod ocr;
pub mod manager;
pub mod scanner;

pub use manager::{ExtractionCoordinator, ExtractionMethod, ExtractionResult};
