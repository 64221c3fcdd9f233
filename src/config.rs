//! Configuration management for the resume ranker

use crate::error::{Result, ResumeRankerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_MIN_TEXT_LENGTH: usize = 100;
pub const DEFAULT_SENTENCE_MODEL: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_STATIC_MODEL: &str = "minishlab/potion-base-8M";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub extraction: ExtractionConfig,
    pub ocr: OcrConfig,
    pub embedding: EmbeddingConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum trimmed length (in characters) for extracted text to be trusted.
    pub min_text_length: usize,
    /// Extensions picked up when scanning the candidate directory.
    pub accepted_extensions: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    pub language: String,
    /// Rasterization resolution; `None` renders at the document's native 72 dpi.
    pub dpi: Option<u32>,
    pub tesseract_command: String,
    pub rasterizer: Rasterizer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rasterizer {
    /// Poppler's `pdftoppm`, PDF only.
    Pdftoppm,
    /// MuPDF's `mutool draw`, also renders XPS, EPUB and FB2.
    Mutool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub backend: EncoderBackend,
    /// HuggingFace repo id or local model directory.
    pub model: String,
    pub max_sequence_length: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncoderBackend {
    /// Transformer sentence encoder run with candle.
    Sentence,
    /// Model2Vec static embeddings.
    Static,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    pub resumes_dir: Option<PathBuf>,
    pub job_description: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub detailed: bool,
    pub color_output: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Console,
    Json,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_text_length: DEFAULT_MIN_TEXT_LENGTH,
            accepted_extensions: ["pdf", "docx", "txt", "png", "jpg", "jpeg"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            language: "eng".to_string(),
            dpi: None,
            tesseract_command: "tesseract".to_string(),
            rasterizer: Rasterizer::Pdftoppm,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EncoderBackend::Sentence,
            model: DEFAULT_SENTENCE_MODEL.to_string(),
            max_sequence_length: 256,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Console,
            detailed: false,
            color_output: true,
        }
    }
}

impl ExtractionConfig {
    /// Whether `ext` (with or without a leading dot, any case) is accepted.
    pub fn accepts_extension(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('.');
        self.accepted_extensions
            .iter()
            .any(|accepted| accepted.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }
}

impl EmbeddingConfig {
    /// Model to load for the configured backend. The sentence default is a BERT
    /// checkpoint, so the static backend falls back to a Model2Vec one.
    pub fn model_for_backend(&self) -> &str {
        match self.backend {
            EncoderBackend::Static if self.model == DEFAULT_SENTENCE_MODEL => DEFAULT_STATIC_MODEL,
            _ => &self.model,
        }
    }
}

impl Config {
    /// Load from the default location, writing defaults there on first use.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save_to(&config_path)?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ResumeRankerError::Configuration(format!(
                "Failed to read config {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| ResumeRankerError::Configuration(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            ResumeRankerError::Configuration(format!("Failed to serialize config: {}", e))
        })?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("resume-ranker")
            .join("config.toml")
    }

    pub fn validate(&self) -> Result<()> {
        if self.extraction.min_text_length == 0 {
            return Err(ResumeRankerError::Configuration(
                "extraction.min_text_length must be at least 1".to_string(),
            ));
        }
        if self.extraction.accepted_extensions.is_empty() {
            return Err(ResumeRankerError::Configuration(
                "extraction.accepted_extensions must not be empty".to_string(),
            ));
        }
        if self.ocr.dpi == Some(0) {
            return Err(ResumeRankerError::Configuration(
                "ocr.dpi must be positive".to_string(),
            ));
        }
        if self.embedding.max_sequence_length == 0 {
            return Err(ResumeRankerError::Configuration(
                "embedding.max_sequence_length must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = Config::default();
        assert_eq!(config.extraction.min_text_length, 100);
        assert_eq!(config.extraction.accepted_extensions.len(), 6);
        assert_eq!(config.ocr.dpi, None);
        assert_eq!(config.embedding.backend, EncoderBackend::Sentence);
        assert_eq!(config.embedding.model, DEFAULT_SENTENCE_MODEL);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            [extraction]
            min_text_length = 40

            [ocr]
            dpi = 300
            rasterizer = "mutool"
            "#,
        )
        .unwrap();

        assert_eq!(config.extraction.min_text_length, 40);
        assert!(config.extraction.accepts_extension("pdf"));
        assert_eq!(config.ocr.dpi, Some(300));
        assert_eq!(config.ocr.rasterizer, Rasterizer::Mutool);
        assert_eq!(config.ocr.language, "eng");
    }

    #[test]
    fn test_rejects_zero_dpi() {
        let result = Config::from_toml("[ocr]\ndpi = 0\n");
        assert!(matches!(result, Err(ResumeRankerError::Configuration(_))));
    }

    #[test]
    fn test_static_backend_uses_model2vec_default() {
        let mut embedding = EmbeddingConfig::default();
        assert_eq!(embedding.model_for_backend(), DEFAULT_SENTENCE_MODEL);

        embedding.backend = EncoderBackend::Static;
        assert_eq!(embedding.model_for_backend(), DEFAULT_STATIC_MODEL);

        embedding.model = "minishlab/potion-retrieval-32M".to_string();
        assert_eq!(embedding.model_for_backend(), "minishlab/potion-retrieval-32M");
    }

    #[test]
    fn test_rejects_zero_min_text_length() {
        let result = Config::from_toml("[extraction]\nmin_text_length = 0\n");
        assert!(matches!(result, Err(ResumeRankerError::Configuration(_))));

        let mut config = Config::default();
        config.extraction.min_text_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_accepts_extension_ignores_case_and_dot() {
        let config = ExtractionConfig::default();
        assert!(config.accepts_extension("PDF"));
        assert!(config.accepts_extension(".jpeg"));
        assert!(!config.accepts_extension("rtf"));
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.embedding.backend = EncoderBackend::Static;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.embedding.backend, EncoderBackend::Static);
    }
}
