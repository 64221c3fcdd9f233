//! Text embeddings: a candle sentence encoder and Model2Vec static embeddings

use crate::config::{EmbeddingConfig, EncoderBackend};
use crate::error::{Result, ResumeRankerError};
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use hf_hub::api::tokio::{Api, ApiRepo};
use log::{debug, info};
use model2vec_rs::model::StaticModel;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokenizers::{Tokenizer, TruncationParams};

/// Maps text to a fixed-length vector. Loaded once per run and shared by
/// every document.
pub trait Encoder {
    fn model_name(&self) -> &str;
    fn dimension(&self) -> usize;
    fn encode(&self, text: &str) -> Result<Vec<f32>>;
}

/// Load the configured encoder backend.
pub async fn load_encoder(config: &EmbeddingConfig) -> Result<Box<dyn Encoder>> {
    let start_time = Instant::now();

    let encoder: Box<dyn Encoder> = match config.backend {
        EncoderBackend::Sentence => Box::new(SentenceEncoder::load(config).await?),
        EncoderBackend::Static => {
            let model = config.model_for_backend().to_string();
            let encoder = tokio::task::spawn_blocking(move || StaticEncoder::load(&model))
                .await
                .map_err(|e| ResumeRankerError::ModelLoading(e.to_string()))??;
            Box::new(encoder)
        }
    };

    info!(
        "Successfully loaded embedding model {} ({} dimensions) in {:.2?}",
        encoder.model_name(),
        encoder.dimension(),
        start_time.elapsed()
    );
    Ok(encoder)
}

fn check_input(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(ResumeRankerError::Embedding("cannot embed empty text".to_string()));
    }
    Ok(())
}

fn check_output(embedding: Vec<f32>) -> Result<Vec<f32>> {
    if embedding.is_empty() {
        return Err(ResumeRankerError::Embedding("model returned an empty vector".to_string()));
    }
    if embedding.iter().any(|v| !v.is_finite()) {
        return Err(ResumeRankerError::Embedding(
            "model returned non-finite values".to_string(),
        ));
    }
    Ok(embedding)
}

/// Pick the inference device. `RESUME_RANKER_DEVICE=cpu` forces the CPU.
pub fn select_device() -> Device {
    if let Ok(preference) = std::env::var("RESUME_RANKER_DEVICE") {
        if preference.eq_ignore_ascii_case("cpu") {
            return Device::Cpu;
        }
    }

    #[cfg(feature = "cuda")]
    {
        match Device::new_cuda(0) {
            Ok(device) => return device,
            Err(e) => log::warn!("CUDA initialization failed, using CPU: {}", e),
        }
    }

    #[cfg(feature = "metal")]
    {
        match Device::new_metal(0) {
            Ok(device) => return device,
            Err(e) => log::warn!("Metal initialization failed, using CPU: {}", e),
        }
    }

    Device::Cpu
}

struct ModelFiles {
    config: PathBuf,
    tokenizer: PathBuf,
    weights: PathBuf,
}

impl ModelFiles {
    /// Use a local model directory when `model` names one, otherwise fetch
    /// the files from the HuggingFace Hub (cached after the first download).
    async fn resolve(model: &str) -> Result<Self> {
        let local = Path::new(model);
        if local.is_dir() {
            let files = Self {
                config: local.join("config.json"),
                tokenizer: local.join("tokenizer.json"),
                weights: local.join("model.safetensors"),
            };
            for file in [&files.config, &files.tokenizer, &files.weights] {
                if !file.exists() {
                    return Err(ResumeRankerError::ModelLoading(format!(
                        "Model directory is missing {}",
                        file.display()
                    )));
                }
            }
            return Ok(files);
        }

        let api = Api::new().map_err(|e| {
            ResumeRankerError::ModelLoading(format!("Failed to initialize HF API: {}", e))
        })?;
        let repo = api.repo(hf_hub::Repo::model(model.to_string()));

        Ok(Self {
            config: fetch(&repo, model, "config.json").await?,
            tokenizer: fetch(&repo, model, "tokenizer.json").await?,
            weights: fetch(&repo, model, "model.safetensors").await?,
        })
    }
}

async fn fetch(repo: &ApiRepo, model: &str, file: &str) -> Result<PathBuf> {
    let path = repo.get(file).await.map_err(|e| {
        ResumeRankerError::ModelLoading(format!("Failed to download {} from {}: {}", file, model, e))
    })?;
    debug!("Resolved {} to {}", file, path.display());
    Ok(path)
}

/// BERT-family sentence encoder: mean pooling over the attention mask
/// followed by L2 normalization.
pub struct SentenceEncoder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    model_name: String,
    dimension: usize,
}

impl SentenceEncoder {
    pub async fn load(config: &EmbeddingConfig) -> Result<Self> {
        info!("Loading sentence encoder {}", config.model);
        let files = ModelFiles::resolve(&config.model).await?;

        let config_json = std::fs::read_to_string(&files.config)?;
        let bert_config: BertConfig = serde_json::from_str(&config_json)?;
        let dimension = serde_json::from_str::<serde_json::Value>(&config_json)?
            .get("hidden_size")
            .and_then(|v| v.as_u64())
            .ok_or_else(|| {
                ResumeRankerError::ModelLoading("config.json has no hidden_size".to_string())
            })? as usize;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer).map_err(|e| {
            ResumeRankerError::ModelLoading(format!("Failed to load tokenizer: {}", e))
        })?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_sequence_length,
                ..Default::default()
            }))
            .map_err(|e| ResumeRankerError::ModelLoading(format!("Invalid truncation: {}", e)))?;
        tokenizer.with_padding(None);

        let device = select_device();
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[files.weights], DTYPE, &device)? };
        let model = BertModel::load(vb, &bert_config)?;

        Ok(Self {
            model,
            tokenizer,
            device,
            model_name: config.model.clone(),
            dimension,
        })
    }
}

impl Encoder for SentenceEncoder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        check_input(text)?;

        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| ResumeRankerError::Embedding(format!("Tokenization failed: {}", e)))?;

        let input_ids = Tensor::new(encoding.get_ids(), &self.device)?.unsqueeze(0)?;
        let token_type_ids = input_ids.zeros_like()?;
        let attention_mask = Tensor::new(encoding.get_attention_mask(), &self.device)?.unsqueeze(0)?;

        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))?;

        let mask = attention_mask.to_dtype(DTYPE)?.unsqueeze(2)?;
        let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
        let pooled = summed.broadcast_div(&mask.sum(1)?)?;
        let norm = pooled.sqr()?.sum_keepdim(1)?.sqrt()?;
        let embedding = pooled.broadcast_div(&norm)?.squeeze(0)?.to_vec1::<f32>()?;

        check_output(embedding)
    }
}

/// Model2Vec static embeddings.
pub struct StaticEncoder {
    model: StaticModel,
    model_name: String,
    dimension: usize,
}

impl StaticEncoder {
    pub fn load(model: &str) -> Result<Self> {
        info!("Loading Model2Vec embedding model {}", model);
        let static_model = StaticModel::from_pretrained(model, None, None, None)?;
        let dimension = static_model.encode_single("dimension probe").len();

        Ok(Self {
            model: static_model,
            model_name: model.to_string(),
            dimension,
        })
    }
}

impl Encoder for StaticEncoder {
    fn model_name(&self) -> &str {
        &self.model_name
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn encode(&self, text: &str) -> Result<Vec<f32>> {
        check_input(text)?;
        check_output(self.model.encode_single(text))
    }
}
