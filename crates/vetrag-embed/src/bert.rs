use anyhow::{anyhow, Context, Result};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use tokenizers::Tokenizer;
use vetrag_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_batch;

/// Sentence encoder over a local BERT-family checkpoint (MiniLM by default).
///
/// Forward passes are serialized through a mutex so one loaded model can be
/// shared by every domain index.
pub struct BertEmbedder {
    model: Mutex<BertModel>,
    tokenizer: Tokenizer,
    device: Device,
    id: String,
    dim: usize,
    max_len: usize,
    pad_id: u32,
}

impl BertEmbedder {
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = select_device();
        tracing::info!(dir = %model_dir.display(), "loading sentence encoder");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;

        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path)
            .with_context(|| format!("reading {}", config_path.display()))?;
        let config: BertConfig = serde_json::from_str(&raw_config)?;
        let shape: serde_json::Value = serde_json::from_str(&raw_config)?;
        let dim = shape["hidden_size"]
            .as_u64()
            .ok_or_else(|| anyhow!("config.json has no hidden_size"))? as usize;
        let positions = shape["max_position_embeddings"].as_u64().unwrap_or(512) as usize;

        let vb = load_weights(model_dir, &device)?;
        let model = BertModel::load(vb, &config)?;

        let pad_id = tokenizer.token_to_id("[PAD]").unwrap_or(0);
        let name = model_dir
            .file_name()
            .map_or_else(|| "model".to_string(), |n| n.to_string_lossy().into_owned());
        let id = format!("bert:{name}:d{dim}");
        tracing::info!(%id, "sentence encoder ready");

        Ok(Self {
            model: Mutex::new(model),
            tokenizer,
            device,
            id,
            dim,
            max_len: effective_max_len(max_len, positions),
            pad_id,
        })
    }
}

/// Token budget per text, bounded by the model's position table and never zero.
fn effective_max_len(requested: usize, positions: usize) -> usize {
    requested.min(positions).max(1)
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        let bytes = std::fs::read(&safetensors).with_context(|| format!("reading {}", safetensors.display()))?;
        return Ok(VarBuilder::from_buffered_safetensors(bytes, DType::F32, device)?);
    }
    let bin = model_dir.join("pytorch_model.bin");
    if bin.exists() {
        let weights: HashMap<String, Tensor> = candle_core::pickle::read_all(&bin)?.into_iter().collect();
        return Ok(VarBuilder::from_tensors(weights, DType::F32, device));
    }
    Err(anyhow!("no model.safetensors or pytorch_model.bin under {}", model_dir.display()))
}

impl Embedder for BertEmbedder {
    fn embedder_id(&self) -> &str {
        &self.id
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let start = Instant::now();
        let (input_ids, attention_mask) =
            tokenize_batch(&self.tokenizer, texts, self.max_len, self.pad_id, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = {
            let model = self.model.lock().map_err(|_| anyhow!("encoder lock poisoned"))?;
            model.forward(&input_ids, &token_type_ids, Some(&attention_mask))?
        };
        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        let vectors: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_dtype(DType::F32)?.to_vec2()?;
        tracing::debug!(batch = texts.len(), ms = start.elapsed().as_millis() as u64, "encoded batch");
        Ok(vectors)
    }
}
