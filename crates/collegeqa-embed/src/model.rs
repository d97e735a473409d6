use anyhow::{Result, anyhow};
use std::collections::HashMap;
use std::path::Path;
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use collegeqa_core::traits::Embedder;

use crate::device::select_device;
use crate::pool::masked_mean_l2;
use crate::tokenize::tokenize_batch;

/// BGE-M3 (XLM-RoBERTa) sentence embedder loaded from a local model
/// directory holding `tokenizer.json`, `config.json` and either
/// `model.safetensors` or `pytorch_model.bin`.
pub struct BgeM3Embedder {
    model: XLMRobertaModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
    id: String,
}

impl BgeM3Embedder {
    pub fn load(model_dir: &Path, max_len: usize) -> Result<Self> {
        let device = select_device();
        info!(dir = %model_dir.display(), "loading BGE-M3 model");
        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        let config_path = model_dir.join("config.json");
        let config: XLMRobertaConfig = serde_json::from_str(&std::fs::read_to_string(&config_path)?)?;
        let dim = config.hidden_size;
        let dtype = DType::F32;
        let safetensors = model_dir.join("model.safetensors");
        let vb = if safetensors.exists() {
            debug!("loading safetensors weights");
            // SAFETY: the weights file is not modified while the model is alive.
            unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], dtype, &device)? }
        } else {
            debug!("loading pickle weights");
            let weights = candle_core::pickle::read_all(model_dir.join("pytorch_model.bin"))?;
            let weights_map: HashMap<String, Tensor> = weights.into_iter().collect();
            VarBuilder::from_tensors(weights_map, dtype, &device)
        };
        let model = XLMRobertaModel::new(&config, vb)?;
        info!(dim, max_len, "BGE-M3 model loaded");
        Ok(Self { model, tokenizer, device, dim, max_len, id: format!("bge-m3:d{dim}") })
    }

    pub fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_texts(&[text])?.pop().ok_or_else(|| anyhow!("model returned no embedding"))
    }

    /// One forward pass over `texts`, padded to the longest row.
    pub fn embed_texts(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() { return Ok(Vec::new()); }
        let start = Instant::now();
        let (input_ids, attention_mask) = tokenize_batch(&self.tokenizer, texts, self.max_len, &self.device)?;
        let token_type_ids = Tensor::zeros(input_ids.dims(), DType::I64, &self.device)?;
        let hidden_states = self.model.forward(&input_ids, &attention_mask, &token_type_ids, None, None, None)?;
        let pooled = masked_mean_l2(&hidden_states, &attention_mask)?;
        let embeddings: Vec<Vec<f32>> = pooled.to_device(&Device::Cpu)?.to_vec2::<f32>()?;
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dim) {
            return Err(anyhow!("model produced {} components, expected {}", bad.len(), self.dim));
        }
        let elapsed = start.elapsed().as_millis();
        if elapsed > 100 * texts.len() as u128 { debug!(elapsed_ms = elapsed as u64, batch = texts.len(), "slow embedding batch"); }
        Ok(embeddings)
    }
}

impl Embedder for BgeM3Embedder {
    fn embedder_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    fn max_len(&self) -> usize { self.max_len }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        self.embed_texts(&refs)
    }
}
