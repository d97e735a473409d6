use anyhow::{Result, anyhow};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// XLM-RoBERTa `<pad>` id.
pub const PAD_ID: u32 = 1;

/// Encode a batch into `[B, L]` id and attention-mask tensors.
///
/// `L` is the longest encoding in the batch capped at `max_len`; shorter rows
/// are padded with [`PAD_ID`] and mask 0.
pub fn tokenize_batch(tokenizer: &Tokenizer, texts: &[&str], max_len: usize, device: &Device) -> Result<(Tensor, Tensor)> {
    let encodings = tokenizer
        .encode_batch(texts.to_vec(), true)
        .map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let width = encodings.iter().map(|e| e.get_ids().len()).max().unwrap_or(0).clamp(1, max_len.max(1));

    let mut ids = Vec::with_capacity(encodings.len() * width);
    let mut mask = Vec::with_capacity(encodings.len() * width);
    for enc in &encodings {
        let n = enc.get_ids().len().min(width);
        ids.extend_from_slice(&enc.get_ids()[..n]);
        mask.extend_from_slice(&enc.get_attention_mask()[..n]);
        ids.extend(std::iter::repeat(PAD_ID).take(width - n));
        mask.extend(std::iter::repeat(0u32).take(width - n));
    }
    let rows = encodings.len();
    let input_ids = Tensor::from_vec(ids, (rows, width), device)?;
    let attention_mask = Tensor::from_vec(mask, (rows, width), device)?;
    Ok((input_ids, attention_mask))
}
