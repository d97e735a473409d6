use anyhow::{Result, ensure};
use candle_core::{DType, Tensor};

/// Sentence embeddings from token states: the mean over positions whose
/// `attention_mask` is non-zero, scaled to unit length.
///
/// `hidden` is `[B, T, H]`; `attention_mask` is `[B, T]` in any numeric
/// dtype. Returns `[B, H]`. A row with no unmasked tokens pools to zeros.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, tokens, hidden_dim) = hidden.dims3()?;
    ensure!(
        attention_mask.dims() == [batch, tokens],
        "attention mask {:?} does not cover hidden states [{batch}, {tokens}, {hidden_dim}]",
        attention_mask.dims()
    );
    let dtype = hidden.dtype();
    let device = hidden.device();

    let mask = attention_mask.to_device(device)?.to_dtype(dtype)?;
    let summed = hidden.broadcast_mul(&mask.unsqueeze(2)?)?.sum(1)?;
    let one = Tensor::ones((1, 1), dtype, device)?;
    let counts = mask.sum_keepdim(1)?.broadcast_maximum(&one)?;
    let mean = summed.broadcast_div(&counts)?;

    let eps = match dtype { DType::F16 | DType::BF16 => 1e-6f64, _ => 1e-12f64 };
    let floor = Tensor::new(&[[eps]], device)?.to_dtype(dtype)?;
    let norm = mean.sqr()?.sum_keepdim(1)?.sqrt()?.broadcast_maximum(&floor)?;
    Ok(mean.broadcast_div(&norm)?)
}
