use collegeqa_core::error::{Error, Result};
use collegeqa_core::traits::rank_top_k;
use collegeqa_core::types::DocId;

/// Scale `v` to unit length in place. Zero vectors are left untouched.
pub fn l2_normalize(v: &mut [f32]) {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in v.iter_mut() { *x /= norm; }
    }
}

/// Brute-force inner-product index. Vectors are stored row-major; row `i`
/// belongs to document `i`, so the index never reorders or drops entries.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dim: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    /// Build from unit-length vectors, all of dimension `dim`.
    pub fn build(dim: usize, vectors: Vec<Vec<f32>>) -> Result<Self> {
        let mut data = Vec::with_capacity(dim * vectors.len());
        for v in vectors {
            if v.len() != dim { return Err(Error::DimensionMismatch { expected: dim, found: v.len() }); }
            data.extend(v);
        }
        Ok(Self { dim, data })
    }

    pub fn dim(&self) -> usize { self.dim }

    pub fn len(&self) -> usize { if self.dim == 0 { 0 } else { self.data.len() / self.dim } }

    pub fn is_empty(&self) -> bool { self.data.is_empty() }

    /// Top-`k` rows by inner product with `query`, descending, ties in row order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(DocId, f32)>> {
        if query.len() != self.dim { return Err(Error::DimensionMismatch { expected: self.dim, found: query.len() }); }
        if self.is_empty() || k == 0 { return Ok(Vec::new()); }
        let scored = self
            .data
            .chunks_exact(self.dim)
            .enumerate()
            .map(|(i, row)| (i, row.iter().zip(query).map(|(a, b)| a * b).sum::<f32>()))
            .collect();
        Ok(rank_top_k(scored, k))
    }
}
