/// Maps raw similarity scores to the caller-facing confidence in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceScorer {
    boost_factor: f32,
}

impl Default for ConfidenceScorer {
    fn default() -> Self { Self { boost_factor: 1.2 } }
}

impl ConfidenceScorer {
    /// A `boost_factor` below 1 or not finite is treated as 1.
    pub fn new(boost_factor: f32) -> Self {
        let boost_factor = if boost_factor.is_finite() { boost_factor.max(1.0) } else { 1.0 };
        Self { boost_factor }
    }

    pub fn boost_factor(&self) -> f32 { self.boost_factor }

    /// `raw` is a cosine or Jaccard score; negatives count as 0.
    pub fn base(&self, raw: f32) -> f32 {
        if raw.is_nan() { return 0.0; }
        raw.clamp(0.0, 1.0) * 100.0
    }

    /// Base confidence, multiplied by the boost factor for results that
    /// belong to a mentioned entity, capped at 100.
    pub fn score(&self, raw: f32, entity_match: bool) -> f32 {
        let confidence = self.base(raw);
        if entity_match { (confidence * self.boost_factor).min(100.0) } else { confidence }
    }
}
