// Toxicity scorer trait — the swap-ready abstraction.

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Score reported when the classifier did not emit a "toxic" label at all.
pub const FALLBACK_TOXIC_SCORE: f64 = 0.1;

/// One label/score pair from the classifier.
#[derive(Debug, Clone)]
pub struct LabelScore {
    pub label: String,
    /// Probability in 0.0 to 1.0.
    pub score: f64,
}

/// The result of classifying a single piece of text.
#[derive(Debug, Clone, Default)]
pub struct ToxicityResult {
    pub scores: Vec<LabelScore>,
}

impl ToxicityResult {
    /// The score for a specific label, if the classifier emitted it.
    pub fn score_for(&self, label: &str) -> Option<f64> {
        self.scores.iter().find(|s| s.label == label).map(|s| s.score)
    }

    /// The "toxic" label's score, falling back to the fixed default when the
    /// classifier did not produce that label.
    pub fn toxic_score(&self) -> f64 {
        self.score_for("toxic").unwrap_or(FALLBACK_TOXIC_SCORE)
    }
}

/// Trait for scoring text toxicity. Async because inference is offloaded to
/// a blocking thread and future backends may call out over HTTP.
#[async_trait]
pub trait ToxicityScorer: Send + Sync {
    /// Score a single text for toxicity.
    async fn score_text(&self, text: &str) -> Result<ToxicityResult>;
}

/// Scorer used on paths where no scoring may happen (exempt roles).
/// Errors if actually called, so an exempt request can never produce a
/// fabricated score.
pub struct NoopScorer;

#[async_trait]
impl ToxicityScorer for NoopScorer {
    async fn score_text(&self, _text: &str) -> Result<ToxicityResult> {
        Err(Error::ModelInvocation(anyhow::anyhow!(
            "scorer invoked on a request that must not be scored"
        )))
    }
}
