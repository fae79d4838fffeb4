// Local ONNX toxicity scorer using the toxic-bert classifier.
//
// Runs entirely on the local CPU — no API calls, no rate limits, no network
// dependency at analysis time. The model is the ONNX export of
// unitary/toxic-bert (Xenova/toxic-bert, quantized, ~110MB) and emits six
// toxicity categories as sigmoid probabilities.

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Context;
use async_trait::async_trait;
use ort::session::Session;
use ort::value::Tensor;
use tokenizers::Tokenizer;
use tracing::debug;

use super::traits::{LabelScore, ToxicityResult, ToxicityScorer};
use crate::error::{Error, Result};

/// Labels output by toxic-bert, in the order the model returns them.
const LABEL_ORDER: [&str; 6] = [
    "toxic",
    "severe_toxic",
    "obscene",
    "threat",
    "insult",
    "identity_hate",
];

const MODEL_FILE: &str = "model_quantized.onnx";
const TOKENIZER_FILE: &str = "tokenizer.json";

/// Local ONNX-based toxicity scorer. Holds the model session and tokenizer
/// behind Arc<Mutex> so inference can be offloaded to spawn_blocking without
/// blocking the async runtime: ort::Session::run takes &mut self, and the
/// closure needs 'static ownership.
#[derive(Debug)]
pub struct OnnxToxicityScorer {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
}

impl OnnxToxicityScorer {
    /// Load the ONNX model and tokenizer from the given directory.
    ///
    /// Expects `model_quantized.onnx` and `tokenizer.json` to exist in
    /// `model_dir`; `hallpass download-models` fetches them.
    pub fn load(model_dir: &Path) -> Result<Self> {
        let model_path = model_dir.join(MODEL_FILE);
        let tokenizer_path = model_dir.join(TOKENIZER_FILE);

        if !model_path.exists() {
            return Err(Error::MissingModel(format!(
                "{} (run `hallpass download-models`)",
                model_path.display()
            )));
        }
        if !tokenizer_path.exists() {
            return Err(Error::MissingModel(format!(
                "{} (run `hallpass download-models`)",
                tokenizer_path.display()
            )));
        }

        let session = Session::builder()
            .context("failed to create ONNX session builder")?
            .commit_from_file(&model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| Error::ModelInvocation(anyhow::anyhow!("failed to load tokenizer: {e}")))?;

        debug!("loaded ONNX toxicity model from {}", model_dir.display());

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
        })
    }
}

#[async_trait]
impl ToxicityScorer for OnnxToxicityScorer {
    /// Tokenize the text, run one forward pass, and apply sigmoid to the six
    /// logits. Tokenization and inference are CPU-bound, so both run inside
    /// spawn_blocking.
    async fn score_text(&self, text: &str) -> Result<ToxicityResult> {
        let session = Arc::clone(&self.session);
        let tokenizer = Arc::clone(&self.tokenizer);
        let owned = text.to_string();

        let probabilities = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<f64>> {
            let encoding = tokenizer
                .encode(owned.as_str(), true)
                .map_err(|e| anyhow::anyhow!("tokenization failed: {e}"))?;

            let seq_len = encoding.get_ids().len();
            let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
            let attention_mask: Vec<i64> = encoding
                .get_attention_mask()
                .iter()
                .map(|&m| m as i64)
                .collect();
            // BERT expects a segment id per token; single-sentence input is all zeros.
            let token_type_ids: Vec<i64> =
                encoding.get_type_ids().iter().map(|&t| t as i64).collect();

            let shape = [1_i64, seq_len as i64];

            let input_ids_tensor =
                Tensor::from_array((shape, input_ids)).context("failed to create input_ids tensor")?;
            let attention_mask_tensor = Tensor::from_array((shape, attention_mask))
                .context("failed to create attention_mask tensor")?;
            let token_type_ids_tensor = Tensor::from_array((shape, token_type_ids))
                .context("failed to create token_type_ids tensor")?;

            let mut session = session
                .lock()
                .map_err(|e| anyhow::anyhow!("session lock poisoned: {e}"))?;

            let outputs = session
                .run(ort::inputs! {
                    "input_ids" => input_ids_tensor,
                    "attention_mask" => attention_mask_tensor,
                    "token_type_ids" => token_type_ids_tensor
                })
                .context("ONNX inference failed")?;

            // Output shape: [1, 6] — raw logits (pre-sigmoid)
            let (_out_shape, logits) = outputs[0]
                .try_extract_tensor::<f32>()
                .context("failed to extract output tensor")?;

            Ok(logits
                .iter()
                .take(LABEL_ORDER.len())
                .map(|&logit| sigmoid(logit as f64))
                .collect())
        })
        .await
        .map_err(|e| anyhow::anyhow!("inference task panicked: {e}"))??;

        let result = ToxicityResult {
            scores: LABEL_ORDER
                .iter()
                .zip(&probabilities)
                .map(|(label, &score)| LabelScore {
                    label: label.to_string(),
                    score,
                })
                .collect(),
        };

        debug!(
            toxic = result.toxic_score(),
            text_preview = %crate::output::truncate_chars(text, 50),
            "ONNX scored text"
        );

        Ok(result)
    }
}

/// Sigmoid activation: maps any real number to (0, 1).
fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}
