// Whisper.cpp integration via the whisper-rs bindings.
//
// Greedy sampling, language auto-detection, segment texts joined into one
// transcript string. Inference runs inside spawn_blocking.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use super::{audio, SpeechToText};
use crate::error::{Error, Result};

/// Available ggml model sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WhisperModel {
    Tiny,
    Base,
    Small,
    Medium,
    Large,
}

impl WhisperModel {
    /// The ggml filename for this model.
    pub fn filename(&self) -> &'static str {
        match self {
            WhisperModel::Tiny => "ggml-tiny.bin",
            WhisperModel::Base => "ggml-base.bin",
            WhisperModel::Small => "ggml-small.bin",
            WhisperModel::Medium => "ggml-medium.bin",
            WhisperModel::Large => "ggml-large-v3.bin",
        }
    }

    /// Approximate download size in MB.
    pub fn approx_size_mb(&self) -> u64 {
        match self {
            WhisperModel::Tiny => 75,
            WhisperModel::Base => 142,
            WhisperModel::Small => 466,
            WhisperModel::Medium => 1500,
            WhisperModel::Large => 3100,
        }
    }
}

impl std::fmt::Display for WhisperModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WhisperModel::Tiny => write!(f, "tiny"),
            WhisperModel::Base => write!(f, "base"),
            WhisperModel::Small => write!(f, "small"),
            WhisperModel::Medium => write!(f, "medium"),
            WhisperModel::Large => write!(f, "large"),
        }
    }
}

impl std::str::FromStr for WhisperModel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tiny" => Ok(WhisperModel::Tiny),
            "base" => Ok(WhisperModel::Base),
            "small" => Ok(WhisperModel::Small),
            "medium" => Ok(WhisperModel::Medium),
            "large" => Ok(WhisperModel::Large),
            _ => Err(format!(
                "unknown whisper model: {s} (use tiny, base, small, medium, or large)"
            )),
        }
    }
}

/// Whisper-backed transcriber. The context is behind an Arc so inference can
/// move to a blocking thread; per-call state is created fresh each time.
pub struct WhisperTranscriber {
    ctx: Arc<WhisperContext>,
    n_threads: i32,
}

impl std::fmt::Debug for WhisperTranscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WhisperTranscriber")
            .field("n_threads", &self.n_threads)
            .finish_non_exhaustive()
    }
}

impl WhisperTranscriber {
    /// Load a ggml model from disk.
    pub fn load(model_path: &Path) -> Result<Self> {
        if !model_path.exists() {
            return Err(Error::MissingModel(format!(
                "{} (run `hallpass download-models`)",
                model_path.display()
            )));
        }

        let path_str = model_path.to_str().ok_or_else(|| {
            Error::InvalidInput(format!("non-UTF-8 model path: {}", model_path.display()))
        })?;

        info!("loading whisper model from {}", model_path.display());

        let ctx = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| {
                Error::ModelInvocation(anyhow::anyhow!("failed to load whisper model: {e}"))
            })?;

        // Leave one core for the rest of the process.
        let n_threads = std::thread::available_parallelism()
            .map(|p| (p.get() as i32 - 1).max(1))
            .unwrap_or(4);

        Ok(Self {
            ctx: Arc::new(ctx),
            n_threads,
        })
    }
}

#[async_trait]
impl SpeechToText for WhisperTranscriber {
    async fn transcribe_file(&self, path: &Path) -> Result<String> {
        let samples = audio::load_wav_16k_mono(path)?;
        debug!(
            samples = samples.len(),
            path = %path.display(),
            "transcribing audio"
        );

        let ctx = Arc::clone(&self.ctx);
        let n_threads = self.n_threads;

        let text = tokio::task::spawn_blocking(move || -> anyhow::Result<String> {
            // Greedy sampling: beam search is 2-3x slower for marginal gain
            // on short clips.
            let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 1 });
            params.set_n_threads(n_threads);
            params.set_language(Some("auto"));
            params.set_translate(false);
            params.set_no_context(true);
            params.set_print_progress(false);
            params.set_print_realtime(false);
            params.set_print_timestamps(false);
            params.set_print_special(false);

            let mut state = ctx
                .create_state()
                .map_err(|e| anyhow::anyhow!("failed to create whisper state: {e}"))?;
            state
                .full(params, &samples)
                .map_err(|e| anyhow::anyhow!("whisper inference failed: {e}"))?;

            let num_segments = state
                .full_n_segments()
                .map_err(|e| anyhow::anyhow!("failed to read segment count: {e}"))?;

            let mut text = String::new();
            for i in 0..num_segments {
                let segment = state
                    .full_get_segment_text(i)
                    .map_err(|e| anyhow::anyhow!("failed to read segment {i}: {e}"))?;
                let segment = segment.trim();
                if segment.is_empty() {
                    continue;
                }
                if !text.is_empty() {
                    text.push(' ');
                }
                text.push_str(segment);
            }

            Ok(text)
        })
        .await
        .map_err(|e| anyhow::anyhow!("transcription task panicked: {e}"))??;

        Ok(text)
    }
}
