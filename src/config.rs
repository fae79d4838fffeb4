use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::transcribe::whisper::WhisperModel;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy. Everything
/// has a default, so a bare `hallpass check` works once models are present.
pub struct Config {
    /// Directory containing the model files.
    pub model_dir: PathBuf,
    /// Which whisper model size to use (default: base).
    pub whisper_model: WhisperModel,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let model_dir = env::var("HALLPASS_MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| crate::download::default_model_dir());

        let whisper_model = match env::var("HALLPASS_WHISPER_MODEL") {
            Ok(name) => name.parse().map_err(Error::InvalidInput)?,
            Err(_) => WhisperModel::Base,
        };

        Ok(Self {
            model_dir,
            whisper_model,
        })
    }

    /// Path to the configured whisper ggml file.
    pub fn whisper_model_path(&self) -> PathBuf {
        self.model_dir.join(self.whisper_model.filename())
    }

    /// Check that the toxicity model files are on disk.
    /// Call this before loading the ONNX scorer.
    pub fn require_toxicity_model(&self) -> Result<()> {
        if !crate::download::toxicity_files_present(&self.model_dir) {
            return Err(Error::MissingModel(format!(
                "toxicity model files not found in {} (run `hallpass download-models`)",
                self.model_dir.display()
            )));
        }
        Ok(())
    }

    /// Check that the whisper model file is on disk.
    /// Call this before loading the transcriber.
    pub fn require_whisper_model(&self) -> Result<()> {
        let path = self.whisper_model_path();
        if !path.exists() {
            return Err(Error::MissingModel(format!(
                "whisper model not found at {} (run `hallpass download-models`)",
                path.display()
            )));
        }
        Ok(())
    }
}
