// Closed error-kind enumeration for the analysis pipeline.
//
// Every failure a `check` invocation can produce is one of these variants,
// so the CLI can report a tagged message instead of a stringified panic.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A required model file is not on disk.
    #[error("missing model: {0}")]
    MissingModel(String),

    /// The caller supplied something we cannot process (e.g. an undecodable
    /// audio file or an unknown whisper model name).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The tokenizer, ONNX session, or whisper context failed at runtime.
    #[error("model invocation failed: {0}")]
    ModelInvocation(#[from] anyhow::Error),

    /// A model download did not complete.
    #[error("model download failed: {0}")]
    Download(anyhow::Error),

    /// The report could not be serialized to JSON.
    #[error("failed to encode report: {0}")]
    Encode(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
