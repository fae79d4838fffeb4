// Speech-to-text — trait at the seam so the pipeline can run against fakes.
//
// The production backend is whisper.cpp via whisper-rs. NoopTranscriber is
// used on paths where transcription must never happen.

pub mod audio;
pub mod whisper;

use std::path::Path;

use async_trait::async_trait;

use crate::error::{Error, Result};

/// Trait for turning an audio file into text.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe the audio file at `path` and return the full text.
    async fn transcribe_file(&self, path: &Path) -> Result<String>;
}

/// Transcriber used on paths where no audio may be processed (text-only
/// requests, exempt roles). Errors if actually called.
pub struct NoopTranscriber;

#[async_trait]
impl SpeechToText for NoopTranscriber {
    async fn transcribe_file(&self, path: &Path) -> Result<String> {
        Err(Error::ModelInvocation(anyhow::anyhow!(
            "transcriber invoked on a request that must not transcribe: {}",
            path.display()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_transcriber_refuses_to_transcribe() {
        let err = NoopTranscriber
            .transcribe_file(Path::new("/tmp/clip.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ModelInvocation(_)));
    }
}
