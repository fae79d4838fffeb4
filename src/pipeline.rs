// Linear analysis driver: role gate -> transcript selection -> toxicity score.

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::output::{self, Report};
use crate::policy;
use crate::toxicity::traits::ToxicityScorer;
use crate::transcribe::SpeechToText;

/// Transcript placeholder reported when an exempt request carried audio.
pub const AUDIO_ANALYZED_PLACEHOLDER: &str = "Audio analyzed";

/// One analysis request, straight from the command line.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    /// Path to an audio file, or the "none" sentinel.
    pub audio_path: String,
    /// Text to analyze when no usable audio is given.
    pub text: String,
    /// Claimed role, normalized by the pipeline.
    pub role: String,
}

impl AnalysisRequest {
    /// Whether the audio argument names a real file to transcribe. The
    /// "none" sentinel and paths that don't exist both fall back to the
    /// text argument without error.
    pub fn has_audio(&self) -> bool {
        self.audio_path != policy::SENTINEL_NONE && Path::new(&self.audio_path).exists()
    }
}

/// Run one analysis. Callers decide which scorer/transcriber to supply; on
/// exempt paths neither is touched, so noop implementations are safe there.
pub async fn analyze(
    request: &AnalysisRequest,
    transcriber: &dyn SpeechToText,
    scorer: &dyn ToxicityScorer,
) -> Result<Report> {
    let role = policy::normalize_role(&request.role);

    if policy::is_exempt(&role) {
        // Sentinel check only: an exempt request never inspects the disk.
        let transcript = if request.audio_path == policy::SENTINEL_NONE {
            request.text.clone()
        } else {
            AUDIO_ANALYZED_PLACEHOLDER.to_string()
        };
        debug!(role = %role, "role is exempt, skipping analysis");
        return Ok(Report::exempt(transcript, role));
    }

    let transcript = if request.has_audio() {
        transcriber
            .transcribe_file(Path::new(&request.audio_path))
            .await?
    } else {
        request.text.clone()
    };

    let result = scorer.score_text(&transcript).await?;
    let score = result.toxic_score();

    debug!(
        score,
        transcript_preview = %output::truncate_chars(&transcript, 50),
        "analysis complete"
    );

    Ok(Report::evaluated(transcript, score, role))
}
