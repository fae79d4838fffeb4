// End-to-end pipeline tests using fake scorer and transcriber implementations.
//
// The traits are the seam: no model files, network access, or audio decoding
// is involved here. The real ONNX and whisper backends have their own unit
// tests next to their implementations.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use hallpass::error::Result;
use hallpass::output::{ANALYZED_REASON, EXEMPT_REASON};
use hallpass::pipeline::{analyze, AnalysisRequest, AUDIO_ANALYZED_PLACEHOLDER};
use hallpass::toxicity::traits::{LabelScore, ToxicityResult, ToxicityScorer};
use hallpass::transcribe::SpeechToText;

/// Scorer returning canned label scores, recording every text it was given.
struct FakeScorer {
    labels: Vec<(&'static str, f64)>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl FakeScorer {
    fn with_labels(labels: Vec<(&'static str, f64)>) -> Self {
        Self {
            labels,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    fn toxic(score: f64) -> Self {
        Self::with_labels(vec![("toxic", score)])
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToxicityScorer for FakeScorer {
    async fn score_text(&self, text: &str) -> Result<ToxicityResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(text.to_string());
        Ok(ToxicityResult {
            scores: self
                .labels
                .iter()
                .map(|(label, score)| LabelScore {
                    label: label.to_string(),
                    score: *score,
                })
                .collect(),
        })
    }
}

/// Transcriber returning a canned transcript, counting invocations.
struct FakeTranscriber {
    transcript: &'static str,
    calls: AtomicUsize,
}

impl FakeTranscriber {
    fn new(transcript: &'static str) -> Self {
        Self {
            transcript,
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SpeechToText for FakeTranscriber {
    async fn transcribe_file(&self, _path: &Path) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.transcript.to_string())
    }
}

fn request(audio: &str, text: &str, role: &str) -> AnalysisRequest {
    AnalysisRequest {
        audio_path: audio.to_string(),
        text: text.to_string(),
        role: role.to_string(),
    }
}

#[tokio::test]
async fn teacher_role_is_exempt_regardless_of_text() {
    let transcriber = FakeTranscriber::new("should not be used");
    let scorer = FakeScorer::toxic(0.99);

    let report = analyze(&request("none", "you are awful", "teacher"), &transcriber, &scorer)
        .await
        .unwrap();

    assert_eq!(report.toxicity_score, 0.0);
    assert_eq!(report.reason, EXEMPT_REASON);
    assert_eq!(report.role_detected, "TEACHER");
    assert_eq!(report.transcribed_text, "you are awful");
    assert_eq!(report.is_aggressive, None);
    assert_eq!(scorer.call_count(), 0, "exempt path must never score");
    assert_eq!(transcriber.call_count(), 0, "exempt path must never transcribe");
}

#[tokio::test]
async fn role_normalization_variants_are_equivalent() {
    for role in [" Teacher ", "teacher", "TEACHER", "admin", " ADMIN "] {
        let transcriber = FakeTranscriber::new("unused");
        let scorer = FakeScorer::toxic(0.9);

        let report = analyze(&request("none", "hi", role), &transcriber, &scorer)
            .await
            .unwrap();

        assert_eq!(report.toxicity_score, 0.0, "role {role:?} should be exempt");
        assert_eq!(report.reason, EXEMPT_REASON);
        assert_eq!(report.role_detected, role.trim().to_uppercase());
    }
}

#[tokio::test]
async fn exempt_with_audio_reports_placeholder() {
    let transcriber = FakeTranscriber::new("unused");
    let scorer = FakeScorer::toxic(0.9);

    // The path does not exist; the exempt branch only checks the sentinel.
    let report = analyze(
        &request("/recordings/clip.wav", "fallback", "ADMIN"),
        &transcriber,
        &scorer,
    )
    .await
    .unwrap();

    assert_eq!(report.transcribed_text, AUDIO_ANALYZED_PLACEHOLDER);
    assert_eq!(report.toxicity_score, 0.0);
    assert_eq!(transcriber.call_count(), 0);
}

#[tokio::test]
async fn student_text_passes_through_verbatim() {
    let transcriber = FakeTranscriber::new("unused");
    let scorer = FakeScorer::toxic(0.0123);

    let report = analyze(&request("none", "hello world", "STUDENT"), &transcriber, &scorer)
        .await
        .unwrap();

    assert_eq!(report.transcribed_text, "hello world");
    assert_eq!(report.toxicity_score, 0.0123);
    assert_eq!(report.role_detected, "STUDENT");
    assert_eq!(report.reason, ANALYZED_REASON);
    assert_eq!(report.is_aggressive, Some(false));
    assert_eq!(transcriber.call_count(), 0);
}

#[tokio::test]
async fn missing_audio_file_falls_back_to_text() {
    let transcriber = FakeTranscriber::new("unused");
    let scorer = FakeScorer::toxic(0.2);

    let report = analyze(
        &request("/no/such/file.wav", "backup text", "STUDENT"),
        &transcriber,
        &scorer,
    )
    .await
    .unwrap();

    assert_eq!(report.transcribed_text, "backup text");
    assert_eq!(
        transcriber.call_count(),
        0,
        "nonexistent audio must not reach the transcriber"
    );
}

#[tokio::test]
async fn existing_audio_file_is_transcribed() {
    let file = tempfile::NamedTempFile::new().unwrap();
    let audio_path = file.path().to_string_lossy().into_owned();

    let transcriber = FakeTranscriber::new("good morning class");
    let scorer = FakeScorer::toxic(0.05);

    let report = analyze(
        &request(&audio_path, "fallback", "STUDENT"),
        &transcriber,
        &scorer,
    )
    .await
    .unwrap();

    assert_eq!(report.transcribed_text, "good morning class");
    assert_eq!(transcriber.call_count(), 1);
    assert_eq!(scorer.seen.lock().unwrap().as_slice(), ["good morning class"]);
}

#[tokio::test]
async fn double_none_scores_the_literal_sentinel() {
    let transcriber = FakeTranscriber::new("unused");
    let scorer = FakeScorer::toxic(0.3);

    let report = analyze(&request("none", "none", "STUDENT"), &transcriber, &scorer)
        .await
        .unwrap();

    assert_eq!(report.transcribed_text, "none");
    assert_eq!(scorer.seen.lock().unwrap().as_slice(), ["none"]);
}

#[tokio::test]
async fn missing_toxic_label_defaults_to_fallback() {
    let transcriber = FakeTranscriber::new("unused");
    let scorer = FakeScorer::with_labels(vec![("insult", 0.9), ("threat", 0.8)]);

    let report = analyze(&request("none", "whatever", "STUDENT"), &transcriber, &scorer)
        .await
        .unwrap();

    assert_eq!(report.toxicity_score, 0.1);
}

#[tokio::test]
async fn score_is_rounded_to_four_decimals() {
    let transcriber = FakeTranscriber::new("unused");
    let scorer = FakeScorer::toxic(0.123456789);

    let report = analyze(&request("none", "text", "STUDENT"), &transcriber, &scorer)
        .await
        .unwrap();

    assert_eq!(report.toxicity_score, 0.1235);
    assert!(report.toxicity_score >= 0.0 && report.toxicity_score <= 1.0);
}

#[tokio::test]
async fn report_json_uses_wire_field_names() {
    let transcriber = FakeTranscriber::new("unused");
    let scorer = FakeScorer::toxic(0.5);

    let evaluated = analyze(&request("none", "text", "STUDENT"), &transcriber, &scorer)
        .await
        .unwrap();
    let evaluated = serde_json::to_value(&evaluated).unwrap();

    assert!(evaluated.get("transcribedText").is_some());
    assert!(evaluated.get("toxicityScore").is_some());
    assert!(evaluated.get("roleDetected").is_some());
    assert_eq!(evaluated["isAggressive"], false);
    assert_eq!(evaluated["reason"], ANALYZED_REASON);

    let exempt = analyze(&request("none", "text", "TEACHER"), &transcriber, &scorer)
        .await
        .unwrap();
    let exempt = serde_json::to_value(&exempt).unwrap();

    assert!(
        exempt.get("isAggressive").is_none(),
        "exempt reports must not carry the isAggressive placeholder"
    );
    assert_eq!(exempt["reason"], EXEMPT_REASON);
}
