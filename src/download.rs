// Model acquisition for the toxicity classifier and the whisper speech model.
//
// Downloads two models from HuggingFace:
// 1. toxic-bert ONNX export (Xenova/toxic-bert, quantized, ~110MB)
// 2. whisper.cpp ggml weights (ggerganov/whisper.cpp, size per model)
//
// Files are stored in a platform-appropriate directory
// (~/.local/share/hallpass/models/ on Linux) so they persist across runs.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::transcribe::whisper::WhisperModel;

/// HuggingFace repo for the toxicity model.
const TOXICITY_HF_URL: &str = "https://huggingface.co/Xenova/toxic-bert/resolve/main";

/// HuggingFace repo for the whisper ggml weights.
const WHISPER_HF_URL: &str = "https://huggingface.co/ggerganov/whisper.cpp/resolve/main";

/// Local filenames for the toxicity model.
const TOXICITY_MODEL_FILE: &str = "model_quantized.onnx";
const TOXICITY_TOKENIZER_FILE: &str = "tokenizer.json";

/// Remote path of the ONNX file within the repo.
const TOXICITY_MODEL_REMOTE: &str = "onnx/model_quantized.onnx";

/// Returns the default directory for storing model files.
/// Uses the platform data directory: ~/.local/share/hallpass/models/ on Linux.
pub fn default_model_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("hallpass")
        .join("models")
}

/// Check whether both required toxicity model files exist.
pub fn toxicity_files_present(dir: &Path) -> bool {
    dir.join(TOXICITY_MODEL_FILE).exists() && dir.join(TOXICITY_TOKENIZER_FILE).exists()
}

/// Download both models. Shows progress bars for large files, skips files
/// that already exist, and creates directories as needed.
pub async fn download_models(dir: &Path, whisper_model: WhisperModel) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create model directory: {}", dir.display()))?;

    println!("\nToxicity model (toxic-bert):");

    let tokenizer_path = dir.join(TOXICITY_TOKENIZER_FILE);
    if tokenizer_path.exists() {
        info!("toxicity tokenizer already exists, skipping");
        println!("  {TOXICITY_TOKENIZER_FILE} (already exists)");
    } else {
        println!("  Downloading {TOXICITY_TOKENIZER_FILE}...");
        download_file(
            &format!("{TOXICITY_HF_URL}/{TOXICITY_TOKENIZER_FILE}"),
            &tokenizer_path,
            false,
        )
        .await?;
    }

    let model_path = dir.join(TOXICITY_MODEL_FILE);
    if model_path.exists() {
        info!("toxicity model already exists, skipping");
        println!("  {TOXICITY_MODEL_FILE} (already exists)");
    } else {
        println!("  Downloading {TOXICITY_MODEL_FILE} (~110 MB)...");
        download_file(
            &format!("{TOXICITY_HF_URL}/{TOXICITY_MODEL_REMOTE}"),
            &model_path,
            true,
        )
        .await?;
    }

    println!("\nSpeech model (whisper {whisper_model}):");

    let whisper_path = dir.join(whisper_model.filename());
    if whisper_path.exists() {
        info!("whisper model already exists, skipping");
        println!("  {} (already exists)", whisper_model.filename());
    } else {
        println!(
            "  Downloading {} (~{} MB)...",
            whisper_model.filename(),
            whisper_model.approx_size_mb()
        );
        download_file(
            &format!("{WHISPER_HF_URL}/{}", whisper_model.filename()),
            &whisper_path,
            true,
        )
        .await?;
    }

    Ok(())
}

/// Download a single file from a URL to a local path.
/// If `show_progress` is true, display a progress bar.
///
/// The body is streamed to a `.tmp` sibling and renamed into place only once
/// the whole response has landed. Whisper ggml files run into gigabytes, so
/// the body must never be buffered in memory, and an interrupted download
/// must never leave a truncated file where the presence checks would treat
/// it as a valid model.
async fn download_file(url: &str, dest: &Path, show_progress: bool) -> Result<()> {
    let client = reqwest::Client::new();
    let mut response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed to download {url}"))?;

    if !response.status().is_success() {
        anyhow::bail!("download failed with status {}: {}", response.status(), url);
    }

    let total_size = response.content_length();

    let pb = if show_progress {
        let pb = if let Some(size) = total_size {
            let pb = ProgressBar::new(size);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("    [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
                    .expect("valid template")
                    .progress_chars("=> "),
            );
            pb
        } else {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("    {spinner} {bytes}")
                    .expect("valid template"),
            );
            pb
        };
        Some(pb)
    } else {
        None
    };

    let tmp_path = dest.with_extension("tmp");
    let mut file = File::create(&tmp_path)
        .with_context(|| format!("failed to create {}", tmp_path.display()))?;
    let mut downloaded: u64 = 0;

    while let Some(chunk) = response
        .chunk()
        .await
        .context("failed to read response body")?
    {
        file.write_all(&chunk)
            .with_context(|| format!("failed to write {}", tmp_path.display()))?;
        downloaded += chunk.len() as u64;
        if let Some(ref pb) = pb {
            pb.set_position(downloaded);
        }
    }

    drop(file);
    fs::rename(&tmp_path, dest)
        .with_context(|| format!("failed to move {} into place", dest.display()))?;

    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    info!("downloaded {} to {}", url, dest.display());
    Ok(())
}
