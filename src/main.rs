use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use hallpass::config::Config;
use hallpass::error::{Error, Result};
use hallpass::output::{ErrorReport, Report};
use hallpass::pipeline::{self, AnalysisRequest};
use hallpass::policy;
use hallpass::toxicity::onnx::OnnxToxicityScorer;
use hallpass::toxicity::traits::NoopScorer;
use hallpass::transcribe::whisper::WhisperTranscriber;
use hallpass::transcribe::{NoopTranscriber, SpeechToText};

/// Hallpass: role-aware toxicity screening for classroom voice and text.
///
/// Transcribes an audio clip (or takes text directly), scores it for
/// toxicity with a local classifier, and prints one JSON report per
/// invocation. Teacher and admin roles bypass analysis entirely.
#[derive(Parser)]
#[command(name = "hallpass", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze one audio clip or text snippet and print a JSON report
    Check {
        /// Path to a WAV clip, or "none" to analyze the text argument
        #[arg(default_value = "none")]
        audio: String,

        /// Text to analyze when no usable audio is given
        #[arg(default_value = "none")]
        text: String,

        /// Reserved; accepted for interface compatibility, never consulted
        #[arg(default_value = "1.0")]
        distance: String,

        /// Claimed role of the speaker (TEACHER and ADMIN are exempt)
        #[arg(default_value = "STUDENT")]
        role: String,
    },

    /// Download the toxicity and speech models (~250 MB total)
    DownloadModels,
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // All logging goes to stderr; stdout carries only the JSON report.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("hallpass=info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        let report = ErrorReport::new(&e);
        // Serializing a plain string field cannot realistically fail; the
        // fallback is a fixed literal so the output stays valid JSON.
        let json = serde_json::to_string(&report)
            .unwrap_or_else(|_| r#"{"error":"failed to encode error report"}"#.to_string());
        println!("{json}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Check {
            audio,
            text,
            distance: _,
            role,
        } => {
            let request = AnalysisRequest {
                audio_path: audio,
                text,
                role,
            };
            let report = check(&request).await?;
            println!("{}", serde_json::to_string(&report)?);
        }

        Commands::DownloadModels => {
            let config = Config::load()?;

            println!("Downloading models...");
            println!("  Destination: {}", config.model_dir.display());

            hallpass::download::download_models(&config.model_dir, config.whisper_model)
                .await
                .map_err(Error::Download)?;

            println!("\n{}", "Models downloaded successfully.".bold());
            println!("You can now run `hallpass check <clip.wav> none 1.0 STUDENT`.");
        }
    }

    Ok(())
}

/// Run one analysis, loading models only when the request actually needs
/// them. Exempt roles never pay the model-load cost; text-only requests
/// never load the whisper model.
async fn check(request: &AnalysisRequest) -> Result<Report> {
    if policy::is_exempt(&policy::normalize_role(&request.role)) {
        return pipeline::analyze(request, &NoopTranscriber, &NoopScorer).await;
    }

    let config = Config::load()?;
    config.require_toxicity_model()?;
    let scorer = OnnxToxicityScorer::load(&config.model_dir)?;
    info!("loaded toxicity model");

    let transcriber: Box<dyn SpeechToText> = if request.has_audio() {
        config.require_whisper_model()?;
        Box::new(WhisperTranscriber::load(&config.whisper_model_path())?)
    } else {
        Box::new(NoopTranscriber)
    };

    pipeline::analyze(request, transcriber.as_ref(), &scorer).await
}
