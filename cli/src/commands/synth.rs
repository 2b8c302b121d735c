//! `synth` command: text in, WAV plus optional SRT and timestamps out.

use super::utils::{format_seconds, read_input_text, sidecar_path, truncate};
use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use colored::*;
use narrator_core::preprocessing::DEFAULT_MAX_CHUNK_LENGTH;
use narrator_core::runtime_adapter::ExecutionProviderKind;
use narrator_core::tts::request::{DEFAULT_END_SILENCE_SECS, DEFAULT_SILENCE_SECS, DEFAULT_SPEED};
use narrator_core::tts::{
    GenerationRequest, SynthesisProgress, SynthesisWorker, Tts, TtsConfig, TtsResult, WorkerEvent,
    DEFAULT_TOTAL_STEP,
};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct SynthArgs {
    /// Directory holding the ONNX graphs, tts.json and unicode_indexer.json
    #[arg(long, value_name = "DIR", env = "NARRATOR_MODEL_DIR")]
    model_dir: PathBuf,

    /// Voice style directory (default: <model-dir>/voice_styles)
    #[arg(long, value_name = "DIR", env = "NARRATOR_VOICE_DIR")]
    voice_dir: Option<PathBuf>,

    /// Voice id, e.g. "F1"
    #[arg(long)]
    voice: String,

    /// Text to synthesize
    #[arg(short, long, conflicts_with = "file")]
    text: Option<String>,

    /// Read text from a file ("-" for stdin)
    #[arg(short, long, value_name = "FILE")]
    file: Option<PathBuf>,

    /// Speaking rate; durations are divided by this
    #[arg(long, default_value_t = DEFAULT_SPEED)]
    speed: f32,

    /// Silence between units, in seconds
    #[arg(long, default_value_t = DEFAULT_SILENCE_SECS)]
    silence: f32,

    /// Silence appended after the last unit, in seconds
    #[arg(long, default_value_t = DEFAULT_END_SILENCE_SECS)]
    end_silence: f32,

    /// Maximum characters per synthesis unit
    #[arg(long, value_name = "CHARS", default_value_t = DEFAULT_MAX_CHUNK_LENGTH)]
    max_chunk: usize,

    /// Diffusion steps per unit
    #[arg(long, default_value_t = DEFAULT_TOTAL_STEP)]
    steps: usize,

    /// Seed for the latent noise
    #[arg(long)]
    seed: Option<u64>,

    /// Execution provider (cpu, coreml)
    #[arg(long, default_value = "cpu")]
    provider: String,

    /// Output WAV path
    #[arg(short, long, value_name = "FILE", default_value = "out.wav")]
    output: PathBuf,

    /// Also write SRT subtitles (default path: output with .srt)
    #[arg(long, value_name = "FILE", num_args = 0..=1)]
    srt: Option<Option<PathBuf>>,

    /// Also write timestamps as JSON (default path: output with .json)
    #[arg(long, value_name = "FILE", num_args = 0..=1)]
    timestamps: Option<Option<PathBuf>>,
}

pub async fn handle_synth_command(args: SynthArgs) -> Result<()> {
    let text = read_input_text(args.text.clone(), args.file.as_deref())?;
    let provider = ExecutionProviderKind::parse(&args.provider)
        .ok_or_else(|| anyhow!("Unknown execution provider '{}'", args.provider))?;

    let mut config = TtsConfig::new(&args.model_dir)
        .with_total_step(args.steps)
        .with_max_chunk_length(args.max_chunk)
        .with_execution_provider(provider);
    if let Some(voice_dir) = &args.voice_dir {
        config = config.with_voice_dir(voice_dir);
    }

    println!("🔊 Loading models from {}", args.model_dir.display().to_string().cyan());
    let tts = Tts::from_dir(config)
        .with_context(|| format!("Failed to load TTS engine from {}", args.model_dir.display()))?;
    let worker = SynthesisWorker::spawn(tts).context("Failed to start synthesis worker")?;

    let mut request = GenerationRequest::new(text, &args.voice)
        .with_speed(args.speed)
        .with_silence(args.silence)
        .with_end_silence(args.end_silence);
    if let Some(seed) = args.seed {
        request = request.with_seed(seed);
    }

    let result = run_with_progress(&worker, request).await?;
    worker.shutdown().context("Synthesis worker did not shut down cleanly")?;

    write_outputs(&args, &result)?;
    print_summary(&result);
    Ok(())
}

async fn run_with_progress(worker: &SynthesisWorker, request: GenerationRequest) -> Result<TtsResult> {
    let mut events = worker.submit(request)?;
    while let Some(event) = events.recv().await {
        match event {
            WorkerEvent::Progress(SynthesisProgress::Segmented { total_units }) => {
                println!("📝 {} unit(s) to synthesize", total_units.to_string().bold());
            }
            WorkerEvent::Progress(SynthesisProgress::UnitComplete {
                index,
                total,
                duration,
            }) => {
                println!(
                    "   {} [{}/{}] {}",
                    "✓".green(),
                    index + 1,
                    total,
                    format_seconds(duration).dimmed()
                );
            }
            WorkerEvent::Complete(result) => return Ok(result),
            WorkerEvent::Failed(err) => return Err(err).context("Synthesis failed"),
        }
    }
    bail!("Synthesis worker stopped without a result")
}

fn write_outputs(args: &SynthArgs, result: &TtsResult) -> Result<()> {
    result
        .save_wav(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("💾 Audio: {}", args.output.display().to_string().cyan());

    if let Some(path) = resolve_sidecar(&args.srt, &args.output, "srt") {
        result
            .save_srt(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("💾 Subtitles: {}", path.display().to_string().cyan());
    }
    if let Some(path) = resolve_sidecar(&args.timestamps, &args.output, "json") {
        result
            .save_timestamps_json(&path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        println!("💾 Timestamps: {}", path.display().to_string().cyan());
    }
    Ok(())
}

fn resolve_sidecar(flag: &Option<Option<PathBuf>>, output: &Path, extension: &str) -> Option<PathBuf> {
    flag.as_ref()
        .map(|path| path.clone().unwrap_or_else(|| sidecar_path(output, extension)))
}

fn print_summary(result: &TtsResult) {
    println!();
    println!("{}", "📊 Summary:".bold().cyan());
    println!("   Duration:    {}", format_seconds(result.duration));
    println!("   Sample rate: {} Hz", result.sample_rate);
    if let Some(ms) = result.latency_ms {
        let rtf = ms as f64 / 1000.0 / result.duration.max(f64::EPSILON);
        println!("   Latency:     {} ms (RTF {:.2})", ms, rtf);
    }
    for ts in &result.timestamps {
        println!(
            "   {} {} {}",
            format!("{:>7.2}", ts.start).dimmed(),
            format!("{:>7.2}", ts.end).dimmed(),
            truncate(&ts.text, 60)
        );
    }
}
