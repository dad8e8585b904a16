//! Application entry point — Audio-to-Text CLI.
//!
//! # Run sequence
//!
//! 1. Initialise logging.
//! 2. Parse the command line ([`Cli`]).
//! 3. Read the input file and derive its [`AudioFormat`] from the extension.
//! 4. Build a [`Session`] over the per-user weights cache.
//! 5. Run Normalizer → (optional) Suppressor → Transcriber, blocking.
//! 6. Print the transcript (and segments, when requested); optionally write
//!    `transcricao.txt` next to it.

use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;

use audio_to_text::audio::AudioFormat;
use audio_to_text::export::export_transcript;
use audio_to_text::pipeline::{RunOptions, Session};
use audio_to_text::stt::{DEFAULT_MODEL_ID, MODELS};

// ---------------------------------------------------------------------------
// Cli
// ---------------------------------------------------------------------------

/// Transcribe an audio file with a local Whisper model.
#[derive(Parser)]
#[command(name = "audio-to-text")]
struct Cli {
    /// Input audio file (.m4a, .mp3 or .wav). Optional with --list-models.
    input: Option<PathBuf>,

    /// Model identifier (see --list-models).
    #[arg(long, default_value = DEFAULT_MODEL_ID)]
    model: String,

    /// Apply noise suppression before transcription.
    #[arg(long)]
    denoise: bool,

    /// Print per-segment timestamps alongside the transcript.
    #[arg(long)]
    timestamps: bool,

    /// Write the transcript as transcricao.txt into this directory.
    #[arg(long, value_name = "DIR")]
    export: Option<PathBuf>,

    /// List the available model identifiers and exit.
    #[arg(long)]
    list_models: bool,
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    if cli.list_models {
        print_models();
        return Ok(());
    }

    let Some(input_path) = cli.input else {
        bail!("no input file given (use --list-models to see available models)");
    };

    // Container hint comes from the filename extension, as uploaded files
    // carry no other format declaration.
    let format = input_path
        .extension()
        .and_then(|e| e.to_str())
        .and_then(AudioFormat::from_extension)
        .with_context(|| {
            format!(
                "unsupported file extension on {} (expected .m4a, .mp3 or .wav)",
                input_path.display()
            )
        })?;

    let input = fs::read(&input_path)
        .with_context(|| format!("failed to read {}", input_path.display()))?;

    let options = RunOptions {
        model_id: cli.model,
        denoise: cli.denoise,
        timestamps: cli.timestamps,
    };

    let mut session = Session::with_default_cache();
    let result = session
        .run(&input, format, &options)
        .context("transcription failed")?;

    if cli.timestamps {
        for seg in &result.segments {
            println!(
                "[{} --> {}] {}",
                format_ms(seg.start_ms),
                format_ms(seg.end_ms),
                seg.text.trim()
            );
        }
    } else {
        println!("{}", result.text);
    }

    if let Some(dir) = cli.export {
        let path = export_transcript(&result.text)
            .write_to_dir(&dir)
            .with_context(|| format!("failed to write transcript into {}", dir.display()))?;
        log::info!("transcript exported to {}", path.display());
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn print_models() {
    println!("Available models (default: {DEFAULT_MODEL_ID}):");
    for m in MODELS {
        println!(
            "  {:<18} {} (~{} MB, language: {})",
            m.id, m.display_name, m.file_size_mb, m.language
        );
    }
}

/// `mm:ss.mmm` rendering for segment boundaries.
fn format_ms(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms % 60_000) / 1_000;
    let millis = ms % 1_000;
    format!("{minutes:02}:{seconds:02}.{millis:03}")
}
