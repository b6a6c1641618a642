use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use callsense_core::audio::domain::waveform::SpeakerRole;
use callsense_core::pipeline::analysis::ChannelSelection;
use callsense_core::pipeline::engine::EmotionEngine;
use callsense_core::pipeline::engine_handle::EngineHandle;
use callsense_core::pipeline::infrastructure::inference_pool::{InferencePool, JobHandle};
use callsense_core::shared::config::{EngineConfig, FallbackStrategy};
use callsense_core::shared::constants::DEFAULT_DECLARED_EXTENSION;

/// Emotion analysis for call recordings.
#[derive(Parser)]
#[command(name = "callsense", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    engine: EngineArgs,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze whole recordings (one JSON result per file).
    Analyze {
        /// Recording files; channel 0 is the caller, channel 1 the client.
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Channels to analyze: both, caller or client.
        #[arg(long, default_value = "both")]
        channels: ChannelSelection,

        /// Call identifier (single file only; defaults to the file stem).
        #[arg(long)]
        call_id: Option<String>,
    },
    /// Evaluate short streaming chunks through the quality gate.
    Chunk {
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Speaker role of the chunks: caller or client.
        #[arg(long, default_value = "caller")]
        role: SpeakerRole,
    },
}

#[derive(Args)]
struct EngineArgs {
    /// Engine configuration file (JSON).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory with pre-provisioned model files.
    #[arg(long, global = true)]
    models_dir: Option<PathBuf>,

    /// Skip the model probe and use the fallback pipeline.
    #[arg(long, global = true)]
    force_fallback: bool,

    /// Fallback scoring: heuristic or seeded.
    #[arg(long, global = true)]
    fallback: Option<FallbackStrategy>,

    /// Inference worker threads.
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Maximum queued analysis jobs.
    #[arg(long, global = true)]
    queue: Option<usize>,

    /// Alert lexicon file (JSON with `profanity` and `anger_stems`).
    #[arg(long, global = true)]
    lexicon: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = build_config(&cli.engine)?;
    let pool = InferencePool::new(config.workers, config.queue_capacity)?;
    let handle = EngineHandle::new(config);
    let engine = handle.get()?;
    log::info!(
        "Engine ready ({} mode, {} worker(s))",
        engine.mode(),
        pool.worker_count()
    );

    match cli.command {
        Command::Analyze {
            files,
            channels,
            call_id,
        } => {
            if call_id.is_some() && files.len() > 1 {
                return Err("--call-id can only be used with a single file".into());
            }
            let jobs = files
                .iter()
                .map(|path| {
                    let bytes = read_input(path)?;
                    let extension = declared_extension(path);
                    let id = call_id.clone().unwrap_or_else(|| file_stem(path));
                    let engine = Arc::clone(&engine);
                    Ok(pool.submit_blocking(move || {
                        engine.analyze_call(&bytes, &extension, channels, &id)
                    })?)
                })
                .collect::<Result<Vec<_>, Box<dyn std::error::Error>>>()?;
            print_results(jobs, cli.pretty)
        }
        Command::Chunk { files, role } => {
            let jobs = files
                .iter()
                .map(|path| {
                    let bytes = read_input(path)?;
                    let extension = declared_extension(path);
                    let engine = Arc::clone(&engine);
                    Ok(pool.submit_blocking(move || {
                        engine.evaluate_chunk_as(&bytes, &extension, role)
                    })?)
                })
                .collect::<Result<Vec<_>, Box<dyn std::error::Error>>>()?;
            print_results(jobs, cli.pretty)
        }
    }
}

/// Configuration file (or defaults) with command-line overrides applied.
fn build_config(args: &EngineArgs) -> Result<EngineConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = &args.models_dir {
        config.models_dir = Some(dir.clone());
    }
    if args.force_fallback {
        config.force_fallback = true;
    }
    if let Some(strategy) = args.fallback {
        config.fallback = strategy;
    }
    if let Some(workers) = args.workers {
        config.workers = workers;
    }
    if let Some(queue) = args.queue {
        config.queue_capacity = queue;
    }
    if let Some(lexicon) = &args.lexicon {
        config.lexicon_path = Some(lexicon.clone());
    }
    config.validate()?;
    Ok(config)
}

fn print_results<T: Serialize>(
    jobs: Vec<JobHandle<T>>,
    pretty: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    for job in jobs {
        let result = job.wait()?;
        let json = if pretty {
            serde_json::to_string_pretty(&result)?
        } else {
            serde_json::to_string(&result)?
        };
        println!("{json}");
    }
    Ok(())
}

fn read_input(path: &Path) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    if !path.exists() {
        return Err(format!("Input file not found: {}", path.display()).into());
    }
    Ok(std::fs::read(path)?)
}

fn declared_extension(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_else(|| DEFAULT_DECLARED_EXTENSION.to_string())
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("call")
        .to_string()
}
