use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hark", about = "Transcribe audio files through pluggable speech backends")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "hark.toml")]
    config: PathBuf,

    /// Backend to use, overriding the one in the config file
    #[arg(short, long)]
    backend: Option<String>,

    /// Only transcribe the first N seconds of the file
    #[arg(short, long)]
    duration: Option<f32>,

    /// List the available backends and exit
    #[arg(long)]
    list_backends: bool,

    /// Audio file to transcribe
    #[arg(required_unless_present = "list_backends")]
    audio: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let registry = hark_recognizer::RecognizerRegistry::new();
    if cli.list_backends {
        for name in registry.list_backends() {
            println!("{name}");
        }
        return Ok(());
    }

    // Config is optional when the CLI names the backend; adapters that need
    // credentials will still reject empty options at construction.
    let config = if cli.config.exists() {
        hark_core::AppConfig::load_from_file(&cli.config)
            .with_context(|| format!("failed to load config from {:?}", cli.config))?
    } else {
        hark_core::AppConfig::default()
    };

    let env_filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let (backend_name, options) = match (&cli.backend, &config.backend) {
        (Some(name), Some(cfg)) if *name == cfg.name => (cfg.name.clone(), cfg.options.clone()),
        (Some(name), _) => (name.clone(), toml::Value::Table(Default::default())),
        (None, Some(cfg)) => (cfg.name.clone(), cfg.options.clone()),
        (None, None) => bail!("no backend selected; pass --backend or set [backend] in the config"),
    };

    let recognizer = registry
        .create(&backend_name, options)
        .with_context(|| format!("failed to configure backend '{backend_name}'"))?;

    let audio_path = cli
        .audio
        .context("no audio file given")?;
    let mut source = hark_audio::AudioFile::open(&audio_path)
        .with_context(|| format!("failed to open audio file {audio_path:?}"))?;

    let segment = match cli.duration {
        Some(seconds) => source.record_for(seconds),
        None => source.record(),
    }
    .with_context(|| format!("failed to decode {audio_path:?}"))?;

    tracing::info!(
        "decoded {:.2}s at {}Hz, {} ch from {:?}",
        segment.duration_seconds(),
        segment.sample_rate(),
        segment.channels(),
        audio_path,
    );

    let transcript = recognizer
        .recognize(&segment)
        .await
        .with_context(|| format!("backend '{backend_name}' failed"))?;

    if let Some(confidence) = transcript.confidence {
        tracing::info!("confidence: {confidence:.2}");
    }
    println!("{}", transcript.text);

    Ok(())
}
