use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;
use wavescribe_audio::DecoderSource;
use wavescribe_session::{SessionDriver, WsTransport};

#[derive(Parser)]
#[command(name = "wavescribe", about = "Streaming speech-to-text client")]
struct Cli {
    /// Path to the input media file
    input: PathBuf,

    /// WebSocket URI of the recognition server (e.g. ws://localhost:2700)
    server: String,

    /// Path to an optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the audio chunk size in bytes
    #[arg(long)]
    chunk_size: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => wavescribe_core::AppConfig::load_from_file(path)
            .with_context(|| format!("failed to load config from {:?}", path))?,
        None => wavescribe_core::AppConfig::default(),
    };
    if let Some(chunk_size) = cli.chunk_size {
        config.decoder.chunk_size = chunk_size;
    }

    // Logs go to stderr; stdout carries only the transcript.
    let env_filter =
        EnvFilter::try_new(&config.general.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::Registry::default()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        );
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    tracing::info!(input = %cli.input.display(), server = %cli.server, "wavescribe starting");

    let transport = WsTransport::connect(&cli.server)
        .await
        .with_context(|| format!("failed to connect to {}", cli.server))?;

    let source = DecoderSource::spawn_ffmpeg(&config.decoder, &cli.input)
        .context("failed to start decoder")?;

    let transcript = SessionDriver::new(source, transport)
        .with_timeouts(&config.session)
        .run()
        .await
        .context("transcription session failed")?;

    println!("{}", transcript.to_json()?);
    Ok(())
}
