/// Forza Radio - headless player
use anyhow::Context;
use clap::{Parser, Subcommand};
use forza_playback::{PlaybackController, PlayerCommand};
use forza_radio::{app, config::AppConfig, sink::SimulatedSink};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "forza-radio")]
#[command(about = "Forza Radio headless player", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = "FORZA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the configured catalog against a simulated audio backend
    ///
    /// Exits once the loaded catalog turns out to be empty, since the
    /// headless host has no refresh trigger to wait on.
    Play {
        /// Stop after this many finished tracks
        #[arg(short, long)]
        tracks: Option<usize>,
    },
    /// Resolve cover art for one track
    Art {
        /// Track title
        title: String,
        /// Artist name
        artist: String,
    },
    /// Load the configured catalog and list it
    Catalog,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "forza_radio=info,forza_playback=info,forza_artwork=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Play { tracks } => play(config, tracks).await?,
        Commands::Art { title, artist } => resolve_art(&config, &title, &artist).await?,
        Commands::Catalog => list_catalog(&config).await?,
    }

    Ok(())
}

async fn play(config: AppConfig, max_tracks: Option<usize>) -> anyhow::Result<()> {
    let prefs = app::open_preferences(&config.storage);
    let source = app::build_source(&config)?;
    let resolver = Arc::new(app::build_resolver(&config, prefs.clone())?);

    let (media_tx, media_rx) = mpsc::channel(64);
    let audio = SimulatedSink::audible(&config.simulation, media_tx);
    let buffer = SimulatedSink::silent(&config.simulation);

    let mut player = PlaybackController::new(
        config.player.clone(),
        source,
        Box::new(audio),
        Box::new(buffer),
        resolver,
    )
    .with_preferences(prefs);
    player.start().await;

    let (command_tx, command_rx) = mpsc::channel(16);
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    for event in player.drain_events() {
        let _ = event_tx.send(event);
    }

    // Stands in for the listener's first gesture
    if !config.player.autoplay {
        command_tx.send(PlayerCommand::PlayPause).await?;
    }

    tracing::info!("Starting playback");
    let driver = tokio::spawn(player.run(command_rx, media_rx, event_tx));
    let mut host = app::HostPolicy::new(max_tracks);

    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                if let Some(command) = host.observe(&event) {
                    // The driver may already be gone
                    let _ = command_tx.send(command).await;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                let _ = command_tx.send(PlayerCommand::Shutdown).await;
            }
        }
    }

    driver.await.context("Player task failed")?;
    tracing::info!(finished = host.finished(), "Playback stopped");
    Ok(())
}

async fn resolve_art(config: &AppConfig, title: &str, artist: &str) -> anyhow::Result<()> {
    let prefs = app::open_preferences(&config.storage);
    let resolver = app::build_resolver(config, prefs)?;
    let resolution = resolver.resolve_with_source(title, artist).await;

    println!("{:?}", resolution.source);
    println!("{}", resolution.url);
    Ok(())
}

async fn list_catalog(config: &AppConfig) -> anyhow::Result<()> {
    let mut source = app::build_source(config)?;
    let catalog = source.refresh().await.context("Failed to load catalog")?;

    for (index, track) in catalog.iter().enumerate() {
        println!("{index:>4}  {} - {}", track.artist(), track.title());
    }
    println!("{} tracks", catalog.len());
    Ok(())
}
