/// Mixtape - track-list audio player for the terminal
use clap::{Parser, Subcommand};
use mixtape_terminal::{probe_catalog, run_player, AppConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mixtape")]
#[command(about = "Play a list of audio samples from the terminal", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./mixtape.toml)
    #[arg(short, long, global = true, env = "MIXTAPE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the catalog interactively (default)
    Play,
    /// Print each track's duration and the total
    Durations,
    /// List the configured catalog
    List,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing (stderr, so the track list on stdout stays readable)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "mixtape=info,mixtape_terminal=info,mixtape_playback=info,mixtape_audio_desktop=warn"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command.unwrap_or(Commands::Play) {
        Commands::Play => {
            if config.tracks.is_empty() {
                anyhow::bail!("No tracks configured (add [[tracks]] entries to mixtape.toml)");
            }
            run_player(&config)?;
        }
        Commands::Durations => {
            durations(&config)?;
        }
        Commands::List => {
            list(&config);
        }
    }

    Ok(())
}

fn durations(config: &AppConfig) -> anyhow::Result<()> {
    let controller = probe_catalog(config);

    for track in controller.tracks() {
        println!("{:>8}  {}", track.total_time(), track.title());
    }

    if controller.is_probing() {
        anyhow::bail!("Some tracks could not be read; see the log for details");
    }

    println!("{:>8}  Total", controller.controls().total());
    Ok(())
}

fn list(config: &AppConfig) {
    println!("{}", config.player.title);
    for (i, entry) in config.tracks.iter().enumerate() {
        println!("{:>3}. {}  ({})", i + 1, entry.display_title(), entry.file);
    }
}
