/// Cadence Player - headless CMS-backed player
use cadence_core::{AlbumId, AuthorId, PlaylistId};
use cadence_playback::PlaybackSnapshot;
use cadence_player::{render_listing, Player, PlayerConfig};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "cadence-player")]
#[command(about = "Headless Cadence player", long_about = None)]
struct Cli {
    /// Configuration file path (default: ./cadence.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all songs with their durations
    Songs,
    /// List the songs of a playlist
    Playlist {
        /// Playlist id
        id: i64,
    },
    /// List the songs of an album
    Album {
        /// Album id
        id: i64,
    },
    /// List every song on an artist's albums
    Artist {
        /// Author id
        id: i64,
    },
    /// Play through a collection until it ends or Ctrl-C
    Play {
        /// Playlist id (default: all songs)
        #[arg(short, long, conflicts_with_all = ["album", "artist"])]
        playlist: Option<i64>,
        /// Album id
        #[arg(long, conflicts_with = "artist")]
        album: Option<i64>,
        /// Author id
        #[arg(long)]
        artist: Option<i64>,
        /// Track number to start from
        #[arg(short, long, default_value_t = 1)]
        track: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = PlayerConfig::load(cli.config.as_deref())?;

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    config.validate()?;
    let player = Player::from_config(&config)?;

    let result = match cli.command {
        Commands::Songs => list(&player, &config, Collection::AllSongs).await,
        Commands::Playlist { id } => {
            list(&player, &config, Collection::Playlist(PlaylistId::new(id))).await
        }
        Commands::Album { id } => list(&player, &config, Collection::Album(AlbumId::new(id))).await,
        Commands::Artist { id } => {
            list(&player, &config, Collection::Artist(AuthorId::new(id))).await
        }
        Commands::Play {
            playlist,
            album,
            artist,
            track,
        } => {
            let collection = match (playlist, album, artist) {
                (Some(id), _, _) => Collection::Playlist(PlaylistId::new(id)),
                (_, Some(id), _) => Collection::Album(AlbumId::new(id)),
                (_, _, Some(id)) => Collection::Artist(AuthorId::new(id)),
                _ => Collection::AllSongs,
            };
            play(&player, collection, track).await
        }
    };

    player.shutdown().await?;
    result
}

/// What to load into the session
enum Collection {
    AllSongs,
    Playlist(PlaylistId),
    Album(AlbumId),
    Artist(AuthorId),
}

async fn load(player: &Player, collection: Collection) -> anyhow::Result<PlaybackSnapshot> {
    let loaded = match collection {
        Collection::AllSongs => player.load_all_songs().await?,
        Collection::Playlist(id) => player.load_playlist(id).await?,
        Collection::Album(id) => player.load_album(id).await?,
        Collection::Artist(id) => player.load_artist(id).await?,
    };
    Ok(loaded)
}

async fn list(player: &Player, config: &PlayerConfig, collection: Collection) -> anyhow::Result<()> {
    let loaded = load(player, collection).await?;
    let snapshot = player
        .wait_for_durations(probe_deadline(config, loaded.playlist.len()))
        .await;

    print_listing(&snapshot);
    Ok(())
}

fn print_listing(snapshot: &PlaybackSnapshot) {
    println!("{} ({} songs):", snapshot.playlist.title(), snapshot.playlist.len());
    for line in render_listing(snapshot) {
        println!("{}", line);
    }
}

async fn play(player: &Player, collection: Collection, track: usize) -> anyhow::Result<()> {
    let loaded = load(player, collection).await?;

    if loaded.playlist.is_empty() {
        tracing::warn!("Nothing to play");
        return Ok(());
    }

    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let finished = player
        .play_through(track.saturating_sub(1), interrupted)
        .await?;
    tracing::info!(
        index = ?finished.index,
        elapsed = ?finished.elapsed,
        "Stopped"
    );

    Ok(())
}

/// Upper bound for a full probe run: one timeout per concurrency batch, plus one
fn probe_deadline(config: &PlayerConfig, entries: usize) -> Duration {
    let probe = config.probe_config();
    let batches = entries.div_ceil(probe.max_concurrent.max(1)) + 1;
    probe
        .timeout
        .checked_mul(u32::try_from(batches).unwrap_or(u32::MAX))
        .unwrap_or(Duration::MAX)
}
